// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener handles, callback bodies, and the arena that owns them.
//!
//! A listener is one registered callback bundle: its dispatch key, its
//! priority mode (explicit fixed priority, or derived from its node's place
//! in the scene), and its lifecycle flags. The dispatcher exclusively owns
//! listener storage; callers keep only a [`ListenerId`].
//!
//! Callback bodies are a closed tagged union ([`Handlers`]) rather than a
//! trait-object hierarchy: one variant per event kind, each carrying that
//! kind's callback slots. Bodies sit behind `Rc<RefCell<..>>` so a callback
//! can run while its own dispatcher is mutably borrowed by the callback's
//! context, which is what makes re-entrant registration and nested dispatch
//! possible.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use smallvec::SmallVec;

use crate::dispatcher::DispatchCtx;
use crate::event::{AccelerationEvent, CustomEvent, FocusEvent, KeyCode, MouseEvent, Touch, TouchId};
use crate::key::EventKey;

/// Handle to a registered listener.
///
/// Slot + generation, like a scene `NodeId`: stable while the listener is
/// registered, stale afterwards, and never aliasing a later listener.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(pub(crate) u32, pub(crate) u32);

impl ListenerId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Listener lifecycle flags; all three must align for delivery.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct ListenerFlags: u8 {
        /// Eligible for delivery unless paused.
        const ENABLED    = 0b0000_0001;
        /// Temporarily muted (e.g. its node left the stage).
        const PAUSED     = 0b0000_0010;
        /// Known to the dispatcher; cleared at unregistration, before
        /// physical removal.
        const REGISTERED = 0b0000_0100;
    }
}

type TouchBeganFn<K> = Box<dyn FnMut(&Touch, &mut DispatchCtx<'_, K>) -> bool>;
type TouchFn<K> = Box<dyn FnMut(&Touch, &mut DispatchCtx<'_, K>)>;
type TouchBatchFn<K> = Box<dyn FnMut(&[Touch], &mut DispatchCtx<'_, K>)>;
type KeyFn<K> = Box<dyn FnMut(KeyCode, &mut DispatchCtx<'_, K>)>;
type MouseFn<K> = Box<dyn FnMut(&MouseEvent, &mut DispatchCtx<'_, K>)>;
type AccelFn<K> = Box<dyn FnMut(&AccelerationEvent, &mut DispatchCtx<'_, K>)>;
type FocusFn<K> = Box<dyn FnMut(&FocusEvent<K>, &mut DispatchCtx<'_, K>)>;
type CustomFn<K> = Box<dyn FnMut(&mut CustomEvent<'_>, &mut DispatchCtx<'_, K>)>;

/// Callback bodies, one variant per listener kind.
pub(crate) enum Handlers<K> {
    TouchOneByOne {
        began: Option<TouchBeganFn<K>>,
        moved: Option<TouchFn<K>>,
        ended: Option<TouchFn<K>>,
        cancelled: Option<TouchFn<K>>,
    },
    TouchAllAtOnce {
        began: Option<TouchBatchFn<K>>,
        moved: Option<TouchBatchFn<K>>,
        ended: Option<TouchBatchFn<K>>,
        cancelled: Option<TouchBatchFn<K>>,
    },
    Keyboard {
        pressed: Option<KeyFn<K>>,
        released: Option<KeyFn<K>>,
    },
    Mouse {
        down: Option<MouseFn<K>>,
        up: Option<MouseFn<K>>,
        moved: Option<MouseFn<K>>,
        scrolled: Option<MouseFn<K>>,
    },
    Acceleration {
        changed: AccelFn<K>,
    },
    Focus {
        changed: FocusFn<K>,
    },
    Custom {
        name: String,
        received: CustomFn<K>,
    },
}

impl<K> Handlers<K> {
    /// The kind's availability check, run once at registration.
    ///
    /// Kinds whose single callback is supplied at construction are always
    /// available; the optional-callback kinds need at least their required
    /// slots bound, and custom listeners need a non-empty name.
    pub(crate) fn is_available(&self) -> bool {
        match self {
            Self::TouchOneByOne { began, .. } => began.is_some(),
            Self::TouchAllAtOnce {
                began,
                moved,
                ended,
                cancelled,
            } => began.is_some() || moved.is_some() || ended.is_some() || cancelled.is_some(),
            Self::Keyboard { pressed, released } => pressed.is_some() || released.is_some(),
            Self::Mouse { .. } => true,
            Self::Acceleration { .. } | Self::Focus { .. } => true,
            Self::Custom { name, .. } => !name.is_empty(),
        }
    }

    /// The fixed dispatch key for this kind; `None` for custom listeners,
    /// whose key is interned from the name at registration.
    pub(crate) fn base_key(&self) -> Option<EventKey> {
        match self {
            Self::TouchOneByOne { .. } => Some(EventKey::TouchOneByOne),
            Self::TouchAllAtOnce { .. } => Some(EventKey::TouchAllAtOnce),
            Self::Keyboard { .. } => Some(EventKey::Keyboard),
            Self::Mouse { .. } => Some(EventKey::Mouse),
            Self::Acceleration { .. } => Some(EventKey::Acceleration),
            Self::Focus { .. } => Some(EventKey::Focus),
            Self::Custom { .. } => None,
        }
    }
}

/// One registered listener as stored in the arena.
pub(crate) struct Registered<K> {
    pub(crate) key: EventKey,
    /// `0` means scene-graph mode: priority derives from `node`.
    pub(crate) fixed_priority: i32,
    /// Non-owning back-reference; `Some` iff scene-graph mode. Cleared as
    /// the first step of unregistration so a walk in progress can never
    /// observe a reference to a node being torn down.
    pub(crate) node: Option<K>,
    pub(crate) flags: ListenerFlags,
    /// Touch one-by-one only: claimed touches stop at this listener.
    pub(crate) swallows: bool,
    /// Touch one-by-one only: touches this listener claimed on their began
    /// phase and still owns.
    pub(crate) claimed: SmallVec<[TouchId; 4]>,
    pub(crate) body: Rc<RefCell<Handlers<K>>>,
}

impl<K: Copy> Registered<K> {
    pub(crate) fn is_deliverable(&self) -> bool {
        self.flags
            .contains(ListenerFlags::ENABLED | ListenerFlags::REGISTERED)
            && !self.flags.contains(ListenerFlags::PAUSED)
    }

    pub(crate) fn is_scene_mode(&self) -> bool {
        self.fixed_priority == 0
    }
}

/// Slot arena owning all listener records.
pub(crate) struct ListenerArena<K> {
    slots: Vec<Option<Registered<K>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl<K> Default for ListenerArena<K> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }
}

impl<K> ListenerArena<K> {
    pub(crate) fn insert(&mut self, rec: Registered<K>) -> ListenerId {
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(rec);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ListenerId uses 32-bit indices by design."
            )]
            ListenerId::new(idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(rec));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ListenerId uses 32-bit indices by design."
            )]
            ListenerId::new((self.slots.len() - 1) as u32, generation)
        }
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> Option<Registered<K>> {
        if !self.contains(id) {
            return None;
        }
        let rec = self.slots[id.idx()].take();
        self.free_list.push(id.idx());
        rec
    }

    pub(crate) fn get(&self, id: ListenerId) -> Option<&Registered<K>> {
        match self.slots.get(id.idx()) {
            Some(Some(rec)) if self.generations[id.idx()] == id.1 => Some(rec),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, id: ListenerId) -> Option<&mut Registered<K>> {
        match self.slots.get_mut(id.idx()) {
            Some(Some(rec)) if self.generations[id.idx()] == id.1 => Some(rec),
            _ => None,
        }
    }

    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Ids of all live records, in slot order.
    pub(crate) fn ids(&self) -> impl Iterator<Item = ListenerId> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref().map(|_| {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "ListenerId uses 32-bit indices by design."
                )]
                ListenerId::new(i as u32, self.generations[i])
            })
        })
    }
}

/// A listener ready for registration: callback body plus kind-level options.
///
/// Built from one of the per-kind builders; registration consumes it. See
/// [`Dispatcher::add_with_scene_graph_priority`] and
/// [`Dispatcher::add_with_fixed_priority`].
///
/// [`Dispatcher::add_with_scene_graph_priority`]: crate::Dispatcher::add_with_scene_graph_priority
/// [`Dispatcher::add_with_fixed_priority`]: crate::Dispatcher::add_with_fixed_priority
pub struct Listener<K> {
    pub(crate) swallows: bool,
    pub(crate) handlers: Handlers<K>,
}

impl<K> core::fmt::Debug for Listener<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listener")
            .field("swallows", &self.swallows)
            .finish_non_exhaustive()
    }
}

macro_rules! builder_debug {
    ($ty:ident) => {
        impl<K> core::fmt::Debug for $ty<K> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.debug_struct(stringify!($ty)).finish_non_exhaustive()
            }
        }
    };
}

/// Builder for a touch listener that claims individual touch points.
///
/// The began callback is required (registration is otherwise a no-op); its
/// return value claims the touch, routing the touch's later phases to this
/// listener alone. With [`swallow`](Self::swallow), a claimed touch is also
/// hidden from lower-priority listeners and from the all-at-once pool.
pub struct TouchOneByOneListener<K> {
    began: Option<TouchBeganFn<K>>,
    moved: Option<TouchFn<K>>,
    ended: Option<TouchFn<K>>,
    cancelled: Option<TouchFn<K>>,
    swallows: bool,
}

builder_debug!(TouchOneByOneListener);

impl<K> Default for TouchOneByOneListener<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TouchOneByOneListener<K> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            began: None,
            moved: None,
            ended: None,
            cancelled: None,
            swallows: false,
        }
    }

    /// Sets the began callback; returning `true` claims the touch.
    #[must_use]
    pub fn on_began(
        mut self,
        f: impl FnMut(&Touch, &mut DispatchCtx<'_, K>) -> bool + 'static,
    ) -> Self {
        self.began = Some(Box::new(f));
        self
    }

    /// Sets the moved callback, invoked only for touches this listener claimed.
    #[must_use]
    pub fn on_moved(mut self, f: impl FnMut(&Touch, &mut DispatchCtx<'_, K>) + 'static) -> Self {
        self.moved = Some(Box::new(f));
        self
    }

    /// Sets the ended callback; ending a touch releases its claim.
    #[must_use]
    pub fn on_ended(mut self, f: impl FnMut(&Touch, &mut DispatchCtx<'_, K>) + 'static) -> Self {
        self.ended = Some(Box::new(f));
        self
    }

    /// Sets the cancelled callback; cancellation releases the claim.
    #[must_use]
    pub fn on_cancelled(
        mut self,
        f: impl FnMut(&Touch, &mut DispatchCtx<'_, K>) + 'static,
    ) -> Self {
        self.cancelled = Some(Box::new(f));
        self
    }

    /// Whether claimed touches are hidden from lower-priority listeners.
    #[must_use]
    pub fn swallow(mut self, swallow: bool) -> Self {
        self.swallows = swallow;
        self
    }
}

impl<K> From<TouchOneByOneListener<K>> for Listener<K> {
    fn from(b: TouchOneByOneListener<K>) -> Self {
        Self {
            swallows: b.swallows,
            handlers: Handlers::TouchOneByOne {
                began: b.began,
                moved: b.moved,
                ended: b.ended,
                cancelled: b.cancelled,
            },
        }
    }
}

/// Builder for a touch listener that receives each touch batch at once.
///
/// At least one callback must be bound or registration is a no-op.
pub struct TouchAllAtOnceListener<K> {
    began: Option<TouchBatchFn<K>>,
    moved: Option<TouchBatchFn<K>>,
    ended: Option<TouchBatchFn<K>>,
    cancelled: Option<TouchBatchFn<K>>,
}

builder_debug!(TouchAllAtOnceListener);

impl<K> Default for TouchAllAtOnceListener<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TouchAllAtOnceListener<K> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            began: None,
            moved: None,
            ended: None,
            cancelled: None,
        }
    }

    /// Sets the began callback for touch batches.
    #[must_use]
    pub fn on_began(mut self, f: impl FnMut(&[Touch], &mut DispatchCtx<'_, K>) + 'static) -> Self {
        self.began = Some(Box::new(f));
        self
    }

    /// Sets the moved callback for touch batches.
    #[must_use]
    pub fn on_moved(mut self, f: impl FnMut(&[Touch], &mut DispatchCtx<'_, K>) + 'static) -> Self {
        self.moved = Some(Box::new(f));
        self
    }

    /// Sets the ended callback for touch batches.
    #[must_use]
    pub fn on_ended(mut self, f: impl FnMut(&[Touch], &mut DispatchCtx<'_, K>) + 'static) -> Self {
        self.ended = Some(Box::new(f));
        self
    }

    /// Sets the cancelled callback for touch batches.
    #[must_use]
    pub fn on_cancelled(
        mut self,
        f: impl FnMut(&[Touch], &mut DispatchCtx<'_, K>) + 'static,
    ) -> Self {
        self.cancelled = Some(Box::new(f));
        self
    }
}

impl<K> From<TouchAllAtOnceListener<K>> for Listener<K> {
    fn from(b: TouchAllAtOnceListener<K>) -> Self {
        Self {
            swallows: false,
            handlers: Handlers::TouchAllAtOnce {
                began: b.began,
                moved: b.moved,
                ended: b.ended,
                cancelled: b.cancelled,
            },
        }
    }
}

/// Builder for a keyboard listener.
///
/// At least one of press/release must be bound or registration is a no-op.
pub struct KeyboardListener<K> {
    pressed: Option<KeyFn<K>>,
    released: Option<KeyFn<K>>,
}

builder_debug!(KeyboardListener);

impl<K> Default for KeyboardListener<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> KeyboardListener<K> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pressed: None,
            released: None,
        }
    }

    /// Sets the key-press callback.
    #[must_use]
    pub fn on_pressed(mut self, f: impl FnMut(KeyCode, &mut DispatchCtx<'_, K>) + 'static) -> Self {
        self.pressed = Some(Box::new(f));
        self
    }

    /// Sets the key-release callback.
    #[must_use]
    pub fn on_released(
        mut self,
        f: impl FnMut(KeyCode, &mut DispatchCtx<'_, K>) + 'static,
    ) -> Self {
        self.released = Some(Box::new(f));
        self
    }
}

impl<K> From<KeyboardListener<K>> for Listener<K> {
    fn from(b: KeyboardListener<K>) -> Self {
        Self {
            swallows: false,
            handlers: Handlers::Keyboard {
                pressed: b.pressed,
                released: b.released,
            },
        }
    }
}

/// Builder for a mouse listener. All callbacks are optional.
pub struct MouseListener<K> {
    down: Option<MouseFn<K>>,
    up: Option<MouseFn<K>>,
    moved: Option<MouseFn<K>>,
    scrolled: Option<MouseFn<K>>,
}

builder_debug!(MouseListener);

impl<K> Default for MouseListener<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> MouseListener<K> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            down: None,
            up: None,
            moved: None,
            scrolled: None,
        }
    }

    /// Sets the button-down callback.
    #[must_use]
    pub fn on_down(
        mut self,
        f: impl FnMut(&MouseEvent, &mut DispatchCtx<'_, K>) + 'static,
    ) -> Self {
        self.down = Some(Box::new(f));
        self
    }

    /// Sets the button-up callback.
    #[must_use]
    pub fn on_up(mut self, f: impl FnMut(&MouseEvent, &mut DispatchCtx<'_, K>) + 'static) -> Self {
        self.up = Some(Box::new(f));
        self
    }

    /// Sets the pointer-move callback.
    #[must_use]
    pub fn on_moved(
        mut self,
        f: impl FnMut(&MouseEvent, &mut DispatchCtx<'_, K>) + 'static,
    ) -> Self {
        self.moved = Some(Box::new(f));
        self
    }

    /// Sets the scroll callback.
    #[must_use]
    pub fn on_scrolled(
        mut self,
        f: impl FnMut(&MouseEvent, &mut DispatchCtx<'_, K>) + 'static,
    ) -> Self {
        self.scrolled = Some(Box::new(f));
        self
    }
}

impl<K> From<MouseListener<K>> for Listener<K> {
    fn from(b: MouseListener<K>) -> Self {
        Self {
            swallows: false,
            handlers: Handlers::Mouse {
                down: b.down,
                up: b.up,
                moved: b.moved,
                scrolled: b.scrolled,
            },
        }
    }
}

/// Builder for an acceleration listener; the callback is required up front.
pub struct AccelerationListener<K> {
    changed: AccelFn<K>,
}

builder_debug!(AccelerationListener);

impl<K> AccelerationListener<K> {
    /// Creates the listener with its sample callback.
    #[must_use]
    pub fn new(f: impl FnMut(&AccelerationEvent, &mut DispatchCtx<'_, K>) + 'static) -> Self {
        Self {
            changed: Box::new(f),
        }
    }
}

impl<K> From<AccelerationListener<K>> for Listener<K> {
    fn from(b: AccelerationListener<K>) -> Self {
        Self {
            swallows: false,
            handlers: Handlers::Acceleration { changed: b.changed },
        }
    }
}

/// Builder for a focus listener; the callback is required up front.
pub struct FocusListener<K> {
    changed: FocusFn<K>,
}

builder_debug!(FocusListener);

impl<K> FocusListener<K> {
    /// Creates the listener with its focus-change callback.
    #[must_use]
    pub fn new(f: impl FnMut(&FocusEvent<K>, &mut DispatchCtx<'_, K>) + 'static) -> Self {
        Self {
            changed: Box::new(f),
        }
    }
}

impl<K> From<FocusListener<K>> for Listener<K> {
    fn from(b: FocusListener<K>) -> Self {
        Self {
            swallows: false,
            handlers: Handlers::Focus { changed: b.changed },
        }
    }
}

/// Builder for a custom listener: a name and its callback.
///
/// Registration with an empty name is a no-op.
pub struct CustomListener<K> {
    name: String,
    received: CustomFn<K>,
}

builder_debug!(CustomListener);

impl<K> CustomListener<K> {
    /// Creates the listener for events dispatched under `name`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        f: impl FnMut(&mut CustomEvent<'_>, &mut DispatchCtx<'_, K>) + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            received: Box::new(f),
        }
    }
}

impl<K> From<CustomListener<K>> for Listener<K> {
    fn from(b: CustomListener<K>) -> Self {
        Self {
            swallows: false,
            handlers: Handlers::Custom {
                name: b.name,
                received: b.received,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_touch<K: 'static>() -> TouchOneByOneListener<K> {
        TouchOneByOneListener::new().on_began(|_, _| true)
    }

    #[test]
    fn availability_checks() {
        let l: Listener<u32> = TouchOneByOneListener::new().into();
        assert!(!l.handlers.is_available(), "began is required");
        let l: Listener<u32> = noop_touch().into();
        assert!(l.handlers.is_available());

        let l: Listener<u32> = TouchAllAtOnceListener::new().into();
        assert!(!l.handlers.is_available());
        let l: Listener<u32> = TouchAllAtOnceListener::new().on_moved(|_, _| {}).into();
        assert!(l.handlers.is_available());

        let l: Listener<u32> = KeyboardListener::new().into();
        assert!(!l.handlers.is_available());
        let l: Listener<u32> = KeyboardListener::new().on_released(|_, _| {}).into();
        assert!(l.handlers.is_available());

        // Mouse has no required callback.
        let l: Listener<u32> = MouseListener::new().into();
        assert!(l.handlers.is_available());

        let l: Listener<u32> = CustomListener::new("", |_, _| {}).into();
        assert!(!l.handlers.is_available(), "custom names must be non-empty");
        let l: Listener<u32> = CustomListener::new("tick", |_, _| {}).into();
        assert!(l.handlers.is_available());
    }

    #[test]
    fn base_keys() {
        let l: Listener<u32> = noop_touch().into();
        assert_eq!(l.handlers.base_key(), Some(EventKey::TouchOneByOne));
        let l: Listener<u32> = KeyboardListener::new().on_pressed(|_, _| {}).into();
        assert_eq!(l.handlers.base_key(), Some(EventKey::Keyboard));
        let l: Listener<u32> = CustomListener::new("tick", |_, _| {}).into();
        assert_eq!(l.handlers.base_key(), None);
    }

    #[test]
    fn arena_generation_safety() {
        let mut arena = ListenerArena::<u32>::default();
        let l: Listener<u32> = noop_touch().into();
        let rec = Registered {
            key: EventKey::TouchOneByOne,
            fixed_priority: -1,
            node: None,
            flags: ListenerFlags::ENABLED | ListenerFlags::REGISTERED,
            swallows: false,
            claimed: SmallVec::new(),
            body: Rc::new(RefCell::new(l.handlers)),
        };
        let id = arena.insert(rec);
        assert!(arena.contains(id));
        assert_eq!(arena.len(), 1);

        arena.remove(id);
        assert!(!arena.contains(id));
        assert!(arena.get(id).is_none());

        // Slot reuse bumps the generation; the stale id stays dead.
        let l: Listener<u32> = noop_touch().into();
        let rec = Registered {
            key: EventKey::TouchOneByOne,
            fixed_priority: 2,
            node: None,
            flags: ListenerFlags::ENABLED | ListenerFlags::REGISTERED,
            swallows: false,
            claimed: SmallVec::new(),
            body: Rc::new(RefCell::new(l.handlers)),
        };
        let id2 = arena.insert(rec);
        assert_eq!(id.0, id2.0);
        assert_ne!(id, id2);
        assert!(!arena.contains(id));
        assert!(arena.contains(id2));
    }

    #[test]
    fn deliverability_needs_all_three_flags() {
        let l: Listener<u32> = noop_touch().into();
        let mut rec = Registered {
            key: EventKey::TouchOneByOne,
            fixed_priority: 1,
            node: None,
            flags: ListenerFlags::ENABLED | ListenerFlags::REGISTERED,
            swallows: false,
            claimed: SmallVec::new(),
            body: Rc::new(RefCell::new(l.handlers)),
        };
        assert!(rec.is_deliverable());

        rec.flags.insert(ListenerFlags::PAUSED);
        assert!(!rec.is_deliverable());
        rec.flags.remove(ListenerFlags::PAUSED);

        rec.flags.remove(ListenerFlags::ENABLED);
        assert!(!rec.is_deliverable());
        rec.flags.insert(ListenerFlags::ENABLED);

        rec.flags.remove(ListenerFlags::REGISTERED);
        assert!(!rec.is_deliverable());
    }
}
