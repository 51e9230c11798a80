// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The dispatcher: registration, ordering, delivery, and mutation safety.
//!
//! ## Delivery order
//!
//! For one dispatch key, listeners are walked in three spans: fixed
//! priorities below zero (ascending), then scene-graph-priority listeners
//! (foreground first), then fixed priorities above zero (ascending). A
//! callback that stops the event halts the walk across all spans.
//!
//! ## Re-entrancy
//!
//! Dispatch is single-threaded but re-entrant: a callback may register or
//! unregister listeners, or fire another dispatch. A depth counter plus a
//! pending-add queue and deferred removal keep the sequences stable under a
//! walk: additions become visible to the *next* dispatch, removals take
//! effect logically at once (the walk skips non-deliverable entries) and
//! physically at the end of the outermost dispatch.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::Cell;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::dirty::{DirtyFlags, DirtyState};
use crate::event::{
    AccelerationEvent, CustomEvent, Event, FocusEvent, KeyboardEvent, MouseAction, MouseEvent,
    Touch, TouchPhase,
};
use crate::key::{EventKey, NameTable};
use crate::listener::{Handlers, Listener, ListenerArena, ListenerFlags, ListenerId, Registered};
use crate::priority::PriorityIndex;
use crate::rank;
use crate::scene::{CameraId, SceneGraph, SceneView};

/// Context handed to every listener callback.
///
/// Carries the stop flag, the current target and visiting camera, and (for
/// re-entrant use) mutable access to the dispatcher itself. Anything done
/// through [`dispatcher`](Self::dispatcher) obeys the usual mid-dispatch
/// rules: registrations queue until the walk finishes, unregistrations mute
/// immediately.
pub struct DispatchCtx<'a, K> {
    pub(crate) dispatcher: &'a mut Dispatcher<K>,
    pub(crate) view: SceneView<'a, K>,
    pub(crate) target: Option<K>,
    pub(crate) camera: Option<CameraId>,
    pub(crate) stopped: &'a mut bool,
}

impl<'a, K> DispatchCtx<'a, K>
where
    K: Copy + Eq + Hash + 'static,
{
    /// Stops the event: no later listener in this dispatch sees it.
    pub fn stop_propagation(&mut self) {
        *self.stopped = true;
    }

    /// Whether the event has been stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.stopped
    }

    /// The node the current listener is attached to, for scene-graph
    /// priority listeners.
    #[must_use]
    pub fn current_target(&self) -> Option<K> {
        self.target
    }

    /// The camera pass this invocation belongs to, during the per-camera
    /// spans of a touch walk.
    #[must_use]
    pub fn visiting_camera(&self) -> Option<CameraId> {
        self.camera
    }

    /// The scene view of the dispatch in progress.
    #[must_use]
    pub fn view(&self) -> SceneView<'a, K> {
        self.view
    }

    /// The dispatcher, for re-entrant registration and unregistration.
    pub fn dispatcher(&mut self) -> &mut Dispatcher<K> {
        self.dispatcher
    }

    /// Fires a nested event dispatch with the same scene view.
    pub fn dispatch_event(&mut self, event: &Event<K>) {
        let view = self.view;
        self.dispatcher.dispatch_event(view, event);
    }

    /// Fires a nested custom event with the same scene view.
    pub fn dispatch_custom(&mut self, name: &str, data: &mut dyn Any) {
        let view = self.view;
        self.dispatcher.dispatch_custom(view, name, data);
    }
}

impl<K> core::fmt::Debug for DispatchCtx<'_, K>
where
    K: Copy + Eq + Hash + core::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DispatchCtx")
            .field("target", &self.target)
            .field("camera", &self.camera)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

/// Unwind-safe dispatch depth guard: the counter is balanced even when a
/// callback panics, so deferred cleanup can never be disabled for good.
pub(crate) struct DepthGuard {
    depth: Rc<Cell<u32>>,
}

impl DepthGuard {
    pub(crate) fn enter(depth: &Rc<Cell<u32>>) -> Self {
        depth.set(depth.get() + 1);
        Self {
            depth: Rc::clone(depth),
        }
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        let d = self.depth.get();
        debug_assert!(d > 0, "dispatch depth underflow");
        self.depth.set(d.saturating_sub(1));
    }
}

/// Snapshot of one key's walk order: negative fixed, scene, positive fixed.
///
/// Snapshotting decouples the walk from the live index, so re-entrant
/// mutation cannot shift entries under the iteration.
pub(crate) struct Segments {
    pub(crate) neg: Vec<ListenerId>,
    pub(crate) scene: Vec<ListenerId>,
    pub(crate) pos: Vec<ListenerId>,
}

/// Borrowed payload for one generic delivery.
pub(crate) enum Payload<'p, K: Copy> {
    Keyboard(&'p KeyboardEvent),
    Mouse(&'p MouseEvent),
    Acceleration(&'p AccelerationEvent),
    Focus(&'p FocusEvent<K>),
    Custom {
        name: &'p str,
        data: &'p mut dyn Any,
    },
    TouchBatch {
        phase: TouchPhase,
        touches: &'p [Touch],
    },
}

/// Prioritized event dispatcher for a scene-graph runtime.
///
/// One instance per runtime/scene context; there is no global. The
/// dispatcher owns its listeners and holds only non-owning node keys, so a
/// scene node disappearing never dangles, provided the embedding runtime
/// unregisters a node's listeners before destroying the node (see
/// [`unregister_for_node`](Self::unregister_for_node)).
///
/// ## Example
///
/// ```
/// use canopy_dispatch::{Dispatcher, Event, KeyCode, KeyboardEvent, KeyboardListener, SceneView};
///
/// let mut dispatcher = Dispatcher::<u32>::new();
/// dispatcher.add_with_fixed_priority(
///     KeyboardListener::new().on_pressed(|key, _ctx| assert_eq!(key, KeyCode(42))),
///     -1,
/// );
///
/// let event = Event::Keyboard(KeyboardEvent { key: KeyCode(42), pressed: true });
/// dispatcher.dispatch_event(SceneView::detached(), &event);
/// ```
///
/// ## Re-entrant limits
///
/// A nested dispatch fired from inside a callback walks listeners normally,
/// except that a listener whose callback is already running further up the
/// stack is skipped for the nested walk (instead of recursing into itself).
pub struct Dispatcher<K> {
    arena: ListenerArena<K>,
    index: PriorityIndex,
    dirty: DirtyState<K>,
    /// node → listeners registered with scene-graph priority on it.
    node_listeners: HashMap<K, SmallVec<[ListenerId; 2]>>,
    /// Node ranks from the last successful scene resolution; reused as-is
    /// when no live root is available to recompute from.
    ranks: HashMap<K, u32>,
    /// Listeners created while a dispatch was in progress; invisible until
    /// the outermost cleanup indexes them.
    pending: Vec<ListenerId>,
    /// Listeners unregistered while a dispatch was in progress; physically
    /// erased at the outermost cleanup.
    deferred_removals: Vec<ListenerId>,
    names: NameTable,
    in_dispatch: Rc<Cell<u32>>,
    enabled: bool,
}

impl<K> Default for Dispatcher<K>
where
    K: Copy + Eq + Hash + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> core::fmt::Debug for Dispatcher<K>
where
    K: Copy + Eq + Hash + 'static,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.arena.len())
            .field("pending", &self.pending.len())
            .field("in_dispatch", &self.in_dispatch.get())
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl<K> Dispatcher<K>
where
    K: Copy + Eq + Hash + 'static,
{
    /// Creates an empty, enabled dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            arena: ListenerArena::default(),
            index: PriorityIndex::default(),
            dirty: DirtyState::default(),
            node_listeners: HashMap::new(),
            ranks: HashMap::new(),
            pending: Vec::new(),
            deferred_removals: Vec::new(),
            names: NameTable::default(),
            in_dispatch: Rc::new(Cell::new(0)),
            enabled: true,
        }
    }

    // -------------------------------------------------------------------------
    // Master switch
    // -------------------------------------------------------------------------

    /// Whether dispatching is enabled at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Master switch; while disabled, every dispatch is a no-op.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Registers a listener with an explicit priority.
    ///
    /// Negative priorities dispatch before all scene-graph listeners,
    /// positive ones after. Priority `0` selects scene-graph mode, which
    /// needs a node this call does not take, so it is rejected; use
    /// [`add_with_scene_graph_priority`](Self::add_with_scene_graph_priority).
    ///
    /// Returns `None` (and registers nothing) when the priority is `0` or
    /// the listener fails its availability check.
    pub fn add_with_fixed_priority(
        &mut self,
        listener: impl Into<Listener<K>>,
        priority: i32,
    ) -> Option<ListenerId> {
        if priority == 0 {
            return None;
        }
        self.register(listener.into(), priority, None)
    }

    /// Registers a listener whose priority follows `node`'s place in the
    /// scene: deeper/foreground nodes hear events first.
    ///
    /// Returns `None` (and registers nothing) when the listener fails its
    /// availability check.
    pub fn add_with_scene_graph_priority(
        &mut self,
        listener: impl Into<Listener<K>>,
        node: K,
    ) -> Option<ListenerId> {
        self.register(listener.into(), 0, Some(node))
    }

    /// Registers a custom-event callback under `name` at fixed priority 1.
    pub fn add_custom(
        &mut self,
        name: &str,
        f: impl FnMut(&mut CustomEvent<'_>, &mut DispatchCtx<'_, K>) + 'static,
    ) -> Option<ListenerId> {
        self.add_with_fixed_priority(crate::listener::CustomListener::new(name, f), 1)
    }

    fn register(
        &mut self,
        listener: Listener<K>,
        fixed_priority: i32,
        node: Option<K>,
    ) -> Option<ListenerId> {
        if !listener.handlers.is_available() {
            return None;
        }
        let key = match &listener.handlers {
            Handlers::Custom { name, .. } => EventKey::Custom(self.names.intern(name)),
            other => other
                .base_key()
                .expect("non-custom handlers always carry a fixed key"),
        };

        let rec = Registered {
            key,
            fixed_priority,
            node,
            flags: ListenerFlags::ENABLED | ListenerFlags::REGISTERED,
            swallows: listener.swallows,
            claimed: SmallVec::new(),
            body: Rc::new(core::cell::RefCell::new(listener.handlers)),
        };
        let id = self.arena.insert(rec);
        if let Some(n) = node {
            self.node_listeners.entry(n).or_default().push(id);
        }

        if self.in_dispatch.get() == 0 {
            let scene_mode = fixed_priority == 0;
            self.index.insert(key, id, scene_mode);
            self.dirty.mark(
                key,
                if scene_mode {
                    DirtyFlags::SCENE_GRAPH
                } else {
                    DirtyFlags::FIXED
                },
            );
        } else {
            self.pending.push(id);
        }
        Some(id)
    }

    // -------------------------------------------------------------------------
    // Unregistration
    // -------------------------------------------------------------------------

    /// Unregisters one listener.
    ///
    /// The node back-reference is cleared and the listener muted
    /// immediately, even mid-dispatch; storage is reclaimed at once outside
    /// a dispatch and at the outermost cleanup otherwise. Stale ids are
    /// ignored.
    pub fn unregister(&mut self, id: ListenerId) {
        let Some(rec) = self.arena.get_mut(id) else {
            return;
        };
        if !rec.flags.contains(ListenerFlags::REGISTERED) {
            return;
        }
        // Clear the back-reference before any other side effect; a walk in
        // progress must never observe a node reference mid-teardown.
        let node = rec.node.take();
        rec.flags.remove(ListenerFlags::REGISTERED);
        let key = rec.key;

        if let Some(n) = node {
            self.detach_from_node(id, n);
        }

        if self.in_dispatch.get() == 0 {
            self.index.remove(key, id);
            self.arena.remove(id);
        } else if let Some(pos) = self.pending.iter().position(|&p| p == id) {
            // Still queued: it was never indexed, so nothing can have seen
            // it; purge outright.
            self.pending.remove(pos);
            self.arena.remove(id);
        } else {
            self.deferred_removals.push(id);
        }
    }

    /// Unregisters every listener attached to `node` and, if `recursive`,
    /// to its whole subtree.
    ///
    /// A runtime tearing a node down must call this before the node id is
    /// invalidated; pending (not yet indexed) listeners for the node are
    /// purged as well.
    pub fn unregister_for_node(&mut self, scene: &dyn SceneGraph<K>, node: K, recursive: bool) {
        if let Some(ids) = self.node_listeners.get(&node) {
            let ids: SmallVec<[ListenerId; 8]> = ids.iter().copied().collect();
            for id in ids {
                self.unregister(id);
            }
        }
        if recursive {
            for &child in scene.children(node) {
                self.unregister_for_node(scene, child, true);
            }
        }
    }

    /// Unregisters every listener under `key`, including pending ones.
    pub fn unregister_all_for_key(&mut self, key: EventKey) {
        let mut ids: Vec<ListenerId> = Vec::new();
        if let Some(entry) = self.index.get(key) {
            ids.extend_from_slice(&entry.fixed);
            ids.extend_from_slice(&entry.scene);
        }
        ids.extend(
            self.pending
                .iter()
                .copied()
                .filter(|&id| self.arena.get(id).is_some_and(|r| r.key == key)),
        );
        for id in ids {
            self.unregister(id);
        }
    }

    /// Unregisters every custom listener registered under `name`.
    pub fn unregister_all_custom(&mut self, name: &str) {
        if let Some(ck) = self.names.lookup(name) {
            self.unregister_all_for_key(EventKey::Custom(ck));
        }
    }

    /// Unregisters everything.
    pub fn unregister_all(&mut self) {
        let ids: Vec<ListenerId> = self.arena.ids().collect();
        for id in ids {
            self.unregister(id);
        }
        if self.in_dispatch.get() == 0 {
            // Everything is gone; drop the bookkeeping wholesale.
            self.index.clear();
            self.dirty.clear_all();
            self.node_listeners.clear();
            debug_assert!(self.arena.len() == 0, "unregister_all left live records");
        }
    }

    fn detach_from_node(&mut self, id: ListenerId, node: K) {
        if let Some(ids) = self.node_listeners.get_mut(&node) {
            ids.retain(|l| *l != id);
            if ids.is_empty() {
                self.node_listeners.remove(&node);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Listener state
    // -------------------------------------------------------------------------

    /// Whether `id` refers to a registered listener.
    #[must_use]
    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.arena
            .get(id)
            .is_some_and(|r| r.flags.contains(ListenerFlags::REGISTERED))
    }

    /// Enables or disables one listener; disabled listeners stay registered
    /// but are skipped by walks.
    pub fn set_listener_enabled(&mut self, id: ListenerId, enabled: bool) {
        if let Some(rec) = self.arena.get_mut(id) {
            rec.flags.set(ListenerFlags::ENABLED, enabled);
        }
    }

    /// Whether one listener is currently enabled.
    #[must_use]
    pub fn is_listener_enabled(&self, id: ListenerId) -> bool {
        self.arena
            .get(id)
            .is_some_and(|r| r.flags.contains(ListenerFlags::ENABLED))
    }

    /// Re-priorities a fixed-priority listener.
    ///
    /// Returns `false` without effect for scene-graph listeners (their
    /// priority follows their node), for priority `0`, and for stale ids.
    /// A change re-marks the key so the order is rebuilt before the next
    /// dispatch.
    pub fn set_fixed_priority(&mut self, id: ListenerId, priority: i32) -> bool {
        if priority == 0 {
            return false;
        }
        let Some(rec) = self.arena.get_mut(id) else {
            return false;
        };
        if rec.is_scene_mode() {
            return false;
        }
        if rec.fixed_priority != priority {
            rec.fixed_priority = priority;
            let key = rec.key;
            self.dirty.mark(key, DirtyFlags::FIXED);
        }
        true
    }

    /// Pauses every listener attached to `node` (and its subtree when
    /// `recursive`); paused listeners stay registered but silent.
    pub fn pause_listeners_for(&mut self, scene: &dyn SceneGraph<K>, node: K, recursive: bool) {
        self.set_paused_for(scene, node, recursive, true);
    }

    /// Resumes listeners paused via
    /// [`pause_listeners_for`](Self::pause_listeners_for).
    pub fn resume_listeners_for(&mut self, scene: &dyn SceneGraph<K>, node: K, recursive: bool) {
        self.set_paused_for(scene, node, recursive, false);
    }

    fn set_paused_for(&mut self, scene: &dyn SceneGraph<K>, node: K, recursive: bool, paused: bool) {
        if let Some(ids) = self.node_listeners.get(&node) {
            for &id in ids {
                if let Some(rec) = self.arena.get_mut(id) {
                    rec.flags.set(ListenerFlags::PAUSED, paused);
                }
            }
        }
        if recursive {
            for &child in scene.children(node) {
                self.set_paused_for(scene, child, true, paused);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Dirty marking
    // -------------------------------------------------------------------------

    /// Records that `node` (or anything below it) moved in z or tree
    /// position, so scene-graph priorities touching that subtree are
    /// recomputed before the next dispatch.
    ///
    /// Subtrees hosting no listeners are skipped, keeping the dirty set
    /// bounded on pure-rendering branches.
    pub fn mark_node_dirty(&mut self, scene: &dyn SceneGraph<K>, node: K) {
        if self.node_listeners.contains_key(&node) {
            self.dirty.mark_node(node);
        }
        for &child in scene.children(node) {
            self.mark_node_dirty(scene, child);
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Whether any listener is indexed under `key`.
    #[must_use]
    pub fn has_listeners(&self, key: EventKey) -> bool {
        self.index.has(key)
    }

    /// Whether any custom listener is indexed under `name`.
    #[must_use]
    pub fn has_custom_listeners(&self, name: &str) -> bool {
        self.names
            .lookup(name)
            .is_some_and(|ck| self.index.has(EventKey::Custom(ck)))
    }

    /// Number of listeners indexed under `key`.
    #[must_use]
    pub fn listener_count(&self, key: EventKey) -> usize {
        self.index.count(key)
    }

    /// Best-effort name of a custom key, for diagnostics.
    #[must_use]
    pub fn custom_name(&self, key: crate::key::CustomKey) -> Option<&str> {
        self.names.get(key)
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Dispatches `event` to its key's listeners in priority order.
    ///
    /// Touch events run the two-pool touch protocol; everything else runs
    /// the plain three-span walk. No-op while the master switch is off.
    pub fn dispatch_event(&mut self, view: SceneView<'_, K>, event: &Event<K>) {
        if !self.enabled {
            return;
        }
        let _guard = DepthGuard::enter(&self.in_dispatch);
        self.drain_dirty_nodes();
        match event {
            Event::Touch(ev) => self.dispatch_touch(view, ev),
            Event::Keyboard(ev) => {
                self.dispatch_keyed(view, EventKey::Keyboard, &mut Payload::Keyboard(ev));
            }
            Event::Mouse(ev) => {
                self.dispatch_keyed(view, EventKey::Mouse, &mut Payload::Mouse(ev));
            }
            Event::Acceleration(ev) => {
                self.dispatch_keyed(view, EventKey::Acceleration, &mut Payload::Acceleration(ev));
            }
            Event::Focus(ev) => {
                self.dispatch_keyed(view, EventKey::Focus, &mut Payload::Focus(ev));
            }
        }
    }

    /// Dispatches a named custom event carrying arbitrary user data.
    ///
    /// Listeners downcast the data through
    /// [`CustomEvent::downcast_mut`](crate::CustomEvent::downcast_mut).
    /// Unknown names (no listener was ever registered under them) are a
    /// no-op.
    pub fn dispatch_custom(&mut self, view: SceneView<'_, K>, name: &str, data: &mut dyn Any) {
        if !self.enabled {
            return;
        }
        let Some(ck) = self.names.lookup(name) else {
            return;
        };
        let _guard = DepthGuard::enter(&self.in_dispatch);
        self.drain_dirty_nodes();
        let key = EventKey::Custom(ck);
        self.dispatch_keyed(view, key, &mut Payload::Custom { name, data });
    }

    fn dispatch_keyed(&mut self, view: SceneView<'_, K>, key: EventKey, payload: &mut Payload<'_, K>) {
        let mut ranks_built = false;
        self.prepare_key(view, key, &mut ranks_built);
        let mut stopped = false;
        self.walk_generic(view, key, payload, &mut stopped);
        self.flush_mutations();
    }

    /// Drains node-level dirt into per-key scene-priority dirt. Runs once
    /// per dispatch, before any key-specific resort.
    fn drain_dirty_nodes(&mut self) {
        if !self.dirty.has_dirty_nodes() {
            return;
        }
        let nodes = self.dirty.take_nodes();
        for node in nodes {
            if let Some(ids) = self.node_listeners.get(&node) {
                for &id in ids {
                    if let Some(rec) = self.arena.get(id) {
                        self.dirty.mark(rec.key, DirtyFlags::SCENE_GRAPH);
                    }
                }
            }
        }
    }

    /// Restores `key`'s two sequences to sorted order if they are dirty.
    ///
    /// Scene ranks are rebuilt at most once per dispatch (`ranks_built`),
    /// and only when the view has a live root; without one the dirty flag
    /// stays set and the previous order is reused.
    pub(crate) fn prepare_key(
        &mut self,
        view: SceneView<'_, K>,
        key: EventKey,
        ranks_built: &mut bool,
    ) {
        if self.dirty.is_marked(key, DirtyFlags::FIXED) {
            let arena = &self.arena;
            self.index
                .resort_fixed(key, |id| arena.get(id).map_or(0, |r| r.fixed_priority));
            self.dirty.clear(key, DirtyFlags::FIXED);
        }
        if self.dirty.is_marked(key, DirtyFlags::SCENE_GRAPH) {
            let Some(root) = view.root else {
                return;
            };
            if !*ranks_built {
                let node_listeners = &self.node_listeners;
                rank::assign_ranks(
                    view.graph,
                    root,
                    |n| node_listeners.contains_key(&n),
                    &mut self.ranks,
                );
                *ranks_built = true;
            }
            let arena = &self.arena;
            let ranks = &self.ranks;
            self.index.resort_scene(key, |id| {
                arena
                    .get(id)
                    .and_then(|r| r.node)
                    .and_then(|n| ranks.get(&n))
                    .copied()
                    .unwrap_or(0)
            });
            self.dirty.clear(key, DirtyFlags::SCENE_GRAPH);
        }
    }

    pub(crate) fn arena_get(&self, id: ListenerId) -> Option<&Registered<K>> {
        self.arena.get(id)
    }

    pub(crate) fn arena_get_mut(&mut self, id: ListenerId) -> Option<&mut Registered<K>> {
        self.arena.get_mut(id)
    }

    /// Snapshots the walk order for `key`, or `None` when no listeners are
    /// indexed under it.
    pub(crate) fn segments(&self, key: EventKey) -> Option<Segments> {
        let entry = self.index.get(key)?;
        if entry.is_empty() {
            return None;
        }
        let nb = entry.negative_boundary.min(entry.fixed.len());
        Some(Segments {
            neg: entry.fixed[..nb].to_vec(),
            scene: entry.scene.clone(),
            pos: entry.fixed[nb..].to_vec(),
        })
    }

    fn walk_generic(
        &mut self,
        view: SceneView<'_, K>,
        key: EventKey,
        payload: &mut Payload<'_, K>,
        stopped: &mut bool,
    ) {
        let Some(segs) = self.segments(key) else {
            return;
        };
        for &id in &segs.neg {
            if self.deliver(view, None, id, payload, stopped) {
                return;
            }
        }
        for &id in &segs.scene {
            if self.deliver(view, None, id, payload, stopped) {
                return;
            }
        }
        for &id in &segs.pos {
            if self.deliver(view, None, id, payload, stopped) {
                return;
            }
        }
    }

    /// Invokes one listener for a generic payload; returns `true` when the
    /// event was stopped and the walk must halt.
    pub(crate) fn deliver(
        &mut self,
        view: SceneView<'_, K>,
        camera: Option<CameraId>,
        id: ListenerId,
        payload: &mut Payload<'_, K>,
        stopped: &mut bool,
    ) -> bool {
        let Some(rec) = self.arena.get(id) else {
            return false;
        };
        if !rec.is_deliverable() {
            return false;
        }
        if rec.is_scene_mode() {
            match rec.node {
                Some(n) if view.graph.is_running(n) => {}
                _ => return false,
            }
        }
        let target = rec.node;
        let body = Rc::clone(&rec.body);
        // Already borrowed ⇒ this listener's callback is running further up
        // the stack; skip it for the nested walk.
        let Ok(mut handlers) = body.try_borrow_mut() else {
            return false;
        };
        let mut ctx = DispatchCtx {
            dispatcher: &mut *self,
            view,
            target,
            camera,
            stopped: &mut *stopped,
        };
        match (&mut *handlers, payload) {
            (Handlers::Keyboard { pressed, released }, Payload::Keyboard(ev)) => {
                let slot = if ev.pressed { pressed } else { released };
                if let Some(f) = slot {
                    f(ev.key, &mut ctx);
                }
            }
            (
                Handlers::Mouse {
                    down,
                    up,
                    moved,
                    scrolled,
                },
                Payload::Mouse(ev),
            ) => {
                let slot = match ev.action {
                    MouseAction::Down(_) => down,
                    MouseAction::Up(_) => up,
                    MouseAction::Moved => moved,
                    MouseAction::Scrolled(_) => scrolled,
                };
                if let Some(f) = slot {
                    f(*ev, &mut ctx);
                }
            }
            (Handlers::Acceleration { changed }, Payload::Acceleration(ev)) => {
                changed(*ev, &mut ctx);
            }
            (Handlers::Focus { changed }, Payload::Focus(ev)) => {
                changed(*ev, &mut ctx);
            }
            (Handlers::Custom { received, .. }, Payload::Custom { name, data }) => {
                let mut event = CustomEvent {
                    name: *name,
                    data: &mut **data,
                };
                received(&mut event, &mut ctx);
            }
            (
                Handlers::TouchAllAtOnce {
                    began,
                    moved,
                    ended,
                    cancelled,
                },
                Payload::TouchBatch { phase, touches },
            ) => {
                let slot = match phase {
                    TouchPhase::Began => began,
                    TouchPhase::Moved => moved,
                    TouchPhase::Ended => ended,
                    TouchPhase::Cancelled => cancelled,
                };
                if let Some(f) = slot {
                    f(*touches, &mut ctx);
                }
            }
            // Key partitioning makes kind/payload mismatches unreachable;
            // tolerate them as a skip rather than a panic.
            _ => {}
        }
        drop(ctx);
        *stopped
    }

    /// Outermost-dispatch cleanup: erase deferred removals, evict empty key
    /// entries, and index the pending additions (marking their keys dirty).
    ///
    /// Nested dispatches leave all of this to the outermost call.
    pub(crate) fn flush_mutations(&mut self) {
        debug_assert!(self.in_dispatch.get() > 0, "cleanup runs inside dispatch");
        if self.in_dispatch.get() > 1 {
            return;
        }
        for id in core::mem::take(&mut self.deferred_removals) {
            if let Some(rec) = self.arena.get(id) {
                let key = rec.key;
                self.index.remove(key, id);
                self.arena.remove(id);
            }
        }
        self.index.evict_empty();
        for id in core::mem::take(&mut self.pending) {
            let Some(rec) = self.arena.get(id) else {
                continue;
            };
            debug_assert!(
                rec.flags.contains(ListenerFlags::REGISTERED),
                "pending listeners are purged at unregistration"
            );
            let key = rec.key;
            let scene_mode = rec.is_scene_mode();
            self.index.insert(key, id, scene_mode);
            self.dirty.mark(
                key,
                if scene_mode {
                    DirtyFlags::SCENE_GRAPH
                } else {
                    DirtyFlags::FIXED
                },
            );
        }
    }
}
