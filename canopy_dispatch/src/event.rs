// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event payload types.
//!
//! The dispatcher is generic over these payloads: it never interprets them
//! beyond selecting the dispatch key and the per-kind callback slot. Payload
//! semantics (what a key code means, how touch ids are assigned) belong to
//! the embedding platform layer.

use alloc::vec::Vec;
use core::any::Any;

use kurbo::{Point, Vec2};

/// Identity of one touch point across its began → ended/cancelled lifetime.
///
/// Assigned by the platform layer; the dispatcher only compares ids.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TouchId(pub u64);

/// Phase of a touch event batch.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TouchPhase {
    /// Touch points went down.
    Began,
    /// Touch points moved.
    Moved,
    /// Touch points lifted.
    Ended,
    /// Touch points were cancelled by the system.
    Cancelled,
}

/// One touch point within a [`TouchEvent`].
#[derive(Copy, Clone, Debug)]
pub struct Touch {
    /// Stable identity of this touch point.
    pub id: TouchId,
    /// Current position.
    pub position: Point,
    /// Position at the previous event for this touch.
    pub previous: Point,
    /// Position where the touch began.
    pub start: Point,
}

impl Touch {
    /// Creates a touch that just began at `position`.
    #[must_use]
    pub fn new(id: TouchId, position: Point) -> Self {
        Self {
            id,
            position,
            previous: position,
            start: position,
        }
    }

    /// Returns a copy advanced to `position`, shifting the previous position.
    #[must_use]
    pub fn moved_to(self, position: Point) -> Self {
        Self {
            previous: self.position,
            position,
            ..self
        }
    }

    /// Movement since the previous event.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.position - self.previous
    }

    /// Total offset from where the touch began.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.position - self.start
    }
}

/// A batch of touch points sharing one phase.
#[derive(Clone, Debug)]
pub struct TouchEvent {
    /// What happened to the touches in this batch.
    pub phase: TouchPhase,
    /// The in-flight touch points this event describes.
    pub touches: Vec<Touch>,
}

/// A platform key code.
///
/// Intentionally open-ended: the dispatcher never interprets the value, so
/// embedders map their platform's codes directly.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct KeyCode(pub u32);

/// A key press or release.
#[derive(Copy, Clone, Debug)]
pub struct KeyboardEvent {
    /// Which key.
    pub key: KeyCode,
    /// `true` for press, `false` for release.
    pub pressed: bool,
}

/// Mouse button identity.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Middle button / wheel click.
    Middle,
    /// Any other button, by platform index.
    Other(u8),
}

/// What a mouse event describes.
#[derive(Copy, Clone, Debug)]
pub enum MouseAction {
    /// A button went down.
    Down(MouseButton),
    /// A button went up.
    Up(MouseButton),
    /// The pointer moved.
    Moved,
    /// The wheel scrolled by the given amount.
    Scrolled(Vec2),
}

/// A mouse event.
#[derive(Copy, Clone, Debug)]
pub struct MouseEvent {
    /// What happened.
    pub action: MouseAction,
    /// Pointer position at the time of the event.
    pub position: Point,
}

/// A device acceleration sample.
#[derive(Copy, Clone, Debug, Default)]
pub struct AccelerationEvent {
    /// Acceleration along x, in g.
    pub x: f64,
    /// Acceleration along y, in g.
    pub y: f64,
    /// Acceleration along z, in g.
    pub z: f64,
    /// Platform timestamp, in seconds.
    pub timestamp: f64,
}

/// A widget focus transition.
#[derive(Copy, Clone, Debug)]
pub struct FocusEvent<K> {
    /// Node losing focus, if any.
    pub lost: Option<K>,
    /// Node gaining focus, if any.
    pub gained: Option<K>,
}

/// An input event routed through [`Dispatcher::dispatch_event`].
///
/// Custom events have their own entry point,
/// [`Dispatcher::dispatch_custom`], because they carry a borrowed name and
/// user data.
///
/// [`Dispatcher::dispatch_event`]: crate::Dispatcher::dispatch_event
/// [`Dispatcher::dispatch_custom`]: crate::Dispatcher::dispatch_custom
#[derive(Clone, Debug)]
pub enum Event<K> {
    /// A touch batch; dispatched through both touch pools.
    Touch(TouchEvent),
    /// A key press or release.
    Keyboard(KeyboardEvent),
    /// A mouse event.
    Mouse(MouseEvent),
    /// An acceleration sample.
    Acceleration(AccelerationEvent),
    /// A focus transition.
    Focus(FocusEvent<K>),
}

/// A named user-defined event, as seen by a custom listener.
///
/// The user data is whatever the producer passed to
/// [`Dispatcher::dispatch_custom`](crate::Dispatcher::dispatch_custom);
/// listeners downcast it to the concrete type they expect.
pub struct CustomEvent<'e> {
    pub(crate) name: &'e str,
    pub(crate) data: &'e mut dyn Any,
}

impl CustomEvent<'_> {
    /// The event name this listener was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }

    /// The user data, downcast to `T` if that is its concrete type.
    #[must_use]
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.data.downcast_mut::<T>()
    }

    /// The raw user data.
    pub fn data(&mut self) -> &mut dyn Any {
        self.data
    }
}

impl core::fmt::Debug for CustomEvent<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CustomEvent")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
