// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Dispatch: prioritized event delivery for scene-graph UIs.
//!
//! ## Overview
//!
//! This crate is the event dispatch core of a scene-graph runtime. It
//! registers input and custom listeners, orders them by priority (either an
//! explicit fixed number, or a rank derived from the owning node's place in
//! a live scene traversal), and delivers events to them in that order,
//! tolerating listener registration and removal *during* delivery.
//!
//! The dispatcher owns its listeners and never owns scene nodes: it sees the
//! scene only through the [`SceneGraph`] trait as copyable node keys, handed
//! in per dispatch via a [`SceneView`].
//!
//! ## Ordering
//!
//! Per dispatch key, delivery runs in three spans:
//!
//! 1. Fixed priorities below zero, ascending.
//! 2. Scene-graph-priority listeners, foreground first: ranks follow draw
//!    order (pre-order traversal with the local-z split), with global
//!    z-order buckets overriding tree position and traversal order breaking
//!    ties inside a bucket.
//! 3. Fixed priorities above zero, ascending.
//!
//! A callback that calls [`DispatchCtx::stop_propagation`] halts the walk
//! across all spans. Orders are resorted lazily: mutations mark a key dirty
//! and the scene is re-traversed at most once per dispatch.
//!
//! ## Mid-dispatch mutation
//!
//! Dispatch is single-threaded but re-entrant. Registering inside a callback
//! queues the listener; it is invisible to the walk in progress and indexed
//! when the outermost dispatch finishes. Unregistering inside a callback
//! mutes the listener at once (its node back-reference is cleared first, so
//! a walk never observes a node mid-teardown) and reclaims storage at the
//! outermost cleanup. A callback may also fire a nested dispatch.
//!
//! ## Touch
//!
//! Touch events run a two-pool protocol with claim tracking and optional
//! swallowing; see the [`Dispatcher::dispatch_event`] docs and
//! [`TouchOneByOneListener`]. With multiple render cameras, the scene-graph
//! span of a touch walk repeats once per visible camera, topmost first.
//!
//! ## Example
//!
//! ```
//! use canopy_dispatch::{
//!     CustomListener, Dispatcher, Event, KeyboardEvent, KeyboardListener, KeyCode, SceneView,
//! };
//!
//! // Node keys are whatever copyable id type the embedding runtime uses.
//! let mut dispatcher = Dispatcher::<u32>::new();
//!
//! dispatcher.add_with_fixed_priority(
//!     KeyboardListener::new().on_pressed(|key, ctx| {
//!         if key == KeyCode(27) {
//!             ctx.stop_propagation();
//!         }
//!     }),
//!     -1,
//! );
//! dispatcher.add_custom("score-changed", |event, _ctx| {
//!     if let Some(score) = event.downcast_mut::<u64>() {
//!         *score += 10;
//!     }
//! });
//!
//! let event = Event::Keyboard(KeyboardEvent { key: KeyCode(27), pressed: true });
//! dispatcher.dispatch_event(SceneView::detached(), &event);
//!
//! let mut score = 0_u64;
//! dispatcher.dispatch_custom(SceneView::detached(), "score-changed", &mut score);
//! assert_eq!(score, 10);
//! ```
//!
//! ## Adapters
//!
//! The [`adapters`] module integrates other Canopy crates:
//!
//! - **Scene Tree Adapter** (`scene_tree_adapter` feature): implements
//!   [`SceneGraph`] for `canopy_scene::SceneTree`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapters;
mod dirty;
mod dispatcher;
mod event;
mod key;
mod listener;
mod priority;
mod rank;
mod scene;
mod touch;

pub use dispatcher::{DispatchCtx, Dispatcher};
pub use event::{
    AccelerationEvent, CustomEvent, Event, FocusEvent, KeyCode, KeyboardEvent, MouseAction,
    MouseButton, MouseEvent, Touch, TouchEvent, TouchId, TouchPhase,
};
pub use key::{CustomKey, EventKey};
pub use listener::{
    AccelerationListener, CustomListener, FocusListener, KeyboardListener, Listener, ListenerId,
    MouseListener, TouchAllAtOnceListener, TouchOneByOneListener,
};
pub use scene::{CameraId, Detached, SceneGraph, SceneView};
