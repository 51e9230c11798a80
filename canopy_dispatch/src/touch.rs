// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The touch protocol: claims, swallowing, and the two listener pools.
//!
//! Touch dispatch walks two independent pools in sequence. The one-by-one
//! pool runs per touch point: a listener whose began callback returns `true`
//! claims that touch, and later phases of the touch go to the claiming
//! listener alone. A swallowing claim additionally hides the touch from
//! lower-priority listeners and from the all-at-once pool. Whatever touches
//! survive are then delivered as one batch to the all-at-once pool.
//!
//! While the scene-graph span of either pool is walked and the view lists
//! cameras, the span repeats once per camera (topmost first), with the
//! current camera exposed through
//! [`DispatchCtx::visiting_camera`](crate::DispatchCtx::visiting_camera);
//! the camera loop stops as soon as one pass consumes the event.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::hash::Hash;

use crate::dispatcher::{DispatchCtx, Payload, Segments};
use crate::key::EventKey;
use crate::listener::{Handlers, ListenerFlags, ListenerId};
use crate::scene::{CameraId, SceneView};
use crate::{Dispatcher, Touch, TouchEvent, TouchPhase};

/// How a one-by-one span ended for one touch.
enum WalkFlow {
    /// Keep walking lower-priority listeners.
    Continue,
    /// A swallowing listener claimed the touch; lower spans skip it.
    Swallowed,
    /// A callback stopped the event; the whole dispatch halts.
    Stopped,
}

impl<K> Dispatcher<K>
where
    K: Copy + Eq + Hash + 'static,
{
    pub(crate) fn dispatch_touch(&mut self, view: SceneView<'_, K>, event: &TouchEvent) {
        let mut ranks_built = false;
        self.prepare_key(view, EventKey::TouchOneByOne, &mut ranks_built);
        self.prepare_key(view, EventKey::TouchAllAtOnce, &mut ranks_built);

        let one_by_one = self.segments(EventKey::TouchOneByOne);
        let all_at_once = self.segments(EventKey::TouchAllAtOnce);
        if one_by_one.is_none() && all_at_once.is_none() {
            return;
        }

        // Touches a swallowing claim removes are hidden from the batch pool.
        let mut remaining: Vec<Touch> = event.touches.clone();
        let mut stopped = false;

        if let Some(segs) = one_by_one {
            for touch in &event.touches {
                let swallowed = self.walk_one_touch(view, &segs, event.phase, touch, &mut stopped);
                if swallowed {
                    remaining.retain(|t| t.id != touch.id);
                }
                if stopped {
                    self.flush_mutations();
                    return;
                }
            }
        }

        if let Some(segs) = all_at_once
            && !remaining.is_empty()
        {
            self.walk_touch_batch(view, &segs, event.phase, &remaining, &mut stopped);
            if stopped {
                self.flush_mutations();
                return;
            }
        }

        self.flush_mutations();
    }

    /// Walks the one-by-one pool for one touch; returns whether the touch
    /// was swallowed.
    fn walk_one_touch(
        &mut self,
        view: SceneView<'_, K>,
        segs: &Segments,
        phase: TouchPhase,
        touch: &Touch,
        stopped: &mut bool,
    ) -> bool {
        let mut flow = self.one_touch_span(view, None, &segs.neg, phase, touch, stopped);
        if matches!(flow, WalkFlow::Continue) {
            flow = self.scene_span_per_camera(view, segs, phase, touch, stopped);
        }
        if matches!(flow, WalkFlow::Continue) {
            flow = self.one_touch_span(view, None, &segs.pos, phase, touch, stopped);
        }
        matches!(flow, WalkFlow::Swallowed)
    }

    /// The scene-graph span, repeated per visible camera when any are given.
    fn scene_span_per_camera(
        &mut self,
        view: SceneView<'_, K>,
        segs: &Segments,
        phase: TouchPhase,
        touch: &Touch,
        stopped: &mut bool,
    ) -> WalkFlow {
        if view.cameras.is_empty() {
            return self.one_touch_span(view, None, &segs.scene, phase, touch, stopped);
        }
        for &camera in view.cameras {
            let flow = self.one_touch_span(view, Some(camera), &segs.scene, phase, touch, stopped);
            if !matches!(flow, WalkFlow::Continue) {
                return flow;
            }
        }
        WalkFlow::Continue
    }

    fn one_touch_span(
        &mut self,
        view: SceneView<'_, K>,
        camera: Option<CameraId>,
        ids: &[ListenerId],
        phase: TouchPhase,
        touch: &Touch,
        stopped: &mut bool,
    ) -> WalkFlow {
        for &id in ids {
            let flow = self.deliver_one_touch(view, camera, id, phase, touch, stopped);
            if !matches!(flow, WalkFlow::Continue) {
                return flow;
            }
        }
        WalkFlow::Continue
    }

    fn deliver_one_touch(
        &mut self,
        view: SceneView<'_, K>,
        camera: Option<CameraId>,
        id: ListenerId,
        phase: TouchPhase,
        touch: &Touch,
        stopped: &mut bool,
    ) -> WalkFlow {
        let Some(rec) = self.arena_get(id) else {
            return WalkFlow::Continue;
        };
        if !rec.is_deliverable() {
            return WalkFlow::Continue;
        }
        if rec.is_scene_mode() {
            match rec.node {
                Some(n) if view.graph.is_running(n) => {}
                _ => return WalkFlow::Continue,
            }
        }
        let target = rec.node;
        let already_claimed = rec.claimed.contains(&touch.id);
        let body = Rc::clone(&rec.body);
        // Already borrowed ⇒ re-entrant delivery into a running callback; skip.
        let Ok(mut handlers) = body.try_borrow_mut() else {
            return WalkFlow::Continue;
        };
        let Handlers::TouchOneByOne {
            began,
            moved,
            ended,
            cancelled,
        } = &mut *handlers
        else {
            return WalkFlow::Continue;
        };

        let mut claimed_now = false;
        {
            let mut ctx = DispatchCtx {
                dispatcher: &mut *self,
                view,
                target,
                camera,
                stopped: &mut *stopped,
            };
            match phase {
                TouchPhase::Began => {
                    if let Some(f) = began {
                        claimed_now = f(touch, &mut ctx);
                    }
                }
                // Later phases go to the claiming listener alone.
                TouchPhase::Moved if already_claimed => {
                    if let Some(f) = moved {
                        f(touch, &mut ctx);
                    }
                }
                TouchPhase::Ended if already_claimed => {
                    if let Some(f) = ended {
                        f(touch, &mut ctx);
                    }
                }
                TouchPhase::Cancelled if already_claimed => {
                    if let Some(f) = cancelled {
                        f(touch, &mut ctx);
                    }
                }
                _ => return WalkFlow::Continue,
            }
        }
        drop(handlers);

        // Claim bookkeeping runs against the possibly-mutated record: a
        // callback may have unregistered its own listener.
        let is_claimed = already_claimed || claimed_now;
        let mut swallow = false;
        if let Some(rec) = self.arena_get_mut(id) {
            let still_registered = rec.flags.contains(ListenerFlags::REGISTERED);
            match phase {
                TouchPhase::Began => {
                    // A non-swallowing claim can repeat across camera
                    // passes; record the touch once.
                    if claimed_now && still_registered && !rec.claimed.contains(&touch.id) {
                        rec.claimed.push(touch.id);
                    }
                }
                TouchPhase::Ended | TouchPhase::Cancelled => {
                    if already_claimed && still_registered {
                        rec.claimed.retain(|t| *t != touch.id);
                    }
                }
                TouchPhase::Moved => {}
            }
            swallow = is_claimed && still_registered && rec.swallows;
        }
        if *stopped {
            return WalkFlow::Stopped;
        }
        if swallow {
            return WalkFlow::Swallowed;
        }
        WalkFlow::Continue
    }

    /// Walks the all-at-once pool with the surviving batch.
    fn walk_touch_batch(
        &mut self,
        view: SceneView<'_, K>,
        segs: &Segments,
        phase: TouchPhase,
        touches: &[Touch],
        stopped: &mut bool,
    ) {
        let mut payload = Payload::TouchBatch { phase, touches };
        for &id in &segs.neg {
            if self.deliver(view, None, id, &mut payload, stopped) {
                return;
            }
        }
        if view.cameras.is_empty() {
            for &id in &segs.scene {
                if self.deliver(view, None, id, &mut payload, stopped) {
                    return;
                }
            }
        } else {
            for &camera in view.cameras {
                for &id in &segs.scene {
                    if self.deliver(view, Some(camera), id, &mut payload, stopped) {
                        return;
                    }
                }
            }
        }
        for &id in &segs.pos {
            if self.deliver(view, None, id, &mut payload, stopped) {
                return;
            }
        }
    }
}
