// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene collaborator contract: what the dispatcher needs from a
//! display hierarchy, and the view handed to each dispatch call.
//!
//! The dispatcher never owns scene nodes. It sees them only through this
//! trait, as copyable keys plus a handful of queries, and tolerates a node
//! disappearing between registration and dispatch (provided the embedding
//! runtime upholds the teardown contract on
//! [`Dispatcher::unregister_for_node`](crate::Dispatcher::unregister_for_node)).

use core::hash::Hash;

/// Read access to a scene hierarchy, keyed by copyable node ids.
///
/// Implementations are expected to be cheap: these queries run inside the
/// priority resolver's full-tree traversal.
pub trait SceneGraph<K: Copy> {
    /// Children of `node` in insertion order; empty for unknown nodes.
    ///
    /// The dispatcher sorts by [`local_z`](Self::local_z) itself, stably, so
    /// equal-z siblings keep this order.
    fn children(&self, node: K) -> &[K];

    /// Z-order of `node` among its siblings. Negative-z children are
    /// visited (and therefore prioritized) before their parent.
    fn local_z(&self, node: K) -> i32;

    /// Global z-order bucket of `node`; overrides natural draw order
    /// tree-wide.
    fn global_z(&self, node: K) -> f64;

    /// Whether `node` is running. Scene-graph-priority listeners are only
    /// delivered while their node is running.
    fn is_running(&self, node: K) -> bool;
}

/// A no-op scene used when dispatching without a live hierarchy.
///
/// Every node is a running leaf. Used by [`SceneView::detached`]; with it,
/// scene-graph-priority listeners keep whatever order the last resort
/// produced (or registration order before any resort).
#[derive(Copy, Clone, Debug, Default)]
pub struct Detached;

impl<K: Copy> SceneGraph<K> for Detached {
    #[inline]
    fn children(&self, _node: K) -> &[K] {
        &[]
    }

    #[inline]
    fn local_z(&self, _node: K) -> i32 {
        0
    }

    #[inline]
    fn global_z(&self, _node: K) -> f64 {
        0.0
    }

    #[inline]
    fn is_running(&self, _node: K) -> bool {
        true
    }
}

/// Identifier of a render camera, for touch dispatch layering.
///
/// Opaque to the dispatcher; it only threads the id through to listeners as
/// the "visiting camera" while the scene-graph segment of a touch walk is
/// repeated per camera.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct CameraId(pub u32);

/// The scene context for one dispatch call.
///
/// Bundles the scene access, the traversal root (if a live one exists), and
/// the visible cameras. `Copy`, so callbacks can grab it from their
/// [`DispatchCtx`](crate::DispatchCtx) and re-enter the dispatcher.
#[derive(Copy, Clone)]
pub struct SceneView<'a, K> {
    /// Scene access for priority resolution and running checks.
    pub graph: &'a dyn SceneGraph<K>,
    /// Root to resolve scene-graph priorities from. With `None`, a pending
    /// priority resort stays pending and the previous order is used.
    pub root: Option<K>,
    /// Visible cameras, topmost (drawn last) first. Empty means a single
    /// pass with no visiting camera.
    pub cameras: &'a [CameraId],
}

impl<'a, K: Copy> SceneView<'a, K> {
    /// A view over a live scene rooted at `root`, with no cameras.
    #[must_use]
    pub fn new(graph: &'a dyn SceneGraph<K>, root: K) -> Self {
        Self {
            graph,
            root: Some(root),
            cameras: &[],
        }
    }

    /// A view with no live scene: fixed-priority listeners dispatch
    /// normally, scene-graph orders are reused as-is.
    #[must_use]
    pub fn detached() -> Self {
        const DETACHED: &Detached = &Detached;
        Self {
            graph: DETACHED,
            root: None,
            cameras: &[],
        }
    }

    /// Returns this view with the given visible cameras, topmost first.
    #[must_use]
    pub fn with_cameras(mut self, cameras: &'a [CameraId]) -> Self {
        self.cameras = cameras;
        self
    }
}

impl<K: core::fmt::Debug> core::fmt::Debug for SceneView<'_, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SceneView")
            .field("root", &self.root)
            .field("cameras", &self.cameras)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_is_a_running_leaf_everywhere() {
        let view = SceneView::<u32>::detached();
        assert!(view.root.is_none());
        assert!(view.graph.children(7).is_empty());
        assert!(view.graph.is_running(7));
        assert_eq!(view.graph.local_z(7), 0);
    }

    #[test]
    fn with_cameras_replaces_the_list() {
        let cams = [CameraId(2), CameraId(1)];
        let view = SceneView::<u32>::detached().with_cameras(&cams);
        assert_eq!(view.cameras, &cams);
    }
}
