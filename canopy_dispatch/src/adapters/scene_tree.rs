// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapter for Canopy Scene.
//!
//! ## Feature
//!
//! Enable with `scene_tree_adapter`.
//!
//! Implements [`SceneGraph`] for [`SceneTree`], so a scene tree can back
//! scene-graph priority resolution directly, plus a small helper for
//! building a [`SceneView`] over a tree.

use canopy_scene::{NodeId, SceneTree};

use crate::scene::{CameraId, SceneGraph, SceneView};

impl SceneGraph<NodeId> for SceneTree {
    fn children(&self, node: NodeId) -> &[NodeId] {
        Self::children(self, node)
    }

    fn local_z(&self, node: NodeId) -> i32 {
        Self::local_z(self, node).unwrap_or(0)
    }

    fn global_z(&self, node: NodeId) -> f64 {
        Self::global_z(self, node).unwrap_or(0.0)
    }

    fn is_running(&self, node: NodeId) -> bool {
        Self::is_running(self, node)
    }
}

/// A [`SceneView`] over `tree` rooted at `root`.
#[must_use]
pub fn view<'a>(tree: &'a SceneTree, root: NodeId, cameras: &'a [CameraId]) -> SceneView<'a, NodeId> {
    SceneView::new(tree, root).with_cameras(cameras)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_scene::SceneNode;

    #[test]
    fn tree_queries_flow_through() {
        let mut tree = SceneTree::new();
        let root = tree.insert(None, SceneNode::default());
        let child = tree.insert(
            Some(root),
            SceneNode {
                local_z: -2,
                global_z: 1.5,
                ..SceneNode::default()
            },
        );
        tree.set_running(child, false);

        let graph: &dyn SceneGraph<NodeId> = &tree;
        assert_eq!(graph.children(root), &[child]);
        assert_eq!(graph.local_z(child), -2);
        assert_eq!(graph.global_z(child), 1.5);
        assert!(graph.is_running(root));
        assert!(!graph.is_running(child));

        // Stale ids degrade to neutral values.
        tree.remove(child);
        let graph: &dyn SceneGraph<NodeId> = &tree;
        assert_eq!(graph.local_z(child), 0);
        assert!(!graph.is_running(child));
    }

    #[test]
    fn view_carries_root_and_cameras() {
        let mut tree = SceneTree::new();
        let root = tree.insert(None, SceneNode::default());
        let cams = [CameraId(1)];

        let v = view(&tree, root, &cams);
        assert_eq!(v.root, Some(root));
        assert_eq!(v.cameras, &cams);
    }
}
