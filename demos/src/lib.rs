// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for the Canopy demos.

use canopy_scene::{NodeId, SceneNode, SceneTree};

/// A small stage: a root with a background layer, a play layer holding two
/// overlapping sprites, and a HUD lifted above everything via global z.
#[derive(Debug)]
pub struct Stage {
    /// The scene itself.
    pub tree: SceneTree,
    /// Stage root.
    pub root: NodeId,
    /// Background layer (local z -1).
    pub backdrop: NodeId,
    /// Sprite drawn first (behind).
    pub back_sprite: NodeId,
    /// Sprite drawn last (in front).
    pub front_sprite: NodeId,
    /// HUD node with a high global z.
    pub hud: NodeId,
}

impl Stage {
    /// Builds the stage.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = SceneTree::new();
        let root = tree.insert(None, SceneNode::default());
        let backdrop = tree.insert(
            Some(root),
            SceneNode {
                local_z: -1,
                ..SceneNode::default()
            },
        );
        let play_layer = tree.insert(Some(root), SceneNode::default());
        let back_sprite = tree.insert(Some(play_layer), SceneNode::default());
        let front_sprite = tree.insert(Some(play_layer), SceneNode::default());
        let hud = tree.insert(
            Some(root),
            SceneNode {
                global_z: 100.0,
                ..SceneNode::default()
            },
        );
        Self {
            tree,
            root,
            backdrop,
            back_sprite,
            front_sprite,
            hud,
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}
