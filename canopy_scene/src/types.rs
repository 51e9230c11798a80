// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene tree: node identifiers, flags, and local data.

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle that stays stable across updates but
/// becomes invalid when the underlying slot is reused. It consists of a slot
/// index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that
///   slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a
///   new, distinct `NodeId`.
///
/// Use [`SceneTree::is_alive`](crate::SceneTree::is_alive) to check whether a
/// `NodeId` still refers to a live node. Stale ids never alias a different
/// live node because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Node state flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is running (its lifecycle is active; it can receive events).
        const RUNNING = 0b0000_0001;
        /// Node is visible.
        const VISIBLE = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::RUNNING | Self::VISIBLE
    }
}

/// Local data for a node.
#[derive(Clone, Copy, Debug)]
pub struct SceneNode {
    /// Z-order within the parent. Negative children are visited before the
    /// parent, the rest after; equal values keep insertion order.
    pub local_z: i32,
    /// Global z-order bucket. Overrides natural draw order tree-wide; `0.0`
    /// means "no override". Multiple nodes may share a bucket.
    pub global_z: f64,
    /// Run state and visibility.
    pub flags: NodeFlags,
}

impl Default for SceneNode {
    fn default() -> Self {
        Self {
            local_z: 0,
            global_z: 0.0,
            flags: NodeFlags::default(),
        }
    }
}
