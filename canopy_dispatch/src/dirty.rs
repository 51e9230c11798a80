// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty state: which key orders are stale, and which nodes moved.
//!
//! Resorting is deferred rather than eager on every add/remove/reorder:
//! scene traversal costs O(visited nodes) and must not run more than once
//! per dispatch no matter how many mutations happened since the last one.
//! Node-level dirtiness is collected globally and drained into per-key
//! scene-priority dirt lazily, right before a dispatch needs the key.

use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

use crate::key::EventKey;

bitflags::bitflags! {
    /// Which of a key's two sequences need resorting.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) struct DirtyFlags: u8 {
        /// The fixed-priority sequence is out of order.
        const FIXED       = 0b0000_0001;
        /// The scene-graph-priority sequence is out of order.
        const SCENE_GRAPH = 0b0000_0010;
    }
}

/// Per-key dirty flags plus the global dirty-node set.
#[derive(Debug)]
pub(crate) struct DirtyState<K> {
    key_flags: HashMap<EventKey, DirtyFlags>,
    /// Nodes whose listeners may need re-ranking; drained once per dispatch.
    nodes: HashSet<K>,
}

impl<K> Default for DirtyState<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self {
            key_flags: HashMap::new(),
            nodes: HashSet::new(),
        }
    }
}

impl<K> DirtyState<K>
where
    K: Copy + Eq + Hash,
{
    /// ORs `flags` into the key's dirty bits.
    pub(crate) fn mark(&mut self, key: EventKey, flags: DirtyFlags) {
        *self.key_flags.entry(key).or_insert(DirtyFlags::empty()) |= flags;
    }

    /// Whether any of `flags` is set for `key`.
    pub(crate) fn is_marked(&self, key: EventKey, flags: DirtyFlags) -> bool {
        self.key_flags
            .get(&key)
            .is_some_and(|f| f.intersects(flags))
    }

    /// Clears `flags` for `key`.
    pub(crate) fn clear(&mut self, key: EventKey, flags: DirtyFlags) {
        if let Some(f) = self.key_flags.get_mut(&key) {
            f.remove(flags);
            if f.is_empty() {
                self.key_flags.remove(&key);
            }
        }
    }

    /// Records a node whose priority may have changed.
    pub(crate) fn mark_node(&mut self, node: K) {
        self.nodes.insert(node);
    }

    pub(crate) fn has_dirty_nodes(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Takes the dirty-node set, leaving it empty.
    pub(crate) fn take_nodes(&mut self) -> HashSet<K> {
        core::mem::take(&mut self.nodes)
    }

    pub(crate) fn clear_all(&mut self) {
        self.key_flags.clear();
        self.nodes.clear();
    }
}
