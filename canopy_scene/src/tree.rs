// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, updates, queries.

use alloc::vec::Vec;

use crate::types::{NodeFlags, NodeId, SceneNode};

/// A scene hierarchy with per-node z-orders and run state.
///
/// Nodes live in a slot arena; [`NodeId`]s are slot + generation handles.
/// Structure mutations (insert/remove/reparent) take effect immediately;
/// there is no commit step, because this tree carries no derived world-space
/// data to rebuild.
///
/// ## Example
///
/// ```
/// use canopy_scene::{SceneNode, SceneTree};
///
/// let mut tree = SceneTree::new();
/// let root = tree.insert(None, SceneNode::default());
/// let a = tree.insert(Some(root), SceneNode { local_z: 1, ..SceneNode::default() });
/// let b = tree.insert(Some(root), SceneNode { local_z: -1, ..SceneNode::default() });
///
/// // Children keep insertion order; callers sort by z when they care.
/// assert_eq!(tree.children(root), &[a, b]);
/// assert_eq!(tree.local_z(b), Some(-1));
/// ```
pub struct SceneTree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl core::fmt::Debug for SceneTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("SceneTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: SceneNode,
}

impl Node {
    fn new(generation: u32, local: SceneNode) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
        }
    }
}

impl SceneTree {
    /// Create a new empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Insert a new node as a child of `parent` (or as a root if `None`).
    pub fn insert(&mut self, parent: Option<NodeId>, local: SceneNode) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent {
            self.link_parent(id, p);
        }
        id
    }

    /// Remove a node and its subtree.
    ///
    /// The removed ids become stale immediately. Listeners registered for
    /// the subtree are the caller's responsibility; unregister them first.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        self.remove_subtree(id);
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let children = core::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.remove_subtree(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Reparent `id` under `new_parent` (or detach it into a root if `None`).
    ///
    /// The node is appended to the new parent's child list, i.e. it takes a
    /// fresh insertion position among its new siblings.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
    }

    /// Update local z-order.
    pub fn set_local_z(&mut self, id: NodeId, z: i32) {
        if let Some(n) = self.node_opt_mut(id)
            && n.local.local_z != z
        {
            n.local.local_z = z;
        }
    }

    /// Update global z-order.
    pub fn set_global_z(&mut self, id: NodeId, z: f64) {
        if let Some(n) = self.node_opt_mut(id)
            && n.local.global_z != z
        {
            n.local.global_z = z;
        }
    }

    /// Set or clear the running flag.
    pub fn set_running(&mut self, id: NodeId, running: bool) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags.set(NodeFlags::RUNNING, running);
        }
    }

    /// Update node flags wholesale.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.flags = flags;
        }
    }

    /// Whether `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        matches!(
            self.nodes.get(id.idx()),
            Some(Some(n)) if n.generation == id.1
        )
    }

    /// Children of a live node in insertion order; empty for stale ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node_opt(id) {
            Some(n) => &n.children,
            None => &[],
        }
    }

    /// Parent of a live node, or `None` for roots and stale ids.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Local z-order, or `None` for stale ids.
    #[must_use]
    pub fn local_z(&self, id: NodeId) -> Option<i32> {
        self.node_opt(id).map(|n| n.local.local_z)
    }

    /// Global z-order, or `None` for stale ids.
    #[must_use]
    pub fn global_z(&self, id: NodeId) -> Option<f64> {
        self.node_opt(id).map(|n| n.local.global_z)
    }

    /// Whether a live node is running; `false` for stale ids.
    #[must_use]
    pub fn is_running(&self, id: NodeId) -> bool {
        self.node_opt(id)
            .is_some_and(|n| n.local.flags.contains(NodeFlags::RUNNING))
    }

    /// Node flags, or `None` for stale ids.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node_opt(id).map(|n| n.local.flags)
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Whether the tree has no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over live roots (nodes without a parent).
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref().filter(|n| n.parent.is_none()).map(|n| {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "NodeId uses 32-bit indices by design."
                )]
                NodeId::new(i as u32, n.generation)
            })
        })
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        debug_assert!(self.is_alive(parent), "parent must be alive");
        self.node_mut(parent).children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let children = &mut self.node_mut(parent).children;
        if let Some(pos) = children.iter().position(|&c| c == id) {
            children.remove(pos);
        }
        self.node_mut(id).parent = None;
    }

    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        match self.nodes.get(id.idx()) {
            Some(Some(n)) if n.generation == id.1 => Some(n),
            _ => None,
        }
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        match self.nodes.get_mut(id.idx()) {
            Some(Some(n)) if n.generation == id.1 => Some(n),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn insert_and_children_order() {
        let mut tree = SceneTree::new();
        let root = tree.insert(None, SceneNode::default());
        let a = tree.insert(Some(root), SceneNode::default());
        let b = tree.insert(Some(root), SceneNode::default());

        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn remove_subtree_frees_all() {
        let mut tree = SceneTree::new();
        let root = tree.insert(None, SceneNode::default());
        let mid = tree.insert(Some(root), SceneNode::default());
        let leaf = tree.insert(Some(mid), SceneNode::default());

        tree.remove(mid);

        assert!(tree.is_alive(root));
        assert!(!tree.is_alive(mid));
        assert!(!tree.is_alive(leaf));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn stale_ids_never_alias() {
        let mut tree = SceneTree::new();
        let root = tree.insert(None, SceneNode::default());
        let old = tree.insert(Some(root), SceneNode::default());
        tree.remove(old);

        // Reuses the freed slot with a bumped generation.
        let new = tree.insert(Some(root), SceneNode::default());
        assert_eq!(old.0, new.0);
        assert_ne!(old, new);
        assert!(!tree.is_alive(old));
        assert!(tree.is_alive(new));
        assert_eq!(tree.children(old), &[]);
    }

    #[test]
    fn reparent_moves_to_tail() {
        let mut tree = SceneTree::new();
        let root = tree.insert(None, SceneNode::default());
        let a = tree.insert(Some(root), SceneNode::default());
        let b = tree.insert(Some(root), SceneNode::default());

        tree.reparent(a, Some(root));
        assert_eq!(tree.children(root), &[b, a]);

        tree.reparent(a, None);
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.parent(a), None);
        let roots: Vec<_> = tree.roots().collect();
        assert!(roots.contains(&a) && roots.contains(&root));
    }

    #[test]
    fn z_and_flag_setters() {
        let mut tree = SceneTree::new();
        let n = tree.insert(None, SceneNode::default());

        tree.set_local_z(n, -3);
        tree.set_global_z(n, 4.5);
        assert_eq!(tree.local_z(n), Some(-3));
        assert_eq!(tree.global_z(n), Some(4.5));

        assert!(tree.is_running(n));
        tree.set_running(n, false);
        assert!(!tree.is_running(n));
        tree.set_running(n, true);
        assert!(tree.is_running(n));
    }

    #[test]
    fn setters_on_stale_ids_are_noops() {
        let mut tree = SceneTree::new();
        let n = tree.insert(None, SceneNode::default());
        tree.remove(n);

        tree.set_local_z(n, 7);
        tree.set_running(n, false);
        assert_eq!(tree.local_z(n), None);
        assert!(!tree.is_running(n));
        assert!(tree.is_empty());
    }
}
