// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Scene: a minimal scene tree for event routing.
//!
//! This crate models just enough of a display hierarchy for priority
//! resolution: parent/child structure, per-node local and global z-orders,
//! and a running flag. It carries no geometry, no layout, and no rendering;
//! those belong to other layers. `canopy_dispatch` consumes this tree (via
//! its `SceneGraph` trait and the `scene_tree_adapter` feature) to derive
//! scene-graph dispatch priorities.
//!
//! ## Identity
//!
//! Nodes are addressed by [`NodeId`], a slot + generation handle. Removing a
//! node frees its slot; a stale id never aliases a different live node
//! because the generation must match.
//!
//! ## Ordering
//!
//! - `local_z` orders a node among its siblings (negative draws, and is
//!   visited, before the parent).
//! - `global_z` overrides natural draw order across the whole tree
//!   (e.g. for overlay layers); nodes sharing a global z keep traversal
//!   order among themselves.
//!
//! [`SceneTree::children`] returns children in insertion order; consumers
//! that need z-sorted children sort on their side, keeping this crate free
//! of ordering policy.
//!
//! ## Example
//!
//! ```
//! use canopy_scene::{SceneNode, SceneTree};
//!
//! let mut tree = SceneTree::new();
//! let root = tree.insert(None, SceneNode::default());
//! let hud = tree.insert(Some(root), SceneNode { global_z: 10.0, ..SceneNode::default() });
//!
//! assert_eq!(tree.children(root), &[hud]);
//! assert_eq!(tree.global_z(hud), Some(10.0));
//!
//! tree.remove(hud);
//! assert!(!tree.is_alive(hud));
//! ```
//!
//! ## Teardown contract
//!
//! Removing a node does not notify any dispatcher. An embedding runtime
//! that registered scene-graph-priority listeners for a node must
//! unregister them (`canopy_dispatch::Dispatcher::unregister_for_node`)
//! before calling [`SceneTree::remove`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod tree;
mod types;

pub use tree::SceneTree;
pub use types::{NodeFlags, NodeId, SceneNode};
