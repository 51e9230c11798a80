// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene priority resolution: node ranks from a live-tree traversal.
//!
//! Ranks mirror draw order. The traversal is pre-order depth-first with the
//! local-z split (negative-z children before their node, the rest after);
//! visited nodes that host listeners are recorded into global-z buckets, and
//! the buckets are flattened in ascending global-z order into strictly
//! increasing ranks starting at 1. Global z wins over tree position; within
//! a bucket, traversal order breaks the tie.
//!
//! The whole tree is always descended (a subtree without listeners still
//! shapes bucket contents for its hosting descendants), but only hosting
//! nodes are recorded, which keeps the rank map bounded by listener count.
//!
//! Ranks are only meaningful between two resolutions; re-running invalidates
//! every previously returned rank.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::scene::SceneGraph;

/// Rebuilds `ranks` from a traversal of the tree under `root`.
///
/// `hosts` reports whether a node currently hosts at least one listener;
/// only such nodes receive ranks.
pub(crate) fn assign_ranks<K>(
    scene: &dyn SceneGraph<K>,
    root: K,
    hosts: impl Fn(K) -> bool,
    ranks: &mut HashMap<K, u32>,
) where
    K: Copy + Eq + Hash,
{
    let mut buckets: Vec<(f64, Vec<K>)> = Vec::new();
    visit(scene, root, &hosts, &mut buckets);

    buckets.sort_by(|a, b| a.0.total_cmp(&b.0));

    ranks.clear();
    let mut rank = 0_u32;
    for (_, nodes) in buckets {
        for node in nodes {
            rank += 1;
            ranks.insert(node, rank);
        }
    }
}

fn visit<K, F>(scene: &dyn SceneGraph<K>, node: K, hosts: &F, buckets: &mut Vec<(f64, Vec<K>)>)
where
    K: Copy + Eq + Hash,
    F: Fn(K) -> bool,
{
    let mut kids: SmallVec<[K; 16]> = SmallVec::from_slice(scene.children(node));
    // Stable, so equal-z siblings keep insertion order.
    kids.sort_by_key(|&c| scene.local_z(c));
    let split = kids
        .iter()
        .position(|&c| scene.local_z(c) >= 0)
        .unwrap_or(kids.len());

    for &child in &kids[..split] {
        visit(scene, child, hosts, buckets);
    }
    if hosts(node) {
        record(buckets, scene.global_z(node), node);
    }
    for &child in &kids[split..] {
        visit(scene, child, hosts, buckets);
    }
}

fn record<K>(buckets: &mut Vec<(f64, Vec<K>)>, z: f64, node: K) {
    // Buckets are few in practice; a linear scan beats ordering floats
    // through a map. Merging uses `==` (so -0.0 and 0.0 share a bucket);
    // the final sort uses total order.
    for (key, nodes) in buckets.iter_mut() {
        if *key == z {
            nodes.push(node);
            return;
        }
    }
    buckets.push((z, alloc::vec![node]));
}
