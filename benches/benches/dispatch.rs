// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use canopy_dispatch::{
    Dispatcher, Event, KeyCode, KeyboardEvent, KeyboardListener, SceneView,
};
use canopy_scene::{NodeId, SceneNode, SceneTree};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn next_i32_nonzero(&mut self, span: i32) -> i32 {
        let v = (self.next_u32() as i32 % span) - span / 2;
        if v == 0 { 1 } else { v }
    }
}

fn key_press() -> Event<NodeId> {
    Event::Keyboard(KeyboardEvent {
        key: KeyCode(13),
        pressed: true,
    })
}

fn fixed_dispatcher(n: u32, seed: u64) -> Dispatcher<NodeId> {
    let mut rng = Lcg::new(seed);
    let mut d = Dispatcher::new();
    for _ in 0..n {
        d.add_with_fixed_priority(
            KeyboardListener::new().on_pressed(|key, _| {
                black_box(key);
            }),
            rng.next_i32_nonzero(1000),
        );
    }
    d
}

/// A wide tree: `fanout` children under the root, each with `depth` chained
/// descendants; every leaf hosts one listener.
fn scene_fixture(fanout: u32, depth: u32, seed: u64) -> (SceneTree, Dispatcher<NodeId>) {
    let mut rng = Lcg::new(seed);
    let mut tree = SceneTree::new();
    let root = tree.insert(None, SceneNode::default());
    let mut d = Dispatcher::new();
    for _ in 0..fanout {
        let mut node = tree.insert(
            Some(root),
            SceneNode {
                local_z: (rng.next_u32() % 7) as i32 - 3,
                ..SceneNode::default()
            },
        );
        for _ in 0..depth {
            node = tree.insert(Some(node), SceneNode::default());
        }
        d.add_with_scene_graph_priority(
            KeyboardListener::new().on_pressed(|key, _| {
                black_box(key);
            }),
            node,
        );
    }
    (tree, d)
}

fn bench_fixed_resort(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_resort_then_dispatch");
    for n in [64_u32, 1024] {
        group.bench_function(format!("n{n}"), |b| {
            b.iter_batched_ref(
                || fixed_dispatcher(n, 42),
                |d| d.dispatch_event(SceneView::detached(), &key_press()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_sorted_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorted_dispatch");
    for n in [64_u32, 1024] {
        let mut d = fixed_dispatcher(n, 42);
        // First dispatch sorts; the measured ones walk a clean order.
        d.dispatch_event(SceneView::detached(), &key_press());
        group.bench_function(format!("n{n}"), |b| {
            b.iter(|| d.dispatch_event(SceneView::detached(), &key_press()));
        });
    }
    group.finish();
}

fn bench_scene_rank_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_rank_rebuild_then_dispatch");
    for fanout in [64_u32, 512] {
        let (tree, mut d) = scene_fixture(fanout, 3, 7);
        let root = tree.roots().next().expect("fixture always has a root");
        group.bench_function(format!("leaves{fanout}"), |b| {
            b.iter(|| {
                // Invalidate the whole tree so every dispatch re-ranks.
                d.mark_node_dirty(&tree, root);
                d.dispatch_event(SceneView::new(&tree, root), &key_press());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_fixed_resort,
    bench_sorted_dispatch,
    bench_scene_rank_rebuild
);
criterion_main!(benches);
