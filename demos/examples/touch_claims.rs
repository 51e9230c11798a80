// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch claims and swallowing: two overlapping sprites fight over a drag.
//!
//! Run with: `cargo run -p canopy_demos --example touch_claims`

use canopy_demos::Stage;
use canopy_dispatch::{
    Dispatcher, Event, SceneView, Touch, TouchAllAtOnceListener, TouchEvent, TouchId,
    TouchOneByOneListener, TouchPhase,
};
use kurbo::Point;

fn main() {
    let stage = Stage::new();
    let mut dispatcher = Dispatcher::new();

    // The front sprite claims and swallows: once it takes a touch, nothing
    // below it (including the batch listener) sees that touch again.
    dispatcher.add_with_scene_graph_priority(
        TouchOneByOneListener::new()
            .on_began(|touch, _| {
                // Only touches on the sprite's half of the screen count as hits.
                if touch.position.x >= 100.0 {
                    return false;
                }
                println!("front sprite claims {:?}", touch.id);
                true
            })
            .on_moved(|touch, _| println!("front sprite drags by {:?}", touch.delta()))
            .on_ended(|touch, _| println!("front sprite releases {:?}", touch.id))
            .swallow(true),
        stage.front_sprite,
    );

    // The back sprite would love a touch, but never wins the overlap.
    dispatcher.add_with_scene_graph_priority(
        TouchOneByOneListener::new().on_began(|touch, _| {
            println!("back sprite saw {:?} (front must have passed)", touch.id);
            false
        }),
        stage.back_sprite,
    );

    // The backdrop watches whatever is left of each batch.
    dispatcher.add_with_scene_graph_priority(
        TouchAllAtOnceListener::new()
            .on_began(|touches, _| println!("backdrop sees {} touch(es) begin", touches.len())),
        stage.backdrop,
    );

    let view = SceneView::new(&stage.tree, stage.root);

    let one = Touch::new(TouchId(1), Point::new(40.0, 40.0));
    let two = Touch::new(TouchId(2), Point::new(300.0, 40.0));

    println!("-- two touches go down --");
    dispatcher.dispatch_event(
        view,
        &Event::Touch(TouchEvent {
            phase: TouchPhase::Began,
            touches: vec![one, two],
        }),
    );

    println!("-- touch 1 drags --");
    let one = one.moved_to(Point::new(52.0, 47.0));
    dispatcher.dispatch_event(
        view,
        &Event::Touch(TouchEvent {
            phase: TouchPhase::Moved,
            touches: vec![one],
        }),
    );

    println!("-- touch 1 lifts --");
    dispatcher.dispatch_event(
        view,
        &Event::Touch(TouchEvent {
            phase: TouchPhase::Ended,
            touches: vec![one],
        }),
    );
}
