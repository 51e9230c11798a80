// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch basics: fixed vs scene-graph priorities, stop, custom events.
//!
//! Run with: `cargo run -p canopy_demos --example dispatch_basics`

use canopy_demos::Stage;
use canopy_dispatch::{
    CustomListener, Dispatcher, Event, KeyCode, KeyboardEvent, KeyboardListener, SceneView,
};

fn main() {
    let stage = Stage::new();
    let mut dispatcher = Dispatcher::new();

    // A negative fixed priority runs before anything scene-derived; think
    // "global hotkey hook".
    dispatcher.add_with_fixed_priority(
        KeyboardListener::new().on_pressed(|key, ctx| {
            println!("hook      key={key:?}");
            if key == KeyCode(27) {
                println!("hook      escape pressed, stopping propagation");
                ctx.stop_propagation();
            }
        }),
        -10,
    );

    // Scene listeners order themselves by draw order: the HUD (global z 100)
    // outranks both sprites, the front sprite outranks the back one.
    for (name, node) in [
        ("hud", stage.hud),
        ("back    ", stage.back_sprite),
        ("front   ", stage.front_sprite),
    ] {
        dispatcher.add_with_scene_graph_priority(
            KeyboardListener::new().on_pressed(move |_, _| println!("{name}  heard the key")),
            node,
        );
    }

    // A custom event with user data.
    dispatcher.add_custom("score-changed", |event, _| {
        if let Some(score) = event.downcast_mut::<u64>() {
            println!("scoreboard now shows {score}");
        }
    });

    let view = SceneView::new(&stage.tree, stage.root);

    println!("-- plain key press --");
    let press = Event::Keyboard(KeyboardEvent {
        key: KeyCode(32),
        pressed: true,
    });
    dispatcher.dispatch_event(view, &press);

    println!("-- escape (hook stops it) --");
    let escape = Event::Keyboard(KeyboardEvent {
        key: KeyCode(27),
        pressed: true,
    });
    dispatcher.dispatch_event(view, &escape);

    println!("-- custom event --");
    let mut score = 1200_u64;
    dispatcher.dispatch_custom(view, "score-changed", &mut score);
}
