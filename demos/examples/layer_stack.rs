// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacking several popups in one layer stack.
//!
//! Opens a menu, a nested submenu, and a tooltip; closes the menu from the middle of the stack
//! and shows that the others keep their relative order. Also queries the top-most popup under a
//! point, as outside-click handling would.
//!
//! Run:
//! - `cargo run -p understory_demos --example layer_stack`

use kurbo::{Point, Rect};
use understory_layers::{LayerFlags, LayerStack};

fn dump(stack: &LayerStack<&'static str>) {
    for id in stack.order() {
        println!(
            "  z={} owner={:?} parent={:?}",
            stack.z_index(id).unwrap_or_default(),
            stack.owner(id),
            stack.parent(id).and_then(|p| stack.owner(p)),
        );
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut stack = LayerStack::with_base_z(500);
    let menu = stack.open(Some("menu"));
    let submenu = stack
        .open_nested(menu, Some("submenu"))
        .expect("menu is open");
    let tooltip = stack.open(Some("tooltip"));

    stack.set_bounds(menu, Rect::new(0.0, 0.0, 200.0, 300.0));
    stack.set_bounds(submenu, Rect::new(180.0, 40.0, 380.0, 200.0));
    stack.set_bounds(tooltip, Rect::new(150.0, 100.0, 250.0, 130.0));
    println!("three layers:");
    dump(&stack);

    let pt = Point::new(190.0, 110.0);
    println!("top-most at {pt:?}: {:?}", stack.topmost_at(pt).and_then(|id| stack.owner(id)));
    stack.set_flags(tooltip, LayerFlags::VISIBLE);
    println!(
        "with the tooltip unpickable: {:?}",
        stack.topmost_at(pt).and_then(|id| stack.owner(id))
    );

    println!("descendants of menu: {}", stack.descendants(menu).len());
    stack.close(menu);
    println!("after closing the menu:");
    dump(&stack);
}
