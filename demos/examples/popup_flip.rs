// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A dropdown that flips when its anchor scrolls toward the bottom of the viewport.
//!
//! The popup keeps one engine session while the anchor moves; the placement callback fires only
//! when the engine settles on a different side.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example popup_flip`

use std::cell::Cell;
use std::rc::Rc;

use kurbo::{Rect, Size};
use understory_layers::{LayerStack, SharedLayerStack};
use understory_popup::basic::{BasicEngine, Measure};
use understory_popup::engine::{EngineConfig, Session};
use understory_popup::placement::Placement;
use understory_popup::popup::{Container, Popup, PopupContent, PopupProps};

/// A page with one button whose vertical position follows the scroll offset.
struct Page {
    scroll: Cell<f64>,
}

impl Measure for Page {
    type Element = &'static str;
    type Container = Container<()>;

    fn element_rect(&self, id: &&'static str) -> Option<Rect> {
        let y = 400.0 - self.scroll.get();
        (*id == "menu-button").then_some(Rect::new(40.0, y, 140.0, y + 30.0))
    }

    fn content_size(&self, _: &Container<()>) -> Size {
        Size::new(160.0, 120.0)
    }

    fn boundary(&self) -> Rect {
        Rect::new(0.0, 0.0, 640.0, 480.0)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let page = Rc::new(Page {
        scroll: Cell::new(300.0),
    });
    let stack = SharedLayerStack::new(LayerStack::new());
    let mut popup = Popup::new(BasicEngine::shared(page.clone()), stack);

    let props = || {
        PopupProps::new(PopupContent::computed(|p| match p {
            Some(p) => format!("menu ({p})"),
            None => "menu".to_string(),
        }))
        .with_anchor("menu-button")
        .with_placement(Placement::BOTTOM)
        .with_options(EngineConfig::default().with_offset(4.0, 0.0))
        .with_placement_callback(|p| println!("  placement changed: {p}"))
    };

    for scroll in [300.0, 200.0, 100.0, 0.0, -50.0] {
        page.scroll.set(scroll);
        if let Some(session) = popup.session_mut() {
            // Scrolling moves the anchor; ask the live session to recompute.
            session.update();
        }
        let out = popup
            .render(props())
            .expect("top-level layers always register")
            .expect("popup is open");
        println!(
            "scroll {scroll:>6}: {} at {:?}",
            out.content,
            popup.adapter().rect()
        );
    }
}
