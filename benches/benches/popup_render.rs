// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Rect, Size};
use understory_layers::{LayerStack, SharedLayerStack};
use understory_popup::basic::{BasicEngine, Measure};
use understory_popup::placement::Placement;
use understory_popup::popup::{Container, Popup, PopupContent, PopupProps};

struct Grid;

impl Measure for Grid {
    type Element = u32;
    type Container = Container<()>;

    fn element_rect(&self, id: &u32) -> Option<Rect> {
        let x = f64::from(id % 20) * 40.0;
        let y = f64::from(id / 20) * 30.0;
        Some(Rect::new(x, y, x + 36.0, y + 24.0))
    }

    fn content_size(&self, _: &Container<()>) -> Size {
        Size::new(140.0, 90.0)
    }

    fn boundary(&self) -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }
}

fn props(anchor: u32, placement: Placement) -> PopupProps<u32, (), ()> {
    PopupProps::new(PopupContent::Fixed(()))
        .with_anchor(anchor)
        .with_placement(placement)
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("popup_render");
    group.bench_function("same_anchor_rerender", |b| {
        let mut popup = Popup::new(BasicEngine::new(Grid), SharedLayerStack::default());
        popup.render(props(7, Placement::BOTTOM)).unwrap();
        b.iter(|| black_box(popup.render(props(7, Placement::BOTTOM)).unwrap()))
    });
    group.bench_function("placement_toggle", |b| {
        let mut popup = Popup::new(BasicEngine::new(Grid), SharedLayerStack::default());
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let p = if flip { Placement::TOP } else { Placement::RIGHT };
            black_box(popup.render(props(7, p)).unwrap())
        })
    });
    group.bench_function("anchor_hop", |b| {
        let mut popup = Popup::new(BasicEngine::new(Grid), SharedLayerStack::default());
        let mut anchor = 0_u32;
        b.iter(|| {
            anchor = (anchor + 1) % 400;
            black_box(popup.render(props(anchor, Placement::AUTO)).unwrap())
        })
    });
    group.bench_function("open_close_cycle_16", |b| {
        let stack = SharedLayerStack::new(LayerStack::new());
        let mut popups: Vec<_> = (0..16)
            .map(|_| Popup::new(BasicEngine::new(Grid), stack.clone()))
            .collect();
        b.iter(|| {
            for (i, popup) in popups.iter_mut().enumerate() {
                popup.render(props(i as u32, Placement::BOTTOM)).unwrap();
            }
            for popup in &mut popups {
                popup.close();
            }
            black_box(stack.borrow().len())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
