// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect};
use understory_layers::{LayerId, LayerStack};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

fn filled(n: usize) -> (LayerStack, Vec<LayerId>) {
    let mut stack = LayerStack::new();
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        let id = stack.open(None);
        let x = (i % 16) as f64 * 50.0;
        let y = (i / 16) as f64 * 50.0;
        stack.set_bounds(id, Rect::new(x, y, x + 120.0, y + 80.0));
        ids.push(id);
    }
    (stack, ids)
}

fn bench_open_close(c: &mut Criterion) {
    let mut group = c.benchmark_group("open_close");
    for &n in &[8usize, 64, 512] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("open_then_close_lifo_n{}", n), |b| {
            b.iter_batched(
                LayerStack::<()>::new,
                |mut stack| {
                    let ids: Vec<_> = (0..n).map(|_| stack.open(None)).collect();
                    for id in ids.into_iter().rev() {
                        black_box(stack.close(id));
                    }
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("close_random_reopen_n{}", n), |b| {
            b.iter_batched(
                || (filled(n), Rng::new(0xCAFE_F00D_DEAD_BEEF)),
                |((mut stack, mut ids), mut rng)| {
                    for _ in 0..n {
                        let slot = rng.below(ids.len());
                        stack.close(ids[slot]);
                        ids[slot] = stack.open(None);
                    }
                    black_box(stack.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    for &n in &[8usize, 64, 512] {
        let (stack, ids) = filled(n);
        group.bench_function(format!("z_index_all_n{}", n), |b| {
            b.iter(|| {
                let sum: i64 = ids
                    .iter()
                    .filter_map(|id| stack.z_index(*id))
                    .map(i64::from)
                    .sum();
                black_box(sum);
            })
        });
        group.bench_function(format!("topmost_at_n{}", n), |b| {
            b.iter(|| black_box(stack.topmost_at(Point::new(130.0, 90.0))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_open_close, bench_queries);
criterion_main!(benches);
