// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Size};
use understory_exit_intent::headless::{HeadlessPlatform, MemoryStorage};
use understory_exit_intent::platform::Event;
use understory_exit_intent::{Config, ExitIntent};

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

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * f64::from(self.next_u32()) / f64::from(u32::MAX)
    }
}

/// A wandering pointer that stays clear of every edge, so nothing fires.
fn interior_trace(len: usize, seed: u64) -> Vec<Event> {
    let mut rng = Lcg::new(seed);
    (0..len)
        .map(|_| Event::PointerMove {
            position: Point::new(rng.range(100.0, 1_180.0), rng.range(100.0, 700.0)),
        })
        .collect()
}

fn armed(config: Config) -> ExitIntent<HeadlessPlatform, MemoryStorage> {
    let platform =
        HeadlessPlatform::new(Size::new(1_280.0, 800.0)).with_document_height(10_000.0);
    let mut intent = ExitIntent::new(config, platform, MemoryStorage::new()).unwrap();
    intent.mounted();
    intent
}

fn bench_pointer_moves(c: &mut Criterion) {
    let trace = interior_trace(10_000, 0xE417);
    c.bench_function("exit_intent/pointer_moves_10k", |b| {
        b.iter_batched(
            || armed(Config::default()),
            |mut intent| {
                for event in &trace {
                    intent.handle_event(black_box(event));
                }
                black_box(intent.is_showing())
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_moves_with_decay(c: &mut Criterion) {
    let trace = interior_trace(2_000, 0xDECA);
    c.bench_function("exit_intent/moves_with_decay_2k", |b| {
        b.iter_batched(
            || armed(Config::default()),
            |mut intent| {
                for (i, event) in trace.iter().enumerate() {
                    intent.handle_event(event);
                    // Every fourth sample arrives after the velocity has decayed.
                    let step = if i % 4 == 0 { 60 } else { 16 };
                    let now = intent.platform().elapsed_millis();
                    intent.advance_to(now + step);
                }
                black_box(intent.pointer().velocity())
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_scroll_burst(c: &mut Criterion) {
    let config = Config::default().with_scroll_percentage_to_trigger(90.0);
    c.bench_function("exit_intent/scroll_burst_1k", |b| {
        b.iter_batched(
            || armed(config.clone()),
            |mut intent| {
                for i in 0..1_000_u32 {
                    intent
                        .platform_mut()
                        .set_scroll_offset(f64::from(i) * 5.0);
                    intent.handle_event(&Event::Scroll);
                    let now = intent.platform().elapsed_millis();
                    intent.advance_to(now + 16);
                }
                intent.advance_by(core::time::Duration::from_millis(300));
                black_box(intent.is_showing())
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_setup(c: &mut Criterion) {
    let config = Config::default()
        .with_scroll_percentage_to_trigger(50.0)
        .with_delay_seconds_and_trigger(10.0);
    c.bench_function("exit_intent/setup_and_unsubscribe", |b| {
        b.iter(|| {
            let mut intent = armed(config.clone());
            intent.unsubscribe();
            black_box(intent.into_parts())
        });
    });
}

criterion_group!(
    benches,
    bench_pointer_moves,
    bench_moves_with_decay,
    bench_scroll_burst,
    bench_setup
);
criterion_main!(benches);
