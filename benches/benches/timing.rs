// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use understory_timing::{Debouncer, Scheduler, TimerQueue};

fn bench_schedule_and_drain(c: &mut Criterion) {
    c.bench_function("timing/schedule_and_drain_10k", |b| {
        b.iter(|| {
            let mut queue = TimerQueue::new();
            for i in 0..10_000_u64 {
                queue.schedule_at((i * 7919) % 10_000);
            }
            let mut fired = 0_u32;
            while queue.pop_due(10_000).is_some() {
                fired += 1;
            }
            black_box(fired)
        });
    });
}

fn bench_cancel_churn(c: &mut Criterion) {
    // Mirrors a velocity decay timer: every sample cancels the previous one.
    c.bench_function("timing/cancel_churn_10k", |b| {
        b.iter(|| {
            let mut queue = TimerQueue::new();
            let mut pending = None;
            for now in 0..10_000_u64 {
                queue.set_now(now);
                if let Some(id) = pending.take() {
                    queue.clear_timeout(id);
                }
                pending = Some(queue.set_timeout(Duration::from_millis(50)));
            }
            black_box(queue.next_deadline())
        });
    });
}

fn bench_debounce(c: &mut Criterion) {
    c.bench_function("timing/debounce_burst_10k", |b| {
        b.iter(|| {
            let mut queue = TimerQueue::new();
            let mut debounce = Debouncer::new(Duration::from_millis(300));
            for now in 0..10_000_u64 {
                queue.set_now(now * 10);
                debounce.call(&mut queue);
            }
            let id = queue.pop_due(u64::MAX);
            black_box(id.is_some_and(|id| debounce.on_timer(id)))
        });
    });
}

criterion_group!(
    benches,
    bench_schedule_and_drain,
    bench_cancel_churn,
    bench_debounce
);
criterion_main!(benches);
