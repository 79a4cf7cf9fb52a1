// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

use crate::{Scheduler, TimerId};

/// Trailing-edge debouncer.
///
/// Every [`call`](Self::call) cancels the pending timeout (if any) and
/// schedules a fresh one `wait` in the future. When the host reports that
/// timeout as expired, [`on_timer`](Self::on_timer) returns `true` exactly
/// once; that is the moment to run the debounced action.
///
/// The action itself is not stored here. Callers usually need mutable access
/// to their own state when it runs, which a stored closure would make awkward.
#[derive(Clone, Debug)]
pub struct Debouncer {
    wait: Duration,
    pending: Option<TimerId>,
}

impl Debouncer {
    /// Creates a debouncer with the given quiet window.
    #[must_use]
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    /// The quiet window.
    #[must_use]
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Returns `true` while a trailing invocation is scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Records a call, restarting the quiet window.
    pub fn call(&mut self, scheduler: &mut impl Scheduler) {
        if let Some(id) = self.pending.take() {
            scheduler.clear_timeout(id);
        }
        self.pending = Some(scheduler.set_timeout(self.wait));
    }

    /// Handles an expired timer.
    ///
    /// Returns `true` if `id` is this debouncer's pending timeout, meaning the
    /// debounced action should run now. Any other id is ignored.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Drops the pending invocation, if any.
    pub fn cancel(&mut self, scheduler: &mut impl Scheduler) {
        if let Some(id) = self.pending.take() {
            scheduler.clear_timeout(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TimerQueue;

    #[test]
    fn burst_collapses_to_one_trailing_call() {
        let mut queue = TimerQueue::new();
        let mut debounce = Debouncer::new(Duration::from_millis(300));

        for t in [0, 50, 100, 150] {
            queue.set_now(t);
            debounce.call(&mut queue);
        }
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.pop_due(449), None);
        let id = queue.pop_due(450).unwrap();
        assert!(debounce.on_timer(id));
        assert!(!debounce.is_pending());
        assert_eq!(queue.pop_due(u64::MAX), None);
    }

    #[test]
    fn spaced_calls_each_run() {
        let mut queue = TimerQueue::new();
        let mut debounce = Debouncer::new(Duration::from_millis(100));
        let mut runs = 0;

        for t in [0_u64, 200, 400] {
            queue.set_now(t);
            debounce.call(&mut queue);
            while let Some(id) = queue.pop_due(t + 150) {
                if debounce.on_timer(id) {
                    runs += 1;
                }
            }
        }
        assert_eq!(runs, 3);
    }

    #[test]
    fn foreign_and_stale_ids_are_ignored() {
        let mut queue = TimerQueue::new();
        let mut debounce = Debouncer::new(Duration::from_millis(10));

        debounce.call(&mut queue);
        let stale = queue.pop_due(10).unwrap();
        assert!(debounce.on_timer(stale));
        assert!(!debounce.on_timer(stale));

        let other = queue.set_timeout(Duration::from_millis(1));
        debounce.call(&mut queue);
        assert!(!debounce.on_timer(other));
        assert!(debounce.is_pending());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut queue = TimerQueue::new();
        let mut debounce = Debouncer::new(Duration::from_millis(10));

        debounce.call(&mut queue);
        debounce.cancel(&mut queue);
        debounce.cancel(&mut queue);

        assert!(!debounce.is_pending());
        assert!(queue.is_empty());
    }
}
