// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::collections::BinaryHeap;
use core::cmp::Reverse;
use core::time::Duration;

use hashbrown::HashSet;

use crate::{Scheduler, TimerId, duration_millis};

/// A manually advanced timer queue.
///
/// `TimerQueue` keeps a monotonic clock in milliseconds that only moves when
/// the host says so. Timeouts are scheduled relative to that clock and popped
/// in deadline order; ties resolve in scheduling order.
///
/// Cancelation is lazy: cleared ids stay in the heap until they reach the
/// front and are then skipped.
///
/// ## Driving the queue
///
/// Handling an expired timer may schedule further timers that are already due.
/// Pop one at a time so those are observed in order:
///
/// ```rust
/// use core::time::Duration;
/// use understory_timing::{Scheduler, TimerQueue};
///
/// let mut queue = TimerQueue::new();
/// let a = queue.set_timeout(Duration::from_millis(50));
/// let b = queue.set_timeout(Duration::from_millis(10));
///
/// let mut fired = Vec::new();
/// while let Some(id) = queue.pop_due(100) {
///     fired.push(id);
/// }
/// queue.set_now(100);
///
/// assert_eq!(fired, vec![b, a]);
/// assert_eq!(queue.now(), 100);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    now: u64,
    next_id: u64,
    heap: BinaryHeap<Reverse<(u64, u64)>>,
    live: HashSet<u64>,
}

impl TimerQueue {
    /// Creates an empty queue with its clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value in milliseconds.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Moves the clock forward to `now`.
    ///
    /// The clock never moves backwards; earlier values are ignored. Timers that
    /// become due are not popped; use [`pop_due`](Self::pop_due) for that.
    pub fn set_now(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    /// Schedules a timeout at an absolute deadline.
    pub fn schedule_at(&mut self, deadline: u64) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.heap.push(Reverse((deadline, id)));
        self.live.insert(id);
        TimerId(id)
    }

    /// Cancels `id`. Returns `true` if it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id.0)
    }

    /// Returns `true` while `id` is scheduled and has not expired.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.live.contains(&id.0)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&mut self) -> Option<u64> {
        self.discard_canceled();
        self.heap.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Pops the earliest timer whose deadline is at or before `until`.
    ///
    /// The clock advances to the popped timer's deadline, so anything scheduled
    /// while handling it is relative to the moment it expired.
    pub fn pop_due(&mut self, until: u64) -> Option<TimerId> {
        self.discard_canceled();
        let Reverse((deadline, id)) = *self.heap.peek()?;
        if deadline > until {
            return None;
        }
        self.heap.pop();
        self.live.remove(&id);
        self.set_now(deadline);
        Some(TimerId(id))
    }

    fn discard_canceled(&mut self) {
        while let Some(Reverse((_, id))) = self.heap.peek() {
            if self.live.contains(id) {
                break;
            }
            self.heap.pop();
        }
    }
}

impl Scheduler for TimerQueue {
    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        let deadline = self.now.saturating_add(duration_millis(delay));
        self.schedule_at(deadline)
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.cancel(id);
    }
}
