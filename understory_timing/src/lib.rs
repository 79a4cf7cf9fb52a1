// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_timing --heading-base-level=0

//! Understory Timing: host-agnostic timer primitives for UI runtimes.
//!
//! UI state machines frequently need "do this later unless something else
//! happens first": a velocity that decays to rest, a confirmation window after
//! a pointer leaves, a debounced scroll handler. This crate keeps those
//! suspension points explicit and cancelable without tying them to any
//! particular event loop.
//!
//! - [`Scheduler`]: the capability a host exposes for one-shot timeouts. Hosts
//!   backed by `setTimeout`, a winit event loop, or a test clock all fit.
//! - [`TimerQueue`]: a deterministic [`Scheduler`] that is advanced manually.
//!   Useful for headless hosts, simulations, and tests.
//! - [`Debouncer`]: collapses a burst of calls into a single trailing
//!   invocation once a quiet window has elapsed.
//!
//! Timer expiry is never delivered through a callback. The host hands expired
//! [`TimerId`]s back to whoever scheduled them, and the owner decides what the
//! expiry means.
//!
//! ## Minimal example
//!
//! ```rust
//! use core::time::Duration;
//! use understory_timing::{Debouncer, TimerQueue};
//!
//! let mut queue = TimerQueue::new();
//! let mut debounce = Debouncer::new(Duration::from_millis(300));
//!
//! // Three calls in quick succession.
//! debounce.call(&mut queue);
//! queue.set_now(100);
//! debounce.call(&mut queue);
//! queue.set_now(200);
//! debounce.call(&mut queue);
//!
//! // Nothing is due until 300ms after the last call.
//! assert_eq!(queue.pop_due(499), None);
//! let id = queue.pop_due(500).unwrap();
//! assert!(debounce.on_timer(id));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod debounce;
mod queue;

pub use debounce::Debouncer;
pub use queue::TimerQueue;

use core::time::Duration;

/// Opaque handle for a scheduled timeout.
///
/// Ids are unique per [`Scheduler`] for its lifetime and are never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// One-shot timeout scheduling.
///
/// Implementations must treat [`clear_timeout`](Scheduler::clear_timeout) of
/// an unknown, expired, or already cleared id as a no-op.
pub trait Scheduler {
    /// Schedules a timeout that expires after `delay`.
    fn set_timeout(&mut self, delay: Duration) -> TimerId;

    /// Cancels a pending timeout.
    fn clear_timeout(&mut self, id: TimerId);
}

/// Converts a delay into whole milliseconds, saturating at `u64::MAX`.
#[must_use]
pub fn duration_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}
