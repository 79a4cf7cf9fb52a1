// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resource scope: the listeners and timers one component owns.

use core::time::Duration;

use smallvec::SmallVec;
use understory_timing::{Scheduler, TimerId};

use crate::platform::{Listen, Platform};

/// Listeners and timers owned by a single component.
///
/// Every registration and every timeout a detector makes goes through its
/// scope, so [`release`](Self::release) can tear all of it down at once. A
/// component only reacts to timers its scope still owns; stale expiries are
/// dropped by [`settle`](Self::settle).
#[derive(Clone, Debug, Default)]
pub struct Scope {
    listening: Listen,
    timers: SmallVec<[TimerId; 4]>,
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Kinds currently registered through this scope.
    #[must_use]
    pub fn listening(&self) -> Listen {
        self.listening
    }

    /// Returns `true` if every kind in `kinds` is registered.
    #[must_use]
    pub fn is_listening(&self, kinds: Listen) -> bool {
        !kinds.is_empty() && self.listening.contains(kinds)
    }

    /// Returns `true` if the scope holds no listeners and no timers.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.listening.is_empty() && self.timers.is_empty()
    }

    /// Registers `kinds`, skipping those already registered.
    pub fn listen(&mut self, platform: &mut impl Platform, kinds: Listen) {
        let added = kinds - self.listening;
        if added.is_empty() {
            return;
        }
        tracing::trace!(kinds = ?added, "add listeners");
        platform.add_listeners(added);
        self.listening |= added;
    }

    /// Schedules a timeout owned by this scope.
    pub fn set_timeout(&mut self, platform: &mut impl Platform, delay: Duration) -> TimerId {
        let id = platform.set_timeout(delay);
        tracing::trace!(?id, ?delay, "set timeout");
        self.timers.push(id);
        id
    }

    /// Cancels `id` if this scope owns it.
    pub fn clear_timeout(&mut self, platform: &mut impl Platform, id: TimerId) {
        if self.forget(id) {
            platform.clear_timeout(id);
        }
    }

    /// Accepts an expired timer.
    ///
    /// Returns `true` if `id` belonged to this scope. The id is no longer owned
    /// afterwards.
    pub fn settle(&mut self, id: TimerId) -> bool {
        self.forget(id)
    }

    /// Borrows this scope as a [`Scheduler`], so helpers that schedule on
    /// their own (such as a [`Debouncer`](understory_timing::Debouncer)) still
    /// leave their timers owned by the scope.
    pub fn scheduler<'a, P: Platform>(&'a mut self, platform: &'a mut P) -> ScopedScheduler<'a, P> {
        ScopedScheduler {
            scope: self,
            platform,
        }
    }

    /// Removes every listener and clears every pending timer.
    ///
    /// Safe to call any number of times.
    pub fn release(&mut self, platform: &mut impl Platform) {
        if !self.listening.is_empty() {
            tracing::trace!(kinds = ?self.listening, "remove listeners");
            platform.remove_listeners(self.listening);
            self.listening = Listen::empty();
        }
        for id in self.timers.drain(..) {
            platform.clear_timeout(id);
        }
    }

    fn forget(&mut self, id: TimerId) -> bool {
        if let Some(index) = self.timers.iter().position(|owned| *owned == id) {
            self.timers.swap_remove(index);
            true
        } else {
            false
        }
    }
}

/// A [`Scheduler`] that records every timeout in a [`Scope`].
///
/// Created by [`Scope::scheduler`].
#[derive(Debug)]
pub struct ScopedScheduler<'a, P> {
    scope: &'a mut Scope,
    platform: &'a mut P,
}

impl<P: Platform> Scheduler for ScopedScheduler<'_, P> {
    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.scope.set_timeout(self.platform, delay)
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.scope.clear_timeout(self.platform, id);
    }
}
