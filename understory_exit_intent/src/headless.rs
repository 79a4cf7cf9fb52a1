// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless host: in-memory storage and a platform driven by a [`TimerQueue`].
//!
//! Useful for simulations, server-side replay of recorded sessions, and tests.

use alloc::borrow::ToOwned;
use alloc::string::String;
use core::time::Duration;

use hashbrown::HashMap;
use kurbo::Size;
use understory_timing::{Scheduler, TimerId, TimerQueue, duration_millis};

use crate::intent::ExitIntent;
use crate::platform::{Listen, Platform, Storage, TouchSupport};

/// [`Storage`] backed by a hash map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    /// Creates empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// A [`Platform`] with a manual clock.
///
/// Geometry, scroll position, and touch support are plain fields the driver
/// sets. Timeouts go into an internal [`TimerQueue`]; the wall clock reported
/// by [`now_millis`](Platform::now_millis) is `epoch_millis` plus the queue's
/// elapsed time.
#[derive(Clone, Debug)]
pub struct HeadlessPlatform {
    timers: TimerQueue,
    listeners: Listen,
    viewport: Size,
    scroll_offset: f64,
    document_height: f64,
    touch: TouchSupport,
    epoch_millis: u64,
    scroll_locked: bool,
}

impl HeadlessPlatform {
    /// Creates a platform with the given viewport.
    ///
    /// The document is initially exactly as tall as the viewport, scrolled to
    /// the top, without touch support, at epoch zero.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            timers: TimerQueue::new(),
            listeners: Listen::empty(),
            viewport,
            scroll_offset: 0.0,
            document_height: viewport.height,
            touch: TouchSupport::NONE,
            epoch_millis: 0,
            scroll_locked: false,
        }
    }

    /// Sets the wall clock origin.
    #[must_use]
    pub fn with_epoch_millis(mut self, epoch_millis: u64) -> Self {
        self.epoch_millis = epoch_millis;
        self
    }

    /// Sets the touch capability.
    #[must_use]
    pub fn with_touch_support(mut self, touch: TouchSupport) -> Self {
        self.touch = touch;
        self
    }

    /// Sets the document height.
    #[must_use]
    pub fn with_document_height(mut self, height: f64) -> Self {
        self.document_height = height;
        self
    }

    /// Currently registered listener kinds.
    #[must_use]
    pub fn listeners(&self) -> Listen {
        self.listeners
    }

    /// Whether page scrolling is locked.
    #[must_use]
    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// The timer queue.
    #[must_use]
    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    /// Mutable access to the timer queue.
    pub fn timers_mut(&mut self) -> &mut TimerQueue {
        &mut self.timers
    }

    /// Milliseconds elapsed on the manual clock.
    #[must_use]
    pub fn elapsed_millis(&self) -> u64 {
        self.timers.now()
    }

    /// Changes the viewport size. The host is expected to follow up with a
    /// resize event.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport = size;
    }

    /// Changes the vertical scroll offset.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset;
    }

    /// Changes the document height.
    pub fn set_document_height(&mut self, height: f64) {
        self.document_height = height;
    }
}

impl Scheduler for HeadlessPlatform {
    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.timers.set_timeout(delay)
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.timers.clear_timeout(id);
    }
}

impl Platform for HeadlessPlatform {
    fn add_listeners(&mut self, kinds: Listen) {
        self.listeners |= kinds;
    }

    fn remove_listeners(&mut self, kinds: Listen) {
        self.listeners -= kinds;
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    fn document_height(&self) -> f64 {
        self.document_height
    }

    fn touch_support(&self) -> TouchSupport {
        self.touch
    }

    fn now_millis(&self) -> u64 {
        self.epoch_millis.saturating_add(self.timers.now())
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        self.scroll_locked = locked;
    }
}

impl<S: Storage> ExitIntent<HeadlessPlatform, S> {
    /// Advances the manual clock to `until` milliseconds, delivering every
    /// timer that comes due on the way in deadline order.
    ///
    /// Timers scheduled while delivering are delivered too if they fall due
    /// before `until`.
    pub fn advance_to(&mut self, until: u64) {
        while let Some(id) = self.platform_mut().timers_mut().pop_due(until) {
            self.handle_timer(id);
        }
        self.platform_mut().timers_mut().set_now(until);
    }

    /// Advances the manual clock by `delta`.
    pub fn advance_by(&mut self, delta: Duration) {
        let now = self.platform().elapsed_millis();
        self.advance_to(now.saturating_add(duration_millis(delta)));
    }
}
