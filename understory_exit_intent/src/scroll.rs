// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll-percentage detector: a debounced scroll subscription.
//!
//! The detector only reports that scrolling has settled. Whether the settled
//! position is deep enough is the caller's decision; [`scroll_percentage`]
//! does the arithmetic.

use core::time::Duration;

use understory_timing::{Debouncer, TimerId};

use crate::platform::{Event, Listen, Platform};
use crate::scope::Scope;

/// Debounced scroll listener.
#[derive(Clone, Debug)]
pub struct ScrollDepth {
    scope: Scope,
    debouncer: Debouncer,
}

impl ScrollDepth {
    /// Creates an idle detector that settles after `wait` without scrolling.
    #[must_use]
    pub fn new(wait: Duration) -> Self {
        Self {
            scope: Scope::new(),
            debouncer: Debouncer::new(wait),
        }
    }

    /// Returns `true` while the scroll listener is registered.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.scope.is_listening(Listen::SCROLL)
    }

    /// Returns `true` while a settle check is scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Registers the scroll listener.
    pub fn add_scroll_listener(&mut self, platform: &mut impl Platform) {
        self.scope.listen(platform, Listen::SCROLL);
    }

    /// Removes the scroll listener and drops any pending settle check.
    /// Idempotent.
    pub fn remove_scroll_listeners(&mut self, platform: &mut impl Platform) {
        self.debouncer.cancel(&mut self.scope.scheduler(platform));
        self.scope.release(platform);
    }

    /// Processes an input event; scroll events restart the quiet window.
    pub fn handle_event(&mut self, platform: &mut impl Platform, event: &Event) {
        if matches!(event, Event::Scroll) && self.is_listening() {
            self.debouncer.call(&mut self.scope.scheduler(platform));
        }
    }

    /// Processes an expired timer.
    ///
    /// Returns `true` when scrolling has settled and the position should be
    /// checked.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        self.scope.settle(id) && self.debouncer.on_timer(id)
    }
}

/// How far down the page is scrolled, in percent of the scrollable range.
///
/// Returns `None` when the document is not taller than the viewport.
#[must_use]
pub fn scroll_percentage(offset: f64, document_height: f64, viewport_height: f64) -> Option<f64> {
    let scrollable = document_height - viewport_height;
    if scrollable <= 0.0 {
        return None;
    }
    Some(offset / scrollable * 100.0)
}
