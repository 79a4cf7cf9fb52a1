// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch scroll-velocity detector.
//!
//! A touch that starts below the top of the page and then drags quickly in the
//! non-negative client-Y direction is taken as an exit gesture. Speed is
//! `distance / elapsed`, where distance is measured from the touch start and
//! elapsed from the previous sample, scaled by the configured sensitivity and
//! compared against [`TOUCH_VELOCITY_LIMIT`].
//!
//! There is no latch here. The arbiter removes the listeners as soon as any
//! signal fires.

use crate::platform::{Event, Listen, Platform};
use crate::scope::Scope;
use crate::types::ExitSignal;

/// Scaled velocity above which a touch drag counts as an exit.
pub const TOUCH_VELOCITY_LIMIT: f64 = 100.0;

/// Touch scroll-velocity detector.
#[derive(Clone, Debug)]
pub struct TouchScroll {
    sensitivity: f64,
    scope: Scope,
    start_y: f64,
    scrolling: bool,
    last_time_ms: f64,
}

impl TouchScroll {
    /// Creates an idle detector with the given sensitivity factor.
    #[must_use]
    pub fn new(sensitivity: f64) -> Self {
        Self {
            sensitivity,
            scope: Scope::new(),
            start_y: 0.0,
            scrolling: false,
            last_time_ms: 0.0,
        }
    }

    /// The sensitivity factor.
    #[must_use]
    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Returns `true` between an accepted touch start and the next touch end
    /// or exit.
    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Returns `true` while listeners are registered.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        !self.scope.listening().is_empty()
    }

    /// Registers touch start, move, and end listeners.
    pub fn add_touch_listeners(&mut self, platform: &mut impl Platform) {
        self.scope.listen(platform, Listen::TOUCH);
    }

    /// Removes the touch listeners. Idempotent.
    pub fn remove_touch_device_listeners(&mut self, platform: &mut impl Platform) {
        self.scope.release(platform);
        self.scrolling = false;
    }

    /// Processes an input event.
    pub fn handle_event(
        &mut self,
        platform: &mut impl Platform,
        event: &Event,
    ) -> Option<ExitSignal> {
        if !self.scope.is_listening(event.kind()) {
            return None;
        }
        match *event {
            Event::TouchStart { y, time_ms } => {
                // At offset zero there is nothing to scroll back through.
                if platform.scroll_offset() <= 0.0 {
                    return None;
                }
                self.scrolling = true;
                self.start_y = y;
                self.last_time_ms = time_ms;
                None
            }
            Event::TouchMove { y, time_ms } => self.on_move(y, time_ms),
            Event::TouchEnd => {
                self.scrolling = false;
                None
            }
            _ => None,
        }
    }

    fn on_move(&mut self, y: f64, time_ms: f64) -> Option<ExitSignal> {
        if !self.scrolling {
            return None;
        }
        let distance = y - self.start_y;
        if distance < 0.0 {
            return None;
        }
        let elapsed = time_ms - self.last_time_ms;
        if elapsed <= 0.0 {
            return None;
        }
        let velocity = distance / elapsed;
        if velocity * self.sensitivity > TOUCH_VELOCITY_LIMIT {
            self.scrolling = false;
            tracing::debug!(velocity, distance, elapsed, "touch exit intent");
            return Some(ExitSignal::TouchVelocity);
        }
        self.last_time_ms = time_ms;
        None
    }
}
