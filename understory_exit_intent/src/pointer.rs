// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer edge-intent detector: fast, mostly perpendicular motion toward a
//! viewport edge, confirmed leaves, and the document being hidden.
//!
//! ## Usage
//!
//! 1) Call [`EdgeIntent::add_mouse_listener`] to register listeners and capture
//!    the current viewport boundaries.
//! 2) Forward every [`Event`] to [`EdgeIntent::handle_event`] and every expired
//!    timer to [`EdgeIntent::on_timer`].
//! 3) The first `Some(signal)` returned is the exit intent. The detector has
//!    already torn down its listeners and timers at that point and stays
//!    silent until [`EdgeIntent::reset`].
//!
//! ## Heuristics
//!
//! - **Edge velocity**: the pointer sits within `threshold` pixels of an edge,
//!   the per-sample speed perpendicular to that edge exceeds `sensitivity`, and
//!   the parallel speed is less than twice the perpendicular speed. Diagonal
//!   grazing along an edge is rejected.
//! - **Confirmed leave**: the pointer leaves the document near an edge with no
//!   related target, and no further move arrives within
//!   [`LEAVE_CONFIRMATION`]. The exit point is checked against the boundaries
//!   that are current when the window closes.
//! - **Hidden**: the document became hidden.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::{Point, Size};
//! use understory_exit_intent::headless::HeadlessPlatform;
//! use understory_exit_intent::platform::Event;
//! use understory_exit_intent::pointer::{EdgeIntent, EdgeOptions};
//! use understory_exit_intent::ExitSignal;
//!
//! let mut platform = HeadlessPlatform::new(Size::new(800.0, 600.0));
//! let mut edge = EdgeIntent::new(EdgeOptions::default());
//! edge.add_mouse_listener(&mut platform);
//!
//! let to = |x, y| Event::PointerMove { position: Point::new(x, y) };
//! assert_eq!(edge.handle_event(&mut platform, &to(400.0, 80.0)), None);
//! assert_eq!(
//!     edge.handle_event(&mut platform, &to(400.0, 20.0)),
//!     Some(ExitSignal::EdgeVelocity)
//! );
//! assert!(edge.has_triggered());
//! ```

use core::time::Duration;

use kurbo::{Point, Rect, Vec2};
use understory_timing::TimerId;

use crate::platform::{Event, Listen, Platform};
use crate::scope::Scope;
use crate::types::ExitSignal;

/// Time without a move after which the velocity proxy decays to rest.
pub const VELOCITY_DECAY: Duration = Duration::from_millis(50);

/// Window after a leave during which a returning pointer cancels the exit.
pub const LEAVE_CONFIRMATION: Duration = Duration::from_millis(100);

/// Tuning for [`EdgeIntent`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeOptions {
    /// Minimum per-sample speed toward the edge, in pixels.
    pub sensitivity: f64,
    /// Distance from an edge at which monitoring starts, in pixels.
    pub threshold: f64,
}

impl Default for EdgeOptions {
    fn default() -> Self {
        Self {
            sensitivity: 8.0,
            threshold: 50.0,
        }
    }
}

/// A viewport edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Top edge (toward the tab strip and address bar).
    Top,
    /// Right edge.
    Right,
    /// Bottom edge.
    Bottom,
    /// Left edge.
    Left,
}

/// Pointer edge-intent detector with a one-shot latch.
#[derive(Clone, Debug)]
pub struct EdgeIntent {
    options: EdgeOptions,
    scope: Scope,
    bounds: Rect,
    position: Option<Point>,
    velocity: Vec2,
    velocity_timer: Option<TimerId>,
    leave_timer: Option<TimerId>,
    exit_point: Option<Point>,
    triggered: bool,
}

impl EdgeIntent {
    /// Creates an idle detector. Nothing is registered until
    /// [`add_mouse_listener`](Self::add_mouse_listener).
    #[must_use]
    pub fn new(options: EdgeOptions) -> Self {
        Self {
            options,
            scope: Scope::new(),
            bounds: Rect::ZERO,
            position: None,
            velocity: Vec2::ZERO,
            velocity_timer: None,
            leave_timer: None,
            exit_point: None,
            triggered: false,
        }
    }

    /// The tuning in use.
    #[must_use]
    pub fn options(&self) -> EdgeOptions {
        self.options
    }

    /// Returns `true` once the detector has fired. Cleared by [`reset`](Self::reset).
    #[must_use]
    pub fn has_triggered(&self) -> bool {
        self.triggered
    }

    /// Returns `true` while listeners are registered.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        !self.scope.listening().is_empty()
    }

    /// Current viewport boundaries.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Last pointer position seen by a move.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Absolute per-axis delta between the last two samples, or zero at rest.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Captures the viewport boundaries and registers pointer, leave,
    /// visibility, and resize listeners.
    pub fn add_mouse_listener(&mut self, platform: &mut impl Platform) {
        self.bounds = Rect::from_origin_size(Point::ORIGIN, platform.viewport_size());
        self.scope.listen(platform, Listen::POINTER);
    }

    /// Removes all listeners, clears pending timers, and forgets the tracked
    /// pointer. Idempotent.
    ///
    /// The first move after listening again has no earlier sample, so it
    /// carries no velocity.
    pub fn remove_mouse_leave_listeners(&mut self, platform: &mut impl Platform) {
        self.scope.release(platform);
        self.velocity_timer = None;
        self.leave_timer = None;
        self.exit_point = None;
        self.position = None;
        self.velocity = Vec2::ZERO;
    }

    /// Clears the one-shot latch and registers listeners again.
    pub fn reset(&mut self, platform: &mut impl Platform) {
        self.remove_mouse_leave_listeners(platform);
        self.triggered = false;
        self.add_mouse_listener(platform);
    }

    /// Processes an input event.
    ///
    /// Events of kinds this detector is not listening to are ignored.
    pub fn handle_event(
        &mut self,
        platform: &mut impl Platform,
        event: &Event,
    ) -> Option<ExitSignal> {
        if !self.scope.is_listening(event.kind()) {
            return None;
        }
        match *event {
            Event::PointerMove { position } => self.on_move(platform, position),
            Event::PointerLeave {
                position,
                related_target,
            } => {
                self.on_leave(platform, position, related_target);
                None
            }
            Event::VisibilityChange { hidden: true } => {
                self.trigger(platform, ExitSignal::Hidden)
            }
            Event::Resize { size } => {
                self.bounds = Rect::from_origin_size(Point::ORIGIN, size);
                None
            }
            _ => None,
        }
    }

    /// Processes an expired timer. Ids this detector does not own are ignored.
    pub fn on_timer(&mut self, platform: &mut impl Platform, id: TimerId) -> Option<ExitSignal> {
        if !self.scope.settle(id) {
            return None;
        }
        if self.velocity_timer == Some(id) {
            self.velocity_timer = None;
            self.velocity = Vec2::ZERO;
            return None;
        }
        if self.leave_timer == Some(id) {
            self.leave_timer = None;
            let exit = self.exit_point.take()?;
            if self.is_near_edge(exit) {
                return self.trigger(platform, ExitSignal::LeaveConfirmed);
            }
        }
        None
    }

    /// Returns `true` if `point` is within `threshold` of any edge.
    #[must_use]
    pub fn is_near_edge(&self, point: Point) -> bool {
        self.edge_at(point).is_some()
    }

    /// The edge `point` is near, checked top, right, bottom, left.
    #[must_use]
    pub fn edge_at(&self, point: Point) -> Option<Edge> {
        let t = self.options.threshold;
        if point.y <= self.bounds.y0 + t {
            Some(Edge::Top)
        } else if point.x >= self.bounds.x1 - t {
            Some(Edge::Right)
        } else if point.y >= self.bounds.y1 - t {
            Some(Edge::Bottom)
        } else if point.x <= self.bounds.x0 + t {
            Some(Edge::Left)
        } else {
            None
        }
    }

    /// Returns `true` if `point` is near an edge and the current velocity is
    /// fast enough and mostly perpendicular to that edge.
    #[must_use]
    pub fn is_moving_towards_edge(&self, point: Point) -> bool {
        let Some(edge) = self.edge_at(point) else {
            return false;
        };
        let (perpendicular, parallel) = match edge {
            Edge::Top | Edge::Bottom => (self.velocity.y, self.velocity.x),
            Edge::Left | Edge::Right => (self.velocity.x, self.velocity.y),
        };
        perpendicular > self.options.sensitivity && parallel < perpendicular * 2.0
    }

    fn on_move(&mut self, platform: &mut impl Platform, position: Point) -> Option<ExitSignal> {
        if self.triggered {
            return None;
        }
        self.velocity = match self.position {
            Some(last) => {
                let delta = position - last;
                Vec2::new(delta.x.abs(), delta.y.abs())
            }
            None => Vec2::ZERO,
        };
        self.position = Some(position);

        // Any move means the pointer is back inside the document.
        self.exit_point = None;
        if let Some(id) = self.leave_timer.take() {
            self.scope.clear_timeout(platform, id);
        }

        if let Some(id) = self.velocity_timer.take() {
            self.scope.clear_timeout(platform, id);
        }
        self.velocity_timer = Some(self.scope.set_timeout(platform, VELOCITY_DECAY));

        if self.is_moving_towards_edge(position) {
            return self.trigger(platform, ExitSignal::EdgeVelocity);
        }
        None
    }

    fn on_leave(&mut self, platform: &mut impl Platform, position: Point, related_target: bool) {
        if self.triggered || related_target || !self.is_near_edge(position) {
            return;
        }
        if let Some(id) = self.leave_timer.take() {
            self.scope.clear_timeout(platform, id);
        }
        self.exit_point = Some(position);
        self.leave_timer = Some(self.scope.set_timeout(platform, LEAVE_CONFIRMATION));
    }

    fn trigger(&mut self, platform: &mut impl Platform, signal: ExitSignal) -> Option<ExitSignal> {
        if self.triggered {
            return None;
        }
        self.triggered = true;
        tracing::debug!(?signal, position = ?self.position, "pointer exit intent");
        self.remove_mouse_leave_listeners(platform);
        Some(signal)
    }
}
