// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host capabilities and the input event model.
//!
//! The engine never touches a DOM, a window, or a clock directly. A host
//! implements [`Platform`] and [`Storage`], forwards input as [`Event`]s, and
//! hands expired timers back. Everything else stays headless.

use alloc::string::String;

use bitflags::bitflags;
use kurbo::{Point, Size};
use understory_timing::Scheduler;

bitflags! {
    /// Set of event kinds a component listens to.
    ///
    /// A host maps each bit to its native subscription: `mousemove`,
    /// `mouseleave` and `visibilitychange` on the document, `resize` and
    /// `scroll` on the window, and the three touch events on the document.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Listen: u16 {
        /// Pointer moved inside the document.
        const POINTER_MOVE = 1 << 0;
        /// Pointer left the document.
        const POINTER_LEAVE = 1 << 1;
        /// Document visibility changed.
        const VISIBILITY = 1 << 2;
        /// Viewport was resized.
        const RESIZE = 1 << 3;
        /// A touch began.
        const TOUCH_START = 1 << 4;
        /// A touch moved.
        const TOUCH_MOVE = 1 << 5;
        /// A touch ended.
        const TOUCH_END = 1 << 6;
        /// The page scrolled.
        const SCROLL = 1 << 7;

        /// Everything the pointer edge detector needs.
        const POINTER = Self::POINTER_MOVE.bits()
            | Self::POINTER_LEAVE.bits()
            | Self::VISIBILITY.bits()
            | Self::RESIZE.bits();
        /// Everything the touch detector needs.
        const TOUCH = Self::TOUCH_START.bits() | Self::TOUCH_MOVE.bits() | Self::TOUCH_END.bits();
    }
}

/// An input event forwarded by the host.
///
/// Coordinates are client (viewport) coordinates in CSS pixels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Event {
    /// Pointer moved to `position`.
    PointerMove {
        /// Pointer position.
        position: Point,
    },
    /// Pointer left the document element.
    PointerLeave {
        /// Last pointer position reported with the leave.
        position: Point,
        /// `true` if the pointer moved onto another element of the same
        /// document (the DOM `relatedTarget` was set).
        related_target: bool,
    },
    /// Document visibility changed.
    VisibilityChange {
        /// `true` if the document is now hidden.
        hidden: bool,
    },
    /// Viewport was resized.
    Resize {
        /// New viewport size.
        size: Size,
    },
    /// First touch point went down.
    TouchStart {
        /// Client Y of the first touch point.
        y: f64,
        /// Event timestamp in milliseconds.
        time_ms: f64,
    },
    /// First touch point moved.
    TouchMove {
        /// Client Y of the first touch point.
        y: f64,
        /// Event timestamp in milliseconds.
        time_ms: f64,
    },
    /// Touch ended.
    TouchEnd,
    /// The page scrolled.
    Scroll,
}

impl Event {
    /// The subscription this event is delivered through.
    #[must_use]
    pub fn kind(&self) -> Listen {
        match self {
            Self::PointerMove { .. } => Listen::POINTER_MOVE,
            Self::PointerLeave { .. } => Listen::POINTER_LEAVE,
            Self::VisibilityChange { .. } => Listen::VISIBILITY,
            Self::Resize { .. } => Listen::RESIZE,
            Self::TouchStart { .. } => Listen::TOUCH_START,
            Self::TouchMove { .. } => Listen::TOUCH_MOVE,
            Self::TouchEnd => Listen::TOUCH_END,
            Self::Scroll => Listen::SCROLL,
        }
    }
}

/// Touch capability signals reported by the host.
///
/// Mirrors the usual browser feature detection: `ontouchstart` support,
/// `navigator.maxTouchPoints`, and the `(pointer: coarse)` media query.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TouchSupport {
    /// The host exposes touch start events.
    pub touch_start_event: bool,
    /// Maximum simultaneous touch points.
    pub max_touch_points: u32,
    /// Primary pointer is coarse.
    pub coarse_pointer: bool,
}

impl TouchSupport {
    /// No touch support at all.
    pub const NONE: Self = Self {
        touch_start_event: false,
        max_touch_points: 0,
        coarse_pointer: false,
    };

    /// A typical phone or tablet.
    pub const TOUCH_SCREEN: Self = Self {
        touch_start_event: true,
        max_touch_points: 5,
        coarse_pointer: true,
    };

    /// Returns `true` if any signal indicates a touch-capable runtime.
    #[must_use]
    pub fn is_touch_capable(&self) -> bool {
        self.touch_start_event || self.max_touch_points > 0 || self.coarse_pointer
    }
}

/// Everything the engine needs from its host besides storage.
///
/// Listener registration must be idempotent in both directions: adding a kind
/// that is already registered and removing one that is not are both no-ops.
pub trait Platform: Scheduler {
    /// Registers listeners for `kinds`.
    fn add_listeners(&mut self, kinds: Listen);

    /// Removes listeners for `kinds`.
    fn remove_listeners(&mut self, kinds: Listen);

    /// Current viewport size (`innerWidth` × `innerHeight`).
    fn viewport_size(&self) -> Size;

    /// Vertical scroll offset of the page.
    fn scroll_offset(&self) -> f64;

    /// Total height of the document.
    fn document_height(&self) -> f64;

    /// Touch capability of the runtime.
    fn touch_support(&self) -> TouchSupport;

    /// Wall clock time as milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;

    /// Locks or restores page scrolling (body `overflow-y`).
    fn set_scroll_locked(&mut self, locked: bool);
}

/// Durable string key-value storage that survives reloads.
pub trait Storage {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str);

    /// Removes `key`. Removing a missing key is a no-op.
    fn remove(&mut self, key: &str);
}
