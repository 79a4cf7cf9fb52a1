// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_exit_intent --heading-base-level=0

//! Understory Exit Intent: headless detection of a user about to leave a page.
//!
//! Marketing overlays, feedback prompts, and "are you sure?" panels want to
//! appear at the moment a visitor is about to go. This crate decides *when*
//! that moment is, and leaves the showing to the host. It has no knowledge of
//! a DOM, a window system, or a clock; everything arrives as plain data.
//!
//! Signals come from several independent detectors:
//!
//! - [`pointer`]: fast motion toward a viewport edge, a confirmed leave of the
//!   document near an edge, or the document becoming hidden.
//! - [`touch`]: a fast downward swipe on touch devices that are scrolled away
//!   from the top (the "scroll back to the address bar" gesture).
//! - [`scroll`]: scrolling settles past a configured depth.
//! - A fixed delay after arming, and an immediate fire on arming.
//!
//! [`ExitIntent`] composes them. It is one-shot per arming: the first signal
//! flips `is_showing` on and disarms every detector at once. Fires are
//! persisted through [`Storage`](platform::Storage), so a visitor sees the
//! overlay at most once per `repeat_after_days`, and never again after
//! [`unsubscribe`](ExitIntent::unsubscribe).
//!
//! ## Host integration
//!
//! - Implement [`Platform`](platform::Platform) for viewport queries, listener
//!   registration, scroll locking, and one-shot timeouts.
//! - Implement [`Storage`](platform::Storage) over whatever durable key/value
//!   store is available.
//! - Call [`ExitIntent::mounted`] (or [`ExitIntent::setup`]) once.
//! - Forward input as [`Event`](platform::Event)s to
//!   [`ExitIntent::handle_event`] and expired timers to
//!   [`ExitIntent::handle_timer`].
//! - Drain [`ExitIntent::take_changes`] and render from the flags.
//!
//! [`headless`] provides an in-memory host driven by a manual clock.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Size;
//! use understory_exit_intent::headless::{HeadlessPlatform, MemoryStorage};
//! use understory_exit_intent::platform::Event;
//! use understory_exit_intent::{Config, ExitIntent, ExitSignal, Phase};
//!
//! let platform = HeadlessPlatform::new(Size::new(1280.0, 800.0))
//!     .with_document_height(3_000.0);
//! let config = Config::default()
//!     .with_scroll_percentage_to_trigger(50.0)
//!     .with_repeat_after_days(7.0);
//! let mut intent = ExitIntent::new(config, platform, MemoryStorage::new()).unwrap();
//!
//! intent.mounted();
//! assert_eq!(intent.phase(), Phase::Armed);
//!
//! // Scroll past the middle and let it settle.
//! intent.platform_mut().set_scroll_offset(1_200.0);
//! intent.handle_event(&Event::Scroll);
//! intent.advance_to(300);
//!
//! assert!(intent.is_showing());
//! assert_eq!(intent.last_signal(), Some(ExitSignal::ScrollDepth));
//!
//! // The host dismisses the overlay; nothing re-arms until the cooldown ends.
//! intent.close();
//! assert_eq!(intent.phase(), Phase::Fired);
//! ```
//!
//! ## Features
//!
//! - `std` (default): build Kurbo, serde, and tracing against the standard library.
//! - `libm`: use `libm` for Kurbo's float math without `std`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
pub mod headless;
mod intent;
pub mod platform;
pub mod pointer;
mod scope;
pub mod scroll;
pub mod suppression;
pub mod touch;
mod types;

pub use config::{Config, ConfigError, DEFAULT_STORAGE_KEY};
pub use intent::ExitIntent;
pub use scope::{Scope, ScopedScheduler};
pub use suppression::is_local_storage_expired;
pub use types::{ExitSignal, Flag, FlagChange, Flags, Phase};
pub use understory_timing::TimerId;
