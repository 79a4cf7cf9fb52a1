// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.
//!
//! All options are optional. Parsed options overlay the defaults field by
//! field, so `{"scrollPercentageToTrigger": 50}` is a complete configuration.
//!
//! ```
//! use understory_exit_intent::Config;
//!
//! let config = Config::from_json(r#"{ "repeatAfterDays": 7, "LSItemKey": "promo" }"#).unwrap();
//! assert_eq!(config.repeat_after_days, 7.0);
//! assert_eq!(config.storage_key, "promo");
//! assert!(config.trigger_on_exit_intent);
//! ```

use alloc::borrow::ToOwned;
use alloc::string::String;
use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pointer::EdgeOptions;

/// Default persistence namespace.
pub const DEFAULT_STORAGE_KEY: &str = "vue-exit-intent";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Options could not be parsed.
    #[error("options are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// Scroll percentage outside `0..=100`.
    #[error("scrollPercentageToTrigger must be within 0..=100, got {0}")]
    ScrollPercentage(f64),
    /// A duration, sensitivity, or distance that is negative or not finite.
    #[error("{field} must be finite and non-negative, got {value}")]
    OutOfRange {
        /// Option name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// Empty storage key.
    #[error("storageKey must not be empty")]
    EmptyStorageKey,
}

/// Engine configuration. Immutable for the lifetime of an engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Cooldown in days after a fire. `0` suppresses until explicitly reset.
    /// Fractional days are honoured.
    pub repeat_after_days: f64,
    /// Fire once scrolled this far down the page, in percent. `0` disables.
    pub scroll_percentage_to_trigger: f64,
    /// Fire unconditionally this many seconds after arming. `0` disables.
    pub delay_seconds_and_trigger: f64,
    /// Enable the pointer and touch heuristics.
    pub trigger_on_exit_intent: bool,
    /// Scaling factor for touch velocity. `0` disables the touch path.
    pub touch_device_sensitivity: f64,
    /// Quiet window for the scroll-percentage check, in milliseconds.
    pub scroll_debounce_millis: u64,
    /// Fire as soon as the engine arms.
    pub trigger_on_page_load: bool,
    /// Lock page scrolling while showing.
    pub handle_scroll_bars: bool,
    /// Persistence namespace.
    #[serde(alias = "LSItemKey")]
    pub storage_key: String,
    /// Run setup before mount instead of after.
    pub setup_before_mount: bool,
    /// Delay before listeners attach once armed, in seconds.
    pub inactive_seconds: f64,
    /// Minimum per-sample pointer speed toward an edge, in pixels.
    pub edge_sensitivity: f64,
    /// Distance from an edge at which pointer monitoring starts, in pixels.
    pub edge_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        let edge = EdgeOptions::default();
        Self {
            repeat_after_days: 0.0,
            scroll_percentage_to_trigger: 0.0,
            delay_seconds_and_trigger: 0.0,
            trigger_on_exit_intent: true,
            touch_device_sensitivity: 15.0,
            scroll_debounce_millis: 300,
            trigger_on_page_load: false,
            handle_scroll_bars: false,
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            setup_before_mount: false,
            inactive_seconds: 0.0,
            edge_sensitivity: edge.sensitivity,
            edge_threshold: edge.threshold,
        }
    }
}

impl Config {
    /// Parses options from JSON and validates them.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every option is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pct = self.scroll_percentage_to_trigger;
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(ConfigError::ScrollPercentage(pct));
        }
        for (field, value) in [
            ("repeatAfterDays", self.repeat_after_days),
            ("delaySecondsAndTrigger", self.delay_seconds_and_trigger),
            ("inactiveSeconds", self.inactive_seconds),
            ("touchDeviceSensitivity", self.touch_device_sensitivity),
            ("edgeSensitivity", self.edge_sensitivity),
            ("edgeThreshold", self.edge_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        if self.storage_key.is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        Ok(())
    }

    /// Sets [`repeat_after_days`](Self::repeat_after_days).
    #[must_use]
    pub fn with_repeat_after_days(mut self, days: f64) -> Self {
        self.repeat_after_days = days;
        self
    }

    /// Sets [`scroll_percentage_to_trigger`](Self::scroll_percentage_to_trigger).
    #[must_use]
    pub fn with_scroll_percentage_to_trigger(mut self, percent: f64) -> Self {
        self.scroll_percentage_to_trigger = percent;
        self
    }

    /// Sets [`delay_seconds_and_trigger`](Self::delay_seconds_and_trigger).
    #[must_use]
    pub fn with_delay_seconds_and_trigger(mut self, seconds: f64) -> Self {
        self.delay_seconds_and_trigger = seconds;
        self
    }

    /// Sets [`trigger_on_exit_intent`](Self::trigger_on_exit_intent).
    #[must_use]
    pub fn with_trigger_on_exit_intent(mut self, enabled: bool) -> Self {
        self.trigger_on_exit_intent = enabled;
        self
    }

    /// Sets [`touch_device_sensitivity`](Self::touch_device_sensitivity).
    #[must_use]
    pub fn with_touch_device_sensitivity(mut self, sensitivity: f64) -> Self {
        self.touch_device_sensitivity = sensitivity;
        self
    }

    /// Sets [`scroll_debounce_millis`](Self::scroll_debounce_millis).
    #[must_use]
    pub fn with_scroll_debounce_millis(mut self, millis: u64) -> Self {
        self.scroll_debounce_millis = millis;
        self
    }

    /// Sets [`trigger_on_page_load`](Self::trigger_on_page_load).
    #[must_use]
    pub fn with_trigger_on_page_load(mut self, enabled: bool) -> Self {
        self.trigger_on_page_load = enabled;
        self
    }

    /// Sets [`handle_scroll_bars`](Self::handle_scroll_bars).
    #[must_use]
    pub fn with_handle_scroll_bars(mut self, enabled: bool) -> Self {
        self.handle_scroll_bars = enabled;
        self
    }

    /// Sets [`storage_key`](Self::storage_key).
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Sets [`setup_before_mount`](Self::setup_before_mount).
    #[must_use]
    pub fn with_setup_before_mount(mut self, enabled: bool) -> Self {
        self.setup_before_mount = enabled;
        self
    }

    /// Sets [`inactive_seconds`](Self::inactive_seconds).
    #[must_use]
    pub fn with_inactive_seconds(mut self, seconds: f64) -> Self {
        self.inactive_seconds = seconds;
        self
    }

    /// Sets the pointer edge tuning.
    #[must_use]
    pub fn with_edge_options(mut self, options: EdgeOptions) -> Self {
        self.edge_sensitivity = options.sensitivity;
        self.edge_threshold = options.threshold;
        self
    }

    /// Pointer edge tuning.
    #[must_use]
    pub fn edge_options(&self) -> EdgeOptions {
        EdgeOptions {
            sensitivity: self.edge_sensitivity,
            threshold: self.edge_threshold,
        }
    }

    /// Scroll debounce window.
    #[must_use]
    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_millis)
    }

    /// Delay before the unconditional fire, if enabled.
    #[must_use]
    pub fn trigger_delay(&self) -> Option<Duration> {
        seconds(self.delay_seconds_and_trigger)
    }

    /// Delay before listeners attach, if any.
    #[must_use]
    pub fn inactive_delay(&self) -> Option<Duration> {
        seconds(self.inactive_seconds)
    }

    /// Whether the scroll-percentage path is enabled.
    #[must_use]
    pub fn scroll_trigger_enabled(&self) -> bool {
        self.scroll_percentage_to_trigger > 0.0
    }
}

fn seconds(value: f64) -> Option<Duration> {
    if value > 0.0 {
        Duration::try_from_secs_f64(value).ok()
    } else {
        None
    }
}
