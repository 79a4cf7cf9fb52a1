// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The arbiter: composes the detectors, applies persisted suppression, and
//! exposes the observable flags.
//!
//! ## Arming
//!
//! `is_allowed_to_get_triggered` is the single switch. Turning it on runs the
//! arming effect (page-load fire, delay timer, listener attachment, possibly
//! after `inactive_seconds`); turning it off tears down every listener and
//! timer across all detectors. Effects run synchronously inside the call that
//! flips the flag, so once any signal fires no other pending signal can.
//!
//! ## Driving
//!
//! The host forwards input with [`ExitIntent::handle_event`] and expired timers
//! with [`ExitIntent::handle_timer`]. Flag transitions are queued and can be
//! drained with [`ExitIntent::take_changes`].

use alloc::vec::Vec;

use kurbo::Size;
use understory_timing::TimerId;

use crate::config::{Config, ConfigError};
use crate::platform::{Event, Platform, Storage};
use crate::pointer::EdgeIntent;
use crate::scope::Scope;
use crate::scroll::{ScrollDepth, scroll_percentage};
use crate::suppression::SuppressionRecord;
use crate::touch::TouchScroll;
use crate::types::{ExitSignal, Flag, FlagChange, Flags, Phase};

/// Exit-intent engine over a host [`Platform`] and durable [`Storage`].
#[derive(Debug)]
pub struct ExitIntent<P, S> {
    config: Config,
    record: SuppressionRecord,
    platform: P,
    storage: S,
    flags: Flags,
    changes: Vec<FlagChange>,
    pointer: EdgeIntent,
    touch: TouchScroll,
    scroll: ScrollDepth,
    scope: Scope,
    delay_timer: Option<TimerId>,
    inactive_timer: Option<TimerId>,
    last_signal: Option<ExitSignal>,
}

impl<P: Platform, S: Storage> ExitIntent<P, S> {
    /// Creates an unarmed engine. Nothing is read from storage until
    /// [`setup`](Self::setup) (or the matching mount hook) runs.
    pub fn new(config: Config, platform: P, storage: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            record: SuppressionRecord::new(&config.storage_key),
            pointer: EdgeIntent::new(config.edge_options()),
            touch: TouchScroll::new(config.touch_device_sensitivity),
            scroll: ScrollDepth::new(config.scroll_debounce()),
            config,
            platform,
            storage,
            flags: Flags::default(),
            changes: Vec::new(),
            scope: Scope::new(),
            delay_timer: None,
            inactive_timer: None,
            last_signal: None,
        })
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The host platform.
    #[must_use]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Mutable access to the host platform.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// The durable storage.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consumes the engine, returning the platform and storage.
    pub fn into_parts(self) -> (P, S) {
        (self.platform, self.storage)
    }

    /// Current flags.
    #[must_use]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// `isShowing`.
    #[must_use]
    pub fn is_showing(&self) -> bool {
        self.flags.is_showing
    }

    /// `isAllowedToGetTriggered`.
    #[must_use]
    pub fn is_allowed_to_get_triggered(&self) -> bool {
        self.flags.is_allowed_to_get_triggered
    }

    /// `isUnsubscribed`.
    #[must_use]
    pub fn is_unsubscribed(&self) -> bool {
        self.flags.is_unsubscribed
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        Phase::from_flags(&self.flags, self.last_signal.is_some())
    }

    /// The signal that fired most recently in this session.
    #[must_use]
    pub fn last_signal(&self) -> Option<ExitSignal> {
        self.last_signal
    }

    /// Drains the queued flag transitions, oldest first.
    pub fn take_changes(&mut self) -> Vec<FlagChange> {
        core::mem::take(&mut self.changes)
    }

    /// The pointer detector.
    #[must_use]
    pub fn pointer(&self) -> &EdgeIntent {
        &self.pointer
    }

    /// The touch detector.
    #[must_use]
    pub fn touch(&self) -> &TouchScroll {
        &self.touch
    }

    /// The scroll detector.
    #[must_use]
    pub fn scroll(&self) -> &ScrollDepth {
        &self.scroll
    }

    /// Mount hook that runs before the host mounts its presentation layer.
    pub fn before_mount(&mut self) {
        if self.config.setup_before_mount {
            self.setup();
        }
    }

    /// Mount hook that runs once the presentation layer is mounted.
    pub fn mounted(&mut self) {
        if !self.config.setup_before_mount {
            self.setup();
        }
    }

    /// Reads persisted state and arms the engine if allowed.
    pub fn setup(&mut self) {
        let unsubscribed = self.record.is_unsubscribed(&self.storage);
        self.set_flag(Flag::Unsubscribed, unsubscribed);
        let expired = self.record.is_expired(
            &self.storage,
            self.config.repeat_after_days,
            self.platform.now_millis(),
        );
        tracing::debug!(expired, unsubscribed, "setup");
        self.set_armed(expired && !unsubscribed);
    }

    /// Hides the presentation layer. Does not re-arm.
    pub fn close(&mut self) {
        self.set_flag(Flag::Showing, false);
        if self.config.handle_scroll_bars {
            self.platform.set_scroll_locked(false);
        }
    }

    /// Clears persisted state and starts a fresh session.
    pub fn reset_state(&mut self) {
        self.record.clear(&mut self.storage);
        if self.set_flag(Flag::Showing, false) && self.config.handle_scroll_bars {
            self.platform.set_scroll_locked(false);
        }
        self.set_flag(Flag::Unsubscribed, false);
        self.last_signal = None;
        self.set_armed(true);
    }

    /// Persists the permanent opt-out and disarms.
    pub fn unsubscribe(&mut self) {
        self.record.record_unsubscribe(&mut self.storage);
        self.set_flag(Flag::Unsubscribed, true);
        self.set_armed(false);
    }

    /// Routes an input event to whichever detector is listening for it.
    pub fn handle_event(&mut self, event: &Event) {
        if let Some(signal) = self.pointer.handle_event(&mut self.platform, event) {
            self.fire(signal);
            return;
        }
        if let Some(signal) = self.touch.handle_event(&mut self.platform, event) {
            self.fire(signal);
            return;
        }
        self.scroll.handle_event(&mut self.platform, event);
    }

    /// Routes an expired timer to its owner. Unknown ids are ignored.
    pub fn handle_timer(&mut self, id: TimerId) {
        if self.scope.settle(id) {
            if self.delay_timer == Some(id) {
                self.delay_timer = None;
                self.fire(ExitSignal::Delay);
            } else if self.inactive_timer == Some(id) {
                self.inactive_timer = None;
                self.add_listeners();
            }
            return;
        }
        if let Some(signal) = self.pointer.on_timer(&mut self.platform, id) {
            self.fire(signal);
            return;
        }
        if self.scroll.on_timer(id) && self.scroll_depth_reached() {
            self.fire(ExitSignal::ScrollDepth);
        }
    }

    fn scroll_depth_reached(&self) -> bool {
        let Size { height, .. } = self.platform.viewport_size();
        scroll_percentage(
            self.platform.scroll_offset(),
            self.platform.document_height(),
            height,
        )
        .is_some_and(|pct| pct >= self.config.scroll_percentage_to_trigger)
    }

    fn fire(&mut self, signal: ExitSignal) {
        if !self.flags.is_allowed_to_get_triggered {
            tracing::trace!(?signal, "ignored while disarmed");
            return;
        }
        tracing::debug!(?signal, "exit intent");
        self.last_signal = Some(signal);
        self.set_flag(Flag::Showing, true);
        self.set_armed(false);
        let now = self.platform.now_millis();
        self.record.record_fire(&mut self.storage, now);
        if self.config.handle_scroll_bars {
            self.platform.set_scroll_locked(true);
        }
    }

    fn set_flag(&mut self, flag: Flag, value: bool) -> bool {
        let changed = self.flags.set(flag, value);
        if changed {
            self.changes.push(FlagChange { flag, value });
        }
        changed
    }

    fn set_armed(&mut self, armed: bool) {
        if !self.set_flag(Flag::AllowedToGetTriggered, armed) {
            return;
        }
        if armed {
            self.initialize();
        } else {
            self.disable();
        }
    }

    fn initialize(&mut self) {
        tracing::debug!("armed");
        if self.config.trigger_on_page_load {
            self.fire(ExitSignal::PageLoad);
            return;
        }
        if let Some(delay) = self.config.trigger_delay() {
            self.delay_timer = Some(self.scope.set_timeout(&mut self.platform, delay));
        }
        match self.config.inactive_delay() {
            Some(delay) => {
                self.inactive_timer = Some(self.scope.set_timeout(&mut self.platform, delay));
            }
            None => self.add_listeners(),
        }
    }

    fn add_listeners(&mut self) {
        if self.config.trigger_on_exit_intent {
            let touch = self.config.touch_device_sensitivity > 0.0
                && self.platform.touch_support().is_touch_capable();
            if touch {
                self.touch.add_touch_listeners(&mut self.platform);
            } else if self.pointer.has_triggered() {
                self.pointer.reset(&mut self.platform);
            } else {
                self.pointer.add_mouse_listener(&mut self.platform);
            }
        }
        if self.config.scroll_trigger_enabled() {
            self.scroll.add_scroll_listener(&mut self.platform);
        }
    }

    fn disable(&mut self) {
        self.pointer.remove_mouse_leave_listeners(&mut self.platform);
        self.scroll.remove_scroll_listeners(&mut self.platform);
        self.touch.remove_touch_device_listeners(&mut self.platform);
        self.scope.release(&mut self.platform);
        self.delay_timer = None;
        self.inactive_timer = None;
        tracing::debug!("disarmed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessPlatform, MemoryStorage};
    use crate::platform::{Listen, TouchSupport};

    fn engine(config: Config) -> ExitIntent<HeadlessPlatform, MemoryStorage> {
        let platform = HeadlessPlatform::new(Size::new(800.0, 600.0)).with_epoch_millis(1_000_000);
        ExitIntent::new(config, platform, MemoryStorage::new()).unwrap()
    }

    #[test]
    fn new_rejects_invalid_config() {
        let platform = HeadlessPlatform::new(Size::new(800.0, 600.0));
        let result = ExitIntent::new(
            Config::default().with_storage_key(""),
            platform,
            MemoryStorage::new(),
        );
        assert!(matches!(result, Err(ConfigError::EmptyStorageKey)));
    }

    #[test]
    fn starts_unarmed_without_listeners() {
        let intent = engine(Config::default());
        assert_eq!(intent.phase(), Phase::Unarmed);
        assert_eq!(intent.flags(), Flags::default());
        assert!(intent.platform().listeners().is_empty());
    }

    #[test]
    fn setup_arms_pointer_path_by_default() {
        let mut intent = engine(Config::default());
        intent.setup();

        assert_eq!(intent.phase(), Phase::Armed);
        assert_eq!(intent.platform().listeners(), Listen::POINTER);
        assert_eq!(
            intent.take_changes(),
            [FlagChange {
                flag: Flag::AllowedToGetTriggered,
                value: true,
            }]
        );
        assert!(intent.take_changes().is_empty());
    }

    #[test]
    fn touch_capable_runtime_uses_touch_path() {
        let platform = HeadlessPlatform::new(Size::new(400.0, 800.0))
            .with_touch_support(TouchSupport::TOUCH_SCREEN);
        let mut intent = ExitIntent::new(Config::default(), platform, MemoryStorage::new()).unwrap();
        intent.setup();
        assert_eq!(intent.platform().listeners(), Listen::TOUCH);
    }

    #[test]
    fn zero_touch_sensitivity_falls_back_to_pointer() {
        let platform = HeadlessPlatform::new(Size::new(400.0, 800.0))
            .with_touch_support(TouchSupport::TOUCH_SCREEN);
        let config = Config::default().with_touch_device_sensitivity(0.0);
        let mut intent = ExitIntent::new(config, platform, MemoryStorage::new()).unwrap();
        intent.setup();
        assert_eq!(intent.platform().listeners(), Listen::POINTER);
    }

    #[test]
    fn exit_intent_disabled_attaches_only_scroll() {
        let config = Config::default()
            .with_trigger_on_exit_intent(false)
            .with_scroll_percentage_to_trigger(50.0);
        let mut intent = engine(config);
        intent.setup();
        assert_eq!(intent.platform().listeners(), Listen::SCROLL);
    }

    #[test]
    fn fire_shows_disarms_and_persists() {
        let mut intent = engine(Config::default());
        intent.setup();
        intent.take_changes();

        intent.handle_event(&Event::VisibilityChange { hidden: true });

        assert!(intent.is_showing());
        assert!(!intent.is_allowed_to_get_triggered());
        assert_eq!(intent.phase(), Phase::Fired);
        assert_eq!(intent.last_signal(), Some(ExitSignal::Hidden));
        assert!(intent.platform().listeners().is_empty());
        assert!(intent.platform().timers().is_empty());
        assert_eq!(
            intent.storage().get("vue-exit-intent").as_deref(),
            Some("1000000")
        );
        assert_eq!(
            intent.take_changes(),
            [
                FlagChange {
                    flag: Flag::Showing,
                    value: true,
                },
                FlagChange {
                    flag: Flag::AllowedToGetTriggered,
                    value: false,
                },
            ]
        );
    }

    #[test]
    fn close_hides_without_rearming() {
        let mut intent = engine(Config::default().with_handle_scroll_bars(true));
        intent.setup();
        intent.handle_event(&Event::VisibilityChange { hidden: true });
        assert!(intent.platform().is_scroll_locked());

        intent.close();
        assert!(!intent.is_showing());
        assert!(!intent.is_allowed_to_get_triggered());
        assert!(!intent.platform().is_scroll_locked());
        assert_eq!(intent.phase(), Phase::Fired);
    }

    #[test]
    fn unsubscribe_disarms_and_persists() {
        let mut intent = engine(Config::default());
        intent.setup();
        intent.unsubscribe();

        assert!(intent.is_unsubscribed());
        assert!(!intent.is_allowed_to_get_triggered());
        assert_eq!(intent.phase(), Phase::Unsubscribed);
        assert!(intent.platform().listeners().is_empty());
        assert_eq!(
            intent.storage().get("vue-exit-intent-unsubscribed").as_deref(),
            Some("true")
        );
    }

    #[test]
    fn delay_fires_after_configured_seconds() {
        let mut intent = engine(Config::default().with_delay_seconds_and_trigger(2.0));
        intent.setup();

        while let Some(id) = intent.platform_mut().timers_mut().pop_due(1_999) {
            intent.handle_timer(id);
        }
        assert!(!intent.is_showing());

        while let Some(id) = intent.platform_mut().timers_mut().pop_due(2_000) {
            intent.handle_timer(id);
        }
        assert!(intent.is_showing());
        assert_eq!(intent.last_signal(), Some(ExitSignal::Delay));
    }

    #[test]
    fn inactive_seconds_postpone_listeners() {
        let mut intent = engine(Config::default().with_inactive_seconds(3.0));
        intent.setup();
        assert!(intent.is_allowed_to_get_triggered());
        assert!(intent.platform().listeners().is_empty());

        // Events before the listeners attach go nowhere.
        intent.handle_event(&Event::VisibilityChange { hidden: true });
        assert!(!intent.is_showing());

        let id = intent.platform_mut().timers_mut().pop_due(3_000).unwrap();
        intent.handle_timer(id);
        assert_eq!(intent.platform().listeners(), Listen::POINTER);
    }

    #[test]
    fn disarming_cancels_delay_and_inactive_timers() {
        let config = Config::default()
            .with_delay_seconds_and_trigger(5.0)
            .with_inactive_seconds(3.0);
        let mut intent = engine(config);
        intent.setup();
        assert_eq!(intent.platform().timers().len(), 2);

        intent.unsubscribe();
        assert!(intent.platform().timers().is_empty());
    }

    #[test]
    fn stale_timer_ids_are_ignored() {
        let mut intent = engine(Config::default());
        intent.setup();
        intent.handle_timer(TimerId(12_345));
        assert!(!intent.is_showing());
        assert!(intent.is_allowed_to_get_triggered());
    }

    #[test]
    fn reset_state_rearms_a_fired_pointer_detector() {
        let mut intent = engine(Config::default());
        intent.setup();
        intent.handle_event(&Event::VisibilityChange { hidden: true });
        assert!(intent.pointer().has_triggered());

        intent.reset_state();
        assert!(!intent.pointer().has_triggered());
        assert_eq!(intent.platform().listeners(), Listen::POINTER);
        assert!(intent.storage().is_empty());
        assert_eq!(intent.phase(), Phase::Armed);
        assert_eq!(intent.last_signal(), None);
    }
}
