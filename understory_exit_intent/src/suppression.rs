// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persisted suppression state: last-fired timestamp and permanent opt-out.
//!
//! Two string entries live in [`Storage`]:
//!
//! | Key                        | Value                                   |
//! |----------------------------|-----------------------------------------|
//! | `storage_key`              | epoch millis of the last fire, as JSON  |
//! | `storage_key-unsubscribed` | `true` once the user opted out          |
//!
//! Missing and unparsable values both read as "never happened".

use alloc::borrow::ToOwned;
use alloc::format;
use alloc::string::{String, ToString};

use crate::config::Config;
use crate::platform::Storage;

/// Milliseconds in a day.
pub const DAY_MILLIS: u64 = 86_400_000;

/// Suffix appended to the storage key for the opt-out flag.
pub const UNSUBSCRIBED_SUFFIX: &str = "-unsubscribed";

/// Key pair for one exit-intent namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuppressionRecord {
    key: String,
    unsubscribed_key: String,
}

impl SuppressionRecord {
    /// Creates the key pair for `storage_key`.
    #[must_use]
    pub fn new(storage_key: &str) -> Self {
        Self {
            key: storage_key.to_owned(),
            unsubscribed_key: format!("{storage_key}{UNSUBSCRIBED_SUFFIX}"),
        }
    }

    /// Key of the last-fired timestamp.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key of the opt-out flag.
    #[must_use]
    pub fn unsubscribed_key(&self) -> &str {
        &self.unsubscribed_key
    }

    /// Epoch millis of the last fire, if one was recorded.
    pub fn last_fired(&self, storage: &impl Storage) -> Option<u64> {
        let raw = storage.get(&self.key)?;
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str::<u64>(&raw) {
            Ok(millis) => Some(millis),
            Err(err) => {
                tracing::warn!(key = %self.key, value = %raw, %err, "ignoring unparsable timestamp");
                None
            }
        }
    }

    /// Whether the user opted out.
    pub fn is_unsubscribed(&self, storage: &impl Storage) -> bool {
        let Some(raw) = storage.get(&self.unsubscribed_key) else {
            return false;
        };
        match serde_json::from_str::<bool>(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key = %self.unsubscribed_key, value = %raw, %err, "ignoring unparsable opt-out flag");
                false
            }
        }
    }

    /// Whether the cooldown allows arming again.
    ///
    /// - Nothing recorded: allowed.
    /// - `repeat_after_days` of zero (or less) with a record: never, until
    ///   cleared.
    /// - Otherwise: allowed once strictly more than `repeat_after_days` days
    ///   have passed since the record. Fractional days are honoured.
    pub fn is_expired(&self, storage: &impl Storage, repeat_after_days: f64, now: u64) -> bool {
        let Some(fired) = self.last_fired(storage) else {
            return true;
        };
        if repeat_after_days <= 0.0 {
            return false;
        }
        now.saturating_sub(fired) as f64 > repeat_after_days * DAY_MILLIS as f64
    }

    /// Records a fire at `now`.
    pub fn record_fire(&self, storage: &mut impl Storage, now: u64) {
        storage.set(&self.key, &now.to_string());
    }

    /// Records the permanent opt-out.
    pub fn record_unsubscribe(&self, storage: &mut impl Storage) {
        storage.set(&self.unsubscribed_key, "true");
    }

    /// Removes both entries.
    pub fn clear(&self, storage: &mut impl Storage) {
        storage.remove(&self.key);
        storage.remove(&self.unsubscribed_key);
    }
}

/// Whether the cooldown for `config`'s namespace has elapsed at `now`.
pub fn is_local_storage_expired(storage: &impl Storage, config: &Config, now: u64) -> bool {
    SuppressionRecord::new(&config.storage_key).is_expired(storage, config.repeat_after_days, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::MemoryStorage;

    const NOW: u64 = 1_700_000_000_000;

    #[test]
    fn keys_follow_storage_key() {
        let record = SuppressionRecord::new("vue-exit-intent");
        assert_eq!(record.key(), "vue-exit-intent");
        assert_eq!(record.unsubscribed_key(), "vue-exit-intent-unsubscribed");
    }

    #[test]
    fn nothing_recorded_is_expired() {
        let storage = MemoryStorage::new();
        let record = SuppressionRecord::new("k");
        assert!(record.is_expired(&storage, 0.0, NOW));
        assert!(record.is_expired(&storage, 7.0, NOW));
        assert!(!record.is_unsubscribed(&storage));
    }

    #[test]
    fn zero_days_suppresses_forever() {
        let mut storage = MemoryStorage::new();
        let record = SuppressionRecord::new("k");
        record.record_fire(&mut storage, NOW);

        assert!(!record.is_expired(&storage, 0.0, NOW + 1_000 * DAY_MILLIS));
    }

    #[test]
    fn cooldown_is_strict() {
        let mut storage = MemoryStorage::new();
        let record = SuppressionRecord::new("k");
        record.record_fire(&mut storage, NOW);

        assert!(!record.is_expired(&storage, 2.0, NOW + 2 * DAY_MILLIS));
        assert!(record.is_expired(&storage, 2.0, NOW + 2 * DAY_MILLIS + 1));
    }

    #[test]
    fn fractional_days_cooldown() {
        let mut storage = MemoryStorage::new();
        let record = SuppressionRecord::new("k");
        record.record_fire(&mut storage, NOW);

        assert!(!record.is_expired(&storage, 0.5, NOW + DAY_MILLIS / 2));
        assert!(record.is_expired(&storage, 0.5, NOW + DAY_MILLIS / 2 + 1));
    }

    #[test]
    fn future_timestamp_is_not_expired() {
        let mut storage = MemoryStorage::new();
        let record = SuppressionRecord::new("k");
        record.record_fire(&mut storage, NOW + DAY_MILLIS);
        assert!(!record.is_expired(&storage, 1.0, NOW));
    }

    #[test]
    fn stored_layout_is_plain_strings() {
        let mut storage = MemoryStorage::new();
        let record = SuppressionRecord::new("k");
        record.record_fire(&mut storage, NOW);
        record.record_unsubscribe(&mut storage);

        assert_eq!(storage.get("k").as_deref(), Some("1700000000000"));
        assert_eq!(storage.get("k-unsubscribed").as_deref(), Some("true"));
        assert_eq!(record.last_fired(&storage), Some(NOW));
        assert!(record.is_unsubscribed(&storage));
    }

    #[test]
    fn malformed_values_read_as_absent() {
        let mut storage = MemoryStorage::new();
        storage.set("k", "yesterday");
        storage.set("k-unsubscribed", "maybe");
        let record = SuppressionRecord::new("k");

        assert_eq!(record.last_fired(&storage), None);
        assert!(record.is_expired(&storage, 0.0, NOW));
        assert!(!record.is_unsubscribed(&storage));

        storage.set("k", "");
        assert!(record.is_expired(&storage, 0.0, NOW));
    }

    #[test]
    fn config_namespace_and_cooldown() {
        let mut storage = MemoryStorage::new();
        let config = Config::default()
            .with_storage_key("promo")
            .with_repeat_after_days(1.0);
        SuppressionRecord::new("promo").record_fire(&mut storage, NOW);

        assert!(!is_local_storage_expired(&storage, &config, NOW + DAY_MILLIS));
        assert!(is_local_storage_expired(&storage, &config, NOW + DAY_MILLIS + 1));
        assert!(is_local_storage_expired(
            &storage,
            &config.with_storage_key("other"),
            NOW
        ));
    }

    #[test]
    fn explicit_false_opt_out() {
        let mut storage = MemoryStorage::new();
        storage.set("k-unsubscribed", "false");
        assert!(!SuppressionRecord::new("k").is_unsubscribed(&storage));
    }

    #[test]
    fn clear_removes_both_keys() {
        let mut storage = MemoryStorage::new();
        let record = SuppressionRecord::new("k");
        record.record_fire(&mut storage, NOW);
        record.record_unsubscribe(&mut storage);

        record.clear(&mut storage);
        record.clear(&mut storage);

        assert!(storage.is_empty());
    }
}
