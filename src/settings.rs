use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::clock::{WallClockMoment, ZonedClock};
use crate::storage::KeyValueStore;

pub const STORAGE_KEY: &str = "crossover-settings";
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Persisted user configuration. Immutable once loaded; a tick never mutates
/// it, only explicit apply/reset/start-now actions write a new full record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub duration_minutes: u32,
    pub show_meta: bool,
    pub target: Option<WallClockMoment>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_DURATION_MINUTES,
            show_meta: true,
            target: None,
        }
    }
}

impl Settings {
    /// An explicit target wins; otherwise the next New Year in the zone. A
    /// stored target that is not a real calendar date falls back to the
    /// computed default so the display keeps running.
    pub fn resolve_target(&self, clock: &ZonedClock, now: DateTime<Utc>) -> DateTime<Utc> {
        match &self.target {
            Some(moment) => match clock.to_instant(moment) {
                Ok(instant) => instant,
                Err(err) => {
                    log::warn!("Stored target is unusable, falling back to next New Year: {err:#}");
                    clock.next_new_year(now)
                }
            },
            None => clock.next_new_year(now),
        }
    }
}

/// Owns the parsing/serialization contract for the settings blob.
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// A missing or unparseable blob yields the full default record. A
    /// parseable blob with bad fields falls back per field, so garbage in
    /// one field never poisons the others.
    pub fn load(&self) -> Settings {
        let Some(raw) = self.store.get(STORAGE_KEY) else {
            return Settings::default();
        };

        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Stored settings are not valid json, using defaults: {err}");
                return Settings::default();
            }
        };

        Settings {
            duration_minutes: duration_minutes_from(parsed.get("durationMinutes")),
            show_meta: parsed.get("showMeta").and_then(Value::as_bool).unwrap_or(true),
            target: parsed
                .get("target")
                .and_then(|value| serde_json::from_value(value.clone()).ok()),
        }
    }

    /// Always writes the full record, never a partial patch.
    pub fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        let raw = serde_json::to_string(settings)?;
        self.store.set(STORAGE_KEY, &raw)
    }

    pub fn reset(&self) -> anyhow::Result<Settings> {
        let defaults = Settings::default();
        self.save(&defaults)?;
        Ok(defaults)
    }
}

// Numeric coercion: plain numbers and numeric strings are accepted,
// anything non-positive or non-numeric falls back to the default.
fn duration_minutes_from(value: Option<&Value>) -> u32 {
    let minutes = match value {
        Some(Value::Number(number)) => number.as_u64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    };

    minutes
        .filter(|&m| m >= 1)
        .and_then(|m| u32::try_from(m).ok())
        .unwrap_or(DEFAULT_DURATION_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryKeyValueStore;
    use proptest::prelude::*;

    fn store_with(raw: Option<&str>) -> SettingsStore {
        let kv = InMemoryKeyValueStore::new();
        if let Some(raw) = raw {
            kv.set(STORAGE_KEY, raw).unwrap();
        }
        SettingsStore::new(Arc::new(kv))
    }

    #[test]
    fn missing_blob_loads_defaults() {
        assert_eq!(store_with(None).load(), Settings::default());
    }

    #[test]
    fn corrupt_blob_loads_full_defaults() {
        let settings = store_with(Some("{not json")).load();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.duration_minutes, 60);
        assert!(settings.show_meta);
        assert!(settings.target.is_none());
    }

    #[test]
    fn bad_fields_fall_back_independently() {
        let settings =
            store_with(Some(r#"{"durationMinutes":"90","showMeta":"yes","target":{"year":2025}}"#))
                .load();
        assert_eq!(settings.duration_minutes, 90, "numeric strings are coerced");
        assert!(settings.show_meta, "non-boolean showMeta means visible");
        assert!(settings.target.is_none(), "a partial target object is discarded");
    }

    #[test]
    fn show_meta_false_survives_loading() {
        let settings = store_with(Some(r#"{"showMeta":false}"#)).load();
        assert!(!settings.show_meta);
        assert_eq!(settings.duration_minutes, DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn zero_and_negative_durations_fall_back() {
        assert_eq!(store_with(Some(r#"{"durationMinutes":0}"#)).load().duration_minutes, 60);
        assert_eq!(store_with(Some(r#"{"durationMinutes":-5}"#)).load().duration_minutes, 60);
    }

    #[test]
    fn null_target_loads_as_none() {
        let settings = store_with(Some(r#"{"durationMinutes":15,"target":null}"#)).load();
        assert_eq!(settings.duration_minutes, 15);
        assert!(settings.target.is_none());
    }

    #[test]
    fn complete_target_is_kept() {
        let raw = r#"{"durationMinutes":30,"showMeta":false,"target":{"year":2025,"monthIndex":11,"day":31,"hour":23,"minute":0,"second":0}}"#;
        let settings = store_with(Some(raw)).load();
        assert_eq!(settings.target, Some(WallClockMoment::new(2025, 11, 31, 23, 0, 0)));
    }

    fn moment_strategy() -> impl Strategy<Value = WallClockMoment> {
        (1i32..=9999, 0u32..12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
            |(year, month_index, day, hour, minute, second)| {
                WallClockMoment::new(year, month_index, day, hour, minute, second)
            },
        )
    }

    fn settings_strategy() -> impl Strategy<Value = Settings> {
        (1u32..=100_000, any::<bool>(), proptest::option::of(moment_strategy())).prop_map(
            |(duration_minutes, show_meta, target)| Settings {
                duration_minutes,
                show_meta,
                target,
            },
        )
    }

    proptest! {
        #[test]
        fn save_then_load_round_trips(settings in settings_strategy()) {
            let store = store_with(None);
            store.save(&settings).unwrap();
            prop_assert_eq!(store.load(), settings);
        }
    }
}
