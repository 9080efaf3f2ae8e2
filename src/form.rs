use chrono::{DateTime, Utc};

use crate::clock::{WallClockMoment, ZonedClock};
use crate::settings::{DEFAULT_DURATION_MINUTES, Settings};

/// Editable settings fields as the presentation layer hands them over:
/// `date` is `YYYY-MM-DD`, `time` is `HH:MM` or `HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsForm {
    pub duration_minutes: String,
    pub date: String,
    pub time: String,
    pub show_meta: bool,
}

impl SettingsForm {
    /// Fills the fields from the resolved target in zone-local terms, so the
    /// form always shows a concrete date even when the stored target is the
    /// computed default.
    pub fn populate(clock: &ZonedClock, settings: &Settings, now: DateTime<Utc>) -> Self {
        let target = clock.components_of(settings.resolve_target(clock, now));
        Self {
            duration_minutes: settings.duration_minutes.to_string(),
            date: format!("{:04}-{:02}-{:02}", target.year, target.month_index + 1, target.day),
            time: format!("{:02}:{:02}:{:02}", target.hour, target.minute, target.second),
            show_meta: settings.show_meta,
        }
    }

    /// Duration falls back to the default on garbage and is clamped to at
    /// least one minute; the target is kept only when both date and time
    /// fields parse.
    pub fn parse(&self) -> Settings {
        let duration_minutes = self
            .duration_minutes
            .trim()
            .parse::<u32>()
            .unwrap_or(DEFAULT_DURATION_MINUTES)
            .max(1);

        let target = match (parse_date(&self.date), parse_time(&self.time)) {
            (Some((year, month_index, day)), Some((hour, minute, second))) => {
                Some(WallClockMoment::new(year, month_index, day, hour, minute, second))
            }
            _ => None,
        };

        Settings {
            duration_minutes,
            show_meta: self.show_meta,
            target,
        }
    }
}

fn parse_date(value: &str) -> Option<(i32, u32, u32)> {
    let mut parts = value.trim().splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    if year == 0 || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some((year, month - 1, day))
}

fn parse_time(value: &str) -> Option<(u32, u32, u32)> {
    let mut parts = value.trim().split(':');
    let hour: u32 = parts.next()?.trim().parse().ok()?;
    let minute: u32 = parts.next()?.trim().parse().ok()?;
    let second: u32 = match parts.next() {
        Some(text) => text.trim().parse().ok()?,
        None => 0,
    };
    if hour >= 24 || minute >= 60 || second >= 60 {
        return None;
    }
    Some((hour, minute, second))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lagos() -> ZonedClock {
        ZonedClock::new(chrono_tz::Africa::Lagos)
    }

    #[test]
    fn populate_shows_the_explicit_target() {
        let clock = lagos();
        let settings = Settings {
            duration_minutes: 45,
            show_meta: false,
            target: Some(WallClockMoment::new(2025, 11, 31, 23, 59, 30)),
        };
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().unwrap();

        let form = SettingsForm::populate(&clock, &settings, now);

        assert_eq!(form.duration_minutes, "45");
        assert_eq!(form.date, "2025-12-31");
        assert_eq!(form.time, "23:59:30");
        assert!(!form.show_meta);
    }

    #[test]
    fn populate_resolves_the_default_target() {
        let clock = lagos();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single().unwrap();

        let form = SettingsForm::populate(&clock, &Settings::default(), now);

        assert_eq!(form.date, "2025-01-01");
        assert_eq!(form.time, "00:00:00");
    }

    #[test]
    fn parse_keeps_a_complete_target() {
        let form = SettingsForm {
            duration_minutes: "30".to_owned(),
            date: "2025-12-31".to_owned(),
            time: "23:00".to_owned(),
            show_meta: true,
        };

        let settings = form.parse();

        assert_eq!(settings.duration_minutes, 30);
        assert_eq!(
            settings.target,
            Some(WallClockMoment::new(2025, 11, 31, 23, 0, 0)),
            "seconds default to zero when omitted"
        );
    }

    #[test]
    fn parse_drops_the_target_when_either_field_is_missing() {
        let no_time = SettingsForm {
            duration_minutes: "30".to_owned(),
            date: "2025-12-31".to_owned(),
            time: String::new(),
            show_meta: true,
        };
        assert!(no_time.parse().target.is_none());

        let no_date = SettingsForm {
            duration_minutes: "30".to_owned(),
            date: String::new(),
            time: "23:00:00".to_owned(),
            show_meta: true,
        };
        assert!(no_date.parse().target.is_none());
    }

    #[test]
    fn parse_recovers_from_garbage_duration() {
        let garbage = SettingsForm {
            duration_minutes: "abc".to_owned(),
            ..SettingsForm::default()
        };
        assert_eq!(garbage.parse().duration_minutes, DEFAULT_DURATION_MINUTES);

        let zero = SettingsForm {
            duration_minutes: "0".to_owned(),
            ..SettingsForm::default()
        };
        assert_eq!(zero.parse().duration_minutes, 1, "clamped to at least a minute");
    }

    #[test]
    fn parse_rejects_out_of_range_times() {
        let form = SettingsForm {
            duration_minutes: "60".to_owned(),
            date: "2025-12-31".to_owned(),
            time: "25:70".to_owned(),
            show_meta: true,
        };
        assert!(form.parse().target.is_none(), "there is no 25th hour");

        let bad_seconds = SettingsForm {
            time: "23:00:61".to_owned(),
            ..form
        };
        assert!(bad_seconds.parse().target.is_none());
    }

    #[test]
    fn parse_rejects_out_of_range_dates() {
        let form = SettingsForm {
            duration_minutes: "60".to_owned(),
            date: "2025-13-01".to_owned(),
            time: "12:00:00".to_owned(),
            show_meta: true,
        };
        assert!(form.parse().target.is_none());

        let bad_day = SettingsForm {
            date: "2025-12-32".to_owned(),
            ..form
        };
        assert!(bad_day.parse().target.is_none());
    }

    #[test]
    fn parse_rejects_partial_dates() {
        let form = SettingsForm {
            duration_minutes: "60".to_owned(),
            date: "2025-00-10".to_owned(),
            time: "12:00:00".to_owned(),
            show_meta: true,
        };
        assert!(form.parse().target.is_none(), "a zero month is not a date");
    }
}
