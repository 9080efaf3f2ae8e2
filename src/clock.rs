use anyhow::Context;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A date-time as naive components, interpreted in the clock's fixed zone.
/// The month is 0-based to match the persisted settings blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallClockMoment {
    pub year: i32,
    pub month_index: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl WallClockMoment {
    pub fn new(year: i32, month_index: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year,
            month_index,
            day,
            hour,
            minute,
            second,
        }
    }

    fn as_naive(&self) -> anyhow::Result<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month_index + 1, self.day)
            .with_context(|| {
                format!(
                    "invalid calendar date {}-{:02}-{:02}",
                    self.year,
                    self.month_index + 1,
                    self.day
                )
            })?;
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, self.second)
            .with_context(|| {
                format!(
                    "invalid clock time {:02}:{:02}:{:02}",
                    self.hour, self.minute, self.second
                )
            })?;
        Ok(date.and_time(time))
    }
}

/// Converts between zone-local wall-clock components and absolute instants.
/// All duration arithmetic happens on the instants it hands out, never on
/// raw components.
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock {
    zone: Tz,
}

impl ZonedClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Difference between the zone's wall-clock reading of `instant` and UTC,
    /// in milliseconds. Recomputed per instant so DST-observing zones stay
    /// correct across transitions.
    pub fn zone_offset_millis(&self, instant: DateTime<Utc>) -> i64 {
        let wall = instant.with_timezone(&self.zone).naive_local();
        let as_utc = Utc.from_utc_datetime(&wall);
        (as_utc - instant).num_milliseconds()
    }

    /// Resolves zone-local components to an absolute instant. The naive
    /// components form a first UTC guess, which is then corrected once by
    /// the offset observed at that guess. Near a DST transition the first
    /// approximation wins; doubled or skipped local times are not
    /// disambiguated further.
    pub fn to_instant(&self, moment: &WallClockMoment) -> anyhow::Result<DateTime<Utc>> {
        let guess = Utc.from_utc_datetime(&moment.as_naive()?);
        let offset = self.zone_offset_millis(guess);
        Ok(guess - Duration::milliseconds(offset))
    }

    pub fn components_of(&self, instant: DateTime<Utc>) -> WallClockMoment {
        let local = instant.with_timezone(&self.zone);
        WallClockMoment {
            year: local.year(),
            month_index: local.month0(),
            day: local.day(),
            hour: local.hour(),
            minute: local.minute(),
            second: local.second(),
        }
    }

    /// January 1st 00:00:00 of the year after `now`'s zone-local year.
    pub fn next_new_year(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let year = self.components_of(now).year + 1;
        let new_year = WallClockMoment::new(year, 0, 1, 0, 0, 0);
        self.to_instant(&new_year)
            .expect("January 1st 00:00:00 is always a valid moment")
    }

    /// 00:00:00 of the day after `now`'s zone-local date.
    pub fn next_midnight(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.with_timezone(&self.zone).date_naive();
        let tomorrow = today.succ_opt().expect("not within a day of the calendar limit");
        let midnight =
            WallClockMoment::new(tomorrow.year(), tomorrow.month0(), tomorrow.day(), 0, 0, 0);
        self.to_instant(&midnight)
            .expect("components taken from a valid date")
    }

    pub fn format_date_time(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.zone)
            .format("%a, %b %-d, %Y, %H:%M:%S")
            .to_string()
    }

    pub fn format_clock_time(&self, instant: DateTime<Utc>) -> String {
        instant.with_timezone(&self.zone).format("%H:%M").to_string()
    }
}
