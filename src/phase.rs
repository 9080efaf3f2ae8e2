use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::clock::ZonedClock;
use crate::settings::Settings;

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

pub const ELAPSED_STATUS: &str = "Happy New Year!";
pub const FINAL_COUNTDOWN_STATUS: &str = "Final hour to the crossover";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingWindow,
    FinalCountdown,
    Elapsed,
}

/// Whole hours/minutes/seconds for the digit display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeParts {
    pub const ZERO: TimeParts = TimeParts {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Floor decomposition of a millisecond span. Negative input is clamped
    /// to zero first, so the digits can never go negative.
    pub fn from_millis(total_ms: i64) -> Self {
        let total_seconds = total_ms.max(0) / MILLIS_PER_SECOND;
        Self {
            hours: total_seconds / 3600,
            minutes: (total_seconds % 3600) / 60,
            seconds: total_seconds % 60,
        }
    }
}

impl fmt::Display for TimeParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Everything the presentation layer needs for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownFrame {
    pub phase: Phase,
    pub remaining_ms: i64,
    pub display: TimeParts,
    pub status: String,
    pub target_text: String,
    pub now_text: String,
    pub window_start: Option<DateTime<Utc>>,
    pub show_meta: bool,
}

/// Pure phase derivation: no state survives between calls, so a settings
/// edit (including a target moved back into the future after elapsing) is
/// picked up by the very next evaluation.
pub fn evaluate(clock: &ZonedClock, now: DateTime<Utc>, settings: &Settings) -> CountdownFrame {
    let target = settings.resolve_target(clock, now);
    let remaining = (target - now).num_milliseconds();
    let duration_ms = i64::from(settings.duration_minutes) * MILLIS_PER_MINUTE;

    let target_text = clock.format_date_time(target);
    let now_text = clock.format_date_time(now);

    if remaining <= 0 {
        return CountdownFrame {
            phase: Phase::Elapsed,
            remaining_ms: remaining,
            display: TimeParts::ZERO,
            status: ELAPSED_STATUS.to_owned(),
            target_text,
            now_text,
            window_start: None,
            show_meta: settings.show_meta,
        };
    }

    if remaining > duration_ms {
        let window_start = target - Duration::milliseconds(duration_ms);
        let until_start = remaining - duration_ms;
        let days = until_start / MILLIS_PER_DAY;
        let hours = (until_start % MILLIS_PER_DAY) / MILLIS_PER_HOUR;
        let minutes = (until_start % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;

        return CountdownFrame {
            phase: Phase::AwaitingWindow,
            remaining_ms: remaining,
            // The digits preview the configured window length while waiting,
            // they are not a live countdown yet.
            display: TimeParts::from_millis(duration_ms),
            status: format!(
                "Countdown starts at {}. Starts in {days}d {hours}h {minutes}m.",
                clock.format_clock_time(window_start)
            ),
            target_text,
            now_text,
            window_start: Some(window_start),
            show_meta: settings.show_meta,
        };
    }

    CountdownFrame {
        phase: Phase::FinalCountdown,
        remaining_ms: remaining,
        display: TimeParts::from_millis(remaining),
        status: FINAL_COUNTDOWN_STATUS.to_owned(),
        target_text,
        now_text,
        window_start: None,
        show_meta: settings.show_meta,
    }
}
