//! Time-of-day helpers. Reminder times are stored and compared in UTC.

use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta, Timelike, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid time of day {0:?}, expected HH:MM or HH:MM:SS")]
    InvalidTimeOfDay(String),

    #[error("invalid UTC offset {0:?}, expected +HH:MM or -HH:MM")]
    InvalidOffset(String),
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, TimeError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| TimeError::InvalidTimeOfDay(value.to_string()))
}

/// Parse `+HH:MM`, `-HH:MM` or `Z`.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, TimeError> {
    let value = value.trim();
    let invalid = || TimeError::InvalidOffset(value.to_string());
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match value.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours = two_digits(hours).ok_or_else(invalid)?;
    let minutes = two_digits(minutes).ok_or_else(invalid)?;
    if hours > 14 || minutes >= 60 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Exactly two ASCII digits, no sign.
fn two_digits(value: &str) -> Option<i32> {
    match value.as_bytes() {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(i32::from(a - b'0') * 10 + i32::from(b - b'0'))
        }
        _ => None,
    }
}

/// Convert a wall-clock time authored at `offset` into UTC, wrapping across midnight.
pub fn local_to_utc(local: NaiveTime, offset: FixedOffset) -> NaiveTime {
    let shift = TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    let (utc, _) = local.overflowing_sub_signed(shift);
    utc
}

/// Current UTC time of day at one-minute resolution.
pub fn truncate_to_minute(now: DateTime<Utc>) -> NaiveTime {
    minute_of(now.time())
}

/// Drop seconds and sub-seconds from a time of day.
pub fn minute_of(time: NaiveTime) -> NaiveTime {
    let secs = time.num_seconds_from_midnight();
    NaiveTime::from_num_seconds_from_midnight_opt(secs - secs % 60, 0).unwrap_or(NaiveTime::MIN)
}

pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}
