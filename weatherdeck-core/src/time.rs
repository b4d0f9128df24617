//! Local time labels computed from a provider-supplied UTC offset.
//!
//! Nothing here looks at the caller's clock or timezone database: an instant
//! is shifted by the offset the provider reported and then formatted.

use chrono::{DateTime, FixedOffset, Utc};
use std::fmt::Write;

use crate::error::WeatherError;

/// Weekday abbreviation, e.g. "Mon".
pub const WEEKDAY_PATTERN: &str = "%a";
/// Twelve-hour clock, e.g. "03:00 PM".
pub const CLOCK_PATTERN: &str = "%I:%M %p";
/// Header label, e.g. "Tue 05 Mar 2024 | Local time: 03:00 PM".
pub const FULL_PATTERN: &str = "%a %d %b %Y | Local time: %I:%M %p";

/// Resolve an epoch instant at a fixed UTC offset.
pub fn local_datetime(epoch_secs: i64, offset_secs: i32) -> Result<DateTime<FixedOffset>, WeatherError> {
    let offset = FixedOffset::east_opt(offset_secs).ok_or_else(|| {
        WeatherError::ProviderShape(format!("UTC offset {offset_secs}s is out of range"))
    })?;
    let utc = DateTime::<Utc>::from_timestamp(epoch_secs, 0).ok_or_else(|| {
        WeatherError::ProviderShape(format!("timestamp {epoch_secs} is out of range"))
    })?;

    Ok(utc.with_timezone(&offset))
}

/// Format `epoch_secs` as wall-clock time at `offset_secs` using a strftime pattern.
pub fn format_local_time(
    epoch_secs: i64,
    offset_secs: i32,
    pattern: &str,
) -> Result<String, WeatherError> {
    let local = local_datetime(epoch_secs, offset_secs)?;

    let mut out = String::new();
    write!(out, "{}", local.format(pattern))
        .map_err(|_| WeatherError::Format(format!("invalid pattern '{pattern}'")))?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-05T00:00:00Z, a Tuesday.
    const TUE_MIDNIGHT_UTC: i64 = 1_709_596_800;

    #[test]
    fn weekday_uses_offset_not_utc() {
        assert_eq!(format_local_time(TUE_MIDNIGHT_UTC, 0, WEEKDAY_PATTERN).unwrap(), "Tue");
        assert_eq!(format_local_time(TUE_MIDNIGHT_UTC, -3600, WEEKDAY_PATTERN).unwrap(), "Mon");
    }

    #[test]
    fn clock_is_twelve_hour_with_meridiem() {
        let t = TUE_MIDNIGHT_UTC + 15 * 3600;
        assert_eq!(format_local_time(t, 0, CLOCK_PATTERN).unwrap(), "03:00 PM");
        assert_eq!(format_local_time(t, 9 * 3600, CLOCK_PATTERN).unwrap(), "12:00 AM");
    }

    #[test]
    fn full_pattern_label() {
        let t = TUE_MIDNIGHT_UTC + 15 * 3600;
        assert_eq!(
            format_local_time(t, 0, FULL_PATTERN).unwrap(),
            "Tue 05 Mar 2024 | Local time: 03:00 PM"
        );
    }

    #[test]
    fn out_of_range_offset_is_shape_error() {
        let err = format_local_time(TUE_MIDNIGHT_UTC, 90_000, CLOCK_PATTERN).unwrap_err();
        assert!(matches!(err, WeatherError::ProviderShape(_)));
    }

    #[test]
    fn bad_pattern_is_format_error() {
        let err = format_local_time(TUE_MIDNIGHT_UTC, 0, "%Q").unwrap_err();
        assert!(matches!(err, WeatherError::Format(_)));
    }
}
