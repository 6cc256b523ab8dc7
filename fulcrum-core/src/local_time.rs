//! Local timestamps as carried by the start/end fields (`YYYY-MM-DDTHH:MM`).

use chrono::{LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::constants::{INVALID_DATETIME, LOCAL_DATETIME_FORMAT};
use crate::error::{FulcrumError, FulcrumResult};

/// Parse a field value. Empty or whitespace-only input means "absent".
pub fn parse_field(value: &str) -> FulcrumResult<Option<NaiveDateTime>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    parse_local_datetime(value).map(Some)
}

/// Parse `YYYY-MM-DDTHH:MM` at minute resolution.
pub fn parse_local_datetime(value: &str) -> FulcrumResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, LOCAL_DATETIME_FORMAT)
        .map_err(|_| FulcrumError::InvalidDateTime(INVALID_DATETIME.into()))
}

pub fn format_local_datetime(value: &NaiveDateTime) -> String {
    value.format(LOCAL_DATETIME_FORMAT).to_string()
}

/// Format an optional field value; absent renders as an empty string.
pub fn format_field(value: Option<&NaiveDateTime>) -> String {
    value.map(format_local_datetime).unwrap_or_default()
}

/// Resolve a wall-clock time in `tz`.
/// Ambiguous times (clocks going back) take the earlier instant; times inside
/// a spring-forward gap don't exist and are rejected.
pub fn localise(value: &NaiveDateTime, tz: Tz) -> FulcrumResult<chrono::DateTime<Tz>> {
    match tz.from_local_datetime(value) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier),
        LocalResult::None => Err(FulcrumError::InvalidDateTime(format!(
            "{} does not exist in {}",
            format_local_datetime(value),
            tz.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn parses_wire_format() {
        assert_eq!(
            parse_local_datetime("2024-01-08T10:00").unwrap(),
            at(2024, 1, 8, 10, 0)
        );
    }

    #[test]
    fn rejects_seconds_and_timezone_suffix() {
        assert!(parse_local_datetime("2024-01-08T10:00:00").is_err());
        assert!(parse_local_datetime("2024-01-08T10:00Z").is_err());
        assert!(parse_local_datetime("2024-01-08 10:00").is_err());
    }

    #[test]
    fn empty_field_is_absent() {
        assert_eq!(parse_field("").unwrap(), None);
        assert_eq!(parse_field("   ").unwrap(), None);
        assert_eq!(
            parse_field("2024-01-08T10:00").unwrap(),
            Some(at(2024, 1, 8, 10, 0))
        );
    }

    #[test]
    fn bad_field_carries_fixed_message() {
        let err = parse_field("next tuesday").unwrap_err();
        assert_eq!(err.to_string(), INVALID_DATETIME);
    }

    #[test]
    fn format_round_trips_minutes() {
        assert_eq!(format_local_datetime(&at(2024, 1, 8, 12, 5)), "2024-01-08T12:05");
        assert_eq!(format_field(None), "");
    }

    #[test]
    fn localise_rejects_spring_forward_gap() {
        // 2024-03-31 01:30 doesn't exist in London.
        assert!(localise(&at(2024, 3, 31, 1, 30), chrono_tz::Europe::London).is_err());
    }

    #[test]
    fn localise_takes_earlier_instant_when_ambiguous() {
        let dt = localise(&at(2024, 10, 27, 1, 30), chrono_tz::Europe::London).unwrap();
        // Earlier instant is still BST (UTC+1).
        assert_eq!(dt.naive_utc().hour(), 0);
    }
}
