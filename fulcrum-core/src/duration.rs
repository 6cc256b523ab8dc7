//! The shared event duration and its `DD:HH:MM` text form.
//!
//! Parsing is strict: exactly two digits each for hours (`00`-`23`) and
//! minutes (`00`-`59`). The day field is two digits, or wider without a leading
//! zero once a series runs 100 days or more. Every string the parser accepts is
//! reproduced exactly by [`format_duration`], and everything it formats parses.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::constants::{INVALID_DURATION, MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE};
use crate::error::FulcrumError;

/// Length of every occurrence in a series, in milliseconds. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventDuration(i64);

impl EventDuration {
    pub const ZERO: EventDuration = EventDuration(0);

    /// Build from milliseconds, clamping negative input to zero.
    pub fn from_millis(ms: i64) -> Self {
        EventDuration(ms.max(0))
    }

    /// Build from a chrono delta, clamping negative deltas to zero.
    pub fn from_chrono(delta: chrono::Duration) -> Self {
        Self::from_millis(delta.num_milliseconds())
    }

    pub fn from_std(duration: std::time::Duration) -> Self {
        Self::from_millis(i64::try_from(duration.as_millis()).unwrap_or(i64::MAX))
    }

    /// Parse `DD:HH:MM`. Returns `None` for anything that isn't well formed.
    /// `"00:00:00"` is well formed and yields [`EventDuration::ZERO`].
    pub fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let n = bytes.len();
        if n < 8 || bytes[n - 6] != b':' || bytes[n - 3] != b':' {
            return None;
        }

        let days = day_field(&bytes[..n - 6])?;
        let hours = two_digits(bytes[n - 5], bytes[n - 4]).filter(|h| *h <= 23)?;
        let minutes = two_digits(bytes[n - 2], bytes[n - 1]).filter(|m| *m <= 59)?;

        let ms = days
            .checked_mul(24)?
            .checked_add(hours)?
            .checked_mul(60)?
            .checked_add(minutes)?
            .checked_mul(MS_PER_MINUTE)?;
        Some(EventDuration(ms))
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    pub fn to_chrono(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.0)
    }

    /// Zero means "no duration established yet".
    pub fn is_set(&self) -> bool {
        self.0 > 0
    }
}

/// Two digits, or more with no leading zero.
fn day_field(digits: &[u8]) -> Option<i64> {
    if digits.len() < 2 || (digits.len() > 2 && digits[0] == b'0') {
        return None;
    }
    digits.iter().try_fold(0i64, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(i64::from(b - b'0'))
    })
}

fn two_digits(tens: u8, ones: u8) -> Option<i64> {
    if tens.is_ascii_digit() && ones.is_ascii_digit() {
        Some(i64::from(tens - b'0') * 10 + i64::from(ones - b'0'))
    } else {
        None
    }
}

/// Format milliseconds as `DD:HH:MM`. Negative input is treated as zero.
/// Durations of 100 days or more widen the day field rather than wrapping.
pub fn format_duration(ms: i64) -> String {
    let ms = ms.max(0);
    let days = ms / MS_PER_DAY;
    let hours = (ms % MS_PER_DAY) / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;

    format!("{:02}:{:02}:{:02}", days, hours, minutes)
}

/// Parse `DD:HH:MM` into milliseconds; 0 means "no change".
pub fn parse_duration(text: &str) -> i64 {
    EventDuration::parse(text).map_or(0, |d| d.as_millis())
}

impl fmt::Display for EventDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

impl FromStr for EventDuration {
    type Err = FulcrumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventDuration::parse(s).ok_or_else(|| FulcrumError::InvalidDuration(INVALID_DURATION.into()))
    }
}

impl Serialize for EventDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn format_pads_each_field() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(2 * MS_PER_HOUR), "00:02:00");
        assert_eq!(
            format_duration(7 * MS_PER_DAY + MS_PER_HOUR + 30 * MS_PER_MINUTE),
            "07:01:30"
        );
    }

    #[test]
    fn format_clamps_negative_to_zero() {
        assert_eq!(format_duration(-5 * MS_PER_HOUR), "00:00:00");
    }

    #[test]
    fn format_drops_sub_minute_remainder() {
        assert_eq!(format_duration(MS_PER_MINUTE + 59_999), "00:00:01");
    }

    #[test]
    fn parse_computes_milliseconds() {
        assert_eq!(
            parse_duration("07:01:30"),
            ((7 * 24 + 1) * 60 + 30) * 60 * 1000
        );
        assert_eq!(parse_duration("00:02:00"), 2 * MS_PER_HOUR);
    }

    #[test]
    fn parse_rejects_wrong_shape() {
        for bad in [
            "", "7:01:30", "07:1:30", "07:01:3", "007:01:30", "07-01-30", " 07:01:30",
            "07:01:30 ", "aa:bb:cc", "+7:01:30", "07:01", "07:01:30:00",
        ] {
            assert_eq!(parse_duration(bad), 0, "'{}' should not parse", bad);
        }
    }

    #[test]
    fn wide_day_field_parses_back() {
        let ms = 152 * MS_PER_DAY + 3 * MS_PER_HOUR;
        assert_eq!(format_duration(ms), "152:03:00");
        assert_eq!(parse_duration("152:03:00"), ms);
    }

    #[test]
    fn wide_day_field_rejects_leading_zero_and_overflow() {
        assert_eq!(parse_duration("0152:03:00"), 0);
        assert_eq!(parse_duration("99999999999999999999:00:00"), 0);
    }

    #[test]
    fn largest_duration_formats_to_parseable_text() {
        let text = format_duration(i64::MAX);
        assert!(parse_duration(&text) > 0, "'{}' should parse", text);
    }

    #[test]
    fn parse_rejects_out_of_range_hours_and_minutes() {
        assert_eq!(parse_duration("00:24:00"), 0);
        assert_eq!(parse_duration("00:00:60"), 0);
        assert_eq!(parse_duration("99:23:59"), ((99 * 24 + 23) * 60 + 59) * 60 * 1000);
    }

    #[test]
    fn zero_is_well_formed_but_unset() {
        let zero = EventDuration::parse("00:00:00").unwrap();
        assert_eq!(zero, EventDuration::ZERO);
        assert!(!zero.is_set());
    }

    #[test]
    fn from_str_reports_fixed_message() {
        let err = "1 hour".parse::<EventDuration>().unwrap_err();
        assert_eq!(err.to_string(), INVALID_DURATION);
    }

    #[test]
    fn from_chrono_clamps_negative() {
        assert_eq!(
            EventDuration::from_chrono(chrono::Duration::hours(-3)),
            EventDuration::ZERO
        );
    }

    proptest! {
        #[test]
        fn format_reproduces_every_accepted_string(d in 0u32..100_000, h in 0u32..24, m in 0u32..60) {
            let text = format!("{:02}:{:02}:{:02}", d, h, m);
            prop_assert_eq!(format_duration(parse_duration(&text)), text);
        }
    }
}
