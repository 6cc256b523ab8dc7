//! Shared constants.

pub const MS_PER_MINUTE: i64 = 60_000;
pub const MS_PER_HOUR: i64 = 3_600_000;
pub const MS_PER_DAY: i64 = 86_400_000;

/// Spacing between repeats when the user hasn't laid down a pattern yet.
pub const DEFAULT_REPEAT_INTERVAL_DAYS: i64 = 7;

/// Largest spacing, either direction, `repeat_interval_days` may hold.
pub const MAX_REPEAT_INTERVAL_DAYS: i64 = 3650;

/// Timezone that form timestamps are interpreted in.
pub const DEFAULT_TIMEZONE: &str = "Europe/London";

/// Wire format of the start/end fields.
pub const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub const END_BEFORE_START: &str = "End time must be after start time";
pub const INVALID_DURATION: &str = "Invalid duration format, expected 'DD:HH:MM'";
pub const INVALID_DATETIME: &str = "Invalid date format, expected 'YYYY-MM-DDTHH:MM'";
pub const END_OUT_OF_RANGE: &str = "End time is out of range";
pub const END_MISMATCH: &str = "End time does not match the duration";
pub const END_BEFORE_START_SUBMIT: &str = "End time cannot be before start time";
pub const MISSING_START: &str = "Start time is required";
pub const MISMATCHED_TIMES: &str = "Mismatched number of start and end times";
