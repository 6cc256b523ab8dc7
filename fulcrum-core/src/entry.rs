//! One occurrence row in a repeat form.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::constants::END_BEFORE_START;

/// Stable identity of an entry. Assigned once, never reused within a synchroniser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(pub(crate) u64);

impl EntryId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Advisory state of a field, read by whatever validates the form on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Validity {
    #[default]
    Valid,
    Invalid(String),
}

impl Validity {
    /// The custom validity message; empty means valid.
    pub fn message(&self) -> &str {
        match self {
            Validity::Valid => "",
            Validity::Invalid(message) => message,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }
}

impl From<Validity> for String {
    fn from(validity: Validity) -> Self {
        validity.message().to_string()
    }
}

/// A start/end pair. The validity message belongs to the end field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeEntry {
    pub id: EntryId,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub validity: Validity,
}

impl TimeEntry {
    pub(crate) fn new(id: EntryId, start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        TimeEntry {
            id,
            start,
            end,
            validity: Validity::Valid,
        }
    }

    /// Recompute the end field's validity. Returns true if it changed.
    pub(crate) fn validate_end(&mut self) -> bool {
        let validity = match (self.start, self.end) {
            (Some(start), Some(end)) if start >= end => Validity::Invalid(END_BEFORE_START.into()),
            _ => Validity::Valid,
        };
        let changed = validity != self.validity;
        self.validity = validity;
        changed
    }

    pub fn has_start(&self) -> bool {
        self.start.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn end_before_start_is_invalid() {
        let mut entry = TimeEntry::new(EntryId(0), Some(at(12)), Some(at(10)));
        assert!(entry.validate_end());
        assert_eq!(entry.validity.message(), END_BEFORE_START);
    }

    #[test]
    fn end_equal_to_start_is_invalid() {
        let mut entry = TimeEntry::new(EntryId(0), Some(at(12)), Some(at(12)));
        entry.validate_end();
        assert!(!entry.validity.is_valid());
    }

    #[test]
    fn missing_side_is_valid() {
        let mut entry = TimeEntry::new(EntryId(0), None, Some(at(10)));
        assert!(!entry.validate_end());
        assert_eq!(entry.validity.message(), "");
    }

    #[test]
    fn revalidating_unchanged_state_reports_no_change() {
        let mut entry = TimeEntry::new(EntryId(0), Some(at(10)), Some(at(12)));
        assert!(!entry.validate_end());
        assert!(!entry.validate_end());
    }
}
