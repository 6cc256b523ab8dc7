//! The submit gate: turns a filled-in repeat form into concrete occurrences.
//!
//! The synchroniser only ever sets advisory messages; this is where they block.
//! Raw form text is checked the same way so that a request which never went
//! through the synchroniser gets the same treatment.

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use serde::Serialize;

use crate::constants::{
    END_BEFORE_START_SUBMIT, END_MISMATCH, END_OUT_OF_RANGE, MISMATCHED_TIMES, MISSING_START,
};
use crate::duration::EventDuration;
use crate::error::{FieldError, FulcrumError, FulcrumResult};
use crate::local_time::{localise, parse_field, parse_local_datetime};
use crate::sync::RecurrenceSync;

/// One concrete, timezone-aware occurrence of the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub start: DateTime<Tz>,
    pub end: Option<DateTime<Tz>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    #[serde(serialize_with = "serialize_tz")]
    pub timezone: Tz,
    pub duration: Option<EventDuration>,
    pub occurrences: Vec<Occurrence>,
}

fn serialize_tz<S: serde::Serializer>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(tz.name())
}

impl Submission {
    /// Gate a synchroniser's current state. Every missing start and every
    /// non-empty validity message is reported, not just the first.
    pub fn from_sync(sync: &RecurrenceSync, timezone: Tz) -> FulcrumResult<Self> {
        let mut errors = Vec::new();

        if !sync.duration_validity().is_valid() {
            errors.push(FieldError {
                field: "duration".into(),
                message: sync.duration_validity().message().into(),
            });
        }

        for (i, entry) in sync.entries().iter().enumerate() {
            if entry.start.is_none() {
                errors.push(FieldError {
                    field: format!("start_time[{}]", i),
                    message: MISSING_START.into(),
                });
            }
            if !entry.validity.is_valid() {
                errors.push(FieldError {
                    field: format!("end_time[{}]", i),
                    message: entry.validity.message().into(),
                });
            }
        }

        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "submission blocked");
            return Err(FulcrumError::Blocked(errors));
        }

        let rows = sync
            .entries()
            .iter()
            .filter_map(|e| e.start.map(|start| (start, e.end)))
            .collect();
        let duration = Some(sync.duration()).filter(EventDuration::is_set);

        build(rows, duration, timezone)
    }

    /// Check raw `start_time[]`, `end_time[]` and `duration` form values.
    ///
    /// An empty duration means none was given; empty end values mean the end
    /// is derived from the duration (or absent without one).
    pub fn from_form(
        start_times: &[&str],
        end_times: &[&str],
        duration: &str,
        timezone: Tz,
    ) -> FulcrumResult<Self> {
        let starts = start_times
            .iter()
            .map(|s| parse_local_datetime(s.trim()))
            .collect::<FulcrumResult<Vec<_>>>()?;

        let duration = if duration.trim().is_empty() {
            None
        } else {
            Some(duration.trim().parse::<EventDuration>()?)
        };

        if end_times.len() > starts.len() {
            return Err(FulcrumError::Occurrence(MISMATCHED_TIMES.into()));
        }
        let mut ends = end_times
            .iter()
            .map(|s| parse_field(s))
            .collect::<FulcrumResult<Vec<_>>>()?;
        ends.resize(starts.len(), None);

        build(starts.into_iter().zip(ends).collect(), duration, timezone)
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

fn build(
    rows: Vec<(NaiveDateTime, Option<NaiveDateTime>)>,
    duration: Option<EventDuration>,
    timezone: Tz,
) -> FulcrumResult<Submission> {
    let mut occurrences = Vec::with_capacity(rows.len());

    for (start, end) in rows {
        let expected = duration
            .map(|d| {
                start
                    .checked_add_signed(d.to_chrono())
                    .ok_or_else(|| FulcrumError::Occurrence(END_OUT_OF_RANGE.into()))
            })
            .transpose()?;
        let end = match (end, expected) {
            (None, Some(expected)) => Some(expected),
            (Some(end), Some(expected)) if end != expected => {
                return Err(FulcrumError::Occurrence(END_MISMATCH.into()));
            }
            (end, _) => end,
        };

        if end.is_some_and(|end| end < start) {
            return Err(FulcrumError::Occurrence(END_BEFORE_START_SUBMIT.into()));
        }

        occurrences.push(Occurrence {
            start: localise(&start, timezone)?,
            end: end.map(|end| localise(&end, timezone)).transpose()?,
        });
    }

    Ok(Submission {
        timezone,
        duration,
        occurrences,
    })
}
