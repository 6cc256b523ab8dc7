//! Core types for fulcrum.
//!
//! - `sync`: keeps the start/end fields of a repeat form in step with one shared duration
//! - `submission`: the submit gate that turns a form into concrete occurrences
//! - `ics`: iCalendar export of those occurrences

pub mod config;
pub mod constants;
pub mod duration;
pub mod entry;
pub mod error;
pub mod ics;
pub mod local_time;
pub mod submission;
pub mod sync;
pub mod transition;

pub use duration::{EventDuration, format_duration, parse_duration};
pub use entry::{EntryId, TimeEntry, Validity};
pub use error::{FieldError, FulcrumError, FulcrumResult};
pub use submission::{Occurrence, Submission};
pub use sync::{RecurrenceSync, SyncSnapshot};
pub use transition::{Operation, SyncObserver, Transition};
