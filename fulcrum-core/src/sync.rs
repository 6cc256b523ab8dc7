//! Keeps the start/end fields of a repeat form consistent with one shared duration.
//!
//! Every public operation is a single state transition: it reads and writes
//! everything it needs, then reports one [`Transition`] to the observers.
//! Nothing here calls back into another public operation.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::constants::{DEFAULT_REPEAT_INTERVAL_DAYS, INVALID_DURATION};
use crate::duration::{EventDuration, format_duration};
use crate::entry::{EntryId, TimeEntry, Validity};
use crate::transition::{Operation, SyncObserver, Transition};

/// Owned view of the whole form, for rendering or submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSnapshot {
    pub duration: EventDuration,
    pub duration_text: String,
    pub duration_validity: Validity,
    pub entries: Vec<TimeEntry>,
    pub add_enabled: bool,
}

pub struct RecurrenceSync {
    duration: EventDuration,
    /// What the duration field currently shows, which may be malformed.
    duration_text: String,
    duration_validity: Validity,
    entries: Vec<TimeEntry>,
    next_id: u64,
    repeat_interval: Duration,
    observers: Vec<Box<dyn SyncObserver>>,
}

impl Default for RecurrenceSync {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecurrenceSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecurrenceSync")
            .field("duration", &self.duration)
            .field("duration_text", &self.duration_text)
            .field("entries", &self.entries)
            .field("repeat_interval", &self.repeat_interval)
            .finish_non_exhaustive()
    }
}

impl RecurrenceSync {
    /// A form with its single default row, nothing filled in.
    pub fn new() -> Self {
        Self::with_rows(Vec::new(), "")
    }

    /// A form pre-filled with rows and duration text, as rendered by the server.
    /// An empty row list still produces the default row. Call
    /// [`RecurrenceSync::initialise`] afterwards to derive state from it.
    pub fn with_rows<I>(rows: I, duration_text: &str) -> Self
    where
        I: IntoIterator<Item = (Option<NaiveDateTime>, Option<NaiveDateTime>)>,
    {
        let mut sync = RecurrenceSync {
            duration: EventDuration::ZERO,
            duration_text: duration_text.to_string(),
            duration_validity: Validity::Valid,
            entries: Vec::new(),
            next_id: 0,
            repeat_interval: Duration::days(DEFAULT_REPEAT_INTERVAL_DAYS),
            observers: Vec::new(),
        };

        for (start, end) in rows {
            let id = sync.allocate_id();
            sync.entries.push(TimeEntry::new(id, start, end));
        }
        if sync.entries.is_empty() {
            let id = sync.allocate_id();
            sync.entries.push(TimeEntry::new(id, None, None));
        }

        sync
    }

    /// Spacing used when there is no pattern to infer one from.
    pub fn with_repeat_interval(mut self, interval: Duration) -> Self {
        self.repeat_interval = interval;
        self
    }

    pub fn subscribe(&mut self, observer: impl SyncObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> Option<&TimeEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Id of the entry at `index` in list order.
    pub fn id_at(&self, index: usize) -> Option<EntryId> {
        self.entries.get(index).map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn duration(&self) -> EventDuration {
        self.duration
    }

    pub fn duration_text(&self) -> &str {
        &self.duration_text
    }

    pub fn duration_validity(&self) -> &Validity {
        &self.duration_validity
    }

    pub fn repeat_interval(&self) -> Duration {
        self.repeat_interval
    }

    /// Whether the "add" control is enabled: the first entry has a start.
    pub fn add_enabled(&self) -> bool {
        self.entries.first().is_some_and(TimeEntry::has_start)
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        SyncSnapshot {
            duration: self.duration,
            duration_text: self.duration_text.clone(),
            duration_validity: self.duration_validity.clone(),
            entries: self.entries.clone(),
            add_enabled: self.add_enabled(),
        }
    }

    /// Derive the shared duration from what the page was rendered with.
    ///
    /// The first entry's `end - start` wins if both are present (and not
    /// negative). Otherwise a well-formed, non-zero duration text is adopted and
    /// the first entry's end filled from it.
    pub fn initialise(&mut self) -> Transition {
        let mut transition = Transition::new(Operation::Initialise);

        let (first_start, first_end) = (self.entries[0].start, self.entries[0].end);
        match (first_start, first_end) {
            (Some(start), Some(end)) => {
                let delta = end - start;
                if delta >= Duration::zero() {
                    self.duration = EventDuration::from_chrono(delta);
                    self.duration_text = format_duration(self.duration.as_millis());
                    transition.duration_changed = true;
                }
            }
            _ => match EventDuration::parse(&self.duration_text) {
                None if !self.duration_text.is_empty() => {
                    self.duration_validity = Validity::Invalid(INVALID_DURATION.into());
                    transition.duration_changed = true;
                }
                Some(parsed) if parsed.is_set() => {
                    self.duration = parsed;
                    transition.duration_changed = true;
                    if let Some(start) = first_start {
                        let before = self.entries[0].clone();
                        let end = self.end_for(start);
                        self.entries[0].end = end;
                        if self.entries[0] != before {
                            transition.touch(self.entries[0].id);
                        }
                    }
                }
                _ => {}
            },
        }

        self.validate_all(&mut transition);
        self.emit(transition)
    }

    /// The duration field was edited.
    pub fn set_duration(&mut self, text: &str) -> Transition {
        let mut transition = Transition::new(Operation::DurationChanged);
        let previous = (self.duration, self.duration_text.clone(), self.duration_validity.clone());
        self.duration_text = text.to_string();

        match EventDuration::parse(text) {
            None => {
                tracing::warn!(text, "rejected malformed duration");
                self.duration_validity = Validity::Invalid(INVALID_DURATION.into());
            }
            Some(parsed) => {
                self.duration_validity = Validity::Valid;
                if parsed.is_set() {
                    self.duration = parsed;
                    self.broadcast_duration(&mut transition);
                }
            }
        }

        transition.duration_changed =
            previous != (self.duration, self.duration_text.clone(), self.duration_validity.clone());
        self.emit(transition)
    }

    /// An entry's start was edited. Later entries are shifted to keep the pattern.
    pub fn set_start(&mut self, id: EntryId, start: Option<NaiveDateTime>) -> Transition {
        let mut transition = Transition::new(Operation::StartChanged);
        let Some(k) = self.position(id) else {
            tracing::warn!(%id, "start edit for unknown entry");
            return self.emit(transition);
        };

        let delta = self.cascade_delta(k);
        let before = self.entries[k].clone();
        self.entries[k].start = start;

        let Some(start) = start else {
            self.entries[k].validate_end();
            if self.entries[k] != before {
                transition.touch(id);
            }
            return self.emit(transition);
        };

        if self.duration.is_set() {
            let end = self.end_for(start);
            self.entries[k].end = end;
        }
        self.entries[k].validate_end();
        if self.entries[k] != before {
            transition.touch(id);
        }

        tracing::debug!(%id, delta_minutes = delta.num_minutes(), later = self.entries.len() - k - 1, "cascading start");

        let mut previous = start;
        for j in (k + 1)..self.entries.len() {
            let Some(next) = shift(previous, delta) else {
                tracing::warn!(%id, position = j, "cascade stopped: start out of range");
                break;
            };
            let before = self.entries[j].clone();
            self.entries[j].start = Some(next);
            if self.duration.is_set() {
                let end = self.end_for(next);
                self.entries[j].end = end;
            }
            self.entries[j].validate_end();
            if self.entries[j] != before {
                transition.touch(self.entries[j].id);
            }
            previous = next;
        }

        self.emit(transition)
    }

    /// An entry's end was edited. Its length becomes the shared duration.
    pub fn set_end(&mut self, id: EntryId, end: Option<NaiveDateTime>) -> Transition {
        let mut transition = Transition::new(Operation::EndChanged);
        let Some(k) = self.position(id) else {
            tracing::warn!(%id, "end edit for unknown entry");
            return self.emit(transition);
        };

        let before = self.entries[k].clone();
        self.entries[k].end = end;

        match (self.entries[k].start, end) {
            (Some(start), Some(end)) if end - start >= Duration::zero() => {
                let previous = (self.duration, self.duration_text.clone());
                self.duration = EventDuration::from_chrono(end - start);
                self.duration_text = format_duration(self.duration.as_millis());
                self.duration_validity = Validity::Valid;
                transition.duration_changed = previous != (self.duration, self.duration_text.clone());

                tracing::debug!(%id, duration = %self.duration, "duration derived from end");
                if self.duration.is_set() {
                    self.broadcast_duration(&mut transition);
                } else {
                    self.entries[k].validate_end();
                }
                if self.entries[k] != before {
                    transition.touch(id);
                }
            }
            _ => {
                // Negative lengths leave the shared duration alone; the message says why.
                self.entries[k].validate_end();
                if self.entries[k] != before {
                    transition.touch(id);
                }
            }
        }

        self.emit(transition)
    }

    /// Recompute one entry's validity message.
    pub fn validate_end(&mut self, id: EntryId) -> Transition {
        let mut transition = Transition::new(Operation::Validate);
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            if entry.validate_end() {
                transition.touch(id);
            }
        }
        self.emit(transition)
    }

    /// Append a repeat row following the established spacing.
    ///
    /// Refused unless both the first and the last entries have a start, and
    /// when the next start would fall outside the representable range.
    pub fn add_entry(&mut self) -> Transition {
        let mut transition = Transition::new(Operation::EntryAdded);
        let n = self.entries.len();
        let last_start = self.entries[n - 1].start;

        let Some(last_start) = last_start.filter(|_| self.add_enabled()) else {
            tracing::debug!("add refused: no start to repeat from");
            return self.emit(transition);
        };

        let delta = match n.checked_sub(2).and_then(|i| self.entries[i].start) {
            Some(prev) => last_start - prev,
            None => self.repeat_interval,
        };

        let Some(start) = shift(last_start, delta) else {
            tracing::warn!(delta_minutes = delta.num_minutes(), "add refused: next start out of range");
            return self.emit(transition);
        };
        let end = if self.duration.is_set() {
            self.end_for(start)
        } else {
            None
        };

        let id = self.allocate_id();
        let mut entry = TimeEntry::new(id, Some(start), end);
        entry.validate_end();
        self.entries.push(entry);

        tracing::debug!(%id, delta_minutes = delta.num_minutes(), "added entry");
        transition.added = Some(id);
        self.emit(transition)
    }

    /// Drop one row. Nothing else is re-derived. The last remaining row stays.
    pub fn remove_entry(&mut self, id: EntryId) -> Transition {
        let mut transition = Transition::new(Operation::EntryRemoved);
        match self.position(id) {
            Some(k) if self.entries.len() > 1 => {
                self.entries.remove(k);
                transition.removed = Some(id);
            }
            Some(_) => tracing::debug!(%id, "refusing to remove the only entry"),
            None => tracing::warn!(%id, "remove for unknown entry"),
        }
        self.emit(transition)
    }

    /// Delta used to shift the entries after `k`, read before `k` is overwritten.
    fn cascade_delta(&self, k: usize) -> Duration {
        let start_at = |i: usize| self.entries.get(i).and_then(|e| e.start);

        if k >= 2 {
            if let (Some(a), Some(b)) = (start_at(k - 2), start_at(k - 1)) {
                return b - a;
            }
        }
        if let (Some(current), Some(next)) = (start_at(k), start_at(k + 1)) {
            return next - current;
        }
        self.repeat_interval
    }

    /// Set every entry's end from its start and the shared duration, then revalidate.
    fn broadcast_duration(&mut self, transition: &mut Transition) {
        let length = self.duration.to_chrono();
        for entry in &mut self.entries {
            let before = entry.clone();
            if let Some(start) = entry.start {
                entry.end = shift(start, length);
                if entry.end.is_none() {
                    tracing::warn!(id = %entry.id, "end out of range, cleared");
                }
            }
            entry.validate_end();
            if *entry != before {
                transition.touch(entry.id);
            }
        }
    }

    /// `start + duration`; absent if that can't be represented.
    fn end_for(&self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        let end = shift(start, self.duration.to_chrono());
        if end.is_none() {
            tracing::warn!(duration = %self.duration, "end out of range, cleared");
        }
        end
    }

    fn validate_all(&mut self, transition: &mut Transition) {
        for entry in &mut self.entries {
            if entry.validate_end() {
                transition.touch(entry.id);
            }
        }
    }

    fn allocate_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    fn emit(&mut self, mut transition: Transition) -> Transition {
        transition.add_enabled = self.add_enabled();
        tracing::debug!(
            operation = ?transition.operation,
            changed = transition.changed.len(),
            duration = %self.duration,
            "transition"
        );
        for observer in &mut self.observers {
            observer.on_transition(&transition);
        }
        transition
    }
}

/// `time + delta`, or `None` past the range `NaiveDateTime` can hold.
fn shift(time: NaiveDateTime, delta: Duration) -> Option<NaiveDateTime> {
    time.checked_add_signed(delta)
}
