//! Change records emitted by the synchroniser to whatever renders it.

use serde::Serialize;

use crate::entry::EntryId;

/// Which public operation produced a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Initialise,
    StartChanged,
    EndChanged,
    DurationChanged,
    EntryAdded,
    EntryRemoved,
    Validate,
}

/// Summary of one atomic state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub operation: Operation,
    /// Entries whose start, end or validity changed, in list order.
    pub changed: Vec<EntryId>,
    pub added: Option<EntryId>,
    pub removed: Option<EntryId>,
    pub duration_changed: bool,
    pub add_enabled: bool,
}

impl Transition {
    pub(crate) fn new(operation: Operation) -> Self {
        Transition {
            operation,
            changed: Vec::new(),
            added: None,
            removed: None,
            duration_changed: false,
            add_enabled: false,
        }
    }

    pub(crate) fn touch(&mut self, id: EntryId) {
        if !self.changed.contains(&id) {
            self.changed.push(id);
        }
    }

    /// True if nothing the view shows needs redrawing.
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
            && self.added.is_none()
            && self.removed.is_none()
            && !self.duration_changed
    }
}

/// Consumer of transitions (the rendering layer).
///
/// Observers only see the record, never the synchroniser, so they can't
/// dispatch another operation while one is in progress.
pub trait SyncObserver {
    fn on_transition(&mut self, transition: &Transition);
}

impl<F> SyncObserver for F
where
    F: FnMut(&Transition),
{
    fn on_transition(&mut self, transition: &Transition) {
        self(transition)
    }
}
