//! Transition history tracking.
//!
//! A history is an append-only log of the moves a machine made. Records
//! name states and transitions by handle, so they stay meaningful for any
//! machine walking the same graph.

use super::refs::{StateRef, TransitionRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One completed move of a machine.
///
/// The record written by `start` has neither a previous state nor a
/// transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// When the move completed
    pub time: DateTime<Utc>,
    /// The state before the move
    pub previous_state: Option<StateRef>,
    /// The transition that fired
    pub transition: Option<TransitionRef>,
    /// The state after the move
    pub new_state: StateRef,
}

impl HistoryRecord {
    /// Record of a machine arriving at `state` without a transition.
    pub fn initial(state: StateRef) -> Self {
        Self {
            time: Utc::now(),
            previous_state: None,
            transition: None,
            new_state: state,
        }
    }

    pub fn transition(previous: Option<StateRef>, transition: TransitionRef, state: StateRef) -> Self {
        Self {
            time: Utc::now(),
            previous_state: previous,
            transition: Some(transition),
            new_state: state,
        }
    }
}

/// Ordered log of history records.
///
/// # Example
///
/// ```rust
/// use nested_fsm::core::{History, HistoryRecord, StateRef, TransitionRef};
///
/// let a = StateRef::from_indices(vec![0]);
/// let b = StateRef::from_indices(vec![1]);
///
/// let mut history = History::new();
/// history.record(HistoryRecord::initial(a.clone()));
/// history.record(HistoryRecord::transition(
///     Some(a.clone()),
///     TransitionRef::new(vec![], 0),
///     b.clone(),
/// ));
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.get_path(), vec![&a, &b]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    records: Vec<HistoryRecord>,
}

impl History {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record.
    pub fn record(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Get all records, oldest first.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryRecord> {
        self.records.last()
    }

    /// Get the path of states traversed.
    ///
    /// Starts with the previous state of the first record when it has one,
    /// followed by the new state of every record.
    pub fn get_path(&self) -> Vec<&StateRef> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            if let Some(previous) = &first.previous_state {
                path.push(previous);
            }
        }
        for record in &self.records {
            path.push(&record.new_state);
        }
        path
    }

    /// Calculate total duration from first to last record.
    ///
    /// Returns `None` for an empty history.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            let duration = last.time.signed_duration_since(first.time);
            duration.to_std().ok()
        } else {
            None
        }
    }
}
