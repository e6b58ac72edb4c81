//! Single-slot mailbox for pending transitions.

use crate::core::TransitionRef;
use serde_json::Value;

/// A resolved transition waiting to be executed, with its arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingTransition {
    pub transition: TransitionRef,
    pub args: Vec<Value>,
}

/// Holds at most one pending transition.
///
/// Pushing replaces whatever was pending: the latest request wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionQueue {
    slot: Option<PendingTransition>,
}

impl TransitionQueue {
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Queue a transition, returning the request it displaced, if any.
    pub fn push(&mut self, pending: PendingTransition) -> Option<PendingTransition> {
        self.slot.replace(pending)
    }

    pub fn pop(&mut self) -> Option<PendingTransition> {
        self.slot.take()
    }

    pub fn peek(&self) -> Option<&PendingTransition> {
        self.slot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}
