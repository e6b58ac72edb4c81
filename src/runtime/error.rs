//! Errors raised while driving a machine.

use crate::core::HookError;
use thiserror::Error;

/// Errors that can occur when starting or transitioning a machine.
///
/// Resolution errors are raised before anything about the machine
/// changes. `Hook` is raised after the current state has been rolled back.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MachineError {
    #[error("machine has not been started")]
    NotStarted,

    #[error("machine '{machine}' has no start state")]
    NoStartState { machine: String },

    #[error("no transition from state '{state}' matches '{request}'")]
    UnknownTransition { state: String, request: String },

    #[error("cannot transition '{name}' from state '{state}'")]
    CannotTransition { state: String, name: String },

    #[error("ambiguous transition from state '{state}': {}", .candidates.join(", "))]
    AmbiguousTransition {
        state: String,
        candidates: Vec<String>,
    },

    #[error("invalid transition '{name}': {reason}")]
    InvalidTransition { name: String, reason: String },

    #[error("unknown state '{name}'")]
    UnknownState { name: String },

    #[error(transparent)]
    Hook(#[from] HookError),
}

impl MachineError {
    /// True for errors raised while choosing a transition, as opposed to
    /// failures inside hooks.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            MachineError::UnknownTransition { .. }
                | MachineError::CannotTransition { .. }
                | MachineError::AmbiguousTransition { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_lists_candidates() {
        let err = MachineError::AmbiguousTransition {
            state: "a".to_string(),
            candidates: vec!["left".to_string(), "right".to_string()],
        };

        assert_eq!(
            err.to_string(),
            "ambiguous transition from state 'a': left, right"
        );
        assert!(err.is_resolution());
    }

    #[test]
    fn hook_errors_are_not_resolution_errors() {
        let err: MachineError = HookError::new("boom").into();

        assert!(!err.is_resolution());
        assert_eq!(err.to_string(), "hook failed: boom");
    }
}
