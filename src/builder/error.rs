//! Errors raised while constructing graphs.

use crate::validation::GraphViolation;
use thiserror::Error;

/// Errors that can occur when building state machine graphs.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("state '{name}' already exists in machine '{machine}'")]
    DuplicateState { machine: String, name: String },

    #[error("transition '{name}' already exists in machine '{machine}'")]
    DuplicateTransition { machine: String, name: String },

    #[error("state '{name}' is not part of machine '{machine}'")]
    UnknownState { machine: String, name: String },

    #[error("invalid transition '{name}' in machine '{machine}': {reason}")]
    InvalidTransition {
        machine: String,
        name: String,
        reason: String,
    },

    #[error("graph is invalid: {}", format_violations(.violations))]
    Invalid { violations: Vec<GraphViolation> },
}

fn format_violations(violations: &[GraphViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
