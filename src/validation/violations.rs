//! Structural problems found in a graph.

use thiserror::Error;

/// A structural problem in a nested graph.
///
/// `machine` names the graph the problem lives in, as a `/`-separated path
/// of graph names from the root.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphViolation {
    #[error("machine '{machine}' has no start state")]
    MissingStartState { machine: String },

    #[error("submachine '{machine}' of state '{state}' records superstate {found:?}")]
    SuperstateMismatch {
        machine: String,
        state: String,
        found: Option<String>,
    },

    #[error("transition '{transition}' in machine '{machine}' refers to unknown state '{state}'")]
    DanglingTransition {
        machine: String,
        transition: String,
        state: String,
    },
}

impl GraphViolation {
    /// Path of the graph the problem was found in.
    pub fn machine(&self) -> &str {
        match self {
            GraphViolation::MissingStartState { machine }
            | GraphViolation::SuperstateMismatch { machine, .. }
            | GraphViolation::DanglingTransition { machine, .. } => machine,
        }
    }
}
