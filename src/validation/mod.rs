//! Whole-graph validation.
//!
//! Checks a nested graph with stillwater's `Validation` so that every
//! problem is reported in one pass instead of stopping at the first.
//!
//! # Example
//!
//! ```rust
//! use nested_fsm::core::{State, StateMachine};
//! use nested_fsm::validation::{validate, GraphViolation};
//! use stillwater::validation::Validation;
//!
//! let mut inner = StateMachine::new("inner");
//! inner.add_state(State::new("x")).unwrap();
//!
//! let mut root = StateMachine::new("root");
//! root.add_state(State::new("b").with_submachine(inner)).unwrap();
//!
//! match validate(&root) {
//!     Validation::Failure(violations) => {
//!         assert_eq!(violations.len(), 2);
//!         assert!(violations
//!             .iter()
//!             .all(|v| matches!(v, GraphViolation::MissingStartState { .. })));
//!     }
//!     Validation::Success(_) => panic!("expected violations"),
//! }
//! ```

mod violations;

pub use violations::GraphViolation;

use crate::core::StateMachine;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<GraphViolation>>;

/// Validate `graph` and every submachine nested in it, accumulating ALL
/// violations.
pub fn validate(graph: &StateMachine) -> Check {
    let mut checks = Vec::new();
    collect(graph, graph.name().to_string(), &mut checks);
    Validation::all_vec(checks).map(|_| ())
}

/// Validate and collect the violations into a plain list.
pub fn violations(graph: &StateMachine) -> Vec<GraphViolation> {
    match validate(graph) {
        Validation::Failure(errors) => errors.iter().cloned().collect(),
        Validation::Success(_) => Vec::new(),
    }
}

fn collect(graph: &StateMachine, path: String, checks: &mut Vec<Check>) {
    checks.push(if graph.start_state().is_some() {
        Validation::success(())
    } else {
        Validation::fail(GraphViolation::MissingStartState {
            machine: path.clone(),
        })
    });

    for transition in graph.transitions() {
        for endpoint in transition.participant() {
            if graph.state_index(endpoint).is_none() {
                checks.push(Validation::fail(GraphViolation::DanglingTransition {
                    machine: path.clone(),
                    transition: transition.name().to_string(),
                    state: endpoint.to_string(),
                }));
            }
        }
    }

    for state in graph.states() {
        let Some(submachine) = state.submachine() else {
            continue;
        };
        let nested = format!("{path}/{}", submachine.name());
        if submachine.superstate() != Some(state.name()) {
            checks.push(Validation::fail(GraphViolation::SuperstateMismatch {
                machine: nested.clone(),
                state: state.name().to_string(),
                found: submachine.superstate().map(str::to_string),
            }));
        }
        collect(submachine, nested, checks);
    }
}
