//! Guard predicates for controlling transitions.
//!
//! Guards decide whether a transition may be selected. They are evaluated
//! while resolving a request, before anything about the machine changes.

use super::transition::Transition;
use crate::runtime::Machine;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&Machine, &Transition, &[Value]) -> bool + Send + Sync>;

/// Predicate attached to a transition that decides whether it may fire.
///
/// A guard is an explicit override fixed at construction. Transitions
/// without one fall back to the graph's [`Context`](super::Context).
///
/// # Example
///
/// ```rust
/// use nested_fsm::builder::{StateMachineBuilder, TransitionBuilder};
/// use nested_fsm::core::Guard;
/// use nested_fsm::runtime::Machine;
/// use serde_json::Value;
///
/// let only_when_paid = Guard::named("paid", |_machine, _transition, args| {
///     args.first().and_then(|v| v.as_bool()).unwrap_or(false)
/// });
///
/// let graph = StateMachineBuilder::new("order")
///     .start_state("open")
///     .end_state("closed")
///     .add_transition(
///         TransitionBuilder::new("open", "closed")
///             .name("close")
///             .guard(only_when_paid),
///     )
///     .build()
///     .unwrap();
///
/// let mut machine = Machine::new(graph);
/// machine.start(&[]).unwrap();
/// assert!(machine.transition("close", &[Value::Bool(false)]).is_err());
/// assert!(machine.transition("close", &[Value::Bool(true)]).is_ok());
/// ```
#[derive(Clone)]
pub struct Guard {
    label: Option<String>,
    predicate: Predicate,
}

impl Guard {
    /// Create a guard from a predicate.
    ///
    /// The predicate should be deterministic for a given machine state and
    /// arguments; it may be evaluated more than once per request.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Machine, &Transition, &[Value]) -> bool + Send + Sync + 'static,
    {
        Guard {
            label: None,
            predicate: Arc::new(predicate),
        }
    }

    /// Create a guard with a display label, shown by renderers.
    pub fn named<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Machine, &Transition, &[Value]) -> bool + Send + Sync + 'static,
    {
        Guard {
            label: Some(label.into()),
            predicate: Arc::new(predicate),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Evaluate the predicate.
    pub fn check(&self, machine: &Machine, transition: &Transition, args: &[Value]) -> bool {
        (self.predicate)(machine, transition, args)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").field("label", &self.label).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateMachineBuilder;

    fn started_machine() -> (Machine, Transition) {
        let graph = StateMachineBuilder::new("guarded")
            .start_state("a")
            .end_state("b")
            .transition("a", "b")
            .build()
            .unwrap();
        let transition = graph.transitions()[0].clone();
        let mut machine = Machine::new(graph);
        machine.start(&[]).unwrap();
        (machine, transition)
    }

    #[test]
    fn guard_reads_arguments() {
        let (machine, transition) = started_machine();
        let guard = Guard::new(|_, _, args| args.len() == 2);

        assert!(guard.check(&machine, &transition, &[Value::Null, Value::Null]));
        assert!(!guard.check(&machine, &transition, &[]));
    }

    #[test]
    fn guard_can_inspect_machine() {
        let (machine, transition) = started_machine();
        let guard = Guard::new(|m, _, _| m.state_names() == vec!["a".to_string()]);

        assert!(guard.check(&machine, &transition, &[]));
    }

    #[test]
    fn guard_sees_transition() {
        let (machine, transition) = started_machine();
        let guard = Guard::new(|_, t, _| t.name() == "a->b");

        assert!(guard.check(&machine, &transition, &[]));
    }

    #[test]
    fn guard_is_deterministic() {
        let (machine, transition) = started_machine();
        let guard = Guard::new(|m, _, _| m.started());

        let result1 = guard.check(&machine, &transition, &[]);
        let result2 = guard.check(&machine, &transition, &[]);

        assert_eq!(result1, result2);
    }

    #[test]
    fn named_guard_keeps_label() {
        let guard = Guard::named("ready", |_, _, _| true);

        assert_eq!(guard.label(), Some("ready"));
        assert_eq!(Guard::new(|_, _, _| true).label(), None);
    }
}
