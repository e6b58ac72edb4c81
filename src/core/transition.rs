//! Transitions between states of one graph.

use super::behavior::Behavior;
use super::context::{Context, HookError};
use super::guard::Guard;
use crate::runtime::Machine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a transition relates to its source state.
///
/// Only `External` changes how the machine behaves today; the other kinds
/// are carried for renderers and tooling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    #[default]
    External,
    Internal,
    Local,
}

/// An edge between two states of the same graph.
///
/// Endpoints are stored by name and checked against the graph when the
/// transition is added to it.
#[derive(Clone, Debug)]
pub struct Transition {
    name: String,
    source: String,
    target: String,
    guard: Option<Guard>,
    effect: Option<Behavior<Transition>>,
    kind: TransitionKind,
}

impl Transition {
    pub fn new(name: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            target: target.into(),
            guard: None,
            effect: None,
            kind: TransitionKind::External,
        }
    }

    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn with_effect(mut self, effect: Behavior<Transition>) -> Self {
        self.effect = Some(effect);
        self
    }

    pub fn with_kind(mut self, kind: TransitionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the source state.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Name of the target state.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn guard(&self) -> Option<&Guard> {
        self.guard.as_ref()
    }

    pub fn effect(&self) -> Option<&Behavior<Transition>> {
        self.effect.as_ref()
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// True if this transition is called `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name
    }

    /// The distinct states this transition touches: source, then target
    /// unless it loops back to the source.
    pub fn participant(&self) -> Vec<&str> {
        if self.source == self.target {
            vec![self.source.as_str()]
        } else {
            vec![self.source.as_str(), self.target.as_str()]
        }
    }

    /// Evaluate the guard.
    ///
    /// Passes when there is no guard or the context gives no answer.
    pub fn check_guard(&self, context: &dyn Context, machine: &Machine, args: &[Value]) -> bool {
        match &self.guard {
            Some(guard) => guard.check(machine, self, args),
            None => context.guard(machine, self, args).unwrap_or(true),
        }
    }

    pub(crate) fn run_effect(
        &self,
        context: &dyn Context,
        machine: &mut Machine,
        args: &[Value],
    ) -> Result<(), HookError> {
        match &self.effect {
            Some(effect) => effect.run(machine, self, args),
            None => context.effect(machine, self, args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transition_is_external() {
        let transition = Transition::new("go", "a", "b");

        assert_eq!(transition.name(), "go");
        assert_eq!(transition.source(), "a");
        assert_eq!(transition.target(), "b");
        assert_eq!(transition.kind(), TransitionKind::External);
        assert!(transition.guard().is_none());
        assert!(transition.effect().is_none());
    }

    #[test]
    fn participant_is_deduplicated() {
        let forward = Transition::new("go", "a", "b");
        let self_loop = Transition::new("stay", "a", "a");

        assert_eq!(forward.participant(), vec!["a", "b"]);
        assert_eq!(self_loop.participant(), vec!["a"]);
    }

    #[test]
    fn matches_by_name() {
        let transition = Transition::new("go", "a", "b");

        assert!(transition.matches("go"));
        assert!(!transition.matches("a"));
    }

    #[test]
    fn kind_is_configurable() {
        let transition = Transition::new("go", "a", "b").with_kind(TransitionKind::Local);
        assert_eq!(transition.kind(), TransitionKind::Local);
    }
}
