//! States of a graph and their hooks.

use super::behavior::Behavior;
use super::context::{Context, HookError};
use super::state_machine::StateMachine;
use crate::runtime::Machine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marker for the designated start and end states of a graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateType {
    Start,
    End,
    #[default]
    None,
}

/// Per-state hook overrides, fixed when the state is built.
///
/// A hook set here replaces the context call of the same kind for this
/// state only.
#[derive(Clone, Debug, Default)]
pub struct StateHooks {
    pub entry: Option<Behavior<State>>,
    pub exit: Option<Behavior<State>>,
    pub do_activity: Option<Behavior<State>>,
}

/// A node of a state machine graph.
///
/// A state may own a nested graph (its submachine), which makes it a
/// composite state: entering it always continues into the submachine's
/// start state.
///
/// # Example
///
/// ```rust
/// use nested_fsm::core::{State, StateMachine};
///
/// let mut inner = StateMachine::new("inner");
/// inner.add_state(State::new("x")).unwrap();
/// inner.set_start_state("x").unwrap();
///
/// let composite = State::new("b").with_submachine(inner);
/// assert!(composite.is_composite());
/// assert_eq!(composite.submachine().unwrap().superstate(), Some("b"));
/// assert!(composite.matches("b"));
/// ```
#[derive(Clone, Debug)]
pub struct State {
    name: String,
    state_type: StateType,
    submachine: Option<Box<StateMachine>>,
    hooks: StateHooks,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state_type: StateType::None,
            submachine: None,
            hooks: StateHooks::default(),
        }
    }

    /// Attach a nested graph, making this a composite state.
    pub fn with_submachine(mut self, mut submachine: StateMachine) -> Self {
        submachine.set_superstate(self.name.clone());
        self.submachine = Some(Box::new(submachine));
        self
    }

    pub fn with_hooks(mut self, hooks: StateHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state_type(&self) -> StateType {
        self.state_type
    }

    pub(crate) fn set_state_type(&mut self, state_type: StateType) {
        self.state_type = state_type;
    }

    pub fn is_start_state(&self) -> bool {
        self.state_type == StateType::Start
    }

    pub fn is_end_state(&self) -> bool {
        self.state_type == StateType::End
    }

    pub fn submachine(&self) -> Option<&StateMachine> {
        self.submachine.as_deref()
    }

    pub fn is_composite(&self) -> bool {
        self.submachine.is_some()
    }

    pub fn hooks(&self) -> &StateHooks {
        &self.hooks
    }

    /// True if this state is called `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name
    }

    pub(crate) fn entry(
        &self,
        context: &dyn Context,
        machine: &mut Machine,
        args: &[Value],
    ) -> Result<(), HookError> {
        match &self.hooks.entry {
            Some(behavior) => behavior.run(machine, self, args),
            None => context.entry(machine, self, args),
        }
    }

    pub(crate) fn exit(
        &self,
        context: &dyn Context,
        machine: &mut Machine,
        args: &[Value],
    ) -> Result<(), HookError> {
        match &self.hooks.exit {
            Some(behavior) => behavior.run(machine, self, args),
            None => context.exit(machine, self, args),
        }
    }

    pub(crate) fn do_activity(
        &self,
        context: &dyn Context,
        machine: &mut Machine,
        args: &[Value],
    ) -> Result<(), HookError> {
        match &self.hooks.do_activity {
            Some(behavior) => behavior.run(machine, self, args),
            None => context.do_activity(machine, self, args),
        }
    }
}

/// States compare by name.
impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
