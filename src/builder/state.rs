//! Builder for states and their hooks.

use crate::builder::error::BuildError;
use crate::builder::machine::StateMachineBuilder;
use crate::core::{Behavior, HookError, State, StateHooks};
use crate::runtime::Machine;
use serde_json::Value;

/// Builder for a single state, optionally composite.
///
/// # Example
///
/// ```rust
/// use nested_fsm::builder::{StateBuilder, StateMachineBuilder};
///
/// let graph = StateMachineBuilder::new("player")
///     .start_state("stopped")
///     .add_state(
///         StateBuilder::new("playing").submachine(
///             StateMachineBuilder::new("track")
///                 .start_state("intro")
///                 .transition("intro", "chorus"),
///         ),
///     )
///     .transition("stopped", "playing")
///     .build()
///     .unwrap();
///
/// assert!(graph.state_named("playing").unwrap().is_composite());
/// ```
pub struct StateBuilder {
    name: String,
    hooks: StateHooks,
    submachine: Option<StateMachineBuilder>,
}

impl StateBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hooks: StateHooks::default(),
            submachine: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `action` whenever the state becomes active.
    pub fn entry<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut Machine, &State, &[Value]) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.hooks.entry = Some(Behavior::new(action));
        self
    }

    /// Run `action` whenever the state stops being active.
    pub fn exit<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut Machine, &State, &[Value]) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.hooks.exit = Some(Behavior::new(action));
        self
    }

    /// Run `action` right after the state becomes current. Transitions it
    /// requests are queued.
    pub fn do_activity<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut Machine, &State, &[Value]) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.hooks.do_activity = Some(Behavior::new(action));
        self
    }

    /// Replace all hook overrides at once.
    pub fn hooks(mut self, hooks: StateHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Nest a graph inside this state, making it composite.
    pub fn submachine(mut self, submachine: StateMachineBuilder) -> Self {
        self.submachine = Some(submachine);
        self
    }

    /// Build the state. Nested graphs are assembled but validated only as
    /// part of the enclosing graph.
    pub(crate) fn assemble(self) -> Result<State, BuildError> {
        let state = State::new(self.name).with_hooks(self.hooks);
        match self.submachine {
            Some(submachine) => Ok(state.with_submachine(submachine.assemble()?)),
            None => Ok(state),
        }
    }
}
