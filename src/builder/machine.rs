//! Builder for constructing state machine graphs.

use crate::builder::error::BuildError;
use crate::builder::state::StateBuilder;
use crate::builder::transition::TransitionBuilder;
use crate::core::{Context, StateMachine};
use crate::validation;
use std::sync::Arc;

struct StateEntry {
    builder: StateBuilder,
    declared: bool,
}

/// Builder for constructing graphs with a fluent API.
///
/// States named by `start_state`, `end_state` or a transition are created
/// on first mention, in mention order. Adding a [`StateBuilder`] for a state
/// that was only mentioned so far fills it in place.
///
/// # Example
///
/// ```rust
/// use nested_fsm::builder::StateMachineBuilder;
///
/// let graph = StateMachineBuilder::new("traffic")
///     .start_state("red")
///     .transition("red", "green")
///     .transition("green", "yellow")
///     .transition("yellow", "red")
///     .build()
///     .unwrap();
///
/// let names: Vec<&str> = graph.states().iter().map(|s| s.name()).collect();
/// assert_eq!(names, vec!["red", "green", "yellow"]);
/// assert_eq!(graph.transitions()[0].name(), "red->green");
/// ```
pub struct StateMachineBuilder {
    name: String,
    context: Option<Arc<dyn Context>>,
    states: Vec<StateEntry>,
    transitions: Vec<TransitionBuilder>,
    start: Option<String>,
    end: Option<String>,
    error: Option<BuildError>,
}

impl StateMachineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: None,
            states: Vec::new(),
            transitions: Vec::new(),
            start: None,
            end: None,
            error: None,
        }
    }

    /// Receiver for hooks without a per-node override. Nested graphs
    /// without their own context use this one.
    pub fn context(mut self, context: Arc<dyn Context>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn start_state(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.mention(&name);
        self.start = Some(name);
        self
    }

    pub fn end_state(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.mention(&name);
        self.end = Some(name);
        self
    }

    /// Declare a plain state.
    pub fn state(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.mention(&name);
        self
    }

    /// Declare a state with hooks or a submachine.
    pub fn add_state(mut self, state: StateBuilder) -> Self {
        let position = self
            .states
            .iter()
            .position(|e| e.builder.name() == state.name());
        match position {
            Some(index) if self.states[index].declared => {
                let error = BuildError::DuplicateState {
                    machine: self.name.clone(),
                    name: state.name().to_string(),
                };
                self.fail(error);
            }
            Some(index) => {
                self.states[index] = StateEntry {
                    builder: state,
                    declared: true,
                };
            }
            None => self.states.push(StateEntry {
                builder: state,
                declared: true,
            }),
        }
        self
    }

    /// Add an unguarded transition named `"<from>-><to>"`.
    pub fn transition(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.add_transition(TransitionBuilder::new(from, to))
    }

    /// Add an unguarded transition with an explicit name.
    pub fn transition_named(
        self,
        name: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.add_transition(TransitionBuilder::new(from, to).name(name))
    }

    pub fn add_transition(mut self, transition: TransitionBuilder) -> Self {
        let source = transition.source().to_string();
        let target = transition.target().to_string();
        self.mention(&source);
        self.mention(&target);
        self.transitions.push(transition);
        self
    }

    fn mention(&mut self, name: &str) {
        if !self.states.iter().any(|e| e.builder.name() == name) {
            self.states.push(StateEntry {
                builder: StateBuilder::new(name),
                declared: false,
            });
        }
    }

    fn fail(&mut self, error: BuildError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Build and validate the graph, including every nested graph.
    pub fn build(self) -> Result<StateMachine, BuildError> {
        let graph = self.assemble()?;

        let violations = validation::violations(&graph);
        if !violations.is_empty() {
            tracing::debug!(
                machine = graph.name(),
                violations = violations.len(),
                "graph rejected"
            );
            return Err(BuildError::Invalid { violations });
        }

        tracing::debug!(
            machine = graph.name(),
            states = graph.all_states().len(),
            "graph built"
        );
        Ok(graph)
    }

    /// Build the graph without validating it.
    pub(crate) fn assemble(self) -> Result<StateMachine, BuildError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut graph = StateMachine::new(self.name);
        for entry in self.states {
            graph.add_state(entry.builder.assemble()?)?;
        }
        for transition in self.transitions {
            graph.add_transition(transition.build())?;
        }
        if let Some(start) = &self.start {
            graph.set_start_state(start)?;
        }
        if let Some(end) = &self.end {
            graph.set_end_state(end)?;
        }
        if let Some(context) = self.context {
            graph.set_context(context);
        }
        Ok(graph)
    }
}
