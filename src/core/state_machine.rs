//! The graph container: states, transitions and designated endpoints.

use super::context::{Context, NO_CONTEXT};
use super::refs::{StateRef, TransitionRef};
use super::state::{State, StateType};
use super::transition::Transition;
use crate::builder::BuildError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A graph of states and transitions.
///
/// Graphs only grow: states and transitions are added during construction
/// and never removed. Once wrapped in an `Arc` and handed to a
/// [`Machine`](crate::runtime::Machine) a graph is treated as immutable and
/// may be shared by any number of machines.
///
/// # Example
///
/// ```rust
/// use nested_fsm::core::{State, StateMachine, Transition};
///
/// let mut graph = StateMachine::new("switch");
/// graph.add_state(State::new("off")).unwrap();
/// graph.add_state(State::new("on")).unwrap();
/// graph.add_transition(Transition::new("flip", "off", "on")).unwrap();
/// graph.set_start_state("off").unwrap();
///
/// assert!(graph.add_state(State::new("on")).is_err());
/// assert_eq!(graph.start_state().unwrap().name(), "off");
/// ```
#[derive(Clone)]
pub struct StateMachine {
    name: String,
    states: Vec<State>,
    transitions: Vec<Transition>,
    state_index: HashMap<String, usize>,
    transition_index: HashMap<String, usize>,
    start_state: Option<usize>,
    end_state: Option<usize>,
    superstate: Option<String>,
    context: Option<Arc<dyn Context>>,
}

impl StateMachine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            transitions: Vec::new(),
            state_index: HashMap::new(),
            transition_index: HashMap::new(),
            start_state: None,
            end_state: None,
            superstate: None,
            context: None,
        }
    }

    pub fn with_context(mut self, context: Arc<dyn Context>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn set_context(&mut self, context: Arc<dyn Context>) {
        self.context = Some(context);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Name of the state owning this graph, if it is nested.
    pub fn superstate(&self) -> Option<&str> {
        self.superstate.as_deref()
    }

    pub(crate) fn set_superstate(&mut self, name: String) {
        self.superstate = Some(name);
    }

    pub fn context(&self) -> Option<&Arc<dyn Context>> {
        self.context.as_ref()
    }

    /// Add a state. Fails if a state with the same name exists.
    pub fn add_state(&mut self, state: State) -> Result<usize, BuildError> {
        if self.state_index.contains_key(state.name()) {
            return Err(BuildError::DuplicateState {
                machine: self.name.clone(),
                name: state.name().to_string(),
            });
        }

        let index = self.states.len();
        tracing::trace!(machine = %self.name, state = state.name(), "state added");
        self.state_index.insert(state.name().to_string(), index);
        self.states.push(state);
        Ok(index)
    }

    /// Add a transition. Fails on a duplicate name, or if either endpoint
    /// is not a state of this graph.
    pub fn add_transition(&mut self, transition: Transition) -> Result<usize, BuildError> {
        if self.transition_index.contains_key(transition.name()) {
            return Err(BuildError::DuplicateTransition {
                machine: self.name.clone(),
                name: transition.name().to_string(),
            });
        }

        for endpoint in [transition.source(), transition.target()] {
            if !self.state_index.contains_key(endpoint) {
                return Err(BuildError::InvalidTransition {
                    machine: self.name.clone(),
                    name: transition.name().to_string(),
                    reason: format!("state '{endpoint}' is not part of this machine"),
                });
            }
        }

        let index = self.transitions.len();
        tracing::trace!(
            machine = %self.name,
            transition = transition.name(),
            source = transition.source(),
            target = transition.target(),
            "transition added"
        );
        self.transition_index
            .insert(transition.name().to_string(), index);
        self.transitions.push(transition);
        Ok(index)
    }

    /// Designate the start state, clearing the marker of any previous one.
    pub fn set_start_state(&mut self, name: &str) -> Result<(), BuildError> {
        let index = self.require_state(name)?;
        self.start_state = Some(self.mark(index, StateType::Start));
        Ok(())
    }

    /// Designate the end state, clearing the marker of any previous one.
    pub fn set_end_state(&mut self, name: &str) -> Result<(), BuildError> {
        let index = self.require_state(name)?;
        self.end_state = Some(self.mark(index, StateType::End));
        Ok(())
    }

    fn mark(&mut self, index: usize, state_type: StateType) -> usize {
        for state in self.states.iter_mut() {
            if state.state_type() == state_type {
                state.set_state_type(StateType::None);
            }
        }
        self.states[index].set_state_type(state_type);
        index
    }

    fn require_state(&self, name: &str) -> Result<usize, BuildError> {
        self.state_index
            .get(name)
            .copied()
            .ok_or_else(|| BuildError::UnknownState {
                machine: self.name.clone(),
                name: name.to_string(),
            })
    }

    pub fn start_state(&self) -> Option<&State> {
        self.start_state.map(|index| &self.states[index])
    }

    pub fn end_state(&self) -> Option<&State> {
        self.end_state.map(|index| &self.states[index])
    }

    pub fn start_index(&self) -> Option<usize> {
        self.start_state
    }

    pub fn end_index(&self) -> Option<usize> {
        self.end_state
    }

    pub fn state_index(&self, name: &str) -> Option<usize> {
        self.state_index.get(name).copied()
    }

    pub fn transition_index(&self, name: &str) -> Option<usize> {
        self.transition_index.get(name).copied()
    }

    pub fn state_named(&self, name: &str) -> Option<&State> {
        self.state_index(name).map(|index| &self.states[index])
    }

    pub fn transition_named(&self, name: &str) -> Option<&Transition> {
        self.transition_index(name).map(|index| &self.transitions[index])
    }

    /// Indices of the transitions leaving the state at `index`, in
    /// insertion order.
    pub fn outgoing(&self, index: usize) -> Vec<usize> {
        let Some(state) = self.states.get(index) else {
            return Vec::new();
        };
        self.transitions
            .iter()
            .enumerate()
            .filter(|(_, t)| t.source() == state.name())
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the transitions entering the state at `index`.
    pub fn incoming(&self, index: usize) -> Vec<usize> {
        let Some(state) = self.states.get(index) else {
            return Vec::new();
        };
        self.transitions
            .iter()
            .enumerate()
            .filter(|(_, t)| t.target() == state.name())
            .map(|(i, _)| i)
            .collect()
    }

    /// The graph owned by the composite state at `scope`; `self` for an
    /// empty scope.
    pub fn graph_at(&self, scope: &[usize]) -> Option<&StateMachine> {
        let mut graph = self;
        for &index in scope {
            graph = graph.states.get(index)?.submachine()?;
        }
        Some(graph)
    }

    pub fn state(&self, state: &StateRef) -> Option<&State> {
        self.graph_at(state.owner())?.states.get(state.index())
    }

    pub fn transition(&self, transition: &TransitionRef) -> Option<&Transition> {
        self.graph_at(transition.owner())?
            .transitions
            .get(transition.index())
    }

    /// Handle of the state a transition leaves.
    pub fn source_of(&self, transition: &TransitionRef) -> Option<StateRef> {
        let graph = self.graph_at(transition.owner())?;
        let t = graph.transitions.get(transition.index())?;
        graph
            .state_index(t.source())
            .map(|index| transition.sibling_state(index))
    }

    /// Handle of the state a transition enters.
    pub fn target_of(&self, transition: &TransitionRef) -> Option<StateRef> {
        let graph = self.graph_at(transition.owner())?;
        let t = graph.transitions.get(transition.index())?;
        graph
            .state_index(t.target())
            .map(|index| transition.sibling_state(index))
    }

    /// The context that serves hooks of the graph at `scope`.
    ///
    /// Graphs without their own context inherit the nearest enclosing
    /// one; with none at all every hook is a no-op.
    pub fn context_for(&self, scope: &[usize]) -> &dyn Context {
        (0..=scope.len())
            .rev()
            .filter_map(|len| self.graph_at(&scope[..len]))
            .find_map(|graph| graph.context.as_deref())
            .unwrap_or(&NO_CONTEXT)
    }

    /// Names along a state handle, outermost first.
    pub fn names_of(&self, state: &StateRef) -> Vec<String> {
        let mut names = Vec::with_capacity(state.depth());
        let mut graph = Some(self);
        for &index in state.indices() {
            let Some(node) = graph.and_then(|g| g.states.get(index)) else {
                break;
            };
            names.push(node.name().to_string());
            graph = node.submachine();
        }
        names
    }

    /// Where entering `state` actually lands: composite states continue
    /// into their submachine's start state, recursively.
    pub fn initial_descendant(&self, state: &StateRef) -> StateRef {
        let mut current = state.clone();
        while let Some(start) = self
            .state(&current)
            .and_then(State::submachine)
            .and_then(StateMachine::start_index)
        {
            current = current.child(start);
        }
        current
    }

    /// Every state handle in this graph and its submachines, depth first.
    pub fn all_states(&self) -> Vec<StateRef> {
        let mut refs = Vec::new();
        self.collect_states(&[], &mut refs);
        refs
    }

    fn collect_states(&self, scope: &[usize], refs: &mut Vec<StateRef>) {
        for (index, state) in self.states.iter().enumerate() {
            let mut path = scope.to_vec();
            path.push(index);
            refs.push(StateRef::from_indices(path.clone()));
            if let Some(submachine) = state.submachine() {
                submachine.collect_states(&path, refs);
            }
        }
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("name", &self.name)
            .field("states", &self.states)
            .field("transitions", &self.transitions)
            .field("start_state", &self.start_state)
            .field("end_state", &self.end_state)
            .field("superstate", &self.superstate)
            .field("has_context", &self.context.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear() -> StateMachine {
        let mut graph = StateMachine::new("linear");
        for name in ["a", "b", "c"] {
            graph.add_state(State::new(name)).unwrap();
        }
        graph.add_transition(Transition::new("go", "a", "b")).unwrap();
        graph
            .add_transition(Transition::new("finish", "b", "c"))
            .unwrap();
        graph.set_start_state("a").unwrap();
        graph.set_end_state("c").unwrap();
        graph
    }

    #[test]
    fn duplicate_state_is_rejected() {
        let mut graph = linear();
        let result = graph.add_state(State::new("b"));

        assert!(matches!(result, Err(BuildError::DuplicateState { .. })));
        assert_eq!(graph.states().len(), 3);
    }

    #[test]
    fn duplicate_transition_is_rejected() {
        let mut graph = linear();
        let result = graph.add_transition(Transition::new("go", "b", "c"));

        assert!(matches!(result, Err(BuildError::DuplicateTransition { .. })));
        assert_eq!(graph.transitions().len(), 2);
    }

    #[test]
    fn transition_endpoints_must_be_members() {
        let mut graph = linear();
        let result = graph.add_transition(Transition::new("away", "a", "elsewhere"));

        assert!(matches!(result, Err(BuildError::InvalidTransition { .. })));
    }

    #[test]
    fn start_marker_moves_when_reassigned() {
        let mut graph = linear();
        graph.set_start_state("b").unwrap();

        assert_eq!(graph.start_state().unwrap().name(), "b");
        assert!(!graph.state_named("a").unwrap().is_start_state());
        assert!(graph.state_named("b").unwrap().is_start_state());

        let starts = graph.states().iter().filter(|s| s.is_start_state()).count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn setting_start_twice_is_idempotent() {
        let mut graph = linear();
        graph.set_start_state("a").unwrap();
        graph.set_start_state("a").unwrap();

        assert_eq!(graph.start_index(), Some(0));
        assert!(graph.state_named("a").unwrap().is_start_state());
    }

    #[test]
    fn unknown_start_state_is_rejected() {
        let mut graph = linear();
        let result = graph.set_end_state("zzz");

        assert!(matches!(result, Err(BuildError::UnknownState { .. })));
        assert_eq!(graph.end_state().unwrap().name(), "c");
    }

    #[test]
    fn outgoing_follows_insertion_order() {
        let mut graph = linear();
        graph.add_transition(Transition::new("skip", "a", "c")).unwrap();

        assert_eq!(graph.outgoing(0), vec![0, 2]);
        assert_eq!(graph.incoming(2), vec![1, 2]);
        assert!(graph.outgoing(2).is_empty());
    }

    #[test]
    fn nested_lookup_through_handles() {
        let mut inner = StateMachine::new("inner");
        inner.add_state(State::new("x")).unwrap();
        inner.add_state(State::new("y")).unwrap();
        inner.add_transition(Transition::new("next", "x", "y")).unwrap();
        inner.set_start_state("x").unwrap();

        let mut root = StateMachine::new("root");
        root.add_state(State::new("a")).unwrap();
        root.add_state(State::new("b").with_submachine(inner)).unwrap();
        root.set_start_state("a").unwrap();

        let y = StateRef::from_indices(vec![1, 1]);
        assert_eq!(root.state(&y).unwrap().name(), "y");
        assert_eq!(root.names_of(&y), vec!["b", "y"]);

        let next = TransitionRef::new(vec![1], 0);
        assert_eq!(root.transition(&next).unwrap().name(), "next");
        assert_eq!(root.source_of(&next), Some(StateRef::from_indices(vec![1, 0])));
        assert_eq!(root.target_of(&next), Some(y));

        let b = StateRef::from_indices(vec![1]);
        assert_eq!(root.initial_descendant(&b).indices(), &[1, 0]);
        assert_eq!(root.all_states().len(), 4);
    }
}
