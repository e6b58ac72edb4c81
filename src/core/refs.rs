//! Positional handles into a nested state machine graph.
//!
//! Graphs are immutable and shared, so states and transitions are addressed
//! by their position instead of by pointer. A handle stays valid for the
//! lifetime of the graph because states and transitions are never removed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Path of state indices from the root graph down to a state.
///
/// `[1]` is the second state of the root graph. `[1, 0]` is the first state
/// of the submachine owned by that state.
///
/// # Example
///
/// ```rust
/// use nested_fsm::core::StateRef;
///
/// let inner = StateRef::from_indices(vec![1, 0]);
/// assert_eq!(inner.depth(), 2);
/// assert_eq!(inner.parent(), Some(StateRef::from_indices(vec![1])));
///
/// let chain = inner.ancestors();
/// assert_eq!(chain, vec![inner.clone(), StateRef::from_indices(vec![1])]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateRef(Vec<usize>);

impl StateRef {
    /// Build a handle from raw indices, root first.
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Handle of the state at `index` inside this state's submachine.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Nesting depth; root graph states have depth 1.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Index of the state within its owning graph.
    pub fn index(&self) -> usize {
        self.0.last().copied().unwrap_or_default()
    }

    /// Path of the composite state owning this state's graph.
    ///
    /// Empty for states of the root graph.
    pub fn owner(&self) -> &[usize] {
        &self.0[..self.0.len().saturating_sub(1)]
    }

    /// The enclosing composite state, if any.
    pub fn parent(&self) -> Option<StateRef> {
        if self.0.len() > 1 {
            Some(Self(self.owner().to_vec()))
        } else {
            None
        }
    }

    /// The chain from this state up to its outermost enclosing state.
    ///
    /// Ordered leaf to root; the state itself comes first.
    pub fn ancestors(&self) -> Vec<StateRef> {
        (1..=self.0.len())
            .rev()
            .map(|len| Self(self.0[..len].to_vec()))
            .collect()
    }

    /// True if this state lies inside the graph owned by `scope`.
    pub fn is_within(&self, scope: &[usize]) -> bool {
        self.0.len() > scope.len() && self.0.starts_with(scope)
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        write!(f, "[{}]", parts.join("."))
    }
}

/// Handle of a transition: the graph that holds it plus its index there.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionRef {
    owner: Vec<usize>,
    index: usize,
}

impl TransitionRef {
    pub fn new(owner: Vec<usize>, index: usize) -> Self {
        Self { owner, index }
    }

    /// Path of the composite state whose submachine holds the transition.
    pub fn owner(&self) -> &[usize] {
        &self.owner
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Handle of a state that lives in the same graph as this transition.
    pub(crate) fn sibling_state(&self, index: usize) -> StateRef {
        let mut indices = self.owner.clone();
        indices.push(index);
        StateRef(indices)
    }
}

impl fmt::Display for TransitionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.owner.iter().map(usize::to_string).collect();
        write!(f, "[{}]#{}", parts.join("."), self.index)
    }
}

/// Selects a transition by name or by handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionSelector<'a> {
    Name(&'a str),
    Ref(&'a TransitionRef),
}

impl<'a> From<&'a str> for TransitionSelector<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for TransitionSelector<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name.as_str())
    }
}

impl<'a> From<&'a TransitionRef> for TransitionSelector<'a> {
    fn from(transition: &'a TransitionRef) -> Self {
        Self::Ref(transition)
    }
}

impl fmt::Display for TransitionSelector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Ref(transition) => write!(f, "{transition}"),
        }
    }
}

/// Selects a state by name or by handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StateSelector<'a> {
    Name(&'a str),
    Ref(&'a StateRef),
}

impl<'a> From<&'a str> for StateSelector<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for StateSelector<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name.as_str())
    }
}

impl<'a> From<&'a StateRef> for StateSelector<'a> {
    fn from(state: &'a StateRef) -> Self {
        Self::Ref(state)
    }
}

impl fmt::Display for StateSelector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Ref(state) => write!(f, "{state}"),
        }
    }
}
