//! Builder for constructing transitions.

use crate::core::{Behavior, Guard, HookError, Transition, TransitionKind};
use crate::runtime::Machine;
use serde_json::Value;

/// Builder for constructing transitions with a fluent API.
///
/// Without an explicit name the transition is called `"<from>-><to>"`.
pub struct TransitionBuilder {
    from: String,
    to: String,
    name: Option<String>,
    guard: Option<Guard>,
    effect: Option<Behavior<Transition>>,
    kind: TransitionKind,
}

impl TransitionBuilder {
    /// Create a transition from state `from` to state `to`.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            name: None,
            guard: None,
            effect: None,
            kind: TransitionKind::External,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a guard.
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Machine, &Transition, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Set the effect run when the transition fires.
    pub fn effect<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut Machine, &Transition, &[Value]) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.effect = Some(Behavior::new(action));
        self
    }

    /// Set the effect with a display label.
    pub fn effect_named<F>(mut self, label: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut Machine, &Transition, &[Value]) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.effect = Some(Behavior::named(label, action));
        self
    }

    pub fn kind(mut self, kind: TransitionKind) -> Self {
        self.kind = kind;
        self
    }

    pub(crate) fn source(&self) -> &str {
        &self.from
    }

    pub(crate) fn target(&self) -> &str {
        &self.to
    }

    /// Build the transition.
    pub fn build(self) -> Transition {
        let name = self
            .name
            .unwrap_or_else(|| format!("{}->{}", self.from, self.to));
        let mut transition = Transition::new(name, self.from, self.to).with_kind(self.kind);
        if let Some(guard) = self.guard {
            transition = transition.with_guard(guard);
        }
        if let Some(effect) = self.effect {
            transition = transition.with_effect(effect);
        }
        transition
    }
}
