//! Side-effecting hooks attached to states and transitions.

use super::context::HookError;
use crate::runtime::Machine;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type Action<N> = Arc<dyn Fn(&mut Machine, &N, &[Value]) -> Result<(), HookError> + Send + Sync>;

/// A hook run for its side effects on a node of type `N`.
///
/// `Behavior<State>` backs entry, exit and doActivity overrides;
/// `Behavior<Transition>` backs transition effects. The hook receives the
/// driving machine mutably so it can request further transitions.
pub struct Behavior<N> {
    label: Option<String>,
    action: Action<N>,
}

impl<N> Behavior<N> {
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(&mut Machine, &N, &[Value]) -> Result<(), HookError> + Send + Sync + 'static,
    {
        Self {
            label: None,
            action: Arc::new(action),
        }
    }

    /// Create a behavior with a display label, shown by renderers.
    pub fn named<F>(label: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut Machine, &N, &[Value]) -> Result<(), HookError> + Send + Sync + 'static,
    {
        Self {
            label: Some(label.into()),
            action: Arc::new(action),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn run(&self, machine: &mut Machine, node: &N, args: &[Value]) -> Result<(), HookError> {
        (self.action)(machine, node, args)
    }
}

impl<N> Clone for Behavior<N> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            action: Arc::clone(&self.action),
        }
    }
}

impl<N> fmt::Debug for Behavior<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior")
            .field("label", &self.label)
            .finish()
    }
}
