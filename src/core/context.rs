//! The capability interface that receives hook calls.
//!
//! Every graph may carry a [`Context`]. Hooks without a per-node override
//! are dispatched to it; methods it does not implement fall back to the
//! defaults, which do nothing and let guards pass.

use super::state::State;
use super::transition::Transition;
use crate::runtime::Machine;
use serde_json::Value;
use thiserror::Error;

/// Failure raised from inside a hook.
///
/// The machine rolls its current state back to where it was before the
/// transition started and returns the error to the caller. Hooks that
/// already ran are not undone.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("hook failed: {message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Receiver of hook calls for states and transitions of a graph.
///
/// All methods have no-op defaults, so implementors only override the
/// hooks they care about.
///
/// # Example
///
/// ```rust
/// use nested_fsm::builder::StateMachineBuilder;
/// use nested_fsm::core::{Context, HookError, State};
/// use nested_fsm::runtime::Machine;
/// use serde_json::Value;
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Default)]
/// struct Recorder {
///     entered: Mutex<Vec<String>>,
/// }
///
/// impl Context for Recorder {
///     fn entry(&self, _machine: &mut Machine, state: &State, _args: &[Value]) -> Result<(), HookError> {
///         self.entered.lock().unwrap().push(state.name().to_string());
///         Ok(())
///     }
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let graph = StateMachineBuilder::new("door")
///     .context(recorder.clone())
///     .start_state("closed")
///     .end_state("open")
///     .transition("closed", "open")
///     .build()
///     .unwrap();
///
/// let mut machine = Machine::new(graph);
/// machine.start(&[]).unwrap();
/// machine.transition("closed->open", &[]).unwrap();
/// assert_eq!(*recorder.entered.lock().unwrap(), vec!["closed", "open"]);
/// ```
pub trait Context: Send + Sync {
    /// Decide whether `transition` may fire.
    ///
    /// `None` means no answer, which lets the transition pass.
    fn guard(&self, _machine: &Machine, _transition: &Transition, _args: &[Value]) -> Option<bool> {
        None
    }

    /// Run when `transition` fires, before any state is exited.
    fn effect(
        &self,
        _machine: &mut Machine,
        _transition: &Transition,
        _args: &[Value],
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Run when `state` becomes active.
    fn entry(&self, _machine: &mut Machine, _state: &State, _args: &[Value]) -> Result<(), HookError> {
        Ok(())
    }

    /// Run when `state` stops being active.
    fn exit(&self, _machine: &mut Machine, _state: &State, _args: &[Value]) -> Result<(), HookError> {
        Ok(())
    }

    /// Run right after `state` becomes the current state.
    ///
    /// Transitions requested from here are queued and fired once the
    /// running transition has completed.
    fn do_activity(
        &self,
        _machine: &mut Machine,
        _state: &State,
        _args: &[Value],
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Run before the effect of `transition`.
    fn before_transition(
        &self,
        _machine: &mut Machine,
        _transition: &Transition,
        _args: &[Value],
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Run once the current state points at the target, before entry hooks.
    fn during_transition(
        &self,
        _machine: &mut Machine,
        _transition: &Transition,
        _args: &[Value],
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Run after `during_transition`, still before entry hooks.
    fn after_transition(
        &self,
        _machine: &mut Machine,
        _transition: &Transition,
        _args: &[Value],
    ) -> Result<(), HookError> {
        Ok(())
    }
}

/// Context that implements no hooks at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoContext;

impl Context for NoContext {}

pub(crate) static NO_CONTEXT: NoContext = NoContext;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_error_keeps_message() {
        let err = HookError::new("disk full");

        assert_eq!(err.message(), "disk full");
        assert_eq!(err.to_string(), "hook failed: disk full");
    }
}
