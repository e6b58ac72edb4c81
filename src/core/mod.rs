//! Core graph types.
//!
//! This module contains the static side of a state machine:
//! - `StateMachine` graphs of `State`s and `Transition`s, nested through
//!   submachines owned by composite states
//! - Positional handles (`StateRef`, `TransitionRef`) and selectors
//! - Hook dispatch via the `Context` capability trait, with per-node
//!   `Guard` and `Behavior` overrides
//! - Append-only `History` logs
//!
//! Graphs are built once and then shared read-only by every machine that
//! walks them.

mod behavior;
mod context;
mod guard;
mod history;
mod refs;
mod state;
mod state_machine;
mod transition;

pub use behavior::Behavior;
pub use context::{Context, HookError, NoContext};
pub use guard::Guard;
pub use history::{History, HistoryRecord};
pub use refs::{StateRef, StateSelector, TransitionRef, TransitionSelector};
pub use state::{State, StateHooks, StateType};
pub use state_machine::StateMachine;
pub use transition::{Transition, TransitionKind};
