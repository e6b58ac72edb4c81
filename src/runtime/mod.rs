//! Traversal sessions over a shared graph.
//!
//! A [`Machine`] holds everything that changes while a graph is walked:
//! the current state, a single-slot transition queue, optional history
//! and the child machines of active composite states. Graphs stay
//! read-only; many machines may walk the same one.
//!
//! # Re-entrancy
//!
//! Hooks run synchronously and may request transitions themselves.
//! Requests made while a drain loop is running, or from inside a
//! doActivity hook, are queued and fired by the outermost loop once the
//! running transition has completed. A queued request that no longer
//! leaves the current state when its turn comes is dropped, and a hook
//! failure that rolls a move back discards the request made during it.

mod error;
mod machine;
mod options;
mod queue;

pub use error::MachineError;
pub use machine::Machine;
pub use options::MachineOptions;
pub use queue::{PendingTransition, TransitionQueue};
