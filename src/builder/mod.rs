//! Builder API for ergonomic graph construction.
//!
//! Graphs are assembled with fluent builders, then validated as a whole
//! before they are handed out. Every problem found by validation is
//! reported at once in [`BuildError::Invalid`].

pub mod error;
pub mod machine;
pub mod state;
pub mod transition;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
pub use state::StateBuilder;
pub use transition::TransitionBuilder;
