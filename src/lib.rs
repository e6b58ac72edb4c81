//! nested-fsm: hierarchical state machines with run-to-completion semantics.
//!
//! Graphs are built once and shared; any number of [`Machine`]s walk them
//! independently. A state may own a nested graph, which makes it a
//! composite state: entering it continues into the nested start state, and
//! transitions declared on enclosing states stay available from inside.
//!
//! # Core Concepts
//!
//! - **Graph**: [`StateMachine`] of [`State`]s and [`Transition`]s, built
//!   with [`StateMachineBuilder`] and validated as a whole
//! - **Machine**: a traversal session holding the current state, one
//!   pending transition and an optional [`History`]
//! - **Hooks**: entry, exit, doActivity, guards and effects, dispatched to
//!   per-node overrides or to the graph's [`Context`]
//! - **Rendering**: [`DotRenderer`] turns graphs and machines into Graphviz
//!   source
//!
//! # Example
//!
//! ```rust
//! use nested_fsm::{Machine, StateBuilder, StateMachineBuilder};
//!
//! let graph = StateMachineBuilder::new("job")
//!     .start_state("queued")
//!     .end_state("done")
//!     .add_state(
//!         StateBuilder::new("running").submachine(
//!             StateMachineBuilder::new("steps")
//!                 .start_state("fetch")
//!                 .transition("fetch", "build"),
//!         ),
//!     )
//!     .transition("queued", "running")
//!     .transition("running", "done")
//!     .build()
//!     .unwrap();
//!
//! let mut machine = Machine::new(graph).with_history();
//! machine.start(&[]).unwrap();
//! machine.transition_to("running", &[]).unwrap();
//! assert_eq!(machine.state_names(), vec!["running", "fetch"]);
//!
//! machine.transition_to("build", &[]).unwrap();
//! machine.transition_to("done", &[]).unwrap();
//! assert!(machine.at_end());
//! assert_eq!(machine.to_string(), "job[done]");
//! ```

pub mod builder;
pub mod core;
pub mod dot;
pub mod runtime;
pub mod validation;

// Re-export commonly used types
pub use crate::builder::{BuildError, StateBuilder, StateMachineBuilder, TransitionBuilder};
pub use crate::core::{
    Behavior, Context, Guard, History, HistoryRecord, HookError, State, StateMachine, StateRef,
    Transition, TransitionRef,
};
pub use crate::dot::{DotOptions, DotRenderer};
pub use crate::runtime::{Machine, MachineError, MachineOptions};
