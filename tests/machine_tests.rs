//! End-to-end behavior of machines walking shared graphs.

use nested_fsm::core::{Context, HookError, State, Transition};
use nested_fsm::{
    Machine, MachineError, MachineOptions, StateBuilder, StateMachine, StateMachineBuilder,
    TransitionBuilder,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Context that logs every hook it receives.
#[derive(Default)]
struct Journal {
    events: Mutex<Vec<String>>,
    fail_entry_of: Option<String>,
}

impl Journal {
    fn failing_on(state: &str) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_entry_of: Some(state.to_string()),
        }
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl Context for Journal {
    fn effect(&self, _m: &mut Machine, t: &Transition, _args: &[Value]) -> Result<(), HookError> {
        self.push(format!("effect {}", t.name()));
        Ok(())
    }

    fn entry(&self, _m: &mut Machine, s: &State, _args: &[Value]) -> Result<(), HookError> {
        if self.fail_entry_of.as_deref() == Some(s.name()) {
            return Err(HookError::new(format!("cannot enter {}", s.name())));
        }
        self.push(format!("entry {}", s.name()));
        Ok(())
    }

    fn exit(&self, _m: &mut Machine, s: &State, _args: &[Value]) -> Result<(), HookError> {
        self.push(format!("exit {}", s.name()));
        Ok(())
    }

    fn do_activity(&self, _m: &mut Machine, s: &State, _args: &[Value]) -> Result<(), HookError> {
        self.push(format!("do {}", s.name()));
        Ok(())
    }

    fn before_transition(&self, _m: &mut Machine, t: &Transition, _args: &[Value]) -> Result<(), HookError> {
        self.push(format!("before {}", t.name()));
        Ok(())
    }

    fn during_transition(&self, _m: &mut Machine, t: &Transition, _args: &[Value]) -> Result<(), HookError> {
        self.push(format!("during {}", t.name()));
        Ok(())
    }

    fn after_transition(&self, _m: &mut Machine, t: &Transition, _args: &[Value]) -> Result<(), HookError> {
        self.push(format!("after {}", t.name()));
        Ok(())
    }
}

fn linear() -> StateMachine {
    StateMachineBuilder::new("linear")
        .start_state("a")
        .transition_named("go", "a", "b")
        .transition_named("finish", "b", "c")
        .end_state("c")
        .build()
        .unwrap()
}

/// `a -> b{x -> y} -> c`
fn composite(context: Arc<Journal>) -> StateMachine {
    StateMachineBuilder::new("outer")
        .context(context)
        .start_state("a")
        .add_state(
            StateBuilder::new("b").submachine(
                StateMachineBuilder::new("inner")
                    .start_state("x")
                    .transition("x", "y")
                    .end_state("y"),
            ),
        )
        .transition("a", "b")
        .transition("b", "c")
        .end_state("c")
        .build()
        .unwrap()
}

#[test]
fn linear_walk_records_history() {
    let mut machine = Machine::new(linear()).with_history();
    machine.start(&[]).unwrap();
    assert_eq!(machine.state_names(), vec!["a"]);
    assert!(machine.at_start());

    machine.transition("go", &[]).unwrap();
    assert_eq!(machine.state_names(), vec!["b"]);
    assert_eq!(machine.history().unwrap().len(), 2);

    machine.transition("finish", &[]).unwrap();
    assert_eq!(machine.state_names(), vec!["c"]);
    assert!(machine.at_end());
    assert_eq!(machine.history().unwrap().len(), 3);

    let last = machine.history().unwrap().last().unwrap();
    assert_eq!(last.previous_state.as_ref(), Some(&nested_fsm::StateRef::from_indices(vec![1])));
    assert_eq!(last.transition.as_ref().map(|t| t.index()), Some(1));
}

#[test]
fn transition_to_unknown_state_fails() {
    let mut machine = Machine::new(linear());
    machine.start(&[]).unwrap();

    let result = machine.transition_to("nonexistent_state", &[]);
    assert!(matches!(result, Err(MachineError::UnknownTransition { .. })));
    assert_eq!(machine.state_names(), vec!["a"]);
}

#[test]
fn transition_to_unreachable_state_fails() {
    let mut machine = Machine::new(linear());
    machine.start(&[]).unwrap();

    let result = machine.transition_to("c", &[]);
    assert!(matches!(result, Err(MachineError::UnknownTransition { .. })));
}

#[test]
fn unknown_transition_name_cannot_fire() {
    let mut machine = Machine::new(linear());
    machine.start(&[]).unwrap();

    let result = machine.transition("finish", &[]);
    assert!(matches!(result, Err(MachineError::CannotTransition { .. })));
    assert!(result.unwrap_err().is_resolution());
}

#[test]
fn two_routes_to_one_target_are_ambiguous() {
    let graph = StateMachineBuilder::new("fork")
        .start_state("a")
        .transition_named("left", "a", "b")
        .transition_named("right", "a", "b")
        .build()
        .unwrap();

    let mut machine = Machine::new(graph);
    machine.start(&[]).unwrap();

    match machine.transition_to("b", &[]) {
        Err(MachineError::AmbiguousTransition { candidates, .. }) => {
            assert_eq!(candidates, vec!["left", "right"]);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
    assert!(!machine.can_transition_to("b", &[]));
    assert_eq!(machine.state_names(), vec!["a"]);
}

#[test]
fn next_state_ambiguity_is_optional() {
    let graph = StateMachineBuilder::new("fork")
        .start_state("a")
        .transition("a", "b")
        .transition("a", "c")
        .build()
        .unwrap();

    let mut machine = Machine::new(graph);
    machine.start(&[]).unwrap();

    assert!(matches!(
        machine.transition_to_next_state(true, &[]),
        Err(MachineError::AmbiguousTransition { .. })
    ));
    assert_eq!(machine.transition_to_next_state(false, &[]), Ok(None));
    assert_eq!(machine.transition_if_valid(&[]), Ok(None));
    assert_eq!(machine.state_names(), vec!["a"]);
}

#[test]
fn guards_narrow_the_candidates() {
    let graph = StateMachineBuilder::new("gate")
        .start_state("a")
        .add_transition(
            TransitionBuilder::new("a", "b")
                .name("open")
                .when(|_, _, args| args.first().and_then(Value::as_bool).unwrap_or(false)),
        )
        .add_transition(TransitionBuilder::new("a", "c").name("bypass").when(|_, _, _| false))
        .build()
        .unwrap();

    let mut machine = Machine::new(graph);
    machine.start(&[]).unwrap();

    assert!(!machine.guard(&[Value::Bool(false)]));
    assert!(matches!(
        machine.transition("open", &[Value::Bool(false)]),
        Err(MachineError::CannotTransition { .. })
    ));

    assert_eq!(machine.valid_transitions(&[Value::Bool(true)]).len(), 1);
    let fired = machine.transition_if_valid(&[Value::Bool(true)]).unwrap();
    assert_eq!(fired.map(|t| t.index()), Some(0));
    assert_eq!(machine.state_names(), vec!["b"]);
}

#[test]
fn clones_share_the_graph_only() {
    let mut prototype = Machine::new(linear()).with_history();
    prototype.start(&[]).unwrap();

    let mut first = prototype.clone();
    let mut second = prototype.clone();
    first.transition("go", &[]).unwrap();
    first.transition("finish", &[]).unwrap();
    second.transition("go", &[]).unwrap();

    assert!(Arc::ptr_eq(prototype.graph(), first.graph()));
    assert!(Arc::ptr_eq(first.graph(), second.graph()));
    assert_eq!(prototype.state_names(), vec!["a"]);
    assert_eq!(prototype.history().unwrap().len(), 1);
    assert_eq!(first.state_names(), vec!["c"]);
    assert_eq!(second.state_names(), vec!["b"]);
    assert_eq!(second.history().unwrap().len(), 2);
}

#[test]
fn composite_states_enter_and_exit_in_order() {
    let journal = Arc::new(Journal::default());
    let mut machine = Machine::new(composite(journal.clone()));

    machine.start(&[]).unwrap();
    assert_eq!(journal.take(), vec!["entry a", "do a"]);

    machine.transition("a->b", &[]).unwrap();
    assert_eq!(machine.state_names(), vec!["b", "x"]);
    assert!(!machine.at_end());
    assert_eq!(
        journal.take(),
        vec![
            "before a->b",
            "effect a->b",
            "exit a",
            "during a->b",
            "after a->b",
            "entry b",
            "entry x",
            "do x",
        ]
    );

    machine.transition("x->y", &[]).unwrap();
    assert!(machine.at_end());
    assert_eq!(machine.state_names(), vec!["b", "y"]);
    journal.take();

    // A nested end state does not stop the outer machine.
    machine.transition("b->c", &[]).unwrap();
    assert_eq!(machine.state_names(), vec!["c"]);
    assert_eq!(
        journal.take(),
        vec![
            "before b->c",
            "effect b->c",
            "exit y",
            "exit b",
            "during b->c",
            "after b->c",
            "entry c",
            "do c",
        ]
    );
}

#[test]
fn start_enters_nested_start_state() {
    let graph = StateMachineBuilder::new("deep")
        .add_state(
            StateBuilder::new("b").submachine(
                StateMachineBuilder::new("inner").add_state(
                    StateBuilder::new("x")
                        .submachine(StateMachineBuilder::new("innermost").start_state("p")),
                ),
            ),
        )
        .start_state("b")
        .build();

    // "inner" has no start state, so the whole graph is rejected.
    assert!(graph.is_err());

    let graph = StateMachineBuilder::new("deep")
        .start_state("b")
        .add_state(
            StateBuilder::new("b").submachine(
                StateMachineBuilder::new("inner").start_state("x").add_state(
                    StateBuilder::new("x")
                        .submachine(StateMachineBuilder::new("innermost").start_state("p")),
                ),
            ),
        )
        .build()
        .unwrap();

    let mut machine = Machine::new(graph);
    machine.start(&[]).unwrap();

    assert_eq!(machine.state_names(), vec!["b", "x", "p"]);
    assert!(machine.at_start());
    assert_eq!(machine.machines().len(), 3);
}

#[test]
fn do_activity_requests_are_queued() {
    let graph = StateMachineBuilder::new("auto")
        .start_state("idle")
        .add_state(StateBuilder::new("working").do_activity(|machine, _, _| {
            assert!(machine.in_do_activity());
            machine
                .transition("working->done", &[])
                .map_err(|e| HookError::new(e.to_string()))?;
            // Still here: the request waits for the running transition.
            assert_eq!(machine.state_names(), vec!["working"]);
            assert!(machine.pending_transition().is_some());
            Ok(())
        }))
        .transition("idle", "working")
        .transition("working", "done")
        .end_state("done")
        .build()
        .unwrap();

    let mut machine = Machine::new(graph).with_history();
    machine.start(&[]).unwrap();
    machine.transition("idle->working", &[]).unwrap();

    assert_eq!(machine.state_names(), vec!["done"]);
    assert!(machine.pending_transition().is_none());
    assert_eq!(machine.history().unwrap().len(), 3);
}

#[test]
fn queue_keeps_only_the_latest_request() {
    let graph = StateMachineBuilder::new("latest")
        .start_state("a")
        .add_state(StateBuilder::new("a").do_activity(|machine, _, _| {
            for name in ["a->b", "a->c"] {
                machine
                    .transition(name, &[])
                    .map_err(|e| HookError::new(e.to_string()))?;
            }
            Ok(())
        }))
        .transition("a", "b")
        .transition("a", "c")
        .build()
        .unwrap();

    let mut machine = Machine::new(graph);
    machine.start(&[]).unwrap();
    machine.run(false).unwrap();

    assert_eq!(machine.state_names(), vec!["c"]);
}

#[test]
fn hook_failure_restores_previous_state() {
    let journal = Arc::new(Journal::failing_on("x"));
    let mut machine = Machine::new(composite(journal.clone())).with_history();
    machine.start(&[]).unwrap();
    journal.take();

    let result = machine.transition("a->b", &[]);
    assert_eq!(
        result,
        Err(MachineError::Hook(HookError::new("cannot enter x")))
    );

    assert_eq!(machine.state_names(), vec!["a"]);
    assert!(machine.sub().is_none());
    assert!(machine.executing_transition().is_none());
    assert!(machine.pending_transition().is_none());
    // Hooks that already ran are not undone.
    assert!(journal.take().contains(&"entry b".to_string()));
    // The record written before entry hooks ran stays in the log.
    assert_eq!(machine.history().unwrap().len(), 2);

    // The machine stays usable.
    machine.transition("a->b", &[]).unwrap_err();
    assert_eq!(machine.state_names(), vec!["a"]);
}

#[test]
fn failed_do_activity_discards_its_request() {
    let graph = StateMachineBuilder::new("chain")
        .start_state("a")
        .add_state(StateBuilder::new("b").do_activity(|machine, _, _| {
            machine
                .transition("b->c", &[])
                .map_err(|e| HookError::new(e.to_string()))?;
            Err(HookError::new("boom"))
        }))
        .transition("a", "b")
        .transition("b", "c")
        .end_state("c")
        .build()
        .unwrap();

    let mut machine = Machine::new(graph).with_history();
    machine.start(&[]).unwrap();

    assert_eq!(
        machine.transition("a->b", &[]),
        Err(MachineError::Hook(HookError::new("boom")))
    );
    assert_eq!(machine.state_names(), vec!["a"]);
    assert!(machine.pending_transition().is_none());

    machine.run(false).unwrap();
    assert_eq!(machine.state_names(), vec!["a"]);
    assert!(!machine.at_end());
}

#[test]
fn request_left_by_start_is_dropped_after_force_state() {
    let graph = StateMachineBuilder::new("loop")
        .start_state("a")
        .add_state(StateBuilder::new("a").do_activity(|machine, _, _| {
            machine
                .transition("a->b", &[])
                .map_err(|e| HookError::new(e.to_string()))
        }))
        .transition("a", "b")
        .transition("c", "a")
        .build()
        .unwrap();

    let mut machine = Machine::new(graph).with_history();
    machine.start(&[]).unwrap();
    assert!(machine.pending_transition().is_some());

    machine.force_state("c", &[]).unwrap();
    machine.run(false).unwrap();

    assert_eq!(machine.state_names(), vec!["c"]);
    assert!(machine.pending_transition().is_none());
    assert_eq!(machine.history().unwrap().len(), 1);
}

#[test]
fn same_name_on_two_levels_is_ambiguous() {
    let graph = StateMachineBuilder::new("root")
        .start_state("b")
        .add_state(
            StateBuilder::new("b").submachine(
                StateMachineBuilder::new("inner")
                    .start_state("x")
                    .transition_named("next", "x", "y"),
            ),
        )
        .transition_named("next", "b", "c")
        .build()
        .unwrap();

    let mut machine = Machine::new(graph);
    machine.start(&[]).unwrap();

    match machine.transition("next", &[]) {
        Err(MachineError::AmbiguousTransition { candidates, .. }) => {
            assert_eq!(candidates, vec!["next", "next"]);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
    assert_eq!(machine.state_names(), vec!["b", "x"]);
    assert!(machine.pending_transition().is_none());
}

#[test]
fn clear_history_then_restart_leaves_one_record() {
    let mut machine = Machine::new(linear()).with_history();
    machine.start(&[]).unwrap();
    machine.transition("go", &[]).unwrap();

    machine.clear_history();
    assert!(machine.history().unwrap().is_empty());

    machine.start(&[]).unwrap();
    let history = machine.history().unwrap();
    assert_eq!(history.len(), 1);
    assert!(history.records()[0].transition.is_none());
    assert!(history.records()[0].previous_state.is_none());
}

#[test]
fn nested_history_reaches_every_enclosing_machine() {
    let journal = Arc::new(Journal::default());
    let options = MachineOptions::new().record_history(true).nested_history(true);
    let mut machine = Machine::with_options(composite(journal), options);

    machine.start(&[]).unwrap();
    machine.transition("a->b", &[]).unwrap();
    machine.transition("x->y", &[]).unwrap();

    assert_eq!(machine.history().unwrap().len(), 3);
    let sub = machine.sub().unwrap();
    let sub_history = sub.history().unwrap();
    assert_eq!(sub_history.len(), 1);
    assert_eq!(
        sub_history.last().unwrap().transition,
        machine.history().unwrap().last().unwrap().transition
    );
}

#[test]
fn force_state_jumps_anywhere() {
    let journal = Arc::new(Journal::default());
    let mut machine = Machine::new(composite(journal.clone())).with_history();
    machine.start(&[]).unwrap();
    journal.take();

    machine.force_state("y", &[]).unwrap_err();
    machine.force_state("b", &[]).unwrap();
    assert_eq!(machine.state_names(), vec!["b", "x"]);
    assert_eq!(journal.take(), vec!["exit a", "entry b", "entry x", "do x"]);
    assert_eq!(machine.history().unwrap().len(), 1);

    assert!(matches!(
        machine.force_state("nowhere", &[]),
        Err(MachineError::UnknownState { .. })
    ));
}

#[test]
fn self_transition_skips_exit_and_entry() {
    let journal = Arc::new(Journal::default());
    let graph = StateMachineBuilder::new("loop")
        .context(journal.clone())
        .start_state("a")
        .transition("a", "a")
        .build()
        .unwrap();

    let mut machine = Machine::new(graph).with_history();
    machine.start(&[]).unwrap();
    journal.take();

    machine.transition("a->a", &[]).unwrap();
    assert_eq!(
        journal.take(),
        vec!["before a->a", "effect a->a", "during a->a", "after a->a", "do a"]
    );
    assert_eq!(machine.history().unwrap().len(), 2);
}
