//! The traversal engine.

use crate::core::{
    History, HistoryRecord, State, StateMachine, StateRef, StateSelector, TransitionRef,
    TransitionSelector,
};
use crate::runtime::error::MachineError;
use crate::runtime::options::MachineOptions;
use crate::runtime::queue::{PendingTransition, TransitionQueue};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Copy, Debug)]
enum StateHook {
    Entry,
    Exit,
    DoActivity,
}

impl StateHook {
    fn as_str(self) -> &'static str {
        match self {
            StateHook::Entry => "entry",
            StateHook::Exit => "exit",
            StateHook::DoActivity => "do_activity",
        }
    }
}

/// A traversal session over a [`StateMachine`] graph.
///
/// The graph is shared; the current state, queue and history belong to
/// this machine alone. Cloning a machine gives an independent session on
/// the same graph.
///
/// # Example
///
/// ```rust
/// use nested_fsm::builder::StateMachineBuilder;
/// use nested_fsm::runtime::Machine;
///
/// let graph = StateMachineBuilder::new("linear")
///     .start_state("a")
///     .end_state("c")
///     .transition_named("go", "a", "b")
///     .transition_named("finish", "b", "c")
///     .build()
///     .unwrap();
///
/// let mut machine = Machine::new(graph).with_history();
/// machine.start(&[]).unwrap();
/// machine.transition("go", &[]).unwrap();
/// machine.transition("finish", &[]).unwrap();
///
/// assert!(machine.at_end());
/// assert_eq!(machine.history().unwrap().len(), 3);
/// ```
pub struct Machine {
    id: Uuid,
    graph: Arc<StateMachine>,
    scope: Vec<usize>,
    state: Option<StateRef>,
    queue: TransitionQueue,
    executing: Option<TransitionRef>,
    history: Option<History>,
    options: MachineOptions,
    sub: Option<Box<Machine>>,
    in_run: bool,
    in_do_activity: bool,
}

impl Machine {
    /// Create a machine over `graph` with default options.
    pub fn new(graph: impl Into<Arc<StateMachine>>) -> Self {
        Self::with_options(graph, MachineOptions::default())
    }

    pub fn with_options(graph: impl Into<Arc<StateMachine>>, options: MachineOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            graph: graph.into(),
            scope: Vec::new(),
            state: None,
            queue: TransitionQueue::new(),
            executing: None,
            history: options.record_history.then(History::new),
            options,
            sub: None,
            in_run: false,
            in_do_activity: false,
        }
    }

    /// Enable the history log.
    pub fn with_history(mut self) -> Self {
        self.options.record_history = true;
        if self.history.is_none() {
            self.history = Some(History::new());
        }
        self
    }

    /// Child machine for the composite state at `scope`.
    fn nested(&self, scope: Vec<usize>) -> Self {
        Self {
            id: Uuid::new_v4(),
            graph: Arc::clone(&self.graph),
            scope,
            state: None,
            queue: TransitionQueue::new(),
            executing: None,
            history: self.options.nested_history.then(History::new),
            options: self.options.clone(),
            sub: None,
            in_run: false,
            in_do_activity: false,
        }
    }

    /// Copy that keeps every session id, used to roll back the child tree.
    fn snapshot(&self) -> Self {
        Self {
            id: self.id,
            graph: Arc::clone(&self.graph),
            scope: self.scope.clone(),
            state: self.state.clone(),
            queue: self.queue.clone(),
            executing: self.executing.clone(),
            history: self.history.clone(),
            options: self.options.clone(),
            sub: self.sub.as_deref().map(|sub| Box::new(sub.snapshot())),
            in_run: self.in_run,
            in_do_activity: self.in_do_activity,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The root graph shared by every machine walking it.
    pub fn graph(&self) -> &Arc<StateMachine> {
        &self.graph
    }

    /// The graph this machine walks: the root graph, or the submachine of
    /// the composite state a child machine is attached to.
    pub fn state_machine(&self) -> &StateMachine {
        self.graph.graph_at(&self.scope).unwrap_or(&self.graph)
    }

    pub fn options(&self) -> &MachineOptions {
        &self.options
    }

    /// Path of the composite state this machine is attached to; empty for
    /// a root machine.
    pub fn scope(&self) -> &[usize] {
        &self.scope
    }

    pub fn is_nested(&self) -> bool {
        !self.scope.is_empty()
    }

    /// The composite state a child machine is attached to.
    pub fn superstate(&self) -> Option<StateRef> {
        if self.scope.is_empty() {
            None
        } else {
            Some(StateRef::from_indices(self.scope.clone()))
        }
    }

    /// Handle of the current (innermost) state.
    pub fn state(&self) -> Option<&StateRef> {
        self.state.as_ref()
    }

    pub fn current_state(&self) -> Option<&State> {
        self.state.as_ref().and_then(|state| self.graph.state(state))
    }

    /// Names of the active states, outermost first.
    pub fn state_names(&self) -> Vec<String> {
        self.state
            .as_ref()
            .map(|state| self.graph.names_of(state))
            .unwrap_or_default()
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    /// Child machine of the active composite state, if any.
    pub fn sub(&self) -> Option<&Machine> {
        self.sub.as_deref()
    }

    /// This machine followed by its chain of child machines.
    pub fn machines(&self) -> Vec<&Machine> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(sub) = current.sub.as_deref() {
            chain.push(sub);
            current = sub;
        }
        chain
    }

    pub fn pending_transition(&self) -> Option<&PendingTransition> {
        self.queue.peek()
    }

    /// The transition being executed right now, visible to hooks.
    pub fn executing_transition(&self) -> Option<&TransitionRef> {
        self.executing.as_ref()
    }

    /// True once `start` has been called.
    pub fn started(&self) -> bool {
        self.state.is_some()
    }

    /// True if the machine sits where `start` puts it.
    pub fn at_start(&self) -> bool {
        match (&self.state, self.state_machine().start_index()) {
            (Some(state), Some(start)) => {
                *state == self.graph.initial_descendant(&self.scoped(start))
            }
            _ => false,
        }
    }

    /// True if the current (innermost) state is marked as an end state.
    pub fn at_end(&self) -> bool {
        self.current_state().is_some_and(State::is_end_state)
    }

    /// True while the current state's doActivity hook is running.
    pub fn in_do_activity(&self) -> bool {
        self.in_do_activity
    }

    /// True at an end state of this machine's own graph, which stops the
    /// drain loop. End states of nested graphs do not.
    fn at_own_end(&self) -> bool {
        match &self.state {
            Some(state) if state.owner() == self.scope.as_slice() => self.at_end(),
            _ => false,
        }
    }

    fn scoped(&self, index: usize) -> StateRef {
        let mut indices = self.scope.clone();
        indices.push(index);
        StateRef::from_indices(indices)
    }

    fn require_state(&self) -> Result<&StateRef, MachineError> {
        self.state.as_ref().ok_or(MachineError::NotStarted)
    }

    fn describe(&self, state: &StateRef) -> String {
        self.graph.names_of(state).join("/")
    }

    fn transition_name(&self, transition: &TransitionRef) -> String {
        self.graph
            .transition(transition)
            .map(|t| t.name().to_string())
            .unwrap_or_else(|| transition.to_string())
    }


    /// Transitions leaving the current state, followed by those leaving each
    /// enclosing composite state, innermost first.
    pub fn outgoing(&self) -> Vec<TransitionRef> {
        let Some(state) = &self.state else {
            return Vec::new();
        };

        state
            .ancestors()
            .into_iter()
            .filter(|s| s.is_within(&self.scope))
            .flat_map(|s| {
                let owner = s.owner().to_vec();
                self.graph
                    .graph_at(&owner)
                    .map(|graph| graph.outgoing(s.index()))
                    .unwrap_or_default()
                    .into_iter()
                    .map(move |index| TransitionRef::new(owner.clone(), index))
            })
            .collect()
    }

    fn passes_guard(&self, transition: &TransitionRef, args: &[Value]) -> bool {
        let Some(node) = self.graph.transition(transition) else {
            return false;
        };
        let context = self.graph.context_for(transition.owner());
        let allowed = node.check_guard(context, self, args);
        tracing::trace!(
            machine = %self.id,
            transition = node.name(),
            allowed,
            "guard evaluated"
        );
        allowed
    }

    /// Outgoing transitions whose guards pass.
    pub fn valid_transitions(&self, args: &[Value]) -> Vec<TransitionRef> {
        self.outgoing()
            .into_iter()
            .filter(|t| self.passes_guard(t, args))
            .collect()
    }

    /// True if any outgoing transition's guard passes.
    pub fn guard(&self, args: &[Value]) -> bool {
        self.outgoing().iter().any(|t| self.passes_guard(t, args))
    }

    /// Find a state by handle, or by name in the current state's graph and
    /// then in each enclosing graph.
    pub fn resolve_state<'a>(&self, selector: impl Into<StateSelector<'a>>) -> Option<StateRef> {
        match selector.into() {
            StateSelector::Ref(state) => self.graph.state(state).map(|_| state.clone()),
            StateSelector::Name(name) => {
                let owner = self
                    .state
                    .as_ref()
                    .map(|state| state.owner().to_vec())
                    .unwrap_or_else(|| self.scope.clone());
                (self.scope.len()..=owner.len()).rev().find_map(|len| {
                    let scope = &owner[..len];
                    let index = self.graph.graph_at(scope)?.state_index(name)?;
                    let mut indices = scope.to_vec();
                    indices.push(index);
                    Some(StateRef::from_indices(indices))
                })
            }
        }
    }

    /// Outgoing transitions that lead to `state` and whose guards pass.
    pub fn transitions_to<'a>(
        &self,
        state: impl Into<StateSelector<'a>>,
        args: &[Value],
    ) -> Result<Vec<TransitionRef>, MachineError> {
        self.require_state()?;
        let Some(target) = self.resolve_state(state) else {
            return Ok(Vec::new());
        };

        Ok(self
            .outgoing()
            .into_iter()
            .filter(|t| self.graph.target_of(t).as_ref() == Some(&target))
            .filter(|t| self.passes_guard(t, args))
            .collect())
    }

    /// True if exactly one transition leads to `state`.
    pub fn can_transition_to<'a>(&self, state: impl Into<StateSelector<'a>>, args: &[Value]) -> bool {
        self.transitions_to(state, args)
            .map(|candidates| innermost(candidates).len() == 1)
            .unwrap_or(false)
    }


    /// Go to the start state.
    ///
    /// Clears the current state first, so no exit hooks run. Entry and
    /// doActivity hooks of the start state run; transitions they request
    /// stay queued until the next [`run`](Self::run). History is reset to a
    /// single initial record.
    pub fn start(&mut self, args: &[Value]) -> Result<(), MachineError> {
        let start = self
            .state_machine()
            .start_index()
            .ok_or_else(|| MachineError::NoStartState {
                machine: self.state_machine().name().to_string(),
            })?;
        let target = self.scoped(start);

        tracing::debug!(machine = %self.id, graph = self.state_machine().name(), "start");
        self.state = None;
        self.sub = None;
        self.goto_initial(target, args)
    }

    /// Move directly to any state, as `start` does for the start state.
    pub fn force_state<'a>(
        &mut self,
        state: impl Into<StateSelector<'a>>,
        args: &[Value],
    ) -> Result<(), MachineError> {
        let selector: StateSelector<'a> = state.into();
        let target = self
            .resolve_state(selector)
            .ok_or_else(|| MachineError::UnknownState {
                name: selector.to_string(),
            })?;

        tracing::debug!(machine = %self.id, state = %selector, "force state");
        self.goto_initial(target, args)
    }

    fn goto_initial(&mut self, target: StateRef, args: &[Value]) -> Result<(), MachineError> {
        let origin = self.scope.clone();
        self.hold_run(|machine| {
            machine.goto_state(target, args, |machine, arrived| {
                machine.clear_history();
                machine.record_history(&origin, HistoryRecord::initial(arrived.clone()));
                Ok(())
            })
        })
    }

    /// Fire the transition selected by name or handle.
    ///
    /// Only outgoing transitions whose guards pass are candidates. When
    /// called from inside a doActivity hook the transition is queued and
    /// fired once the running transition has completed.
    pub fn transition<'a>(
        &mut self,
        selector: impl Into<TransitionSelector<'a>>,
        args: &[Value],
    ) -> Result<(), MachineError> {
        let selector: TransitionSelector<'a> = selector.into();
        let current = self.require_state()?.clone();
        tracing::debug!(
            machine = %self.id,
            state = %self.describe(&current),
            transition = %selector,
            "transition requested"
        );

        let candidates = match selector {
            TransitionSelector::Ref(transition) => {
                if self.outgoing().contains(transition) && self.passes_guard(transition, args) {
                    vec![transition.clone()]
                } else {
                    Vec::new()
                }
            }
            TransitionSelector::Name(name) => self
                .outgoing()
                .into_iter()
                .filter(|t| self.graph.transition(t).is_some_and(|node| node.matches(name)))
                .filter(|t| self.passes_guard(t, args))
                .collect(),
        };

        let transition = match candidates.as_slice() {
            [] => {
                return Err(MachineError::CannotTransition {
                    state: self.describe(&current),
                    name: selector.to_string(),
                })
            }
            [only] => only.clone(),
            _ => return Err(self.ambiguous(&current, &candidates)),
        };

        self.queue_transition(transition, args.to_vec());
        if !self.in_do_activity {
            self.run(false)?;
        }
        Ok(())
    }

    /// Fire the single transition that leads to `state`.
    pub fn transition_to<'a>(
        &mut self,
        state: impl Into<StateSelector<'a>>,
        args: &[Value],
    ) -> Result<(), MachineError> {
        let selector: StateSelector<'a> = state.into();
        let current = self.require_state()?.clone();
        let candidates = innermost(self.transitions_to(selector, args)?);

        match candidates.as_slice() {
            [] => Err(MachineError::UnknownTransition {
                state: self.describe(&current),
                request: selector.to_string(),
            }),
            [only] => {
                let only = only.clone();
                self.transition(&only, args)
            }
            _ => Err(self.ambiguous(&current, &candidates)),
        }
    }

    /// Follow the only valid outgoing transition.
    ///
    /// With several valid transitions this fails when `raise_on_ambiguous`
    /// is set and otherwise returns `Ok(None)` without moving.
    pub fn transition_to_next_state(
        &mut self,
        raise_on_ambiguous: bool,
        args: &[Value],
    ) -> Result<Option<TransitionRef>, MachineError> {
        let current = self.require_state()?.clone();
        let candidates = innermost(self.valid_transitions(args));

        match candidates.as_slice() {
            [] => Err(MachineError::UnknownTransition {
                state: self.describe(&current),
                request: "next state".to_string(),
            }),
            [only] => {
                let only = only.clone();
                self.transition(&only, args)?;
                Ok(Some(only))
            }
            _ if raise_on_ambiguous => Err(self.ambiguous(&current, &candidates)),
            _ => Ok(None),
        }
    }

    /// Fire the only valid outgoing transition if there is exactly one.
    pub fn transition_if_valid(&mut self, args: &[Value]) -> Result<Option<TransitionRef>, MachineError> {
        self.require_state()?;
        let candidates = innermost(self.valid_transitions(args));

        match candidates.as_slice() {
            [only] => {
                let only = only.clone();
                self.transition(&only, args)?;
                Ok(Some(only))
            }
            _ => Ok(None),
        }
    }

    fn ambiguous(&self, current: &StateRef, candidates: &[TransitionRef]) -> MachineError {
        MachineError::AmbiguousTransition {
            state: self.describe(current),
            candidates: candidates.iter().map(|t| self.transition_name(t)).collect(),
        }
    }

    /// Fire pending transitions.
    ///
    /// Only the outermost call drains the queue; a call made while a drain
    /// is already running returns at once. With `single` set at most one
    /// transition fires.
    pub fn run(&mut self, single: bool) -> Result<(), MachineError> {
        self.run_with(single, |_| Ok(()))
    }

    /// Run `block`, then drain the queue unless a drain is already running.
    pub fn run_with<F>(&mut self, single: bool, block: F) -> Result<(), MachineError>
    where
        F: FnOnce(&mut Machine) -> Result<(), MachineError>,
    {
        if self.in_run {
            return block(self);
        }

        self.in_run = true;
        let result = block(self).and_then(|()| self.process_transitions(single));
        self.in_run = false;
        result
    }

    /// Run `block` as if a drain were running, so requests it makes are
    /// queued instead of fired.
    fn hold_run<F>(&mut self, block: F) -> Result<(), MachineError>
    where
        F: FnOnce(&mut Machine) -> Result<(), MachineError>,
    {
        let saved = self.in_run;
        self.in_run = true;
        let result = block(self);
        self.in_run = saved;
        result
    }

    fn queue_transition(&mut self, transition: TransitionRef, args: Vec<Value>) {
        tracing::debug!(
            machine = %self.id,
            transition = %self.transition_name(&transition),
            "transition queued"
        );
        let displaced = self.queue.push(PendingTransition { transition, args });
        if let Some(displaced) = displaced {
            tracing::debug!(
                machine = %self.id,
                transition = %self.transition_name(&displaced.transition),
                "pending transition replaced"
            );
        }
    }

    fn process_transitions(&mut self, single: bool) -> Result<(), MachineError> {
        while !self.at_own_end() {
            let Some(pending) = self.queue.pop() else {
                break;
            };
            self.execute_transition(pending.transition, &pending.args)?;
            if single {
                break;
            }
        }

        if !self.queue.is_empty() && self.at_own_end() {
            tracing::debug!(machine = %self.id, "end state reached; pending transition left queued");
        }
        Ok(())
    }

    /// Effect first, then the hierarchical move to the target. The history
    /// record is written once the state pointer has moved.
    fn execute_transition(&mut self, transition: TransitionRef, args: &[Value]) -> Result<(), MachineError> {
        let graph = Arc::clone(&self.graph);
        let invalid = |reason: &str| MachineError::InvalidTransition {
            name: transition.to_string(),
            reason: reason.to_string(),
        };
        let node = graph
            .transition(&transition)
            .ok_or_else(|| invalid("not part of this graph"))?;
        let target = graph
            .target_of(&transition)
            .ok_or_else(|| invalid("target is not part of this graph"))?;
        if !self.outgoing().contains(&transition) {
            tracing::debug!(
                machine = %self.id,
                transition = node.name(),
                "pending transition does not leave the current state; dropped"
            );
            return Ok(());
        }
        let context = graph.context_for(transition.owner());
        let previous = self.state.clone();

        tracing::debug!(
            machine = %self.id,
            transition = node.name(),
            source = node.source(),
            target = node.target(),
            "executing transition"
        );

        self.executing = Some(transition.clone());
        let result = (|| -> Result<(), MachineError> {
            context.before_transition(self, node, args)?;
            node.run_effect(context, self, args)?;
            self.goto_state(target, args, |machine, arrived| {
                context.during_transition(machine, node, args)?;
                context.after_transition(machine, node, args)?;
                let record = HistoryRecord::transition(previous, transition.clone(), arrived.clone());
                machine.record_history(transition.owner(), record);
                Ok(())
            })
        })();
        self.executing = None;
        result
    }

    /// Hierarchical move to `target`.
    ///
    /// Composite targets continue into their start states. Ancestors being
    /// left are exited, the pointer moves, `on_arrival` runs, ancestors
    /// being entered are entered outermost first, and the new state's
    /// doActivity runs. Any failure restores the previous state.
    fn goto_state<F>(&mut self, target: StateRef, args: &[Value], on_arrival: F) -> Result<(), MachineError>
    where
        F: FnOnce(&mut Machine, &StateRef) -> Result<(), MachineError>,
    {
        let previous = self.state.clone();
        let previous_sub = self.sub.as_deref().map(|sub| Box::new(sub.snapshot()));

        let result = self.move_to(previous.as_ref(), target, args, on_arrival);
        if let Err(err) = &result {
            tracing::debug!(machine = %self.id, error = %err, "transition failed; state restored");
            self.state = previous;
            self.sub = previous_sub;
            self.queue.clear();
        }
        result
    }

    fn move_to<F>(
        &mut self,
        previous: Option<&StateRef>,
        target: StateRef,
        args: &[Value],
        on_arrival: F,
    ) -> Result<(), MachineError>
    where
        F: FnOnce(&mut Machine, &StateRef) -> Result<(), MachineError>,
    {
        let graph = Arc::clone(&self.graph);
        let destination = graph.initial_descendant(&target);
        let from = previous.map(StateRef::ancestors).unwrap_or_default();
        let to = destination.ancestors();
        let moving = previous != Some(&destination);

        if moving {
            for state in from.iter().filter(|s| !to.contains(*s)) {
                self.state_hook(&graph, state, StateHook::Exit, args)?;
            }
        }

        self.state = Some(destination.clone());
        self.sync_sub();
        on_arrival(self, &destination)?;

        if moving {
            for state in to.iter().rev().filter(|s| !from.contains(*s)) {
                self.state_hook(&graph, state, StateHook::Entry, args)?;
            }
        }

        let saved = self.in_do_activity;
        self.in_do_activity = true;
        let result = self.state_hook(&graph, &destination, StateHook::DoActivity, args);
        self.in_do_activity = saved;
        result
    }

    fn state_hook(
        &mut self,
        graph: &StateMachine,
        state: &StateRef,
        hook: StateHook,
        args: &[Value],
    ) -> Result<(), MachineError> {
        let node = graph
            .state(state)
            .ok_or_else(|| MachineError::UnknownState {
                name: state.to_string(),
            })?;
        let context = graph.context_for(state.owner());

        tracing::trace!(
            machine = %self.id,
            state = node.name(),
            hook = hook.as_str(),
            "state hook"
        );
        match hook {
            StateHook::Entry => node.entry(context, self, args)?,
            StateHook::Exit => node.exit(context, self, args)?,
            StateHook::DoActivity => node.do_activity(context, self, args)?,
        }
        Ok(())
    }

    /// Attach, keep or drop child machines so they mirror the active
    /// composite states.
    fn sync_sub(&mut self) {
        let depth = self.scope.len() + 1;
        let state = match &self.state {
            Some(state) if state.depth() > depth => state.clone(),
            _ => {
                self.sub = None;
                return;
            }
        };

        let scope = state.indices()[..depth].to_vec();
        if self.sub.as_ref().map_or(true, |sub| sub.scope != scope) {
            tracing::trace!(machine = %self.id, scope = ?scope, "child machine attached");
            self.sub = Some(Box::new(self.nested(scope)));
        }
        if let Some(sub) = self.sub.as_deref_mut() {
            sub.state = Some(state);
            sub.sync_sub();
        }
    }


    /// Append `record` to the history of the machine attached at `origin`
    /// and of every machine enclosing it.
    ///
    /// `origin` is the scope of the graph the record belongs to; pass
    /// [`scope`](Self::scope) of a child machine to reach it from the root.
    /// Machines without history tracking skip the record.
    pub fn record_history(&mut self, origin: &[usize], record: HistoryRecord) {
        if let Some(sub) = self.sub.as_deref_mut() {
            if origin.starts_with(&sub.scope) {
                sub.record_history(origin, record.clone());
            }
        }
        if let Some(history) = self.history.as_mut() {
            history.record(record);
        }
    }

    /// Empty this machine's own history. Child machines keep theirs.
    pub fn clear_history(&mut self) {
        if let Some(history) = self.history.as_mut() {
            history.clear();
        }
    }
}

/// Keep only the candidates declared closest to the current state.
fn innermost(candidates: Vec<TransitionRef>) -> Vec<TransitionRef> {
    let Some(depth) = candidates.iter().map(|t| t.owner().len()).max() else {
        return candidates;
    };
    candidates
        .into_iter()
        .filter(|t| t.owner().len() == depth)
        .collect()
}

/// A clone is a fresh session on the same graph: new id, copied position,
/// queue and history.
impl Clone for Machine {
    fn clone(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            graph: Arc::clone(&self.graph),
            scope: self.scope.clone(),
            state: self.state.clone(),
            queue: self.queue.clone(),
            executing: None,
            history: self.history.clone(),
            options: self.options.clone(),
            sub: self.sub.clone(),
            in_run: false,
            in_do_activity: false,
        }
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]",
            self.state_machine().name(),
            self.state_names().join("/")
        )
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("id", &self.id)
            .field("graph", &self.state_machine().name())
            .field("state", &self.state_names())
            .field("pending", &self.queue.peek())
            .field("history", &self.history.as_ref().map(History::len))
            .finish()
    }
}
