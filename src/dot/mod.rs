//! Graphviz rendering of graphs and machines.
//!
//! The renderer only produces Dot source text. Composite states become
//! clusters holding their submachine, every graph gets an implicit start
//! point, and end states are drawn as filled double circles. Rendering a
//! [`Machine`] additionally highlights its active states and pending
//! transitions and can number edges by the history positions they fired at.
//!
//! # Example
//!
//! ```rust
//! use nested_fsm::builder::StateMachineBuilder;
//! use nested_fsm::dot::{DotOptions, DotRenderer};
//!
//! let graph = StateMachineBuilder::new("door")
//!     .start_state("closed")
//!     .end_state("open")
//!     .transition_named("push", "closed", "open")
//!     .build()
//!     .unwrap();
//!
//! let dot = DotRenderer::new(DotOptions::default()).render_graph(&graph);
//! assert!(dot.starts_with("digraph door {"));
//! assert!(dot.contains("shape=\"doublecircle\""));
//! assert!(dot.contains("label=\"'push'\""));
//! ```

mod options;

pub use options::DotOptions;

use crate::core::{History, State, StateMachine, StateRef, Transition, TransitionRef};
use crate::runtime::Machine;
use std::collections::BTreeMap;

/// Renders graphs as Dot source.
#[derive(Clone, Debug, Default)]
pub struct DotRenderer {
    options: DotOptions,
}

/// Per-render highlight and history data.
#[derive(Default)]
struct Marks<'a> {
    states: Vec<StateRef>,
    transitions: Vec<TransitionRef>,
    history: Option<&'a History>,
}

type Attrs = BTreeMap<&'static str, String>;

impl DotRenderer {
    pub fn new(options: DotOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DotOptions {
        &self.options
    }

    /// Render the static graph.
    pub fn render_graph(&self, graph: &StateMachine) -> String {
        self.render(graph, &Marks::default())
    }

    /// Render the graph `machine` walks, highlighting its active states,
    /// pending and executing transitions, and its history.
    pub fn render_machine(&self, machine: &Machine) -> String {
        let mut transitions: Vec<TransitionRef> = machine
            .pending_transition()
            .map(|pending| pending.transition.clone())
            .into_iter()
            .collect();
        transitions.extend(machine.executing_transition().cloned());

        let states = machine
            .state()
            .map(|state| state.ancestors())
            .unwrap_or_default();

        let marks = Marks {
            states,
            transitions,
            history: machine.history(),
        };
        self.render(machine.graph(), &marks)
    }

    fn render(&self, graph: &StateMachine, marks: &Marks<'_>) -> String {
        let mut out = Vec::new();
        out.push(format!("digraph {} {{", ident(graph.name())));
        out.push(format!("  label={};", quote(graph.name())));
        self.render_start_point(&[], &mut out);
        self.render_states(graph, &[], marks, &mut out);
        self.render_transitions(graph, &[], marks, &mut out);
        out.push("}".to_string());
        out.join("\n") + "\n"
    }

    fn render_start_point(&self, scope: &[usize], out: &mut Vec<String>) {
        out.push(format!(
            "  node [ shape=\"circle\", label=\"\", style=filled, fillcolor=black ] {};",
            start_id(scope)
        ));
    }

    fn render_states(&self, graph: &StateMachine, scope: &[usize], marks: &Marks<'_>, out: &mut Vec<String>) {
        for (index, state) in graph.states().iter().enumerate() {
            let mut path = scope.to_vec();
            path.push(index);
            self.render_state(state, StateRef::from_indices(path), marks, out);
        }
    }

    fn render_state(&self, state: &State, handle: StateRef, marks: &Marks<'_>, out: &mut Vec<String>) {
        let mut attrs = Attrs::new();
        attrs.insert("label", self.state_label(state));
        attrs.insert("color", "black".to_string());
        attrs.insert("shape", "box".to_string());
        let mut style = "filled".to_string();
        if marks.states.contains(&handle) {
            style.push_str(",bold");
        }

        if state.is_end_state() {
            attrs.insert("label", String::new());
            attrs.insert("shape", "doublecircle".to_string());
            attrs.insert("fillcolor", "black".to_string());
            attrs.insert("fontcolor", "white".to_string());
        } else {
            attrs.insert("fillcolor", "white".to_string());
            attrs.insert("fontcolor", "black".to_string());
        }

        let sequence: Vec<usize> = marks
            .history
            .map(|history| {
                history
                    .records()
                    .iter()
                    .enumerate()
                    .filter(|(_, record)| record.new_state == handle)
                    .map(|(i, _)| i + 1)
                    .collect()
            })
            .unwrap_or_default();
        if !sequence.is_empty() {
            if self.options.highlight_state_history {
                attrs.insert("fillcolor", "grey".to_string());
                attrs.insert("fontcolor", "black".to_string());
            }
            if self.options.show_state_sequence {
                let label = format!("{}\\n({})\\r", attrs["label"], sequence_to_string(&sequence));
                attrs.insert("label", label);
            }
        }

        let id = state_id(handle.indices());
        match state.submachine() {
            Some(submachine) => {
                out.push(format!("subgraph cluster_{id} {{"));
                out.push(format!("  label={};", quote(&attrs["label"])));
                out.push("  shape=\"box\";".to_string());
                out.push("  style=\"filled,rounded\";".to_string());
                out.push(format!("  fillcolor={};", attrs["fillcolor"]));
                out.push(format!("  fontcolor={};", attrs["fontcolor"]));

                let mut point = attrs.clone();
                point.insert("shape", "point".to_string());
                point.insert("label", "[]".to_string());
                point.insert("style", style);
                point.insert("fillcolor", "black".to_string());
                out.push(format!("  node [ {} ] {id}_target;", render_attrs(&point)));
                point.insert("fillcolor", "white".to_string());
                out.push(format!("  node [ {} ] {id}_source;", render_attrs(&point)));

                self.render_start_point(handle.indices(), out);
                self.render_states(submachine, handle.indices(), marks, out);
                out.push("}".to_string());
            }
            None => {
                style.push_str(",rounded");
                attrs.insert("style", style);
                out.push(format!("  node [ {} ] {id};", render_attrs(&attrs)));
            }
        }
    }

    fn render_transitions(
        &self,
        graph: &StateMachine,
        scope: &[usize],
        marks: &Marks<'_>,
        out: &mut Vec<String>,
    ) {
        for (index, transition) in graph.transitions().iter().enumerate() {
            let handle = TransitionRef::new(scope.to_vec(), index);
            let (Some(source), Some(target)) = (
                graph.state_index(transition.source()),
                graph.state_index(transition.target()),
            ) else {
                continue;
            };

            let mut attrs = Attrs::new();
            let muted = if self.options.highlight_transition_history {
                "gray"
            } else {
                "black"
            };
            attrs.insert("label", self.transition_label(transition));
            attrs.insert("color", muted.to_string());
            attrs.insert("fontcolor", muted.to_string());
            if marks.transitions.contains(&handle) {
                attrs.insert("style", "bold".to_string());
            }

            let sequence: Vec<usize> = marks
                .history
                .map(|history| {
                    history
                        .records()
                        .iter()
                        .enumerate()
                        .filter(|(_, record)| record.transition.as_ref() == Some(&handle))
                        .map(|(i, _)| i)
                        .collect()
                })
                .unwrap_or_default();
            if !sequence.is_empty() {
                if self.options.highlight_transition_history {
                    attrs.insert("color", "black".to_string());
                    attrs.insert("fontcolor", "black".to_string());
                }
                if self.options.show_transition_sequence {
                    let label = format!("({}) {}", sequence_to_string(&sequence), attrs["label"]);
                    attrs.insert("label", label);
                }
            }

            out.push(format!(
                "{} -> {} [ {} ];",
                endpoint_id(graph, scope, source, "source"),
                endpoint_id(graph, scope, target, "target"),
                render_attrs(&attrs)
            ));
        }

        if let Some(start) = graph.start_index() {
            out.push(format!(
                "{} -> {};",
                start_id(scope),
                endpoint_id(graph, scope, start, "target")
            ));
        }

        for (index, state) in graph.states().iter().enumerate() {
            if let Some(submachine) = state.submachine() {
                let mut path = scope.to_vec();
                path.push(index);
                self.render_transitions(submachine, &path, marks, out);
            }
        }
    }

    fn state_label(&self, state: &State) -> String {
        let hooks = state.hooks();
        let shown = [
            (self.options.show_entry, &hooks.entry, "entry"),
            (self.options.show_exit, &hooks.exit, "exit"),
            (self.options.show_do, &hooks.do_activity, "do"),
        ];

        let mut label = state.name().to_string();
        let mut first = true;
        for (enabled, hook, prefix) in shown {
            let Some(behavior) = hook.as_ref().filter(|_| enabled) else {
                continue;
            };
            label.push_str(if first { " \\n" } else { " \\l" });
            label.push_str(&format!("{prefix} / {}", behavior.label().unwrap_or("...")));
            first = false;
        }
        label
    }

    fn transition_label(&self, transition: &Transition) -> String {
        let mut label = format!("'{}'", transition.name());
        if self.options.show_guard {
            if let Some(guard) = transition.guard() {
                label.push_str(&format!(" \\n[{}]", guard.label().unwrap_or("...")));
            }
        }
        if self.options.show_effect {
            if let Some(effect) = transition.effect() {
                label.push_str(&format!(" \\n/{}", effect.label().unwrap_or("...")));
            }
        }
        label
    }
}

fn state_id(indices: &[usize]) -> String {
    let parts: Vec<String> = indices.iter().map(usize::to_string).collect();
    format!("s{}", parts.join("_"))
}

fn start_id(scope: &[usize]) -> String {
    if scope.is_empty() {
        "start".to_string()
    } else {
        format!("{}_start", state_id(scope))
    }
}

/// Node an edge attaches to: composite states expose separate source and
/// target points inside their cluster.
fn endpoint_id(graph: &StateMachine, scope: &[usize], index: usize, side: &str) -> String {
    let mut path = scope.to_vec();
    path.push(index);
    let id = state_id(&path);
    match graph.states().get(index) {
        Some(state) if state.is_composite() => format!("{id}_{side}"),
        _ => id,
    }
}

fn ident(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        quote(name)
    }
}

/// Quote a Dot string, keeping `\n`, `\l` and `\r` escapes intact.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\\' => match chars.peek() {
                Some('n' | 'l' | 'r') => quoted.push('\\'),
                _ => quoted.push_str("\\\\"),
            },
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn render_attrs(attrs: &Attrs) -> String {
    attrs
        .iter()
        .map(|(key, value)| match *key {
            "label" | "shape" | "style" => format!("{key}={}", quote(value)),
            _ => format!("{key}={value}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Sorted, deduplicated positions; runs are collapsed into ranges once
/// there are more than four.
pub fn sequence_to_string(sequence: &[usize]) -> String {
    let mut sorted = sequence.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    if sorted.len() <= 4 {
        return sorted
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(",");
    }

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for value in sorted {
        match ranges.last_mut() {
            Some((_, end)) if *end + 1 == value => *end = value,
            _ => ranges.push((value, value)),
        }
    }
    ranges
        .iter()
        .map(|&(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
