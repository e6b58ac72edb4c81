//! Rendering options.

use serde::{Deserialize, Serialize};

/// What the renderer includes in its output.
///
/// # Example
///
/// ```rust
/// use nested_fsm::dot::DotOptions;
///
/// let options: DotOptions = serde_json::from_str(r#"{ "show_guard": true }"#).unwrap();
/// assert!(options.show_guard);
/// assert!(!options.show_effect);
///
/// let history = DotOptions::new().show_history(true);
/// assert!(history.show_transition_sequence);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotOptions {
    /// Append `[label]` for guards to edge labels.
    pub show_guard: bool,
    /// Append `/label` for effects to edge labels.
    pub show_effect: bool,
    pub show_entry: bool,
    pub show_exit: bool,
    pub show_do: bool,
    /// Prefix edge labels with the history positions they fired at.
    pub show_transition_sequence: bool,
    /// Append the history positions a state was entered at.
    pub show_state_sequence: bool,
    /// Shade states that appear in the history.
    pub highlight_state_history: bool,
    /// Grey out edges that never fired.
    pub highlight_transition_history: bool,
}

impl DotOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_guard(mut self, enabled: bool) -> Self {
        self.show_guard = enabled;
        self
    }

    pub fn show_effect(mut self, enabled: bool) -> Self {
        self.show_effect = enabled;
        self
    }

    /// Show entry, exit and doActivity hooks in state labels.
    pub fn show_hooks(mut self, enabled: bool) -> Self {
        self.show_entry = enabled;
        self.show_exit = enabled;
        self.show_do = enabled;
        self
    }

    pub fn show_state_sequence(mut self, enabled: bool) -> Self {
        self.show_state_sequence = enabled;
        self
    }

    /// Turn every history-related option on or off.
    pub fn show_history(mut self, enabled: bool) -> Self {
        self.show_transition_sequence = enabled;
        self.highlight_state_history = enabled;
        self.highlight_transition_history = enabled;
        self
    }
}
