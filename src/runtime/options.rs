//! Per-machine configuration.

use serde::{Deserialize, Serialize};

/// Options fixed when a machine is created.
///
/// Every field has a default, so partial configurations deserialize:
///
/// ```rust
/// use nested_fsm::runtime::MachineOptions;
///
/// let options: MachineOptions = serde_json::from_str(r#"{"record_history": true}"#).unwrap();
/// assert!(options.record_history);
/// assert!(!options.nested_history);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    /// Keep a history log on the machine itself.
    pub record_history: bool,

    /// Keep history logs on the child machines attached when composite
    /// states are entered.
    pub nested_history: bool,
}

impl MachineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_history(mut self, enabled: bool) -> Self {
        self.record_history = enabled;
        self
    }

    pub fn nested_history(mut self, enabled: bool) -> Self {
        self.nested_history = enabled;
        self
    }
}
