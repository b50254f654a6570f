//! Per-definition engine configuration.

use serde::{Deserialize, Serialize};

/// Knobs shared by every machine built from one definition.
///
/// Missing fields take their defaults, so a partial JSON document is enough:
///
/// ```rust
/// use lineage::MachineConfig;
///
/// let config = MachineConfig::from_json(r#"{ "strict_initial": true }"#).unwrap();
/// assert!(config.strict_initial);
/// assert!(config.record_history);
/// assert_eq!(config.history_capacity, 256);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Append a record to the machine history on every transition.
    pub record_history: bool,

    /// Maximum number of history records kept; `0` keeps everything.
    pub history_capacity: usize,

    /// Treat settling in a state that has children as an error.
    pub strict_initial: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            record_history: true,
            history_capacity: 256,
            strict_initial: false,
        }
    }
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn record_history(mut self, enabled: bool) -> Self {
        self.record_history = enabled;
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn strict_initial(mut self, strict: bool) -> Self {
        self.strict_initial = strict;
        self
    }
}
