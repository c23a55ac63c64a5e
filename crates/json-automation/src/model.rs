//! Data models for the automation engine

use serde_json::{Map, Value};

/// One executable step of an automation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Action {
    /// Type tag identifying what the step does; opaque to the engine
    pub kind: String,
    /// Remaining fields of the action object, preserved verbatim for the
    /// external runner
    pub parameters: Map<String, Value>,
}

/// A named, ordered script of actions
#[derive(Debug, Clone, PartialEq)]
pub struct Automation {
    /// Unique identifier within a table
    pub id: String,
    /// Optional human-readable label
    pub name: Option<String>,
    /// Whether the automation may execute
    pub enabled: bool,
    /// Trigger descriptor, stored but never interpreted here
    pub trigger: Value,
    /// Actions in execution order
    pub actions: Vec<Action>,
}

impl Automation {
    /// Create an empty, enabled automation with a null trigger
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            enabled: true,
            trigger: Value::Null,
            actions: Vec::new(),
        }
    }
}

impl Default for Automation {
    fn default() -> Self {
        Self::new(String::new())
    }
}
