//! Action hand-off to the external runner

use crate::model::Action;
use serde_json::{Map, Value};
use std::sync::Arc;

/// External collaborator that carries out the real-world effect of one
/// action. The engine never interprets `kind` or `parameters`; it only
/// passes them through, one action at a time, in stored order.
pub trait ActionRunner: Send + Sync {
    /// Perform one action. The outcome is logged but never inspected by
    /// the engine; a failed effect does not stop the rest of the run.
    fn run_action(&self, kind: &str, parameters: &Map<String, Value>) -> Result<(), String>;
}

/// Executor that drives the runner through an automation's action list
pub struct ActionExecutor {
    runner: Arc<dyn ActionRunner>,
}

impl ActionExecutor {
    /// Create a new action executor
    pub fn new(runner: Arc<dyn ActionRunner>) -> Self {
        Self { runner }
    }

    /// Hand every action off to the runner in order, returning the number
    /// handed off. Runs the full list regardless of individual failures.
    pub fn execute_actions(&self, automation_id: &str, actions: &[Action]) -> usize {
        for (index, action) in actions.iter().enumerate() {
            tracing::debug!(
                "Executing action {} ({}) of automation '{}'",
                index,
                action.kind,
                automation_id
            );
            if let Err(e) = self.runner.run_action(&action.kind, &action.parameters) {
                tracing::warn!(
                    "Action {} of automation '{}' reported failure: {}",
                    index,
                    automation_id,
                    e
                );
            }
        }
        actions.len()
    }
}
