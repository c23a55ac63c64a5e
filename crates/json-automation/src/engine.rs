//! Core automation engine

use crate::error::AutomationError;
use crate::executor::{ActionExecutor, ActionRunner};
use crate::loader;
use crate::model::Automation;
use crate::serializer;
use crate::table::AutomationTable;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

/// Lifecycle events emitted by the engine; exactly one fires per load call
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A document was parsed, validated, and swapped in; carries the raw
    /// text so the host can persist it
    AutomationLoaded { raw_json: String },
    /// A load failed; carries the parse/validation message
    JsonError { message: String },
}

/// The main automation engine
pub struct AutomationEngine {
    /// Live table; replaced wholesale on every successful load so readers
    /// see either fully the old data or fully the new data
    table: RwLock<AutomationTable>,
    /// Hand-off boundary to the external action runner
    executor: ActionExecutor,
    /// Event broadcaster
    event_tx: broadcast::Sender<EngineEvent>,
}

impl AutomationEngine {
    /// Create an engine with an empty table
    pub fn new(runner: Arc<dyn ActionRunner>) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            table: RwLock::new(AutomationTable::new()),
            executor: ActionExecutor::new(runner),
            event_tx,
        }
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Load a JSON document, replacing the live table on success.
    ///
    /// Returns the number of automations loaded. On any failure the live
    /// table is untouched and the error is also reported as a
    /// [`EngineEvent::JsonError`] event.
    pub fn set_json_data(&self, text: &str) -> Result<usize, AutomationError> {
        match loader::parse_document(text) {
            Ok(table) => {
                let count = table.len();
                *self.write_table() = table;
                let _ = self.event_tx.send(EngineEvent::AutomationLoaded {
                    raw_json: text.to_string(),
                });
                tracing::info!("Loaded {} automations", count);
                Ok(count)
            }
            Err(e) => {
                let _ = self.event_tx.send(EngineEvent::JsonError {
                    message: e.to_string(),
                });
                tracing::error!("Failed to load automations: {}", e);
                Err(e)
            }
        }
    }

    /// Execute an automation by id, handing its actions to the runner in
    /// stored order. Returns the number of actions handed off.
    pub fn execute(&self, id: &str) -> Result<usize, AutomationError> {
        // Clone out of the table so the lock is released before handing
        // off; the runner may call back into the engine.
        let automation = self
            .read_table()
            .get(id)
            .cloned()
            .ok_or_else(|| AutomationError::NotFound(id.to_string()))?;

        if !automation.enabled {
            tracing::debug!("Automation '{}' is disabled, skipping", id);
            return Err(AutomationError::Disabled(id.to_string()));
        }

        tracing::info!(
            "Executing automation '{}' with {} actions",
            automation.id,
            automation.actions.len()
        );
        Ok(self
            .executor
            .execute_actions(&automation.id, &automation.actions))
    }

    /// Serialize the live table back to a JSON document
    pub fn serialize(&self) -> String {
        serializer::to_json(&self.read_table())
    }

    /// Get an automation by id
    pub fn get(&self, id: &str) -> Option<Automation> {
        self.read_table().get(id).cloned()
    }

    /// Get all automations
    pub fn list(&self) -> Vec<Automation> {
        self.read_table().iter().cloned().collect()
    }

    /// Number of loaded automations
    pub fn len(&self) -> usize {
        self.read_table().len()
    }

    /// Whether the engine holds no automations
    pub fn is_empty(&self) -> bool {
        self.read_table().is_empty()
    }

    /// Insert or replace a single automation without a full reload
    pub fn insert(&self, automation: Automation) -> Option<Automation> {
        self.write_table().insert(automation)
    }

    /// Remove a single automation by id
    pub fn remove(&self, id: &str) -> Option<Automation> {
        self.write_table().remove(id)
    }

    /// Drop every automation
    pub fn clear(&self) {
        self.write_table().clear();
    }

    // The table is only ever replaced wholesale, so it is structurally
    // consistent even if a writer panicked; a poisoned lock is usable.
    fn read_table(&self) -> RwLockReadGuard<'_, AutomationTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, AutomationTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};
    use std::sync::Mutex;
    use tokio::sync::broadcast::error::TryRecvError;

    struct RecordingRunner {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingRunner {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ActionRunner for RecordingRunner {
        fn run_action(&self, kind: &str, _parameters: &Map<String, Value>) -> Result<(), String> {
            self.calls.lock().unwrap().push(kind.to_string());
            Ok(())
        }
    }

    fn engine() -> (AutomationEngine, Arc<RecordingRunner>) {
        let runner = RecordingRunner::new();
        (AutomationEngine::new(runner.clone()), runner)
    }

    #[test]
    fn test_load_fires_loaded_event_once() {
        let (engine, _) = engine();
        let mut rx = engine.subscribe();

        let text = r#"{"automations": []}"#;
        assert_eq!(engine.set_json_data(text).unwrap(), 0);

        match rx.try_recv().unwrap() {
            EngineEvent::AutomationLoaded { raw_json } => assert_eq!(raw_json, text),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_failed_load_fires_error_event_once() {
        let (engine, _) = engine();
        let mut rx = engine.subscribe();

        assert!(engine.set_json_data("not json").is_err());

        match rx.try_recv().unwrap() {
            EngineEvent::JsonError { message } => assert!(!message.is_empty()),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_failed_load_leaves_table_untouched() {
        let (engine, _) = engine();
        engine
            .set_json_data(r#"{"automations": [{"id": "keep", "actions": [{"kind": "x"}]}]}"#)
            .unwrap();
        let before = engine.list();
        let mut rx = engine.subscribe();

        // Automation index 1 is malformed; nothing from this document may
        // become visible.
        let bad = r#"{"automations": [{"id": "new"}, {"trigger": null}]}"#;
        assert!(engine.set_json_data(bad).is_err());

        assert_eq!(engine.len(), 1);
        assert!(engine.get("new").is_none());
        assert_eq!(engine.list(), before);

        match rx.try_recv().unwrap() {
            EngineEvent::JsonError { message } => assert!(message.contains("automation 1")),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_oversize_load_fires_error_and_keeps_table() {
        let (engine, _) = engine();
        engine
            .set_json_data(r#"{"automations": [{"id": "keep"}]}"#)
            .unwrap();
        let mut rx = engine.subscribe();

        let padding = "x".repeat(5000);
        let big = format!(r#"{{"automations": [], "padding": "{padding}"}}"#);
        let err = engine.set_json_data(&big).unwrap_err();
        assert!(matches!(err, AutomationError::TooLarge { .. }));

        match rx.try_recv().unwrap() {
            EngineEvent::JsonError { message } => assert!(message.contains("too large")),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(engine.len(), 1);
        assert!(engine.get("keep").is_some());
    }

    #[test]
    fn test_reload_replaces_wholesale() {
        let (engine, _) = engine();
        engine
            .set_json_data(r#"{"automations": [{"id": "old"}]}"#)
            .unwrap();
        engine
            .set_json_data(r#"{"automations": [{"id": "new"}]}"#)
            .unwrap();

        assert!(engine.get("old").is_none());
        assert!(engine.get("new").is_some());
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_execute_hands_off_in_order() {
        let (engine, runner) = engine();
        engine
            .set_json_data(
                r#"{"automations": [{"id": "a", "actions": [
                    {"kind": "first"}, {"kind": "second"}, {"kind": "third"}
                ]}]}"#,
            )
            .unwrap();

        assert_eq!(engine.execute("a").unwrap(), 3);
        assert_eq!(runner.calls(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_execute_unknown_id() {
        let (engine, runner) = engine();
        engine.set_json_data(r#"{"automations": []}"#).unwrap();

        let err = engine.execute("missing").unwrap_err();
        assert!(matches!(err, AutomationError::NotFound(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_execute_disabled_automation() {
        let (engine, runner) = engine();
        engine
            .set_json_data(
                r#"{"automations": [{"id": "a", "enabled": false, "actions": [{"kind": "x"}]}]}"#,
            )
            .unwrap();

        let err = engine.execute("a").unwrap_err();
        assert!(matches!(err, AutomationError::Disabled(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_execute_empty_automation() {
        let (engine, runner) = engine();
        engine
            .set_json_data(r#"{"automations": [{"id": "noop"}]}"#)
            .unwrap();

        assert_eq!(engine.execute("noop").unwrap(), 0);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_serialize_round_trip_through_engine() {
        let (engine, _) = engine();
        engine
            .set_json_data(
                r#"{"automations": [{
                    "id": "a",
                    "trigger": {"source": "input", "type": "release"},
                    "actions": [{"kind": "light.toggle", "target": "hall"}]
                }]}"#,
            )
            .unwrap();
        let before = engine.list();

        let rendered = engine.serialize();
        assert_eq!(engine.set_json_data(&rendered).unwrap(), 1);
        assert_eq!(engine.list(), before);
    }

    #[test]
    fn test_insert_and_remove() {
        let (engine, _) = engine();
        assert!(engine.is_empty());

        engine.insert(Automation::new("manual"));
        assert_eq!(engine.len(), 1);
        assert!(engine.get("manual").is_some());

        assert!(engine.remove("manual").is_some());
        assert!(engine.is_empty());
    }
}
