//! Serializer: table back to JSON text (inverse of the loader)

use crate::model::{Action, Automation};
use crate::table::AutomationTable;
use serde_json::{Map, Value};

/// Render a table as a JSON document the loader accepts back.
///
/// Never fails; an empty table renders as `{"automations":[]}`. Automations
/// are emitted sorted by id so the output is deterministic. Fields holding
/// their load-time defaults are omitted, so the minified output never
/// outgrows the document it was loaded from.
pub fn to_json(table: &AutomationTable) -> String {
    let mut entries: Vec<&Automation> = table.iter().collect();
    entries.sort_by(|a, b| a.id.cmp(&b.id));

    let automations: Vec<Value> = entries.into_iter().map(render_automation).collect();
    let mut root = Map::new();
    root.insert("automations".to_string(), Value::Array(automations));
    Value::Object(root).to_string()
}

fn render_automation(automation: &Automation) -> Value {
    let mut obj = Map::new();
    obj.insert("id".to_string(), Value::String(automation.id.clone()));
    if let Some(name) = &automation.name {
        obj.insert("name".to_string(), Value::String(name.clone()));
    }
    // The loader restores absent fields to these exact defaults, so
    // omitting them round-trips and keeps the output within the input
    // size ceiling.
    if !automation.enabled {
        obj.insert("enabled".to_string(), Value::Bool(false));
    }
    if !automation.trigger.is_null() {
        obj.insert("trigger".to_string(), automation.trigger.clone());
    }
    if !automation.actions.is_empty() {
        obj.insert(
            "actions".to_string(),
            Value::Array(automation.actions.iter().map(render_action).collect()),
        );
    }
    Value::Object(obj)
}

/// Actions flatten back to one object level: the `kind` tag plus every
/// parameter side by side, exactly the shape the loader splits apart.
fn render_action(action: &Action) -> Value {
    let mut obj = Map::new();
    obj.insert("kind".to_string(), Value::String(action.kind.clone()));
    for (key, param) in &action.parameters {
        obj.insert(key.clone(), param.clone());
    }
    Value::Object(obj)
}
