//! Loader/validator: JSON text to a fully validated table

use crate::decode;
use crate::error::AutomationError;
use crate::model::{Action, Automation};
use crate::table::AutomationTable;
use serde_json::{Map, Value};

/// Largest accepted input document, matching the flash-preference ceiling
/// of the device this engine targets.
pub const MAX_JSON_SIZE: usize = 4096;

/// Parse and validate a JSON automations document into a new table.
///
/// Fail-fast: the first structural violation aborts the whole parse, so a
/// caller never observes a partially built table. Duplicate ids within one
/// document resolve last-write-wins.
pub fn parse_document(text: &str) -> Result<AutomationTable, AutomationError> {
    if text.len() > MAX_JSON_SIZE {
        return Err(AutomationError::TooLarge {
            size: text.len(),
            max: MAX_JSON_SIZE,
        });
    }

    let root = decode::decode(text)?;
    let entries = root
        .as_object()
        .and_then(|obj| obj.get("automations"))
        .and_then(Value::as_array)
        .ok_or(AutomationError::MissingAutomations)?;

    let mut table = AutomationTable::new();
    for (index, entry) in entries.iter().enumerate() {
        let automation = parse_automation(index, entry)?;
        tracing::debug!("Parsed automation: {}", automation.id);
        table.insert(automation);
    }
    Ok(table)
}

fn parse_automation(index: usize, value: &Value) -> Result<Automation, AutomationError> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid(index, "entry is not an object"))?;

    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| invalid(index, "missing or empty string field 'id'"))?;

    let name = match obj.get("name") {
        None => None,
        Some(Value::String(name)) => Some(name.clone()),
        Some(_) => return Err(invalid(index, "field 'name' must be a string")),
    };

    let enabled = match obj.get("enabled") {
        None => true,
        Some(Value::Bool(enabled)) => *enabled,
        Some(_) => return Err(invalid(index, "field 'enabled' must be a boolean")),
    };

    // Any JSON shape is a legal trigger; evaluation happens outside this
    // engine, so absence is not an error.
    let trigger = obj.get("trigger").cloned().unwrap_or(Value::Null);

    let actions = match obj.get("actions") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(action_index, item)| parse_action(index, action_index, item))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(invalid(index, "field 'actions' must be an array")),
    };

    Ok(Automation {
        id: id.to_string(),
        name,
        enabled,
        trigger,
        actions,
    })
}

fn parse_action(
    index: usize,
    action_index: usize,
    value: &Value,
) -> Result<Action, AutomationError> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid(index, format!("action {action_index} is not an object")))?;

    let kind = obj
        .get("kind")
        .and_then(Value::as_str)
        .filter(|kind| !kind.is_empty())
        .ok_or_else(|| {
            invalid(
                index,
                format!("action {action_index} missing or empty string field 'kind'"),
            )
        })?;

    let mut parameters = Map::new();
    for (key, param) in obj {
        if key != "kind" {
            parameters.insert(key.clone(), param.clone());
        }
    }

    Ok(Action {
        kind: kind.to_string(),
        parameters,
    })
}

fn invalid(index: usize, reason: impl Into<String>) -> AutomationError {
    AutomationError::InvalidAutomation {
        index,
        reason: reason.into(),
    }
}
