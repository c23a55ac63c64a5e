//! Decoder adapter over serde_json

use crate::error::AutomationError;
use serde_json::Value;

/// Decode raw text into a generic JSON tree.
///
/// Never panics on malformed input; syntax errors come back as
/// [`AutomationError::Syntax`] with the parser's line/column message.
pub fn decode(text: &str) -> Result<Value, AutomationError> {
    let value = serde_json::from_str(text)?;
    Ok(value)
}
