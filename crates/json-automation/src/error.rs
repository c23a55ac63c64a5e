//! Error types for the automation engine

use thiserror::Error;

/// Errors that can occur in the automation engine
#[derive(Error, Debug)]
pub enum AutomationError {
    /// Malformed JSON text (syntax error from the decoder)
    #[error("JSON syntax error: {0}")]
    Syntax(#[from] serde_json::Error),

    /// Well-formed JSON without the required top-level structure
    #[error("missing or malformed 'automations' array")]
    MissingAutomations,

    /// A single automation entry failed structural validation
    #[error("automation {index}: {reason}")]
    InvalidAutomation { index: usize, reason: String },

    /// Input document exceeds the configured size ceiling
    #[error("JSON data too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },

    /// Automation not found
    #[error("automation not found: {0}")]
    NotFound(String),

    /// Automation is disabled
    #[error("automation is disabled: {0}")]
    Disabled(String),
}
