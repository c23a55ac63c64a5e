//! In-memory JSON automation engine
//!
//! Parses a JSON document of named automations into a validated table,
//! makes the table queryable and executable by id, and reports load
//! success/failure as broadcast events. Action effects and trigger
//! evaluation belong to the host; this crate only stores triggers and
//! hands actions off in order.

pub mod decode;
pub mod engine;
pub mod error;
pub mod executor;
pub mod loader;
pub mod model;
pub mod serializer;
pub mod table;

pub use engine::{AutomationEngine, EngineEvent};
pub use error::AutomationError;
pub use executor::{ActionExecutor, ActionRunner};
pub use model::{Action, Automation};
pub use table::AutomationTable;
