//! Id-keyed store of loaded automations

use crate::model::Automation;
use std::collections::HashMap;

/// The authoritative collection of loaded automations, keyed by id.
///
/// The table owns its automations exclusively. The engine replaces a live
/// table wholesale on reload; it never merges one load into another.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AutomationTable {
    automations: HashMap<String, Automation>,
}

impl AutomationTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of automations in the table
    pub fn len(&self) -> usize {
        self.automations.len()
    }

    /// Whether the table holds no automations
    pub fn is_empty(&self) -> bool {
        self.automations.is_empty()
    }

    /// Look up an automation by id
    pub fn get(&self, id: &str) -> Option<&Automation> {
        self.automations.get(id)
    }

    /// Insert an automation keyed by its own id, returning the entry it
    /// replaced, if any (last write wins).
    pub fn insert(&mut self, automation: Automation) -> Option<Automation> {
        self.automations.insert(automation.id.clone(), automation)
    }

    /// Remove an automation by id
    pub fn remove(&mut self, id: &str) -> Option<Automation> {
        self.automations.remove(id)
    }

    /// Iterate over all automations (unordered)
    pub fn iter(&self) -> impl Iterator<Item = &Automation> {
        self.automations.values()
    }

    /// Drop every automation
    pub fn clear(&mut self) {
        self.automations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut table = AutomationTable::new();
        assert!(table.is_empty());

        table.insert(Automation::new("a"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a").unwrap().id, "a");
        assert!(table.get("b").is_none());
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let mut table = AutomationTable::new();
        table.insert(Automation::new("a"));

        let mut updated = Automation::new("a");
        updated.name = Some("renamed".to_string());
        let replaced = table.insert(updated);

        assert!(replaced.is_some());
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a").unwrap().name.as_deref(), Some("renamed"));
    }

    #[test]
    fn test_remove() {
        let mut table = AutomationTable::new();
        table.insert(Automation::new("a"));

        assert!(table.remove("a").is_some());
        assert!(table.remove("a").is_none());
        assert!(table.is_empty());
    }
}
