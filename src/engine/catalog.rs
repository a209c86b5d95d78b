//! Table registry
//!
//! Owns every table behind its own lock. Tables are registered once and
//! never removed.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::recovery::{ApplyEvent, RecoveryError, RecoveryResult};
use crate::schema::TableSchema;
use crate::table::Table;
use crate::wal::PersistenceEvent;

use super::apply::apply_row_event;

pub(crate) type TableHandle = Arc<RwLock<Table>>;

/// Name -> table mapping, remembering creation order
#[derive(Debug, Default)]
pub struct Catalog {
    tables: HashMap<String, TableHandle>,
    order: Vec<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, name: &str) -> Option<TableHandle> {
        self.tables.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Registers an empty table for `schema`. The caller checks the name is free.
    pub(crate) fn register(&mut self, schema: TableSchema) -> TableHandle {
        let name = schema.name().to_string();
        let handle = Arc::new(RwLock::new(Table::new(schema)));
        self.tables.insert(name.clone(), Arc::clone(&handle));
        self.order.push(name);
        handle
    }

    /// Table names in creation order
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl ApplyEvent for Catalog {
    fn apply_event(&mut self, sequence: u64, event: &PersistenceEvent) -> RecoveryResult<()> {
        if let PersistenceEvent::CreateTable { table_name, schema } = event {
            if table_name != schema.name() {
                return Err(RecoveryError::event_rejected(
                    sequence,
                    format!(
                        "CREATE_TABLE for {} carries schema for {}",
                        table_name,
                        schema.name()
                    ),
                ));
            }
            if self.contains(schema.name()) {
                return Err(RecoveryError::duplicate_table(sequence, schema.name()));
            }
            self.register(schema.clone());
            return Ok(());
        }

        let handle = self
            .get(event.table_name())
            .ok_or_else(|| RecoveryError::table_missing(sequence, event.table_name()))?;
        let mut table = handle
            .write()
            .map_err(|_| RecoveryError::recovery_failed("table lock poisoned"))?;

        // A rejected event leaves its table untouched, though recovery halts anyway
        let mut journal = table.begin();
        if let Err(e) = apply_row_event(&mut table, event, &mut journal) {
            table.rollback(journal);
            return Err(RecoveryError::event_rejected(sequence, e.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::{RecoveryErrorCode, Replayer};
    use crate::schema::{DataType, Value, Values};

    fn schema(name: &str) -> TableSchema {
        TableSchema::builder(name)
            .column("id", DataType::Integer, false)
            .primary_key(["id"])
            .build()
            .unwrap()
    }

    fn row(id: i64) -> Values {
        let mut v = Values::new();
        v.insert("id".into(), Value::Integer(id));
        v
    }

    #[test]
    fn test_register_keeps_creation_order() {
        let mut catalog = Catalog::new();
        catalog.register(schema("zeta"));
        catalog.register(schema("alpha"));
        assert_eq!(catalog.names(), vec!["zeta".to_string(), "alpha".to_string()]);
        assert!(catalog.contains("alpha"));
        assert!(catalog.get("beta").is_none());
    }

    #[test]
    fn test_replay_rebuilds_tables() {
        let events = vec![
            PersistenceEvent::create_table(schema("t")),
            PersistenceEvent::insert("t", row(1)),
            PersistenceEvent::insert("t", row(2)),
        ];
        let mut catalog = Catalog::new();
        let stats = Replayer::replay(&events, &mut catalog).unwrap();
        assert_eq!(stats.events_replayed, 3);

        let table = catalog.get("t").unwrap();
        let table = table.read().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.next_id(), 3);
    }

    #[test]
    fn test_replay_rejects_mismatched_create_table() {
        let events = vec![PersistenceEvent::CreateTable {
            table_name: "orders".to_string(),
            schema: schema("customers"),
        }];
        let mut catalog = Catalog::new();
        let err = Replayer::replay(&events, &mut catalog).unwrap_err();
        assert_eq!(err.code(), RecoveryErrorCode::LedgerRecoveryEventRejected);
        assert_eq!(err.sequence(), Some(1));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_replay_duplicate_table_fails() {
        let events = vec![
            PersistenceEvent::create_table(schema("t")),
            PersistenceEvent::create_table(schema("t")),
        ];
        let err = Replayer::replay(&events, &mut Catalog::new()).unwrap_err();
        assert_eq!(err.code(), RecoveryErrorCode::LedgerRecoveryDuplicateTable);
        assert_eq!(err.sequence(), Some(2));
    }

    #[test]
    fn test_replay_unknown_table_fails() {
        let events = vec![PersistenceEvent::insert("ghost", row(1))];
        let err = Replayer::replay(&events, &mut Catalog::new()).unwrap_err();
        assert_eq!(err.code(), RecoveryErrorCode::LedgerRecoveryTableMissing);
    }

    #[test]
    fn test_replay_rejected_event_fails() {
        let events = vec![
            PersistenceEvent::create_table(schema("t")),
            PersistenceEvent::insert("t", row(1)),
            PersistenceEvent::insert("t", row(1)),
        ];
        let err = Replayer::replay(&events, &mut Catalog::new()).unwrap_err();
        assert_eq!(err.code(), RecoveryErrorCode::LedgerRecoveryEventRejected);
        assert_eq!(err.sequence(), Some(3));
    }
}
