//! Persistence events
//!
//! One event per accepted mutation; the unit of durability and of replay.
//! Encoded as a single JSON object tagged by `type`:
//!
//! ```text
//! {"type":"CREATE_TABLE","tableName":"t","schema":{...}}
//! {"type":"INSERT","tableName":"t","values":{...}}
//! {"type":"UPDATE","tableName":"t","predicate":{"conditions":[...]},"values":{...}}
//! {"type":"DELETE","tableName":"t","predicate":{"conditions":[...]}}
//! ```
//!
//! Values are logged as supplied by the caller and coerced again on replay.

use serde::{Deserialize, Deserializer, Serialize};

use crate::predicate::RowPredicate;
use crate::schema::{TableSchema, Values};

/// A logged mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersistenceEvent {
    #[serde(rename_all = "camelCase")]
    CreateTable { table_name: String, schema: TableSchema },

    #[serde(rename_all = "camelCase")]
    Insert { table_name: String, values: Values },

    #[serde(rename_all = "camelCase")]
    Update {
        table_name: String,
        #[serde(default, deserialize_with = "predicate_or_all")]
        predicate: RowPredicate,
        values: Values,
    },

    #[serde(rename_all = "camelCase")]
    Delete {
        table_name: String,
        #[serde(default, deserialize_with = "predicate_or_all")]
        predicate: RowPredicate,
    },
}

impl PersistenceEvent {
    pub fn create_table(schema: TableSchema) -> Self {
        PersistenceEvent::CreateTable {
            table_name: schema.name().to_string(),
            schema,
        }
    }

    pub fn insert(table: impl Into<String>, values: Values) -> Self {
        PersistenceEvent::Insert {
            table_name: table.into(),
            values,
        }
    }

    /// An absent predicate is logged as an empty one
    pub fn update(table: impl Into<String>, predicate: Option<RowPredicate>, values: Values) -> Self {
        PersistenceEvent::Update {
            table_name: table.into(),
            predicate: predicate.unwrap_or_default(),
            values,
        }
    }

    pub fn delete(table: impl Into<String>, predicate: Option<RowPredicate>) -> Self {
        PersistenceEvent::Delete {
            table_name: table.into(),
            predicate: predicate.unwrap_or_default(),
        }
    }

    /// Table the event targets
    pub fn table_name(&self) -> &str {
        match self {
            PersistenceEvent::CreateTable { table_name, .. }
            | PersistenceEvent::Insert { table_name, .. }
            | PersistenceEvent::Update { table_name, .. }
            | PersistenceEvent::Delete { table_name, .. } => table_name,
        }
    }

    /// Wire name of the event type
    pub fn type_name(&self) -> &'static str {
        match self {
            PersistenceEvent::CreateTable { .. } => "CREATE_TABLE",
            PersistenceEvent::Insert { .. } => "INSERT",
            PersistenceEvent::Update { .. } => "UPDATE",
            PersistenceEvent::Delete { .. } => "DELETE",
        }
    }
}

fn predicate_or_all<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RowPredicate, D::Error> {
    Ok(Option::<RowPredicate>::deserialize(deserializer)?.unwrap_or_default())
}
