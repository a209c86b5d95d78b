//! Unique indexes
//!
//! One index per key: the primary key (`pk`) and each declared unique
//! constraint (`u0`, `u1`, ...). An index maps a key tuple to the id of the
//! single row that holds it. Null participates in the tuple like any other
//! value.

use std::collections::HashMap;

use crate::schema::{TableSchema, Value};

/// Key tuple extracted from a row
pub type IndexKey = Vec<Value>;

/// Key tuple -> row id
#[derive(Debug, Clone)]
pub struct UniqueIndex {
    name: String,
    columns: Vec<String>,
    positions: Vec<usize>,
    entries: HashMap<IndexKey, u64>,
}

impl UniqueIndex {
    /// Creates an empty index over `columns` of `schema`
    pub fn new(name: impl Into<String>, columns: &[String], schema: &TableSchema) -> Self {
        Self {
            name: name.into(),
            columns: columns.to_vec(),
            positions: schema.positions_of(columns),
            entries: HashMap::new(),
        }
    }

    /// Builds the primary key index followed by one index per unique
    /// constraint, in declaration order.
    pub fn for_schema(schema: &TableSchema) -> Vec<UniqueIndex> {
        let mut indexes = Vec::with_capacity(1 + schema.unique_constraints().len());
        indexes.push(UniqueIndex::new("pk", schema.primary_key(), schema));
        for (i, columns) in schema.unique_constraints().iter().enumerate() {
            indexes.push(UniqueIndex::new(format!("u{}", i), columns, schema));
        }
        indexes
    }

    /// Index name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Indexed columns
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Extracts this index's key from a row in schema column order
    pub fn key(&self, values: &[Value]) -> IndexKey {
        self.positions
            .iter()
            .map(|&pos| values.get(pos).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// Row currently holding `key`
    pub fn lookup(&self, key: &[Value]) -> Option<u64> {
        self.entries.get(key).copied()
    }

    /// True when `key` belongs to a row other than `owner`.
    /// `owner` is the row being updated, or `None` for an insert.
    pub fn conflicts(&self, key: &[Value], owner: Option<u64>) -> bool {
        match self.lookup(key) {
            Some(existing) => Some(existing) != owner,
            None => false,
        }
    }

    pub fn insert(&mut self, key: IndexKey, row_id: u64) {
        self.entries.insert(key, row_id);
    }

    /// Removes `key` only if it still points at `row_id`
    pub fn remove(&mut self, key: &[Value], row_id: u64) {
        if self.lookup(key) == Some(row_id) {
            self.entries.remove(key);
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
