//! In-memory table
//!
//! Owns one schema's rows and unique indexes. Rows are kept in id order,
//! which is insertion order since ids are never reused.
//!
//! Every public mutation is all-or-nothing: changes are journaled and
//! undone if any step fails. The `*_journaled` variants leave undo to the
//! caller so the engine can also undo when the WAL append fails.

use std::collections::BTreeMap;

use crate::predicate::{BoundPredicate, RowPredicate};
use crate::schema::{TableSchema, Value, Values};

use super::errors::{TableError, TableResult};
use super::index::{IndexKey, UniqueIndex};
use super::journal::{Journal, JournalEntry};
use super::record::{Row, RowRecord};

/// First id handed out by a new table
pub const FIRST_ROW_ID: u64 = 1;

/// A table: schema, rows, and one unique index per key
#[derive(Debug, Clone)]
pub struct Table {
    schema: TableSchema,
    next_id: u64,
    rows: BTreeMap<u64, RowRecord>,
    /// `[0]` is the primary key, then one per unique constraint
    indexes: Vec<UniqueIndex>,
}

impl Table {
    /// Creates an empty table
    pub fn new(schema: TableSchema) -> Self {
        let indexes = UniqueIndex::for_schema(&schema);
        Self {
            schema,
            next_id: FIRST_ROW_ID,
            rows: BTreeMap::new(),
            indexes,
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Id the next inserted row will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Unique indexes, primary key first
    pub fn indexes(&self) -> &[UniqueIndex] {
        &self.indexes
    }

    /// Row by id
    pub fn get(&self, id: u64) -> Option<Row> {
        self.rows.get(&id).map(|rec| rec.to_row(&self.schema))
    }

    /// Inserts one row and returns its id.
    ///
    /// Every supplied key must be a declared column. Absent columns are null;
    /// null in a non-nullable column fails with `ColumnRequired`.
    pub fn insert(&mut self, values: Values) -> TableResult<u64> {
        self.atomically(|table, journal| table.insert_journaled(values, journal))
    }

    /// Merges `values` into every row matching `predicate` and returns the
    /// number of rows changed. Fails as a whole if any row fails.
    pub fn update(&mut self, predicate: Option<&RowPredicate>, values: Values) -> TableResult<usize> {
        self.atomically(|table, journal| table.update_journaled(predicate, values, journal))
    }

    /// Removes every row matching `predicate` and returns the count.
    pub fn delete(&mut self, predicate: Option<&RowPredicate>) -> TableResult<usize> {
        self.atomically(|table, journal| table.delete_journaled(predicate, journal))
    }

    /// Rows matching `predicate` in insertion order, projected to `columns`
    /// when given and non-empty.
    pub fn select(
        &self,
        columns: Option<&[String]>,
        predicate: Option<&RowPredicate>,
    ) -> TableResult<Vec<Row>> {
        let bound = self.bind(predicate)?;
        let mut result = Vec::new();
        for record in self.rows.values() {
            if !bound.matches(record.values())? {
                continue;
            }
            let row = record.to_row(&self.schema);
            match columns {
                Some(cols) if !cols.is_empty() => result.push(row.project(cols)),
                _ => result.push(row),
            }
        }
        Ok(result)
    }

    /// Point-in-time copy of every row
    pub fn rows_snapshot(&self) -> Vec<Row> {
        self.rows
            .values()
            .map(|rec| rec.to_row(&self.schema))
            .collect()
    }

    /// Opens an undo journal
    pub(crate) fn begin(&self) -> Journal {
        Journal::new(self.next_id)
    }

    pub(crate) fn insert_journaled(&mut self, values: Values, journal: &mut Journal) -> TableResult<u64> {
        let row = self.coerce_insert(values)?;
        let keys = self.keys_for(&row);
        self.check_unique(&keys, None)?;

        let id = self.next_id;
        self.next_id += 1;
        self.index_row(keys, id);
        self.rows.insert(id, RowRecord::new(id, row));
        journal.record(JournalEntry::Inserted(id));
        Ok(id)
    }

    /// Rows are processed one at a time in row order; each row's new keys
    /// are visible to the rows after it.
    pub(crate) fn update_journaled(
        &mut self,
        predicate: Option<&RowPredicate>,
        values: Values,
        journal: &mut Journal,
    ) -> TableResult<usize> {
        let bound = self.bind(predicate)?;
        let updates = self.coerce_update(values)?;
        let ids = self.matching_ids(&bound)?;

        for &id in &ids {
            let Some(current) = self.rows.get(&id).cloned() else {
                continue;
            };

            let mut merged = current.values().to_vec();
            for (pos, value) in &updates {
                merged[*pos] = value.clone();
            }
            self.check_nullability(&merged)?;

            let keys = self.keys_for(&merged);
            self.check_unique(&keys, Some(id))?;

            self.unindex_row(&current);
            self.index_row(keys, id);
            self.rows.insert(id, RowRecord::new(id, merged));
            journal.record(JournalEntry::Replaced(current));
        }
        Ok(ids.len())
    }

    pub(crate) fn delete_journaled(
        &mut self,
        predicate: Option<&RowPredicate>,
        journal: &mut Journal,
    ) -> TableResult<usize> {
        let bound = self.bind(predicate)?;
        let ids = self.matching_ids(&bound)?;

        let mut removed = 0;
        for id in ids {
            if let Some(record) = self.rows.remove(&id) {
                self.unindex_row(&record);
                journal.record(JournalEntry::Removed(record));
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Undoes every change recorded in `journal`
    pub(crate) fn rollback(&mut self, journal: Journal) {
        let next_id = journal.next_id();
        for entry in journal.into_undo() {
            match entry {
                JournalEntry::Inserted(id) => {
                    if let Some(record) = self.rows.remove(&id) {
                        self.unindex_row(&record);
                    }
                }
                JournalEntry::Replaced(previous) => {
                    if let Some(current) = self.rows.remove(&previous.id()) {
                        self.unindex_row(&current);
                    }
                    self.restore_row(previous);
                }
                JournalEntry::Removed(previous) => self.restore_row(previous),
            }
        }
        self.next_id = next_id;
    }

    fn atomically<T>(
        &mut self,
        op: impl FnOnce(&mut Self, &mut Journal) -> TableResult<T>,
    ) -> TableResult<T> {
        let mut journal = self.begin();
        match op(self, &mut journal) {
            Ok(result) => Ok(result),
            Err(e) => {
                self.rollback(journal);
                Err(e)
            }
        }
    }

    fn bind(&self, predicate: Option<&RowPredicate>) -> TableResult<BoundPredicate> {
        match predicate {
            Some(p) => Ok(p.bind(&self.schema)?),
            None => Ok(BoundPredicate::all()),
        }
    }

    /// Ids of matching rows, computed before any mutation
    fn matching_ids(&self, bound: &BoundPredicate) -> TableResult<Vec<u64>> {
        let mut ids = Vec::new();
        for (id, record) in &self.rows {
            if bound.matches(record.values())? {
                ids.push(*id);
            }
        }
        Ok(ids)
    }

    fn check_known_columns(&self, values: &Values) -> TableResult<()> {
        match values.keys().find(|name| !self.schema.has_column(name)) {
            Some(name) => Err(TableError::UnknownColumn {
                column: name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Full row in schema order
    fn coerce_insert(&self, mut values: Values) -> TableResult<Vec<Value>> {
        self.check_known_columns(&values)?;

        let mut row = Vec::with_capacity(self.schema.columns().len());
        for column in self.schema.columns() {
            let raw = values.remove(&column.name).unwrap_or(Value::Null);
            if raw.is_null() && !column.nullable {
                return Err(TableError::ColumnRequired {
                    column: column.name.clone(),
                });
            }
            let value = column
                .data_type
                .coerce(raw)
                .map_err(|e| e.for_column(&column.name))?;
            row.push(value);
        }
        Ok(row)
    }

    /// Supplied subset as (position, value)
    fn coerce_update(&self, values: Values) -> TableResult<Vec<(usize, Value)>> {
        self.check_known_columns(&values)?;

        let mut updates = Vec::with_capacity(values.len());
        for (name, raw) in values {
            let Some(pos) = self.schema.position(&name) else {
                return Err(TableError::UnknownColumn { column: name });
            };
            let value = self.schema.columns()[pos]
                .data_type
                .coerce(raw)
                .map_err(|e| e.for_column(&name))?;
            updates.push((pos, value));
        }
        Ok(updates)
    }

    fn check_nullability(&self, row: &[Value]) -> TableResult<()> {
        for (column, value) in self.schema.columns().iter().zip(row) {
            if value.is_null() && !column.nullable {
                return Err(TableError::NotNullable {
                    column: column.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn keys_for(&self, row: &[Value]) -> Vec<IndexKey> {
        self.indexes.iter().map(|index| index.key(row)).collect()
    }

    fn check_unique(&self, keys: &[IndexKey], owner: Option<u64>) -> TableResult<()> {
        for (index, key) in self.indexes.iter().zip(keys) {
            if index.conflicts(key, owner) {
                return Err(TableError::UniqueViolation {
                    table: self.schema.name().to_string(),
                    columns: index.columns().to_vec(),
                });
            }
        }
        Ok(())
    }

    fn index_row(&mut self, keys: Vec<IndexKey>, id: u64) {
        for (index, key) in self.indexes.iter_mut().zip(keys) {
            index.insert(key, id);
        }
    }

    fn unindex_row(&mut self, record: &RowRecord) {
        for index in &mut self.indexes {
            let key = index.key(record.values());
            index.remove(&key, record.id());
        }
    }

    fn restore_row(&mut self, record: RowRecord) {
        let keys = self.keys_for(record.values());
        self.index_row(keys, record.id());
        self.rows.insert(record.id(), record);
    }
}
