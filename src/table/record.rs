//! Stored rows and result rows

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::predicate::ColumnLookup;
use crate::schema::{TableSchema, Value, Values};

/// A stored row. `values` is laid out in schema column order and always
/// holds one entry per declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    id: u64,
    values: Vec<Value>,
}

impl RowRecord {
    pub(crate) fn new(id: u64, values: Vec<Value>) -> Self {
        Self { id, values }
    }

    /// Row id, assigned once by the owning table
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Values in schema column order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Name-addressed copy of the full row
    pub fn to_row(&self, schema: &TableSchema) -> Row {
        Row::from_pairs(
            schema
                .column_names()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), value.clone())),
        )
    }
}

/// A result row: ordered column -> value pairs.
///
/// Serializes as a JSON object whose key order is the column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Builds a row from ordered pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Self {
            columns: pairs.into_iter().collect(),
        }
    }

    /// Value of a column, if present
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Sets a column, replacing an existing entry in place or appending
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.columns.push((column, value)),
        }
    }

    /// Column names in order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Keeps exactly `columns`, in that order; missing ones become null
    pub fn project(&self, columns: &[String]) -> Row {
        Row::from_pairs(columns.iter().map(|name| {
            let value = self.get(name).cloned().unwrap_or(Value::Null);
            (name.clone(), value)
        }))
    }

    /// Unordered map form
    pub fn to_values(&self) -> Values {
        self.columns.iter().cloned().collect()
    }
}

impl ColumnLookup for Row {
    fn lookup(&self, column: &str) -> Option<&Value> {
        self.get(column)
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::from_pairs([
            ("id".to_string(), Value::Integer(1)),
            ("name".to_string(), Value::from("Alice")),
        ])
    }

    #[test]
    fn test_projection_keeps_requested_order() {
        let projected = row().project(&["name".into(), "ghost".into(), "id".into()]);
        let names: Vec<_> = projected.column_names().collect();
        assert_eq!(names, vec!["name", "ghost", "id"]);
        assert_eq!(projected.get("ghost"), Some(&Value::Null));
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let json = serde_json::to_string(&row()).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"Alice"}"#);
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut r = row();
        r.set("id", Value::Integer(2));
        r.set("extra", Value::Null);
        let names: Vec<_> = r.column_names().collect();
        assert_eq!(names, vec!["id", "name", "extra"]);
        assert_eq!(r.get("id"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_display() {
        assert_eq!(row().to_string(), "{id=1, name=Alice}");
    }
}
