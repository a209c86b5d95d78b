//! Table schema
//!
//! A validated, immutable description of a table: ordered columns, a
//! non-empty primary key, and zero or more unique constraints. Every
//! construction path (builder, constructor, JSON decoding) goes through
//! `TableSchema::new`, so an invalid schema cannot exist.
//!
//! JSON shape:
//!
//! ```text
//! {"name":"t",
//!  "columns":{"id":{"name":"id","type":"INT","nullable":false}, ...},
//!  "primaryKey":["id"],
//!  "uniqueConstraints":[["email"]]}
//! ```
//!
//! `columns` is an object whose key order is the column order.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::errors::{SchemaError, SchemaResult};
use super::types::{ColumnDef, DataType};

/// Validated table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDocument", into = "SchemaDocument")]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnDef>,
    positions: HashMap<String, usize>,
    primary_key: Vec<String>,
    unique_constraints: Vec<Vec<String>>,
}

impl TableSchema {
    /// Validates and builds a schema.
    ///
    /// # Errors
    ///
    /// `LEDGER_SCHEMA_INVALID` when the name is empty, there are no columns,
    /// a column name is empty or duplicated, the primary key is empty, or a
    /// key references an undeclared column or a unique constraint is empty.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<ColumnDef>,
        primary_key: Vec<String>,
        unique_constraints: Vec<Vec<String>>,
    ) -> SchemaResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(SchemaError::invalid("table name must not be empty"));
        }
        if columns.is_empty() {
            return Err(SchemaError::invalid(format!(
                "table {} must have at least one column",
                name
            )));
        }

        let mut positions = HashMap::with_capacity(columns.len());
        for (pos, column) in columns.iter().enumerate() {
            if column.name.is_empty() {
                return Err(SchemaError::invalid("column name must not be empty"));
            }
            if positions.insert(column.name.clone(), pos).is_some() {
                return Err(SchemaError::invalid_column(
                    &column.name,
                    format!("duplicate column: {}", column.name),
                ));
            }
        }

        if primary_key.is_empty() {
            return Err(SchemaError::invalid(format!(
                "primary key required for table {}",
                name
            )));
        }
        for column in &primary_key {
            if !positions.contains_key(column) {
                return Err(SchemaError::invalid_column(
                    column,
                    format!("primary key references missing column: {}", column),
                ));
            }
        }

        for constraint in &unique_constraints {
            if constraint.is_empty() {
                return Err(SchemaError::invalid("unique constraint cannot be empty"));
            }
            for column in constraint {
                if !positions.contains_key(column) {
                    return Err(SchemaError::invalid_column(
                        column,
                        format!("unique constraint references missing column: {}", column),
                    ));
                }
            }
        }

        Ok(Self {
            name,
            columns,
            positions,
            primary_key,
            unique_constraints,
        })
    }

    /// Start building a schema for the named table
    pub fn builder(name: impl Into<String>) -> TableSchemaBuilder {
        TableSchemaBuilder {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique_constraints: Vec::new(),
        }
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Looks up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.positions.get(name).map(|&pos| &self.columns[pos])
    }

    /// Position of a column in declaration order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Returns true if the column is declared
    pub fn has_column(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Primary key column names
    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// Unique constraints, each a list of column names
    pub fn unique_constraints(&self) -> &[Vec<String>] {
        &self.unique_constraints
    }

    /// Resolves column names to positions. Only valid for names that
    /// passed construction-time validation.
    pub(crate) fn positions_of(&self, names: &[String]) -> Vec<usize> {
        names.iter().filter_map(|n| self.position(n)).collect()
    }
}

/// Fluent construction of a `TableSchema`
#[derive(Debug, Clone)]
pub struct TableSchemaBuilder {
    name: String,
    columns: Vec<ColumnDef>,
    primary_key: Vec<String>,
    unique_constraints: Vec<Vec<String>>,
}

impl TableSchemaBuilder {
    /// Append a column
    pub fn column(mut self, name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        self.columns.push(ColumnDef::new(name, data_type, nullable));
        self
    }

    /// Set the primary key
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add a unique constraint
    pub fn unique<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_constraints
            .push(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Validate and build
    pub fn build(self) -> SchemaResult<TableSchema> {
        TableSchema::new(
            self.name,
            self.columns,
            self.primary_key,
            self.unique_constraints,
        )
    }
}

/// Wire form of a schema, before validation
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaDocument {
    name: String,
    columns: OrderedColumns,
    primary_key: Vec<String>,
    #[serde(default)]
    unique_constraints: Vec<Vec<String>>,
}

impl TryFrom<SchemaDocument> for TableSchema {
    type Error = SchemaError;

    fn try_from(doc: SchemaDocument) -> Result<Self, Self::Error> {
        let mut columns = Vec::with_capacity(doc.columns.0.len());
        for (key, column) in doc.columns.0 {
            if key != column.name {
                return Err(SchemaError::invalid_column(
                    &key,
                    format!("column key {} does not match column name {}", key, column.name),
                ));
            }
            columns.push(column);
        }
        TableSchema::new(doc.name, columns, doc.primary_key, doc.unique_constraints)
    }
}

impl From<TableSchema> for SchemaDocument {
    fn from(schema: TableSchema) -> Self {
        SchemaDocument {
            name: schema.name,
            columns: OrderedColumns(
                schema
                    .columns
                    .into_iter()
                    .map(|c| (c.name.clone(), c))
                    .collect(),
            ),
            primary_key: schema.primary_key,
            unique_constraints: schema.unique_constraints,
        }
    }
}

/// Column map that keeps document order in both directions
struct OrderedColumns(Vec<(String, ColumnDef)>);

impl Serialize for OrderedColumns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, column) in &self.0 {
            map.serialize_entry(name, column)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OrderedColumns {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColumnsVisitor;

        impl<'de> Visitor<'de> for ColumnsVisitor {
            type Value = OrderedColumns;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of column definitions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((name, column)) = access.next_entry::<String, ColumnDef>()? {
                    entries.push((name, column));
                }
                Ok(OrderedColumns(entries))
            }
        }

        deserializer.deserialize_map(ColumnsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn customers() -> TableSchema {
        TableSchema::builder("customers")
            .column("id", DataType::Integer, false)
            .column("email", DataType::String, false)
            .column("created_at", DataType::Timestamp, true)
            .primary_key(["id"])
            .unique(["email"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_preserves_column_order() {
        let schema = customers();
        let names: Vec<_> = schema.column_names().collect();
        assert_eq!(names, vec!["id", "email", "created_at"]);
        assert_eq!(schema.position("created_at"), Some(2));
        assert_eq!(schema.primary_key(), ["id".to_string()]);
    }

    #[test]
    fn test_rejects_empty_columns() {
        let err = TableSchema::new("t", vec![], vec!["id".into()], vec![]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_rejects_duplicate_columns() {
        let err = TableSchema::builder("t")
            .column("id", DataType::Integer, false)
            .column("id", DataType::String, false)
            .primary_key(["id"])
            .build()
            .unwrap_err();
        assert!(err.message().contains("duplicate column"));
    }

    #[test]
    fn test_rejects_missing_primary_key() {
        let err = TableSchema::builder("t")
            .column("id", DataType::Integer, false)
            .build()
            .unwrap_err();
        assert!(err.message().contains("primary key required"));
    }

    #[test]
    fn test_rejects_keys_on_unknown_columns() {
        let err = TableSchema::builder("t")
            .column("id", DataType::Integer, false)
            .primary_key(["nope"])
            .build()
            .unwrap_err();
        assert_eq!(err.column(), Some("nope"));

        let err = TableSchema::builder("t")
            .column("id", DataType::Integer, false)
            .primary_key(["id"])
            .unique(["ghost"])
            .build()
            .unwrap_err();
        assert!(err.message().contains("unique constraint references missing column"));
    }

    #[test]
    fn test_rejects_empty_unique_constraint() {
        let err = TableSchema::new(
            "t",
            vec![ColumnDef::required("id", DataType::Integer)],
            vec!["id".into()],
            vec![vec![]],
        )
        .unwrap_err();
        assert!(err.message().contains("cannot be empty"));
    }

    #[test]
    fn test_json_shape_keeps_column_order() {
        let json = serde_json::to_string(&customers()).unwrap();
        let id = json.find(r#""id":{"#).unwrap();
        let email = json.find(r#""email":{"#).unwrap();
        let created = json.find(r#""created_at":{"#).unwrap();
        assert!(id < email && email < created);
        assert!(json.contains(r#""primaryKey":["id"]"#));
        assert!(json.contains(r#""uniqueConstraints":[["email"]]"#));
    }

    #[test]
    fn test_json_decoding_validates() {
        let schema: TableSchema = serde_json::from_str(&serde_json::to_string(&customers()).unwrap()).unwrap();
        assert_eq!(schema, customers());

        let bad = r#"{"name":"t","columns":{"id":{"name":"id","type":"INT"}},"primaryKey":["x"]}"#;
        assert!(serde_json::from_str::<TableSchema>(bad).is_err());

        let mismatched = r#"{"name":"t","columns":{"a":{"name":"b","type":"INT"}},"primaryKey":["b"]}"#;
        assert!(serde_json::from_str::<TableSchema>(mismatched).is_err());
    }
}
