//! Column types
//!
//! Supported types:
//! - INT: 64-bit signed integer
//! - STRING: UTF-8 string
//! - TIMESTAMP: RFC-3339 instant, stored as epoch milliseconds

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};
use super::value::Value;

/// Supported column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit signed integer
    #[serde(rename = "INT", alias = "INTEGER")]
    Integer,
    /// UTF-8 string
    #[serde(rename = "STRING", alias = "TEXT")]
    String,
    /// Instant stored as epoch milliseconds
    #[serde(rename = "TIMESTAMP")]
    Timestamp,
}

impl DataType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::String => "STRING",
            DataType::Timestamp => "TIMESTAMP",
        }
    }

    /// Parses a textual representation into this type's in-memory value.
    ///
    /// Parsing failure is always an error, never a default.
    pub fn parse(&self, raw: &str) -> SchemaResult<Value> {
        match self {
            DataType::Integer => raw
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| SchemaError::invalid_literal("INTEGER", raw)),
            DataType::String => Ok(Value::Text(raw.to_string())),
            DataType::Timestamp => DateTime::parse_from_rfc3339(raw)
                .map(|dt| Value::Timestamp(dt.timestamp_millis()))
                .map_err(|_| SchemaError::invalid_literal("TIMESTAMP", raw)),
        }
    }

    /// Coerces a supplied value into this column type.
    ///
    /// Text is parsed; values already in the column's native representation
    /// pass through. An integer stored into a TIMESTAMP column is read as
    /// epoch milliseconds (this is how timestamps come back from the WAL).
    pub fn coerce(&self, value: Value) -> SchemaResult<Value> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (_, Value::Text(raw)) => self.parse(&raw),
            (DataType::Integer, Value::Integer(v)) => Ok(Value::Integer(v)),
            (DataType::Timestamp, Value::Integer(ms)) | (DataType::Timestamp, Value::Timestamp(ms)) => {
                Ok(Value::Timestamp(ms))
            }
            (_, other) => Err(SchemaError::type_mismatch(self.type_name(), other.type_name())),
        }
    }

    /// Resolves a predicate operand against this column type.
    ///
    /// Unlike `coerce`, a mismatched native operand is left alone so the
    /// comparison itself reports it.
    pub fn bind_operand(&self, operand: &Value) -> SchemaResult<Value> {
        match (self, operand) {
            (DataType::Integer, Value::Text(raw)) | (DataType::Timestamp, Value::Text(raw)) => {
                self.parse(raw)
            }
            (DataType::Timestamp, Value::Integer(ms)) => Ok(Value::Timestamp(*ms)),
            (_, other) => Ok(other.clone()),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

impl FromStr for DataType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" => Ok(DataType::Integer),
            "STRING" | "TEXT" => Ok(DataType::String),
            "TIMESTAMP" => Ok(DataType::Timestamp),
            _ => Err(SchemaError::invalid(format!("unsupported type: {}", s))),
        }
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name, unique within its table
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub data_type: DataType,
    /// Whether the column accepts null
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnDef {
    /// Create a column definition
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }

    /// Create a non-nullable column
    pub fn required(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, data_type, false)
    }

    /// Create a nullable column
    pub fn optional(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, data_type, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_parse_integer() {
        assert_eq!(DataType::Integer.parse("-12").unwrap(), Value::Integer(-12));
        let err = DataType::Integer.parse("12a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert_eq!(err.message(), "invalid INTEGER: 12a");
    }

    #[test]
    fn test_parse_string_is_identity() {
        assert_eq!(DataType::String.parse(" x ").unwrap(), Value::from(" x "));
    }

    #[test]
    fn test_parse_timestamp_to_epoch_millis() {
        let v = DataType::Timestamp.parse("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(v, Value::Timestamp(1_704_067_200_000));

        let v = DataType::Timestamp.parse("2024-01-01T01:00:00.250+01:00").unwrap();
        assert_eq!(v, Value::Timestamp(1_704_067_200_250));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let err = DataType::Timestamp.parse("not-a-date").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert_eq!(err.message(), "invalid TIMESTAMP: not-a-date");
    }

    #[test]
    fn test_coerce_native_values_pass_through() {
        assert_eq!(DataType::Integer.coerce(Value::Integer(5)).unwrap(), Value::Integer(5));
        assert_eq!(DataType::Timestamp.coerce(Value::Integer(5)).unwrap(), Value::Timestamp(5));
        assert_eq!(DataType::Timestamp.coerce(Value::Timestamp(5)).unwrap(), Value::Timestamp(5));
        assert_eq!(DataType::String.coerce(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_coerce_rejects_mismatched_native_values() {
        assert!(DataType::String.coerce(Value::Integer(5)).is_err());
        assert!(DataType::Integer.coerce(Value::Timestamp(5)).is_err());
    }

    #[test]
    fn test_bind_operand() {
        assert_eq!(
            DataType::Timestamp.bind_operand(&Value::from("1970-01-01T00:00:01Z")).unwrap(),
            Value::Timestamp(1000)
        );
        assert_eq!(DataType::Integer.bind_operand(&Value::from("7")).unwrap(), Value::Integer(7));
        assert_eq!(DataType::String.bind_operand(&Value::Integer(7)).unwrap(), Value::Integer(7));
        assert!(DataType::Integer.bind_operand(&Value::from("seven")).is_err());
    }

    #[test]
    fn test_type_names_round_trip_through_serde() {
        let json = serde_json::to_string(&DataType::Integer).unwrap();
        assert_eq!(json, r#""INT""#);
        let parsed: DataType = serde_json::from_str(r#""INTEGER""#).unwrap();
        assert_eq!(parsed, DataType::Integer);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("timestamp".parse::<DataType>().unwrap(), DataType::Timestamp);
        assert_eq!("Int".parse::<DataType>().unwrap(), DataType::Integer);
        assert!("float".parse::<DataType>().is_err());
    }

    #[test]
    fn test_column_def_json_shape() {
        let col = ColumnDef::optional("note", DataType::String);
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(json["type"], "STRING");
        assert_eq!(json["nullable"], true);
    }
}
