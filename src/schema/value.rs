//! Cell values
//!
//! One closed value type is used for rows, predicate operands and WAL
//! payloads. JSON encoding:
//! - `Null` -> `null`
//! - `Integer` / `Timestamp` -> number (timestamps as epoch milliseconds)
//! - `Text` -> string
//!
//! Decoding maps numbers to `Integer`; the column type decides whether an
//! integer is read back as a timestamp.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{SecondsFormat, TimeZone, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Column name -> value, as supplied by callers and stored in the WAL
pub type Values = BTreeMap<String, Value>;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// 64-bit signed integer
    Integer(i64),
    /// UTF-8 text
    Text(String),
    /// Instant as milliseconds since the Unix epoch
    Timestamp(i64),
}

impl Value {
    /// Returns true for `Value::Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Text(_) => "STRING",
            Value::Timestamp(_) => "TIMESTAMP",
        }
    }

    /// Integer payload of `Integer` and `Timestamp` values
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) | Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    /// Text payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Timestamp(ms) => match Utc.timestamp_millis_opt(*ms).single() {
                Some(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
                None => write!(f, "{}", ms),
            },
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Integer(v) | Value::Timestamp(v) => serializer.serialize_i64(*v),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("null, a 64-bit integer or a string")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        i64::try_from(v)
            .map(Value::Integer)
            .map_err(|_| E::custom(format!("integer {} out of range", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Err(E::custom(format!("floating point values are not supported: {}", v)))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Err(E::custom(format!("boolean values are not supported: {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::Text(v))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_encoding() {
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Value::Integer(-7)).unwrap(), "-7");
        assert_eq!(serde_json::to_string(&Value::Timestamp(1000)).unwrap(), "1000");
        assert_eq!(serde_json::to_string(&Value::from("a\"b")).unwrap(), r#""a\"b""#);
    }

    #[test]
    fn test_json_decoding() {
        let v: Value = serde_json::from_str("42").unwrap();
        assert_eq!(v, Value::Integer(42));
        let v: Value = serde_json::from_str(r#""hello""#).unwrap();
        assert_eq!(v, Value::from("hello"));
        let v: Value = serde_json::from_str("null").unwrap();
        assert!(v.is_null());
    }

    #[test]
    fn test_unsupported_json_is_rejected() {
        assert!(serde_json::from_str::<Value>("1.5").is_err());
        assert!(serde_json::from_str::<Value>("true").is_err());
        assert!(serde_json::from_str::<Value>("[1]").is_err());
        assert!(serde_json::from_str::<Value>(r#"{"a":1}"#).is_err());
        assert!(serde_json::from_str::<Value>("18446744073709551615").is_err());
    }

    #[test]
    fn test_values_map_decodes_nulls() {
        let values: Values = serde_json::from_str(r#"{"a":null,"b":3}"#).unwrap();
        assert_eq!(values["a"], Value::Null);
        assert_eq!(values["b"], Value::Integer(3));
    }

    #[test]
    fn test_timestamp_display_is_rfc3339() {
        assert_eq!(Value::Timestamp(0).to_string(), "1970-01-01T00:00:00.000Z");
        assert_eq!(Value::Integer(0).to_string(), "0");
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }
}
