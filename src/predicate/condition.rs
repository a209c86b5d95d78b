//! Conditions and row predicates
//!
//! A predicate is an ordered conjunction of single-column conditions. An
//! absent (or empty) predicate matches every row.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::Value;

use super::errors::PredicateResult;
use super::evaluator::evaluate;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// Returns the wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "EQ",
            Operator::Neq => "NEQ",
            Operator::Lt => "LT",
            Operator::Lte => "LTE",
            Operator::Gt => "GT",
            Operator::Gte => "GTE",
            Operator::IsNull => "IS_NULL",
            Operator::IsNotNull => "IS_NOT_NULL",
        }
    }

    /// Null checks ignore their operand
    pub fn is_null_check(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EQ" => Ok(Operator::Eq),
            "NEQ" => Ok(Operator::Neq),
            "LT" => Ok(Operator::Lt),
            "LTE" => Ok(Operator::Lte),
            "GT" => Ok(Operator::Gt),
            "GTE" => Ok(Operator::Gte),
            "IS_NULL" => Ok(Operator::IsNull),
            "IS_NOT_NULL" => Ok(Operator::IsNotNull),
            other => Err(format!("unknown operator: {}", other)),
        }
    }
}

/// A single column comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Column the condition reads
    pub column: String,
    /// Operator applied
    pub operator: Operator,
    /// Right-hand operand; ignored by null checks
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    /// Create a condition
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Eq, value)
    }

    pub fn neq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Neq, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Lt, value)
    }

    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Lte, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Gt, value)
    }

    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, Operator::Gte, value)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, Operator::IsNull, Value::Null)
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::new(column, Operator::IsNotNull, Value::Null)
    }

    /// Evaluates this condition against the value read from the row
    pub fn evaluate(&self, actual: &Value) -> PredicateResult<bool> {
        evaluate(self.operator, actual, &self.value).map_err(|e| e.on_column(&self.column))
    }
}

/// Name-addressed access to a row's values
pub trait ColumnLookup {
    /// Value stored under `column`, or `None` if the row has no such column
    fn lookup(&self, column: &str) -> Option<&Value>;
}

impl ColumnLookup for BTreeMap<String, Value> {
    fn lookup(&self, column: &str) -> Option<&Value> {
        self.get(column)
    }
}

/// Conjunction of conditions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowPredicate {
    #[serde(default)]
    conditions: Vec<Condition>,
}

impl RowPredicate {
    /// Create a predicate from conditions, evaluated in order
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    /// Predicate with no conditions; matches every row
    pub fn all() -> Self {
        Self::default()
    }

    /// Single-condition predicate
    pub fn single(condition: Condition) -> Self {
        Self::new(vec![condition])
    }

    /// Append a condition
    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Conditions in evaluation order
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// True when the predicate matches every row
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Tests a row. An absent column reads as null. Stops at the first
    /// failing condition; a comparison error aborts the test.
    pub fn test<R: ColumnLookup + ?Sized>(&self, row: &R) -> PredicateResult<bool> {
        for condition in &self.conditions {
            let actual = row.lookup(&condition.column).unwrap_or(&Value::Null);
            if !condition.evaluate(actual)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl From<Condition> for RowPredicate {
    fn from(condition: Condition) -> Self {
        RowPredicate::single(condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Values;

    fn row(pairs: &[(&str, Value)]) -> Values {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_conjunction() {
        let r = row(&[("id", Value::Integer(1)), ("name", Value::from("Alice"))]);
        let pred = RowPredicate::single(Condition::eq("id", 1)).and(Condition::eq("name", "Alice"));
        assert!(pred.test(&r).unwrap());

        let pred = RowPredicate::single(Condition::eq("id", 1)).and(Condition::eq("name", "Bob"));
        assert!(!pred.test(&r).unwrap());
    }

    #[test]
    fn test_empty_predicate_matches() {
        assert!(RowPredicate::all().test(&row(&[])).unwrap());
    }

    #[test]
    fn test_absent_column_reads_as_null() {
        let r = row(&[("id", Value::Integer(1))]);
        assert!(RowPredicate::single(Condition::is_null("missing")).test(&r).unwrap());
        assert!(RowPredicate::single(Condition::eq("missing", 1)).test(&r).is_err());
    }

    #[test]
    fn test_short_circuits_before_failing_comparison() {
        let r = row(&[("id", Value::Integer(1)), ("note", Value::Null)]);
        let pred = RowPredicate::single(Condition::is_not_null("note")).and(Condition::gt("note", "a"));
        assert!(!pred.test(&r).unwrap());
    }

    #[test]
    fn test_wire_format() {
        let pred = RowPredicate::single(Condition::eq("id", 1));
        let json = serde_json::to_string(&pred).unwrap();
        assert_eq!(json, r#"{"conditions":[{"column":"id","operator":"EQ","value":1}]}"#);

        let parsed: RowPredicate =
            serde_json::from_str(r#"{"conditions":[{"column":"x","operator":"IS_NOT_NULL"}]}"#).unwrap();
        assert_eq!(parsed.conditions()[0], Condition::is_not_null("x"));
    }

    #[test]
    fn test_operator_from_str() {
        assert_eq!("is_not_null".parse::<Operator>().unwrap(), Operator::IsNotNull);
        assert!("LIKE".parse::<Operator>().is_err());
    }
}
