//! Predicate evaluation
//!
//! Ordering rules:
//! - INTEGER and TIMESTAMP compare with each other on their i64 payload
//! - STRING compares with STRING lexicographically
//! - null on either side of an ordering operator is an error, never false
//! - any other pairing is an error
//!
//! A `BoundPredicate` is a `RowPredicate` resolved against one table schema:
//! columns become positions and operands are coerced toward the column type.

use std::cmp::Ordering;

use crate::schema::{SchemaResult, TableSchema, Value};

use super::condition::{Operator, RowPredicate};
use super::errors::{PredicateError, PredicateResult};

/// Orders two non-null values.
pub fn compare_values(left: &Value, right: &Value) -> PredicateResult<Ordering> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => Err(PredicateError::null_comparison()),
        (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
        (Value::Integer(a) | Value::Timestamp(a), Value::Integer(b) | Value::Timestamp(b)) => {
            Ok(a.cmp(b))
        }
        (a, b) => Err(PredicateError::not_comparable(a.type_name(), b.type_name())),
    }
}

/// Value equality used for join keys: two nulls are equal, a null never
/// equals a non-null, incomparable values are unequal.
pub fn values_match(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (a, b) => matches!(compare_values(a, b), Ok(Ordering::Equal)),
    }
}

/// Applies one operator to a row value and an operand.
pub fn evaluate(operator: Operator, actual: &Value, operand: &Value) -> PredicateResult<bool> {
    Ok(match operator {
        Operator::IsNull => actual.is_null(),
        Operator::IsNotNull => !actual.is_null(),
        Operator::Eq => compare_values(actual, operand)? == Ordering::Equal,
        Operator::Neq => compare_values(actual, operand)? != Ordering::Equal,
        Operator::Lt => compare_values(actual, operand)? == Ordering::Less,
        Operator::Lte => compare_values(actual, operand)? != Ordering::Greater,
        Operator::Gt => compare_values(actual, operand)? == Ordering::Greater,
        Operator::Gte => compare_values(actual, operand)? != Ordering::Less,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BoundCondition {
    column: String,
    /// None when the column is not declared; reads as null
    position: Option<usize>,
    operator: Operator,
    operand: Value,
}

/// Predicate resolved against a table schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundPredicate {
    conditions: Vec<BoundCondition>,
}

impl BoundPredicate {
    /// Predicate that matches every row
    pub fn all() -> Self {
        Self::default()
    }

    /// Binds `predicate` to `schema`.
    ///
    /// # Errors
    ///
    /// `LEDGER_TYPE_INVALID` when a text operand does not parse as the
    /// column's type.
    pub fn bind(predicate: &RowPredicate, schema: &TableSchema) -> SchemaResult<Self> {
        let mut conditions = Vec::with_capacity(predicate.conditions().len());
        for condition in predicate.conditions() {
            let position = schema.position(&condition.column);
            let operand = match (position, condition.operator.is_null_check()) {
                (Some(pos), false) => schema.columns()[pos]
                    .data_type
                    .bind_operand(&condition.value)
                    .map_err(|e| e.for_column(&condition.column))?,
                _ => condition.value.clone(),
            };
            conditions.push(BoundCondition {
                column: condition.column.clone(),
                position,
                operator: condition.operator,
                operand,
            });
        }
        Ok(Self { conditions })
    }

    /// Tests a row laid out in schema column order.
    pub fn matches(&self, values: &[Value]) -> PredicateResult<bool> {
        for condition in &self.conditions {
            let actual = condition
                .position
                .and_then(|pos| values.get(pos))
                .unwrap_or(&Value::Null);
            let matched = evaluate(condition.operator, actual, &condition.operand)
                .map_err(|e| e.on_column(&condition.column))?;
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// True when the predicate matches every row
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl RowPredicate {
    /// Binds this predicate to a table schema. See [`BoundPredicate::bind`].
    pub fn bind(&self, schema: &TableSchema) -> SchemaResult<BoundPredicate> {
        BoundPredicate::bind(self, schema)
    }
}
