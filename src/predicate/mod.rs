//! Row predicates
//!
//! Conjunctions of single-column conditions, the comparison rules they
//! evaluate with, and their binding to a table schema.

mod condition;
mod errors;
mod evaluator;

pub use condition::{ColumnLookup, Condition, Operator, RowPredicate};
pub use errors::{PredicateError, PredicateErrorCode, PredicateResult};
pub use evaluator::{compare_values, evaluate, values_match, BoundPredicate};
