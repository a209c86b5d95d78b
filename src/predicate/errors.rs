//! Predicate evaluation errors
//!
//! Error codes:
//! - LEDGER_COMPARE_NULL (REJECT)
//! - LEDGER_COMPARE_INCOMPATIBLE (REJECT)

use std::fmt;

use crate::errors::ErrorKind;

/// Predicate error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateErrorCode {
    /// An ordering operator saw a null on either side
    LedgerCompareNull,
    /// The two operands have no common ordering
    LedgerCompareIncompatible,
}

impl PredicateErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            PredicateErrorCode::LedgerCompareNull => "LEDGER_COMPARE_NULL",
            PredicateErrorCode::LedgerCompareIncompatible => "LEDGER_COMPARE_INCOMPATIBLE",
        }
    }
}

impl fmt::Display for PredicateErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Predicate evaluation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateError {
    code: PredicateErrorCode,
    message: String,
}

impl PredicateError {
    /// Null operand in an ordering comparison
    pub fn null_comparison() -> Self {
        Self {
            code: PredicateErrorCode::LedgerCompareNull,
            message: "cannot compare null values".into(),
        }
    }

    /// Operands of unrelated types
    pub fn not_comparable(left: &str, right: &str) -> Self {
        Self {
            code: PredicateErrorCode::LedgerCompareIncompatible,
            message: format!("values are not comparable: {} vs {}", left, right),
        }
    }

    /// Attach the column being evaluated
    pub fn on_column(mut self, column: &str) -> Self {
        self.message = format!("{} (column {})", self.message, column);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> PredicateErrorCode {
        self.code
    }

    /// Always `ErrorKind::Comparison`
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Comparison
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PredicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REJECT] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for PredicateError {}

/// Result type for predicate evaluation
pub type PredicateResult<T> = Result<T, PredicateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(PredicateError::null_comparison().message(), "cannot compare null values");
        let err = PredicateError::not_comparable("STRING", "INTEGER").on_column("name");
        assert!(err.message().starts_with("values are not comparable"));
        assert!(err.message().ends_with("(column name)"));
        assert_eq!(err.kind(), ErrorKind::Comparison);
    }
}
