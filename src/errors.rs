//! Error taxonomy shared by every ledgerdb subsystem
//!
//! Each subsystem has its own error type; all of them map onto one of the
//! kinds below so boundary layers (shell, HTTP, domain services) can translate
//! failures without matching on concrete types.

use std::fmt;

/// Kind of failure, independent of the subsystem that raised it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed schema, unknown column, empty key lists, duplicate names
    Validation,
    /// Primary-key or unique collision, missing or null non-nullable column
    ConstraintViolation,
    /// A raw value does not parse into its declared column type
    Type,
    /// Referenced table does not exist
    NotFound,
    /// A predicate compared null or mismatched operands
    Comparison,
    /// The write-ahead log cannot be read, written or decoded
    Persistence,
}

impl ErrorKind {
    /// Returns the string code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::ConstraintViolation => "CONSTRAINT_VIOLATION",
            ErrorKind::Type => "TYPE_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Comparison => "COMPARISON_ERROR",
            ErrorKind::Persistence => "PERSISTENCE_ERROR",
        }
    }

    /// Persistence failures leave the engine unable to continue safely
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorKind::Persistence)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_persistence_is_fatal() {
        assert!(ErrorKind::Persistence.is_fatal());
        for kind in [
            ErrorKind::Validation,
            ErrorKind::ConstraintViolation,
            ErrorKind::Type,
            ErrorKind::NotFound,
            ErrorKind::Comparison,
        ] {
            assert!(!kind.is_fatal(), "{} must be recoverable", kind);
        }
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            ErrorKind::Validation.code(),
            ErrorKind::ConstraintViolation.code(),
            ErrorKind::Type.code(),
            ErrorKind::NotFound.code(),
            ErrorKind::Comparison.code(),
            ErrorKind::Persistence.code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
