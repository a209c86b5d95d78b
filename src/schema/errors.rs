//! Schema error types
//!
//! Error codes:
//! - LEDGER_SCHEMA_INVALID (REJECT)
//! - LEDGER_TYPE_INVALID (REJECT)

use std::fmt;

use crate::errors::ErrorKind;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Table definition is structurally invalid
    LedgerSchemaInvalid,
    /// A value does not fit its declared column type
    LedgerTypeInvalid,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::LedgerSchemaInvalid => "LEDGER_SCHEMA_INVALID",
            SchemaErrorCode::LedgerTypeInvalid => "LEDGER_TYPE_INVALID",
        }
    }

    /// Returns the taxonomy kind for this code
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchemaErrorCode::LedgerSchemaInvalid => ErrorKind::Validation,
            SchemaErrorCode::LedgerTypeInvalid => ErrorKind::Type,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Column the error refers to, if any
    column: Option<String>,
}

impl SchemaError {
    /// Create an invalid schema error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::LedgerSchemaInvalid,
            message: message.into(),
            column: None,
        }
    }

    /// Create an invalid schema error attributed to one column
    pub fn invalid_column(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::LedgerSchemaInvalid,
            message: message.into(),
            column: Some(column.into()),
        }
    }

    /// Create a type error for a raw value that failed to parse
    pub fn invalid_literal(type_name: &str, raw: &str) -> Self {
        Self {
            code: SchemaErrorCode::LedgerTypeInvalid,
            message: format!("invalid {}: {}", type_name, raw),
            column: None,
        }
    }

    /// Create a type error for a native value of the wrong type
    pub fn type_mismatch(expected: &str, actual: &str) -> Self {
        Self {
            code: SchemaErrorCode::LedgerTypeInvalid,
            message: format!("expected {}, got {}", expected, actual),
            column: None,
        }
    }

    /// Attach the column this error was raised for
    pub fn for_column(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        if self.code == SchemaErrorCode::LedgerTypeInvalid {
            self.message = format!("column {}: {}", column, self.message);
        }
        self.column = Some(column);
        self
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the taxonomy kind
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the column, if the error is attributed to one
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REJECT] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
