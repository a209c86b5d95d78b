//! Schema subsystem for ledgerdb
//!
//! Typed values, column types with their coercion rules, and the validated
//! table schema every table is created from.
//!
//! # Design Principles
//!
//! - Schemas are validated once, at construction, and never mutated
//! - Parsing failure is an error, never a silent default
//! - Timestamps live in memory as epoch milliseconds

mod errors;
mod table_schema;
mod types;
mod value;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use table_schema::{TableSchema, TableSchemaBuilder};
pub use types::{ColumnDef, DataType};
pub use value::{Value, Values};
