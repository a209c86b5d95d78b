//! Tables
//!
//! A `Table` owns its rows and unique indexes and enforces the schema's
//! nullability, type and uniqueness rules on every write.

mod errors;
mod index;
mod journal;
mod record;
#[allow(clippy::module_inception)]
mod table;

pub use errors::{TableError, TableResult};
pub use index::{IndexKey, UniqueIndex};
pub use journal::Journal;
pub use record::{Row, RowRecord};
pub use table::{Table, FIRST_ROW_ID};
