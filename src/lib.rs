//! ledgerdb - an embeddable, schema-enforcing table store
//!
//! Tables with typed columns, primary keys and unique constraints, kept in
//! memory and made durable by a JSON-lines write-ahead log that is replayed
//! in full at startup.
//!
//! ```ignore
//! use ledgerdb::engine::Engine;
//! use ledgerdb::schema::{DataType, TableSchema};
//! use ledgerdb::wal::FileWal;
//!
//! let engine = Engine::open(FileWal::open_default("data".as_ref())?)?;
//! engine.create_table(
//!     TableSchema::builder("customers")
//!         .column("id", DataType::Integer, false)
//!         .column("name", DataType::String, false)
//!         .primary_key(["id"])
//!         .build()?,
//! )?;
//! ```

pub mod cli;
pub mod engine;
pub mod errors;
pub mod observability;
pub mod predicate;
pub mod recovery;
pub mod schema;
pub mod table;
pub mod wal;
