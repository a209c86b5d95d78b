//! Engine subsystem for ledgerdb
//!
//! The `Engine` coordinates the table catalog and the write-ahead log.
//! Live writes and startup replay apply events through the same code, so
//! a replayed log rebuilds exactly the state the writes produced.
//!
//! # Invariants Enforced
//!
//! - An acknowledged mutation is in the log
//! - A rejected mutation changes nothing and is not logged
//! - Zero-row updates and deletes are not logged
//! - Replay never appends

mod apply;
mod catalog;
#[allow(clippy::module_inception)]
mod engine;
mod errors;
mod join;

pub use catalog::Catalog;
pub use engine::Engine;
pub use errors::{EngineError, EngineResult};
