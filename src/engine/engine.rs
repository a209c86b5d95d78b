//! Engine coordinator
//!
//! The engine owns every table and is the only writer of persistence
//! events. A mutation becomes visible and durable together: it is applied
//! to its table under the table's write lock, the event is appended, and
//! only then is the lock released. A failed append undoes the change and
//! halts the engine: every later mutation fails until it is reopened.
//!
//! Lock order: catalog -> table -> WAL.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use crate::observability::{log_event_with_fields, Event, MetricsRegistry, Severity};
use crate::predicate::RowPredicate;
use crate::recovery::{ReplayStats, Replayer};
use crate::schema::{TableSchema, Values};
use crate::table::Row;
use crate::wal::{MemoryWal, Persistence, PersistenceEvent, WalError, WalErrorCode};

use super::apply::{apply_row_event, Effect};
use super::catalog::{Catalog, TableHandle};
use super::errors::{EngineError, EngineResult};
use super::join::{nested_loop_join, JoinSide};

/// The database engine
pub struct Engine {
    catalog: RwLock<Catalog>,
    wal: Mutex<Box<dyn Persistence>>,
    metrics: MetricsRegistry,
    replay_stats: ReplayStats,
    /// Set by the first failed append
    halted: AtomicBool,
}

impl Engine {
    /// Opens an engine over `persistence`, replaying every logged event.
    ///
    /// A log that cannot be read or replayed is fatal; no engine is returned.
    pub fn open<P: Persistence + 'static>(mut persistence: P) -> EngineResult<Self> {
        let target = persistence.describe();
        log_event_with_fields(Event::EngineOpenBegin, Severity::Info, &[("wal", target.as_str())]);

        let events = match persistence.load_events() {
            Ok(events) => events,
            Err(e) => {
                let event = if e.code() == WalErrorCode::LedgerWalCorruption {
                    Event::WalCorruption
                } else {
                    Event::ReplayFailed
                };
                log_event_with_fields(event, Severity::Fatal, &[("error", e.to_string().as_str())]);
                return Err(e.into());
            }
        };

        let count = events.len().to_string();
        log_event_with_fields(Event::WalReplayBegin, Severity::Info, &[("events", count.as_str())]);

        let mut catalog = Catalog::new();
        let replay_stats = match Replayer::replay(&events, &mut catalog) {
            Ok(stats) => stats,
            Err(e) => {
                log_event_with_fields(Event::ReplayFailed, Severity::Fatal, &[("error", e.to_string().as_str())]);
                return Err(e.into());
            }
        };

        log_event_with_fields(
            Event::WalReplayComplete,
            Severity::Info,
            &[
                ("events", replay_stats.events_replayed.to_string().as_str()),
                ("tables", replay_stats.tables_created.to_string().as_str()),
            ],
        );

        let metrics = MetricsRegistry::new();
        metrics.add_events_replayed(replay_stats.events_replayed);

        let tables = catalog.len().to_string();
        log_event_with_fields(Event::EngineOpenComplete, Severity::Info, &[("tables", tables.as_str())]);

        Ok(Self {
            catalog: RwLock::new(catalog),
            wal: Mutex::new(Box::new(persistence)),
            metrics,
            replay_stats,
            halted: AtomicBool::new(false),
        })
    }

    /// Engine over an empty in-memory log
    pub fn in_memory() -> EngineResult<Self> {
        Self::open(MemoryWal::new())
    }

    /// Creates and logs a table. Fails if the name is taken.
    pub fn create_table(&self, schema: TableSchema) -> EngineResult<()> {
        let name = schema.name().to_string();
        let result = self.create_table_inner(schema);
        match &result {
            Ok(()) => {
                self.metrics.increment_tables_created();
                log_event_with_fields(Event::TableCreated, Severity::Info, &[("table", name.as_str())]);
            }
            Err(e) => self.record_rejection("CREATE_TABLE", &name, e),
        }
        result
    }

    fn create_table_inner(&self, schema: TableSchema) -> EngineResult<()> {
        self.ensure_writable()?;
        let mut catalog = self
            .catalog
            .write()
            .map_err(|_| EngineError::Poisoned("catalog"))?;
        if catalog.contains(schema.name()) {
            return Err(EngineError::TableExists(schema.name().to_string()));
        }
        self.append(&PersistenceEvent::create_table(schema.clone()))?;
        catalog.register(schema);
        Ok(())
    }

    /// Inserts one row; returns its id
    pub fn insert(&self, table: &str, values: Values) -> EngineResult<u64> {
        match self.write(PersistenceEvent::insert(table, values))? {
            Effect::Inserted(id) => Ok(id),
            other => Err(EngineError::Internal(format!(
                "insert produced {:?} instead of a row id",
                other
            ))),
        }
    }

    /// Updates every matching row; returns the count. No predicate matches all rows.
    pub fn update(
        &self,
        table: &str,
        predicate: Option<RowPredicate>,
        values: Values,
    ) -> EngineResult<usize> {
        let effect = self.write(PersistenceEvent::update(table, predicate, values))?;
        Ok(effect.rows())
    }

    /// Deletes every matching row; returns the count. No predicate matches all rows.
    pub fn delete(&self, table: &str, predicate: Option<RowPredicate>) -> EngineResult<usize> {
        let effect = self.write(PersistenceEvent::delete(table, predicate))?;
        Ok(effect.rows())
    }

    /// Matching rows in insertion order, projected to `columns` when given
    pub fn select(
        &self,
        table: &str,
        columns: Option<&[String]>,
        predicate: Option<&RowPredicate>,
    ) -> EngineResult<Vec<Row>> {
        let result = self.select_inner(table, columns, predicate);
        match &result {
            Ok(_) => self.metrics.increment_selects(),
            Err(e) => self.record_query_rejection("SELECT", table, e),
        }
        result
    }

    fn select_inner(
        &self,
        table: &str,
        columns: Option<&[String]>,
        predicate: Option<&RowPredicate>,
    ) -> EngineResult<Vec<Row>> {
        let handle = self.table(table)?;
        let guard = handle.read().map_err(|_| EngineError::Poisoned("table"))?;
        Ok(guard.select(columns, predicate)?)
    }

    /// Inner equality join of `left.left_column` with `right.right_column`.
    ///
    /// Each side is copied under its own read lock; the two copies may
    /// reflect different instants under concurrent writes.
    pub fn join(
        &self,
        left: &str,
        right: &str,
        left_column: &str,
        right_column: &str,
        projection: Option<&[String]>,
    ) -> EngineResult<Vec<Row>> {
        let result = self.join_inner(left, right, left_column, right_column, projection);
        match &result {
            Ok(_) => self.metrics.increment_joins(),
            Err(e) => self.record_query_rejection("JOIN", left, e),
        }
        result
    }

    fn join_inner(
        &self,
        left: &str,
        right: &str,
        left_column: &str,
        right_column: &str,
        projection: Option<&[String]>,
    ) -> EngineResult<Vec<Row>> {
        let left_handle = self.table(left)?;
        let right_handle = self.table(right)?;
        let left_rows = Self::join_snapshot(&left_handle, left, left_column)?;
        let right_rows = Self::join_snapshot(&right_handle, right, right_column)?;

        Ok(nested_loop_join(
            &JoinSide {
                table: left,
                column: left_column,
                rows: &left_rows,
            },
            &JoinSide {
                table: right,
                column: right_column,
                rows: &right_rows,
            },
            projection,
        ))
    }

    fn join_snapshot(handle: &TableHandle, table: &str, column: &str) -> EngineResult<Vec<Row>> {
        let guard = handle.read().map_err(|_| EngineError::Poisoned("table"))?;
        if !guard.schema().has_column(column) {
            return Err(EngineError::UnknownColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        Ok(guard.rows_snapshot())
    }

    /// Schema of `table`, if it exists
    pub fn describe(&self, table: &str) -> EngineResult<Option<TableSchema>> {
        let catalog = self
            .catalog
            .read()
            .map_err(|_| EngineError::Poisoned("catalog"))?;
        let Some(handle) = catalog.get(table) else {
            return Ok(None);
        };
        let guard = handle.read().map_err(|_| EngineError::Poisoned("table"))?;
        Ok(Some(guard.schema().clone()))
    }

    /// Table names in creation order
    pub fn list_tables(&self) -> EngineResult<Vec<String>> {
        let catalog = self
            .catalog
            .read()
            .map_err(|_| EngineError::Poisoned("catalog"))?;
        Ok(catalog.names())
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// What startup replay applied
    pub fn replay_stats(&self) -> ReplayStats {
        self.replay_stats
    }

    fn table(&self, name: &str) -> EngineResult<TableHandle> {
        let catalog = self
            .catalog
            .read()
            .map_err(|_| EngineError::Poisoned("catalog"))?;
        catalog
            .get(name)
            .ok_or_else(|| EngineError::TableNotFound(name.to_string()))
    }

    fn write(&self, event: PersistenceEvent) -> EngineResult<Effect> {
        let result = self.write_inner(&event);
        match &result {
            Ok(effect) => self.record_commit(&event, *effect),
            Err(e) => self.record_rejection(event.type_name(), event.table_name(), e),
        }
        result
    }

    fn write_inner(&self, event: &PersistenceEvent) -> EngineResult<Effect> {
        self.ensure_writable()?;
        let handle = self.table(event.table_name())?;
        let mut table = handle.write().map_err(|_| EngineError::Poisoned("table"))?;

        let mut journal = table.begin();
        let effect = match apply_row_event(&mut table, event, &mut journal) {
            Ok(effect) => effect,
            Err(e) => {
                table.rollback(journal);
                return Err(e);
            }
        };

        // Zero-row updates and deletes are not logged
        if effect.rows() == 0 {
            return Ok(effect);
        }

        if let Err(e) = self.append(event) {
            table.rollback(journal);
            return Err(e);
        }
        Ok(effect)
    }

    /// True once a failed append has stopped all writes
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    fn ensure_writable(&self) -> EngineResult<()> {
        if self.is_halted() {
            return Err(WalError::unavailable("engine halted after a failed WAL append; reopen to continue").into());
        }
        Ok(())
    }

    fn append(&self, event: &PersistenceEvent) -> EngineResult<u64> {
        let mut wal = self.wal.lock().map_err(|_| EngineError::Poisoned("wal"))?;
        // Rechecked under the lock: another table's write may have failed meanwhile
        self.ensure_writable()?;
        match wal.append_event(event) {
            Ok(sequence) => {
                self.metrics.increment_wal_records();
                log_event_with_fields(
                    Event::WalAppend,
                    Severity::Trace,
                    &[
                        ("sequence", sequence.to_string().as_str()),
                        ("table", event.table_name()),
                        ("type", event.type_name()),
                    ],
                );
                Ok(sequence)
            }
            Err(e) => {
                self.halted.store(true, Ordering::SeqCst);
                self.metrics.increment_wal_append_failures();
                log_event_with_fields(
                    Event::WalAppendFailed,
                    Severity::Error,
                    &[
                        ("error", e.to_string().as_str()),
                        ("table", event.table_name()),
                        ("type", event.type_name()),
                    ],
                );
                Err(e.into())
            }
        }
    }

    fn record_commit(&self, event: &PersistenceEvent, effect: Effect) {
        let rows = effect.rows() as u64;
        match effect {
            Effect::Inserted(_) => self.metrics.add_rows_inserted(rows),
            Effect::Updated(_) => self.metrics.add_rows_updated(rows),
            Effect::Deleted(_) => self.metrics.add_rows_deleted(rows),
        }
        log_event_with_fields(
            Event::WriteCommit,
            Severity::Trace,
            &[
                ("rows", rows.to_string().as_str()),
                ("table", event.table_name()),
                ("type", event.type_name()),
            ],
        );
    }

    fn record_rejection(&self, op: &str, table: &str, err: &EngineError) {
        self.metrics.increment_writes_rejected();
        log_event_with_fields(
            Event::WriteRejected,
            Severity::Warn,
            &[
                ("code", err.code()),
                ("error", err.to_string().as_str()),
                ("table", table),
                ("type", op),
            ],
        );
    }

    fn record_query_rejection(&self, op: &str, table: &str, err: &EngineError) {
        log_event_with_fields(
            Event::QueryRejected,
            Severity::Warn,
            &[
                ("code", err.code()),
                ("error", err.to_string().as_str()),
                ("table", table),
                ("type", op),
            ],
        );
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("replay_stats", &self.replay_stats)
            .finish_non_exhaustive()
    }
}
