//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters owned by one engine
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    tables_created: AtomicU64,
    rows_inserted: AtomicU64,
    rows_updated: AtomicU64,
    rows_deleted: AtomicU64,
    writes_rejected: AtomicU64,
    wal_records: AtomicU64,
    wal_append_failures: AtomicU64,
    selects: AtomicU64,
    joins: AtomicU64,
    events_replayed: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_tables_created(&self) {
        self.tables_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_inserted(&self, n: u64) {
        self.rows_inserted.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_rows_updated(&self, n: u64) {
        self.rows_updated.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_rows_deleted(&self, n: u64) {
        self.rows_deleted.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_writes_rejected(&self) {
        self.writes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_wal_records(&self) {
        self.wal_records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_wal_append_failures(&self) {
        self.wal_append_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_selects(&self) {
        self.selects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_joins(&self) {
        self.joins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_events_replayed(&self, n: u64) {
        self.events_replayed.fetch_add(n, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tables_created: self.tables_created.load(Ordering::Relaxed),
            rows_inserted: self.rows_inserted.load(Ordering::Relaxed),
            rows_updated: self.rows_updated.load(Ordering::Relaxed),
            rows_deleted: self.rows_deleted.load(Ordering::Relaxed),
            writes_rejected: self.writes_rejected.load(Ordering::Relaxed),
            wal_records: self.wal_records.load(Ordering::Relaxed),
            wal_append_failures: self.wal_append_failures.load(Ordering::Relaxed),
            selects: self.selects.load(Ordering::Relaxed),
            joins: self.joins.load(Ordering::Relaxed),
            events_replayed: self.events_replayed.load(Ordering::Relaxed),
        }
    }

    /// Current counters as a JSON object
    pub fn to_json(&self) -> String {
        self.snapshot().to_json()
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub tables_created: u64,
    pub rows_inserted: u64,
    pub rows_updated: u64,
    pub rows_deleted: u64,
    pub writes_rejected: u64,
    pub wal_records: u64,
    pub wal_append_failures: u64,
    pub selects: u64,
    pub joins: u64,
    pub events_replayed: u64,
}

impl MetricsSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
