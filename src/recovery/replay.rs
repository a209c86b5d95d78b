//! WAL replay
//!
//! Replay is a fold over the event sequence: `state' = apply(state, event)`,
//! strictly in log order, starting from the first event. Any failure is
//! fatal and aborts immediately; nothing is skipped.

use crate::wal::PersistenceEvent;

use super::errors::RecoveryResult;

/// Target of replay
pub trait ApplyEvent {
    /// Apply one logged event. `sequence` is its 1-based position in the log.
    fn apply_event(&mut self, sequence: u64, event: &PersistenceEvent) -> RecoveryResult<()>;
}

/// Statistics from WAL replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Number of events replayed
    pub events_replayed: u64,
    /// Number of CREATE_TABLE events
    pub tables_created: u64,
    /// Number of inserts
    pub inserts: u64,
    /// Number of updates
    pub updates: u64,
    /// Number of deletes
    pub deletes: u64,
}

impl ReplayStats {
    fn record(&mut self, event: &PersistenceEvent) {
        self.events_replayed += 1;
        match event {
            PersistenceEvent::CreateTable { .. } => self.tables_created += 1,
            PersistenceEvent::Insert { .. } => self.inserts += 1,
            PersistenceEvent::Update { .. } => self.updates += 1,
            PersistenceEvent::Delete { .. } => self.deletes += 1,
        }
    }
}

/// Replays events into an `ApplyEvent` target
pub struct Replayer;

impl Replayer {
    /// Applies every event in order.
    ///
    /// Replaying the same events into an empty target twice produces
    /// identical state.
    pub fn replay<S: ApplyEvent + ?Sized>(
        events: &[PersistenceEvent],
        target: &mut S,
    ) -> RecoveryResult<ReplayStats> {
        let mut stats = ReplayStats::default();
        for (index, event) in events.iter().enumerate() {
            target.apply_event(index as u64 + 1, event)?;
            stats.record(event);
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::errors::{RecoveryError, RecoveryErrorCode};
    use crate::schema::Values;

    struct MockTarget {
        applied: Vec<(u64, String)>,
        fail_at: Option<u64>,
    }

    impl MockTarget {
        fn new() -> Self {
            Self {
                applied: Vec::new(),
                fail_at: None,
            }
        }
    }

    impl ApplyEvent for MockTarget {
        fn apply_event(&mut self, sequence: u64, event: &PersistenceEvent) -> RecoveryResult<()> {
            if self.fail_at == Some(sequence) {
                return Err(RecoveryError::table_missing(sequence, event.table_name()));
            }
            self.applied.push((sequence, event.type_name().to_string()));
            Ok(())
        }
    }

    fn events() -> Vec<PersistenceEvent> {
        vec![
            PersistenceEvent::insert("t", Values::new()),
            PersistenceEvent::update("t", None, Values::new()),
            PersistenceEvent::delete("t", None),
            PersistenceEvent::insert("t", Values::new()),
        ]
    }

    #[test]
    fn test_replay_applies_in_order() {
        let mut target = MockTarget::new();
        let stats = Replayer::replay(&events(), &mut target).unwrap();

        assert_eq!(stats.events_replayed, 4);
        assert_eq!(stats.inserts, 2);
        assert_eq!(stats.updates, 1);
        assert_eq!(stats.deletes, 1);
        assert_eq!(target.applied[0], (1, "INSERT".to_string()));
        assert_eq!(target.applied[2], (3, "DELETE".to_string()));
    }

    #[test]
    fn test_replay_halts_on_first_failure() {
        let mut target = MockTarget::new();
        target.fail_at = Some(2);

        let err = Replayer::replay(&events(), &mut target).unwrap_err();
        assert_eq!(err.code(), RecoveryErrorCode::LedgerRecoveryTableMissing);
        assert_eq!(err.sequence(), Some(2));
        assert_eq!(target.applied.len(), 1);
    }

    #[test]
    fn test_empty_log() {
        let mut target = MockTarget::new();
        let stats = Replayer::replay(&[], &mut target).unwrap();
        assert_eq!(stats, ReplayStats::default());
    }
}
