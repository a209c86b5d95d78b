//! Undo journal for a single mutating call
//!
//! Records enough to restore rows, indexes and the id counter to their
//! state before the call. Entries are undone in reverse order.

use super::record::RowRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum JournalEntry {
    /// A new row with this id was stored
    Inserted(u64),
    /// This row was replaced by a new version with the same id
    Replaced(RowRecord),
    /// This row was removed
    Removed(RowRecord),
}

/// Undo log opened by `Table::begin`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journal {
    next_id: u64,
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub(crate) fn new(next_id: u64) -> Self {
        Self {
            next_id,
            entries: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    /// Id counter value when the journal was opened
    pub(crate) fn next_id(&self) -> u64 {
        self.next_id
    }

    pub(crate) fn into_undo(self) -> impl Iterator<Item = JournalEntry> {
        self.entries.into_iter().rev()
    }

    /// Number of recorded changes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
