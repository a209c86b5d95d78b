//! Event application shared by live writes and replay

use crate::table::{Journal, Table};
use crate::wal::PersistenceEvent;

use super::errors::{EngineError, EngineResult};

/// What a row event did to its table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    Inserted(u64),
    Updated(usize),
    Deleted(usize),
}

impl Effect {
    /// Rows touched by the event
    pub(crate) fn rows(&self) -> usize {
        match self {
            Effect::Inserted(_) => 1,
            Effect::Updated(n) | Effect::Deleted(n) => *n,
        }
    }
}

/// Applies a row event to `table`, recording every change in `journal`.
///
/// `CreateTable` belongs to the catalog and is rejected here.
pub(crate) fn apply_row_event(
    table: &mut Table,
    event: &PersistenceEvent,
    journal: &mut Journal,
) -> EngineResult<Effect> {
    match event {
        PersistenceEvent::CreateTable { table_name, .. } => Err(EngineError::Internal(format!(
            "CREATE_TABLE {} is not a row event",
            table_name
        ))),
        PersistenceEvent::Insert { values, .. } => {
            let id = table.insert_journaled(values.clone(), journal)?;
            Ok(Effect::Inserted(id))
        }
        PersistenceEvent::Update {
            predicate, values, ..
        } => {
            let n = table.update_journaled(Some(predicate), values.clone(), journal)?;
            Ok(Effect::Updated(n))
        }
        PersistenceEvent::Delete { predicate, .. } => {
            let n = table.delete_journaled(Some(predicate), journal)?;
            Ok(Effect::Deleted(n))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Condition, RowPredicate};
    use crate::schema::{DataType, TableSchema, Value, Values};

    fn table() -> Table {
        let schema = TableSchema::builder("t")
            .column("id", DataType::Integer, false)
            .column("name", DataType::String, true)
            .primary_key(["id"])
            .build()
            .unwrap();
        Table::new(schema)
    }

    fn values(id: i64, name: &str) -> Values {
        let mut v = Values::new();
        v.insert("id".into(), Value::Integer(id));
        v.insert("name".into(), Value::from(name));
        v
    }

    #[test]
    fn test_apply_row_events() {
        let mut t = table();
        let mut journal = t.begin();

        let effect = apply_row_event(&mut t, &PersistenceEvent::insert("t", values(1, "a")), &mut journal).unwrap();
        assert_eq!(effect, Effect::Inserted(1));

        let mut set = Values::new();
        set.insert("name".into(), Value::from("b"));
        let update = PersistenceEvent::update("t", Some(RowPredicate::single(Condition::eq("id", 1))), set);
        assert_eq!(apply_row_event(&mut t, &update, &mut journal).unwrap(), Effect::Updated(1));

        let delete = PersistenceEvent::delete("t", None);
        assert_eq!(apply_row_event(&mut t, &delete, &mut journal).unwrap().rows(), 1);
        assert!(t.is_empty());

        t.rollback(journal);
        assert!(t.is_empty());
        assert_eq!(t.next_id(), 1);
    }

    #[test]
    fn test_create_table_is_not_a_row_event() {
        let mut t = table();
        let mut journal = t.begin();
        let event = PersistenceEvent::create_table(t.schema().clone());
        let err = apply_row_event(&mut t, &event, &mut journal).unwrap_err();
        assert!(matches!(err, EngineError::Internal(_)));
        assert!(t.is_empty());
    }

    #[test]
    fn test_empty_predicate_matches_everything() {
        let mut t = table();
        t.insert(values(1, "a")).unwrap();
        t.insert(values(2, "b")).unwrap();

        let mut journal = t.begin();
        let effect = apply_row_event(&mut t, &PersistenceEvent::delete("t", None), &mut journal).unwrap();
        assert_eq!(effect, Effect::Deleted(2));
    }
}
