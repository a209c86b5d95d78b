//! Nested-loop equality join over two row snapshots

use crate::predicate::values_match;
use crate::schema::Value;
use crate::table::Row;

/// One side of a join: table name, join column, and a copy of its rows
pub(crate) struct JoinSide<'a> {
    pub table: &'a str,
    pub column: &'a str,
    pub rows: &'a [Row],
}

/// Inner join of `left` and `right` on equal join-column values.
///
/// Output keys are `table.column`; the right side wins on a shared key
/// (self-join). A non-empty `projection` keeps exactly those keys.
pub(crate) fn nested_loop_join(
    left: &JoinSide<'_>,
    right: &JoinSide<'_>,
    projection: Option<&[String]>,
) -> Vec<Row> {
    let mut result = Vec::new();
    for l in left.rows {
        let lv = l.get(left.column).unwrap_or(&Value::Null);
        for r in right.rows {
            let rv = r.get(right.column).unwrap_or(&Value::Null);
            if !values_match(lv, rv) {
                continue;
            }
            let merged = merge(left.table, l, right.table, r);
            match projection {
                Some(cols) if !cols.is_empty() => result.push(merged.project(cols)),
                _ => result.push(merged),
            }
        }
    }
    result
}

fn merge(left_table: &str, left: &Row, right_table: &str, right: &Row) -> Row {
    let mut merged = Row::default();
    for (column, value) in left.iter() {
        merged.set(format!("{}.{}", left_table, column), value.clone());
    }
    for (column, value) in right.iter() {
        merged.set(format!("{}.{}", right_table, column), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        Row::from_pairs(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())))
    }

    #[test]
    fn test_join_pairs_equal_values() {
        let a = vec![
            row(&[("id", Value::Integer(1)), ("x", Value::Integer(5))]),
            row(&[("id", Value::Integer(2)), ("x", Value::Integer(7))]),
        ];
        let b = vec![
            row(&[("id", Value::Integer(10)), ("x", Value::Integer(5))]),
            row(&[("id", Value::Integer(11)), ("x", Value::Integer(9))]),
        ];
        let out = nested_loop_join(
            &JoinSide { table: "a", column: "x", rows: &a },
            &JoinSide { table: "b", column: "x", rows: &b },
            None,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("a.id"), Some(&Value::Integer(1)));
        assert_eq!(out[0].get("b.id"), Some(&Value::Integer(10)));
        assert_eq!(
            out[0].column_names().collect::<Vec<_>>(),
            vec!["a.id", "a.x", "b.id", "b.x"]
        );
    }

    #[test]
    fn test_join_nulls_match_only_nulls() {
        let a = vec![row(&[("k", Value::Null)]), row(&[("k", Value::from("v"))])];
        let b = vec![row(&[("k", Value::Null)])];
        let out = nested_loop_join(
            &JoinSide { table: "a", column: "k", rows: &a },
            &JoinSide { table: "b", column: "k", rows: &b },
            None,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("a.k"), Some(&Value::Null));
    }

    #[test]
    fn test_join_projection_and_self_join() {
        let t = vec![row(&[("id", Value::Integer(1)), ("name", Value::from("x"))])];
        let projection = vec!["t.name".to_string(), "t.missing".to_string()];
        let out = nested_loop_join(
            &JoinSide { table: "t", column: "id", rows: &t },
            &JoinSide { table: "t", column: "id", rows: &t },
            Some(&projection),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 2);
        assert_eq!(out[0].get("t.name"), Some(&Value::from("x")));
        assert_eq!(out[0].get("t.missing"), Some(&Value::Null));
    }
}
