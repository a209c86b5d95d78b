//! Interactive shell
//!
//! One command per line. Results print as JSON or a short status line;
//! a failed command prints `Error: <message>` and the shell continues.
//!
//! Filters are comma-separated `col<op>val` terms joined by AND, with
//! `<op>` one of `=`, `!=`, `<`, `<=`, `>`, `>=`. `col=null` tests IS NULL
//! and `col!=null` tests IS NOT NULL. Values that parse as integers are
//! integers, anything else is text.

use std::io::{BufRead, Write};

use serde::Deserialize;

use crate::engine::Engine;
use crate::predicate::{Condition, Operator, RowPredicate};
use crate::schema::{ColumnDef, DataType, TableSchema, Value, Values};

use super::errors::{CliError, CliResult};

pub const HELP: &str = "\
help
  Show this help
tables
  List tables
describe <table>
  Show the schema of a table
create <table> <schemaJson>
  {\"columns\":[{\"name\":\"id\",\"type\":\"INT\"},{\"name\":\"name\",\"type\":\"STRING\",\"nullable\":true}],\"primaryKey\":[\"id\"],\"unique\":[[\"name\"]]}
insert <table> <json>
  insert customers {\"id\":3,\"name\":\"Carol\",\"created_at\":\"2024-02-01T00:00:00Z\"}
select <table> [cols|*] [filters]
  select customers id,name id>=1,name!=null
update <table> <filters> <json>
  update customers id=3 {\"name\":\"Caroline\"}
delete <table> <filters>
  delete customers id=3
join <left> <right> <leftCol> <rightCol> [proj1,proj2]
  join customers orders id customer_id customers.name,orders.amount
metrics
  Show engine counters
quit | exit
  Leave the shell";

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Tables,
    Describe(String),
    Create(TableSchema),
    Insert {
        table: String,
        values: Values,
    },
    Select {
        table: String,
        columns: Option<Vec<String>>,
        predicate: Option<RowPredicate>,
    },
    Update {
        table: String,
        predicate: RowPredicate,
        values: Values,
    },
    Delete {
        table: String,
        predicate: RowPredicate,
    },
    Join {
        left: String,
        right: String,
        left_column: String,
        right_column: String,
        projection: Option<Vec<String>>,
    },
    Metrics,
    Quit,
}

#[derive(Deserialize)]
struct SchemaRequest {
    columns: Vec<ColumnRequest>,
    #[serde(rename = "primaryKey")]
    primary_key: Vec<String>,
    #[serde(default)]
    unique: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct ColumnRequest {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    nullable: bool,
}

impl ShellCommand {
    /// Parses one non-empty line
    pub fn parse(line: &str) -> CliResult<Self> {
        let (head, rest) = split_token(line.trim());
        match head.to_ascii_lowercase().as_str() {
            "help" => Ok(ShellCommand::Help),
            "tables" => Ok(ShellCommand::Tables),
            "metrics" => Ok(ShellCommand::Metrics),
            "quit" | "exit" => Ok(ShellCommand::Quit),
            "describe" => {
                let (table, _) = require_token(rest, "describe <table>")?;
                Ok(ShellCommand::Describe(table.to_string()))
            }
            "create" => {
                let usage = "create <table> <schemaJson>";
                let (table, json) = require_token(rest, usage)?;
                let schema = parse_schema(table, require_rest(json, usage)?)?;
                Ok(ShellCommand::Create(schema))
            }
            "insert" => {
                let usage = "insert <table> <json>";
                let (table, json) = require_token(rest, usage)?;
                Ok(ShellCommand::Insert {
                    table: table.to_string(),
                    values: serde_json::from_str(require_rest(json, usage)?)?,
                })
            }
            "select" => parse_select(rest),
            "update" => {
                let usage = "update <table> <filters> <json>";
                let (table, rest) = require_token(rest, usage)?;
                let (filters, json) = require_token(rest, usage)?;
                Ok(ShellCommand::Update {
                    table: table.to_string(),
                    predicate: parse_filters(filters)?,
                    values: serde_json::from_str(require_rest(json, usage)?)?,
                })
            }
            "delete" => {
                let usage = "delete <table> <filters>";
                let (table, filters) = require_token(rest, usage)?;
                Ok(ShellCommand::Delete {
                    table: table.to_string(),
                    predicate: parse_filters(require_rest(filters, usage)?)?,
                })
            }
            "join" => parse_join(rest),
            other => Err(CliError::usage(format!("unknown command: {}", other))),
        }
    }
}

fn parse_schema(table: &str, json: &str) -> CliResult<TableSchema> {
    let request: SchemaRequest = serde_json::from_str(json)?;
    let mut columns = Vec::with_capacity(request.columns.len());
    for column in request.columns {
        let data_type: DataType = column.type_name.parse()?;
        columns.push(ColumnDef::new(column.name, data_type, column.nullable));
    }
    Ok(TableSchema::new(
        table,
        columns,
        request.primary_key,
        request.unique,
    )?)
}

fn parse_select(rest: &str) -> CliResult<ShellCommand> {
    let usage = "select <table> [cols|*] [filters]";
    let (table, rest) = require_token(rest, usage)?;
    let (first, rest) = split_token(rest);

    // A lone filter list may follow the table directly
    let (columns, filters) = if is_filter_list(first) && rest.is_empty() {
        (None, first)
    } else {
        (parse_columns(first), rest)
    };
    let predicate = if filters.is_empty() {
        None
    } else {
        Some(parse_filters(filters)?)
    };

    Ok(ShellCommand::Select {
        table: table.to_string(),
        columns,
        predicate,
    })
}

fn parse_join(rest: &str) -> CliResult<ShellCommand> {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.len() < 4 || parts.len() > 5 {
        return Err(CliError::usage(
            "Usage: join <left> <right> <leftCol> <rightCol> [proj1,proj2]",
        ));
    }
    Ok(ShellCommand::Join {
        left: parts[0].to_string(),
        right: parts[1].to_string(),
        left_column: parts[2].to_string(),
        right_column: parts[3].to_string(),
        projection: parts.get(4).and_then(|p| parse_columns(p)),
    })
}

/// `*` or an empty list means every column
pub fn parse_columns(csv: &str) -> Option<Vec<String>> {
    if csv.trim() == "*" {
        return None;
    }
    let columns: Vec<String> = csv
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if columns.is_empty() {
        None
    } else {
        Some(columns)
    }
}

/// Parses `col<op>val[,col<op>val...]`
pub fn parse_filters(expr: &str) -> CliResult<RowPredicate> {
    let mut conditions = Vec::new();
    for term in expr.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        conditions.push(parse_filter(term)?);
    }
    if conditions.is_empty() {
        return Err(CliError::usage("filter list must not be empty"));
    }
    Ok(RowPredicate::new(conditions))
}

fn parse_filter(term: &str) -> CliResult<Condition> {
    let bad = || CliError::usage(format!("invalid filter '{}': expected col<op>val", term));

    let pos = term.find(is_operator_char).ok_or_else(bad)?;
    let (column, rest) = term.split_at(pos);
    let column = column.trim();
    if column.is_empty() {
        return Err(bad());
    }

    let (operator, raw) = if let Some(raw) = rest.strip_prefix("!=") {
        (Operator::Neq, raw)
    } else if let Some(raw) = rest.strip_prefix("<=") {
        (Operator::Lte, raw)
    } else if let Some(raw) = rest.strip_prefix(">=") {
        (Operator::Gte, raw)
    } else if let Some(raw) = rest.strip_prefix('=') {
        (Operator::Eq, raw)
    } else if let Some(raw) = rest.strip_prefix('<') {
        (Operator::Lt, raw)
    } else if let Some(raw) = rest.strip_prefix('>') {
        (Operator::Gt, raw)
    } else {
        return Err(bad());
    };

    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("null") {
        return match operator {
            Operator::Eq => Ok(Condition::is_null(column)),
            Operator::Neq => Ok(Condition::is_not_null(column)),
            _ => Err(CliError::usage(format!(
                "null can only be tested with = or != in '{}'",
                term
            ))),
        };
    }
    Ok(Condition::new(column, operator, parse_value(raw)))
}

/// Integer when the text parses as one, text otherwise
pub fn parse_value(raw: &str) -> Value {
    raw.parse::<i64>()
        .map(Value::Integer)
        .unwrap_or_else(|_| Value::from(raw))
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '=' | '!' | '<' | '>')
}

fn is_filter_list(token: &str) -> bool {
    token.contains(is_operator_char)
}

fn split_token(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(idx) => (&input[..idx], input[idx..].trim()),
        None => (input, ""),
    }
}

fn require_token<'a>(input: &'a str, usage: &str) -> CliResult<(&'a str, &'a str)> {
    let (token, rest) = split_token(input);
    if token.is_empty() {
        return Err(CliError::usage(format!("Usage: {}", usage)));
    }
    Ok((token, rest))
}

fn require_rest<'a>(rest: &'a str, usage: &str) -> CliResult<&'a str> {
    if rest.trim().is_empty() {
        return Err(CliError::usage(format!("Usage: {}", usage)));
    }
    Ok(rest)
}

/// Runs `command` against `engine`, returning the text to print.
pub fn execute(engine: &Engine, command: ShellCommand) -> CliResult<String> {
    match command {
        ShellCommand::Help => Ok(HELP.to_string()),
        ShellCommand::Tables => Ok(engine.list_tables()?.join("\n")),
        ShellCommand::Describe(table) => match engine.describe(&table)? {
            Some(schema) => Ok(serde_json::to_string_pretty(&schema)?),
            None => Ok("Table not found".to_string()),
        },
        ShellCommand::Create(schema) => {
            let name = schema.name().to_string();
            engine.create_table(schema)?;
            Ok(format!("Created table: {}", name))
        }
        ShellCommand::Insert { table, values } => {
            let id = engine.insert(&table, values)?;
            Ok(format!("Inserted row {}", id))
        }
        ShellCommand::Select {
            table,
            columns,
            predicate,
        } => {
            let rows = engine.select(&table, columns.as_deref(), predicate.as_ref())?;
            Ok(serde_json::to_string_pretty(&rows)?)
        }
        ShellCommand::Update {
            table,
            predicate,
            values,
        } => {
            let n = engine.update(&table, Some(predicate), values)?;
            Ok(format!("Updated: {}", n))
        }
        ShellCommand::Delete { table, predicate } => {
            let n = engine.delete(&table, Some(predicate))?;
            Ok(format!("Deleted: {}", n))
        }
        ShellCommand::Join {
            left,
            right,
            left_column,
            right_column,
            projection,
        } => {
            let rows = engine.join(
                &left,
                &right,
                &left_column,
                &right_column,
                projection.as_deref(),
            )?;
            Ok(serde_json::to_string_pretty(&rows)?)
        }
        ShellCommand::Metrics => Ok(engine.metrics().to_json()),
        ShellCommand::Quit => Ok(String::new()),
    }
}

/// Reads commands from `input` until `quit`, `exit` or EOF.
///
/// Command errors are printed and the loop continues, except for
/// persistence failures, which stop the shell and are returned.
/// Returns the number of commands executed.
pub fn run_shell<R: BufRead, W: Write>(engine: &Engine, input: R, output: &mut W) -> CliResult<usize> {
    let mut executed = 0;
    write!(output, "> ")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            write!(output, "> ")?;
            output.flush()?;
            continue;
        }

        let result = ShellCommand::parse(line).and_then(|command| {
            if command == ShellCommand::Quit {
                return Ok(None);
            }
            execute(engine, command).map(Some)
        });
        executed += 1;

        match result {
            Ok(None) => return Ok(executed),
            Ok(Some(text)) => {
                if !text.is_empty() {
                    writeln!(output, "{}", text)?;
                }
            }
            Err(e) if e.is_fatal() => {
                writeln!(output, "Error: {}", e)?;
                return Err(e);
            }
            Err(e) => writeln!(output, "Error: {}", e)?,
        }
        write!(output, "> ")?;
        output.flush()?;
    }
    Ok(executed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::MemoryWal;

    fn engine() -> Engine {
        let engine = Engine::in_memory().unwrap();
        execute(
            &engine,
            ShellCommand::parse(
                r#"create people {"columns":[{"name":"id","type":"int"},{"name":"name","type":"STRING","nullable":true}],"primaryKey":["id"]}"#,
            )
            .unwrap(),
        )
        .unwrap();
        engine
    }

    fn run(engine: &Engine, script: &str) -> String {
        let mut out = Vec::new();
        run_shell(engine, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_filters() {
        let predicate = parse_filters("id>=2,name!=null,state=ACTIVE,n<-5").unwrap();
        assert_eq!(
            predicate.conditions(),
            &[
                Condition::gte("id", 2),
                Condition::is_not_null("name"),
                Condition::eq("state", "ACTIVE"),
                Condition::lt("n", -5),
            ]
        );
        assert_eq!(
            parse_filters("x=NULL").unwrap().conditions(),
            &[Condition::is_null("x")]
        );
    }

    #[test]
    fn test_parse_filters_rejects_garbage() {
        assert!(parse_filters("id").is_err());
        assert!(parse_filters("=1").is_err());
        assert!(parse_filters("").is_err());
        assert!(parse_filters("id<null").is_err());
    }

    #[test]
    fn test_parse_select_forms() {
        assert_eq!(
            ShellCommand::parse("select t").unwrap(),
            ShellCommand::Select {
                table: "t".into(),
                columns: None,
                predicate: None
            }
        );
        assert_eq!(
            ShellCommand::parse("select t * id=1").unwrap(),
            ShellCommand::Select {
                table: "t".into(),
                columns: None,
                predicate: Some(RowPredicate::single(Condition::eq("id", 1)))
            }
        );
        assert_eq!(
            ShellCommand::parse("SELECT t id=1").unwrap(),
            ShellCommand::Select {
                table: "t".into(),
                columns: None,
                predicate: Some(RowPredicate::single(Condition::eq("id", 1)))
            }
        );
        assert_eq!(
            ShellCommand::parse("select t id,name").unwrap(),
            ShellCommand::Select {
                table: "t".into(),
                columns: Some(vec!["id".into(), "name".into()]),
                predicate: None
            }
        );
    }

    #[test]
    fn test_parse_usage_errors() {
        assert!(ShellCommand::parse("describe").is_err());
        assert!(ShellCommand::parse("insert t").is_err());
        assert!(ShellCommand::parse("update t id=1").is_err());
        assert!(ShellCommand::parse("delete t").is_err());
        assert!(ShellCommand::parse("join a b c").is_err());
        assert!(ShellCommand::parse("frobnicate").is_err());
        assert!(ShellCommand::parse("insert t [1,2]").is_err());
    }

    #[test]
    fn test_parse_create_validates_schema() {
        assert!(ShellCommand::parse(r#"create t {"columns":[{"name":"id","type":"INT"}],"primaryKey":[]}"#).is_err());
        assert!(ShellCommand::parse(r#"create t {"columns":[{"name":"id","type":"FLOAT"}],"primaryKey":["id"]}"#).is_err());
        assert!(ShellCommand::parse(r#"create t {"columns":[{"name":"id","type":"INT"}]}"#).is_err());
    }

    #[test]
    fn test_execute_round() {
        let engine = engine();
        let out = execute(&engine, ShellCommand::parse(r#"insert people {"id":1,"name":"Alice"}"#).unwrap()).unwrap();
        assert_eq!(out, "Inserted row 1");

        let out = execute(&engine, ShellCommand::parse("select people name id=1").unwrap()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, serde_json::json!([{"name": "Alice"}]));

        let out = execute(&engine, ShellCommand::parse(r#"update people id=1 {"name":"Al"}"#).unwrap()).unwrap();
        assert_eq!(out, "Updated: 1");

        let out = execute(&engine, ShellCommand::parse("delete people id=1").unwrap()).unwrap();
        assert_eq!(out, "Deleted: 1");

        assert_eq!(execute(&engine, ShellCommand::Tables).unwrap(), "people");
        assert_eq!(
            execute(&engine, ShellCommand::Describe("nope".into())).unwrap(),
            "Table not found"
        );
    }

    #[test]
    fn test_shell_reports_errors_and_continues() {
        let engine = engine();
        let out = run(
            &engine,
            "insert people {\"id\":1}\n\ninsert people {\"id\":1}\nselect ghost\ntables\nquit\ntables\n",
        );
        assert!(out.contains("Inserted row 1"));
        assert!(out.contains("Error: unique constraint violation on [id] in table people"));
        assert!(out.contains("Error: table not found: ghost"));
        let listed = out
            .lines()
            .filter(|l| l.trim_start_matches("> ") == "people")
            .count();
        assert_eq!(listed, 1);
    }

    #[test]
    fn test_shell_stops_on_persistence_failure() {
        let wal = MemoryWal::new();
        let engine = Engine::open(wal.clone()).unwrap();
        wal.set_fail_appends(true);

        let mut out = Vec::new();
        let err = run_shell(
            &engine,
            "create t {\"columns\":[{\"name\":\"id\",\"type\":\"INT\"}],\"primaryKey\":[\"id\"]}\ntables\n".as_bytes(),
            &mut out,
        )
        .unwrap_err();
        assert!(err.is_fatal());
        assert!(out.starts_with(b"> Error: "));
        assert!(engine.list_tables().unwrap().is_empty());
    }
}
