//! Sample data for a fresh data directory

use crate::engine::{Engine, EngineResult};
use crate::schema::{DataType, TableSchema, Value, Values};

/// Creates the `customers` and `orders` tables with two rows each.
pub fn seed_sample_data(engine: &Engine) -> EngineResult<()> {
    let customers = TableSchema::builder("customers")
        .column("id", DataType::Integer, false)
        .column("name", DataType::String, false)
        .column("created_at", DataType::Timestamp, false)
        .primary_key(["id"])
        .build()?;
    let orders = TableSchema::builder("orders")
        .column("id", DataType::Integer, false)
        .column("customer_id", DataType::Integer, false)
        .column("amount", DataType::Integer, false)
        .column("created_at", DataType::Timestamp, false)
        .primary_key(["id"])
        .build()?;

    engine.create_table(customers)?;
    engine.create_table(orders)?;

    engine.insert("customers", customer(1, "Alice", "2024-01-01T00:00:00Z"))?;
    engine.insert("customers", customer(2, "Bob", "2024-01-02T00:00:00Z"))?;
    engine.insert("orders", order(100, 1, 2500, "2024-01-03T00:00:00Z"))?;
    engine.insert("orders", order(101, 2, 1500, "2024-01-04T00:00:00Z"))?;
    Ok(())
}

fn customer(id: i64, name: &str, created_at: &str) -> Values {
    let mut v = Values::new();
    v.insert("id".into(), Value::Integer(id));
    v.insert("name".into(), Value::from(name));
    v.insert("created_at".into(), Value::from(created_at));
    v
}

fn order(id: i64, customer_id: i64, amount: i64, created_at: &str) -> Values {
    let mut v = Values::new();
    v.insert("id".into(), Value::Integer(id));
    v.insert("customer_id".into(), Value::Integer(customer_id));
    v.insert("amount".into(), Value::Integer(amount));
    v.insert("created_at".into(), Value::from(created_at));
    v
}
