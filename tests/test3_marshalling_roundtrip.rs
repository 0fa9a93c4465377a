use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::json;
use sqlite_storage_adapter::prelude::*;

fn events(adapter: &Arc<SqliteAdapter>) -> Schema {
    Schema::new(
        "events",
        vec![
            Field::new("id", FieldKind::Integer),
            Field::new("label", FieldKind::Varchar),
            Field::new("active", FieldKind::Boolean),
            Field::new("meta", FieldKind::Json),
            Field::new("seen", FieldKind::Datetime),
            Field::new("ratio", FieldKind::Double),
            Field::new("payload", FieldKind::Blob),
        ],
        Arc::clone(adapter),
    )
}

#[tokio::test]
async fn typed_values_survive_a_trip_through_the_database() -> Result<(), SqliteAdapterError> {
    let adapter = Arc::new(SqliteAdapter::new(":memory:"));
    adapter.connect().await?;
    let schema = events(&adapter);
    adapter.create(&schema).execute().await?;

    let seen = Utc
        .timestamp_millis_opt(1_700_000_000_123)
        .single()
        .expect("valid timestamp");
    let meta = json!({"tags": ["a", "b"], "depth": 2, "nested": {"ok": true}});

    let mut replace = adapter.replace(&schema);
    replace.add(
        Record::new()
            .with("id", 1_i64)
            .with("label", "first")
            .with("active", true)
            .with("meta", meta.clone())
            .with("seen", seen)
            .with("ratio", 0.25_f64)
            .with("payload", vec![0_u8, 1, 2, 255]),
    );
    replace.add(Record::new().with("id", 2_i64).with("active", false));
    replace.save().await?;

    let rows = adapter
        .select(&schema)
        .order("id", Direction::Asc)
        .all()
        .await?;
    assert_eq!(rows.len(), 2);

    let first = &rows[0];
    assert_eq!(first.get("label"), Some(&FieldValue::Text("first".into())));
    assert_eq!(first.get("active"), Some(&FieldValue::Bool(true)));
    assert_eq!(first.get("meta"), Some(&FieldValue::Json(meta)));
    assert_eq!(first.get("seen"), Some(&FieldValue::Timestamp(seen)));
    assert_eq!(first.get("ratio"), Some(&FieldValue::Float(0.25)));
    assert_eq!(
        first.get("payload"),
        Some(&FieldValue::Blob(vec![0, 1, 2, 255]))
    );

    let second = &rows[1];
    assert_eq!(second.get("active"), Some(&FieldValue::Bool(false)));
    assert_eq!(second.get("meta"), Some(&FieldValue::Absent));
    assert_eq!(second.get("seen"), Some(&FieldValue::Absent));
    assert_eq!(second.get("label"), Some(&FieldValue::Absent));

    adapter.close().await?;
    Ok(())
}

#[tokio::test]
async fn storage_representation_is_primitive() -> Result<(), SqliteAdapterError> {
    let adapter = Arc::new(SqliteAdapter::new(":memory:"));
    adapter.connect().await?;
    let schema = events(&adapter);
    adapter.create(&schema).execute().await?;

    let seen = Utc
        .timestamp_millis_opt(1_700_000_000_123)
        .single()
        .expect("valid timestamp");
    let mut insert = adapter.insert(&schema);
    insert.add(
        Record::new()
            .with("id", 1_i64)
            .with("active", true)
            .with("meta", json!({"k": 1}))
            .with("seen", seen),
    );
    insert.execute().await?;

    let raw = adapter
        .get("SELECT active, meta, seen FROM events", vec![])
        .await?
        .expect("row");
    assert_eq!(raw.get("active"), Some(&Value::Integer(1)));
    assert_eq!(raw.get("meta"), Some(&Value::Text(r#"{"k":1}"#.into())));
    assert_eq!(raw.get("seen"), Some(&Value::Integer(1_700_000_000_123)));

    adapter.close().await?;
    Ok(())
}

#[tokio::test]
async fn loosely_stored_values_are_normalized_on_read() -> Result<(), SqliteAdapterError> {
    let adapter = Arc::new(SqliteAdapter::new(":memory:"));
    adapter.connect().await?;
    let schema = events(&adapter);
    adapter.create(&schema).execute().await?;

    adapter
        .run(
            "INSERT INTO events (id, active, seen) VALUES (?, ?, ?)",
            vec![
                Value::Text("42px".into()),
                Value::Text("true".into()),
                Value::Text("2023-11-14 22:13:20.123".into()),
            ],
        )
        .await?;

    let record = adapter
        .select(&schema)
        .one()
        .await?
        .expect("row");
    assert_eq!(record.get("id"), Some(&FieldValue::Int(42)));
    assert_eq!(record.get("active"), Some(&FieldValue::Bool(true)));
    assert_eq!(
        record.get("seen").and_then(FieldValue::as_timestamp),
        Utc.timestamp_millis_opt(1_700_000_000_123).single()
    );

    adapter.close().await?;
    Ok(())
}

#[tokio::test]
async fn malformed_json_fails_population() -> Result<(), SqliteAdapterError> {
    let adapter = Arc::new(SqliteAdapter::new(":memory:"));
    adapter.connect().await?;
    let schema = events(&adapter);
    adapter.create(&schema).execute().await?;
    adapter
        .run(
            "INSERT INTO events (id, meta) VALUES (1, ?)",
            vec![Value::Text("{not json".into())],
        )
        .await?;

    assert!(matches!(
        adapter.select(&schema).all().await,
        Err(SqliteAdapterError::JsonError(_))
    ));
    adapter.close().await?;
    Ok(())
}
