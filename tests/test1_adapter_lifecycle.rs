use std::sync::Arc;

use sqlite_storage_adapter::prelude::*;
use tempfile::{TempDir, tempdir};

fn db_in(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

async fn table_names(adapter: &SqliteAdapter) -> Result<Vec<Value>, SqliteAdapterError> {
    let rows = adapter
        .all(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
            vec![],
        )
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|row| row.get("name").cloned())
        .collect())
}

#[tokio::test]
async fn operations_before_connect_fail_without_reaching_the_engine() {
    let adapter = SqliteAdapter::new(":memory:");
    assert!(!adapter.is_connected().await);

    assert!(matches!(
        adapter.run("CREATE TABLE t (id INTEGER)", vec![]).await,
        Err(SqliteAdapterError::DatabaseNotConnected)
    ));
    assert!(matches!(
        adapter.get("SELECT 1", vec![]).await,
        Err(SqliteAdapterError::DatabaseNotConnected)
    ));
    assert!(matches!(
        adapter.all("SELECT 1", vec![]).await,
        Err(SqliteAdapterError::DatabaseNotConnected)
    ));
    assert!(matches!(
        adapter.each("SELECT 1", vec![], |_| {}).await,
        Err(SqliteAdapterError::DatabaseNotConnected)
    ));
    assert!(matches!(
        adapter.prepare("SELECT 1", vec![]).await,
        Err(SqliteAdapterError::DatabaseNotConnected)
    ));
    // Closing an adapter that never connected is a no-op.
    adapter.close().await.unwrap();
}

#[tokio::test]
async fn connect_is_idempotent() -> Result<(), SqliteAdapterError> {
    let dir = tempdir()?;
    let adapter = SqliteAdapter::new(db_in(&dir, "idempotent.db"));
    adapter.connect().await?;
    adapter
        .run("CREATE TABLE t (id INTEGER)", vec![])
        .await?;
    adapter.run("INSERT INTO t (id) VALUES (?)", vec![Value::Integer(7)]).await?;

    // A second connect keeps the open handle and its data.
    adapter.connect().await?;
    let row = adapter.get("SELECT id FROM t", vec![]).await?;
    assert_eq!(row.and_then(|r| r.get("id").cloned()), Some(Value::Integer(7)));

    adapter.close().await?;
    Ok(())
}

#[tokio::test]
async fn connect_discards_an_existing_database_file() -> Result<(), SqliteAdapterError> {
    let dir = tempdir()?;
    let path = db_in(&dir, "recreated.db");

    let first = SqliteAdapter::new(path.clone());
    first.connect().await?;
    first.run("CREATE TABLE kept (id INTEGER)", vec![]).await?;
    first.close().await?;
    assert!(std::path::Path::new(&path).exists());

    let second = SqliteAdapter::new(path);
    second.connect().await?;
    assert!(table_names(&second).await?.is_empty());
    second.close().await?;
    Ok(())
}

#[tokio::test]
async fn recreate_can_be_disabled() -> Result<(), SqliteAdapterError> {
    let dir = tempdir()?;
    let path = db_in(&dir, "kept.db");

    let first = SqliteAdapter::new(path.clone());
    first.connect().await?;
    first.run("CREATE TABLE kept (id INTEGER)", vec![]).await?;
    first.close().await?;

    let second = SqliteOptionsBuilder::new(path)
        .recreate_on_connect(false)
        .build();
    second.connect().await?;
    assert_eq!(table_names(&second).await?, vec![Value::Text("kept".into())]);
    second.close().await?;
    Ok(())
}

#[tokio::test]
async fn close_then_reconnect() -> Result<(), SqliteAdapterError> {
    let dir = tempdir()?;
    let adapter = SqliteAdapter::new(db_in(&dir, "reconnect.db"));
    adapter.connect().await?;
    assert!(adapter.is_connected().await);

    adapter.close().await?;
    assert!(!adapter.is_connected().await);
    assert!(matches!(
        adapter.run("SELECT 1", vec![]).await,
        Err(SqliteAdapterError::DatabaseNotConnected)
    ));
    adapter.close().await?;

    adapter.connect().await?;
    adapter.run("CREATE TABLE again (id INTEGER)", vec![]).await?;
    adapter.close().await?;
    Ok(())
}

#[tokio::test]
async fn injected_engine_is_initialized_on_first_connect() -> Result<(), SqliteAdapterError> {
    let engine = Arc::new(SqliteEngine::new());
    assert!(!engine.is_initialized());

    let adapter = SqliteOptionsBuilder::new(":memory:")
        .engine(Arc::clone(&engine))
        .build();
    adapter.connect().await?;
    assert!(engine.is_initialized());

    let info = engine.init().await?;
    assert!(info.version_number >= sqlite_storage_adapter::sqlite::MIN_SQLITE_VERSION);
    adapter.close().await?;
    Ok(())
}

#[tokio::test]
async fn get_all_and_each_follow_result_order() -> Result<(), SqliteAdapterError> {
    let adapter = SqliteAdapter::new(":memory:");
    adapter.connect().await?;
    adapter
        .run("CREATE TABLE nums (n INTEGER, label TEXT)", vec![])
        .await?;
    adapter
        .run(
            "INSERT INTO nums (n, label) VALUES (?, ?), (?, ?), (?, ?)",
            vec![
                Value::Integer(3),
                Value::Text("c".into()),
                Value::Integer(1),
                Value::Text("a".into()),
                Value::Integer(2),
                Value::Text("b".into()),
            ],
        )
        .await?;

    let first = adapter
        .get("SELECT n, label FROM nums ORDER BY n", vec![])
        .await?
        .expect("one row");
    assert_eq!(first.get("label"), Some(&Value::Text("a".into())));
    assert_eq!(first.get_by_index(0), Some(&Value::Integer(1)));

    let none = adapter
        .get("SELECT n FROM nums WHERE n > ?", vec![Value::Integer(10)])
        .await?;
    assert!(none.is_none());

    let all = adapter.all("SELECT n FROM nums ORDER BY n DESC", vec![]).await?;
    let ns: Vec<_> = all.iter().filter_map(|r| r.get("n").cloned()).collect();
    assert_eq!(
        ns,
        vec![Value::Integer(3), Value::Integer(2), Value::Integer(1)]
    );

    let mut seen = Vec::new();
    let count = adapter
        .each("SELECT label FROM nums ORDER BY n", vec![], |row| {
            seen.push(row.get("label").cloned());
        })
        .await?;
    assert_eq!(count, 3);
    assert_eq!(
        seen,
        vec![
            Some(Value::Text("a".into())),
            Some(Value::Text("b".into())),
            Some(Value::Text("c".into())),
        ]
    );

    adapter.close().await?;
    Ok(())
}

#[tokio::test]
async fn prepared_statement_can_be_reused_and_finalized() -> Result<(), SqliteAdapterError> {
    let adapter = SqliteAdapter::new(":memory:");
    adapter.connect().await?;
    adapter.run("CREATE TABLE kv (k TEXT, v INTEGER)", vec![]).await?;

    let insert = adapter
        .prepare(
            "INSERT INTO kv (k, v) VALUES (?, ?)",
            vec![Value::Text("x".into()), Value::Integer(1)],
        )
        .await?;
    assert_eq!(insert.sql(), "INSERT INTO kv (k, v) VALUES (?, ?)");
    assert_eq!(insert.params().len(), 2);
    assert_eq!(insert.run().await?, 1);
    assert_eq!(insert.run().await?, 1);
    insert.finalize().await?;

    let select = adapter
        .prepare("SELECT v FROM kv WHERE k = ?", vec![Value::Text("x".into())])
        .await?;
    assert_eq!(select.all().await?.len(), 2);
    assert!(select.get().await?.is_some());
    select.finalize().await?;

    adapter.close().await?;
    Ok(())
}

#[tokio::test]
async fn engine_errors_surface_unchanged() -> Result<(), SqliteAdapterError> {
    let adapter = SqliteAdapter::new(":memory:");
    adapter.connect().await?;

    assert!(matches!(
        adapter.prepare("SELEC nonsense", vec![]).await,
        Err(SqliteAdapterError::SqliteError(_))
    ));
    assert!(matches!(
        adapter.all("SELECT * FROM missing_table", vec![]).await,
        Err(SqliteAdapterError::SqliteError(_))
    ));
    // The handle keeps working after a failed statement.
    assert!(adapter.get("SELECT 1 AS one", vec![]).await?.is_some());

    adapter.close().await?;
    Ok(())
}
