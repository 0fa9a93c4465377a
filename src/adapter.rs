use std::path::Path;
use std::sync::Arc;

use rusqlite::OpenFlags;
use rusqlite::types::Value;
use tokio::sync::RwLock;

use crate::builder::{Create, DropTable, Insert, Select};
use crate::error::SqliteAdapterError;
use crate::marshal;
use crate::row::Row;
use crate::schema::{Field, Model, Schema};
use crate::sqlite::{PreparedStatement, SqliteConnection, SqliteEngine, SqliteOptions};
use crate::types::{FieldValue, StorageClass};

/// Connection Adapter: owns the single database handle for one database path.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use sqlite_storage_adapter::prelude::*;
///
/// # async fn demo() -> Result<(), SqliteAdapterError> {
/// let adapter = Arc::new(SqliteAdapter::new("app.db"));
/// adapter.connect().await?;
/// adapter.run("CREATE TABLE t (id INTEGER)", vec![]).await?;
/// let rows = adapter.all("SELECT id FROM t", vec![]).await?;
/// # let _ = rows;
/// adapter.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SqliteAdapter {
    options: SqliteOptions,
    engine: Arc<SqliteEngine>,
    connection: RwLock<Option<SqliteConnection>>,
}

impl SqliteAdapter {
    /// Adapter for `path` using the process-wide engine.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_options(SqliteOptions::new(path))
    }

    #[must_use]
    pub fn with_options(options: SqliteOptions) -> Self {
        Self::with_engine(options, SqliteEngine::shared())
    }

    #[must_use]
    pub fn with_engine(options: SqliteOptions, engine: Arc<SqliteEngine>) -> Self {
        Self {
            options,
            engine,
            connection: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.options.db_path
    }

    #[must_use]
    pub fn options(&self) -> &SqliteOptions {
        &self.options
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.read().await.is_some()
    }

    /// Open the database. A second call while connected does nothing.
    ///
    /// The engine is initialized on first use, any existing database file at the path is
    /// discarded (unless disabled in [`SqliteOptions`]), and a fresh read/write/create handle is
    /// opened on its own worker thread.
    ///
    /// # Errors
    /// Returns `SqliteAdapterError::InitError` if the engine cannot initialize, `IoError` if the old
    /// file cannot be removed, or the engine error if opening fails.
    pub async fn connect(&self) -> Result<(), SqliteAdapterError> {
        let mut guard = self.connection.write().await;
        if guard.is_some() {
            return Ok(());
        }

        self.engine.init().await?;

        let options = self.options.clone();
        let conn = tokio::task::spawn_blocking(move || open_fresh(&options))
            .await
            .map_err(|e| {
                SqliteAdapterError::ConnectionError(format!("sqlite spawn_blocking join error: {e}"))
            })??;

        *guard = Some(SqliteConnection::new(conn)?);
        tracing::debug!(path = %self.options.db_path, "sqlite adapter connected");
        Ok(())
    }

    /// Release the handle. Does nothing when not connected; `connect()` may be called again
    /// afterwards. If the engine refuses to close, the handle stays in place.
    ///
    /// # Errors
    /// Returns the engine error reported while closing.
    pub async fn close(&self) -> Result<(), SqliteAdapterError> {
        let mut guard = self.connection.write().await;
        let Some(conn) = guard.take() else {
            return Ok(());
        };
        if let Err(err) = conn.close().await {
            *guard = Some(conn);
            return Err(err);
        }
        tracing::debug!(path = %self.options.db_path, "sqlite adapter closed");
        Ok(())
    }

    async fn connection(&self) -> Result<SqliteConnection, SqliteAdapterError> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or(SqliteAdapterError::DatabaseNotConnected)
    }

    /// Fail with `DatabaseNotConnected` unless a handle is open.
    ///
    /// # Errors
    /// Returns `SqliteAdapterError::DatabaseNotConnected` when `connect()` has not succeeded.
    pub async fn ensure_connected(&self) -> Result<(), SqliteAdapterError> {
        self.connection().await.map(|_| ())
    }

    /// Compile `sql` and bind it to `params`.
    ///
    /// # Errors
    /// Returns `SqliteAdapterError::DatabaseNotConnected` before anything reaches the engine when
    /// there is no handle, otherwise the engine error if the statement does not compile.
    pub async fn prepare(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<PreparedStatement, SqliteAdapterError> {
        let conn = self.connection().await?;
        let sql = Arc::new(sql.to_owned());
        conn.prepare(Arc::clone(&sql)).await?;
        Ok(PreparedStatement::new(conn, sql, params))
    }

    /// Execute for side effect, discarding any rows.
    ///
    /// # Errors
    /// Returns `DatabaseNotConnected` or the engine error from prepare/execute.
    pub async fn run(&self, sql: &str, params: Vec<Value>) -> Result<(), SqliteAdapterError> {
        self.prepare(sql, params).await?.run().await?;
        Ok(())
    }

    /// First row of the result, if any.
    ///
    /// # Errors
    /// Returns `DatabaseNotConnected` or the engine error from prepare/execute.
    pub async fn get(&self, sql: &str, params: Vec<Value>) -> Result<Option<Row>, SqliteAdapterError> {
        self.prepare(sql, params).await?.get().await
    }

    /// Every row in result order; the statement is finalized afterwards.
    ///
    /// # Errors
    /// Returns `DatabaseNotConnected` or the engine error from prepare/execute/finalize.
    pub async fn all(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, SqliteAdapterError> {
        let statement = self.prepare(sql, params).await?;
        let rows = statement.all().await?;
        statement.finalize().await?;
        Ok(rows)
    }

    /// Call `on_row` once per row in result order; returns the row count.
    ///
    /// # Errors
    /// Returns `DatabaseNotConnected` or the engine error from prepare/execute.
    pub async fn each<F>(
        &self,
        sql: &str,
        params: Vec<Value>,
        on_row: F,
    ) -> Result<usize, SqliteAdapterError>
    where
        F: FnMut(Row),
    {
        self.prepare(sql, params).await?.each(on_row).await
    }

    /// Storage to domain conversion for `field`.
    ///
    /// # Errors
    /// See [`marshal::from_storage`].
    pub fn field_transform_from_db(
        &self,
        field: &Field,
        value: Value,
    ) -> Result<FieldValue, SqliteAdapterError> {
        marshal::from_storage(field, value)
    }

    /// Domain to storage conversion for `field`.
    ///
    /// # Errors
    /// See [`marshal::to_storage`].
    pub fn field_transform_to_db(
        &self,
        field: &Field,
        value: FieldValue,
    ) -> Result<Value, SqliteAdapterError> {
        marshal::to_storage(field, value)
    }

    /// Column type for `field`.
    ///
    /// # Errors
    /// Returns `SqliteAdapterError::FieldKindNotSupported` for kinds without a mapping.
    pub fn field_cast(&self, field: &Field) -> Result<StorageClass, SqliteAdapterError> {
        marshal::field_cast(field)
    }

    /// SELECT builder for `schema`.
    ///
    /// Builders execute on the adapter the schema was declared with; `schema` must belong to
    /// this adapter.
    #[must_use]
    pub fn select<'s, M: Model>(&self, schema: &'s Schema<M>) -> Select<'s, M> {
        self.debug_assert_owns(schema);
        Select::new(schema)
    }

    #[must_use]
    pub fn insert<'s, M: Model>(&self, schema: &'s Schema<M>) -> Insert<'s, M> {
        self.debug_assert_owns(schema);
        Insert::insert(schema)
    }

    #[must_use]
    pub fn replace<'s, M: Model>(&self, schema: &'s Schema<M>) -> Insert<'s, M> {
        self.debug_assert_owns(schema);
        Insert::replace(schema)
    }

    #[must_use]
    pub fn create<'s, M: Model>(&self, schema: &'s Schema<M>) -> Create<'s, M> {
        self.debug_assert_owns(schema);
        Create::new(schema)
    }

    /// DROP TABLE builder for `schema`.
    #[must_use]
    pub fn drop_table<'s, M: Model>(&self, schema: &'s Schema<M>) -> DropTable<'s, M> {
        self.debug_assert_owns(schema);
        DropTable::new(schema)
    }

    fn debug_assert_owns<M: Model>(&self, schema: &Schema<M>) {
        debug_assert!(
            std::ptr::eq(self, schema.adapter().as_ref()),
            "schema `{}` is bound to a different adapter",
            schema.name()
        );
    }
}

/// Files `SQLite` may keep next to the main database file.
const SIDECAR_SUFFIXES: [&str; 3] = ["-journal", "-wal", "-shm"];

fn remove_if_present(path: &Path) -> Result<(), SqliteAdapterError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "discarded existing database file");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn open_fresh(options: &SqliteOptions) -> Result<rusqlite::Connection, SqliteAdapterError> {
    if options.recreate_on_connect {
        if let Some(path) = options.file_path() {
            remove_if_present(path)?;
            for suffix in SIDECAR_SUFFIXES {
                let mut sidecar = path.as_os_str().to_owned();
                sidecar.push(suffix);
                remove_if_present(Path::new(&sidecar))?;
            }
        }
    }
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Ok(rusqlite::Connection::open_with_flags(&options.db_path, flags)?)
}
