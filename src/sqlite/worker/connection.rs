use std::fmt;
use std::sync::Arc;

use rusqlite::types::Value;
use tokio::sync::mpsc;

use crate::error::SqliteAdapterError;
use crate::row::Row;

use super::channel::Command;
use super::manager::SqliteWorker;

/// Owned `SQLite` connection backed by a dedicated worker thread.
///
/// Every call is a command answered on a oneshot channel, so statements on one connection run
/// one after another in submission order.
#[derive(Clone)]
pub struct SqliteConnection {
    worker: Arc<SqliteWorker>,
}

impl SqliteConnection {
    /// Move an open `rusqlite` connection onto its own worker thread.
    ///
    /// # Errors
    /// Returns [`SqliteAdapterError`] if the background worker thread cannot be spawned.
    pub fn new(conn: rusqlite::Connection) -> Result<Self, SqliteAdapterError> {
        let worker = SqliteWorker::spawn(conn)?;
        Ok(Self {
            worker: Arc::new(worker),
        })
    }

    /// Compile `sql` into the worker's statement cache.
    ///
    /// # Errors
    /// Returns the engine error if the statement does not compile.
    pub async fn prepare(&self, sql: Arc<String>) -> Result<(), SqliteAdapterError> {
        self.worker
            .request(
                |respond_to| Command::Prepare { sql, respond_to },
                "SQLite worker dropped while preparing statement",
            )
            .await
    }

    /// Step a statement to completion; returns rows changed.
    ///
    /// # Errors
    /// Returns the engine error if the statement fails.
    pub async fn run(&self, sql: Arc<String>, params: Vec<Value>) -> Result<u64, SqliteAdapterError> {
        self.worker
            .request(
                |respond_to| Command::Run {
                    sql,
                    params,
                    respond_to,
                },
                "SQLite worker dropped while running statement",
            )
            .await
    }

    /// # Errors
    /// Returns the engine error if the statement fails.
    pub async fn get(
        &self,
        sql: Arc<String>,
        params: Vec<Value>,
    ) -> Result<Option<Row>, SqliteAdapterError> {
        self.worker
            .request(
                |respond_to| Command::Get {
                    sql,
                    params,
                    respond_to,
                },
                "SQLite worker dropped while fetching a row",
            )
            .await
    }

    /// # Errors
    /// Returns the engine error if the statement fails.
    pub async fn all(
        &self,
        sql: Arc<String>,
        params: Vec<Value>,
    ) -> Result<Vec<Row>, SqliteAdapterError> {
        self.worker
            .request(
                |respond_to| Command::All {
                    sql,
                    params,
                    respond_to,
                },
                "SQLite worker dropped while fetching rows",
            )
            .await
    }

    /// Stream rows to `on_row` in result order; returns the row count.
    ///
    /// # Errors
    /// Returns the engine error if the statement fails. Rows delivered before the failure have
    /// already been passed to `on_row`.
    pub async fn each<F>(
        &self,
        sql: Arc<String>,
        params: Vec<Value>,
        mut on_row: F,
    ) -> Result<usize, SqliteAdapterError>
    where
        F: FnMut(Row),
    {
        let (rows_tx, mut rows_rx) = mpsc::unbounded_channel();
        let outcome = self.worker.request(
            |respond_to| Command::Each {
                sql,
                params,
                rows: rows_tx,
                respond_to,
            },
            "SQLite worker dropped while streaming rows",
        );
        // The worker drops its sender once the statement is exhausted, ending this loop.
        let drain = async {
            while let Some(row) = rows_rx.recv().await {
                on_row(row);
            }
        };
        let (count, ()) = tokio::join!(outcome, drain);
        count
    }

    /// Remove a statement from the worker's statement cache.
    ///
    /// # Errors
    /// Returns the engine error if the statement cannot be compiled.
    pub async fn finalize(&self, sql: Arc<String>) -> Result<(), SqliteAdapterError> {
        self.worker
            .request(
                |respond_to| Command::Finalize { sql, respond_to },
                "SQLite worker dropped while finalizing statement",
            )
            .await
    }

    /// Close the underlying handle. On failure the worker keeps the handle open.
    ///
    /// # Errors
    /// Returns the engine error reported by `sqlite3_close`.
    pub async fn close(&self) -> Result<(), SqliteAdapterError> {
        self.worker
            .request(
                |respond_to| Command::Close { respond_to },
                "SQLite worker dropped while closing",
            )
            .await
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("worker_id", &self.worker.worker_id())
            .finish()
    }
}
