use std::sync::Arc;

use rusqlite::types::Value;

use crate::error::SqliteAdapterError;
use crate::row::Row;

use super::worker::SqliteConnection;

/// Handle to a statement compiled on a worker connection, bound to its parameters.
///
/// The compiled statement lives in the worker's `prepare_cached` cache; `finalize` evicts it.
#[derive(Clone, Debug)]
pub struct PreparedStatement {
    connection: SqliteConnection,
    sql: Arc<String>,
    params: Vec<Value>,
}

impl PreparedStatement {
    pub(crate) fn new(connection: SqliteConnection, sql: Arc<String>, params: Vec<Value>) -> Self {
        Self {
            connection,
            sql,
            params,
        }
    }

    /// Execute for side effect; returns rows changed.
    ///
    /// # Errors
    /// Returns [`SqliteAdapterError`] if the worker fails to execute the statement.
    pub async fn run(&self) -> Result<u64, SqliteAdapterError> {
        self.connection
            .run(Arc::clone(&self.sql), self.params.clone())
            .await
    }

    /// # Errors
    /// Returns [`SqliteAdapterError`] if the worker fails to execute the statement.
    pub async fn get(&self) -> Result<Option<Row>, SqliteAdapterError> {
        self.connection
            .get(Arc::clone(&self.sql), self.params.clone())
            .await
    }

    /// # Errors
    /// Returns [`SqliteAdapterError`] if the worker fails to execute the statement.
    pub async fn all(&self) -> Result<Vec<Row>, SqliteAdapterError> {
        self.connection
            .all(Arc::clone(&self.sql), self.params.clone())
            .await
    }

    /// # Errors
    /// Returns [`SqliteAdapterError`] if the worker fails to execute the statement.
    pub async fn each<F>(&self, on_row: F) -> Result<usize, SqliteAdapterError>
    where
        F: FnMut(Row),
    {
        self.connection
            .each(Arc::clone(&self.sql), self.params.clone(), on_row)
            .await
    }

    /// Release the compiled statement.
    ///
    /// # Errors
    /// Returns [`SqliteAdapterError`] if the worker is gone or the statement cannot be compiled.
    pub async fn finalize(self) -> Result<(), SqliteAdapterError> {
        self.connection.finalize(self.sql).await
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        self.sql.as_str()
    }

    #[must_use]
    pub fn params(&self) -> &[Value] {
        &self.params
    }
}
