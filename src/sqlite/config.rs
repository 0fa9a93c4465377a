use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::adapter::SqliteAdapter;

use super::engine::SqliteEngine;

fn default_recreate() -> bool {
    true
}

/// Options for configuring a [`SqliteAdapter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteOptions {
    pub db_path: String,
    /// Discard any existing database file at `db_path` on `connect()`.
    #[serde(default = "default_recreate")]
    pub recreate_on_connect: bool,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            recreate_on_connect: true,
        }
    }

    #[must_use]
    pub fn with_recreate(mut self, recreate_on_connect: bool) -> Self {
        self.recreate_on_connect = recreate_on_connect;
        self
    }

    /// In-memory databases and `file:` URIs have no plain file to discard.
    pub(crate) fn file_path(&self) -> Option<&Path> {
        let path = self.db_path.as_str();
        if path.is_empty() || path == ":memory:" || path.starts_with("file:") {
            None
        } else {
            Some(Path::new(path))
        }
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
    engine: Option<Arc<SqliteEngine>>,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
            engine: None,
        }
    }

    #[must_use]
    pub fn recreate_on_connect(mut self, recreate_on_connect: bool) -> Self {
        self.opts.recreate_on_connect = recreate_on_connect;
        self
    }

    /// Use an explicit engine instead of the process-wide one.
    #[must_use]
    pub fn engine(mut self, engine: Arc<SqliteEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Build an adapter. No connection is opened until `connect()`.
    #[must_use]
    pub fn build(self) -> SqliteAdapter {
        match self.engine {
            Some(engine) => SqliteAdapter::with_engine(self.opts, engine),
            None => SqliteAdapter::with_options(self.opts),
        }
    }
}
