//! Convenient imports for common functionality.

pub use crate::adapter::SqliteAdapter;
pub use crate::builder::{Create, Direction, DropTable, Insert, InsertMode, Select};
pub use crate::error::SqliteAdapterError;
pub use crate::row::Row;
pub use crate::schema::{Field, Model, Record, Schema};
pub use crate::sqlite::{
    IntoParam, IntoParams, PreparedStatement, SqliteEngine, SqliteOptions, SqliteOptionsBuilder,
};
pub use crate::types::{FieldKind, FieldValue, StorageClass};

pub use rusqlite::types::Value;

pub use async_trait::async_trait;
