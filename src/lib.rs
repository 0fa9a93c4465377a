//! Async `SQLite` storage adapter.
//!
//! A [`SqliteAdapter`] owns one database handle per path and exposes prepare/run/get/all/each on
//! it. [`Schema`]s bind typed [`Field`]s to a table and hand out SELECT, INSERT/REPLACE, CREATE
//! and DROP builders whose values are marshalled between domain and storage representations.

pub mod adapter;
pub mod builder;
pub mod error;
pub mod marshal;
pub mod prelude;
pub mod row;
pub mod schema;
pub mod sqlite;
pub mod types;

pub use adapter::SqliteAdapter;
pub use builder::{Create, Direction, DropTable, Insert, InsertMode, Select};
pub use error::SqliteAdapterError;
pub use row::Row;
pub use schema::{Field, Model, Record, Schema};
pub use sqlite::{
    IntoParam, IntoParams, PreparedStatement, SqliteEngine, SqliteOptions, SqliteOptionsBuilder,
};
pub use types::{FieldKind, FieldValue, StorageClass};

pub use rusqlite::types::Value;

pub use async_trait::async_trait;
