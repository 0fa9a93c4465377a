// SQLite module - engine bootstrap and the worker-owned connection
//
// - engine: init-once check of the linked SQLite library
// - config: adapter options and their builder
// - params: `where` parameter conversion
// - query: row extraction from prepared statements
// - prepared: statement handle bound to its parameters
// - worker: dedicated thread owning the single rusqlite handle

pub mod config;
pub mod engine;
pub mod params;
pub mod prepared;
pub(crate) mod query;
pub mod worker;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use engine::{EngineInfo, SqliteEngine, MIN_SQLITE_VERSION};
pub use params::{IntoParam, IntoParams};
pub use prepared::PreparedStatement;
pub use worker::SqliteConnection;
