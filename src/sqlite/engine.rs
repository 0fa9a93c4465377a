use std::sync::{Arc, LazyLock};

use tokio::sync::OnceCell;

use crate::error::SqliteAdapterError;

/// Oldest `SQLite` that accepts multi-row `VALUES` lists.
pub const MIN_SQLITE_VERSION: i32 = 3_007_011;

static SHARED: LazyLock<Arc<SqliteEngine>> = LazyLock::new(|| Arc::new(SqliteEngine::new()));

/// The `SQLite` library, initialized at most once per engine value.
///
/// Adapters built with [`crate::SqliteAdapter::new`] share [`SqliteEngine::shared`]; tests and
/// embedders can pass their own engine instead.
#[derive(Debug, Default)]
pub struct SqliteEngine {
    version: OnceCell<EngineInfo>,
}

/// What `init()` found about the linked library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    pub version: String,
    pub version_number: i32,
}

impl SqliteEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide engine.
    #[must_use]
    pub fn shared() -> Arc<SqliteEngine> {
        Arc::clone(&SHARED)
    }

    /// Initialize the engine; later calls return the first result.
    ///
    /// # Errors
    /// Returns `SqliteAdapterError::InitError` if the linked library is older than
    /// [`MIN_SQLITE_VERSION`].
    pub async fn init(&self) -> Result<&EngineInfo, SqliteAdapterError> {
        self.version
            .get_or_try_init(|| async {
                check_version(rusqlite::version(), rusqlite::version_number())
            })
            .await
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.version.initialized()
    }
}

fn check_version(version: &str, version_number: i32) -> Result<EngineInfo, SqliteAdapterError> {
    if version_number < MIN_SQLITE_VERSION {
        return Err(SqliteAdapterError::InitError(format!(
            "SQLite {version} is too old; {MIN_SQLITE_VERSION} or newer is required"
        )));
    }
    tracing::debug!(version, "sqlite engine initialized");
    Ok(EngineInfo {
        version: version.to_string(),
        version_number,
    })
}
