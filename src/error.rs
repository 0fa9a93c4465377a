use thiserror::Error;

use crate::types::FieldKind;

#[derive(Debug, Error)]
pub enum SqliteAdapterError {
    #[error("database not connected, please call connect() first")]
    DatabaseNotConnected,

    #[error("field kind not supported: {kind} (field `{field}`)")]
    FieldKindNotSupported { field: String, kind: FieldKind },

    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Engine initialization error: {0}")]
    InitError(String),

    #[error("Value conversion error: {0}")]
    ConversionError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),
}
