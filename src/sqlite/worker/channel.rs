use std::sync::Arc;

use rusqlite::types::Value;
use tokio::sync::{mpsc, oneshot};

use crate::error::SqliteAdapterError;
use crate::row::Row;

pub(super) type Reply<T> = oneshot::Sender<Result<T, SqliteAdapterError>>;

pub(super) enum Command {
    Prepare {
        sql: Arc<String>,
        respond_to: Reply<()>,
    },
    Run {
        sql: Arc<String>,
        params: Vec<Value>,
        respond_to: Reply<u64>,
    },
    Get {
        sql: Arc<String>,
        params: Vec<Value>,
        respond_to: Reply<Option<Row>>,
    },
    All {
        sql: Arc<String>,
        params: Vec<Value>,
        respond_to: Reply<Vec<Row>>,
    },
    Each {
        sql: Arc<String>,
        params: Vec<Value>,
        rows: mpsc::UnboundedSender<Row>,
        respond_to: Reply<usize>,
    },
    Finalize {
        sql: Arc<String>,
        respond_to: Reply<()>,
    },
    Close {
        respond_to: Reply<()>,
    },
    Shutdown,
}
