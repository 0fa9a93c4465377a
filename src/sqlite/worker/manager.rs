use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;

use rusqlite::Connection;
use tokio::sync::oneshot;

use crate::error::SqliteAdapterError;

use super::channel::{Command, Reply};
use super::dispatcher::run_sqlite_worker;

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

pub(super) struct SqliteWorker {
    sender: Sender<Command>,
    worker_id: u64,
}

impl SqliteWorker {
    pub(super) fn spawn(conn: Connection) -> Result<Self, SqliteAdapterError> {
        let (sender, receiver) = mpsc::channel::<Command>();
        let worker_id = NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed);
        thread::Builder::new()
            .name(format!("sqlite-worker-{worker_id}"))
            .spawn(move || run_sqlite_worker(conn, &receiver))
            .map_err(|err| {
                SqliteAdapterError::ConnectionError(format!(
                    "failed to spawn SQLite worker thread: {err}"
                ))
            })?;

        Ok(Self { sender, worker_id })
    }

    pub(super) fn worker_id(&self) -> u64 {
        self.worker_id
    }

    pub(super) fn send_command(&self, command: Command) -> Result<(), SqliteAdapterError> {
        self.sender
            .send(command)
            .map_err(|_| connection_error("SQLite worker closed"))
    }

    pub(super) async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> Command,
        drop_message: &'static str,
    ) -> Result<T, SqliteAdapterError> {
        let (tx, rx) = oneshot::channel();
        self.send_command(build(tx))?;
        rx.await.map_err(|_| connection_error(drop_message))?
    }
}

impl Drop for SqliteWorker {
    fn drop(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
    }
}

fn connection_error(message: &str) -> SqliteAdapterError {
    SqliteAdapterError::ConnectionError(message.into())
}
