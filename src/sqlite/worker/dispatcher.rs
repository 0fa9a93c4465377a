use std::sync::mpsc::Receiver;

use rusqlite::types::Value;
use rusqlite::Connection;
use tokio::sync::mpsc;

use crate::error::SqliteAdapterError;
use crate::row::Row;
use crate::sqlite::query::{build_rows, first_row, for_each_row, run_to_completion};

use super::channel::Command;

pub(super) fn run_sqlite_worker(mut conn: Connection, receiver: &Receiver<Command>) {
    while let Ok(command) = receiver.recv() {
        match command {
            Command::Shutdown => break,
            Command::Prepare { sql, respond_to } => {
                let _ = respond_to.send(prepare(&conn, &sql));
            }
            Command::Run {
                sql,
                params,
                respond_to,
            } => {
                let _ = respond_to.send(run(&conn, &sql, &params));
            }
            Command::Get {
                sql,
                params,
                respond_to,
            } => {
                let _ = respond_to.send(get(&conn, &sql, &params));
            }
            Command::All {
                sql,
                params,
                respond_to,
            } => {
                let _ = respond_to.send(all(&conn, &sql, &params));
            }
            Command::Each {
                sql,
                params,
                rows,
                respond_to,
            } => {
                let _ = respond_to.send(each(&conn, &sql, &params, &rows));
            }
            Command::Finalize { sql, respond_to } => {
                let _ = respond_to.send(finalize(&conn, &sql));
            }
            Command::Close { respond_to } => match conn.close() {
                Ok(()) => {
                    let _ = respond_to.send(Ok(()));
                    return;
                }
                Err((still_open, err)) => {
                    // The handle survives a failed close and keeps serving commands.
                    conn = still_open;
                    let _ = respond_to.send(Err(SqliteAdapterError::SqliteError(err)));
                }
            },
        }
    }
}

fn prepare(conn: &Connection, sql: &str) -> Result<(), SqliteAdapterError> {
    conn.prepare_cached(sql)?;
    Ok(())
}

fn run(conn: &Connection, sql: &str, params: &[Value]) -> Result<u64, SqliteAdapterError> {
    let mut stmt = conn.prepare_cached(sql)?;
    run_to_completion(conn, &mut stmt, params)
}

fn get(conn: &Connection, sql: &str, params: &[Value]) -> Result<Option<Row>, SqliteAdapterError> {
    let mut stmt = conn.prepare_cached(sql)?;
    first_row(&mut stmt, params)
}

fn all(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<Row>, SqliteAdapterError> {
    let mut stmt = conn.prepare_cached(sql)?;
    build_rows(&mut stmt, params)
}

fn each(
    conn: &Connection,
    sql: &str,
    params: &[Value],
    rows: &mpsc::UnboundedSender<Row>,
) -> Result<usize, SqliteAdapterError> {
    let mut stmt = conn.prepare_cached(sql)?;
    for_each_row(&mut stmt, params, |row| {
        rows.send(row).map_err(|_| {
            SqliteAdapterError::ConnectionError("row receiver dropped during each()".into())
        })
    })
}

/// Drop the compiled statement instead of returning it to the statement cache.
fn finalize(conn: &Connection, sql: &str) -> Result<(), SqliteAdapterError> {
    conn.prepare_cached(sql)?.discard();
    Ok(())
}
