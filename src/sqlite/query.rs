use std::sync::Arc;

use rusqlite::types::Value;
use rusqlite::{Statement, ToSql};

use crate::error::SqliteAdapterError;
use crate::row::Row;

pub(crate) fn column_names(stmt: &Statement<'_>) -> Arc<Vec<String>> {
    Arc::new(
        stmt.column_names()
            .iter()
            .map(std::string::ToString::to_string)
            .collect(),
    )
}

fn extract_row(
    row: &rusqlite::Row<'_>,
    names: &Arc<Vec<String>>,
) -> Result<Row, SqliteAdapterError> {
    let mut values = Vec::with_capacity(names.len());
    for idx in 0..names.len() {
        values.push(row.get::<_, Value>(idx)?);
    }
    Ok(Row::new(Arc::clone(names), values))
}

fn as_refs(params: &[Value]) -> Vec<&dyn ToSql> {
    params.iter().map(|v| v as &dyn ToSql).collect()
}

/// Visit every row of a statement in result order; returns the number of rows visited.
///
/// # Errors
/// Returns `SqliteAdapterError::SqliteError` if stepping the statement fails, or whatever
/// `visit` returns.
pub(crate) fn for_each_row<F>(
    stmt: &mut Statement<'_>,
    params: &[Value],
    mut visit: F,
) -> Result<usize, SqliteAdapterError>
where
    F: FnMut(Row) -> Result<(), SqliteAdapterError>,
{
    let names = column_names(stmt);
    let refs = as_refs(params);
    let mut rows = stmt.query(&refs[..])?;
    let mut count = 0;
    while let Some(row) = rows.next()? {
        visit(extract_row(row, &names)?)?;
        count += 1;
    }
    Ok(count)
}

/// Collect every row of a statement.
///
/// # Errors
/// Returns `SqliteAdapterError::SqliteError` if preparing or stepping the statement fails.
pub(crate) fn build_rows(
    stmt: &mut Statement<'_>,
    params: &[Value],
) -> Result<Vec<Row>, SqliteAdapterError> {
    let mut out = Vec::new();
    for_each_row(stmt, params, |row| {
        out.push(row);
        Ok(())
    })?;
    Ok(out)
}

/// First row, if any.
///
/// # Errors
/// Returns `SqliteAdapterError::SqliteError` if the statement fails.
pub(crate) fn first_row(
    stmt: &mut Statement<'_>,
    params: &[Value],
) -> Result<Option<Row>, SqliteAdapterError> {
    let names = column_names(stmt);
    let refs = as_refs(params);
    let mut rows = stmt.query(&refs[..])?;
    match rows.next()? {
        Some(row) => Ok(Some(extract_row(row, &names)?)),
        None => Ok(None),
    }
}

/// Step the statement to completion for its side effect; returns rows changed.
///
/// Rows produced by the statement, if any, are stepped through and dropped.
///
/// # Errors
/// Returns `SqliteAdapterError::SqliteError` if the statement fails.
pub(crate) fn run_to_completion(
    conn: &rusqlite::Connection,
    stmt: &mut Statement<'_>,
    params: &[Value],
) -> Result<u64, SqliteAdapterError> {
    let refs = as_refs(params);
    let mut rows = stmt.query(&refs[..])?;
    while rows.next()?.is_some() {}
    Ok(conn.changes())
}
