use std::fmt;
use std::sync::Arc;

use futures_util::future::try_join_all;
use rusqlite::types::Value;

use crate::adapter::SqliteAdapter;
use crate::error::SqliteAdapterError;
use crate::row::Row;
use crate::schema::{Model, Schema};
use crate::sqlite::IntoParams;

/// Sort direction for [`Select::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct WhereClause {
    criteria: String,
    params: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct JoinClause {
    table: String,
    on: String,
}

/// SELECT builder bound to one schema.
///
/// Configuration is consumed fluently; `render` recomputes the SQL text and the parameter list
/// from scratch on every call.
///
/// ```rust
/// use std::sync::Arc;
/// use sqlite_storage_adapter::prelude::*;
///
/// let adapter = Arc::new(SqliteAdapter::new(":memory:"));
/// let users: Schema = Schema::new(
///     "users",
///     vec![Field::new("id", FieldKind::Integer), Field::new("name", FieldKind::Text)],
///     Arc::clone(&adapter),
/// );
/// let mut select = adapter
///     .select(&users)
///     .from("users", &[])
///     .where_("id = ?", 1_i64)
///     .limit(10, None);
/// assert_eq!(
///     select.render(),
///     "SELECT users.*, users.rowid FROM users WHERE id = ? LIMIT 10;"
/// );
/// ```
#[derive(Debug)]
pub struct Select<'s, M: Model> {
    schema: &'s Schema<M>,
    adapter: Arc<SqliteAdapter>,
    distinct: bool,
    from: String,
    columns: Vec<String>,
    wheres: Vec<WhereClause>,
    joins: Vec<JoinClause>,
    left_joins: Vec<JoinClause>,
    right_joins: Vec<JoinClause>,
    order: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    params: Vec<Value>,
}

impl<'s, M: Model> Select<'s, M> {
    pub(crate) fn new(schema: &'s Schema<M>) -> Self {
        Self {
            schema,
            adapter: Arc::clone(schema.adapter()),
            distinct: false,
            from: String::new(),
            columns: Vec::new(),
            wheres: Vec::new(),
            joins: Vec::new(),
            left_joins: Vec::new(),
            right_joins: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn distinct(mut self, flag: bool) -> Self {
        self.distinct = flag;
        self
    }

    /// Select from `table`. An empty column list means `*`; the `rowid` column is always added.
    #[must_use]
    pub fn from(mut self, table: &str, columns: &[&str]) -> Self {
        self.from = table.to_string();
        let requested: Vec<&str> = if columns.is_empty() {
            vec!["*"]
        } else {
            columns.to_vec()
        };
        for column in requested.into_iter().chain(["rowid"]) {
            self.columns.push(format!("{table}.{column}"));
        }
        self
    }

    /// Add one AND-joined predicate with its positional parameters.
    ///
    /// Pass `()` for a predicate without placeholders, a scalar for one, or a vector/array for
    /// several.
    #[must_use]
    pub fn where_(mut self, criteria: &str, params: impl IntoParams) -> Self {
        self.wheres.push(WhereClause {
            criteria: criteria.to_string(),
            params: params.into_params(),
        });
        self
    }

    /// Inner join. A column list is accepted but not added to the projection.
    #[must_use]
    pub fn join(mut self, table: &str, on: &str, columns: &[&str]) -> Self {
        warn_unrendered_columns("join", table, columns);
        self.joins.push(JoinClause {
            table: table.to_string(),
            on: on.to_string(),
        });
        self
    }

    /// Left join. A column list is accepted but not added to the projection.
    #[must_use]
    pub fn join_left(mut self, table: &str, on: &str, columns: &[&str]) -> Self {
        warn_unrendered_columns("join_left", table, columns);
        self.left_joins.push(JoinClause {
            table: table.to_string(),
            on: on.to_string(),
        });
        self
    }

    /// Right join. Accepted and recorded, but never rendered into the statement.
    #[must_use]
    pub fn join_right(mut self, table: &str, on: &str, columns: &[&str]) -> Self {
        warn_unrendered_columns("join_right", table, columns);
        self.right_joins.push(JoinClause {
            table: table.to_string(),
            on: on.to_string(),
        });
        self
    }

    /// Add an ordering term; `None` sorts ascending.
    #[must_use]
    pub fn order(mut self, column: &str, direction: impl Into<Option<Direction>>) -> Self {
        let direction = direction.into().unwrap_or_default();
        self.order.push(format!("{column} {}", direction.as_sql()));
        self
    }

    /// Set LIMIT and OFFSET; passing `None` clears a previous offset.
    #[must_use]
    pub fn limit(mut self, limit: u64, offset: Option<u64>) -> Self {
        self.set_limit(limit, offset);
        self
    }

    fn set_limit(&mut self, limit: u64, offset: Option<u64>) {
        self.limit = Some(limit);
        self.offset = offset;
    }

    /// Parameters produced by the last `render`.
    #[must_use]
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Render the statement, replacing the derived parameter list.
    pub fn render(&mut self) -> String {
        if !self.right_joins.is_empty() {
            tracing::warn!(
                count = self.right_joins.len(),
                "right joins are recorded but not rendered"
            );
        }
        let (sql, params) = self.compose();
        self.params = params;
        sql
    }

    fn compose(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();

        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }

        if self.from.is_empty() {
            let table = self.schema.name();
            sql.push_str(&format!("{table}.*, {table}.rowid FROM {table}"));
        } else {
            sql.push_str(&self.columns.join(", "));
            sql.push_str(" FROM ");
            sql.push_str(&self.from);
        }

        for join in &self.joins {
            sql.push_str(&format!(" JOIN {} ON {}", join.table, join.on));
        }

        for join in &self.left_joins {
            sql.push_str(&format!(" LEFT JOIN {} ON {}", join.table, join.on));
        }

        if !self.wheres.is_empty() {
            sql.push_str(" WHERE ");
            let criteria: Vec<&str> = self.wheres.iter().map(|w| w.criteria.as_str()).collect();
            sql.push_str(&criteria.join(" AND "));
            for clause in &self.wheres {
                if let Some(clause_params) = &clause.params {
                    params.extend(clause_params.iter().cloned());
                }
            }
        }

        if !self.order.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        sql.push(';');
        (sql, params)
    }

    /// Render and fetch the raw rows.
    ///
    /// # Errors
    /// Returns `DatabaseNotConnected` or the engine error.
    pub async fn execute(&mut self) -> Result<Vec<Row>, SqliteAdapterError> {
        let sql = self.render();
        tracing::debug!(sql = %sql, params = self.params.len(), "select");
        self.adapter.all(&sql, self.params.clone()).await
    }

    /// Fetch and reconstruct every row as a model, preserving row order.
    ///
    /// # Errors
    /// Returns `DatabaseNotConnected`, the engine error, or the first row-population failure.
    pub async fn all(&mut self) -> Result<Vec<M>, SqliteAdapterError> {
        let rows = self.execute().await?;
        let schema = self.schema;
        try_join_all(rows.into_iter().map(|row| schema.populate_from_db(row))).await
    }

    /// Fetch the first model; always applies `LIMIT 1` and drops any offset.
    ///
    /// # Errors
    /// Same as [`Select::all`].
    pub async fn one(&mut self) -> Result<Option<M>, SqliteAdapterError> {
        self.set_limit(1, None);
        Ok(self.all().await?.into_iter().next())
    }
}

impl<M: Model> fmt::Display for Select<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compose().0)
    }
}

fn warn_unrendered_columns(kind: &str, table: &str, columns: &[&str]) {
    if !columns.is_empty() {
        tracing::warn!(kind, table, ?columns, "join columns are accepted but not rendered");
    }
}
