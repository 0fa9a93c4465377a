use std::sync::Arc;

use rusqlite::types::Value;

use crate::adapter::SqliteAdapter;
use crate::error::SqliteAdapterError;
use crate::schema::{Model, Schema};

/// Statement verb used by [`Insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertMode {
    Insert,
    Replace,
}

impl InsertMode {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            InsertMode::Insert => "INSERT INTO",
            InsertMode::Replace => "REPLACE INTO",
        }
    }
}

/// Batched INSERT / REPLACE builder.
///
/// Every added row becomes one parenthesized placeholder group with one `?` per schema field,
/// and its values are marshalled into the value list in exactly that order (row-major, field
/// order within a row).
pub struct Insert<'s, M: Model> {
    schema: &'s Schema<M>,
    adapter: Arc<SqliteAdapter>,
    mode: InsertMode,
    rows: Vec<M>,
    values: Vec<Value>,
}

impl<'s, M: Model> Insert<'s, M> {
    pub(crate) fn insert(schema: &'s Schema<M>) -> Self {
        Self::with_mode(schema, InsertMode::Insert)
    }

    pub(crate) fn replace(schema: &'s Schema<M>) -> Self {
        Self::with_mode(schema, InsertMode::Replace)
    }

    fn with_mode(schema: &'s Schema<M>, mode: InsertMode) -> Self {
        Self {
            schema,
            adapter: Arc::clone(schema.adapter()),
            mode,
            rows: Vec::new(),
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> InsertMode {
        self.mode
    }

    /// Queue a row for the next render.
    pub fn add(&mut self, row: M) -> &mut Self {
        self.rows.push(row);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values produced by the last `render`.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Render the statement and rebuild the value list.
    ///
    /// # Errors
    /// Returns `SqliteAdapterError::ConversionError` (or `JsonError`) if a row value cannot be
    /// marshalled for its field. The value list is left empty in that case.
    pub fn render(&mut self) -> Result<String, SqliteAdapterError> {
        self.values.clear();
        let fields = self.schema.fields();

        let names: Vec<&str> = fields.iter().map(|field| field.name()).collect();
        let group = format!("({})", vec!["?"; fields.len()].join(", "));

        let mut values = Vec::with_capacity(self.rows.len() * fields.len());
        for row in &self.rows {
            for field in fields {
                values.push(field.to_storage(&self.adapter, row)?);
            }
        }

        let groups = vec![group.as_str(); self.rows.len()].join(", ");
        let sql = format!(
            "{} {} ({}) VALUES {groups};",
            self.mode.as_sql(),
            self.schema.name(),
            names.join(", ")
        );
        self.values = values;
        Ok(sql)
    }

    /// Render and run the statement as one batch.
    ///
    /// An empty batch only checks that the adapter is connected.
    ///
    /// # Errors
    /// Returns `DatabaseNotConnected`, a marshalling error, or the engine error. Nothing is
    /// written when the statement fails.
    pub async fn execute(&mut self) -> Result<(), SqliteAdapterError> {
        if self.rows.is_empty() {
            return self.adapter.ensure_connected().await;
        }
        let sql = self.render()?;
        tracing::debug!(sql = %sql, values = self.values.len(), "insert");
        self.adapter.run(&sql, self.values.clone()).await
    }

    /// Persist every queued row with a single statement.
    ///
    /// # Errors
    /// Same as [`Insert::execute`].
    pub async fn save(&mut self) -> Result<(), SqliteAdapterError> {
        self.execute().await
    }
}

impl<M: Model> std::fmt::Debug for Insert<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Insert")
            .field("table", &self.schema.name())
            .field("mode", &self.mode)
            .field("rows", &self.rows.len())
            .field("values", &self.values)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, Record};
    use crate::types::{FieldKind, FieldValue};
    use serde_json::json;

    fn people() -> Schema<Record> {
        Schema::new(
            "people",
            vec![
                Field::new("id", FieldKind::Integer),
                Field::new("name", FieldKind::Varchar),
                Field::new("active", FieldKind::Boolean),
                Field::new("meta", FieldKind::Json),
            ],
            Arc::new(SqliteAdapter::new(":memory:")),
        )
    }

    fn person(id: i64, name: &str, active: bool) -> Record {
        Record::new()
            .with("id", id)
            .with("name", name)
            .with("active", active)
            .with("meta", json!({"id": id}))
    }

    #[test]
    fn one_group_per_row_and_values_row_major() {
        let schema = people();
        let mut replace = Insert::replace(&schema);
        replace
            .add(person(1, "a", true))
            .add(person(2, "b", false))
            .add(person(3, "c", true));
        let sql = replace.render().unwrap();
        assert_eq!(
            sql,
            "REPLACE INTO people (id, name, active, meta) VALUES (?, ?, ?, ?), (?, ?, ?, ?), (?, ?, ?, ?);"
        );
        assert_eq!(sql.matches('(').count(), 4);
        assert_eq!(replace.values().len(), 3 * 4);
        assert_eq!(
            &replace.values()[4..8],
            &[
                Value::Integer(2),
                Value::Text("b".into()),
                Value::Integer(0),
                Value::Text(r#"{"id":2}"#.into()),
            ]
        );
    }

    #[test]
    fn insert_verb_and_missing_values_become_null() {
        let schema = people();
        let mut insert = Insert::insert(&schema);
        insert.add(Record::new().with("id", 9_i64));
        assert_eq!(
            insert.render().unwrap(),
            "INSERT INTO people (id, name, active, meta) VALUES (?, ?, ?, ?);"
        );
        assert_eq!(
            insert.values(),
            &[Value::Integer(9), Value::Null, Value::Null, Value::Null]
        );
    }

    #[test]
    fn render_resets_values() {
        let schema = people();
        let mut replace = Insert::replace(&schema);
        replace.add(person(1, "a", true));
        let first = replace.render().unwrap();
        let second = replace.render().unwrap();
        assert_eq!(first, second);
        assert_eq!(replace.values().len(), 4);
    }

    #[test]
    fn marshalling_failure_aborts_render() {
        let schema = people();
        let mut replace = Insert::replace(&schema);
        replace.add(person(1, "a", true));
        replace.add(Record::new().with("id", FieldValue::Text("not a number".into())));
        assert!(matches!(
            replace.render(),
            Err(SqliteAdapterError::ConversionError(_))
        ));
        assert!(replace.values().is_empty());
    }
}
