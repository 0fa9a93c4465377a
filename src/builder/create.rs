use std::sync::Arc;

use crate::adapter::SqliteAdapter;
use crate::error::SqliteAdapterError;
use crate::schema::{Model, Schema};

/// `CREATE TABLE IF NOT EXISTS` builder; one column per schema field, in field order.
pub struct Create<'s, M: Model> {
    schema: &'s Schema<M>,
    adapter: Arc<SqliteAdapter>,
}

impl<'s, M: Model> Create<'s, M> {
    pub(crate) fn new(schema: &'s Schema<M>) -> Self {
        Self {
            schema,
            adapter: Arc::clone(schema.adapter()),
        }
    }

    /// # Errors
    /// Returns `SqliteAdapterError::FieldKindNotSupported` naming the first field whose kind has
    /// no column type.
    pub fn render(&self) -> Result<String, SqliteAdapterError> {
        let columns = self
            .schema
            .fields()
            .iter()
            .map(|field| {
                field
                    .cast(&self.adapter)
                    .map(|class| format!("{} {}", field.name(), class.as_sql()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            self.schema.name(),
            columns.join(", ")
        ))
    }

    /// # Errors
    /// Returns `DatabaseNotConnected`, `FieldKindNotSupported`, or the engine error.
    pub async fn execute(&self) -> Result<(), SqliteAdapterError> {
        let sql = self.render()?;
        tracing::debug!(sql = %sql, "create table");
        self.adapter.run(&sql, Vec::new()).await
    }
}

impl<M: Model> std::fmt::Debug for Create<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Create")
            .field("table", &self.schema.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, Record};
    use crate::types::FieldKind;

    fn schema(fields: Vec<Field>) -> Schema<Record> {
        Schema::new("items", fields, Arc::new(SqliteAdapter::new(":memory:")))
    }

    #[test]
    fn one_column_per_field_in_order() {
        let items = schema(vec![
            Field::new("id", FieldKind::Integer),
            Field::new("label", FieldKind::Varchar),
            Field::new("price", FieldKind::Decimal),
            Field::new("ratio", FieldKind::Double),
            Field::new("payload", FieldKind::Blob),
            Field::new("seen", FieldKind::Datetime),
        ]);
        assert_eq!(
            Create::new(&items).render().unwrap(),
            "CREATE TABLE IF NOT EXISTS items (id INTEGER, label TEXT, price NUMERIC, ratio REAL, payload BLOB, seen NUMERIC);"
        );
    }

    #[test]
    fn unsupported_kind_names_the_field() {
        let items = schema(vec![
            Field::new("id", FieldKind::Integer),
            Field::new("shape", FieldKind::Other("GEOMETRY".into())),
        ]);
        match Create::new(&items).render() {
            Err(SqliteAdapterError::FieldKindNotSupported { field, .. }) => assert_eq!(field, "shape"),
            other => panic!("expected FieldKindNotSupported, got {other:?}"),
        }
    }
}
