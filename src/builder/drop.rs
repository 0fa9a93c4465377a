use std::sync::Arc;

use crate::adapter::SqliteAdapter;
use crate::error::SqliteAdapterError;
use crate::schema::{Model, Schema};

/// `DROP TABLE IF EXISTS` builder.
pub struct DropTable<'s, M: Model> {
    schema: &'s Schema<M>,
    adapter: Arc<SqliteAdapter>,
}

impl<'s, M: Model> DropTable<'s, M> {
    pub(crate) fn new(schema: &'s Schema<M>) -> Self {
        Self {
            schema,
            adapter: Arc::clone(schema.adapter()),
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.schema.name())
    }

    /// # Errors
    /// Returns `DatabaseNotConnected` or the engine error.
    pub async fn execute(&self) -> Result<(), SqliteAdapterError> {
        let sql = self.render();
        tracing::debug!(sql = %sql, "drop table");
        self.adapter.run(&sql, Vec::new()).await
    }
}

impl<M: Model> std::fmt::Debug for DropTable<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropTable")
            .field("table", &self.schema.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Record;

    #[test]
    fn renders_guarded_drop() {
        let schema: Schema<Record> =
            Schema::new("sessions", Vec::new(), Arc::new(SqliteAdapter::new(":memory:")));
        assert_eq!(
            DropTable::new(&schema).render(),
            "DROP TABLE IF EXISTS sessions;"
        );
    }
}
