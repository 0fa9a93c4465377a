use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::types::Value;

use crate::adapter::SqliteAdapter;
use crate::error::SqliteAdapterError;
use crate::marshal::passthrough_from;
use crate::row::Row;
use crate::types::{FieldKind, FieldValue, StorageClass};

/// A typed column declared on a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    kind: FieldKind,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Read this field from `model` and marshal it for the database.
    ///
    /// # Errors
    /// Returns `SqliteAdapterError` if the value cannot be represented in this field's storage type.
    pub fn to_storage<M: Model>(
        &self,
        adapter: &SqliteAdapter,
        model: &M,
    ) -> Result<Value, SqliteAdapterError> {
        adapter.field_transform_to_db(self, model.field_value(self))
    }

    /// Marshal a stored value back into the domain.
    ///
    /// # Errors
    /// Returns `SqliteAdapterError` if the stored value cannot be read as this field's kind.
    pub fn from_storage(
        &self,
        adapter: &SqliteAdapter,
        value: Value,
    ) -> Result<FieldValue, SqliteAdapterError> {
        adapter.field_transform_from_db(self, value)
    }

    /// Column type used for this field in DDL.
    ///
    /// # Errors
    /// Returns `SqliteAdapterError::FieldKindNotSupported` for kinds without a mapping.
    pub fn cast(&self, adapter: &SqliteAdapter) -> Result<StorageClass, SqliteAdapterError> {
        adapter.field_cast(self)
    }
}

/// Column name to domain value mapping for one row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: HashMap<String, FieldValue>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Remove and return a value, or [`FieldValue::Absent`] if the column is missing.
    pub fn take(&mut self, name: &str) -> FieldValue {
        self.values.remove(name).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Domain object persisted through a [`Schema`].
///
/// `field_value` feeds INSERT/REPLACE; `populate` reconstructs an object from a row already
/// converted into domain values.
#[async_trait]
pub trait Model: Sized + Send + Sync + 'static {
    fn field_value(&self, field: &Field) -> FieldValue;

    /// Build an object from one fetched row.
    ///
    /// # Errors
    /// Implementations return `SqliteAdapterError::ConversionError` when a required column is
    /// missing or has the wrong shape.
    async fn populate(record: Record) -> Result<Self, SqliteAdapterError>;
}

#[async_trait]
impl Model for Record {
    fn field_value(&self, field: &Field) -> FieldValue {
        self.get(field.name()).cloned().unwrap_or_default()
    }

    async fn populate(record: Record) -> Result<Self, SqliteAdapterError> {
        Ok(record)
    }
}

/// Table metadata: name, ordered fields and the adapter the table lives in.
///
/// Field order fixes column and placeholder order in generated SQL.
pub struct Schema<M: Model = Record> {
    name: String,
    fields: Vec<Field>,
    adapter: Arc<SqliteAdapter>,
    _model: std::marker::PhantomData<fn() -> M>,
}

impl<M: Model> Schema<M> {
    #[must_use]
    pub fn new(name: impl Into<String>, fields: Vec<Field>, adapter: Arc<SqliteAdapter>) -> Self {
        Self {
            name: name.into(),
            fields,
            adapter,
            _model: std::marker::PhantomData,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name() == name)
    }

    #[must_use]
    pub fn adapter(&self) -> &Arc<SqliteAdapter> {
        &self.adapter
    }

    /// Convert a raw row into a model.
    ///
    /// Columns matching a schema field go through that field's storage conversion; any other
    /// column (for example `rowid`) is kept with its primitive value.
    ///
    /// # Errors
    /// Returns `SqliteAdapterError` if a column fails conversion or `M::populate` rejects the row.
    pub async fn populate_from_db(&self, row: Row) -> Result<M, SqliteAdapterError> {
        let mut record = Record::new();
        for (name, value) in row.into_pairs() {
            let converted = match self.field(&name) {
                Some(field) => field.from_storage(&self.adapter, value)?,
                None => passthrough_from(value),
            };
            record.insert(name, converted);
        }
        M::populate(record).await
    }
}

impl<M: Model> std::fmt::Debug for Schema<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
