use std::sync::Arc;

use rusqlite::types::Value;

/// One result row in storage representation.
///
/// Every row of a result shares the same column-name list.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub column_names: Arc<Vec<String>>,
    /// Cells in column order.
    pub values: Vec<Value>,
}

impl Row {
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        Self {
            column_names,
            values,
        }
    }

    /// Position of `name` among the result columns; the first match wins on duplicates.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|column| column == name)
    }

    /// Cell for column `name`, or `None` if the result has no such column.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.column_index(name).and_then(|idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(column, cell)` pairs in column order.
    pub fn into_pairs(self) -> impl Iterator<Item = (String, Value)> {
        let names = self.column_names;
        self.values
            .into_iter()
            .zip(0..)
            .map(move |(value, idx)| (names.get(idx).cloned().unwrap_or_default(), value))
    }
}
