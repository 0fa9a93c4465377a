use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Domain type tag declared on a schema field.
///
/// The tag drives both the column type used in `CREATE TABLE` and the value conversion applied
/// when values travel to and from the database. Kinds a schema provider declares that this
/// adapter has no column type for are carried as [`FieldKind::Other`].
///
/// ```rust
/// use sqlite_storage_adapter::prelude::*;
///
/// let kind: FieldKind = "varchar".parse().unwrap();
/// assert_eq!(kind, FieldKind::Varchar);
/// assert_eq!(kind.storage_class(), Some(StorageClass::Text));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    Text,
    Varchar,
    Character,
    Json,
    Uuid,
    Numeric,
    Date,
    Datetime,
    Decimal,
    Integer,
    Boolean,
    Tinyint,
    Smallint,
    Mediumint,
    Bigint,
    Real,
    Double,
    Float,
    Blob,
    /// A kind without a storage mapping in this adapter.
    Other(String),
}

/// Column type affinity emitted in DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    Text,
    Numeric,
    Integer,
    Real,
    Blob,
}

impl StorageClass {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            StorageClass::Text => "TEXT",
            StorageClass::Numeric => "NUMERIC",
            StorageClass::Integer => "INTEGER",
            StorageClass::Real => "REAL",
            StorageClass::Blob => "BLOB",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Value conversion applied for a kind, in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Codec {
    Boolean,
    Json,
    /// `parse_on_read` is only set for INTEGER itself; the other integer kinds pass through on read.
    Integer { parse_on_read: bool },
    Float,
    Timestamp,
    Passthrough,
}

impl FieldKind {
    /// Storage class and codec for every kind.
    pub(crate) fn descriptor(&self) -> (Option<StorageClass>, Codec) {
        match self {
            FieldKind::Text | FieldKind::Varchar | FieldKind::Character | FieldKind::Uuid => {
                (Some(StorageClass::Text), Codec::Passthrough)
            }
            FieldKind::Json => (Some(StorageClass::Text), Codec::Json),
            FieldKind::Numeric | FieldKind::Decimal => {
                (Some(StorageClass::Numeric), Codec::Passthrough)
            }
            FieldKind::Date | FieldKind::Datetime => {
                (Some(StorageClass::Numeric), Codec::Timestamp)
            }
            FieldKind::Integer => (
                Some(StorageClass::Integer),
                Codec::Integer {
                    parse_on_read: true,
                },
            ),
            FieldKind::Boolean => (Some(StorageClass::Integer), Codec::Boolean),
            FieldKind::Tinyint | FieldKind::Smallint | FieldKind::Mediumint | FieldKind::Bigint => (
                Some(StorageClass::Integer),
                Codec::Integer {
                    parse_on_read: false,
                },
            ),
            FieldKind::Real | FieldKind::Double | FieldKind::Float => {
                (Some(StorageClass::Real), Codec::Float)
            }
            FieldKind::Blob => (Some(StorageClass::Blob), Codec::Passthrough),
            FieldKind::Other(_) => (None, Codec::Passthrough),
        }
    }

    /// Column type for this kind, or `None` when the adapter has no mapping.
    #[must_use]
    pub fn storage_class(&self) -> Option<StorageClass> {
        self.descriptor().0
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "TEXT",
            FieldKind::Varchar => "VARCHAR",
            FieldKind::Character => "CHARACTER",
            FieldKind::Json => "JSON",
            FieldKind::Uuid => "UUID",
            FieldKind::Numeric => "NUMERIC",
            FieldKind::Date => "DATE",
            FieldKind::Datetime => "DATETIME",
            FieldKind::Decimal => "DECIMAL",
            FieldKind::Integer => "INTEGER",
            FieldKind::Boolean => "BOOLEAN",
            FieldKind::Tinyint => "TINYINT",
            FieldKind::Smallint => "SMALLINT",
            FieldKind::Mediumint => "MEDIUMINT",
            FieldKind::Bigint => "BIGINT",
            FieldKind::Real => "REAL",
            FieldKind::Double => "DOUBLE",
            FieldKind::Float => "FLOAT",
            FieldKind::Blob => "BLOB",
            FieldKind::Other(name) => name,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_uppercase().as_str() {
            "TEXT" => FieldKind::Text,
            "VARCHAR" => FieldKind::Varchar,
            "CHARACTER" => FieldKind::Character,
            "JSON" => FieldKind::Json,
            "UUID" => FieldKind::Uuid,
            "NUMERIC" => FieldKind::Numeric,
            "DATE" => FieldKind::Date,
            "DATETIME" => FieldKind::Datetime,
            "DECIMAL" => FieldKind::Decimal,
            "INTEGER" => FieldKind::Integer,
            "BOOLEAN" => FieldKind::Boolean,
            "TINYINT" => FieldKind::Tinyint,
            "SMALLINT" => FieldKind::Smallint,
            "MEDIUMINT" => FieldKind::Mediumint,
            "BIGINT" => FieldKind::Bigint,
            "REAL" => FieldKind::Real,
            "DOUBLE" => FieldKind::Double,
            "FLOAT" => FieldKind::Float,
            "BLOB" => FieldKind::Blob,
            _ => FieldKind::Other(s.trim().to_string()),
        };
        Ok(kind)
    }
}

impl From<String> for FieldKind {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Domain-side value of a single field.
///
/// Reuse the same enum for every kind so models do not need to branch on driver types:
/// ```rust
/// use sqlite_storage_adapter::prelude::*;
///
/// let values = vec![
///     FieldValue::Int(1),
///     FieldValue::Text("alice".into()),
///     FieldValue::Bool(true),
/// ];
/// # let _ = values;
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// No value; stored as NULL
    #[default]
    Absent,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(JsonValue),
    Timestamp(DateTime<Utc>),
    Blob(Vec<u8>),
}

impl FieldValue {
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if let FieldValue::Bool(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let FieldValue::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            FieldValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let FieldValue::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&JsonValue> {
        if let FieldValue::Json(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        if let FieldValue::Timestamp(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let FieldValue::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<JsonValue> for FieldValue {
    fn from(value: JsonValue) -> Self {
        FieldValue::Json(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        FieldValue::Blob(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Absent, Into::into)
    }
}
