//! Field Marshaller: conversion between [`FieldValue`] and the primitive values `SQLite`
//! accepts and returns, plus the kind to column type mapping used in DDL.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use rusqlite::types::Value;
use serde_json::Value as JsonValue;

use crate::error::SqliteAdapterError;
use crate::schema::Field;
use crate::types::{Codec, FieldValue, StorageClass};

static LEADING_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid integer regex"));

static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").expect("valid float regex")
});

/// Column type for a field.
///
/// # Errors
/// Returns `SqliteAdapterError::FieldKindNotSupported` when the kind has no storage mapping.
pub fn field_cast(field: &Field) -> Result<StorageClass, SqliteAdapterError> {
    field
        .kind()
        .storage_class()
        .ok_or_else(|| SqliteAdapterError::FieldKindNotSupported {
            field: field.name().to_string(),
            kind: field.kind().clone(),
        })
}

/// Storage to domain conversion.
///
/// NULL always becomes [`FieldValue::Absent`].
///
/// # Errors
/// Returns `SqliteAdapterError::JsonError` for malformed JSON text and
/// `SqliteAdapterError::ConversionError` when the stored value cannot be read as the field kind.
pub fn from_storage(field: &Field, value: Value) -> Result<FieldValue, SqliteAdapterError> {
    if matches!(value, Value::Null) {
        return Ok(FieldValue::Absent);
    }

    let (_, codec) = field.kind().descriptor();
    match codec {
        Codec::Boolean => Ok(match value {
            Value::Text(s) if s == "true" => FieldValue::Bool(true),
            Value::Text(s) if s == "false" => FieldValue::Bool(false),
            Value::Integer(1) => FieldValue::Bool(true),
            Value::Integer(0) => FieldValue::Bool(false),
            other => passthrough_from(other),
        }),
        Codec::Json => match value {
            Value::Text(s) => Ok(FieldValue::Json(serde_json::from_str(&s)?)),
            Value::Blob(bytes) => Ok(FieldValue::Json(serde_json::from_slice(&bytes)?)),
            Value::Integer(i) => Ok(FieldValue::Json(JsonValue::from(i))),
            Value::Real(f) => Ok(FieldValue::Json(JsonValue::from(f))),
            Value::Null => Ok(FieldValue::Absent),
        },
        Codec::Integer {
            parse_on_read: true,
        } => Ok(FieldValue::Int(parse_integer_stored(field, &value)?)),
        Codec::Timestamp => Ok(FieldValue::Timestamp(timestamp_from_stored(field, &value)?)),
        Codec::Integer {
            parse_on_read: false,
        }
        | Codec::Float
        | Codec::Passthrough => Ok(passthrough_from(value)),
    }
}

/// Domain to storage conversion.
///
/// [`FieldValue::Absent`] always becomes NULL.
///
/// # Errors
/// Returns `SqliteAdapterError::ConversionError` when the value cannot be represented in the
/// field's storage type, or `SqliteAdapterError::JsonError` if JSON serialization fails.
pub fn to_storage(field: &Field, value: FieldValue) -> Result<Value, SqliteAdapterError> {
    if value.is_absent() {
        return Ok(Value::Null);
    }

    let (_, codec) = field.kind().descriptor();
    match codec {
        Codec::Boolean => Ok(match value {
            FieldValue::Bool(b) => Value::Integer(i64::from(b)),
            other => passthrough_to(other),
        }),
        Codec::Json => Ok(Value::Text(serde_json::to_string(&json_of(value))?)),
        Codec::Integer { .. } => Ok(Value::Integer(parse_integer_domain(field, &value)?)),
        Codec::Float => Ok(Value::Real(parse_float_domain(field, &value)?)),
        Codec::Timestamp => Ok(Value::Integer(timestamp_to_millis(field, &value)?)),
        Codec::Passthrough => Ok(passthrough_to(value)),
    }
}

/// Storage value as-is, used for columns without a schema field.
pub(crate) fn passthrough_from(value: Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Absent,
        Value::Integer(i) => FieldValue::Int(i),
        Value::Real(f) => FieldValue::Float(f),
        Value::Text(s) => FieldValue::Text(s),
        Value::Blob(b) => FieldValue::Blob(b),
    }
}

/// Domain value as-is, used for kinds without a codec and for ad-hoc `where` parameters.
pub(crate) fn passthrough_to(value: FieldValue) -> Value {
    match value {
        FieldValue::Absent => Value::Null,
        FieldValue::Bool(b) => Value::Integer(i64::from(b)),
        FieldValue::Int(i) => Value::Integer(i),
        FieldValue::Float(f) => Value::Real(f),
        FieldValue::Text(s) => Value::Text(s),
        FieldValue::Json(json) => Value::Text(json.to_string()),
        FieldValue::Timestamp(ts) => Value::Integer(ts.timestamp_millis()),
        FieldValue::Blob(b) => Value::Blob(b),
    }
}

fn json_of(value: FieldValue) -> JsonValue {
    match value {
        FieldValue::Absent => JsonValue::Null,
        FieldValue::Bool(b) => JsonValue::Bool(b),
        FieldValue::Int(i) => JsonValue::from(i),
        FieldValue::Float(f) => JsonValue::from(f),
        FieldValue::Text(s) => JsonValue::String(s),
        FieldValue::Json(json) => json,
        FieldValue::Timestamp(ts) => JsonValue::String(ts.to_rfc3339()),
        FieldValue::Blob(b) => JsonValue::from(b),
    }
}

fn conversion_error(field: &Field, detail: impl std::fmt::Display) -> SqliteAdapterError {
    SqliteAdapterError::ConversionError(format!(
        "field `{}` ({}): {detail}",
        field.name(),
        field.kind()
    ))
}

/// Leading-integer parse of text, e.g. `" 42px"` is 42.
fn parse_integer_text(field: &Field, text: &str) -> Result<i64, SqliteAdapterError> {
    LEADING_INTEGER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .ok_or_else(|| conversion_error(field, format!("`{text}` is not an integer")))
}

fn parse_float_text(field: &Field, text: &str) -> Result<f64, SqliteAdapterError> {
    LEADING_FLOAT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .ok_or_else(|| conversion_error(field, format!("`{text}` is not a number")))
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_real(field: &Field, f: f64) -> Result<i64, SqliteAdapterError> {
    if f.is_finite() {
        Ok(f.trunc() as i64)
    } else {
        Err(conversion_error(field, format!("{f} is not a finite number")))
    }
}

fn parse_integer_stored(field: &Field, value: &Value) -> Result<i64, SqliteAdapterError> {
    match value {
        Value::Integer(i) => Ok(*i),
        Value::Real(f) => truncate_real(field, *f),
        Value::Text(s) => parse_integer_text(field, s),
        Value::Blob(_) | Value::Null => Err(conversion_error(field, "expected an integer")),
    }
}

fn parse_integer_domain(field: &Field, value: &FieldValue) -> Result<i64, SqliteAdapterError> {
    match value {
        FieldValue::Int(i) => Ok(*i),
        FieldValue::Bool(b) => Ok(i64::from(*b)),
        FieldValue::Float(f) => truncate_real(field, *f),
        FieldValue::Text(s) => parse_integer_text(field, s),
        FieldValue::Json(JsonValue::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(i),
            (None, Some(f)) => truncate_real(field, f),
            (None, None) => Err(conversion_error(field, format!("{n} is out of range"))),
        },
        other => Err(conversion_error(field, format!("{other:?} is not an integer"))),
    }
}

#[allow(clippy::cast_precision_loss)]
fn parse_float_domain(field: &Field, value: &FieldValue) -> Result<f64, SqliteAdapterError> {
    match value {
        FieldValue::Float(f) => Ok(*f),
        FieldValue::Int(i) => Ok(*i as f64),
        FieldValue::Text(s) => parse_float_text(field, s),
        FieldValue::Json(JsonValue::Number(n)) => n
            .as_f64()
            .ok_or_else(|| conversion_error(field, format!("{n} is out of range"))),
        other => Err(conversion_error(field, format!("{other:?} is not a number"))),
    }
}

fn timestamp_from_millis(field: &Field, millis: i64) -> Result<DateTime<Utc>, SqliteAdapterError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| conversion_error(field, format!("{millis} ms is out of range")))
}

fn timestamp_from_text(field: &Field, text: &str) -> Result<DateTime<Utc>, SqliteAdapterError> {
    if let Ok(millis) = text.trim().parse::<i64>() {
        return timestamp_from_millis(field, millis);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    // "YYYY-MM-DD HH:MM:SS" with optional fraction, read as UTC
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(dt.and_utc());
    }
    Err(conversion_error(field, format!("`{text}` is not a timestamp")))
}

fn timestamp_from_stored(field: &Field, value: &Value) -> Result<DateTime<Utc>, SqliteAdapterError> {
    match value {
        Value::Integer(millis) => timestamp_from_millis(field, *millis),
        Value::Real(f) => timestamp_from_millis(field, truncate_real(field, *f)?),
        Value::Text(s) => timestamp_from_text(field, s),
        Value::Blob(_) | Value::Null => Err(conversion_error(field, "expected a timestamp")),
    }
}

fn timestamp_to_millis(field: &Field, value: &FieldValue) -> Result<i64, SqliteAdapterError> {
    match value {
        FieldValue::Timestamp(ts) => Ok(ts.timestamp_millis()),
        FieldValue::Int(millis) => Ok(*millis),
        FieldValue::Text(s) => Ok(timestamp_from_text(field, s)?.timestamp_millis()),
        other => Err(conversion_error(field, format!("{other:?} is not a timestamp"))),
    }
}
