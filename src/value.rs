// ABOUTME: Bind-value enum and dynamic row decoding shared by the query layer
// ABOUTME: Converts between serde_json payloads, sqlx bind parameters, and row maps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use base64::{engine::general_purpose, Engine};
use serde_json::Value;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// A row returned by the toolkit: an opaque, string-keyed column map.
///
/// Domain entities are externally defined by the host application's schema;
/// this crate never assigns them static shapes.
pub type RowMap = serde_json::Map<String, Value>;

/// A single bind parameter for a dynamically assembled query.
///
/// SQLite's storage classes collapse to these four; everything else
/// (booleans, JSON blobs) is coerced before binding.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Real(f64),
    Text(String),
    Null,
}

impl SqlValue {
    /// Coerce a raw filter value: integral strings bind as integers,
    /// everything else binds as text.
    pub(crate) fn coerce(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Text(raw.to_string()),
        }
    }

    /// Convert a JSON payload value into a bind parameter.
    ///
    /// Empty strings become NULL — "filter absent" and "column absent"
    /// semantics both treat `""` as no value at all.
    pub(crate) fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Int(i64::from(*b)),
            Value::Number(n) => n.as_i64().map_or_else(
                || n.as_f64().map_or(Self::Null, Self::Real),
                Self::Int,
            ),
            Value::String(s) if s.is_empty() => Self::Null,
            Value::String(s) => Self::Text(s.clone()),
            // Structured values (selected_attributes etc.) are stored as JSON text
            other => Self::Text(other.to_string()),
        }
    }

    pub(crate) fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub(crate) fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }
}

/// Bind an ordered parameter list onto a dynamically built query.
pub(crate) fn bind_all<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlValue],
) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>> {
    for value in params {
        query = match value {
            SqlValue::Int(n) => query.bind(*n),
            SqlValue::Real(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Null => query.bind(Option::<String>::None),
        };
    }
    query
}

/// Decode a row into a column map using the value's runtime storage class.
///
/// Column lists are dynamic (per-entity config plus optional translation
/// columns), so rows cannot be decoded into static structs here.
pub(crate) fn row_to_map(row: &SqliteRow) -> Result<RowMap, sqlx::Error> {
    let mut map = RowMap::new();
    for (index, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => Value::from(row.try_get::<i64, _>(index)?),
                "REAL" => Value::from(row.try_get::<f64, _>(index)?),
                "BLOB" => Value::from(
                    general_purpose::STANDARD.encode(row.try_get::<Vec<u8>, _>(index)?),
                ),
                _ => Value::from(row.try_get::<String, _>(index)?),
            }
        };
        map.insert(column.name().to_string(), value);
    }
    Ok(map)
}
