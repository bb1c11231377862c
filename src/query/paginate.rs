// ABOUTME: LIMIT/OFFSET application and the items+total page envelope
// ABOUTME: Pagination values bind as integer parameters, never string-interpolated
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use serde::Serialize;

use crate::value::SqlValue;

/// One page of results plus the total matching-row count.
///
/// `total` is computed by a separate `COUNT(*)` under the same filter
/// predicate, without LIMIT/OFFSET. Both queries are plain autocommit reads;
/// no transactional snapshot is implied between them.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Append `LIMIT`/`OFFSET` clauses for the values that are present and push
/// the matching integer bind parameters.
///
/// Negative values are clamped to zero. SQLite requires a LIMIT clause
/// before OFFSET, so an offset without a limit renders as `LIMIT -1`
/// (unbounded) plus the offset.
pub fn apply(sql: &mut String, params: &mut Vec<SqlValue>, limit: Option<i64>, offset: Option<i64>) {
    match (limit, offset) {
        (Some(limit), Some(offset)) => {
            sql.push_str(" LIMIT ? OFFSET ?");
            params.push(SqlValue::Int(limit.max(0)));
            params.push(SqlValue::Int(offset.max(0)));
        }
        (Some(limit), None) => {
            sql.push_str(" LIMIT ?");
            params.push(SqlValue::Int(limit.max(0)));
        }
        (None, Some(offset)) => {
            sql.push_str(" LIMIT -1 OFFSET ?");
            params.push(SqlValue::Int(offset.max(0)));
        }
        (None, None) => {}
    }
}
