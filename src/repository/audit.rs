// ABOUTME: Append-only audit trail written to the entity_logs table
// ABOUTME: Closed action enum; update entries record per-field old/new values as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::SqliteConnection;

use crate::errors::{RepositoryError, RepositoryResult};
use crate::store::Store;
use crate::value::RowMap;

/// Audited action kinds. The set is closed; anything else is rejected as
/// malformed input at the [`AuditLogger`] boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Parse from the string representation; unknown actions yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Acting-user context attached to every audit entry.
#[derive(Debug, Clone)]
pub struct AuditContext {
    pub user_id: i64,
    pub ip_address: Option<String>,
}

/// Standalone append-only writer for callers outside the generic repository
/// (service layers logging domain events directly).
pub struct AuditLogger {
    store: Store,
}

impl AuditLogger {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Append one entry. The action string must be a member of the closed
    /// [`AuditAction`] enum; anything else is a validation error, not a
    /// silently-coerced value.
    pub async fn append(
        &self,
        tenant_id: Option<i64>,
        ctx: &AuditContext,
        entity_type: &str,
        entity_id: i64,
        action: &str,
        changes: Value,
    ) -> RepositoryResult<()> {
        let action = AuditAction::parse(action)
            .ok_or_else(|| RepositoryError::validation(format!("unknown action_type: {action}")))?;
        let mut conn = self.store.pool().acquire().await?;
        record(&mut conn, tenant_id, ctx, entity_type, entity_id, action, &changes).await?;
        Ok(())
    }
}

/// Insert one audit row on an existing connection, so repository mutations
/// can log inside the transaction that performs the write.
pub(crate) async fn record(
    conn: &mut SqliteConnection,
    tenant_id: Option<i64>,
    ctx: &AuditContext,
    entity_type: &str,
    entity_id: i64,
    action: AuditAction,
    changes: &Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        INSERT INTO entity_logs
            (tenant_id, user_id, entity_type, entity_id, action, changes, ip_address, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(tenant_id)
    .bind(ctx.user_id)
    .bind(entity_type)
    .bind(entity_id)
    .bind(action.as_str())
    .bind(changes.to_string())
    .bind(ctx.ip_address.as_deref())
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Per-field `{old, new}` change set over the given columns.
pub(crate) fn diff(old: &RowMap, new: &RowMap, columns: &[&str]) -> Value {
    let mut changes = serde_json::Map::new();
    for col in columns {
        let before = old.get(*col).cloned().unwrap_or(Value::Null);
        let after = new.get(*col).cloned().unwrap_or(Value::Null);
        if before != after {
            changes.insert((*col).to_string(), json!({ "old": before, "new": after }));
        }
    }
    Value::Object(changes)
}

#[cfg(test)]
mod tests {
    use super::{diff, AuditAction};
    use crate::value::RowMap;
    use serde_json::json;

    #[test]
    fn action_enum_round_trips_and_rejects_unknown() {
        assert_eq!(AuditAction::parse("create"), Some(AuditAction::Create));
        assert_eq!(AuditAction::Update.as_str(), "update");
        assert_eq!(AuditAction::parse("upsert"), None);
        assert_eq!(AuditAction::parse(""), None);
    }

    #[test]
    fn diff_records_only_changed_columns() {
        let old: RowMap = [
            ("sku".to_string(), json!("SKU-AAAA")),
            ("quantity".to_string(), json!(1)),
        ]
        .into_iter()
        .collect();
        let new: RowMap = [
            ("sku".to_string(), json!("SKU-AAAA")),
            ("quantity".to_string(), json!(3)),
        ]
        .into_iter()
        .collect();

        let changes = diff(&old, &new, &["sku", "quantity"]);
        assert_eq!(changes["quantity"], json!({"old": 1, "new": 3}));
        assert!(changes.get("sku").is_none());
    }
}
