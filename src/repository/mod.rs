// ABOUTME: Generic tenant-scoped repository: list/count/get/upsert/delete over one EntityConfig
// ABOUTME: Concrete entities are thin configurations over this single implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

//! The generic repository.
//!
//! One implementation serves every configured entity: reads compose the
//! allow-list, filter builder, tenant scope, and paginator; mutations
//! re-verify tenant ownership inside a transaction before touching rows.
//! Every operation is a single request/response exchange with storage —
//! there is no cross-request state and no retry logic at this layer.

pub mod audit;

use std::sync::Arc;

use rand::{Rng, RngCore};
use serde::Deserialize;
use serde_json::Value;
use sqlx::{Row, SqliteConnection};
use tracing::{debug, warn};

use crate::config::{ColumnDefault, EntityConfig, ParentTenantSql, TenantPredicate};
use crate::crypto::FieldCipher;
use crate::errors::{RepositoryError, RepositoryResult};
use crate::query::{allowlist, filter, paginate, FilterSpec, PageResult};
use crate::store::Store;
use crate::value::{bind_all, row_to_map, RowMap, SqlValue};

use audit::{AuditAction, AuditContext};

/// Language used for translation joins when the request does not specify one.
const DEFAULT_LANG: &str = "ar";

/// Listing request: pagination, filters, ordering, and request language.
///
/// Bad `order_by`/`order_dir` values never fail a request — they degrade to
/// the entity's defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(default)]
    pub filters: FilterSpec,
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
    pub lang: Option<String>,
}

/// Tenant-scoped repository over one [`EntityConfig`].
pub struct Repository {
    store: Store,
    config: &'static EntityConfig,
    cipher: Option<Arc<dyn FieldCipher>>,
    audit: Option<AuditContext>,
}

impl Repository {
    #[must_use]
    pub fn new(store: Store, config: &'static EntityConfig) -> Self {
        Self {
            store,
            config,
            cipher: None,
            audit: None,
        }
    }

    /// Attach a field cipher. Required before writing to entities with
    /// encrypted columns.
    #[must_use]
    pub fn with_cipher(mut self, cipher: Arc<dyn FieldCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Attach an acting-user context; mutations then write `entity_logs`
    /// entries inside their own transaction.
    #[must_use]
    pub fn with_audit(mut self, ctx: AuditContext) -> Self {
        self.audit = Some(ctx);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &'static EntityConfig {
        self.config
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// List rows under the tenant scope with filters, ordering, pagination,
    /// and the per-request translation language.
    pub async fn list(
        &self,
        tenant_id: i64,
        params: &ListParams,
    ) -> RepositoryResult<PageResult<RowMap>> {
        let plan = filter::build(self.config, tenant_id, &params.filters);
        let sort_col = allowlist::resolve_sort_column(params.order_by.as_deref(), self.config);
        let sort_dir = allowlist::resolve_sort_direction(params.order_dir.as_deref());
        let alias = self.config.alias;

        let mut sql = format!("SELECT {alias}.*");
        let mut binds: Vec<SqlValue> = Vec::new();
        let mut joins = plan.joins.clone();
        if let Some(tr) = &self.config.translation {
            for col in tr.columns {
                sql.push_str(&format!(", COALESCE({}.{col}, '') AS {col}", tr.alias));
            }
            joins.push_str(&format!(
                " LEFT JOIN {} {} ON {}.{} = {alias}.{} AND {}.{} = ?",
                tr.table,
                tr.alias,
                tr.alias,
                tr.parent_column,
                self.config.primary_key,
                tr.alias,
                tr.lang_column,
            ));
            binds.push(SqlValue::Text(
                params.lang.clone().unwrap_or_else(|| DEFAULT_LANG.to_string()),
            ));
        }
        sql.push_str(&format!(
            " FROM {} {alias}{joins} {}",
            self.config.table, plan.where_sql
        ));
        sql.push_str(&format!(" ORDER BY {alias}.{sort_col} {}", sort_dir.as_sql()));
        binds.extend(plan.params.iter().cloned());
        paginate::apply(&mut sql, &mut binds, params.limit, params.offset);

        let mut conn = self.store.pool().acquire().await?;
        let rows = bind_all(sqlx::query(&sql), &binds)
            .fetch_all(&mut *conn)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut map = row_to_map(row)?;
            self.decrypt_row(tenant_id, &mut map);
            items.push(map);
        }
        let total = self.count_on(&mut conn, tenant_id, &params.filters).await?;
        debug!(
            entity = self.config.entity,
            tenant_id,
            rows = items.len(),
            total,
            "list"
        );
        Ok(PageResult { items, total })
    }

    /// Count rows matching the filters under the tenant scope.
    pub async fn count(&self, tenant_id: i64, filters: &FilterSpec) -> RepositoryResult<i64> {
        let mut conn = self.store.pool().acquire().await?;
        self.count_on(&mut conn, tenant_id, filters).await
    }

    /// Tenant-scoped point lookup.
    ///
    /// Returns `None` both when the row does not exist and when it belongs
    /// to another tenant; the two cases are indistinguishable by design.
    pub async fn get(&self, tenant_id: i64, id: i64) -> RepositoryResult<Option<RowMap>> {
        let plan = filter::build(self.config, tenant_id, &FilterSpec::new());
        let alias = self.config.alias;

        let mut sql = format!("SELECT {alias}.*");
        let mut binds: Vec<SqlValue> = Vec::new();
        let mut joins = plan.joins.clone();
        if let Some(tr) = &self.config.translation {
            for col in tr.columns {
                sql.push_str(&format!(", COALESCE({}.{col}, '') AS {col}", tr.alias));
            }
            joins.push_str(&format!(
                " LEFT JOIN {} {} ON {}.{} = {alias}.{} AND {}.{} = ?",
                tr.table,
                tr.alias,
                tr.alias,
                tr.parent_column,
                self.config.primary_key,
                tr.alias,
                tr.lang_column,
            ));
            binds.push(SqlValue::Text(DEFAULT_LANG.to_string()));
        }
        sql.push_str(&format!(
            " FROM {} {alias}{joins} {} AND {} = ? LIMIT 1",
            self.config.table,
            plan.where_sql,
            self.config.qualified_pk()
        ));
        binds.extend(plan.params.iter().cloned());
        binds.push(SqlValue::Int(id));

        let row = bind_all(sqlx::query(&sql), &binds)
            .fetch_optional(self.store.pool())
            .await?;
        match row {
            Some(row) => {
                let mut map = row_to_map(&row)?;
                self.decrypt_row(tenant_id, &mut map);
                Ok(Some(map))
            }
            None => Ok(None),
        }
    }

    /// Insert or update based on the presence of `id` in the payload.
    ///
    /// Updates are tenant-scoped and fail with `NotFoundOrForbidden` when
    /// they would touch zero rows. Inserts inject the tenant server-side
    /// (the payload's tenant column is never trusted), apply the configured
    /// defaults, and verify parent ownership for configured foreign keys.
    /// The whole operation, audit entry included, runs in one transaction.
    pub async fn upsert(&self, tenant_id: i64, data: &RowMap) -> RepositoryResult<i64> {
        let id = data.get("id").and_then(Value::as_i64).filter(|id| *id != 0);

        let mut tx = self.store.pool().begin().await?;
        let result = match id {
            Some(id) => self.update_in_tx(&mut tx, tenant_id, id, data).await,
            None => self.insert_in_tx(&mut tx, tenant_id, data).await,
        };
        match result {
            Ok(id) => {
                tx.commit().await?;
                Ok(id)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    /// Tenant-scoped delete. Returns whether a row was actually removed;
    /// cross-tenant ids report `false`, exactly like missing ids.
    pub async fn delete(&self, tenant_id: i64, id: i64) -> RepositoryResult<bool> {
        let mut tx = self.store.pool().begin().await?;

        let Some(old) = self.fetch_scoped_row(&mut tx, tenant_id, id).await? else {
            warn!(entity = self.config.entity, tenant_id, id, "delete rejected: not visible to tenant");
            return Ok(false);
        };

        let mut sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            self.config.table, self.config.primary_key
        );
        let mut binds = vec![SqlValue::Int(id)];
        if let TenantPredicate::Direct { column } = self.config.tenant {
            sql.push_str(&format!(" AND {column} = ?"));
            binds.push(SqlValue::Int(tenant_id));
        }
        let affected = bind_all(sqlx::query(&sql), &binds)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if let Some(ctx) = &self.audit {
            audit::record(
                &mut tx,
                Some(tenant_id),
                ctx,
                self.config.entity,
                id,
                AuditAction::Delete,
                &Value::Object(old),
            )
            .await?;
        }
        tx.commit().await?;
        debug!(entity = self.config.entity, tenant_id, id, "delete");
        Ok(affected > 0)
    }

    // ---- internals -----------------------------------------------------

    async fn count_on(
        &self,
        conn: &mut SqliteConnection,
        tenant_id: i64,
        filters: &FilterSpec,
    ) -> RepositoryResult<i64> {
        let plan = filter::build(self.config, tenant_id, filters);
        let sql = format!(
            "SELECT COUNT(*) FROM {} {}{} {}",
            self.config.table, self.config.alias, plan.joins, plan.where_sql
        );
        let row = bind_all(sqlx::query(&sql), &plan.params)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    /// Scoped lookup on the mutation transaction, base columns only
    /// (no translation join), used for ownership checks and audit capture.
    async fn fetch_scoped_row(
        &self,
        conn: &mut SqliteConnection,
        tenant_id: i64,
        id: i64,
    ) -> RepositoryResult<Option<RowMap>> {
        let plan = filter::build(self.config, tenant_id, &FilterSpec::new());
        let sql = format!(
            "SELECT {}.* FROM {} {}{} {} AND {} = ? LIMIT 1",
            self.config.alias,
            self.config.table,
            self.config.alias,
            plan.joins,
            plan.where_sql,
            self.config.qualified_pk()
        );
        let mut binds = plan.params;
        binds.push(SqlValue::Int(id));
        let row = bind_all(sqlx::query(&sql), &binds)
            .fetch_optional(&mut *conn)
            .await?;
        row.map(|r| row_to_map(&r)).transpose().map_err(Into::into)
    }

    /// Insert path, callable from a caller-owned transaction (bulk child
    /// saves reuse it so the whole compound write stays atomic).
    pub(crate) async fn insert_in_tx(
        &self,
        conn: &mut SqliteConnection,
        tenant_id: i64,
        data: &RowMap,
    ) -> RepositoryResult<i64> {
        let mut columns: Vec<(&'static str, SqlValue)> = self
            .config
            .insert_columns
            .iter()
            .map(|col| {
                let value = data.get(*col).map_or(SqlValue::Null, SqlValue::from_json);
                (*col, value)
            })
            .collect();

        for required in self.config.required {
            let missing = columns
                .iter()
                .find(|(col, _)| col == required)
                .is_none_or(|(_, value)| value.is_null());
            if missing {
                return Err(RepositoryError::validation(format!("{required} is required")));
            }
        }

        for (col, default) in self.config.defaults {
            if let Some(slot) = columns.iter_mut().find(|(name, _)| *name == *col) {
                if slot.1.is_null() {
                    slot.1 = materialize_default(default, data);
                }
            }
        }

        // Tenant column is set server-side; the payload value is discarded.
        if let TenantPredicate::Direct { column } = self.config.tenant {
            match columns.iter_mut().find(|(name, _)| *name == column) {
                Some(slot) => slot.1 = SqlValue::Int(tenant_id),
                None => columns.push((column, SqlValue::Int(tenant_id))),
            }
        }

        for check in self.config.parent_checks {
            let Some(parent_id) = columns
                .iter()
                .find(|(name, _)| *name == check.column)
                .and_then(|(_, value)| value.as_i64())
            else {
                continue;
            };
            if !self.parent_owned(conn, check, parent_id, tenant_id).await? {
                warn!(
                    entity = self.config.entity,
                    tenant_id,
                    parent = check.parent_table,
                    parent_id,
                    "insert rejected: parent not visible to tenant"
                );
                return Err(RepositoryError::not_found(check.parent_table, parent_id));
            }
        }

        let entity_scope = columns
            .iter()
            .find(|(name, _)| *name == "entity_id")
            .and_then(|(_, value)| value.as_i64())
            .unwrap_or(0);
        self.encrypt_columns(tenant_id, entity_scope, &mut columns)?;

        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            self.config.table,
            names.join(", ")
        );
        let binds: Vec<SqlValue> = columns.iter().map(|(_, value)| value.clone()).collect();
        let result = bind_all(sqlx::query(&sql), &binds)
            .execute(&mut *conn)
            .await?;
        let id = result.last_insert_rowid();

        if let Some(ctx) = &self.audit {
            let mut inserted = RowMap::new();
            for (name, value) in &columns {
                inserted.insert((*name).to_string(), sql_value_to_json(value));
            }
            audit::record(
                conn,
                Some(tenant_id),
                ctx,
                self.config.entity,
                id,
                AuditAction::Create,
                &Value::Object(inserted),
            )
            .await?;
        }
        debug!(entity = self.config.entity, tenant_id, id, "insert");
        Ok(id)
    }

    async fn update_in_tx(
        &self,
        conn: &mut SqliteConnection,
        tenant_id: i64,
        id: i64,
        data: &RowMap,
    ) -> RepositoryResult<i64> {
        let Some(old) = self.fetch_scoped_row(conn, tenant_id, id).await? else {
            warn!(entity = self.config.entity, tenant_id, id, "update rejected: not visible to tenant");
            return Err(RepositoryError::not_found(self.config.entity, id));
        };

        let tenant_column = match self.config.tenant {
            TenantPredicate::Direct { column } => Some(column),
            TenantPredicate::Joined { .. } => None,
        };

        // Partial update: only payload-provided, allow-listed columns move.
        let mut columns: Vec<(&'static str, SqlValue)> = self
            .config
            .insert_columns
            .iter()
            .filter(|col| Some(**col) != tenant_column)
            .filter_map(|col| data.get(*col).map(|value| (*col, SqlValue::from_json(value))))
            .collect();
        if columns.is_empty() {
            return Ok(id);
        }
        // Encryption scope comes from the stored row, not the payload: a
        // partial update may omit entity_id, and re-encrypting under a wrong
        // scope would make the value undecryptable on every later read.
        let entity_scope = old.get("entity_id").and_then(Value::as_i64).unwrap_or(0);
        self.encrypt_columns(tenant_id, entity_scope, &mut columns)?;

        let mut set_parts: Vec<String> =
            columns.iter().map(|(name, _)| format!("{name} = ?")).collect();
        if self.config.touch_updated_at {
            set_parts.push("updated_at = CURRENT_TIMESTAMP".to_string());
        }
        let mut sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            self.config.table,
            set_parts.join(", "),
            self.config.primary_key
        );
        let mut binds: Vec<SqlValue> =
            columns.iter().map(|(_, value)| value.clone()).collect();
        binds.push(SqlValue::Int(id));
        if let Some(column) = tenant_column {
            sql.push_str(&format!(" AND {column} = ?"));
            binds.push(SqlValue::Int(tenant_id));
        }

        let affected = bind_all(sqlx::query(&sql), &binds)
            .execute(&mut *conn)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(RepositoryError::not_found(self.config.entity, id));
        }

        if let Some(ctx) = &self.audit {
            let new = self
                .fetch_scoped_row(conn, tenant_id, id)
                .await?
                .unwrap_or_default();
            let changes = audit::diff(&old, &new, self.config.insert_columns);
            audit::record(
                conn,
                Some(tenant_id),
                ctx,
                self.config.entity,
                id,
                AuditAction::Update,
                &changes,
            )
            .await?;
        }
        debug!(entity = self.config.entity, tenant_id, id, "update");
        Ok(id)
    }

    async fn parent_owned(
        &self,
        conn: &mut SqliteConnection,
        check: &crate::config::ParentCheck,
        parent_id: i64,
        tenant_id: i64,
    ) -> RepositoryResult<bool> {
        let sql = match check.tenant_sql {
            ParentTenantSql::Column(tenant_column) => format!(
                "SELECT COUNT(*) FROM {} WHERE {} = ? AND {tenant_column} = ?",
                check.parent_table, check.parent_key
            ),
            ParentTenantSql::Joined {
                join_table,
                join_alias,
                on_left,
                on_right,
                tenant_column,
            } => format!(
                "SELECT COUNT(*) FROM {} INNER JOIN {join_table} {join_alias} ON {on_left} = {on_right} WHERE {}.{} = ? AND {tenant_column} = ?",
                check.parent_table, check.parent_table, check.parent_key
            ),
        };
        let count: i64 = sqlx::query(&sql)
            .bind(parent_id)
            .bind(tenant_id)
            .fetch_one(&mut *conn)
            .await?
            .try_get(0)?;
        Ok(count > 0)
    }

    fn encrypt_columns(
        &self,
        tenant_id: i64,
        entity_scope: i64,
        columns: &mut [(&'static str, SqlValue)],
    ) -> RepositoryResult<()> {
        if self.config.encrypted.is_empty() {
            return Ok(());
        }
        for (name, value) in columns.iter_mut() {
            if !self.config.encrypted.contains(&*name) {
                continue;
            }
            if let SqlValue::Text(plaintext) = value {
                let cipher = self.cipher.as_ref().ok_or_else(|| RepositoryError::Encryption {
                    context: format!("no field cipher configured for {}", self.config.entity),
                })?;
                let encrypted = cipher
                    .encrypt_field(tenant_id, entity_scope, plaintext)
                    .map_err(|e| RepositoryError::Encryption {
                        context: e.to_string(),
                    })?;
                *value = SqlValue::Text(encrypted);
            }
        }
        Ok(())
    }

    /// Replace encrypted column values with plaintext, substituting `null`
    /// when decryption fails or no cipher is configured. Reads never fail
    /// on undecryptable data.
    fn decrypt_row(&self, tenant_id: i64, row: &mut RowMap) {
        if self.config.encrypted.is_empty() {
            return;
        }
        let entity_scope = row.get("entity_id").and_then(Value::as_i64).unwrap_or(0);
        for col in self.config.encrypted {
            let Some(Value::String(ciphertext)) = row.get(*col) else {
                continue;
            };
            let decrypted = self
                .cipher
                .as_ref()
                .and_then(|c| c.decrypt_field(tenant_id, entity_scope, ciphertext).ok());
            row.insert(
                (*col).to_string(),
                decrypted.map_or(Value::Null, Value::String),
            );
        }
    }
}

fn materialize_default(default: &ColumnDefault, data: &RowMap) -> SqlValue {
    match default {
        ColumnDefault::Text(text) => SqlValue::Text((*text).to_string()),
        ColumnDefault::Int(n) => SqlValue::Int(*n),
        ColumnDefault::GeneratedSku => SqlValue::Text(generate_sku()),
        ColumnDefault::GeneratedSlug { from_field } => {
            let source = data.get(*from_field).and_then(Value::as_str).unwrap_or("");
            SqlValue::Text(generate_slug(source))
        }
    }
}

fn sql_value_to_json(value: &SqlValue) -> Value {
    match value {
        SqlValue::Int(n) => Value::from(*n),
        SqlValue::Real(f) => Value::from(*f),
        SqlValue::Text(s) => Value::from(s.clone()),
        SqlValue::Null => Value::Null,
    }
}

/// `SKU-` plus four random bytes as uppercase hex.
///
/// Collision-resistant through randomness only; uniqueness is enforced (if
/// at all) by table constraints, not by this generator.
fn generate_sku() -> String {
    let mut bytes = [0u8; 4];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("SKU-{}", hex::encode(bytes).to_uppercase())
}

/// Slugified source text plus a time+random suffix.
///
/// Unicode letters (Arabic names included) survive slugification; runs of
/// anything else collapse into single dashes. Same uniqueness caveat as
/// [`generate_sku`].
fn generate_slug(source: &str) -> String {
    let mut slug = String::new();
    for ch in source.trim().to_lowercase().chars() {
        if ch.is_alphanumeric() || ch == '-' {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let base = slug.trim_matches('-');
    let base = if base.is_empty() { "item" } else { base };
    let suffix: u32 = rand::thread_rng().gen_range(100..1000);
    format!("{base}-{}-{suffix}", chrono::Utc::now().timestamp())
}
