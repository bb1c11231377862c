// ABOUTME: Integration tests for the entity_logs audit trail
// ABOUTME: Repository mutations log in-transaction; the standalone logger validates actions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use serde_json::{json, Value};
use souqdb::{
    entities, AuditContext, AuditLogger, ListParams, Repository, RepositoryError, RowMap, Store,
};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Row;

const SCHEMA: &[&str] = &[
    "CREATE TABLE entities (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tenant_id INTEGER NOT NULL,
        name TEXT
    )",
    "CREATE TABLE jobs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tenant_id INTEGER NOT NULL,
        entity_id INTEGER NOT NULL,
        category_id INTEGER,
        title TEXT NOT NULL,
        description TEXT,
        status TEXT,
        location TEXT,
        employment_type TEXT,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT
    )",
    "INSERT INTO entities (id, tenant_id, name) VALUES (1, 3, 'Shop')",
];

async fn test_store() -> Store {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    Store::from_pool(pool).await.unwrap()
}

fn payload(value: Value) -> RowMap {
    value.as_object().cloned().unwrap()
}

fn acting_user() -> AuditContext {
    AuditContext {
        user_id: 42,
        ip_address: Some("10.0.0.1".to_string()),
    }
}

#[derive(Debug)]
struct LogRow {
    tenant_id: Option<i64>,
    user_id: i64,
    entity_type: String,
    action: String,
    changes: Value,
    ip_address: Option<String>,
}

async fn log_rows(store: &Store) -> Vec<LogRow> {
    sqlx::query(
        "SELECT tenant_id, user_id, entity_type, action, changes, ip_address
         FROM entity_logs ORDER BY id",
    )
    .fetch_all(store.pool())
    .await
    .unwrap()
    .iter()
    .map(|row| LogRow {
        tenant_id: row.try_get(0).unwrap(),
        user_id: row.try_get(1).unwrap(),
        entity_type: row.try_get(2).unwrap(),
        action: row.try_get(3).unwrap(),
        changes: serde_json::from_str(&row.try_get::<String, _>(4).unwrap()).unwrap(),
        ip_address: row.try_get(5).unwrap(),
    })
    .collect()
}

#[tokio::test]
async fn create_update_delete_each_append_one_entry() {
    let store = test_store().await;
    let repo =
        Repository::new(store.clone(), entities::jobs::config()).with_audit(acting_user());

    let id = repo
        .upsert(3, &payload(json!({"entity_id": 1, "title": "Backend Engineer"})))
        .await
        .unwrap();
    repo.upsert(3, &payload(json!({"id": id, "title": "Senior Backend Engineer"})))
        .await
        .unwrap();
    repo.delete(3, id).await.unwrap();

    let logs = log_rows(&store).await;
    assert_eq!(logs.len(), 3);

    let create = &logs[0];
    assert_eq!(create.action, "create");
    assert_eq!(create.entity_type, "jobs");
    assert_eq!(create.tenant_id, Some(3));
    assert_eq!(create.user_id, 42);
    assert_eq!(create.ip_address.as_deref(), Some("10.0.0.1"));
    assert_eq!(create.changes["title"], json!("Backend Engineer"));

    let update = &logs[1];
    assert_eq!(update.action, "update");
    assert_eq!(update.changes["title"]["old"], json!("Backend Engineer"));
    assert_eq!(update.changes["title"]["new"], json!("Senior Backend Engineer"));
    // untouched columns never appear in an update diff
    assert!(update.changes.get("entity_id").is_none());

    let delete = &logs[2];
    assert_eq!(delete.action, "delete");
    assert_eq!(delete.changes["title"], json!("Senior Backend Engineer"));
}

#[tokio::test]
async fn mutations_without_a_context_write_no_entries() {
    let store = test_store().await;
    let repo = Repository::new(store.clone(), entities::jobs::config());

    let id = repo
        .upsert(3, &payload(json!({"entity_id": 1, "title": "Cashier"})))
        .await
        .unwrap();
    repo.delete(3, id).await.unwrap();

    assert!(log_rows(&store).await.is_empty());
}

#[tokio::test]
async fn reads_are_never_audited() {
    let store = test_store().await;
    let repo =
        Repository::new(store.clone(), entities::jobs::config()).with_audit(acting_user());
    let id = repo
        .upsert(3, &payload(json!({"entity_id": 1, "title": "Cashier"})))
        .await
        .unwrap();

    repo.list(3, &ListParams::default()).await.unwrap();
    repo.get(3, id).await.unwrap();

    assert_eq!(log_rows(&store).await.len(), 1); // only the insert
}

#[tokio::test]
async fn standalone_logger_rejects_unknown_actions() {
    let store = test_store().await;
    let logger = AuditLogger::new(store.clone());

    let err = logger
        .append(Some(3), &acting_user(), "jobs", 1, "upserted", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation { .. }), "got {err}");
    assert!(log_rows(&store).await.is_empty());
}

#[tokio::test]
async fn standalone_logger_appends_valid_actions() {
    let store = test_store().await;
    let logger = AuditLogger::new(store.clone());

    logger
        .append(
            None,
            &acting_user(),
            "jobs",
            7,
            "update",
            json!({"status": {"old": "open", "new": "closed"}}),
        )
        .await
        .unwrap();

    let logs = log_rows(&store).await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].tenant_id, None);
    assert_eq!(logs[0].action, "update");
    assert_eq!(logs[0].changes["status"]["new"], json!("closed"));
}
