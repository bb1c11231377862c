// ABOUTME: Integration tests for column encryption on entity bank accounts
// ABOUTME: Storage only ever sees ciphertext; undecryptable values read back as null
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::Arc;

use serde_json::{json, Value};
use souqdb::{
    entities, AesGcmFieldCipher, ListParams, Repository, RepositoryError, RowMap, Store,
};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::Row;

const IBAN: &str = "SA0380000000608010167519";
const ACCOUNT: &str = "608010167519";

const SCHEMA: &[&str] = &[
    "CREATE TABLE entities (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tenant_id INTEGER NOT NULL,
        name TEXT
    )",
    "CREATE TABLE entity_bank_accounts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        entity_id INTEGER NOT NULL,
        bank_name TEXT,
        account_name TEXT,
        account_number TEXT,
        iban TEXT,
        swift_code TEXT,
        currency_code TEXT,
        is_default INTEGER,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP
    )",
    "INSERT INTO entities (id, tenant_id, name) VALUES (1, 4, 'Souq One')",
];

async fn bank_accounts_repo() -> Repository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    let store = Store::from_pool(pool).await.unwrap();
    Repository::new(store, entities::bank_accounts::config())
        .with_cipher(Arc::new(AesGcmFieldCipher::new(b"test-master-key")))
}

fn payload(value: Value) -> RowMap {
    value.as_object().cloned().unwrap()
}

fn account_payload() -> RowMap {
    payload(json!({
        "entity_id": 1,
        "bank_name": "Al Rajhi",
        "account_number": ACCOUNT,
        "iban": IBAN,
        "swift_code": "RJHISARI"
    }))
}

#[tokio::test]
async fn stored_columns_are_ciphertext_not_plaintext() {
    let repo = bank_accounts_repo().await;
    let id = repo.upsert(4, &account_payload()).await.unwrap();

    let row = sqlx::query(
        "SELECT account_number, iban, swift_code, bank_name FROM entity_bank_accounts WHERE id = ?",
    )
    .bind(id)
    .fetch_one(repo.store().pool())
    .await
    .unwrap();

    let stored_account: String = row.try_get(0).unwrap();
    let stored_iban: String = row.try_get(1).unwrap();
    let stored_swift: String = row.try_get(2).unwrap();
    assert_ne!(stored_account, ACCOUNT);
    assert_ne!(stored_iban, IBAN);
    assert_ne!(stored_swift, "RJHISARI");
    // non-designated columns stay readable
    assert_eq!(row.try_get::<String, _>(3).unwrap(), "Al Rajhi");
}

#[tokio::test]
async fn reads_decrypt_back_to_plaintext() {
    let repo = bank_accounts_repo().await;
    let id = repo.upsert(4, &account_payload()).await.unwrap();

    let row = repo.get(4, id).await.unwrap().unwrap();
    assert_eq!(row["account_number"], json!(ACCOUNT));
    assert_eq!(row["iban"], json!(IBAN));

    let page = repo.list(4, &ListParams::default()).await.unwrap();
    assert_eq!(page.items[0]["iban"], json!(IBAN));
}

#[tokio::test]
async fn absent_optional_encrypted_columns_stay_null() {
    let repo = bank_accounts_repo().await;
    let id = repo
        .upsert(4, &payload(json!({"entity_id": 1, "account_number": ACCOUNT})))
        .await
        .unwrap();

    let row = repo.get(4, id).await.unwrap().unwrap();
    assert_eq!(row["iban"], Value::Null);
    assert_eq!(row["swift_code"], Value::Null);
}

#[tokio::test]
async fn partial_update_without_entity_id_keeps_columns_readable() {
    let repo = bank_accounts_repo().await;
    let id = repo.upsert(4, &account_payload()).await.unwrap();

    // the payload omits entity_id; the scope must come from the stored row
    repo.upsert(4, &payload(json!({"id": id, "account_number": "999988887777"})))
        .await
        .unwrap();

    let row = repo.get(4, id).await.unwrap().unwrap();
    assert_eq!(row["account_number"], json!("999988887777"));
    // columns the update did not touch still decrypt
    assert_eq!(row["iban"], json!(IBAN));

    let stored: String =
        sqlx::query("SELECT account_number FROM entity_bank_accounts WHERE id = ?")
            .bind(id)
            .fetch_one(repo.store().pool())
            .await
            .unwrap()
            .try_get(0)
            .unwrap();
    assert_ne!(stored, "999988887777");
}

#[tokio::test]
async fn corrupt_ciphertext_reads_as_null_not_an_error() {
    let repo = bank_accounts_repo().await;
    let id = repo.upsert(4, &account_payload()).await.unwrap();

    sqlx::query("UPDATE entity_bank_accounts SET iban = 'garbage' WHERE id = ?")
        .bind(id)
        .execute(repo.store().pool())
        .await
        .unwrap();

    let row = repo.get(4, id).await.unwrap().unwrap();
    assert_eq!(row["iban"], Value::Null);
    // the other columns are untouched and still decrypt
    assert_eq!(row["account_number"], json!(ACCOUNT));
}

#[tokio::test]
async fn writes_without_a_cipher_fail() {
    let repo = bank_accounts_repo().await;
    let bare = Repository::new(repo.store().clone(), entities::bank_accounts::config());

    let err = bare.upsert(4, &account_payload()).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Encryption { .. }), "got {err}");
}
