// ABOUTME: Storage connection handle: pool ownership, connect helpers, toolkit migrations
// ABOUTME: Explicit dependency injection; no ambient/global connection state anywhere
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

/// Clonable storage handle owning the connection pool.
///
/// Repositories receive a `Store` at construction; domain tables belong to
/// the host application and are not migrated here. The only table this
/// toolkit owns is the `entity_logs` audit sink.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Connect to the database and run the toolkit's own migration.
    ///
    /// For `sqlite:` URLs the database file is created when missing.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePool::connect(&connection_options)
            .await
            .context("failed to connect to database")?;

        let store = Self { pool };
        store.migrate().await?;
        info!("store connected");
        Ok(store)
    }

    /// Connect using the `DATABASE_URL` environment variable
    /// (environment-only configuration).
    pub async fn from_env() -> Result<Self> {
        let url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        Self::connect(&url).await
    }

    /// Wrap an existing pool (tests, host applications with their own pool
    /// management). Runs the toolkit migration.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Raw pool access for host-application extensions.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the append-only audit sink.
    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS entity_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tenant_id INTEGER,
                user_id INTEGER NOT NULL,
                entity_type TEXT NOT NULL,
                entity_id INTEGER NOT NULL,
                action TEXT NOT NULL,
                changes TEXT,
                ip_address TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("failed to create entity_logs table")?;
        Ok(())
    }
}
