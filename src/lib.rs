// ABOUTME: Main library entry point for the souqdb tenant-scoped repository toolkit
// ABOUTME: Re-exports the query builders, generic repository, and entity configurations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

#![deny(unsafe_code)]

//! # souqdb
//!
//! A tenant-scoped repository toolkit over SQLite.
//!
//! Every read and write is constrained to one tenant: reads carry the tenant
//! predicate in their WHERE clause (joining through a parent table when the
//! row has no tenant column of its own), and writes re-verify ownership
//! inside the same transaction that mutates the row. Filtering, sorting, and
//! pagination all go through allow-lists declared per entity, so request
//! parameters can never name a column the configuration does not.
//!
//! ## Architecture
//!
//! - **query**: the SQL fragment builders — tenant scope, filter clauses,
//!   sort allow-list resolution, LIMIT/OFFSET handling
//! - **repository**: the generic CRUD engine that assembles those fragments,
//!   plus in-transaction audit logging
//! - **entities**: one static [`EntityConfig`](config::EntityConfig) per
//!   concrete table, with narrow extensions where an entity needs more than
//!   generic CRUD (cart item replacement, category trees)
//! - **crypto**: at-rest encryption for designated columns, keyed per
//!   tenant and owning entity
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use souqdb::{entities, ListParams, Repository, Store};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Store::connect("sqlite:souq.db").await?;
//!     let repo = Repository::new(store, entities::jobs::config());
//!     let page = repo.list(7, &ListParams::default()).await?;
//!     println!("{} jobs, {} total", page.items.len(), page.total);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crypto;
pub mod entities;
pub mod errors;
pub mod logging;
pub mod query;
pub mod repository;
pub mod store;
pub mod value;

pub use config::EntityConfig;
pub use crypto::{AesGcmFieldCipher, FieldCipher};
pub use errors::{RepositoryError, RepositoryResult};
pub use query::{FilterSpec, PageResult};
pub use repository::audit::{AuditAction, AuditContext, AuditLogger};
pub use repository::{ListParams, Repository};
pub use store::Store;
pub use value::RowMap;
