// ABOUTME: Per-entity configurations: each concrete repository is a static EntityConfig
// ABOUTME: The registry resolves logical entity names at the controller boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

//! Concrete entity configurations.
//!
//! Each module here replaces what used to be a whole hand-written repository
//! class: a static [`EntityConfig`](crate::config::EntityConfig) plus, where
//! the entity genuinely needs it, a narrow extension (bulk child replace,
//! tree traversal, slug lookup) layered over the generic core.

pub mod bank_accounts;
pub mod cart_items;
pub mod carts;
pub mod certificates;
pub mod job_categories;
pub mod jobs;

use crate::config::EntityConfig;

static REGISTRY: &[(&str, &EntityConfig)] = &[
    ("cart_items", &cart_items::CONFIG),
    ("carts", &carts::CONFIG),
    ("certificates_requests", &certificates::REQUESTS),
    ("certificates_audits", &certificates::AUDITS),
    ("entity_bank_accounts", &bank_accounts::CONFIG),
    ("job_categories", &job_categories::CONFIG),
    ("jobs", &jobs::CONFIG),
];

/// Resolve a logical entity name to its configuration.
///
/// Unknown names return `None`; the toolkit never builds queries for
/// entities it has no configuration for.
#[must_use]
pub fn lookup(entity: &str) -> Option<&'static EntityConfig> {
    REGISTRY
        .iter()
        .find(|(name, _)| *name == entity)
        .map(|(_, config)| *config)
}

/// All registered entity names, for diagnostics.
#[must_use]
pub fn names() -> Vec<&'static str> {
    REGISTRY.iter().map(|(name, _)| *name).collect()
}
