// ABOUTME: Mandatory tenant scoping rendered as a direct predicate or INNER JOIN chain
// ABOUTME: Every generated query starts from this fragment; it is never optional
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use crate::config::{EntityConfig, TenantPredicate};

/// Rendered tenant scope: join clauses (possibly empty) plus the predicate
/// that consumes exactly one bind parameter — the tenant id.
#[derive(Debug, Clone)]
pub struct TenantScope {
    /// `INNER JOIN ...` clauses, leading space included, or empty.
    pub joins: String,
    /// `alias.column = ?` predicate on the tenant column.
    pub predicate: String,
}

/// Render the tenant scope for an entity.
#[must_use]
pub fn scope(config: &EntityConfig) -> TenantScope {
    match config.tenant {
        TenantPredicate::Direct { column } => TenantScope {
            joins: String::new(),
            predicate: format!("{}.{} = ?", config.alias, column),
        },
        TenantPredicate::Joined {
            steps,
            tenant_column,
        } => {
            let mut joins = String::new();
            for step in steps {
                joins.push_str(&format!(
                    " INNER JOIN {} {} ON {} = {}",
                    step.table, step.alias, step.on_left, step.on_right
                ));
            }
            TenantScope {
                joins,
                predicate: format!("{tenant_column} = ?"),
            }
        }
    }
}
