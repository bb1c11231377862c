// ABOUTME: Static per-entity descriptors driving the generic repository
// ABOUTME: Promotes the per-table column allow-lists to typed, compile-time configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

//! Entity configuration.
//!
//! An [`EntityConfig`] is the complete, immutable description of one table
//! (or small join graph) as the generic repository sees it: which columns may
//! be filtered and sorted, how the tenant predicate is expressed, which
//! columns an insert accepts, and which defaults apply. Configs are `static`
//! values constructed at compile time — untrusted input is only ever matched
//! *against* them, never interpolated into SQL identifiers.

use serde::{Deserialize, Serialize};

/// Sort direction. Anything that is not a case-insensitive `"ASC"` resolves
/// to [`SortDirection::Desc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction. Always exactly `ASC` or `DESC`.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Operator class for a filterable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// `column = ?`, with integral strings bound as integers.
    Equals,
    /// `column LIKE ?` with `%value%` wrapping (text search).
    Like,
    /// `{column}_from` / `{column}_to` request keys mapping to `>=` / `<=`.
    Range,
    /// Closed value domain with `IN` / `NOT IN` support. Requested members
    /// outside the domain are dropped, not rejected.
    Enum(&'static [&'static str]),
}

/// A filterable column and its operator class.
#[derive(Debug, Clone, Copy)]
pub struct FilterColumn {
    pub name: &'static str,
    pub op: FilterOp,
}

/// One step of an INNER JOIN chain leading to the tenant column.
#[derive(Debug, Clone, Copy)]
pub struct JoinStep {
    pub table: &'static str,
    pub alias: &'static str,
    /// Left side of the ON clause, alias-qualified (e.g. `ci.entity_id`).
    pub on_left: &'static str,
    /// Right side of the ON clause, alias-qualified (e.g. `e.id`).
    pub on_right: &'static str,
}

/// How the mandatory tenant predicate is expressed for an entity.
#[derive(Debug, Clone, Copy)]
pub enum TenantPredicate {
    /// The table carries the tenant column directly.
    Direct { column: &'static str },
    /// The tenant column lives at the end of an INNER JOIN chain
    /// (e.g. `cart_items` → `entities.tenant_id`).
    Joined {
        steps: &'static [JoinStep],
        /// Alias-qualified terminal column (e.g. `e.tenant_id`).
        tenant_column: &'static str,
    },
}

/// Optional translation lookup: a secondary table keyed by
/// `(parent id, language code)` left-joined per request language.
#[derive(Debug, Clone, Copy)]
pub struct TranslationJoin {
    pub table: &'static str,
    pub alias: &'static str,
    /// Column on the translation table referencing the base row.
    pub parent_column: &'static str,
    pub lang_column: &'static str,
    /// Localized text columns projected (COALESCEd to `''`) into the row.
    pub columns: &'static [&'static str],
}

/// Default applied to an insert column when the payload carries no value.
#[derive(Debug, Clone, Copy)]
pub enum ColumnDefault {
    Text(&'static str),
    Int(i64),
    /// `SKU-` plus an uppercase random hex suffix. Collision-resistant via
    /// time-independent randomness, not guaranteed globally unique.
    GeneratedSku,
    /// Slugified source field plus a time+random suffix. Same uniqueness
    /// caveat as [`ColumnDefault::GeneratedSku`].
    GeneratedSlug { from_field: &'static str },
}

/// Insert-time foreign-key tenant scoping: the referenced parent row must
/// belong to the acting tenant before the child insert proceeds.
#[derive(Debug, Clone, Copy)]
pub struct ParentCheck {
    /// Payload column holding the parent id (e.g. `request_id`).
    pub column: &'static str,
    pub parent_table: &'static str,
    pub parent_key: &'static str,
    /// How the parent row's tenant membership is established. Every parent
    /// table reaches its tenant scope within one hop.
    pub tenant_sql: ParentTenantSql,
}

/// How the parent table's tenant membership is checked.
#[derive(Debug, Clone, Copy)]
pub enum ParentTenantSql {
    /// Parent table has a tenant column of its own.
    Column(&'static str),
    /// Parent table reaches the tenant through one join
    /// (e.g. `carts` → `entities.tenant_id`).
    Joined {
        join_table: &'static str,
        join_alias: &'static str,
        on_left: &'static str,
        on_right: &'static str,
        tenant_column: &'static str,
    },
}

/// Static descriptor for one entity: everything the generic repository needs
/// to compile safe queries for its table.
#[derive(Debug, Clone, Copy)]
pub struct EntityConfig {
    /// Logical entity name used in errors and audit records.
    pub entity: &'static str,
    pub table: &'static str,
    /// Short base-table alias used in every generated fragment.
    pub alias: &'static str,
    pub primary_key: &'static str,
    pub filterable: &'static [FilterColumn],
    pub sortable: &'static [&'static str],
    pub default_sort: (&'static str, SortDirection),
    pub tenant: TenantPredicate,
    pub translation: Option<TranslationJoin>,
    /// Insert/update column allow-list. Payload keys outside this list are
    /// ignored — never trusted into a column position.
    pub insert_columns: &'static [&'static str],
    /// Columns that must be present and non-empty on insert.
    pub required: &'static [&'static str],
    pub defaults: &'static [(&'static str, ColumnDefault)],
    /// Columns encrypted at rest through the configured field cipher.
    pub encrypted: &'static [&'static str],
    pub parent_checks: &'static [ParentCheck],
    /// Whether writes touch an `updated_at` column.
    pub touch_updated_at: bool,
}

impl EntityConfig {
    /// Alias-qualified primary key (e.g. `ci.id`).
    pub(crate) fn qualified_pk(&self) -> String {
        format!("{}.{}", self.alias, self.primary_key)
    }
}
