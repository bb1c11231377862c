// ABOUTME: Job postings with a closed status enum and title search
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use crate::config::{
    ColumnDefault, EntityConfig, FilterColumn, FilterOp, ParentCheck, ParentTenantSql,
    SortDirection, TenantPredicate,
};

/// Posting states; filter members outside this set are dropped. Whether a
/// closed posting may reopen is not this layer's concern.
pub const JOB_STATUSES: &[&str] = &["open", "paused", "closed"];

pub(crate) static CONFIG: EntityConfig = EntityConfig {
    entity: "jobs",
    table: "jobs",
    alias: "j",
    primary_key: "id",
    filterable: &[
        FilterColumn {
            name: "entity_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "category_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "status",
            op: FilterOp::Enum(JOB_STATUSES),
        },
        FilterColumn {
            name: "title",
            op: FilterOp::Like,
        },
        FilterColumn {
            name: "created_at",
            op: FilterOp::Range,
        },
    ],
    sortable: &[
        "id",
        "entity_id",
        "category_id",
        "title",
        "status",
        "created_at",
        "updated_at",
    ],
    default_sort: ("id", SortDirection::Desc),
    tenant: TenantPredicate::Direct {
        column: "tenant_id",
    },
    translation: None,
    insert_columns: &[
        "tenant_id",
        "entity_id",
        "category_id",
        "title",
        "description",
        "status",
        "location",
        "employment_type",
    ],
    required: &["entity_id", "title"],
    defaults: &[("status", ColumnDefault::Text("open"))],
    encrypted: &[],
    parent_checks: &[ParentCheck {
        column: "entity_id",
        parent_table: "entities",
        parent_key: "id",
        tenant_sql: ParentTenantSql::Column("tenant_id"),
    }],
    touch_updated_at: true,
};

#[must_use]
pub fn config() -> &'static EntityConfig {
    &CONFIG
}
