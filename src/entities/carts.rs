// ABOUTME: Shopping carts, tenant-scoped through the owning entity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use crate::config::{
    ColumnDefault, EntityConfig, FilterColumn, FilterOp, JoinStep, ParentCheck, ParentTenantSql,
    SortDirection, TenantPredicate,
};

/// Cart lifecycle states; requested members outside this set are dropped by
/// the filter builder.
pub const CART_STATUSES: &[&str] = &["active", "abandoned", "converted"];

pub(crate) static CONFIG: EntityConfig = EntityConfig {
    entity: "carts",
    table: "carts",
    alias: "c",
    primary_key: "id",
    filterable: &[
        FilterColumn {
            name: "entity_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "user_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "session_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "status",
            op: FilterOp::Enum(CART_STATUSES),
        },
    ],
    sortable: &["id", "entity_id", "user_id", "status", "created_at", "updated_at"],
    default_sort: ("id", SortDirection::Desc),
    tenant: TenantPredicate::Joined {
        steps: &[JoinStep {
            table: "entities",
            alias: "e",
            on_left: "c.entity_id",
            on_right: "e.id",
        }],
        tenant_column: "e.tenant_id",
    },
    translation: None,
    insert_columns: &[
        "entity_id",
        "user_id",
        "session_id",
        "status",
        "currency_code",
    ],
    required: &["entity_id"],
    defaults: &[
        ("status", ColumnDefault::Text("active")),
        ("currency_code", ColumnDefault::Text("SAR")),
    ],
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
