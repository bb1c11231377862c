// ABOUTME: Entity bank accounts with at-rest encryption of account identifiers
// ABOUTME: account_number, iban, and swift_code never touch storage in plaintext
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use crate::config::{
    ColumnDefault, EntityConfig, FilterColumn, FilterOp, JoinStep, ParentCheck, ParentTenantSql,
    SortDirection, TenantPredicate,
};

pub(crate) static CONFIG: EntityConfig = EntityConfig {
    entity: "entity_bank_accounts",
    table: "entity_bank_accounts",
    alias: "ba",
    primary_key: "id",
    filterable: &[
        FilterColumn {
            name: "entity_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "bank_name",
            op: FilterOp::Like,
        },
        FilterColumn {
            name: "is_default",
            op: FilterOp::Equals,
        },
    ],
    sortable: &["id", "entity_id", "bank_name", "is_default", "created_at"],
    default_sort: ("id", SortDirection::Desc),
    tenant: TenantPredicate::Joined {
        steps: &[JoinStep {
            table: "entities",
            alias: "e",
            on_left: "ba.entity_id",
            on_right: "e.id",
        }],
        tenant_column: "e.tenant_id",
    },
    translation: None,
    insert_columns: &[
        "entity_id",
        "bank_name",
        "account_name",
        "account_number",
        "iban",
        "swift_code",
        "currency_code",
        "is_default",
    ],
    required: &["entity_id", "account_number"],
    defaults: &[
        ("currency_code", ColumnDefault::Text("SAR")),
        ("is_default", ColumnDefault::Int(0)),
    ],
    encrypted: &["account_number", "iban", "swift_code"],
    parent_checks: &[ParentCheck {
        column: "entity_id",
        parent_table: "entities",
        parent_key: "id",
        tenant_sql: ParentTenantSql::Column("tenant_id"),
    }],
    touch_updated_at: false,
};

#[must_use]
pub fn config() -> &'static EntityConfig {
    &CONFIG
}
