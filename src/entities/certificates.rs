// ABOUTME: Certificate requests (direct tenancy) and their audits (tenancy via the request)
// ABOUTME: Requests carry the closed status enum with IN/NOT IN filter support
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use crate::config::{
    ColumnDefault, EntityConfig, FilterColumn, FilterOp, JoinStep, ParentCheck, ParentTenantSql,
    SortDirection, TenantPredicate,
};

/// Request workflow states. Values outside this set are dropped from
/// filters and rejected nowhere — transition legality between members is
/// deliberately not enforced at this layer; it belongs to callers.
pub const REQUEST_STATUSES: &[&str] = &[
    "draft",
    "under_review",
    "payment_pending",
    "approved",
    "rejected",
    "issued",
];

pub(crate) static REQUESTS: EntityConfig = EntityConfig {
    entity: "certificates_requests",
    table: "certificates_requests",
    alias: "cr",
    primary_key: "id",
    filterable: &[
        FilterColumn {
            name: "entity_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "importer_country_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "certificate_type",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "operation_type",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "status",
            op: FilterOp::Enum(REQUEST_STATUSES),
        },
        FilterColumn {
            name: "payment_status",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "auditor_user_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "issue_date",
            op: FilterOp::Range,
        },
    ],
    sortable: &[
        "id",
        "tenant_id",
        "entity_id",
        "importer_country_id",
        "certificate_type",
        "operation_type",
        "issue_date",
        "status",
        "payment_status",
        "auditor_user_id",
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
        "importer_country_id",
        "certificate_type",
        "operation_type",
        "issue_date",
        "transport_method",
        "notes",
        "status",
        "auditor_user_id",
        "payment_status",
    ],
    required: &["entity_id"],
    defaults: &[("status", ColumnDefault::Text("draft"))],
    encrypted: &[],
    parent_checks: &[ParentCheck {
        column: "entity_id",
        parent_table: "entities",
        parent_key: "id",
        tenant_sql: ParentTenantSql::Column("tenant_id"),
    }],
    touch_updated_at: true,
};

pub(crate) static AUDITS: EntityConfig = EntityConfig {
    entity: "certificates_audits",
    table: "certificates_audits",
    alias: "ca",
    primary_key: "id",
    filterable: &[
        FilterColumn {
            name: "request_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "auditor_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "status",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "assigned_by",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "audit_date",
            op: FilterOp::Range,
        },
    ],
    sortable: &[
        "id",
        "request_id",
        "auditor_id",
        "audit_date",
        "status",
        "assigned_by",
        "assigned_at",
        "created_at",
    ],
    default_sort: ("id", SortDirection::Desc),
    tenant: TenantPredicate::Joined {
        steps: &[JoinStep {
            table: "certificates_requests",
            alias: "cr",
            on_left: "ca.request_id",
            on_right: "cr.id",
        }],
        tenant_column: "cr.tenant_id",
    },
    translation: None,
    insert_columns: &[
        "request_id",
        "auditor_id",
        "audit_date",
        "status",
        "notes",
        "assigned_by",
        "assigned_at",
    ],
    required: &["request_id"],
    defaults: &[],
    encrypted: &[],
    // An audit may only reference a request the acting tenant owns.
    parent_checks: &[ParentCheck {
        column: "request_id",
        parent_table: "certificates_requests",
        parent_key: "id",
        tenant_sql: ParentTenantSql::Column("tenant_id"),
    }],
    touch_updated_at: false,
};

#[must_use]
pub fn requests_config() -> &'static EntityConfig {
    &REQUESTS
}

#[must_use]
pub fn audits_config() -> &'static EntityConfig {
    &AUDITS
}
