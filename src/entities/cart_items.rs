// ABOUTME: Cart line items, tenant-scoped through the owning entity (storefront)
// ABOUTME: Carries the default-generation rules for sku, quantity, and money columns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use serde_json::Value;
use sqlx::Row;

use crate::config::{
    ColumnDefault, EntityConfig, FilterColumn, FilterOp, JoinStep, ParentCheck, ParentTenantSql,
    SortDirection, TenantPredicate,
};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::repository::Repository;
use crate::value::RowMap;

pub(crate) static CONFIG: EntityConfig = EntityConfig {
    entity: "cart_items",
    table: "cart_items",
    alias: "ci",
    primary_key: "id",
    filterable: &[
        FilterColumn {
            name: "cart_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "product_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "product_variant_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "entity_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "sku",
            op: FilterOp::Like,
        },
    ],
    sortable: &[
        "id",
        "cart_id",
        "product_id",
        "product_variant_id",
        "entity_id",
        "product_name",
        "sku",
        "quantity",
        "unit_price",
        "sale_price",
        "subtotal",
        "total",
        "added_at",
        "updated_at",
    ],
    default_sort: ("id", SortDirection::Desc),
    tenant: TenantPredicate::Joined {
        steps: &[JoinStep {
            table: "entities",
            alias: "e",
            on_left: "ci.entity_id",
            on_right: "e.id",
        }],
        tenant_column: "e.tenant_id",
    },
    translation: None,
    insert_columns: &[
        "cart_id",
        "product_id",
        "product_variant_id",
        "entity_id",
        "product_name",
        "sku",
        "quantity",
        "unit_price",
        "sale_price",
        "discount_amount",
        "tax_rate",
        "tax_amount",
        "subtotal",
        "total",
        "currency_code",
        "selected_attributes",
        "special_instructions",
        "is_gift",
        "gift_message",
    ],
    required: &["cart_id", "product_id", "entity_id"],
    defaults: &[
        ("product_name", ColumnDefault::Text("Unknown Product")),
        ("sku", ColumnDefault::GeneratedSku),
        ("quantity", ColumnDefault::Int(1)),
        ("unit_price", ColumnDefault::Text("0.00")),
        ("discount_amount", ColumnDefault::Text("0.00")),
        ("tax_rate", ColumnDefault::Text("0.00")),
        ("tax_amount", ColumnDefault::Text("0.00")),
        ("subtotal", ColumnDefault::Text("0.00")),
        ("total", ColumnDefault::Text("0.00")),
        ("currency_code", ColumnDefault::Text("SAR")),
        ("is_gift", ColumnDefault::Int(0)),
    ],
    encrypted: &[],
    parent_checks: &[
        ParentCheck {
            column: "entity_id",
            parent_table: "entities",
            parent_key: "id",
            tenant_sql: ParentTenantSql::Column("tenant_id"),
        },
        ParentCheck {
            column: "cart_id",
            parent_table: "carts",
            parent_key: "id",
            tenant_sql: ParentTenantSql::Joined {
                join_table: "entities",
                join_alias: "e",
                on_left: "carts.entity_id",
                on_right: "e.id",
                tenant_column: "e.tenant_id",
            },
        },
    ],
    touch_updated_at: true,
};

#[must_use]
pub fn config() -> &'static EntityConfig {
    &CONFIG
}

/// Replace every item of one cart in a single transaction.
///
/// Cart ownership is verified first; then existing items are deleted and the
/// new set inserted through the regular insert path (defaults, parent checks
/// and audit entries included). Any failure rolls the whole replacement
/// back — the cart is never left half-replaced.
pub async fn replace_for_cart(
    repo: &Repository,
    tenant_id: i64,
    cart_id: i64,
    items: &[RowMap],
) -> RepositoryResult<Vec<i64>> {
    let mut tx = repo.store().pool().begin().await?;

    let owned: i64 = sqlx::query(
        "SELECT COUNT(*) FROM carts INNER JOIN entities e ON carts.entity_id = e.id \
         WHERE carts.id = ? AND e.tenant_id = ?",
    )
    .bind(cart_id)
    .bind(tenant_id)
    .fetch_one(&mut *tx)
    .await?
    .try_get(0)?;
    if owned == 0 {
        return Err(RepositoryError::not_found("carts", cart_id));
    }

    sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
        .bind(cart_id)
        .execute(&mut *tx)
        .await?;

    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        let mut item = item.clone();
        // The path parameter wins over whatever the payload carries.
        item.insert("cart_id".to_string(), Value::from(cart_id));
        ids.push(repo.insert_in_tx(&mut tx, tenant_id, &item).await?);
    }

    tx.commit().await?;
    Ok(ids)
}
