// ABOUTME: Hierarchical job categories with per-language translations
// ABOUTME: Tree assembly, slug lookup, and cycle-guarded re-parenting over the generic core
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use std::collections::BTreeMap;

use serde_json::Value;
use sqlx::Row;

use crate::config::{
    ColumnDefault, EntityConfig, FilterColumn, FilterOp, SortDirection, TenantPredicate,
    TranslationJoin,
};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::repository::Repository;
use crate::value::{row_to_map, RowMap};

pub(crate) static CONFIG: EntityConfig = EntityConfig {
    entity: "job_categories",
    table: "job_categories",
    alias: "jc",
    primary_key: "id",
    filterable: &[
        FilterColumn {
            name: "parent_id",
            op: FilterOp::Equals,
        },
        FilterColumn {
            name: "is_active",
            op: FilterOp::Equals,
        },
    ],
    sortable: &["id", "parent_id", "slug", "sort_order", "is_active", "created_at"],
    default_sort: ("id", SortDirection::Desc),
    tenant: TenantPredicate::Direct {
        column: "tenant_id",
    },
    translation: Some(TranslationJoin {
        table: "job_category_translations",
        alias: "jct",
        parent_column: "category_id",
        lang_column: "language_code",
        columns: &["name", "description"],
    }),
    insert_columns: &[
        "tenant_id",
        "parent_id",
        "slug",
        "sort_order",
        "is_active",
        "image_url",
        "icon_url",
    ],
    required: &[],
    defaults: &[
        ("slug", ColumnDefault::GeneratedSlug { from_field: "name" }),
        ("sort_order", ColumnDefault::Int(0)),
        ("is_active", ColumnDefault::Int(1)),
    ],
    encrypted: &[],
    parent_checks: &[],
    touch_updated_at: false,
};

#[must_use]
pub fn config() -> &'static EntityConfig {
    &CONFIG
}

/// Tenant-scoped slug lookup with localized name/description and a child
/// count, for category landing pages.
pub async fn find_by_slug(
    repo: &Repository,
    tenant_id: i64,
    slug: &str,
    lang: &str,
) -> RepositoryResult<Option<RowMap>> {
    let row = sqlx::query(
        r"
        SELECT jc.*,
               COALESCE(jct.name, '') AS name,
               COALESCE(jct.description, '') AS description,
               (SELECT COUNT(*) FROM job_categories WHERE parent_id = jc.id) AS children_count
        FROM job_categories jc
        LEFT JOIN job_category_translations jct
            ON jct.category_id = jc.id AND jct.language_code = ?
        WHERE jc.tenant_id = ? AND jc.slug = ?
        LIMIT 1
        ",
    )
    .bind(lang)
    .bind(tenant_id)
    .bind(slug)
    .fetch_optional(repo.store().pool())
    .await?;
    row.map(|r| row_to_map(&r)).transpose().map_err(Into::into)
}

/// Full category tree for one tenant, children nested under a `children`
/// key, siblings ordered by `sort_order` then id.
pub async fn tree(repo: &Repository, tenant_id: i64, lang: &str) -> RepositoryResult<Vec<Value>> {
    let rows = sqlx::query(
        r"
        SELECT jc.*,
               COALESCE(jct.name, '') AS name,
               COALESCE(jct.description, '') AS description
        FROM job_categories jc
        LEFT JOIN job_category_translations jct
            ON jct.category_id = jc.id AND jct.language_code = ?
        WHERE jc.tenant_id = ?
        ORDER BY jc.sort_order ASC, jc.id ASC
        ",
    )
    .bind(lang)
    .bind(tenant_id)
    .fetch_all(repo.store().pool())
    .await?;

    let mut roots: Vec<RowMap> = Vec::new();
    let mut children_of: BTreeMap<i64, Vec<RowMap>> = BTreeMap::new();
    for row in &rows {
        let map = row_to_map(row)?;
        match map.get("parent_id").and_then(Value::as_i64) {
            Some(parent) => children_of.entry(parent).or_default().push(map),
            None => roots.push(map),
        }
    }
    Ok(attach_children(roots, &mut children_of))
}

fn attach_children(nodes: Vec<RowMap>, children_of: &mut BTreeMap<i64, Vec<RowMap>>) -> Vec<Value> {
    nodes
        .into_iter()
        .map(|mut node| {
            let id = node.get("id").and_then(Value::as_i64).unwrap_or(0);
            let kids = children_of.remove(&id).unwrap_or_default();
            node.insert(
                "children".to_string(),
                Value::Array(attach_children(kids, children_of)),
            );
            Value::Object(node)
        })
        .collect()
}

/// Re-parent a category after verifying both rows belong to the tenant and
/// the move would not create a cycle.
///
/// The guard walks the ancestor chain of the proposed parent: if the moved
/// category appears there (or the parent *is* the category), the move is a
/// conflict. The walk is bounded so a pre-existing corrupt chain cannot spin
/// forever.
pub async fn move_to_parent(
    repo: &Repository,
    tenant_id: i64,
    id: i64,
    new_parent_id: Option<i64>,
) -> RepositoryResult<()> {
    let mut tx = repo.store().pool().begin().await?;

    let owned: i64 =
        sqlx::query("SELECT COUNT(*) FROM job_categories WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(tenant_id)
            .fetch_one(&mut *tx)
            .await?
            .try_get(0)?;
    if owned == 0 {
        return Err(RepositoryError::not_found("job_categories", id));
    }

    if let Some(parent_id) = new_parent_id {
        let parent_owned: i64 =
            sqlx::query("SELECT COUNT(*) FROM job_categories WHERE id = ? AND tenant_id = ?")
                .bind(parent_id)
                .bind(tenant_id)
                .fetch_one(&mut *tx)
                .await?
                .try_get(0)?;
        if parent_owned == 0 {
            return Err(RepositoryError::not_found("job_categories", parent_id));
        }

        let mut cursor = Some(parent_id);
        let mut hops = 0u32;
        while let Some(ancestor) = cursor {
            if ancestor == id {
                return Err(RepositoryError::Conflict {
                    message: "cannot move category under itself or its own descendant".to_string(),
                });
            }
            hops += 1;
            if hops > 128 {
                return Err(RepositoryError::Conflict {
                    message: "category parent chain too deep or cyclic".to_string(),
                });
            }
            cursor = sqlx::query("SELECT parent_id FROM job_categories WHERE id = ?")
                .bind(ancestor)
                .fetch_optional(&mut *tx)
                .await?
                .and_then(|row| row.try_get::<Option<i64>, _>(0).ok().flatten());
        }
    }

    sqlx::query("UPDATE job_categories SET parent_id = ? WHERE tenant_id = ? AND id = ?")
        .bind(new_parent_id)
        .bind(tenant_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
