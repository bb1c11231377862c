// ABOUTME: Compiles a loose filter map plus entity config into a parameterized WHERE fragment
// ABOUTME: Equals/LIKE/range/IN/NOT IN/is-null operators; unknown keys and empty values are ignored
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{EntityConfig, FilterOp};
use crate::query::tenant;
use crate::value::SqlValue;

/// A string-keyed map of requested filters, as derived from query-string
/// parameters by the (out of scope) controller layer.
///
/// Unknown keys are silently dropped during compilation — loose client input
/// is tolerated, never rejected. Empty-string values mean "filter absent",
/// never "match empty"; callers wanting NULL matching must send the explicit
/// `{field}_is_null` pseudo-filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec(BTreeMap<String, String>);

impl FilterSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Non-empty value for a key, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    fn truthy(&self, key: &str) -> bool {
        matches!(self.get(key), Some("1" | "true"))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterSpec {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Immutable result of compiling filters + config + tenant id: SQL fragments
/// and the bind parameters they consume, in placeholder order.
///
/// Invariant: the number of `?` placeholders across `joins` + `where_sql`
/// equals `params.len()` exactly — no orphaned or missing bindings.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// Tenant-scope join clauses (leading space included), or empty.
    pub joins: String,
    /// Complete `WHERE ...` fragment, tenant predicate first.
    pub where_sql: String,
    /// Bind parameters in placeholder order; `params[0]` is the tenant id.
    pub params: Vec<SqlValue>,
}

impl QueryPlan {
    #[cfg(test)]
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.joins.matches('?').count() + self.where_sql.matches('?').count()
    }
}

/// Compile a filter spec against an entity config.
///
/// The tenant predicate always comes first and is never optional. Then, for
/// each declared filterable column in declaration order, the matching
/// request keys are applied with the column's operator class.
#[must_use]
pub fn build(config: &EntityConfig, tenant_id: i64, filters: &FilterSpec) -> QueryPlan {
    let scope = tenant::scope(config);
    let mut where_sql = format!("WHERE {}", scope.predicate);
    let mut params = vec![SqlValue::Int(tenant_id)];
    let alias = config.alias;

    for column in config.filterable {
        let col = column.name;
        match column.op {
            FilterOp::Equals => {
                if let Some(value) = filters.get(col) {
                    where_sql.push_str(&format!(" AND {alias}.{col} = ?"));
                    params.push(SqlValue::coerce(value));
                }
            }
            FilterOp::Like => {
                if let Some(value) = filters.get(col) {
                    where_sql.push_str(&format!(" AND {alias}.{col} LIKE ?"));
                    params.push(SqlValue::Text(format!("%{value}%")));
                }
            }
            FilterOp::Range => {
                if let Some(from) = filters.get(&format!("{col}_from")) {
                    where_sql.push_str(&format!(" AND {alias}.{col} >= ?"));
                    params.push(SqlValue::coerce(from));
                }
                if let Some(to) = filters.get(&format!("{col}_to")) {
                    where_sql.push_str(&format!(" AND {alias}.{col} <= ?"));
                    params.push(SqlValue::coerce(to));
                }
            }
            FilterOp::Enum(domain) => {
                if let Some(requested) = filters.get(col) {
                    apply_enum_list(&mut where_sql, &mut params, alias, col, requested, domain, false);
                }
                if let Some(excluded) = filters.get(&format!("{col}_exclude")) {
                    apply_enum_list(&mut where_sql, &mut params, alias, col, excluded, domain, true);
                }
            }
        }

        if filters.truthy(&format!("{col}_is_null")) {
            where_sql.push_str(&format!(" AND {alias}.{col} IS NULL"));
        }
    }

    let plan = QueryPlan {
        joins: scope.joins,
        where_sql,
        params,
    };
    debug_assert_eq!(
        plan.joins.matches('?').count() + plan.where_sql.matches('?').count(),
        plan.params.len(),
        "every placeholder must have exactly one binding"
    );
    plan
}

/// Apply a comma-separated enum list as `IN` / `NOT IN`.
///
/// Members outside the declared domain are dropped rather than errored. A
/// list that validates to zero members omits the clause entirely — an
/// always-false `IN ()` would silently return zero rows for a typo. A single
/// surviving member renders as plain equality, matching the original
/// endpoints byte for byte.
fn apply_enum_list(
    where_sql: &mut String,
    params: &mut Vec<SqlValue>,
    alias: &str,
    col: &str,
    requested: &str,
    domain: &[&str],
    negate: bool,
) {
    let valid: Vec<&str> = requested
        .split(',')
        .map(str::trim)
        .filter(|member| domain.contains(member))
        .collect();

    match (valid.len(), negate) {
        (0, _) => {}
        (1, false) => {
            where_sql.push_str(&format!(" AND {alias}.{col} = ?"));
            params.push(SqlValue::Text(valid[0].to_string()));
        }
        (n, _) => {
            let placeholders = vec!["?"; n].join(", ");
            let op = if negate { "NOT IN" } else { "IN" };
            where_sql.push_str(&format!(" AND {alias}.{col} {op} ({placeholders})"));
            params.extend(valid.into_iter().map(|m| SqlValue::Text(m.to_string())));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{build, FilterSpec};
    use crate::entities::{cart_items, certificates};
    use crate::value::SqlValue;

    #[test]
    fn tenant_predicate_is_always_first() {
        let plan = build(cart_items::config(), 7, &FilterSpec::new());
        assert!(plan.where_sql.starts_with("WHERE e.tenant_id = ?"));
        assert_eq!(plan.params[0], SqlValue::Int(7));
    }

    #[test]
    fn every_placeholder_has_exactly_one_binding() {
        let filters = FilterSpec::new()
            .with("cart_id", "3")
            .with("sku", "ABC")
            .with("entity_id", "9");
        let plan = build(cart_items::config(), 1, &filters);
        assert_eq!(plan.placeholder_count(), plan.params.len());
    }

    #[test]
    fn omitted_and_empty_filters_produce_identical_sql() {
        let absent = build(cart_items::config(), 1, &FilterSpec::new());
        let empty = build(
            cart_items::config(),
            1,
            &FilterSpec::new().with("sku", "").with("cart_id", ""),
        );
        assert_eq!(absent.where_sql, empty.where_sql);
        assert_eq!(absent.params, empty.params);
    }

    #[test]
    fn like_columns_wrap_the_value() {
        let plan = build(cart_items::config(), 1, &FilterSpec::new().with("sku", "ABC"));
        assert!(plan.where_sql.contains("ci.sku LIKE ?"));
        assert!(plan.params.contains(&SqlValue::Text("%ABC%".into())));
    }

    #[test]
    fn unknown_filter_keys_are_silently_dropped() {
        let plan = build(
            cart_items::config(),
            1,
            &FilterSpec::new().with("password", "x' OR 1=1 --"),
        );
        assert_eq!(plan.where_sql, "WHERE e.tenant_id = ?");
        assert_eq!(plan.params.len(), 1);
    }

    #[test]
    fn invalid_enum_members_are_dropped_not_rejected() {
        let config = certificates::requests_config();
        let with_bogus = build(
            config,
            1,
            &FilterSpec::new().with("status", "approved,bogus"),
        );
        let clean = build(config, 1, &FilterSpec::new().with("status", "approved"));
        assert_eq!(with_bogus.where_sql, clean.where_sql);
        assert_eq!(with_bogus.params, clean.params);
    }

    #[test]
    fn single_valid_member_renders_equality_not_in() {
        let plan = build(
            certificates::requests_config(),
            1,
            &FilterSpec::new().with("status", "approved"),
        );
        assert!(plan.where_sql.contains("cr.status = ?"));
        assert!(!plan.where_sql.contains("IN"));
    }

    #[test]
    fn fully_invalid_enum_list_omits_the_clause() {
        let plan = build(
            certificates::requests_config(),
            1,
            &FilterSpec::new().with("status", "bogus,nonsense"),
        );
        assert_eq!(plan.where_sql, "WHERE cr.tenant_id = ?");
        assert_eq!(plan.params.len(), 1);
    }

    #[test]
    fn exclude_list_renders_not_in() {
        let plan = build(
            certificates::requests_config(),
            1,
            &FilterSpec::new().with("status_exclude", "approved,issued"),
        );
        assert!(plan.where_sql.contains("cr.status NOT IN (?, ?)"));
        assert_eq!(plan.placeholder_count(), plan.params.len());
    }

    #[test]
    fn range_keys_map_to_inequalities() {
        let plan = build(
            certificates::requests_config(),
            1,
            &FilterSpec::new()
                .with("issue_date_from", "2025-01-01")
                .with("issue_date_to", "2025-06-30"),
        );
        assert!(plan.where_sql.contains("cr.issue_date >= ?"));
        assert!(plan.where_sql.contains("cr.issue_date <= ?"));
    }

    #[test]
    fn is_null_pseudo_filter_is_explicit_opt_in() {
        let config = cart_items::config();
        let plan = build(
            config,
            1,
            &FilterSpec::new().with("product_variant_id_is_null", "1"),
        );
        assert!(plan.where_sql.contains("ci.product_variant_id IS NULL"));
        // the pseudo-filter consumes no bind parameter
        assert_eq!(plan.placeholder_count(), plan.params.len());
    }
}
