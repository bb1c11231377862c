// ABOUTME: Sort column and direction resolution against per-entity allow-lists
// ABOUTME: Unknown input degrades silently to the configured safe default, never errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use crate::config::{EntityConfig, SortDirection};

/// Resolve a requested sort column against the entity's allow-list.
///
/// Returns the requested column only when it appears verbatim in
/// `config.sortable`; anything else — unknown columns, empty strings,
/// injection attempts — falls back to the configured default. This leniency
/// is deliberate: bad sort input from loose clients must not fail requests.
/// The cost is that a misspelled column silently sorts by the default, which
/// is why the fallback is documented here rather than left implicit.
#[must_use]
pub fn resolve_sort_column<'a>(
    requested: Option<&'a str>,
    config: &'a EntityConfig,
) -> &'a str {
    match requested {
        Some(col) if config.sortable.contains(&col) => col,
        _ => config.default_sort.0,
    }
}

/// Resolve a requested sort direction.
///
/// Case-insensitive `"ASC"` yields ascending; everything else (including
/// absent input) yields descending, matching the listing endpoints' default.
#[must_use]
pub fn resolve_sort_direction(requested: Option<&str>) -> SortDirection {
    match requested {
        Some(dir) if dir.eq_ignore_ascii_case("ASC") => SortDirection::Asc,
        _ => SortDirection::Desc,
    }
}
