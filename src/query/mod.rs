// ABOUTME: Query compilation layer: allow-listing, filtering, pagination, tenant scoping
// ABOUTME: Pure string/parameter assembly; no storage round-trips happen here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

pub mod allowlist;
pub mod filter;
pub mod paginate;
pub mod tenant;

pub use allowlist::{resolve_sort_column, resolve_sort_direction};
pub use filter::{FilterSpec, QueryPlan};
pub use paginate::PageResult;
pub use tenant::TenantScope;
