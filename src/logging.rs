// ABOUTME: Structured logging setup with environment-driven filtering
// ABOUTME: Pretty output for development, JSON for production collectors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 souqdb contributors

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format options
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// Human-readable output for development
    #[default]
    Pretty,
    /// JSON lines for production log collectors
    Json,
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` overrides `default_level` when set. Safe to call once per
/// process; a second call returns an error from the subscriber registry,
/// which is ignored so tests can initialize independently.
pub fn init_logging(default_level: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };
    // Already-initialized is fine; keep the first subscriber.
    drop(result);
}
