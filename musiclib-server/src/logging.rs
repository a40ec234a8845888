//! Tracing subscriber setup
//!
//! `local` gets human-readable output, `dev` and `prod` get JSON lines.
//! The filter comes from RUST_LOG when set, otherwise from LOG_LEVEL or the
//! environment's default level.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ServerConfig;

/// Install the global subscriber. Call once, before anything logs.
pub fn init(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_directive()));

    let registry = tracing_subscriber::registry().with(filter);

    if config.app_env.json_logs() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
