// src/logging.rs

use std::env;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` directives plus a default level from `LOG_LEVEL` (`info`).
pub fn env_filter() -> EnvFilter {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    EnvFilter::from_default_env().add_directive(log_level.parse().unwrap_or(Level::INFO.into()))
}

pub fn init() {
    fmt()
        .with_env_filter(env_filter())
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
}

#[cfg(test)]
pub(crate) fn init_test_logging() {
    let subscriber = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,jmap_population=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
