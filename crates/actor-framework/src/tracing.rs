//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the process-wide `tracing` subscriber: compact format,
//! no module-path targets (actors log an `entity_type` field instead), level filter
//! from `RUST_LOG` with `info` as the fallback.
//!
//! ```bash
//! RUST_LOG=info cargo run          # lifecycle + per-request summaries
//! RUST_LOG=debug cargo run         # full request payloads
//! RUST_LOG=cafe_orders::notify=debug,info cargo run
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Call once, at the top of `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();
}

/// Like [`setup_tracing`] but safe to call from many tests; later calls are ignored.
pub fn setup_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
