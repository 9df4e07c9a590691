//! Tracing setup for hosts embedding the runtime.

use quill_config::LoggingConfig;

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level; calling twice is a no-op.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.level.clone()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
