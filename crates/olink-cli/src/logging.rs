use tracing_subscriber::EnvFilter;

use crate::config::{DEFAULT_LOG_FILTER, RuntimeConfig};

/// Installs the stderr subscriber. Later calls are no-ops, so tests can call
/// it freely.
pub fn init(config: &RuntimeConfig) {
    let filter = EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
