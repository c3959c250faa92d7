use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::LaudoError;

/// Install the global `tracing` subscriber.
///
/// `filter` uses `EnvFilter` directive syntax (`info`, `laudo_compute=debug`).
/// An unparseable filter falls back to `info`. Returns false when a
/// subscriber was already installed, which leaves that one in place.
pub fn init_logging(filter: String) -> bool {
    let env_filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Install the subscriber with the filter configured by `LAUDO_LOG`.
pub fn init_logging_from_env() -> Result<bool, LaudoError> {
    Ok(init_logging_with(&Config::from_env()?))
}

pub(crate) fn init_logging_with(config: &Config) -> bool {
    init_logging(config.log_filter.clone())
}
