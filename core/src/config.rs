//! Runtime configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::form::DEFAULT_INSPECTION_INTERVAL_YEARS;

pub const STORE_DIR_VAR: &str = "LAUDO_STORE_DIR";
pub const INTERVAL_VAR: &str = "LAUDO_INSPECTION_INTERVAL_YEARS";
pub const LOG_VAR: &str = "LAUDO_LOG";

pub mod defaults {
    pub const STORE_DIR: &str = "./laudos";
    pub const LOG_FILTER: &str = "info";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the saved reports and the edit marker.
    pub store_dir: PathBuf,
    /// Years from the report date to the next periodic inspection.
    pub inspection_interval_years: u32,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(defaults::STORE_DIR),
            inspection_interval_years: DEFAULT_INSPECTION_INTERVAL_YEARS,
            log_filter: defaults::LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment, after reading a
    /// `.env` file when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Config::default();

        if let Some(dir) = var(STORE_DIR_VAR) {
            config.store_dir = PathBuf::from(dir);
        }
        if let Some(raw) = var(INTERVAL_VAR) {
            config.inspection_interval_years = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|years| *years > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: INTERVAL_VAR,
                    value: raw,
                })?;
        }
        if let Some(filter) = var(LOG_VAR) {
            config.log_filter = filter;
        }

        Ok(config)
    }
}
