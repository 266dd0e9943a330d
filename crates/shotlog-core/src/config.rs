//! Tracker configuration.
//!
//! Loaded in layers, later sources overriding earlier ones:
//! 1. Defaults (in code)
//! 2. Optional `shotlog.toml` in the working directory
//! 3. Environment variables with the `SHOTLOG__` prefix,
//!    e.g. `SHOTLOG__ESTIMATOR__WINDOW_DAYS=45`

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::estimator::EstimatorConfig;

/// Default database file, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "shotlog.db";

/// Everything needed to open a [`crate::Tracker`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    pub database_path: String,
    pub estimator: EstimatorConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            estimator: EstimatorConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Load from defaults, `shotlog.toml` (if present) and the environment.
    pub fn load() -> Result<Self> {
        let config = ::config::Config::builder()
            .add_source(::config::Config::try_from(&TrackerConfig::default())?)
            .add_source(::config::File::with_name("shotlog").required(false))
            .add_source(::config::Environment::with_prefix("SHOTLOG").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load from defaults overlaid with a specific config file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = ::config::Config::builder()
            .add_source(::config::Config::try_from(&TrackerConfig::default())?)
            .add_source(::config::File::from(path.as_ref()))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
