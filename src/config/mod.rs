//! Configuration for a replica-set node's election core.
//!
//! Follows the hierarchical loading scheme used across the project:
//! - default values as code,
//! - optional configuration file named by `CONFIG_PATH`,
//! - environment variables with the `REPLSET__` prefix (highest priority),
//! - validation deferred until all overrides are applied.
mod cluster;
mod election;

use std::env;

pub use cluster::*;
use config::Config;
use config::Environment;
use config::File;
pub use election::*;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

#[cfg(test)]
mod config_test;

/// Main configuration container for the election core.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ReplNodeConfig {
    /// Replica-set topology: set name, own id, initial members
    pub cluster: ClusterConfig,
    /// Election timing and thresholds
    pub election: ElectionConfig,
}

impl ReplNodeConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Callers MUST call `validate()` after all overrides are applied.
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("REPLSET")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from a file, keeping
    /// environment variables as the highest-priority source.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("REPLSET")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates all sections and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.cluster.validate()?;
        self.election.validate()?;
        Ok(self)
    }
}
