//! Configuration management for the wikifs driver
//!
//! Loaded once at mount time from `config.toml` with `WIKIFS_`-prefixed
//! environment overrides. The engine itself only consumes the cache and
//! timeout knobs; endpoint, credentials and mount point are handed to the
//! transport and mount layers.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

fn default_cache_ttl_secs() -> u64 {
    5
}

fn default_remote_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct WikiFsConfig {
    /// Remote API endpoint URL
    pub endpoint: String,

    /// Wiki account used for all remote calls
    pub username: String,
    pub password: String,

    /// Where the projected tree is mounted
    pub mount_point: String,

    /// Maximum age of the cached tree before a resolution rebuilds it
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Deadline for a single remote round trip
    #[serde(default = "default_remote_timeout_secs")]
    pub remote_timeout_secs: u64,
}

impl WikiFsConfig {
    /// Load configuration from `config.toml` with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file("config")
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("WIKIFS"))
            .build()?;

        let config: WikiFsConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::Message("endpoint cannot be empty".into()));
        }
        if self.mount_point.is_empty() {
            return Err(ConfigError::Message("mount_point cannot be empty".into()));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Message(
                "cache_ttl_secs must be greater than 0".into(),
            ));
        }
        if self.remote_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "remote_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }
}
