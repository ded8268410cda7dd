//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (STAPLR_*)
//! 2. TOML config file (if STAPLR_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (STAPLR_*)
/// 2. TOML config file (if STAPLR_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logical path of the OCSP store, without any backend suffix.
    ///
    /// Set via STAPLR_STORE_PATH environment variable.
    /// The selected backend resolves this to the actual backing file.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Seconds before a cached OCSP response counts as stale.
    ///
    /// Set via STAPLR_REFRESH_TTL_SECS environment variable.
    /// Zero forces a refetch on every refresh pass.
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: u64,

    /// Maximum accepted OCSP response size in bytes.
    ///
    /// Set via STAPLR_MAX_RESPONSE_BYTES environment variable.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./ocsp/ocsp_cache")
}

fn default_refresh_ttl_secs() -> u64 {
    3600
}

fn default_max_response_bytes() -> usize {
    65_536 // 64KB
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            refresh_ttl_secs: default_refresh_ttl_secs(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl AppConfig {
    /// Refresh TTL as a Duration for staleness comparisons.
    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `STAPLR_`
    /// 2. TOML file from `STAPLR_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("STAPLR_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("STAPLR_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.store_path, PathBuf::from("./ocsp/ocsp_cache"));
        assert_eq!(config.refresh_ttl_secs, 3600);
        assert_eq!(config.max_response_bytes, 65_536);
    }

    #[test]
    fn test_refresh_ttl_duration() {
        let config = AppConfig::default();
        assert_eq!(config.refresh_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_refresh_ttl_zero() {
        let config = AppConfig { refresh_ttl_secs: 0, ..Default::default() };
        assert!(config.refresh_ttl().is_zero());
    }
}
