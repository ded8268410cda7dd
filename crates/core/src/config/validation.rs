//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `store_path` is empty
    /// - `refresh_ttl_secs` exceeds 7 days
    /// - `max_response_bytes` is 0 or exceeds 1MB
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid { field: "store_path".into(), reason: "must not be empty".into() });
        }

        if self.refresh_ttl_secs > 604_800 {
            return Err(ConfigError::Invalid {
                field: "refresh_ttl_secs".into(),
                reason: "must not exceed 7 days (604800s)".into(),
            });
        }

        if self.max_response_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_response_bytes".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.max_response_bytes > 1024 * 1024 {
            return Err(ConfigError::Invalid {
                field: "max_response_bytes".into(),
                reason: "must not exceed 1MB".into(),
            });
        }

        if self.refresh_ttl_secs == 0 {
            tracing::warn!("refresh_ttl_secs is 0; every refresh pass will refetch all responses");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_store_path() {
        let config = AppConfig { store_path: "".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "store_path"));
    }

    #[test]
    fn test_validate_ttl_exceeds_limit() {
        let config = AppConfig { refresh_ttl_secs: 604_801, ..Default::default() }; // 7 days + 1s
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "refresh_ttl_secs"));
    }

    #[test]
    fn test_validate_max_response_bytes_zero() {
        let config = AppConfig { max_response_bytes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_response_bytes"));
    }

    #[test]
    fn test_validate_max_response_bytes_exceeds_limit() {
        let config = AppConfig { max_response_bytes: 1024 * 1024 + 1, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_response_bytes"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { refresh_ttl_secs: 0, max_response_bytes: 1, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_values() {
        let config = AppConfig { refresh_ttl_secs: 604_800, max_response_bytes: 1024 * 1024, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
