//! Configuration validation rules.
//!
//! Validation runs after values have been loaded from environment, file, or
//! defaults.

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

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_timeout_secs` or `first_request_deadline_secs` is 0
    /// - `request_timeout_secs` is 0 or exceeds 5 minutes
    /// - `max_workers` is 0 or exceeds 64
    /// - `max_repositories` or `max_stories` is 0 or exceeds 100
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_timeout_secs == 0 {
            return Err(invalid("cache_timeout_secs", "must be greater than 0"));
        }

        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be greater than 0"));
        }
        if self.request_timeout_secs > 300 {
            return Err(invalid("request_timeout_secs", "must not exceed 5 minutes (300s)"));
        }

        if self.max_workers == 0 {
            return Err(invalid("max_workers", "must be greater than 0"));
        }
        if self.max_workers > 64 {
            return Err(invalid("max_workers", "must not exceed 64"));
        }

        if self.max_repositories == 0 || self.max_repositories > 100 {
            return Err(invalid("max_repositories", "must be between 1 and 100"));
        }
        if self.max_stories == 0 || self.max_stories > 100 {
            return Err(invalid("max_stories", "must be between 1 and 100"));
        }

        if self.first_request_deadline_secs == 0 {
            return Err(invalid("first_request_deadline_secs", "must be greater than 0"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
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
    fn test_validate_zero_cache_timeout() {
        let config = AppConfig { cache_timeout_secs: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_timeout_secs"));
    }

    #[test]
    fn test_validate_request_timeout_bounds() {
        let config = AppConfig { request_timeout_secs: 0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = AppConfig { request_timeout_secs: 301, ..Default::default() };
        assert!(config.validate().is_err());

        let config = AppConfig { request_timeout_secs: 300, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_workers() {
        let config = AppConfig { max_workers: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_workers"));
    }

    #[test]
    fn test_validate_item_caps() {
        let config = AppConfig { max_repositories: 101, ..Default::default() };
        assert!(config.validate().is_err());

        let config = AppConfig { max_stories: 0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }
}
