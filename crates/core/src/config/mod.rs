//! Application configuration with layered loading.
//!
//! Loading precedence (highest wins):
//! 1. Environment variables (TRENDLENS_*)
//! 2. TOML config file (if TRENDLENS_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bind address for the HTTP API.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for the HTTP API.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds a cache entry stays fresh.
    #[serde(default = "default_cache_timeout_secs")]
    pub cache_timeout_secs: u64,

    /// Per-call fetch timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Worker-pool size bounding concurrent outbound fetches per source.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Maximum repositories extracted per trending query.
    #[serde(default = "default_max_repositories")]
    pub max_repositories: usize,

    /// Maximum stories extracted per stories query.
    #[serde(default = "default_max_stories")]
    pub max_stories: usize,

    /// Hard deadline in seconds for a request arriving at an empty cache.
    #[serde(default = "default_first_request_deadline_secs")]
    pub first_request_deadline_secs: u64,

    /// User-Agent string for outbound HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8000
}

fn default_cache_timeout_secs() -> u64 {
    600
}

fn default_request_timeout_secs() -> u64 {
    8
}

fn default_max_workers() -> usize {
    4
}

fn default_max_repositories() -> usize {
    25
}

fn default_max_stories() -> usize {
    20
}

fn default_first_request_deadline_secs() -> u64 {
    3
}

fn default_user_agent() -> String {
    concat!("trendlens/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cache_timeout_secs: default_cache_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_workers: default_max_workers(),
            max_repositories: default_max_repositories(),
            max_stories: default_max_stories(),
            first_request_deadline_secs: default_first_request_deadline_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_secs(self.cache_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn first_request_deadline(&self) -> Duration {
        Duration::from_secs(self.first_request_deadline_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read, a value cannot be
    /// parsed, or validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("TRENDLENS_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("TRENDLENS_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
