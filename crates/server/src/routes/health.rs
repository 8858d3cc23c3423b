//! GET /health: liveness plus cache and configuration visibility.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde::Serialize;
use trendlens_core::CacheInfo;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub uptime_seconds: i64,
    pub cache: CacheSection,
    pub config: ConfigSection,
}

#[derive(Debug, Serialize)]
pub struct CacheSection {
    pub github: CacheInfo,
    pub product_hunt: CacheInfo,
}

#[derive(Debug, Serialize)]
pub struct ConfigSection {
    pub cache_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_workers: usize,
    pub max_repositories: usize,
    pub max_stories: usize,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let timeout = state.config.cache_timeout();

    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: Utc::now().signed_duration_since(state.started_at).num_seconds(),
        cache: CacheSection {
            github: state.github.cache().info(timeout),
            product_hunt: state.product_hunt.cache().info(timeout),
        },
        config: ConfigSection {
            cache_timeout_secs: state.config.cache_timeout_secs,
            request_timeout_secs: state.config.request_timeout_secs,
            max_workers: state.config.max_workers,
            max_repositories: state.config.max_repositories,
            max_stories: state.config.max_stories,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendlens_core::AppConfig;

    #[tokio::test]
    async fn test_health_reports_cache_keys() {
        let state = AppState::new(AppConfig::default()).unwrap();
        state.github.cache().put("all_daily", Vec::new());

        let Json(body) = health_check(State(state)).await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.cache.github.cached_entries, 1);
        assert_eq!(body.cache.github.cache_keys, vec!["all_daily".to_string()]);
        assert_eq!(body.cache.product_hunt.cached_entries, 0);
        assert_eq!(body.config.cache_timeout_secs, 600);
    }
}
