//! Shared application state: one explicitly constructed service per source.
//!
//! Everything is built at startup and injected; there is no ambient global
//! cache. The fetch client is shared so both sources reuse one connection
//! pool.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use trendlens_client::{
    FetchClient, FetchConfig, GithubTrending, PageFetcher, ProductHuntStories, SourceOptions, SourceService,
};
use trendlens_core::{AppConfig, Error};

#[derive(Clone)]
pub struct AppState {
    pub github: SourceService<GithubTrending>,
    pub product_hunt: SourceService<ProductHuntStories>,
    pub config: Arc<AppConfig>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(FetchClient::new(FetchConfig {
            user_agent: config.user_agent.clone(),
            timeout: config.request_timeout(),
            ..Default::default()
        })?);

        let github = SourceService::new(
            GithubTrending::new(),
            Arc::clone(&fetcher),
            config.max_workers,
            SourceOptions {
                cache_timeout: config.cache_timeout(),
                max_items: config.max_repositories,
                first_request_deadline: config.first_request_deadline(),
            },
        );

        let product_hunt = SourceService::new(
            ProductHuntStories::new(),
            fetcher,
            config.max_workers,
            SourceOptions {
                cache_timeout: config.cache_timeout(),
                max_items: config.max_stories,
                first_request_deadline: config.first_request_deadline(),
            },
        );

        Ok(Self { github, product_hunt, config: Arc::new(config), started_at: Utc::now() })
    }

    /// Tear down background refreshes deterministically.
    pub async fn shutdown(&self) {
        self.github.abort_background().await;
        self.product_hunt.abort_background().await;
    }
}
