//! GET /product-hunt/stories: trending stories with a category filter.

use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use trendlens_core::{Story, StoryQuery};

use super::degraded_note;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StoriesParams {
    /// Category filter (e.g. makers, product-updates, how-tos).
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StoriesResponse {
    pub stories: Vec<Story>,
    pub count: usize,
    pub category: Option<String>,
    pub updated_at: String,
    pub cached: bool,
    pub partial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn get_stories(State(state): State<AppState>, Query(params): Query<StoriesParams>) -> Json<StoriesResponse> {
    let query = StoryQuery::new(params.category.clone());

    let data = state.product_hunt.fetch_data(&query).await;

    let message = data
        .outcome
        .is_partial()
        .then(|| "partial data returned, full data is being fetched in background".to_string());

    Json(StoriesResponse {
        count: data.records.len(),
        stories: data.records,
        category: params.category,
        updated_at: Utc::now().to_rfc3339(),
        cached: data.outcome.is_cached(),
        partial: data.outcome.is_partial(),
        message,
        error: degraded_note(data.outcome),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendlens_core::AppConfig;

    fn story(title: &str) -> Story {
        Story {
            title: title.into(),
            url: "https://www.producthunt.com/stories/x".into(),
            description: String::new(),
            author: "Unknown".into(),
            author_url: None,
            category: None,
            published_at: None,
            read_time: None,
            tags: Vec::new(),
            thumbnail_url: None,
            upvotes: 0,
            story_id: None,
        }
    }

    #[tokio::test]
    async fn test_serves_cached_stories() {
        let state = AppState::new(AppConfig::default()).unwrap();
        state.product_hunt.cache().put("stories_makers", vec![story("one")]);

        let params = StoriesParams { category: Some("makers".into()) };
        let Json(body) = get_stories(State(state), Query(params)).await;

        assert_eq!(body.count, 1);
        assert_eq!(body.category.as_deref(), Some("makers"));
        assert!(body.cached);
        assert!(body.message.is_none());
    }

    #[tokio::test]
    async fn test_default_category_uses_front_page_key() {
        let state = AppState::new(AppConfig::default()).unwrap();
        state.product_hunt.cache().put("stories_all", vec![story("front")]);

        let Json(body) = get_stories(State(state), Query(StoriesParams::default())).await;
        assert_eq!(body.count, 1);
        assert!(body.cached);
    }
}
