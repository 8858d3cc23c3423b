//! GET /trending: trending repositories with language and period filters.

use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use trendlens_core::{Period, Repository, TrendingQuery};

use super::degraded_note;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TrendingParams {
    /// Programming language filter (e.g. python, javascript).
    pub language: Option<String>,
    /// Time period: daily, weekly, or monthly. Anything else means daily.
    pub since: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub repositories: Vec<Repository>,
    pub count: usize,
    pub language: Option<String>,
    pub since: String,
    pub updated_at: String,
    pub cached: bool,
    pub partial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn get_trending(
    State(state): State<AppState>, Query(params): Query<TrendingParams>,
) -> Json<TrendingResponse> {
    let period = params.since.as_deref().map(Period::parse_lenient).unwrap_or_default();
    let query = TrendingQuery::new(params.language.clone(), period);

    let data = state.github.fetch_data(&query).await;

    Json(TrendingResponse {
        count: data.records.len(),
        repositories: data.records,
        language: params.language,
        since: period.to_string(),
        updated_at: Utc::now().to_rfc3339(),
        cached: data.outcome.is_cached(),
        partial: data.outcome.is_partial(),
        error: degraded_note(data.outcome),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendlens_core::AppConfig;

    fn repo(name: &str) -> Repository {
        Repository {
            name: name.into(),
            url: format!("https://github.com/{name}"),
            owner: None,
            repository: None,
            description: String::new(),
            language: None,
            language_color: "#586069".into(),
            stars: 0,
            forks: 0,
            stars_today: 0,
            contributors: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_serves_cached_records_without_network() {
        let state = AppState::new(AppConfig::default()).unwrap();
        state.github.cache().put("python_daily", vec![repo("a/b"), repo("c/d")]);

        let params = TrendingParams { language: Some("python".into()), since: Some("daily".into()) };
        let Json(body) = get_trending(State(state), Query(params)).await;

        assert_eq!(body.count, 2);
        assert_eq!(body.since, "daily");
        assert!(body.cached);
        assert!(!body.partial);
        assert!(body.error.is_none());
    }

    #[tokio::test]
    async fn test_unknown_period_coerces_to_daily() {
        let state = AppState::new(AppConfig::default()).unwrap();
        state.github.cache().put("all_daily", vec![repo("a/b")]);

        let params = TrendingParams { language: None, since: Some("hourly".into()) };
        let Json(body) = get_trending(State(state), Query(params)).await;

        assert_eq!(body.since, "daily");
        assert!(body.cached);
    }

    #[test]
    fn test_error_field_omitted_when_none() {
        let body = TrendingResponse {
            repositories: vec![],
            count: 0,
            language: None,
            since: "daily".into(),
            updated_at: Utc::now().to_rfc3339(),
            cached: false,
            partial: false,
            error: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["count"], 0);
    }
}
