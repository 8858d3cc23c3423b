//! HTTP route wiring.
//!
//! Data endpoints always answer 200 with a success-shaped body; degraded
//! states show up as `cached` / `partial` / `error` body fields so dashboard
//! consumers never need an error branch. Only malformed requests are
//! rejected by axum's extractors.

pub mod health;
pub mod root;
pub mod stories;
pub mod trending;

use axum::{Router, routing::get};
use trendlens_client::Outcome;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root::info))
        .route("/trending", get(trending::get_trending))
        .route("/product-hunt/stories", get(stories::get_stories))
        .route("/health", get(health::health_check))
        .with_state(state)
}

/// Body-level error note for degraded outcomes.
pub(crate) fn degraded_note(outcome: Outcome) -> Option<String> {
    match outcome {
        Outcome::Stale => Some("stale data served because the latest refresh failed".into()),
        Outcome::Fallback => Some("fallback data due to fetch or extraction failure".into()),
        _ => None,
    }
}
