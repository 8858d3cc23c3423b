//! GET /: service identification and endpoint listing.

use axum::Json;
use serde_json::{Value, json};

pub async fn info() -> Json<Value> {
    Json(json!({
        "name": "trendlens",
        "description": "Trending repositories and stories API with cached scraping",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "trending": "/trending?language=<lang>&since=<daily|weekly|monthly>",
            "stories": "/product-hunt/stories?category=<category>",
            "health": "/health"
        }
    }))
}
