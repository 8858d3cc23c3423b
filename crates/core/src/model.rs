//! Record and query models shared by the extractors and the HTTP API.
//!
//! Records are produced by the extractors, stored by value in the cache, and
//! returned by value to callers. The cache and policy layers never inspect
//! their fields.

use serde::{Deserialize, Serialize};

/// A contributor avatar shown on a trending repository row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub username: String,
    pub avatar_url: String,
}

/// A trending repository scraped from the GitHub trending page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name with owner, e.g. "rust-lang/rust".
    pub name: String,
    pub url: String,
    pub owner: Option<String>,
    pub repository: Option<String>,
    #[serde(default)]
    pub description: String,
    pub language: Option<String>,
    pub language_color: String,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub forks: u64,
    #[serde(default)]
    pub stars_today: u64,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
}

/// A trending story scraped from the Product Hunt stories page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    pub author: String,
    pub author_url: Option<String>,
    pub category: Option<String>,
    pub published_at: Option<String>,
    pub read_time: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub upvotes: u64,
    pub story_id: Option<String>,
}

/// Trending time window accepted by the GitHub trending page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }

    /// Parse a user-supplied period, coercing anything unknown to daily.
    ///
    /// The upstream site silently treats unknown `since` values as daily, so
    /// the API does the same rather than rejecting the request.
    pub fn parse_lenient(value: &str) -> Period {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" => Period::Weekly,
            "monthly" => Period::Monthly,
            _ => Period::Daily,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter parameters for the GitHub trending source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrendingQuery {
    /// Programming language filter; `None` means all languages.
    pub language: Option<String>,
    pub period: Period,
}

impl TrendingQuery {
    pub fn new(language: Option<String>, period: Period) -> Self {
        Self { language, period }
    }
}

/// Filter parameters for the Product Hunt stories source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryQuery {
    /// Story category filter; `None` means the front page.
    pub category: Option<String>,
}

impl StoryQuery {
    pub fn new(category: Option<String>) -> Self {
        Self { category }
    }
}
