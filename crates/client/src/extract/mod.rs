//! Per-site HTML extraction contracts and shared text helpers.
//!
//! An extractor owns everything site-specific: which page to fetch for a
//! query, how to locate records in the markup, the static fallback payload,
//! and the warm-query list. The policy engine treats records as opaque.

pub mod github;
pub mod product_hunt;

use std::sync::LazyLock;

use regex::Regex;
use trendlens_core::{Error, Fingerprint};

use crate::fetch::PageRequest;

/// Site-specific extraction contract consumed by the source service.
pub trait Extractor: Send + Sync + 'static {
    type Query: Fingerprint + Clone + Send + Sync + 'static;
    type Record: Clone + Send + Sync + 'static;

    /// Short source name used in logs.
    fn name(&self) -> &'static str;

    /// Page to fetch for `query`.
    fn page(&self, query: &Self::Query) -> PageRequest;

    /// Parse up to `max_items` records out of a fetched page.
    ///
    /// The result is tri-state: records, a legitimate empty page (the site's
    /// empty-state marker is present), or `Error::ExtractFailed` when the
    /// expected structure did not match at all. A selector that silently
    /// stopped matching after a site redesign must surface as a failure, not
    /// as "no results today".
    fn extract(&self, html: &str, max_items: usize) -> Result<Vec<Self::Record>, Error>;

    /// Fixed placeholder records served when no cache and no fetch succeeded.
    fn fallback(&self) -> Vec<Self::Record>;

    /// Representative queries for startup cache warming.
    fn warm_queries(&self) -> Vec<Self::Query>;
}

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("invalid regex"));
static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("invalid regex"));

/// Collapse runs of whitespace to single spaces and trim.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Parse a human-formatted count like "1,234", "1.2k" or "3m".
///
/// Returns 0 when no digits are present.
pub(crate) fn parse_count(text: &str) -> u64 {
    let text = text.trim().replace(',', "");
    if text.is_empty() {
        return 0;
    }

    if let Ok(n) = text.parse::<u64>() {
        return n;
    }

    let lower = text.to_ascii_lowercase();
    for (suffix, factor) in [("k", 1_000.0), ("m", 1_000_000.0)] {
        if let Some(stem) = lower.strip_suffix(suffix)
            && let Ok(n) = stem.trim().parse::<f64>()
        {
            return (n * factor) as u64;
        }
    }

    FIRST_NUMBER
        .find(&text)
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0)
}
