//! Deterministic cache-key derivation from query parameters.
//!
//! Every omitted filter is substituted with an explicit sentinel before the
//! parts are concatenated, so syntactically different but semantically
//! equivalent queries (missing period vs explicit "daily") collapse to the
//! same key. Normalization mirrors what the source sites treat as equivalent:
//! surrounding whitespace is ignored and filters are case-insensitive.

use crate::model::{StoryQuery, TrendingQuery};

/// Derives the cache key identifying a normalized query.
pub trait Fingerprint {
    /// Deterministic, total; distinct user-visible result sets never collide.
    fn fingerprint(&self) -> String;
}

/// Normalize one filter part: trim, lowercase, sentinel for absent/empty.
fn part(value: Option<&str>, sentinel: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_ascii_lowercase(),
        _ => sentinel.to_string(),
    }
}

impl Fingerprint for TrendingQuery {
    fn fingerprint(&self) -> String {
        format!("{}_{}", part(self.language.as_deref(), "all"), self.period.as_str())
    }
}

impl Fingerprint for StoryQuery {
    fn fingerprint(&self) -> String {
        format!("stories_{}", part(self.category.as_deref(), "all"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Period;

    #[test]
    fn test_defaults_collapse_to_same_key() {
        let implicit = TrendingQuery::new(None, Period::default());
        let explicit = TrendingQuery::new(None, Period::Daily);
        assert_eq!(implicit.fingerprint(), explicit.fingerprint());
        assert_eq!(implicit.fingerprint(), "all_daily");
    }

    #[test]
    fn test_language_normalization() {
        let upper = TrendingQuery::new(Some("  Python ".into()), Period::Daily);
        let lower = TrendingQuery::new(Some("python".into()), Period::Daily);
        assert_eq!(upper.fingerprint(), lower.fingerprint());
        assert_eq!(lower.fingerprint(), "python_daily");
    }

    #[test]
    fn test_empty_language_is_all() {
        let blank = TrendingQuery::new(Some("   ".into()), Period::Weekly);
        assert_eq!(blank.fingerprint(), "all_weekly");
    }

    #[test]
    fn test_distinct_queries_distinct_keys() {
        let go_weekly = TrendingQuery::new(Some("go".into()), Period::Weekly);
        let go_daily = TrendingQuery::new(Some("go".into()), Period::Daily);
        assert_ne!(go_weekly.fingerprint(), go_daily.fingerprint());
        assert_eq!(go_weekly.fingerprint(), "go_weekly");
    }

    #[test]
    fn test_story_fingerprints() {
        assert_eq!(StoryQuery::new(None).fingerprint(), "stories_all");
        assert_eq!(StoryQuery::new(Some("Makers".into())).fingerprint(), "stories_makers");
    }
}
