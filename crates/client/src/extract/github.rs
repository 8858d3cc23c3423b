//! GitHub trending page extractor.
//!
//! Parses the repository rows (`article.Box-row`) of
//! <https://github.com/trending>, including per-row stats, the primary
//! language with its display color, and up to three contributor avatars.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use trendlens_core::{Contributor, Error, Period, Repository, TrendingQuery};

use super::{Extractor, collapse_whitespace, parse_count};
use crate::fetch::PageRequest;

const BASE_URL: &str = "https://github.com/trending";
const DEFAULT_LANGUAGE_COLOR: &str = "#586069";
const MAX_CONTRIBUTORS: usize = 3;
const MAX_DESCRIPTION_CHARS: usize = 200;

static LANGUAGE_COLORS: LazyLock<HashMap<String, String>> = LazyLock::new(|| {
    serde_json::from_str(include_str!("../../data/language_colors.json")).unwrap_or_default()
});

/// Links from contributor avatars point at user profiles: a single path
/// segment like `/octocat`.
static PROFILE_HREF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/[^/]+$").expect("invalid regex"));

/// Extractor for the GitHub trending repositories page.
#[derive(Debug, Clone, Copy, Default)]
pub struct GithubTrending;

impl GithubTrending {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for GithubTrending {
    type Query = TrendingQuery;
    type Record = Repository;

    fn name(&self) -> &'static str {
        "github-trending"
    }

    fn page(&self, query: &Self::Query) -> PageRequest {
        let mut url = BASE_URL.to_string();
        if let Some(language) = query.language.as_deref().map(str::trim)
            && !language.is_empty()
        {
            url.push('/');
            url.push_str(&language.to_ascii_lowercase());
        }
        PageRequest::new(url).with_param("since", query.period.as_str())
    }

    fn extract(&self, html: &str, max_items: usize) -> Result<Vec<Repository>, Error> {
        let document = Html::parse_document(html);
        let row = Selector::parse("article.Box-row").expect("invalid selector");

        let rows: Vec<ElementRef<'_>> = document.select(&row).collect();
        if rows.is_empty() {
            // "It looks like we don't have any trending repositories" renders
            // as a blankslate; anything else is a structural mismatch.
            let blankslate = Selector::parse(".blankslate").expect("invalid selector");
            if document.select(&blankslate).next().is_some() {
                return Ok(Vec::new());
            }
            return Err(Error::ExtractFailed("no repository rows matched".into()));
        }

        Ok(rows
            .into_iter()
            .take(max_items)
            .filter_map(extract_repository)
            .collect())
    }

    fn fallback(&self) -> Vec<Repository> {
        vec![Repository {
            name: "GitHub Trending Unavailable".into(),
            url: "https://github.com/trending".into(),
            owner: Some("github".into()),
            repository: Some("trending".into()),
            description: "GitHub trending data is temporarily unavailable. Please try again later".into(),
            language: None,
            language_color: DEFAULT_LANGUAGE_COLOR.into(),
            stars: 0,
            forks: 0,
            stars_today: 0,
            contributors: Vec::new(),
        }]
    }

    fn warm_queries(&self) -> Vec<TrendingQuery> {
        [None, Some("go"), Some("python"), Some("javascript"), Some("typescript")]
            .into_iter()
            .map(|language| TrendingQuery::new(language.map(String::from), Period::Daily))
            .collect()
    }
}

fn extract_repository(article: ElementRef<'_>) -> Option<Repository> {
    let title_link = Selector::parse("h2 a").expect("invalid selector");
    let link = article.select(&title_link).next()?;

    let name = collapse_whitespace(&link.text().collect::<String>());
    if name.is_empty() {
        return None;
    }

    let href = link.value().attr("href").unwrap_or_default();
    let url = format!("https://github.com{href}");

    let path = href.trim_matches('/');
    let (owner, repository) = match path.split_once('/') {
        Some((owner, repository)) => (Some(owner.trim().to_string()), Some(repository.trim().to_string())),
        None => (None, None),
    };

    let description_sel = Selector::parse("p.col-9").expect("invalid selector");
    let description = article
        .select(&description_sel)
        .next()
        .map(|p| truncate_description(&collapse_whitespace(&p.text().collect::<String>())))
        .unwrap_or_default();

    let language_sel = Selector::parse("span[itemprop=\"programmingLanguage\"]").expect("invalid selector");
    let language = article
        .select(&language_sel)
        .next()
        .map(|span| collapse_whitespace(&span.text().collect::<String>()));
    let language_color = language
        .as_deref()
        .and_then(|l| LANGUAGE_COLORS.get(l).cloned())
        .unwrap_or_else(|| DEFAULT_LANGUAGE_COLOR.to_string());

    let (stars, forks) = extract_stats(article);
    let stars_today = extract_stars_today(article);
    let contributors = extract_contributors(article);

    Some(Repository {
        name,
        url,
        owner,
        repository,
        description,
        language,
        language_color,
        stars,
        forks,
        stars_today,
        contributors,
    })
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        let mut truncated: String = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        description.to_string()
    }
}

fn extract_stats(article: ElementRef<'_>) -> (u64, u64) {
    let anchors = Selector::parse("a[href]").expect("invalid selector");

    let mut stars = 0;
    let mut forks = 0;
    for link in article.select(&anchors) {
        let href = link.value().attr("href").unwrap_or_default();
        let count = || parse_count(&link.text().collect::<String>());
        if href.ends_with("/stargazers") {
            stars = count();
        } else if href.ends_with("/forks") || href.ends_with("/network/members") {
            forks = count();
        }
    }
    (stars, forks)
}

fn extract_stars_today(article: ElementRef<'_>) -> u64 {
    let spans = Selector::parse("span").expect("invalid selector");
    article
        .select(&spans)
        .map(|span| span.text().collect::<String>())
        .find(|text| text.contains("today") && text.contains("star"))
        .map(|text| parse_count(&text))
        .unwrap_or(0)
}

fn extract_contributors(article: ElementRef<'_>) -> Vec<Contributor> {
    let avatars = Selector::parse("img[class*=\"avatar\"]").expect("invalid selector");

    let mut contributors = Vec::new();
    for img in article.select(&avatars).take(MAX_CONTRIBUTORS) {
        let Some(parent) = img.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if parent.value().name() != "a" {
            continue;
        }
        let href = parent.value().attr("href").unwrap_or_default();
        if !PROFILE_HREF.is_match(href) {
            continue;
        }
        contributors.push(Contributor {
            username: href.trim_matches('/').to_string(),
            avatar_url: img.value().attr("src").unwrap_or_default().to_string(),
        });
    }
    contributors
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendlens_core::Fingerprint;

    const SAMPLE_ROW: &str = r#"
    <html><body><main>
      <article class="Box-row">
        <h2 class="h3 lh-condensed">
          <a href="/rust-lang/rust">
            rust-lang /

            rust
          </a>
        </h2>
        <p class="col-9 color-fg-muted my-1 pr-4">
          Empowering everyone to build reliable and efficient software.
        </p>
        <div>
          <span itemprop="programmingLanguage">Rust</span>
          <a href="/rust-lang/rust/stargazers">97,123</a>
          <a href="/rust-lang/rust/forks">12.5k</a>
          <a href="/foo"><img class="avatar mb-1" src="https://avatars.githubusercontent.com/u/1?s=40" alt=""></a>
          <a href="/bar/baz"><img class="avatar mb-1" src="https://avatars.githubusercontent.com/u/2?s=40" alt=""></a>
          <span class="d-inline-block float-sm-right">417 stars today</span>
        </div>
      </article>
    </main></body></html>
    "#;

    #[test]
    fn test_extract_sample_row() {
        let repos = GithubTrending.extract(SAMPLE_ROW, 25).unwrap();
        assert_eq!(repos.len(), 1);

        let repo = &repos[0];
        assert_eq!(repo.name, "rust-lang / rust");
        assert_eq!(repo.url, "https://github.com/rust-lang/rust");
        assert_eq!(repo.owner.as_deref(), Some("rust-lang"));
        assert_eq!(repo.repository.as_deref(), Some("rust"));
        assert_eq!(repo.description, "Empowering everyone to build reliable and efficient software.");
        assert_eq!(repo.language.as_deref(), Some("Rust"));
        assert_eq!(repo.language_color, "#dea584");
        assert_eq!(repo.stars, 97123);
        assert_eq!(repo.forks, 12500);
        assert_eq!(repo.stars_today, 417);

        // "/bar/baz" is not a profile link, so only one contributor survives
        assert_eq!(repo.contributors.len(), 1);
        assert_eq!(repo.contributors[0].username, "foo");
    }

    #[test]
    fn test_extract_respects_max_items() {
        let doubled = format!(
            "<html><body>{}{}</body></html>",
            SAMPLE_ROW.replace("<html><body><main>", "").replace("</main></body></html>", ""),
            SAMPLE_ROW.replace("<html><body><main>", "").replace("</main></body></html>", ""),
        );
        let repos = GithubTrending.extract(&doubled, 1).unwrap();
        assert_eq!(repos.len(), 1);
    }

    #[test]
    fn test_empty_state_is_legitimate() {
        let html = r#"<html><body><div class="blankslate">Nothing trended today.</div></body></html>"#;
        let repos = GithubTrending.extract(html, 25).unwrap();
        assert!(repos.is_empty());
    }

    #[test]
    fn test_unrecognized_page_is_failure() {
        let html = "<html><body><p>totally different markup</p></body></html>";
        let err = GithubTrending.extract(html, 25).unwrap_err();
        assert!(err.is_extraction_failure());
    }

    #[test]
    fn test_page_request_shape() {
        let query = TrendingQuery::new(Some("Rust".into()), Period::Weekly);
        let req = GithubTrending.page(&query);
        assert_eq!(req.url, "https://github.com/trending/rust");
        assert_eq!(req.params, vec![("since".to_string(), "weekly".to_string())]);

        let all = GithubTrending.page(&TrendingQuery::default());
        assert_eq!(all.url, "https://github.com/trending");
    }

    #[test]
    fn test_fallback_is_single_placeholder() {
        let fallback = GithubTrending.fallback();
        assert_eq!(fallback.len(), 1);
        assert!(fallback[0].name.contains("Unavailable"));
    }

    #[test]
    fn test_warm_queries() {
        let queries = GithubTrending.warm_queries();
        assert_eq!(queries.len(), 5);
        assert_eq!(queries[0].fingerprint(), "all_daily");
        assert_eq!(queries[2].fingerprint(), "python_daily");
    }
}
