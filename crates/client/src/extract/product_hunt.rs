//! Product Hunt stories page extractor.
//!
//! Story cards on <https://www.producthunt.com/stories> are located by their
//! `data-test="story-item-N"` attribute, with a class-pattern fallback for
//! markup revisions that drop the attribute. The stories page always renders
//! cards, so a page with zero matches is treated as a structural failure
//! rather than an empty result.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use trendlens_core::{Error, Story, StoryQuery};

use super::{Extractor, collapse_whitespace};
use crate::fetch::PageRequest;

const BASE_URL: &str = "https://www.producthunt.com/stories";

static STORY_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"story-item-(\d+)").expect("invalid regex"));
static READ_TIME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*min\s*read").expect("invalid regex"));
static SOCIAL_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)linkedin\.com|twitter\.com|github\.com").expect("invalid regex"));

/// Extractor for the Product Hunt trending stories page.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductHuntStories;

impl ProductHuntStories {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for ProductHuntStories {
    type Query = StoryQuery;
    type Record = Story;

    fn name(&self) -> &'static str {
        "product-hunt-stories"
    }

    fn page(&self, query: &Self::Query) -> PageRequest {
        let mut request = PageRequest::new(BASE_URL).with_param("ref", "header_nav");
        if let Some(category) = query.category.as_deref().map(str::trim)
            && !category.is_empty()
        {
            request = request.with_param("category", category.to_ascii_lowercase());
        }
        request
    }

    fn extract(&self, html: &str, max_items: usize) -> Result<Vec<Story>, Error> {
        let document = Html::parse_document(html);

        let by_data_test = Selector::parse("div[data-test^=\"story-item-\"]").expect("invalid selector");
        let mut items: Vec<ElementRef<'_>> = document.select(&by_data_test).collect();

        if items.is_empty() {
            let by_class = Selector::parse("div[class*=\"styles_item__\"]").expect("invalid selector");
            items = document.select(&by_class).collect();
        }

        if items.is_empty() {
            return Err(Error::ExtractFailed("no story items matched".into()));
        }

        Ok(items.into_iter().take(max_items).filter_map(extract_story).collect())
    }

    fn fallback(&self) -> Vec<Story> {
        vec![Story {
            title: "Product Hunt Stories Unavailable".into(),
            url: "https://www.producthunt.com/stories".into(),
            description: "Product Hunt stories data is temporarily unavailable. Please try again later.".into(),
            author: "Product Hunt".into(),
            author_url: None,
            category: None,
            published_at: Some(chrono::Utc::now().to_rfc3339()),
            read_time: Some(0),
            tags: Vec::new(),
            thumbnail_url: None,
            upvotes: 0,
            story_id: None,
        }]
    }

    fn warm_queries(&self) -> Vec<StoryQuery> {
        [None, Some("makers"), Some("product-updates"), Some("how-tos"), Some("news")]
            .into_iter()
            .map(|category| StoryQuery::new(category.map(String::from)))
            .collect()
    }
}

fn extract_story(item: ElementRef<'_>) -> Option<Story> {
    let story_id = item
        .value()
        .attr("data-test")
        .and_then(|v| STORY_ID.captures(v))
        .map(|c| c[1].to_string());

    let title_sel = Selector::parse("div[class*=\"text-18\"][class*=\"font-bold\"]").expect("invalid selector");
    let title_elem = item.select(&title_sel).next()?;
    let title = collapse_whitespace(&title_elem.text().collect::<String>());
    if title.is_empty() {
        return None;
    }

    let url = story_url(item, title_elem).unwrap_or_default();
    if url.is_empty() {
        tracing::warn!(title, "could not extract story URL");
    }

    let (author, author_url, category, read_time) = extract_metadata(item);

    let thumb_sel = Selector::parse("img[class*=\"styles_headerImage\"]").expect("invalid selector");
    let thumbnail_url = item.select(&thumb_sel).next().and_then(|img| {
        img.value()
            .attr("src")
            .map(str::to_string)
            .or_else(|| img.value().attr("srcset").and_then(|s| s.split(' ').next().map(str::to_string)))
    });

    let tags = category.iter().cloned().collect();

    Some(Story {
        title,
        url,
        description: String::new(),
        author,
        author_url,
        category,
        published_at: None,
        read_time,
        tags,
        thumbnail_url,
        upvotes: 0,
        story_id,
    })
}

/// Prefer the link wrapping the title; fall back to any story link in the
/// card. Category links share the `/stories/` prefix and are skipped.
fn story_url(item: ElementRef<'_>, title_elem: ElementRef<'_>) -> Option<String> {
    let is_story_href = |href: &str| href.starts_with("/stories/") && !href.contains("/category/");

    for ancestor in title_elem.ancestors() {
        if let Some(element) = ElementRef::wrap(ancestor)
            && element.value().name() == "a"
        {
            let href = element.value().attr("href").unwrap_or_default();
            if is_story_href(href) {
                return Some(format!("https://www.producthunt.com{href}"));
            }
        }
    }

    let anchors = Selector::parse("a[href^=\"/stories/\"]").expect("invalid selector");
    item.select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| is_story_href(href))
        .map(|href| format!("https://www.producthunt.com{href}"))
}

fn extract_metadata(item: ElementRef<'_>) -> (String, Option<String>, Option<String>, Option<u32>) {
    let meta_sel = Selector::parse("div[class*=\"text-12\"][class*=\"text-light-gray\"]").expect("invalid selector");
    let Some(meta) = item.select(&meta_sel).next() else {
        return ("Unknown".into(), None, None, None);
    };

    let anchors = Selector::parse("a[href]").expect("invalid selector");
    let links: Vec<ElementRef<'_>> = meta.select(&anchors).collect();

    let author_link = links
        .iter()
        .find(|a| SOCIAL_HOST.is_match(a.value().attr("href").unwrap_or_default()))
        .or_else(|| links.iter().find(|a| !category_href(a)))
        .copied();

    let (author, author_url) = match author_link {
        Some(link) => {
            let href = link.value().attr("href").unwrap_or_default();
            let author_url = if href.starts_with("/@") {
                Some(format!("https://www.producthunt.com{href}"))
            } else {
                Some(href.to_string())
            };
            (collapse_whitespace(&link.text().collect::<String>()), author_url)
        }
        None => ("Unknown".into(), None),
    };

    let category = links
        .iter()
        .find(|a| category_href(a))
        .map(|a| collapse_whitespace(&a.text().collect::<String>()));

    let meta_text = meta.text().collect::<String>();
    let read_time = READ_TIME
        .captures(&meta_text)
        .and_then(|c| c[1].parse::<u32>().ok());

    (author, author_url, category, read_time)
}

fn category_href(link: &ElementRef<'_>) -> bool {
    link.value()
        .attr("href")
        .unwrap_or_default()
        .contains("/stories/category/")
}
