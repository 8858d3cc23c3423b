//! Client code for trendlens.
//!
//! This crate provides the pooled HTTP fetch client, the per-site HTML
//! extractors, the source service policy engine, and the cache warmer.

pub mod extract;
pub mod fetch;
pub mod source;

pub use extract::{Extractor, github::GithubTrending, product_hunt::ProductHuntStories};
pub use fetch::{FetchClient, FetchConfig, PageFetcher, PageRequest};
pub use source::{
    DataResponse, Outcome, SourceOptions, SourceService,
    warm::{WarmReport, warm_cache},
};
