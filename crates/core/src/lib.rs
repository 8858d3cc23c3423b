//! Core types and shared functionality for trendlens.
//!
//! This crate provides:
//! - In-memory cache store with lazy freshness evaluation
//! - Deterministic query fingerprinting
//! - Unified error types
//! - Layered configuration

pub mod cache;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod model;

pub use cache::{CacheEntry, CacheInfo, CacheStore};
pub use config::AppConfig;
pub use error::Error;
pub use fingerprint::Fingerprint;
pub use model::{Contributor, Period, Repository, Story, StoryQuery, TrendingQuery};
