//! Pooled HTTP fetch client with bounded timeouts and failure classification.
//!
//! One `reqwest::Client` is built per fetch client and reused across calls,
//! so the underlying connection pool is shared. Every call carries a fixed
//! timeout; failures are classified into timeout, connection, HTTP-status and
//! other-transport errors. The client never retries; retry policy, if any,
//! belongs to the caller.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use trendlens_core::Error;

/// A page fetch to perform: base URL plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl PageRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), params: Vec::new() }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

/// Seam between the source service and the network.
///
/// The production implementation is [`FetchClient`]; tests substitute stubs
/// with controllable latency and failures.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    /// Fetch one page, returning the body as text.
    async fn get_page(&self, request: &PageRequest) -> Result<String, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string.
    pub user_agent: String,

    /// Request timeout (default: 8s).
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5).
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("trendlens/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(8),
            max_redirects: 5,
        }
    }
}

/// HTTP fetch client with connection reuse.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl PageFetcher for FetchClient {
    async fn get_page(&self, request: &PageRequest) -> Result<String, Error> {
        let start = Instant::now();

        let mut req = self.http.get(&request.url).header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        );
        if !request.params.is_empty() {
            req = req.query(&request.params);
        }

        let response = req.send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(classify)?;

        tracing::debug!(
            url = %request.url,
            bytes = body.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "fetched page"
        );

        Ok(body)
    }
}

/// Map a reqwest error onto the fetch-failure taxonomy.
fn classify(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(err.to_string())
    } else if err.is_connect() {
        Error::ConnectionFailed(err.to_string())
    } else if let Some(status) = err.status() {
        Error::HttpStatus(status.as_u16())
    } else {
        Error::Transport(err.to_string())
    }
}
