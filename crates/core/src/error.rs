//! Unified error types for trendlens.
//!
//! The taxonomy follows the source service's two failure classes: a fetch
//! failure (timeout, connection, HTTP status, other transport) and an
//! extraction failure (page structure did not match). Both are caught at the
//! source service boundary and converted to stale-cache-or-fallback data,
//! never surfaced to API consumers as errors.

/// Unified error types for the trendlens services.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request exceeded the configured per-call timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// TCP/TLS connection could not be established.
    #[error("CONNECTION_FAILED: {0}")]
    ConnectionFailed(String),

    /// Upstream answered with a non-2xx status.
    #[error("HTTP_STATUS: {0}")]
    HttpStatus(u16),

    /// Any other transport-level failure (body read, decode, ...).
    #[error("TRANSPORT: {0}")]
    Transport(String),

    /// Page structure did not match the expected markup.
    #[error("EXTRACT_FAILED: {0}")]
    ExtractFailed(String),
}

impl Error {
    /// True for every failure produced by the fetch client.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Error::FetchTimeout(_) | Error::ConnectionFailed(_) | Error::HttpStatus(_) | Error::Transport(_)
        )
    }

    /// True when the page was fetched but could not be parsed.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(self, Error::ExtractFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FetchTimeout("8s elapsed".to_string());
        assert!(err.to_string().contains("FETCH_TIMEOUT"));
        assert!(err.to_string().contains("8s elapsed"));
    }

    #[test]
    fn test_failure_classes() {
        assert!(Error::HttpStatus(503).is_fetch_failure());
        assert!(Error::ConnectionFailed("refused".into()).is_fetch_failure());
        assert!(!Error::ExtractFailed("no rows".into()).is_fetch_failure());
        assert!(Error::ExtractFailed("no rows".into()).is_extraction_failure());
    }
}
