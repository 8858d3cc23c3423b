//! Proactive cache warming for a source's known-popular queries.
//!
//! Runs once at startup (detached, never blocking the server) and may be
//! re-invoked manually. Each warm query goes through the service's
//! full-fidelity refresh; parallelism is bounded by the service's worker
//! pool, and one failed query never aborts the others.

use super::{Outcome, SourceService};
use crate::extract::Extractor;

/// Aggregated warming result, for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Warm the cache for every query the extractor considers representative.
pub async fn warm_cache<X: Extractor>(service: &SourceService<X>) -> WarmReport {
    let queries = service.warm_queries();
    if queries.is_empty() {
        return WarmReport::default();
    }

    let mut handles = Vec::with_capacity(queries.len());
    for query in queries {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.refresh_query(&query).await.outcome
        }));
    }

    let mut report = WarmReport { attempted: handles.len(), ..Default::default() };
    for handle in handles {
        match handle.await {
            Ok(Outcome::Fetched | Outcome::CacheHit) => report.succeeded += 1,
            Ok(_) | Err(_) => report.failed += 1,
        }
    }

    tracing::info!(
        source = service.source_name(),
        attempted = report.attempted,
        succeeded = report.succeeded,
        failed = report.failed,
        "cache warming completed"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::super::tests::{LineExtractor, StubFetcher};
    use super::*;
    use crate::source::SourceOptions;
    use std::sync::Arc;
    use std::time::Duration;

    fn warm_service(fetcher: Arc<StubFetcher>) -> SourceService<LineExtractor> {
        SourceService::new(LineExtractor, fetcher, 2, SourceOptions::default())
    }

    #[tokio::test]
    async fn test_warm_populates_all_queries() {
        let fetcher = StubFetcher::body("a\nb");
        let service = warm_service(Arc::clone(&fetcher));

        let report = warm_cache(&service).await;
        assert_eq!(report, WarmReport { attempted: 2, succeeded: 2, failed: 0 });
        assert!(service.cache().is_fresh("all_daily", Duration::from_secs(600)));
        assert!(service.cache().is_fresh("go_daily", Duration::from_secs(600)));
    }

    #[tokio::test]
    async fn test_warm_failures_do_not_abort_other_queries() {
        let fetcher = StubFetcher::failing();
        let service = warm_service(fetcher);

        let report = warm_cache(&service).await;
        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed, 2);
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn test_warm_bypasses_degraded_first_request() {
        // a cold cache plus a slow fetch would trip the request path's
        // deadline; warming waits for the full fetch instead
        let fetcher = StubFetcher::slow("a\nb\nc", Duration::from_millis(50));
        let service = warm_service(Arc::clone(&fetcher));

        let report = warm_cache(&service).await;
        assert_eq!(report.succeeded, 2);
        assert_eq!(service.cache().get("all_daily").unwrap().records.len(), 3);
    }
}
