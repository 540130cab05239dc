//! The extraction pipeline.
//!
//! `ExtractService` is constructed once at startup and shared by handle;
//! it owns every piece of cross-request state: the global rate limiter,
//! the per-host throttle, the response cache, and the fetch-slot
//! semaphore. Each call runs:
//!
//! validate → safety → cache lookup → robots policy → rate limit →
//! host spacing → fetch → extract → format → cache store
//!
//! Any stage may terminate the pipeline with a typed failure; nothing is
//! cached unless every stage succeeded.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;

use crate::cache::ResponseCache;
use crate::config::ClipperConfig;
use crate::error::ExtractError;
use crate::format;
use crate::limiter::FetchGate;
use crate::policy::PolicyChecker;
use crate::request::ExtractRequest;
use crate::safety;
use crate::throttle::HostThrottle;
use crate::traits::{ContentExtractor, Fetcher};

/// Rate-limited, policy-compliant page extraction service.
///
/// Generic over the fetcher and extractor implementations via traits,
/// enabling dependency injection and testability without real HTTP;
/// `clipper-client` provides the production pair.
pub struct ExtractService<F, X>
where
    F: Fetcher,
    X: ContentExtractor,
{
    fetcher: F,
    extractor: X,
    policy: PolicyChecker<F>,
    gate: FetchGate,
    throttle: HostThrottle,
    cache: ResponseCache,
    fetch_slots: Arc<Semaphore>,
    config: ClipperConfig,
}

impl<F, X> ExtractService<F, X>
where
    F: Fetcher,
    X: ContentExtractor,
{
    /// Build the service. `fetcher` is used for pages; `robots_fetcher`
    /// should carry the tighter robots profile (see [`ClipperConfig`]).
    ///
    /// Must be called within a Tokio runtime (the cache starts its sweep
    /// task immediately).
    pub fn new(fetcher: F, robots_fetcher: F, extractor: X, config: ClipperConfig) -> Self {
        let agent = config.agent_token().to_string();

        Self {
            policy: PolicyChecker::new(robots_fetcher, agent),
            gate: FetchGate::new(config.rate_per_sec, config.rate_burst),
            throttle: HostThrottle::new(config.default_host_spacing),
            cache: ResponseCache::new(config.cache_ttl, config.cache_sweep_interval),
            fetch_slots: Arc::new(Semaphore::new(config.max_concurrent_fetches)),
            fetcher,
            extractor,
            config,
        }
    }

    /// Run the full pipeline for one request.
    pub async fn extract(&self, request: &ExtractRequest) -> Result<String, ExtractError> {
        let started = Instant::now();

        let req = request.validate()?;
        safety::validate_target(&req.url).await?;

        let key = req.cache_key();
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!(
                url = %req.url,
                elapsed_ms = %started.elapsed().as_millis(),
                "Cache hit"
            );
            return Ok(hit);
        }

        let verdict = self.policy.check(&req.url).await;
        if !verdict.allowed {
            return Err(ExtractError::PolicyDisallowed {
                url: req.url.to_string(),
            });
        }

        self.gate.acquire(self.config.rate_wait_budget).await?;
        self.throttle.wait(&req.url, verdict.crawl_delay).await;

        let _slot = self
            .fetch_slots
            .acquire()
            .await
            .map_err(|_| ExtractError::Network("fetch slots unavailable".into()))?;

        let html = self.fetcher.fetch(req.url.as_str()).await?;
        tracing::info!(url = %req.url, bytes = html.len(), "Fetched page");

        let content = self.extractor.extract(&html, &req.url)?;
        if !content.has_body() {
            return Err(ExtractError::NoContent(format!(
                "nothing readable at {}",
                req.url
            )));
        }

        let payload = format::render(&content, &req.url, req.format, req.max_length);
        self.cache.insert(key, payload.clone()).await;

        tracing::info!(
            url = %req.url,
            chars = payload.chars().count(),
            elapsed_ms = %started.elapsed().as_millis(),
            "Extraction complete"
        );

        Ok(payload)
    }
}
