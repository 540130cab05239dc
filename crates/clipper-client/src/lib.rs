pub mod extractor;
pub mod fetcher;

pub use extractor::ReadabilityExtractor;
pub use fetcher::ReqwestFetcher;

use clipper_core::error::ExtractError;
use clipper_core::{ClipperConfig, ExtractService};

/// Wire up the production service: reqwest fetchers (page and robots
/// profiles) and the readability extractor.
///
/// Construct once at startup, inside a Tokio runtime, and share the
/// returned service by reference with every request handler.
pub fn default_service(
    config: ClipperConfig,
) -> Result<ExtractService<ReqwestFetcher, ReadabilityExtractor>, ExtractError> {
    let pages = ReqwestFetcher::with_limits(
        &config.user_agent,
        config.fetch_timeout,
        config.max_body_bytes,
    )?;
    let robots = ReqwestFetcher::with_limits(
        &config.user_agent,
        config.robots_timeout,
        config.robots_max_bytes,
    )?;

    Ok(ExtractService::new(
        pages,
        robots,
        ReadabilityExtractor::new(),
        config,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_service_builds() {
        let svc = default_service(ClipperConfig::default());
        assert!(svc.is_ok());
    }
}
