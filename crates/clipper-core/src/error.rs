use thiserror::Error;

/// Pipeline-wide error types for Clipper.
///
/// Every stage fails fast with one of these; there is no partial-result
/// fallback and no internal retry. Callers decide whether to retry based
/// on [`is_retryable`](ExtractError::is_retryable).
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Request failed validation before any work was done.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// SSRF guard rejected the target.
    #[error("unsafe target: {0}")]
    UnsafeTarget(String),

    /// robots.txt denies access for our agent.
    #[error("access disallowed by robots.txt: {url}")]
    PolicyDisallowed { url: String },

    /// No rate-limit token became available within the wait budget.
    #[error("rate limit wait exceeded {waited_secs} seconds")]
    RateLimitTimeout { waited_secs: u64 },

    /// Request timed out.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("network error: {0}")]
    Network(String),

    /// Target answered with a non-200 status.
    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    /// Response body exceeded the configured ceiling.
    #[error("response body exceeded {limit_bytes} bytes")]
    BodyTooLarge { limit_bytes: u64 },

    /// Content type we don't extract from.
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Page fetched, but no readable content was found in it.
    #[error("no readable content: {0}")]
    NoContent(String),
}

impl ExtractError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExtractError::RateLimitTimeout { .. }
            | ExtractError::Timeout(_)
            | ExtractError::Network(_) => true,
            ExtractError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Short label for the pipeline stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            ExtractError::InvalidRequest(_) => "input",
            ExtractError::UnsafeTarget(_) => "safety",
            ExtractError::PolicyDisallowed { .. } => "policy",
            ExtractError::RateLimitTimeout { .. } => "capacity",
            ExtractError::Timeout(_)
            | ExtractError::Network(_)
            | ExtractError::HttpStatus { .. }
            | ExtractError::BodyTooLarge { .. }
            | ExtractError::UnsupportedContentType(_) => "network",
            ExtractError::NoContent(_) => "extraction",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ExtractError::Network("reset".into()).is_retryable());
        assert!(ExtractError::Timeout(60).is_retryable());
        assert!(ExtractError::RateLimitTimeout { waited_secs: 60 }.is_retryable());
        assert!(
            ExtractError::HttpStatus {
                status: 503,
                reason: "Service Unavailable".into(),
            }
            .is_retryable()
        );
        assert!(
            !ExtractError::HttpStatus {
                status: 404,
                reason: "Not Found".into(),
            }
            .is_retryable()
        );
        assert!(!ExtractError::UnsafeTarget("localhost".into()).is_retryable());
        assert!(
            !ExtractError::PolicyDisallowed {
                url: "https://example.com/private".into(),
            }
            .is_retryable()
        );
        assert!(!ExtractError::NoContent("empty".into()).is_retryable());
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(ExtractError::UnsafeTarget("x".into()).stage(), "safety");
        assert_eq!(
            ExtractError::PolicyDisallowed { url: "x".into() }.stage(),
            "policy"
        );
        assert_eq!(
            ExtractError::RateLimitTimeout { waited_secs: 1 }.stage(),
            "capacity"
        );
        assert_eq!(
            ExtractError::HttpStatus {
                status: 500,
                reason: "Internal Server Error".into(),
            }
            .stage(),
            "network"
        );
        assert_eq!(ExtractError::NoContent("x".into()).stage(), "extraction");
    }
}
