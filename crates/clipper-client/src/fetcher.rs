use std::time::Duration;

use clipper_core::error::ExtractError;
use clipper_core::safety;
use clipper_core::traits::Fetcher;
use reqwest::Client;
use url::Url;

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Content types the extractor can work with.
const SUPPORTED_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml", "text/plain"];

/// HTTP fetcher using reqwest.
///
/// Issues a single GET with identifying headers, follows at most 10
/// redirects, rejects any final status other than 200, and enforces a
/// hard body-size ceiling while streaming. By default, SSRF protection
/// is **enabled**: targets resolving to private/reserved addresses are
/// refused before any connection is made. Use
/// [`allow_private_urls`](Self::allow_private_urls) to disable this
/// (e.g., against a local test server).
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout_secs: u64,
    max_body_bytes: u64,
    ssrf_protection: bool,
}

impl ReqwestFetcher {
    /// Page profile: 60s timeout, 10MB body ceiling.
    pub fn for_pages(user_agent: &str) -> Result<Self, ExtractError> {
        Self::with_limits(user_agent, Duration::from_secs(60), 10 * 1024 * 1024)
    }

    /// robots.txt profile: 10s timeout, 1MB body ceiling.
    pub fn for_robots(user_agent: &str) -> Result<Self, ExtractError> {
        Self::with_limits(user_agent, Duration::from_secs(10), 1024 * 1024)
    }

    pub fn with_limits(
        user_agent: &str,
        timeout: Duration,
        max_body_bytes: u64,
    ) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ExtractError::Network(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
            max_body_bytes,
            ssrf_protection: true,
        })
    }

    /// Disable SSRF protection, allowing requests to private/reserved
    /// addresses. Only for environments where the operator controls the
    /// network.
    pub fn allow_private_urls(mut self) -> Self {
        self.ssrf_protection = false;
        self
    }

    fn map_send_error(&self, e: reqwest::Error) -> ExtractError {
        if e.is_timeout() {
            ExtractError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            ExtractError::Network(format!("connection failed: {e}"))
        } else {
            ExtractError::Network(e.to_string())
        }
    }

    /// Stream the body against the size ceiling. Exceeding the ceiling
    /// is an error, not a truncation: a page cut mid-markup would
    /// extract garbage.
    async fn read_capped(&self, mut response: reqwest::Response) -> Result<String, ExtractError> {
        let mut body: Vec<u8> = Vec::new();

        while let Some(chunk) = response.chunk().await.map_err(|e| self.map_send_error(e))? {
            if body.len() as u64 + chunk.len() as u64 > self.max_body_bytes {
                return Err(ExtractError::BodyTooLarge {
                    limit_bytes: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        let parsed = Url::parse(url)
            .map_err(|e| ExtractError::InvalidRequest(format!("invalid url '{url}': {e}")))?;

        if self.ssrf_protection {
            safety::validate_target(&parsed).await?;
        }

        let response = self
            .client
            .get(parsed)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ExtractError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !SUPPORTED_CONTENT_TYPES
            .iter()
            .any(|ct| content_type.contains(ct))
        {
            tracing::debug!(url = %url, content_type = %content_type, "Rejecting content type");
            return Err(ExtractError::UnsupportedContentType(if content_type.is_empty() {
                "none declared".into()
            } else {
                content_type
            }));
        }

        self.read_capped(response).await
    }
}
