//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests. All mocks
//! use `Arc<Mutex<_>>` interior mutability so tests can assert on
//! recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use url::Url;

use crate::error::ExtractError;
use crate::request::ExtractedContent;
use crate::traits::{ContentExtractor, Fetcher};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum Canned {
    Body(String),
    Status(u16),
    NetworkDown,
}

/// Mock fetcher with per-URL routed responses and a recorded call log.
///
/// Unrouted URLs return a minimal default HTML page, so tests only need
/// to route the URLs they care about.
#[derive(Clone, Default)]
pub struct MockFetcher {
    routes: Arc<Mutex<HashMap<String, Canned>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `url` to a successful response with `body`.
    pub fn route(self, url: &str, body: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Canned::Body(body.to_string()));
        self
    }

    /// Route `url` to a non-200 HTTP status.
    pub fn route_status(self, url: &str, status: u16) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Canned::Status(status));
        self
    }

    /// Route `url` to a connection failure.
    pub fn route_error(self, url: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Canned::NetworkDown);
        self
    }

    /// Every URL fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// How many times `url` was fetched.
    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        self.calls.lock().unwrap().push(url.to_string());

        let canned = self.routes.lock().unwrap().get(url).cloned();
        match canned {
            None => Ok("<html><body><p>default</p></body></html>".to_string()),
            Some(Canned::Body(body)) => Ok(body),
            Some(Canned::Status(status)) => Err(ExtractError::HttpStatus {
                status,
                reason: "mocked".into(),
            }),
            Some(Canned::NetworkDown) => {
                Err(ExtractError::Network("connection refused".into()))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MockExtractor
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum ExtractBehavior {
    Content(ExtractedContent),
    Empty,
    Fail,
}

/// Mock extractor returning fixed content, empty content, or an error.
#[derive(Clone)]
pub struct MockExtractor {
    behavior: ExtractBehavior,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockExtractor {
    pub fn new(content: ExtractedContent) -> Self {
        Self {
            behavior: ExtractBehavior::Content(content),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Extractor that finds no readable content (empty bodies).
    pub fn empty() -> Self {
        Self {
            behavior: ExtractBehavior::Empty,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Extractor that errors outright.
    pub fn failing() -> Self {
        Self {
            behavior: ExtractBehavior::Fail,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ContentExtractor for MockExtractor {
    fn extract(&self, _html: &str, url: &Url) -> Result<ExtractedContent, ExtractError> {
        self.calls.lock().unwrap().push(url.to_string());

        match &self.behavior {
            ExtractBehavior::Content(content) => Ok(content.clone()),
            ExtractBehavior::Empty => Ok(ExtractedContent {
                title: "Empty".into(),
                author: None,
                published_at: None,
                text_body: String::new(),
                markdown_body: String::new(),
            }),
            ExtractBehavior::Fail => Err(ExtractError::NoContent("mock extraction failure".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Build an [`ExtractedContent`] with identical text and markdown bodies.
pub fn make_test_content(title: &str, body: &str) -> ExtractedContent {
    ExtractedContent {
        title: title.to_string(),
        author: None,
        published_at: None,
        text_body: body.to_string(),
        markdown_body: body.to_string(),
    }
}

/// Build an [`ExtractedContent`] with author and publish date populated.
pub fn make_rich_content(title: &str, body: &str, author: &str) -> ExtractedContent {
    ExtractedContent {
        author: Some(author.to_string()),
        published_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).single(),
        ..make_test_content(title, body)
    }
}
