use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ExtractError;

/// Smallest accepted `max_length` (characters of body text).
pub const MIN_MAX_LENGTH: usize = 1_000;
/// Largest accepted `max_length`.
pub const MAX_MAX_LENGTH: usize = 100_000;
/// `max_length` applied when the caller doesn't specify one.
pub const DEFAULT_MAX_LENGTH: usize = 50_000;

/// Output rendering for extracted content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Text,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Text => "text",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "markdown" => Ok(OutputFormat::Markdown),
            "text" => Ok(OutputFormat::Text),
            other => Err(ExtractError::InvalidRequest(format!(
                "unknown format '{other}' (expected 'markdown' or 'text')"
            ))),
        }
    }
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

/// A single extraction request.
///
/// An out-of-range `max_length` is clamped during validation; a missing
/// or unparseable URL is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub url: String,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default)]
    pub format: OutputFormat,
}

impl ExtractRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_length: DEFAULT_MAX_LENGTH,
            format: OutputFormat::Markdown,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Parse the URL and clamp `max_length` into its accepted range.
    pub fn validate(&self) -> Result<ValidRequest, ExtractError> {
        let raw = self.url.trim();
        if raw.is_empty() {
            return Err(ExtractError::InvalidRequest("url is required".into()));
        }

        let url = Url::parse(raw)
            .map_err(|e| ExtractError::InvalidRequest(format!("invalid url '{raw}': {e}")))?;

        Ok(ValidRequest {
            url,
            max_length: self.max_length.clamp(MIN_MAX_LENGTH, MAX_MAX_LENGTH),
            format: self.format,
        })
    }
}

/// A request that passed validation. Parameters are fixed from here on.
#[derive(Debug, Clone)]
pub struct ValidRequest {
    pub url: Url,
    pub max_length: usize,
    pub format: OutputFormat,
}

impl ValidRequest {
    /// Cache key: opaque composition of URL and format.
    pub fn cache_key(&self) -> String {
        format!("{}|{}", self.url, self.format)
    }
}

/// Primary readable content recovered from a page.
///
/// Both renderings are produced up front; the formatter picks one by the
/// requested output format. Lives only for the pipeline invocation that
/// produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    pub title: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// Plain-text rendering of the main content.
    pub text_body: String,
    /// Markdown rendering of the main content.
    pub markdown_body: String,
}

impl ExtractedContent {
    pub fn body_for(&self, format: OutputFormat) -> &str {
        match format {
            OutputFormat::Markdown => &self.markdown_body,
            OutputFormat::Text => &self.text_body,
        }
    }

    pub fn has_body(&self) -> bool {
        !self.text_body.trim().is_empty() || !self.markdown_body.trim().is_empty()
    }
}
