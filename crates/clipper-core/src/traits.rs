use std::future::Future;

use url::Url;

use crate::error::ExtractError;
use crate::request::ExtractedContent;

/// Fetches the decoded text body of a URL.
///
/// Implementations own their timeout and body-size limits; the service is
/// constructed with two instances, one carrying the page profile and one
/// the tighter robots.txt profile.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, ExtractError>> + Send;
}

/// Recovers primary readable content from raw page markup.
///
/// Implementations discard navigation, ads, scripts, and other template
/// chrome; one that cannot find a main content region must fail rather
/// than return chrome.
pub trait ContentExtractor: Send + Sync + Clone {
    fn extract(&self, html: &str, url: &Url) -> Result<ExtractedContent, ExtractError>;
}
