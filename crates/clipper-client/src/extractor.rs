use std::io::Cursor;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use clipper_core::error::ExtractError;
use clipper_core::request::ExtractedContent;
use clipper_core::traits::ContentExtractor;
use htmd::HtmlToMarkdown;
use scraper::{Html, Selector};
use url::Url;

/// Readability-based content extractor.
///
/// Boilerplate removal is delegated to the `readability` crate (a port
/// of Mozilla's algorithm): it scores the DOM, drops
/// navigation/ad/script/style regions, and selects the main content
/// region. Metadata (title, author, publish date) comes from the
/// document's meta tags; the markdown rendering of the main content is
/// produced by htmd.
pub struct ReadabilityExtractor {
    converter: Arc<HtmlToMarkdown>,
}

impl Clone for ReadabilityExtractor {
    fn clone(&self) -> Self {
        Self {
            converter: Arc::clone(&self.converter),
        }
    }
}

impl ReadabilityExtractor {
    pub fn new() -> Self {
        let converter = HtmlToMarkdown::builder()
            .skip_tags(vec![
                "script", "style", "nav", "footer", "header", "aside", "noscript", "iframe", "svg",
            ])
            .build();

        Self {
            converter: Arc::new(converter),
        }
    }
}

impl Default for ReadabilityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor for ReadabilityExtractor {
    fn extract(&self, html: &str, url: &Url) -> Result<ExtractedContent, ExtractError> {
        let mut cursor = Cursor::new(html.as_bytes());
        let product = readability::extractor::extract(&mut cursor, url)
            .map_err(|e| ExtractError::NoContent(format!("readability failed for {url}: {e}")))?;

        let text_body = product.text.trim().to_string();
        if text_body.is_empty() {
            return Err(ExtractError::NoContent(format!(
                "no main content found at {url}"
            )));
        }

        let markdown_body = self
            .converter
            .convert(&product.content)
            .map(|md| md.trim().to_string())
            .map_err(|e| {
                ExtractError::NoContent(format!("markdown rendering failed for {url}: {e}"))
            })?;

        let doc = Html::parse_document(html);

        let title = meta_content(&doc, "meta[property='og:title']")
            .or_else(|| element_text(&doc, "title"))
            .or_else(|| non_empty(product.title))
            .unwrap_or_else(|| url.to_string());

        let author = meta_content(&doc, "meta[name='author']")
            .or_else(|| meta_content(&doc, "meta[property='article:author']"));

        let published_at = meta_content(&doc, "meta[property='article:published_time']")
            .or_else(|| element_attr(&doc, "time[datetime]", "datetime"))
            .and_then(|raw| parse_published(&raw));

        Ok(ExtractedContent {
            title,
            author,
            published_at,
            text_body,
            markdown_body,
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `content` attribute of the first element matching `selector`.
fn meta_content(doc: &Html, selector: &str) -> Option<String> {
    element_attr(doc, selector, "content")
}

fn element_attr(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .next()?
        .value()
        .attr(attr)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn element_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let text: String = doc.select(&sel).next()?.text().collect();
    non_empty(text)
}

/// Publish dates in the wild are mostly RFC 3339 or a bare date.
fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Example Article | Site Name</title>
  <meta property="og:title" content="Example Article">
  <meta name="author" content="Jane Doe">
  <meta property="article:published_time" content="2024-03-07T12:30:00Z">
</head>
<body>
  <nav><a href="/">Home</a> <a href="/about">About</a></nav>
  <article>
    <h1>Example Article</h1>
    <p>This is the opening paragraph of the article, long enough that a
    readability scorer will treat it as primary content rather than
    boilerplate chrome around the page.</p>
    <p>A second substantial paragraph continues the article with more
    prose, because density scoring favors contiguous blocks of real
    sentences over navigation fragments and advertising copy.</p>
  </article>
  <footer>Copyright 2024, all rights reserved.</footer>
</body>
</html>"#;

    fn url() -> Url {
        Url::parse("https://example.com/article").unwrap()
    }

    #[test]
    fn extracts_body_and_metadata() {
        let extractor = ReadabilityExtractor::new();
        let content = extractor.extract(ARTICLE_HTML, &url()).unwrap();

        assert_eq!(content.title, "Example Article");
        assert_eq!(content.author.as_deref(), Some("Jane Doe"));
        assert!(content.text_body.contains("opening paragraph"));
        assert!(content.markdown_body.contains("opening paragraph"));

        let published = content.published_at.unwrap();
        assert_eq!(published.year(), 2024);
        assert_eq!(published.month(), 3);
        assert_eq!(published.day(), 7);
    }

    #[test]
    fn empty_page_is_an_extraction_error() {
        let extractor = ReadabilityExtractor::new();
        let err = extractor
            .extract("<html><head></head><body></body></html>", &url())
            .unwrap_err();
        assert!(matches!(err, ExtractError::NoContent(_)));
    }

    #[test]
    fn falls_back_to_title_tag_without_og_title() {
        let html = ARTICLE_HTML.replace(r#"<meta property="og:title" content="Example Article">"#, "");
        let extractor = ReadabilityExtractor::new();
        let content = extractor.extract(&html, &url()).unwrap();
        assert_eq!(content.title, "Example Article | Site Name");
    }

    #[test]
    fn missing_metadata_stays_absent() {
        let html = r#"<html><head><title>Plain</title></head><body>
            <p>Enough article prose to satisfy the readability scorer and
            come back as the primary content of this otherwise bare page,
            with a second sentence for good measure.</p>
        </body></html>"#;
        let extractor = ReadabilityExtractor::new();
        let content = extractor.extract(html, &url()).unwrap();

        assert_eq!(content.author, None);
        assert_eq!(content.published_at, None);
    }

    #[test]
    fn parses_rfc3339_and_bare_dates() {
        assert_eq!(
            parse_published("2024-03-07T12:30:00Z"),
            Utc.with_ymd_and_hms(2024, 3, 7, 12, 30, 0).single()
        );
        assert_eq!(
            parse_published("2024-03-07T12:30:00+02:00"),
            Utc.with_ymd_and_hms(2024, 3, 7, 10, 30, 0).single()
        );
        assert_eq!(
            parse_published("2024-03-07"),
            Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).single()
        );
        assert_eq!(parse_published("last tuesday"), None);
    }

    #[test]
    fn time_element_datetime_is_a_date_source() {
        let html = r#"<html><head><title>T</title></head><body>
            <time datetime="2023-11-02">November 2nd</time>
            <p>Sufficiently long article prose for the readability pass to
            keep this paragraph as the page's primary readable content.</p>
        </body></html>"#;
        let extractor = ReadabilityExtractor::new();
        let content = extractor.extract(html, &url()).unwrap();

        let published = content.published_at.unwrap();
        assert_eq!((published.year(), published.month(), published.day()), (2023, 11, 2));
    }
}
