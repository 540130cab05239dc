//! Output assembly: provenance header, separator, bounded body.

use url::Url;

use crate::request::{ExtractedContent, OutputFormat};

/// Appended when the body is cut at the length ceiling.
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated due to length limit]";

/// Render the final payload: metadata header, separator, body.
///
/// The body is hard-cut at `max_length` characters; the header never is.
pub fn render(
    content: &ExtractedContent,
    source: &Url,
    format: OutputFormat,
    max_length: usize,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", content.title));
    if let Some(author) = &content.author {
        out.push_str(&format!("**Author:** {author}  \n"));
    }
    if let Some(published) = &content.published_at {
        out.push_str(&format!(
            "**Published:** {}  \n",
            published.format("%B %-d, %Y")
        ));
    }
    out.push_str(&format!("**Source:** {source}  \n"));
    out.push_str("\n---\n\n");

    out.push_str(&truncate_chars(content.body_for(format), max_length));
    out
}

/// Hard cut at `max` characters (not bytes); the marker is appended only
/// when a cut happened.
fn truncate_chars(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        None => body.to_string(),
        Some((cut, _)) => {
            let mut truncated = body[..cut].to_string();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
    }
}
