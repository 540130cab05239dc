/// Smoke-test for the full extraction pipeline.
///
/// Builds the production service, extracts <https://example.com>, and
/// prints the formatted payload.
///
/// Run with:
///   cargo run --example extract_page
use clipper_client::default_service;
use clipper_core::{ClipperConfig, ExtractRequest, OutputFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let service = default_service(ClipperConfig::default())?;

    let url = "https://example.com";
    println!("Extracting {url} …");
    let page = service
        .extract(&ExtractRequest::new(url).with_format(OutputFormat::Text))
        .await?;

    assert!(
        page.contains("**Source:** https://example.com"),
        "Provenance header missing from payload"
    );

    println!("OK, got {} chars:\n", page.chars().count());
    println!("{page}");
    Ok(())
}
