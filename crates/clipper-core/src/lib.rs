pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod limiter;
pub mod policy;
pub mod request;
pub mod safety;
pub mod service;
pub mod testutil;
pub mod throttle;
pub mod traits;

pub use config::ClipperConfig;
pub use error::ExtractError;
pub use request::{ExtractRequest, ExtractedContent, OutputFormat};
pub use service::ExtractService;
pub use traits::{ContentExtractor, Fetcher};
