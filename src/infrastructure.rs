//! Infrastructure: HTTP transport, HTML extraction, configuration, logging,
//! and JSON persistence.

pub mod config;
pub mod extractor;
pub mod http_client;
pub mod logging;
pub mod site;
pub mod storage;

pub use extractor::CatalogExtractor;
pub use http_client::{FetchError, HttpClient, PageFetcher};
