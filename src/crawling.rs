//! The crawl pipeline
//!
//! Category navigation, listing pagination, detail enrichment, the primary
//! crawl engine, and the recovery crawler that re-walks the taxonomy for
//! known-missing t_numbers.

pub mod engine;
pub mod enricher;
pub mod navigator;
pub mod paginator;
pub mod recovery;
pub mod urls;

pub use engine::{CrawlEngine, CrawlReport};
pub use navigator::CategoryNavigator;
pub use recovery::{MissingIdSet, RecoveryCrawler, RecoveryOutcome};
