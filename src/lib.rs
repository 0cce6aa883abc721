//! Olive Young product catalog crawler
//!
//! Discovers the site's two-level category taxonomy, paginates product
//! listings per category, enriches each product with its purchase-info
//! details, and reconciles incomplete runs through a gap-detect / recover /
//! merge cycle keyed by the site-assigned `t_number`.

// Module declarations
pub mod crawling;
pub mod domain;
pub mod infrastructure;
