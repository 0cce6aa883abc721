//! Domain model and pure algorithms
//!
//! Product records, identity resolution, the dedup ledger, the category
//! taxonomy, and the gap-detection / merge-reconciliation functions. Nothing
//! in here touches the network or the filesystem (taxonomy file I/O excepted).

pub mod identity;
pub mod ledger;
pub mod product;
pub mod reconcile;
pub mod taxonomy;

pub use identity::IdentityKey;
pub use ledger::DedupLedger;
pub use product::{Product, ProductDetails, ProductSummary};
pub use taxonomy::{CategoryHandle, CategoryTaxonomy};
