//! Dedup & accumulation ledger
//!
//! Tracks which identities have already been admitted into a run's output, at
//! two scopes: the whole run and the category currently being paginated. An
//! identity rejected at either scope is a duplicate. Admission is provisional
//! until enrichment succeeds; `rollback` reverts both scopes so a transient
//! detail-page failure does not permanently drop the product.
//!
//! Single-threaded by design (one browser-equivalent context per run). A
//! parallel rework would give each worker its own ledger and merge them at
//! the end; membership is what matters, insertion order is not.

use std::collections::HashSet;

use crate::domain::identity::IdentityKey;

#[derive(Debug, Default)]
pub struct DedupLedger {
    global: HashSet<String>,
    category: HashSet<String>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the category scope. Called when pagination of a new
    /// (first, second) category begins.
    pub fn begin_category(&mut self) {
        self.category.clear();
    }

    /// Admit an identity. Returns false (reject) if it is already present at
    /// either scope; otherwise records it at both and returns true.
    pub fn admit(&mut self, key: &IdentityKey) -> bool {
        let k = key.as_str();
        if self.global.contains(k) || self.category.contains(k) {
            return false;
        }
        self.global.insert(k.to_string());
        self.category.insert(k.to_string());
        true
    }

    /// Revert a provisional admission so the same identity can be admitted
    /// again later in the run.
    pub fn rollback(&mut self, key: &IdentityKey) {
        self.global.remove(key.as_str());
        self.category.remove(key.as_str());
    }

    /// Number of identities admitted over the whole run.
    pub fn admitted(&self) -> usize {
        self.global.len()
    }
}
