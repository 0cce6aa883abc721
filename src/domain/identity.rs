//! Identity resolution for product records
//!
//! Three identifier sources compete, with a fixed precedence:
//! `t_number` (from the detail URL) > `goods_no` > a composite fallback.
//! The fallback is unique only within a single (category, page) pair; callers
//! must not rely on it for cross-run deduplication. Recovery runs key against
//! the same derivation so pre-existing entries are detected correctly.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::product::ProductSummary;

static T_NUMBER_PAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"t_number=(\d+)").unwrap());

/// Extract the `t_number` query parameter from a detail page URL.
pub fn t_number_from_url(url: &str) -> Option<String> {
    T_NUMBER_PAT
        .captures(url)
        .map(|caps| caps[1].to_string())
}

/// A stable unique key for one product within a crawl run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Resolve the identity of a listing summary.
    ///
    /// `position` is the item's 0-based index within its page and only
    /// participates in the fallback form.
    pub fn resolve(summary: &ProductSummary, page_index: u32, position: usize) -> Self {
        if !summary.t_number.is_empty() {
            Self(format!("t_{}", summary.t_number))
        } else if !summary.goods_no.is_empty() {
            Self(format!("g_{}", summary.goods_no))
        } else {
            Self(format!(
                "fb_{}:{}:{}",
                summary.category_handle, page_index, position
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form of a t_number-backed key. Gap detection and recovery
    /// matching operate on this.
    pub fn as_t_number(&self) -> Option<u32> {
        self.0.strip_prefix("t_").and_then(|n| n.parse().ok())
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
