//! Category navigation and taxonomy discovery
//!
//! Walks the category drawer to build the two-level taxonomy, and resolves a
//! second-level category name back to its `dispCatNo` handle at crawl time.
//! Name resolution is tiered: normalized-exact, raw-exact, then fuzzy, since
//! the site occasionally renames categories between the discovery pass and
//! the crawl pass (whitespace, separators, suffix tweaks).

use std::sync::Arc;

use anyhow::{Context, Result};
use strsim::normalized_levenshtein;
use tracing::{debug, info, warn};
use url::Url;

use crate::crawling::urls;
use crate::domain::taxonomy::{CategoryHandle, CategoryTaxonomy};
use crate::infrastructure::extractor::{CatalogExtractor, MidCandidate};
use crate::infrastructure::http_client::PageFetcher;
use crate::infrastructure::site;

/// Substrings marking an anchor as a promotional banner rather than a real
/// category ("~원" price teasers, sale tabs, volume callouts).
const NOISE_TOKENS: &[&str] = &["원", "세일", "ml", "ML", "기획"];

/// Which tier produced a name match. Logged so fuzzy hits are auditable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    NormalizedExact,
    RawExact,
    Fuzzy,
}

/// Strip separator characters and case so cosmetic renames still match.
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '_' | '-' | '/' | '\\' | '·' | '・'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_noise(name: &str) -> bool {
    NOISE_TOKENS.iter().any(|token| name.contains(token))
}

/// Pick the candidate handle for `wanted` from `candidates`, tier by tier.
/// Pure so the tier ordering is testable without a fetcher.
pub fn choose_handle(
    wanted: &str,
    candidates: &[MidCandidate],
    fuzzy_cutoff: f64,
) -> Option<(CategoryHandle, MatchTier)> {
    let wanted_norm = normalize_name(wanted);

    if let Some(hit) = candidates
        .iter()
        .find(|c| normalize_name(&c.name) == wanted_norm)
    {
        return Some((CategoryHandle::new(&hit.handle), MatchTier::NormalizedExact));
    }

    if let Some(hit) = candidates.iter().find(|c| c.name == wanted) {
        return Some((CategoryHandle::new(&hit.handle), MatchTier::RawExact));
    }

    // Ties go to the earliest candidate, so only a strictly greater score
    // displaces the current best.
    let best = candidates
        .iter()
        .map(|c| (c, normalized_levenshtein(&wanted_norm, &normalize_name(&c.name))))
        .filter(|(_, score)| *score >= fuzzy_cutoff)
        .fold(None::<(&MidCandidate, f64)>, |best, (c, score)| match best {
            Some((_, top)) if score <= top => best,
            _ => Some((c, score)),
        });

    best.map(|(hit, score)| {
        debug!(wanted, matched = %hit.name, score, "fuzzy category match");
        (CategoryHandle::new(&hit.handle), MatchTier::Fuzzy)
    })
}

/// Category drawer navigator.
pub struct CategoryNavigator {
    fetcher: Arc<dyn PageFetcher>,
    extractor: CatalogExtractor,
}

impl CategoryNavigator {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            extractor: CatalogExtractor::new(),
        }
    }

    /// First-level category keys from the seed page. When the drawer markup
    /// yields nothing, the seed URL's own first-category parameter is used as
    /// a single-entry fallback so a run can still proceed.
    pub async fn discover_first_level(&self, seed_url: &str) -> Result<Vec<String>> {
        let html = self
            .fetcher
            .fetch(seed_url)
            .await
            .context("Failed to fetch seed page")?;
        let keys = self.extractor.extract_first_level_keys(&html);

        if !keys.is_empty() {
            return Ok(keys);
        }

        warn!("no first-level categories in drawer markup, falling back to seed parameter");
        let parsed = Url::parse(seed_url).context("Invalid seed URL")?;
        let fallback = parsed
            .query_pairs()
            .find(|(k, _)| k == site::params::FIRST_CATEGORY)
            .map(|(_, v)| v.into_owned())
            .context("Seed URL carries no first-level category parameter")?;
        Ok(vec![fallback])
    }

    /// Second-level candidates on the shop page of `first_key`, with
    /// promotional noise anchors removed.
    pub async fn candidates_for(&self, first_key: &str) -> Result<Vec<MidCandidate>> {
        let url = urls::category_url(first_key);
        let html = self
            .fetcher
            .fetch(&url)
            .await
            .with_context(|| format!("Failed to fetch category page for {first_key}"))?;

        Ok(self
            .extractor
            .extract_mid_candidates(&html, first_key)
            .into_iter()
            .filter(|c| !is_noise(&c.name))
            .collect())
    }

    /// Build the full two-level taxonomy from the seed page.
    pub async fn discover_taxonomy(&self, seed_url: &str) -> Result<CategoryTaxonomy> {
        let first_keys = self.discover_first_level(seed_url).await?;
        info!(count = first_keys.len(), "discovered first-level categories");

        let mut taxonomy = CategoryTaxonomy::new();
        for first_key in &first_keys {
            let mids: Vec<String> = self
                .candidates_for(first_key)
                .await?
                .into_iter()
                .map(|c| c.name)
                .collect();
            info!(first_key, mids = mids.len(), "discovered second-level categories");
            taxonomy.insert(first_key.clone(), mids);
        }
        Ok(taxonomy)
    }

    /// Resolve a second-level name to its listing handle among `candidates`.
    pub fn resolve_handle(
        &self,
        mid_name: &str,
        candidates: &[MidCandidate],
        fuzzy_cutoff: f64,
    ) -> Option<CategoryHandle> {
        match choose_handle(mid_name, candidates, fuzzy_cutoff) {
            Some((handle, tier)) => {
                if tier == MatchTier::Fuzzy {
                    info!(mid_name, %handle, "category resolved by fuzzy match");
                }
                Some(handle)
            }
            None => {
                warn!(mid_name, "no matching category anchor, skipping");
                None
            }
        }
    }
}
