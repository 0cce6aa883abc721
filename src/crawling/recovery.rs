//! Recovery crawler for known-missing t_numbers
//!
//! Re-walks the taxonomy looking only for the ids the gap detector flagged.
//! Each found id is acknowledged once; the walk short-circuits as soon as the
//! work queue drains. An id whose detail page cannot be fetched stays
//! unacknowledged (and is reported as still-failed), so a later category that
//! lists the same product gets another shot at it.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::crawling::enricher::DetailEnricher;
use crate::crawling::navigator::CategoryNavigator;
use crate::crawling::paginator::ListingPaginator;
use crate::domain::product::Product;
use crate::domain::taxonomy::CategoryTaxonomy;
use crate::infrastructure::config::CrawlingConfig;
use crate::infrastructure::http_client::PageFetcher;

/// The recovery work queue: t_numbers still wanted. Ordered so progress logs
/// and reports read naturally.
#[derive(Debug, Default)]
pub struct MissingIdSet {
    ids: BTreeSet<u32>,
}

impl MissingIdSet {
    pub fn from_ids(ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    /// Mark an id as found. Returns true if it was still wanted.
    pub fn acknowledge(&mut self, id: u32) -> bool {
        self.ids.remove(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// The ids still wanted, ascending.
    pub fn remaining(&self) -> Vec<u32> {
        self.ids.iter().copied().collect()
    }
}

/// What a recovery walk produced.
#[derive(Debug)]
pub struct RecoveryOutcome {
    /// Fully enriched records for previously-missing ids.
    pub recovered: Vec<Product>,
    /// Ids never encountered on any listing page.
    pub still_missing: Vec<u32>,
    /// Ids encountered whose detail page stayed unreachable. Subset of
    /// `still_missing`.
    pub still_failed: Vec<u32>,
}

pub struct RecoveryCrawler {
    fetcher: Arc<dyn PageFetcher>,
    navigator: CategoryNavigator,
    config: CrawlingConfig,
}

impl RecoveryCrawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: CrawlingConfig) -> Self {
        Self {
            navigator: CategoryNavigator::new(fetcher.clone()),
            fetcher,
            config,
        }
    }

    /// Walk `taxonomy` until every id in `missing_ids` is recovered or the
    /// taxonomy is exhausted.
    pub async fn recover(
        &self,
        taxonomy: &CategoryTaxonomy,
        missing_ids: Vec<u32>,
    ) -> Result<RecoveryOutcome> {
        let mut missing = MissingIdSet::from_ids(missing_ids);
        let mut still_failed: BTreeSet<u32> = BTreeSet::new();
        let mut recovered = Vec::new();

        info!(wanted = missing.len(), "recovery walk started");
        if missing.is_empty() {
            return Ok(RecoveryOutcome {
                recovered,
                still_missing: Vec::new(),
                still_failed: Vec::new(),
            });
        }

        let enricher = DetailEnricher::new(
            self.fetcher.clone(),
            self.config.recovery_detail_retry_count,
            Duration::from_millis(self.config.detail_retry_delay_ms),
        );

        'walk: for (first_key, mids) in taxonomy.iter() {
            let candidates = match self.navigator.candidates_for(first_key).await {
                Ok(candidates) => candidates,
                Err(err) => {
                    warn!(first_key, error = %err, "category page unavailable, skipping group");
                    continue;
                }
            };

            for mid_name in mids {
                if missing.is_empty() {
                    break 'walk;
                }
                let Some(handle) = self.navigator.resolve_handle(
                    mid_name,
                    &candidates,
                    self.config.fuzzy_match_cutoff,
                ) else {
                    continue;
                };

                let mut paginator = ListingPaginator::new(
                    self.fetcher.clone(),
                    first_key,
                    mid_name,
                    handle,
                    Duration::from_millis(self.config.page_delay_ms),
                    &self.config.debug_dump_dir,
                );

                while let Some(batch) = paginator.next_page().await? {
                    // Every page counts as progress here; only empty pages
                    // and the ceiling end a category during recovery.
                    paginator.note_new_items(batch.summaries.len());

                    for summary in batch.summaries {
                        let Some(id) = summary.t_number.parse::<u32>().ok() else {
                            continue;
                        };
                        if !missing.contains(id) {
                            continue;
                        }

                        match enricher.enrich(&summary.detail_url).await {
                            Ok(details) => {
                                missing.acknowledge(id);
                                still_failed.remove(&id);
                                info!(id, remaining = missing.len(), "recovered product");
                                recovered.push(Product::from_parts(
                                    summary,
                                    details,
                                    first_key,
                                    mid_name,
                                    batch.page_index,
                                ));
                            }
                            Err(err) => {
                                warn!(id, error = %err, "recovery enrichment failed");
                                still_failed.insert(id);
                            }
                        }
                    }

                    if missing.is_empty() {
                        break 'walk;
                    }
                }
            }
        }

        let still_missing = missing.remaining();
        info!(
            recovered = recovered.len(),
            still_missing = still_missing.len(),
            still_failed = still_failed.len(),
            "recovery walk finished"
        );

        Ok(RecoveryOutcome {
            recovered,
            still_missing,
            still_failed: still_failed.into_iter().collect(),
        })
    }
}
