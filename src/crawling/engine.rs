//! The primary crawl engine
//!
//! Drives the whole taxonomy: resolve each second-level category to its
//! handle, paginate its listing, dedup against the run ledger, enrich each
//! new item from its detail page, and accumulate the flat product records.
//! Admission to the ledger is provisional; a product whose enrichment fails
//! (or comes back with every field empty) is rolled back so a later listing
//! of the same item can capture it properly.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::crawling::enricher::DetailEnricher;
use crate::crawling::navigator::CategoryNavigator;
use crate::crawling::paginator::ListingPaginator;
use crate::domain::identity::IdentityKey;
use crate::domain::ledger::DedupLedger;
use crate::domain::product::{Product, ProductDetails};
use crate::domain::taxonomy::CategoryTaxonomy;
use crate::infrastructure::config::CrawlingConfig;
use crate::infrastructure::http_client::PageFetcher;

/// Run-level statistics, serialized into the log at the end of a crawl.
#[derive(Debug, Serialize)]
pub struct CrawlReport {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub categories_crawled: usize,
    pub categories_skipped: usize,
    pub pages_visited: usize,
    pub summaries_seen: usize,
    pub duplicates_rejected: usize,
    pub enrichment_rollbacks: usize,
    pub products_collected: usize,
    /// Min and max t_number observed, when any record carried one.
    pub t_number_range: Option<(u32, u32)>,
}

pub struct CrawlEngine {
    fetcher: Arc<dyn PageFetcher>,
    navigator: CategoryNavigator,
    config: CrawlingConfig,
}

impl CrawlEngine {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: CrawlingConfig) -> Self {
        Self {
            navigator: CategoryNavigator::new(fetcher.clone()),
            fetcher,
            config,
        }
    }

    /// Crawl every (first, second) category of `taxonomy`.
    pub async fn crawl(&self, taxonomy: &CategoryTaxonomy) -> Result<(Vec<Product>, CrawlReport)> {
        let session_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%session_id, categories = taxonomy.category_count(), "crawl started");

        let enricher = DetailEnricher::new(
            self.fetcher.clone(),
            self.config.detail_retry_count,
            Duration::from_millis(self.config.detail_retry_delay_ms),
        );

        let mut ledger = DedupLedger::new();
        let mut products = Vec::new();
        let mut categories_crawled = 0usize;
        let mut categories_skipped = 0usize;
        let mut pages_visited = 0usize;
        let mut summaries_seen = 0usize;
        let mut duplicates_rejected = 0usize;
        let mut enrichment_rollbacks = 0usize;

        for (first_key, mids) in taxonomy.iter() {
            let candidates = match self.navigator.candidates_for(first_key).await {
                Ok(candidates) => candidates,
                Err(err) => {
                    warn!(first_key, error = %err, "category page unavailable, skipping group");
                    categories_skipped += mids.len();
                    continue;
                }
            };

            for mid_name in mids {
                let Some(handle) = self.navigator.resolve_handle(
                    mid_name,
                    &candidates,
                    self.config.fuzzy_match_cutoff,
                ) else {
                    categories_skipped += 1;
                    continue;
                };

                info!(first_key, mid_name, %handle, "crawling category");
                ledger.begin_category();
                categories_crawled += 1;

                let mut paginator = ListingPaginator::new(
                    self.fetcher.clone(),
                    first_key,
                    mid_name,
                    handle,
                    Duration::from_millis(self.config.page_delay_ms),
                    &self.config.debug_dump_dir,
                );

                while let Some(batch) = paginator.next_page().await? {
                    pages_visited += 1;
                    summaries_seen += batch.summaries.len();
                    let mut admitted_on_page = 0usize;

                    for (position, summary) in batch.summaries.into_iter().enumerate() {
                        let key = IdentityKey::resolve(&summary, batch.page_index, position);
                        if !ledger.admit(&key) {
                            duplicates_rejected += 1;
                            continue;
                        }
                        admitted_on_page += 1;

                        let details = if self.config.fetch_details {
                            match self.fetch_details_for(&enricher, &summary.detail_url).await {
                                Some(details) => details,
                                None => {
                                    ledger.rollback(&key);
                                    enrichment_rollbacks += 1;
                                    continue;
                                }
                            }
                        } else {
                            ProductDetails::default()
                        };

                        products.push(Product::from_parts(
                            summary,
                            details,
                            first_key,
                            mid_name,
                            batch.page_index,
                        ));
                    }

                    paginator.note_new_items(admitted_on_page);
                }
            }
        }

        let t_numbers: Vec<u32> = products.iter().filter_map(Product::t_number).collect();
        let t_number_range = match (t_numbers.iter().min(), t_numbers.iter().max()) {
            (Some(&min), Some(&max)) => Some((min, max)),
            _ => None,
        };

        let report = CrawlReport {
            session_id,
            started_at,
            finished_at: Utc::now(),
            categories_crawled,
            categories_skipped,
            pages_visited,
            summaries_seen,
            duplicates_rejected,
            enrichment_rollbacks,
            products_collected: products.len(),
            t_number_range,
        };

        info!(
            %session_id,
            products = report.products_collected,
            pages = report.pages_visited,
            duplicates = report.duplicates_rejected,
            rollbacks = report.enrichment_rollbacks,
            "crawl finished"
        );
        Ok((products, report))
    }

    /// `None` means enrichment failed outright or yielded nothing; the caller
    /// rolls the product back. Items without a detail URL cannot be enriched
    /// and count as failures too.
    async fn fetch_details_for(
        &self,
        enricher: &DetailEnricher,
        detail_url: &str,
    ) -> Option<ProductDetails> {
        if detail_url.is_empty() {
            return None;
        }
        match enricher.enrich(detail_url).await {
            Ok(details) if !details.is_empty() => Some(details),
            Ok(_) => None,
            Err(err) => {
                warn!(detail_url, error = %err, "enrichment failed");
                None
            }
        }
    }
}
