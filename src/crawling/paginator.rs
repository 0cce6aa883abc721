//! Listing pagination for one (first, second) category
//!
//! Walks `pageIdx = 1, 2, ...` and stops on whichever comes first: a page
//! with zero product blocks, a page that contributed zero new (non-duplicate)
//! items, or the hard page ceiling. The caller reports back how many items of
//! each page survived dedup via [`ListingPaginator::note_new_items`], so the
//! paginator owns all three termination rules.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::crawling::urls;
use crate::domain::product::ProductSummary;
use crate::domain::taxonomy::CategoryHandle;
use crate::infrastructure::extractor::CatalogExtractor;
use crate::infrastructure::http_client::PageFetcher;
use crate::infrastructure::storage;

/// Hard ceiling on page index; a category that claims more pages than this is
/// a pagination loop, not a catalog.
pub const MAX_PAGE_IDX: u32 = 100;

/// One fetched listing page's worth of summaries.
#[derive(Debug)]
pub struct PageBatch {
    pub page_index: u32,
    pub summaries: Vec<ProductSummary>,
}

pub struct ListingPaginator {
    fetcher: Arc<dyn PageFetcher>,
    extractor: CatalogExtractor,
    first_key: String,
    mid_name: String,
    handle: CategoryHandle,
    page_delay: Duration,
    /// Empty string disables first-page-empty debug dumps.
    debug_dump_dir: String,
    next_page_index: u32,
    exhausted: bool,
    last_page_contributed: bool,
}

impl ListingPaginator {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        first_key: &str,
        mid_name: &str,
        handle: CategoryHandle,
        page_delay: Duration,
        debug_dump_dir: &str,
    ) -> Self {
        Self {
            fetcher,
            extractor: CatalogExtractor::new(),
            first_key: first_key.to_string(),
            mid_name: mid_name.to_string(),
            handle,
            page_delay,
            debug_dump_dir: debug_dump_dir.to_string(),
            next_page_index: 1,
            exhausted: false,
            last_page_contributed: true,
        }
    }

    /// Record how many of the last batch's items were new after dedup. A
    /// fully-duplicate page means the listing has wrapped around, which is
    /// the second termination rule.
    pub fn note_new_items(&mut self, count: usize) {
        self.last_page_contributed = count > 0;
    }

    /// Fetch and parse the next listing page. `None` once the category is
    /// exhausted. A fetch failure logs and exhausts the category rather than
    /// aborting the run.
    pub async fn next_page(&mut self) -> Result<Option<PageBatch>> {
        if self.exhausted {
            return Ok(None);
        }
        if !self.last_page_contributed {
            info!(
                first = %self.first_key,
                mid = %self.mid_name,
                "previous page contributed nothing new, category done"
            );
            self.exhausted = true;
            return Ok(None);
        }
        if self.next_page_index > MAX_PAGE_IDX {
            warn!(
                first = %self.first_key,
                mid = %self.mid_name,
                "page ceiling reached, stopping category"
            );
            self.exhausted = true;
            return Ok(None);
        }

        let page_index = self.next_page_index;
        if page_index > 1 && !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }

        let url = urls::listing_url(&self.first_key, &self.mid_name, page_index, &self.handle);
        let html = match self.fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(err) => {
                warn!(
                    first = %self.first_key,
                    mid = %self.mid_name,
                    page_index,
                    error = %err,
                    "listing page fetch failed, stopping category"
                );
                self.exhausted = true;
                return Ok(None);
            }
        };

        let summaries = self.extractor.extract_listing_summaries(&html);
        if summaries.is_empty() {
            info!(
                first = %self.first_key,
                mid = %self.mid_name,
                page_index,
                "empty listing page, category done"
            );
            if page_index == 1 && !self.debug_dump_dir.is_empty() {
                // First page empty usually means a selector drifted; keep the
                // markup around for diagnosis.
                if let Err(err) = storage::dump_debug_page(
                    &self.debug_dump_dir,
                    &self.first_key,
                    &self.mid_name,
                    &html,
                )
                .await
                {
                    warn!(error = %err, "debug dump failed");
                }
            }
            self.exhausted = true;
            return Ok(None);
        }

        debug!(
            first = %self.first_key,
            mid = %self.mid_name,
            page_index,
            items = summaries.len(),
            "listing page parsed"
        );

        self.next_page_index += 1;
        Ok(Some(PageBatch {
            page_index,
            summaries,
        }))
    }
}
