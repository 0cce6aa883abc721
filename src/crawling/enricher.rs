//! Detail page enrichment with bounded retry
//!
//! Visits a product's detail page and extracts the purchase-info fields.
//! Transient fetch failures are retried with a fixed backoff; parsing an
//! intact page that simply lacks the info block is NOT an error, it yields
//! empty details. Only when every attempt failed at the transport level does
//! the enricher return the error, so callers can distinguish "unreachable"
//! from "reachable but bare".

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::crawling::urls;
use crate::domain::product::ProductDetails;
use crate::infrastructure::extractor::CatalogExtractor;
use crate::infrastructure::http_client::{FetchError, PageFetcher};

pub struct DetailEnricher {
    fetcher: Arc<dyn PageFetcher>,
    extractor: CatalogExtractor,
    max_attempts: u32,
    retry_delay: Duration,
}

impl DetailEnricher {
    pub fn new(fetcher: Arc<dyn PageFetcher>, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            fetcher,
            extractor: CatalogExtractor::new(),
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    /// Fetch and parse the detail page behind `detail_url` (relative URLs are
    /// resolved against the site base). Retries until fields appear or
    /// attempts run out; returns the last fetch error only if no attempt got
    /// a page at all.
    pub async fn enrich(&self, detail_url: &str) -> Result<ProductDetails, FetchError> {
        let url = urls::absolutize(detail_url);
        let mut last_error: Option<FetchError> = None;
        let mut fetched_any = false;
        let mut details = ProductDetails::default();

        for attempt in 1..=self.max_attempts {
            if attempt > 1 && !self.retry_delay.is_zero() {
                tokio::time::sleep(self.retry_delay).await;
            }

            match self.fetcher.fetch(&url).await {
                Ok(html) => {
                    fetched_any = true;
                    details = self.extractor.extract_detail_fields(&html);
                    if !details.is_empty() {
                        return Ok(details);
                    }
                    debug!(url = %url, attempt, "detail page carried no info fields");
                }
                Err(err) => {
                    warn!(url = %url, attempt, error = %err, "detail fetch failed");
                    last_error = Some(err);
                }
            }
        }

        if fetched_any {
            // Page reachable, info block genuinely absent.
            Ok(details)
        } else {
            Err(last_error.unwrap_or(FetchError::Status {
                status: 0,
                url,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    const DETAIL_HTML: &str = r#"
        <dl class="detail_info_list"><dt>사용방법</dt><dd>세안 후 사용</dd></dl>
    "#;

    /// Fails the first `failures` fetches, then serves `html`.
    struct FlakyFetcher {
        failures: u32,
        html: &'static str,
        calls: AtomicU32,
    }

    #[async_trait]
    impl PageFetcher for FlakyFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            } else {
                Ok(self.html.to_string())
            }
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failure() {
        let fetcher = Arc::new(FlakyFetcher {
            failures: 2,
            html: DETAIL_HTML,
            calls: AtomicU32::new(0),
        });
        let enricher = DetailEnricher::new(fetcher.clone(), 3, Duration::ZERO);

        let details = enricher.enrich("/store/goods/x?t_number=1").await.unwrap();
        assert_eq!(details.usage_text, "세안 후 사용");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn all_attempts_failed_is_an_error() {
        let fetcher = Arc::new(FlakyFetcher {
            failures: 10,
            html: DETAIL_HTML,
            calls: AtomicU32::new(0),
        });
        let enricher = DetailEnricher::new(fetcher.clone(), 3, Duration::ZERO);

        let result = enricher.enrich("/store/goods/x?t_number=1").await;
        assert!(matches!(result, Err(FetchError::Timeout { .. })));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn bare_page_yields_empty_details_not_error() {
        let fetcher = Arc::new(FlakyFetcher {
            failures: 0,
            html: "<html><body>품절</body></html>",
            calls: AtomicU32::new(0),
        });
        let enricher = DetailEnricher::new(fetcher.clone(), 2, Duration::ZERO);

        let details = enricher.enrich("/store/goods/x?t_number=1").await.unwrap();
        assert!(details.is_empty());
        // Empty fields still consume all attempts before giving up.
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }
}
