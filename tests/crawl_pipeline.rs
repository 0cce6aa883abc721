//! End-to-end pipeline tests over a canned fake catalog: crawl, gap
//! detection, recovery, and merge, with a scripted fetcher standing in for
//! the site.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use oliveyoung_crawler::crawling::{CrawlEngine, RecoveryCrawler};
use oliveyoung_crawler::domain::product::Product;
use oliveyoung_crawler::domain::reconcile;
use oliveyoung_crawler::domain::taxonomy::CategoryTaxonomy;
use oliveyoung_crawler::infrastructure::config::CrawlingConfig;
use oliveyoung_crawler::infrastructure::http_client::{FetchError, PageFetcher};

/// Serves canned markup for any URL containing all needles of an entry, and
/// records every fetched URL. Unknown URLs get a 404.
struct ScriptedFetcher {
    pages: Vec<(Vec<&'static str>, String)>,
    fetched: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn new(pages: Vec<(Vec<&'static str>, String)>) -> Arc<Self> {
        Arc::new(Self {
            pages,
            fetched: Mutex::new(Vec::new()),
        })
    }

    fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.pages
            .iter()
            .find(|(needles, _)| needles.iter().all(|n| url.contains(n)))
            .map(|(_, html)| html.clone())
            .ok_or(FetchError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}

fn category_page() -> String {
    r#"<ul>
        <li><a href="javascript:common.link.moveCategory('1000123', {t_1st_category_type:'대_스킨케어', t_2nd_category_type:'중_토너'})">토너</a></li>
        <li><a href="javascript:common.link.moveCategory('1000456', {t_1st_category_type:'대_스킨케어', t_2nd_category_type:'중_에센스'})">에센스</a></li>
    </ul>"#
        .to_string()
}

fn listing_page(goods: &[(&str, u32)]) -> String {
    let blocks: String = goods
        .iter()
        .map(|(goods_no, t_number)| {
            format!(
                r#"<div class="prd_info">
                     <div class="prd_name">
                       <a href="/store/goods/getGoodsDetail.do?goodsNo={goods_no}&t_number={t_number}" data-ref-goodsno="{goods_no}">
                         <span class="tx_brand">브랜드</span>
                         <span class="tx_name">상품 {t_number}</span>
                       </a>
                     </div>
                     <p class="prd_price"><span class="tx_cur"><span class="tx_num">10,000</span></span></p>
                   </div>"#
            )
        })
        .collect();
    format!("<ul>{blocks}</ul>")
}

fn detail_page(usage: &str) -> String {
    format!(
        r#"<dl class="detail_info_list"><dt>사용방법</dt><dd>{usage}</dd></dl>
           <dl class="detail_info_list"><dt>내용물의 용량 또는 중량</dt><dd>100ml</dd></dl>"#
    )
}

fn taxonomy() -> CategoryTaxonomy {
    let mut taxonomy = CategoryTaxonomy::new();
    taxonomy.insert(
        "대_스킨케어",
        vec!["토너".to_string(), "에센스".to_string()],
    );
    taxonomy
}

fn test_config() -> CrawlingConfig {
    CrawlingConfig {
        page_delay_ms: 0,
        detail_retry_count: 2,
        recovery_detail_retry_count: 2,
        detail_retry_delay_ms: 0,
        debug_dump_dir: String::new(),
        ..Default::default()
    }
}

fn t_numbers(products: &[Product]) -> Vec<u32> {
    products.iter().filter_map(Product::t_number).collect()
}

#[tokio::test]
async fn crawl_dedups_across_categories_and_enriches() {
    let fetcher = ScriptedFetcher::new(vec![
        (vec!["getCategoryShop.do"], category_page()),
        (
            vec!["dispCatNo=1000123", "pageIdx=1"],
            listing_page(&[("A001", 1), ("A002", 2), ("A003", 3)]),
        ),
        (vec!["dispCatNo=1000123", "pageIdx=2"], "<ul></ul>".to_string()),
        // 에센스 lists t=2 again (cross-listed product) plus a new t=5.
        (
            vec!["dispCatNo=1000456", "pageIdx=1"],
            listing_page(&[("A002", 2), ("A005", 5)]),
        ),
        (vec!["dispCatNo=1000456", "pageIdx=2"], "<ul></ul>".to_string()),
        (vec!["goodsNo=A001"], detail_page("아침에 사용")),
        (vec!["goodsNo=A002"], detail_page("저녁에 사용")),
        (vec!["goodsNo=A003"], detail_page("세안 후 사용")),
        (vec!["goodsNo=A005"], detail_page("수시로 사용")),
    ]);

    let engine = CrawlEngine::new(fetcher.clone(), test_config());
    let (products, report) = engine.crawl(&taxonomy()).await.unwrap();

    assert_eq!(t_numbers(&products), vec![1, 2, 3, 5]);
    assert_eq!(report.duplicates_rejected, 1);
    assert_eq!(report.enrichment_rollbacks, 0);
    assert_eq!(report.products_collected, 4);
    assert_eq!(report.t_number_range, Some((1, 5)));

    // Enrichment fields landed on the records.
    assert!(products.iter().all(|p| !p.details.is_empty()));
    assert_eq!(products[0].details.usage_text, "아침에 사용");
    assert_eq!(products[0].first_category, "대_스킨케어");
    assert_eq!(products[0].mid_category, "토너");
}

#[tokio::test]
async fn pagination_stops_after_empty_page_without_overfetching() {
    let fetcher = ScriptedFetcher::new(vec![
        (vec!["getCategoryShop.do"], category_page()),
        (
            vec!["dispCatNo=1000123", "pageIdx=1"],
            listing_page(&[("A001", 1), ("A002", 2), ("A003", 3)]),
        ),
        (
            vec!["dispCatNo=1000123", "pageIdx=2"],
            listing_page(&[("A004", 4), ("A005", 5), ("A006", 6)]),
        ),
        (vec!["dispCatNo=1000123", "pageIdx=3"], "<ul></ul>".to_string()),
        (vec!["goodsNo=A001"], detail_page("사용법 1")),
        (vec!["goodsNo=A002"], detail_page("사용법 2")),
        (vec!["goodsNo=A003"], detail_page("사용법 3")),
        (vec!["goodsNo=A004"], detail_page("사용법 4")),
        (vec!["goodsNo=A005"], detail_page("사용법 5")),
        (vec!["goodsNo=A006"], detail_page("사용법 6")),
    ]);

    let mut taxonomy = CategoryTaxonomy::new();
    taxonomy.insert("대_스킨케어", vec!["토너".to_string()]);

    let engine = CrawlEngine::new(fetcher.clone(), test_config());
    let (products, report) = engine.crawl(&taxonomy).await.unwrap();

    assert_eq!(t_numbers(&products), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(report.pages_visited, 2);
    assert!(fetcher
        .fetched_urls()
        .iter()
        .all(|url| !url.contains("pageIdx=4")));
}

#[tokio::test]
async fn fallback_key_item_survives_alongside_keyed_item() {
    // One listing item carries a t_number, the other has neither t_number
    // nor a usable goods number and falls through to the composite key.
    let listing = r#"<ul>
        <div class="prd_info">
          <div class="prd_name">
            <a href="/store/goods/getGoodsDetail.do?goodsNo=A010&t_number=10" data-ref-goodsno="A010">
              <span class="tx_name">상품 10</span>
            </a>
          </div>
          <p class="prd_price"><span class="tx_cur"><span class="tx_num">10,000</span></span></p>
        </div>
        <div class="prd_info">
          <div class="prd_name">
            <a href="/store/goods/getGoodsDetail.do?itemId=B999">
              <span class="tx_name">무명 상품</span>
            </a>
          </div>
          <p class="prd_price"><span class="tx_cur"><span class="tx_num">8,000</span></span></p>
        </div>
    </ul>"#;

    let fetcher = ScriptedFetcher::new(vec![
        (vec!["getCategoryShop.do"], category_page()),
        (vec!["dispCatNo=1000123", "pageIdx=1"], listing.to_string()),
        (vec!["dispCatNo=1000123", "pageIdx=2"], "<ul></ul>".to_string()),
        (vec!["goodsNo=A010"], detail_page("아침에 사용")),
        (vec!["itemId=B999"], detail_page("저녁에 사용")),
    ]);

    let mut taxonomy = CategoryTaxonomy::new();
    taxonomy.insert("대_스킨케어", vec!["토너".to_string()]);

    let engine = CrawlEngine::new(fetcher, test_config());
    let (products, report) = engine.crawl(&taxonomy).await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(report.duplicates_rejected, 0);
    assert_eq!(products[0].summary.t_number, "10");
    assert_eq!(products[1].summary.t_number, "");
    assert!(products.iter().all(|p| !p.details.is_empty()));
}

#[tokio::test]
async fn failed_enrichment_is_recovered_and_merged() {
    // Primary pass: the detail page for t=3 is unreachable, so the record is
    // rolled back and the dataset ships with a gap.
    let primary = ScriptedFetcher::new(vec![
        (vec!["getCategoryShop.do"], category_page()),
        (
            vec!["dispCatNo=1000123", "pageIdx=1"],
            listing_page(&[("A001", 1), ("A002", 2), ("A003", 3)]),
        ),
        (vec!["dispCatNo=1000123", "pageIdx=2"], "<ul></ul>".to_string()),
        (vec!["dispCatNo=1000456", "pageIdx=1"], "<ul></ul>".to_string()),
        (vec!["goodsNo=A001"], detail_page("아침에 사용")),
        (vec!["goodsNo=A002"], detail_page("저녁에 사용")),
    ]);

    let mut config = test_config();
    config.expected_max_t_number = 3;

    let engine = CrawlEngine::new(primary.clone(), config.clone());
    let (products, report) = engine.crawl(&taxonomy()).await.unwrap();
    assert_eq!(t_numbers(&products), vec![1, 2]);
    assert_eq!(report.enrichment_rollbacks, 1);

    let missing = reconcile::find_missing(&products, config.expected_max_t_number);
    assert_eq!(missing, vec![3]);

    // Recovery pass: the site has settled down and t=3's detail page works.
    let recovery_fetcher = ScriptedFetcher::new(vec![
        (vec!["getCategoryShop.do"], category_page()),
        (
            vec!["dispCatNo=1000123", "pageIdx=1"],
            listing_page(&[("A001", 1), ("A002", 2), ("A003", 3)]),
        ),
        (vec!["dispCatNo=1000123", "pageIdx=2"], "<ul></ul>".to_string()),
        (vec!["dispCatNo=1000456", "pageIdx=1"], "<ul></ul>".to_string()),
        (vec!["goodsNo=A003"], detail_page("세안 후 사용")),
    ]);

    let crawler = RecoveryCrawler::new(recovery_fetcher, config);
    let outcome = crawler.recover(&taxonomy(), missing).await.unwrap();
    assert_eq!(t_numbers(&outcome.recovered), vec![3]);
    assert!(outcome.still_missing.is_empty());
    assert!(outcome.still_failed.is_empty());

    let merged = reconcile::merge(products, outcome.recovered);
    assert_eq!(t_numbers(&merged.merged), vec![1, 2, 3]);
    assert_eq!(merged.inserted, 1);
    assert!(merged.still_missing.is_empty());
}

#[tokio::test]
async fn recovery_stops_as_soon_as_queue_drains() {
    let fetcher = ScriptedFetcher::new(vec![
        (vec!["getCategoryShop.do"], category_page()),
        (
            vec!["dispCatNo=1000123", "pageIdx=1"],
            listing_page(&[("A001", 1), ("A002", 2)]),
        ),
        (vec!["dispCatNo=1000123", "pageIdx=2"], "<ul></ul>".to_string()),
        (vec!["goodsNo=A001"], detail_page("아침에 사용")),
    ]);

    let crawler = RecoveryCrawler::new(fetcher.clone(), test_config());
    let outcome = crawler.recover(&taxonomy(), vec![1]).await.unwrap();
    assert_eq!(t_numbers(&outcome.recovered), vec![1]);
    assert!(outcome.still_missing.is_empty());

    // The second category's listing was never visited.
    assert!(fetcher
        .fetched_urls()
        .iter()
        .all(|url| !url.contains("dispCatNo=1000456")));
}

#[tokio::test]
async fn unreachable_recovery_detail_stays_missing() {
    // t=2 appears on the listing but its detail page 404s every time.
    let fetcher = ScriptedFetcher::new(vec![
        (vec!["getCategoryShop.do"], category_page()),
        (
            vec!["dispCatNo=1000123", "pageIdx=1"],
            listing_page(&[("A002", 2)]),
        ),
        (vec!["dispCatNo=1000123", "pageIdx=2"], "<ul></ul>".to_string()),
        (vec!["dispCatNo=1000456", "pageIdx=1"], "<ul></ul>".to_string()),
    ]);

    let crawler = RecoveryCrawler::new(fetcher, test_config());
    let outcome = crawler.recover(&taxonomy(), vec![2]).await.unwrap();
    assert!(outcome.recovered.is_empty());
    assert_eq!(outcome.still_missing, vec![2]);
    assert_eq!(outcome.still_failed, vec![2]);
}
