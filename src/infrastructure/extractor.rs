//! HTML extraction for the Olive Young catalog pages
//!
//! Pure parsing over fetched markup: first-level category keys, second-level
//! category candidates (with their `dispCatNo` handles), listing-page product
//! summaries, and detail-page purchase-info fields. Site-specific selectors
//! and href regexes are confined to this module; everything above it works
//! with the extracted records.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::domain::identity;
use crate::domain::product::{parse_price, ProductDetails, ProductSummary};

// Category anchors carry their tracking payload inside a javascript: href,
// e.g. javascript:common.link.moveCategory('1000123', {t_1st_category_type:'대_스킨케어', ...}).
static FIRST_KEY_PAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"t_1st_category_type:\s*['"](대_[^'"]+)['"]"#).unwrap());
static SECOND_NAME_PAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"t_2nd_category_type:\s*['"]중_([^'"]+)['"]"#).unwrap());
static MOVE_CATEGORY_PAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"moveCategory(?:Shop)?\('(\d{5,})'").unwrap());

static FIRST_LEVEL_ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href^="javascript:common.link.moveCategoryShop"]"#).unwrap());
static MID_ANCHOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"li a[href^="javascript:common.link.moveCategory"], a[data-ref-dispcatno]"#)
        .unwrap()
});
static PRODUCT_BLOCK: Lazy<Selector> = Lazy::new(|| Selector::parse(".prd_info").unwrap());
static THUMB_ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a.prd_thumb").unwrap());
static ANY_ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static NAME_WRAP: Lazy<Selector> = Lazy::new(|| Selector::parse(".prd_name").unwrap());
static BRAND_TEXT: Lazy<Selector> = Lazy::new(|| Selector::parse(".tx_brand").unwrap());
static NAME_TEXT: Lazy<Selector> = Lazy::new(|| Selector::parse(".tx_name").unwrap());
static PRICE_ORG: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".prd_price .tx_org .tx_num").unwrap());
static PRICE_CUR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".prd_price .tx_cur .tx_num").unwrap());
static DETAIL_INFO_LIST: Lazy<Selector> =
    Lazy::new(|| Selector::parse("dl.detail_info_list").unwrap());
static DT: Lazy<Selector> = Lazy::new(|| Selector::parse("dt").unwrap());
static DD: Lazy<Selector> = Lazy::new(|| Selector::parse("dd").unwrap());

/// A second-level category anchor found on a category shop page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidCandidate {
    /// Display name of the second-level category.
    pub name: String,
    /// The `dispCatNo` handle addressing its listing.
    pub handle: String,
}

/// Extractor over fetched catalog markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogExtractor;

impl CatalogExtractor {
    pub fn new() -> Self {
        Self
    }

    /// First-level category keys from the category drawer, in encounter
    /// order, duplicates removed (first occurrence wins).
    pub fn extract_first_level_keys(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut seen = std::collections::HashSet::new();
        let mut keys = Vec::new();

        for anchor in document.select(&FIRST_LEVEL_ANCHOR) {
            let href = anchor.value().attr("href").unwrap_or_default();
            if let Some(caps) = FIRST_KEY_PAT.captures(href) {
                let key = caps[1].to_string();
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
        }

        debug!(count = keys.len(), "extracted first-level category keys");
        keys
    }

    /// Second-level category candidates on the shop page of `first_key`.
    ///
    /// Anchors whose href names a different first-level category are skipped;
    /// anchors without one are kept (the page under navigation is assumed).
    /// The handle comes from `data-ref-dispcatno` when present, with the
    /// href's `moveCategory('...')` argument as backup.
    pub fn extract_mid_candidates(&self, html: &str, first_key: &str) -> Vec<MidCandidate> {
        let document = Html::parse_document(html);
        let own_key_pat = Regex::new(&format!(
            r#"t_1st_category_type:\s*['"]{}['"]"#,
            regex::escape(first_key)
        ))
        .expect("escaped key pattern is valid");

        let mut seen = std::collections::HashSet::new();
        let mut candidates = Vec::new();

        for anchor in document.select(&MID_ANCHOR) {
            let href = anchor.value().attr("href").unwrap_or_default();
            let text = collect_text(&anchor);

            if href.contains("t_1st_category_type") && !own_key_pat.is_match(href) {
                continue;
            }

            let name = SECOND_NAME_PAT
                .captures(href)
                .map(|caps| caps[1].trim().to_string())
                .unwrap_or(text);

            let handle = anchor
                .value()
                .attr("data-ref-dispcatno")
                .map(str::to_string)
                .filter(|h| !h.is_empty())
                .or_else(|| {
                    MOVE_CATEGORY_PAT
                        .captures(href)
                        .map(|caps| caps[1].to_string())
                });

            if let Some(handle) = handle {
                if !name.is_empty() && seen.insert((name.clone(), handle.clone())) {
                    candidates.push(MidCandidate { name, handle });
                }
            }
        }

        debug!(
            first_key,
            count = candidates.len(),
            "extracted mid-category candidates"
        );
        candidates
    }

    /// Product summaries from a listing page, one per `.prd_info` block, with
    /// prices parsed to integers, t_number lifted from the detail URL, and
    /// the non-sale price normalization applied.
    pub fn extract_listing_summaries(&self, html: &str) -> Vec<ProductSummary> {
        let document = Html::parse_document(html);
        let mut summaries = Vec::new();

        for block in document.select(&PRODUCT_BLOCK) {
            summaries.push(self.extract_single_summary(&block));
        }

        debug!(count = summaries.len(), "extracted listing summaries");
        summaries
    }

    fn extract_single_summary(&self, block: &ElementRef<'_>) -> ProductSummary {
        let thumb = block
            .select(&THUMB_ANCHOR)
            .next()
            .or_else(|| block.select(&ANY_ANCHOR).next());
        let name_wrap = block.select(&NAME_WRAP).next();
        let name_link = name_wrap.and_then(|wrap| wrap.select(&ANY_ANCHOR).next());

        let image_url = thumb
            .and_then(|a| a.select(&IMG).next())
            .or_else(|| block.select(&IMG).next())
            .and_then(|img| img.value().attr("src"))
            .unwrap_or_default()
            .trim()
            .to_string();

        let brand = name_wrap
            .and_then(|wrap| wrap.select(&BRAND_TEXT).next())
            .map(|el| collect_text(&el))
            .unwrap_or_default();
        let name = name_wrap
            .and_then(|wrap| wrap.select(&NAME_TEXT).next())
            .map(|el| collect_text(&el))
            .unwrap_or_default();
        let detail_url = name_link
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default()
            .trim()
            .to_string();

        let attr_of = |attr: &str| -> String {
            thumb
                .and_then(|a| a.value().attr(attr))
                .filter(|v| !v.is_empty())
                .or_else(|| name_link.and_then(|a| a.value().attr(attr)))
                .unwrap_or_default()
                .to_string()
        };

        let price_original = block
            .select(&PRICE_ORG)
            .next()
            .and_then(|el| parse_price(&collect_text(&el)));
        let price_current = block
            .select(&PRICE_CUR)
            .next()
            .and_then(|el| parse_price(&collect_text(&el)));

        let mut summary = ProductSummary {
            goods_no: attr_of("data-ref-goodsno"),
            category_handle: attr_of("data-ref-dispcatno"),
            image_url,
            brand,
            name,
            t_number: identity::t_number_from_url(&detail_url).unwrap_or_default(),
            detail_url,
            price_original,
            price_current,
        };
        summary.normalize_prices();
        summary
    }

    /// The five purchase-info fields from a detail page. Labels vary
    /// slightly across products, so they are matched by substring rather
    /// than equality. Absent blocks leave fields empty.
    pub fn extract_detail_fields(&self, html: &str) -> ProductDetails {
        let document = Html::parse_document(html);
        let mut details = ProductDetails::default();

        for dl in document.select(&DETAIL_INFO_LIST) {
            let Some(dt) = dl.select(&DT).next() else {
                continue;
            };
            let Some(dd) = dl.select(&DD).next() else {
                continue;
            };

            let label = collect_text(&dt);
            let value = collect_text(&dd);

            if label.contains("내용물의 용량") || label.contains("중량") {
                details.volume_or_weight_text = value;
            } else if label.contains("제품 주요 사양") {
                details.spec_text = value;
            } else if label.contains("사용방법") {
                details.usage_text = value;
            } else if label.contains("성분") && label.contains("화장품법") {
                details.ingredients_text = value;
            } else if label.contains("주의사항") {
                details.caution_text = value;
            }
        }

        details
    }
}

fn collect_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
