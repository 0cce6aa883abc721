//! Product record types
//!
//! A `ProductSummary` is what a listing page yields for one item; a
//! `ProductDetails` is the purchase-info block scraped from the detail page.
//! The two plus provenance form the flat `Product` record that is persisted.
//! Serde renames keep the JSON shape identical to the site's own attribute
//! names so downstream consumers see familiar keys.

use serde::{Deserialize, Serialize};

/// Basic product information extracted from a listing page block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Site-assigned product identifier (`data-ref-goodsno`). Empty if absent.
    #[serde(rename = "goodsNo", default)]
    pub goods_no: String,
    /// Numeric category handle the item was listed under (`data-ref-dispcatno`).
    #[serde(rename = "dispCatNo", default)]
    pub category_handle: String,
    #[serde(rename = "image", default)]
    pub image_url: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub name: String,
    /// Detail page URL, possibly relative to the site root.
    #[serde(rename = "detailUrl", default)]
    pub detail_url: String,
    /// Secondary numeric identifier embedded in the detail URL query string.
    /// The most reliable unique key when present. Empty if absent.
    #[serde(default)]
    pub t_number: String,
    /// Original (pre-sale) price in won. `None` when the site shows no price.
    #[serde(rename = "price_org")]
    pub price_original: Option<u32>,
    /// Current price in won.
    #[serde(rename = "price_cur")]
    pub price_current: Option<u32>,
}

impl ProductSummary {
    /// Non-sale normalization: items not on sale carry only a current price,
    /// in which case the original price is defined to equal it.
    pub fn normalize_prices(&mut self) {
        if self.price_original.is_none() && self.price_current.is_some() {
            self.price_original = self.price_current;
        }
    }
}

/// Strip everything but digits from a raw price string ("12,000원" -> 12000).
pub fn parse_price(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// The five purchase-info fields from a product detail page.
///
/// Each field is independently optional; absent fields are empty strings,
/// never nulls, so JSON consumers see a uniform record shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    /// 내용물의 용량 또는 중량
    #[serde(rename = "volume", default)]
    pub volume_or_weight_text: String,
    /// 제품 주요 사양
    #[serde(rename = "spec", default)]
    pub spec_text: String,
    /// 사용방법
    #[serde(rename = "usage", default)]
    pub usage_text: String,
    /// 화장품법에 따라 기재해야 하는 모든 성분
    #[serde(rename = "ingredients", default)]
    pub ingredients_text: String,
    /// 사용할 때의 주의사항
    #[serde(rename = "caution", default)]
    pub caution_text: String,
}

impl ProductDetails {
    /// All five fields empty means enrichment produced nothing.
    pub fn is_empty(&self) -> bool {
        self.volume_or_weight_text.is_empty()
            && self.spec_text.is_empty()
            && self.usage_text.is_empty()
            && self.ingredients_text.is_empty()
            && self.caution_text.is_empty()
    }
}

/// Full product record: summary + details + crawl provenance, flattened into
/// one JSON object. Immutable once appended to a run's output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(flatten)]
    pub summary: ProductSummary,
    #[serde(flatten)]
    pub details: ProductDetails,
    #[serde(default)]
    pub first_category: String,
    #[serde(default)]
    pub mid_category: String,
    #[serde(rename = "page_idx", default)]
    pub page_index: u32,
}

impl Product {
    pub fn from_parts(
        summary: ProductSummary,
        details: ProductDetails,
        first_category: &str,
        mid_category: &str,
        page_index: u32,
    ) -> Self {
        Self {
            summary,
            details,
            first_category: first_category.to_string(),
            mid_category: mid_category.to_string(),
            page_index,
        }
    }

    /// The record's t_number in numeric form, if it carries one.
    pub fn t_number(&self) -> Option<u32> {
        if self.summary.t_number.is_empty() {
            None
        } else {
            self.summary.t_number.parse().ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_price_strips_currency_markers() {
        assert_eq!(parse_price("12,000원"), Some(12_000));
        assert_eq!(parse_price("9900"), Some(9_900));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("가격문의"), None);
    }

    #[test]
    fn non_sale_price_normalization() {
        let mut summary = ProductSummary {
            price_current: parse_price("12,000원"),
            ..Default::default()
        };
        summary.normalize_prices();
        assert_eq!(summary.price_original, Some(12_000));
        assert_eq!(summary.price_current, Some(12_000));
    }

    #[test]
    fn sale_prices_left_untouched() {
        let mut summary = ProductSummary {
            price_original: Some(15_000),
            price_current: Some(12_000),
            ..Default::default()
        };
        summary.normalize_prices();
        assert_eq!(summary.price_original, Some(15_000));
        assert_eq!(summary.price_current, Some(12_000));
    }

    #[test]
    fn details_emptiness() {
        assert!(ProductDetails::default().is_empty());
        let details = ProductDetails {
            usage_text: "아침 저녁 세안 후 사용".to_string(),
            ..Default::default()
        };
        assert!(!details.is_empty());
    }

    #[test]
    fn product_serializes_flat() {
        let product = Product::from_parts(
            ProductSummary {
                goods_no: "A000000123".to_string(),
                t_number: "42".to_string(),
                price_original: Some(12_000),
                price_current: Some(12_000),
                ..Default::default()
            },
            ProductDetails::default(),
            "대_스킨케어",
            "토너",
            3,
        );
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["goodsNo"], "A000000123");
        assert_eq!(value["t_number"], "42");
        assert_eq!(value["price_org"], 12_000);
        assert_eq!(value["first_category"], "대_스킨케어");
        assert_eq!(value["page_idx"], 3);
        // Flattened: no nested "summary"/"details" objects.
        assert!(value.get("summary").is_none());
        assert!(value.get("details").is_none());
    }

    #[test]
    fn numeric_t_number() {
        let mut product = Product::default();
        assert_eq!(product.t_number(), None);
        product.summary.t_number = "879".to_string();
        assert_eq!(product.t_number(), Some(879));
    }
}
