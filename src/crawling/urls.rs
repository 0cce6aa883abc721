//! URL construction for category and listing pages
//!
//! Pure functions of (category key, category name, page index, handle) into
//! the two fixed site endpoints.

use url::form_urlencoded::Serializer;

use crate::domain::taxonomy::CategoryHandle;
use crate::infrastructure::site;

/// Category shop page for one first-level category.
pub fn category_url(first_key: &str) -> String {
    let query = Serializer::new(String::new())
        .append_pair(site::params::DISP_CAT_NO, site::GATE_DISP_CAT_NO)
        .append_pair(site::params::GATE_CD, site::tracking::GATE_CD)
        .append_pair(site::params::T_PAGE, site::tracking::CATEGORY_T_PAGE)
        .append_pair(site::params::T_CLICK, site::tracking::CATEGORY_T_CLICK)
        .append_pair(site::params::FIRST_CATEGORY, first_key)
        .finish();
    format!("{}?{}", site::CATEGORY_SHOP_URL, query)
}

/// Paginated listing URL for a (first, second, handle) triple. `page_index`
/// is 1-based.
pub fn listing_url(
    first_key: &str,
    mid_name: &str,
    page_index: u32,
    handle: &CategoryHandle,
) -> String {
    let query = Serializer::new(String::new())
        .append_pair(site::params::DISP_CAT_NO, handle.as_str())
        .append_pair("fltDispCatNo", "")
        .append_pair("prdSort", "01")
        .append_pair(site::params::PAGE_IDX, &page_index.to_string())
        .append_pair("rowsPerPage", site::ROWS_PER_PAGE)
        .append_pair("searchTypeSort", "btn_thumb")
        .append_pair("plusButtonFlag", "N")
        .append_pair("isLoginCnt", "0")
        .append_pair("aShowCnt", "0")
        .append_pair("bShowCnt", "0")
        .append_pair("cShowCnt", "0")
        .append_pair("trackingCd", &format!("Cat{}_Small", handle.as_str()))
        .append_pair(site::params::T_PAGE, site::tracking::LISTING_T_PAGE)
        .append_pair(site::params::T_CLICK, site::tracking::LISTING_T_CLICK)
        .append_pair(site::params::FIRST_CATEGORY, first_key)
        .append_pair(site::params::SECOND_CATEGORY, &format!("중_{mid_name}"))
        .finish();
    format!("{}?{}", site::PRODUCT_LIST_URL, query)
}

/// Resolve a possibly-relative detail URL against the site base.
pub fn absolutize(detail_url: &str) -> String {
    if detail_url.starts_with("http") {
        detail_url.to_string()
    } else {
        format!("{}{}", site::BASE_URL, detail_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_url_carries_handle_and_page() {
        let handle = CategoryHandle::new("1000123");
        let url = listing_url("대_스킨케어", "토너", 3, &handle);
        assert!(url.starts_with(site::PRODUCT_LIST_URL));
        assert!(url.contains("dispCatNo=1000123"));
        assert!(url.contains("pageIdx=3"));
        assert!(url.contains("rowsPerPage=24"));
        assert!(url.contains("trackingCd=Cat1000123_Small"));
    }

    #[test]
    fn absolutize_only_relative_urls() {
        assert_eq!(
            absolutize("/store/goods/getGoodsDetail.do?goodsNo=A001"),
            "https://www.oliveyoung.co.kr/store/goods/getGoodsDetail.do?goodsNo=A001"
        );
        assert_eq!(absolutize("https://example.com/x"), "https://example.com/x");
    }
}
