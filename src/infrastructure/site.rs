//! Olive Young site constants
//!
//! The two fixed endpoints the crawler talks to, and the query parameters
//! they expect. URL construction itself lives in `crawling::urls`.

/// Base URL, also used to absolutize relative detail-page links.
pub const BASE_URL: &str = "https://www.oliveyoung.co.kr";

/// Category shop page: lists the second-level categories of one first-level
/// category and carries their `dispCatNo` handles.
pub const CATEGORY_SHOP_URL: &str =
    "https://www.oliveyoung.co.kr/store/display/getCategoryShop.do";

/// Paginated product listing endpoint for one second-level category.
pub const PRODUCT_LIST_URL: &str =
    "https://www.oliveyoung.co.kr/store/display/getMCategoryList.do";

/// The drawer gate's own display-category number, required on every category
/// shop request.
pub const GATE_DISP_CAT_NO: &str = "10000010001";

/// Items per listing page the site serves.
pub const ROWS_PER_PAGE: &str = "24";

/// First-level category the default seed URL points at.
pub const DEFAULT_FIRST_CATEGORY: &str = "대_스킨케어";

/// Query parameter names used by both endpoints.
pub mod params {
    pub const DISP_CAT_NO: &str = "dispCatNo";
    pub const GATE_CD: &str = "gateCd";
    pub const PAGE_IDX: &str = "pageIdx";
    pub const FIRST_CATEGORY: &str = "t_1st_category_type";
    pub const SECOND_CATEGORY: &str = "t_2nd_category_type";
    pub const T_PAGE: &str = "t_page";
    pub const T_CLICK: &str = "t_click";
}

/// Fixed tracking values the site expects on category navigation.
pub mod tracking {
    pub const GATE_CD: &str = "Drawer";
    pub const CATEGORY_T_PAGE: &str = "드로우_카테고리";
    pub const CATEGORY_T_CLICK: &str = "카테고리탭_대카테고리";
    pub const LISTING_T_PAGE: &str = "카테고리관";
    pub const LISTING_T_CLICK: &str = "카테고리상세_중카테고리";
}

/// Default seed URL for taxonomy discovery.
pub fn default_seed_url() -> String {
    use url::form_urlencoded::Serializer;
    let query = Serializer::new(String::new())
        .append_pair(params::DISP_CAT_NO, GATE_DISP_CAT_NO)
        .append_pair(params::GATE_CD, tracking::GATE_CD)
        .append_pair(params::T_PAGE, tracking::CATEGORY_T_PAGE)
        .append_pair(params::T_CLICK, tracking::CATEGORY_T_CLICK)
        .append_pair(params::FIRST_CATEGORY, DEFAULT_FIRST_CATEGORY)
        .finish();
    format!("{CATEGORY_SHOP_URL}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_url_carries_gate_and_first_category() {
        let seed = default_seed_url();
        assert!(seed.starts_with(CATEGORY_SHOP_URL));
        assert!(seed.contains("dispCatNo=10000010001"));
        assert!(seed.contains("t_1st_category_type=%EB%8C%80_%EC%8A%A4%ED%82%A8%EC%BC%80%EC%96%B4"));
    }
}
