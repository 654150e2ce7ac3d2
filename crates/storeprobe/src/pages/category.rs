//! Apparel & Shoes category listing: grid, pager and sort order.

use super::{check_grid, check_visible, or_default, BasePage};
use crate::driver::{Driver, Element};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use crate::verification::{check_current_page, check_sorted_names, check_sorted_prices, Check, SortOrder};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Sort orders offered by the category sort drop-down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOption {
    /// Shop-defined position
    Position,
    /// Name: A to Z
    NameAsc,
    /// Name: Z to A
    NameDesc,
    /// Price: Low to High
    PriceAsc,
    /// Price: High to Low
    PriceDesc,
    /// Created on
    CreatedOn,
}

impl SortOption {
    /// Every option in drop-down order
    pub const ALL: [Self; 6] = [
        Self::Position,
        Self::NameAsc,
        Self::NameDesc,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::CreatedOn,
    ];

    /// The shop's `orderby` query value
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Position => 0,
            Self::NameAsc => 5,
            Self::NameDesc => 6,
            Self::PriceAsc => 10,
            Self::PriceDesc => 11,
            Self::CreatedOn => 15,
        }
    }

    /// Visible drop-down label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Position => "Position",
            Self::NameAsc => "Name: A to Z",
            Self::NameDesc => "Name: Z to A",
            Self::PriceAsc => "Price: Low to High",
            Self::PriceDesc => "Price: High to Low",
            Self::CreatedOn => "Created on",
        }
    }

    /// Kebab-case name used on the command line
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::CreatedOn => "created-on",
        }
    }

    /// `orderby` query parameter, e.g. `orderby=15`
    #[must_use]
    pub fn query(self) -> String {
        format!("orderby={}", self.code())
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortOption {
    type Err = ProbeError;

    /// Accepts the label, the slug or the numeric code
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|option| {
                option.label().eq_ignore_ascii_case(s)
                    || option.slug().eq_ignore_ascii_case(s)
                    || option.code().to_string() == s
            })
            .ok_or_else(|| ProbeError::settings(format!("unknown sort option: {s:?}")))
    }
}

/// The Apparel & Shoes listing
#[derive(Debug, Clone, Copy)]
pub struct CategoryPage<'a, D: Driver> {
    base: BasePage<'a, D>,
}

impl<'a, D: Driver> CategoryPage<'a, D> {
    /// Category page over a session
    #[must_use]
    pub const fn new(session: &'a Session<D>) -> Self {
        Self {
            base: BasePage::new(session),
        }
    }

    /// Shared plumbing
    #[must_use]
    pub const fn base(&self) -> &BasePage<'a, D> {
        &self.base
    }

    /// Follow the top-menu Apparel & Shoes link in the current tab
    pub fn open_apparel_shoes(&self) -> ProbeResult<()> {
        let href = self.base.actions().attribute("category", "apparel_shoes_link", "href")?;
        info!(target: "storeprobe::pages", %href, "open Apparel & Shoes");
        self.base.follow_href(&href)
    }

    /// Grid present and every item-box holds a product item with picture and
    /// details
    pub fn verify_products_displayed(&self) -> Check {
        let actions = self.base.actions();
        let result = actions.find("category", "product_grid").and_then(|_| {
            let boxes = or_default(actions.find_all("category", "item_boxes"))?;
            check_grid(&actions, &boxes)
        });
        Check::from(result)
    }

    /// Pager block visible
    pub fn verify_pager_present(&self) -> Check {
        check_visible(self.base.actions().is_displayed("category", "pager"), "Pager (div.pager)")
    }

    /// Next link visible
    pub fn verify_next_visible(&self) -> Check {
        check_visible(
            self.base.actions().is_displayed("category", "next_page_link"),
            "Next page link",
        )
    }

    /// Previous link visible
    pub fn verify_previous_visible(&self) -> Check {
        check_visible(
            self.base.actions().is_displayed("category", "previous_page_link"),
            "Previous page link",
        )
    }

    /// Pager highlights `expected` as the current page
    pub fn verify_current_page_number(&self, expected: u32) -> Check {
        let result = self
            .base
            .actions()
            .find("category", "current_page")
            .and_then(|span| span.text())
            .map(|text| check_current_page(&text, expected));
        Check::from(result)
    }

    /// Load the Next link's target
    pub fn go_to_next_page(&self) -> ProbeResult<()> {
        self.base.follow_link("category", "next_page_link")
    }

    /// Load the Previous link's target
    pub fn go_to_previous_page(&self) -> ProbeResult<()> {
        self.base.follow_link("category", "previous_page_link")
    }

    /// Load the "1" pager link's target
    pub fn go_to_page_1(&self) -> ProbeResult<()> {
        self.base.follow_link("category", "page_1_link")
    }

    /// Load the "2" pager link's target
    pub fn go_to_page_2(&self) -> ProbeResult<()> {
        self.base.follow_link("category", "page_2_link")
    }

    /// Product names in grid order
    pub fn product_names(&self) -> ProbeResult<Vec<String>> {
        self.texts("product_titles")
    }

    /// Price texts in grid order
    pub fn product_prices(&self) -> ProbeResult<Vec<String>> {
        self.texts("product_prices")
    }

    fn texts(&self, key: &str) -> ProbeResult<Vec<String>> {
        self.base
            .actions()
            .find_all("category", key)?
            .iter()
            .map(|element| Ok(element.text()?.trim().to_string()))
            .collect()
    }

    /// Choose a sort order.
    ///
    /// The drop-down's option values are listing URLs; the one for `option`
    /// is the current URL without its query plus `?orderby=N`.
    pub fn select_sort_by(&self, option: SortOption) -> ProbeResult<()> {
        let current = self.base.current_url()?;
        let bare = current.split(['?', '#']).next().unwrap_or(&current);
        let value = format!("{bare}?{}", option.query());
        info!(target: "storeprobe::pages", sort = %option, %value, "select sort");
        self.base.actions().select_by_value("category", "sort_select", &value)
    }

    /// Products on the current page follow `option`
    pub fn verify_sorted(&self, option: SortOption) -> Check {
        match option {
            SortOption::NameAsc => self.verify_names(SortOrder::Ascending),
            SortOption::NameDesc => self.verify_names(SortOrder::Descending),
            SortOption::PriceAsc => self.verify_prices(SortOrder::Ascending),
            SortOption::PriceDesc => self.verify_prices(SortOrder::Descending),
            SortOption::Position | SortOption::CreatedOn => self.verify_sort_applied(option),
        }
    }

    fn verify_names(&self, order: SortOrder) -> Check {
        Check::from(self.product_names().map(|names| check_sorted_names(&names, order)))
    }

    fn verify_prices(&self, order: SortOrder) -> Check {
        Check::from(self.product_prices().map(|prices| check_sorted_prices(&prices, order)))
    }

    /// The URL carries the option's `orderby` and products are shown.
    ///
    /// Used for orders whose sort key is not rendered.
    pub fn verify_sort_applied(&self, option: SortOption) -> Check {
        let query = option.query();
        match self.base.current_url() {
            Ok(url) if url.contains(&query) => self.verify_products_displayed(),
            Ok(url) => Check::Fail(format!("Expected {query} in URL, got: {url}")),
            Err(err) => Check::from_error(&err),
        }
    }

    /// "Created on" sort is in effect
    pub fn verify_sort_created_on_applied(&self) -> Check {
        self.verify_sort_applied(SortOption::CreatedOn)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::ShopProduct;
    use crate::pages::testing;
    use crate::pages::HomePage;

    mod sort_option_tests {
        use super::*;

        #[test]
        fn test_codes() {
            let codes: Vec<u32> = SortOption::ALL.iter().map(|o| o.code()).collect();
            assert_eq!(codes, vec![0, 5, 6, 10, 11, 15]);
        }

        #[test]
        fn test_parse_label_slug_and_code() {
            assert_eq!("Name: A to Z".parse::<SortOption>().unwrap(), SortOption::NameAsc);
            assert_eq!("price-desc".parse::<SortOption>().unwrap(), SortOption::PriceDesc);
            assert_eq!("15".parse::<SortOption>().unwrap(), SortOption::CreatedOn);
            assert!("cheapest".parse::<SortOption>().unwrap_err().is_config_error());
        }

        #[test]
        fn test_display_is_label() {
            assert_eq!(SortOption::PriceAsc.to_string(), "Price: Low to High");
        }
    }

    mod listing_tests {
        use super::*;

        #[test]
        fn test_open_and_verify_grid() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let shop = testing::shop(&context);
            let session = testing::session(&context, &shop);
            let page = CategoryPage::new(&session);
            page.open_apparel_shoes().unwrap();
            assert_eq!(page.base().current_url().unwrap(), "http://shop.test/apparel-shoes");
            assert_eq!(page.verify_products_displayed(), Check::Pass);
            assert_eq!(page.verify_pager_present(), Check::Pass);
            assert_eq!(page.verify_next_visible(), Check::Pass);
            assert_eq!(page.verify_current_page_number(1), Check::Pass);
            assert_eq!(page.product_names().unwrap().len(), 8);
        }

        #[test]
        fn test_pager_navigation() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let shop = testing::shop(&context);
            let session = testing::session(&context, &shop);
            let page = CategoryPage::new(&session);
            page.open_apparel_shoes().unwrap();
            page.go_to_next_page().unwrap();
            assert_eq!(page.verify_current_page_number(2), Check::Pass);
            assert_eq!(page.verify_previous_visible(), Check::Pass);
            assert_eq!(page.product_names().unwrap().len(), 3);
            page.go_to_page_1().unwrap();
            assert_eq!(page.verify_current_page_number(1), Check::Pass);
            page.go_to_page_2().unwrap();
            page.go_to_previous_page().unwrap();
            assert_eq!(page.verify_current_page_number(1), Check::Pass);
        }

        #[test]
        fn test_wrong_page_number_fails() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let shop = testing::shop(&context);
            let session = testing::session(&context, &shop);
            let page = CategoryPage::new(&session);
            page.open_apparel_shoes().unwrap();
            let check = page.verify_current_page_number(2);
            assert_eq!(check.message(), Some("Expected current page 2, got: \"1\""));
        }

        #[test]
        fn test_single_page_has_no_pager() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let shop = testing::shop(&context).with_page_size(20);
            let session = testing::session(&context, &shop);
            let page = CategoryPage::new(&session);
            page.open_apparel_shoes().unwrap();
            assert!(!page.verify_next_visible().is_pass());
            assert!(page.go_to_next_page().is_err());
        }

        #[test]
        fn test_empty_listing_reports_no_boxes() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let shop = testing::shop(&context).with_apparel(Vec::new());
            let session = testing::session(&context, &shop);
            let page = CategoryPage::new(&session);
            page.open_apparel_shoes().unwrap();
            assert_eq!(
                page.verify_products_displayed().message(),
                Some("No product item-boxes found in product-grid.")
            );
        }

        #[test]
        fn test_verification_off_the_category_page_fails_without_error() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let shop = testing::shop(&context);
            let session = testing::session(&context, &shop);
            let page = CategoryPage::new(&session);
            assert!(HomePage::new(&session).is_search_visible().unwrap());
            assert!(!page.verify_products_displayed().is_pass());
            assert!(!page.verify_pager_present().is_pass());
        }
    }

    mod sort_tests {
        use super::*;

        #[test]
        fn test_each_sort_order_verifies_on_both_pages() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let shop = testing::shop(&context);
            for option in SortOption::ALL {
                let session = testing::session(&context, &shop);
                let page = CategoryPage::new(&session);
                page.open_apparel_shoes().unwrap();
                page.select_sort_by(option).unwrap();
                assert!(page.base().current_url().unwrap().contains(&option.query()));
                assert_eq!(page.verify_sorted(option), Check::Pass, "{option} page 1");
                page.go_to_next_page().unwrap();
                assert_eq!(page.verify_sorted(option), Check::Pass, "{option} page 2");
            }
        }

        #[test]
        fn test_unsorted_listing_is_reported() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let shop = testing::shop(&context).ignoring_sort();
            let session = testing::session(&context, &shop);
            let page = CategoryPage::new(&session);
            page.open_apparel_shoes().unwrap();
            page.select_sort_by(SortOption::NameAsc).unwrap();
            let check = page.verify_sorted(SortOption::NameAsc);
            assert!(check.message().unwrap().starts_with("Names not sorted ascending"));
        }

        #[test]
        fn test_unparseable_price_is_reported() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let shop = testing::shop(&context).with_apparel(vec![
                ShopProduct::new("Hat", "5.00"),
                ShopProduct::new("Scarf", "call us"),
            ]);
            let session = testing::session(&context, &shop);
            let page = CategoryPage::new(&session);
            page.open_apparel_shoes().unwrap();
            let check = page.verify_sorted(SortOption::PriceAsc);
            assert!(check.message().unwrap().starts_with("Price[1] is not a number"));
        }

        #[test]
        fn test_created_on_requires_query() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let shop = testing::shop(&context);
            let session = testing::session(&context, &shop);
            let page = CategoryPage::new(&session);
            page.open_apparel_shoes().unwrap();
            let check = page.verify_sort_created_on_applied();
            assert!(check.message().unwrap().contains("orderby=15"));
            page.select_sort_by(SortOption::CreatedOn).unwrap();
            assert_eq!(page.verify_sort_created_on_applied(), Check::Pass);
        }

        #[test]
        fn test_sort_on_second_page_drops_page_number() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let shop = testing::shop(&context);
            let session = testing::session(&context, &shop);
            let page = CategoryPage::new(&session);
            page.open_apparel_shoes().unwrap();
            page.go_to_next_page().unwrap();
            page.select_sort_by(SortOption::PriceDesc).unwrap();
            assert_eq!(page.base().current_url().unwrap(), shop.category_url(Some(SortOption::PriceDesc), 1));
        }
    }
}
