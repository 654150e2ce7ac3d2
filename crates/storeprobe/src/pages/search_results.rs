//! Search results grid.

use super::{check_grid, child_texts, or_default, BasePage};
use crate::artifacts::write_product_names;
use crate::driver::{Driver, Element};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use crate::verification::{contains_keyword, is_valid_name, is_valid_price, Check};
use std::path::PathBuf;
use tracing::info;

/// Results of a header search
#[derive(Debug, Clone, Copy)]
pub struct SearchResultsPage<'a, D: Driver> {
    base: BasePage<'a, D>,
}

impl<'a, D: Driver> SearchResultsPage<'a, D> {
    /// Results page over a session
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

    /// Result item-boxes
    pub fn result_products(&self) -> ProbeResult<Vec<D::Element>> {
        self.base.actions().find_all("search_results", "result_products")
    }

    /// Number of results, 0 when none appear in time
    pub fn result_count(&self) -> ProbeResult<usize> {
        Ok(or_default(self.result_products())?.len())
    }

    /// Title link of the result at `index`
    pub fn product_title_link(&self, index: usize) -> ProbeResult<D::Element> {
        let mut links = or_default(self.base.actions().find_all("search_results", "product_title_link"))?;
        if index >= links.len() {
            return Err(ProbeError::element_not_found(format!(
                "No product title link at index {index}"
            )));
        }
        Ok(links.swap_remove(index))
    }

    /// Click the title link of the result at `index`
    pub fn click_product_at_index(&self, index: usize) -> ProbeResult<()> {
        self.product_title_link(index)?.click()
    }

    /// Load the first result's details page through its `href`
    pub fn open_first_product_in_current_tab(&self) -> ProbeResult<()> {
        let href = self.product_title_link(0)?.attribute("href")?.unwrap_or_default();
        info!(target: "storeprobe::pages", %href, "open first result");
        self.base.follow_href(&href)
    }

    /// Trimmed product names in result order
    pub fn product_names(&self) -> ProbeResult<Vec<String>> {
        let boxes = or_default(self.result_products())?;
        child_texts(&self.base.actions(), &boxes, "product_box", "title")
    }

    /// Grid present and every box holds a product item with picture and details
    pub fn verify_grid_structure(&self) -> Check {
        let actions = self.base.actions();
        let result = actions.find("search_results", "product_grid").and_then(|_| {
            let boxes = or_default(self.result_products())?;
            check_grid(&actions, &boxes)
        });
        Check::from(result)
    }

    /// Grid is well formed and every title contains `keyword`, ignoring case
    pub fn verify_products_contain(&self, keyword: &str) -> Check {
        self.verify_grid_structure().and_then(|| {
            Check::from(self.product_names().map(|names| {
                match names.iter().enumerate().find(|(_, name)| !contains_keyword(name, keyword)) {
                    Some((index, name)) => Check::Fail(format!(
                        "Product[{index}] {name:?} does not contain keyword {keyword:?}"
                    )),
                    None => Check::Pass,
                }
            }))
        })
    }

    /// Every result has a name with a letter and a numeric price
    pub fn verify_each_result_has_valid_name_and_price(&self) -> Check {
        Check::from(self.check_names_and_prices())
    }

    fn check_names_and_prices(&self) -> ProbeResult<Check> {
        let boxes = or_default(self.result_products())?;
        if boxes.is_empty() {
            return Ok(Check::fail("No search results to validate."));
        }
        let actions = self.base.actions();
        let names = child_texts(&actions, &boxes, "product_box", "title")?;
        let prices = child_texts(&actions, &boxes, "product_box", "price")?;
        for (index, (name, price)) in names.iter().zip(&prices).enumerate() {
            if !is_valid_name(name) {
                return Ok(Check::Fail(format!("Result[{index}]: invalid product name {name:?}")));
            }
            if !is_valid_price(price) {
                return Ok(Check::Fail(format!(
                    "Result[{index}] {name:?}: invalid price {price:?}"
                )));
            }
        }
        Ok(Check::Pass)
    }

    /// First result shows a visible Add-to-cart button
    pub fn verify_first_item_has_add_to_cart(&self) -> Check {
        Check::from(self.check_first_add_to_cart())
    }

    fn check_first_add_to_cart(&self) -> ProbeResult<Check> {
        let boxes = or_default(self.result_products())?;
        let Some(first) = boxes.first() else {
            return Ok(Check::fail("No search results found."));
        };
        let button = first.find_child(self.base.actions().locator("product_box", "add_to_cart")?)?;
        Ok(Check::expect(button.is_displayed()?, || {
            "First result's Add to cart button is not visible.".to_string()
        }))
    }

    /// Write the result names to the run's product-name list, one per line
    pub fn write_product_names_list(&self) -> ProbeResult<PathBuf> {
        let path = self.base.session().settings().product_names_path();
        let names = self.product_names()?;
        write_product_names(&path, &names)?;
        Ok(path)
    }
}
