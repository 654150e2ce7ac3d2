//! Product details page.

use super::BasePage;
use crate::driver::Driver;
use crate::result::ProbeResult;
use crate::session::Session;
use crate::verification::{is_valid_price, Check};

/// A single product's page
#[derive(Debug, Clone, Copy)]
pub struct ProductDetailsPage<'a, D: Driver> {
    base: BasePage<'a, D>,
}

impl<'a, D: Driver> ProductDetailsPage<'a, D> {
    /// Details page over a session
    #[must_use]
    pub const fn new(session: &'a Session<D>) -> Self {
        Self {
            base: BasePage::new(session),
        }
    }

    /// Heading text
    pub fn product_title(&self) -> ProbeResult<String> {
        self.base.actions().text("product_details", "product_title")
    }

    /// Price text
    pub fn product_price(&self) -> ProbeResult<String> {
        self.base.actions().text("product_details", "product_price")
    }

    /// Add-to-cart button shown
    pub fn is_add_to_cart_visible(&self) -> ProbeResult<bool> {
        self.base.actions().is_displayed("product_details", "add_to_cart_button")
    }

    /// Press Add to cart
    pub fn click_add_to_cart(&self) -> ProbeResult<()> {
        self.base.actions().click("product_details", "add_to_cart_button")
    }

    /// Heading is present and not blank
    pub fn verify_title_not_empty(&self) -> Check {
        match self.product_title() {
            Ok(title) if !title.is_empty() => Check::Pass,
            Ok(_) => Check::fail("Product title is empty."),
            Err(err) => Check::from_error(&err),
        }
    }

    /// Price is present and numeric
    pub fn verify_price_valid(&self) -> Check {
        match self.product_price() {
            Ok(price) => Check::expect(is_valid_price(&price), || {
                format!("Product price is not a valid number: {price:?}")
            }),
            Err(err) => Check::from_error(&err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::ShopProduct;
    use crate::pages::testing;

    #[test]
    fn test_details_of_a_product() {
        let dir = tempfile::tempdir().unwrap();
        let context = testing::context(dir.path());
        let shop = testing::shop(&context);
        let session = testing::session(&context, &shop);
        let page = ProductDetailsPage::new(&session);
        page.base.open("simple-computer", "product").unwrap();
        assert_eq!(page.product_title().unwrap(), "Simple Computer");
        assert_eq!(page.product_price().unwrap(), "800.00");
        assert_eq!(page.verify_title_not_empty(), Check::Pass);
        assert_eq!(page.verify_price_valid(), Check::Pass);
        assert!(page.is_add_to_cart_visible().unwrap());
        page.click_add_to_cart().unwrap();
    }

    #[test]
    fn test_price_on_request_fails() {
        let dir = tempfile::tempdir().unwrap();
        let context = testing::context(dir.path());
        let shop = testing::shop(&context).with_catalog(vec![ShopProduct::new("Mainframe", "on request")]);
        let session = testing::session(&context, &shop);
        let page = ProductDetailsPage::new(&session);
        page.base.open("mainframe", "product").unwrap();
        assert_eq!(
            page.verify_price_valid().message(),
            Some("Product price is not a valid number: \"on request\"")
        );
    }

    #[test]
    fn test_wrong_page_fails_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let context = testing::context(dir.path());
        let shop = testing::shop(&context);
        let session = testing::session(&context, &shop);
        let page = ProductDetailsPage::new(&session);
        assert!(!page.verify_title_not_empty().is_pass());
        assert!(!page.is_add_to_cart_visible().unwrap());
    }
}
