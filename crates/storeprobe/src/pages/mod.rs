//! Page objects for the Demo Web Shop.
//!
//! Each page wraps a borrowed [`Session`] and exposes two kinds of methods:
//! imperative steps (`open`, `fill_email`, `go_to_next_page`) that return
//! `ProbeResult`, and verifications that return [`Check`] and never fail
//! with `Err`.

mod category;
mod home;
mod login;
mod product_details;
mod register;
mod search_results;

pub use category::{CategoryPage, SortOption};
pub use home::HomePage;
pub use login::LoginPage;
pub use product_details::ProductDetailsPage;
pub use register::{unique_email, Field, Gender, RegisterPage, RegistrationForm};
pub use search_results::SearchResultsPage;

use crate::actions::Actions;
use crate::driver::{Driver, Element};
use crate::result::ProbeResult;
use crate::session::Session;
use crate::verification::Check;
use tracing::info;

/// A page of the shop reachable at a fixed path
pub trait PageObject<'a, D: Driver + 'a> {
    /// Shared page plumbing
    fn base(&self) -> &BasePage<'a, D>;

    /// Path relative to the shop root (`""` for the home page)
    fn path(&self) -> &'static str;

    /// Name used in logs
    fn page_name(&self) -> &'static str;

    /// Navigate to this page
    fn open(&self) -> ProbeResult<()> {
        self.base().open(self.path(), self.page_name())
    }

    /// URL of the current page
    fn current_url(&self) -> ProbeResult<String> {
        self.base().current_url()
    }
}

/// Plumbing shared by every page object
#[derive(Debug)]
pub struct BasePage<'a, D: Driver> {
    session: &'a Session<D>,
}

impl<D: Driver> Clone for BasePage<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Driver> Copy for BasePage<'_, D> {}

impl<'a, D: Driver> BasePage<'a, D> {
    /// Page plumbing over a session
    #[must_use]
    pub const fn new(session: &'a Session<D>) -> Self {
        Self { session }
    }

    /// Session the page drives
    #[must_use]
    pub const fn session(&self) -> &'a Session<D> {
        self.session
    }

    /// Action layer
    #[must_use]
    pub fn actions(&self) -> Actions<'a, D> {
        self.session.actions()
    }

    /// Navigate to `path` below the shop root
    pub fn open(&self, path: &str, page_name: &str) -> ProbeResult<()> {
        let url = self.session.settings().url_for(path);
        info!(target: "storeprobe::pages", page = page_name, %url, "open");
        self.session.driver().navigate(&url)
    }

    /// Follow a link by loading its `href` in the current tab
    pub fn follow_href(&self, href: &str) -> ProbeResult<()> {
        let url = self.session.settings().resolve_href(href)?;
        self.session.driver().navigate(&url)
    }

    /// Read the `href` of `section.key` and load it in the current tab
    pub fn follow_link(&self, section: &str, key: &str) -> ProbeResult<()> {
        let link = self.actions().find(section, key)?;
        let href = link.attribute("href")?.unwrap_or_default();
        self.follow_href(&href)
    }

    /// URL of the current page
    pub fn current_url(&self) -> ProbeResult<String> {
        self.session.driver().current_url()
    }

    /// Visible text of the whole page
    pub fn body_text(&self) -> ProbeResult<String> {
        self.actions().text("common", "page_body")
    }
}

/// Treat driver failures as "no value"; configuration errors still propagate.
pub(crate) fn or_default<T: Default>(result: ProbeResult<T>) -> ProbeResult<T> {
    match result {
        Err(err) if !err.is_config_error() => {
            tracing::debug!(target: "storeprobe::pages", "treating as empty: {err}");
            Ok(T::default())
        }
        other => other,
    }
}

/// Check an element-visibility probe
pub(crate) fn check_visible(displayed: ProbeResult<bool>, what: &str) -> Check {
    match displayed {
        Ok(true) => Check::Pass,
        Ok(false) => Check::Fail(format!("{what} is not visible.")),
        Err(err) => Check::from_error(&err),
    }
}

/// Grid structure: every box holds an item with picture and details.
///
/// Reports only the first failing box.
pub(crate) fn check_grid<D: Driver>(actions: &Actions<'_, D>, boxes: &[D::Element]) -> ProbeResult<Check> {
    if boxes.is_empty() {
        return Ok(Check::fail("No product item-boxes found in product-grid."));
    }
    let item = actions.locator("product_box", "item")?;
    let picture = actions.locator("product_box", "picture")?;
    let details = actions.locator("product_box", "details")?;
    for (index, item_box) in boxes.iter().enumerate() {
        let product = match item_box.find_child(item) {
            Ok(product) => product,
            Err(err) => return Ok(Check::Fail(format!("Item-box[{index}]: missing .product-item: {err}"))),
        };
        for (level, entry) in [("picture", picture), ("details", details)] {
            if let Err(err) = product.find_child(entry) {
                return Ok(Check::Fail(format!(
                    "Item-box[{index}]: .product-item missing {level}: {err}"
                )));
            }
        }
    }
    Ok(Check::Pass)
}

/// Trimmed text of a named child of every element
pub(crate) fn child_texts<D: Driver>(
    actions: &Actions<'_, D>,
    parents: &[D::Element],
    section: &str,
    key: &str,
) -> ProbeResult<Vec<String>> {
    let entry = actions.locator(section, key)?;
    parents
        .iter()
        .map(|parent| Ok(parent.find_child(entry)?.text()?.trim().to_string()))
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    //! Sessions over the fake shop for page and scenario tests.

    use crate::config::Settings;
    use crate::mock::{DemoShop, FakeDriver};
    use crate::session::{Session, SuiteContext};

    pub const BASE: &str = "http://shop.test/";

    #[allow(clippy::expect_used)]
    pub fn context(output: &std::path::Path) -> SuiteContext {
        let settings = Settings::default().with_base_url(BASE).with_output_dir(output);
        SuiteContext::from_settings(settings).expect("context")
    }

    #[allow(clippy::expect_used)]
    pub fn shop(context: &SuiteContext) -> DemoShop {
        DemoShop::new(BASE, context.registry()).expect("shop")
    }

    #[allow(clippy::expect_used)]
    pub fn session(context: &SuiteContext, shop: &DemoShop) -> Session<FakeDriver> {
        context.session(shop.driver().expect("driver"))
    }
}
