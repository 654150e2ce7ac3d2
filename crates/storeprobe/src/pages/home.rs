//! Home page and its header search box.

use super::{BasePage, PageObject};
use crate::driver::Driver;
use crate::result::ProbeResult;
use crate::session::Session;
use tracing::info;

/// Shop home page
#[derive(Debug, Clone, Copy)]
pub struct HomePage<'a, D: Driver> {
    base: BasePage<'a, D>,
}

impl<'a, D: Driver> HomePage<'a, D> {
    /// Home page over a session
    #[must_use]
    pub const fn new(session: &'a Session<D>) -> Self {
        Self {
            base: BasePage::new(session),
        }
    }

    /// Search field is shown
    pub fn is_search_visible(&self) -> ProbeResult<bool> {
        self.base.actions().is_displayed("home", "search_input")
    }

    /// Focus the search field
    pub fn click_search_input(&self) -> ProbeResult<()> {
        self.base.actions().click("home", "search_input")
    }

    /// Type into the search field, replacing its content
    pub fn type_search(&self, text: &str) -> ProbeResult<()> {
        self.base.actions().type_text("home", "search_input", text, true)
    }

    /// Press the search button
    pub fn click_search_submit(&self) -> ProbeResult<()> {
        self.base.actions().click("home", "search_submit")
    }

    /// Focus, type `keyword` and submit
    pub fn search_with_keyword(&self, keyword: &str) -> ProbeResult<()> {
        info!(target: "storeprobe::pages", keyword, "search");
        self.click_search_input()?;
        self.type_search(keyword)?;
        self.click_search_submit()
    }

    /// Search for the static `Products.Build` keyword.
    ///
    /// Returns the keyword used.
    pub fn search_build(&self) -> ProbeResult<String> {
        let keyword = self.base.session().data().statics.value("Products", "Build")?.to_string();
        self.search_with_keyword(&keyword)?;
        Ok(keyword)
    }

    /// Type a term without submitting
    pub fn search(&self, term: &str) -> ProbeResult<()> {
        self.type_search(term)
    }
}

impl<'a, D: Driver + 'a> PageObject<'a, D> for HomePage<'a, D> {
    fn base(&self) -> &BasePage<'a, D> {
        &self.base
    }

    fn path(&self) -> &'static str {
        ""
    }

    fn page_name(&self) -> &'static str {
        "home"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pages::testing;

    #[test]
    fn test_search_box_visible() {
        let dir = tempfile::tempdir().unwrap();
        let context = testing::context(dir.path());
        let shop = testing::shop(&context);
        let session = testing::session(&context, &shop);
        assert!(HomePage::new(&session).is_search_visible().unwrap());
    }

    #[test]
    fn test_search_build_submits_static_keyword() {
        let dir = tempfile::tempdir().unwrap();
        let context = testing::context(dir.path());
        let shop = testing::shop(&context);
        let session = testing::session(&context, &shop);
        let home = HomePage::new(&session);
        assert_eq!(home.search_build().unwrap(), "Build");
        assert_eq!(home.current_url().unwrap(), "http://shop.test/search?q=Build");
    }

    #[test]
    fn test_search_types_without_submitting() {
        let dir = tempfile::tempdir().unwrap();
        let context = testing::context(dir.path());
        let shop = testing::shop(&context);
        let session = testing::session(&context, &shop);
        let home = HomePage::new(&session);
        home.search("laptop").unwrap();
        assert_eq!(session.driver().field_value("q").as_deref(), Some("laptop"));
        assert_eq!(home.current_url().unwrap(), testing::BASE);
    }

    #[test]
    fn test_open_returns_home() {
        let dir = tempfile::tempdir().unwrap();
        let context = testing::context(dir.path());
        let shop = testing::shop(&context);
        let session = testing::session(&context, &shop);
        let home = HomePage::new(&session);
        home.search_with_keyword("computer").unwrap();
        home.open().unwrap();
        assert_eq!(home.current_url().unwrap(), testing::BASE);
    }
}
