//! storeprobe: page-object UI test suite for the Demo Web Shop.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  suite (scenarios, runner)  ──►  RunReport                        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  pages (HomePage, SearchResultsPage, RegisterPage, LoginPage,     │
//! │         CategoryPage, ProductDetailsPage)                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  actions (click, type, text, waits)   verification (Check)        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  LocatorRegistry (section.key ─► strategy + query)                │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  Driver / Element traits                                          │
//! │     ├── ChromiumDriver (feature "browser", CDP)                   │
//! │     └── FakeDriver (in-memory DOM, DemoShop model)                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Page objects never name a CSS selector or XPath: every element is looked
//! up by `section.key` in the [`LocatorRegistry`].

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod actions;
mod artifacts;
mod browser;
mod config;
mod data;
mod driver;
mod locator;
mod reporter;
mod result;
mod session;
mod verification;
mod wait;

/// In-memory driver and Demo Web Shop model for tests
///
/// Usable outside the crate to exercise custom scenarios without a browser.
pub mod mock;

/// Page objects
pub mod pages;

/// Scenario catalogue and runner
pub mod suite;

pub use actions::Actions;
pub use artifacts::{write_product_names, BugLog, BugReport, CredentialStore, RegisteredUser};
pub use browser::LaunchOptions;
#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumElement};
pub use config::{Settings, DEFAULT_BASE_URL, ENV_BASE_URL, ENV_HEADLESS, ENV_OUTPUT_DIR};
pub use data::{FixtureData, RegisterData, StaticData, ValidRegistration};
pub use driver::{Driver, Element};
pub use locator::{LocatorEntry, LocatorRegistry, Strategy};
pub use reporter::{RunReport, ScenarioResult, TestStatus};
pub use result::{ProbeError, ProbeResult};
pub use session::{Session, SuiteContext};
pub use verification::{
    check_current_page, check_sorted_names, check_sorted_prices, contains_keyword, is_valid_name,
    is_valid_price, Check, SortOrder, CONFIG_FAULT_PREFIX, SORT_REPORT_PREFIX,
};
pub use wait::{
    poll_until, Timeouts, WaitCondition, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT, DEFAULT_WAIT_MS,
    PAGE_LOAD_TIMEOUT_MS, SHORT_WAIT, SHORT_WAIT_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::pages::{
        CategoryPage, HomePage, LoginPage, PageObject, ProductDetailsPage, RegisterPage,
        SearchResultsPage, SortOption,
    };
    pub use super::suite::{catalogue, DriverFactory, Runner, Scenario, Selection};
    pub use super::{
        Check, Driver, Element, LocatorRegistry, ProbeError, ProbeResult, RunReport, Session,
        Settings, SuiteContext, TestStatus,
    };
}
