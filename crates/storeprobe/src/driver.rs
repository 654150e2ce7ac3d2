//! Driver capability traits.
//!
//! The action layer depends only on these two traits, never on a concrete
//! browser client:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Driver + Element (capability traits)                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────────────────┐     ┌──────────────────────────┐ │
//! │  │  ChromiumDriver        │     │  FakeDriver              │ │
//! │  │  (feature "browser")   │     │  (in-memory DOM, tests)  │ │
//! │  │  CDP via chromiumoxide │     │                          │ │
//! │  └────────────────────────┘     └──────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sessions are single-threaded: implementations are driven through `&self`
//! from one thread and are not required to be `Send` or `Sync`.

use crate::locator::LocatorEntry;
use crate::result::ProbeResult;
use crate::wait::WaitCondition;
use std::time::Duration;

/// Handle to one element of the current page.
///
/// Handles are live: every call reads the element's state at call time, not a
/// snapshot taken when the handle was found. A handle whose element has left
/// the document reports [`crate::ProbeError::StaleElement`].
pub trait Element: Sized {
    /// Click the element
    fn click(&self) -> ProbeResult<()>;

    /// Clear an input's current value
    fn clear(&self) -> ProbeResult<()>;

    /// Append text to an input's value
    fn send_keys(&self, text: &str) -> ProbeResult<()>;

    /// Rendered text content (untrimmed)
    fn text(&self) -> ProbeResult<String>;

    /// Attribute value, `None` when the attribute is absent
    fn attribute(&self, name: &str) -> ProbeResult<Option<String>>;

    /// Whether the element is rendered visibly
    fn is_displayed(&self) -> ProbeResult<bool>;

    /// Whether the element accepts interaction
    fn is_enabled(&self) -> ProbeResult<bool>;

    /// First descendant matching `entry`, without waiting
    fn find_child(&self, entry: &LocatorEntry) -> ProbeResult<Self>;

    /// All descendants matching `entry`, without waiting
    fn find_children(&self, entry: &LocatorEntry) -> ProbeResult<Vec<Self>>;

    /// Choose the `<option>` with the given `value` in a `<select>`
    fn select_by_value(&self, value: &str) -> ProbeResult<()>;
}

/// Browser session capability surface
pub trait Driver {
    /// Element handle type produced by this driver
    type Element: Element;

    /// Load `url` in the current tab
    fn navigate(&self, url: &str) -> ProbeResult<()>;

    /// First element matching `entry` once it satisfies `condition`,
    /// waiting at most `timeout`
    fn find_element(
        &self,
        entry: &LocatorEntry,
        condition: WaitCondition,
        timeout: Duration,
    ) -> ProbeResult<Self::Element>;

    /// All elements matching `entry` once at least one is present,
    /// waiting at most `timeout`
    fn find_elements(
        &self,
        entry: &LocatorEntry,
        timeout: Duration,
    ) -> ProbeResult<Vec<Self::Element>>;

    /// URL of the current page
    fn current_url(&self) -> ProbeResult<String>;
}
