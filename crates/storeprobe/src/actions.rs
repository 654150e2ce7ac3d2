//! Action layer: one bounded-wait browser operation per call.
//!
//! Every element interaction in the suite goes through [`Actions`], the only
//! place a symbolic `(section, key)` name is turned into a `(strategy, value)`
//! query. Locator resolution failures always propagate; element waits
//! propagate their timeout except from [`Actions::is_displayed`], which
//! reports `false` instead.

use crate::driver::{Driver, Element};
use crate::locator::{LocatorEntry, LocatorRegistry};
use crate::result::ProbeResult;
use crate::wait::{Timeouts, WaitCondition};
use std::time::Duration;
use tracing::debug;

/// Locator-driven actions over a borrowed driver and registry
#[derive(Debug)]
pub struct Actions<'a, D: Driver> {
    driver: &'a D,
    registry: &'a LocatorRegistry,
    timeouts: Timeouts,
}

impl<D: Driver> Clone for Actions<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Driver> Copy for Actions<'_, D> {}

impl<'a, D: Driver> Actions<'a, D> {
    /// Create an action layer
    #[must_use]
    pub const fn new(driver: &'a D, registry: &'a LocatorRegistry, timeouts: Timeouts) -> Self {
        Self {
            driver,
            registry,
            timeouts,
        }
    }

    /// Wait bounds in use
    #[must_use]
    pub const fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Resolve a locator without touching the page.
    ///
    /// Page objects use this for child queries scoped to an element they
    /// already hold.
    pub fn locator(&self, section: &str, key: &str) -> ProbeResult<&'a LocatorEntry> {
        self.registry.resolve(section, key)
    }

    fn wait_for(
        &self,
        section: &str,
        key: &str,
        condition: WaitCondition,
        timeout: Duration,
    ) -> ProbeResult<D::Element> {
        let entry = self.locator(section, key)?;
        self.driver.find_element(entry, condition, timeout)
    }

    /// Click once the element is clickable
    pub fn click(&self, section: &str, key: &str) -> ProbeResult<()> {
        self.click_within(section, key, self.timeouts.default)
    }

    /// [`Actions::click`] with an explicit timeout
    pub fn click_within(&self, section: &str, key: &str, timeout: Duration) -> ProbeResult<()> {
        let element = self.wait_for(section, key, WaitCondition::Clickable, timeout)?;
        element.click()?;
        debug!(target: "storeprobe::actions", "clicked {section}.{key}");
        Ok(())
    }

    /// Type into a visible input, optionally clearing it first
    pub fn type_text(&self, section: &str, key: &str, text: &str, clear_first: bool) -> ProbeResult<()> {
        self.type_text_within(section, key, text, clear_first, self.timeouts.default)
    }

    /// [`Actions::type_text`] with an explicit timeout
    pub fn type_text_within(
        &self,
        section: &str,
        key: &str,
        text: &str,
        clear_first: bool,
        timeout: Duration,
    ) -> ProbeResult<()> {
        let element = self.wait_for(section, key, WaitCondition::Visible, timeout)?;
        if clear_first {
            element.clear()?;
        }
        element.send_keys(text)?;
        debug!(target: "storeprobe::actions", "typed {} chars into {section}.{key}", text.chars().count());
        Ok(())
    }

    /// Trimmed text of a visible element
    pub fn text(&self, section: &str, key: &str) -> ProbeResult<String> {
        self.text_within(section, key, self.timeouts.default)
    }

    /// [`Actions::text`] with an explicit timeout
    pub fn text_within(&self, section: &str, key: &str, timeout: Duration) -> ProbeResult<String> {
        let element = self.wait_for(section, key, WaitCondition::Visible, timeout)?;
        Ok(element.text()?.trim().to_string())
    }

    /// Attribute of a present element; empty when the attribute is absent
    pub fn attribute(&self, section: &str, key: &str, name: &str) -> ProbeResult<String> {
        self.attribute_within(section, key, name, self.timeouts.default)
    }

    /// [`Actions::attribute`] with an explicit timeout
    pub fn attribute_within(
        &self,
        section: &str,
        key: &str,
        name: &str,
        timeout: Duration,
    ) -> ProbeResult<String> {
        let element = self.wait_for(section, key, WaitCondition::Present, timeout)?;
        Ok(element.attribute(name)?.unwrap_or_default())
    }

    /// Whether the element becomes visible within the default wait.
    ///
    /// Timeouts and driver failures read as `false`; an unknown locator is
    /// still an error.
    pub fn is_displayed(&self, section: &str, key: &str) -> ProbeResult<bool> {
        self.is_displayed_within(section, key, self.timeouts.default)
    }

    /// Whether the element becomes visible within the short wait used for
    /// expected absence
    pub fn is_displayed_briefly(&self, section: &str, key: &str) -> ProbeResult<bool> {
        self.is_displayed_within(section, key, self.timeouts.short)
    }

    /// [`Actions::is_displayed`] with an explicit timeout
    pub fn is_displayed_within(&self, section: &str, key: &str, timeout: Duration) -> ProbeResult<bool> {
        let entry = self.locator(section, key)?;
        let displayed = match self.driver.find_element(entry, WaitCondition::Visible, timeout) {
            Ok(element) => element.is_displayed().unwrap_or(false),
            Err(err) => {
                debug!(target: "storeprobe::actions", "{section}.{key} not displayed: {err}");
                false
            }
        };
        Ok(displayed)
    }

    /// Wait until the element is visible and return it
    pub fn wait_visible(&self, section: &str, key: &str) -> ProbeResult<D::Element> {
        self.wait_visible_within(section, key, self.timeouts.default)
    }

    /// [`Actions::wait_visible`] with an explicit timeout
    pub fn wait_visible_within(
        &self,
        section: &str,
        key: &str,
        timeout: Duration,
    ) -> ProbeResult<D::Element> {
        self.wait_for(section, key, WaitCondition::Visible, timeout)
    }

    /// Wait until the element is attached and return it
    pub fn find(&self, section: &str, key: &str) -> ProbeResult<D::Element> {
        self.find_within(section, key, self.timeouts.default)
    }

    /// [`Actions::find`] with an explicit timeout
    pub fn find_within(&self, section: &str, key: &str, timeout: Duration) -> ProbeResult<D::Element> {
        self.wait_for(section, key, WaitCondition::Present, timeout)
    }

    /// Every matching element, once at least one is attached
    pub fn find_all(&self, section: &str, key: &str) -> ProbeResult<Vec<D::Element>> {
        self.find_all_within(section, key, self.timeouts.default)
    }

    /// [`Actions::find_all`] with an explicit timeout
    pub fn find_all_within(
        &self,
        section: &str,
        key: &str,
        timeout: Duration,
    ) -> ProbeResult<Vec<D::Element>> {
        let entry = self.locator(section, key)?;
        let elements = self.driver.find_elements(entry, timeout)?;
        debug!(target: "storeprobe::actions", "found {} x {section}.{key}", elements.len());
        Ok(elements)
    }

    /// Choose an option of a `<select>` by its `value`
    pub fn select_by_value(&self, section: &str, key: &str, value: &str) -> ProbeResult<()> {
        self.select_by_value_within(section, key, value, self.timeouts.default)
    }

    /// [`Actions::select_by_value`] with an explicit timeout
    pub fn select_by_value_within(
        &self,
        section: &str,
        key: &str,
        value: &str,
        timeout: Duration,
    ) -> ProbeResult<()> {
        let element = self.wait_for(section, key, WaitCondition::Present, timeout)?;
        element.select_by_value(value)?;
        debug!(target: "storeprobe::actions", "selected '{value}' in {section}.{key}");
        Ok(())
    }

    /// Load a URL in the current tab
    pub fn navigate(&self, url: &str) -> ProbeResult<()> {
        debug!(target: "storeprobe::actions", "navigate {url}");
        self.driver.navigate(url)
    }

    /// URL of the current page
    pub fn current_url(&self) -> ProbeResult<String> {
        self.driver.current_url()
    }
}
