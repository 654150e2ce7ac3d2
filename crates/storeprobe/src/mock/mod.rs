//! Fake driver over an in-memory DOM.
//!
//! [`FakeDriver`] implements the driver traits without a browser so that the
//! action layer, page objects and whole scenarios can be exercised in unit
//! tests. Waits are decided immediately: a condition that does not hold when
//! asked fails with the same [`ProbeError::Timeout`] a real backend would
//! produce once its timeout elapsed, without sleeping.
//!
//! State lives behind `Rc<RefCell<..>>`, so a fake session cannot cross
//! threads, mirroring the one-thread-per-session contract of real backends.
//!
//! ```
//! use storeprobe::mock::{FakeDriver, FakeNode, FakeSite};
//! use storeprobe::{Driver, LocatorEntry, WaitCondition};
//! use std::time::Duration;
//!
//! let site = FakeSite::new().page(
//!     "http://shop.test/",
//!     FakeNode::body().child(FakeNode::new(LocatorEntry::id("small-searchterms"))),
//! );
//! let driver = FakeDriver::new(site);
//! driver.navigate("http://shop.test/").unwrap();
//! let found = driver.find_element(
//!     &LocatorEntry::id("small-searchterms"),
//!     WaitCondition::Visible,
//!     Duration::from_secs(1),
//! );
//! assert!(found.is_ok());
//! ```

mod dom;
mod shop;

pub use dom::{ClickEffect, FakeNode, FakeSite, FormValues, Outcome};
pub use shop::{DemoShop, ShopProduct};

use crate::driver::{Driver, Element};
use crate::locator::LocatorEntry;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitCondition;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug)]
struct Loaded {
    url: String,
    root: FakeNode,
}

#[derive(Debug)]
struct BrowserState {
    site: FakeSite,
    page: Option<Loaded>,
    generation: u64,
    history: Vec<String>,
}

impl BrowserState {
    fn load(&mut self, url: &str) -> ProbeResult<()> {
        let root = self.site.lookup(url).cloned().ok_or_else(|| ProbeError::Navigation {
            url: url.to_string(),
            message: "no fake page registered for this URL".to_string(),
        })?;
        self.show(url.to_string(), root);
        Ok(())
    }

    fn show(&mut self, url: String, root: FakeNode) {
        self.generation += 1;
        self.history.push(url.clone());
        self.page = Some(Loaded { url, root });
    }

    fn root(&self) -> ProbeResult<&FakeNode> {
        self.page
            .as_ref()
            .map(|loaded| &loaded.root)
            .ok_or_else(|| ProbeError::driver("no page loaded"))
    }
}

fn timeout_error(condition: WaitCondition, entry: &LocatorEntry, timeout: Duration) -> ProbeError {
    ProbeError::Timeout {
        condition: condition.to_string(),
        locator: entry.to_string(),
        ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
    }
}

/// Driver over a [`FakeSite`]
#[derive(Debug, Clone)]
pub struct FakeDriver {
    state: Rc<RefCell<BrowserState>>,
}

impl FakeDriver {
    /// Driver with no page loaded yet
    #[must_use]
    pub fn new(site: FakeSite) -> Self {
        Self {
            state: Rc::new(RefCell::new(BrowserState {
                site,
                page: None,
                generation: 0,
                history: Vec::new(),
            })),
        }
    }

    /// Every URL shown so far, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state.borrow().history.clone()
    }

    /// Current value of a named field on the current page
    #[must_use]
    pub fn field_value(&self, field: &str) -> Option<String> {
        let state = self.state.borrow();
        let root = state.root().ok()?;
        let mut values = FormValues::default();
        root.collect_fields(&mut values);
        let value = values.get(field).to_string();
        Self::has_field(root, field).then_some(value)
    }

    fn has_field(node: &FakeNode, field: &str) -> bool {
        node.field.as_deref() == Some(field)
            || node.children.iter().any(|child| Self::has_field(child, field))
    }

    fn element(&self, path: Vec<usize>, entry: &LocatorEntry) -> FakeElement {
        FakeElement {
            state: Rc::clone(&self.state),
            generation: self.state.borrow().generation,
            path,
            locator: entry.to_string(),
        }
    }
}

impl Driver for FakeDriver {
    type Element = FakeElement;

    fn navigate(&self, url: &str) -> ProbeResult<()> {
        self.state.borrow_mut().load(url)
    }

    fn find_element(
        &self,
        entry: &LocatorEntry,
        condition: WaitCondition,
        timeout: Duration,
    ) -> ProbeResult<FakeElement> {
        let path = {
            let state = self.state.borrow();
            let root = state.root()?;
            let path = root
                .find_paths(entry, true)
                .into_iter()
                .next()
                .ok_or_else(|| timeout_error(condition, entry, timeout))?;
            let displayed = root.displayed_at(&path).unwrap_or(false);
            let enabled = root.node_at(&path).is_some_and(|node| node.enabled);
            if !condition.is_met(displayed, enabled) {
                return Err(timeout_error(condition, entry, timeout));
            }
            path
        };
        Ok(self.element(path, entry))
    }

    fn find_elements(&self, entry: &LocatorEntry, timeout: Duration) -> ProbeResult<Vec<FakeElement>> {
        let paths = self.state.borrow().root()?.find_paths(entry, true);
        if paths.is_empty() {
            return Err(timeout_error(WaitCondition::Present, entry, timeout));
        }
        Ok(paths.into_iter().map(|path| self.element(path, entry)).collect())
    }

    fn current_url(&self) -> ProbeResult<String> {
        Ok(self
            .state
            .borrow()
            .page
            .as_ref()
            .map_or_else(|| "about:blank".to_string(), |loaded| loaded.url.clone()))
    }
}

/// Live handle to a node of the page that was current when it was found
#[derive(Debug, Clone)]
pub struct FakeElement {
    state: Rc<RefCell<BrowserState>>,
    generation: u64,
    path: Vec<usize>,
    locator: String,
}

impl FakeElement {
    fn stale(&self) -> ProbeError {
        ProbeError::StaleElement {
            locator: self.locator.clone(),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&FakeNode, &FakeNode) -> R) -> ProbeResult<R> {
        let state = self.state.borrow();
        if state.generation != self.generation {
            return Err(self.stale());
        }
        let root = state.root()?;
        let node = root.node_at(&self.path).ok_or_else(|| self.stale())?;
        Ok(f(root, node))
    }

    fn write<R>(&self, f: impl FnOnce(&mut FakeNode) -> R) -> ProbeResult<R> {
        let mut state = self.state.borrow_mut();
        if state.generation != self.generation {
            return Err(self.stale());
        }
        let node = state
            .page
            .as_mut()
            .and_then(|loaded| loaded.root.node_at_mut(&self.path))
            .ok_or_else(|| self.stale())?;
        Ok(f(node))
    }

    fn child(&self, path: Vec<usize>, entry: &LocatorEntry) -> Self {
        Self {
            state: Rc::clone(&self.state),
            generation: self.generation,
            path,
            locator: format!("{} > {entry}", self.locator),
        }
    }

    fn descendant_paths(&self, entry: &LocatorEntry) -> ProbeResult<Vec<Vec<usize>>> {
        self.read(|_, node| {
            node.find_paths(entry, false)
                .into_iter()
                .map(|relative| self.path.iter().copied().chain(relative).collect())
                .collect()
        })
    }
}

impl Element for FakeElement {
    fn click(&self) -> ProbeResult<()> {
        let (effect, form) = self.read(|root, node| {
            let displayed = root.displayed_at(&self.path).unwrap_or(false);
            let mut form = FormValues::default();
            root.collect_fields(&mut form);
            (displayed && node.enabled, node.on_click.clone(), form)
        })
        .and_then(|(interactable, effect, form)| {
            if interactable {
                Ok((effect, form))
            } else {
                Err(ProbeError::driver(format!("{} is not interactable", self.locator)))
            }
        })?;
        let mut state = self.state.borrow_mut();
        match effect {
            None => Ok(()),
            Some(ClickEffect::Navigate(url)) => state.load(&url),
            Some(ClickEffect::Submit(handler)) => match handler(&form) {
                Outcome::Navigate(url) => state.load(&url),
                Outcome::Render { url, page } => {
                    state.show(url, page);
                    Ok(())
                }
            },
        }
    }

    fn clear(&self) -> ProbeResult<()> {
        self.write(|node| node.value.clear())
    }

    fn send_keys(&self, text: &str) -> ProbeResult<()> {
        self.write(|node| node.value.push_str(text))
    }

    fn text(&self) -> ProbeResult<String> {
        self.read(|_, node| node.rendered_text())
    }

    fn attribute(&self, name: &str) -> ProbeResult<Option<String>> {
        self.read(|_, node| {
            if name == "value" && (node.field.is_some() || !node.options.is_empty()) {
                Some(node.value.clone())
            } else {
                node.attributes.get(name).cloned()
            }
        })
    }

    fn is_displayed(&self) -> ProbeResult<bool> {
        self.read(|root, _| root.displayed_at(&self.path).unwrap_or(false))
    }

    fn is_enabled(&self) -> ProbeResult<bool> {
        self.read(|_, node| node.enabled)
    }

    fn find_child(&self, entry: &LocatorEntry) -> ProbeResult<Self> {
        let path = self
            .descendant_paths(entry)?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::element_not_found(format!("no {entry} inside {}", self.locator)))?;
        Ok(self.child(path, entry))
    }

    fn find_children(&self, entry: &LocatorEntry) -> ProbeResult<Vec<Self>> {
        Ok(self
            .descendant_paths(entry)?
            .into_iter()
            .map(|path| self.child(path, entry))
            .collect())
    }

    fn select_by_value(&self, value: &str) -> ProbeResult<()> {
        let navigate = self.write(|node| {
            if node.options.iter().any(|option| option == value) {
                node.value = value.to_string();
                Ok(node.navigate_on_change)
            } else {
                Err(ProbeError::element_not_found(format!(
                    "no option with value '{value}' in {}",
                    self.locator
                )))
            }
        })??;
        if navigate {
            self.state.borrow_mut().load(value)?;
        }
        Ok(())
    }
}
