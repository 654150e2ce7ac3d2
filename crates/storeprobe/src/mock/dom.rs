//! In-memory document model for the fake driver.
//!
//! A [`FakeNode`] declares which locator queries match it instead of carrying
//! real markup: `FakeNode::new(LocatorEntry::css(".pager"))` is found by that
//! query and by nothing else. Pages are trees of nodes rooted at a `body`,
//! registered per URL in a [`FakeSite`].

use crate::locator::LocatorEntry;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Values of every named field on the page when a form is submitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<String, String>,
}

impl FormValues {
    /// Value of a field, empty when the field does not exist
    #[must_use]
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map_or("", String::as_str)
    }

    pub(crate) fn insert(&mut self, field: String, value: String) {
        self.values.insert(field, value);
    }
}

/// Page produced by a form submission
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Load a registered route
    Navigate(String),
    /// Show a generated page under the given URL
    Render {
        /// URL reported after the submission
        url: String,
        /// Page content
        page: FakeNode,
    },
}

type SubmitFn = Rc<dyn Fn(&FormValues) -> Outcome>;

/// What clicking a node does
#[derive(Clone)]
pub enum ClickEffect {
    /// Follow a link to a registered route
    Navigate(String),
    /// Submit the page's fields and show the resulting page
    Submit(SubmitFn),
}

impl ClickEffect {
    /// Follow a link
    #[must_use]
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::Navigate(url.into())
    }

    /// Submit the page's named fields to `handler`
    #[must_use]
    pub fn submit(handler: impl Fn(&FormValues) -> Outcome + 'static) -> Self {
        Self::Submit(Rc::new(handler))
    }
}

impl fmt::Debug for ClickEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate(url) => f.debug_tuple("Navigate").field(url).finish(),
            Self::Submit(_) => f.write_str("Submit(..)"),
        }
    }
}

/// One element of a fake page
#[derive(Debug, Clone)]
pub struct FakeNode {
    pub(crate) matches: Vec<LocatorEntry>,
    pub(crate) text: String,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) displayed: bool,
    pub(crate) enabled: bool,
    pub(crate) field: Option<String>,
    pub(crate) value: String,
    pub(crate) options: Vec<String>,
    pub(crate) navigate_on_change: bool,
    pub(crate) on_click: Option<ClickEffect>,
    pub(crate) children: Vec<FakeNode>,
}

impl FakeNode {
    /// Node found by `entry`
    #[must_use]
    pub fn new(entry: LocatorEntry) -> Self {
        Self {
            matches: vec![entry],
            text: String::new(),
            attributes: BTreeMap::new(),
            displayed: true,
            enabled: true,
            field: None,
            value: String::new(),
            options: Vec::new(),
            navigate_on_change: false,
            on_click: None,
            children: Vec::new(),
        }
    }

    /// Page root, found by the `body` tag query
    #[must_use]
    pub fn body() -> Self {
        Self::new(LocatorEntry::tag("body"))
    }

    /// Container matched by no query
    #[must_use]
    pub fn group() -> Self {
        let mut node = Self::body();
        node.matches.clear();
        node
    }

    /// Also found by `entry`
    #[must_use]
    pub fn also(mut self, entry: LocatorEntry) -> Self {
        self.matches.push(entry);
        self
    }

    /// Own text content
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Not rendered
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Rendered only when `shown`
    #[must_use]
    pub const fn shown(mut self, shown: bool) -> Self {
        self.displayed = shown;
        self
    }

    /// Rendered but not interactive
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Input whose value is submitted under `name`
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.field = Some(name.into());
        self
    }

    /// Initial input value
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// `<select>` option values
    #[must_use]
    pub fn options<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = values.into_iter().map(Into::into).collect();
        self
    }

    /// Selecting an option loads the option's value as a URL
    #[must_use]
    pub const fn navigates_on_change(mut self) -> Self {
        self.navigate_on_change = true;
        self
    }

    /// Click behaviour
    #[must_use]
    pub fn on_click(mut self, effect: ClickEffect) -> Self {
        self.on_click = Some(effect);
        self
    }

    /// Append a child
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    pub(crate) fn is_match(&self, entry: &LocatorEntry) -> bool {
        self.matches.contains(entry)
    }

    /// Rendered text: own text then displayed descendants, one per line
    pub(crate) fn rendered_text(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join("\n")
    }

    fn collect_text(&self, parts: &mut Vec<String>) {
        if !self.text.is_empty() {
            parts.push(self.text.clone());
        }
        for child in self.children.iter().filter(|c| c.displayed) {
            child.collect_text(parts);
        }
    }

    /// Pre-order paths of matching descendants (and self when `include_self`)
    pub(crate) fn find_paths(&self, entry: &LocatorEntry, include_self: bool) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        if include_self && self.is_match(entry) {
            out.push(Vec::new());
        }
        self.walk(entry, &mut path, &mut out);
        out
    }

    fn walk(&self, entry: &LocatorEntry, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        for (index, child) in self.children.iter().enumerate() {
            path.push(index);
            if child.is_match(entry) {
                out.push(path.clone());
            }
            child.walk(entry, path, out);
            path.pop();
        }
    }

    pub(crate) fn node_at(&self, path: &[usize]) -> Option<&Self> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub(crate) fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Self> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    /// Displayed along the whole path from the root
    pub(crate) fn displayed_at(&self, path: &[usize]) -> Option<bool> {
        let mut node = self;
        let mut displayed = node.displayed;
        for &index in path {
            node = node.children.get(index)?;
            displayed &= node.displayed;
        }
        Some(displayed)
    }

    pub(crate) fn collect_fields(&self, values: &mut FormValues) {
        if let Some(field) = &self.field {
            values.insert(field.clone(), self.value.clone());
        }
        for child in &self.children {
            child.collect_fields(values);
        }
    }
}

/// URL-addressed set of fake pages
#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    routes: BTreeMap<String, FakeNode>,
}

impl FakeSite {
    /// Empty site
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `root` at `url`
    #[must_use]
    pub fn page(mut self, url: impl Into<String>, root: FakeNode) -> Self {
        self.routes.insert(url.into(), root);
        self
    }

    /// Add a page in place
    pub fn insert(&mut self, url: impl Into<String>, root: FakeNode) {
        self.routes.insert(url.into(), root);
    }

    /// Page for `url`: exact match first, then without query and fragment
    #[must_use]
    pub fn lookup(&self, url: &str) -> Option<&FakeNode> {
        self.routes.get(url).or_else(|| {
            let bare = url.split(['?', '#']).next().unwrap_or(url);
            self.routes.get(bare)
        })
    }

    /// Registered URLs
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn tree() -> FakeNode {
        FakeNode::body()
            .child(
                FakeNode::new(LocatorEntry::css(".box"))
                    .text("first")
                    .child(FakeNode::new(LocatorEntry::css(".title")).text("A")),
            )
            .child(
                FakeNode::new(LocatorEntry::css(".box"))
                    .hidden()
                    .child(FakeNode::new(LocatorEntry::css(".title")).text("B")),
            )
    }

    #[test]
    fn test_find_paths_pre_order() {
        let root = tree();
        assert_eq!(
            root.find_paths(&LocatorEntry::css(".title"), false),
            vec![vec![0, 0], vec![1, 0]]
        );
        assert_eq!(root.find_paths(&LocatorEntry::tag("body"), true), vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_hidden_ancestor_hides_descendant() {
        let root = tree();
        assert_eq!(root.displayed_at(&[0, 0]), Some(true));
        assert_eq!(root.displayed_at(&[1, 0]), Some(false));
        assert_eq!(root.displayed_at(&[5]), None);
    }

    #[test]
    fn test_rendered_text_skips_hidden() {
        assert_eq!(tree().rendered_text(), "first\nA");
    }

    #[test]
    fn test_lookup_falls_back_to_bare_url() {
        let site = FakeSite::new().page("http://shop.test/search", FakeNode::body().text("results"));
        assert!(site.lookup("http://shop.test/search?q=computer").is_some());
        assert!(site.lookup("http://shop.test/other").is_none());
    }

    #[test]
    fn test_collect_fields() {
        let root = FakeNode::body()
            .child(FakeNode::new(LocatorEntry::id("Email")).field("email").value("a@b.c"))
            .child(FakeNode::new(LocatorEntry::id("Password")).field("password"));
        let mut values = FormValues::default();
        root.collect_fields(&mut values);
        assert_eq!(values.get("email"), "a@b.c");
        assert_eq!(values.get("password"), "");
        assert_eq!(values.get("missing"), "");
    }
}
