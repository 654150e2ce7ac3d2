//! Locator registry: symbolic `(section, key)` names mapped to element queries.
//!
//! The registry is read from a JSON document shaped like
//!
//! ```json
//! { "login": { "logout_link": { "by": "css", "value": "a.ico-logout" } } }
//! ```
//!
//! Entries are validated when the document is loaded (unknown strategies,
//! empty values and duplicate keys are rejected), so a registry that exists
//! only ever fails lookups for names it does not contain.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::str::FromStr;

use crate::result::{ProbeError, ProbeResult};

const BUNDLED_LOCATORS: &str = include_str!("../resources/locators.json");

/// How a locator value is interpreted when querying the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Element `id` attribute
    Id,
    /// XPath expression
    #[serde(rename = "xpath")]
    XPath,
    /// CSS selector
    Css,
    /// Element `name` attribute
    Name,
    /// Single CSS class name
    Class,
    /// Tag name
    Tag,
    /// Exact (trimmed) anchor text
    LinkText,
    /// Anchor text containing the value
    PartialLinkText,
}

impl Strategy {
    /// All strategies, in declaration order
    pub const ALL: [Self; 8] = [
        Self::Id,
        Self::XPath,
        Self::Css,
        Self::Name,
        Self::Class,
        Self::Tag,
        Self::LinkText,
        Self::PartialLinkText,
    ];

    /// Name used in locator documents
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::XPath => "xpath",
            Self::Css => "css",
            Self::Name => "name",
            Self::Class => "class",
            Self::Tag => "tag",
            Self::LinkText => "link_text",
            Self::PartialLinkText => "partial_link_text",
        }
    }

    /// True when the strategy is resolved with `document.evaluate`
    #[must_use]
    pub const fn is_xpath(self) -> bool {
        matches!(self, Self::XPath)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == wanted)
            .ok_or_else(|| format!("unknown locator strategy '{s}'"))
    }
}

/// A single `(strategy, value)` element query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocatorEntry {
    /// Query strategy
    #[serde(rename = "by")]
    pub strategy: Strategy,
    /// Query value, interpreted per strategy
    pub value: String,
}

impl LocatorEntry {
    /// Create a new locator entry
    #[must_use]
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// CSS selector entry
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(Strategy::Css, selector)
    }

    /// XPath entry
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, expr)
    }

    /// Element id entry
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(Strategy::Id, id)
    }

    /// Tag name entry
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::new(Strategy::Tag, tag)
    }

    /// JavaScript expression evaluating to an `Array` of the elements this
    /// entry matches below `scope` (`document` or an element expression).
    ///
    /// Values are embedded as JSON string literals, so quotes in selectors
    /// and XPath expressions survive intact.
    #[must_use]
    pub fn js_collect(&self, scope: &str) -> String {
        let value = js_string(&self.value);
        match self.strategy {
            Strategy::Id => {
                format!("Array.from({scope}.querySelectorAll('#' + CSS.escape({value})))")
            }
            Strategy::Css | Strategy::Tag => {
                format!("Array.from({scope}.querySelectorAll({value}))")
            }
            Strategy::Name => format!(
                "Array.from({scope}.querySelectorAll('[name=\"' + CSS.escape({value}) + '\"]'))"
            ),
            Strategy::Class => {
                format!("Array.from({scope}.querySelectorAll('.' + CSS.escape({value})))")
            }
            Strategy::LinkText => format!(
                "Array.from({scope}.querySelectorAll('a')).filter(a => a.textContent.trim() === {value})"
            ),
            Strategy::PartialLinkText => format!(
                "Array.from({scope}.querySelectorAll('a')).filter(a => a.textContent.includes({value}))"
            ),
            Strategy::XPath => format!(
                "(function(){{const r = document.evaluate({value}, {scope}, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
                 for (let i = 0; i < r.snapshotLength; i++) {{ out.push(r.snapshotItem(i)); }} \
                 return out;}})()"
            ),
        }
    }
}

impl fmt::Display for LocatorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy, self.value)
    }
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Entry as written in the locator document; validated into [`LocatorEntry`]
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default = "default_strategy_name")]
    by: String,
    #[serde(default)]
    value: String,
}

fn default_strategy_name() -> String {
    Strategy::Id.as_str().to_string()
}

/// JSON object that refuses duplicate keys instead of keeping the last one
struct UniqueMap<V>(BTreeMap<String, V>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for UniqueMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UniqueVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueVisitor<V> {
            type Value = UniqueMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object with unique keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = BTreeMap::new();
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    if map.contains_key(&key) {
                        return Err(de::Error::custom(format!("duplicate key '{key}'")));
                    }
                    let _ = map.insert(key, value);
                }
                Ok(UniqueMap(map))
            }
        }

        deserializer.deserialize_map(UniqueVisitor(PhantomData))
    }
}

/// Immutable two-level lookup of locator entries.
///
/// Build it once (typically through [`LocatorRegistry::bundled`] or
/// [`LocatorRegistry::load`]) and share it read-only; it is `Send + Sync`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatorRegistry {
    sections: BTreeMap<String, BTreeMap<String, LocatorEntry>>,
}

impl LocatorRegistry {
    /// Parse and validate a locator document
    pub fn from_json_str(json: &str) -> ProbeResult<Self> {
        let raw: UniqueMap<UniqueMap<RawEntry>> = serde_json::from_str(json)?;
        let mut sections = BTreeMap::new();
        for (section, UniqueMap(entries)) in raw.0 {
            let mut validated = BTreeMap::new();
            for (key, entry) in entries {
                let strategy =
                    entry
                        .by
                        .parse::<Strategy>()
                        .map_err(|message| ProbeError::InvalidLocator {
                            section: section.clone(),
                            key: key.clone(),
                            message,
                        })?;
                if entry.value.trim().is_empty() {
                    return Err(ProbeError::InvalidLocator {
                        section,
                        key,
                        message: "locator value is empty".to_string(),
                    });
                }
                let _ = validated.insert(key, LocatorEntry::new(strategy, entry.value));
            }
            let _ = sections.insert(section, validated);
        }
        Ok(Self { sections })
    }

    /// Load a locator document from disk
    pub fn load(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let registry = Self::from_json_str(&json)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            entries = registry.len(),
            "loaded locator registry"
        );
        Ok(registry)
    }

    /// Registry built from the locator document shipped with the crate
    pub fn bundled() -> ProbeResult<Self> {
        Self::from_json_str(BUNDLED_LOCATORS)
    }

    /// Look up `section.key`
    pub fn resolve(&self, section: &str, key: &str) -> ProbeResult<&LocatorEntry> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .ok_or_else(|| ProbeError::locator_not_found(section, key))
    }

    /// Section names in sorted order
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Key names of one section in sorted order
    pub fn keys(&self, section: &str) -> ProbeResult<Vec<&str>> {
        self.sections
            .get(section)
            .map(|entries| entries.keys().map(String::as_str).collect())
            .ok_or_else(|| ProbeError::locator_not_found(section, "*"))
    }

    /// Every `(section, key, entry)` triple in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &LocatorEntry)> {
        self.sections.iter().flat_map(|(section, entries)| {
            entries
                .iter()
                .map(move |(key, entry)| (section.as_str(), key.as_str(), entry))
        })
    }

    /// Total number of entries across all sections
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.values().map(BTreeMap::len).sum()
    }

    /// True when no entry is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
