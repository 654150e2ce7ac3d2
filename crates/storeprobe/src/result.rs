//! Result and error types for storeprobe.

use thiserror::Error;

/// Result type for storeprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving the shop UI.
///
/// Configuration errors (`LocatorNotFound`, `InvalidLocator`, `DataNotFound`,
/// `Settings`) point at a broken suite, not at the application under test, and
/// are never recovered from.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Locator section or key missing from the registry
    #[error("Locator '{section}.{key}' not found in locator registry")]
    LocatorNotFound {
        /// Locator section
        section: String,
        /// Locator key within the section
        key: String,
    },

    /// Locator entry rejected while loading the registry
    #[error("Invalid locator '{section}.{key}': {message}")]
    InvalidLocator {
        /// Locator section
        section: String,
        /// Locator key within the section
        key: String,
        /// Why the entry was rejected
        message: String,
    },

    /// Fixture data section or key missing
    #[error("Fixture data '{section}.{key}' not found")]
    DataNotFound {
        /// Data section
        section: String,
        /// Data key within the section
        key: String,
    },

    /// Settings could not be loaded or are inconsistent
    #[error("Settings error: {message}")]
    Settings {
        /// Error message
        message: String,
    },

    /// Wait condition not met in time
    #[error("Timed out after {ms}ms waiting for {condition} element {locator}")]
    Timeout {
        /// Wait condition that was not satisfied
        condition: String,
        /// Human readable locator description
        locator: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Element lookup failed without a wait (children, options, indexes)
    #[error("Element not found: {message}")]
    ElementNotFound {
        /// Error message
        message: String,
    },

    /// Element handle no longer attached to the current document
    #[error("Stale element: {locator} is no longer attached to the page")]
    StaleElement {
        /// Human readable locator description
        locator: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Any other failure reported by the driver backend
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ProbeError {
    /// Create a locator-not-found error
    #[must_use]
    pub fn locator_not_found(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self::LocatorNotFound {
            section: section.into(),
            key: key.into(),
        }
    }

    /// Create a data-not-found error
    #[must_use]
    pub fn data_not_found(section: impl Into<String>, key: impl Into<String>) -> Self {
        Self::DataNotFound {
            section: section.into(),
            key: key.into(),
        }
    }

    /// Create a settings error
    #[must_use]
    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings {
            message: message.into(),
        }
    }

    /// Create an element-not-found error
    #[must_use]
    pub fn element_not_found(message: impl Into<String>) -> Self {
        Self::ElementNotFound {
            message: message.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// True for errors caused by a broken locator file, fixture file or settings.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::LocatorNotFound { .. }
                | Self::InvalidLocator { .. }
                | Self::DataNotFound { .. }
                | Self::Settings { .. }
        )
    }
}
