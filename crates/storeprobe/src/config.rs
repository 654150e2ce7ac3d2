//! Suite settings: target shop, timeouts, file locations and browser options.
//!
//! Settings resolve in three layers: built-in defaults, an optional YAML file,
//! then `STOREPROBE_*` environment variables. The CLI applies its flags last.

use crate::result::{ProbeError, ProbeResult};
use crate::wait::{
    Timeouts, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_MS, PAGE_LOAD_TIMEOUT_MS, SHORT_WAIT_MS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Shop the suite targets by default
pub const DEFAULT_BASE_URL: &str = "https://demowebshop.tricentis.com/";

/// Environment variable overriding [`Settings::base_url`]
pub const ENV_BASE_URL: &str = "STOREPROBE_BASE_URL";
/// Environment variable overriding [`Settings::headless`]
pub const ENV_HEADLESS: &str = "STOREPROBE_HEADLESS";
/// Environment variable overriding [`Settings::output_dir`]
pub const ENV_OUTPUT_DIR: &str = "STOREPROBE_OUTPUT_DIR";

/// Suite settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root URL of the shop under test
    pub base_url: String,
    /// Default element wait in milliseconds
    pub default_wait_ms: u64,
    /// Wait used by expect-absence probes in milliseconds
    pub short_wait_ms: u64,
    /// Navigation timeout in milliseconds
    pub page_load_timeout_ms: u64,
    /// Polling interval for backends that poll, in milliseconds
    pub poll_interval_ms: u64,
    /// Directory for credentials, bug log, product lists and reports
    pub output_dir: PathBuf,
    /// Locator document (bundled document when unset)
    pub locators: Option<PathBuf>,
    /// Registration fixture data (bundled data when unset)
    pub register_data: Option<PathBuf>,
    /// Static keyword data (bundled data when unset)
    pub static_data: Option<PathBuf>,
    /// Run the browser without a window
    pub headless: bool,
    /// Chromium executable (auto-detected when unset)
    pub chromium_path: Option<PathBuf>,
    /// Keep the Chromium sandbox enabled (disable in containers)
    pub sandbox: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_wait_ms: DEFAULT_WAIT_MS,
            short_wait_ms: SHORT_WAIT_MS,
            page_load_timeout_ms: PAGE_LOAD_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            output_dir: PathBuf::from("output"),
            locators: None,
            register_data: None,
            static_data: None,
            headless: true,
            chromium_path: None,
            sandbox: true,
            window_width: 1366,
            window_height: 900,
        }
    }
}

impl Settings {
    /// Create default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from YAML; absent fields keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load settings from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)
    }

    /// Apply `STOREPROBE_*` overrides from the process environment
    pub fn with_env_overrides(self) -> ProbeResult<Self> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply `STOREPROBE_*` overrides from an arbitrary lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> ProbeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(headless) = lookup(ENV_HEADLESS) {
            self.headless = parse_flag(&headless).ok_or_else(|| {
                ProbeError::settings(format!("{ENV_HEADLESS} must be true or false, got '{headless}'"))
            })?;
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        Ok(self)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the output directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Reject settings the suite cannot run with
    pub fn validate(&self) -> ProbeResult<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ProbeError::settings(format!("base_url '{}': {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProbeError::settings(format!(
                "base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.default_wait_ms == 0 {
            return Err(ProbeError::settings("default_wait_ms must be positive"));
        }
        if self.short_wait_ms > self.default_wait_ms {
            return Err(ProbeError::settings(format!(
                "short_wait_ms ({}) exceeds default_wait_ms ({})",
                self.short_wait_ms, self.default_wait_ms
            )));
        }
        Ok(())
    }

    /// Wait bounds derived from these settings
    #[must_use]
    pub const fn timeouts(&self) -> Timeouts {
        Timeouts {
            default: Duration::from_millis(self.default_wait_ms),
            short: Duration::from_millis(self.short_wait_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    /// Navigation timeout
    #[must_use]
    pub const fn page_load_timeout(&self) -> Duration {
        Duration::from_millis(self.page_load_timeout_ms)
    }

    /// Absolute URL of a path on the shop (`"login"` -> `<base>/login`)
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{path}", self.base_url.trim_end_matches('/'))
        }
    }

    /// Resolve a link `href` against the shop root. Absolute URLs pass through.
    pub fn resolve_href(&self, href: &str) -> ProbeResult<String> {
        let href = href.trim();
        if href.is_empty() {
            return Err(ProbeError::element_not_found("link href is empty"));
        }
        Ok(Url::parse(&self.base_url)?.join(href)?.to_string())
    }

    /// Last registered user credentials
    #[must_use]
    pub fn credentials_path(&self) -> PathBuf {
        self.output_dir.join("last_registered_user.json")
    }

    /// Append-only bug log
    #[must_use]
    pub fn bug_log_path(&self) -> PathBuf {
        self.output_dir.join("bugs_detected.md")
    }

    /// Product names written by the keyword search scenario
    #[must_use]
    pub fn product_names_path(&self) -> PathBuf {
        self.output_dir.join("product_names.txt")
    }

    /// JSON run report
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join("report.json")
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
