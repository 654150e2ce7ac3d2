//! Chromium backend over the Chrome `DevTools` Protocol.
//!
//! With the `browser` feature, [`ChromiumDriver`] implements [`crate::Driver`]
//! on top of chromiumoxide. The async client runs on a private tokio runtime
//! and every driver call blocks on it, so page objects stay synchronous.
//!
//! Element handles are JavaScript expressions that re-run their query on every
//! use. A handle whose query no longer yields a connected node reports
//! [`crate::ProbeError::StaleElement`].

use crate::config::Settings;
use crate::locator::LocatorEntry;
use std::path::PathBuf;
use std::time::Duration;

/// Browser launch options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Run without a visible window
    pub headless: bool,
    /// Chromium sandbox (disable in containers)
    pub sandbox: bool,
    /// Path to the chromium binary (`None` = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Bound on a single CDP request, page loads included
    pub request_timeout: Duration,
    /// Poll interval for element waits
    pub poll_interval: Duration,
}

impl LaunchOptions {
    /// Options taken from settings
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            headless: settings.headless,
            sandbox: settings.sandbox,
            chromium_path: settings.chromium_path.clone(),
            window_width: settings.window_width,
            window_height: settings.window_height,
            request_timeout: settings.page_load_timeout(),
            poll_interval: settings.timeouts().poll_interval,
        }
    }
}

/// Expression for the `index`-th match of `entry` in the document
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn document_expr(entry: &LocatorEntry, index: usize) -> String {
    format!("({})[{index}]", entry.js_collect("document"))
}

/// Expression for the `index`-th match of `entry` below the element `parent`
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn child_expr(parent: &str, entry: &LocatorEntry, index: usize) -> String {
    format!(
        "(function(){{ const p = {parent}; return p ? ({})[{index}] : undefined; }})()",
        entry.js_collect("p")
    )
}

/// Number of matches of `entry` below the element `parent`, `-1` if the
/// parent itself is gone
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn child_count_script(parent: &str, entry: &LocatorEntry) -> String {
    format!(
        "(function(){{ const p = {parent}; if (!p || !p.isConnected) return -1; return ({}).length; }})()",
        entry.js_collect("p")
    )
}

/// Wrap `body` so it runs with `el` bound to the element of `expr`.
///
/// The script evaluates to `{stale: true}` when the element is gone and to
/// `{stale: false, value}` otherwise.
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn element_script(expr: &str, body: &str) -> String {
    format!(
        "(function(){{ const el = {expr}; if (!el || !el.isConnected) return {{ stale: true }}; \
         const visible = (e) => !!(e.offsetWidth || e.offsetHeight || e.getClientRects().length) \
         && getComputedStyle(e).visibility !== 'hidden'; \
         const value = (function(){{ {body} }})(); \
         return {{ stale: false, value: value === undefined ? null : value }}; }})()"
    )
}

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn state_body() -> &'static str {
    "return { displayed: visible(el), enabled: !el.disabled };"
}

#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(feature = "browser")]
mod cdp {
    use super::{
        child_count_script, child_expr, document_expr, element_script, js_string, state_body,
        LaunchOptions,
    };
    use crate::driver::{Driver, Element};
    use crate::locator::LocatorEntry;
    use crate::result::{ProbeError, ProbeResult};
    use crate::suite::DriverFactory;
    use crate::wait::{poll_until, WaitCondition};
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::page::Page;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use serde::Deserialize;
    use std::rc::Rc;
    use std::time::Duration;
    use tokio::runtime::Runtime;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;
    use tracing::{debug, info};

    #[derive(Debug, Deserialize)]
    #[serde(bound(deserialize = "T: Deserialize<'de>"))]
    struct Reply<T> {
        stale: bool,
        #[serde(default)]
        value: Option<T>,
    }

    #[derive(Debug, Clone, Copy, Deserialize)]
    struct State {
        displayed: bool,
        enabled: bool,
    }

    fn driver_error(err: impl std::fmt::Display) -> ProbeError {
        ProbeError::driver(err.to_string())
    }

    #[derive(Debug)]
    struct Shared {
        runtime: Runtime,
        browser: Mutex<Browser>,
        page: Page,
        handler: JoinHandle<()>,
        options: LaunchOptions,
    }

    impl Shared {
        fn eval<T: DeserializeOwned>(&self, script: &str) -> ProbeResult<T> {
            self.runtime.block_on(async {
                let result = self.page.evaluate(script).await.map_err(driver_error)?;
                result.into_value::<T>().map_err(driver_error)
            })
        }

        fn eval_on<T: DeserializeOwned>(&self, expr: &str, locator: &str, body: &str) -> ProbeResult<Option<T>> {
            let reply: Reply<T> = self.eval(&element_script(expr, body))?;
            if reply.stale {
                return Err(ProbeError::StaleElement {
                    locator: locator.to_string(),
                });
            }
            Ok(reply.value)
        }
    }

    /// Chromium browser session
    #[derive(Debug)]
    pub struct ChromiumDriver {
        shared: Rc<Shared>,
    }

    impl ChromiumDriver {
        /// Launch chromium and open a blank tab
        pub fn launch(options: LaunchOptions) -> ProbeResult<Self> {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;

            let mut builder = BrowserConfig::builder()
                .window_size(options.window_width, options.window_height)
                .request_timeout(options.request_timeout);
            if !options.headless {
                builder = builder.with_head();
            }
            if !options.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = options.chromium_path {
                builder = builder.chrome_executable(path);
            }
            let config = builder.build().map_err(|message| ProbeError::BrowserLaunch { message })?;

            let (browser, page, handler) = runtime.block_on(async {
                let (browser, mut handler) =
                    Browser::launch(config)
                        .await
                        .map_err(|e| ProbeError::BrowserLaunch {
                            message: e.to_string(),
                        })?;
                let handler = tokio::spawn(async move {
                    while let Some(event) = handler.next().await {
                        if event.is_err() {
                            break;
                        }
                    }
                });
                let page = browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| ProbeError::BrowserLaunch {
                        message: e.to_string(),
                    })?;
                Ok::<_, ProbeError>((browser, page, handler))
            })?;
            info!(target: "storeprobe::browser", headless = options.headless, "chromium launched");

            Ok(Self {
                shared: Rc::new(Shared {
                    runtime,
                    browser: Mutex::new(browser),
                    page,
                    handler,
                    options,
                }),
            })
        }

        /// Launch options in use
        #[must_use]
        pub fn options(&self) -> &LaunchOptions {
            &self.shared.options
        }

        /// Close the browser
        pub fn close(self) -> ProbeResult<()> {
            let shared = &self.shared;
            shared.runtime.block_on(async {
                let mut browser = shared.browser.lock().await;
                browser.close().await.map_err(driver_error)?;
                browser.wait().await.map_err(driver_error)?;
                Ok::<_, ProbeError>(())
            })?;
            shared.handler.abort();
            info!(target: "storeprobe::browser", "chromium closed");
            Ok(())
        }

        fn element(&self, expr: String, entry: &LocatorEntry) -> ChromiumElement {
            ChromiumElement {
                shared: Rc::clone(&self.shared),
                expr,
                locator: entry.to_string(),
            }
        }
    }

    impl Driver for ChromiumDriver {
        type Element = ChromiumElement;

        fn navigate(&self, url: &str) -> ProbeResult<()> {
            debug!(target: "storeprobe::browser", %url, "navigate");
            self.shared.runtime.block_on(async {
                self.shared
                    .page
                    .goto(url)
                    .await
                    .map_err(|e| ProbeError::Navigation {
                        url: url.to_string(),
                        message: e.to_string(),
                    })?;
                Ok(())
            })
        }

        fn find_element(
            &self,
            entry: &LocatorEntry,
            condition: WaitCondition,
            timeout: Duration,
        ) -> ProbeResult<ChromiumElement> {
            let expr = document_expr(entry, 0);
            let locator = entry.to_string();
            poll_until(condition, &locator, timeout, self.shared.options.poll_interval, || {
                match self.shared.eval_on::<State>(&expr, &locator, state_body()) {
                    Ok(Some(state)) if condition.is_met(state.displayed, state.enabled) => Ok(Some(())),
                    Ok(_) | Err(ProbeError::StaleElement { .. }) => Ok(None),
                    Err(err) => Err(err),
                }
            })?;
            Ok(self.element(expr, entry))
        }

        fn find_elements(&self, entry: &LocatorEntry, timeout: Duration) -> ProbeResult<Vec<ChromiumElement>> {
            let script = format!("({}).length", entry.js_collect("document"));
            let locator = entry.to_string();
            let count = poll_until(
                WaitCondition::Present,
                &locator,
                timeout,
                self.shared.options.poll_interval,
                || Ok(Some(self.shared.eval::<usize>(&script)?).filter(|n| *n > 0)),
            )?;
            Ok((0..count)
                .map(|index| self.element(document_expr(entry, index), entry))
                .collect())
        }

        fn current_url(&self) -> ProbeResult<String> {
            self.shared.runtime.block_on(async {
                let url = self.shared.page.url().await.map_err(driver_error)?;
                Ok(url.unwrap_or_else(|| "about:blank".to_string()))
            })
        }
    }

    /// Live element handle in a chromium page
    #[derive(Debug, Clone)]
    pub struct ChromiumElement {
        shared: Rc<Shared>,
        expr: String,
        locator: String,
    }

    impl ChromiumElement {
        fn run<T: DeserializeOwned + Default>(&self, body: &str) -> ProbeResult<T> {
            Ok(self
                .shared
                .eval_on::<T>(&self.expr, &self.locator, body)?
                .unwrap_or_default())
        }

        fn state(&self) -> ProbeResult<State> {
            self.shared
                .eval_on::<State>(&self.expr, &self.locator, state_body())?
                .ok_or_else(|| ProbeError::driver(format!("no state for {}", self.locator)))
        }

        fn child_count(&self, entry: &LocatorEntry) -> ProbeResult<usize> {
            let count: i64 = self.shared.eval(&child_count_script(&self.expr, entry))?;
            usize::try_from(count).map_err(|_| ProbeError::StaleElement {
                locator: self.locator.clone(),
            })
        }

        fn child(&self, entry: &LocatorEntry, index: usize) -> Self {
            Self {
                shared: Rc::clone(&self.shared),
                expr: child_expr(&self.expr, entry, index),
                locator: format!("{entry} inside {}", self.locator),
            }
        }
    }

    impl Element for ChromiumElement {
        fn click(&self) -> ProbeResult<()> {
            let clicked: bool = self.run(
                "if (!visible(el) || el.disabled) return false; \
                 el.scrollIntoView({ block: 'center' }); el.click(); return true;",
            )?;
            if clicked {
                Ok(())
            } else {
                Err(ProbeError::driver(format!("{} is not interactable", self.locator)))
            }
        }

        fn clear(&self) -> ProbeResult<()> {
            self.run::<bool>(
                "el.focus(); el.value = ''; \
                 el.dispatchEvent(new Event('input', { bubbles: true })); return true;",
            )
            .map(drop)
        }

        fn send_keys(&self, text: &str) -> ProbeResult<()> {
            let body = format!(
                "el.focus(); el.value = el.value + {}; \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true;",
                js_string(text)
            );
            self.run::<bool>(&body).map(drop)
        }

        fn text(&self) -> ProbeResult<String> {
            self.run("return el.innerText || el.textContent || '';")
        }

        fn attribute(&self, name: &str) -> ProbeResult<Option<String>> {
            let body = format!(
                "const n = {}; const p = el[n]; \
                 if (p !== undefined && p !== null && typeof p !== 'object' && typeof p !== 'function') \
                 return String(p); const a = el.getAttribute(n); return a === null ? null : a;",
                js_string(name)
            );
            self.shared.eval_on::<String>(&self.expr, &self.locator, &body)
        }

        fn is_displayed(&self) -> ProbeResult<bool> {
            Ok(self.state()?.displayed)
        }

        fn is_enabled(&self) -> ProbeResult<bool> {
            Ok(self.state()?.enabled)
        }

        fn find_child(&self, entry: &LocatorEntry) -> ProbeResult<Self> {
            if self.child_count(entry)? == 0 {
                return Err(ProbeError::element_not_found(format!(
                    "no {entry} inside {}",
                    self.locator
                )));
            }
            Ok(self.child(entry, 0))
        }

        fn find_children(&self, entry: &LocatorEntry) -> ProbeResult<Vec<Self>> {
            let count = self.child_count(entry)?;
            Ok((0..count).map(|index| self.child(entry, index)).collect())
        }

        fn select_by_value(&self, value: &str) -> ProbeResult<()> {
            let body = format!(
                "const v = {}; const o = Array.from(el.options || []).find(o => o.value === v); \
                 if (!o) return false; el.value = v; \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true;",
                js_string(value)
            );
            if self.run::<bool>(&body)? {
                Ok(())
            } else {
                Err(ProbeError::element_not_found(format!(
                    "no option with value '{value}' in {}",
                    self.locator
                )))
            }
        }
    }

    /// One fresh browser per scenario, closed when the scenario ends
    impl DriverFactory for LaunchOptions {
        type Driver = ChromiumDriver;

        fn launch(&mut self) -> ProbeResult<ChromiumDriver> {
            ChromiumDriver::launch(self.clone())
        }

        fn release(&mut self, driver: ChromiumDriver) -> ProbeResult<()> {
            driver.close()
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{ChromiumDriver, ChromiumElement};
