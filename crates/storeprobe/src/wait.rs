//! Wait conditions and bounded polling.
//!
//! Every element lookup waits for one [`WaitCondition`] for at most a bounded
//! timeout. Backends with native waits honour the condition themselves;
//! backends without (the Chromium adapter) poll through [`poll_until`].

use crate::result::{ProbeError, ProbeResult};
use std::fmt;
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Project-wide default wait for element conditions (10 seconds)
pub const DEFAULT_WAIT_MS: u64 = 10_000;

/// Short wait used by expect-absence probes (3 seconds)
pub const SHORT_WAIT_MS: u64 = 3_000;

/// Page load timeout (30 seconds)
pub const PAGE_LOAD_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Project-wide default wait
pub const DEFAULT_WAIT: Duration = Duration::from_millis(DEFAULT_WAIT_MS);

/// Short wait for probes that expect an element to be absent
pub const SHORT_WAIT: Duration = Duration::from_millis(SHORT_WAIT_MS);

// =============================================================================
// WAIT CONDITION
// =============================================================================

/// Condition an element must satisfy before an action proceeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitCondition {
    /// Element is attached to the DOM
    Present,
    /// Element is attached and rendered visibly
    Visible,
    /// Element is visible and enabled
    Clickable,
}

impl WaitCondition {
    /// Name used in logs and error messages
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Visible => "visible",
            Self::Clickable => "clickable",
        }
    }

    /// Decide the condition from an element's observed state
    #[must_use]
    pub const fn is_met(self, displayed: bool, enabled: bool) -> bool {
        match self {
            Self::Present => true,
            Self::Visible => displayed,
            Self::Clickable => displayed && enabled,
        }
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TIMEOUTS
// =============================================================================

/// The two timeouts page objects choose between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Default bound for every action
    pub default: Duration,
    /// Bound for probes that expect absence
    pub short: Duration,
    /// Polling interval for backends that poll
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default: DEFAULT_WAIT,
            short: SHORT_WAIT,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl Timeouts {
    /// Set the default wait
    #[must_use]
    pub const fn with_default(mut self, default: Duration) -> Self {
        self.default = default;
        self
    }

    /// Set the short wait
    #[must_use]
    pub const fn with_short(mut self, short: Duration) -> Self {
        self.short = short;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `probe` until it yields `Some`, or fail with [`ProbeError::Timeout`].
///
/// The probe runs at least once even with a zero timeout. An `Err` from the
/// probe aborts the wait immediately.
pub fn poll_until<T, F>(
    condition: WaitCondition,
    locator: &str,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> ProbeResult<T>
where
    F: FnMut() -> ProbeResult<Option<T>>,
{
    let start = Instant::now();
    loop {
        if let Some(value) = probe()? {
            return Ok(value);
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(ProbeError::Timeout {
                condition: condition.to_string(),
                locator: locator.to_string(),
                ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            });
        }
        std::thread::sleep(interval.min(timeout - elapsed));
    }
}
