//! Run reporting.
//!
//! Every scenario the runner executes leaves one [`ScenarioResult`] in a
//! [`RunReport`]. The report carries its own run id and start time, renders a
//! one-line summary for the terminal and serializes to `report.json`.

use crate::artifacts::ensure_parent;
use crate::result::ProbeResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Scenario outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Every check held
    Passed,
    /// A check did not hold, or the shop showed a defect
    Failed,
    /// A precondition from an earlier run is missing
    Skipped,
    /// The automation itself broke (timeout, driver, configuration)
    Error,
}

impl TestStatus {
    /// Check if passed
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Failed or errored
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Error)
    }

    /// Short label for terminal output
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Failed => "FAIL",
            Self::Skipped => "SKIP",
            Self::Error => "ERROR",
        }
    }
}

/// Outcome of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// Outcome
    pub status: TestStatus,
    /// Failure, skip or error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Wall time spent in the scenario
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl ScenarioResult {
    /// A passing result
    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Passed,
            message: None,
            duration,
        }
    }

    /// A failing result
    #[must_use]
    pub fn failed(name: impl Into<String>, duration: Duration, message: impl Into<String>) -> Self {
        Self::with_message(name, TestStatus::Failed, duration, message)
    }

    /// A skipped result
    #[must_use]
    pub fn skipped(name: impl Into<String>, duration: Duration, reason: impl Into<String>) -> Self {
        Self::with_message(name, TestStatus::Skipped, duration, reason)
    }

    /// A result for a scenario the automation could not complete
    #[must_use]
    pub fn errored(name: impl Into<String>, duration: Duration, message: impl Into<String>) -> Self {
        Self::with_message(name, TestStatus::Error, duration, message)
    }

    fn with_message(
        name: impl Into<String>,
        status: TestStatus,
        duration: Duration,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            message: Some(message.into()),
            duration,
        }
    }
}

/// Results of one suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique id of the run
    pub run_id: Uuid,
    /// Shop the run targeted
    pub base_url: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Results in execution order
    pub results: Vec<ScenarioResult>,
}

impl RunReport {
    /// Empty report for a run against `base_url`, starting now
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            base_url: base_url.into(),
            started_at: Utc::now(),
            results: Vec::new(),
        }
    }

    /// Append a result
    pub fn record(&mut self, result: ScenarioResult) {
        self.results.push(result);
    }

    fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Number of passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(TestStatus::Passed)
    }

    /// Number of failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    /// Number of skipped scenarios
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(TestStatus::Skipped)
    }

    /// Number of errored scenarios
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count(TestStatus::Error)
    }

    /// Total number of recorded scenarios
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// No scenario failed or errored
    #[must_use]
    pub fn success(&self) -> bool {
        !self.results.iter().any(|r| r.status.is_failure())
    }

    /// Sum of scenario durations
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.results.iter().map(|r| r.duration).sum()
    }

    /// Failed and errored results
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| r.status.is_failure()).collect()
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} scenarios: {} passed, {} failed, {} skipped, {} errors in {:.2}s",
            self.total_count(),
            self.passed_count(),
            self.failed_count(),
            self.skipped_count(),
            self.error_count(),
            self.total_duration().as_secs_f64()
        )
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report to `path`, creating parent directories
    pub fn write_json(&self, path: &Path) -> ProbeResult<()> {
        ensure_parent(path)?;
        std::fs::write(path, self.to_json()?)?;
        info!(target: "storeprobe::artifacts", run_id = %self.run_id, "report written to {}", path.display());
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
