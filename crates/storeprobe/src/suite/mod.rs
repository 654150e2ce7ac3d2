//! Scenario catalogue and runner.
//!
//! A [`Scenario`] is a named, tagged function over a fresh [`Session`]. The
//! [`Runner`] executes a selection in order-group order, one browser session
//! per scenario, and collects a [`RunReport`].
//!
//! ```text
//! order 1  register_*      saves credentials
//! order 2  login_*, logout consumes credentials (skip when absent)
//! order 3  search_*, category_*, sort_*
//! ```
//!
//! With fail-fast enabled the runner stops at the first failed or errored
//! scenario.

mod category;
mod login;
mod register;
mod search;

use crate::driver::Driver;
use crate::reporter::{RunReport, ScenarioResult};
use crate::result::ProbeError;
use crate::session::{Session, SuiteContext};
use crate::verification::Check;
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, warn};

/// Registration scenarios
pub const ORDER_REGISTER: u8 = 1;
/// Scenarios that log in with saved credentials
pub const ORDER_LOGIN: u8 = 2;
/// Search and catalogue scenarios
pub const ORDER_CATALOGUE: u8 = 3;

/// Why a scenario did not pass
#[derive(Debug, Error)]
pub enum StepError {
    /// The shop did not show the expected state
    #[error("{0}")]
    Failed(String),
    /// A precondition is missing
    #[error("skipped: {0}")]
    Skipped(String),
    /// The automation broke
    #[error(transparent)]
    Error(#[from] ProbeError),
}

/// Result of a scenario body
pub type StepResult = Result<(), StepError>;

/// Fail with `message` unless `condition` holds
pub fn ensure(condition: bool, message: impl Into<String>) -> StepResult {
    if condition {
        Ok(())
    } else {
        Err(StepError::Failed(message.into()))
    }
}

/// Turn a page verification into a step outcome
pub fn check(outcome: Check) -> StepResult {
    match outcome {
        Check::Pass => Ok(()),
        Check::Fail(message) => Err(StepError::Failed(message)),
    }
}

/// A named, tagged scenario
pub struct Scenario<D: Driver> {
    /// Unique name
    pub name: &'static str,
    /// What the scenario proves
    pub description: &'static str,
    /// Tags for selection
    pub tags: &'static [&'static str],
    /// Ordering group; lower groups run first
    pub order: u8,
    /// Scenario body
    pub run: fn(&Session<D>) -> StepResult,
}

impl<D: Driver> Clone for Scenario<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Driver> Copy for Scenario<D> {}

impl<D: Driver> fmt::Debug for Scenario<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl<D: Driver> Scenario<D> {
    /// Tagged with `tag`, ignoring case
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Every scenario, sorted by ordering group. Catalogue order is kept within a group.
#[must_use]
pub fn catalogue<D: Driver>() -> Vec<Scenario<D>> {
    let mut scenarios = register::scenarios();
    scenarios.extend(login::scenarios());
    scenarios.extend(search::scenarios());
    scenarios.extend(category::scenarios());
    scenarios.sort_by_key(|s| s.order);
    scenarios
}

/// Which scenarios to run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Run scenarios carrying any of these tags (all when empty)
    pub tags: Vec<String>,
    /// Run scenarios whose name contains this text
    pub filter: Option<String>,
}

impl Selection {
    /// Everything
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Restrict by name substring
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Whether `scenario` is selected
    #[must_use]
    pub fn matches<D: Driver>(&self, scenario: &Scenario<D>) -> bool {
        let tagged = self.tags.is_empty() || self.tags.iter().any(|t| scenario.has_tag(t));
        let named = self
            .filter
            .as_deref()
            .map_or(true, |f| scenario.name.contains(f));
        tagged && named
    }

    /// Selected scenarios, keeping their order
    #[must_use]
    pub fn apply<D: Driver>(&self, scenarios: &[Scenario<D>]) -> Vec<Scenario<D>> {
        scenarios.iter().copied().filter(|s| self.matches(s)).collect()
    }
}

/// Source of fresh browser sessions, one per scenario
pub trait DriverFactory {
    /// Driver produced
    type Driver: Driver;

    /// Start a new browser session
    fn launch(&mut self) -> crate::ProbeResult<Self::Driver>;

    /// Shut a session down once its scenario finished
    fn release(&mut self, driver: Self::Driver) -> crate::ProbeResult<()> {
        drop(driver);
        Ok(())
    }
}

/// Progress callbacks
pub trait RunObserver {
    /// Run is about to execute `total` scenarios
    fn on_start(&mut self, _total: usize) {}

    /// Scenario `name` is starting
    fn on_scenario_start(&mut self, _name: &str) {}

    /// Scenario finished
    fn on_scenario_end(&mut self, _result: &ScenarioResult) {}

    /// Run finished
    fn on_finish(&mut self, _report: &RunReport) {}
}

/// Observer that ignores every callback
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl RunObserver for SilentObserver {}

/// Executes scenarios against sessions built from a [`SuiteContext`]
#[derive(Debug, Clone, Copy)]
pub struct Runner<'c> {
    context: &'c SuiteContext,
    fail_fast: bool,
}

impl<'c> Runner<'c> {
    /// Runner collecting every outcome
    #[must_use]
    pub const fn new(context: &'c SuiteContext) -> Self {
        Self {
            context,
            fail_fast: false,
        }
    }

    /// Stop at the first failure or error
    #[must_use]
    pub const fn fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    /// Run `scenarios` in ordering-group order
    pub fn run<F: DriverFactory>(
        &self,
        factory: &mut F,
        scenarios: &[Scenario<F::Driver>],
        observer: &mut dyn RunObserver,
    ) -> RunReport {
        let mut ordered = scenarios.to_vec();
        ordered.sort_by_key(|s| s.order);

        let mut report = RunReport::new(self.context.settings().base_url.clone());
        info!(target: "storeprobe::suite", run_id = %report.run_id, scenarios = ordered.len(), "run started");
        observer.on_start(ordered.len());

        for scenario in &ordered {
            observer.on_scenario_start(scenario.name);
            let result = self.run_one(factory, scenario);
            observer.on_scenario_end(&result);
            let stop = self.fail_fast && result.status.is_failure();
            report.record(result);
            if stop {
                warn!(target: "storeprobe::suite", scenario = scenario.name, "fail-fast: stopping run");
                break;
            }
        }

        info!(target: "storeprobe::suite", "{}", report.summary());
        observer.on_finish(&report);
        report
    }

    /// Run one scenario in a fresh session opened on the shop's home page
    pub fn run_one<F: DriverFactory>(&self, factory: &mut F, scenario: &Scenario<F::Driver>) -> ScenarioResult {
        let started = Instant::now();
        let driver = match factory.launch() {
            Ok(driver) => driver,
            Err(err) => {
                error!(target: "storeprobe::suite", scenario = scenario.name, "launch failed: {err}");
                return ScenarioResult::errored(scenario.name, started.elapsed(), err.to_string());
            }
        };
        let session = self.context.session(driver);
        info!(target: "storeprobe::suite", scenario = scenario.name, "{}", scenario.description);
        let outcome = session
            .driver()
            .navigate(&session.settings().base_url)
            .map_err(StepError::from)
            .and_then(|()| (scenario.run)(&session));
        if let Err(err) = factory.release(session.into_driver()) {
            warn!(target: "storeprobe::suite", scenario = scenario.name, "closing browser failed: {err}");
        }

        let elapsed = started.elapsed();
        let result = match outcome {
            Ok(()) => ScenarioResult::passed(scenario.name, elapsed),
            Err(StepError::Failed(message)) => ScenarioResult::failed(scenario.name, elapsed, message),
            Err(StepError::Skipped(reason)) => {
                warn!(target: "storeprobe::suite", scenario = scenario.name, "skipped: {reason}");
                ScenarioResult::skipped(scenario.name, elapsed, reason)
            }
            Err(StepError::Error(err)) => ScenarioResult::errored(scenario.name, elapsed, err.to_string()),
        };
        info!(
            target: "storeprobe::suite",
            scenario = scenario.name,
            status = result.status.label(),
            ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "scenario finished"
        );
        result
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::artifacts::RegisteredUser;
    use crate::mock::{FakeDriver, FakeSite};
    use crate::pages::testing;
    use crate::reporter::TestStatus;
    use std::collections::HashSet;

    use crate::suite::testing::{named, run_scenario};

    mod catalogue_tests {
        use super::*;

        #[test]
        fn test_names_are_unique() {
            let scenarios = catalogue::<FakeDriver>();
            let names: HashSet<_> = scenarios.iter().map(|s| s.name).collect();
            assert_eq!(names.len(), scenarios.len());
            assert_eq!(scenarios.len(), 23);
        }

        #[test]
        fn test_registration_runs_before_login() {
            let scenarios = catalogue::<FakeDriver>();
            let position = |name: &str| scenarios.iter().position(|s| s.name == name).unwrap();
            assert!(position("register_success") < position("login_success"));
            assert!(position("logout") < position("search_box_visible"));
            assert!(scenarios.windows(2).all(|w| w[0].order <= w[1].order));
        }

        #[test]
        fn test_every_scenario_is_tagged_and_described() {
            for scenario in catalogue::<FakeDriver>() {
                assert!(!scenario.tags.is_empty(), "{}", scenario.name);
                assert!(!scenario.description.is_empty(), "{}", scenario.name);
            }
        }
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn test_select_by_tag() {
            let picked = Selection::all().with_tag("SORTING").apply(&catalogue::<FakeDriver>());
            assert_eq!(picked.len(), 5);
            assert!(picked.iter().all(|s| s.name.starts_with("sort_")));
        }

        #[test]
        fn test_select_by_filter_and_tag() {
            let picked = Selection::all()
                .with_tag("login")
                .with_filter("invalid")
                .apply(&catalogue::<FakeDriver>());
            let names: Vec<_> = picked.iter().map(|s| s.name).collect();
            assert_eq!(names, ["login_invalid_email", "login_invalid_password"]);
        }

        #[test]
        fn test_empty_selection_takes_everything() {
            let all = catalogue::<FakeDriver>();
            assert_eq!(Selection::all().apply(&all).len(), all.len());
        }
    }

    mod runner_tests {
        use super::*;

        #[derive(Default)]
        struct Recorder {
            started: Vec<String>,
            total: usize,
            finished: bool,
        }

        impl RunObserver for Recorder {
            fn on_start(&mut self, total: usize) {
                self.total = total;
            }

            fn on_scenario_start(&mut self, name: &str) {
                self.started.push(name.to_string());
            }

            fn on_finish(&mut self, _report: &RunReport) {
                self.finished = true;
            }
        }

        #[test]
        fn test_full_catalogue_passes_against_fake_shop() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let mut shop = testing::shop(&context);
            let mut recorder = Recorder::default();
            let report = Runner::new(&context).run(&mut shop, &catalogue(), &mut recorder);
            assert!(report.success(), "{:#?}", report.failures());
            assert_eq!(report.passed_count(), 23);
            assert_eq!(recorder.total, 23);
            assert_eq!(recorder.started.first().map(String::as_str), Some("register_required_fields"));
            assert!(recorder.finished);
            assert!(context.settings().product_names_path().exists());
        }

        #[test]
        fn test_login_uses_credentials_from_registration() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let mut shop = testing::shop(&context);
            let picked = Selection::all().with_filter("_success").apply(&catalogue());
            let report = Runner::new(&context).run(&mut shop, &picked, &mut SilentObserver);
            let names: Vec<_> = report.results.iter().map(|r| r.name.as_str()).collect();
            assert_eq!(names, ["register_success", "login_success"]);
            assert!(report.success());
            let saved = context.session(shop.driver().unwrap()).credentials().load().unwrap().unwrap();
            assert_eq!(shop.accounts(), vec![saved]);
        }

        #[test]
        fn test_fail_fast_stops_after_first_failure() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let mut shop = testing::shop(&context).ignoring_sort();
            let picked = Selection::all().with_tag("sorting").apply(&catalogue());
            let report = Runner::new(&context)
                .fail_fast(true)
                .run(&mut shop, &picked, &mut SilentObserver);
            assert_eq!(report.total_count(), 1);
            assert_eq!(report.results[0].status, TestStatus::Failed);
            assert!(!report.success());
        }

        #[test]
        fn test_ignored_sort_fails_checked_orders() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let mut shop = testing::shop(&context).ignoring_sort();
            let picked = Selection::all().with_tag("sorting").apply(&catalogue());
            let report = Runner::new(&context).run(&mut shop, &picked, &mut SilentObserver);
            assert_eq!(report.total_count(), 5);
            assert_eq!(report.failed_count(), 4);
            let created_on = report.results.iter().find(|r| r.name == "sort_created_on").unwrap();
            assert_eq!(created_on.status, TestStatus::Passed);
        }

        #[test]
        fn test_launch_failure_is_an_error() {
            struct Broken;
            impl DriverFactory for Broken {
                type Driver = FakeDriver;
                fn launch(&mut self) -> crate::ProbeResult<FakeDriver> {
                    Err(ProbeError::BrowserLaunch {
                        message: "no chromium".into(),
                    })
                }
            }
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let result = Runner::new(&context).run_one(&mut Broken, &named("search_box_visible"));
            assert_eq!(result.status, TestStatus::Error);
            assert!(result.message.unwrap().contains("no chromium"));
        }

        #[test]
        fn test_existing_account_is_reused_by_logout() {
            let dir = tempfile::tempdir().unwrap();
            let context = testing::context(dir.path());
            let user = RegisteredUser::new("grace@example.com", "Cobol#1959");
            context
                .session(FakeDriver::new(FakeSite::new()))
                .credentials()
                .save(&user)
                .unwrap();
            let mut shop = testing::shop(&context).with_account(user);
            let result = run_scenario(&context, &mut shop, "logout");
            assert_eq!(result.status, TestStatus::Passed, "{:?}", result.message);
        }
    }

    mod step_tests {
        use super::*;

        #[test]
        fn test_ensure_and_check() {
            assert!(ensure(true, "never").is_ok());
            assert_eq!(ensure(false, "nope").unwrap_err().to_string(), "nope");
            assert!(check(Check::Pass).is_ok());
            assert!(matches!(check(Check::fail("bad")), Err(StepError::Failed(m)) if m == "bad"));
        }

        #[test]
        fn test_probe_errors_become_errors() {
            let err: StepError = ProbeError::driver("boom").into();
            assert!(matches!(err, StepError::Error(_)));
            assert_eq!(err.to_string(), "Driver error: boom");
        }
    }
}
