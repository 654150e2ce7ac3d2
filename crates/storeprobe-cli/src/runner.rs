//! Command execution

use crate::commands::{CheckLocatorsArgs, ListArgs, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use std::path::Path;
use storeprobe::mock::{DemoShop, FakeDriver};
use storeprobe::suite::{catalogue, DriverFactory, Runner, Scenario, Selection};
use storeprobe::{LocatorRegistry, RunReport, Settings, SuiteContext};
use tracing::{debug, info};

/// Settings for a run: YAML file, then environment, then flags
pub fn resolve_settings(args: &RunArgs) -> CliResult<Settings> {
    resolve_settings_with(args, |key| std::env::var(key).ok())
}

/// [`resolve_settings`] with an explicit environment lookup
pub fn resolve_settings_with<F>(args: &RunArgs, lookup: F) -> CliResult<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    }
    .with_overrides_from(lookup)?;

    if let Some(base_url) = &args.base_url {
        settings = settings.with_base_url(base_url.clone());
    }
    if let Some(output) = &args.output {
        settings = settings.with_output_dir(output.clone());
    }
    if args.headed {
        settings = settings.with_headless(false);
    }
    if args.no_sandbox {
        settings.sandbox = false;
    }
    if let Some(chromium) = &args.chromium {
        settings.chromium_path = Some(chromium.clone());
    }
    if args.offline && !settings.base_url.ends_with('/') {
        settings.base_url.push('/');
    }
    settings.validate()?;
    Ok(settings)
}

/// Selection from `--tag` and `--filter`
#[must_use]
pub fn selection(tags: &[String], filter: Option<&str>) -> Selection {
    let selection = tags.iter().fold(Selection::all(), |s, tag| s.with_tag(tag.clone()));
    match filter {
        Some(filter) => selection.with_filter(filter),
        None => selection,
    }
}

/// Listing lines for the selected scenarios, in execution order
#[must_use]
pub fn list_lines(args: &ListArgs) -> Vec<String> {
    let scenarios = selection(&args.tags, args.filter.as_deref()).apply(&catalogue::<FakeDriver>());
    scenarios
        .iter()
        .map(|s| {
            format!(
                "{} {:<28} [{}] {}",
                s.order,
                s.name,
                s.tags.join(", "),
                s.description
            )
        })
        .collect()
}

/// Listing lines for a locator file, or the bundled registry
pub fn locator_lines(args: &CheckLocatorsArgs) -> CliResult<Vec<String>> {
    let registry = match &args.path {
        Some(path) => LocatorRegistry::load(path)?,
        None => LocatorRegistry::bundled()?,
    };
    let mut lines: Vec<String> = registry
        .iter()
        .map(|(section, key, entry)| format!("{:<40} {entry}", format!("{section}.{key}")))
        .collect();
    lines.push(format!("{} locators OK", registry.len()));
    Ok(lines)
}

/// Runs scenario selections and writes the JSON report
#[derive(Debug)]
pub struct SuiteRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl SuiteRunner {
    /// Runner for the given CLI configuration
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter = ProgressReporter::new(&config);
        Self { config, reporter }
    }

    /// CLI configuration
    #[must_use]
    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Execute `run`; the report is written to `<output>/report.json`
    pub fn run(&mut self, args: &RunArgs) -> CliResult<RunReport> {
        let settings = resolve_settings(args)?;
        let context = SuiteContext::from_settings(settings)?;
        let selection = selection(&args.tags, args.filter.as_deref());

        let report = if args.offline {
            let mut shop = DemoShop::new(context.settings().base_url.clone(), context.registry())?;
            self.reporter.header(&format!("storeprobe (offline) {}", shop.base_url()));
            self.execute(&context, &mut shop, &selection)?
        } else {
            self.run_browser(&context, &selection)?
        };

        let path = context.settings().report_path();
        report.write_json(&path)?;
        self.report_written(&path);
        Ok(report)
    }

    #[cfg(feature = "browser")]
    fn run_browser(&mut self, context: &SuiteContext, selection: &Selection) -> CliResult<RunReport> {
        let mut options = storeprobe::LaunchOptions::from_settings(context.settings());
        self.reporter.header(&format!("storeprobe {}", context.settings().base_url));
        debug!(headless = options.headless, sandbox = options.sandbox, "browser launch options");
        self.execute(context, &mut options, selection)
    }

    #[cfg(not(feature = "browser"))]
    fn run_browser(&mut self, _context: &SuiteContext, _selection: &Selection) -> CliResult<RunReport> {
        Err(CliError::config(
            "built without the `browser` feature; pass --offline or rebuild with it enabled",
        ))
    }

    fn execute<F: DriverFactory>(
        &mut self,
        context: &SuiteContext,
        factory: &mut F,
        selection: &Selection,
    ) -> CliResult<RunReport> {
        let scenarios: Vec<Scenario<F::Driver>> = selection.apply(&catalogue());
        if scenarios.is_empty() {
            return Err(CliError::invalid_argument(format!(
                "no scenario matches tags {:?} and filter {:?}",
                selection.tags, selection.filter
            )));
        }
        info!(scenarios = scenarios.len(), "starting run");
        let runner = Runner::new(context).fail_fast(self.config.fail_fast);
        Ok(runner.run(factory, &scenarios, &mut self.reporter))
    }

    fn report_written(&self, path: &Path) {
        if self.config.verbosity.is_verbose() {
            self.reporter.info(&format!("report written to {}", path.display()));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};

    fn offline_args(output: &Path) -> RunArgs {
        RunArgs {
            offline: true,
            base_url: Some("http://shop.test".to_string()),
            output: Some(output.to_path_buf()),
            ..RunArgs::default()
        }
    }

    fn quiet_runner() -> SuiteRunner {
        SuiteRunner::new(
            CliConfig::new()
                .with_color(ColorChoice::Never)
                .with_verbosity(Verbosity::Quiet),
        )
    }

    mod settings_tests {
        use super::*;

        #[test]
        fn test_flags_override_environment() {
            let args = RunArgs {
                base_url: Some("http://flag.test/".to_string()),
                headed: true,
                no_sandbox: true,
                ..RunArgs::default()
            };
            let settings = resolve_settings_with(&args, |key| match key {
                "STOREPROBE_BASE_URL" => Some("http://env.test/".to_string()),
                "STOREPROBE_OUTPUT_DIR" => Some("env-out".to_string()),
                _ => None,
            })
            .unwrap();
            assert_eq!(settings.base_url, "http://flag.test/");
            assert_eq!(settings.output_dir, Path::new("env-out"));
            assert!(!settings.headless);
            assert!(!settings.sandbox);
        }

        #[test]
        fn test_yaml_file_is_the_first_layer() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("storeprobe.yaml");
            std::fs::write(&path, "base_url: http://yaml.test/\ndefault_wait_ms: 4000\n").unwrap();
            let args = RunArgs {
                config: Some(path),
                ..RunArgs::default()
            };
            let settings = resolve_settings_with(&args, |_| None).unwrap();
            assert_eq!(settings.base_url, "http://yaml.test/");
            assert_eq!(settings.default_wait_ms, 4000);
        }

        #[test]
        fn test_offline_base_url_gets_trailing_slash() {
            let args = offline_args(Path::new("out"));
            let settings = resolve_settings_with(&args, |_| None).unwrap();
            assert_eq!(settings.base_url, "http://shop.test/");
        }

        #[test]
        fn test_invalid_base_url_rejected() {
            let args = RunArgs {
                base_url: Some("ftp://shop.test/".to_string()),
                ..RunArgs::default()
            };
            let err = resolve_settings_with(&args, |_| None).unwrap_err();
            assert!(err.to_string().contains("http or https"));
        }
    }

    mod listing_tests {
        use super::*;

        #[test]
        fn test_list_all_in_execution_order() {
            let lines = list_lines(&ListArgs::default());
            assert_eq!(lines.len(), 23);
            assert!(lines[0].starts_with("1 register_"));
            assert!(lines.last().unwrap().starts_with("3 "));
        }

        #[test]
        fn test_list_by_tag() {
            let args = ListArgs {
                tags: vec!["smoke".to_string()],
                filter: None,
            };
            let lines = list_lines(&args);
            assert!(lines.iter().any(|l| l.contains("register_success")));
            assert!(lines.iter().any(|l| l.contains("login_success")));
            assert!(lines.iter().all(|l| l.contains("smoke")));
        }

        #[test]
        fn test_bundled_locators_listed() {
            let lines = locator_lines(&CheckLocatorsArgs::default()).unwrap();
            assert!(lines.last().unwrap().ends_with("locators OK"));
            assert!(lines.iter().any(|l| l.starts_with("login.")));
        }

        #[test]
        fn test_invalid_locator_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("locators.json");
            std::fs::write(&path, r#"{"login": {"email": {"by": "sonar", "value": "x"}}}"#).unwrap();
            let err = locator_lines(&CheckLocatorsArgs { path: Some(path) }).unwrap_err();
            assert!(err.to_string().contains("login.email"));
        }
    }

    mod run_tests {
        use super::*;

        #[test]
        fn test_offline_run_writes_report() {
            let dir = tempfile::tempdir().unwrap();
            let mut runner = quiet_runner();
            let report = runner.run(&offline_args(dir.path())).unwrap();
            assert!(report.success(), "{}", report.summary());
            assert_eq!(report.total_count(), 23);

            let written = std::fs::read_to_string(dir.path().join("report.json")).unwrap();
            let parsed: RunReport = serde_json::from_str(&written).unwrap();
            assert_eq!(parsed.run_id, report.run_id);
            assert!(dir.path().join("last_registered_user.json").exists());
        }

        #[test]
        fn test_empty_selection_is_rejected() {
            let dir = tempfile::tempdir().unwrap();
            let args = RunArgs {
                filter: Some("no_such_scenario".to_string()),
                ..offline_args(dir.path())
            };
            let err = quiet_runner().run(&args).unwrap_err();
            assert!(matches!(err, CliError::InvalidArgument { .. }));
            assert!(!dir.path().join("report.json").exists());
        }

        #[test]
        fn test_fail_fast_flag_reaches_runner() {
            let config = CliConfig::new().with_fail_fast(true);
            assert!(SuiteRunner::new(config).config().fail_fast);
        }
    }
}
