//! Terminal output for scenario runs

use crate::config::CliConfig;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use storeprobe::suite::RunObserver;
use storeprobe::{RunReport, ScenarioResult, TestStatus};

/// Prints per-scenario lines, a progress bar and the run summary on stderr
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    use_color: bool,
    quiet: bool,
    verbose: bool,
}

impl ProgressReporter {
    /// Reporter for the given CLI configuration
    #[must_use]
    pub fn new(config: &CliConfig) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color: config.color.should_color(),
            quiet: config.verbosity.is_quiet(),
            verbose: config.verbosity.is_verbose(),
        }
    }

    fn start_progress(&mut self, total: u64) {
        if self.quiet || !self.term.is_term() {
            return;
        }
        let bar = ProgressBar::new(total);
        if let Ok(template) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(template.progress_chars("=>-"));
        }
        self.progress_bar = Some(bar);
    }

    fn finish_progress(&mut self) {
        if let Some(bar) = self.progress_bar.take() {
            bar.finish_and_clear();
        }
    }

    /// Write a line above the progress bar
    fn line(&self, text: &str) {
        match &self.progress_bar {
            Some(bar) => bar.println(text),
            None => {
                let _ = self.term.write_line(text);
            }
        }
    }

    /// Status marker: symbols with color, words without
    #[must_use]
    pub fn marker(&self, status: TestStatus) -> String {
        if !self.use_color {
            return status.label().to_string();
        }
        match status {
            TestStatus::Passed => style("✓").green().to_string(),
            TestStatus::Failed => style("✗").red().to_string(),
            TestStatus::Skipped => style("○").yellow().to_string(),
            TestStatus::Error => style("✗").red().bold().to_string(),
        }
    }

    /// One line per finished scenario
    #[must_use]
    pub fn result_line(&self, result: &ScenarioResult) -> String {
        let mut line = format!(
            "{} {} ({:.2}s)",
            self.marker(result.status),
            result.name,
            result.duration.as_secs_f64()
        );
        if let Some(message) = result.message.as_deref().filter(|_| !result.status.is_passed()) {
            line.push_str("\n    ");
            line.push_str(message);
        }
        line
    }

    /// Print a header line
    pub fn header(&self, text: &str) {
        if self.quiet {
            return;
        }
        let text = if self.use_color {
            style(text).bold().to_string()
        } else {
            text.to_string()
        };
        self.line(&text);
    }

    /// Print an info line
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let marker = if self.use_color {
            style("ℹ").blue().to_string()
        } else {
            "INFO".to_string()
        };
        self.line(&format!("{marker} {message}"));
    }

    /// Summary line, colored by outcome
    #[must_use]
    pub fn summary_line(&self, report: &RunReport) -> String {
        let summary = report.summary();
        if !self.use_color {
            return summary;
        }
        if report.success() {
            style(summary).green().to_string()
        } else {
            style(summary).red().to_string()
        }
    }
}

impl RunObserver for ProgressReporter {
    fn on_start(&mut self, total: usize) {
        self.start_progress(total as u64);
    }

    fn on_scenario_start(&mut self, name: &str) {
        match &self.progress_bar {
            Some(bar) => bar.set_message(name.to_string()),
            None if self.verbose => self.line(&format!("→ {name}")),
            None => {}
        }
    }

    fn on_scenario_end(&mut self, result: &ScenarioResult) {
        if !self.quiet || !result.status.is_passed() {
            self.line(&self.result_line(result));
        }
        if let Some(bar) = &self.progress_bar {
            bar.inc(1);
        }
    }

    fn on_finish(&mut self, report: &RunReport) {
        self.finish_progress();
        let failures = report.failures();
        if !failures.is_empty() && !self.quiet {
            let _ = self.term.write_line("");
            let _ = self.term.write_line("Failures:");
            for result in failures {
                let _ = self.term.write_line(&format!(
                    "  {} {}: {}",
                    self.marker(result.status),
                    result.name,
                    result.message.as_deref().unwrap_or("")
                ));
            }
        }
        let _ = self.term.write_line(&self.summary_line(report));
    }
}
