//! storeprobe CLI: run the Demo Web Shop suite from the command line.
//!
//! ```text
//! storeprobe run [--tag TAG]... [--filter TEXT] [--fail-fast] [--offline]
//! storeprobe list [--tag TAG]... [--filter TEXT]
//! storeprobe check-locators [PATH]
//! ```
//!
//! `run` exits with status 1 when any scenario fails or errors. The JSON
//! report lands in `<output>/report.json`.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{CheckLocatorsArgs, Cli, ColorArg, Commands, ListArgs, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;
pub use runner::{list_lines, locator_lines, resolve_settings, resolve_settings_with, selection, SuiteRunner};
