//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// storeprobe: Demo Web Shop UI test suite
#[derive(Parser, Debug)]
#[command(name = "storeprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except failures and the summary
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against the shop
    Run(RunArgs),

    /// List scenarios in execution order
    List(ListArgs),

    /// Parse a locator file and print its entries
    CheckLocators(CheckLocatorsArgs),
}

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Only run scenarios carrying this tag (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Only run scenarios whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Stop at the first failed scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Settings file (YAML)
    #[arg(short, long, env = "STOREPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Shop base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory for credentials, bug log, product names and the report
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable the chromium sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Path to the chromium binary
    #[arg(long)]
    pub chromium: Option<PathBuf>,

    /// Run against the built-in in-memory shop instead of a browser
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the list command
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only list scenarios carrying this tag (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Only list scenarios whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the check-locators command
#[derive(Args, Debug, Default)]
pub struct CheckLocatorsArgs {
    /// Locator file (JSON); the bundled registry when omitted
    pub path: Option<PathBuf>,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Always use colors
    Always,
    /// Auto-detect
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Always => Self::Always,
            ColorArg::Auto => Self::Auto,
            ColorArg::Never => Self::Never,
        }
    }
}
