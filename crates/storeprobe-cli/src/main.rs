//! storeprobe binary

use clap::Parser;
use std::process::ExitCode;
use storeprobe_cli::{list_lines, locator_lines, Cli, CliConfig, CliResult, Commands, SuiteRunner, Verbosity};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    config.init_logging();

    match run(cli, config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let fail_fast = matches!(&cli.command, Commands::Run(args) if args.fail_fast);
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_fail_fast(fail_fast)
}

fn run(cli: Cli, config: CliConfig) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Run(args) => {
            let report = SuiteRunner::new(config).run(&args)?;
            Ok(if report.success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::List(args) => {
            for line in list_lines(&args) {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckLocators(args) => {
            for line in locator_lines(&args)? {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
