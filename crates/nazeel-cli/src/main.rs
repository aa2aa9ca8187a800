//! Nazeel CLI: run the end-to-end UI suites
//!
//! ## Usage
//!
//! ```bash
//! nazeel list                                   # Suites and cases
//! nazeel run                                    # Every suite, in order
//! nazeel run -s guest_supplies --headed         # One suite, visible browser
//! nazeel run --fail-fast --report out/run.json  # Stop early, keep a JSON report
//! ```

use clap::Parser;
use nazeel_cli::{Cli, CliConfig, CliResult, Commands, Reporter, RunArgs};
use nazeel_e2e::{init_tracing, suites};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CliConfig::new()
        .with_verbosity(cli.verbose)
        .with_quiet(cli.quiet)
        .with_color(cli.color.into())
        .with_log_json(cli.log_json);
    init_tracing(config.verbosity, config.log_json);
    let reporter = Reporter::new(config.color.should_color(), config.quiet);

    let result = match cli.command {
        Commands::List => {
            print!("{}", reporter.render_list(&suites::all_suites()));
            Ok(true)
        }
        Commands::Run(args) => run_command(&reporter, &args).await,
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_command(reporter: &Reporter, args: &RunArgs) -> CliResult<bool> {
    let report = nazeel_cli::run(args).await?;
    reporter.print_summary(&report);
    if let Some(path) = &args.report {
        report.write_json(path)?;
        reporter.print_report_path(path);
    }
    Ok(report.success())
}
