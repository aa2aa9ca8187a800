//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Nazeel end-to-end suite runner
#[derive(Parser, Debug)]
#[command(name = "nazeel")]
#[command(author, version, about = "Run the Nazeel E2E UI suites against a live environment")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress the console summary)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run suites in a browser
    Run(RunArgs),

    /// List suites and their cases
    List,
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Suite to run; repeat for several (default: all, in run order)
    #[arg(short, long = "suite", value_name = "NAME")]
    pub suites: Vec<String>,

    /// YAML configuration file
    #[arg(short, long, env = "NAZEEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Skip remaining cases after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Write a JSON report to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::parse_from(["nazeel", "run"]);
        match cli.command {
            Commands::Run(args) => {
                assert!(args.suites.is_empty());
                assert!(!args.headed);
                assert!(!args.fail_fast);
                assert!(args.report.is_none());
            }
            Commands::List => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_repeated_suites() {
        let cli = Cli::parse_from([
            "nazeel",
            "run",
            "--suite",
            "guest_supplies",
            "-s",
            "supplies_order",
            "--fail-fast",
            "--report",
            "out/report.json",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.suites, ["guest_supplies", "supplies_order"]);
        assert!(args.fail_fast);
        assert_eq!(args.report.unwrap(), PathBuf::from("out/report.json"));
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["nazeel", "-vv", "--log-json", "list"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_color_conversion() {
        use crate::config::ColorChoice;

        let never: ColorChoice = ColorArg::Never.into();
        assert_eq!(never, ColorChoice::Never);
        let auto: ColorChoice = ColorArg::Auto.into();
        assert_eq!(auto, ColorChoice::Auto);
    }
}
