//! Nazeel CLI library
//!
//! Argument parsing, the live runner and console output behind the `nazeel`
//! binary.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, RunArgs};
pub use config::{CliConfig, ColorChoice};
pub use error::{CliError, CliResult};
pub use output::Reporter;
pub use runner::{load_config, run, run_suites, RunReport};
