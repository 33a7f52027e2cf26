//! Command-line interface for the route audit.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod compare;
mod error;
mod logging;
mod picker;

pub use error::CliError;

use compare::{CompareArgs, run_compare};

const ARG_XML: &str = "xml";
const ARG_DATABASE: &str = "database";
const ARG_OUTPUT_DIR: &str = "output-dir";
const ENV_XML: &str = "ITINERARI_CMDS_COMPARE_XML";
const ENV_OUTPUT_DIR: &str = "ITINERARI_CMDS_COMPARE_OUTPUT_DIR";

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
/// Returns a [`CliError`] when arguments or configuration are invalid, when
/// the output files cannot be created, or when the comparison did not run.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Compare(args) => run_compare(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "itinerari",
    about = "Audit interlocking routes between the XML export and the database",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compare the XML routes of one plant against the database.
    Compare(CompareArgs),
}

#[cfg(test)]
mod tests;
