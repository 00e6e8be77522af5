//! appctl - manage hosted application containers

#![cfg_attr(test, allow(clippy::expect_used))]

use std::process::ExitCode;

use appctl_cli::cli::Cli;
use appctl_cli::logging;
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.run() {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
