// SPDX-License-Identifier: CC0-1.0

//! asyncgen command-line entry point.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]

use std::process::ExitCode;

use asyncgen_cli::{commands, Cli};
use clap::Parser;
use config::Config;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load_default(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.logging.level, config.logging.file.as_deref());

    match commands::run(&cli.command, &config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "generation failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
