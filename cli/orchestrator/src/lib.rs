// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Command-line front end for asyncgen.
//!
//! [`args`] declares the command line; [`commands`] merges it with the
//! configuration file and drives the pipeline in either direction.

use thiserror::Error;

pub mod args;
pub mod commands;

pub use args::{Cli, ClientArgs, Command, SpecArgs};
pub use commands::{flag_warnings, run, Target};

/// Errors surfaced by the `asyncgen` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration file could not be loaded
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Generation failed
    #[error(transparent)]
    Pipeline(#[from] pipeline::PipelineError),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
