// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Logging setup for the asyncgen tools.
//!
//! Library crates only emit `tracing` events; binaries call [`init`] once to
//! decide where those events go.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Filter directive used when neither `RUST_LOG` nor a level is usable.
pub const DEFAULT_LEVEL: &str = "warn";

/// Install a `fmt` subscriber writing to stderr, or appending to `file`.
///
/// `RUST_LOG` takes precedence over `level`. Returns `false` when a global
/// subscriber was already installed, in which case nothing changes. A log
/// file that cannot be opened falls back to stderr and says so.
pub fn init(level: &str, file: Option<&Path>) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let mut open_error = None;
    let opened = file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(handle) => Some(handle),
            Err(e) => {
                open_error = Some((path.display().to_string(), e));
                None
            }
        }
    });
    let to_file = opened.is_some();
    let writer = match opened {
        Some(handle) => BoxMakeWriter::new(Mutex::new(handle)),
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(!to_file)
        .with_target(true)
        .with_filter(filter);

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        return false;
    }
    if let Some((path, error)) = open_error {
        tracing::warn!(%path, %error, "cannot open log file; logging to stderr");
    }
    true
}
