// SPDX-License-Identifier: CC0-1.0

//! asyncgen umbrella crate.
//!
//! This crate primarily serves as the workspace root and re-exports the
//! pipeline entry points so the generator can be embedded as a library.
//!
//! All functional code lives in the workspace member crates under
//! directories such as `adapters`, `compiler`, and `primitives`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![doc(test(attr(warn(unused))))]

pub use pipeline::{generate_client, generate_spec, ClientOptions, PipelineError, SpecOptions};

/// Miscellaneous metadata about the asyncgen workspace.
pub mod asyncgen_meta {
    /// Version string for the umbrella crate, as reported by Cargo.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
