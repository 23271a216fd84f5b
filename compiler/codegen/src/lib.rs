// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Rust source emitters for AsyncAPI clients.
//!
//! This crate turns the lowered type graph and the derived channel surfaces
//! into Rust source text: a types module, a client module with one client
//! struct per channel, an optional utilities module, and a test skeleton.
//! It does not touch the file system; writing artifacts is the pipeline's job.

pub mod auth;
pub mod generators;

use ir::ChannelSurface;
use registry::TypeRegistryReader;
use thiserror::Error;

pub use auth::{select_auth, AuthScheme, AuthSelection, KeyLocation};
pub use generators::{
    ClientGenerator, TestSkeleton, TestSkeletonGenerator, TypesGenerator, UtilsGenerator,
};

/// Banner written at the top of every overwritable module.
pub const GENERATED_BANNER: &str =
    "// AUTO-GENERATED by asyncgen. Changes are lost on the next generation run.";

/// Error type for code generation operations in this crate.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Formatting error when building generated source.
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
    /// A channel path template could not be scanned for placeholders.
    #[error("invalid channel path template: {0}")]
    Template(#[from] regex::Error),
    /// A surface references a type the registry does not hold.
    #[error("generated code references unknown type `{0}`")]
    UnknownType(String),
}

/// Convenient result type for codegen functions in this crate.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Everything an emitter may look at.
#[derive(Clone, Copy)]
pub struct GenerationInput<'a> {
    /// Lowered type graph
    pub registry: &'a dyn TypeRegistryReader,
    /// One surface per channel
    pub surfaces: &'a [ChannelSurface],
    /// Selected authentication scheme
    pub auth: Option<&'a AuthScheme>,
    /// URL used when the caller passes none
    pub default_service_url: Option<&'a str>,
    /// Whether a test skeleton is emitted alongside the client
    pub include_tests: bool,
}

/// Produces the text of one generated module.
///
/// An empty string means the module has nothing to say and should not be
/// written at all.
pub trait CodeGenerator {
    /// Render the module.
    fn generate(&self, input: &GenerationInput<'_>) -> Result<String>;
}

/// Which helper functions the generated client calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UtilsUsage {
    /// Percent-encoding of path parameters and query keys
    pub encode: bool,
    /// Reading and writing dotted field paths in JSON values
    pub field_paths: bool,
}

impl UtilsUsage {
    /// Work out which helpers `input` needs.
    pub fn of(input: &GenerationInput<'_>) -> Self {
        let query_key = matches!(input.auth, Some(AuthScheme::ApiKey { location: KeyLocation::Query, .. }));
        UtilsUsage {
            encode: query_key || input.surfaces.iter().any(|s| !s.path_params.is_empty()),
            field_paths: input.surfaces.iter().any(|s| s.dispatcher.is_some()),
        }
    }

    /// Whether no helper is needed
    pub fn is_empty(&self) -> bool { !self.encode && !self.field_paths }
}

/// Trim trailing whitespace from each line and drop trailing blank lines.
/// Always ensures the returned string ends with a single newline when not empty.
pub fn clean_generated_source(src: &str) -> String {
    let mut lines: Vec<String> = src.lines().map(|l| l.trim_end().to_string()).collect();

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_generated_source() {
        assert_eq!(clean_generated_source("a  \nb\n\n\n"), "a\nb\n");
        assert_eq!(clean_generated_source("\n\n"), "");
    }
}
