// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Specification Adapter Library
//!
//! Loads AsyncAPI documents (JSON or YAML) and service declarations into the
//! shared IR. Loading happens in three passes over a `serde_json::Value` tree:
//!
//! 1. external `$ref`s are followed and their targets imported into the
//!    document's own components section,
//! 2. the tree is converted into typed IR with every error located by a
//!    JSON pointer,
//! 3. local references and required extensions are validated.
//!
//! Nothing is returned until all three passes succeed.

use std::path::{Path, PathBuf};

use ir::{ServiceDefinition, SpecDocument};
use thiserror::Error;

pub mod document;
pub mod event_identifier;
pub mod format;
pub mod refs;
pub mod schema;
pub mod service;

pub use event_identifier::{extract_event_identifier, ExtensionError};
pub use format::SourceFormat;

/// Errors that can occur while loading a specification or service declaration
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The input is not a well-formed document
    #[error("invalid specification at {location}: {message}")]
    SpecFormat {
        /// Pointer (or file) where the problem was found
        location: String,
        /// What is wrong
        message: String,
    },
    /// A `$ref` points at nothing
    #[error("unable to resolve reference '{reference}' used at {location}")]
    RefResolution {
        /// The reference as written
        reference: String,
        /// Pointer of the object holding the reference
        location: String,
    },
    /// A required custom extension is absent or malformed
    #[error(transparent)]
    MissingExtension(#[from] ExtensionError),
    /// The document (or an external reference target) could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl NormalizeError {
    pub(crate) fn format(location: impl Into<String>, message: impl Into<String>) -> Self {
        NormalizeError::SpecFormat { location: location.into(), message: message.into() }
    }

    pub(crate) fn unresolved(reference: impl Into<String>, location: impl Into<String>) -> Self {
        NormalizeError::RefResolution { reference: reference.into(), location: location.into() }
    }
}

/// Result alias for adapter operations
pub type Result<T> = std::result::Result<T, NormalizeError>;

/// Trait for loaders that translate a source file into the IR
///
/// Each input dialect implements this trait;
/// orchestration only sees the trait.
pub trait SpecAdapter {
    /// Name of the dialect (e.g. "asyncapi")
    fn name(&self) -> &'static str;

    /// Load and normalize the document at `path`
    fn load(&self, path: &Path) -> Result<SpecDocument>;

    /// Whether this adapter understands the given file
    fn supports(&self, path: &Path) -> bool { SourceFormat::from_path(path).is_some() }
}

/// Adapter for AsyncAPI 2.x documents
#[derive(Debug, Default, Clone, Copy)]
pub struct AsyncApiAdapter;

impl SpecAdapter for AsyncApiAdapter {
    fn name(&self) -> &'static str { "asyncapi" }

    fn load(&self, path: &Path) -> Result<SpecDocument> { normalize(path) }
}

/// Load, resolve, and validate the AsyncAPI document at `path`
pub fn normalize(path: &Path) -> Result<SpecDocument> {
    let text = read_file(path)?;
    let format = SourceFormat::from_path(path);
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let document = normalize_str(&text, format, &base_dir)?;
    tracing::debug!(
        path = %path.display(),
        channels = document.channels.len(),
        schemas = document.components.schemas.len(),
        "normalized specification"
    );
    Ok(document)
}

/// Normalize a document held in memory
///
/// `format` may be `None`, in which case JSON is tried first and then YAML.
/// External references are resolved relative to `base_dir`.
pub fn normalize_str(
    text: &str,
    format: Option<SourceFormat>,
    base_dir: &Path,
) -> Result<SpecDocument> {
    let mut root = format::parse_text(text, format)?;
    refs::inline_external_refs(&mut root, base_dir)?;
    let document = document::parse_document(&root)?;
    document::validate_references(&document)?;
    Ok(document)
}

/// Load the service declaration at `path`
pub fn load_service(path: &Path) -> Result<ServiceDefinition> {
    let text = read_file(path)?;
    let root = format::parse_text(&text, SourceFormat::from_path(path))?;
    service::parse_service(root)
}

pub(crate) fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|source| NormalizeError::Io { path: path.to_path_buf(), source })
}
