// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Target Type System
//!
//! This crate owns the mapping between AsyncAPI scalar vocabulary and the
//! generator's primitive kinds, and from those kinds to Rust source text.
//! The mapping is table-driven: a declared `format` overrides the base `type`
//! when it is recognized, and falls back to the base type when it is not.
//! Only an unknown base `type` is an error.

use thiserror::Error;

/// Scalar vocabulary of the service language mapped to schemas.
pub mod builtin;
/// Schema `(type, format)` resolution tables.
pub mod primitive;
/// Type adapter trait for rendering lowered types as target-language text.
///
/// Emitters walk [`ir::TypeRef`] values and ask the adapter for the spelling of
/// each piece, so a different target language only needs another adapter.
pub mod type_adapter;

pub use builtin::builtin_schema;
pub use primitive::{resolve_path_parameter, resolve_primitive, PrimitiveResolution};
pub use type_adapter::{RustTypeAdapter, TypeAdapter};

/// A schema `type` (or `type`/`format` pair) with no target mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported AsyncAPI data type '{ty}'{}", format_suffix(.format))]
pub struct UnsupportedSchemaType {
    /// Declared `type`
    pub ty: String,
    /// Declared `format`, if any
    pub format: Option<String>,
}

fn format_suffix(format: &Option<String>) -> String {
    format.as_ref().map(|f| format!(" with format '{}'", f)).unwrap_or_default()
}
