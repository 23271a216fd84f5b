// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Type Model Analysis
//!
//! Lowers the schemas of a normalized document into a graph of named type
//! definitions and checks that the graph is closed. Lowering owns the
//! document's components map for the duration of the run: inline structures
//! that need a name are added to it, so later stages see every type under a
//! component key.

use ir::{SpecDocument, TypeDefinition};
use registry::{RegistryError, TypeRegistry, TypeRegistryReader};
use thiserror::Error;
use types::UnsupportedSchemaType;

pub mod builder;
pub mod canonicalizer;
pub mod validator;

pub use builder::TypeModelBuilder;
pub use canonicalizer::ShapeIndex;
pub use validator::TypeGraphValidator;

/// Errors raised while lowering schemas
#[derive(Debug, Error)]
pub enum TypeModelError {
    /// A schema reference names no component
    #[error("unable to resolve reference '{reference}' used at {location}")]
    RefResolution {
        /// Pointer that was looked up
        reference: String,
        /// Schema path holding the reference
        location: String,
    },
    /// A primitive schema has no target mapping
    #[error("{source} at {location}")]
    UnsupportedSchemaType {
        /// Offending type/format pair
        #[source]
        source: UnsupportedSchemaType,
        /// Schema path of the primitive
        location: String,
    },
    /// A composition cannot be lowered
    #[error("invalid schema at {location}: {message}")]
    InvalidSchema {
        /// Schema path
        location: String,
        /// What is wrong
        message: String,
    },
    /// The lowered graph failed validation
    #[error("type graph is inconsistent: {}", .0.join("; "))]
    InconsistentGraph(Vec<String>),
    /// Registry bookkeeping failed
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result alias for type-model operations
pub type Result<T> = std::result::Result<T, TypeModelError>;

/// Output of one lowering run
#[derive(Debug, Clone)]
pub struct TypeModel {
    /// The document, with minted inline schemas added to its components
    pub document: SpecDocument,
    /// The lowered type graph
    pub registry: TypeRegistry,
}

/// Lower every schema and payload of `document`.
///
/// `pre_existing` definitions (authentication configs, for instance) are
/// registered first and keep their names. The document is consumed, so a
/// failed run leaves nothing half-updated behind.
pub fn build_types(document: SpecDocument, pre_existing: Vec<TypeDefinition>) -> Result<TypeModel> {
    let mut document = document;
    let SpecDocument { channels, components, .. } = &mut document;

    let mut builder = TypeModelBuilder::new(components, pre_existing)?;
    builder.lower_components()?;
    builder.lower_payloads(channels)?;
    let registry = builder.finish();

    let problems = TypeGraphValidator::new().validate(&registry);
    if !problems.is_empty() {
        return Err(TypeModelError::InconsistentGraph(problems));
    }

    tracing::debug!(types = registry.type_count(), "lowered type model");
    Ok(TypeModel { document, registry })
}
