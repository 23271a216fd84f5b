// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! High-level pipeline that turns AsyncAPI documents into Rust client
//! modules, and service declarations into AsyncAPI documents.
//!
//! ## Module Organization
//!
//! - `client_config` - Everything one client generation run needs
//! - `artifacts` - Generated files and the generators that produce them
//! - `assembler` - Picks and orders the artifacts of a client run
//! - `writer` - Commits artifacts to disk under an overwrite policy
//! - `orchestration` - Entry points for both directions

use thiserror::Error;

pub mod artifacts;
pub mod assembler;
pub mod client_config;
pub mod orchestration;
pub mod writer;

pub use artifacts::{ArtifactGenerator, ArtifactLocation, GeneratedArtifact, WriteMode};
pub use assembler::assemble;
pub use client_config::{ClientConfig, ClientConfigBuilder};
pub use orchestration::{
    compile_client, generate_client, generate_spec, ClientOptions, GenerationOutcome, SpecOptions,
};
pub use writer::{write_artifacts, OverwritePolicy, WriteError, WriteReport};

/// Convenient result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the codegen pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Generic message-based error.
    #[error("{0}")]
    Message(String),
    /// Error while loading a document or service declaration.
    #[error(transparent)]
    Normalize(#[from] adapters::NormalizeError),
    /// Error while lowering schemas into types.
    #[error(transparent)]
    TypeModel(#[from] analysis::TypeModelError),
    /// Error from semantic analysis.
    #[error(transparent)]
    Semantic(#[from] semantics::SemanticError),
    /// Error propagated from the codegen crate.
    #[error(transparent)]
    Codegen(#[from] codegen::CodegenError),
    /// Error while committing artifacts.
    #[error(transparent)]
    Write(#[from] WriteError),
    /// I/O error outside of artifact writing.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input document
    SpecFormat,
    /// Dangling `$ref` or undeclared type
    RefResolution,
    /// Required custom attribute absent or malformed
    MissingExtension,
    /// Schema type with no target mapping
    UnsupportedSchemaType,
    /// Array schema used as a path parameter
    ArrayPathParameter,
    /// Service dispatcher annotation problem
    DispatcherConfig,
    /// File system failure
    Io,
    /// Incomplete or inconsistent run configuration
    Configuration,
    /// Failure inside the generator itself
    Internal,
}

impl PipelineError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        use adapters::NormalizeError as N;
        use analysis::TypeModelError as T;
        use semantics::SemanticError as S;

        match self {
            PipelineError::Message(_) => ErrorKind::Configuration,
            PipelineError::Normalize(error) => match error {
                N::SpecFormat { .. } => ErrorKind::SpecFormat,
                N::RefResolution { .. } => ErrorKind::RefResolution,
                N::MissingExtension(_) => ErrorKind::MissingExtension,
                N::Io { .. } => ErrorKind::Io,
            },
            PipelineError::TypeModel(error) => match error {
                T::RefResolution { .. } | T::InconsistentGraph(_) => ErrorKind::RefResolution,
                T::UnsupportedSchemaType { .. } => ErrorKind::UnsupportedSchemaType,
                T::InvalidSchema { .. } | T::Registry(_) => ErrorKind::SpecFormat,
            },
            PipelineError::Semantic(error) => match error {
                S::DispatcherConfig(_) => ErrorKind::DispatcherConfig,
                S::ArrayPathParameter { .. } => ErrorKind::ArrayPathParameter,
                S::UnsupportedSchemaType { .. } => ErrorKind::UnsupportedSchemaType,
                S::RefResolution { .. } | S::UnknownType { .. } | S::MissingPayload(_) => {
                    ErrorKind::RefResolution
                }
            },
            PipelineError::Codegen(_) => ErrorKind::Internal,
            PipelineError::Write(_) | PipelineError::Io(_) => ErrorKind::Io,
        }
    }
}
