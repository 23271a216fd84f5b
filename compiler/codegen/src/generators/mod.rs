//! Emitters for the modules of a generated client crate.
//!
//! Each generator renders one module from a [`GenerationInput`](crate::GenerationInput);
//! an empty result means the module is not needed.

/// Rust doc comments for generated items
pub mod doc_comment;

/// Message payload and schema types
pub mod types;
pub use types::TypesGenerator;

/// Connection-oriented clients
pub mod client;
pub use client::ClientGenerator;

mod runtime;

/// Helpers called by the clients
pub mod utils;
pub use utils::UtilsGenerator;

/// Ignored connection tests and their config file
pub mod test_skeleton;
pub use test_skeleton::{TestSkeleton, TestSkeletonGenerator};
