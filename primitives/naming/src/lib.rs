// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Naming utilities
//!
//! Turns arbitrary specification strings (schema keys, property names, path
//! parameters, message tags) into collision-free Rust identifiers and output
//! file names. Every stage that mints a name goes through a [`NameResolver`];
//! a fresh resolver is created for each generation run so no state leaks
//! between runs.

pub mod casing;
pub mod files;
pub mod resolver;
pub mod template;

pub use casing::{
    capitalize, channel_label, escape_keyword, split_words, to_pascal_case, to_snake_case,
};
pub use files::resolve_file_name;
pub use resolver::{Casing, NameResolver};
pub use template::{placeholders, Placeholder};
