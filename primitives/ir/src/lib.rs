// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! asyncgen Intermediate Representation (IR)
//!
//! This crate defines the structures shared by every stage of the generator:
//! the normalized AsyncAPI document, the schema tree, the lowered type model,
//! the client method surface derived from channels, and the service surface
//! that the forward direction turns back into channels.
//!
//! The IR is deliberately free of behaviour beyond rendering itself back into
//! an AsyncAPI JSON tree; loading, lowering, and mapping live in the compiler
//! crates.

pub mod client;
pub mod document;
pub mod pointer;
pub mod schema;
pub mod service;
pub mod type_model;

pub use client::*;
pub use document::*;
pub use schema::*;
pub use service::*;
pub use type_model::*;
