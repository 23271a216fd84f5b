// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Channel and operation mapping.
//!
//! Two directions share this crate:
//!
//! - forward: a service declaration becomes AsyncAPI channels, one
//!   multiplexed channel per service with one message tag per `on<Tag>`
//!   remote method;
//! - reverse: the channels of a normalized document become client method
//!   surfaces, one method per publish-side message tag.
//!
//! Both directions agree on the same conventions (dispatcher key carried in
//! `x-event-identifier`, response metadata in `x-response`), so a surface
//! survives a forward-then-reverse round trip.

use thiserror::Error;
use types::UnsupportedSchemaType;

pub mod channel_mapper;
pub mod dispatcher;
pub mod method_surface;
pub mod shape;

pub use channel_mapper::{derive_channels, derive_document, DerivedChannels, ON_EVENT_PREFIX};
pub use dispatcher::{extract_dispatcher, DispatcherConfigError};
pub use method_surface::{derive_client_methods, derive_surfaces};
pub use shape::{classify, RecognizedShape};

/// Errors that can occur while mapping channels and methods.
#[derive(Debug, Error)]
pub enum SemanticError {
    /// The service carries no usable dispatcher configuration
    #[error(transparent)]
    DispatcherConfig(#[from] DispatcherConfigError),
    /// A channel path parameter is declared as an array
    #[error("path parameter '{parameter}' of channel '{channel}' is an array; only scalar path parameters are supported")]
    ArrayPathParameter {
        /// Channel path
        channel: String,
        /// Parameter name as declared
        parameter: String,
    },
    /// A type has no mapping in the current direction
    #[error("{source} ({location})")]
    UnsupportedSchemaType {
        /// Offending type
        #[source]
        source: UnsupportedSchemaType,
        /// What was being mapped
        location: String,
    },
    /// A schema reference inside a path parameter names nothing
    #[error("unable to resolve reference '{reference}' used at {location}")]
    RefResolution {
        /// Pointer that was looked up
        reference: String,
        /// Where it was used
        location: String,
    },
    /// A method signature names a type the service does not declare
    #[error("remote method '{method}' uses undeclared type '{type_name}'")]
    UnknownType {
        /// Method name
        method: String,
        /// Missing type
        type_name: String,
    },
    /// A payload that lowering should have bound is missing
    #[error("no lowered type for payload at {0}")]
    MissingPayload(String),
}

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, SemanticError>;
