//! Event-identifier extraction
//!
//! A channel that multiplexes several message types names where the type tag
//! lives through the `x-event-identifier` extension:
//!
//! ```yaml
//! x-event-identifier:
//!   type: body      # or header
//!   path: event
//! ```
//!
//! The messages below are part of the tool's observable behaviour; keep them
//! stable.

use ir::{EventIdentifier, EventIdentifierKind, EVENT_IDENTIFIER_EXTENSION};
use serde_json::{Map, Value};
use thiserror::Error;

/// A missing or malformed event identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    /// The channel has no `x-event-identifier` attribute
    #[error("x-event-identifier attribute is not found in the AsyncAPI specification (channel '{channel}')")]
    AttributeNotFound {
        /// Channel path
        channel: String,
    },
    /// The attribute has no `type` field
    #[error("type attribute is not found within the attribute x-event-identifier in the AsyncAPI specification (channel '{channel}')")]
    TypeNotFound {
        /// Channel path
        channel: String,
    },
    /// The `type` field is neither `header` nor `body`
    #[error("header or body is not provided as the value of type attribute within the attribute x-event-identifier in the AsyncAPI specification (channel '{channel}')")]
    InvalidType {
        /// Channel path
        channel: String,
        /// Value that was found
        found: String,
    },
    /// The attribute has no usable `path` field
    #[error("path attribute is not found within the attribute x-event-identifier in the AsyncAPI specification (channel '{channel}')")]
    PathNotFound {
        /// Channel path
        channel: String,
    },
}

/// Read and validate the event identifier of a channel item.
///
/// Returns `Ok(None)` when the attribute is absent and `required` is false.
pub fn extract_event_identifier(
    channel_item: &Map<String, Value>,
    channel: &str,
    required: bool,
) -> Result<Option<EventIdentifier>, ExtensionError> {
    let attribute = match channel_item.get(EVENT_IDENTIFIER_EXTENSION) {
        Some(Value::Object(attribute)) => attribute,
        Some(_) => return Err(ExtensionError::TypeNotFound { channel: channel.to_string() }),
        None if required => {
            return Err(ExtensionError::AttributeNotFound { channel: channel.to_string() })
        }
        None => return Ok(None),
    };

    let kind = match attribute.get("type") {
        None => return Err(ExtensionError::TypeNotFound { channel: channel.to_string() }),
        Some(Value::String(kind)) if kind == "header" => EventIdentifierKind::Header,
        Some(Value::String(kind)) if kind == "body" => EventIdentifierKind::Body,
        Some(other) => {
            return Err(ExtensionError::InvalidType {
                channel: channel.to_string(),
                found: other.as_str().map(str::to_string).unwrap_or_else(|| other.to_string()),
            })
        }
    };

    let path = attribute
        .get("path")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ExtensionError::PathNotFound { channel: channel.to_string() })?;

    Ok(Some(EventIdentifier { kind, path: path.to_string() }))
}
