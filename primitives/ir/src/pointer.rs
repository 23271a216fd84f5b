//! JSON-pointer helpers used to name locations inside a document.
//!
//! Locations double as keys for lowered payload types and as the origin
//! reported in error messages.

use crate::document::Direction;

/// Escape a single pointer segment (`~` → `~0`, `/` → `~1`).
pub fn escape_segment(segment: &str) -> String { segment.replace('~', "~0").replace('/', "~1") }

/// Pointer to a named component schema
pub fn component_schema(name: &str) -> String {
    format!("#/components/schemas/{}", escape_segment(name))
}

/// Pointer to a named component message
pub fn component_message(name: &str) -> String {
    format!("#/components/messages/{}", escape_segment(name))
}

/// Pointer to the payload of a named component message
pub fn message_payload(name: &str) -> String { format!("{}/payload", component_message(name)) }

/// Pointer to the inline response payload of a named component message
pub fn message_response_payload(name: &str) -> String {
    format!("{}/x-response/payload", component_message(name))
}

/// Pointer to the message of a channel operation, optionally one `oneOf` entry
pub fn channel_message(channel: &str, direction: Direction, index: Option<usize>) -> String {
    let base = format!("#/channels/{}/{}/message", escape_segment(channel), direction.as_str());
    match index {
        Some(index) => format!("{}/oneOf/{}", base, index),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_paths_are_escaped() {
        assert_eq!(
            channel_message("/rooms/{id}", Direction::Subscribe, Some(2)),
            "#/channels/~1rooms~1{id}/subscribe/message/oneOf/2"
        );
        assert_eq!(message_payload("a/b"), "#/components/messages/a~1b/payload");
    }
}
