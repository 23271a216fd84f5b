//! Client method surface derived from channels.

use serde::{Deserialize, Serialize};

use crate::document::{DispatcherConfig, EventIdentifier, ResponseType};
use crate::type_model::TypeRef;

/// Everything the client emitter needs to know about one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSurface {
    /// Channel path as declared
    pub path: String,
    /// Client type name for this channel
    pub client_name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Path parameters in declaration order
    pub path_params: Vec<ParamBinding>,
    /// Routing configuration, when the channel multiplexes messages
    pub dispatcher: Option<DispatcherConfig>,
    /// Where the tag is carried, when the channel multiplexes messages
    pub event_identifier: Option<EventIdentifier>,
    /// One method per publish-side message tag
    pub methods: Vec<ClientMethod>,
}

/// A generated client method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMethod {
    /// Method identifier
    pub name: String,
    /// Logical message-type tag
    pub tag: String,
    /// Doc text
    pub description: Option<String>,
    /// Channel path parameters bound by this method, in declaration order
    pub path_params: Vec<ParamBinding>,
    /// Request payload parameter
    pub payload: Option<ParamBinding>,
    /// What the method returns
    pub returns: ReturnShape,
}

impl ClientMethod {
    /// Number of request parameters the method takes besides path bindings
    pub fn parameter_count(&self) -> usize { usize::from(self.payload.is_some()) }

    /// Response-type tag implied by the return shape
    pub fn response_type(&self) -> Option<ResponseType> {
        match self.returns {
            ReturnShape::None => None,
            ReturnShape::Direct { .. } => Some(ResponseType::SimpleRpc),
            ReturnShape::Stream { .. } => Some(ResponseType::Streaming),
        }
    }
}

/// A bound parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamBinding {
    /// Target identifier
    pub name: String,
    /// Name as written in the specification
    pub wire_name: String,
    /// Parameter type
    pub ty: TypeRef,
}

/// Return type of a client method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReturnShape {
    /// Fire-and-forget
    None,
    /// A single reply with the given tag and type
    Direct {
        /// Tag of the reply message
        tag: String,
        /// Reply type
        ty: TypeRef,
    },
    /// A lazy sequence of replies
    Stream {
        /// Tag of the reply messages
        tag: String,
        /// Element type
        ty: TypeRef,
    },
}
