//! Normalized AsyncAPI document
//!
//! The document is produced once by the normalizer. After that only the
//! components map grows, and only while the type model is being built.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::schema::Schema;

/// Extension attribute that names where the message tag lives.
pub const EVENT_IDENTIFIER_EXTENSION: &str = "x-event-identifier";
/// Extension attribute that names the stream correlation field.
pub const STREAM_ID_EXTENSION: &str = "x-dispatcher-stream-id";
/// Message extension carrying the response target.
pub const RESPONSE_EXTENSION: &str = "x-response";
/// Message extension carrying the response-type tag.
pub const RESPONSE_TYPE_EXTENSION: &str = "x-response-type";
/// AsyncAPI version written by the forward direction.
pub const ASYNCAPI_VERSION: &str = "2.5.0";

/// Root of a normalized specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecDocument {
    /// Declared `asyncapi` version string
    pub asyncapi: String,
    /// `info` block
    pub info: Info,
    /// Servers in declaration order
    pub servers: Vec<Server>,
    /// Channels in declaration order
    pub channels: Vec<Channel>,
    /// Reusable definitions
    pub components: Components,
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// Free-text description
    pub description: Option<String>,
}

/// A server entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// Key under `servers`
    pub name: String,
    /// Connection URL
    pub url: String,
    /// Protocol (`ws`, `wss`, ...)
    pub protocol: String,
    /// Names of the security schemes this server requires
    pub security: Vec<String>,
}

/// An addressable channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel path, possibly with `{name}` placeholders
    pub path: String,
    /// Free-text description
    pub description: Option<String>,
    /// Declared path parameters in declaration order
    pub parameters: Vec<ChannelParameter>,
    /// Client-to-server operation
    pub publish: Option<Operation>,
    /// Server-to-client operation
    pub subscribe: Option<Operation>,
    /// Where the message tag lives, when the channel multiplexes messages
    pub event_identifier: Option<EventIdentifier>,
    /// Stream correlation field, when declared
    pub stream_id: Option<String>,
}

/// A declared channel path parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelParameter {
    /// Parameter name as written in the path
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Parameter schema
    pub schema: Schema,
}

/// Operation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Client to server
    Publish,
    /// Server to client
    Subscribe,
}

impl Direction {
    /// Key used for this direction inside a channel
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Publish => "publish",
            Direction::Subscribe => "subscribe",
        }
    }
}

/// A directional operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// `operationId`, if declared
    pub operation_id: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Carried message or message union
    pub message: OperationMessage,
}

/// The message carried by an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperationMessage {
    /// A single message
    Single(MessageRef),
    /// A `oneOf` union of messages multiplexed over the channel
    OneOf(Vec<MessageRef>),
}

impl OperationMessage {
    /// Whether this message needs a dispatcher to tell variants apart
    pub fn is_multiplexed(&self) -> bool { matches!(self, OperationMessage::OneOf(_)) }

    /// Message references in declaration order
    pub fn variants(&self) -> Vec<&MessageRef> {
        match self {
            OperationMessage::Single(message) => vec![message],
            OperationMessage::OneOf(messages) => messages.iter().collect(),
        }
    }
}

/// A message reference or an inline message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageRef {
    /// Reference to `components.messages.<name>`
    Reference(String),
    /// Message declared in place
    Inline(Message),
}

/// A message definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Message {
    /// Declared `name`, if any
    pub name: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Payload schema
    pub payload: Option<Schema>,
    /// Response metadata from `x-response` / `x-response-type`
    pub response: Option<ResponseSpec>,
}

/// Response metadata attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// Response-type tag
    pub kind: ResponseType,
    /// What the response carries
    pub target: ResponseTarget,
}

/// Response-type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseType {
    /// Exactly one reply
    #[serde(rename = "simple-rpc")]
    SimpleRpc,
    /// A continuous sequence of replies
    #[serde(rename = "streaming")]
    Streaming,
}

impl ResponseType {
    /// Wire value of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::SimpleRpc => "simple-rpc",
            ResponseType::Streaming => "streaming",
        }
    }

    /// Parse a wire value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "simple-rpc" => Some(ResponseType::SimpleRpc),
            "streaming" => Some(ResponseType::Streaming),
            _ => None,
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Target of `x-response`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponseTarget {
    /// Reply is the named component message
    Message(String),
    /// Reply payload is declared in place
    Payload(Schema),
}

/// Reusable definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Components {
    /// Named schemas
    pub schemas: BTreeMap<String, Schema>,
    /// Named messages
    pub messages: BTreeMap<String, Message>,
    /// Named security schemes
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

impl Components {
    /// Whether no definitions are present
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.messages.is_empty() && self.security_schemes.is_empty()
    }
}

/// A security scheme declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    /// `type` (`httpApiKey`, `apiKey`, `http`, `userPassword`, ...)
    pub kind: String,
    /// `scheme` for `http` schemes (`bearer`, `basic`)
    pub scheme: Option<String>,
    /// Key name for API-key schemes
    pub name: Option<String>,
    /// Key location for API-key schemes (`header`, `query`, `user`, `password`)
    pub location: Option<String>,
    /// Free-text description
    pub description: Option<String>,
}

/// Where the message tag of a multiplexed channel is found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventIdentifier {
    /// Header or body
    pub kind: EventIdentifierKind,
    /// Header name or body field path
    pub path: String,
}

/// Location kind of the event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventIdentifierKind {
    /// Tag carried in a message header
    Header,
    /// Tag carried in the message body
    Body,
}

impl EventIdentifierKind {
    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            EventIdentifierKind::Header => "header",
            EventIdentifierKind::Body => "body",
        }
    }
}

/// Routing configuration for multiplexed channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Field used to route a payload to its message tag
    pub key: String,
    /// Field used to correlate replies with requests, if any
    pub stream_id: Option<String>,
}

impl DispatcherConfig {
    /// Routing configuration recorded on a channel
    pub fn for_channel(channel: &Channel) -> Option<Self> {
        channel
            .event_identifier
            .as_ref()
            .map(|id| DispatcherConfig { key: id.path.clone(), stream_id: channel.stream_id.clone() })
    }
}

impl SpecDocument {
    /// Look up a channel by path
    pub fn channel(&self, path: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.path == path)
    }

    /// Render the document as an AsyncAPI JSON tree
    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        root.insert("asyncapi".to_string(), json!(self.asyncapi));

        let mut info = Map::new();
        info.insert("title".to_string(), json!(self.info.title));
        info.insert("version".to_string(), json!(self.info.version));
        if let Some(description) = &self.info.description {
            info.insert("description".to_string(), json!(description));
        }
        root.insert("info".to_string(), Value::Object(info));

        if !self.servers.is_empty() {
            let mut servers = Map::new();
            for server in &self.servers {
                let mut entry = Map::new();
                entry.insert("url".to_string(), json!(server.url));
                entry.insert("protocol".to_string(), json!(server.protocol));
                if !server.security.is_empty() {
                    let requirements: Vec<Value> =
                        server.security.iter().map(|name| json!({ name.clone(): [] })).collect();
                    entry.insert("security".to_string(), Value::Array(requirements));
                }
                servers.insert(server.name.clone(), Value::Object(entry));
            }
            root.insert("servers".to_string(), Value::Object(servers));
        }

        let mut channels = Map::new();
        for channel in &self.channels {
            channels.insert(channel.path.clone(), channel.to_value());
        }
        root.insert("channels".to_string(), Value::Object(channels));

        if !self.components.is_empty() {
            root.insert("components".to_string(), self.components.to_value());
        }
        Value::Object(root)
    }
}

impl Channel {
    /// Render the channel item
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(description) = &self.description {
            map.insert("description".to_string(), json!(description));
        }
        if !self.parameters.is_empty() {
            let mut params = Map::new();
            for parameter in &self.parameters {
                let mut entry = Map::new();
                if let Some(description) = &parameter.description {
                    entry.insert("description".to_string(), json!(description));
                }
                entry.insert("schema".to_string(), parameter.schema.to_value());
                params.insert(parameter.name.clone(), Value::Object(entry));
            }
            map.insert("parameters".to_string(), Value::Object(params));
        }
        if let Some(publish) = &self.publish {
            map.insert("publish".to_string(), publish.to_value());
        }
        if let Some(subscribe) = &self.subscribe {
            map.insert("subscribe".to_string(), subscribe.to_value());
        }
        if let Some(identifier) = &self.event_identifier {
            map.insert(
                EVENT_IDENTIFIER_EXTENSION.to_string(),
                json!({ "type": identifier.kind.as_str(), "path": identifier.path }),
            );
        }
        if let Some(stream_id) = &self.stream_id {
            map.insert(STREAM_ID_EXTENSION.to_string(), json!(stream_id));
        }
        Value::Object(map)
    }
}

impl Operation {
    /// Render the operation object
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(id) = &self.operation_id {
            map.insert("operationId".to_string(), json!(id));
        }
        if let Some(description) = &self.description {
            map.insert("description".to_string(), json!(description));
        }
        let message = match &self.message {
            OperationMessage::Single(message) => message.to_value(),
            OperationMessage::OneOf(messages) => {
                json!({ "oneOf": messages.iter().map(MessageRef::to_value).collect::<Vec<_>>() })
            }
        };
        map.insert("message".to_string(), message);
        Value::Object(map)
    }
}

impl MessageRef {
    /// Render a `$ref` or the inline message
    pub fn to_value(&self) -> Value {
        match self {
            MessageRef::Reference(name) => json!({ "$ref": crate::pointer::component_message(name) }),
            MessageRef::Inline(message) => message.to_value(),
        }
    }
}

impl Message {
    /// Render the message object, including response extensions
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(name) = &self.name {
            map.insert("name".to_string(), json!(name));
        }
        if let Some(description) = &self.description {
            map.insert("description".to_string(), json!(description));
        }
        if let Some(payload) = &self.payload {
            map.insert("payload".to_string(), payload.to_value());
        }
        if let Some(response) = &self.response {
            let target = match &response.target {
                ResponseTarget::Message(name) => {
                    json!({ "$ref": crate::pointer::component_message(name) })
                }
                ResponseTarget::Payload(schema) => json!({ "payload": schema.to_value() }),
            };
            map.insert(RESPONSE_EXTENSION.to_string(), target);
            map.insert(RESPONSE_TYPE_EXTENSION.to_string(), json!(response.kind.as_str()));
        }
        Value::Object(map)
    }
}

impl Components {
    /// Render the components object, omitting empty sections
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if !self.schemas.is_empty() {
            let schemas: Map<String, Value> =
                self.schemas.iter().map(|(k, v)| (k.clone(), v.to_value())).collect();
            map.insert("schemas".to_string(), Value::Object(schemas));
        }
        if !self.messages.is_empty() {
            let messages: Map<String, Value> =
                self.messages.iter().map(|(k, v)| (k.clone(), v.to_value())).collect();
            map.insert("messages".to_string(), Value::Object(messages));
        }
        if !self.security_schemes.is_empty() {
            let mut schemes = Map::new();
            for (name, scheme) in &self.security_schemes {
                let mut entry = Map::new();
                entry.insert("type".to_string(), json!(scheme.kind));
                if let Some(scheme_name) = &scheme.scheme {
                    entry.insert("scheme".to_string(), json!(scheme_name));
                }
                if let Some(key) = &scheme.name {
                    entry.insert("name".to_string(), json!(key));
                }
                if let Some(location) = &scheme.location {
                    entry.insert("in".to_string(), json!(location));
                }
                if let Some(description) = &scheme.description {
                    entry.insert("description".to_string(), json!(description));
                }
                schemes.insert(name.clone(), Value::Object(entry));
            }
            map.insert("securitySchemes".to_string(), Value::Object(schemes));
        }
        Value::Object(map)
    }
}
