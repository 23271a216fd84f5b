//! AsyncAPI Document Converter
//!
//! Converts a resolved JSON tree into a [`SpecDocument`]. The stable parts of
//! the format (info, servers, security schemes) go through `Raw*` serde
//! structs; channels, messages and schemas are walked by hand so that every
//! error can point at the exact location in the input.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use ir::pointer::{self, escape_segment};
use ir::{
    Channel, ChannelParameter, Components, Direction, Info, Message, MessageRef, Operation,
    OperationMessage, ResponseSpec, ResponseTarget, ResponseType, Schema, SecurityScheme, Server,
    SpecDocument, RESPONSE_EXTENSION, RESPONSE_TYPE_EXTENSION, STREAM_ID_EXTENSION,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::event_identifier::extract_event_identifier;
use crate::schema::{kind_of, parse_schema, string_field, unescape_segment};
use crate::{NormalizeError, Result};

const MESSAGE_REF_PREFIX: &str = "#/components/messages/";
const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";

/// Raw `info` object
#[derive(Debug, Clone, Deserialize)]
struct RawInfo {
    title: String,
    version: String,
    #[serde(default)]
    description: Option<String>,
}

/// Raw server object
#[derive(Debug, Clone, Deserialize)]
struct RawServer {
    url: String,
    #[serde(default)]
    protocol: Option<String>,
    #[serde(default)]
    security: Vec<BTreeMap<String, Value>>,
}

/// Raw security scheme object
#[derive(Debug, Clone, Deserialize)]
struct RawSecurityScheme {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    scheme: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "in")]
    location: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Placeholder names of a channel path in declaration order
pub fn path_placeholders(path: &str, location: &str) -> Result<Vec<String>> {
    let found = naming::placeholders(path).map_err(|e| NormalizeError::format(location, e.to_string()))?;
    Ok(found.into_iter().map(|placeholder| placeholder.name).collect())
}

/// Convert a resolved document tree.
pub fn parse_document(root: &Value) -> Result<SpecDocument> {
    let root = root
        .as_object()
        .ok_or_else(|| NormalizeError::format("#", "document root must be an object"))?;

    let asyncapi = match root.get("asyncapi") {
        Some(Value::String(version)) => version.clone(),
        Some(Value::Number(version)) => version.to_string(),
        _ => return Err(NormalizeError::format("#/asyncapi", "missing asyncapi version field")),
    };
    if !asyncapi.starts_with("2.") {
        return Err(NormalizeError::format(
            "#/asyncapi",
            format!("unsupported AsyncAPI version '{}'; expected 2.x", asyncapi),
        ));
    }

    let info: RawInfo = from_value(root.get("info"), "#/info")?;
    let servers = parse_servers(root.get("servers"))?;

    let empty = Map::new();
    let components_raw = match root.get("components") {
        None => &empty,
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(NormalizeError::format(
                "#/components",
                format!("expected an object, found {}", kind_of(other)),
            ))
        }
    };
    let components = parse_components(components_raw)?;
    let parameters = object_or_empty(components_raw.get("parameters"), "#/components/parameters")?;

    let channels_raw = match root.get("channels") {
        Some(Value::Object(map)) => map,
        _ => return Err(NormalizeError::format("#/channels", "channels must be an object")),
    };
    let mut channels = Vec::with_capacity(channels_raw.len());
    for (path, item) in channels_raw {
        channels.push(parse_channel(path, item, parameters)?);
    }

    Ok(SpecDocument {
        asyncapi,
        info: Info { title: info.title, version: info.version, description: info.description },
        servers,
        channels,
        components,
    })
}

fn parse_servers(value: Option<&Value>) -> Result<Vec<Server>> {
    let raw: BTreeMap<String, RawServer> = match value {
        None => return Ok(Vec::new()),
        Some(value) => from_value(Some(value), "#/servers")?,
    };
    // BTreeMap loses declaration order, so walk the source keys instead.
    let order: Vec<String> =
        value.and_then(Value::as_object).map(|m| m.keys().cloned().collect()).unwrap_or_default();
    Ok(order
        .into_iter()
        .filter_map(|name| {
            raw.get(&name).map(|server| Server {
                name: name.clone(),
                url: server.url.clone(),
                protocol: server.protocol.clone().unwrap_or_else(|| "ws".to_string()),
                security: server.security.iter().flat_map(|req| req.keys().cloned()).collect(),
            })
        })
        .collect())
}

fn parse_components(raw: &Map<String, Value>) -> Result<Components> {
    let mut components = Components::default();

    for (name, schema) in object_or_empty(raw.get("schemas"), "#/components/schemas")? {
        let schema = parse_schema(schema, &pointer::component_schema(name))?;
        components.schemas.insert(name.clone(), schema);
    }

    for (name, message) in object_or_empty(raw.get("messages"), "#/components/messages")? {
        let location = pointer::component_message(name);
        let message = match message {
            Value::Object(map) if map.contains_key("$ref") => {
                return Err(NormalizeError::format(
                    location,
                    "a component message must be declared in place, not as a reference",
                ))
            }
            other => parse_message(other, &location)?,
        };
        components.messages.insert(name.clone(), message);
    }

    for (name, scheme) in object_or_empty(raw.get("securitySchemes"), "#/components/securitySchemes")? {
        let location = format!("#/components/securitySchemes/{}", escape_segment(name));
        let raw: RawSecurityScheme = from_value(Some(scheme), &location)?;
        components.security_schemes.insert(
            name.clone(),
            SecurityScheme {
                kind: raw.kind,
                scheme: raw.scheme,
                name: raw.name,
                location: raw.location,
                description: raw.description,
            },
        );
    }
    Ok(components)
}

fn parse_channel(path: &str, item: &Value, parameters: &Map<String, Value>) -> Result<Channel> {
    let location = format!("#/channels/{}", escape_segment(path));
    let item = item.as_object().ok_or_else(|| {
        NormalizeError::format(location.as_str(), "channel item must be an object")
    })?;

    let publish = parse_operation(item.get("publish"), path, Direction::Publish)?;
    let subscribe = parse_operation(item.get("subscribe"), path, Direction::Subscribe)?;
    let needs_routing = [publish.as_ref(), subscribe.as_ref()]
        .into_iter()
        .flatten()
        .any(|op| op.message.is_multiplexed());
    let event_identifier = extract_event_identifier(item, path, needs_routing)?;

    Ok(Channel {
        path: path.to_string(),
        description: string_field(item, "description"),
        parameters: parse_parameters(path, item, parameters, &location)?,
        publish,
        subscribe,
        event_identifier,
        stream_id: string_field(item, STREAM_ID_EXTENSION).filter(|s| !s.trim().is_empty()),
    })
}

fn parse_parameters(
    path: &str,
    item: &Map<String, Value>,
    shared: &Map<String, Value>,
    location: &str,
) -> Result<Vec<ChannelParameter>> {
    let declared = object_or_empty(item.get("parameters"), &format!("{location}/parameters"))?;
    let placeholders = path_placeholders(path, location)?;

    let mut parameters: Vec<ChannelParameter> = Vec::with_capacity(placeholders.len());
    for name in &placeholders {
        if parameters.iter().any(|p| &p.name == name) {
            return Err(NormalizeError::format(
                location,
                format!("path parameter '{}' appears more than once", name),
            ));
        }
        let parameter_location = format!("{location}/parameters/{}", escape_segment(name));
        let parameter = match declared.get(name) {
            None => ChannelParameter {
                name: name.clone(),
                description: None,
                schema: Schema::primitive("string"),
            },
            Some(raw) => parse_parameter(name, raw, shared, &parameter_location)?,
        };
        parameters.push(parameter);
    }

    for name in declared.keys().filter(|k| !placeholders.contains(*k)) {
        tracing::warn!(channel = path, parameter = %name, "ignoring parameter that does not appear in the channel path");
    }
    Ok(parameters)
}

fn parse_parameter(
    name: &str,
    raw: &Value,
    shared: &Map<String, Value>,
    location: &str,
) -> Result<ChannelParameter> {
    let raw = match raw.get("$ref").and_then(Value::as_str) {
        Some(reference) => reference
            .strip_prefix(PARAMETER_REF_PREFIX)
            .and_then(|key| shared.get(&unescape_segment(key)))
            .ok_or_else(|| NormalizeError::unresolved(reference, location))?,
        None => raw,
    };
    let map = raw
        .as_object()
        .ok_or_else(|| NormalizeError::format(location, "parameter must be an object"))?;
    let schema = match map.get("schema") {
        Some(schema) => parse_schema(schema, &format!("{location}/schema"))?,
        None => Schema::primitive("string"),
    };
    Ok(ChannelParameter {
        name: name.to_string(),
        description: string_field(map, "description"),
        schema,
    })
}

fn parse_operation(
    value: Option<&Value>,
    channel: &str,
    direction: Direction,
) -> Result<Option<Operation>> {
    let Some(value) = value else { return Ok(None) };
    let location = format!("#/channels/{}/{}", escape_segment(channel), direction.as_str());
    let map = value
        .as_object()
        .ok_or_else(|| NormalizeError::format(location.as_str(), "operation must be an object"))?;

    let message_location = pointer::channel_message(channel, direction, None);
    let message = match map.get("message") {
        None => {
            return Err(NormalizeError::format(location, "operation must declare a message"))
        }
        Some(Value::Object(message)) if message.contains_key("oneOf") => {
            let variants = message
                .get("oneOf")
                .and_then(Value::as_array)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    NormalizeError::format(
                        format!("{message_location}/oneOf"),
                        "oneOf must be a non-empty list of messages",
                    )
                })?;
            let mut refs = Vec::with_capacity(variants.len());
            for (i, variant) in variants.iter().enumerate() {
                let variant_location = pointer::channel_message(channel, direction, Some(i));
                refs.push(parse_message_ref(variant, &variant_location)?);
            }
            OperationMessage::OneOf(refs)
        }
        Some(message) => OperationMessage::Single(parse_message_ref(message, &message_location)?),
    };

    Ok(Some(Operation {
        operation_id: string_field(map, "operationId"),
        description: string_field(map, "description").or_else(|| string_field(map, "summary")),
        message,
    }))
}

fn parse_message_ref(value: &Value, location: &str) -> Result<MessageRef> {
    match value.get("$ref") {
        Some(Value::String(reference)) => Ok(MessageRef::Reference(message_ref_name(reference, location)?)),
        Some(_) => Err(NormalizeError::format(location, "$ref must be a string")),
        None => Ok(MessageRef::Inline(parse_message(value, location)?)),
    }
}

fn parse_message(value: &Value, location: &str) -> Result<Message> {
    let map = value
        .as_object()
        .ok_or_else(|| NormalizeError::format(location, "message must be an object"))?;

    let payload = match map.get("payload") {
        Some(payload) => Some(parse_schema(payload, &format!("{location}/payload"))?),
        None => None,
    };

    let response_location = format!("{location}/{RESPONSE_EXTENSION}");
    let target = match map.get(RESPONSE_EXTENSION) {
        None => None,
        Some(Value::Object(response)) => match (response.get("$ref"), response.get("payload")) {
            (Some(Value::String(reference)), _) => {
                Some(ResponseTarget::Message(message_ref_name(reference, &response_location)?))
            }
            (_, Some(payload)) => Some(ResponseTarget::Payload(parse_schema(
                payload,
                &format!("{response_location}/payload"),
            )?)),
            _ => {
                return Err(NormalizeError::format(
                    response_location,
                    "x-response must hold a message $ref or a payload",
                ))
            }
        },
        Some(_) => {
            return Err(NormalizeError::format(response_location, "x-response must be an object"))
        }
    };

    let kind = match map.get(RESPONSE_TYPE_EXTENSION) {
        None => None,
        Some(Value::String(tag)) => Some(ResponseType::parse(tag).ok_or_else(|| {
            NormalizeError::format(
                format!("{location}/{RESPONSE_TYPE_EXTENSION}"),
                format!("x-response-type must be simple-rpc or streaming, found '{}'", tag),
            )
        })?),
        Some(_) => {
            return Err(NormalizeError::format(
                format!("{location}/{RESPONSE_TYPE_EXTENSION}"),
                "x-response-type must be a string",
            ))
        }
    };

    let response = match (target, kind) {
        (Some(target), kind) => {
            Some(ResponseSpec { kind: kind.unwrap_or(ResponseType::SimpleRpc), target })
        }
        (None, Some(_)) => {
            return Err(NormalizeError::format(
                format!("{location}/{RESPONSE_TYPE_EXTENSION}"),
                "x-response-type is declared without x-response",
            ))
        }
        (None, None) => None,
    };

    Ok(Message {
        name: string_field(map, "name"),
        description: string_field(map, "description").or_else(|| string_field(map, "summary")),
        payload,
        response,
    })
}

fn message_ref_name(reference: &str, location: &str) -> Result<String> {
    reference
        .strip_prefix(MESSAGE_REF_PREFIX)
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .map(unescape_segment)
        .ok_or_else(|| NormalizeError::unresolved(reference, location))
}

fn object_or_empty<'a>(value: Option<&'a Value>, location: &str) -> Result<&'a Map<String, Value>> {
    static EMPTY: OnceLock<Map<String, Value>> = OnceLock::new();
    match value {
        None => Ok(EMPTY.get_or_init(Map::new)),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(NormalizeError::format(
            location,
            format!("expected an object, found {}", kind_of(other)),
        )),
    }
}

fn from_value<T: serde::de::DeserializeOwned>(value: Option<&Value>, location: &str) -> Result<T> {
    let value = value.ok_or_else(|| NormalizeError::format(location, "required field is missing"))?;
    serde_json::from_value(value.clone()).map_err(|e| NormalizeError::format(location, e.to_string()))
}

/// Check that every local reference names an existing component.
pub fn validate_references(document: &SpecDocument) -> Result<()> {
    let components = &document.components;

    for (name, schema) in &components.schemas {
        check_schema(schema, components, &pointer::component_schema(name))?;
    }
    for (name, message) in &components.messages {
        check_message_body(message, components, &pointer::component_message(name))?;
    }
    for channel in &document.channels {
        let base = format!("#/channels/{}", escape_segment(&channel.path));
        for parameter in &channel.parameters {
            let location = format!("{base}/parameters/{}/schema", escape_segment(&parameter.name));
            check_schema(&parameter.schema, components, &location)?;
        }
        for (direction, operation) in
            [(Direction::Publish, &channel.publish), (Direction::Subscribe, &channel.subscribe)]
        {
            let Some(operation) = operation else { continue };
            let multiplexed = operation.message.is_multiplexed();
            for (i, variant) in operation.message.variants().into_iter().enumerate() {
                let location =
                    pointer::channel_message(&channel.path, direction, multiplexed.then_some(i));
                match variant {
                    MessageRef::Reference(name) => check_message(components, name, &location)?,
                    MessageRef::Inline(message) => {
                        check_message_body(message, components, &location)?
                    }
                }
            }
        }
    }
    Ok(())
}

fn check_message_body(
    message: &Message,
    components: &Components,
    location: &str,
) -> Result<()> {
    if let Some(payload) = &message.payload {
        check_schema(payload, components, &format!("{location}/payload"))?;
    }
    match message.response.as_ref().map(|r| &r.target) {
        Some(ResponseTarget::Message(name)) => {
            check_message(components, name, &format!("{location}/{RESPONSE_EXTENSION}"))
        }
        Some(ResponseTarget::Payload(schema)) => {
            check_schema(schema, components, &format!("{location}/{RESPONSE_EXTENSION}/payload"))
        }
        None => Ok(()),
    }
}

fn check_message(components: &Components, name: &str, location: &str) -> Result<()> {
    if components.messages.contains_key(name) {
        Ok(())
    } else {
        Err(NormalizeError::unresolved(pointer::component_message(name), location))
    }
}

fn check_schema(schema: &Schema, components: &Components, location: &str) -> Result<()> {
    match schema {
        Schema::Reference { name } if !components.schemas.contains_key(name) => {
            Err(NormalizeError::unresolved(pointer::component_schema(name), location))
        }
        Schema::Array { items } => check_schema(items, components, &format!("{location}/items")),
        Schema::Object { properties, .. } => properties.iter().try_for_each(|p| {
            let location = format!("{location}/properties/{}", escape_segment(&p.name));
            check_schema(&p.schema, components, &location)
        }),
        Schema::OneOf { variants } => variants.iter().enumerate().try_for_each(|(i, v)| {
            check_schema(v, components, &format!("{location}/oneOf/{i}"))
        }),
        Schema::AllOf { members } => members.iter().enumerate().try_for_each(|(i, m)| {
            check_schema(m, components, &format!("{location}/allOf/{i}"))
        }),
        _ => Ok(()),
    }
}
