//! Forward mapping: service declaration → AsyncAPI channels.
//!
//! Every remote method named `on<Tag>` that takes a parameter of a declared
//! type contributes one message tag. Its return type decides the reply:
//!
//! | return shape   | reply message                   | `x-response-type` |
//! |----------------|---------------------------------|-------------------|
//! | named type `R` | component message `R`           | `simple-rpc`      |
//! | `stream<T>`    | inline message named `<Tag>`    | `streaming`       |
//! | scalar         | inline message named `<Tag>`    | `simple-rpc`      |
//! | none           | no reply                        |                   |

use ir::{
    Channel, ChannelParameter, Components, DispatcherConfig, EventIdentifier, EventIdentifierKind,
    Info, Message, MessageRef, Operation, OperationMessage, PathSegment, RemoteMethod,
    ResponseSpec, ResponseTarget, ResponseType, Schema, ServiceDefinition, SpecDocument, TypeExpr,
    ASYNCAPI_VERSION,
};
use types::{builtin_schema, UnsupportedSchemaType};

use crate::dispatcher::extract_dispatcher;
use crate::shape::{classify, RecognizedShape};
use crate::{Result, SemanticError};

/// Method-name prefix marking an event handler
pub const ON_EVENT_PREFIX: &str = "on";

/// Version written into derived documents
const DERIVED_API_VERSION: &str = "1.0.0";

/// Channels and the component definitions they reference
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedChannels {
    /// Derived channels
    pub channels: Vec<Channel>,
    /// Messages and schemas referenced by the channels
    pub components: Components,
}

/// Derive a complete document from a service declaration.
pub fn derive_document(service: &ServiceDefinition) -> Result<SpecDocument> {
    let dispatcher = extract_dispatcher(service)?;
    let DerivedChannels { channels, components } = derive_channels(service, &dispatcher)?;
    tracing::debug!(service = %service.name, messages = components.messages.len(), "derived channels");
    Ok(SpecDocument {
        asyncapi: ASYNCAPI_VERSION.to_string(),
        info: Info {
            title: service.name.clone(),
            version: DERIVED_API_VERSION.to_string(),
            description: service.description.clone(),
        },
        servers: Vec::new(),
        channels,
        components,
    })
}

/// Derive the channel of a service and the components it uses.
pub fn derive_channels(
    service: &ServiceDefinition,
    dispatcher: &DispatcherConfig,
) -> Result<DerivedChannels> {
    let mut components = Components::default();
    let mut requests = Vec::new();
    let mut replies: Vec<MessageRef> = Vec::new();
    let mut used_types: Vec<String> = Vec::new();

    for method in &service.methods {
        let Some(tag) = method.name.strip_prefix(ON_EVENT_PREFIX).filter(|t| !t.is_empty()) else {
            continue;
        };
        let Some(request_type) = request_type(method, tag) else {
            tracing::warn!(method = %method.name, "skipping remote method without a custom-typed parameter");
            continue;
        };
        require_declared(service, method, request_type)?;
        used_types.push(request_type.to_string());

        let mut message = Message {
            name: Some(tag.to_string()),
            description: method.description.clone(),
            payload: Some(Schema::reference(request_type)),
            response: None,
        };

        if let Some(returns) = &method.returns {
            let location = format!("return type of remote method '{}'", method.name);
            let (reply, response) = match classify(returns) {
                RecognizedShape::NamedReference(reply) => {
                    require_declared(service, method, reply)?;
                    used_types.push(reply.to_string());
                    components.messages.entry(reply.to_string()).or_insert_with(|| Message {
                        name: Some(reply.to_string()),
                        payload: Some(Schema::reference(reply)),
                        ..Message::default()
                    });
                    (
                        MessageRef::Reference(reply.to_string()),
                        ResponseSpec {
                            kind: ResponseType::SimpleRpc,
                            target: ResponseTarget::Message(reply.to_string()),
                        },
                    )
                }
                RecognizedShape::StreamOf(element) => {
                    let schema = element_schema(service, method, element, &location, &mut used_types)?;
                    inline_reply(tag, schema, ResponseType::Streaming)
                }
                RecognizedShape::Scalar(name) => {
                    let schema = builtin_schema(name).ok_or_else(|| unsupported(returns, &location))?;
                    inline_reply(tag, schema, ResponseType::SimpleRpc)
                }
                RecognizedShape::Unrecognized(expr) => return Err(unsupported(expr, &location)),
            };
            if !replies.contains(&reply) {
                replies.push(reply);
            }
            message.response = Some(response);
        }

        components.messages.insert(tag.to_string(), message);
        requests.push(MessageRef::Reference(tag.to_string()));
    }

    copy_schemas(service, used_types, &mut components)?;

    let channel = Channel {
        path: channel_path(&service.base_path),
        description: service.description.clone(),
        parameters: path_parameters(service)?,
        publish: (!requests.is_empty()).then(|| Operation {
            operation_id: None,
            description: None,
            message: OperationMessage::OneOf(requests),
        }),
        subscribe: (!replies.is_empty()).then(|| Operation {
            operation_id: None,
            description: None,
            message: OperationMessage::OneOf(replies),
        }),
        event_identifier: Some(EventIdentifier {
            kind: EventIdentifierKind::Body,
            path: dispatcher.key.clone(),
        }),
        stream_id: dispatcher.stream_id.clone(),
    };

    Ok(DerivedChannels { channels: vec![channel], components })
}

/// `/chat/{room}` from the base path segments; the bare root is `/`.
pub fn channel_path(segments: &[PathSegment]) -> String {
    let parts: Vec<String> = segments
        .iter()
        .filter_map(|segment| match segment {
            PathSegment::Literal(text) => Some(text.clone()),
            PathSegment::Param { name, .. } => Some(format!("{{{}}}", name)),
            PathSegment::Root => None,
        })
        .collect();
    format!("/{}", parts.join("/"))
}

fn inline_reply(tag: &str, schema: Schema, kind: ResponseType) -> (MessageRef, ResponseSpec) {
    let reply = Message { name: Some(tag.to_string()), payload: Some(schema.clone()), ..Message::default() };
    (MessageRef::Inline(reply), ResponseSpec { kind, target: ResponseTarget::Payload(schema) })
}

/// The parameter carrying the request: the one typed `<Tag>`, else the
/// first custom-typed one.
fn request_type<'m>(method: &'m RemoteMethod, tag: &str) -> Option<&'m str> {
    let named: Vec<&str> = method
        .params
        .iter()
        .filter_map(|p| match classify(&p.ty) {
            RecognizedShape::NamedReference(name) => Some(name),
            _ => None,
        })
        .collect();
    named.iter().find(|name| **name == tag).or_else(|| named.first()).copied()
}

fn element_schema(
    service: &ServiceDefinition,
    method: &RemoteMethod,
    element: &TypeExpr,
    location: &str,
    used_types: &mut Vec<String>,
) -> Result<Schema> {
    match classify(element) {
        RecognizedShape::Scalar(name) => builtin_schema(name).ok_or_else(|| unsupported(element, location)),
        RecognizedShape::NamedReference(name) => {
            require_declared(service, method, name)?;
            used_types.push(name.to_string());
            Ok(Schema::reference(name))
        }
        _ => Err(unsupported(element, location)),
    }
}

fn path_parameters(service: &ServiceDefinition) -> Result<Vec<ChannelParameter>> {
    let mut parameters = Vec::new();
    for segment in &service.base_path {
        let PathSegment::Param { name, ty } = segment else { continue };
        let location = format!("path parameter '{}' of service '{}'", name, service.name);
        parameters.push(ChannelParameter {
            name: name.clone(),
            description: None,
            schema: path_schema(ty, &location)?,
        });
    }
    Ok(parameters)
}

fn path_schema(ty: &TypeExpr, location: &str) -> Result<Schema> {
    match ty {
        TypeExpr::Builtin(name) => builtin_schema(name).ok_or_else(|| unsupported(ty, location)),
        TypeExpr::Array(inner) => Ok(Schema::Array { items: Box::new(path_schema(inner, location)?) }),
        other => Err(unsupported(other, location)),
    }
}

/// Copy the declared schemas of `used` types, following their references.
fn copy_schemas(service: &ServiceDefinition, used: Vec<String>, components: &mut Components) -> Result<()> {
    let mut queue = used;
    while let Some(name) = queue.pop() {
        if components.schemas.contains_key(&name) {
            continue;
        }
        let Some(schema) = service.types.get(&name) else { continue };
        for reference in references(schema) {
            if !service.types.contains_key(&reference) {
                return Err(SemanticError::RefResolution {
                    reference: ir::pointer::component_schema(&reference),
                    location: format!("#/types/{}", name),
                });
            }
            queue.push(reference);
        }
        components.schemas.insert(name, schema.clone());
    }
    Ok(())
}

fn references(schema: &Schema) -> Vec<String> {
    match schema {
        Schema::Reference { name } => vec![name.clone()],
        Schema::Array { items } => references(items),
        Schema::Object { properties, .. } => properties.iter().flat_map(|p| references(&p.schema)).collect(),
        Schema::OneOf { variants } => variants.iter().flat_map(references).collect(),
        Schema::AllOf { members } => members.iter().flat_map(references).collect(),
        _ => Vec::new(),
    }
}

fn require_declared(service: &ServiceDefinition, method: &RemoteMethod, name: &str) -> Result<()> {
    if service.types.contains_key(name) {
        Ok(())
    } else {
        Err(SemanticError::UnknownType { method: method.name.clone(), type_name: name.to_string() })
    }
}

fn unsupported(expr: &TypeExpr, location: &str) -> SemanticError {
    SemanticError::UnsupportedSchemaType {
        source: UnsupportedSchemaType { ty: expr.to_string(), format: None },
        location: location.to_string(),
    }
}
