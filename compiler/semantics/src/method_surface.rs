//! Reverse mapping: normalized channels → client method surfaces.
//!
//! Each publish-side message of a channel becomes one `do_<tag>` method.
//! Payload and response types are looked up in the registry by the same
//! pointers the type model bound them under.

use ir::pointer::{self, channel_message, component_message, message_payload};
use ir::{
    Channel, ChannelParameter, ChannelSurface, ClientMethod, Direction, DispatcherConfig, Message,
    MessageRef, ParamBinding, PrimitiveType, ResponseSpec, ResponseTarget, ResponseType,
    ReturnShape, Schema, SpecDocument, TypeRef, RESPONSE_EXTENSION,
};
use naming::{channel_label, to_pascal_case, to_snake_case, Casing, NameResolver};
use registry::TypeRegistryReader;
use types::{resolve_path_parameter, UnsupportedSchemaType};

use crate::{Result, SemanticError};

/// Prefix of every generated request method
const METHOD_PREFIX: &str = "do_";

/// Derive one client surface per channel, in declaration order.
pub fn derive_surfaces<R: TypeRegistryReader>(
    document: &SpecDocument,
    registry: &R,
) -> Result<Vec<ChannelSurface>> {
    let title = to_pascal_case(&document.info.title);
    let single = document.channels.len() == 1;
    let mut client_names = NameResolver::new();

    let mut surfaces = Vec::with_capacity(document.channels.len());
    for channel in &document.channels {
        let candidate = if single {
            format!("{}Client", title)
        } else {
            format!("{}{}Client", title, channel_label(&channel.path))
        };
        let client_name = client_names.resolve(&candidate, Casing::Verbatim);
        let path_params = resolve_path_params(document, channel)?;
        let methods = derive_client_methods(document, channel, registry, &path_params)?;
        if methods.is_empty() {
            tracing::debug!(channel = %channel.path, "channel has no publish messages");
        }
        surfaces.push(ChannelSurface {
            path: channel.path.clone(),
            client_name,
            description: channel.description.clone(),
            path_params,
            dispatcher: DispatcherConfig::for_channel(channel),
            event_identifier: channel.event_identifier.clone(),
            methods,
        });
    }
    Ok(surfaces)
}

/// Derive the request methods of one channel.
///
/// `path_params` are the channel's resolved path bindings; payload parameter
/// names never collide with them.
pub fn derive_client_methods<R: TypeRegistryReader>(
    document: &SpecDocument,
    channel: &Channel,
    registry: &R,
    path_params: &[ParamBinding],
) -> Result<Vec<ClientMethod>> {
    let Some(publish) = &channel.publish else { return Ok(Vec::new()) };
    let multiplexed = publish.message.is_multiplexed();
    let mut method_names = NameResolver::new();

    let mut methods = Vec::new();
    for (i, variant) in publish.message.variants().into_iter().enumerate() {
        let location = channel_message(&channel.path, Direction::Publish, multiplexed.then_some(i));
        let (message, message_location, tag) = match variant {
            MessageRef::Reference(name) => {
                let message = document.components.messages.get(name).ok_or_else(|| {
                    SemanticError::RefResolution {
                        reference: component_message(name),
                        location: location.clone(),
                    }
                })?;
                (message, component_message(name), name.clone())
            }
            MessageRef::Inline(message) => {
                let tag = message
                    .name
                    .clone()
                    .or_else(|| publish.operation_id.clone())
                    .unwrap_or_else(|| channel_label(&channel.path));
                (message, location, tag)
            }
        };

        let name = method_names.resolve_identifier(&format!("{}{}", METHOD_PREFIX, to_snake_case(&tag)));
        let payload = payload_binding(message, &message_location, &tag, registry, path_params)?;
        let returns = return_shape(message, &message_location, &tag, registry)?;

        methods.push(ClientMethod {
            name,
            tag,
            description: message.description.clone(),
            path_params: path_params.to_vec(),
            payload,
            returns,
        });
    }
    Ok(methods)
}

fn payload_binding<R: TypeRegistryReader>(
    message: &Message,
    message_location: &str,
    tag: &str,
    registry: &R,
    path_params: &[ParamBinding],
) -> Result<Option<ParamBinding>> {
    if message.payload.is_none() {
        return Ok(None);
    }
    let pointer = format!("{}/payload", message_location);
    let ty = registry.payload_type(&pointer).cloned().ok_or(SemanticError::MissingPayload(pointer))?;
    let mut names = NameResolver::with_reserved(path_params.iter().map(|p| p.name.clone()));
    Ok(Some(ParamBinding { name: names.resolve_identifier(tag), wire_name: tag.to_string(), ty }))
}

fn return_shape<R: TypeRegistryReader>(
    message: &Message,
    message_location: &str,
    tag: &str,
    registry: &R,
) -> Result<ReturnShape> {
    let Some(ResponseSpec { kind, target }) = &message.response else {
        return Ok(ReturnShape::None);
    };
    let (tag, ty) = match target {
        ResponseTarget::Message(reply) => {
            let ty = registry.payload_type(&message_payload(reply)).cloned().unwrap_or(TypeRef::Any);
            (reply.clone(), ty)
        }
        ResponseTarget::Payload(_) => {
            let pointer = format!("{}/{}/payload", message_location, RESPONSE_EXTENSION);
            let ty = registry.payload_type(&pointer).cloned().ok_or(SemanticError::MissingPayload(pointer))?;
            (tag.to_string(), ty)
        }
    };
    Ok(match kind {
        ResponseType::SimpleRpc => ReturnShape::Direct { tag, ty },
        ResponseType::Streaming => ReturnShape::Stream { tag, ty },
    })
}

/// Resolve the declared path parameters of a channel.
///
/// Identifiers are unique within the channel even when two wire names
/// collapse to the same identifier.
pub fn resolve_path_params(document: &SpecDocument, channel: &Channel) -> Result<Vec<ParamBinding>> {
    let mut names = NameResolver::new();
    channel
        .parameters
        .iter()
        .map(|parameter| {
            let ty = path_param_type(document, channel, parameter, &parameter.schema, &mut Vec::new())?;
            Ok(ParamBinding {
                name: names.resolve_identifier(&parameter.name),
                wire_name: parameter.name.clone(),
                ty,
            })
        })
        .collect()
}

fn path_param_type<'d>(
    document: &'d SpecDocument,
    channel: &Channel,
    parameter: &ChannelParameter,
    schema: &'d Schema,
    seen: &mut Vec<&'d str>,
) -> Result<TypeRef> {
    let location = || format!("path parameter '{}' of channel '{}'", parameter.name, channel.path);
    let unsupported = |source: UnsupportedSchemaType| SemanticError::UnsupportedSchemaType {
        source,
        location: location(),
    };

    match schema {
        Schema::Array { .. } => Err(SemanticError::ArrayPathParameter {
            channel: channel.path.clone(),
            parameter: parameter.name.clone(),
        }),
        Schema::Primitive { ty, format, .. } => {
            resolve_path_parameter(ty, format.as_deref()).map(TypeRef::Primitive).map_err(unsupported)
        }
        Schema::Enum { .. } => Ok(TypeRef::Primitive(PrimitiveType::String)),
        Schema::Reference { name } => {
            if seen.contains(&name.as_str()) {
                return Err(unsupported(UnsupportedSchemaType { ty: schema.type_label(), format: None }));
            }
            let target = document.components.schemas.get(name).ok_or_else(|| {
                SemanticError::RefResolution { reference: pointer::component_schema(name), location: location() }
            })?;
            seen.push(name);
            path_param_type(document, channel, parameter, target, seen)
        }
        other => Err(unsupported(UnsupportedSchemaType { ty: other.type_label(), format: None })),
    }
}
