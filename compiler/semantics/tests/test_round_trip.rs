use std::path::Path;

use adapters::service::parse_service;
use adapters::{normalize_str, SourceFormat};
use analysis::build_types;
use asyncgen_semantics::{derive_document, derive_surfaces, SemanticError};
use ir::{
    MessageRef, OperationMessage, PrimitiveType, ResponseType, ReturnShape, ServiceDefinition,
    TypeRef,
};
use serde_json::{json, Value};

fn chat_service(extra_methods: Vec<Value>) -> ServiceDefinition {
    let mut methods = vec![
        json!({ "name": "onJoin", "params": [{ "name": "join", "type": "Join" }], "returns": "Joined" }),
        json!({ "name": "onSubscribe", "params": [{ "name": "subscribe", "type": "Subscribe" }], "returns": "stream<Tick, error?>" }),
        json!({ "name": "onPing", "params": [{ "name": "ping", "type": "Ping" }], "returns": "string" }),
        json!({ "name": "onLeave", "description": "Leave the room", "params": [{ "name": "leave", "type": "Leave" }] }),
        json!({ "name": "describe", "params": [], "returns": "string" }),
    ];
    methods.extend(extra_methods);

    parse_service(json!({
        "name": "chat",
        "description": "Room chat",
        "basePath": "/rooms/{roomId: string}",
        "annotations": [{
            "name": "websocket:ServiceConfig",
            "fields": { "dispatcherKey": "\"event\"", "dispatcherStreamId": "\"id\"" }
        }],
        "methods": methods,
        "types": {
            "Join": { "type": "object", "required": ["event"], "properties": { "event": { "type": "string" }, "user": { "type": "string" } } },
            "Joined": { "type": "object", "properties": { "members": { "type": "array", "items": { "$ref": "#/components/schemas/Member" } } } },
            "Member": { "type": "object", "properties": { "name": { "type": "string" } } },
            "Subscribe": { "type": "object", "properties": { "event": { "type": "string" }, "symbol": { "type": "string" } } },
            "Tick": { "type": "object", "properties": { "price": { "type": "number" } } },
            "Ping": { "type": "object", "properties": { "event": { "type": "string" } } },
            "Leave": { "type": "object", "properties": { "event": { "type": "string" } } },
            "Unused": { "type": "string" }
        }
    }))
    .expect("service parses")
}

#[test]
fn forward_mapping_builds_one_multiplexed_channel() {
    let document = derive_document(&chat_service(Vec::new())).expect("derive");
    assert_eq!(document.info.title, "chat");
    assert_eq!(document.channels.len(), 1);

    let channel = &document.channels[0];
    assert_eq!(channel.path, "/rooms/{roomId}");
    assert_eq!(channel.parameters[0].name, "roomId");
    assert_eq!(channel.stream_id.as_deref(), Some("id"));
    assert_eq!(channel.event_identifier.as_ref().map(|id| id.path.as_str()), Some("event"));

    let publish = channel.publish.as_ref().expect("publish");
    let tags: Vec<&str> = publish
        .message
        .variants()
        .into_iter()
        .map(|v| match v {
            MessageRef::Reference(name) => name.as_str(),
            MessageRef::Inline(_) => panic!("requests are component messages"),
        })
        .collect();
    assert_eq!(tags, vec!["Join", "Subscribe", "Ping", "Leave"]);

    let subscribe = channel.subscribe.as_ref().expect("subscribe");
    let OperationMessage::OneOf(replies) = &subscribe.message else { panic!("expected oneOf") };
    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0], MessageRef::Reference("Joined".into()));

    let schemas: Vec<&str> = document.components.schemas.keys().map(String::as_str).collect();
    assert_eq!(schemas, vec!["Join", "Joined", "Leave", "Member", "Ping", "Subscribe", "Tick"]);
}

#[test]
fn forward_then_reverse_preserves_method_surface() {
    let service = chat_service(Vec::new());
    let document = derive_document(&service).expect("derive");
    let text = serde_json::to_string_pretty(&document.to_value()).expect("serialize");

    let reloaded = normalize_str(&text, Some(SourceFormat::Json), Path::new(".")).expect("reload");
    let model = build_types(reloaded, Vec::new()).expect("types");
    let surfaces = derive_surfaces(&model.document, &model.registry).expect("surfaces");

    assert_eq!(surfaces.len(), 1);
    let surface = &surfaces[0];
    assert_eq!(surface.client_name, "ChatClient");
    assert_eq!(surface.path_params.len(), 1);
    assert_eq!(surface.path_params[0].name, "room_id");
    assert_eq!(surface.path_params[0].ty, TypeRef::Primitive(PrimitiveType::String));
    let dispatcher = surface.dispatcher.as_ref().expect("dispatcher");
    assert_eq!(dispatcher.key, "event");
    assert_eq!(dispatcher.stream_id.as_deref(), Some("id"));

    // one client method per `on<Tag>` remote method, in declaration order
    let remote: Vec<_> = service.methods.iter().filter(|m| m.name.starts_with("on")).collect();
    assert_eq!(surface.methods.len(), remote.len());
    for (method, remote) in surface.methods.iter().zip(&remote) {
        let tag = remote.name.trim_start_matches("on");
        assert_eq!(method.tag, tag);
        assert_eq!(method.name, format!("do_{}", tag.to_lowercase()));
        assert_eq!(method.parameter_count(), remote.params.len());
    }

    let kinds: Vec<Option<ResponseType>> = surface.methods.iter().map(|m| m.response_type()).collect();
    assert_eq!(
        kinds,
        vec![Some(ResponseType::SimpleRpc), Some(ResponseType::Streaming), Some(ResponseType::SimpleRpc), None]
    );

    assert_eq!(
        surface.methods[0].returns,
        ReturnShape::Direct { tag: "Joined".into(), ty: TypeRef::named("Joined") }
    );
    assert_eq!(
        surface.methods[1].returns,
        ReturnShape::Stream { tag: "Subscribe".into(), ty: TypeRef::named("Tick") }
    );
    assert_eq!(
        surface.methods[2].returns,
        ReturnShape::Direct { tag: "Ping".into(), ty: TypeRef::Primitive(PrimitiveType::String) }
    );
    assert_eq!(surface.methods[3].description.as_deref(), Some("Leave the room"));

    let payload = surface.methods[0].payload.as_ref().expect("payload");
    assert_eq!(payload.name, "join");
    assert_eq!(payload.ty, TypeRef::named("Join"));
}

#[test]
fn unrecognized_return_type_is_rejected() {
    let service = chat_service(vec![
        json!({ "name": "onCount", "params": [{ "name": "ping", "type": "Ping" }], "returns": "int[]" }),
    ]);
    let err = derive_document(&service).expect_err("array return");
    assert!(matches!(err, SemanticError::UnsupportedSchemaType { .. }));
    assert_eq!(
        err.to_string(),
        "Unsupported AsyncAPI data type 'int[]' (return type of remote method 'onCount')"
    );
}

#[test]
fn undeclared_parameter_type_is_rejected() {
    let service = chat_service(vec![
        json!({ "name": "onGhost", "params": [{ "name": "ghost", "type": "Ghost" }] }),
    ]);
    let err = derive_document(&service).expect_err("unknown type");
    assert_eq!(err.to_string(), "remote method 'onGhost' uses undeclared type 'Ghost'");
}

#[test]
fn missing_dispatcher_key_stops_the_mapping() {
    let mut service = chat_service(Vec::new());
    service.annotations[0].fields.retain(|(key, _)| key != "dispatcherKey");
    let err = derive_document(&service).expect_err("no key");
    assert!(matches!(err, SemanticError::DispatcherConfig(_)));
}
