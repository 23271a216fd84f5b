use std::fs;
use std::path::Path;

use asyncgen_adapters::{normalize, normalize_str, ExtensionError, NormalizeError, SourceFormat};
use ir::{EventIdentifierKind, MessageRef, OperationMessage, ResponseTarget, ResponseType, Schema};

const CHAT: &str = r##"
asyncapi: 2.5.0
info:
  title: Chat
  version: 1.0.0
servers:
  dev:
    url: ws://localhost:9090
    protocol: ws
channels:
  /rooms/{roomId}:
    parameters:
      roomId:
        schema:
          type: integer
    x-event-identifier:
      type: body
      path: event
    x-dispatcher-stream-id: id
    publish:
      message:
        oneOf:
          - $ref: '#/components/messages/Join'
          - $ref: '#/components/messages/Subscribe'
    subscribe:
      message:
        oneOf:
          - $ref: '#/components/messages/Joined'
          - $ref: '#/components/messages/Tick'
components:
  schemas:
    Join:
      type: object
      required: [event]
      properties:
        event: { type: string }
        user: { type: string }
    Joined:
      type: object
      properties:
        event: { type: string }
    Tick:
      type: object
      properties:
        price: { type: number, format: double }
  messages:
    Join:
      payload:
        $ref: '#/components/schemas/Join'
      x-response:
        $ref: '#/components/messages/Joined'
    Subscribe:
      payload:
        type: object
        properties:
          event: { type: string }
      x-response:
        $ref: '#/components/messages/Tick'
      x-response-type: streaming
    Joined:
      payload:
        $ref: '#/components/schemas/Joined'
    Tick:
      payload:
        $ref: '#/components/schemas/Tick'
"##;

fn load(text: &str) -> Result<ir::SpecDocument, NormalizeError> {
    normalize_str(text, Some(SourceFormat::Yaml), Path::new("."))
}

#[test]
fn loads_multiplexed_channel() {
    let document = load(CHAT).expect("normalize");
    assert_eq!(document.info.title, "Chat");
    assert_eq!(document.servers[0].url, "ws://localhost:9090");

    let channel = document.channel("/rooms/{roomId}").expect("channel");
    assert_eq!(channel.parameters.len(), 1);
    assert_eq!(channel.parameters[0].schema, Schema::primitive("integer"));
    assert_eq!(channel.stream_id.as_deref(), Some("id"));

    let identifier = channel.event_identifier.as_ref().expect("identifier");
    assert_eq!(identifier.kind, EventIdentifierKind::Body);
    assert_eq!(identifier.path, "event");

    let publish = channel.publish.as_ref().expect("publish");
    let OperationMessage::OneOf(variants) = &publish.message else { panic!("expected oneOf") };
    assert_eq!(variants[0], MessageRef::Reference("Join".into()));

    let join = &document.components.messages["Join"];
    let response = join.response.as_ref().expect("response");
    assert_eq!(response.kind, ResponseType::SimpleRpc);
    assert_eq!(response.target, ResponseTarget::Message("Joined".into()));
    assert_eq!(
        document.components.messages["Subscribe"].response.as_ref().map(|r| r.kind),
        Some(ResponseType::Streaming)
    );
}

#[test]
fn json_and_yaml_agree() {
    let yaml = load(CHAT).expect("yaml");
    let value: serde_json::Value = serde_yaml::from_str(CHAT).expect("value");
    let json = serde_json::to_string(&value).expect("json");
    let from_json = normalize_str(&json, None, Path::new(".")).expect("json");
    assert_eq!(yaml, from_json);
}

#[test]
fn missing_event_identifier_is_reported() {
    let text = CHAT.replace("    x-event-identifier:\n      type: body\n      path: event\n", "");
    let err = load(&text).expect_err("missing identifier");
    assert!(matches!(
        err,
        NormalizeError::MissingExtension(ExtensionError::AttributeNotFound { ref channel })
            if channel == "/rooms/{roomId}"
    ));
    assert!(err.to_string().starts_with("x-event-identifier attribute is not found"));
}

#[test]
fn event_identifier_type_errors() {
    let text = CHAT.replace("      type: body\n", "");
    let err = load(&text).expect_err("no type");
    assert_eq!(
        err.to_string(),
        "type attribute is not found within the attribute x-event-identifier in the AsyncAPI \
         specification (channel '/rooms/{roomId}')"
    );

    let text = CHAT.replace("      type: body\n", "      type: query\n");
    let err = load(&text).expect_err("bad type");
    assert!(err.to_string().starts_with(
        "header or body is not provided as the value of type attribute within the attribute \
         x-event-identifier"
    ));

    let text = CHAT.replace("      path: event\n", "");
    let err = load(&text).expect_err("no path");
    assert!(matches!(err, NormalizeError::MissingExtension(ExtensionError::PathNotFound { .. })));
}

#[test]
fn dangling_schema_reference_names_its_location() {
    let text = CHAT.replace("$ref: '#/components/schemas/Tick'", "$ref: '#/components/schemas/Tock'");
    let err = load(&text).expect_err("dangling");
    match err {
        NormalizeError::RefResolution { reference, location } => {
            assert_eq!(reference, "#/components/schemas/Tock");
            assert_eq!(location, "#/components/messages/Tick/payload");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn dangling_response_reference_is_reported() {
    let text = CHAT.replace("$ref: '#/components/messages/Joined'\n    Subscribe", "$ref: '#/components/messages/Left'\n    Subscribe");
    let err = load(&text).expect_err("dangling");
    assert!(matches!(err, NormalizeError::RefResolution { ref reference, .. } if reference == "#/components/messages/Left"));
}

#[test]
fn invalid_response_type_is_a_format_error() {
    let text = CHAT.replace("x-response-type: streaming", "x-response-type: batch");
    let err = load(&text).expect_err("response type");
    assert!(matches!(err, NormalizeError::SpecFormat { ref location, .. }
        if location == "#/components/messages/Subscribe/x-response-type"));
}

#[test]
fn undeclared_path_parameter_defaults_to_string() {
    let text = r#"{
        "asyncapi": "2.5.0",
        "info": { "title": "Feed", "version": "1" },
        "channels": { "/feed/{topic}": { "subscribe": { "message": { "payload": { "type": "string" } } } } }
    }"#;
    let document = normalize_str(text, Some(SourceFormat::Json), Path::new(".")).expect("normalize");
    let channel = &document.channels[0];
    assert_eq!(channel.parameters[0].name, "topic");
    assert_eq!(channel.parameters[0].schema, Schema::primitive("string"));
    assert!(channel.event_identifier.is_none());
}

#[test]
fn duplicate_path_parameter_is_rejected() {
    let text = r#"{
        "asyncapi": "2.5.0",
        "info": { "title": "Feed", "version": "1" },
        "channels": { "/a/{id}/b/{id}": {} }
    }"#;
    let err = normalize_str(text, None, Path::new(".")).expect_err("duplicate");
    assert!(err.to_string().contains("path parameter 'id' appears more than once"));
}

#[test]
fn unsupported_version_is_rejected() {
    let text = CHAT.replace("asyncapi: 2.5.0", "asyncapi: 3.0.0");
    assert!(matches!(load(&text), Err(NormalizeError::SpecFormat { .. })));
}

#[test]
fn external_references_are_imported() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("common.yaml"),
        "components:\n  schemas:\n    Price:\n      type: object\n      properties:\n        amount: { $ref: '#/components/schemas/Amount' }\n    Amount:\n      type: number\n",
    )
    .expect("write common");
    let spec = r##"
asyncapi: 2.5.0
info: { title: Prices, version: 1.0.0 }
channels:
  /:
    subscribe:
      message:
        payload:
          $ref: 'common.yaml#/components/schemas/Price'
"##;
    let path = dir.path().join("spec.yaml");
    fs::write(&path, spec).expect("write spec");

    let document = normalize(&path).expect("normalize");
    assert!(document.components.schemas.contains_key("Price"));
    assert_eq!(document.components.schemas["Amount"], Schema::primitive("number"));
    let subscribe = document.channels[0].subscribe.as_ref().expect("subscribe");
    let OperationMessage::Single(MessageRef::Inline(message)) = &subscribe.message else {
        panic!("expected inline message")
    };
    assert_eq!(message.payload, Some(Schema::reference("Price")));
}

#[test]
fn missing_external_file_is_unresolved() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("spec.json");
    fs::write(
        &path,
        r#"{ "asyncapi": "2.5.0", "info": { "title": "X", "version": "1" },
             "channels": { "/": { "subscribe": { "message": { "$ref": "missing.json#/components/messages/M" } } } } }"#,
    )
    .expect("write");
    let err = normalize(&path).expect_err("missing file");
    assert!(matches!(err, NormalizeError::RefResolution { ref reference, .. }
        if reference == "missing.json#/components/messages/M"));
}
