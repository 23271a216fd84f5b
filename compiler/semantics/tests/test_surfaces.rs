use std::path::Path;

use adapters::{normalize_str, SourceFormat};
use analysis::build_types;
use asyncgen_semantics::{derive_surfaces, SemanticError};
use ir::{ChannelSurface, PrimitiveType, ReturnShape, TypeRef};

fn surfaces(channels: &str, components: &str) -> Result<Vec<ChannelSurface>, SemanticError> {
    let text = format!(
        "asyncapi: 2.6.0\ninfo:\n  title: market data\n  version: 1.0.0\nchannels:\n{}\ncomponents:\n{}\n",
        channels, components
    );
    let document = normalize_str(&text, Some(SourceFormat::Yaml), Path::new(".")).expect("normalize");
    let model = build_types(document, Vec::new()).expect("types");
    derive_surfaces(&model.document, &model.registry)
}

const MESSAGES: &str = r#"
  messages:
    Quote:
      payload:
        type: object
        properties:
          symbol: { type: string }
"#;

#[test]
fn channels_get_labelled_client_names() {
    let channels = r#"
  /quotes:
    publish:
      message: { $ref: '#/components/messages/Quote' }
  /:
    publish:
      message: { $ref: '#/components/messages/Quote' }
"#;
    let found = surfaces(channels, MESSAGES).expect("surfaces");
    let names: Vec<&str> = found.iter().map(|s| s.client_name.as_str()).collect();
    assert_eq!(names, vec!["MarketDataQuotesClient", "MarketDataRootClient"]);
    assert_eq!(found[0].methods[0].name, "do_quote");
    assert_eq!(found[0].methods[0].returns, ReturnShape::None);
    assert!(found[0].dispatcher.is_none());
}

#[test]
fn inline_messages_fall_back_to_operation_id() {
    let channels = r#"
  /orders:
    publish:
      operationId: placeOrder
      message:
        payload: { type: integer, format: int32 }
"#;
    let found = surfaces(channels, MESSAGES).expect("surfaces");
    let method = &found[0].methods[0];
    assert_eq!(method.tag, "placeOrder");
    assert_eq!(method.name, "do_place_order");
    let payload = method.payload.as_ref().expect("payload");
    assert_eq!(payload.ty, TypeRef::Primitive(PrimitiveType::Int32));
}

#[test]
fn duplicate_display_names_keep_declaration_order() {
    let channels = r#"
  /a/{user-id}/{user_id}:
    parameters:
      user-id: { schema: { type: string } }
      user_id: { schema: { type: integer } }
    publish:
      message: { $ref: '#/components/messages/Quote' }
"#;
    let found = surfaces(channels, MESSAGES).expect("surfaces");
    let params: Vec<(&str, &str)> =
        found[0].path_params.iter().map(|p| (p.wire_name.as_str(), p.name.as_str())).collect();
    assert_eq!(params, vec![("user-id", "user_id"), ("user_id", "user_id_1")]);
    assert_eq!(found[0].path_params[1].ty, TypeRef::Primitive(PrimitiveType::Int64));
    assert_eq!(found[0].methods[0].path_params, found[0].path_params);
}

#[test]
fn array_path_parameter_is_rejected() {
    let channels = r#"
  /items/{ids}:
    parameters:
      ids: { schema: { type: array, items: { type: string } } }
    publish:
      message: { $ref: '#/components/messages/Quote' }
"#;
    let err = surfaces(channels, MESSAGES).expect_err("array");
    assert!(matches!(err, SemanticError::ArrayPathParameter { .. }));
}

#[test]
fn unsupported_path_parameter_type_is_rejected() {
    let channels = r#"
  /items/{id}:
    parameters:
      id: { schema: { type: object } }
    publish:
      message: { $ref: '#/components/messages/Quote' }
"#;
    let err = surfaces(channels, MESSAGES).expect_err("object");
    assert!(matches!(err, SemanticError::UnsupportedSchemaType { .. }));
}
