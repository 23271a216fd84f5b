use std::path::Path;

use adapters::{normalize_str, SourceFormat};
use asyncgen_analysis::{build_types, TypeModelError};
use ir::{PrimitiveType, Schema, SpecDocument, TypeDefinition, TypeRef, TypeShape};
use registry::TypeRegistryReader;

fn document(components: &str, channels: &str) -> SpecDocument {
    let text = format!(
        "asyncapi: 2.5.0\ninfo:\n  title: Test\n  version: 1.0.0\nchannels:\n{}\ncomponents:\n{}\n",
        channels, components
    );
    normalize_str(&text, Some(SourceFormat::Yaml), Path::new(".")).expect("fixture normalizes")
}

fn fields(shape: &TypeShape) -> Vec<(&str, &TypeRef)> {
    match shape {
        TypeShape::Record { fields } => fields.iter().map(|f| (f.name.as_str(), &f.ty)).collect(),
        other => panic!("expected record, found {:?}", other),
    }
}

const CYCLES: &str = r#"
  schemas:
    Node:
      type: object
      required: [value]
      properties:
        value: { type: integer }
        next: { $ref: '#/components/schemas/Node' }
    A:
      type: object
      properties:
        b: { $ref: '#/components/schemas/B' }
    B:
      type: object
      properties:
        a: { $ref: '#/components/schemas/A' }
"#;

#[test]
fn reference_cycles_terminate_with_one_definition_each() {
    let model = build_types(document(CYCLES, "  {}"), Vec::new()).expect("build");
    assert_eq!(model.registry.list_types(), vec!["A", "B", "Node"]);

    let node = model.registry.get_type("Node").expect("Node");
    assert_eq!(
        fields(&node.shape),
        vec![
            ("value", &TypeRef::Primitive(PrimitiveType::Int64)),
            ("next", &TypeRef::named("Node").optional()),
        ]
    );
    let a = model.registry.get_type("A").expect("A");
    assert_eq!(fields(&a.shape), vec![("b", &TypeRef::named("B").optional())]);
}

#[test]
fn lowering_is_deterministic() {
    let input = document(CYCLES, "  {}");
    let first = build_types(input.clone(), Vec::new()).expect("first");
    let second = build_types(input, Vec::new()).expect("second");
    assert_eq!(first.registry, second.registry);
    assert_eq!(first.document, second.document);
}

#[test]
fn identical_inline_objects_share_a_definition() {
    let components = r#"
  schemas:
    Order:
      type: object
      properties:
        customer:
          type: object
          properties:
            name: { type: string }
        billing:
          type: object
          properties:
            name: { type: string }
"#;
    let model = build_types(document(components, "  {}"), Vec::new()).expect("build");
    let order = model.registry.get_type("Order").expect("Order");
    let minted = TypeRef::named("OrderCustomer").optional();
    assert_eq!(fields(&order.shape), vec![("customer", &minted), ("billing", &minted)]);
    assert_eq!(order.sub_definitions, vec!["OrderCustomer".to_string()]);
    assert_eq!(model.registry.type_count(), 2);
    assert!(model.document.components.schemas.contains_key("OrderCustomer"));
}

#[test]
fn unions_name_variants_and_use_marker_types_for_booleans() {
    let components = r#"
  schemas:
    Ping:
      type: object
      properties:
        event: { type: string }
    Event:
      oneOf:
        - $ref: '#/components/schemas/Ping'
        - true
        - type: string
"#;
    let model = build_types(document(components, "  {}"), Vec::new()).expect("build");
    let TypeShape::Union { variants } = &model.registry.get_type("Event").expect("Event").shape
    else {
        panic!("expected union")
    };
    let names: Vec<&str> = variants.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["Ping", "AlwaysTrue", "String"]);

    let marker = model.registry.get_type("AlwaysTrue").expect("marker");
    assert_eq!(marker.shape, TypeShape::Marker { accepts: true });
    assert_eq!(
        model.document.components.schemas.get("AlwaysTrue"),
        Some(&Schema::Boolean { value: true })
    );
}

#[test]
fn binary_strings_become_upload_records() {
    let components = r#"
  schemas:
    Upload:
      type: object
      required: [file]
      properties:
        file: { type: string, format: binary }
"#;
    let model = build_types(document(components, "  {}"), Vec::new()).expect("build");
    let upload = model.registry.get_type("Upload").expect("Upload");
    assert_eq!(fields(&upload.shape), vec![("file", &TypeRef::named("UploadFile"))]);

    let record = model.registry.get_type("UploadFile").expect("UploadFile");
    let names: Vec<&str> = fields(&record.shape).into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["file_content", "file_name"]);
}

#[test]
fn all_of_merges_member_properties() {
    let components = r#"
  schemas:
    Base:
      type: object
      required: [id]
      properties:
        id: { type: integer, format: int32 }
    Extended:
      allOf:
        - $ref: '#/components/schemas/Base'
        - type: object
          properties:
            id: { type: string }
            label: { type: string }
"#;
    let model = build_types(document(components, "  {}"), Vec::new()).expect("build");
    let extended = model.registry.get_type("Extended").expect("Extended");
    assert_eq!(
        fields(&extended.shape),
        vec![
            ("id", &TypeRef::Primitive(PrimitiveType::Int32)),
            ("label", &TypeRef::Primitive(PrimitiveType::String).optional()),
        ]
    );
}

#[test]
fn recursive_array_alias_is_kept_and_bare_reference_loops_are_rejected() {
    let tree = r#"
  schemas:
    Tree:
      type: array
      items: { $ref: '#/components/schemas/Tree' }
"#;
    let model = build_types(document(tree, "  {}"), Vec::new()).expect("build");
    let definition = model.registry.get_type("Tree").expect("Tree");
    assert_eq!(
        definition.shape,
        TypeShape::Alias { target: TypeRef::Array(Box::new(TypeRef::named("Tree"))) }
    );

    let loops = r#"
  schemas:
    Ping:
      $ref: '#/components/schemas/Pong'
    Pong:
      $ref: '#/components/schemas/Ping'
"#;
    let err = build_types(document(loops, "  {}"), Vec::new()).expect_err("reference loop");
    assert!(matches!(err, TypeModelError::InvalidSchema { .. }));
    assert_eq!(
        err.to_string(),
        "invalid schema at #/components/schemas/Ping: 'Ping' refers back to itself through references only"
    );
}

#[test]
fn unsupported_primitive_names_the_schema_path() {
    let components = r#"
  schemas:
    Price:
      type: object
      properties:
        amount: { type: decimal }
"#;
    let err = build_types(document(components, "  {}"), Vec::new()).expect_err("decimal");
    assert!(matches!(err, TypeModelError::UnsupportedSchemaType { .. }));
    assert_eq!(
        err.to_string(),
        "Unsupported AsyncAPI data type 'decimal' at #/components/schemas/Price/properties/amount"
    );
}

#[test]
fn payloads_are_bound_by_pointer() {
    let components = r#"
  schemas:
    Join:
      type: object
      properties:
        room: { type: string }
  messages:
    Join:
      payload: { $ref: '#/components/schemas/Join' }
    Ack:
      payload:
        type: object
        properties:
          ok: { type: boolean }
"#;
    let channels = r#"
  /:
    subscribe:
      message:
        payload:
          type: array
          items: { type: string, format: byte }
"#;
    let model = build_types(document(components, channels), Vec::new()).expect("build");
    let registry = &model.registry;
    assert_eq!(
        registry.payload_type("#/components/messages/Join/payload"),
        Some(&TypeRef::named("Join"))
    );
    assert_eq!(
        registry.payload_type("#/components/messages/Ack/payload"),
        Some(&TypeRef::named("AckPayload"))
    );
    assert_eq!(
        registry.payload_type("#/channels/~1/subscribe/message/payload"),
        Some(&TypeRef::Array(Box::new(TypeRef::Primitive(PrimitiveType::Bytes))))
    );
}

#[test]
fn pre_existing_definitions_keep_their_names() {
    let components = r#"
  schemas:
    ApiKeysConfig:
      type: string
"#;
    let auth = TypeDefinition {
        name: "ApiKeysConfig".into(),
        description: None,
        shape: TypeShape::Record { fields: Vec::new() },
        sub_definitions: Vec::new(),
        origin: "#/components/securitySchemes/apiKey".into(),
    };
    let model = build_types(document(components, "  {}"), vec![auth]).expect("build");
    assert_eq!(model.registry.component_type("ApiKeysConfig"), Some("ApiKeysConfig_1"));
    assert_eq!(
        model.registry.get_type("ApiKeysConfig").map(|d| &d.shape),
        Some(&TypeShape::Record { fields: Vec::new() })
    );
}
