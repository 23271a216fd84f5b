use ir::{PrimitiveType, Schema, TypeRef};
use types::{builtin_schema, resolve_path_parameter, RustTypeAdapter, TypeAdapter};

#[test]
fn test_rust_adapter_renders_nested_refs() {
    let adapter = RustTypeAdapter;
    assert_eq!(adapter.render(&TypeRef::named("Pet")), "Pet");
    assert_eq!(
        adapter.render(&TypeRef::Array(Box::new(TypeRef::Array(Box::new(TypeRef::Any))))),
        "Vec<Vec<serde_json::Value>>"
    );
    assert_eq!(adapter.render(&TypeRef::Primitive(PrimitiveType::Bytes).optional()), "Option<Vec<u8>>");
    assert_eq!(adapter.stream("Ticker"), "ResponseStream<Ticker>");
}

#[test]
fn test_path_parameters_collapse_byte_formats() {
    assert_eq!(resolve_path_parameter("string", Some("byte")), Ok(PrimitiveType::String));
    assert_eq!(resolve_path_parameter("boolean", None), Ok(PrimitiveType::Boolean));
    assert!(resolve_path_parameter("null", None).is_err());
}

#[test]
fn test_builtin_scalars_map_to_schemas() {
    assert_eq!(
        builtin_schema("int"),
        Some(Schema::Primitive { ty: "integer".into(), format: Some("int64".into()), description: None })
    );
    assert_eq!(builtin_schema("json"), Some(Schema::Any { description: None }));
    assert_eq!(builtin_schema("Ping"), None);
}
