use asyncgen_analysis::TypeGraphValidator;
use ir::{FieldDefinition, PrimitiveType, TypeDefinition, TypeRef, TypeShape, UnionVariant};
use registry::TypeRegistry;

fn definition(name: &str, shape: TypeShape) -> TypeDefinition {
    TypeDefinition {
        name: name.into(),
        description: None,
        shape,
        sub_definitions: Vec::new(),
        origin: format!("#/components/schemas/{}", name),
    }
}

fn field(name: &str, ty: TypeRef) -> FieldDefinition {
    FieldDefinition { name: name.into(), wire_name: name.into(), ty, required: true, description: None }
}

#[test]
fn closed_graph_is_valid() {
    let mut registry = TypeRegistry::new();
    registry
        .insert(definition(
            "Node",
            TypeShape::Record {
                fields: vec![
                    field("value", TypeRef::Primitive(PrimitiveType::Int64)),
                    field("next", TypeRef::named("Node").optional()),
                ],
            },
        ))
        .expect("insert");
    registry.bind_payload("#/components/messages/Push/payload", TypeRef::named("Node"));

    assert!(TypeGraphValidator::new().validate(&registry).is_empty());
}

#[test]
fn dangling_names_are_reported() {
    let mut registry = TypeRegistry::new();
    registry
        .insert(definition(
            "Event",
            TypeShape::Union {
                variants: vec![UnionVariant { name: "Ping".into(), ty: TypeRef::named("Ping") }],
            },
        ))
        .expect("insert");
    registry.bind_payload("#/x/payload", TypeRef::Array(Box::new(TypeRef::named("Pong"))));

    let errors = TypeGraphValidator::new().validate(&registry);
    assert_eq!(
        errors,
        vec![
            "type `Event` references unknown type `Ping`".to_string(),
            "payload at #/x/payload references unknown type `Pong`".to_string(),
        ]
    );
}

#[test]
fn duplicate_fields_and_empty_unions_are_reported() {
    let mut registry = TypeRegistry::new();
    registry
        .insert(definition(
            "Pair",
            TypeShape::Record {
                fields: vec![
                    field("a", TypeRef::Primitive(PrimitiveType::String)),
                    field("a", TypeRef::Primitive(PrimitiveType::String)),
                ],
            },
        ))
        .expect("insert");
    registry.insert(definition("Nothing", TypeShape::Union { variants: Vec::new() })).expect("insert");

    let errors = TypeGraphValidator::new().validate(&registry);
    assert!(errors.contains(&"union `Nothing` has no variants".to_string()));
    assert!(errors.iter().any(|e| e.contains("duplicate field `a`")));
}
