use ir::Schema;

/// Schema for a built-in scalar of the service language.
///
/// `json` and `anydata` carry any value and map to the empty schema.
/// Returns `None` for names that are not built-in scalars.
pub fn builtin_schema(name: &str) -> Option<Schema> {
    let (ty, format) = match name {
        "string" => ("string", None),
        "int" => ("integer", Some("int64")),
        "float" => ("number", Some("float")),
        "decimal" => ("number", Some("double")),
        "boolean" => ("boolean", None),
        "byte" => ("string", Some("byte")),
        "json" | "anydata" => return Some(Schema::Any { description: None }),
        _ => return None,
    };
    Some(Schema::Primitive {
        ty: ty.to_string(),
        format: format.map(str::to_string),
        description: None,
    })
}
