//! Schema conversion (JSON tree → [`ir::Schema`]).

use ir::pointer::escape_segment;
use ir::{Property, Schema, SCHEMA_REF_PREFIX};
use serde_json::{Map, Value};

use crate::{NormalizeError, Result};

/// Convert the schema at `location`.
pub fn parse_schema(value: &Value, location: &str) -> Result<Schema> {
    let map = match value {
        Value::Bool(value) => return Ok(Schema::Boolean { value: *value }),
        Value::Object(map) => map,
        other => {
            return Err(NormalizeError::format(
                location,
                format!("schema must be an object or a boolean, found {}", kind_of(other)),
            ))
        }
    };

    if let Some(reference) = map.get("$ref") {
        let reference = reference
            .as_str()
            .ok_or_else(|| NormalizeError::format(location, "$ref must be a string"))?;
        return Ok(Schema::Reference { name: schema_ref_name(reference, location)? });
    }

    if let Some(variants) = map.get("oneOf").or_else(|| map.get("anyOf")) {
        let key = if map.contains_key("oneOf") { "oneOf" } else { "anyOf" };
        return Ok(Schema::OneOf { variants: parse_list(variants, &format!("{location}/{key}"))? });
    }
    if let Some(members) = map.get("allOf") {
        return Ok(Schema::AllOf { members: parse_list(members, &format!("{location}/allOf"))? });
    }

    let description = string_field(map, "description");
    let ty = declared_type(map, location)?;

    if let Some(Value::Array(values)) = map.get("enum") {
        let strings: Option<Vec<String>> =
            values.iter().map(|v| v.as_str().map(str::to_string)).collect();
        if let (Some(values), None | Some("string")) = (strings, ty.as_deref()) {
            return Ok(Schema::Enum { values, description });
        }
    }

    match ty.as_deref() {
        Some("array") => {
            let items = map.get("items").ok_or_else(|| {
                NormalizeError::format(location, "array schema must declare items")
            })?;
            Ok(Schema::Array { items: Box::new(parse_schema(items, &format!("{location}/items"))?) })
        }
        Some("object") | None if map.contains_key("properties") => {
            parse_object(map, location, description)
        }
        Some("object") | None => Ok(Schema::Any { description }),
        Some(other) => Ok(Schema::Primitive {
            ty: other.to_string(),
            format: string_field(map, "format"),
            description,
        }),
    }
}

fn parse_object(map: &Map<String, Value>, location: &str, description: Option<String>) -> Result<Schema> {
    let required: Vec<&str> = match map.get("required") {
        None => Vec::new(),
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        Some(_) => {
            return Err(NormalizeError::format(
                format!("{location}/required"),
                "required must be a list of property names",
            ))
        }
    };
    let properties = match map.get("properties") {
        Some(Value::Object(properties)) => properties,
        _ => {
            return Err(NormalizeError::format(
                format!("{location}/properties"),
                "properties must be an object",
            ))
        }
    };

    let mut parsed = Vec::with_capacity(properties.len());
    for (name, schema) in properties {
        let property_location = format!("{location}/properties/{}", escape_segment(name));
        parsed.push(Property {
            name: name.clone(),
            schema: parse_schema(schema, &property_location)?,
            required: required.contains(&name.as_str()),
        });
    }
    Ok(Schema::Object { properties: parsed, description })
}

fn parse_list(value: &Value, location: &str) -> Result<Vec<Schema>> {
    let items = value
        .as_array()
        .ok_or_else(|| NormalizeError::format(location, "expected a list of schemas"))?;
    if items.is_empty() {
        return Err(NormalizeError::format(location, "composition must not be empty"));
    }
    items.iter().enumerate().map(|(i, item)| parse_schema(item, &format!("{location}/{i}"))).collect()
}

/// `type` may be a string or a list such as `["string", "null"]`.
fn declared_type(map: &Map<String, Value>, location: &str) -> Result<Option<String>> {
    match map.get("type") {
        None => Ok(None),
        Some(Value::String(ty)) => Ok(Some(ty.clone())),
        Some(Value::Array(types)) => {
            let concrete: Vec<&str> =
                types.iter().filter_map(Value::as_str).filter(|t| *t != "null").collect();
            match concrete.as_slice() {
                [single] => Ok(Some(single.to_string())),
                _ => Err(NormalizeError::format(
                    format!("{location}/type"),
                    "a type list must name exactly one non-null type",
                )),
            }
        }
        Some(_) => Err(NormalizeError::format(format!("{location}/type"), "type must be a string")),
    }
}

/// Component name of a local schema reference
pub fn schema_ref_name(reference: &str, location: &str) -> Result<String> {
    reference
        .strip_prefix(SCHEMA_REF_PREFIX)
        .filter(|name| !name.is_empty() && !name.contains('/'))
        .map(unescape_segment)
        .ok_or_else(|| NormalizeError::unresolved(reference, location))
}

/// Undo [`escape_segment`]
pub fn unescape_segment(segment: &str) -> String { segment.replace("~1", "/").replace("~0", "~") }

pub(crate) fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
