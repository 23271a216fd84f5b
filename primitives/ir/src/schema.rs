//! Schema tree
//!
//! One tagged variant per AsyncAPI schema form. Every variant carries only the
//! fields that matter for its tag; consumers pattern-match instead of probing
//! optional attributes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Prefix of a local schema reference.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// A normalized AsyncAPI schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schema {
    /// A scalar with a declared `type` and optional `format`
    Primitive {
        /// Declared type (`string`, `integer`, `number`, `boolean`, ...)
        #[serde(rename = "type")]
        ty: String,
        /// Declared format, if any
        format: Option<String>,
        /// Free-text description
        description: Option<String>,
    },
    /// A string enumeration
    Enum {
        /// Allowed values in declaration order
        values: Vec<String>,
        /// Free-text description
        description: Option<String>,
    },
    /// A homogeneous array
    Array {
        /// Element schema
        items: Box<Schema>,
    },
    /// An object with named properties
    Object {
        /// Properties in declaration order
        properties: Vec<Property>,
        /// Free-text description
        description: Option<String>,
    },
    /// A reference to a named schema under `components.schemas`
    Reference {
        /// Name of the referenced component schema
        name: String,
    },
    /// A `oneOf` union
    OneOf {
        /// Member schemas in declaration order
        variants: Vec<Schema>,
    },
    /// An `allOf` composition
    AllOf {
        /// Member schemas in declaration order
        members: Vec<Schema>,
    },
    /// A boolean-literal schema (`true` accepts anything, `false` nothing)
    Boolean {
        /// Literal value
        value: bool,
    },
    /// A schema without type or composition keywords
    Any {
        /// Free-text description
        description: Option<String>,
    },
}

/// A named property of an object schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name as it appears on the wire
    pub name: String,
    /// Property schema
    pub schema: Schema,
    /// Whether the property is listed in `required`
    pub required: bool,
}

impl Schema {
    /// Shorthand for a local reference to `components.schemas.<name>`
    pub fn reference(name: impl Into<String>) -> Self { Schema::Reference { name: name.into() } }

    /// Shorthand for a primitive schema without format or description
    pub fn primitive(ty: impl Into<String>) -> Self {
        Schema::Primitive { ty: ty.into(), format: None, description: None }
    }

    /// Description attached to this schema, if its variant carries one
    pub fn description(&self) -> Option<&str> {
        match self {
            Schema::Primitive { description, .. }
            | Schema::Enum { description, .. }
            | Schema::Object { description, .. }
            | Schema::Any { description } => description.as_deref(),
            _ => None,
        }
    }

    /// Name of the component this schema points at, if it is a reference
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            Schema::Reference { name } => Some(name),
            _ => None,
        }
    }

    /// Short label used in error messages (`array`, `object`, `integer`, ...)
    pub fn type_label(&self) -> String {
        match self {
            Schema::Primitive { ty, .. } => ty.clone(),
            Schema::Enum { .. } => "string".to_string(),
            Schema::Array { .. } => "array".to_string(),
            Schema::Object { .. } => "object".to_string(),
            Schema::Reference { name } => format!("$ref {}{}", SCHEMA_REF_PREFIX, name),
            Schema::OneOf { .. } => "oneOf".to_string(),
            Schema::AllOf { .. } => "allOf".to_string(),
            Schema::Boolean { value } => value.to_string(),
            Schema::Any { .. } => "any".to_string(),
        }
    }

    /// Render this schema as an AsyncAPI JSON tree.
    ///
    /// Boolean-literal schemas render as a bare `true`/`false`, never wrapped
    /// in an object.
    pub fn to_value(&self) -> Value {
        match self {
            Schema::Primitive { ty, format, description } => {
                let mut map = Map::new();
                map.insert("type".to_string(), json!(ty));
                if let Some(format) = format {
                    map.insert("format".to_string(), json!(format));
                }
                insert_description(&mut map, description);
                Value::Object(map)
            }
            Schema::Enum { values, description } => {
                let mut map = Map::new();
                map.insert("type".to_string(), json!("string"));
                map.insert("enum".to_string(), json!(values));
                insert_description(&mut map, description);
                Value::Object(map)
            }
            Schema::Array { items } => json!({ "type": "array", "items": items.to_value() }),
            Schema::Object { properties, description } => {
                let mut map = Map::new();
                map.insert("type".to_string(), json!("object"));
                insert_description(&mut map, description);
                let mut props = Map::new();
                for property in properties {
                    props.insert(property.name.clone(), property.schema.to_value());
                }
                map.insert("properties".to_string(), Value::Object(props));
                let required: Vec<&str> =
                    properties.iter().filter(|p| p.required).map(|p| p.name.as_str()).collect();
                if !required.is_empty() {
                    map.insert("required".to_string(), json!(required));
                }
                Value::Object(map)
            }
            Schema::Reference { name } => json!({ "$ref": format!("{}{}", SCHEMA_REF_PREFIX, name) }),
            Schema::OneOf { variants } => {
                json!({ "oneOf": variants.iter().map(Schema::to_value).collect::<Vec<_>>() })
            }
            Schema::AllOf { members } => {
                json!({ "allOf": members.iter().map(Schema::to_value).collect::<Vec<_>>() })
            }
            Schema::Boolean { value } => Value::Bool(*value),
            Schema::Any { description } => {
                let mut map = Map::new();
                insert_description(&mut map, description);
                Value::Object(map)
            }
        }
    }
}

fn insert_description(map: &mut Map<String, Value>, description: &Option<String>) {
    if let Some(description) = description {
        map.insert("description".to_string(), json!(description));
    }
}
