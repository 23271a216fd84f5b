//! Lowered type model
//!
//! Schemas lower into named definitions that reference each other by name.
//! A definition never inlines another named definition, which is what lets
//! self-referential schemas terminate.

use serde::{Deserialize, Serialize};

/// A named type produced by lowering a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Unique type name (post name-resolution)
    pub name: String,
    /// Doc text carried over from the schema
    pub description: Option<String>,
    /// Structure of the type
    pub shape: TypeShape,
    /// Names of definitions synthesized for anonymous nested structures
    pub sub_definitions: Vec<String>,
    /// Pointer of the schema this definition was lowered from
    pub origin: String,
}

/// Structure of a lowered type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TypeShape {
    /// Named fields
    Record {
        /// Fields in declaration order
        fields: Vec<FieldDefinition>,
    },
    /// One of several alternatives
    Union {
        /// Variants in declaration order
        variants: Vec<UnionVariant>,
    },
    /// Another name for an existing type
    Alias {
        /// Aliased type
        target: TypeRef,
    },
    /// A closed set of string values
    Enum {
        /// Values in declaration order
        values: Vec<String>,
    },
    /// Boolean-literal marker: accepts every value or none
    Marker {
        /// `true` for the always-true schema
        accepts: bool,
    },
}

/// A record field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Target identifier
    pub name: String,
    /// Property name on the wire
    pub wire_name: String,
    /// Field type, already wrapped in `Optional` when not required
    pub ty: TypeRef,
    /// Whether the property is required
    pub required: bool,
    /// Doc text
    pub description: Option<String>,
}

/// A union variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnionVariant {
    /// Variant identifier
    pub name: String,
    /// Variant payload type
    pub ty: TypeRef,
}

/// A use-site reference to a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "ref", content = "of", rename_all = "snake_case")]
pub enum TypeRef {
    /// Built-in scalar
    Primitive(PrimitiveType),
    /// A definition in the type graph
    Named(String),
    /// Sequence of the inner type
    Array(Box<TypeRef>),
    /// Nullable inner type
    Optional(Box<TypeRef>),
    /// Any JSON value
    Any,
}

impl TypeRef {
    /// Shorthand for a named reference
    pub fn named(name: impl Into<String>) -> Self { TypeRef::Named(name.into()) }

    /// Wrap in `Optional` unless already optional
    pub fn optional(self) -> Self {
        match self {
            TypeRef::Optional(_) => self,
            other => TypeRef::Optional(Box::new(other)),
        }
    }

    /// Every named definition this reference mentions
    pub fn named_targets(&self) -> Vec<&str> {
        match self {
            TypeRef::Named(name) => vec![name.as_str()],
            TypeRef::Array(inner) | TypeRef::Optional(inner) => inner.named_targets(),
            TypeRef::Primitive(_) | TypeRef::Any => Vec::new(),
        }
    }
}

/// Built-in scalars every target emitter must map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// UTF-8 string
    String,
    /// Boolean
    Boolean,
    /// Raw bytes
    Bytes,
}

impl PrimitiveType {
    /// Name of the type in the AsyncAPI schema vocabulary
    pub fn schema_type(&self) -> &'static str {
        match self {
            PrimitiveType::Int32 | PrimitiveType::Int64 => "integer",
            PrimitiveType::Float32 | PrimitiveType::Float64 => "number",
            PrimitiveType::String | PrimitiveType::Bytes => "string",
            PrimitiveType::Boolean => "boolean",
        }
    }
}

impl TypeShape {
    /// Every named definition referenced by this shape
    pub fn named_targets(&self) -> Vec<&str> {
        match self {
            TypeShape::Record { fields } => {
                fields.iter().flat_map(|f| f.ty.named_targets()).collect()
            }
            TypeShape::Union { variants } => {
                variants.iter().flat_map(|v| v.ty.named_targets()).collect()
            }
            TypeShape::Alias { target } => target.named_targets(),
            TypeShape::Enum { .. } | TypeShape::Marker { .. } => Vec::new(),
        }
    }
}
