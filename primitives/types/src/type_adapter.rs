use ir::{PrimitiveType, TypeRef};

/// Spells lowered types in a target language.
///
/// ## Usage
///
/// ```rust
/// use ir::{PrimitiveType, TypeRef};
/// use types::{RustTypeAdapter, TypeAdapter};
///
/// let ty = TypeRef::Array(Box::new(TypeRef::Primitive(PrimitiveType::Int32))).optional();
/// assert_eq!(RustTypeAdapter.render(&ty), "Option<Vec<i32>>");
/// ```
pub trait TypeAdapter: Send + Sync {
    /// Short name of the target, for logging
    fn target_name(&self) -> &str;

    /// Spelling of a built-in scalar
    fn primitive(&self, primitive: PrimitiveType) -> String;

    /// Spelling of a sequence of `inner`
    fn array(&self, inner: &str) -> String;

    /// Spelling of a nullable `inner`
    fn optional(&self, inner: &str) -> String;

    /// Spelling of an arbitrary JSON value
    fn any(&self) -> String;

    /// Spelling of a lazy sequence of `inner`
    fn stream(&self, inner: &str) -> String;

    /// Spelling of a full type reference
    fn render(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Primitive(primitive) => self.primitive(*primitive),
            TypeRef::Named(name) => name.clone(),
            TypeRef::Array(inner) => self.array(&self.render(inner)),
            TypeRef::Optional(inner) => self.optional(&self.render(inner)),
            TypeRef::Any => self.any(),
        }
    }
}

/// Rust spelling used by the emitted client crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustTypeAdapter;

impl TypeAdapter for RustTypeAdapter {
    fn target_name(&self) -> &str { "rust" }

    fn primitive(&self, primitive: PrimitiveType) -> String {
        match primitive {
            PrimitiveType::Int32 => "i32",
            PrimitiveType::Int64 => "i64",
            PrimitiveType::Float32 => "f32",
            PrimitiveType::Float64 => "f64",
            PrimitiveType::String => "String",
            PrimitiveType::Boolean => "bool",
            PrimitiveType::Bytes => "Vec<u8>",
        }
        .to_string()
    }

    fn array(&self, inner: &str) -> String { format!("Vec<{}>", inner) }

    fn optional(&self, inner: &str) -> String { format!("Option<{}>", inner) }

    fn any(&self) -> String { "serde_json::Value".to_string() }

    fn stream(&self, inner: &str) -> String { format!("ResponseStream<{}>", inner) }
}
