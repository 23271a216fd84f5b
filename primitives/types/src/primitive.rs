use ir::PrimitiveType;

use crate::UnsupportedSchemaType;

/// Outcome of resolving a primitive schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveResolution {
    /// Maps to a built-in scalar
    Scalar(PrimitiveType),
    /// `string` + `binary`: an upload carrying bytes and a file name
    BinaryUpload,
}

/// Resolve a schema `type`/`format` pair.
///
/// | type    | format              | result    |
/// |---------|---------------------|-----------|
/// | integer | int32               | Int32     |
/// | integer | (other / none)      | Int64     |
/// | number  | float               | Float32   |
/// | number  | int32 / int64       | Int32 / Int64 |
/// | number  | (other / none)      | Float64   |
/// | string  | binary              | upload    |
/// | string  | byte                | Bytes     |
/// | string  | (other / none)      | String    |
/// | boolean | any                 | Boolean   |
pub fn resolve_primitive(
    ty: &str,
    format: Option<&str>,
) -> Result<PrimitiveResolution, UnsupportedSchemaType> {
    use PrimitiveResolution::{BinaryUpload, Scalar};

    let resolution = match (ty, format) {
        ("integer", Some("int32")) => Scalar(PrimitiveType::Int32),
        ("integer", _) => Scalar(PrimitiveType::Int64),
        ("number", Some("float")) => Scalar(PrimitiveType::Float32),
        ("number", Some("int32")) => Scalar(PrimitiveType::Int32),
        ("number", Some("int64")) => Scalar(PrimitiveType::Int64),
        ("number", _) => Scalar(PrimitiveType::Float64),
        ("string", Some("binary")) => BinaryUpload,
        ("string", Some("byte")) => Scalar(PrimitiveType::Bytes),
        ("string", _) => Scalar(PrimitiveType::String),
        ("boolean", _) => Scalar(PrimitiveType::Boolean),
        (other, format) => {
            return Err(UnsupportedSchemaType {
                ty: other.to_string(),
                format: format.map(str::to_string),
            })
        }
    };
    Ok(resolution)
}

/// Resolve the type of a channel path parameter.
///
/// Path parameters travel inside the URL, so byte and upload formats collapse
/// to plain strings. Array schemas are rejected by the caller before this
/// point because they need their own error.
pub fn resolve_path_parameter(
    ty: &str,
    format: Option<&str>,
) -> Result<PrimitiveType, UnsupportedSchemaType> {
    match resolve_primitive(ty, format)? {
        PrimitiveResolution::Scalar(PrimitiveType::Bytes) | PrimitiveResolution::BinaryUpload => {
            Ok(PrimitiveType::String)
        }
        PrimitiveResolution::Scalar(primitive) => Ok(primitive),
    }
}
