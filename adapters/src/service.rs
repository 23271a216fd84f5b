//! Service declaration loader
//!
//! A service declaration is a small JSON or YAML file:
//!
//! ```yaml
//! name: chat
//! basePath: /chat/{room: string}
//! annotations:
//!   - name: websocket:ServiceConfig
//!     fields:
//!       dispatcherKey: '"event"'
//! methods:
//!   - name: onPing
//!     params: [{ name: message, type: Ping }]
//!     returns: Pong
//! types:
//!   Ping: { type: object, properties: { event: { type: string } } }
//! ```
//!
//! Annotation field values are kept as raw expressions; interpreting them is
//! the job of the dispatcher extractor.

use std::collections::BTreeMap;

use ir::{Annotation, MethodParam, PathSegment, RemoteMethod, ServiceDefinition, TypeExpr};
use serde::Deserialize;
use serde_json::Value;

use crate::schema::parse_schema;
use crate::{NormalizeError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawService {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    base_path: Option<String>,
    #[serde(default)]
    annotations: Vec<RawAnnotation>,
    #[serde(default)]
    methods: Vec<RawMethod>,
    #[serde(default)]
    types: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawAnnotation {
    name: String,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawMethod {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    params: Vec<RawParam>,
    #[serde(default)]
    returns: Option<TypeExpr>,
}

#[derive(Debug, Deserialize)]
struct RawParam {
    name: String,
    #[serde(rename = "type")]
    ty: TypeExpr,
}

/// Convert a parsed service declaration.
pub fn parse_service(root: Value) -> Result<ServiceDefinition> {
    let raw: RawService =
        serde_json::from_value(root).map_err(|e| NormalizeError::format("#", e.to_string()))?;

    let base_path = match raw.base_path.as_deref() {
        None => Vec::new(),
        Some(path) => parse_base_path(path)?,
    };

    let annotations = raw
        .annotations
        .into_iter()
        .enumerate()
        .map(|(i, annotation)| parse_annotation(annotation, i))
        .collect::<Result<Vec<_>>>()?;

    let methods = raw
        .methods
        .into_iter()
        .map(|method| RemoteMethod {
            name: method.name,
            description: method.description,
            params: method
                .params
                .into_iter()
                .map(|p| MethodParam { name: p.name, ty: p.ty })
                .collect(),
            returns: method.returns,
        })
        .collect();

    let mut types = BTreeMap::new();
    for (name, schema) in &raw.types {
        types.insert(name.clone(), parse_schema(schema, &format!("#/types/{}", name))?);
    }

    Ok(ServiceDefinition {
        name: raw.name,
        description: raw.description,
        base_path,
        annotations,
        methods,
        types,
    })
}

/// Parse `/chat/{room: string}` or the bare root `.`
pub fn parse_base_path(path: &str) -> Result<Vec<PathSegment>> {
    let trimmed = path.trim();
    if trimmed == "." {
        return Ok(vec![PathSegment::Root]);
    }

    let mut segments = Vec::new();
    for segment in trimmed.split('/').filter(|s| !s.is_empty()) {
        let parsed = match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(inner) => {
                let (name, ty) = inner.split_once(':').ok_or_else(|| {
                    NormalizeError::format(
                        "#/basePath",
                        format!("path parameter '{}' must be written as {{name: type}}", inner),
                    )
                })?;
                let ty = ty
                    .trim()
                    .parse::<TypeExpr>()
                    .map_err(|e| NormalizeError::format("#/basePath", e.to_string()))?;
                PathSegment::Param { name: name.trim().to_string(), ty }
            }
            None => PathSegment::Literal(segment.to_string()),
        };
        segments.push(parsed);
    }
    Ok(segments)
}

fn parse_annotation(raw: RawAnnotation, index: usize) -> Result<Annotation> {
    let location = format!("#/annotations/{}", index);
    let (namespace, kind) = raw.name.split_once(':').ok_or_else(|| {
        NormalizeError::format(
            location.as_str(),
            format!("annotation '{}' must be written as module:Name", raw.name),
        )
    })?;

    let fields = raw
        .fields
        .into_iter()
        .map(|(key, value)| {
            // Values are expressions; a JSON string is the expression text itself.
            let expression = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            (key, expression)
        })
        .collect();

    Ok(Annotation { namespace: namespace.trim().to_string(), kind: kind.trim().to_string(), fields })
}
