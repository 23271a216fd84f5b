//! Service surface
//!
//! The forward direction reads a service declaration (annotations, a base
//! path, remote methods and the named types they use) and derives channels
//! from it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::Schema;

/// A service declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Service name
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Relative base path segments
    pub base_path: Vec<PathSegment>,
    /// Annotations attached to the service
    pub annotations: Vec<Annotation>,
    /// Remote methods in declaration order
    pub methods: Vec<RemoteMethod>,
    /// Named types used by method signatures
    pub types: BTreeMap<String, Schema>,
}

/// One segment of a service base path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    /// Fixed text
    Literal(String),
    /// A typed path parameter
    Param {
        /// Parameter name
        name: String,
        /// Declared type
        ty: TypeExpr,
    },
    /// The bare root (`.`)
    Root,
}

/// A configuration annotation such as `websocket:ServiceConfig { ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Module prefix (`websocket`)
    pub namespace: String,
    /// Annotation kind (`ServiceConfig`)
    pub kind: String,
    /// Field key and raw value expression, in declaration order
    pub fields: Vec<(String, String)>,
}

impl Annotation {
    /// Raw value expression of a field
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// A remote method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMethod {
    /// Method name (`onPing`)
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Parameters in declaration order
    pub params: Vec<MethodParam>,
    /// Declared return type
    pub returns: Option<TypeExpr>,
}

/// A remote method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodParam {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub ty: TypeExpr,
}

/// Built-in scalar type names of the service language.
pub const BUILTIN_SCALARS: &[&str] =
    &["string", "int", "float", "decimal", "boolean", "byte", "json", "anydata"];

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeExpr {
    /// Built-in scalar (`string`, `int`, ...)
    Builtin(String),
    /// User-defined named type
    Named(String),
    /// `stream<T>`
    Stream(Box<TypeExpr>),
    /// `T[]`
    Array(Box<TypeExpr>),
    /// `T?`
    Optional(Box<TypeExpr>),
    /// `A|B`
    Union(Vec<TypeExpr>),
}

/// Error raised when a type expression cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type expression '{input}': {reason}")]
pub struct TypeExprError {
    /// The offending text
    pub input: String,
    /// What was wrong with it
    pub reason: String,
}

impl FromStr for TypeExpr {
    type Err = TypeExprError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let fail = |reason: &str| TypeExprError { input: input.to_string(), reason: reason.into() };
        let text = input.trim();
        if text.is_empty() {
            return Err(fail("empty type"));
        }

        let members = split_top_level(text, '|');
        if members.len() > 1 {
            let parsed = members.iter().map(|m| m.parse()).collect::<Result<Vec<_>, _>>()?;
            return Ok(TypeExpr::Union(parsed));
        }

        if let Some(inner) = text.strip_suffix('?') {
            return Ok(TypeExpr::Optional(Box::new(inner.parse()?)));
        }
        if let Some(inner) = text.strip_suffix("[]") {
            return Ok(TypeExpr::Array(Box::new(inner.parse()?)));
        }
        if let Some(rest) = text.strip_prefix("stream<") {
            let inner = rest.strip_suffix('>').ok_or_else(|| fail("unterminated stream<...>"))?;
            // `stream<T, error?>` carries a completion type we do not model.
            let element = split_top_level(inner, ',');
            let first = element.first().ok_or_else(|| fail("empty stream element"))?;
            return Ok(TypeExpr::Stream(Box::new(first.parse()?)));
        }
        if !text.chars().all(|c| c.is_alphanumeric() || c == '_' || c == ':') {
            return Err(fail("unexpected character"));
        }
        if BUILTIN_SCALARS.contains(&text) {
            Ok(TypeExpr::Builtin(text.to_string()))
        } else {
            Ok(TypeExpr::Named(text.to_string()))
        }
    }
}

fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if c == separator && depth == 0 {
            parts.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    parts.push(current.trim().to_string());
    parts
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Builtin(name) | TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::Stream(inner) => write!(f, "stream<{}>", inner),
            TypeExpr::Array(inner) => write!(f, "{}[]", inner),
            TypeExpr::Optional(inner) => write!(f, "{}?", inner),
            TypeExpr::Union(members) => {
                let parts: Vec<String> = members.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join("|"))
            }
        }
    }
}

impl TryFrom<String> for TypeExpr {
    type Error = TypeExprError;

    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<TypeExpr> for String {
    fn from(value: TypeExpr) -> Self { value.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_expressions() {
        let expr: TypeExpr = "stream<Ticker, error?>".parse().expect("parse");
        assert_eq!(expr, TypeExpr::Stream(Box::new(TypeExpr::Named("Ticker".into()))));

        let expr: TypeExpr = "int[]?".parse().expect("parse");
        assert_eq!(
            expr,
            TypeExpr::Optional(Box::new(TypeExpr::Array(Box::new(TypeExpr::Builtin(
                "int".into()
            )))))
        );

        let expr: TypeExpr = "Ping|Pong".parse().expect("parse");
        assert_eq!(expr.to_string(), "Ping|Pong");
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<TypeExpr>().is_err());
        assert!("map<string".parse::<TypeExpr>().is_err());
        assert!("stream<int".parse::<TypeExpr>().is_err());
    }
}
