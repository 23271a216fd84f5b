//! Serialization formats
//!
//! JSON and YAML both go through `serde_json::Value`, which keeps key order,
//! so converting a document between the two never reorders it.

use std::path::Path;

use serde_json::Value;

use crate::{NormalizeError, Result};

/// A supported on-disk format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl SourceFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("json") => Some(SourceFormat::Json),
            Some("yaml") | Some("yml") => Some(SourceFormat::Yaml),
            _ => None,
        }
    }

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Json => "json",
            SourceFormat::Yaml => "yaml",
        }
    }
}

/// Parse text in the given format, or sniff it when `format` is `None`
pub fn parse_text(text: &str, format: Option<SourceFormat>) -> Result<Value> {
    match format {
        Some(SourceFormat::Json) => serde_json::from_str(text)
            .map_err(|e| NormalizeError::format("#", format!("malformed JSON: {}", e))),
        Some(SourceFormat::Yaml) => serde_yaml::from_str(text)
            .map_err(|e| NormalizeError::format("#", format!("malformed YAML: {}", e))),
        None => serde_json::from_str(text).or_else(|_| {
            serde_yaml::from_str(text).map_err(|e| {
                NormalizeError::format("#", format!("document is neither JSON nor YAML: {}", e))
            })
        }),
    }
}

/// Render a value in the given format
pub fn render(value: &Value, format: SourceFormat) -> Result<String> {
    let rendered = match format {
        SourceFormat::Json => serde_json::to_string_pretty(value).map(|mut s| {
            s.push('\n');
            s
        }),
        SourceFormat::Yaml => {
            return serde_yaml::to_string(value)
                .map_err(|e| NormalizeError::format("#", format!("cannot render YAML: {}", e)))
        }
    };
    rendered.map_err(|e| NormalizeError::format("#", format!("cannot render JSON: {}", e)))
}

/// Convert a document between formats
pub fn convert(text: &str, from: Option<SourceFormat>, to: SourceFormat) -> Result<String> {
    render(&parse_text(text, from)?, to)
}
