//! `{name}` placeholders in channel path templates.

use std::sync::OnceLock;

use regex::Regex;

/// One `{name}` occurrence in a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Byte offset of the opening brace
    pub start: usize,
    /// Byte offset just past the closing brace
    pub end: usize,
    /// Name between the braces, trimmed
    pub name: String,
}

fn pattern() -> Result<&'static Regex, regex::Error> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([^{}]+)\}")).as_ref().map_err(Clone::clone)
}

/// Placeholders of `template` in declaration order.
pub fn placeholders(template: &str) -> Result<Vec<Placeholder>, regex::Error> {
    Ok(pattern()?
        .captures_iter(template)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let name = captures.get(1)?;
            Some(Placeholder { start: whole.start(), end: whole.end(), name: name.as_str().trim().to_string() })
        })
        .collect())
}
