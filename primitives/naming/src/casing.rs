//! Word splitting and case conversion.

/// Rust keywords that can be used as raw identifiers (`r#type`).
const RAW_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
    "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where", "while",
    "abstract", "become", "box", "do", "final", "macro", "override", "priv", "try", "typeof",
    "unsized", "virtual", "yield",
];

/// Keywords that cannot be raw identifiers and get a trailing underscore.
const RESERVED_KEYWORDS: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Split an arbitrary string into words.
///
/// Any character that is not ASCII alphanumeric separates words, and so do
/// lower→upper transitions (`userId`) and the end of an acronym (`HTTPServer`).
pub fn split_words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let camel_hump = prev.is_ascii_lowercase() && c.is_ascii_uppercase();
            let acronym_end = prev.is_ascii_uppercase()
                && c.is_ascii_uppercase()
                && next.is_some_and(|n| n.is_ascii_lowercase());
            if camel_hump || acronym_end {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Capitalize the first letter of a string
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Convert to `snake_case`, prefixing `_` when the result would start with a digit
pub fn to_snake_case(input: &str) -> String {
    let joined =
        split_words(input).iter().map(|w| w.to_ascii_lowercase()).collect::<Vec<_>>().join("_");
    guard_leading_digit(joined)
}

/// Convert to `PascalCase`, prefixing `_` when the result would start with a digit
pub fn to_pascal_case(input: &str) -> String {
    let joined: String =
        split_words(input).iter().map(|w| capitalize(&w.to_ascii_lowercase())).collect();
    guard_leading_digit(joined)
}

/// `PascalCase` label of a channel path; the bare root becomes `Root`
pub fn channel_label(path: &str) -> String {
    let label = to_pascal_case(path);
    if label.is_empty() {
        "Root".to_string()
    } else {
        label
    }
}

fn guard_leading_digit(name: String) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", name)
    } else {
        name
    }
}

/// Escape Rust keywords (`type` → `r#type`, `self` → `self_`)
pub fn escape_keyword(name: &str) -> String {
    if RESERVED_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else if RAW_KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("userId"), vec!["user", "Id"]);
        assert_eq!(split_words("HTTPServer"), vec!["HTTP", "Server"]);
        assert_eq!(split_words("x-rate-limit"), vec!["x", "rate", "limit"]);
        assert_eq!(split_words("  "), Vec::<String>::new());
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(to_snake_case("GetBlockchainInfo"), "get_blockchain_info");
        assert_eq!(to_snake_case("user-id"), "user_id");
        assert_eq!(to_pascal_case("ticker_update"), "TickerUpdate");
        assert_eq!(to_pascal_case("2fa code"), "_2faCode");
        assert_eq!(capitalize("hello"), "Hello");
        assert_eq!(channel_label("/rooms/{roomId}"), "RoomsRoomId");
        assert_eq!(channel_label("/"), "Root");
    }

    #[test]
    fn test_escape_keyword() {
        assert_eq!(escape_keyword("type"), "r#type");
        assert_eq!(escape_keyword("self"), "self_");
        assert_eq!(escape_keyword("name"), "name");
    }
}
