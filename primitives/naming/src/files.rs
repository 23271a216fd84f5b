//! Output file-name resolution.

/// Resolve a file name that does not clash with `existing`.
///
/// When `<stem>.<extension>` is free it is used as-is. Otherwise the name
/// becomes `<stem>.<N>.<extension>`, where `N` starts at the number of
/// existing files that share the stem and increases until the name is free.
/// `existing` is scanned in sorted order so the result does not depend on
/// directory iteration order.
pub fn resolve_file_name(stem: &str, extension: &str, existing: &[String]) -> String {
    let mut existing: Vec<&str> = existing.iter().map(String::as_str).collect();
    existing.sort_unstable();

    let plain = format!("{}.{}", stem, extension);
    if !existing.contains(&plain.as_str()) {
        return plain;
    }

    let same_stem = existing
        .iter()
        .filter(|name| name.split('.').next() == Some(stem))
        .count();
    let mut counter = same_stem.max(1);
    loop {
        let candidate = format!("{}.{}.{}", stem, counter, extension);
        if !existing.contains(&candidate.as_str()) {
            return candidate;
        }
        counter += 1;
    }
}
