//! External reference inlining
//!
//! `$ref`s that name another file (`common.yaml#/components/schemas/Pet`) are
//! loaded relative to the referring file, imported into the root document's
//! components section and rewritten to local references. Local references
//! inside imported content point into the imported file, so they are followed
//! the same way. Each file is read at most once and each target is imported at
//! most once, which also terminates reference cycles between files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ir::pointer::escape_segment;
use serde_json::{Map, Value};

use crate::format::{parse_text, SourceFormat};
use crate::schema::unescape_segment;
use crate::{read_file, NormalizeError, Result};

#[derive(Default)]
struct ImportState {
    files: BTreeMap<PathBuf, Value>,
    imported: BTreeMap<(PathBuf, String), String>,
    imports: Vec<Import>,
}

struct Import {
    bucket: &'static str,
    name: String,
    value: Value,
    reference: String,
}

/// Resolve every external reference reachable from `root`.
pub fn inline_external_refs(root: &mut Value, base_dir: &Path) -> Result<()> {
    let mut state = ImportState::default();
    rewrite_refs(root, None, base_dir, "#", &mut state)?;
    if state.imports.is_empty() {
        return Ok(());
    }

    let root_map = root
        .as_object_mut()
        .ok_or_else(|| NormalizeError::format("#", "document root must be an object"))?;
    let components = root_map
        .entry("components")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| NormalizeError::format("#/components", "components must be an object"))?;

    for import in state.imports {
        let bucket = components
            .entry(import.bucket)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| {
                NormalizeError::format(
                    format!("#/components/{}", import.bucket),
                    "expected an object",
                )
            })?;
        match bucket.get(&import.name) {
            Some(existing) if *existing != import.value => {
                return Err(NormalizeError::format(
                    format!("#/components/{}/{}", import.bucket, escape_segment(&import.name)),
                    format!("conflicts with the target of external reference '{}'", import.reference),
                ))
            }
            Some(_) => {}
            None => {
                tracing::debug!(reference = %import.reference, name = %import.name, "imported external reference");
                bucket.insert(import.name, import.value);
            }
        }
    }
    Ok(())
}

fn rewrite_refs(
    value: &mut Value,
    file: Option<&Path>,
    base_dir: &Path,
    location: &str,
    state: &mut ImportState,
) -> Result<()> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                let reference = reference.clone();
                if let Some(local) = resolve(&reference, file, base_dir, location, state)? {
                    map.insert("$ref".to_string(), Value::String(local));
                }
                return Ok(());
            }
            for (key, child) in map.iter_mut() {
                let child_location = format!("{}/{}", location, escape_segment(key));
                rewrite_refs(child, file, base_dir, &child_location, state)?;
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter_mut().enumerate() {
                rewrite_refs(child, file, base_dir, &format!("{}/{}", location, i), state)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn resolve(
    reference: &str,
    file: Option<&Path>,
    base_dir: &Path,
    location: &str,
    state: &mut ImportState,
) -> Result<Option<String>> {
    let (file_part, pointer) = reference.split_once('#').unwrap_or((reference, ""));
    let target_file = match (file_part.is_empty(), file) {
        (true, None) => return Ok(None),
        (true, Some(current)) => current.to_path_buf(),
        (false, _) => base_dir.join(file_part),
    };

    let key = (target_file.clone(), pointer.to_string());
    if let Some(local) = state.imported.get(&key) {
        return Ok(Some(local.clone()));
    }

    let document = load(&target_file, reference, location, state)?;
    let mut target = if pointer.is_empty() {
        document.clone()
    } else {
        document
            .pointer(pointer)
            .cloned()
            .ok_or_else(|| NormalizeError::unresolved(reference, location))?
    };

    let bucket = bucket_for(pointer, location);
    let name = import_name(pointer, &target_file)
        .ok_or_else(|| NormalizeError::unresolved(reference, location))?;
    let local = format!("#/components/{}/{}", bucket, escape_segment(&name));
    state.imported.insert(key, local.clone());

    let target_dir = target_file.parent().map(Path::to_path_buf).unwrap_or_default();
    let target_location = format!("{}#{}", target_file.display(), pointer);
    rewrite_refs(&mut target, Some(&target_file), &target_dir, &target_location, state)?;

    state.imports.push(Import { bucket, name, value: target, reference: reference.to_string() });
    Ok(Some(local))
}

fn load<'s>(
    path: &Path,
    reference: &str,
    location: &str,
    state: &'s mut ImportState,
) -> Result<&'s Value> {
    if !state.files.contains_key(path) {
        if !path.is_file() {
            return Err(NormalizeError::unresolved(reference, location));
        }
        let text = read_file(path)?;
        let value = parse_text(&text, SourceFormat::from_path(path))?;
        state.files.insert(path.to_path_buf(), value);
    }
    state.files.get(path).ok_or_else(|| NormalizeError::unresolved(reference, location))
}

/// Messages go to `components.messages`, everything else to `components.schemas`.
fn bucket_for(pointer: &str, location: &str) -> &'static str {
    let segments: Vec<&str> = pointer.split('/').collect();
    if segments.len() >= 2 {
        match segments[segments.len() - 2] {
            "messages" => return "messages",
            "schemas" => return "schemas",
            _ => {}
        }
    }
    let message_position = location.ends_with("/message")
        || location.ends_with("/x-response")
        || (location.contains("/message/oneOf/") && !location.contains("/payload"));
    if message_position {
        "messages"
    } else {
        "schemas"
    }
}

fn import_name(pointer: &str, file: &Path) -> Option<String> {
    match pointer.rsplit('/').next().filter(|s| !s.is_empty()) {
        Some(segment) => Some(unescape_segment(segment)),
        None => file.file_stem().and_then(|s| s.to_str()).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn buckets_follow_pointer_then_position() {
        assert_eq!(bucket_for("/components/messages/Ping", "#/x"), "messages");
        assert_eq!(bucket_for("", "#/channels/~1/publish/message"), "messages");
        assert_eq!(bucket_for("", "#/channels/~1/publish/message/oneOf/0"), "messages");
        assert_eq!(bucket_for("", "#/channels/~1/publish/message/oneOf/0/payload"), "schemas");
        assert_eq!(bucket_for("/Pet", "#/components/schemas/Owner/properties/pet"), "schemas");
    }

    #[test]
    fn local_references_in_root_are_untouched() {
        let mut root = json!({ "a": { "$ref": "#/components/schemas/A" } });
        inline_external_refs(&mut root, Path::new(".")).expect("no imports");
        assert_eq!(root["a"]["$ref"], "#/components/schemas/A");
        assert!(root.get("components").is_none());
    }
}
