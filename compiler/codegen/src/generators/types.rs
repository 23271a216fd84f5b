//! Emits the `types` module: one Rust item per lowered definition.
//!
//! | shape            | item                                   |
//! |------------------|----------------------------------------|
//! | record           | `struct` with serde renames            |
//! | union            | `#[serde(untagged)] enum`              |
//! | enum             | unit `enum` with one rename per value  |
//! | alias            | `type` alias                           |
//! | recursive alias  | `#[serde(transparent)]` newtype        |
//! | marker (true)    | alias of `serde_json::Value`           |
//! | marker (false)   | empty `enum`; no value deserializes    |

use std::collections::BTreeSet;
use std::fmt::Write as _;

use ir::{FieldDefinition, TypeDefinition, TypeRef, TypeShape, UnionVariant};
use naming::NameResolver;
use registry::TypeRegistryReader;
use types::{RustTypeAdapter, TypeAdapter};

use super::doc_comment::write_doc_comment;
use crate::{CodeGenerator, CodegenError, GenerationInput, Result, GENERATED_BANNER};

const DERIVES: &str = "#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]";

/// Generator for the `types` module
#[derive(Debug, Default, Clone, Copy)]
pub struct TypesGenerator;

impl CodeGenerator for TypesGenerator {
    fn generate(&self, input: &GenerationInput<'_>) -> Result<String> {
        let registry = input.registry;
        let names = registry.list_types();
        if names.is_empty() {
            return Ok(String::new());
        }

        let mut out = String::new();
        writeln!(out, "{}", GENERATED_BANNER)?;
        writeln!(out, "//! Message payload and schema types.\n")?;
        writeln!(out, "#![allow(clippy::large_enum_variant)]\n")?;
        writeln!(out, "use serde::{{Deserialize, Serialize}};\n")?;

        for name in names {
            let definition =
                registry.get_type(name).ok_or_else(|| CodegenError::UnknownType(name.to_string()))?;
            render_definition(&mut out, definition, registry)?;
            out.push('\n');
        }
        tracing::debug!(types = registry.type_count(), "rendered types module");
        Ok(out)
    }
}

fn render_definition(
    out: &mut String,
    definition: &TypeDefinition,
    registry: &dyn TypeRegistryReader,
) -> Result<()> {
    if let Some(description) = &definition.description {
        write_doc_comment(out, description, "")?;
    }
    let name = &definition.name;
    let boxed = |target: &str| reaches(registry, target, name);

    match &definition.shape {
        TypeShape::Record { fields } => {
            writeln!(out, "{}", DERIVES)?;
            writeln!(out, "pub struct {} {{", name)?;
            for field in fields {
                render_field(out, field, &boxed)?;
            }
            writeln!(out, "}}")?;
        }
        TypeShape::Union { variants } => {
            writeln!(out, "{}", DERIVES)?;
            writeln!(out, "#[serde(untagged)]")?;
            writeln!(out, "pub enum {} {{", name)?;
            for UnionVariant { name: variant, ty } in variants {
                writeln!(out, "    {}({}),", variant, render_indirect(ty, &boxed))?;
            }
            writeln!(out, "}}")?;
        }
        TypeShape::Enum { values } => {
            writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]")?;
            writeln!(out, "pub enum {} {{", name)?;
            let mut variants = NameResolver::new();
            for value in values {
                writeln!(out, "    #[serde(rename = {:?})]", value)?;
                writeln!(out, "    {},", variants.resolve_type(value))?;
            }
            writeln!(out, "}}")?;
        }
        TypeShape::Alias { target } if definition.shape.named_targets().into_iter().any(&boxed) => {
            // A `type` alias cannot refer to itself; recursive aliases become newtypes.
            writeln!(out, "{}", DERIVES)?;
            writeln!(out, "#[serde(transparent)]")?;
            writeln!(out, "pub struct {}(pub {});", name, render_indirect(target, &boxed))?;
        }
        TypeShape::Alias { target } => {
            writeln!(out, "pub type {} = {};", name, RustTypeAdapter.render(target))?;
        }
        TypeShape::Marker { accepts: true } => {
            writeln!(out, "pub type {} = serde_json::Value;", name)?;
        }
        TypeShape::Marker { accepts: false } => {
            writeln!(out, "{}", DERIVES)?;
            writeln!(out, "pub enum {} {{}}", name)?;
        }
    }
    Ok(())
}

fn render_field(out: &mut String, field: &FieldDefinition, boxed: &dyn Fn(&str) -> bool) -> Result<()> {
    if let Some(description) = &field.description {
        write_doc_comment(out, description, "    ")?;
    }
    if field.name.trim_start_matches("r#") != field.wire_name {
        writeln!(out, "    #[serde(rename = {:?})]", field.wire_name)?;
    }
    if matches!(field.ty, TypeRef::Optional(_)) {
        writeln!(out, "    #[serde(default, skip_serializing_if = \"Option::is_none\")]")?;
    }
    writeln!(out, "    pub {}: {},", field.name, render_indirect(&field.ty, boxed))?;
    Ok(())
}

/// Spell `ty`, boxing named references that would make the owner infinitely
/// sized. References behind a `Vec` already have indirection.
fn render_indirect(ty: &TypeRef, boxed: &dyn Fn(&str) -> bool) -> String {
    let adapter = RustTypeAdapter;
    match ty {
        TypeRef::Named(name) if boxed(name) => format!("Box<{}>", name),
        TypeRef::Optional(inner) => adapter.optional(&render_indirect(inner, boxed)),
        other => adapter.render(other),
    }
}

/// Whether `owner` is reachable from `start` through named references.
fn reaches(registry: &dyn TypeRegistryReader, start: &str, owner: &str) -> bool {
    let mut seen = BTreeSet::new();
    let mut stack = vec![start.to_string()];
    while let Some(current) = stack.pop() {
        if current == owner {
            return true;
        }
        if !seen.insert(current.clone()) {
            continue;
        }
        if let Some(definition) = registry.get_type(&current) {
            stack.extend(definition.shape.named_targets().into_iter().map(str::to_string));
        }
    }
    false
}
