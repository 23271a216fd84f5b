//! Type graph validation
//!
//! Checks that a lowered graph is closed and well-formed before any emitter
//! walks it.

use std::collections::HashSet;

use ir::{TypeDefinition, TypeShape};
use registry::TypeRegistryReader;

/// Type graph validator
pub struct TypeGraphValidator;

impl Default for TypeGraphValidator {
    fn default() -> Self { Self::new() }
}

impl TypeGraphValidator {
    /// Create a new validator
    pub fn new() -> Self { Self }

    /// Validate a registry and return every problem found
    pub fn validate<R: TypeRegistryReader>(&self, registry: &R) -> Vec<String> {
        let mut errors = Vec::new();

        for name in registry.list_types() {
            if let Some(definition) = registry.get_type(name) {
                self.validate_definition(registry, definition, &mut errors);
            }
        }

        for (pointer, ty) in registry.list_payloads() {
            for target in ty.named_targets() {
                if registry.get_type(target).is_none() {
                    errors.push(format!("payload at {} references unknown type `{}`", pointer, target));
                }
            }
        }

        errors
    }

    fn validate_definition<R: TypeRegistryReader>(
        &self,
        registry: &R,
        definition: &TypeDefinition,
        errors: &mut Vec<String>,
    ) {
        for target in definition.shape.named_targets() {
            if registry.get_type(target).is_none() {
                errors.push(format!("type `{}` references unknown type `{}`", definition.name, target));
            }
        }
        for sub in &definition.sub_definitions {
            if registry.get_type(sub).is_none() {
                errors.push(format!("type `{}` lists missing sub-definition `{}`", definition.name, sub));
            }
        }

        match &definition.shape {
            TypeShape::Record { fields } => {
                let mut names = HashSet::new();
                let mut wire_names = HashSet::new();
                for field in fields {
                    if field.name.trim().is_empty() {
                        errors.push(format!("type `{}` has a field with empty name", definition.name));
                    }
                    if !names.insert(field.name.as_str()) {
                        errors.push(format!("type `{}` duplicate field `{}`", definition.name, field.name));
                    }
                    if !wire_names.insert(field.wire_name.as_str()) {
                        errors.push(format!(
                            "type `{}` duplicate wire name `{}`",
                            definition.name, field.wire_name
                        ));
                    }
                }
            }
            TypeShape::Union { variants } => {
                if variants.is_empty() {
                    errors.push(format!("union `{}` has no variants", definition.name));
                }
                let mut names = HashSet::new();
                for variant in variants {
                    if !names.insert(variant.name.as_str()) {
                        errors.push(format!(
                            "union `{}` duplicate variant `{}`",
                            definition.name, variant.name
                        ));
                    }
                }
            }
            TypeShape::Enum { values } if values.is_empty() => {
                errors.push(format!("enum `{}` has no values", definition.name));
            }
            _ => {}
        }
    }
}
