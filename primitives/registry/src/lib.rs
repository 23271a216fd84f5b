// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Type registry: the lowered type graph of one generation run.
//!
//! The type model builder is the only writer. Once lowering finishes the
//! registry is handed to the channel mapper and the emitters, which only see
//! it through [`TypeRegistryReader`].

use std::collections::BTreeMap;

use ir::{TypeDefinition, TypeRef};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while populating the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A second definition was registered under an existing name
    #[error("type '{0}' is already defined")]
    DuplicateDefinition(String),
    /// A component was bound to a name that has no definition
    #[error("component '{component}' is bound to unknown type '{type_name}'")]
    UnknownBinding {
        /// Component schema name
        component: String,
        /// Type name it was bound to
        type_name: String,
    },
}

/// The lowered type graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeRegistry {
    /// Definitions keyed by type name
    definitions: BTreeMap<String, TypeDefinition>,
    /// Component schema name → type name
    components: BTreeMap<String, String>,
    /// Payload pointer → lowered payload type
    payloads: BTreeMap<String, TypeRef>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self { Self::default() }

    /// Add a definition; names must be unique.
    pub fn insert(&mut self, definition: TypeDefinition) -> Result<(), RegistryError> {
        if self.definitions.contains_key(&definition.name) {
            return Err(RegistryError::DuplicateDefinition(definition.name));
        }
        self.definitions.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Record which type a component schema lowered to.
    pub fn bind_component(
        &mut self,
        component: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let (component, type_name) = (component.into(), type_name.into());
        if !self.definitions.contains_key(&type_name) {
            return Err(RegistryError::UnknownBinding { component, type_name });
        }
        self.components.insert(component, type_name);
        Ok(())
    }

    /// Record the lowered type of a message payload.
    pub fn bind_payload(&mut self, pointer: impl Into<String>, ty: TypeRef) {
        self.payloads.insert(pointer.into(), ty);
    }

    /// Iterate definitions in name order.
    pub fn definitions(&self) -> impl Iterator<Item = &TypeDefinition> { self.definitions.values() }
}

/// Read-only interface to the `TypeRegistry`.
pub trait TypeRegistryReader {
    /// Get all type names in the registry.
    fn list_types(&self) -> Vec<&str>;

    /// Get a definition by type name.
    fn get_type(&self, name: &str) -> Option<&TypeDefinition>;

    /// Get the total number of definitions.
    fn type_count(&self) -> usize;

    /// Type name a component schema lowered to.
    fn component_type(&self, component: &str) -> Option<&str>;

    /// Lowered type of the payload at `pointer`.
    fn payload_type(&self, pointer: &str) -> Option<&TypeRef>;

    /// Every bound payload in pointer order.
    fn list_payloads(&self) -> Vec<(&str, &TypeRef)>;
}

impl TypeRegistryReader for TypeRegistry {
    fn list_types(&self) -> Vec<&str> { self.definitions.keys().map(|s| s.as_str()).collect() }

    fn get_type(&self, name: &str) -> Option<&TypeDefinition> { self.definitions.get(name) }

    fn type_count(&self) -> usize { self.definitions.len() }

    fn component_type(&self, component: &str) -> Option<&str> {
        self.components.get(component).map(String::as_str)
    }

    fn payload_type(&self, pointer: &str) -> Option<&TypeRef> { self.payloads.get(pointer) }

    fn list_payloads(&self) -> Vec<(&str, &TypeRef)> {
        self.payloads.iter().map(|(pointer, ty)| (pointer.as_str(), ty)).collect()
    }
}
