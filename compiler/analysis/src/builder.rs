//! Schema lowering
//!
//! Component schemas are lowered in name order. Each one gets its type name
//! up front, so a reference to a component that is still being lowered
//! resolves to that name instead of recursing again. That is how reference
//! cycles terminate with exactly one definition per member.
//!
//! Inline structures (nested objects, unions, enums, upload shapes) are
//! minted as definitions of their own, named after the place they appear
//! (`OrderCustomer`, `EventOneOf1`), and deduplicated by shape.

use std::collections::{BTreeMap, BTreeSet};

use ir::pointer::{self, escape_segment};
use ir::{
    Channel, Components, Direction, FieldDefinition, Message, MessageRef, PrimitiveType, Property,
    ResponseSpec, ResponseTarget, Schema, TypeDefinition, TypeRef, TypeShape, UnionVariant,
    RESPONSE_EXTENSION,
};
use naming::{channel_label, to_pascal_case, NameResolver};
use registry::{TypeRegistry, TypeRegistryReader};
use types::{resolve_primitive, PrimitiveResolution};

use crate::canonicalizer::ShapeIndex;
use crate::{Result, TypeModelError};

/// Lowers schemas into a [`TypeRegistry`].
///
/// The builder borrows the components map mutably for its whole life; minted
/// inline schemas are written back into it.
pub struct TypeModelBuilder<'a> {
    components: &'a mut Components,
    registry: TypeRegistry,
    names: NameResolver,
    component_names: BTreeMap<String, String>,
    in_progress: BTreeSet<String>,
    index: ShapeIndex,
    pending: Vec<String>,
}

impl<'a> TypeModelBuilder<'a> {
    /// Register `pre_existing` definitions and assign a type name to every
    /// component schema.
    pub fn new(components: &'a mut Components, pre_existing: Vec<TypeDefinition>) -> Result<Self> {
        let mut registry = TypeRegistry::new();
        let mut names = NameResolver::new();
        for definition in pre_existing {
            names.reserve(definition.name.clone());
            registry.insert(definition)?;
        }

        let mut component_names = BTreeMap::new();
        for key in components.schemas.keys() {
            component_names.insert(key.clone(), names.resolve_type(key));
        }

        Ok(Self {
            components,
            registry,
            names,
            component_names,
            in_progress: BTreeSet::new(),
            index: ShapeIndex::new(),
            pending: Vec::new(),
        })
    }

    /// Lower every component schema.
    pub fn lower_components(&mut self) -> Result<()> {
        let keys: Vec<String> = self.components.schemas.keys().cloned().collect();
        for key in keys {
            self.lower_component(&key, &pointer::component_schema(&key))?;
        }
        Ok(())
    }

    /// Lower the payloads of component messages and of inline channel
    /// messages, binding each to its pointer.
    pub fn lower_payloads(&mut self, channels: &[Channel]) -> Result<()> {
        let messages: Vec<(String, Message)> =
            self.components.messages.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        for (name, message) in &messages {
            self.lower_message(message, &to_pascal_case(name), &pointer::component_message(name))?;
        }

        for channel in channels {
            for (direction, operation) in
                [(Direction::Publish, &channel.publish), (Direction::Subscribe, &channel.subscribe)]
            {
                let Some(operation) = operation else { continue };
                let multiplexed = operation.message.is_multiplexed();
                for (i, variant) in operation.message.variants().into_iter().enumerate() {
                    let MessageRef::Inline(message) = variant else { continue };
                    let location =
                        pointer::channel_message(&channel.path, direction, multiplexed.then_some(i));
                    let context = match &message.name {
                        Some(name) => to_pascal_case(name),
                        None => format!(
                            "{}{}",
                            channel_label(&channel.path),
                            to_pascal_case(direction.as_str())
                        ),
                    };
                    self.lower_message(message, &context, &location)?;
                }
            }
        }
        Ok(())
    }

    /// Hand over the finished registry
    pub fn finish(self) -> TypeRegistry { self.registry }

    /// Lower the component schema `name`, returning its type name.
    ///
    /// Memoized: a component is lowered at most once per run.
    pub fn lower_component(&mut self, name: &str, location: &str) -> Result<String> {
        let type_name = self.component_names.get(name).cloned().ok_or_else(|| {
            TypeModelError::RefResolution {
                reference: pointer::component_schema(name),
                location: location.to_string(),
            }
        })?;
        if self.in_progress.contains(name) || self.registry.component_type(name).is_some() {
            return Ok(type_name);
        }
        let schema = self.components.schemas.get(name).cloned().ok_or_else(|| {
            TypeModelError::RefResolution {
                reference: pointer::component_schema(name),
                location: location.to_string(),
            }
        })?;
        self.reject_reference_loop(name)?;

        self.in_progress.insert(name.to_string());
        let definition = self.lower_definition(&type_name, &schema, &pointer::component_schema(name));
        self.in_progress.remove(name);

        self.registry.insert(definition?)?;
        self.registry.bind_component(name, type_name.as_str())?;
        Ok(type_name)
    }

    /// A component that reaches itself through bare `$ref`s alone names no
    /// structure at all.
    fn reject_reference_loop(&self, start: &str) -> Result<()> {
        let mut seen = BTreeSet::new();
        let mut current = start;
        while let Some(Schema::Reference { name: next }) = self.components.schemas.get(current) {
            if next == start {
                return Err(TypeModelError::InvalidSchema {
                    location: pointer::component_schema(start),
                    message: format!("'{}' refers back to itself through references only", start),
                });
            }
            if !seen.insert(next.as_str()) {
                break;
            }
            current = next;
        }
        Ok(())
    }

    fn lower_message(&mut self, message: &Message, context: &str, location: &str) -> Result<()> {
        if let Some(payload) = &message.payload {
            let pointer = format!("{}/payload", location);
            let ty = self.lower_ref(payload, &format!("{}Payload", context), &pointer)?;
            self.registry.bind_payload(pointer, ty);
        }
        if let Some(ResponseSpec { target: ResponseTarget::Payload(schema), .. }) = &message.response
        {
            let pointer = format!("{}/{}/payload", location, RESPONSE_EXTENSION);
            let ty = self.lower_ref(schema, &format!("{}Response", context), &pointer)?;
            self.registry.bind_payload(pointer, ty);
        }
        Ok(())
    }

    /// Lower a named schema into a full definition.
    fn lower_definition(&mut self, name: &str, schema: &Schema, origin: &str) -> Result<TypeDefinition> {
        let mark = self.pending.len();
        let shape = match schema {
            Schema::Primitive { ty, format, .. } => match self.primitive(ty, format.as_deref(), origin)? {
                PrimitiveResolution::Scalar(primitive) => {
                    TypeShape::Alias { target: TypeRef::Primitive(primitive) }
                }
                PrimitiveResolution::BinaryUpload => upload_shape(),
            },
            Schema::Enum { values, .. } => TypeShape::Enum { values: values.clone() },
            Schema::Array { items } => {
                let item = self.lower_ref(items, &format!("{}Item", name), &format!("{}/items", origin))?;
                TypeShape::Alias { target: TypeRef::Array(Box::new(item)) }
            }
            Schema::Object { properties, .. } => self.record_shape(name, properties, origin)?,
            Schema::Reference { name: target } => {
                TypeShape::Alias { target: TypeRef::Named(self.lower_component(target, origin)?) }
            }
            Schema::OneOf { variants } => self.union_shape(name, variants, origin)?,
            Schema::AllOf { members } => {
                let properties = self.merge_all_of(members, origin)?;
                self.record_shape(name, &properties, origin)?
            }
            Schema::Boolean { value } => TypeShape::Marker { accepts: *value },
            Schema::Any { .. } => TypeShape::Alias { target: TypeRef::Any },
        };

        Ok(TypeDefinition {
            name: name.to_string(),
            description: schema.description().map(str::to_string),
            shape,
            sub_definitions: self.pending.split_off(mark),
            origin: origin.to_string(),
        })
    }

    /// Lower a schema at a use site (field, item, variant, payload).
    fn lower_ref(&mut self, schema: &Schema, context: &str, location: &str) -> Result<TypeRef> {
        let mark = self.pending.len();
        let (shape, minted_schema) = match schema {
            Schema::Primitive { ty, format, .. } => {
                match self.primitive(ty, format.as_deref(), location)? {
                    PrimitiveResolution::Scalar(primitive) => return Ok(TypeRef::Primitive(primitive)),
                    PrimitiveResolution::BinaryUpload => (upload_shape(), None),
                }
            }
            Schema::Array { items } => {
                let item =
                    self.lower_ref(items, &format!("{}Item", context), &format!("{}/items", location))?;
                return Ok(TypeRef::Array(Box::new(item)));
            }
            Schema::Reference { name } => {
                return Ok(TypeRef::Named(self.lower_component(name, location)?))
            }
            Schema::Any { .. } => return Ok(TypeRef::Any),
            Schema::Boolean { value } => {
                (TypeShape::Marker { accepts: *value }, Some(schema.clone()))
            }
            Schema::Enum { values, .. } => {
                (TypeShape::Enum { values: values.clone() }, Some(schema.clone()))
            }
            Schema::Object { properties, .. } => {
                (self.record_shape(context, properties, location)?, Some(schema.clone()))
            }
            Schema::OneOf { variants } => {
                (self.union_shape(context, variants, location)?, Some(schema.clone()))
            }
            Schema::AllOf { members } => {
                let properties = self.merge_all_of(members, location)?;
                let merged = Schema::Object { properties: properties.clone(), description: None };
                (self.record_shape(context, &properties, location)?, Some(merged))
            }
        };

        let context = match shape {
            TypeShape::Marker { accepts: true } => "AlwaysTrue",
            TypeShape::Marker { accepts: false } => "AlwaysFalse",
            _ => context,
        };
        let sub_definitions = self.pending.split_off(mark);
        let name = self.mint(context, shape, schema, location, sub_definitions, minted_schema)?;
        Ok(TypeRef::Named(name))
    }

    /// Register an inline definition, reusing an existing one of the same shape.
    fn mint(
        &mut self,
        context: &str,
        shape: TypeShape,
        schema: &Schema,
        origin: &str,
        sub_definitions: Vec<String>,
        minted_schema: Option<Schema>,
    ) -> Result<String> {
        if let Some(existing) = self.index.lookup(&shape).map(str::to_string) {
            return Ok(existing);
        }

        let name = self.names.resolve_type(context);
        self.index.record(shape.clone(), &name);
        self.registry.insert(TypeDefinition {
            name: name.clone(),
            description: schema.description().map(str::to_string),
            shape,
            sub_definitions,
            origin: origin.to_string(),
        })?;

        if let Some(minted_schema) = minted_schema {
            if !self.components.schemas.contains_key(&name) {
                self.components.schemas.insert(name.clone(), minted_schema);
                self.component_names.insert(name.clone(), name.clone());
                self.registry.bind_component(name.as_str(), name.as_str())?;
            }
        }
        self.pending.push(name.clone());
        Ok(name)
    }

    fn record_shape(&mut self, owner: &str, properties: &[Property], location: &str) -> Result<TypeShape> {
        let mut field_names = NameResolver::new();
        let mut fields = Vec::with_capacity(properties.len());
        for property in properties {
            let field_location = format!("{}/properties/{}", location, escape_segment(&property.name));
            let context = format!("{}{}", owner, to_pascal_case(&property.name));
            let ty = self.lower_ref(&property.schema, &context, &field_location)?;
            fields.push(FieldDefinition {
                name: field_names.resolve_identifier(&property.name),
                wire_name: property.name.clone(),
                ty: if property.required { ty } else { ty.optional() },
                required: property.required,
                description: property.schema.description().map(str::to_string),
            });
        }
        Ok(TypeShape::Record { fields })
    }

    fn union_shape(&mut self, owner: &str, variants: &[Schema], location: &str) -> Result<TypeShape> {
        let mut variant_names = NameResolver::new();
        let mut lowered = Vec::with_capacity(variants.len());
        for (i, variant) in variants.iter().enumerate() {
            let ty = self.lower_ref(
                variant,
                &format!("{}OneOf{}", owner, i),
                &format!("{}/oneOf/{}", location, i),
            )?;
            lowered.push(UnionVariant { name: variant_names.resolve_type(&variant_label(&ty)), ty });
        }
        Ok(TypeShape::Union { variants: lowered })
    }

    /// Flatten `allOf` members into one property list; first declaration wins.
    fn merge_all_of(&self, members: &[Schema], location: &str) -> Result<Vec<Property>> {
        let mut merged: Vec<Property> = Vec::new();
        let mut seen = BTreeSet::new();
        for (i, member) in members.iter().enumerate() {
            let member_location = format!("{}/allOf/{}", location, i);
            for property in self.member_properties(member, &member_location, &mut seen)? {
                if !merged.iter().any(|p| p.name == property.name) {
                    merged.push(property);
                }
            }
        }
        Ok(merged)
    }

    fn member_properties(
        &self,
        member: &Schema,
        location: &str,
        seen: &mut BTreeSet<String>,
    ) -> Result<Vec<Property>> {
        match member {
            Schema::Object { properties, .. } => Ok(properties.clone()),
            Schema::Any { .. } => Ok(Vec::new()),
            Schema::Reference { name } => {
                if !seen.insert(name.clone()) {
                    return Ok(Vec::new());
                }
                let target = self.components.schemas.get(name).ok_or_else(|| {
                    TypeModelError::RefResolution {
                        reference: pointer::component_schema(name),
                        location: location.to_string(),
                    }
                })?;
                self.member_properties(target, &pointer::component_schema(name), seen)
            }
            Schema::AllOf { members } => {
                let mut merged: Vec<Property> = Vec::new();
                for (i, inner) in members.iter().enumerate() {
                    let inner_location = format!("{}/allOf/{}", location, i);
                    for property in self.member_properties(inner, &inner_location, seen)? {
                        if !merged.iter().any(|p| p.name == property.name) {
                            merged.push(property);
                        }
                    }
                }
                Ok(merged)
            }
            other => Err(TypeModelError::InvalidSchema {
                location: location.to_string(),
                message: format!("allOf member must be an object, found {}", other.type_label()),
            }),
        }
    }

    fn primitive(&self, ty: &str, format: Option<&str>, location: &str) -> Result<PrimitiveResolution> {
        resolve_primitive(ty, format).map_err(|source| TypeModelError::UnsupportedSchemaType {
            source,
            location: location.to_string(),
        })
    }
}

/// Record carried by a `string`/`binary` upload.
fn upload_shape() -> TypeShape {
    let field = |name: &str, wire_name: &str, primitive| FieldDefinition {
        name: name.to_string(),
        wire_name: wire_name.to_string(),
        ty: TypeRef::Primitive(primitive),
        required: true,
        description: None,
    };
    TypeShape::Record {
        fields: vec![
            field("file_content", "fileContent", PrimitiveType::Bytes),
            field("file_name", "fileName", PrimitiveType::String),
        ],
    }
}

/// Candidate name of a union variant holding `ty`
fn variant_label(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Named(name) => name.clone(),
        TypeRef::Primitive(primitive) => format!("{:?}", primitive),
        TypeRef::Array(inner) => format!("{}List", variant_label(inner)),
        TypeRef::Optional(inner) => variant_label(inner),
        TypeRef::Any => "Any".to_string(),
    }
}
