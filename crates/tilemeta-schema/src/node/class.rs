use crate::{
    error::{ErrorTree, SchemaError},
    node::{ClassProperty, ClassPropertyDef, MetadataEnum},
    validate::{validate_class_properties, validate_id},
};
use serde::Deserialize;
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;

///
/// UnknownPropertyError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("class '{class}' does not define property '{id}'")]
pub struct UnknownPropertyError {
    pub class: String,
    pub id: String,
}

///
/// ClassDef
/// JSON form of a class, keyed by id in the schema.
///

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClassDef {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub properties: BTreeMap<String, ClassPropertyDef>,
}

///
/// MetadataClass
///
/// A named set of property definitions that metadata entities conform to.
/// Immutable once built; shared read-only by every table and entity.
///
/// Invariants: property ids are unique, and no two properties declare the
/// same semantic.
///

#[derive(Clone, Debug, PartialEq)]
pub struct MetadataClass {
    id: String,
    name: Option<String>,
    description: Option<String>,
    properties: BTreeMap<String, ClassProperty>,
    semantics: BTreeMap<String, String>,
}

impl MetadataClass {
    /// Validate `properties` and build the class.
    pub fn new(
        id: impl Into<String>,
        properties: impl IntoIterator<Item = ClassProperty>,
    ) -> Result<Self, SchemaError> {
        let id = id.into();
        let properties: Vec<ClassProperty> = properties.into_iter().collect();

        let mut errs = ErrorTree::new();
        if let Err(e) = validate_id("class", &id) {
            errs.add(e);
        }
        errs.add_child("properties", validate_class_properties(&properties));

        if !errs.is_empty() {
            tracing::debug!(class = %id, errors = errs.len(), "metadata class rejected");

            let mut root = ErrorTree::new();
            root.add_child(id, errs);
            return Err(SchemaError::Validation(root));
        }

        Ok(Self::assemble(id, properties))
    }

    pub(crate) fn from_def(
        id: &str,
        def: ClassDef,
        enums: &BTreeMap<String, Arc<MetadataEnum>>,
    ) -> Result<Self, ErrorTree> {
        let mut errs = ErrorTree::new();
        if let Err(e) = validate_id("class", id) {
            errs.add(e);
        }

        let mut properties = Vec::with_capacity(def.properties.len());
        let mut property_errs = ErrorTree::new();
        for (property_id, property_def) in def.properties {
            match ClassProperty::from_def(&property_id, property_def, enums) {
                Ok(property) => properties.push(property),
                Err(e) => property_errs.add_child(property_id, e),
            }
        }

        // uniqueness is re-checked across the properties that did parse
        property_errs.merge(validate_class_properties(&properties));
        errs.add_child("properties", property_errs);
        errs.result()?;

        let mut class = Self::assemble(id.to_string(), properties);
        class.name = def.name;
        class.description = def.description;

        Ok(class)
    }

    fn assemble(id: String, properties: Vec<ClassProperty>) -> Self {
        let semantics = properties
            .iter()
            .filter_map(|p| p.semantic().map(|s| (s.to_string(), p.id().to_string())))
            .collect();
        let properties = properties
            .into_iter()
            .map(|p| (p.id().to_string(), p))
            .collect();

        Self {
            id,
            name: None,
            description: None,
            properties,
            semantics,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn has_property(&self, id: &str) -> bool {
        self.properties.contains_key(id)
    }

    /// Property ids in sorted order.
    pub fn property_ids(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn properties(&self) -> impl Iterator<Item = &ClassProperty> {
        self.properties.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Look up a property by id.
    #[must_use]
    pub fn property(&self, id: &str) -> Option<&ClassProperty> {
        self.properties.get(id)
    }

    /// Like [`Self::property`], but absence is an error.
    pub fn definition_for(&self, id: &str) -> Result<&ClassProperty, UnknownPropertyError> {
        self.properties.get(id).ok_or_else(|| UnknownPropertyError {
            class: self.id.clone(),
            id: id.to_string(),
        })
    }

    /// The unique property declaring `semantic`, if any.
    #[must_use]
    pub fn definition_for_semantic(&self, semantic: &str) -> Option<&ClassProperty> {
        self.semantics
            .get(semantic)
            .and_then(|id| self.properties.get(id))
    }
}
