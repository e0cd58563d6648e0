use crate::{
    error::{ErrorTree, SchemaError},
    node::{ClassDef, EnumDef, MetadataClass, MetadataEnum},
};
use serde::Deserialize;
use std::{collections::BTreeMap, sync::Arc};

///
/// SchemaDef
/// JSON form of a dataset-level metadata schema.
///

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SchemaDef {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub enums: BTreeMap<String, EnumDef>,

    #[serde(default)]
    pub classes: BTreeMap<String, ClassDef>,
}

///
/// MetadataSchema
///
/// Registry of the classes and enums a dataset defines. Tile payloads name
/// their class by id; the parser resolves it here.
///

#[derive(Clone, Debug, Default)]
pub struct MetadataSchema {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    enums: BTreeMap<String, Arc<MetadataEnum>>,
    classes: BTreeMap<String, Arc<MetadataClass>>,
}

impl MetadataSchema {
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let def: SchemaDef = serde_json::from_str(json)?;

        Self::from_def(def)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, SchemaError> {
        let def: SchemaDef = serde_json::from_value(value)?;

        Self::from_def(def)
    }

    /// Build every enum, then every class against the built enums. All
    /// failures are collected before returning.
    pub fn from_def(def: SchemaDef) -> Result<Self, SchemaError> {
        let mut errs = ErrorTree::new();

        let mut enums = BTreeMap::new();
        let mut enum_errs = ErrorTree::new();
        for (id, enum_def) in def.enums {
            match MetadataEnum::from_def(&id, enum_def) {
                Ok(built) => {
                    enums.insert(id, Arc::new(built));
                }
                Err(e) => enum_errs.add_child(id, e),
            }
        }
        errs.add_child("enums", enum_errs);

        let mut classes = BTreeMap::new();
        let mut class_errs = ErrorTree::new();
        for (id, class_def) in def.classes {
            match MetadataClass::from_def(&id, class_def, &enums) {
                Ok(built) => {
                    classes.insert(id, Arc::new(built));
                }
                Err(e) => class_errs.add_child(id, e),
            }
        }
        errs.add_child("classes", class_errs);

        if !errs.is_empty() {
            tracing::debug!(
                schema = def.id.as_deref().unwrap_or("<anonymous>"),
                errors = errs.len(),
                "metadata schema rejected"
            );
            return Err(SchemaError::Validation(errs));
        }

        Ok(Self {
            id: def.id,
            name: def.name,
            description: def.description,
            version: def.version,
            enums,
            classes,
        })
    }

    /// Assemble a registry from already-built nodes.
    pub fn new(
        id: Option<String>,
        enums: impl IntoIterator<Item = MetadataEnum>,
        classes: impl IntoIterator<Item = MetadataClass>,
    ) -> Result<Self, SchemaError> {
        let mut errs = ErrorTree::new();
        let mut schema = Self {
            id,
            ..Self::default()
        };

        for def in enums {
            let key = def.id().to_string();
            if schema.enums.insert(key.clone(), Arc::new(def)).is_some() {
                errs.add(format!("duplicate enum id '{key}'"));
            }
        }
        for class in classes {
            let key = class.id().to_string();
            if schema.classes.insert(key.clone(), Arc::new(class)).is_some() {
                errs.add(format!("duplicate class id '{key}'"));
            }
        }
        errs.result()?;

        Ok(schema)
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
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
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[must_use]
    pub fn class(&self, id: &str) -> Option<&Arc<MetadataClass>> {
        self.classes.get(id)
    }

    #[must_use]
    pub fn enum_type(&self, id: &str) -> Option<&Arc<MetadataEnum>> {
        self.enums.get(id)
    }

    pub fn classes(&self) -> impl Iterator<Item = &Arc<MetadataClass>> {
        self.classes.values()
    }

    pub fn enums(&self) -> impl Iterator<Item = &Arc<MetadataEnum>> {
        self.enums.values()
    }
}
