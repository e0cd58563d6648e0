use crate::{
    config::EntityConfig,
    entity::MetadataEntity,
    error::MetadataError,
    obs::sink::{self, MetricsEvent},
};
use serde_json::Value as JsonValue;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};
use tilemeta_schema::{node::MetadataClass, value::MetadataValue};

///
/// InlineProperties
///
/// Metadata carried directly by its owner as an id → value map. The class
/// is optional; without one, plain id access still works but semantic
/// lookups find nothing.
///
/// A class property with a `default` reads as that default until it is set.
///

#[derive(Clone, Debug)]
pub struct InlineProperties {
    class: Option<Arc<MetadataClass>>,
    properties: BTreeMap<String, MetadataValue>,
    extensions: Option<JsonValue>,
    extras: Option<JsonValue>,
    conform_writes: bool,
}

impl InlineProperties {
    #[must_use]
    pub fn new(
        properties: BTreeMap<String, MetadataValue>,
        class: Option<Arc<MetadataClass>>,
    ) -> Self {
        Self::with_config(properties, class, &EntityConfig::default())
    }

    #[must_use]
    pub fn with_config(
        properties: BTreeMap<String, MetadataValue>,
        class: Option<Arc<MetadataClass>>,
        config: &EntityConfig,
    ) -> Self {
        Self {
            class,
            properties,
            extensions: None,
            extras: None,
            conform_writes: config.conform_inline_writes,
        }
    }

    #[must_use]
    pub fn with_extensions(mut self, extensions: Option<JsonValue>) -> Self {
        self.extensions = extensions;
        self
    }

    #[must_use]
    pub fn with_extras(mut self, extras: Option<JsonValue>) -> Self {
        self.extras = extras;
        self
    }

    /// Values set on this entity; class defaults are not included.
    #[must_use]
    pub const fn properties(&self) -> &BTreeMap<String, MetadataValue> {
        &self.properties
    }

    fn class_id(&self) -> Option<&str> {
        self.class.as_deref().map(MetadataClass::id)
    }

    fn class_default(&self, id: &str) -> Option<&MetadataValue> {
        self.class
            .as_deref()
            .and_then(|class| class.property(id))
            .and_then(|property| property.default())
    }
}

impl MetadataEntity for InlineProperties {
    fn class(&self) -> Option<&MetadataClass> {
        self.class.as_deref()
    }

    fn extensions(&self) -> Option<&JsonValue> {
        self.extensions.as_ref()
    }

    fn extras(&self) -> Option<&JsonValue> {
        self.extras.as_ref()
    }

    fn has_property(&self, id: &str) -> bool {
        self.properties.contains_key(id) || self.class_default(id).is_some()
    }

    fn property_ids(&self) -> BTreeSet<String> {
        let mut ids: BTreeSet<String> = self.properties.keys().cloned().collect();
        if let Some(class) = &self.class {
            ids.extend(
                class
                    .properties()
                    .filter(|property| property.default().is_some())
                    .map(|property| property.id().to_string()),
            );
        }

        ids
    }

    fn get_property(&self, id: &str) -> Result<MetadataValue, MetadataError> {
        let value = self
            .properties
            .get(id)
            .or_else(|| self.class_default(id))
            .cloned()
            .ok_or_else(|| MetadataError::unknown_property(id))?;
        sink::record(MetricsEvent::PropertyRead {
            class: self.class_id(),
        });

        Ok(value)
    }

    /// Unknown ids are created. Ids the class defines are conformed first
    /// unless conformance is switched off.
    fn set_property(&mut self, id: &str, value: MetadataValue) -> Result<(), MetadataError> {
        let property = self.class.as_deref().and_then(|class| class.property(id));

        let value = match property {
            Some(property) if self.conform_writes => match property.conform(&value) {
                Ok(conformed) => conformed,
                Err(reason) => {
                    tracing::debug!(
                        class = self.class_id(),
                        property = id,
                        reason = %reason,
                        "inline metadata write rejected"
                    );
                    sink::record(MetricsEvent::WriteRejected {
                        class: self.class_id(),
                    });
                    return Err(MetadataError::type_mismatch(id, reason));
                }
            },
            _ => value,
        };

        self.properties.insert(id.to_string(), value);
        sink::record(MetricsEvent::PropertyWrite {
            class: self.class_id(),
        });

        Ok(())
    }

    fn get_property_by_semantic(
        &self,
        semantic: &str,
    ) -> Result<Option<MetadataValue>, MetadataError> {
        let property = self
            .class
            .as_deref()
            .and_then(|class| class.definition_for_semantic(semantic));

        match property {
            Some(property) => self.property(property.id()),
            None => {
                sink::record(MetricsEvent::SemanticMiss {
                    class: self.class_id(),
                    write: false,
                });
                Ok(None)
            }
        }
    }

    fn set_property_by_semantic(
        &mut self,
        semantic: &str,
        value: MetadataValue,
    ) -> Result<(), MetadataError> {
        let id = self
            .class
            .as_deref()
            .and_then(|class| class.definition_for_semantic(semantic))
            .map(|property| property.id().to_string());

        match id {
            Some(id) => self.set_property(&id, value),
            None => {
                tracing::trace!(class = self.class_id(), semantic, "semantic write ignored");
                sink::record(MetricsEvent::SemanticMiss {
                    class: self.class_id(),
                    write: true,
                });
                Ok(())
            }
        }
    }
}
