//! Per-tile metadata: explicit payloads, implicit subtree rows, and the slot
//! a tile keeps them in.

mod implicit;
mod source;


pub use implicit::{
    ImplicitSubtree, ImplicitTileCoordinates, ImplicitTileMetadata, MetadataExtension,
    SubdivisionScheme,
};
pub use source::TileMetadataSource;

use crate::{
    config::EntityConfig,
    entity::{InlineProperties, MetadataEntity},
    error::MetadataError,
};
use derive_more::Deref;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};
use tilemeta_schema::{
    node::{MetadataClass, MetadataSchema},
    value::MetadataValue,
};

///
/// TileMetadataPayload
/// JSON form of a tile's own metadata.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TileMetadataPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,

    #[serde(default)]
    pub properties: BTreeMap<String, MetadataValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<JsonValue>,
}

///
/// TileMetadata
///
/// Metadata a tile declares explicitly. Property values live with the tile;
/// the class, when supplied, adds defaults, conformance and semantics.
///
/// Derefs to [`InlineProperties`] for read-only access. Writes go through
/// [`MetadataEntity`].
///

#[derive(Clone, Debug, Deref)]
pub struct TileMetadata {
    #[deref]
    entity: InlineProperties,
    class_name: Option<String>,
}

impl TileMetadata {
    #[must_use]
    pub fn new(payload: TileMetadataPayload, class: Option<Arc<MetadataClass>>) -> Self {
        Self::with_config(payload, class, &EntityConfig::default())
    }

    #[must_use]
    pub fn with_config(
        payload: TileMetadataPayload,
        class: Option<Arc<MetadataClass>>,
        config: &EntityConfig,
    ) -> Self {
        let entity = InlineProperties::with_config(payload.properties, class, config)
            .with_extensions(payload.extensions)
            .with_extras(payload.extras);

        Self {
            entity,
            class_name: payload.class,
        }
    }

    /// Parse a raw payload. An absent or non-object payload is an
    /// `InvalidArgument`.
    pub fn from_json(
        json: Option<&JsonValue>,
        class: Option<Arc<MetadataClass>>,
    ) -> Result<Self, MetadataError> {
        let payload = parse_payload(json)?;

        Ok(Self::new(payload, class))
    }

    /// Parse a raw payload and resolve the class it names in `schema`.
    pub fn from_json_in_schema(
        json: Option<&JsonValue>,
        schema: &MetadataSchema,
    ) -> Result<Self, MetadataError> {
        let payload = parse_payload(json)?;
        let class = match payload.class.as_deref() {
            Some(id) => Some(schema.class(id).cloned().ok_or_else(|| {
                MetadataError::invalid_argument(format!("schema does not define class '{id}'"))
            })?),
            None => None,
        };

        Ok(Self::new(payload, class))
    }

    /// Class id named by the payload, whether or not it was resolved.
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }
}

fn parse_payload(json: Option<&JsonValue>) -> Result<TileMetadataPayload, MetadataError> {
    let json =
        json.ok_or_else(|| MetadataError::invalid_argument("tile metadata payload is required"))?;
    if !json.is_object() {
        return Err(MetadataError::invalid_argument(
            "tile metadata payload must be an object",
        ));
    }

    serde_json::from_value(json.clone()).map_err(|e| {
        MetadataError::invalid_argument(format!("tile metadata payload is malformed: {e}"))
    })
}

impl MetadataEntity for TileMetadata {
    fn class(&self) -> Option<&MetadataClass> {
        self.entity.class()
    }

    fn extensions(&self) -> Option<&JsonValue> {
        self.entity.extensions()
    }

    fn extras(&self) -> Option<&JsonValue> {
        self.entity.extras()
    }

    fn has_property(&self, id: &str) -> bool {
        self.entity.has_property(id)
    }

    fn property_ids(&self) -> BTreeSet<String> {
        self.entity.property_ids()
    }

    fn get_property(&self, id: &str) -> Result<MetadataValue, MetadataError> {
        self.entity.get_property(id)
    }

    fn set_property(&mut self, id: &str, value: MetadataValue) -> Result<(), MetadataError> {
        self.entity.set_property(id, value)
    }

    fn get_property_by_semantic(
        &self,
        semantic: &str,
    ) -> Result<Option<MetadataValue>, MetadataError> {
        self.entity.get_property_by_semantic(semantic)
    }

    fn set_property_by_semantic(
        &mut self,
        semantic: &str,
        value: MetadataValue,
    ) -> Result<(), MetadataError> {
        self.entity.set_property_by_semantic(semantic, value)
    }
}
