use crate::{
    entity::{MetadataEntity, TableRow},
    error::MetadataError,
    obs::sink::{self, MetricsEvent},
    table::MetadataTable,
};
use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;
use tilemeta_schema::{node::MetadataClass, value::MetadataValue};

///
/// SubdivisionScheme
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[remain::sorted]
pub enum SubdivisionScheme {
    #[display("OCTREE")]
    Octree,
    #[display("QUADTREE")]
    Quadtree,
}

///
/// ImplicitTileCoordinates
/// Position of a tile within an implicitly subdivided subtree.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplicitTileCoordinates {
    pub subdivision_scheme: SubdivisionScheme,
    pub level: u32,
    pub x: u32,
    pub y: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<u32>,
}

impl ImplicitTileCoordinates {
    #[must_use]
    pub const fn quadtree(level: u32, x: u32, y: u32) -> Self {
        Self {
            subdivision_scheme: SubdivisionScheme::Quadtree,
            level,
            x,
            y,
            z: None,
        }
    }

    #[must_use]
    pub const fn octree(level: u32, x: u32, y: u32, z: u32) -> Self {
        Self {
            subdivision_scheme: SubdivisionScheme::Octree,
            level,
            x,
            y,
            z: Some(z),
        }
    }

    /// Every axis lies inside the level, and `z` is present exactly for
    /// octrees.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.level >= u32::BITS {
            return false;
        }
        let dim = 1u64 << self.level;
        let in_level = |v: u32| u64::from(v) < dim;

        let z_ok = match (self.subdivision_scheme, self.z) {
            (SubdivisionScheme::Octree, Some(z)) => in_level(z),
            (SubdivisionScheme::Quadtree, None) => true,
            _ => false,
        };

        z_ok && in_level(self.x) && in_level(self.y)
    }
}

///
/// MetadataExtension
/// Dataset-level extensions and extras a subtree shares with all its tiles.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MetadataExtension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<JsonValue>,
}

///
/// ImplicitSubtree
///
/// The spatial-index collaborator an implicit tile reads its metadata
/// through. Once ready, `entity_id` must return a row of `metadata_table`.
///

pub trait ImplicitSubtree {
    fn is_ready(&self) -> bool;

    fn metadata_table(&self) -> Option<&MetadataTable>;

    fn metadata_extension(&self) -> Option<&MetadataExtension>;

    fn entity_id(&self, coordinates: &ImplicitTileCoordinates) -> usize;
}

///
/// ImplicitTileMetadata
///
/// A lightweight view of one row of a subtree's metadata table. The row is
/// resolved once, at construction. Extensions and extras are the subtree's,
/// shared by every implicit tile in it.
///

#[derive(Clone, Copy, Debug, Deref)]
pub struct ImplicitTileMetadata<'a> {
    #[deref]
    row: TableRow<'a>,
    coordinates: ImplicitTileCoordinates,
}

impl<'a> ImplicitTileMetadata<'a> {
    /// Resolve the row for `coordinates` in `subtree`.
    ///
    /// `class`, when given, must be the class of the subtree's table.
    pub fn new<S>(
        subtree: &'a S,
        coordinates: &ImplicitTileCoordinates,
        class: Option<&MetadataClass>,
    ) -> Result<Self, MetadataError>
    where
        S: ImplicitSubtree + ?Sized,
    {
        if !subtree.is_ready() {
            return Err(MetadataError::invalid_argument("subtree is not ready"));
        }
        if !coordinates.is_valid() {
            return Err(MetadataError::invalid_argument(format!(
                "coordinates {coordinates:?} are outside their level"
            )));
        }
        let table = subtree
            .metadata_table()
            .ok_or_else(|| MetadataError::invalid_argument("subtree has no metadata table"))?;
        if let Some(class) = class
            && class.id() != table.class().id()
        {
            return Err(MetadataError::invalid_argument(format!(
                "class '{}' does not match the subtree table's class '{}'",
                class.id(),
                table.class().id()
            )));
        }

        let entity_id = subtree.entity_id(coordinates);
        let extension = subtree.metadata_extension();
        let row = TableRow::new(table, entity_id)
            .inspect_err(|_| {
                tracing::warn!(
                    class = table.class().id(),
                    entity_id,
                    count = table.count(),
                    "subtree returned an entity id outside its table"
                );
            })?
            .with_extensions(extension.and_then(|e| e.extensions.as_ref()))
            .with_extras(extension.and_then(|e| e.extras.as_ref()));

        sink::record(MetricsEvent::ImplicitView {
            class: Some(table.class().id()),
        });

        Ok(Self {
            row,
            coordinates: *coordinates,
        })
    }

    #[must_use]
    pub const fn entity_id(&self) -> usize {
        self.row.row()
    }

    #[must_use]
    pub const fn coordinates(&self) -> &ImplicitTileCoordinates {
        &self.coordinates
    }
}

impl MetadataEntity for ImplicitTileMetadata<'_> {
    fn class(&self) -> Option<&MetadataClass> {
        self.row.class()
    }

    fn extensions(&self) -> Option<&JsonValue> {
        self.row.extensions()
    }

    fn extras(&self) -> Option<&JsonValue> {
        self.row.extras()
    }

    fn has_property(&self, id: &str) -> bool {
        self.row.has_property(id)
    }

    fn property_ids(&self) -> BTreeSet<String> {
        self.row.property_ids()
    }

    fn get_property(&self, id: &str) -> Result<MetadataValue, MetadataError> {
        self.row.get_property(id)
    }

    fn set_property(&mut self, id: &str, value: MetadataValue) -> Result<(), MetadataError> {
        self.row.set_property(id, value)
    }

    fn get_property_by_semantic(
        &self,
        semantic: &str,
    ) -> Result<Option<MetadataValue>, MetadataError> {
        self.row.get_property_by_semantic(semantic)
    }

    fn set_property_by_semantic(
        &mut self,
        semantic: &str,
        value: MetadataValue,
    ) -> Result<(), MetadataError> {
        self.row.set_property_by_semantic(semantic, value)
    }
}
