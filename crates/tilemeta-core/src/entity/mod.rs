//! Uniform property access over inline and table-backed metadata.

mod inline;
mod row;

#[cfg(test)]
mod tests;

pub use inline::InlineProperties;
pub use row::TableRow;

use crate::{
    error::MetadataError,
    tile::{ImplicitTileMetadata, TileMetadata},
};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;
use tilemeta_schema::{node::MetadataClass, value::MetadataValue};

///
/// MetadataEntity
///
/// Property access shared by every metadata flavor. Callers hold a
/// `&mut dyn MetadataEntity` (or a [`TileEntity`]) and never branch on
/// what backs it.
///
/// Semantic lookups resolve through the class. A read of an undeclared
/// semantic yields `Ok(None)`; a write of one does nothing.
///

pub trait MetadataEntity {
    /// The class the entity conforms to, if it has one.
    fn class(&self) -> Option<&MetadataClass>;

    fn extensions(&self) -> Option<&JsonValue>;

    fn extras(&self) -> Option<&JsonValue>;

    fn has_property(&self, id: &str) -> bool;

    fn property_ids(&self) -> BTreeSet<String>;

    fn get_property(&self, id: &str) -> Result<MetadataValue, MetadataError>;

    fn set_property(&mut self, id: &str, value: MetadataValue) -> Result<(), MetadataError>;

    fn get_property_by_semantic(
        &self,
        semantic: &str,
    ) -> Result<Option<MetadataValue>, MetadataError>;

    fn set_property_by_semantic(
        &mut self,
        semantic: &str,
        value: MetadataValue,
    ) -> Result<(), MetadataError>;

    /// Like [`Self::get_property`], with an unknown property read as "no
    /// value". Every other error still surfaces.
    fn property(&self, id: &str) -> Result<Option<MetadataValue>, MetadataError> {
        match self.get_property(id) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_unknown_property() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

///
/// TileEntity
///
/// The metadata of one tile, whichever way it is stored.
///

#[derive(Debug)]
pub enum TileEntity<'a> {
    Explicit(&'a mut TileMetadata),
    Implicit(ImplicitTileMetadata<'a>),
}

impl TileEntity<'_> {
    #[must_use]
    pub const fn is_implicit(&self) -> bool {
        matches!(self, Self::Implicit(_))
    }

    fn inner(&self) -> &dyn MetadataEntity {
        match self {
            Self::Explicit(tile) => &**tile,
            Self::Implicit(view) => view,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn MetadataEntity {
        match self {
            Self::Explicit(tile) => &mut **tile,
            Self::Implicit(view) => view,
        }
    }
}

impl MetadataEntity for TileEntity<'_> {
    fn class(&self) -> Option<&MetadataClass> {
        self.inner().class()
    }

    fn extensions(&self) -> Option<&JsonValue> {
        self.inner().extensions()
    }

    fn extras(&self) -> Option<&JsonValue> {
        self.inner().extras()
    }

    fn has_property(&self, id: &str) -> bool {
        self.inner().has_property(id)
    }

    fn property_ids(&self) -> BTreeSet<String> {
        self.inner().property_ids()
    }

    fn get_property(&self, id: &str) -> Result<MetadataValue, MetadataError> {
        self.inner().get_property(id)
    }

    fn set_property(&mut self, id: &str, value: MetadataValue) -> Result<(), MetadataError> {
        self.inner_mut().set_property(id, value)
    }

    fn get_property_by_semantic(
        &self,
        semantic: &str,
    ) -> Result<Option<MetadataValue>, MetadataError> {
        self.inner().get_property_by_semantic(semantic)
    }

    fn set_property_by_semantic(
        &mut self,
        semantic: &str,
        value: MetadataValue,
    ) -> Result<(), MetadataError> {
        self.inner_mut().set_property_by_semantic(semantic, value)
    }
}
