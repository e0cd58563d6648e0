use crate::{
    entity::TileEntity,
    error::MetadataError,
    tile::{ImplicitSubtree, ImplicitTileCoordinates, ImplicitTileMetadata, TileMetadata},
};
use std::sync::Arc;
use tilemeta_schema::node::MetadataClass;

///
/// TileMetadataSource
///
/// Where a tile's metadata comes from. Explicit metadata is owned by the
/// tile; implicit metadata is a fresh view of the subtree's table built on
/// every request.
///

#[derive(Default)]
pub enum TileMetadataSource<'s> {
    #[default]
    None,
    Explicit(TileMetadata),
    Implicit {
        subtree: &'s dyn ImplicitSubtree,
        coordinates: ImplicitTileCoordinates,
        class: Option<Arc<MetadataClass>>,
    },
}

impl<'s> TileMetadataSource<'s> {
    #[must_use]
    pub fn implicit(
        subtree: &'s dyn ImplicitSubtree,
        coordinates: ImplicitTileCoordinates,
        class: Option<Arc<MetadataClass>>,
    ) -> Self {
        Self::Implicit {
            subtree,
            coordinates,
            class,
        }
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The tile's metadata, or `None` when it has none.
    pub fn metadata(&mut self) -> Result<Option<TileEntity<'_>>, MetadataError> {
        match self {
            Self::None => Ok(None),
            Self::Explicit(tile) => Ok(Some(TileEntity::Explicit(tile))),
            Self::Implicit {
                subtree,
                coordinates,
                class,
            } => {
                let view = ImplicitTileMetadata::new(*subtree, coordinates, class.as_deref())?;

                Ok(Some(TileEntity::Implicit(view)))
            }
        }
    }
}

impl From<TileMetadata> for TileMetadataSource<'_> {
    fn from(tile: TileMetadata) -> Self {
        Self::Explicit(tile)
    }
}
