//! Runtime for tile metadata: columnar property tables, the entity contract
//! shared by every metadata flavor, and the explicit/implicit tile views.
#![warn(unreachable_pub)]

pub mod codec;
pub mod config;
pub mod entity;
pub mod error;
pub mod obs;
pub mod table;
pub mod tile;

// test
#[cfg(test)]
pub(crate) mod test_support;

// re-exports
pub use config::{ConfigError, EntityConfig, MetadataConfig, TableConfig};
pub use error::{ErrorClass, MetadataError};

///
/// Prelude
///
/// Domain vocabulary only. Errors, codecs and metrics stay in their modules.
///

pub mod prelude {
    pub use crate::{
        entity::{InlineProperties, MetadataEntity, TableRow, TileEntity},
        table::MetadataTable,
        tile::{
            ImplicitSubtree, ImplicitTileCoordinates, ImplicitTileMetadata, TileMetadata,
            TileMetadataSource,
        },
    };
    pub use tilemeta_schema::prelude::*;
}
