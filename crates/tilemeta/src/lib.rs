//! ## Crate layout
//! - `core`: metadata tables, the entity contract, explicit and implicit
//!   tile views, configuration and metrics.
//! - `error`: the public error taxonomy.
//! - `schema`: component/value types, property, class and enum nodes, and
//!   the schema registry.
//!
//! The `prelude` module carries the vocabulary most callers need.

pub use tilemeta_core as core;
pub use tilemeta_schema as schema;

pub mod error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, ErrorKind, ErrorOrigin};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        config::MetadataConfig,
        entity::{InlineProperties, MetadataEntity as _, TableRow, TileEntity},
        table::{MetadataTable, PropertyBuffers},
        tile::{
            ImplicitSubtree, ImplicitTileCoordinates, ImplicitTileMetadata, MetadataExtension,
            SubdivisionScheme, TileMetadata, TileMetadataPayload, TileMetadataSource,
        },
    };
    pub use crate::schema::{
        node::{ClassProperty, MetadataClass, MetadataEnum, MetadataSchema},
        types::{ComponentType, ValueType},
        value::MetadataValue,
    };
    pub use serde::{Deserialize, Serialize};
}
