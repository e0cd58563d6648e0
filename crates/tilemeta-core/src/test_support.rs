use crate::{
    table::MetadataTable,
    tile::{ImplicitSubtree, ImplicitTileCoordinates, MetadataExtension},
};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tilemeta_schema::{
    node::{ClassProperty, MetadataClass},
    types::ComponentType,
};

static METRICS_LOCK: Mutex<()> = Mutex::new(());

/// Held by tests that reset or read the metrics state. Counters are shared
/// by every test thread, so those tests assert on classes no other test uses.
pub(crate) fn metrics_guard() -> MutexGuard<'static, ()> {
    METRICS_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `{color: VEC3 FLOAT32 (COLOR), isSquare: BOOLEAN}`
pub(crate) fn tile_class() -> Arc<MetadataClass> {
    Arc::new(
        MetadataClass::new(
            "tile",
            [
                ClassProperty::vector("color", ComponentType::Float32, 3).with_semantic("COLOR"),
                ClassProperty::scalar("isSquare", ComponentType::Boolean),
            ],
        )
        .expect("tile class is valid"),
    )
}

///
/// FakeSubtree
/// Subtree whose entity id is fixed, whatever the coordinates.
///

pub(crate) struct FakeSubtree {
    pub(crate) ready: bool,
    pub(crate) table: Option<MetadataTable>,
    pub(crate) extension: Option<MetadataExtension>,
    pub(crate) entity_id: usize,
}

impl FakeSubtree {
    pub(crate) fn with_rows(count: usize, entity_id: usize) -> Self {
        Self {
            ready: true,
            table: Some(MetadataTable::new(tile_class(), count).expect("table")),
            extension: Some(MetadataExtension {
                extensions: Some(json!({ "EXT_subtree": { "source": "survey" } })),
                extras: Some(json!({ "author": "cartography" })),
            }),
            entity_id,
        }
    }

    pub(crate) fn table(&self) -> &MetadataTable {
        self.table.as_ref().expect("subtree has a table")
    }
}

impl ImplicitSubtree for FakeSubtree {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn metadata_table(&self) -> Option<&MetadataTable> {
        self.table.as_ref()
    }

    fn metadata_extension(&self) -> Option<&MetadataExtension> {
        self.extension.as_ref()
    }

    fn entity_id(&self, _: &ImplicitTileCoordinates) -> usize {
        self.entity_id
    }
}
