use super::*;
use crate::{
    config::EntityConfig,
    error::ErrorClass,
    table::MetadataTable,
    test_support::tile_class,
    tile::{TileMetadata, TileMetadataPayload},
};
use std::{collections::BTreeMap, sync::Arc};
use tilemeta_schema::{node::ClassProperty, types::ComponentType};

// ---- helpers -----------------------------------------------------------

fn building_class() -> Arc<MetadataClass> {
    Arc::new(
        MetadataClass::new(
            "building",
            [
                ClassProperty::scalar("height", ComponentType::Float32).with_semantic("HEIGHT"),
                ClassProperty::scalar("floors", ComponentType::Uint8).with_default(1u8),
                ClassProperty::scalar("name", ComponentType::String).with_semantic("NAME"),
            ],
        )
        .expect("building class is valid"),
    )
}

fn inline(class: Option<Arc<MetadataClass>>) -> InlineProperties {
    let properties = BTreeMap::from([("height".to_string(), MetadataValue::Float(12.0))]);

    InlineProperties::new(properties, class)
}

fn assert_square_tile(entity: &dyn MetadataEntity) {
    assert!(entity.has_property("isSquare"));
    assert_eq!(
        entity.get_property("isSquare").expect("read"),
        MetadataValue::Bool(true)
    );
    assert_eq!(entity.class().map(MetadataClass::id), Some("tile"));
}

// ---- inline ------------------------------------------------------------

#[test]
fn inline_defaults_count_as_present() {
    let entity = inline(Some(building_class()));

    assert!(entity.has_property("height"));
    assert!(entity.has_property("floors"));
    assert!(!entity.has_property("name"));
    assert_eq!(
        entity.property_ids().into_iter().collect::<Vec<_>>(),
        ["floors", "height"]
    );
    assert_eq!(
        entity.get_property("floors").expect("default"),
        MetadataValue::Uint(1)
    );
}

#[test]
fn inline_unknown_id_reads_as_no_value() {
    let entity = inline(Some(building_class()));

    let err = entity.get_property("name").expect_err("never set");
    assert_eq!(err.class(), ErrorClass::NotFound);
    assert_eq!(entity.property("name").expect("not an error"), None);
    assert_eq!(
        entity.property("height").expect("set"),
        Some(MetadataValue::Float(12.0))
    );
}

#[test]
fn inline_set_creates_ids_the_class_does_not_define() {
    let mut entity = inline(Some(building_class()));

    entity
        .set_property("numberOfPoints", MetadataValue::Uint(10))
        .expect("created");

    assert!(entity.has_property("numberOfPoints"));
    assert_eq!(
        entity.get_property("numberOfPoints").expect("read"),
        MetadataValue::Uint(10)
    );
}

#[test]
fn inline_writes_to_class_properties_are_conformed() {
    let mut entity = inline(Some(building_class()));

    entity
        .set_property("floors", MetadataValue::Int(4))
        .expect("4 fits in UINT8");
    assert_eq!(entity.properties()["floors"], MetadataValue::Uint(4));

    let err = entity
        .set_property("floors", MetadataValue::Int(-4))
        .expect_err("negative floors");
    assert_eq!(err.class(), ErrorClass::TypeMismatch);
    assert_eq!(entity.properties()["floors"], MetadataValue::Uint(4));
}

#[test]
fn inline_conformance_can_be_switched_off() {
    let config = EntityConfig {
        conform_inline_writes: false,
    };
    let mut entity =
        InlineProperties::with_config(BTreeMap::new(), Some(building_class()), &config);

    entity
        .set_property("floors", MetadataValue::from("many"))
        .expect("stored as given");

    assert_eq!(
        entity.get_property("floors").expect("read"),
        MetadataValue::from("many")
    );
}

#[test]
fn inline_semantics_resolve_through_the_class() {
    let mut entity = inline(Some(building_class()));

    assert_eq!(
        entity.get_property_by_semantic("HEIGHT").expect("read"),
        Some(MetadataValue::Float(12.0))
    );
    assert_eq!(entity.get_property_by_semantic("NAME").expect("read"), None);
    assert_eq!(entity.get_property_by_semantic("COLOR").expect("read"), None);

    entity
        .set_property_by_semantic("NAME", MetadataValue::from("Town Hall"))
        .expect("write");
    assert_eq!(
        entity.get_property("name").expect("read"),
        MetadataValue::from("Town Hall")
    );
}

#[test]
fn inline_semantic_write_miss_does_nothing() {
    let mut entity = inline(Some(building_class()));
    let before = entity.properties().clone();

    entity
        .set_property_by_semantic("COLOR", MetadataValue::from(vec![1.0f64, 0.0, 0.0]))
        .expect("no-op");

    assert_eq!(entity.properties(), &before);
    assert!(!entity.has_property("COLOR"));
}

#[test]
fn inline_without_class_has_no_semantics() {
    let mut entity = inline(None);

    assert!(entity.class().is_none());
    assert_eq!(entity.get_property_by_semantic("HEIGHT").expect("read"), None);

    entity
        .set_property_by_semantic("HEIGHT", MetadataValue::Float(1.0))
        .expect("no-op");
    assert_eq!(
        entity.get_property("height").expect("read"),
        MetadataValue::Float(12.0)
    );

    entity
        .set_property("anything", MetadataValue::Bool(true))
        .expect("no class to conform to");
    assert!(entity.has_property("anything"));
}

// ---- table row ---------------------------------------------------------

#[test]
fn table_row_rejects_rows_past_the_end() {
    let table = MetadataTable::new(tile_class(), 3).expect("table");

    assert!(TableRow::new(&table, 2).is_ok());
    let err = TableRow::new(&table, 3).expect_err("row 3 of 3");
    assert!(matches!(err, MetadataError::OutOfRange { row: 3, count: 3 }));
}

#[test]
fn table_rows_share_writes_through_the_table() {
    let table = MetadataTable::new(tile_class(), 2).expect("table");
    let mut writer = TableRow::new(&table, 1).expect("row");
    let reader = TableRow::new(&table, 1).expect("row");
    let other = TableRow::new(&table, 0).expect("row");

    writer
        .set_property("isSquare", MetadataValue::Bool(true))
        .expect("write");

    assert_eq!(
        reader.get_property("isSquare").expect("read"),
        MetadataValue::Bool(true)
    );
    assert_eq!(
        other.get_property("isSquare").expect("read"),
        MetadataValue::Bool(false)
    );
    assert_eq!(reader.class().map(MetadataClass::id), Some("tile"));
    assert_eq!(
        reader.property_ids().into_iter().collect::<Vec<_>>(),
        ["color", "isSquare"]
    );
}

#[test]
fn table_row_semantic_reads_match_id_reads() {
    let table = MetadataTable::new(tile_class(), 1).expect("table");
    let mut row = TableRow::new(&table, 0).expect("row");

    row.set_property_by_semantic("COLOR", MetadataValue::from(vec![0.5f64, 0.25, 1.0]))
        .expect("write");

    assert_eq!(
        row.get_property_by_semantic("COLOR").expect("read"),
        Some(row.get_property("color").expect("read"))
    );
}

// ---- tile entity -------------------------------------------------------

#[test]
fn tile_entity_hides_which_storage_backs_it() {
    let table = MetadataTable::new(tile_class(), 1).expect("table");
    let mut explicit_tile = TileMetadata::new(
        TileMetadataPayload {
            properties: BTreeMap::from([("isSquare".to_string(), MetadataValue::Bool(true))]),
            ..TileMetadataPayload::default()
        },
        Some(tile_class()),
    );
    table.set_property(0, "isSquare", true).expect("write");

    let explicit = TileEntity::Explicit(&mut explicit_tile);
    let row = TableRow::new(&table, 0).expect("row");

    assert_square_tile(&explicit);
    assert_square_tile(&row);
    assert!(!explicit.is_implicit());
}
