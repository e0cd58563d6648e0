use super::*;
use crate::{
    error::SchemaError,
    types::{ComponentType, ValueType},
    value::MetadataValue,
};
use std::{collections::BTreeMap, sync::Arc};

// ---- helpers -----------------------------------------------------------

fn tile_class() -> MetadataClass {
    MetadataClass::new(
        "tile",
        [
            ClassProperty::vector("color", ComponentType::Float32, 3).with_semantic("COLOR"),
            ClassProperty::scalar("isSquare", ComponentType::Boolean),
        ],
    )
    .expect("tile class is valid")
}

fn validation_lines(err: SchemaError) -> Vec<String> {
    err.tree().expect("validation error").flatten()
}

fn quality_enum() -> Arc<MetadataEnum> {
    Arc::new(
        MetadataEnum::new(
            "quality",
            ComponentType::Uint8,
            vec![EnumValue::new("LOW", 0), EnumValue::new("HIGH", 10)],
        )
        .expect("quality enum is valid"),
    )
}

// ---- class -------------------------------------------------------------

#[test]
fn class_with_unique_ids_and_semantics_builds() {
    let class = tile_class();

    assert!(class.has_property("color"));
    assert!(!class.has_property("NAME"));
    assert_eq!(class.property_ids().collect::<Vec<_>>(), ["color", "isSquare"]);
    assert_eq!(
        class.definition_for_semantic("COLOR").map(ClassProperty::id),
        Some("color")
    );
    assert!(class.definition_for_semantic("NAME").is_none());
}

#[test]
fn definition_for_unknown_id_is_an_error() {
    let err = tile_class()
        .definition_for("numberOfPoints")
        .expect_err("property is not defined");

    assert_eq!(err.class, "tile");
    assert_eq!(err.id, "numberOfPoints");
}

#[test]
fn duplicate_semantic_is_rejected() {
    let err = MetadataClass::new(
        "tile",
        [
            ClassProperty::scalar("height", ComponentType::Float32).with_semantic("HEIGHT"),
            ClassProperty::scalar("altitude", ComponentType::Float64).with_semantic("HEIGHT"),
        ],
    )
    .expect_err("semantics must be unique");

    let lines = validation_lines(err);
    assert_eq!(lines.len(), 1, "{lines:?}");
    assert!(lines[0].contains("semantic 'HEIGHT' is already declared"), "{lines:?}");
}

#[test]
fn duplicate_property_id_is_rejected() {
    let err = MetadataClass::new(
        "tile",
        [
            ClassProperty::scalar("height", ComponentType::Float32),
            ClassProperty::scalar("height", ComponentType::Uint8),
        ],
    )
    .expect_err("ids must be unique");

    assert!(
        validation_lines(err)
            .iter()
            .any(|l| l.contains("duplicate property id 'height'"))
    );
}

#[test]
fn vector_without_component_count_is_rejected() {
    let def = ClassPropertyDef {
        ty: "VECTOR".to_string(),
        component_type: Some(ComponentType::Float32),
        ..ClassPropertyDef::default()
    };

    let err = ClassProperty::from_def("position", def, &BTreeMap::new())
        .expect_err("VECTOR needs a componentCount");

    assert!(
        err.flatten()
            .iter()
            .any(|l| l.contains("componentCount is required for VECTOR"))
    );
}

#[test]
fn vec_shorthand_conflicting_with_component_count_is_rejected() {
    let def = ClassPropertyDef {
        ty: "VEC3".to_string(),
        component_type: Some(ComponentType::Float32),
        component_count: Some(4),
        ..ClassPropertyDef::default()
    };

    assert!(ClassProperty::from_def("position", def, &BTreeMap::new()).is_err());
}

#[test]
fn normalized_float_is_rejected() {
    let err = MetadataClass::new(
        "tile",
        [ClassProperty::scalar("intensity", ComponentType::Float32).normalized()],
    )
    .expect_err("normalized floats are contradictory");

    assert!(
        validation_lines(err)
            .iter()
            .any(|l| l.contains("normalized is only valid for integer components"))
    );
}

#[test]
fn every_problem_in_a_class_is_reported() {
    let err = MetadataClass::new(
        "tile",
        [
            ClassProperty::scalar("intensity", ComponentType::Float32).normalized(),
            ClassProperty::vector("flags", ComponentType::Boolean, 2),
            ClassProperty::scalar("kind", ComponentType::Enum),
        ],
    )
    .expect_err("three broken properties");

    let tree = err.tree().expect("validation error");
    assert_eq!(tree.len(), 3, "{tree}");
}

#[test]
fn non_conforming_default_is_rejected() {
    let err = MetadataClass::new(
        "tile",
        [ClassProperty::scalar("level", ComponentType::Uint8).with_default(300u16)],
    )
    .expect_err("300 does not fit in UINT8");

    assert!(
        validation_lines(err)
            .iter()
            .any(|l| l.contains("default does not conform"))
    );
}

// ---- conform -----------------------------------------------------------

#[test]
fn conform_coerces_integral_numbers_per_signedness() {
    let unsigned = ClassProperty::scalar("count", ComponentType::Uint16);
    let signed = ClassProperty::scalar("offset", ComponentType::Int8);

    assert_eq!(
        unsigned.conform(&MetadataValue::Int(10)),
        Ok(MetadataValue::Uint(10))
    );
    assert_eq!(
        signed.conform(&MetadataValue::Float(-4.0)),
        Ok(MetadataValue::Int(-4))
    );
    assert!(signed.conform(&MetadataValue::Float(-4.5)).is_err());
    assert!(signed.conform(&MetadataValue::Int(-129)).is_err());
    assert!(unsigned.conform(&MetadataValue::Int(-1)).is_err());
}

#[test]
fn conform_checks_vector_arity() {
    let color = ClassProperty::vector("color", ComponentType::Float32, 3);

    assert!(color.conform(&MetadataValue::from(vec![1.0f64, 0.5, 0.0])).is_ok());
    assert!(color.conform(&MetadataValue::from(vec![1.0f64, 0.5])).is_err());
    assert!(color.conform(&MetadataValue::Float(1.0)).is_err());
    assert!(
        color
            .conform(&MetadataValue::from(vec![
                MetadataValue::from(vec![1.0f64]),
                MetadataValue::Float(0.0),
                MetadataValue::Float(0.0),
            ]))
            .is_err()
    );
}

#[test]
fn conform_accepts_any_length_for_variable_arrays() {
    let tags = ClassProperty::variable_array("tags", ComponentType::String);

    assert!(tags.conform(&MetadataValue::Array(Vec::new())).is_ok());
    assert!(tags.conform(&MetadataValue::from(vec!["a", "b", "c"])).is_ok());
    assert!(tags.conform(&MetadataValue::from(vec![1u8])).is_err());
}

#[test]
fn conform_rounds_float32_through_single_precision() {
    let height = ClassProperty::scalar("height", ComponentType::Float32);
    let conformed = height.conform(&MetadataValue::Float(0.1)).expect("finite");

    assert_eq!(conformed, MetadataValue::Float(f64::from(0.1f32)));
    assert!(height.conform(&MetadataValue::Float(f64::MAX)).is_err());
}

#[test]
fn conform_enum_requires_a_declared_member() {
    let quality = ClassProperty::enumeration("quality", quality_enum());

    assert_eq!(
        quality.conform(&MetadataValue::from("HIGH")),
        Ok(MetadataValue::from("HIGH"))
    );
    assert!(quality.conform(&MetadataValue::from("MEDIUM")).is_err());
    assert!(quality.conform(&MetadataValue::Uint(10)).is_err());
}

#[test]
fn zero_value_follows_shape() {
    let enum_prop = ClassProperty::enumeration("quality", quality_enum());
    let fixed = ClassProperty::array("samples", ComponentType::Int16, 2);
    let variable = ClassProperty::variable_array("samples", ComponentType::Int16);

    assert_eq!(enum_prop.zero_value(), MetadataValue::from("LOW"));
    assert_eq!(enum_prop.storage_component(), ComponentType::Uint8);
    assert_eq!(fixed.zero_value(), MetadataValue::from(vec![0i16, 0]));
    assert_eq!(variable.zero_value(), MetadataValue::Array(Vec::new()));
}

// ---- enum --------------------------------------------------------------

#[test]
fn enum_rejects_duplicates_and_unrepresentable_values() {
    let err = MetadataEnum::new(
        "quality",
        ComponentType::Uint8,
        vec![
            EnumValue::new("LOW", 0),
            EnumValue::new("LOW", 1),
            EnumValue::new("HUGE", 256),
        ],
    )
    .expect_err("broken enum");

    let lines = err.tree().expect("validation error").flatten();
    assert!(lines.iter().any(|l| l.contains("duplicate enum name 'LOW'")));
    assert!(lines.iter().any(|l| l.contains("does not fit in UINT8")));
}

#[test]
fn enum_lookups_are_bidirectional() {
    let def = quality_enum();

    assert_eq!(def.name_for(10), Some("HIGH"));
    assert_eq!(def.value_for("LOW"), Some(0));
    assert_eq!(def.name_for(3), None);
}

// ---- schema json -------------------------------------------------------

const SCHEMA_JSON: &str = r#"{
    "id": "city",
    "version": "1.0.0",
    "enums": {
        "quality": {
            "valueType": "UINT8",
            "values": [
                { "name": "LOW", "value": 0 },
                { "name": "HIGH", "value": 1 }
            ]
        }
    },
    "classes": {
        "tile": {
            "properties": {
                "color": {
                    "type": "ARRAY",
                    "componentType": "FLOAT32",
                    "componentCount": 3,
                    "semantic": "COLOR"
                },
                "isSquare": {
                    "description": "Is a square tile, rather than a rectangular partial tile",
                    "type": "BOOLEAN"
                },
                "quality": { "type": "ENUM", "enumType": "quality", "default": "LOW" },
                "intensity": { "type": "UINT8", "normalized": true },
                "position": { "type": "VEC3", "componentType": "FLOAT64" }
            }
        }
    }
}"#;

#[test]
fn schema_json_resolves_classes_and_enums() {
    let schema = MetadataSchema::from_json(SCHEMA_JSON).expect("schema json is valid");
    let class = schema.class("tile").expect("tile class");

    assert_eq!(schema.id(), Some("city"));
    assert_eq!(schema.version(), Some("1.0.0"));
    assert_eq!(class.len(), 5);

    let quality = class.property("quality").expect("quality property");
    assert_eq!(quality.component_type(), ComponentType::Enum);
    assert_eq!(
        quality.enum_type().map(|def| def.id()),
        schema.enum_type("quality").map(|def| def.id())
    );

    let position = class.property("position").expect("position property");
    assert_eq!(position.value_type(), ValueType::Vector);
    assert_eq!(position.component_count(), Some(3));

    let is_square = class.property("isSquare").expect("isSquare property");
    assert_eq!(is_square.value_type(), ValueType::Scalar);
    assert_eq!(is_square.component_type(), ComponentType::Boolean);
}

#[test]
fn schema_json_reports_unknown_enum_and_type() {
    let json = r#"{
        "classes": {
            "tile": {
                "properties": {
                    "quality": { "type": "ENUM", "enumType": "missing" },
                    "shape": { "type": "POLYGON" }
                }
            }
        }
    }"#;

    let err = MetadataSchema::from_json(json).expect_err("schema is broken");
    let lines = err.tree().expect("validation error").flatten();

    assert!(lines.iter().any(|l| l.contains("enumType 'missing' is not defined")), "{lines:?}");
    assert!(lines.iter().any(|l| l.contains("unknown property type 'POLYGON'")), "{lines:?}");
}

#[test]
fn schema_json_syntax_error_is_a_parse_error() {
    let err = MetadataSchema::from_json("{ not json").expect_err("malformed");

    assert!(matches!(err, SchemaError::Parse(_)));
}

#[test]
fn programmatic_schema_rejects_duplicate_class_ids() {
    let err = MetadataSchema::new(None, Vec::new(), [tile_class(), tile_class()])
        .expect_err("duplicate class ids");

    assert!(err.to_string().contains("duplicate class id 'tile'"));
}
