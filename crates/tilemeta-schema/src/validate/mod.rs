//! Validation passes shared by the schema nodes.
//!
//! Each pass returns an [`ErrorTree`]; callers nest it under the id of the
//! node it was run for and fail construction if anything was recorded.

pub mod naming;

use crate::{
    MAX_VECTOR_COMPONENTS,
    error::ErrorTree,
    node::{ClassProperty, MetadataEnum},
    types::{ComponentType, ValueType},
};
use std::collections::{BTreeMap, BTreeSet};

pub(crate) use naming::validate_id;

/// Local invariants of one property definition.
pub(crate) fn validate_property(property: &ClassProperty) -> ErrorTree {
    let mut errs = ErrorTree::new();
    let component = property.component_type();

    if let Err(e) = validate_id("property", property.id()) {
        errs.add(e);
    }
    if let Some(semantic) = property.semantic()
        && let Err(e) = validate_id("semantic", semantic)
    {
        errs.add(e);
    }

    // shape
    match (property.value_type(), property.component_count()) {
        (ValueType::Scalar, Some(count)) => errs.add(format!(
            "componentCount {count} is only valid for VECTOR and ARRAY"
        )),
        (ValueType::Vector, None) => errs.add("componentCount is required for VECTOR"),
        (ValueType::Vector, Some(count)) if !(2..=MAX_VECTOR_COMPONENTS).contains(&count) => {
            errs.add(format!(
                "VECTOR componentCount must be between 2 and {MAX_VECTOR_COMPONENTS}, found {count}"
            ));
        }
        (ValueType::Array, Some(0)) => errs.add("ARRAY componentCount must be positive"),
        _ => {}
    }
    if property.value_type() == ValueType::Vector && !component.is_numeric() {
        errs.add(format!("VECTOR components must be numeric, found {component}"));
    }

    // normalization
    if property.is_normalized() && !component.is_integer() {
        errs.add(format!("normalized is only valid for integer components, found {component}"));
    }

    // enums
    match (component, property.enum_type()) {
        (ComponentType::Enum, None) => errs.add("ENUM component requires an enumType"),
        (ComponentType::Enum, Some(_)) | (_, None) => {}
        (_, Some(def)) => errs.add(format!(
            "enumType '{}' is only valid for ENUM components, found {component}",
            def.id()
        )),
    }

    // default is only checked once the definition itself is sound
    if errs.is_empty()
        && let Some(default) = property.default()
        && let Err(reason) = property.conform(default)
    {
        errs.add(format!("default does not conform: {reason}"));
    }

    errs
}

/// Class-wide invariants: property ids and semantics are unique.
pub(crate) fn validate_class_properties<'a>(
    properties: impl IntoIterator<Item = &'a ClassProperty>,
) -> ErrorTree {
    let mut errs = ErrorTree::new();
    let mut ids = BTreeSet::new();
    let mut semantics: BTreeMap<&str, &str> = BTreeMap::new();

    for property in properties {
        let mut local = validate_property(property);

        if !ids.insert(property.id()) {
            local.add(format!("duplicate property id '{}'", property.id()));
        }
        if let Some(semantic) = property.semantic() {
            if let Some(first) = semantics.get(semantic) {
                local.add(format!("semantic '{semantic}' is already declared by '{first}'"));
            } else {
                semantics.insert(semantic, property.id());
            }
        }

        errs.add_child(property.id(), local);
    }

    errs
}

/// Enum invariants: integer value type, non-empty, unique names and values,
/// every value representable.
pub(crate) fn validate_enum(def: &MetadataEnum) -> ErrorTree {
    let mut errs = ErrorTree::new();
    let value_type = def.value_type();

    if let Err(e) = validate_id("enum", def.id()) {
        errs.add(e);
    }
    if !value_type.is_integer() {
        errs.add(format!("enum valueType must be an integer component, found {value_type}"));
    }
    if def.values().is_empty() {
        errs.add("enum must declare at least one value");
    }

    let mut names = BTreeSet::new();
    let mut values = BTreeSet::new();
    for member in def.values() {
        if member.name.is_empty() {
            errs.add("enum value name is empty");
        }
        if !names.insert(member.name.as_str()) {
            errs.add(format!("duplicate enum name '{}'", member.name));
        }
        if !values.insert(member.value) {
            errs.add(format!("duplicate enum value {}", member.value));
        }
        if let Some((min, max)) = value_type.int_range() {
            let raw = i128::from(member.value);
            if raw < min || raw > max {
                errs.add(format!(
                    "enum value {} for '{}' does not fit in {value_type}",
                    member.value, member.name
                ));
            }
        }
    }

    errs
}
