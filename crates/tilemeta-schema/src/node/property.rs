use crate::{
    error::ErrorTree,
    node::MetadataEnum,
    types::{ComponentType, ValueType},
    validate::validate_property,
    value::MetadataValue,
};
use serde::Deserialize;
use std::{collections::BTreeMap, sync::Arc};

///
/// ClassPropertyDef
///
/// JSON form of a property definition. `type` is one of `SCALAR`,
/// `VECTOR`, `VEC2`..`VEC4`, `ARRAY`, or a bare component type name, which
/// declares a SCALAR of that component.
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassPropertyDef {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default)]
    pub component_type: Option<ComponentType>,

    #[serde(default)]
    pub component_count: Option<u32>,

    #[serde(default)]
    pub enum_type: Option<String>,

    #[serde(default)]
    pub normalized: bool,

    #[serde(default)]
    pub semantic: Option<String>,

    #[serde(default)]
    pub default: Option<MetadataValue>,

    #[serde(default)]
    pub optional: bool,
}

///
/// ClassProperty
///
/// One property definition of a class: value shape, component encoding,
/// normalization, and the optional semantic/default annotations.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ClassProperty {
    id: String,
    name: Option<String>,
    description: Option<String>,
    value_type: ValueType,
    component_type: ComponentType,
    component_count: Option<u32>,
    enum_type: Option<Arc<MetadataEnum>>,
    normalized: bool,
    semantic: Option<String>,
    default: Option<MetadataValue>,
    optional: bool,
}

impl ClassProperty {
    fn with_shape(
        id: impl Into<String>,
        value_type: ValueType,
        component_type: ComponentType,
        component_count: Option<u32>,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            value_type,
            component_type,
            component_count,
            enum_type: None,
            normalized: false,
            semantic: None,
            default: None,
            optional: false,
        }
    }

    ///
    /// CONSTRUCTION
    ///
    /// These only describe the property; it is validated when the class
    /// that owns it is built.
    ///

    pub fn scalar(id: impl Into<String>, component_type: ComponentType) -> Self {
        Self::with_shape(id, ValueType::Scalar, component_type, None)
    }

    pub fn vector(id: impl Into<String>, component_type: ComponentType, count: u32) -> Self {
        Self::with_shape(id, ValueType::Vector, component_type, Some(count))
    }

    pub fn array(id: impl Into<String>, component_type: ComponentType, count: u32) -> Self {
        Self::with_shape(id, ValueType::Array, component_type, Some(count))
    }

    pub fn variable_array(id: impl Into<String>, component_type: ComponentType) -> Self {
        Self::with_shape(id, ValueType::Array, component_type, None)
    }

    /// A scalar ENUM property drawing from `enum_type`.
    pub fn enumeration(id: impl Into<String>, enum_type: Arc<MetadataEnum>) -> Self {
        Self::scalar(id, ComponentType::Enum).with_enum_type(enum_type)
    }

    #[must_use]
    pub fn with_enum_type(mut self, enum_type: Arc<MetadataEnum>) -> Self {
        self.enum_type = Some(enum_type);
        self
    }

    #[must_use]
    pub fn with_semantic(mut self, semantic: impl Into<String>) -> Self {
        self.semantic = Some(semantic.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<MetadataValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub const fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Build from the JSON form, resolving `enumType` against `enums`.
    pub(crate) fn from_def(
        id: &str,
        def: ClassPropertyDef,
        enums: &BTreeMap<String, Arc<MetadataEnum>>,
    ) -> Result<Self, ErrorTree> {
        let mut errs = ErrorTree::new();

        let (value_type, component_type, component_count) = match parse_shape(&def) {
            Ok(shape) => shape,
            Err(e) => {
                errs.add(e);
                return Err(errs);
            }
        };

        let enum_type = match def.enum_type.as_deref() {
            Some(enum_id) => {
                let resolved = enums.get(enum_id).cloned();
                if resolved.is_none() {
                    errs.add(format!("enumType '{enum_id}' is not defined"));
                }
                resolved
            }
            None => None,
        };

        let property = Self {
            id: id.to_string(),
            name: def.name,
            description: def.description,
            value_type,
            component_type,
            component_count,
            enum_type,
            normalized: def.normalized,
            semantic: def.semantic,
            default: def.default,
            optional: def.optional,
        };
        errs.merge(validate_property(&property));
        errs.result()?;

        Ok(property)
    }

    ///
    /// ACCESSORS
    ///

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[must_use]
    pub const fn component_type(&self) -> ComponentType {
        self.component_type
    }

    #[must_use]
    pub const fn component_count(&self) -> Option<u32> {
        self.component_count
    }

    #[must_use]
    pub const fn enum_type(&self) -> Option<&Arc<MetadataEnum>> {
        self.enum_type.as_ref()
    }

    #[must_use]
    pub const fn is_normalized(&self) -> bool {
        self.normalized
    }

    #[must_use]
    pub fn semantic(&self) -> Option<&str> {
        self.semantic.as_deref()
    }

    #[must_use]
    pub const fn default(&self) -> Option<&MetadataValue> {
        self.default.as_ref()
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// ARRAY without a `componentCount`.
    #[must_use]
    pub const fn is_variable_length(&self) -> bool {
        matches!(self.value_type, ValueType::Array) && self.component_count.is_none()
    }

    /// Components per value, or `None` for variable-length arrays.
    #[must_use]
    pub const fn elements_per_value(&self) -> Option<usize> {
        match (self.value_type, self.component_count) {
            (ValueType::Scalar, _) => Some(1),
            (_, Some(count)) => Some(count as usize),
            (_, None) => None,
        }
    }

    /// The component actually written to storage; ENUM resolves to its
    /// enum's integer value type.
    #[must_use]
    pub fn storage_component(&self) -> ComponentType {
        match (&self.component_type, &self.enum_type) {
            (ComponentType::Enum, Some(def)) => def.value_type(),
            (component, _) => *component,
        }
    }

    /// Value a freshly allocated row holds when no default is declared.
    #[must_use]
    pub fn zero_value(&self) -> MetadataValue {
        let component = self.zero_component();

        match self.elements_per_value() {
            Some(_) if self.value_type == ValueType::Scalar => component,
            Some(count) => MetadataValue::Array(vec![component; count]),
            None => MetadataValue::Array(Vec::new()),
        }
    }

    fn zero_component(&self) -> MetadataValue {
        match self.component_type {
            ComponentType::Boolean => MetadataValue::Bool(false),
            ComponentType::String => MetadataValue::String(String::new()),
            ComponentType::Enum => MetadataValue::String(
                self.enum_type
                    .as_ref()
                    .and_then(|def| def.first())
                    .map(|v| v.name.clone())
                    .unwrap_or_default(),
            ),
            ComponentType::Float32 | ComponentType::Float64 => MetadataValue::Float(0.0),
            _ if self.normalized => MetadataValue::Float(0.0),
            c if c.is_signed() => MetadataValue::Int(0),
            _ => MetadataValue::Uint(0),
        }
    }

    ///
    /// CONFORMANCE
    ///

    /// Check `value` against this property's shape and coerce every
    /// component into its canonical representation. The error is a
    /// human-readable reason.
    pub fn conform(&self, value: &MetadataValue) -> Result<MetadataValue, String> {
        if self.value_type == ValueType::Scalar {
            if value.is_array() {
                return Err("expected a scalar, found an array".to_string());
            }

            return self.conform_component(value);
        }

        let Some(items) = value.as_array() else {
            return Err(format!(
                "expected {}, found {}",
                self.shape_label(),
                value.kind_label()
            ));
        };
        if let Some(expected) = self.component_count
            && items.len() != expected as usize
        {
            return Err(format!(
                "expected {expected} components, found {}",
                items.len()
            ));
        }

        items
            .iter()
            .map(|item| {
                if item.is_array() {
                    Err("nested arrays are not supported".to_string())
                } else {
                    self.conform_component(item)
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(MetadataValue::Array)
    }

    fn conform_component(&self, value: &MetadataValue) -> Result<MetadataValue, String> {
        let component = self.component_type;
        let mismatch = || format!("expected {component}, found {}", value.kind_label());

        match component {
            ComponentType::Boolean => value
                .as_bool()
                .map(MetadataValue::Bool)
                .ok_or_else(mismatch),

            ComponentType::String => value
                .as_str()
                .map(|s| MetadataValue::String(s.to_string()))
                .ok_or_else(mismatch),

            ComponentType::Enum => {
                let name = value.as_str().ok_or_else(mismatch)?;
                let def = self
                    .enum_type
                    .as_ref()
                    .ok_or_else(|| "ENUM property has no enumType".to_string())?;
                if def.value_for(name).is_none() {
                    return Err(format!("'{name}' is not a member of enum '{}'", def.id()));
                }

                Ok(MetadataValue::String(name.to_string()))
            }

            ComponentType::Float32 => {
                let v = finite(value).ok_or_else(mismatch)?;
                let narrowed = v as f32;
                if !narrowed.is_finite() {
                    return Err(format!("{v} overflows FLOAT32"));
                }

                Ok(MetadataValue::Float(f64::from(narrowed)))
            }

            ComponentType::Float64 => finite(value).map(MetadataValue::Float).ok_or_else(mismatch),

            // normalized integers are written as their floating fraction
            _ if self.normalized => finite(value).map(MetadataValue::Float).ok_or_else(mismatch),

            _ => {
                let raw = value.as_i128().ok_or_else(mismatch)?;
                let (min, max) = component.int_range().ok_or_else(mismatch)?;
                if raw < min || raw > max {
                    return Err(format!("{raw} is out of range for {component}"));
                }

                Ok(if component.is_signed() {
                    MetadataValue::Int(raw as i64)
                } else {
                    MetadataValue::Uint(raw as u64)
                })
            }
        }
    }

    fn shape_label(&self) -> String {
        match (self.value_type, self.component_count) {
            (ValueType::Scalar, _) => "a scalar".to_string(),
            (ValueType::Vector, Some(n)) => format!("a VECTOR of {n}"),
            (ValueType::Array, Some(n)) => format!("an ARRAY of {n}"),
            (_, None) => "an ARRAY".to_string(),
        }
    }
}

fn finite(value: &MetadataValue) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

// Resolve the `type` / `componentType` / `componentCount` triple.
fn parse_shape(def: &ClassPropertyDef) -> Result<(ValueType, ComponentType, Option<u32>), String> {
    let required_component = || {
        def.component_type
            .ok_or_else(|| format!("componentType is required for type {}", def.ty))
    };

    match def.ty.as_str() {
        "SCALAR" => Ok((ValueType::Scalar, required_component()?, def.component_count)),
        "VECTOR" => Ok((ValueType::Vector, required_component()?, def.component_count)),
        "ARRAY" => Ok((ValueType::Array, required_component()?, def.component_count)),
        "VEC2" | "VEC3" | "VEC4" => {
            let implied = u32::from(def.ty.as_bytes()[3] - b'0');
            if let Some(count) = def.component_count
                && count != implied
            {
                return Err(format!(
                    "type {} conflicts with componentCount {count}",
                    def.ty
                ));
            }

            Ok((ValueType::Vector, required_component()?, Some(implied)))
        }
        other => {
            let component = ComponentType::from_wire(other)
                .ok_or_else(|| format!("unknown property type '{other}'"))?;
            if let Some(explicit) = def.component_type
                && explicit != component
            {
                return Err(format!("type {other} conflicts with componentType {explicit}"));
            }

            Ok((ValueType::Scalar, component, def.component_count))
        }
    }
}
