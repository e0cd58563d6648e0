use crate::{
    error::{ErrorTree, SchemaError},
    types::ComponentType,
    validate::validate_enum,
};
use serde::{Deserialize, Serialize};

///
/// EnumValue
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub value: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EnumValue {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
            description: None,
        }
    }
}

///
/// EnumDef
/// JSON form of an enum definition, keyed by id in the schema.
///

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDef {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_value_type")]
    pub value_type: ComponentType,

    pub values: Vec<EnumValue>,
}

const fn default_value_type() -> ComponentType {
    ComponentType::Uint16
}

///
/// MetadataEnum
///
/// Named integer constants an ENUM property draws from. Stored as packed
/// integers of `value_type`, exposed to callers by member name.
///

#[derive(Clone, Debug, PartialEq)]
pub struct MetadataEnum {
    id: String,
    name: Option<String>,
    description: Option<String>,
    value_type: ComponentType,
    values: Vec<EnumValue>,
}

impl MetadataEnum {
    pub fn new(
        id: impl Into<String>,
        value_type: ComponentType,
        values: Vec<EnumValue>,
    ) -> Result<Self, SchemaError> {
        let def = Self {
            id: id.into(),
            name: None,
            description: None,
            value_type,
            values,
        };

        let mut errs = ErrorTree::new();
        errs.add_child(def.id.clone(), validate_enum(&def));
        errs.result()?;

        Ok(def)
    }

    pub(crate) fn from_def(id: &str, def: EnumDef) -> Result<Self, ErrorTree> {
        let built = Self {
            id: id.to_string(),
            name: def.name,
            description: def.description,
            value_type: def.value_type,
            values: def.values,
        };
        validate_enum(&built).result()?;

        Ok(built)
    }

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
    pub const fn value_type(&self) -> ComponentType {
        self.value_type
    }

    #[must_use]
    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    /// Member name for a stored integer.
    #[must_use]
    pub fn name_for(&self, value: i64) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.value == value)
            .map(|v| v.name.as_str())
    }

    /// Stored integer for a member name.
    #[must_use]
    pub fn value_for(&self, name: &str) -> Option<i64> {
        self.values.iter().find(|v| v.name == name).map(|v| v.value)
    }

    /// First declared member; the fill value for rows without a default.
    #[must_use]
    pub fn first(&self) -> Option<&EnumValue> {
        self.values.first()
    }
}
