//! Runtime configuration, loadable from TOML.
//!
//! ```toml
//! [table]
//! max_rows = 1048576
//! offset_type = "UINT32"
//!
//! [entity]
//! conform_inline_writes = true
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use tilemeta_schema::types::ComponentType;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("config toml is malformed: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

///
/// MetadataConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    pub table: TableConfig,
    pub entity: EntityConfig,
}

impl MetadataConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.table.offset_type.is_unsigned() {
            return Err(ConfigError::Invalid {
                key: "table.offset_type",
                reason: format!(
                    "offsets must use an unsigned integer type, found {}",
                    self.table.offset_type
                ),
            });
        }
        if self.table.max_rows == 0 {
            return Err(ConfigError::Invalid {
                key: "table.max_rows",
                reason: "must be positive".to_string(),
            });
        }

        Ok(())
    }
}

///
/// TableConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    /// Upper bound on rows a single table may hold.
    pub max_rows: usize,

    /// Width of array/string offsets in binary buffers that do not say.
    pub offset_type: ComponentType,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_rows: u32::MAX as usize,
            offset_type: ComponentType::Uint32,
        }
    }
}

///
/// EntityConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EntityConfig {
    /// Conform inline writes to class-defined properties against their
    /// definition. Ids the class does not define are always accepted.
    pub conform_inline_writes: bool,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            conform_inline_writes: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = MetadataConfig::from_toml_str("").expect("empty config is valid");

        assert_eq!(config, MetadataConfig::default());
        assert!(config.entity.conform_inline_writes);
        assert_eq!(config.table.offset_type, ComponentType::Uint32);
    }

    #[test]
    fn sections_override_defaults() {
        let config = MetadataConfig::from_toml_str(
            r#"
            [table]
            max_rows = 64
            offset_type = "UINT16"

            [entity]
            conform_inline_writes = false
            "#,
        )
        .expect("valid config");

        assert_eq!(config.table.max_rows, 64);
        assert_eq!(config.table.offset_type, ComponentType::Uint16);
        assert!(!config.entity.conform_inline_writes);
    }

    #[test]
    fn signed_offset_type_is_rejected() {
        let err = MetadataConfig::from_toml_str("[table]\noffset_type = \"INT32\"")
            .expect_err("signed offsets are invalid");

        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "table.offset_type",
                ..
            }
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            MetadataConfig::from_toml_str("[table]\nmax_row = 3"),
            Err(ConfigError::Parse(_))
        ));
    }
}
