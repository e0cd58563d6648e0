use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use tilemeta_core::{
    config::ConfigError,
    error::{ErrorClass, MetadataError},
};
use tilemeta_schema::SchemaError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<MetadataError> for Error {
    fn from(err: MetadataError) -> Self {
        let origin = match err {
            MetadataError::Schema(_) => ErrorOrigin::Schema,
            _ => ErrorOrigin::Metadata,
        };

        Self::new(err.class().into(), origin, err.to_string())
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Self::new(ErrorKind::Schema, ErrorOrigin::Schema, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::InvalidArgument, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Schema or class definition rejected.
    Schema,

    /// Property id is not defined.
    NotFound,

    /// Row index past the end of a table.
    OutOfRange,

    /// Value does not fit the property definition.
    TypeMismatch,

    /// Caller supplied an argument that can never succeed.
    InvalidArgument,

    /// Stored or supplied bytes are inconsistent. The caller cannot remediate
    /// this.
    Corruption,
}

impl From<ErrorClass> for ErrorKind {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Schema => Self::Schema,
            ErrorClass::NotFound => Self::NotFound,
            ErrorClass::OutOfRange => Self::OutOfRange,
            ErrorClass::TypeMismatch => Self::TypeMismatch,
            ErrorClass::InvalidArgument => Self::InvalidArgument,
            ErrorClass::Corruption => Self::Corruption,
        }
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Metadata,
    Schema,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilemeta_core::config::MetadataConfig;

    #[test]
    fn metadata_errors_keep_their_class() {
        let err: Error = MetadataError::OutOfRange { row: 12, count: 10 }.into();

        assert_eq!(err.kind, ErrorKind::OutOfRange);
        assert_eq!(err.origin, ErrorOrigin::Metadata);
        assert_eq!(
            err.to_string(),
            "row 12 is out of range for a table of 10 rows"
        );
    }

    #[test]
    fn schema_errors_keep_their_origin() {
        let schema_err = SchemaError::from(
            serde_json::from_str::<serde_json::Value>("{").expect_err("truncated json"),
        );

        let direct: Error = MetadataError::Schema(schema_err).into();
        assert_eq!(direct.kind, ErrorKind::Schema);
        assert_eq!(direct.origin, ErrorOrigin::Schema);
    }

    #[test]
    fn config_errors_are_invalid_arguments() {
        let err: Error = MetadataConfig::from_toml_str("[table]\nmax_rows = 0")
            .expect_err("zero rows")
            .into();

        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert_eq!(err.origin, ErrorOrigin::Config);
        assert!(err.message.contains("table.max_rows"), "{}", err.message);
    }

    #[test]
    fn error_serializes_with_stable_names() {
        let err = Error::new(ErrorKind::NotFound, ErrorOrigin::Metadata, "gone");
        let json = serde_json::to_value(&err).expect("serialize");

        assert_eq!(
            json,
            serde_json::json!({ "kind": "NotFound", "origin": "Metadata", "message": "gone" })
        );
    }
}
