use std::fmt;
use thiserror::Error as ThisError;
use tilemeta_schema::{SchemaError, node::UnknownPropertyError};

///
/// MetadataError
///
/// Failure of one table or entity operation. Per-call errors never leave a
/// column half-written; schema errors abort construction entirely.
///

#[derive(Debug, ThisError)]
pub enum MetadataError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("unknown property '{id}'")]
    UnknownProperty { id: String },

    #[error("row {row} is out of range for a table of {count} rows")]
    OutOfRange { row: usize, count: usize },

    #[error("type mismatch for property '{id}': {reason}")]
    TypeMismatch { id: String, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid buffer for property '{id}': {reason}")]
    InvalidBuffer { id: String, reason: String },

    #[error("corrupt column '{id}': {reason}")]
    Corruption { id: String, reason: String },
}

impl MetadataError {
    pub fn unknown_property(id: impl Into<String>) -> Self {
        Self::UnknownProperty { id: id.into() }
    }

    pub fn type_mismatch(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TypeMismatch {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn invalid_buffer(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBuffer {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn corruption(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corruption {
            id: id.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Schema(_) => ErrorClass::Schema,
            Self::UnknownProperty { .. } => ErrorClass::NotFound,
            Self::OutOfRange { .. } => ErrorClass::OutOfRange,
            Self::TypeMismatch { .. } => ErrorClass::TypeMismatch,
            Self::InvalidArgument(_) => ErrorClass::InvalidArgument,
            Self::InvalidBuffer { .. } | Self::Corruption { .. } => ErrorClass::Corruption,
        }
    }

    /// Readers treat an unknown property as "no value" rather than a defect.
    #[must_use]
    pub const fn is_unknown_property(&self) -> bool {
        matches!(self, Self::UnknownProperty { .. })
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}: {self}", self.class())
    }
}

impl From<UnknownPropertyError> for MetadataError {
    fn from(err: UnknownPropertyError) -> Self {
        Self::UnknownProperty { id: err.id }
    }
}

///
/// ErrorClass
/// Stable classification of [`MetadataError`] for callers and telemetry.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorClass {
    Schema,
    NotFound,
    OutOfRange,
    TypeMismatch,
    InvalidArgument,
    Corruption,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Schema => "schema",
            Self::NotFound => "not_found",
            Self::OutOfRange => "out_of_range",
            Self::TypeMismatch => "type_mismatch",
            Self::InvalidArgument => "invalid_argument",
            Self::Corruption => "corruption",
        };
        write!(f, "{label}")
    }
}
