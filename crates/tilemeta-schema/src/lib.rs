//! Schema layer for tile metadata: component/value types, property and class
//! nodes, enum definitions, and the dataset-level schema registry.
//!
//! Everything in this crate is immutable once built. Validation happens at
//! construction time and reports every problem it finds through
//! [`ErrorTree`].

pub mod error;
pub mod node;
pub mod types;
pub mod validate;
pub mod value;

/// Maximum length for class, property, enum and semantic identifiers.
pub const MAX_ID_LEN: usize = 64;

/// Maximum number of components in a VECTOR property.
pub const MAX_VECTOR_COMPONENTS: u32 = 4;

// re-exports
pub use error::{ErrorTree, SchemaError};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        error::{ErrorTree, SchemaError},
        node::*,
        types::{ComponentType, ValueType},
        value::MetadataValue,
    };
    pub use serde::{Deserialize, Serialize};
}
