mod class;
mod r#enum;
mod property;
mod schema;

#[cfg(test)]
mod tests;

pub use class::{ClassDef, MetadataClass, UnknownPropertyError};
pub use r#enum::{EnumDef, EnumValue, MetadataEnum};
pub use property::{ClassProperty, ClassPropertyDef};
pub use schema::{MetadataSchema, SchemaDef};
