use crate::{entity::MetadataEntity, error::MetadataError, table::MetadataTable};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;
use tilemeta_schema::{node::MetadataClass, value::MetadataValue};

///
/// TableRow
///
/// One row of a shared [`MetadataTable`]. Every operation passes straight
/// through to the table at the fixed row, so writes are visible to every
/// other view of the same row.
///

#[derive(Clone, Copy, Debug)]
pub struct TableRow<'a> {
    table: &'a MetadataTable,
    row: usize,
    extensions: Option<&'a JsonValue>,
    extras: Option<&'a JsonValue>,
}

impl<'a> TableRow<'a> {
    /// Fails with `OutOfRange` unless `row < table.count()`.
    pub const fn new(table: &'a MetadataTable, row: usize) -> Result<Self, MetadataError> {
        if row >= table.count() {
            return Err(MetadataError::OutOfRange {
                row,
                count: table.count(),
            });
        }

        Ok(Self {
            table,
            row,
            extensions: None,
            extras: None,
        })
    }

    #[must_use]
    pub const fn with_extensions(mut self, extensions: Option<&'a JsonValue>) -> Self {
        self.extensions = extensions;
        self
    }

    #[must_use]
    pub const fn with_extras(mut self, extras: Option<&'a JsonValue>) -> Self {
        self.extras = extras;
        self
    }

    #[must_use]
    pub const fn table(&self) -> &'a MetadataTable {
        self.table
    }

    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }
}

impl MetadataEntity for TableRow<'_> {
    fn class(&self) -> Option<&MetadataClass> {
        Some(self.table.class().as_ref())
    }

    fn extensions(&self) -> Option<&JsonValue> {
        self.extensions
    }

    fn extras(&self) -> Option<&JsonValue> {
        self.extras
    }

    fn has_property(&self, id: &str) -> bool {
        self.table.has_property(id)
    }

    fn property_ids(&self) -> BTreeSet<String> {
        self.table.property_ids().map(str::to_string).collect()
    }

    fn get_property(&self, id: &str) -> Result<MetadataValue, MetadataError> {
        self.table.get_property(self.row, id)
    }

    fn set_property(&mut self, id: &str, value: MetadataValue) -> Result<(), MetadataError> {
        self.table.set_property(self.row, id, value)
    }

    fn get_property_by_semantic(
        &self,
        semantic: &str,
    ) -> Result<Option<MetadataValue>, MetadataError> {
        self.table.get_property_by_semantic(self.row, semantic)
    }

    fn set_property_by_semantic(
        &mut self,
        semantic: &str,
        value: MetadataValue,
    ) -> Result<(), MetadataError> {
        self.table.set_property_by_semantic(self.row, semantic, value)
    }
}
