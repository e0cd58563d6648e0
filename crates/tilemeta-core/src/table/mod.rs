//! Columnar storage for the metadata of many entities of one class.

mod buffers;
mod column;


pub use buffers::PropertyBuffers;

use crate::{
    config::TableConfig,
    error::MetadataError,
    obs::sink::{self, MetricsEvent},
};
use column::{EncodedRow, PropertyColumn};
use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tilemeta_schema::{
    node::{ClassProperty, MetadataClass},
    value::MetadataValue,
};

///
/// MetadataTable
///
/// `count` rows of one class, one packed column per property. Rows are
/// mutable in place; the row count never changes.
///
/// Every column sits behind its own lock, so a shared `&MetadataTable` can be
/// read from many threads and written through. Ordering between writers of
/// the same row is the caller's concern.
///

#[derive(Debug)]
pub struct MetadataTable {
    class: Arc<MetadataClass>,
    count: usize,
    columns: BTreeMap<String, RwLock<PropertyColumn>>,
}

impl MetadataTable {
    /// A table of `count` rows, each holding every property's default (or
    /// zero value).
    pub fn new(class: Arc<MetadataClass>, count: usize) -> Result<Self, MetadataError> {
        Self::with_config(class, count, &TableConfig::default())
    }

    pub fn with_config(
        class: Arc<MetadataClass>,
        count: usize,
        config: &TableConfig,
    ) -> Result<Self, MetadataError> {
        Self::build(class, count, BTreeMap::new(), config, false)
    }

    /// Build the table from binary column buffers keyed by property id.
    ///
    /// A property with no buffer is default-filled when it declares a
    /// `default` or is `optional`; any other missing buffer is an error.
    pub fn from_buffers(
        class: Arc<MetadataClass>,
        count: usize,
        buffers: BTreeMap<String, PropertyBuffers>,
        config: &TableConfig,
    ) -> Result<Self, MetadataError> {
        Self::build(class, count, buffers, config, true)
    }

    fn build(
        class: Arc<MetadataClass>,
        count: usize,
        mut buffers: BTreeMap<String, PropertyBuffers>,
        config: &TableConfig,
        require_buffers: bool,
    ) -> Result<Self, MetadataError> {
        if count > config.max_rows {
            return Err(MetadataError::invalid_argument(format!(
                "table of {count} rows exceeds the configured maximum of {}",
                config.max_rows
            )));
        }
        if let Some(id) = buffers.keys().find(|id| !class.has_property(id)) {
            return Err(MetadataError::unknown_property(id.clone()));
        }

        let mut columns = BTreeMap::new();
        for property in class.properties() {
            let column = match buffers.remove(property.id()) {
                Some(buffers) => {
                    buffers::decode_column(property, count, buffers, config.offset_type)?
                }
                None if require_buffers
                    && property.default().is_none()
                    && !property.is_optional() =>
                {
                    return Err(MetadataError::invalid_argument(format!(
                        "required property '{}' has no buffers",
                        property.id()
                    )));
                }
                None => Self::default_column(property, count)?,
            };
            columns.insert(property.id().to_string(), RwLock::new(column));
        }

        tracing::debug!(class = class.id(), count, "metadata table built");

        Ok(Self {
            class,
            count,
            columns,
        })
    }

    // Every row holds the property's default, or its zero value.
    fn default_column(
        property: &ClassProperty,
        count: usize,
    ) -> Result<PropertyColumn, MetadataError> {
        let fill = property
            .default()
            .cloned()
            .unwrap_or_else(|| property.zero_value());
        let fill = Self::encode(property, &fill)?;

        Ok(PropertyColumn::filled(property.clone(), count, &fill))
    }

    ///
    /// ACCESSORS
    ///

    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub const fn class(&self) -> &Arc<MetadataClass> {
        &self.class
    }

    /// Row-independent: every row carries every property of the class.
    #[must_use]
    pub fn has_property(&self, id: &str) -> bool {
        self.class.has_property(id)
    }

    pub fn property_ids(&self) -> impl Iterator<Item = &str> {
        self.class.property_ids()
    }

    ///
    /// ROW ACCESS
    ///

    pub fn get_property(&self, row: usize, id: &str) -> Result<MetadataValue, MetadataError> {
        self.check_row(row)?;
        let column = self.read_column(id)?;

        let value = column
            .read_row(row)
            .map_err(|reason| MetadataError::corruption(id, reason))?;
        sink::record(MetricsEvent::PropertyRead {
            class: Some(self.class.id()),
        });

        Ok(value)
    }

    /// Conform and encode `value`, then replace row `row`. A failed write
    /// leaves the column untouched.
    pub fn set_property(
        &self,
        row: usize,
        id: &str,
        value: impl Into<MetadataValue>,
    ) -> Result<(), MetadataError> {
        self.check_row(row)?;
        let property = self.class.definition_for(id)?;

        let encoded = match Self::encode(property, &value.into()) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::debug!(
                    class = self.class.id(),
                    property = id,
                    row,
                    error = %err.display_with_class(),
                    "metadata write rejected"
                );
                sink::record(MetricsEvent::WriteRejected {
                    class: Some(self.class.id()),
                });
                return Err(err);
            }
        };

        self.write_column(id)?
            .write_row(row, encoded)
            .map_err(|reason| MetadataError::corruption(id, reason))?;
        sink::record(MetricsEvent::PropertyWrite {
            class: Some(self.class.id()),
        });

        Ok(())
    }

    /// `Ok(None)` when no property declares `semantic`.
    pub fn get_property_by_semantic(
        &self,
        row: usize,
        semantic: &str,
    ) -> Result<Option<MetadataValue>, MetadataError> {
        self.check_row(row)?;

        match self.class.definition_for_semantic(semantic) {
            Some(property) => self.get_property(row, property.id()).map(Some),
            None => {
                sink::record(MetricsEvent::SemanticMiss {
                    class: Some(self.class.id()),
                    write: false,
                });
                Ok(None)
            }
        }
    }

    /// Writes through the property declaring `semantic`. If none does, the
    /// call does nothing; it never adds a column.
    pub fn set_property_by_semantic(
        &self,
        row: usize,
        semantic: &str,
        value: impl Into<MetadataValue>,
    ) -> Result<(), MetadataError> {
        self.check_row(row)?;

        match self.class.definition_for_semantic(semantic) {
            Some(property) => self.set_property(row, property.id(), value),
            None => {
                tracing::trace!(class = self.class.id(), semantic, row, "semantic write ignored");
                sink::record(MetricsEvent::SemanticMiss {
                    class: Some(self.class.id()),
                    write: true,
                });
                Ok(())
            }
        }
    }

    /// Copy of a column's packed value bytes: the bitstream for BOOLEAN, the
    /// byte heap for STRING.
    pub fn raw_values(&self, id: &str) -> Result<Vec<u8>, MetadataError> {
        Ok(self.read_column(id)?.raw_bytes().to_vec())
    }

    ///
    /// INTERNAL
    ///

    const fn check_row(&self, row: usize) -> Result<(), MetadataError> {
        if row >= self.count {
            return Err(MetadataError::OutOfRange {
                row,
                count: self.count,
            });
        }

        Ok(())
    }

    fn encode(
        property: &ClassProperty,
        value: &MetadataValue,
    ) -> Result<EncodedRow, MetadataError> {
        property
            .conform(value)
            .and_then(|conformed| PropertyColumn::encode(property, &conformed))
            .map_err(|reason| MetadataError::type_mismatch(property.id(), reason))
    }

    fn read_column(&self, id: &str) -> Result<RwLockReadGuard<'_, PropertyColumn>, MetadataError> {
        self.columns
            .get(id)
            .map(|lock| lock.read().unwrap_or_else(PoisonError::into_inner))
            .ok_or_else(|| MetadataError::unknown_property(id))
    }

    fn write_column(
        &self,
        id: &str,
    ) -> Result<RwLockWriteGuard<'_, PropertyColumn>, MetadataError> {
        self.columns
            .get(id)
            .map(|lock| lock.write().unwrap_or_else(PoisonError::into_inner))
            .ok_or_else(|| MetadataError::unknown_property(id))
    }
}
