use crate::{
    codec::decode_int,
    error::MetadataError,
    table::column::{ColumnValues, PropertyColumn},
};
use tilemeta_schema::{node::ClassProperty, types::ComponentType};

///
/// PropertyBuffers
///
/// Binary form of one property column as it arrives from a tileset.
/// Array offsets count elements; string offsets count bytes. Both use
/// `offset_type`, or the table config's width when unset.
///

#[derive(Clone, Debug, Default)]
pub struct PropertyBuffers {
    pub values: Vec<u8>,
    pub array_offsets: Option<Vec<u8>>,
    pub string_offsets: Option<Vec<u8>>,
    pub offset_type: Option<ComponentType>,
}

impl PropertyBuffers {
    #[must_use]
    pub fn new(values: impl Into<Vec<u8>>) -> Self {
        Self {
            values: values.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_array_offsets(mut self, offsets: impl Into<Vec<u8>>) -> Self {
        self.array_offsets = Some(offsets.into());
        self
    }

    #[must_use]
    pub fn with_string_offsets(mut self, offsets: impl Into<Vec<u8>>) -> Self {
        self.string_offsets = Some(offsets.into());
        self
    }

    #[must_use]
    pub const fn with_offset_type(mut self, offset_type: ComponentType) -> Self {
        self.offset_type = Some(offset_type);
        self
    }
}

/// Validate `buffers` against `property` and build its column.
pub(crate) fn decode_column(
    property: &ClassProperty,
    count: usize,
    buffers: PropertyBuffers,
    default_offset_type: ComponentType,
) -> Result<PropertyColumn, MetadataError> {
    let id = property.id();
    let bad = |reason: String| MetadataError::invalid_buffer(id, reason);
    let offset_type = buffers.offset_type.unwrap_or(default_offset_type);
    if !offset_type.is_unsigned() {
        return Err(bad(format!("offset type {offset_type} is not unsigned")));
    }

    // element count and optional per-row offsets
    let (elements, array_offsets) = if property.is_variable_length() {
        let raw = buffers
            .array_offsets
            .as_deref()
            .ok_or_else(|| bad("variable-length array has no array offsets".to_string()))?;
        let n = count
            .checked_add(1)
            .ok_or_else(|| bad(format!("{count} rows overflow the offset count")))?;
        let offsets = decode_offsets(raw, offset_type, n).map_err(bad)?;
        let last = offsets.last().copied().unwrap_or(0);

        (last, Some(offsets))
    } else {
        let stride = property.elements_per_value().unwrap_or(1);
        let elements = count
            .checked_mul(stride)
            .ok_or_else(|| bad(format!("{count} rows of {stride} elements overflow")))?;

        (elements, None)
    };

    let mut values = buffers.values;
    let column = match property.storage_component() {
        ComponentType::Boolean => {
            let needed = elements.div_ceil(8);
            check_len(values.len(), needed).map_err(bad)?;
            values.truncate(needed);

            ColumnValues::Bits {
                bits: values,
                len: elements,
            }
        }

        ComponentType::String => {
            let raw = buffers
                .string_offsets
                .as_deref()
                .ok_or_else(|| bad("STRING column has no string offsets".to_string()))?;
            let n = elements
                .checked_add(1)
                .ok_or_else(|| bad(format!("{elements} strings overflow the offset count")))?;
            let offsets = decode_offsets(raw, offset_type, n).map_err(bad)?;
            let end = offsets.last().copied().unwrap_or(0);
            check_len(values.len(), end).map_err(bad)?;
            values.truncate(end);

            for (i, pair) in offsets.windows(2).enumerate() {
                std::str::from_utf8(&values[pair[0]..pair[1]])
                    .map_err(|e| bad(format!("string {i} is not utf-8: {e}")))?;
            }

            ColumnValues::Strings {
                bytes: values,
                offsets,
            }
        }

        component => {
            let width = component
                .byte_size()
                .ok_or_else(|| bad(format!("{component} has no packed width")))?;
            let needed = elements
                .checked_mul(width)
                .ok_or_else(|| bad(format!("{elements} elements of {width} bytes overflow")))?;
            check_len(values.len(), needed).map_err(bad)?;
            values.truncate(needed);

            ColumnValues::Packed {
                component,
                bytes: values,
            }
        }
    };

    Ok(PropertyColumn::from_parts(
        property.clone(),
        column,
        array_offsets,
    ))
}

fn check_len(have: usize, needed: usize) -> Result<(), String> {
    if have < needed {
        return Err(format!("expected at least {needed} bytes, found {have}"));
    }

    Ok(())
}

// Decode `n` non-decreasing offsets of width `offset_type`.
fn decode_offsets(raw: &[u8], offset_type: ComponentType, n: usize) -> Result<Vec<usize>, String> {
    let width = offset_type
        .byte_size()
        .ok_or_else(|| format!("{offset_type} has no packed width"))?;
    let needed = n
        .checked_mul(width)
        .ok_or_else(|| format!("{n} offsets of {width} bytes overflow"))?;
    check_len(raw.len(), needed)?;

    let mut offsets = Vec::with_capacity(n);

    for i in 0..n {
        let offset = decode_int(raw, offset_type, i)
            .ok_or_else(|| format!("expected {n} offsets, buffer ends at {i}"))?;
        let offset = usize::try_from(offset)
            .map_err(|_| format!("offset {i} ({offset}) does not fit in memory"))?;

        if let Some(&previous) = offsets.last()
            && offset < previous
        {
            return Err(format!("offset {i} ({offset}) is smaller than offset {}", i - 1));
        }
        offsets.push(offset);
    }

    Ok(offsets)
}
