use crate::codec::{
    decode_element, decode_int, encode_element, pack_bits, read_bit, unpack_bits, write_bit,
};
use tilemeta_schema::{
    node::ClassProperty,
    types::{ComponentType, ValueType},
    value::MetadataValue,
};

///
/// ColumnValues
///
/// Backing storage for every element of one property, across all rows.
///

#[derive(Clone, Debug)]
pub(crate) enum ColumnValues {
    /// Fixed-width components back to back (numeric and ENUM).
    Packed {
        component: ComponentType,
        bytes: Vec<u8>,
    },

    /// LSB-first bitstream of `len` booleans.
    Bits { bits: Vec<u8>, len: usize },

    /// UTF-8 heap; string `i` is `bytes[offsets[i]..offsets[i + 1]]`.
    Strings { bytes: Vec<u8>, offsets: Vec<usize> },
}

impl ColumnValues {
    pub(crate) const fn empty_for(component: ComponentType) -> Self {
        match component {
            ComponentType::Boolean => Self::Bits {
                bits: Vec::new(),
                len: 0,
            },
            ComponentType::String => Self::Strings {
                bytes: Vec::new(),
                offsets: Vec::new(),
            },
            component => Self::Packed {
                component,
                bytes: Vec::new(),
            },
        }
    }
}

///
/// EncodedRow
///
/// One row's worth of elements, already validated and encoded. Building this
/// is the only fallible step of a write; applying it cannot fail.
///

#[derive(Clone, Debug)]
pub(crate) enum EncodedRow {
    Packed { bytes: Vec<u8>, len: usize },
    Bits(Vec<bool>),
    Strings(Vec<String>),
}

impl EncodedRow {
    pub(crate) const fn len(&self) -> usize {
        match self {
            Self::Packed { len, .. } => *len,
            Self::Bits(values) => values.len(),
            Self::Strings(values) => values.len(),
        }
    }
}

///
/// PropertyColumn
///
/// Storage for one property across every row of a table. Variable-length
/// arrays carry `array_offsets` (row `r` owns elements
/// `array_offsets[r]..array_offsets[r + 1]`); every other shape owns a fixed
/// stride of elements per row.
///

#[derive(Clone, Debug)]
pub(crate) struct PropertyColumn {
    property: ClassProperty,
    values: ColumnValues,
    array_offsets: Option<Vec<usize>>,
}

impl PropertyColumn {
    pub(crate) const fn from_parts(
        property: ClassProperty,
        values: ColumnValues,
        array_offsets: Option<Vec<usize>>,
    ) -> Self {
        Self {
            property,
            values,
            array_offsets,
        }
    }

    /// A column of `count` rows, each holding `fill`.
    pub(crate) fn filled(property: ClassProperty, count: usize, fill: &EncodedRow) -> Self {
        let mut values = ColumnValues::empty_for(property.storage_component());
        let per_row = fill.len();

        match (&mut values, fill) {
            (ColumnValues::Packed { bytes, .. }, EncodedRow::Packed { bytes: row, .. }) => {
                *bytes = row.repeat(count);
            }
            (ColumnValues::Bits { bits, len }, EncodedRow::Bits(row)) => {
                let all: Vec<bool> = std::iter::repeat_n(row.iter().copied(), count)
                    .flatten()
                    .collect();
                *bits = pack_bits(&all);
                *len = all.len();
            }
            (ColumnValues::Strings { bytes, offsets }, EncodedRow::Strings(row)) => {
                offsets.push(0);
                for _ in 0..count {
                    for s in row {
                        bytes.extend_from_slice(s.as_bytes());
                        offsets.push(bytes.len());
                    }
                }
            }
            _ => {}
        }

        let array_offsets = property
            .is_variable_length()
            .then(|| (0..=count).map(|r| r * per_row).collect());

        Self {
            property,
            values,
            array_offsets,
        }
    }

    /// Raw packed value bytes (the bitstream for booleans, the heap for
    /// strings).
    pub(crate) fn raw_bytes(&self) -> &[u8] {
        match &self.values {
            ColumnValues::Packed { bytes, .. } | ColumnValues::Strings { bytes, .. } => bytes,
            ColumnValues::Bits { bits, .. } => bits,
        }
    }

    // Element range owned by `row`.
    fn element_range(&self, row: usize) -> Option<(usize, usize)> {
        match (&self.array_offsets, self.property.elements_per_value()) {
            (Some(offsets), _) => Some((*offsets.get(row)?, *offsets.get(row + 1)?)),
            (None, Some(stride)) => Some((row * stride, row * stride + stride)),
            (None, None) => None,
        }
    }

    ///
    /// READ
    ///

    /// Decode one row. Only the row's own elements are touched.
    pub(crate) fn read_row(&self, row: usize) -> Result<MetadataValue, String> {
        let (start, end) = self
            .element_range(row)
            .ok_or_else(|| format!("no element range for row {row}"))?;

        let elements = (start..end)
            .map(|index| self.read_element(index))
            .collect::<Result<Vec<_>, _>>()?;

        if self.property.value_type() == ValueType::Scalar {
            elements
                .into_iter()
                .next()
                .ok_or_else(|| format!("row {row} holds no element"))
        } else {
            Ok(MetadataValue::Array(elements))
        }
    }

    fn read_element(&self, index: usize) -> Result<MetadataValue, String> {
        let property = &self.property;

        match &self.values {
            ColumnValues::Bits { bits, len } => {
                if index >= *len {
                    return Err(format!("boolean element {index} is past the end"));
                }
                read_bit(bits, index)
                    .map(MetadataValue::Bool)
                    .ok_or_else(|| format!("boolean element {index} is past the end"))
            }

            ColumnValues::Strings { bytes, offsets } => {
                let (start, end) = offsets
                    .get(index)
                    .zip(offsets.get(index + 1))
                    .ok_or_else(|| format!("string element {index} has no offsets"))?;
                let slice = bytes
                    .get(*start..*end)
                    .ok_or_else(|| format!("string element {index} is past the end"))?;

                std::str::from_utf8(slice)
                    .map(|s| MetadataValue::String(s.to_string()))
                    .map_err(|e| format!("string element {index} is not utf-8: {e}"))
            }

            ColumnValues::Packed { component, bytes } => {
                if let Some(def) = property.enum_type() {
                    let raw = decode_int(bytes, *component, index)
                        .ok_or_else(|| format!("enum element {index} is past the end"))?;
                    let name = i64::try_from(raw)
                        .ok()
                        .and_then(|raw| def.name_for(raw))
                        .ok_or_else(|| format!("{raw} is not a member of enum '{}'", def.id()))?;

                    return Ok(MetadataValue::String(name.to_string()));
                }

                decode_element(bytes, *component, index, property.is_normalized())
                    .ok_or_else(|| format!("element {index} is past the end"))
            }
        }
    }

    ///
    /// WRITE
    ///

    /// Encode a conformed value into the shape this column stores.
    pub(crate) fn encode(
        property: &ClassProperty,
        value: &MetadataValue,
    ) -> Result<EncodedRow, String> {
        let components: &[MetadataValue] = match value {
            MetadataValue::Array(items) => items,
            scalar => std::slice::from_ref(scalar),
        };

        match property.component_type() {
            ComponentType::Boolean => components
                .iter()
                .map(|c| c.as_bool().ok_or_else(|| "expected BOOLEAN".to_string()))
                .collect::<Result<Vec<_>, _>>()
                .map(EncodedRow::Bits),

            ComponentType::String => components
                .iter()
                .map(|c| {
                    c.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| "expected STRING".to_string())
                })
                .collect::<Result<Vec<_>, _>>()
                .map(EncodedRow::Strings),

            ComponentType::Enum => {
                let def = property
                    .enum_type()
                    .ok_or_else(|| "ENUM property has no enumType".to_string())?;
                let storage = def.value_type();
                let mut bytes = Vec::new();
                for c in components {
                    let name = c.as_str().ok_or_else(|| "expected ENUM name".to_string())?;
                    let raw = def
                        .value_for(name)
                        .ok_or_else(|| format!("'{name}' is not a member of enum '{}'", def.id()))?;
                    encode_element(&mut bytes, storage, &MetadataValue::Int(raw), false)?;
                }

                Ok(EncodedRow::Packed {
                    bytes,
                    len: components.len(),
                })
            }

            component => {
                let mut bytes = Vec::new();
                for c in components {
                    encode_element(&mut bytes, component, c, property.is_normalized())?;
                }

                Ok(EncodedRow::Packed {
                    bytes,
                    len: components.len(),
                })
            }
        }
    }

    /// Replace row `row` with `encoded`. Variable-length rows whose length
    /// changes splice the backing buffers and shift every later offset.
    pub(crate) fn write_row(&mut self, row: usize, encoded: EncodedRow) -> Result<(), String> {
        let (start, end) = self
            .element_range(row)
            .ok_or_else(|| format!("no element range for row {row}"))?;
        let new_len = encoded.len();

        match (&mut self.values, encoded) {
            (
                ColumnValues::Packed { component, bytes },
                EncodedRow::Packed { bytes: row_bytes, .. },
            ) => {
                let width = component
                    .byte_size()
                    .ok_or_else(|| format!("{component} has no packed width"))?;
                bytes.splice(start * width..end * width, row_bytes);
            }

            (ColumnValues::Bits { bits, len }, EncodedRow::Bits(row_bits)) => {
                if row_bits.len() == end - start {
                    for (i, v) in row_bits.into_iter().enumerate() {
                        write_bit(bits, start + i, v);
                    }
                } else {
                    let mut all = unpack_bits(bits, *len);
                    all.splice(start..end, row_bits);
                    *bits = pack_bits(&all);
                    *len = all.len();
                }
            }

            (ColumnValues::Strings { bytes, offsets }, EncodedRow::Strings(strings)) => {
                let byte_start = offsets[start];
                let byte_end = offsets[end];

                let mut heap = Vec::new();
                let mut local = Vec::with_capacity(strings.len());
                for s in &strings {
                    heap.extend_from_slice(s.as_bytes());
                    local.push(byte_start + heap.len());
                }
                let new_byte_end = byte_start + heap.len();

                bytes.splice(byte_start..byte_end, heap);

                // offsets after this row move by the byte delta
                for offset in &mut offsets[end + 1..] {
                    *offset = *offset - byte_end + new_byte_end;
                }
                offsets.splice(start + 1..=end, local);
            }

            _ => return Err("encoded row does not match column storage".to_string()),
        }

        if let Some(array_offsets) = &mut self.array_offsets
            && new_len != end - start
        {
            for offset in &mut array_offsets[row + 1..] {
                *offset = *offset - end + start + new_len;
            }
        }

        Ok(())
    }
}
