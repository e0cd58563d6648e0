//! Packed little-endian component codec.
//!
//! Columns store numeric components back to back in little-endian order,
//! booleans as an LSB-first bitstream. These helpers read and write one
//! element at a time so a row access only touches that row's bytes.

mod normalize;

pub use normalize::{normalize, unnormalize};

use tilemeta_schema::{types::ComponentType, value::MetadataValue};

macro_rules! read_le {
    ($ty:ty, $bytes:expr, $index:expr) => {{
        const WIDTH: usize = std::mem::size_of::<$ty>();
        let start = $index * WIDTH;
        $bytes.get(start..start + WIDTH).map(|slice| {
            let mut buf = [0u8; WIDTH];
            buf.copy_from_slice(slice);
            <$ty>::from_le_bytes(buf)
        })
    }};
}

/// Decode packed element `index`. `None` if the component is not packed
/// or the bytes are too short.
#[must_use]
pub fn decode_element(
    bytes: &[u8],
    component: ComponentType,
    index: usize,
    normalized: bool,
) -> Option<MetadataValue> {
    macro_rules! int {
        ($ty:ty, $variant:ident) => {{
            let raw = read_le!($ty, bytes, index)?;
            if normalized {
                MetadataValue::Float(normalize(raw))
            } else {
                MetadataValue::$variant(raw.into())
            }
        }};
    }

    let value = match component {
        ComponentType::Int8 => int!(i8, Int),
        ComponentType::Int16 => int!(i16, Int),
        ComponentType::Int32 => int!(i32, Int),
        ComponentType::Int64 => int!(i64, Int),
        ComponentType::Uint8 => int!(u8, Uint),
        ComponentType::Uint16 => int!(u16, Uint),
        ComponentType::Uint32 => int!(u32, Uint),
        ComponentType::Uint64 => int!(u64, Uint),
        ComponentType::Float32 => MetadataValue::Float(f64::from(read_le!(f32, bytes, index)?)),
        ComponentType::Float64 => MetadataValue::Float(read_le!(f64, bytes, index)?),
        ComponentType::Boolean | ComponentType::Enum | ComponentType::String => return None,
    };

    Some(value)
}

/// Decode packed element `index` as a plain integer (enum values, offsets).
#[must_use]
pub fn decode_int(bytes: &[u8], component: ComponentType, index: usize) -> Option<i128> {
    decode_element(bytes, component, index, false).and_then(|value| match value {
        MetadataValue::Int(v) => Some(i128::from(v)),
        MetadataValue::Uint(v) => Some(i128::from(v)),
        _ => None,
    })
}

/// Append the packed encoding of one conformed component to `out`.
pub fn encode_element(
    out: &mut Vec<u8>,
    component: ComponentType,
    value: &MetadataValue,
    normalized: bool,
) -> Result<(), String> {
    let mismatch = || format!("cannot encode {} as {component}", value.kind_label());

    macro_rules! int {
        ($ty:ty) => {{
            let raw: $ty = if normalized {
                unnormalize::<$ty>(value.as_f64().ok_or_else(mismatch)?)
            } else {
                let wide = value.as_i128().ok_or_else(mismatch)?;
                <$ty>::try_from(wide)
                    .map_err(|_| format!("{wide} is out of range for {component}"))?
            };
            out.extend_from_slice(&raw.to_le_bytes());
        }};
    }

    match component {
        ComponentType::Int8 => int!(i8),
        ComponentType::Int16 => int!(i16),
        ComponentType::Int32 => int!(i32),
        ComponentType::Int64 => int!(i64),
        ComponentType::Uint8 => int!(u8),
        ComponentType::Uint16 => int!(u16),
        ComponentType::Uint32 => int!(u32),
        ComponentType::Uint64 => int!(u64),
        ComponentType::Float32 => {
            let v = value.as_f64().ok_or_else(mismatch)? as f32;
            out.extend_from_slice(&v.to_le_bytes());
        }
        ComponentType::Float64 => {
            let v = value.as_f64().ok_or_else(mismatch)?;
            out.extend_from_slice(&v.to_le_bytes());
        }
        ComponentType::Boolean | ComponentType::Enum | ComponentType::String => {
            return Err(format!("{component} is not a packed component"));
        }
    }

    Ok(())
}

///
/// BITSTREAMS
///

#[must_use]
pub fn read_bit(bits: &[u8], index: usize) -> Option<bool> {
    bits.get(index / 8).map(|byte| (byte >> (index % 8)) & 1 == 1)
}

pub fn write_bit(bits: &mut [u8], index: usize, value: bool) {
    if let Some(byte) = bits.get_mut(index / 8) {
        let mask = 1u8 << (index % 8);
        if value {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }
}

#[must_use]
pub fn pack_bits(values: &[bool]) -> Vec<u8> {
    let mut bits = vec![0u8; values.len().div_ceil(8)];
    for (i, v) in values.iter().enumerate() {
        write_bit(&mut bits, i, *v);
    }

    bits
}

#[must_use]
pub fn unpack_bits(bits: &[u8], len: usize) -> Vec<bool> {
    (0..len)
        .map(|i| read_bit(bits, i).unwrap_or(false))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_elements_are_little_endian() {
        let mut out = Vec::new();
        encode_element(&mut out, ComponentType::Uint16, &MetadataValue::Uint(0x0102), false)
            .expect("in range");
        encode_element(&mut out, ComponentType::Uint16, &MetadataValue::Uint(7), false)
            .expect("in range");

        assert_eq!(out, [0x02, 0x01, 0x07, 0x00]);
        assert_eq!(
            decode_element(&out, ComponentType::Uint16, 1, false),
            Some(MetadataValue::Uint(7))
        );
        assert_eq!(decode_element(&out, ComponentType::Uint16, 2, false), None);
    }

    #[test]
    fn normalized_uint8_stores_type_maximum_for_one() {
        let mut out = Vec::new();
        encode_element(&mut out, ComponentType::Uint8, &MetadataValue::Float(1.0), true)
            .expect("normalized");

        assert_eq!(out, [255]);
        assert_eq!(
            decode_element(&out, ComponentType::Uint8, 0, true),
            Some(MetadataValue::Float(1.0))
        );
        assert_eq!(
            decode_element(&out, ComponentType::Uint8, 0, false),
            Some(MetadataValue::Uint(255))
        );
    }

    #[test]
    fn out_of_range_integer_is_rejected() {
        let mut out = Vec::new();
        let err = encode_element(&mut out, ComponentType::Int8, &MetadataValue::Int(200), false)
            .expect_err("200 does not fit in INT8");

        assert!(err.contains("out of range"), "{err}");
        assert!(out.is_empty());
    }

    #[test]
    fn signed_integers_decode_as_int() {
        let mut out = Vec::new();
        encode_element(&mut out, ComponentType::Int32, &MetadataValue::Int(-42), false)
            .expect("in range");

        assert_eq!(decode_int(&out, ComponentType::Int32, 0), Some(-42));
    }

    #[test]
    fn bitstream_is_lsb_first() {
        let bits = pack_bits(&[true, false, true, false, false, false, false, false, true]);

        assert_eq!(bits, [0b0000_0101, 0b0000_0001]);
        assert_eq!(read_bit(&bits, 8), Some(true));
        assert_eq!(read_bit(&bits, 16), None);
        assert_eq!(unpack_bits(&bits, 3), [true, false, true]);
    }
}
