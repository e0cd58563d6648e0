use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// ComponentType
///
/// Storage type of one component of a property value.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[remain::sorted]
pub enum ComponentType {
    #[display("BOOLEAN")]
    Boolean,
    #[display("ENUM")]
    Enum,
    #[display("FLOAT32")]
    Float32,
    #[display("FLOAT64")]
    Float64,
    #[display("INT8")]
    Int8,
    #[display("INT16")]
    Int16,
    #[display("INT32")]
    Int32,
    #[display("INT64")]
    Int64,
    #[display("STRING")]
    String,
    #[display("UINT8")]
    Uint8,
    #[display("UINT16")]
    Uint16,
    #[display("UINT32")]
    Uint32,
    #[display("UINT64")]
    Uint64,
}

impl ComponentType {
    /// Parse the SCREAMING_CASE wire name (`"UINT8"`, `"FLOAT32"`, ...).
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        let ty = match name {
            "BOOLEAN" => Self::Boolean,
            "ENUM" => Self::Enum,
            "FLOAT32" => Self::Float32,
            "FLOAT64" => Self::Float64,
            "INT8" => Self::Int8,
            "INT16" => Self::Int16,
            "INT32" => Self::Int32,
            "INT64" => Self::Int64,
            "STRING" => Self::String,
            "UINT8" => Self::Uint8,
            "UINT16" => Self::Uint16,
            "UINT32" => Self::Uint32,
            "UINT64" => Self::Uint64,
            _ => return None,
        };

        Some(ty)
    }

    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Enum => "ENUM",
            Self::Float32 => "FLOAT32",
            Self::Float64 => "FLOAT64",
            Self::Int8 => "INT8",
            Self::Int16 => "INT16",
            Self::Int32 => "INT32",
            Self::Int64 => "INT64",
            Self::String => "STRING",
            Self::Uint8 => "UINT8",
            Self::Uint16 => "UINT16",
            Self::Uint32 => "UINT32",
            Self::Uint64 => "UINT64",
        }
    }

    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    #[must_use]
    pub const fn is_unsigned(self) -> bool {
        matches!(self, Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64)
    }

    // ENUM is integer-backed on disk but is not an integer component
    #[must_use]
    pub const fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Packed width in bytes, or `None` for components without a fixed
    /// width (BOOLEAN is bit-packed, STRING is variable, ENUM depends on the
    /// enum's value type).
    #[must_use]
    pub const fn byte_size(self) -> Option<usize> {
        match self {
            Self::Int8 | Self::Uint8 => Some(1),
            Self::Int16 | Self::Uint16 => Some(2),
            Self::Int32 | Self::Uint32 | Self::Float32 => Some(4),
            Self::Int64 | Self::Uint64 | Self::Float64 => Some(8),
            Self::Boolean | Self::Enum | Self::String => None,
        }
    }

    /// Inclusive representable range for integer components.
    #[must_use]
    pub const fn int_range(self) -> Option<(i128, i128)> {
        match self {
            Self::Int8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Self::Int16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::Int32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::Uint8 => Some((0, u8::MAX as i128)),
            Self::Uint16 => Some((0, u16::MAX as i128)),
            Self::Uint32 => Some((0, u32::MAX as i128)),
            Self::Uint64 => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }
}

///
/// ValueType
///
/// Shape of a property value. VECTOR and fixed ARRAY values carry exactly
/// `componentCount` components; an ARRAY without a count is variable-length.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    #[default]
    Scalar,
    Vector,
    Array,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip_through_serde() {
        for name in ["UINT8", "INT64", "FLOAT32", "BOOLEAN", "STRING", "ENUM"] {
            let parsed = ComponentType::from_wire(name).expect("known component type");
            let json = serde_json::to_string(&parsed).expect("serialize component type");

            assert_eq!(json, format!("\"{name}\""));
            assert_eq!(parsed.to_string(), name);
            assert_eq!(name.parse::<ComponentType>(), Ok(parsed));
        }
    }

    #[test]
    fn display_and_parse_use_wire_names() {
        assert_eq!(ComponentType::Uint16.to_string(), "UINT16");
        assert_eq!(ComponentType::Float64.to_string(), "FLOAT64");
        assert_eq!("FLOAT32".parse::<ComponentType>(), Ok(ComponentType::Float32));
        assert!("UINT128".parse::<ComponentType>().is_err());
    }

    #[test]
    fn integer_classification_excludes_enum() {
        assert!(ComponentType::Uint16.is_integer());
        assert!(ComponentType::Int8.is_signed());
        assert!(!ComponentType::Enum.is_integer());
        assert!(!ComponentType::Float32.is_integer());
        assert_eq!(ComponentType::Enum.byte_size(), None);
    }

    #[test]
    fn int_range_matches_primitive_bounds() {
        assert_eq!(ComponentType::Uint8.int_range(), Some((0, 255)));
        assert_eq!(ComponentType::Int16.int_range(), Some((-32_768, 32_767)));
        assert_eq!(ComponentType::Float64.int_range(), None);
    }
}
