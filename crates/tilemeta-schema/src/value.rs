use serde::{Deserialize, Serialize};
use std::fmt;

///
/// MetadataValue
///
/// Decoded, application-level property value.
///
/// Signed integer components decode to `Int`, unsigned ones to `Uint`,
/// floats and normalized integers to `Float`. ENUM components are exposed
/// by member name as `String`. VECTOR and ARRAY values are `Array`.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Array(Vec<Self>),
}

impl MetadataValue {
    /// Build an `Array` from owned items.
    pub fn from_list<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    #[must_use]
    pub const fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Numeric view as `f64`; lossy for 64-bit integers beyond 2^53.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Uint(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Exact integer view. Floats qualify only when they carry no fraction.
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(i128::from(*v)),
            Self::Uint(v) => Some(i128::from(*v)),
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => {
                // i128 covers every integral f64 we can store in 64 bits
                let bound = 2f64.powi(64);
                (v.abs() <= bound).then_some(*v as i128)
            }
            _ => None,
        }
    }

    /// Short label for diagnostics.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

//
// From
//

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for MetadataValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl<T: Into<Self>> From<Vec<T>> for MetadataValue {
    fn from(items: Vec<T>) -> Self {
        Self::from_list(items)
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $wide:ty; $($ty:ty),*) => {
        $(
            impl From<$ty> for MetadataValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(<$wide>::from(v))
                }
            }
        )*
    };
}

impl_from_int!(Int, i64; i8, i16, i32, i64);
impl_from_int!(Uint, u64; u8, u16, u32, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_payload_deserializes_into_natural_variants() {
        let value: MetadataValue =
            serde_json::from_str(r#"[1.0, -3, 18446744073709551615, true, "x"]"#)
                .expect("valid metadata json");

        assert_eq!(
            value,
            MetadataValue::Array(vec![
                MetadataValue::Float(1.0),
                MetadataValue::Int(-3),
                MetadataValue::Uint(u64::MAX),
                MetadataValue::Bool(true),
                MetadataValue::String("x".to_string()),
            ])
        );
    }

    #[test]
    fn integral_floats_have_an_integer_view() {
        assert_eq!(MetadataValue::Float(12.0).as_i128(), Some(12));
        assert_eq!(MetadataValue::Float(12.5).as_i128(), None);
        assert_eq!(MetadataValue::Float(f64::NAN).as_i128(), None);
        assert_eq!(MetadataValue::Uint(7).as_i128(), Some(7));
    }

    #[test]
    fn display_renders_nested_arrays() {
        let value = MetadataValue::from(vec![1.0f64, 0.5]);
        assert_eq!(value.to_string(), "[1, 0.5]");
    }
}
