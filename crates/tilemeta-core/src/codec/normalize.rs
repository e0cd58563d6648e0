//! Fixed-point normalization for integer components.
//!
//! Unsigned integers map onto [0, 1] and signed integers onto [-1, 1] by
//! dividing by the type's maximum value. The signed minimum clamps to -1.

use num_traits::{NumCast, PrimInt};

/// Raw integer to its normalized fraction.
#[must_use]
pub fn normalize<T: PrimInt>(raw: T) -> f64 {
    let max = T::max_value().to_f64().unwrap_or(f64::MAX);
    let value = raw.to_f64().unwrap_or(0.0) / max;

    value.max(-1.0)
}

/// Normalized fraction back to the nearest raw integer. Input outside the
/// type's interval is clamped first.
#[must_use]
pub fn unnormalize<T: PrimInt>(value: f64) -> T {
    let floor = if T::min_value() < T::zero() { -1.0 } else { 0.0 };
    let max = T::max_value().to_f64().unwrap_or(f64::MAX);
    let scaled = (value.clamp(floor, 1.0) * max).round();

    // the 64-bit maxima are not exactly representable as f64
    <T as NumCast>::from(scaled).unwrap_or_else(|| {
        if scaled > 0.0 {
            T::max_value()
        } else {
            T::min_value()
        }
    })
}
