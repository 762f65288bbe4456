//! Data value representing a trend total of any column type

use polars::prelude::AnyValue;

/// A total produced by a reduction over a column.
/// This is an alias of the Number type from serde_json, which is an enum that can represent
/// integers and floating point numbers.
/// Integer columns reduce to integers and serialise without a fractional part. Floating point
/// numbers must be finite (not positive or negative infinity or NaN).
pub type DValue = serde_json::Number;

/// Conversion from a primitive numeric type into a [DValue].
// This trait exists because we can't implement From<f64> for DValue because the trait and type
// are in external crates, and because the conversion is fallible for floats.
pub trait IntoDValue {
    /// Convert into a [DValue], or `None` if the value has no JSON representation.
    fn into_dvalue(self) -> Option<DValue>;
}

impl IntoDValue for i64 {
    fn into_dvalue(self) -> Option<DValue> {
        Some(self.into())
    }
}

impl IntoDValue for f64 {
    fn into_dvalue(self) -> Option<DValue> {
        DValue::from_f64(self)
    }
}

impl IntoDValue for AnyValue<'_> {
    /// Convert a numeric value. Nulls and non-numeric values have no [DValue].
    fn into_dvalue(self) -> Option<DValue> {
        match self {
            AnyValue::Int32(value) => i64::from(value).into_dvalue(),
            AnyValue::Int64(value) => value.into_dvalue(),
            AnyValue::UInt32(value) => i64::from(value).into_dvalue(),
            AnyValue::UInt64(value) => Some(value.into()),
            AnyValue::Float32(value) => f64::from(value).into_dvalue(),
            AnyValue::Float64(value) => value.into_dvalue(),
            _ => None,
        }
    }
}
