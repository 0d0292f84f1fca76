//! Conversion traits between Rust primitives and [`CValue`].
//!
//! - [`FromValue`]: extract a Rust value from a [`CValue`]
//! - [`IntoValue`]: convert a Rust value into a [`CValue`]
//!
//! Narrowing integer conversions are bounds-checked; `u64` round-trips the
//! full range through bit reinterpretation of the `i64` storage. Both float
//! widths accept an integer value by widening, which is what lets a call
//! site pass `4` where `double` is declared.

use crate::error::ConversionError;
use crate::value::CValue;

/// Extract a value from a [`CValue`].
pub trait FromValue: Sized {
    /// Extract a value, or report why the runtime type is incompatible.
    fn from_value(value: &CValue) -> Result<Self, ConversionError>;
}

/// Convert a value into a [`CValue`].
pub trait IntoValue {
    /// Convert this value into a [`CValue`].
    fn into_value(self) -> CValue;
}

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &CValue) -> Result<Self, ConversionError> {
                    match value {
                        CValue::Int(v) => {
                            if *v >= Self::MIN as i64 && *v <= Self::MAX as i64 {
                                Ok(*v as Self)
                            } else {
                                Err(ConversionError::IntegerOverflow {
                                    value: *v,
                                    target_type: stringify!($ty),
                                })
                            }
                        }
                        _ => Err(ConversionError::TypeMismatch {
                            expected: "int",
                            actual: value.type_name(),
                        }),
                    }
                }
            }

            impl IntoValue for $ty {
                fn into_value(self) -> CValue {
                    CValue::Int(self as i64)
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, isize);

macro_rules! impl_from_value_uint {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &CValue) -> Result<Self, ConversionError> {
                    match value {
                        CValue::Int(v) => {
                            if *v >= 0 && *v as u64 <= Self::MAX as u64 {
                                Ok(*v as Self)
                            } else {
                                Err(ConversionError::IntegerOverflow {
                                    value: *v,
                                    target_type: stringify!($ty),
                                })
                            }
                        }
                        _ => Err(ConversionError::TypeMismatch {
                            expected: "int",
                            actual: value.type_name(),
                        }),
                    }
                }
            }

            impl IntoValue for $ty {
                fn into_value(self) -> CValue {
                    CValue::Int(self as i64)
                }
            }
        )*
    };
}

impl_from_value_uint!(u8, u16, u32, usize);

// u64 reinterprets the i64 bit pattern, preserving the full range.
impl FromValue for u64 {
    fn from_value(value: &CValue) -> Result<Self, ConversionError> {
        match value {
            CValue::Int(v) => Ok(*v as u64),
            _ => Err(ConversionError::TypeMismatch {
                expected: "int",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for u64 {
    fn into_value(self) -> CValue {
        CValue::Int(self as i64)
    }
}

impl FromValue for f32 {
    fn from_value(value: &CValue) -> Result<Self, ConversionError> {
        match value {
            CValue::Float(v) => {
                if v.is_finite() && (*v > f32::MAX as f64 || *v < f32::MIN as f64) {
                    Err(ConversionError::FloatConversion {
                        value: *v,
                        target_type: "f32",
                    })
                } else {
                    Ok(*v as f32)
                }
            }
            CValue::Int(v) => Ok(*v as f32),
            _ => Err(ConversionError::TypeMismatch {
                expected: "float",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> CValue {
        CValue::Float(self as f64)
    }
}

impl FromValue for f64 {
    fn from_value(value: &CValue) -> Result<Self, ConversionError> {
        match value {
            CValue::Float(v) => Ok(*v),
            CValue::Int(v) => Ok(*v as f64),
            _ => Err(ConversionError::TypeMismatch {
                expected: "float",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> CValue {
        CValue::Float(self)
    }
}

impl FromValue for bool {
    fn from_value(value: &CValue) -> Result<Self, ConversionError> {
        match value {
            CValue::Bool(v) => Ok(*v),
            _ => Err(ConversionError::TypeMismatch {
                expected: "bool",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> CValue {
        CValue::Bool(self)
    }
}

impl FromValue for () {
    fn from_value(value: &CValue) -> Result<Self, ConversionError> {
        match value {
            CValue::Void => Ok(()),
            _ => Err(ConversionError::TypeMismatch {
                expected: "void",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for () {
    fn into_value(self) -> CValue {
        CValue::Void
    }
}

// Host strings convert from `Str` only; a `CStr` buffer has explicit
// ownership and must be consumed through `OwnedCStr` directly.
impl FromValue for String {
    fn from_value(value: &CValue) -> Result<Self, ConversionError> {
        match value {
            CValue::Str(s) => Ok(s.clone()),
            _ => Err(ConversionError::TypeMismatch {
                expected: "string",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> CValue {
        CValue::Str(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> CValue {
        CValue::Str(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_value_i8_bounds() {
        assert_eq!(i8::from_value(&CValue::Int(127)).unwrap(), 127i8);
        assert_eq!(i8::from_value(&CValue::Int(-128)).unwrap(), -128i8);
        assert!(i8::from_value(&CValue::Int(128)).is_err());
        assert!(i8::from_value(&CValue::Bool(true)).is_err());
    }

    #[test]
    fn from_value_u8_rejects_negative() {
        assert_eq!(u8::from_value(&CValue::Int(255)).unwrap(), 255u8);
        assert!(u8::from_value(&CValue::Int(-1)).is_err());
        assert!(u8::from_value(&CValue::Int(256)).is_err());
    }

    #[test]
    fn from_value_u64_reinterprets_bits() {
        assert_eq!(u64::from_value(&CValue::Int(-1)).unwrap(), u64::MAX);
        assert_eq!(u64::from_value(&CValue::Int(0)).unwrap(), 0);
    }

    #[test]
    fn from_value_floats_accept_int() {
        assert_eq!(f64::from_value(&CValue::Int(4)).unwrap(), 4.0);
        assert_eq!(f32::from_value(&CValue::Int(4)).unwrap(), 4.0f32);
        assert_eq!(f64::from_value(&CValue::Float(2.5)).unwrap(), 2.5);
        assert!(f64::from_value(&CValue::Str("x".into())).is_err());
    }

    #[test]
    fn from_value_f32_range() {
        assert!(f32::from_value(&CValue::Float(1e300)).is_err());
        assert!(
            f32::from_value(&CValue::Float(f64::INFINITY))
                .unwrap()
                .is_infinite()
        );
    }

    #[test]
    fn from_value_bool_and_unit() {
        assert!(bool::from_value(&CValue::Bool(true)).unwrap());
        assert!(bool::from_value(&CValue::Int(1)).is_err());
        <()>::from_value(&CValue::Void).unwrap();
        assert!(<()>::from_value(&CValue::Int(0)).is_err());
    }

    #[test]
    fn from_value_string() {
        assert_eq!(
            String::from_value(&CValue::Str("hi".into())).unwrap(),
            "hi"
        );
        assert!(String::from_value(&CValue::Int(0)).is_err());
    }

    #[test]
    fn into_value_round_trips() {
        let v = 42i32.into_value();
        assert_eq!(i32::from_value(&v).unwrap(), 42);

        let v = u64::MAX.into_value();
        assert_eq!(u64::from_value(&v).unwrap(), u64::MAX);

        let v = 3.5f64.into_value();
        assert_eq!(f64::from_value(&v).unwrap(), 3.5);

        let v = "s".into_value();
        assert_eq!(String::from_value(&v).unwrap(), "s");
    }
}
