//! Dynamic host-side value crossing the boundary.
//!
//! [`CValue`] is what callers hand to a binding and what a binding hands
//! back: integers and floats are widened into their 64-bit host
//! representations, strings are owned host strings on the way in and
//! [`OwnedCStr`] buffers on the way out.

use std::fmt;

use crate::cstr::OwnedCStr;

/// A value held on the host side of the boundary.
///
/// `CValue` does not implement `Clone` because the `CStr` variant owns
/// foreign memory. Use [`clone_if_possible`](CValue::clone_if_possible) for
/// values known not to hold one.
pub enum CValue {
    /// No value.
    Void,
    /// Any integer, stored as `i64` (unsigned 64-bit values round-trip via
    /// bit reinterpretation).
    Int(i64),
    /// Any float, stored as `f64`.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Owned host string, marshaled into a null-terminated buffer when
    /// passed to a `char*` parameter.
    Str(String),
    /// Native-owned string buffer returned across the boundary.
    CStr(OwnedCStr),
    /// Raw pointer, stored as an address.
    Ptr(usize),
    /// Null pointer returned by native code.
    Null,
}

impl CValue {
    /// Human-readable name of this value's runtime type.
    pub fn type_name(&self) -> &'static str {
        match self {
            CValue::Void => "void",
            CValue::Int(_) => "int",
            CValue::Float(_) => "float",
            CValue::Bool(_) => "bool",
            CValue::Str(_) => "string",
            CValue::CStr(_) => "cstring",
            CValue::Ptr(_) => "pointer",
            CValue::Null => "null",
        }
    }

    /// Check if this value is void.
    pub fn is_void(&self) -> bool {
        matches!(self, CValue::Void)
    }

    /// Check if this value is a null pointer.
    pub fn is_null(&self) -> bool {
        matches!(self, CValue::Null)
    }

    /// Clone the value unless it owns foreign memory.
    ///
    /// Returns `None` for `CStr`, whose buffer has exactly one owner.
    pub fn clone_if_possible(&self) -> Option<CValue> {
        match self {
            CValue::Void => Some(CValue::Void),
            CValue::Int(v) => Some(CValue::Int(*v)),
            CValue::Float(v) => Some(CValue::Float(*v)),
            CValue::Bool(v) => Some(CValue::Bool(*v)),
            CValue::Str(s) => Some(CValue::Str(s.clone())),
            CValue::CStr(_) => None,
            CValue::Ptr(p) => Some(CValue::Ptr(*p)),
            CValue::Null => Some(CValue::Null),
        }
    }
}

impl fmt::Debug for CValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CValue::Void => write!(f, "Void"),
            CValue::Int(v) => write!(f, "Int({})", v),
            CValue::Float(v) => write!(f, "Float({})", v),
            CValue::Bool(v) => write!(f, "Bool({})", v),
            CValue::Str(s) => write!(f, "Str({:?})", s),
            CValue::CStr(s) => write!(f, "CStr({:?})", s.to_string_lossy()),
            CValue::Ptr(p) => write!(f, "Ptr({:#x})", p),
            CValue::Null => write!(f, "Null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        assert_eq!(CValue::Void.type_name(), "void");
        assert_eq!(CValue::Int(0).type_name(), "int");
        assert_eq!(CValue::Float(0.0).type_name(), "float");
        assert_eq!(CValue::Bool(false).type_name(), "bool");
        assert_eq!(CValue::Str(String::new()).type_name(), "string");
        assert_eq!(CValue::Ptr(0).type_name(), "pointer");
        assert_eq!(CValue::Null.type_name(), "null");
    }

    #[test]
    fn is_void_and_is_null() {
        assert!(CValue::Void.is_void());
        assert!(!CValue::Int(0).is_void());
        assert!(CValue::Null.is_null());
        assert!(!CValue::Ptr(0).is_null());
    }

    #[test]
    fn clone_if_possible_for_plain_values() {
        assert!(CValue::Int(42).clone_if_possible().is_some());
        assert!(CValue::Str("x".into()).clone_if_possible().is_some());
        assert!(CValue::Null.clone_if_possible().is_some());
    }

    #[test]
    fn debug_formatting() {
        assert_eq!(format!("{:?}", CValue::Int(7)), "Int(7)");
        assert_eq!(format!("{:?}", CValue::Ptr(0x10)), "Ptr(0x10)");
        assert!(format!("{:?}", CValue::Str("hi".into())).contains("hi"));
    }
}
