//! Core types for cbridge: scalar type descriptors, the dynamic host
//! value, conversion traits, the owned C-string buffer and the error
//! hierarchy.
//!
//! This crate is deliberately small and dependency-light; everything that
//! touches a compiler, a loader or a foreign call lives in the `cbridge`
//! crate on top of it.

pub mod convert;
pub mod cstr;
pub mod ctype;
pub mod error;
pub mod value;

pub use convert::{FromValue, IntoValue};
pub use cstr::OwnedCStr;
pub use ctype::CTypeKind;
pub use error::{
    BindError, BridgeError, BridgeResult, CallError, ConversionError, ProvisionError, ScanError,
};
pub use value::CValue;
