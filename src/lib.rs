//! cbridge compiles small C source libraries on demand and calls their
//! exported functions through typed proxies, without hand-written binding
//! code.
//!
//! The pipeline: raw source text goes through the [`scan`] module to
//! recover a function's declared shape and doc comment; declared type
//! names are translated through the type table into scalar descriptors;
//! the [`Bridge`](bridge::Bridge) resolves the exported symbol and hands
//! back a [`FnBinding`](binding::FnBinding) that validates and converts
//! every argument and return value at call time.
//!
//! ```no_run
//! use cbridge::prelude::*;
//!
//! # fn main() -> Result<(), BridgeError> {
//! let mut bridge = Bridge::new();
//! bridge.set_source_dir("lib");
//! bridge.add_library("mathlib")?;
//!
//! let add = bridge.bind("mathlib", "add")?;
//! let sum: i32 = add.invoke_as(&[CValue::Int(2), CValue::Int(40)])?;
//! assert_eq!(sum, 42);
//! # Ok(())
//! # }
//! ```

pub mod binding;
pub mod bridge;
mod marshal;
pub mod profile;
pub mod provision;
pub mod scan;

pub use cbridge_core::{
    BindError, BridgeError, BridgeResult, CTypeKind, CValue, CallError, ConversionError,
    FromValue, IntoValue, OwnedCStr, ProvisionError, ScanError,
};

pub mod prelude {
    pub use crate::binding::FnBinding;
    pub use crate::bridge::Bridge;
    pub use crate::profile::profile;
    pub use crate::scan::{Signature, extract};
    pub use cbridge_core::{
        BindError, BridgeError, BridgeResult, CTypeKind, CValue, CallError, FromValue,
        IntoValue, OwnedCStr, ProvisionError, ScanError,
    };
}
