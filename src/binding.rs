//! Typed callable proxies for foreign functions.
//!
//! A [`FnBinding`] carries the resolved symbol, the ordered parameter
//! descriptors, the return descriptor and the documentation recovered from
//! source text. It is immutable once constructed; every invocation
//! validates arity and converts arguments against the declared shape.

use std::sync::Arc;

use libc::c_void;
use libloading::Library;

use cbridge_core::{CTypeKind, CValue, CallError, FromValue};

use crate::marshal;

/// A resolved, type-annotated callable proxy for one foreign function.
pub struct FnBinding {
    symbol: *const c_void,
    params: Vec<CTypeKind>,
    ret: CTypeKind,
    doc: Option<String>,
    /// Keeps the mapped library alive for as long as the binding exists.
    _library: Arc<Library>,
}

// The symbol address and descriptors are immutable after construction;
// reentrancy of the foreign code itself is the caller's responsibility.
unsafe impl Send for FnBinding {}
unsafe impl Sync for FnBinding {}

impl FnBinding {
    pub(crate) fn new(
        symbol: *const c_void,
        params: Vec<CTypeKind>,
        ret: CTypeKind,
        doc: Option<String>,
        library: Arc<Library>,
    ) -> Self {
        Self {
            symbol,
            params,
            ret,
            doc,
            _library: library,
        }
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Ordered parameter descriptors.
    pub fn param_types(&self) -> &[CTypeKind] {
        &self.params
    }

    /// Return descriptor (`Void` for no value).
    pub fn return_type(&self) -> CTypeKind {
        self.ret
    }

    /// Documentation comment recovered from the source, if any.
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Invoke the foreign function.
    ///
    /// Arity is checked before any conversion or foreign call; each
    /// argument is then converted to its declared native representation in
    /// parameter order. The call blocks until the native code returns.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn invoke(&self, args: &[CValue]) -> Result<CValue, CallError> {
        marshal::call(self.symbol, &self.params, self.ret, args)
    }

    /// Invoke and extract the return value as `T`.
    ///
    /// Beyond the declared descriptor, the extraction accepts the
    /// host-native representation underlying it: any sized-integer
    /// descriptor satisfies an integer `T`, either float width satisfies a
    /// float `T`. When even that fails the error names both sides.
    pub fn invoke_as<T: FromValue>(&self, args: &[CValue]) -> Result<T, CallError> {
        let value = self.invoke(args)?;
        T::from_value(&value).map_err(|_| CallError::ReturnTypeMismatch {
            declared: self.ret.name(),
            actual: value.type_name(),
        })
    }
}

impl std::fmt::Debug for FnBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnBinding")
            .field("params", &self.params)
            .field("ret", &self.ret)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}
