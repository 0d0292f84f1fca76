//! The context object owning loaded libraries and configuration.
//!
//! A [`Bridge`] maps library names to loaded handles and drives the whole
//! pipeline: provision a library from source, recover a function's declared
//! shape from that source, translate the shape through the type table and
//! hand back a typed [`FnBinding`]. Registration takes `&mut self`;
//! binding and calling take `&self`, so a populated bridge can be shared
//! across threads.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libc::c_void;
use libloading::Library;
use rustc_hash::FxHashMap;

use cbridge_core::{BindError, BridgeError, BridgeResult, CTypeKind, CValue};

use crate::binding::FnBinding;
use crate::profile::profile;
use crate::{provision, scan};

/// Registry of loaded libraries plus the library-source configuration.
///
/// Handles live for the lifetime of the bridge and are never unloaded;
/// re-registering a name replaces the entry (last writer wins) without
/// invalidating bindings already constructed from the old handle.
pub struct Bridge {
    source_dir: PathBuf,
    libraries: FxHashMap<String, Arc<Library>>,
}

impl Bridge {
    /// Create an empty bridge looking for sources in the current directory.
    pub fn new() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            libraries: FxHashMap::default(),
        }
    }

    /// Set the directory searched for `<library>.c` sources.
    ///
    /// Consulted at compile time and again at every bind, so changing it
    /// mid-run changes where subsequent extractions look.
    pub fn set_source_dir(&mut self, dir: impl Into<PathBuf>) {
        self.source_dir = dir.into();
    }

    /// The configured library source directory.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Compile `<source_dir>/<name>.c` and load the resulting artifact.
    pub fn add_library(&mut self, name: &str) -> BridgeResult<()> {
        provision::compile_library(name, &self.source_dir)?;
        self.load_library(name)
    }

    /// Load an already-compiled artifact for `name` from the current
    /// working directory.
    pub fn load_library(&mut self, name: &str) -> BridgeResult<()> {
        let library = provision::load_library(name)?;
        self.libraries.insert(name.to_string(), Arc::new(library));
        Ok(())
    }

    /// Whether a library is registered under `name`.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.libraries.contains_key(name)
    }

    /// Names of all registered libraries.
    pub fn library_names(&self) -> impl Iterator<Item = &str> {
        self.libraries.keys().map(|s| s.as_str())
    }

    /// Produce a typed binding for `function` in `library`.
    ///
    /// Re-reads the library source and re-resolves the symbol on every
    /// call; bindings are never cached, so repeated binds are idempotent
    /// and always reflect the current source text. Declaration extraction
    /// runs before symbol resolution: a function missing from the source
    /// fails without touching the loader.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn bind(&self, library: &str, function: &str) -> BridgeResult<FnBinding> {
        let handle = self
            .libraries
            .get(library)
            .ok_or_else(|| BindError::LibraryNotFound {
                library: library.to_string(),
            })?;

        let path = self.source_dir.join(format!("{library}.c"));
        let source = fs::read_to_string(&path).map_err(|e| BridgeError::SourceRead {
            path: path.clone(),
            source: e,
        })?;
        let signature = scan::extract(&source, function)?;

        let symbol: *const c_void = unsafe {
            let found: libloading::Symbol<'_, *const c_void> = handle
                .get(function.as_bytes())
                .map_err(|_| BindError::SymbolNotFound {
                    symbol: function.to_string(),
                    library: library.to_string(),
                })?;
            *found
        };

        let params = translate_params(function, &signature.params)?;
        let ret = CTypeKind::resolve(&signature.return_type).ok_or_else(|| {
            BindError::UnsupportedReturnType {
                function: function.to_string(),
                name: signature.return_type.clone(),
            }
        })?;

        Ok(FnBinding::new(
            symbol,
            params,
            ret,
            signature.doc,
            Arc::clone(handle),
        ))
    }

    /// Bind and invoke in one step.
    pub fn call(&self, library: &str, function: &str, args: &[CValue]) -> BridgeResult<CValue> {
        let binding = self.bind(library, function)?;
        binding.invoke(args).map_err(Into::into)
    }

    /// Bind, invoke and measure: returns the result together with the
    /// elapsed wall-clock seconds of the whole operation.
    pub fn profile_call(
        &self,
        library: &str,
        function: &str,
        args: &[CValue],
    ) -> BridgeResult<(CValue, f64)> {
        let (result, elapsed) = profile(|| self.call(library, function, args));
        Ok((result?, elapsed))
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("source_dir", &self.source_dir)
            .field("libraries", &self.libraries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Translate declared parameter names through the type table, failing fast
/// on anything outside the vocabulary. A lone `void` parameter list means
/// zero parameters; `void` in any other position is unsupported.
fn translate_params(function: &str, names: &[String]) -> Result<Vec<CTypeKind>, BindError> {
    if names.len() == 1 && CTypeKind::resolve(&names[0]) == Some(CTypeKind::Void) {
        return Ok(Vec::new());
    }

    let mut params = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        match CTypeKind::resolve(name) {
            Some(CTypeKind::Void) | None => {
                return Err(BindError::UnsupportedParameterType {
                    function: function.to_string(),
                    index,
                    name: name.clone(),
                });
            }
            Some(kind) => params.push(kind),
        }
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_bridge_is_empty() {
        let bridge = Bridge::new();
        assert_eq!(bridge.library_names().count(), 0);
        assert!(!bridge.is_loaded("anything"));
        assert_eq!(bridge.source_dir(), Path::new("."));
    }

    #[test]
    fn set_source_dir_replaces_configuration() {
        let mut bridge = Bridge::new();
        bridge.set_source_dir("/tmp/clibs");
        assert_eq!(bridge.source_dir(), Path::new("/tmp/clibs"));
    }

    #[test]
    fn bind_unknown_library_fails() {
        let bridge = Bridge::new();
        let err = bridge.bind("ghost", "f").unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Bind(BindError::LibraryNotFound { .. })
        ));
    }

    #[test]
    fn translate_params_resolves_in_order() {
        let params =
            translate_params("f", &["int".into(), "double".into(), "char*".into()]).unwrap();
        assert_eq!(
            params,
            vec![CTypeKind::Int32, CTypeKind::Double, CTypeKind::CString]
        );
    }

    #[test]
    fn translate_params_lone_void_is_empty() {
        assert!(translate_params("f", &["void".into()]).unwrap().is_empty());
    }

    #[test]
    fn translate_params_fails_fast_with_position() {
        let err = translate_params("f", &["int".into(), "struct tm".into()]).unwrap_err();
        assert_eq!(
            err,
            BindError::UnsupportedParameterType {
                function: "f".into(),
                index: 1,
                name: "struct tm".into(),
            }
        );
    }

    #[test]
    fn translate_params_rejects_misplaced_void() {
        let err = translate_params("f", &["void".into(), "int".into()]).unwrap_err();
        assert!(matches!(err, BindError::UnsupportedParameterType { index: 0, .. }));
    }
}
