//! Unified error types for the binding pipeline.
//!
//! One enum per phase, all terminal at the point of detection and
//! propagated immediately; the pipeline performs no retries anywhere.
//!
//! ```text
//! BridgeError (top-level wrapper)
//! ├── ScanError      - signature discovery in source text
//! ├── ProvisionError - compiler invocation and artifact loading
//! ├── BindError      - symbol resolution and type translation
//! ├── CallError      - per-invocation marshaling and validation
//! └── SourceRead     - source-text I/O
//! ```
//!
//! Phase-specific enums can be handled directly for fine-grained matching,
//! or converted into [`BridgeError`] through `?`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from signature discovery in raw source text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    /// No declaration of the requested function matched in the source.
    #[error("function '{function}' not found in source")]
    FunctionNotFound { function: String },
}

/// Errors from the provisioning collaborators: the native compiler
/// subprocess and the platform dynamic loader.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Neither `$CC` nor any known compiler name was runnable.
    #[error("no C compiler found (set CC or install cc/gcc/clang)")]
    CompilerNotFound,

    /// The compiler exited nonzero; carries its stderr verbatim.
    #[error("failed to compile library '{library}':\n{stderr}")]
    CompileFailed { library: String, stderr: String },

    /// The expected compiled artifact does not exist.
    #[error("shared object '{}' not found; compile the library first", path.display())]
    ArtifactNotFound { path: PathBuf },

    /// The dynamic loader rejected the artifact; carries its diagnostic.
    #[error("failed to load '{}': {message}", path.display())]
    LoadFailed { path: PathBuf, message: String },
}

/// Errors from resolving a function and translating its declared types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// No library registered under this name.
    #[error("library '{library}' not found")]
    LibraryNotFound { library: String },

    /// The loaded library exports no symbol of this name.
    #[error("symbol '{symbol}' not found in library '{library}'")]
    SymbolNotFound { symbol: String, library: String },

    /// A declared parameter type name is outside the type table's
    /// vocabulary. Surfaced at bind time rather than desynchronizing the
    /// arity at call time.
    #[error("function '{function}': unsupported type '{name}' for parameter {index}")]
    UnsupportedParameterType {
        function: String,
        index: usize,
        name: String,
    },

    /// The declared return type name is outside the vocabulary.
    #[error("function '{function}': unsupported return type '{name}'")]
    UnsupportedReturnType { function: String, name: String },
}

/// Errors from a single invocation of a binding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// The caller supplied a different number of arguments than the
    /// binding declares. Checked before any conversion or foreign call.
    #[error("arity mismatch: function takes {expected} arguments, {supplied} supplied")]
    ArityMismatch { expected: usize, supplied: usize },

    /// A supplied argument could not be converted to its declared native
    /// representation.
    #[error("argument {index}: cannot convert {actual} to declared type {declared}")]
    ArgumentConversion {
        index: usize,
        declared: &'static str,
        actual: &'static str,
    },

    /// The returned value matched neither the declared descriptor nor its
    /// host-native fallback representation.
    #[error("return type mismatch: declared {declared}, got {actual}")]
    ReturnTypeMismatch {
        declared: &'static str,
        actual: &'static str,
    },
}

/// Errors from converting between Rust primitives and dynamic values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Type mismatch during conversion.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Integer overflow during narrowing.
    #[error("integer overflow: value {value} does not fit in {target_type}")]
    IntegerOverflow { value: i64, target_type: &'static str },

    /// Float value not representable in the target width.
    #[error("float conversion error: value {value} cannot be represented as {target_type}")]
    FloatConversion {
        value: f64,
        target_type: &'static str,
    },
}

/// Top-level error for the whole pipeline.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Call(#[from] CallError),

    /// Reading a library's source text failed.
    #[error("failed to read source file '{}': {source}", path.display())]
    SourceRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias for pipeline results.
pub type BridgeResult<T> = Result<T, BridgeError>;
