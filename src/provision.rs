//! Provisioning glue: compiler subprocess and dynamic-loader invocation.
//!
//! `compile_library` shells out to a native C compiler to produce a shared
//! object in the current working directory; `load_library` hands that
//! artifact to the platform loader. Both are thin wrappers whose failures
//! carry the external tool's diagnostic text verbatim.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use libloading::Library;

use cbridge_core::ProvisionError;

/// Compilers probed, in order, when `$CC` is not set.
const COMPILER_FALLBACKS: [&str; 3] = ["cc", "gcc", "clang"];

/// Path of the compiled artifact for a library name:
/// `./<name>.<platform shared-object extension>`.
pub fn artifact_path(name: &str) -> PathBuf {
    Path::new(".").join(format!("{name}.{}", env::consts::DLL_EXTENSION))
}

fn detect_compiler() -> Result<String, ProvisionError> {
    if let Ok(cc) = env::var("CC")
        && !cc.trim().is_empty()
    {
        return Ok(cc);
    }
    for candidate in COMPILER_FALLBACKS {
        if Command::new(candidate).arg("--version").output().is_ok() {
            return Ok(candidate.to_string());
        }
    }
    Err(ProvisionError::CompilerNotFound)
}

/// Compile `<source_dir>/<name>.c` into a shared object in the current
/// working directory.
///
/// Prefers the compiler named by `$CC`, falling back through `cc`, `gcc`
/// and `clang`. A nonzero compiler exit fails with the compiler's stderr.
pub fn compile_library(name: &str, source_dir: &Path) -> Result<PathBuf, ProvisionError> {
    let compiler = detect_compiler()?;
    let source = source_dir.join(format!("{name}.c"));
    let artifact = artifact_path(name);

    let output = Command::new(&compiler)
        .arg("-shared")
        .arg("-fPIC")
        .arg("-o")
        .arg(&artifact)
        .arg(&source)
        .output()
        .map_err(|e| ProvisionError::CompileFailed {
            library: name.to_string(),
            stderr: format!("failed to run '{compiler}': {e}"),
        })?;

    if !output.status.success() {
        return Err(ProvisionError::CompileFailed {
            library: name.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(artifact)
}

/// Load a previously compiled artifact from the current working directory.
pub fn load_library(name: &str) -> Result<Library, ProvisionError> {
    let path = artifact_path(name);
    if !path.is_file() {
        return Err(ProvisionError::ArtifactNotFound { path });
    }
    unsafe { Library::new(&path) }.map_err(|e| ProvisionError::LoadFailed {
        path,
        message: e.to_string(),
    })
}
