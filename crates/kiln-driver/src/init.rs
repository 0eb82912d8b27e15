//! `__INIT__.s` emission

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::intrinsic::Intrinsic;
use crate::pipeline::CompiledPackage;
use crate::BuildError;

pub const INIT_FILE_NAME: &str = "__INIT__.s";

/// Startup routine calling every package's variable initializer and `init`
/// function in build order. The runtime sets up its own variables.
pub fn render_init(packages: &[CompiledPackage]) -> String {
    let mut out = String::new();
    out.push_str(".text\n");
    out.push_str("# Initializes all packages except for runtime\n");
    out.push_str(".global __INIT__.init\n");
    out.push_str("__INIT__.init:\n");

    for pkg in packages {
        if Intrinsic::from_path(&pkg.path) != Some(Intrinsic::Runtime) {
            out.push_str(&format!("  callq {}.__initVars\n", pkg.name));
        }
        if pkg.has_init_func {
            out.push_str(&format!("  callq {}.init\n", pkg.name));
        }
    }

    out.push_str("  ret\n");
    out
}

/// Writes `__INIT__.s` into `workdir` and returns its path.
pub fn emit_init(workdir: &Path, packages: &[CompiledPackage]) -> Result<PathBuf, BuildError> {
    let path = workdir.join(INIT_FILE_NAME);
    fs::write(&path, render_init(packages)).map_err(|e| BuildError::io(&path, e))?;
    debug!(path = %path.display(), packages = packages.len(), "wrote init routine");
    Ok(path)
}
