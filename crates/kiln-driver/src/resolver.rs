//! Package directory resolution

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::intrinsic::PackageKind;
use crate::{BuildConfig, BuildError};

/// Template file kept in package directories; never part of a build.
const RESERVED_TEMPLATE: &str = "_.s";

/// A package path resolved to its directory and source files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub path: String,
    pub dir: PathBuf,
    /// `.go` and `.s` files, sorted by name
    pub files: Vec<PathBuf>,
}

/// Maps package paths to directories under the two source roots
#[derive(Debug, Clone)]
pub struct PackageResolver {
    std_root: PathBuf,
    src_root: PathBuf,
}

impl PackageResolver {
    pub fn new(std_root: impl Into<PathBuf>, src_root: impl Into<PathBuf>) -> Self {
        Self {
            std_root: std_root.into(),
            src_root: src_root.into(),
        }
    }

    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(&config.std_root, &config.src_root)
    }

    /// Directory that should hold the package's sources.
    pub fn package_dir(&self, path: &str) -> PathBuf {
        match PackageKind::classify(path) {
            PackageKind::External => self.src_root.join(path),
            PackageKind::Std | PackageKind::Intrinsic(_) => self.std_root.join(path),
        }
    }

    /// Resolve a package path to its directory and file list
    pub fn resolve(&self, path: &str) -> Result<ResolvedPackage, BuildError> {
        let dir = self.package_dir(path);
        if !dir.is_dir() {
            return Err(BuildError::DirectoryNotFound {
                package: path.to_string(),
                dir,
            });
        }

        let files = find_files_in_dir(&dir)?;
        debug!(package = path, dir = %dir.display(), files = files.len(), "resolved package");
        Ok(ResolvedPackage {
            path: path.to_string(),
            dir,
            files,
        })
    }
}

/// Lists the `.go` and `.s` files of a directory, sorted by name.
pub fn find_files_in_dir(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let entries = fs::read_dir(dir).map_err(|e| BuildError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BuildError::io(dir, e))?;
        let path = entry.path();
        let is_source = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, is_source_file_name);
        if is_source && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn is_source_file_name(name: &str) -> bool {
    name != RESERVED_TEMPLATE && (name.ends_with(".go") || name.ends_with(".s"))
}

/// Whether `path` is Go source (as opposed to static assembly).
pub fn is_go_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "go")
}
