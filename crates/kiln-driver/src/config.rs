//! Build configuration

use std::path::PathBuf;

use crate::BuildError;

/// Work directory used when none is configured
pub const DEFAULT_WORKDIR: &str = "/tmp";

/// Resolved settings for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Root holding the standard library and the two intrinsic packages
    pub std_root: PathBuf,
    /// Root holding external packages (paths whose first segment has a dot)
    pub src_root: PathBuf,
    /// Where the `.s` artifacts are written
    pub workdir: PathBuf,
    /// Forwarded to the code generator
    pub debug_codegen: bool,
}

impl BuildConfig {
    pub fn new(std_root: impl Into<PathBuf>, src_root: impl Into<PathBuf>) -> Self {
        Self {
            std_root: std_root.into(),
            src_root: src_root.into(),
            workdir: PathBuf::from(DEFAULT_WORKDIR),
            debug_codegen: false,
        }
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    pub fn with_debug_codegen(mut self, debug_codegen: bool) -> Self {
        self.debug_codegen = debug_codegen;
        self
    }

    /// Builds a config from optional command-line or environment values.
    pub fn from_options(
        std_root: Option<PathBuf>,
        src_root: Option<PathBuf>,
        workdir: Option<PathBuf>,
    ) -> Result<Self, BuildError> {
        let std_root = std_root.ok_or_else(|| {
            BuildError::Config("standard library root not set (use --std-root or KILN_STD_ROOT)".to_string())
        })?;
        let src_root = src_root.ok_or_else(|| {
            BuildError::Config("source root not set (use --src-root or KILN_SRC_ROOT)".to_string())
        })?;

        let config = Self::new(std_root, src_root);
        Ok(match workdir {
            Some(dir) => config.with_workdir(dir),
            None => config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BuildConfig::new("/std", "/src");
        assert_eq!(config.workdir, PathBuf::from("/tmp"));
        assert!(!config.debug_codegen);
    }

    #[test]
    fn test_missing_roots() {
        let err = BuildConfig::from_options(None, Some("/src".into()), None).unwrap_err();
        assert!(matches!(err, BuildError::Config(msg) if msg.contains("KILN_STD_ROOT")));

        let err = BuildConfig::from_options(Some("/std".into()), None, None).unwrap_err();
        assert!(matches!(err, BuildError::Config(msg) if msg.contains("KILN_SRC_ROOT")));
    }

    #[test]
    fn test_from_options() {
        let config =
            BuildConfig::from_options(Some("/std".into()), Some("/src".into()), Some("/out".into())).unwrap();
        assert_eq!(config.workdir, PathBuf::from("/out"));
        assert_eq!(config.std_root, PathBuf::from("/std"));
    }
}
