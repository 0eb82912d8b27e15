//! Build errors

use std::path::{Path, PathBuf};

use kiln_ast::Span;
use kiln_codegen::CodegenError;
use kiln_parser::ParseError;
use kiln_sema::SemaError;
use thiserror::Error;

/// Everything that can abort a build. The first error stops the run.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("cannot find package \"{package}\" in {}", .dir.display())]
    DirectoryNotFound { package: String, dir: PathBuf },

    #[error("import cycle not allowed: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error(
        "{name} redeclared in package {package}: first declared in {}, again in {}",
        .first.display(),
        .second.display()
    )]
    DuplicateDeclaration {
        package: String,
        name: String,
        first: PathBuf,
        second: PathBuf,
        /// Site of the second declaration
        span: Span,
    },

    #[error("{}: {source}", .path.display())]
    Semantic {
        package: String,
        path: PathBuf,
        #[source]
        source: SemaError,
    },

    #[error("code generation failed for package {package}: {source}")]
    Codegen {
        package: String,
        #[source]
        source: CodegenError,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Config(String),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }

    /// Source file and span the error points at, when it has one.
    pub fn location(&self) -> Option<(&Path, Span)> {
        match self {
            BuildError::Parse { path, source } => Some((path.as_path(), source.span)),
            BuildError::Semantic { path, source, .. } => Some((path.as_path(), source.span)),
            BuildError::DuplicateDeclaration { second, span, .. } => Some((second.as_path(), *span)),
            _ => None,
        }
    }

    /// Short diagnostic code used in rendered reports.
    pub fn code(&self) -> &'static str {
        match self {
            BuildError::Parse { .. } => "E0001",
            BuildError::DirectoryNotFound { .. } => "E0002",
            BuildError::CyclicDependency { .. } => "E0003",
            BuildError::DuplicateDeclaration { .. } => "E0004",
            BuildError::Semantic { .. } => "E0005",
            BuildError::Codegen { .. } => "E0006",
            BuildError::Io { .. } => "E0007",
            BuildError::Config(_) => "E0008",
        }
    }
}
