//! Semantic analysis errors

use std::fmt;
use kiln_ast::Span;

/// Semantic error kinds
#[derive(Debug, Clone, PartialEq)]
pub enum SemaErrorKind {
    /// Files of one package disagree on the package clause
    PackageNameMismatch {
        expected: String,
        found: String,
    },
    /// A second `func init()` in the package
    DuplicateInit,
    /// `init` declared with parameters, results or without a body
    InvalidInitSignature,
    /// A `main` package without `func main()`
    MissingMain,
    /// Method receiver names a type the package does not declare
    UnknownReceiverType(String),
}

/// Semantic error with location information
#[derive(Debug, Clone, PartialEq)]
pub struct SemaError {
    pub kind: SemaErrorKind,
    pub span: Span,
}

impl SemaError {
    pub fn new(kind: SemaErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl fmt::Display for SemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SemaErrorKind::PackageNameMismatch { expected, found } => {
                write!(f, "found package {}, expected {}", found, expected)
            }
            SemaErrorKind::DuplicateInit => {
                write!(f, "init redeclared in this package")
            }
            SemaErrorKind::InvalidInitSignature => {
                write!(f, "func init must have no arguments and no return values")
            }
            SemaErrorKind::MissingMain => {
                write!(f, "function main is undeclared in the main package")
            }
            SemaErrorKind::UnknownReceiverType(name) => {
                write!(f, "undefined receiver type: {}", name)
            }
        }
    }
}

impl std::error::Error for SemaError {}
