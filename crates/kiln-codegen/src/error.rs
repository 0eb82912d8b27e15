//! Error types for code generation

use std::fmt;

use kiln_ast::Span;

/// Error type for code generation failures
#[derive(Debug, Clone)]
pub struct CodegenError {
    pub message: String,
    pub span: Option<Span>,
}

impl CodegenError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            span: None,
        }
    }

    pub fn at(msg: impl Into<String>, span: Span) -> Self {
        Self {
            message: msg.into(),
            span: Some(span),
        }
    }
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CodegenError {}

impl From<fmt::Error> for CodegenError {
    fn from(_: fmt::Error) -> Self {
        Self::new("failed to format assembly output")
    }
}
