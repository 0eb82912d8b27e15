//! # Kiln AST
//!
//! Syntax tree definitions for the Kiln compiler.
//! Only the top-level shape of a Go source file is modelled: the package
//! clause, imports, top-level declarations, the file scope and the list of
//! identifier references the parser could not resolve locally.

use std::fmt;

// =============================================================================
// Core Types (kept in lib.rs - used by all modules)
// =============================================================================

/// Source location information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub file_id: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, file_id: usize) -> Self {
        Self { start, end, file_id }
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            file_id: self.file_id,
        }
    }
}

/// AST node wrapper that includes span information
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub span: Span,
    pub value: T,
}

impl<T> Node<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { span, value }
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The blank identifier `_` never introduces a binding.
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// =============================================================================
// Module Declarations
// =============================================================================

pub mod decl;
pub mod file_set;
pub mod scope;

pub use decl::*;
pub use file_set::{FileSet, Position, SourceFile};
pub use scope::{ObjKind, Object, Scope};

// =============================================================================
// Tests
// =============================================================================
