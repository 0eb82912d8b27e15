//! # Kiln Parser
//!
//! Recursive descent parser for the Go subset accepted by kiln.
//!
//! The parser produces declaration headers, the file-level scope and the
//! list of identifier references that are not bound inside the file.
//! Function bodies are not turned into trees.

use std::collections::HashSet;

use kiln_ast::*;
use kiln_lexer::{Lexer, Token, TokenKind};

// Module declarations
mod error;
mod parser;
mod decl;
mod helpers;
mod refs;

// Re-export public types
pub use error::{ParseError, ParseResult};
pub use parser::{ParseMode, Parser};

/// Tokenizes and parses one source file.
pub fn parse_source(source: &str, file_id: usize, mode: ParseMode) -> ParseResult<File> {
    let tokens = Lexer::with_file_id(source, file_id).tokenize();
    Parser::new(tokens, file_id).parse_file(mode)
}

// =============================================================================
// Tests
// =============================================================================
