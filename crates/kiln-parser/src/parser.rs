//! Core Parser struct: package clause and imports

use super::*;

/// How much of a file to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Stop after the import declarations
    ImportsOnly,
    /// Parse every top-level declaration and collect identifier references
    Full,
}

/// Recursive descent parser for one Go source file
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
    pub(crate) file_id: usize,
    pub(crate) scope: Scope,
    pub(crate) unresolved: Vec<IdentRef>,
}

impl Parser {
    /// Creates a new parser from a token stream
    pub fn new(tokens: Vec<Token>, file_id: usize) -> Self {
        Self {
            tokens,
            current: 0,
            file_id,
            scope: Scope::new(),
            unresolved: Vec::new(),
        }
    }

    /// Parses the file up to the point `mode` asks for.
    ///
    /// Stops at the first error.
    pub fn parse_file(mut self, mode: ParseMode) -> ParseResult<File> {
        if mode == ParseMode::Full {
            // Bodies are skimmed rather than parsed, so lexical errors
            // inside them have to be caught up front
            if let Some(bad) = self.tokens.iter().find(|t| t.kind == TokenKind::Error) {
                return Err(ParseError::new(bad.value.clone(), bad.span));
            }
        }

        let package_name = self.parse_package_clause()?;

        let mut imports = Vec::new();
        while self.check(&TokenKind::Import) {
            self.parse_import_decl(&mut imports)?;
        }

        let mut decls = Vec::new();
        if mode == ParseMode::Full {
            while !self.is_at_end() {
                decls.extend(self.parse_top_level_decl()?);
            }
        }

        Ok(File {
            package_name,
            imports,
            decls,
            scope: self.scope,
            unresolved: self.unresolved,
            file_id: self.file_id,
        })
    }

    // =========================================================================
    // Package clause and imports
    // =========================================================================

    fn parse_package_clause(&mut self) -> ParseResult<Node<Ident>> {
        self.expect(TokenKind::Package, "'package'")?;
        let name = self.parse_identifier()?;
        if name.value.is_blank() {
            return Err(ParseError::new("invalid package name _", name.span));
        }
        self.expect_terminator()?;
        Ok(name)
    }

    fn parse_import_decl(&mut self, imports: &mut Vec<ImportSpec>) -> ParseResult<()> {
        self.advance();

        if self.check(&TokenKind::LParen) {
            self.advance();
            while !self.check(&TokenKind::RParen) && !self.is_at_end() {
                imports.push(self.parse_import_spec()?);
                self.expect_terminator()?;
            }
            self.expect(TokenKind::RParen, "')'")?;
        } else {
            imports.push(self.parse_import_spec()?);
        }

        self.expect_terminator()
    }

    fn parse_import_spec(&mut self) -> ParseResult<ImportSpec> {
        let name = match self.current_token().kind {
            TokenKind::Identifier => Some(self.parse_identifier()?),
            TokenKind::Dot => {
                let span = self.advance().span;
                Some(Node::new(Ident::new("."), span))
            }
            _ => None,
        };

        if !self.check(&TokenKind::StringLiteral) {
            return Err(self.error("import path must be a string"));
        }
        let token = self.advance().clone();
        let path = unquote(&token.value);
        if path.is_empty() {
            return Err(ParseError::new("invalid import path: \"\"", token.span));
        }

        Ok(ImportSpec {
            name,
            path: Node::new(path.to_string(), token.span),
        })
    }
}

/// Strips the delimiters of an interpreted or raw string literal.
fn unquote(literal: &str) -> &str {
    literal.get(1..literal.len().saturating_sub(1)).unwrap_or("")
}
