//! Helper methods and utilities

use super::*;

impl Parser {
    pub(crate) fn parse_identifier(&mut self) -> ParseResult<Node<Ident>> {
        let token = self.expect(TokenKind::Identifier, "name")?;
        Ok(Node::new(Ident::new(token.value), token.span))
    }

    pub(crate) fn parse_ident_list(&mut self) -> ParseResult<Vec<Node<Ident>>> {
        let mut names = vec![self.parse_identifier()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            names.push(self.parse_identifier()?);
        }
        Ok(names)
    }

    /// Whether the current token can begin a type.
    pub(crate) fn starts_type(&self) -> bool {
        matches!(
            self.current_token().kind,
            TokenKind::Identifier
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Func
                | TokenKind::Struct
                | TokenKind::Interface
                | TokenKind::Arrow
        )
    }

    /// Consumes a `;`. A closing `)` or `}` or the end of input also
    /// terminate a declaration and are left in place.
    pub(crate) fn expect_terminator(&mut self) -> ParseResult<()> {
        match self.current_token().kind {
            TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::RParen | TokenKind::RBrace | TokenKind::Eof => Ok(()),
            _ => Err(self.error(format!(
                "expected ';', found {}",
                self.describe_current()
            ))),
        }
    }

    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous_token(&self) -> &Token {
        &self.tokens[(self.current.saturating_sub(1)).min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous_token()
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && &self.current_token().kind == kind
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.current_token().kind == TokenKind::Eof
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> ParseResult<Token> {
        if self.check(&kind) {
            Ok(self.advance().clone())
        } else {
            Err(self.error(format!("expected {}, found {}", what, self.describe_current())))
        }
    }

    pub(crate) fn describe_current(&self) -> String {
        let token = self.current_token();
        match token.kind {
            TokenKind::Eof => "EOF".to_string(),
            TokenKind::Semicolon if token.value != ";" => "newline".to_string(),
            _ => format!("'{}'", token.value),
        }
    }

    /// Error at the current token; a lexical error token reports its own message.
    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        let token = self.current_token();
        if token.kind == TokenKind::Error {
            return ParseError::new(token.value.clone(), token.span);
        }
        ParseError::new(message, token.span)
    }
}
