use kiln_ast::Span;
use crate::token::{Token, TokenKind};

/// The lexer/tokenizer for the Go subset.
///
/// Semicolons are inserted at line ends following the Go rules, so the
/// parser only ever sees explicit statement terminators.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current_pos: usize,
    current_char: Option<char>,
    file_id: usize,
    last_kind: Option<TokenKind>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer from source code.
    pub fn new(source: &'a str) -> Self {
        Self::with_file_id(source, 0)
    }

    /// Creates a new lexer with a specific file ID.
    pub fn with_file_id(source: &'a str, file_id: usize) -> Self {
        let mut chars = source.char_indices();
        let current_char = chars.next().map(|(_, c)| c);
        Self {
            source,
            chars,
            current_pos: 0,
            current_char,
            file_id,
            last_kind: None,
        }
    }

    /// Tokenizes the entire source code and returns all tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Gets the next token from the source.
    pub fn next_token(&mut self) -> Token {
        let token = self.scan();
        self.last_kind = Some(token.kind);
        token
    }

    fn scan(&mut self) -> Token {
        if let Some(token) = self.skip_whitespace_and_comments() {
            return token;
        }

        let start = self.current_pos;

        let ch = match self.current_char {
            Some(ch) => ch,
            None if self.needs_semicolon() => {
                return Token::new(TokenKind::Semicolon, self.span(start), String::new());
            }
            None => return Token::new(TokenKind::Eof, self.span(start), String::new()),
        };

        match ch {
            '"' => self.read_string_literal(),
            '`' => self.read_raw_string_literal(),
            '\'' => self.read_char_literal(),
            '0'..='9' => self.read_number(),
            'a'..='z' | 'A'..='Z' | '_' => self.read_identifier_or_keyword(),

            '+' => {
                self.advance();
                let kind = if self.eat('=') {
                    TokenKind::PlusEq
                } else if self.eat('+') {
                    TokenKind::PlusPlus
                } else {
                    TokenKind::Plus
                };
                self.make(kind, start)
            }
            '-' => {
                self.advance();
                let kind = if self.eat('=') {
                    TokenKind::MinusEq
                } else if self.eat('-') {
                    TokenKind::MinusMinus
                } else {
                    TokenKind::Minus
                };
                self.make(kind, start)
            }
            '*' => self.with_assign(start, TokenKind::Star, TokenKind::StarEq),
            '/' => self.with_assign(start, TokenKind::Slash, TokenKind::SlashEq),
            '%' => self.with_assign(start, TokenKind::Percent, TokenKind::PercentEq),
            '^' => self.with_assign(start, TokenKind::Caret, TokenKind::CaretEq),
            '=' => self.with_assign(start, TokenKind::Eq, TokenKind::EqEq),
            '!' => self.with_assign(start, TokenKind::Bang, TokenKind::BangEq),
            ':' => self.with_assign(start, TokenKind::Colon, TokenKind::ColonEq),
            '&' => {
                self.advance();
                let kind = if self.eat('&') {
                    TokenKind::AmpAmp
                } else if self.eat('^') {
                    if self.eat('=') {
                        TokenKind::AmpCaretEq
                    } else {
                        TokenKind::AmpCaret
                    }
                } else if self.eat('=') {
                    TokenKind::AmpEq
                } else {
                    TokenKind::Amp
                };
                self.make(kind, start)
            }
            '|' => {
                self.advance();
                let kind = if self.eat('|') {
                    TokenKind::PipePipe
                } else if self.eat('=') {
                    TokenKind::PipeEq
                } else {
                    TokenKind::Pipe
                };
                self.make(kind, start)
            }
            '<' => {
                self.advance();
                let kind = if self.eat('<') {
                    if self.eat('=') {
                        TokenKind::LtLtEq
                    } else {
                        TokenKind::LtLt
                    }
                } else if self.eat('=') {
                    TokenKind::LtEq
                } else if self.eat('-') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Lt
                };
                self.make(kind, start)
            }
            '>' => {
                self.advance();
                let kind = if self.eat('>') {
                    if self.eat('=') {
                        TokenKind::GtGtEq
                    } else {
                        TokenKind::GtGt
                    }
                } else if self.eat('=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                };
                self.make(kind, start)
            }
            '.' => self.read_dot(),

            '~' => self.single(start, TokenKind::Tilde),
            '(' => self.single(start, TokenKind::LParen),
            ')' => self.single(start, TokenKind::RParen),
            '{' => self.single(start, TokenKind::LBrace),
            '}' => self.single(start, TokenKind::RBrace),
            '[' => self.single(start, TokenKind::LBracket),
            ']' => self.single(start, TokenKind::RBracket),
            ';' => self.single(start, TokenKind::Semicolon),
            ',' => self.single(start, TokenKind::Comma),

            // Unicode identifiers
            _ if ch.is_alphabetic() => self.read_identifier_or_keyword(),

            _ => {
                self.advance();
                self.error(start, format!("unexpected character: {:?}", ch))
            }
        }
    }

    // Helper methods

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos;
            self.current_char = Some(ch);
        } else {
            self.current_pos = self.source.len();
            self.current_char = None;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.current_char == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn span(&self, start: usize) -> Span {
        Span::new(start, self.current_pos, self.file_id)
    }

    fn make(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, self.span(start), self.source[start..self.current_pos].to_string())
    }

    fn single(&mut self, start: usize, kind: TokenKind) -> Token {
        self.advance();
        self.make(kind, start)
    }

    fn with_assign(&mut self, start: usize, plain: TokenKind, with_eq: TokenKind) -> Token {
        self.advance();
        let kind = if self.eat('=') { with_eq } else { plain };
        self.make(kind, start)
    }

    fn error(&self, start: usize, message: String) -> Token {
        Token::new(TokenKind::Error, self.span(start), message)
    }

    fn needs_semicolon(&self) -> bool {
        self.last_kind.map_or(false, TokenKind::ends_statement)
    }

    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            match self.current_char {
                Some('\n') => {
                    let start = self.current_pos;
                    self.advance();
                    if self.needs_semicolon() {
                        return Some(Token::new(TokenKind::Semicolon, self.span(start), "\n".to_string()));
                    }
                }
                Some(ch) if ch.is_whitespace() => self.advance(),
                Some('/') if self.peek() == Some('/') => {
                    // Stops before the newline so it still terminates the line
                    while let Some(ch) = self.current_char {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek() == Some('*') => {
                    let start = self.current_pos;
                    self.advance();
                    self.advance();
                    let mut saw_newline = false;
                    loop {
                        match self.current_char {
                            None => {
                                return Some(self.error(start, "comment not terminated".to_string()));
                            }
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(ch) => {
                                saw_newline |= ch == '\n';
                                self.advance();
                            }
                        }
                    }
                    if saw_newline && self.needs_semicolon() {
                        return Some(Token::new(TokenKind::Semicolon, self.span(start), "\n".to_string()));
                    }
                }
                _ => return None,
            }
        }
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let start = self.current_pos;
        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let word = &self.source[start..self.current_pos];
        let kind = TokenKind::keyword(word).unwrap_or(TokenKind::Identifier);
        self.make(kind, start)
    }

    fn read_number(&mut self) -> Token {
        let start = self.current_pos;

        if self.current_char == Some('0') && matches!(self.peek(), Some('x' | 'X' | 'b' | 'B' | 'o' | 'O')) {
            self.advance();
            self.advance();
            while let Some(ch) = self.current_char {
                if ch.is_ascii_hexdigit() || ch == '_' {
                    self.advance();
                } else {
                    break;
                }
            }
            return self.make(TokenKind::IntLiteral, start);
        }

        self.skip_decimal_digits();
        let mut kind = TokenKind::IntLiteral;

        if self.current_char == Some('.') && self.peek() != Some('.') {
            kind = TokenKind::FloatLiteral;
            self.advance();
            self.skip_decimal_digits();
        }
        if matches!(self.current_char, Some('e' | 'E')) {
            kind = TokenKind::FloatLiteral;
            self.advance();
            if matches!(self.current_char, Some('+' | '-')) {
                self.advance();
            }
            self.skip_decimal_digits();
        }

        self.make(kind, start)
    }

    fn skip_decimal_digits(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_dot(&mut self) -> Token {
        let start = self.current_pos;
        if matches!(self.peek(), Some('0'..='9')) {
            self.advance();
            self.skip_decimal_digits();
            return self.make(TokenKind::FloatLiteral, start);
        }
        self.advance();
        if self.current_char == Some('.') && self.peek() == Some('.') {
            self.advance();
            self.advance();
            return self.make(TokenKind::Ellipsis, start);
        }
        self.make(TokenKind::Dot, start)
    }

    fn read_string_literal(&mut self) -> Token {
        self.read_quoted('"', TokenKind::StringLiteral, "string literal not terminated")
    }

    fn read_char_literal(&mut self) -> Token {
        self.read_quoted('\'', TokenKind::CharLiteral, "rune literal not terminated")
    }

    fn read_quoted(&mut self, quote: char, kind: TokenKind, unterminated: &str) -> Token {
        let start = self.current_pos;
        self.advance();
        loop {
            match self.current_char {
                None | Some('\n') => return self.error(start, unterminated.to_string()),
                Some('\\') => {
                    self.advance();
                    if self.current_char.is_some() {
                        self.advance();
                    }
                }
                Some(ch) if ch == quote => {
                    self.advance();
                    return self.make(kind, start);
                }
                Some(_) => self.advance(),
            }
        }
    }

    fn read_raw_string_literal(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();
        loop {
            match self.current_char {
                None => return self.error(start, "raw string literal not terminated".to_string()),
                Some('`') => {
                    self.advance();
                    return self.make(TokenKind::StringLiteral, start);
                }
                Some(_) => self.advance(),
            }
        }
    }
}
