use kiln_ast::Span;

/// Represents the different kinds of tokens in the Go subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,

    // Literals
    IntLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,

    // Identifier
    Identifier,

    // Operators
    Plus,              // +
    Minus,             // -
    Star,              // *
    Slash,             // /
    Percent,           // %
    Amp,               // &
    Pipe,              // |
    Caret,             // ^
    LtLt,              // <<
    GtGt,              // >>
    AmpCaret,          // &^
    PlusEq,            // +=
    MinusEq,           // -=
    StarEq,            // *=
    SlashEq,           // /=
    PercentEq,         // %=
    AmpEq,             // &=
    PipeEq,            // |=
    CaretEq,           // ^=
    LtLtEq,            // <<=
    GtGtEq,            // >>=
    AmpCaretEq,        // &^=
    AmpAmp,            // &&
    PipePipe,          // ||
    Arrow,             // <-
    PlusPlus,          // ++
    MinusMinus,        // --
    EqEq,              // ==
    Lt,                // <
    Gt,                // >
    Eq,                // =
    Bang,              // !
    Tilde,             // ~
    BangEq,            // !=
    LtEq,              // <=
    GtEq,              // >=
    ColonEq,           // :=
    Ellipsis,          // ...

    // Delimiters
    LParen,            // (
    RParen,            // )
    LBrace,            // {
    RBrace,            // }
    LBracket,          // [
    RBracket,          // ]
    Semicolon,         // ; (explicit or inserted at a line end)
    Comma,             // ,
    Dot,               // .
    Colon,             // :

    // Special
    Eof,
    Error,
}

impl TokenKind {
    /// Keyword lookup for an identifier-shaped word.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "break" => TokenKind::Break,
            "case" => TokenKind::Case,
            "chan" => TokenKind::Chan,
            "const" => TokenKind::Const,
            "continue" => TokenKind::Continue,
            "default" => TokenKind::Default,
            "defer" => TokenKind::Defer,
            "else" => TokenKind::Else,
            "fallthrough" => TokenKind::Fallthrough,
            "for" => TokenKind::For,
            "func" => TokenKind::Func,
            "go" => TokenKind::Go,
            "goto" => TokenKind::Goto,
            "if" => TokenKind::If,
            "import" => TokenKind::Import,
            "interface" => TokenKind::Interface,
            "map" => TokenKind::Map,
            "package" => TokenKind::Package,
            "range" => TokenKind::Range,
            "return" => TokenKind::Return,
            "select" => TokenKind::Select,
            "struct" => TokenKind::Struct,
            "switch" => TokenKind::Switch,
            "type" => TokenKind::Type,
            "var" => TokenKind::Var,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether a newline directly after this token ends the statement.
    pub fn ends_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::CharLiteral
                | TokenKind::StringLiteral
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fallthrough
                | TokenKind::Return
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }
}

/// Represents a token with its kind, span, and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Source text; for string literals the raw text including quotes;
    /// for error tokens the error message
    pub value: String,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: Span, value: String) -> Self {
        Self { kind, span, value }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
