pub mod token;
pub mod lexer;

// Re-export all public types from modules
pub use token::{Token, TokenKind};
pub use lexer::Lexer;

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_package_clause_gets_semicolon() {
        assert_eq!(
            kinds("package main\n"),
            vec![TokenKind::Package, TokenKind::Identifier, TokenKind::Semicolon, TokenKind::Eof]
        );
    }

    #[test]
    fn test_semicolon_at_eof() {
        assert_eq!(
            kinds("x++"),
            vec![TokenKind::Identifier, TokenKind::PlusPlus, TokenKind::Semicolon, TokenKind::Eof]
        );
    }

    #[test]
    fn test_no_semicolon_after_operator() {
        assert_eq!(
            kinds("a +\nb"),
            vec![
                TokenKind::Identifier,
                TokenKind::Plus,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_import_group() {
        let tokens = Lexer::new("import (\n\t\"fmt\"\n\tstr \"strings\"\n)\n").tokenize();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Import,
                TokenKind::LParen,
                TokenKind::StringLiteral,
                TokenKind::Semicolon,
                TokenKind::Identifier,
                TokenKind::StringLiteral,
                TokenKind::Semicolon,
                TokenKind::RParen,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[2].value, "\"fmt\"");
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("x // trailing\n/* block\n */ y"),
            vec![
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds("/* open"), vec![TokenKind::Error, TokenKind::Eof]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a := b &^ c <- d ... e <<= f"),
            vec![
                TokenKind::Identifier,
                TokenKind::ColonEq,
                TokenKind::Identifier,
                TokenKind::AmpCaret,
                TokenKind::Identifier,
                TokenKind::Arrow,
                TokenKind::Identifier,
                TokenKind::Ellipsis,
                TokenKind::Identifier,
                TokenKind::LtLtEq,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_literals() {
        let tokens = Lexer::new("0x1F 3.5 1e9 'a' '\\n' \"a\\\"b\" `raw\nstring`").tokenize();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::IntLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::CharLiteral,
                TokenKind::CharLiteral,
                TokenKind::StringLiteral,
                TokenKind::StringLiteral,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[6].value, "`raw\nstring`");
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = Lexer::new("\"abc\n").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].value, "string literal not terminated");
    }

    #[test]
    fn test_file_id_in_spans() {
        let tokens = Lexer::with_file_id("var x", 7).tokenize();
        assert!(tokens.iter().all(|t| t.span.file_id == 7));
        assert_eq!((tokens[1].span.start, tokens[1].span.end), (4, 5));
    }
}
