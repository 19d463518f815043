use super::*;
use std::path::PathBuf;

fn source(text: &str) -> SourceFile {
    SourceFile::new(PathBuf::from("codes.go"), text.to_string())
}

fn lex(text: &str) -> Vec<TokenKind> {
    let source_file = source(text);
    let mut lexer = Lexer::new(&source_file);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::Eof {
            break;
        }
        tokens.push(token.kind);
    }

    tokens
}

fn groups(text: &str) -> Vec<Vec<String>> {
    let source_file = source(text);
    let mut lexer = Lexer::new(&source_file);
    while lexer.next_token().kind != TokenKind::Eof {}
    lexer
        .take_comment_groups()
        .into_iter()
        .map(|group| group.comments.into_iter().map(|c| c.text).collect())
        .collect()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Ident(name.to_string())
}

#[test]
fn test_keywords() {
    assert_eq!(
        lex("package const iota func"),
        vec![
            TokenKind::Package,
            TokenKind::Const,
            ident("iota"),
            TokenKind::Func,
        ]
    );
}

#[test]
fn test_literals() {
    assert_eq!(
        lex(r#"404 0x1F 0o17 0b101 1_000 1.5 2i 'a' "not found" `raw`"#),
        vec![
            TokenKind::IntLit("404".to_string()),
            TokenKind::IntLit("0x1F".to_string()),
            TokenKind::IntLit("0o17".to_string()),
            TokenKind::IntLit("0b101".to_string()),
            TokenKind::IntLit("1_000".to_string()),
            TokenKind::FloatLit("1.5".to_string()),
            TokenKind::ImagLit("2i".to_string()),
            TokenKind::CharLit("'a'".to_string()),
            TokenKind::StringLit("\"not found\"".to_string()),
            TokenKind::StringLit("`raw`".to_string()),
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_escaped_string_literal() {
    assert_eq!(
        lex(r#""say \"hi\"""#),
        vec![
            TokenKind::StringLit(r#""say \"hi\"""#.to_string()),
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_identifiers() {
    assert_eq!(
        lex("ErrCodeNotFound _ x1"),
        vec![
            ident("ErrCodeNotFound"),
            ident("_"),
            ident("x1"),
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_operators() {
    assert_eq!(
        lex("<< &^ &^= := ... <- ++"),
        vec![
            TokenKind::Shl,
            TokenKind::AndNot,
            TokenKind::AndNotEq,
            TokenKind::Define,
            TokenKind::Ellipsis,
            TokenKind::Arrow,
            TokenKind::Inc,
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_semicolon_insertion() {
    assert_eq!(
        lex("const X = 1\nconst (\n\tY\n)\n"),
        vec![
            TokenKind::Const,
            ident("X"),
            TokenKind::Eq,
            TokenKind::IntLit("1".to_string()),
            TokenKind::Semicolon,
            TokenKind::Const,
            TokenKind::LParen,
            ident("Y"),
            TokenKind::Semicolon,
            TokenKind::RParen,
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_no_semicolon_after_operator() {
    assert_eq!(
        lex("x = 1 +\n2"),
        vec![
            ident("x"),
            TokenKind::Eq,
            TokenKind::IntLit("1".to_string()),
            TokenKind::Plus,
            TokenKind::IntLit("2".to_string()),
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_implicit_semicolon_is_zero_width() {
    let source_file = source("return\n");
    let mut lexer = Lexer::new(&source_file);

    assert_eq!(lexer.next_token().kind, TokenKind::Return);
    let semicolon = lexer.next_token();
    assert!(semicolon.is_implicit_semicolon());
    assert_eq!(semicolon.describe(), "newline");
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        lex("x // trailing\n/* block */ y"),
        vec![ident("x"), TokenKind::Semicolon, ident("y"), TokenKind::Semicolon]
    );
}

#[test]
fn test_multiline_block_comment_ends_statement() {
    assert_eq!(
        lex("x /* a\nb */ y"),
        vec![ident("x"), TokenKind::Semicolon, ident("y"), TokenKind::Semicolon]
    );
}

#[test]
fn test_adjacent_comments_form_one_group() {
    let text = "// first\n// second\n\n// third\nconst X = 1\n";
    assert_eq!(
        groups(text),
        vec![
            vec!["// first".to_string(), "// second".to_string()],
            vec!["// third".to_string()],
        ]
    );
}

#[test]
fn test_trailing_comment_starts_own_group() {
    let text = "const X = 1 // trailing\n// doc for Y\nconst Y = 2\n";
    assert_eq!(
        groups(text),
        vec![
            vec!["// trailing".to_string()],
            vec!["// doc for Y".to_string()],
        ]
    );
}

#[test]
fn test_token_between_comments_splits_group() {
    let text = "/* a */ x /* b */";
    assert_eq!(groups(text).len(), 2);
}

#[test]
fn test_unterminated_comment_is_reported() {
    let source_file = source("x /* never closed");
    let mut lexer = Lexer::new(&source_file);
    while lexer.next_token().kind != TokenKind::Eof {}

    let errors = lexer.take_errors();
    assert!(errors.has_errors());
    assert_eq!(errors.diagnostics()[0].code, syntax::UNTERMINATED_COMMENT);
}

#[test]
fn test_invalid_character_is_reported() {
    let source_file = source("x := 1 $");
    let mut lexer = Lexer::new(&source_file);
    while lexer.next_token().kind != TokenKind::Eof {}

    let errors = lexer.take_errors();
    assert_eq!(errors.error_count(), 1);
    assert_eq!(errors.diagnostics()[0].code, syntax::INVALID_CHARACTER);
}
