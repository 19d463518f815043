//! Lexer for Go source files
//!
//! Wraps a `logos` tokenizer with the two pieces of Go lexical grammar a
//! plain tokenizer cannot express: automatic semicolon insertion at line
//! ends, and collection of comments into comment groups.

use crate::diagnostics::{error_codes::syntax, Diagnostic, DiagnosticBag, Span};
use crate::parser::ast::{Comment, CommentGroup, NodeId};
use crate::parser::span::SourceFile;
use logos::Logos;

fn block_comment(lex: &mut logos::Lexer<TokenKind>) -> Option<String> {
    let end = lex.remainder().find("*/")?;
    lex.bump(end + 2);
    Some(lex.slice().to_string())
}

/// Token types for Go
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenKind {
    // Keywords
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("chan")]
    Chan,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("default")]
    Default,
    #[token("defer")]
    Defer,
    #[token("else")]
    Else,
    #[token("fallthrough")]
    Fallthrough,
    #[token("for")]
    For,
    #[token("func")]
    Func,
    #[token("go")]
    Go,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("import")]
    Import,
    #[token("interface")]
    Interface,
    #[token("map")]
    Map,
    #[token("package")]
    Package,
    #[token("range")]
    Range,
    #[token("return")]
    Return,
    #[token("select")]
    Select,
    #[token("struct")]
    Struct,
    #[token("switch")]
    Switch,
    #[token("type")]
    Type,
    #[token("var")]
    Var,

    // Literals, kept as raw source text
    #[regex(r"[0-9][0-9_]*", |lex| lex.slice().to_string())]
    #[regex(r"0[xX][0-9a-fA-F_]+", |lex| lex.slice().to_string())]
    #[regex(r"0[oO][0-7_]+", |lex| lex.slice().to_string())]
    #[regex(r"0[bB][01_]+", |lex| lex.slice().to_string())]
    IntLit(String),

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?", |lex| lex.slice().to_string())]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?", |lex| lex.slice().to_string())]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+", |lex| lex.slice().to_string())]
    FloatLit(String),

    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?i", |lex| lex.slice().to_string())]
    ImagLit(String),

    #[regex(r"'([^'\\\n]|\\.)+'", |lex| lex.slice().to_string())]
    CharLit(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice().to_string())]
    #[regex(r"`[^`]*`", |lex| lex.slice().to_string())]
    StringLit(String),

    // Identifiers
    #[regex(r"[\p{L}_][\p{L}\p{N}_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("&^")]
    AndNot,

    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,
    #[token("&^=")]
    AndNotEq,

    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("<-")]
    Arrow,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,

    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("=")]
    Eq,
    #[token(":=")]
    Define,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,

    // Comments and line breaks never reach the parser
    #[regex(r"//[^\n]*", |lex| lex.slice().to_string())]
    LineComment(String),

    #[token("/*", block_comment)]
    BlockComment(String),

    #[token("\n")]
    Newline,

    // End of file
    Eof,
}

impl TokenKind {
    /// Whether a line break after this token ends the statement
    fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::IntLit(_)
                | TokenKind::FloatLit(_)
                | TokenKind::ImagLit(_)
                | TokenKind::CharLit(_)
                | TokenKind::StringLit(_)
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fallthrough
                | TokenKind::Return
                | TokenKind::Inc
                | TokenKind::Dec
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }

    /// Short description for error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("name {}", name),
            TokenKind::IntLit(lit)
            | TokenKind::FloatLit(lit)
            | TokenKind::ImagLit(lit)
            | TokenKind::CharLit(lit)
            | TokenKind::StringLit(lit) => format!("literal {}", lit),
            TokenKind::Eof => "EOF".to_string(),
            other => match other.symbol() {
                Some(symbol) => format!("'{}'", symbol),
                None => format!("{:?}", other).to_lowercase(),
            },
        }
    }

    fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::AndNot => "&^",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Arrow => "<-",
            TokenKind::Inc => "++",
            TokenKind::Dec => "--",
            TokenKind::EqEq => "==",
            TokenKind::BangEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Eq => "=",
            TokenKind::Define => ":=",
            TokenKind::Bang => "!",
            TokenKind::Tilde => "~",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::Ellipsis => "...",
            _ => return None,
        };
        Some(symbol)
    }
}

/// A token with its span
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Semicolons inserted at a line break have no width
    pub fn is_implicit_semicolon(&self) -> bool {
        self.kind == TokenKind::Semicolon && self.span.start == self.span.end
    }

    /// Description used in "expected X, found Y" messages
    pub fn describe(&self) -> String {
        if self.is_implicit_semicolon() {
            "newline".to_string()
        } else {
            self.kind.describe()
        }
    }
}

/// A comment as seen by the lexer, before grouping
#[derive(Debug, Clone)]
struct RawComment {
    text: String,
    span: Span,
    /// Number of tokens handed out before this comment
    tokens_before: usize,
    /// Start line of the last token handed out before this comment
    prev_token_line: Option<usize>,
}

/// Lexer for Go source code
pub struct Lexer<'a> {
    source: &'a SourceFile,
    logos_lexer: logos::Lexer<'a, TokenKind>,
    insert_semicolon: bool,
    at_eof: bool,
    tokens_emitted: usize,
    last_token_line: Option<usize>,
    comments: Vec<RawComment>,
    errors: DiagnosticBag,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source file
    pub fn new(source: &'a SourceFile) -> Self {
        Self {
            source,
            logos_lexer: TokenKind::lexer(source.content()),
            insert_semicolon: false,
            at_eof: false,
            tokens_emitted: 0,
            last_token_line: None,
            comments: Vec::new(),
            errors: DiagnosticBag::new(),
        }
    }

    /// Get the next token, inserting semicolons where Go requires them
    pub fn next_token(&mut self) -> Token {
        loop {
            if self.at_eof {
                let end = self.source.content().len();
                return Token::new(TokenKind::Eof, self.source.point(end));
            }

            match self.logos_lexer.next() {
                Some(Ok(TokenKind::Newline)) => {
                    if self.insert_semicolon {
                        let at = self.logos_lexer.span().start;
                        return self.emit(TokenKind::Semicolon, at, at);
                    }
                }
                Some(Ok(TokenKind::LineComment(text))) => {
                    let range = self.logos_lexer.span();
                    self.record_comment(text, range.start, range.end);
                }
                Some(Ok(TokenKind::BlockComment(text))) => {
                    let range = self.logos_lexer.span();
                    if self.insert_semicolon && text.contains('\n') {
                        let semicolon = self.emit(TokenKind::Semicolon, range.start, range.start);
                        self.record_comment(text, range.start, range.end);
                        return semicolon;
                    }
                    self.record_comment(text, range.start, range.end);
                }
                Some(Ok(kind)) => {
                    let range = self.logos_lexer.span();
                    return self.emit(kind, range.start, range.end);
                }
                Some(Err(())) => {
                    let range = self.logos_lexer.span();
                    let slice = self.logos_lexer.slice();
                    let (code, message) = if slice.starts_with("/*") {
                        (syntax::UNTERMINATED_COMMENT, "comment not terminated".to_string())
                    } else {
                        (
                            syntax::INVALID_CHARACTER,
                            format!("invalid character {:?}", slice),
                        )
                    };
                    self.errors.push(
                        Diagnostic::error(code)
                            .message(message)
                            .span(self.source.span(range.start, range.end))
                            .build(),
                    );
                }
                None => {
                    self.at_eof = true;
                    if self.insert_semicolon {
                        let end = self.source.content().len();
                        return self.emit(TokenKind::Semicolon, end, end);
                    }
                }
            }
        }
    }

    fn emit(&mut self, kind: TokenKind, start: usize, end: usize) -> Token {
        let span = self.source.span(start, end);
        self.insert_semicolon = kind.ends_statement();
        self.tokens_emitted += 1;
        self.last_token_line = Some(span.start_line);
        Token::new(kind, span)
    }

    fn record_comment(&mut self, text: String, start: usize, end: usize) {
        self.comments.push(RawComment {
            text,
            span: self.source.span(start, end),
            tokens_before: self.tokens_emitted,
            prev_token_line: self.last_token_line,
        });
    }

    /// Lexical errors seen so far
    pub fn take_errors(&mut self) -> DiagnosticBag {
        std::mem::take(&mut self.errors)
    }

    /// Group the comments seen so far.
    ///
    /// Comments belong to the same group when no token separates them and
    /// each starts at most one line after the previous one ends. A group
    /// that starts on the line of the preceding token only admits further
    /// comments on that same line.
    pub fn take_comment_groups(&mut self) -> Vec<CommentGroup> {
        let raw = std::mem::take(&mut self.comments);
        let mut groups = Vec::new();
        let mut iter = raw.into_iter().peekable();

        while let Some(first) = iter.next() {
            let max_gap = if first.prev_token_line == Some(first.span.start_line) {
                0
            } else {
                1
            };
            let tokens_before = first.tokens_before;
            let mut end_line = first.span.end_line;
            let mut span = first.span.clone();
            let mut comments = vec![Comment {
                text: first.text,
                span: first.span,
            }];

            while let Some(next) = iter.peek() {
                if next.tokens_before != tokens_before || next.span.start_line > end_line + max_gap
                {
                    break;
                }
                let Some(next) = iter.next() else { break };
                end_line = next.span.end_line;
                span = span.merge(&next.span);
                comments.push(Comment {
                    text: next.text,
                    span: next.span,
                });
            }

            groups.push(CommentGroup {
                id: NodeId::new(),
                span,
                comments,
            });
        }

        groups
    }
}

#[cfg(test)]
#[path = "lexer_tests.rs"]
mod tests;
