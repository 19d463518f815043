//! Go front end
//!
//! This module provides:
//! - Lexer (tokenization, semicolon insertion, comment groups)
//! - Parser (AST construction)
//! - AST definitions and a uniform node view
//! - Span tracking

pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod span;
pub mod visit;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::Parser;
pub use span::SourceFile;
pub use visit::{walk, Node, NodeCategory};

use crate::diagnostics::{error_codes::syntax, Diagnostic, DiagnosticBag, Span};
use std::path::Path;

/// Parse the raw bytes of a Go source file.
///
/// Go source must be UTF-8; anything else is reported as a syntax error at
/// the first invalid byte.
pub fn parse_bytes(bytes: &[u8], path: &Path) -> Result<File, DiagnosticBag> {
    match std::str::from_utf8(bytes) {
        Ok(source) => parse_source(source, path),
        Err(err) => Err(DiagnosticBag::from(invalid_utf8(bytes, err, path))),
    }
}

fn invalid_utf8(bytes: &[u8], err: std::str::Utf8Error, path: &Path) -> Diagnostic {
    let offset = err.valid_up_to();
    let valid = &bytes[..offset];
    let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
    let col = offset - valid.iter().rposition(|&b| b == b'\n').map_or(0, |nl| nl + 1) + 1;

    Diagnostic::error(syntax::INVALID_UTF8)
        .message("invalid UTF-8 encoding")
        .span(Span::new(path.to_path_buf(), offset, offset + 1, line, col, line, col + 1))
        .build()
}

/// Parse Go source code into an AST
pub fn parse_source(source: &str, path: &Path) -> Result<File, DiagnosticBag> {
    let source_file = SourceFile::new(path.to_path_buf(), source.to_string());
    let lexer = Lexer::new(&source_file);
    let mut parser = Parser::new(lexer, &source_file);
    parser.parse_file()
}

#[cfg(test)]
mod tests;
