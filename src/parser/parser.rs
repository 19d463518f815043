//! Recursive descent parser for Go
#![allow(clippy::result_large_err)]

use crate::diagnostics::{error_codes::syntax, Diagnostic, DiagnosticBag, Span};
use crate::parser::ast::*;
use crate::parser::lexer::{Lexer, Token, TokenKind};
use crate::parser::span::SourceFile;
use std::collections::VecDeque;

/// Deepest nesting of expressions, types and statements accepted
pub const MAX_NEST_LEV: u32 = 200;

/// How a simple statement may continue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimpleMode {
    Basic,
    LabelOk,
    RangeOk,
}

/// Result of parsing a simple statement in a `for` header
enum Header {
    Stmt(Stmt),
    Range {
        start: Span,
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        expr: Expr,
    },
}

/// Parser for Go source code
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    source: &'a SourceFile,
    errors: DiagnosticBag,
    buffer: VecDeque<Token>,
    /// End offset of the last consumed token, implicit semicolons excluded
    prev_end: usize,
    /// Composite literals are not allowed at negative levels (control clauses)
    expr_lev: i32,
    /// Current nesting depth, bounded by [`MAX_NEST_LEV`]
    nest_lev: u32,
}

impl<'a> Parser<'a> {
    /// Create a new parser
    pub fn new(lexer: Lexer<'a>, source: &'a SourceFile) -> Self {
        Self {
            lexer,
            source,
            errors: DiagnosticBag::new(),
            buffer: VecDeque::new(),
            prev_end: 0,
            expr_lev: 0,
            nest_lev: 0,
        }
    }

    /// Parse a complete source file
    pub fn parse_file(&mut self) -> Result<File, DiagnosticBag> {
        let start = self.current_span();

        if !self.check(TokenKind::Package) {
            let found = self.peek().describe();
            self.errors.push(
                Diagnostic::error(syntax::MISSING_PACKAGE_CLAUSE)
                    .message(format!("expected 'package', found {}", found))
                    .span(start)
                    .build(),
            );
            self.errors.merge(self.lexer.take_errors());
            return Err(std::mem::take(&mut self.errors));
        }

        let package = match self.parse_package_clause() {
            Ok(package) => package,
            Err(diag) => {
                self.errors.push(diag);
                self.errors.merge(self.lexer.take_errors());
                return Err(std::mem::take(&mut self.errors));
            }
        };

        let mut decls = Vec::new();
        let mut imports_done = false;
        while !self.is_eof() {
            match self.parse_top_level_decl(&mut imports_done) {
                Ok(decl) => decls.push(decl),
                Err(diag) => {
                    self.errors.push(diag);
                    self.recover_to_next_decl();
                }
            }
        }

        self.errors.merge(self.lexer.take_errors());
        if self.errors.has_errors() {
            return Err(std::mem::take(&mut self.errors));
        }

        Ok(File {
            id: NodeId::new(),
            span: self.finish(&start),
            package,
            decls,
            comments: self.lexer.take_comment_groups(),
        })
    }

    fn parse_package_clause(&mut self) -> Result<Ident, Diagnostic> {
        self.expect(TokenKind::Package)?;
        let name = self.parse_ident()?;
        self.expect_semi()?;
        Ok(name)
    }

    fn parse_top_level_decl(&mut self, imports_done: &mut bool) -> Result<Decl, Diagnostic> {
        let token = self.peek().clone();
        let decl = match token.kind {
            TokenKind::Import if *imports_done => {
                return Err(Diagnostic::error(syntax::MISPLACED_IMPORT)
                    .message("imports must appear before other declarations")
                    .span(token.span)
                    .build());
            }
            TokenKind::Import => Decl::Gen(self.parse_gen_decl(DeclKeyword::Import)?),
            TokenKind::Const => Decl::Gen(self.parse_gen_decl(DeclKeyword::Const)?),
            TokenKind::Var => Decl::Gen(self.parse_gen_decl(DeclKeyword::Var)?),
            TokenKind::Type => Decl::Gen(self.parse_gen_decl(DeclKeyword::Type)?),
            TokenKind::Func => Decl::Func(self.parse_func_decl()?),
            _ => return Err(self.error_unexpected("declaration")),
        };
        if !matches!(token.kind, TokenKind::Import) {
            *imports_done = true;
        }
        self.expect_semi()?;
        Ok(decl)
    }

    // Declarations

    fn parse_gen_decl(&mut self, keyword: DeclKeyword) -> Result<GenDecl, Diagnostic> {
        let start = self.advance().span;
        let mut specs = Vec::new();
        let grouped = self.eat(TokenKind::LParen);

        if grouped {
            while !self.check(TokenKind::RParen) && !self.is_eof() {
                specs.push(self.parse_spec(keyword)?);
                if !self.check(TokenKind::RParen) {
                    self.expect_semi()?;
                }
            }
            self.expect(TokenKind::RParen)?;
        } else {
            specs.push(self.parse_spec(keyword)?);
        }

        Ok(GenDecl {
            id: NodeId::new(),
            span: self.finish(&start),
            keyword,
            grouped,
            specs,
        })
    }

    fn parse_spec(&mut self, keyword: DeclKeyword) -> Result<Spec, Diagnostic> {
        match keyword {
            DeclKeyword::Import => self.parse_import_spec().map(Spec::Import),
            DeclKeyword::Const | DeclKeyword::Var => self.parse_value_spec().map(Spec::Value),
            DeclKeyword::Type => self.parse_type_spec().map(Spec::Type),
        }
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, Diagnostic> {
        let start = self.current_span();
        let name = match self.peek().kind {
            TokenKind::Ident(_) => Some(self.parse_ident()?),
            TokenKind::Dot => {
                let token = self.advance();
                Some(Ident {
                    id: NodeId::new(),
                    span: token.span,
                    name: ".".to_string(),
                })
            }
            _ => None,
        };

        let token = self.advance();
        let path = match token.kind {
            TokenKind::StringLit(value) => BasicLit {
                id: NodeId::new(),
                span: token.span,
                kind: LitKind::String,
                value,
            },
            other => {
                return Err(Diagnostic::error(syntax::UNEXPECTED_TOKEN)
                    .message(format!("expected import path, found {}", other.describe()))
                    .span(token.span)
                    .build())
            }
        };

        Ok(ImportSpec {
            id: NodeId::new(),
            span: self.finish(&start),
            name,
            path,
        })
    }

    fn parse_value_spec(&mut self) -> Result<ValueSpec, Diagnostic> {
        let start = self.current_span();
        let names = self.parse_ident_list()?;

        let ty = if !self.check(TokenKind::Eq)
            && !self.check(TokenKind::Semicolon)
            && !self.check(TokenKind::RParen)
        {
            Some(self.parse_type()?)
        } else {
            None
        };

        let values = if self.eat(TokenKind::Eq) {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };

        Ok(ValueSpec {
            id: NodeId::new(),
            span: self.finish(&start),
            names,
            ty,
            values,
        })
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec, Diagnostic> {
        let start = self.current_span();
        let name = self.parse_ident()?;
        let mut type_params = None;

        // `type A[T any] ...` versus `type A [N]T`
        if self.check(TokenKind::LBracket) && self.looks_like_type_params() {
            type_params = Some(self.parse_type_params()?);
        }

        let alias = self.eat(TokenKind::Eq);
        let ty = self.parse_type()?;

        Ok(TypeSpec {
            id: NodeId::new(),
            span: self.finish(&start),
            name,
            type_params,
            alias,
            ty,
        })
    }

    fn looks_like_type_params(&mut self) -> bool {
        if !matches!(self.peek_nth(1).kind, TokenKind::Ident(_)) {
            return false;
        }
        matches!(
            self.peek_nth(2).kind,
            TokenKind::Ident(_)
                | TokenKind::Comma
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::LParen
                | TokenKind::Tilde
                | TokenKind::Interface
                | TokenKind::Func
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Struct
        )
    }

    fn parse_type_params(&mut self) -> Result<FieldList, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::LBracket)?;
        let mut fields = Vec::new();
        let mut pending = Vec::new();

        while !self.check(TokenKind::RBracket) && !self.is_eof() {
            let name = self.parse_ident()?;
            if self.eat(TokenKind::Comma) {
                pending.push(name);
                continue;
            }
            let field_start = pending.first().map(|n: &Ident| n.span.clone());
            let field_start = field_start.unwrap_or_else(|| name.span.clone());
            let constraint = self.parse_constraint()?;
            let mut names = std::mem::take(&mut pending);
            names.push(name);
            fields.push(Field {
                id: NodeId::new(),
                span: self.finish(&field_start),
                names,
                ty: constraint,
                tag: None,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        if !pending.is_empty() {
            return Err(Diagnostic::error(syntax::EXPECTED_TYPE)
                .message("type parameters need a constraint")
                .span(self.current_span())
                .build());
        }

        self.expect(TokenKind::RBracket)?;
        Ok(FieldList {
            id: NodeId::new(),
            span: self.finish(&start),
            fields,
        })
    }

    /// `~T | U` constraint or plain type
    fn parse_constraint(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.current_span();
        let mut lhs = self.parse_constraint_term()?;
        while self.eat(TokenKind::Pipe) {
            let rhs = self.parse_constraint_term()?;
            lhs = Expr::new(
                self.finish(&start),
                ExprKind::Binary {
                    op: BinaryOp::Or,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
            );
        }
        Ok(lhs)
    }

    fn parse_constraint_term(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.current_span();
        if self.eat(TokenKind::Tilde) {
            let ty = self.parse_type()?;
            return Ok(Expr::new(
                self.finish(&start),
                ExprKind::Unary {
                    op: UnaryOp::Tilde,
                    expr: Box::new(ty),
                },
            ));
        }
        self.parse_type()
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::Func)?;

        let recv = if self.check(TokenKind::LParen) {
            Some(self.parse_params()?)
        } else {
            None
        };
        let name = self.parse_ident()?;
        let type_params = if self.check(TokenKind::LBracket) {
            Some(self.parse_type_params()?)
        } else {
            None
        };
        let params = self.parse_params()?;
        let results = self.parse_results()?;
        let ty = FuncType {
            id: NodeId::new(),
            span: self.finish(&start),
            type_params,
            params,
            results,
        };

        let body = if self.check(TokenKind::LBrace) {
            Some(self.parse_func_body()?)
        } else {
            None
        };

        Ok(FuncDecl {
            id: NodeId::new(),
            span: self.finish(&start),
            recv,
            name,
            ty,
            body,
        })
    }

    fn parse_func_body(&mut self) -> Result<BlockStmt, Diagnostic> {
        let outer = self.expr_lev;
        self.expr_lev = 0;
        let body = self.parse_block();
        self.expr_lev = outer;
        body
    }

    /// `(a, b int, c string)` or `(int, error)`
    fn parse_params(&mut self) -> Result<FieldList, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::LParen)?;
        let mut entries: Vec<(Option<Ident>, Expr)> = Vec::new();

        while !self.check(TokenKind::RParen) && !self.is_eof() {
            entries.push(self.parse_param_entry()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        let named = entries.iter().any(|(name, _)| name.is_some());
        let mut fields = Vec::new();

        if named {
            let mut pending: Vec<Ident> = Vec::new();
            for (name, ty) in entries {
                match name {
                    Some(name) => {
                        let field_start = pending
                            .first()
                            .map(|n| n.span.clone())
                            .unwrap_or_else(|| name.span.clone());
                        let mut names = std::mem::take(&mut pending);
                        names.push(name);
                        fields.push(Field {
                            id: NodeId::new(),
                            span: self.source.span(field_start.start, ty.span.end),
                            names,
                            ty,
                            tag: None,
                        });
                    }
                    None => match &ty.kind {
                        ExprKind::Ident(name) => pending.push(Ident {
                            id: NodeId::new(),
                            span: ty.span.clone(),
                            name: name.clone(),
                        }),
                        _ => return Err(self.mixed_params(&ty.span)),
                    },
                }
            }
            if let Some(name) = pending.first() {
                return Err(self.mixed_params(&name.span));
            }
        } else {
            for (_, ty) in entries {
                fields.push(Field {
                    id: NodeId::new(),
                    span: ty.span.clone(),
                    names: Vec::new(),
                    ty,
                    tag: None,
                });
            }
        }

        Ok(FieldList {
            id: NodeId::new(),
            span: self.finish(&start),
            fields,
        })
    }

    fn mixed_params(&self, span: &Span) -> Diagnostic {
        Diagnostic::error(syntax::EXPECTED_TYPE)
            .message("mixed named and unnamed parameters")
            .span(span.clone())
            .build()
    }

    fn parse_param_entry(&mut self) -> Result<(Option<Ident>, Expr), Diagnostic> {
        if matches!(self.peek().kind, TokenKind::Ident(_)) {
            let names_param = matches!(
                self.peek_nth(1).kind,
                TokenKind::Ident(_)
                    | TokenKind::Star
                    | TokenKind::LBracket
                    | TokenKind::LParen
                    | TokenKind::Func
                    | TokenKind::Map
                    | TokenKind::Chan
                    | TokenKind::Struct
                    | TokenKind::Interface
                    | TokenKind::Arrow
                    | TokenKind::Ellipsis
            );
            if names_param {
                let name = self.parse_ident()?;
                let ty = self.parse_param_type()?;
                return Ok((Some(name), ty));
            }
        }
        Ok((None, self.parse_param_type()?))
    }

    fn parse_param_type(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.current_span();
        if self.eat(TokenKind::Ellipsis) {
            let elem = self.parse_type()?;
            return Ok(Expr::new(
                self.finish(&start),
                ExprKind::Ellipsis(Some(Box::new(elem))),
            ));
        }
        self.parse_type()
    }

    fn parse_results(&mut self) -> Result<Option<FieldList>, Diagnostic> {
        if self.check(TokenKind::LParen) {
            return self.parse_params().map(Some);
        }
        if !self.at_type_start() {
            return Ok(None);
        }

        let ty = self.parse_type()?;
        Ok(Some(FieldList {
            id: NodeId::new(),
            span: ty.span.clone(),
            fields: vec![Field {
                id: NodeId::new(),
                span: ty.span.clone(),
                names: Vec::new(),
                ty,
                tag: None,
            }],
        }))
    }

    fn at_type_start(&mut self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Ident(_)
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::LParen
                | TokenKind::Func
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Struct
                | TokenKind::Interface
                | TokenKind::Arrow
        )
    }

    // Types

    fn parse_type(&mut self) -> Result<Expr, Diagnostic> {
        self.nested(Self::parse_type_expr)
    }

    fn parse_type_expr(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.current_span();
        let kind = self.peek().kind.clone();

        match kind {
            TokenKind::Ident(_) => self.parse_type_name(),
            TokenKind::Star => {
                self.advance();
                let elem = self.parse_type()?;
                Ok(Expr::new(self.finish(&start), ExprKind::Star(Box::new(elem))))
            }
            TokenKind::LBracket => self.parse_array_type(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::new(self.finish(&start), ExprKind::Paren(Box::new(inner))))
            }
            TokenKind::Func => {
                let ty = self.parse_func_type()?;
                Ok(Expr::new(ty.span.clone(), ExprKind::FuncType(ty)))
            }
            TokenKind::Map => {
                self.advance();
                self.expect(TokenKind::LBracket)?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RBracket)?;
                let value = self.parse_type()?;
                Ok(Expr::new(
                    self.finish(&start),
                    ExprKind::MapType {
                        key: Box::new(key),
                        value: Box::new(value),
                    },
                ))
            }
            TokenKind::Chan => {
                self.advance();
                let dir = if self.eat(TokenKind::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                let value = self.parse_type()?;
                Ok(Expr::new(
                    self.finish(&start),
                    ExprKind::ChanType {
                        dir,
                        value: Box::new(value),
                    },
                ))
            }
            TokenKind::Arrow => {
                self.advance();
                self.expect(TokenKind::Chan)?;
                let value = self.parse_type()?;
                Ok(Expr::new(
                    self.finish(&start),
                    ExprKind::ChanType {
                        dir: ChanDir::Recv,
                        value: Box::new(value),
                    },
                ))
            }
            TokenKind::Struct => self.parse_struct_type(),
            TokenKind::Interface => self.parse_interface_type(),
            _ => {
                let token = self.peek().clone();
                Err(Diagnostic::error(syntax::EXPECTED_TYPE)
                    .message(format!("expected type, found {}", token.describe()))
                    .span(token.span)
                    .build())
            }
        }
    }

    /// `T`, `pkg.T`, `T[A, B]`
    fn parse_type_name(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.current_span();
        let name = self.parse_ident()?;
        let mut ty = Expr::new(name.span.clone(), ExprKind::Ident(name.name));

        if self.check(TokenKind::Dot) {
            self.advance();
            let sel = self.parse_ident()?;
            ty = Expr::new(
                self.finish(&start),
                ExprKind::Selector {
                    expr: Box::new(ty),
                    sel,
                },
            );
        }

        if self.check(TokenKind::LBracket) {
            self.advance();
            let mut indices = vec![self.parse_type()?];
            while self.eat(TokenKind::Comma) {
                if self.check(TokenKind::RBracket) {
                    break;
                }
                indices.push(self.parse_type()?);
            }
            self.expect(TokenKind::RBracket)?;
            ty = Expr::new(
                self.finish(&start),
                ExprKind::Index {
                    expr: Box::new(ty),
                    indices,
                },
            );
        }

        Ok(ty)
    }

    fn parse_array_type(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::LBracket)?;

        let len = if self.check(TokenKind::RBracket) {
            None
        } else if self.check(TokenKind::Ellipsis) {
            let token = self.advance();
            Some(Box::new(Expr::new(token.span, ExprKind::Ellipsis(None))))
        } else {
            self.expr_lev += 1;
            let len = self.parse_expr();
            self.expr_lev -= 1;
            Some(Box::new(len?))
        };

        self.expect(TokenKind::RBracket)?;
        let elem = self.parse_type()?;
        Ok(Expr::new(
            self.finish(&start),
            ExprKind::ArrayType {
                len,
                elem: Box::new(elem),
            },
        ))
    }

    fn parse_func_type(&mut self) -> Result<FuncType, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::Func)?;
        let params = self.parse_params()?;
        let results = self.parse_results()?;
        Ok(FuncType {
            id: NodeId::new(),
            span: self.finish(&start),
            type_params: None,
            params,
            results,
        })
    }

    fn parse_struct_type(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::Struct)?;
        let list_start = self.current_span();
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            fields.push(self.parse_struct_field()?);
            if !self.check(TokenKind::RBrace) {
                self.expect_semi()?;
            }
        }
        self.expect(TokenKind::RBrace)?;

        let list = FieldList {
            id: NodeId::new(),
            span: self.finish(&list_start),
            fields,
        };
        Ok(Expr::new(self.finish(&start), ExprKind::StructType(list)))
    }

    fn parse_struct_field(&mut self) -> Result<Field, Diagnostic> {
        let start = self.current_span();
        let (names, ty) = match self.peek().kind {
            TokenKind::Star => (Vec::new(), self.parse_type()?),
            TokenKind::Ident(_) => {
                let embedded = matches!(
                    self.peek_nth(1).kind,
                    TokenKind::Dot
                        | TokenKind::Semicolon
                        | TokenKind::RBrace
                        | TokenKind::StringLit(_)
                );
                if embedded {
                    (Vec::new(), self.parse_type_name()?)
                } else {
                    let names = self.parse_ident_list()?;
                    (names, self.parse_type()?)
                }
            }
            _ => return Err(self.error_unexpected("field name or embedded type")),
        };

        let tag = match self.peek().kind.clone() {
            TokenKind::StringLit(value) => {
                let token = self.advance();
                Some(BasicLit {
                    id: NodeId::new(),
                    span: token.span,
                    kind: LitKind::String,
                    value,
                })
            }
            _ => None,
        };

        Ok(Field {
            id: NodeId::new(),
            span: self.finish(&start),
            names,
            ty,
            tag,
        })
    }

    fn parse_interface_type(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::Interface)?;
        let list_start = self.current_span();
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            let elem_start = self.current_span();
            let is_method = matches!(self.peek().kind, TokenKind::Ident(_))
                && matches!(self.peek_nth(1).kind, TokenKind::LParen);

            let field = if is_method {
                let name = self.parse_ident()?;
                let params = self.parse_params()?;
                let results = self.parse_results()?;
                let ty = FuncType {
                    id: NodeId::new(),
                    span: self.finish(&params.span),
                    type_params: None,
                    params,
                    results,
                };
                Field {
                    id: NodeId::new(),
                    span: self.finish(&elem_start),
                    names: vec![name],
                    ty: Expr::new(ty.span.clone(), ExprKind::FuncType(ty)),
                    tag: None,
                }
            } else {
                let ty = self.parse_constraint()?;
                Field {
                    id: NodeId::new(),
                    span: self.finish(&elem_start),
                    names: Vec::new(),
                    ty,
                    tag: None,
                }
            };
            fields.push(field);

            if !self.check(TokenKind::RBrace) {
                self.expect_semi()?;
            }
        }
        self.expect(TokenKind::RBrace)?;

        let list = FieldList {
            id: NodeId::new(),
            span: self.finish(&list_start),
            fields,
        };
        Ok(Expr::new(self.finish(&start), ExprKind::InterfaceType(list)))
    }

    // Statements

    fn parse_block(&mut self) -> Result<BlockStmt, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::LBrace)?;
        let stmts = self.parse_stmt_list()?;
        self.expect(TokenKind::RBrace)?;
        Ok(BlockStmt {
            id: NodeId::new(),
            span: self.finish(&start),
            stmts,
        })
    }

    fn parse_stmt_list(&mut self) -> Result<Vec<Stmt>, Diagnostic> {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace)
            && !self.check(TokenKind::Case)
            && !self.check(TokenKind::Default)
            && !self.is_eof()
        {
            let stmt = self.parse_stmt()?;
            if !matches!(stmt.kind, StmtKind::Empty) {
                stmts.push(stmt);
            }
            if !self.check(TokenKind::RBrace) {
                self.expect_semi()?;
            }
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        self.nested(Self::parse_stmt_kind)
    }

    fn parse_stmt_kind(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.current_span();
        let kind = self.peek().kind.clone();

        match kind {
            TokenKind::Const => {
                let decl = self.parse_gen_decl(DeclKeyword::Const)?;
                Ok(Stmt::new(self.finish(&start), StmtKind::Decl(Decl::Gen(decl))))
            }
            TokenKind::Var => {
                let decl = self.parse_gen_decl(DeclKeyword::Var)?;
                Ok(Stmt::new(self.finish(&start), StmtKind::Decl(Decl::Gen(decl))))
            }
            TokenKind::Type => {
                let decl = self.parse_gen_decl(DeclKeyword::Type)?;
                Ok(Stmt::new(self.finish(&start), StmtKind::Decl(Decl::Gen(decl))))
            }
            TokenKind::Go => {
                self.advance();
                let call = self.parse_expr()?;
                Ok(Stmt::new(self.finish(&start), StmtKind::Go(call)))
            }
            TokenKind::Defer => {
                self.advance();
                let call = self.parse_expr()?;
                Ok(Stmt::new(self.finish(&start), StmtKind::Defer(call)))
            }
            TokenKind::Return => {
                self.advance();
                let results = if self.check(TokenKind::Semicolon) || self.check(TokenKind::RBrace)
                {
                    Vec::new()
                } else {
                    self.parse_expr_list()?
                };
                Ok(Stmt::new(self.finish(&start), StmtKind::Return(results)))
            }
            TokenKind::Break | TokenKind::Continue | TokenKind::Goto | TokenKind::Fallthrough => {
                self.advance();
                let branch = match kind {
                    TokenKind::Break => BranchKind::Break,
                    TokenKind::Continue => BranchKind::Continue,
                    TokenKind::Goto => BranchKind::Goto,
                    _ => BranchKind::Fallthrough,
                };
                let label = if branch != BranchKind::Fallthrough
                    && matches!(self.peek().kind, TokenKind::Ident(_))
                {
                    Some(self.parse_ident()?)
                } else {
                    None
                };
                Ok(Stmt::new(
                    self.finish(&start),
                    StmtKind::Branch {
                        kind: branch,
                        label,
                    },
                ))
            }
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                Ok(Stmt::new(block.span.clone(), StmtKind::Block(block)))
            }
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::Switch => self.parse_switch_stmt(),
            TokenKind::Select => self.parse_select_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Semicolon | TokenKind::RBrace => {
                let at = start.start;
                Ok(Stmt::new(self.source.point(at), StmtKind::Empty))
            }
            _ => self.parse_simple_stmt(SimpleMode::LabelOk),
        }
    }

    fn parse_simple_stmt(&mut self, mode: SimpleMode) -> Result<Stmt, Diagnostic> {
        match self.parse_simple_header(mode)? {
            Header::Stmt(stmt) => Ok(stmt),
            Header::Range { start, .. } => Err(Diagnostic::error(syntax::UNEXPECTED_TOKEN)
                .message("unexpected range clause")
                .span(start)
                .build()),
        }
    }

    fn parse_simple_header(&mut self, mode: SimpleMode) -> Result<Header, Diagnostic> {
        let start = self.current_span();

        if mode == SimpleMode::RangeOk && self.eat(TokenKind::Range) {
            let expr = self.parse_expr()?;
            return Ok(Header::Range {
                start,
                key: None,
                value: None,
                define: false,
                expr,
            });
        }

        let mut lhs = self.parse_expr_list()?;
        let kind = self.peek().kind.clone();

        let op = match kind {
            TokenKind::Define => Some(AssignOp::Define),
            TokenKind::Eq => Some(AssignOp::Assign),
            ref other => compound_assign_op(other).map(AssignOp::Compound),
        };

        if let Some(op) = op {
            self.advance();
            if mode == SimpleMode::RangeOk
                && !matches!(op, AssignOp::Compound(_))
                && self.eat(TokenKind::Range)
            {
                let expr = self.parse_expr()?;
                let mut targets = lhs.into_iter();
                return Ok(Header::Range {
                    start,
                    key: targets.next(),
                    value: targets.next(),
                    define: op == AssignOp::Define,
                    expr,
                });
            }
            let rhs = self.parse_expr_list()?;
            return Ok(Header::Stmt(Stmt::new(
                self.finish(&start),
                StmtKind::Assign { lhs, op, rhs },
            )));
        }

        if lhs.len() > 1 {
            return Err(self.error_unexpected("':=', '=' or ','"));
        }
        let Some(expr) = lhs.pop() else {
            return Err(self.error_unexpected("expression"));
        };

        let stmt = match kind {
            TokenKind::Colon if mode == SimpleMode::LabelOk && expr.as_ident().is_some() => {
                self.advance();
                let label = Ident {
                    id: NodeId::new(),
                    span: expr.span.clone(),
                    name: expr.as_ident().map(str::to_string).unwrap_or_default(),
                };
                let inner = if self.check(TokenKind::RBrace) {
                    Stmt::new(self.current_span(), StmtKind::Empty)
                } else {
                    self.parse_stmt()?
                };
                StmtKind::Labeled {
                    label,
                    stmt: Box::new(inner),
                }
            }
            TokenKind::Arrow => {
                self.advance();
                let value = self.parse_expr()?;
                StmtKind::Send { chan: expr, value }
            }
            TokenKind::Inc | TokenKind::Dec => {
                self.advance();
                StmtKind::IncDec {
                    expr,
                    inc: kind == TokenKind::Inc,
                }
            }
            _ => StmtKind::Expr(expr),
        };

        Ok(Header::Stmt(Stmt::new(self.finish(&start), stmt)))
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::If)?;

        let outer = self.expr_lev;
        self.expr_lev = -1;
        let header = self.parse_if_header();
        self.expr_lev = outer;
        let (init, cond) = header?;

        let then = self.parse_block()?;
        let els = if self.eat(TokenKind::Else) {
            match self.peek().kind {
                TokenKind::If => Some(Box::new(self.parse_if_stmt()?)),
                TokenKind::LBrace => {
                    let block = self.parse_block()?;
                    Some(Box::new(Stmt::new(block.span.clone(), StmtKind::Block(block))))
                }
                _ => return Err(self.error_unexpected("if statement or block")),
            }
        } else {
            None
        };

        Ok(Stmt::new(
            self.finish(&start),
            StmtKind::If {
                init,
                cond,
                then,
                els,
            },
        ))
    }

    fn parse_if_header(&mut self) -> Result<(Option<Box<Stmt>>, Expr), Diagnostic> {
        if self.check(TokenKind::LBrace) {
            return Err(Diagnostic::error(syntax::EXPECTED_EXPRESSION)
                .message("missing condition in if statement")
                .span(self.current_span())
                .build());
        }

        let mut init = None;
        if !self.check(TokenKind::Semicolon) {
            init = Some(self.parse_simple_stmt(SimpleMode::Basic)?);
        }

        if self.eat(TokenKind::Semicolon) {
            let cond = self.parse_simple_stmt(SimpleMode::Basic)?;
            return Ok((init.map(Box::new), self.stmt_to_cond(cond)?));
        }

        match init {
            Some(cond) => Ok((None, self.stmt_to_cond(cond)?)),
            None => Err(self.error_unexpected("condition")),
        }
    }

    fn stmt_to_cond(&self, stmt: Stmt) -> Result<Expr, Diagnostic> {
        match stmt.kind {
            StmtKind::Expr(expr) => Ok(expr),
            _ => Err(Diagnostic::error(syntax::EXPECTED_EXPRESSION)
                .message("expected boolean expression")
                .span(stmt.span)
                .build()),
        }
    }

    fn parse_switch_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::Switch)?;

        let outer = self.expr_lev;
        self.expr_lev = -1;
        let header = self.parse_switch_header();
        self.expr_lev = outer;
        let (init, tag) = header?;

        let type_switch = tag.as_ref().is_some_and(is_type_switch_guard);
        let body_start = self.current_span();
        self.expect(TokenKind::LBrace)?;
        let mut clauses = Vec::new();
        while self.check(TokenKind::Case) || self.check(TokenKind::Default) {
            let clause_start = self.current_span();
            let list = if self.eat(TokenKind::Case) {
                self.parse_expr_list()?
            } else {
                self.advance();
                Vec::new()
            };
            self.expect(TokenKind::Colon)?;
            let body = self.parse_stmt_list()?;
            clauses.push(Stmt::new(
                self.finish(&clause_start),
                StmtKind::CaseClause { list, body },
            ));
        }
        self.expect(TokenKind::RBrace)?;
        let body = BlockStmt {
            id: NodeId::new(),
            span: self.finish(&body_start),
            stmts: clauses,
        };

        let kind = match tag {
            Some(assign) if type_switch => StmtKind::TypeSwitch {
                init,
                assign: Box::new(assign),
                body,
            },
            Some(tag) => StmtKind::Switch {
                init,
                tag: Some(self.stmt_to_cond(tag)?),
                body,
            },
            None => StmtKind::Switch {
                init,
                tag: None,
                body,
            },
        };
        Ok(Stmt::new(self.finish(&start), kind))
    }

    fn parse_switch_header(&mut self) -> Result<(Option<Box<Stmt>>, Option<Stmt>), Diagnostic> {
        let mut init = None;
        let mut tag = None;

        if !self.check(TokenKind::LBrace) {
            if !self.check(TokenKind::Semicolon) {
                tag = Some(self.parse_simple_stmt(SimpleMode::Basic)?);
            }
            if self.eat(TokenKind::Semicolon) {
                init = tag.take().map(Box::new);
                if !self.check(TokenKind::LBrace) {
                    tag = Some(self.parse_simple_stmt(SimpleMode::Basic)?);
                }
            }
        }

        Ok((init, tag))
    }

    fn parse_select_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::Select)?;
        let body_start = self.current_span();
        self.expect(TokenKind::LBrace)?;

        let mut clauses = Vec::new();
        while self.check(TokenKind::Case) || self.check(TokenKind::Default) {
            let clause_start = self.current_span();
            let comm = if self.eat(TokenKind::Case) {
                Some(Box::new(self.parse_simple_stmt(SimpleMode::Basic)?))
            } else {
                self.advance();
                None
            };
            self.expect(TokenKind::Colon)?;
            let body = self.parse_stmt_list()?;
            clauses.push(Stmt::new(
                self.finish(&clause_start),
                StmtKind::CommClause { comm, body },
            ));
        }
        self.expect(TokenKind::RBrace)?;

        let body = BlockStmt {
            id: NodeId::new(),
            span: self.finish(&body_start),
            stmts: clauses,
        };
        Ok(Stmt::new(self.finish(&start), StmtKind::Select(body)))
    }

    fn parse_for_stmt(&mut self) -> Result<Stmt, Diagnostic> {
        let start = self.current_span();
        self.expect(TokenKind::For)?;

        let outer = self.expr_lev;
        self.expr_lev = -1;
        let header = self.parse_for_header();
        self.expr_lev = outer;
        let header = header?;

        let body = self.parse_block()?;
        let kind = match header {
            ForHeader::Range {
                key,
                value,
                define,
                expr,
            } => StmtKind::Range {
                key,
                value,
                define,
                expr,
                body,
            },
            ForHeader::Loop { init, cond, post } => StmtKind::For {
                init,
                cond,
                post,
                body,
            },
        };
        Ok(Stmt::new(self.finish(&start), kind))
    }

    fn parse_for_header(&mut self) -> Result<ForHeader, Diagnostic> {
        let mut init = None;
        let mut cond = None;
        let mut post = None;

        if self.check(TokenKind::LBrace) {
            return Ok(ForHeader::Loop { init, cond, post });
        }

        let mut first = None;
        if !self.check(TokenKind::Semicolon) {
            match self.parse_simple_header(SimpleMode::RangeOk)? {
                Header::Range {
                    key,
                    value,
                    define,
                    expr,
                    ..
                } => {
                    return Ok(ForHeader::Range {
                        key,
                        value,
                        define,
                        expr,
                    })
                }
                Header::Stmt(stmt) => first = Some(stmt),
            }
        }

        if self.eat(TokenKind::Semicolon) {
            init = first.map(Box::new);
            if !self.check(TokenKind::Semicolon) {
                let stmt = self.parse_simple_stmt(SimpleMode::Basic)?;
                cond = Some(self.stmt_to_cond(stmt)?);
            }
            self.expect(TokenKind::Semicolon)?;
            if !self.check(TokenKind::LBrace) {
                post = Some(Box::new(self.parse_simple_stmt(SimpleMode::Basic)?));
            }
        } else if let Some(stmt) = first {
            cond = Some(self.stmt_to_cond(stmt)?);
        }

        Ok(ForHeader::Loop { init, cond, post })
    }

    // Expressions

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>, Diagnostic> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_ident_list(&mut self) -> Result<Vec<Ident>, Diagnostic> {
        let mut names = vec![self.parse_ident()?];
        while self.eat(TokenKind::Comma) {
            names.push(self.parse_ident()?);
        }
        Ok(names)
    }

    pub(crate) fn parse_expr(&mut self) -> Result<Expr, Diagnostic> {
        self.nested(|p| p.parse_binary_expr(1))
    }

    fn parse_binary_expr(&mut self, min_prec: u8) -> Result<Expr, Diagnostic> {
        let start = self.current_span();
        let mut lhs = self.parse_unary_expr()?;

        loop {
            let Some(op) = binary_op(&self.peek().kind) else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();
            let rhs = self.parse_binary_expr(prec + 1)?;
            lhs = Expr::new(
                self.finish(&start),
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
            );
        }

        Ok(lhs)
    }

    fn parse_unary_expr(&mut self) -> Result<Expr, Diagnostic> {
        self.nested(Self::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.current_span();
        let op = match self.peek().kind {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Caret => Some(UnaryOp::Xor),
            TokenKind::Amp => Some(UnaryOp::Addr),
            TokenKind::Tilde => Some(UnaryOp::Tilde),
            TokenKind::Arrow => Some(UnaryOp::Recv),
            TokenKind::Star => {
                self.advance();
                let inner = self.parse_unary_expr()?;
                return Ok(Expr::new(self.finish(&start), ExprKind::Star(Box::new(inner))));
            }
            _ => None,
        };

        let Some(op) = op else {
            return self.parse_primary_expr();
        };

        // `<-chan T` is a type, not a receive
        if op == UnaryOp::Recv && matches!(self.peek_nth(1).kind, TokenKind::Chan) {
            let ty = self.parse_type()?;
            return self.parse_postfix(ty);
        }

        self.advance();
        let inner = self.parse_unary_expr()?;
        Ok(Expr::new(
            self.finish(&start),
            ExprKind::Unary {
                op,
                expr: Box::new(inner),
            },
        ))
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, Diagnostic> {
        let operand = self.parse_operand()?;
        self.parse_postfix(operand)
    }

    fn parse_operand(&mut self) -> Result<Expr, Diagnostic> {
        let start = self.current_span();
        let kind = self.peek().kind.clone();

        let lit = match &kind {
            TokenKind::Ident(name) => {
                self.advance();
                return Ok(Expr::new(start, ExprKind::Ident(name.clone())));
            }
            TokenKind::IntLit(value) => Some((LitKind::Int, value.clone())),
            TokenKind::FloatLit(value) => Some((LitKind::Float, value.clone())),
            TokenKind::ImagLit(value) => Some((LitKind::Imag, value.clone())),
            TokenKind::CharLit(value) => Some((LitKind::Char, value.clone())),
            TokenKind::StringLit(value) => Some((LitKind::String, value.clone())),
            _ => None,
        };

        if let Some((kind, value)) = lit {
            self.advance();
            let lit = BasicLit {
                id: NodeId::new(),
                span: start.clone(),
                kind,
                value,
            };
            return Ok(Expr::new(start, ExprKind::BasicLit(lit)));
        }

        match kind {
            TokenKind::LParen => {
                self.advance();
                self.expr_lev += 1;
                let inner = self.parse_expr();
                self.expr_lev -= 1;
                let inner = inner?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::new(self.finish(&start), ExprKind::Paren(Box::new(inner))))
            }
            TokenKind::Func => {
                let ty = self.parse_func_type()?;
                if self.check(TokenKind::LBrace) {
                    let body = self.parse_func_body()?;
                    Ok(Expr::new(self.finish(&start), ExprKind::FuncLit { ty, body }))
                } else {
                    Ok(Expr::new(ty.span.clone(), ExprKind::FuncType(ty)))
                }
            }
            TokenKind::LBracket
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Struct
            | TokenKind::Interface => self.parse_type(),
            _ => {
                let token = self.peek().clone();
                let code = if token.kind == TokenKind::Eof {
                    syntax::UNEXPECTED_EOF
                } else {
                    syntax::EXPECTED_EXPRESSION
                };
                Err(Diagnostic::error(code)
                    .message(format!("expected expression, found {}", token.describe()))
                    .span(token.span)
                    .build())
            }
        }
    }

    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, Diagnostic> {
        let start = expr.span.clone();

        loop {
            let kind = self.peek().kind.clone();
            expr = match kind {
                TokenKind::Dot => {
                    self.advance();
                    if self.eat(TokenKind::LParen) {
                        let ty = if self.eat(TokenKind::Type) {
                            None
                        } else {
                            Some(Box::new(self.parse_type()?))
                        };
                        self.expect(TokenKind::RParen)?;
                        Expr::new(
                            self.finish(&start),
                            ExprKind::TypeAssert {
                                expr: Box::new(expr),
                                ty,
                            },
                        )
                    } else {
                        let sel = self.parse_ident()?;
                        Expr::new(
                            self.finish(&start),
                            ExprKind::Selector {
                                expr: Box::new(expr),
                                sel,
                            },
                        )
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    self.expr_lev += 1;
                    let kind = self.parse_index_or_slice(expr);
                    self.expr_lev -= 1;
                    let kind = kind?;
                    self.expect(TokenKind::RBracket)?;
                    Expr::new(self.finish(&start), kind)
                }
                TokenKind::LParen => {
                    self.advance();
                    self.expr_lev += 1;
                    let args = self.parse_call_args();
                    self.expr_lev -= 1;
                    let (args, ellipsis) = args?;
                    self.expect(TokenKind::RParen)?;
                    Expr::new(
                        self.finish(&start),
                        ExprKind::Call {
                            func: Box::new(expr),
                            args,
                            ellipsis,
                        },
                    )
                }
                TokenKind::LBrace if self.allows_composite_lit(&expr) => {
                    let elts = self.parse_literal_value()?;
                    Expr::new(
                        self.finish(&start),
                        ExprKind::CompositeLit {
                            ty: Some(Box::new(expr)),
                            elts,
                        },
                    )
                }
                _ => return Ok(expr),
            };
        }
    }

    fn allows_composite_lit(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Ident(_) | ExprKind::Selector { .. } | ExprKind::Index { .. } => {
                self.expr_lev >= 0
            }
            ExprKind::ArrayType { .. } | ExprKind::StructType(_) | ExprKind::MapType { .. } => {
                true
            }
            _ => false,
        }
    }

    fn parse_index_or_slice(&mut self, expr: Expr) -> Result<ExprKind, Diagnostic> {
        let mut parts: [Option<Box<Expr>>; 3] = [None, None, None];
        let mut colons = 0;

        if !self.check(TokenKind::Colon) {
            parts[0] = Some(Box::new(self.parse_expr()?));
        }

        if !self.check(TokenKind::Colon) {
            let mut indices: Vec<Expr> = parts[0].take().map(|e| vec![*e]).unwrap_or_default();
            while self.eat(TokenKind::Comma) {
                if self.check(TokenKind::RBracket) {
                    break;
                }
                indices.push(self.parse_expr()?);
            }
            return Ok(ExprKind::Index {
                expr: Box::new(expr),
                indices,
            });
        }

        while colons < 2 && self.eat(TokenKind::Colon) {
            colons += 1;
            if !self.check(TokenKind::Colon) && !self.check(TokenKind::RBracket) {
                parts[colons] = Some(Box::new(self.parse_expr()?));
            }
        }

        let [low, high, max] = parts;
        Ok(ExprKind::Slice {
            expr: Box::new(expr),
            low,
            high,
            max,
        })
    }

    fn parse_call_args(&mut self) -> Result<(Vec<Expr>, bool), Diagnostic> {
        let mut args = Vec::new();
        let mut ellipsis = false;

        while !self.check(TokenKind::RParen) && !self.is_eof() {
            args.push(self.parse_expr_or_type()?);
            if self.eat(TokenKind::Ellipsis) {
                ellipsis = true;
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        Ok((args, ellipsis))
    }

    fn parse_expr_or_type(&mut self) -> Result<Expr, Diagnostic> {
        if self.check(TokenKind::Arrow) && matches!(self.peek_nth(1).kind, TokenKind::Chan) {
            return self.parse_type();
        }
        self.parse_expr()
    }

    fn parse_literal_value(&mut self) -> Result<Vec<Expr>, Diagnostic> {
        self.expect(TokenKind::LBrace)?;
        self.expr_lev += 1;
        let elts = self.nested(Self::parse_literal_elements);
        self.expr_lev -= 1;
        let elts = elts?;
        self.expect(TokenKind::RBrace)?;
        Ok(elts)
    }

    fn parse_literal_elements(&mut self) -> Result<Vec<Expr>, Diagnostic> {
        let mut elts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            let start = self.current_span();
            let key = self.parse_element()?;
            let elt = if self.eat(TokenKind::Colon) {
                let value = self.parse_element()?;
                Expr::new(
                    self.finish(&start),
                    ExprKind::KeyValue {
                        key: Box::new(key),
                        value: Box::new(value),
                    },
                )
            } else {
                key
            };
            elts.push(elt);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(elts)
    }

    fn parse_element(&mut self) -> Result<Expr, Diagnostic> {
        if self.check(TokenKind::LBrace) {
            let start = self.current_span();
            let elts = self.parse_literal_value()?;
            return Ok(Expr::new(
                self.finish(&start),
                ExprKind::CompositeLit { ty: None, elts },
            ));
        }
        self.parse_expr()
    }

    // Helper methods

    fn fill(&mut self, n: usize) {
        while self.buffer.len() <= n {
            let token = self.lexer.next_token();
            self.buffer.push_back(token);
        }
    }

    fn peek_nth(&mut self, n: usize) -> &Token {
        self.fill(n);
        &self.buffer[n]
    }

    fn peek(&mut self) -> &Token {
        self.peek_nth(0)
    }

    fn advance(&mut self) -> Token {
        let token = match self.buffer.pop_front() {
            Some(token) => token,
            None => self.lexer.next_token(),
        };
        if !matches!(token.kind, TokenKind::Semicolon | TokenKind::Eof) {
            self.prev_end = token.span.end;
        }
        token
    }

    fn is_eof(&mut self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    /// Run `parse` one nesting level deeper
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, Diagnostic>,
    ) -> Result<T, Diagnostic> {
        if self.nest_lev >= MAX_NEST_LEV {
            return Err(Diagnostic::error(syntax::NESTING_TOO_DEEP)
                .message(format!("exceeded max nesting depth of {}", MAX_NEST_LEV))
                .span(self.current_span())
                .build());
        }
        self.nest_lev += 1;
        let result = parse(self);
        self.nest_lev -= 1;
        result
    }

    fn current_span(&mut self) -> Span {
        self.peek().span.clone()
    }

    /// Span from `start` to the end of the last consumed token
    fn finish(&self, start: &Span) -> Span {
        self.source.span(start.start, self.prev_end.max(start.start))
    }

    fn check(&mut self, kind: TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(&kind)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Diagnostic> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            Err(self.error_unexpected(&kind.describe()))
        }
    }

    /// A semicolon, unless the list is about to close
    fn expect_semi(&mut self) -> Result<(), Diagnostic> {
        match self.peek().kind {
            TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::RParen | TokenKind::RBrace | TokenKind::Eof => Ok(()),
            _ => Err(self.error_unexpected("';' or newline")),
        }
    }

    fn parse_ident(&mut self) -> Result<Ident, Diagnostic> {
        if let TokenKind::Ident(name) = self.peek().kind.clone() {
            let token = self.advance();
            return Ok(Ident {
                id: NodeId::new(),
                span: token.span,
                name,
            });
        }
        Err(self.error_unexpected("name"))
    }

    fn error_unexpected(&mut self, expected: &str) -> Diagnostic {
        let token = self.peek().clone();
        let code = if token.kind == TokenKind::Eof {
            syntax::UNEXPECTED_EOF
        } else {
            syntax::UNEXPECTED_TOKEN
        };
        Diagnostic::error(code)
            .message(format!("expected {}, found {}", expected, token.describe()))
            .span(token.span)
            .build()
    }

    fn recover_to_next_decl(&mut self) {
        if !self.is_eof() {
            self.advance();
        }
        while !self.is_eof() {
            match self.peek().kind {
                TokenKind::Import
                | TokenKind::Const
                | TokenKind::Var
                | TokenKind::Type
                | TokenKind::Func => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

enum ForHeader {
    Loop {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        expr: Expr,
    },
}

fn is_type_switch_guard(stmt: &Stmt) -> bool {
    let expr = match &stmt.kind {
        StmtKind::Expr(expr) => expr,
        StmtKind::Assign { op, rhs, .. } if *op == AssignOp::Define && rhs.len() == 1 => &rhs[0],
        _ => return false,
    };
    matches!(expr.kind, ExprKind::TypeAssert { ty: None, .. })
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::Amp => BinaryOp::And,
        TokenKind::Pipe => BinaryOp::Or,
        TokenKind::Caret => BinaryOp::Xor,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::AndNot => BinaryOp::AndNot,
        TokenKind::AndAnd => BinaryOp::LogAnd,
        TokenKind::OrOr => BinaryOp::LogOr,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::BangEq => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::Ge,
        _ => return None,
    };
    Some(op)
}

fn compound_assign_op(kind: &TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::PlusEq => BinaryOp::Add,
        TokenKind::MinusEq => BinaryOp::Sub,
        TokenKind::StarEq => BinaryOp::Mul,
        TokenKind::SlashEq => BinaryOp::Div,
        TokenKind::PercentEq => BinaryOp::Rem,
        TokenKind::AmpEq => BinaryOp::And,
        TokenKind::PipeEq => BinaryOp::Or,
        TokenKind::CaretEq => BinaryOp::Xor,
        TokenKind::ShlEq => BinaryOp::Shl,
        TokenKind::ShrEq => BinaryOp::Shr,
        TokenKind::AndNotEq => BinaryOp::AndNot,
        _ => return None,
    };
    Some(op)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
