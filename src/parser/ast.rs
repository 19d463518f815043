//! Abstract Syntax Tree definitions for Go
//!
//! All AST nodes include:
//! - Unique node ID
//! - Source span
//! - Node-specific data
//!
//! The shape follows Go's own `go/ast` closely enough that positional
//! questions ("which node ends on this line", "which declaration holds this
//! specification") have the same answers.

use crate::diagnostics::Span;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for AST nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Generate a new unique node ID
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed Go source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub id: NodeId,
    pub span: Span,
    pub package: Ident,
    pub decls: Vec<Decl>,
    /// Every comment group in the file, in source order
    pub comments: Vec<CommentGroup>,
}

/// A single `//` or `/* */` comment, with its markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

/// Adjacent comments with no token or blank line between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentGroup {
    pub id: NodeId,
    pub span: Span,
    pub comments: Vec<Comment>,
}

/// An identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ident {
    pub id: NodeId,
    pub span: Span,
    pub name: String,
}

/// Top-level (or statement-level) declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Decl {
    Gen(GenDecl),
    Func(FuncDecl),
}

impl Decl {
    pub fn id(&self) -> NodeId {
        match self {
            Decl::Gen(decl) => decl.id,
            Decl::Func(decl) => decl.id,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Decl::Gen(decl) => &decl.span,
            Decl::Func(decl) => &decl.span,
        }
    }
}

/// Keyword introducing a generic declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclKeyword {
    Import,
    Const,
    Type,
    Var,
}

/// `import`, `const`, `type` or `var` declaration, possibly grouped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenDecl {
    pub id: NodeId,
    pub span: Span,
    pub keyword: DeclKeyword,
    /// Whether the specifications are wrapped in parentheses
    pub grouped: bool,
    pub specs: Vec<Spec>,
}

/// One specification of a generic declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

impl Spec {
    pub fn id(&self) -> NodeId {
        match self {
            Spec::Import(spec) => spec.id,
            Spec::Value(spec) => spec.id,
            Spec::Type(spec) => spec.id,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Spec::Import(spec) => &spec.span,
            Spec::Value(spec) => &spec.span,
            Spec::Type(spec) => &spec.span,
        }
    }
}

/// `name "path"`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSpec {
    pub id: NodeId,
    pub span: Span,
    pub name: Option<Ident>,
    pub path: BasicLit,
}

/// `a, b T = x, y` inside a `const` or `var` declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSpec {
    pub id: NodeId,
    pub span: Span,
    pub names: Vec<Ident>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
}

/// `Name[T any] Type` or `Name = Type`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSpec {
    pub id: NodeId,
    pub span: Span,
    pub name: Ident,
    pub type_params: Option<FieldList>,
    /// Alias declaration (`type A = B`)
    pub alias: bool,
    pub ty: Expr,
}

/// Function or method declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDecl {
    pub id: NodeId,
    pub span: Span,
    pub recv: Option<FieldList>,
    pub name: Ident,
    pub ty: FuncType,
    pub body: Option<BlockStmt>,
}

/// Function signature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncType {
    pub id: NodeId,
    pub span: Span,
    pub type_params: Option<FieldList>,
    pub params: FieldList,
    pub results: Option<FieldList>,
}

/// Parenthesized or braced list of fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldList {
    pub id: NodeId,
    pub span: Span,
    pub fields: Vec<Field>,
}

/// Struct field, parameter, result, method or embedded element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: NodeId,
    pub span: Span,
    pub names: Vec<Ident>,
    pub ty: Expr,
    pub tag: Option<BasicLit>,
}

/// Literal of a basic type, kept as source text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicLit {
    pub id: NodeId,
    pub span: Span,
    pub kind: LitKind,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// `{ stmts }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockStmt {
    pub id: NodeId,
    pub span: Span,
    pub stmts: Vec<Stmt>,
}

/// Expressions, including type expressions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(span: Span, kind: ExprKind) -> Self {
        Self {
            id: NodeId::new(),
            span,
            kind,
        }
    }

    /// The identifier name when this is a plain identifier
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
    Xor,
    Addr,
    Recv,
    Tilde,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    LogAnd,
    LogOr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    /// Go operator precedence (5 binds tightest)
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::LogOr => 1,
            BinaryOp::LogAnd => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 4,
            BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Rem
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::And
            | BinaryOp::AndNot => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprKind {
    Ident(String),
    BasicLit(BasicLit),
    CompositeLit {
        ty: Option<Box<Expr>>,
        elts: Vec<Expr>,
    },
    FuncLit {
        ty: FuncType,
        body: BlockStmt,
    },
    Paren(Box<Expr>),
    Selector {
        expr: Box<Expr>,
        sel: Ident,
    },
    /// `x[i]` or an instantiation `F[A, B]`
    Index {
        expr: Box<Expr>,
        indices: Vec<Expr>,
    },
    Slice {
        expr: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
    },
    /// `x.(T)`; `ty` is `None` for `x.(type)`
    TypeAssert {
        expr: Box<Expr>,
        ty: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        ellipsis: bool,
    },
    /// `*x`, as dereference or pointer type
    Star(Box<Expr>),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ArrayType {
        len: Option<Box<Expr>>,
        elem: Box<Expr>,
    },
    /// `...T` in parameter lists, `[...]T` array lengths
    Ellipsis(Option<Box<Expr>>),
    StructType(FieldList),
    FuncType(FuncType),
    InterfaceType(FieldList),
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ChanType {
        dir: ChanDir,
        value: Box<Expr>,
    },
}

/// Statements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stmt {
    pub id: NodeId,
    pub span: Span,
    pub kind: StmtKind,
}

impl Stmt {
    pub fn new(span: Span, kind: StmtKind) -> Self {
        Self {
            id: NodeId::new(),
            span,
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `:=`
    Define,
    /// `+=`, `<<=`, ...
    Compound(BinaryOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StmtKind {
    Decl(Decl),
    Empty,
    Labeled {
        label: Ident,
        stmt: Box<Stmt>,
    },
    Expr(Expr),
    Send {
        chan: Expr,
        value: Expr,
    },
    IncDec {
        expr: Expr,
        inc: bool,
    },
    Assign {
        lhs: Vec<Expr>,
        op: AssignOp,
        rhs: Vec<Expr>,
    },
    Go(Expr),
    Defer(Expr),
    Return(Vec<Expr>),
    Branch {
        kind: BranchKind,
        label: Option<Ident>,
    },
    Block(BlockStmt),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: BlockStmt,
        els: Option<Box<Stmt>>,
    },
    /// `case a, b:` or `default:` inside a switch
    CaseClause {
        list: Vec<Expr>,
        body: Vec<Stmt>,
    },
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        body: BlockStmt,
    },
    TypeSwitch {
        init: Option<Box<Stmt>>,
        assign: Box<Stmt>,
        body: BlockStmt,
    },
    /// `case <-c:` or `default:` inside a select
    CommClause {
        comm: Option<Box<Stmt>>,
        body: Vec<Stmt>,
    },
    Select(BlockStmt),
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: BlockStmt,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        expr: Expr,
        body: BlockStmt,
    },
}
