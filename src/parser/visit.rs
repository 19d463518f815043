//! Uniform view over positioned syntax nodes
//!
//! Children are reported in the same order Go's `ast.Walk` visits them, so a
//! pre-order walk produces the node sequence the comment map is built from.

use crate::diagnostics::Span;
use crate::parser::ast::*;

/// Coarse node classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCategory {
    File,
    Decl,
    Spec,
    Field,
    Stmt,
    Expr,
    Other,
}

impl NodeCategory {
    /// Nodes that own comments in a comment map
    pub fn is_important(self) -> bool {
        matches!(
            self,
            NodeCategory::File
                | NodeCategory::Decl
                | NodeCategory::Spec
                | NodeCategory::Field
                | NodeCategory::Stmt
        )
    }

    /// Nodes that can be the documented ancestor of an arbitrary node
    pub fn is_documentable(self) -> bool {
        matches!(
            self,
            NodeCategory::Decl | NodeCategory::Spec | NodeCategory::Field | NodeCategory::Stmt
        )
    }
}

/// A syntax node with identity and position
pub trait Node {
    fn id(&self) -> NodeId;
    fn span(&self) -> &Span;
    fn category(&self) -> NodeCategory;
    /// Call `f` on every direct child, in walk order
    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn Node));

    fn as_gen_decl(&self) -> Option<&GenDecl> {
        None
    }
}

/// Pre-order walk. The visitor also receives the parent of each node.
pub fn walk<'a, F>(root: &'a dyn Node, visit: &mut F)
where
    F: FnMut(&'a dyn Node, Option<&'a dyn Node>),
{
    fn go<'a, F>(node: &'a dyn Node, parent: Option<&'a dyn Node>, visit: &mut F)
    where
        F: FnMut(&'a dyn Node, Option<&'a dyn Node>),
    {
        visit(node, parent);
        node.for_each_child(&mut |child| go(child, Some(node), visit));
    }

    go(root, None, visit);
}

impl Decl {
    pub fn as_node(&self) -> &dyn Node {
        match self {
            Decl::Gen(decl) => decl,
            Decl::Func(decl) => decl,
        }
    }
}

impl Spec {
    pub fn as_node(&self) -> &dyn Node {
        match self {
            Spec::Import(spec) => spec,
            Spec::Value(spec) => spec,
            Spec::Type(spec) => spec,
        }
    }
}

impl Node for File {
    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> &Span {
        &self.span
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::File
    }

    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn Node)) {
        f(&self.package);
        for decl in &self.decls {
            f(decl.as_node());
        }
    }
}

impl Node for Ident {
    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> &Span {
        &self.span
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Expr
    }

    fn for_each_child<'a>(&'a self, _f: &mut dyn FnMut(&'a dyn Node)) {}
}

impl Node for BasicLit {
    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> &Span {
        &self.span
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Expr
    }

    fn for_each_child<'a>(&'a self, _f: &mut dyn FnMut(&'a dyn Node)) {}
}

impl Node for GenDecl {
    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> &Span {
        &self.span
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Decl
    }

    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn Node)) {
        for spec in &self.specs {
            f(spec.as_node());
        }
    }

    fn as_gen_decl(&self) -> Option<&GenDecl> {
        Some(self)
    }
}

impl Node for FuncDecl {
    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> &Span {
        &self.span
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Decl
    }

    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn Node)) {
        if let Some(recv) = &self.recv {
            f(recv);
        }
        f(&self.name);
        f(&self.ty);
        if let Some(body) = &self.body {
            f(body);
        }
    }
}

impl Node for ImportSpec {
    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> &Span {
        &self.span
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Spec
    }

    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn Node)) {
        if let Some(name) = &self.name {
            f(name);
        }
        f(&self.path);
    }
}

impl Node for ValueSpec {
    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> &Span {
        &self.span
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Spec
    }

    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn Node)) {
        for name in &self.names {
            f(name);
        }
        if let Some(ty) = &self.ty {
            f(ty);
        }
        for value in &self.values {
            f(value);
        }
    }
}

impl Node for TypeSpec {
    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> &Span {
        &self.span
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Spec
    }

    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn Node)) {
        f(&self.name);
        if let Some(params) = &self.type_params {
            f(params);
        }
        f(&self.ty);
    }
}

impl Node for FuncType {
    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> &Span {
        &self.span
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Expr
    }

    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn Node)) {
        if let Some(params) = &self.type_params {
            f(params);
        }
        f(&self.params);
        if let Some(results) = &self.results {
            f(results);
        }
    }
}

impl Node for FieldList {
    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> &Span {
        &self.span
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Other
    }

    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn Node)) {
        for field in &self.fields {
            f(field);
        }
    }
}

impl Node for Field {
    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> &Span {
        &self.span
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Field
    }

    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn Node)) {
        for name in &self.names {
            f(name);
        }
        f(&self.ty);
        if let Some(tag) = &self.tag {
            f(tag);
        }
    }
}

impl Node for BlockStmt {
    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> &Span {
        &self.span
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Stmt
    }

    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn Node)) {
        for stmt in &self.stmts {
            f(stmt);
        }
    }
}

impl Node for Expr {
    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> &Span {
        &self.span
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Expr
    }

    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn Node)) {
        match &self.kind {
            ExprKind::Ident(_) | ExprKind::BasicLit(_) => {}
            ExprKind::CompositeLit { ty, elts } => {
                if let Some(ty) = ty {
                    f(ty.as_ref());
                }
                for elt in elts {
                    f(elt);
                }
            }
            ExprKind::FuncLit { ty, body } => {
                f(ty);
                f(body);
            }
            ExprKind::Paren(inner)
            | ExprKind::Star(inner)
            | ExprKind::Unary { expr: inner, .. } => f(inner.as_ref()),
            ExprKind::Selector { expr, sel } => {
                f(expr.as_ref());
                f(sel);
            }
            ExprKind::Index { expr, indices } => {
                f(expr.as_ref());
                for index in indices {
                    f(index);
                }
            }
            ExprKind::Slice {
                expr,
                low,
                high,
                max,
            } => {
                f(expr.as_ref());
                for part in [low, high, max].into_iter().flatten() {
                    f(part.as_ref());
                }
            }
            ExprKind::TypeAssert { expr, ty } => {
                f(expr.as_ref());
                if let Some(ty) = ty {
                    f(ty.as_ref());
                }
            }
            ExprKind::Call { func, args, .. } => {
                f(func.as_ref());
                for arg in args {
                    f(arg);
                }
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                f(lhs.as_ref());
                f(rhs.as_ref());
            }
            ExprKind::KeyValue { key, value } | ExprKind::MapType { key, value } => {
                f(key.as_ref());
                f(value.as_ref());
            }
            ExprKind::ArrayType { len, elem } => {
                if let Some(len) = len {
                    f(len.as_ref());
                }
                f(elem.as_ref());
            }
            ExprKind::Ellipsis(elem) => {
                if let Some(elem) = elem {
                    f(elem.as_ref());
                }
            }
            ExprKind::StructType(fields) | ExprKind::InterfaceType(fields) => f(fields),
            ExprKind::FuncType(ty) => ty.for_each_child(f),
            ExprKind::ChanType { value, .. } => f(value.as_ref()),
        }
    }
}

impl Node for Stmt {
    fn id(&self) -> NodeId {
        self.id
    }

    fn span(&self) -> &Span {
        &self.span
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::Stmt
    }

    fn for_each_child<'a>(&'a self, f: &mut dyn FnMut(&'a dyn Node)) {
        match &self.kind {
            StmtKind::Decl(decl) => f(decl.as_node()),
            StmtKind::Empty => {}
            StmtKind::Labeled { label, stmt } => {
                f(label);
                f(stmt.as_ref());
            }
            StmtKind::Expr(expr) | StmtKind::Go(expr) | StmtKind::Defer(expr) => f(expr),
            StmtKind::Send { chan, value } => {
                f(chan);
                f(value);
            }
            StmtKind::IncDec { expr, .. } => f(expr),
            StmtKind::Assign { lhs, rhs, .. } => {
                for expr in lhs.iter().chain(rhs) {
                    f(expr);
                }
            }
            StmtKind::Return(results) => {
                for expr in results {
                    f(expr);
                }
            }
            StmtKind::Branch { label, .. } => {
                if let Some(label) = label {
                    f(label);
                }
            }
            StmtKind::Block(block) => block.for_each_child(f),
            StmtKind::If {
                init,
                cond,
                then,
                els,
            } => {
                if let Some(init) = init {
                    f(init.as_ref());
                }
                f(cond);
                f(then);
                if let Some(els) = els {
                    f(els.as_ref());
                }
            }
            StmtKind::CaseClause { list, body } => {
                for expr in list {
                    f(expr);
                }
                for stmt in body {
                    f(stmt);
                }
            }
            StmtKind::Switch { init, tag, body } => {
                if let Some(init) = init {
                    f(init.as_ref());
                }
                if let Some(tag) = tag {
                    f(tag);
                }
                f(body);
            }
            StmtKind::TypeSwitch { init, assign, body } => {
                if let Some(init) = init {
                    f(init.as_ref());
                }
                f(assign.as_ref());
                f(body);
            }
            StmtKind::CommClause { comm, body } => {
                if let Some(comm) = comm {
                    f(comm.as_ref());
                }
                for stmt in body {
                    f(stmt);
                }
            }
            StmtKind::Select(body) => f(body),
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                if let Some(init) = init {
                    f(init.as_ref());
                }
                if let Some(cond) = cond {
                    f(cond);
                }
                if let Some(post) = post {
                    f(post.as_ref());
                }
                f(body);
            }
            StmtKind::Range {
                key,
                value,
                expr,
                body,
                ..
            } => {
                if let Some(key) = key {
                    f(key);
                }
                if let Some(value) = value {
                    f(value);
                }
                f(expr);
                f(body);
            }
        }
    }
}
