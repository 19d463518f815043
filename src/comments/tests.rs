use super::*;
use crate::parser::ast::{Comment, Decl, ExprKind, Spec, Stmt, StmtKind};
use crate::parser::parse_source;
use crate::diagnostics::Span;
use pretty_assertions::assert_eq;
use std::path::Path;

fn parse(source: &str) -> File {
    match parse_source(source, Path::new("codes.go")) {
        Ok(file) => file,
        Err(errors) => panic!("Parse error: {}", errors.format_text(|_| source.to_string())),
    }
}

/// Identifiers of every package-level constant, by name
fn const_idents(file: &File) -> Vec<(String, NodeId)> {
    let mut idents = Vec::new();
    for decl in &file.decls {
        let Decl::Gen(decl) = decl else {
            continue;
        };
        for spec in &decl.specs {
            if let Spec::Value(spec) = spec {
                idents.extend(spec.names.iter().map(|n| (n.name.clone(), n.id)));
            }
        }
    }
    idents
}

fn doc(file: &File, name: &str) -> String {
    let index = CommentIndex::build(file);
    let (_, id) = const_idents(file)
        .into_iter()
        .find(|(n, _)| n == name)
        .unwrap_or_else(|| panic!("no constant {name}"));
    index.doc_of(id, &["go:generate".to_string()])
}

fn group(lines: &[&str]) -> CommentGroup {
    CommentGroup {
        id: NodeId::new(),
        span: Span::file("codes.go"),
        comments: lines
            .iter()
            .map(|text| Comment {
                text: text.to_string(),
                span: Span::file("codes.go"),
            })
            .collect(),
    }
}

#[test]
fn test_doc_above_single_declaration() {
    let file = parse(
        "package errs\n\n// ErrCodeA first\n// @message a msg\nconst ErrCodeA = 1\n",
    );
    assert_eq!(doc(&file, "ErrCodeA"), "ErrCodeA first\n@message a msg");
}

#[test]
fn test_doc_inside_group_and_trailing() {
    let file = parse(
        r#"package errs

// codes of the errs package
const (
	// ErrCodeB doc
	ErrCodeB = 2
	ErrCodeC = 3 // trailing C
	ErrCodeD = 4
)
"#,
    );
    assert_eq!(doc(&file, "ErrCodeB"), "ErrCodeB doc");
    assert_eq!(doc(&file, "ErrCodeC"), "trailing C");
    assert_eq!(doc(&file, "ErrCodeD"), "codes of the errs package");
}

#[test]
fn test_comment_after_blank_line_belongs_to_previous() {
    let file = parse(
        "package errs\n\nconst ErrCodeD = 4\n// floating after D\n\nconst ErrCodeE = 5\n",
    );
    assert_eq!(doc(&file, "ErrCodeD"), "floating after D");
    assert_eq!(doc(&file, "ErrCodeE"), "");
}

#[test]
fn test_comment_directly_before_next_decl() {
    let file = parse(
        "package errs\n\nconst ErrCodeD = 4\n// ErrCodeE doc\nconst ErrCodeE = 5\n",
    );
    assert_eq!(doc(&file, "ErrCodeD"), "");
    assert_eq!(doc(&file, "ErrCodeE"), "ErrCodeE doc");
}

#[test]
fn test_multiple_groups_joined_in_order() {
    let file = parse(
        r#"package errs

const (
	// ErrCodeF first
	ErrCodeF = 6 // second
)
"#,
    );
    assert_eq!(doc(&file, "ErrCodeF"), "ErrCodeF first\n\nsecond");
}

#[test]
fn test_generate_directives_dropped() {
    let file = parse(
        "package errs\n\n//go:generate stringer -type=Code\n// go:generate echo\n// ErrCodeG doc\nconst ErrCodeG = 7\n",
    );
    assert_eq!(doc(&file, "ErrCodeG"), "ErrCodeG doc");
}

#[test]
fn test_package_comment_attached_to_file() {
    let file = parse("// Package errs holds codes.\npackage errs\n\nconst ErrCodeH = 8\n");
    let index = CommentIndex::build(&file);
    let groups = index.comments_of(file.id);
    assert_eq!(groups.len(), 1);
    assert_eq!(stringify(&groups, &[]), "Package errs holds codes.");
    assert_eq!(doc(&file, "ErrCodeH"), "");
}

#[test]
fn test_local_constant_in_group() {
    let file = parse(
        r#"package errs

func handler() {
	const (
		// ErrCodeLocal local doc
		ErrCodeLocal = 9
	)
	_ = ErrCodeLocal
}
"#,
    );
    let Decl::Func(func) = &file.decls[0] else {
        panic!("expected a function");
    };
    let body = func.body.as_ref().expect("body");
    let StmtKind::Decl(Decl::Gen(decl)) = &body.stmts[0].kind else {
        panic!("expected a declaration statement");
    };
    let Spec::Value(spec) = &decl.specs[0] else {
        panic!("expected a value spec");
    };

    let index = CommentIndex::build(&file);
    assert_eq!(index.doc_of(spec.names[0].id, &[]), "ErrCodeLocal local doc");
}

/// Statements of the body of the first function in the file
fn body_stmts(file: &File) -> &[Stmt] {
    let Some(Decl::Func(func)) = file.decls.first() else {
        panic!("expected a function");
    };
    &func.body.as_ref().expect("body").stmts
}

#[test]
fn test_single_local_constant_comment_stays_on_statement() {
    let file = parse(
        r#"package errs

func handler() {
	// ErrCodeLocal local doc
	const ErrCodeLocal = 9
}
"#,
    );
    let stmt = &body_stmts(&file)[0];
    let StmtKind::Decl(Decl::Gen(decl)) = &stmt.kind else {
        panic!("expected a declaration statement");
    };
    let Spec::Value(spec) = &decl.specs[0] else {
        panic!("expected a value spec");
    };

    let index = CommentIndex::build(&file);
    assert_eq!(stringify(&index.comments_of(stmt.id), &[]), "ErrCodeLocal local doc");
    assert!(index.comments_of(decl.id).is_empty());
    assert_eq!(index.doc_of(spec.names[0].id, &[]), "");
}

#[test]
fn test_equal_distance_prefers_innermost_candidate() {
    let file = parse("package errs\n\nfunc handler() {\n\tconst ErrCodeLocal = 9\n}\n");
    let stmt = &body_stmts(&file)[0];
    let StmtKind::Decl(Decl::Gen(decl)) = &stmt.kind else {
        panic!("expected a declaration statement");
    };
    assert_eq!(stmt.span.start, decl.span.start);

    let index = CommentIndex::build(&file);
    assert_eq!(index.enclosing(decl), Some(decl.id));
}

#[test]
fn test_expression_resolves_through_statement() {
    let file = parse(
        r#"package errs

func handler() {
	// report the failure
	report(ErrCodeA)
}
"#,
    );
    let stmt = &body_stmts(&file)[0];
    let StmtKind::Expr(call) = &stmt.kind else {
        panic!("expected an expression statement");
    };
    let ExprKind::Call { args, .. } = &call.kind else {
        panic!("expected a call");
    };

    let index = CommentIndex::build(&file);
    assert_eq!(index.enclosing(&args[0]), Some(stmt.id));
    assert_eq!(index.doc_of(args[0].id, &[]), "report the failure");
    assert_eq!(index.doc_of(call.id, &[]), "report the failure");
}

#[test]
fn test_every_name_of_a_spec_shares_its_doc() {
    let file = parse(
        r#"package errs

// auth codes
const (
	ErrCodeA, ErrCodeB = 1, 2
	// paired codes
	ErrCodeC, ErrCodeD = 3, 4
)
"#,
    );
    assert_eq!(doc(&file, "ErrCodeA"), "auth codes");
    assert_eq!(doc(&file, "ErrCodeB"), "auth codes");
    assert_eq!(doc(&file, "ErrCodeC"), "paired codes");
    assert_eq!(doc(&file, "ErrCodeD"), "paired codes");
}

#[test]
fn test_unknown_node_has_no_comments() {
    let file = parse("package errs\n\n// doc\nconst ErrCodeA = 1\n");
    let index = CommentIndex::build(&file);
    assert!(index.comments_of(NodeId::new()).is_empty());
}

#[test]
fn test_group_text_strips_markers() {
    let text = group_text(&group(&["// first line", "//second", "/* block\n   body */"]));
    assert_eq!(text, "first line\nsecond\n block\n   body\n");
}

#[test]
fn test_group_text_collapses_blank_lines() {
    let text = group_text(&group(&["//", "// a", "//", "//", "// b", "//"]));
    assert_eq!(text, "a\n\nb\n");
}

#[test]
fn test_group_text_drops_directives() {
    let text = group_text(&group(&[
        "//go:noinline",
        "//line codes.go:10",
        "//export Handler",
        "// kept",
        "//nolint:errcheck",
        "//TODO: not a directive",
    ]));
    assert_eq!(text, "kept\nTODO: not a directive\n");
}

#[test]
fn test_group_text_empty() {
    assert_eq!(group_text(&group(&["//", "/**/"])), "");
}

#[test]
fn test_stringify_trims_and_filters() {
    let first = group(&["//  padded  "]);
    let second = group(&["// go:generate run", "// tail"]);
    let text = stringify(&[&first, &second], &["go:generate".to_string()]);
    assert_eq!(text, "padded\n\ntail");
}
