use super::*;
use std::path::PathBuf;

fn parse(source: &str) -> File {
    let result = parse_source(source, &PathBuf::from("codes.go"));
    match result {
        Ok(file) => file,
        Err(errors) => panic!("Parse error: {}", errors.format_text(|_| source.to_string())),
    }
}

#[test]
fn test_parse_package_clause() {
    let file = parse("package errs\n");
    assert_eq!(file.package.name, "errs");
    assert!(file.decls.is_empty());
}

#[test]
fn test_parse_grouped_constants() {
    let file = parse(
        r#"package errs

const (
	// ErrCodeNotFound resource missing
	ErrCodeNotFound = 404
	ErrCodeGone, ErrCodeTeapot = 410, 418
)
"#,
    );

    let Decl::Gen(decl) = &file.decls[0] else {
        panic!("expected a generic declaration");
    };
    assert_eq!(decl.keyword, DeclKeyword::Const);
    assert!(decl.grouped);
    assert_eq!(decl.specs.len(), 2);

    let Spec::Value(spec) = &decl.specs[1] else {
        panic!("expected a value spec");
    };
    let names: Vec<_> = spec.names.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["ErrCodeGone", "ErrCodeTeapot"]);
    assert_eq!(spec.values.len(), 2);
}

#[test]
fn test_parse_imports_and_functions() {
    let source = r#"package server

import (
	"errors"
	stdfmt "fmt"
)

type Handler func(w Writer, r *Request) error

type Stack[T any] struct {
	items []T
	sync.Mutex
	name string `json:"name"`
}

func (s *Stack[T]) Push(v T) {
	s.items = append(s.items, v)
}

func Lookup(codes map[string]int, key string) (int, bool) {
	const local = 3
	if v, ok := codes[key]; ok {
		return v + local, true
	}
	for i, c := range codes {
		_ = i
		_ = c
	}
	for i := 0; i < 10; i++ {
		continue
	}
	switch x := interface{}(key).(type) {
	case string, nil:
		_ = x
	default:
	}
	return 0, errors.New("missing") == nil
}
"#;
    let file = parse(source);
    assert_eq!(file.decls.len(), 5);
    assert!(matches!(&file.decls[4], Decl::Func(f) if f.name.name == "Lookup"));
}

#[test]
fn test_parse_composite_literals_and_closures() {
    let source = r#"package main

var table = []struct {
	code int
	name string
}{
	{404, "not found"},
	{code: 500, name: "internal"},
}

func run() {
	done := make(chan struct{})
	go func() {
		defer close(done)
		select {
		case v := <-done:
			_ = v
		default:
		}
	}()
	if len(table) > 0 {
		<-done
	}
}
"#;
    let file = parse(source);
    assert_eq!(file.decls.len(), 2);
}

#[test]
fn test_parse_generic_constraints() {
    let source = r#"package num

type Number interface {
	~int | ~int64 | float64
	String() string
}

func Sum[T Number](xs ...T) (total T) {
	for _, x := range xs {
		total += x
	}
	return
}
"#;
    let file = parse(source);
    assert_eq!(file.decls.len(), 2);
}

#[test]
fn test_parse_array_type_declaration() {
    let file = parse("package a\n\ntype Buf [N]byte\n\nconst N = 4\n");
    let Decl::Gen(decl) = &file.decls[0] else {
        panic!("expected a generic declaration");
    };
    let Spec::Type(spec) = &decl.specs[0] else {
        panic!("expected a type spec");
    };
    assert!(spec.type_params.is_none());
    assert!(matches!(spec.ty.kind, ExprKind::ArrayType { .. }));
}

#[test]
fn test_comment_groups_attached_to_file() {
    let file = parse(
        "// Package errs holds codes.\npackage errs\n\n// doc\nconst X = 1 // trailing\n",
    );
    assert_eq!(file.comments.len(), 3);
    assert_eq!(file.comments[0].comments[0].text, "// Package errs holds codes.");
}

#[test]
fn test_missing_package_clause() {
    let result = parse_source("const X = 1\n", &PathBuf::from("codes.go"));
    let errors = result.err().expect("should fail");
    assert_eq!(
        errors.diagnostics()[0].code,
        crate::diagnostics::syntax::MISSING_PACKAGE_CLAUSE
    );
}

#[test]
fn test_syntax_error_reports_position() {
    let source = "package a\n\nconst X = )\n";
    let result = parse_source(source, &PathBuf::from("codes.go"));
    let errors = result.err().expect("should fail");
    assert!(errors.has_errors());
    assert_eq!(errors.diagnostics()[0].span.start_line, 3);
}

#[test]
fn test_misplaced_import() {
    let source = "package a\n\nconst X = 1\n\nimport \"fmt\"\n";
    let result = parse_source(source, &PathBuf::from("codes.go"));
    let errors = result.err().expect("should fail");
    assert_eq!(
        errors.diagnostics()[0].code,
        crate::diagnostics::syntax::MISPLACED_IMPORT
    );
}

#[test]
fn test_invalid_utf8_is_a_syntax_error() {
    let source = b"package errs\n\n// caf\xe9\nconst ErrCodeA = 1\n";
    let errors = parse_bytes(source, &PathBuf::from("codes.go")).expect_err("should fail");
    let diagnostic = &errors.diagnostics()[0];
    assert_eq!(diagnostic.code, crate::diagnostics::syntax::INVALID_UTF8);
    assert_eq!(diagnostic.span.start_line, 3);
    assert_eq!(diagnostic.span.start_col, 7);
}

#[test]
fn test_parse_bytes_accepts_utf8() {
    let file = parse_bytes("package errs\n\n// café\n".as_bytes(), &PathBuf::from("codes.go"))
        .expect("valid source");
    assert_eq!(file.package.name, "errs");
}

/// Parse on a thread with room for deep recursion
fn parse_deep(source: String) -> Result<File, DiagnosticBag> {
    std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || parse_source(&source, &PathBuf::from("codes.go")))
        .expect("spawn parser thread")
        .join()
        .expect("parser thread")
}

fn nested_parens(depth: usize) -> String {
    format!(
        "package errs\n\nvar x = {}1{}\n",
        "(".repeat(depth),
        ")".repeat(depth)
    )
}

#[test]
fn test_deep_nesting_is_a_syntax_error() {
    let errors = parse_deep(nested_parens(300)).expect_err("should fail");
    assert_eq!(
        errors.diagnostics()[0].code,
        crate::diagnostics::syntax::NESTING_TOO_DEEP
    );

    let source = format!("package errs\n\nconst X = {}1\n", "^".repeat(500));
    let errors = parse_deep(source).expect_err("should fail");
    assert_eq!(
        errors.diagnostics()[0].code,
        crate::diagnostics::syntax::NESTING_TOO_DEEP
    );
}

#[test]
fn test_moderate_nesting_parses() {
    let file = parse_deep(nested_parens(40)).expect("should parse");
    assert_eq!(file.decls.len(), 1);
}
