use super::*;
use std::fs;
use tempfile::TempDir;

fn module(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("go.mod"), "module example.com/errs\n\ngo 1.21\n").expect("go.mod");
    for (name, content) in files {
        fs::write(dir.path().join(name), content).expect("source file");
    }
    dir
}

fn values(package: &Package) -> Vec<(String, String)> {
    package
        .constants
        .iter()
        .map(|c| (c.name.clone(), c.value.exact_string()))
        .collect()
}

#[test]
fn test_load_simple_package() {
    let dir = module(&[(
        "codes.go",
        "package errs\n\nconst (\n\tErrCodeA = 1001\n\tErrCodeB = \"b\"\n)\n",
    )]);
    let package = load_package(dir.path()).expect("load");

    assert_eq!(package.name, "errs");
    assert_eq!(package.import_path, "example.com/errs");
    assert_eq!(package.files.len(), 1);
    assert_eq!(
        values(&package),
        vec![
            ("ErrCodeA".to_string(), "1001".to_string()),
            ("ErrCodeB".to_string(), "\"b\"".to_string()),
        ]
    );
}

#[test]
fn test_import_path_of_subdirectory() {
    let dir = module(&[]);
    let sub = dir.path().join("internal").join("codes");
    fs::create_dir_all(&sub).expect("subdir");
    fs::write(sub.join("codes.go"), "package codes\n").expect("source file");

    let package = load_package(&sub).expect("load");
    assert_eq!(package.import_path, "example.com/errs/internal/codes");
}

#[test]
fn test_quoted_module_directive() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("go.mod"), "module \"example.com/quoted\"\n").expect("go.mod");
    let root = fs::canonicalize(dir.path()).expect("canonical");
    assert_eq!(
        resolve_import_path(&root).expect("import path"),
        "example.com/quoted"
    );
}

#[test]
fn test_missing_directory() {
    let dir = module(&[]);
    let missing = dir.path().join("nope");
    let err = load_package(&missing).expect_err("should fail");
    assert!(matches!(err, LoadError::DirNotFound(ref path) if path == &missing));
    assert!(err.to_string().starts_with("error dir not exist: "));
}

#[test]
fn test_regular_file_is_not_a_directory() {
    let dir = module(&[("codes.go", "package errs\n")]);
    let err = load_package(&dir.path().join("codes.go")).expect_err("should fail");
    assert!(matches!(err, LoadError::DirNotFound(_)));
}

#[test]
fn test_no_go_files() {
    let dir = module(&[("README.md", "# codes\n")]);
    let err = load_package(dir.path()).expect_err("should fail");
    let diagnostics = err.diagnostics().expect("load diagnostics");
    assert_eq!(diagnostics.diagnostics()[0].code, load::NO_GO_FILES);
}

#[test]
fn test_skips_test_hidden_and_ignored_files() {
    let dir = module(&[
        ("codes.go", "package errs\n\nconst ErrCodeA = 1\n"),
        ("codes_test.go", "package errs_test\n\nconst ErrCodeT = 2\n"),
        ("_draft.go", "package draft\n"),
        (".hidden.go", "not go at all"),
        (
            "gen.go",
            "//go:build ignore\n\npackage main\n\nconst ErrCodeGen = 3\n",
        ),
        ("old.go", "// +build ignore\n\npackage main\n"),
    ]);

    let files = collect_go_files(dir.path()).expect("collect");
    let names: Vec<_> = files
        .iter()
        .filter_map(|s| s.path.file_name().and_then(|n| n.to_str()))
        .collect();
    assert_eq!(names, vec!["codes.go"]);

    let package = load_package(dir.path()).expect("load");
    assert_eq!(values(&package), vec![("ErrCodeA".to_string(), "1".to_string())]);
}

#[test]
fn test_syntax_error_fails_load() {
    let dir = module(&[("codes.go", "package errs\n\nconst ErrCodeA = \n")]);
    let err = load_package(dir.path()).expect_err("should fail");
    assert!(err.to_string().starts_with("load error: "));
    assert!(err.diagnostics().is_some_and(|d| d.has_errors()));
}

#[test]
fn test_invalid_utf8_fails_load() {
    let dir = module(&[("codes.go", "package errs\n\nconst ErrCodeA = 1\n")]);
    fs::write(
        dir.path().join("bad.go"),
        b"package errs\n\n// caf\xe9\nconst ErrCodeB = 2\n",
    )
    .expect("bad source");

    let err = load_package(dir.path()).expect_err("should fail");
    let diagnostics = err.diagnostics().expect("load diagnostics");
    assert_eq!(
        diagnostics.diagnostics()[0].code,
        crate::diagnostics::error_codes::syntax::INVALID_UTF8
    );
    assert!(diagnostics.diagnostics()[0].span.file.ends_with("bad.go"));
}

#[test]
fn test_package_mismatch() {
    let dir = module(&[("a.go", "package one\n"), ("b.go", "package two\n")]);
    let err = load_package(dir.path()).expect_err("should fail");
    let diagnostics = err.diagnostics().expect("load diagnostics");
    assert_eq!(diagnostics.diagnostics()[0].code, load::PACKAGE_MISMATCH);
}

#[test]
fn test_constants_across_files_in_source_order() {
    let dir = module(&[
        ("a.go", "package errs\n\nconst ErrCodeA = ErrCodeBase + 1\n"),
        (
            "b.go",
            "package errs\n\nconst (\n\tErrCodeBase = 2000 + iota\n\tErrCodeNext\n\t_\n\tErrCodeLast\n)\n",
        ),
    ]);
    let package = load_package(dir.path()).expect("load");

    assert_eq!(
        values(&package),
        vec![
            ("ErrCodeA".to_string(), "2001".to_string()),
            ("ErrCodeBase".to_string(), "2000".to_string()),
            ("ErrCodeNext".to_string(), "2001".to_string()),
            ("ErrCodeLast".to_string(), "2003".to_string()),
        ]
    );
    assert_eq!(package.constants[0].file, 0);
    assert_eq!(package.constants[1].file, 1);
}

#[test]
fn test_function_local_constants() {
    let dir = module(&[(
        "codes.go",
        r#"package errs

const ErrCodeBase = 10

func handler() {
	const ErrCodeLocal = ErrCodeBase * 2
	go func() {
		const ErrCodeInner = ErrCodeLocal + 1
	}()
}
"#,
    )]);
    let package = load_package(dir.path()).expect("load");

    assert_eq!(
        values(&package),
        vec![
            ("ErrCodeBase".to_string(), "10".to_string()),
            ("ErrCodeLocal".to_string(), "20".to_string()),
            ("ErrCodeInner".to_string(), "21".to_string()),
        ]
    );
    assert_eq!(package.constants[1].span.start_line, 6);
}

#[test]
fn test_unknown_values_are_kept() {
    let dir = module(&[(
        "codes.go",
        "package errs\n\nimport \"net/http\"\n\nconst ErrCodeHTTP = http.StatusNotFound\n",
    )]);
    let package = load_package(dir.path()).expect("load");
    assert_eq!(
        values(&package),
        vec![("ErrCodeHTTP".to_string(), "unknown".to_string())]
    );
}
