use super::*;
use crate::parser::parse_source;
use std::path::PathBuf;

fn file(source: &str) -> File {
    match parse_source(source, &PathBuf::from("codes.go")) {
        Ok(file) => file,
        Err(errors) => panic!("Parse error: {}", errors.format_text(|_| source.to_string())),
    }
}

fn eval_all(source: &str, names: &[&str]) -> Vec<String> {
    let file = file(source);
    let mut evaluator = Evaluator::new([&file]);
    names
        .iter()
        .map(|name| {
            evaluator
                .package_const(name)
                .map(|v| v.exact_string())
                .unwrap_or_else(|| "<missing>".to_string())
        })
        .collect()
}

#[test]
fn test_int_literals() {
    assert_eq!(parse_int_lit("404"), Some(404));
    assert_eq!(parse_int_lit("0x1F"), Some(31));
    assert_eq!(parse_int_lit("0o17"), Some(15));
    assert_eq!(parse_int_lit("0755"), Some(493));
    assert_eq!(parse_int_lit("0b101"), Some(5));
    assert_eq!(parse_int_lit("1_000"), Some(1000));
    assert_eq!(parse_int_lit("0"), Some(0));
}

#[test]
fn test_char_literals() {
    assert_eq!(parse_char_lit("'a'"), Some(97));
    assert_eq!(parse_char_lit(r"'\n'"), Some(10));
    assert_eq!(parse_char_lit(r"'\x41'"), Some(65));
    assert_eq!(parse_char_lit(r"'é'"), Some(0xe9));
    assert_eq!(parse_char_lit("'中'"), Some(0x4e2d));
}

#[test]
fn test_string_literals() {
    assert_eq!(
        parse_string_lit(r#""not \"found\"""#),
        Some("not \"found\"".to_string())
    );
    assert_eq!(parse_string_lit("`raw\\n`"), Some("raw\\n".to_string()));
    assert_eq!(parse_string_lit(r#""\101""#), Some("A".to_string()));
}

#[test]
fn test_exact_string() {
    assert_eq!(ConstValue::Int(-7).exact_string(), "-7");
    assert_eq!(
        ConstValue::Str("not found".to_string()).exact_string(),
        "\"not found\""
    );
    assert_eq!(
        ConstValue::Str("a\"b\\c\n".to_string()).exact_string(),
        r#""a\"b\\c\n""#
    );
    assert_eq!(ConstValue::Str("中文".to_string()).exact_string(), "\"中文\"");
    assert_eq!(ConstValue::Bool(true).exact_string(), "true");
    assert_eq!(ConstValue::Unknown.exact_string(), "unknown");
}

#[test]
fn test_iota_and_implicit_repetition() {
    let source = r#"package errs

const (
	ErrCodeBase = iota + 1000
	ErrCodeNext
	_
	ErrCodeLast
)
"#;
    assert_eq!(
        eval_all(source, &["ErrCodeBase", "ErrCodeNext", "ErrCodeLast"]),
        vec!["1000", "1001", "1003"]
    );
}

#[test]
fn test_multiple_names_per_spec() {
    let source = "package errs\n\nconst (\n\tA, B = iota, iota * 10\n\tC, D\n)\n";
    assert_eq!(
        eval_all(source, &["A", "B", "C", "D"]),
        vec!["0", "0", "1", "10"]
    );
}

#[test]
fn test_forward_references_and_conversions() {
    let source = r#"package errs

type Code int
type Label string

const ErrCodeAlias = ErrCodeBase + 4
const ErrCodeBase Code = Code(400)
const ErrCodeShift = 1 << 10
const ErrCodeMask = 0xFF &^ 0x0F
const ErrCodeLen = len("four")
const ErrCodeRune = 'A'
const ErrCodeLabel = Label(66)
const ErrCodeMax = max(3, 9, 4)
"#;
    assert_eq!(
        eval_all(
            source,
            &[
                "ErrCodeAlias",
                "ErrCodeBase",
                "ErrCodeShift",
                "ErrCodeMask",
                "ErrCodeLen",
                "ErrCodeRune",
                "ErrCodeLabel",
                "ErrCodeMax",
            ]
        ),
        vec!["404", "400", "1024", "240", "4", "65", "\"B\"", "9"]
    );
}

#[test]
fn test_typed_integer_constants() {
    let source = r#"package errs

import "time"

type Status uint16

const ErrCodeMax = ^uint32(0)
const ErrCodeSigned = ^int8(0)
const ErrCodeByte = ^byte(0x0F)
const ErrCodeStatus = ^Status(1)
const ErrCodeOverflow = uint8(256)
const ErrCodeNegative = uint32(0) - 1
const ErrCodeWide = uint64(1) << 63
const ErrCodeTooWide = int32(1) << 31
const ErrCodeTimeout = time.Duration(5)
const ErrCodeRemoteMask = ^time.Duration(0)

const (
	ErrCodeFirst Status = iota + 65534
	ErrCodeSecond
	ErrCodeThird
)
"#;
    assert_eq!(
        eval_all(
            source,
            &[
                "ErrCodeMax",
                "ErrCodeSigned",
                "ErrCodeByte",
                "ErrCodeStatus",
                "ErrCodeOverflow",
                "ErrCodeNegative",
                "ErrCodeWide",
                "ErrCodeTooWide",
                "ErrCodeTimeout",
                "ErrCodeRemoteMask",
                "ErrCodeFirst",
                "ErrCodeSecond",
                "ErrCodeThird",
            ]
        ),
        vec![
            "4294967295",
            "-1",
            "240",
            "65534",
            "unknown",
            "unknown",
            "9223372036854775808",
            "unknown",
            "5",
            "unknown",
            "65534",
            "65535",
            "unknown",
        ]
    );
}

#[test]
fn test_untyped_constants_stay_in_128_bits() {
    let source = "package errs\n\nconst Small = 1 << 100 >> 90\nconst Huge = 1 << 200 >> 190\n";
    assert_eq!(eval_all(source, &["Small", "Huge"]), vec!["1024", "unknown"]);
}

#[test]
fn test_strings_and_booleans() {
    let source = r#"package errs

const Prefix = "err: "
const ErrCodeMsg = Prefix + "gone"
const Enabled = 3 > 2 && !false
"#;
    assert_eq!(
        eval_all(source, &["ErrCodeMsg", "Enabled"]),
        vec!["\"err: gone\"", "true"]
    );
}

#[test]
fn test_unsupported_values_are_unknown() {
    let source = r#"package errs

import "net/http"

const ErrCodeFloat = 1.5
const ErrCodeRemote = http.StatusNotFound
const ErrCodeDivZero = 1 / 0
const ErrCodeCycleA = ErrCodeCycleB
const ErrCodeCycleB = ErrCodeCycleA
"#;
    assert_eq!(
        eval_all(
            source,
            &[
                "ErrCodeFloat",
                "ErrCodeRemote",
                "ErrCodeDivZero",
                "ErrCodeCycleA",
                "Missing",
            ]
        ),
        vec!["unknown", "unknown", "unknown", "unknown", "<missing>"]
    );
}

#[test]
fn test_local_constants() {
    let source = r#"package errs

const Base = 100

func handler() {
	const (
		ErrCodeLocal = Base + iota
		ErrCodeLocalNext
	)
}
"#;
    let file = file(source);
    let Decl::Func(func) = &file.decls[1] else {
        panic!("expected a function");
    };
    let Some(body) = &func.body else {
        panic!("expected a body");
    };
    let StmtKind::Decl(Decl::Gen(decl)) = &body.stmts[0].kind else {
        panic!("expected a declaration statement");
    };

    let mut evaluator = Evaluator::new([&file]);
    let mut locals = HashMap::new();
    let values: Vec<_> = evaluator
        .local_decl(decl, &mut locals)
        .into_iter()
        .map(|(name, value)| (name.name.clone(), value.exact_string()))
        .collect();

    assert_eq!(
        values,
        vec![
            ("ErrCodeLocal".to_string(), "100".to_string()),
            ("ErrCodeLocalNext".to_string(), "101".to_string()),
        ]
    );
    assert_eq!(
        locals.get("ErrCodeLocal").map(|c| &c.value),
        Some(&ConstValue::Int(100))
    );
}
