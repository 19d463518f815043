//! Go package loading
//!
//! Turns a directory into a [`Package`]: the directory is checked, mapped to
//! an import path, its eligible `.go` files are parsed, and every constant
//! declaration (package-level and function-local) is evaluated.

pub mod consteval;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, info, warn};
use regex::Regex;

use crate::diagnostics::{error_codes::constants, error_codes::load, Diagnostic, DiagnosticBag};
use crate::diagnostics::{Note, Span};
use crate::error::LoadError;
use crate::parser::{self, ast::*, visit};

pub use consteval::ConstValue;
use consteval::Evaluator;

/// A parsed source file of the package
#[derive(Debug, Clone)]
pub struct GoFile {
    pub path: PathBuf,
    pub ast: File,
}

/// Raw content of an eligible source file
#[derive(Debug, Clone)]
pub struct GoSource {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// A constant declared somewhere in the package
#[derive(Debug, Clone)]
pub struct ResolvedConst {
    pub name: String,
    /// The defining identifier
    pub ident: NodeId,
    pub span: Span,
    /// Index into [`Package::files`]
    pub file: usize,
    pub value: ConstValue,
}

/// One loaded Go package
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub import_path: String,
    pub dir: PathBuf,
    pub files: Vec<GoFile>,
    /// Every constant, in source order
    pub constants: Vec<ResolvedConst>,
}

/// Load the Go package in `dir`
pub fn load_package(dir: &Path) -> Result<Package, LoadError> {
    check_dir(dir)?;
    let dir = std::fs::canonicalize(dir).map_err(|e| LoadError::io(dir, e))?;
    let import_path = resolve_import_path(&dir)?;
    debug!(import_path = import_path.as_str(); "Resolved import path");

    let sources = collect_go_files(&dir)?;
    if sources.is_empty() {
        return Err(LoadError::load(DiagnosticBag::from(
            Diagnostic::error(load::NO_GO_FILES)
                .message(format!("no buildable Go source files in {}", dir.display()))
                .span(Span::file(&dir))
                .build(),
        )));
    }

    let mut files = Vec::with_capacity(sources.len());
    let mut errors = DiagnosticBag::new();
    for GoSource { path, bytes } in sources {
        debug!(path:? = path; "Parsing");
        match parser::parse_bytes(&bytes, &path) {
            Ok(ast) => files.push(GoFile { path, ast }),
            Err(bag) => errors.merge(bag),
        }
    }
    if errors.has_errors() {
        return Err(LoadError::load(errors));
    }

    let name = package_name(&files)?;
    let constants = resolve_constants(&files);
    info!(
        package = name.as_str(),
        files = files.len(),
        constants = constants.len();
        "Loaded package"
    );

    Ok(Package {
        name,
        import_path,
        dir,
        files,
        constants,
    })
}

fn check_dir(dir: &Path) -> Result<(), LoadError> {
    match std::fs::metadata(dir) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(LoadError::DirNotFound(dir.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(LoadError::DirNotFound(dir.to_path_buf()))
        }
        Err(e) => Err(LoadError::io(dir, e)),
    }
}

fn module_directive() -> &'static Regex {
    static MODULE: OnceLock<Regex> = OnceLock::new();
    MODULE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*module\s+"?([^"\s]+)"?"#)
            .expect("module directive pattern is valid")
    })
}

/// Import path of an absolute directory: its go.mod module path plus the
/// relative directory, or its location below `$GOPATH/src`.
pub fn resolve_import_path(dir: &Path) -> Result<String, LoadError> {
    for root in dir.ancestors() {
        let go_mod = root.join("go.mod");
        if !go_mod.is_file() {
            continue;
        }

        let content = std::fs::read_to_string(&go_mod).map_err(|e| LoadError::io(&go_mod, e))?;
        let Some(module) = module_directive()
            .captures(&content)
            .and_then(|caps| caps.get(1))
        else {
            warn!(path:? = go_mod; "go.mod has no module directive");
            return Err(LoadError::ImportResolution(dir.to_path_buf()));
        };

        let relative = dir.strip_prefix(root).unwrap_or(Path::new(""));
        return Ok(join_import_path(module.as_str(), relative));
    }

    for gopath in gopath_roots() {
        let src = gopath.join("src");
        if let Ok(relative) = dir.strip_prefix(&src) {
            if relative.as_os_str().is_empty() {
                continue;
            }
            return Ok(join_import_path("", relative));
        }
    }

    Err(LoadError::ImportResolution(dir.to_path_buf()))
}

fn gopath_roots() -> Vec<PathBuf> {
    match std::env::var_os("GOPATH") {
        Some(value) if !value.is_empty() => std::env::split_paths(&value).collect(),
        _ => std::env::var_os("HOME")
            .map(|home| vec![PathBuf::from(home).join("go")])
            .unwrap_or_default(),
    }
}

fn join_import_path(base: &str, relative: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !base.is_empty() {
        parts.push(base.to_string());
    }
    parts.extend(
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

fn build_ignore() -> &'static Regex {
    static IGNORE: OnceLock<Regex> = OnceLock::new();
    IGNORE.get_or_init(|| {
        Regex::new(r"^//\s*(go:build|\+build)\s.*\bignore\b")
            .expect("build constraint pattern is valid")
    })
}

/// Whether a file opts out of the build with an `ignore` constraint in its
/// header (the lines before the package clause)
fn has_ignore_constraint(content: &[u8]) -> bool {
    String::from_utf8_lossy(content)
        .lines()
        .map(str::trim)
        .take_while(|line| !line.starts_with("package"))
        .any(|line| build_ignore().is_match(line))
}

/// Eligible `.go` files of a directory with their content, sorted by name
pub fn collect_go_files(dir: &Path) -> Result<Vec<GoSource>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|e| LoadError::io(dir, e))?;
    let mut sources = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| LoadError::io(dir, e))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if !name.ends_with(".go")
            || name.ends_with("_test.go")
            || name.starts_with('.')
            || name.starts_with('_')
            || !path.is_file()
        {
            continue;
        }

        let bytes = std::fs::read(&path).map_err(|e| LoadError::io(&path, e))?;
        if has_ignore_constraint(&bytes) {
            debug!(path:? = path; "Skipping file with ignore constraint");
            continue;
        }

        sources.push(GoSource { path, bytes });
    }

    sources.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(sources)
}

fn package_name(files: &[GoFile]) -> Result<String, LoadError> {
    let Some(first) = files.first() else {
        return Err(LoadError::load(DiagnosticBag::new()));
    };
    let name = &first.ast.package.name;

    if let Some(other) = files.iter().find(|f| &f.ast.package.name != name) {
        return Err(LoadError::load(DiagnosticBag::from(
            Diagnostic::error(load::PACKAGE_MISMATCH)
                .message(format!(
                    "found packages {} ({}) and {} ({})",
                    name,
                    first.path.display(),
                    other.ast.package.name,
                    other.path.display()
                ))
                .span(other.ast.package.span.clone())
                .note(Note::new("all files of a directory must declare the same package"))
                .build(),
        )));
    }

    Ok(name.clone())
}

/// Evaluate every constant of the package, in source order
fn resolve_constants(files: &[GoFile]) -> Vec<ResolvedConst> {
    let mut evaluator = Evaluator::new(files.iter().map(|f| &f.ast));
    let mut resolved = Vec::new();

    for (index, file) in files.iter().enumerate() {
        for decl in &file.ast.decls {
            match decl {
                Decl::Gen(decl) if decl.keyword == DeclKeyword::Const => {
                    for (name, _) in consteval::const_defs(decl) {
                        if name.name == "_" {
                            continue;
                        }
                        let value = evaluator
                            .package_const(&name.name)
                            .unwrap_or(ConstValue::Unknown);
                        resolved.push(resolved_const(index, name, value));
                    }
                }
                Decl::Func(func) => {
                    let mut locals = HashMap::new();
                    for local in local_const_decls(func) {
                        for (name, value) in evaluator.local_decl(local, &mut locals) {
                            if name.name != "_" {
                                resolved.push(resolved_const(index, name, value));
                            }
                        }
                    }
                }
                Decl::Gen(_) => {}
            }
        }
    }

    for constant in resolved.iter().filter(|c| !c.value.is_known()) {
        let diagnostic = Diagnostic::warning(constants::UNRESOLVED_CONSTANT)
            .message(format!("constant {} has no exact value", constant.name))
            .span(constant.span.clone())
            .build();
        warn!(code = constants::UNRESOLVED_CONSTANT; "{diagnostic}");
    }

    resolved
}

fn resolved_const(file: usize, name: &Ident, value: ConstValue) -> ResolvedConst {
    debug!(name = name.name.as_str(), value:% = value; "Resolved constant");
    ResolvedConst {
        name: name.name.clone(),
        ident: name.id,
        span: name.span.clone(),
        file,
        value,
    }
}

/// Constant declarations inside a function body, closures included, in
/// source order
fn local_const_decls(func: &FuncDecl) -> Vec<&GenDecl> {
    let mut decls = Vec::new();
    let Some(body) = &func.body else {
        return decls;
    };

    visit::walk(body, &mut |node, _parent| {
        if let Some(decl) = node.as_gen_decl() {
            if decl.keyword == DeclKeyword::Const {
                decls.push(decl);
            }
        }
    });
    decls
}

#[cfg(test)]
mod tests;
