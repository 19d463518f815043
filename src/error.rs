//! Error types for errdoc operations.
//!
//! [`LoadError`] covers everything that can stop a directory from being
//! turned into a report. The variants are checked in declaration order and
//! are mutually exclusive.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostics::DiagnosticBag;

/// The main error type for loading error codes from a directory.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum LoadError {
    #[error("error dir not exist: {}", .0.display())]
    #[diagnostic(
        code(errdoc::dir_not_found),
        help("pass the directory of a Go package")
    )]
    DirNotFound(PathBuf),

    #[error("import error: no import path for {}", .0.display())]
    #[diagnostic(
        code(errdoc::import_resolution),
        help("run inside a Go module (a tree with go.mod) or below $GOPATH/src")
    )]
    ImportResolution(PathBuf),

    #[error("load error: {message}")]
    #[diagnostic(code(errdoc::load))]
    Load {
        message: String,
        diagnostics: DiagnosticBag,
    },

    #[error("I/O error on {}: {source}", path.display())]
    #[diagnostic(code(errdoc::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    /// Create a `Load` error from front-end diagnostics
    pub fn load(diagnostics: DiagnosticBag) -> Self {
        let message = match diagnostics.diagnostics().first() {
            Some(first) if diagnostics.error_count() > 1 => {
                format!("{} (and {} more errors)", first, diagnostics.error_count() - 1)
            }
            Some(first) => first.to_string(),
            None => "package could not be loaded".to_string(),
        };
        Self::Load {
            message,
            diagnostics,
        }
    }

    /// Create an `Io` error for the given path
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Front-end diagnostics carried by a `Load` error
    pub fn diagnostics(&self) -> Option<&DiagnosticBag> {
        match self {
            Self::Load { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }
}
