//! errdoc
//!
//! Extracts documented error code constants from a Go package and renders
//! them as an error code table.
//!
//! ```no_run
//! let report = errdoc::load_err_codes(std::path::Path::new("./errs"))?;
//! println!("{report}");
//! # Ok::<(), errdoc::LoadError>(())
//! ```

pub mod annotation;
pub mod cli;
pub mod comments;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod package;
pub mod parser;
pub mod report;

pub use config::Config;
pub use error::LoadError;
pub use report::{collect_err_codes, load_err_codes, ErrCode, ErrCodes};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::diagnostics::{Diagnostic, Severity, Span};
    pub use crate::parser::ast::*;
    pub use crate::{Config, ErrCode, ErrCodes, LoadError};
}
