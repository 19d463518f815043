//! Error code registry and report rendering

use std::fmt;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::annotation::parse_comment;
use crate::comments::CommentIndex;
use crate::config::Config;
use crate::error::LoadError;
use crate::package::load_package;

/// Report text when no error code was found
pub const EMPTY_REPORT: &str = "200正常,其他错误";

/// First line of a non-empty report
pub const REPORT_HEADER: &str = "错误代码:";

/// One documented error code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrCode {
    /// Exact literal text of the constant's value
    pub code: String,
    pub name: String,
    pub message: String,
}

impl ErrCode {
    pub fn new(code: impl Into<String>, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {} {}", self.code, self.name, self.message)
    }
}

/// The error codes of one package, in discovery order.
///
/// Rendering sorts by code text. Codes that compare equal keep their
/// discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrCodes {
    codes: Vec<ErrCode>,
}

impl ErrCodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrCode> {
        self.codes.iter()
    }

    /// Codes in report order
    pub fn sorted(&self) -> Vec<&ErrCode> {
        let mut sorted: Vec<&ErrCode> = self.codes.iter().collect();
        sorted.sort_by(|a, b| a.code.cmp(&b.code));
        sorted
    }

    /// Render the sorted codes as a JSON array
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.sorted())
    }
}

impl FromIterator<ErrCode> for ErrCodes {
    fn from_iter<I: IntoIterator<Item = ErrCode>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ErrCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(EMPTY_REPORT);
        }

        writeln!(f, "{REPORT_HEADER}")?;
        for code in self.sorted() {
            writeln!(f, " - {code}")?;
        }
        Ok(())
    }
}

/// Collect the documented error codes of the Go package in `dir`
pub fn collect_err_codes(dir: &Path, config: &Config) -> Result<ErrCodes, LoadError> {
    let package = load_package(dir)?;
    let indexes: Vec<CommentIndex<'_>> = package
        .files
        .iter()
        .map(|file| CommentIndex::build(&file.ast))
        .collect();

    let codes: ErrCodes = package
        .constants
        .iter()
        .filter(|c| config.qualifies(&c.name))
        .map(|constant| {
            let doc = indexes[constant.file].doc_of(constant.ident, &config.directive_markers);
            let annotation = parse_comment(&doc, &constant.name);
            debug!(
                name = constant.name.as_str(),
                description = annotation.description.as_str();
                "Documented error code"
            );
            ErrCode::new(
                constant.value.exact_string(),
                constant.name.clone(),
                annotation.message,
            )
        })
        .collect();

    Ok(codes)
}

/// Render the error code report of the Go package in `dir`
pub fn load_err_codes(dir: &Path) -> Result<String, LoadError> {
    collect_err_codes(dir, &Config::default()).map(|codes| codes.to_string())
}
