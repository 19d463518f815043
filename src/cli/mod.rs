//! Command-line interface for errdoc
//!
//! `errdoc [OPTIONS] [DIR]` prints the error code report of the Go package
//! in `DIR`.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use log::info;
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::diagnostics::DiagnosticBag;
use crate::error::LoadError;
use crate::report::collect_err_codes;

/// Extract documented error codes from a Go package
#[derive(Parser, Debug)]
#[command(name = "errdoc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory of the Go package
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Print the codes as a JSON array
    #[arg(long)]
    pub json: bool,

    /// Constant name prefix of error codes (overrides the config file)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Failures of a CLI run
#[derive(Debug, Error, miette::Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("could not render JSON: {0}")]
    #[diagnostic(code(errdoc::json))]
    Json(#[from] serde_json::Error),
}

impl Cli {
    /// Effective configuration: the config file, if any, with flags applied
    pub fn config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        Ok(config)
    }
}

/// Run errdoc and return the text to print
pub fn run(cli: &Cli) -> Result<String, CliError> {
    let config = cli.config()?;
    info!(
        dir:? = cli.dir,
        prefix = config.prefix.as_str();
        "Collecting error codes"
    );

    let codes = collect_err_codes(&cli.dir, &config)?;
    info!(count = codes.len(); "Collected error codes");

    if cli.json {
        Ok(codes.to_json()?)
    } else {
        Ok(codes.to_string())
    }
}

/// Source diagnostics with the offending lines, read back from disk
pub fn render_diagnostics(diagnostics: &DiagnosticBag) -> String {
    diagnostics.format_text(|path| {
        fs::read(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default()
    })
}
