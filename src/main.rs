//! errdoc CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{debug, info, LevelFilter};

use errdoc::cli::{self, Cli, CliError};

fn main() {
    miette::set_panic_hook();

    let args = Cli::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!(args:?; "Parsed arguments");

    match cli::run(&args) {
        Ok(output) => {
            println!("{}", output.trim_end_matches('\n'));
            info!("Completed successfully");
        }
        Err(err) => {
            report(&err, args.json);
            process::exit(1);
        }
    }
}

fn report(err: &CliError, json: bool) {
    let diagnostics = match err {
        CliError::Load(load) => load.diagnostics(),
        _ => None,
    };

    // Source diagnostics go out as JSON for tooling
    if let (true, Some(bag)) = (json, diagnostics) {
        eprintln!("{}", bag.to_json());
        return;
    }

    let reporter = miette::GraphicalReportHandler::new();
    let mut writer = String::new();
    if reporter.render_report(&mut writer, err).is_err() {
        writer = err.to_string();
    }
    eprintln!("{writer}");

    if let Some(bag) = diagnostics {
        eprintln!("{}", cli::render_diagnostics(bag));
    }
}
