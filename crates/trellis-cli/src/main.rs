//! `trellis` binary: renders the MediaCMS blueprints.

use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, debug, error, info};
use miette::GraphicalReportHandler;

use trellis::TrellisError;
use trellis_cli::{Args, error_adapter::ErrorAdapter};

fn main() -> ExitCode {
    miette::set_panic_hook();

    let args = Args::parse();
    let level = init_logging(&args.log_level);
    info!(level:?; "Starting trellis");
    debug!(args:?; "Parsed arguments");

    match trellis_cli::run(&args) {
        Ok(()) => {
            info!("All diagrams rendered");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", report(&err));
            ExitCode::FAILURE
        }
    }
}

/// Installs the logger; an unparsable level falls back to `warn`.
fn init_logging(level: &str) -> LevelFilter {
    let filter = level.parse().unwrap_or_else(|_| {
        eprintln!("Unknown log level `{level}`, falling back to `warn`");
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(filter)
        .format_timestamp(None)
        .init();
    filter
}

/// Renders `err` with its diagnostic code and help, or plain text if the
/// graphical report cannot be produced.
fn report(err: &TrellisError) -> String {
    let mut out = String::new();
    match GraphicalReportHandler::new().render_report(&mut out, &ErrorAdapter(err)) {
        Ok(()) => out,
        Err(_) => err.to_string(),
    }
}
