//! Command-line argument definitions for the Trellis CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select which bundled blueprints to render and
//! control the output location and format, configuration file selection, and
//! logging verbosity.

use std::path::PathBuf;

use clap::{Parser, builder::PossibleValuesParser};

use trellis::style::OutputFormat;

use crate::blueprints;

/// Command-line arguments for the Trellis diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Blueprints to render; all of them when omitted
    #[arg(value_parser = PossibleValuesParser::new(blueprints::names()))]
    pub names: Vec<String>,

    /// Print the available blueprints and exit
    #[arg(long)]
    pub list: bool,

    /// Directory receiving the rendered images
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output format (png, jpg, svg, pdf, dot)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
