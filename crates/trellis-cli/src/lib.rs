//! CLI logic for the Trellis diagram tool.
//!
//! This module contains the core CLI logic: it loads the configuration,
//! applies command-line overrides, and renders the selected bundled
//! blueprints through a single [`Session`].

pub mod blueprints;
pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use log::info;

use trellis::{
    Session, TrellisError,
    config::{AppConfig, RenderConfig},
};

use blueprints::Blueprint;

/// Run the Trellis CLI application
///
/// Renders every blueprint named in `args` (all of them when none is named)
/// into the output directory, one image per blueprint.
///
/// # Errors
///
/// Returns `TrellisError` for:
/// - Configuration loading errors
/// - Diagram construction errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), TrellisError> {
    if args.list {
        for blueprint in blueprints::all() {
            println!("{:<16}{}", blueprint.name(), blueprint.description());
        }
        return Ok(());
    }

    let app_config = config::load_config(args.config.as_ref())?;
    let app_config = apply_overrides(app_config, args);
    let mut session = Session::new(app_config)?;

    let selected = select(&args.names)?;
    info!(
        count = selected.len(),
        output_dir:? = session.output_dir();
        "Rendering blueprints"
    );

    for blueprint in selected {
        let rendered = blueprint.render(&mut session)?;
        info!(
            blueprint = blueprint.name(),
            path:? = rendered.path();
            "Diagram exported successfully"
        );
    }

    Ok(())
}

/// Command-line flags take precedence over the configuration file.
fn apply_overrides(config: AppConfig, args: &Args) -> AppConfig {
    let render = config.render();
    let overridden = RenderConfig::new(
        render.engine(),
        args.format.unwrap_or(render.format()),
        Some(
            args.output_dir
                .clone()
                .unwrap_or_else(|| render.output_dir().to_path_buf()),
        ),
    );
    config.with_render(overridden)
}

fn select(names: &[String]) -> Result<Vec<&'static Blueprint>, TrellisError> {
    if names.is_empty() {
        return Ok(blueprints::all().iter().collect());
    }
    names
        .iter()
        .map(|name| {
            blueprints::find(name)
                .ok_or_else(|| TrellisError::Config(format!("Unknown blueprint `{name}`")))
        })
        .collect()
}
