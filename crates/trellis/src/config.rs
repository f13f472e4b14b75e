//! Configuration types for Trellis diagram rendering.
//!
//! This module provides configuration structures that control where and how
//! diagrams are rendered. All types implement [`serde::Deserialize`] for
//! flexible loading from external sources such as TOML files.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`RenderConfig`] - Graphviz layout engine, default output format and directory.
//! - [`StyleConfig`] - Curve style and Graphviz attribute overrides.
//! - [`IconConfig`] - Icon root directory and extra taxonomy entries.
//!
//! # Example
//!
//! ```
//! # use trellis::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert_eq!(config.render().engine(), "dot");
//! assert!(config.icons().registry().is_ok());
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use trellis_core::{
    category::IconRegistry,
    style::{CurveStyle, OutputFormat},
};

use crate::error::TrellisError;

/// Attribute overrides, written to the description in insertion order.
pub type Attributes = IndexMap<String, String>;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Render configuration section.
    #[serde(default)]
    render: RenderConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,

    /// Icon configuration section.
    #[serde(default)]
    icons: IconConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(render: RenderConfig, style: StyleConfig, icons: IconConfig) -> Self {
        Self {
            render,
            style,
            icons,
        }
    }

    /// Returns the render configuration.
    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the icon configuration.
    pub fn icons(&self) -> &IconConfig {
        &self.icons
    }

    /// Returns a copy with the render section replaced.
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }
}

/// Controls the external layout engine and the files it writes.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Graphviz layout engine name, e.g. `dot` or `neato`.
    #[serde(default = "default_engine")]
    engine: String,

    /// Default [`OutputFormat`] for diagrams that do not choose one.
    #[serde(default)]
    format: OutputFormat,

    /// Directory receiving rendered images; the working directory when unset.
    #[serde(default)]
    output_dir: Option<PathBuf>,
}

fn default_engine() -> String {
    "dot".to_owned()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            format: OutputFormat::default(),
            output_dir: None,
        }
    }
}

impl RenderConfig {
    /// Creates a new [`RenderConfig`].
    ///
    /// # Arguments
    ///
    /// * `engine` - Graphviz layout engine name.
    /// * `format` - Default output format.
    /// * `output_dir` - Output directory, or `None` for the working directory.
    pub fn new(engine: impl Into<String>, format: OutputFormat, output_dir: Option<PathBuf>) -> Self {
        Self {
            engine: engine.into(),
            format,
            output_dir,
        }
    }

    /// Returns the Graphviz layout engine name.
    pub fn engine(&self) -> &str {
        &self.engine
    }

    /// Returns the default output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Returns the output directory, defaulting to the working directory.
    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(Path::new("."))
    }
}

/// Visual styling configuration.
///
/// The attribute tables are merged over the built-in Graphviz defaults; a key
/// present in both takes the configured value.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    /// Default [`CurveStyle`] for diagrams that do not choose one.
    #[serde(default)]
    curve_style: CurveStyle,

    /// Graph-level attribute overrides.
    #[serde(default)]
    graph: Attributes,

    /// Node attribute overrides.
    #[serde(default)]
    node: Attributes,

    /// Edge attribute overrides.
    #[serde(default)]
    edge: Attributes,

    /// Cluster attribute overrides.
    #[serde(default)]
    cluster: Attributes,
}

impl StyleConfig {
    /// Returns the default curve style.
    pub fn curve_style(&self) -> CurveStyle {
        self.curve_style
    }

    pub fn graph(&self) -> &Attributes {
        &self.graph
    }

    pub fn node(&self) -> &Attributes {
        &self.node
    }

    pub fn edge(&self) -> &Attributes {
        &self.edge
    }

    pub fn cluster(&self) -> &Attributes {
        &self.cluster
    }
}

/// Icon lookup configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IconConfig {
    /// Directory holding the icon assets.
    #[serde(default = "default_icon_root")]
    root: String,

    /// Extra categories: category path to asset path.
    #[serde(default)]
    custom: IndexMap<String, String>,
}

fn default_icon_root() -> String {
    "resources".to_owned()
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            root: default_icon_root(),
            custom: IndexMap::new(),
        }
    }
}

impl IconConfig {
    /// Returns the icon root directory.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns the configured extra categories.
    pub fn custom(&self) -> &IndexMap<String, String> {
        &self.custom
    }

    /// Builds the icon registry: the built-in taxonomy plus custom entries.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Config`] if a custom category path is invalid.
    pub fn registry(&self) -> Result<IconRegistry, TrellisError> {
        let mut registry = IconRegistry::with_builtins(self.root.as_str());
        for (category, asset) in &self.custom {
            registry
                .register(category, asset.as_str())
                .map_err(|err| TrellisError::Config(format!("Invalid icon entry: {err}")))?;
        }
        Ok(registry)
    }
}
