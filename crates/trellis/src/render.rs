//! Renderer adapter: hands a serialized description to the layout engine.
//!
//! [`LayoutEngine`] is the seam to the external program; [`Graphviz`] drives
//! the Graphviz command line through `graphviz-rust`. [`Renderer`] owns the
//! engine and the output directory and is responsible for never leaving a
//! partially written image behind: the engine writes into a temporary file in
//! the output directory, which is moved into place only on success.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use graphviz_rust::{
    cmd::{CommandArg, Format, Layout},
    exec_dot,
};
use log::{debug, info};

use trellis_core::style::OutputFormat;

use crate::{error::RenderFailure, graph::Diagram};

/// Program started by `graphviz-rust`; the layout is selected with `-K`.
const GRAPHVIZ_PROGRAM: &str = "dot";

/// An external program that lays out a description and writes an image.
pub trait LayoutEngine {
    /// Renders `description` as `format` into the file at `output`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderFailure`] if the engine cannot be started or fails.
    fn render(
        &self,
        description: &str,
        format: OutputFormat,
        output: &Path,
    ) -> Result<(), RenderFailure>;
}

/// Graphviz engine: `dot -K<layout> -T<format> -o<output>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graphviz {
    layout: String,
}

impl Graphviz {
    /// Creates an engine running the named Graphviz layout.
    ///
    /// # Errors
    ///
    /// [`RenderFailure::UnknownLayout`] if `layout` is not one of `dot`,
    /// `neato`, `twopi`, `circo`, `fdp`, `sfdp` or `patchwork`.
    pub fn new(layout: &str) -> Result<Self, RenderFailure> {
        match graphviz_layout(layout) {
            Some(_) => Ok(Self {
                layout: layout.to_owned(),
            }),
            None => Err(RenderFailure::UnknownLayout(layout.to_owned())),
        }
    }

    pub fn layout(&self) -> &str {
        &self.layout
    }
}

impl Default for Graphviz {
    fn default() -> Self {
        Self {
            layout: GRAPHVIZ_PROGRAM.to_owned(),
        }
    }
}

impl LayoutEngine for Graphviz {
    fn render(
        &self,
        description: &str,
        format: OutputFormat,
        output: &Path,
    ) -> Result<(), RenderFailure> {
        let layout = graphviz_layout(&self.layout)
            .ok_or_else(|| RenderFailure::UnknownLayout(self.layout.clone()))?;
        let args = vec![
            CommandArg::Layout(layout),
            CommandArg::Format(graphviz_format(format)),
            CommandArg::Output(output.display().to_string()),
        ];

        exec_dot(description.to_owned(), args).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                RenderFailure::Unavailable {
                    program: GRAPHVIZ_PROGRAM.to_owned(),
                    source,
                }
            } else {
                RenderFailure::EngineFailed {
                    program: GRAPHVIZ_PROGRAM.to_owned(),
                    detail: source.to_string().trim().to_owned(),
                }
            }
        })?;

        debug!(layout = self.layout.as_str(), output:? = output; "Engine finished");
        Ok(())
    }
}

fn graphviz_layout(name: &str) -> Option<Layout> {
    match name {
        "dot" => Some(Layout::Dot),
        "neato" => Some(Layout::Neato),
        "twopi" => Some(Layout::Twopi),
        "circo" => Some(Layout::Circo),
        "fdp" => Some(Layout::Fdp),
        "sfdp" => Some(Layout::Sfdp),
        "patchwork" => Some(Layout::Patchwork),
        _ => None,
    }
}

fn graphviz_format(format: OutputFormat) -> Format {
    match format {
        OutputFormat::Png => Format::Png,
        OutputFormat::Jpg => Format::Jpg,
        OutputFormat::Svg => Format::Svg,
        OutputFormat::Pdf => Format::Pdf,
        OutputFormat::Dot => Format::Dot,
    }
}

/// Writes finished diagrams to `<output_dir>/<filename>.<ext>`.
pub struct Renderer {
    engine: Box<dyn LayoutEngine>,
    output_dir: PathBuf,
}

impl Renderer {
    pub fn new(engine: Box<dyn LayoutEngine>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub(crate) fn set_engine(&mut self, engine: Box<dyn LayoutEngine>) {
        self.engine = engine;
    }

    pub(crate) fn set_output_dir(&mut self, output_dir: PathBuf) {
        self.output_dir = output_dir;
    }

    /// Renders `description` for `diagram` and returns the image path.
    ///
    /// The [`OutputFormat::Dot`] format writes the description itself and
    /// does not start the engine. On failure nothing is left at the final
    /// path and no temporary file remains.
    ///
    /// # Errors
    ///
    /// Returns [`RenderFailure`] if the output directory cannot be prepared,
    /// the engine fails, or the image cannot be moved into place.
    pub fn render(&self, diagram: &Diagram, description: &str) -> Result<PathBuf, RenderFailure> {
        let dir = &self.output_dir;
        fs::create_dir_all(dir).map_err(|source| RenderFailure::Output {
            path: dir.clone(),
            source,
        })?;

        let format = diagram.format();
        let path = dir.join(diagram.output_file_name());
        info!(
            diagram:% = diagram.id(),
            title = diagram.title(),
            path:? = path;
            "Rendering diagram"
        );

        let mut staging = tempfile::Builder::new()
            .prefix(".trellis-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile_in(dir)
            .map_err(|source| RenderFailure::Output {
                path: dir.clone(),
                source,
            })?;

        if format.needs_engine() {
            self.engine.render(description, format, staging.path())?;
        } else {
            staging
                .write_all(description.as_bytes())
                .map_err(|source| RenderFailure::Output {
                    path: staging.path().to_path_buf(),
                    source,
                })?;
        }

        staging
            .persist(&path)
            .map_err(|err| RenderFailure::Output {
                path: path.clone(),
                source: err.error,
            })?;

        info!(diagram:% = diagram.id(), path:? = path; "Rendered diagram");
        Ok(path)
    }
}
