//! Styling vocabulary shared by diagrams, edges and the renderer.
//!
//! # Overview
//!
//! Exported types:
//! - [`Direction`]: Layout direction of a whole diagram (`TB`, `BT`, `LR`, `RL`)
//! - [`CurveStyle`]: How edges are routed between nodes
//! - [`LineStyle`]: Line pattern of an edge (solid, dashed, dotted, ...)
//! - [`EdgeDirection`]: Which ends of an edge carry an arrowhead
//! - [`OutputFormat`]: Image format produced by the renderer
//!
//! Every type parses from the lowercase names used in configuration files and
//! maps to the attribute value understood by Graphviz.

use std::{fmt, str::FromStr};

use serde::Deserialize;

/// Layout direction of a diagram.
///
/// The names match Graphviz `rankdir` values. Parsing is case-insensitive so
/// both `"LR"` and `"lr"` are accepted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Direction {
    /// Top to bottom (default)
    #[default]
    #[serde(rename = "TB", alias = "tb")]
    TopBottom,
    /// Bottom to top
    #[serde(rename = "BT", alias = "bt")]
    BottomTop,
    /// Left to right
    #[serde(rename = "LR", alias = "lr")]
    LeftRight,
    /// Right to left
    #[serde(rename = "RL", alias = "rl")]
    RightLeft,
}

impl Direction {
    /// Returns the Graphviz `rankdir` value.
    pub fn rankdir(self) -> &'static str {
        match self {
            Self::TopBottom => "TB",
            Self::BottomTop => "BT",
            Self::LeftRight => "LR",
            Self::RightLeft => "RL",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TB" => Ok(Self::TopBottom),
            "BT" => Ok(Self::BottomTop),
            "LR" => Ok(Self::LeftRight),
            "RL" => Ok(Self::RightLeft),
            _ => Err(format!(
                "invalid direction `{s}`, valid values: TB, BT, LR, RL"
            )),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rankdir())
    }
}

/// Edge routing style, mapped to the Graphviz `splines` attribute.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveStyle {
    /// Axis-aligned segments (default)
    #[default]
    Ortho,
    /// Curved arcs
    Curved,
    /// Straight polyline segments
    Polyline,
    /// Spline curves
    Spline,
}

impl CurveStyle {
    /// Returns the Graphviz `splines` value.
    pub fn splines(self) -> &'static str {
        match self {
            Self::Ortho => "ortho",
            Self::Curved => "curved",
            Self::Polyline => "polyline",
            Self::Spline => "spline",
        }
    }
}

impl FromStr for CurveStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ortho" => Ok(Self::Ortho),
            "curved" => Ok(Self::Curved),
            "polyline" => Ok(Self::Polyline),
            "spline" => Ok(Self::Spline),
            _ => Err(format!(
                "invalid curve style `{s}`, valid values: ortho, curved, polyline, spline"
            )),
        }
    }
}

/// Defines the line pattern of an edge.
///
/// # Graphviz Mapping
///
/// Each variant maps to the edge `style` attribute of the same name. `Solid`
/// is the engine default and is emitted explicitly so the description is
/// self-contained.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    /// Solid continuous line (default)
    #[default]
    Solid,
    /// Dashed line
    Dashed,
    /// Dotted line
    Dotted,
    /// Thick solid line
    Bold,
    /// Invisible line; still influences layout
    Invis,
}

impl LineStyle {
    /// Returns the Graphviz `style` value.
    pub fn to_dot_value(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Bold => "bold",
            Self::Invis => "invis",
        }
    }
}

impl FromStr for LineStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            "bold" => Ok(Self::Bold),
            "invis" | "invisible" => Ok(Self::Invis),
            _ => Err(format!(
                "invalid line style `{s}`, valid values: solid, dashed, dotted, bold, invis"
            )),
        }
    }
}

/// Defines which ends of an edge carry an arrowhead.
///
/// - `Forward`: `source -> target`
/// - `Back`: arrowhead at the source end
/// - `Both`: arrowheads at both ends
/// - `None`: plain line
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDirection {
    #[default]
    Forward,
    Back,
    Both,
    None,
}

impl EdgeDirection {
    /// Returns the Graphviz `dir` value.
    pub fn to_dot_value(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Back => "back",
            Self::Both => "both",
            Self::None => "none",
        }
    }
}

impl FromStr for EdgeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Self::Forward),
            "back" => Ok(Self::Back),
            "both" => Ok(Self::Both),
            "none" => Ok(Self::None),
            _ => Err(format!(
                "invalid edge direction `{s}`, valid values: forward, back, both, none"
            )),
        }
    }
}

/// Image format written by the renderer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// PNG raster image (default)
    #[default]
    Png,
    /// JPEG raster image
    Jpg,
    /// SVG vector image
    Svg,
    /// PDF document
    Pdf,
    /// The DOT description itself, written without invoking the engine
    Dot,
}

impl OutputFormat {
    /// Returns the file extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
            Self::Dot => "dot",
        }
    }

    /// Returns `true` when producing this format requires the layout engine.
    pub fn needs_engine(self) -> bool {
        !matches!(self, Self::Dot)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            "dot" | "gv" => Ok(Self::Dot),
            _ => Err(format!(
                "invalid output format `{s}`, valid values: png, jpg, svg, pdf, dot"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
