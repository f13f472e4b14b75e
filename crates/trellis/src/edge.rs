//! Edge attributes and broadcast endpoints for `connect`.
//!
//! Either side of a connection is an [`Endpoints`] value: one node handle or
//! an ordered sequence of them. A sequence on one side paired with a single
//! node on the other broadcasts into one edge per element, in sequence order.
//! Two sequences are rejected; there is no zip or cross-product.

use trellis_core::{
    color::Color,
    style::{EdgeDirection, LineStyle},
};

use crate::{error::TrellisError, graph::NodeHandle};

/// Attributes copied onto every edge produced by one `connect` call.
///
/// # Examples
///
/// ```
/// use trellis::{EdgeAttrs, style::LineStyle};
///
/// let attrs = EdgeAttrs::new()
///     .with_label("PostgreSQL\nPort 5432")
///     .with_color("purple")
///     .with_style(LineStyle::Dashed);
/// assert_eq!(attrs.label(), Some("PostgreSQL\nPort 5432"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeAttrs {
    label: Option<String>,
    color: Option<String>,
    style: LineStyle,
    direction: EdgeDirection,
}

impl EdgeAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the edge color; any CSS color notation is accepted and checked
    /// when the edge is created.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_direction(mut self, direction: EdgeDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn style(&self) -> LineStyle {
        self.style
    }

    pub fn direction(&self) -> EdgeDirection {
        self.direction
    }

    /// Parses the configured color, if any.
    pub(crate) fn parsed_color(&self) -> Result<Option<Color>, TrellisError> {
        self.color
            .as_deref()
            .map(Color::new)
            .transpose()
            .map_err(TrellisError::InvalidAttribute)
    }
}

/// One side of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoints {
    One(NodeHandle),
    Many(Vec<NodeHandle>),
}

impl Endpoints {
    /// Returns the handles on this side, in order.
    pub fn handles(&self) -> &[NodeHandle] {
        match self {
            Self::One(handle) => std::slice::from_ref(handle),
            Self::Many(handles) => handles,
        }
    }
}

impl From<NodeHandle> for Endpoints {
    fn from(handle: NodeHandle) -> Self {
        Self::One(handle)
    }
}

impl From<Vec<NodeHandle>> for Endpoints {
    fn from(handles: Vec<NodeHandle>) -> Self {
        Self::Many(handles)
    }
}

impl From<&[NodeHandle]> for Endpoints {
    fn from(handles: &[NodeHandle]) -> Self {
        Self::Many(handles.to_vec())
    }
}

impl From<&Vec<NodeHandle>> for Endpoints {
    fn from(handles: &Vec<NodeHandle>) -> Self {
        Self::Many(handles.clone())
    }
}

impl<const N: usize> From<[NodeHandle; N]> for Endpoints {
    fn from(handles: [NodeHandle; N]) -> Self {
        Self::Many(handles.to_vec())
    }
}

/// Expands a connection into `(source, target)` pairs in edge order.
///
/// # Errors
///
/// Returns [`TrellisError::InvalidConnection`] when both sides are sequences.
pub(crate) fn broadcast(
    source: &Endpoints,
    target: &Endpoints,
) -> Result<Vec<(NodeHandle, NodeHandle)>, TrellisError> {
    match (source, target) {
        (Endpoints::One(source), Endpoints::One(target)) => Ok(vec![(*source, *target)]),
        (Endpoints::One(source), Endpoints::Many(targets)) => {
            Ok(targets.iter().map(|target| (*source, *target)).collect())
        }
        (Endpoints::Many(sources), Endpoints::One(target)) => {
            Ok(sources.iter().map(|source| (*source, *target)).collect())
        }
        (Endpoints::Many(sources), Endpoints::Many(targets)) => {
            Err(TrellisError::InvalidConnection(format!(
                "cannot connect a sequence of {} nodes to a sequence of {} nodes; \
                 one side must be a single node",
                sources.len(),
                targets.len()
            )))
        }
    }
}
