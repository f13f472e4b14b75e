//! In-memory diagram model.
//!
//! A [`Diagram`] owns every node, cluster and edge created while it was open.
//! Nodes and clusters live in creation-ordered arenas and refer to each other
//! through [`NodeId`] and [`ClusterId`] indices; the cluster tree is rooted at
//! [`ClusterId::ROOT`], which stands for the diagram itself.
//!
//! Mutation is crate-private and only reachable through the scope stack, so a
//! `Diagram` handed out after closing is immutable.

use std::fmt;

use trellis_core::{
    category::{Category, IconRef},
    color::Color,
    style::{CurveStyle, Direction, EdgeDirection, LineStyle, OutputFormat},
};

use crate::error::TrellisError;

/// Index of a node within its diagram, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the creation-order index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Index of a cluster within its diagram, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(usize);

impl ClusterId {
    /// The implicit root cluster that represents the diagram itself.
    pub const ROOT: ClusterId = ClusterId(0);

    /// Returns the creation-order index.
    pub fn index(self) -> usize {
        self.0
    }

    /// Returns `true` for [`ClusterId::ROOT`].
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster_{}", self.0)
    }
}

/// Session-unique serial number of a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagramId(pub(crate) u64);

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// Opaque handle to a node, used only to build edges.
///
/// The handle remembers which diagram created it, so passing a handle from an
/// earlier diagram to `connect` is rejected instead of silently pointing at an
/// unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    diagram: DiagramId,
    node: NodeId,
}

impl NodeHandle {
    pub(crate) fn new(diagram: DiagramId, node: NodeId) -> Self {
        Self { diagram, node }
    }

    /// Returns the diagram the node belongs to.
    pub fn diagram(self) -> DiagramId {
        self.diagram
    }

    /// Returns the node id within its diagram.
    pub fn id(self) -> NodeId {
        self.node
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.diagram, self.node)
    }
}

/// An atomic drawable entity.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    label: String,
    category: Category,
    icon: IconRef,
    cluster: ClusterId,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Icon reference resolved from the category when the node was created.
    pub fn icon(&self) -> &IconRef {
        &self.icon
    }

    /// The cluster that was on top of the scope stack at creation time.
    pub fn cluster(&self) -> ClusterId {
        self.cluster
    }
}

/// A member of a cluster, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    Node(NodeId),
    Cluster(ClusterId),
}

/// A named, nestable grouping of nodes and sub-clusters.
#[derive(Debug, Clone)]
pub struct Cluster {
    id: ClusterId,
    label: String,
    parent: Option<ClusterId>,
    depth: usize,
    children: Vec<Child>,
}

impl Cluster {
    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Parent cluster; `None` only for the root.
    pub fn parent(&self) -> Option<ClusterId> {
        self.parent
    }

    /// Nesting depth; the root is 0 and top-level clusters are 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }
}

/// A directed, labeled, styled connection between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    source: NodeId,
    target: NodeId,
    label: Option<String>,
    color: Option<Color>,
    style: LineStyle,
    direction: EdgeDirection,
}

impl Edge {
    pub(crate) fn new(
        source: NodeId,
        target: NodeId,
        label: Option<String>,
        color: Option<Color>,
        style: LineStyle,
        direction: EdgeDirection,
    ) -> Self {
        Self {
            source,
            target,
            label,
            color,
            style,
            direction,
        }
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn style(&self) -> LineStyle {
        self.style
    }

    pub fn direction(&self) -> EdgeDirection {
        self.direction
    }
}

/// Settings supplied when a diagram is opened.
///
/// # Examples
///
/// ```
/// use trellis::{DiagramSettings, style::{Direction, OutputFormat}};
///
/// let settings = DiagramSettings::new("Upload Flow", Direction::LeftRight, "")
///     .with_format(OutputFormat::Svg);
/// assert_eq!(settings.filename(), "upload_flow");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSettings {
    title: String,
    direction: Direction,
    filename: String,
    format: Option<OutputFormat>,
    curve_style: Option<CurveStyle>,
}

impl DiagramSettings {
    /// Creates settings for a diagram.
    ///
    /// An empty `filename` is derived from the title: whitespace runs become
    /// underscores and the result is lowercased.
    pub fn new(title: impl Into<String>, direction: Direction, filename: impl Into<String>) -> Self {
        let title = title.into();
        let mut filename: String = filename.into();
        if filename.is_empty() {
            filename = title.split_whitespace().collect::<Vec<_>>().join("_").to_lowercase();
        }
        Self {
            title,
            direction,
            filename,
            format: None,
            curve_style: None,
        }
    }

    /// Overrides the configured output format for this diagram.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Overrides the configured curve style for this diagram.
    pub fn with_curve_style(mut self, curve_style: CurveStyle) -> Self {
        self.curve_style = Some(curve_style);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn format(&self) -> Option<OutputFormat> {
        self.format
    }

    pub fn curve_style(&self) -> Option<CurveStyle> {
        self.curve_style
    }

    /// Checks that the filename names a single file inside the output
    /// directory.
    ///
    /// # Errors
    ///
    /// [`TrellisError::InvalidAttribute`] if the filename is empty, is `.` or
    /// `..`, or contains a path separator.
    pub fn validate(&self) -> Result<(), TrellisError> {
        let filename = self.filename.as_str();
        if filename.is_empty() {
            return Err(TrellisError::InvalidAttribute(format!(
                "diagram `{}` has no filename and its title yields none",
                self.title
            )));
        }
        if matches!(filename, "." | "..") || filename.contains(['/', '\\']) {
            return Err(TrellisError::InvalidAttribute(format!(
                "diagram filename `{filename}` must not contain path components"
            )));
        }
        Ok(())
    }

    /// Fills unset options from configuration defaults.
    pub(crate) fn or_defaults(mut self, format: OutputFormat, curve_style: CurveStyle) -> Self {
        self.format.get_or_insert(format);
        self.curve_style.get_or_insert(curve_style);
        self
    }
}

/// Top-level container: title, layout direction, output filename, the
/// cluster tree and the diagram-scoped edge list.
#[derive(Debug, Clone)]
pub struct Diagram {
    id: DiagramId,
    title: String,
    direction: Direction,
    filename: String,
    format: OutputFormat,
    curve_style: CurveStyle,
    nodes: Vec<Node>,
    clusters: Vec<Cluster>,
    edges: Vec<Edge>,
}

impl Diagram {
    pub(crate) fn new(id: DiagramId, settings: DiagramSettings) -> Self {
        let root = Cluster {
            id: ClusterId::ROOT,
            label: settings.title.clone(),
            parent: None,
            depth: 0,
            children: Vec::new(),
        };
        Self {
            id,
            title: settings.title,
            direction: settings.direction,
            filename: settings.filename,
            format: settings.format.unwrap_or_default(),
            curve_style: settings.curve_style.unwrap_or_default(),
            nodes: Vec::new(),
            clusters: vec![root],
            edges: Vec::new(),
        }
    }

    pub fn id(&self) -> DiagramId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn curve_style(&self) -> CurveStyle {
        self.curve_style
    }

    /// File name of the rendered image, e.g. `upload_flow.png`.
    pub fn output_file_name(&self) -> String {
        format!("{}.{}", self.filename, self.format.extension())
    }

    /// The root cluster standing for the diagram itself.
    pub fn root(&self) -> &Cluster {
        &self.clusters[ClusterId::ROOT.0]
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(id.0)
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All clusters in creation order, root first.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns `true` if `handle` was created by this diagram.
    pub fn owns(&self, handle: NodeHandle) -> bool {
        handle.diagram == self.id && handle.node.0 < self.nodes.len()
    }

    pub(crate) fn add_node(
        &mut self,
        label: String,
        category: Category,
        icon: IconRef,
        parent: ClusterId,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            label,
            category,
            icon,
            cluster: parent,
        });
        self.clusters[parent.0].children.push(Child::Node(id));
        id
    }

    pub(crate) fn add_cluster(&mut self, label: String, parent: ClusterId) -> ClusterId {
        let id = ClusterId(self.clusters.len());
        let depth = self.clusters[parent.0].depth + 1;
        self.clusters.push(Cluster {
            id,
            label,
            parent: Some(parent),
            depth,
            children: Vec::new(),
        });
        self.clusters[parent.0].children.push(Child::Cluster(id));
        id
    }

    pub(crate) fn push_edges(&mut self, edges: impl IntoIterator<Item = Edge>) {
        self.edges.extend(edges);
    }
}
