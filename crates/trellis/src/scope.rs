//! The scope stack: which diagram and cluster are currently open.
//!
//! [`ScopeStack`] is an explicit value rather than process-wide state. From
//! bottom to top its frames are always `[Diagram, Cluster*]`; a cluster frame
//! never exists without the diagram frame beneath it.
//!
//! Every fallible operation validates before it mutates. A call that fails
//! leaves the frames, the nodes and the edges exactly as they were, so the
//! stack never holds a dangling frame.

use std::fmt;

use log::{debug, trace};

use trellis_core::category::{Category, IconRef};

use crate::{
    edge::{self, EdgeAttrs, Endpoints},
    error::{ScopeConflict, TrellisError},
    graph::{ClusterId, Diagram, DiagramId, DiagramSettings, Edge, NodeHandle},
};

/// One entry of the scope stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Diagram(DiagramId),
    Cluster(ClusterId),
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Diagram(id) => write!(f, "diagram {id}"),
            Self::Cluster(id) => write!(f, "{id}"),
        }
    }
}

/// What a call to [`ScopeStack::close`] popped.
#[derive(Debug)]
pub enum Closed {
    Cluster(ClusterId),
    Diagram(Diagram),
}

/// LIFO stack of open scopes plus the diagram under construction.
#[derive(Debug, Default)]
pub struct ScopeStack {
    draft: Option<Diagram>,
    frames: Vec<Frame>,
    next_diagram: u64,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a diagram is under construction.
    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    /// Open frames, bottom first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The innermost open frame.
    pub fn top(&self) -> Option<Frame> {
        self.frames.last().copied()
    }

    /// The diagram under construction, if any.
    pub fn current(&self) -> Option<&Diagram> {
        self.draft.as_ref()
    }

    /// Pushes a diagram frame.
    ///
    /// # Errors
    ///
    /// [`ScopeConflict::DiagramAlreadyOpen`] if a diagram is already under
    /// construction; the open diagram is left untouched.
    pub fn open_diagram(&mut self, settings: DiagramSettings) -> Result<DiagramId, ScopeConflict> {
        if let Some(open) = &self.draft {
            return Err(ScopeConflict::DiagramAlreadyOpen {
                title: open.title().to_owned(),
            });
        }

        let id = DiagramId(self.next_diagram);
        self.next_diagram += 1;

        debug!(diagram:% = id, title = settings.title(); "Opening diagram");
        self.draft = Some(Diagram::new(id, settings));
        self.frames.push(Frame::Diagram(id));
        Ok(id)
    }

    /// Pushes a cluster frame as a child of the current top frame.
    ///
    /// # Errors
    ///
    /// [`ScopeConflict::NoDiagramOpen`] if no diagram is open.
    pub fn open_cluster(&mut self, label: &str) -> Result<ClusterId, ScopeConflict> {
        let parent = self.current_cluster()?;
        let diagram = self.draft.as_mut().ok_or(ScopeConflict::NoDiagramOpen)?;

        let id = diagram.add_cluster(label.to_owned(), parent);
        debug!(cluster:% = id, parent:% = parent, label = label; "Opening cluster");
        self.frames.push(Frame::Cluster(id));
        Ok(id)
    }

    /// Attaches a node to the current top frame.
    ///
    /// The category must already be resolved to `icon`; see
    /// [`Session::create_node`](crate::Session::create_node).
    ///
    /// # Errors
    ///
    /// [`ScopeConflict::NoDiagramOpen`] if no diagram is open.
    pub fn create_node(
        &mut self,
        label: &str,
        category: Category,
        icon: IconRef,
    ) -> Result<NodeHandle, ScopeConflict> {
        let parent = self.current_cluster()?;
        let diagram = self.draft.as_mut().ok_or(ScopeConflict::NoDiagramOpen)?;

        let id = diagram.add_node(label.to_owned(), category, icon, parent);
        trace!(node:% = id, cluster:% = parent, category:% = category; "Created node");
        Ok(NodeHandle::new(diagram.id(), id))
    }

    /// Appends one edge per broadcast pairing to the open diagram.
    ///
    /// Returns the number of edges appended. Nothing is appended unless every
    /// check passes.
    ///
    /// # Errors
    ///
    /// - [`ScopeConflict::NoDiagramOpen`] if no diagram is open.
    /// - [`TrellisError::InvalidConnection`] if both sides are sequences.
    /// - [`ScopeConflict::ForeignNode`] if a handle belongs to another diagram.
    /// - [`TrellisError::InvalidAttribute`] if the color does not parse.
    pub fn connect(
        &mut self,
        source: &Endpoints,
        target: &Endpoints,
        attrs: &EdgeAttrs,
    ) -> Result<usize, TrellisError> {
        let diagram = self.draft.as_mut().ok_or(ScopeConflict::NoDiagramOpen)?;

        let pairs = edge::broadcast(source, target)?;
        if let Some(foreign) = source
            .handles()
            .iter()
            .chain(target.handles())
            .find(|handle| !diagram.owns(**handle))
        {
            return Err(ScopeConflict::ForeignNode(*foreign).into());
        }
        let color = attrs.parsed_color()?;

        let count = pairs.len();
        diagram.push_edges(pairs.into_iter().map(|(source, target)| {
            Edge::new(
                source.id(),
                target.id(),
                attrs.label().map(str::to_owned),
                color,
                attrs.style(),
                attrs.direction(),
            )
        }));
        trace!(count = count, total = diagram.edges().len(); "Connected nodes");
        Ok(count)
    }

    /// Pops the top frame.
    ///
    /// Popping the diagram frame finalizes the diagram and hands it back.
    ///
    /// # Errors
    ///
    /// [`ScopeConflict::NoDiagramOpen`] if the stack is empty.
    pub fn close(&mut self) -> Result<Closed, ScopeConflict> {
        match self.top() {
            None => Err(ScopeConflict::NoDiagramOpen),
            Some(Frame::Cluster(id)) => {
                self.frames.pop();
                debug!(cluster:% = id; "Closed cluster");
                Ok(Closed::Cluster(id))
            }
            Some(Frame::Diagram(_)) => self.close_diagram().map(Closed::Diagram),
        }
    }

    /// Pops the cluster frame `id`, which must be the innermost open frame.
    ///
    /// # Errors
    ///
    /// - [`ScopeConflict::NoDiagramOpen`] if no diagram is open.
    /// - [`ScopeConflict::OutOfOrderClose`] if `id` is open but not on top.
    /// - [`ScopeConflict::ClusterNotOpen`] if `id` is not open at all.
    pub fn close_cluster(&mut self, id: ClusterId) -> Result<(), ScopeConflict> {
        let top = self.top().ok_or(ScopeConflict::NoDiagramOpen)?;
        if top == Frame::Cluster(id) {
            self.frames.pop();
            debug!(cluster:% = id; "Closed cluster");
            return Ok(());
        }

        if self.frames.contains(&Frame::Cluster(id)) {
            Err(ScopeConflict::OutOfOrderClose {
                requested: id,
                innermost: top.to_string(),
            })
        } else {
            Err(ScopeConflict::ClusterNotOpen(id))
        }
    }

    /// Pops the diagram frame and returns the finalized diagram.
    ///
    /// # Errors
    ///
    /// - [`ScopeConflict::NoDiagramOpen`] if no diagram is open.
    /// - [`ScopeConflict::ClustersStillOpen`] if clusters remain on the stack.
    pub fn close_diagram(&mut self) -> Result<Diagram, ScopeConflict> {
        if self.draft.is_none() {
            return Err(ScopeConflict::NoDiagramOpen);
        }
        let open = self.frames.len().saturating_sub(1);
        if open > 0 {
            return Err(ScopeConflict::ClustersStillOpen { open });
        }

        self.frames.clear();
        let diagram = self.draft.take().ok_or(ScopeConflict::NoDiagramOpen)?;
        debug!(
            diagram:% = diagram.id(),
            nodes = diagram.nodes().len(),
            clusters = diagram.clusters().len() - 1,
            edges = diagram.edges().len();
            "Closed diagram"
        );
        Ok(diagram)
    }

    /// Discards the diagram under construction and every open frame.
    ///
    /// Returns the discarded draft, if there was one.
    pub fn abort(&mut self) -> Option<Diagram> {
        self.frames.clear();
        let draft = self.draft.take();
        if let Some(diagram) = &draft {
            debug!(diagram:% = diagram.id(), title = diagram.title(); "Aborted diagram");
        }
        draft
    }

    fn current_cluster(&self) -> Result<ClusterId, ScopeConflict> {
        match self.top() {
            None => Err(ScopeConflict::NoDiagramOpen),
            Some(Frame::Diagram(_)) => Ok(ClusterId::ROOT),
            Some(Frame::Cluster(id)) => Ok(id),
        }
    }
}
