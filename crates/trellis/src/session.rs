//! The caller-owned diagram session.
//!
//! A [`Session`] bundles the configuration, the icon resolver, the renderer
//! and the [`ScopeStack`]. It offers two equivalent ways to build diagrams:
//!
//! - explicit calls (`open_diagram`, `open_cluster`, `create_node`, `connect`,
//!   `close`), mirroring the scope stack one to one;
//! - scoped guards: [`Session::diagram`] returns a [`DiagramScope`] whose
//!   [`cluster`](DiagramScope::cluster) method returns a [`ClusterScope`].
//!   Guards release their frame on every exit path. A dropped cluster guard
//!   closes its cluster; a diagram guard dropped without [`DiagramScope::close`]
//!   aborts the diagram and nothing is rendered.
//!
//! On both paths a scope-discipline or category error raised while a diagram
//! is open discards that diagram, so it can never be rendered. The one
//! exception is [`ScopeConflict::DiagramAlreadyOpen`], which leaves the open
//! diagram untouched.

use std::path::{Path, PathBuf};

use log::{info, warn};

use trellis_core::category::{Category, IconRegistry, IconResolver};

use crate::{
    config::AppConfig,
    edge::{EdgeAttrs, Endpoints},
    error::{ScopeConflict, TrellisError},
    export::to_dot,
    graph::{ClusterId, Diagram, DiagramId, DiagramSettings, NodeHandle},
    render::{Graphviz, LayoutEngine, Renderer},
    scope::{Closed, Frame, ScopeStack},
};

/// A diagram that was closed, serialized and rendered.
#[derive(Debug)]
pub struct Rendered {
    diagram: Diagram,
    description: String,
    path: PathBuf,
}

impl Rendered {
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// The description handed to the layout engine.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Where the image was written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Result of [`Session::close`].
#[derive(Debug)]
pub enum CloseOutcome {
    /// A cluster frame was popped.
    Cluster(ClusterId),
    /// The diagram frame was popped and the diagram rendered.
    Rendered(Rendered),
}

/// Caller-owned construction context; at most one diagram is open at a time.
pub struct Session {
    config: AppConfig,
    icons: Box<dyn IconResolver>,
    renderer: Renderer,
    stack: ScopeStack,
}

impl Default for Session {
    /// A session with default configuration and the built-in icon taxonomy.
    fn default() -> Self {
        let config = AppConfig::default();
        let icons = IconRegistry::with_builtins(config.icons().root());
        Self::from_parts(config, Box::new(icons), Graphviz::default())
    }
}

impl Session {
    /// Creates a session from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Config`] if the configured icon entries or
    /// the layout engine name are invalid.
    pub fn new(config: AppConfig) -> Result<Self, TrellisError> {
        let icons = config.icons().registry()?;
        let engine = Graphviz::new(config.render().engine())
            .map_err(|err| TrellisError::Config(err.to_string()))?;
        Ok(Self::from_parts(config, Box::new(icons), engine))
    }

    fn from_parts(config: AppConfig, icons: Box<dyn IconResolver>, engine: Graphviz) -> Self {
        let renderer = Renderer::new(Box::new(engine), config.render().output_dir());
        Self {
            config,
            icons,
            renderer,
            stack: ScopeStack::new(),
        }
    }

    /// Replaces the icon resolver.
    pub fn with_icon_resolver(mut self, icons: impl IconResolver + 'static) -> Self {
        self.icons = Box::new(icons);
        self
    }

    /// Replaces the layout engine.
    pub fn with_engine(mut self, engine: impl LayoutEngine + 'static) -> Self {
        self.renderer.set_engine(Box::new(engine));
        self
    }

    /// Replaces the configured output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.renderer.set_output_dir(output_dir.into());
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn stack(&self) -> &ScopeStack {
        &self.stack
    }

    pub fn output_dir(&self) -> &Path {
        self.renderer.output_dir()
    }

    /// Opens a diagram, filling unset options from the configuration.
    ///
    /// # Errors
    ///
    /// - [`TrellisError::InvalidAttribute`] if the filename is unusable (see
    ///   [`DiagramSettings::validate`]).
    /// - [`ScopeConflict::DiagramAlreadyOpen`] if a diagram is under
    ///   construction.
    pub fn open_diagram(&mut self, settings: DiagramSettings) -> Result<DiagramId, TrellisError> {
        settings.validate()?;
        let settings = settings.or_defaults(
            self.config.render().format(),
            self.config.style().curve_style(),
        );
        Ok(self.stack.open_diagram(settings)?)
    }

    /// Opens a cluster inside the current top frame.
    ///
    /// # Errors
    ///
    /// [`ScopeConflict::NoDiagramOpen`] if no diagram is open.
    pub fn open_cluster(&mut self, label: &str) -> Result<ClusterId, TrellisError> {
        Ok(self.stack.open_cluster(label)?)
    }

    /// Creates a node in the current top frame.
    ///
    /// `category` is a dotted taxonomy path such as `aws.compute.Fargate`.
    ///
    /// # Errors
    ///
    /// - [`ScopeConflict::NoDiagramOpen`] if no diagram is open; this is
    ///   checked before the category.
    /// - [`TrellisError::UnknownCategory`] if the category does not resolve.
    ///   The open diagram is aborted.
    pub fn create_node(&mut self, label: &str, category: &str) -> Result<NodeHandle, TrellisError> {
        if !self.stack.is_open() {
            return Err(ScopeConflict::NoDiagramOpen.into());
        }
        let resolved = Category::parse(category)
            .and_then(|category| Ok((category, self.icons.resolve_icon(category)?)));
        let (category, icon) = match resolved {
            Ok(resolved) => resolved,
            Err(err) => return Err(self.abort_with(err.into())),
        };
        self.stack
            .create_node(label, category, icon)
            .map_err(|err| self.abort_with(err.into()))
    }

    /// Connects `source` to `target`, broadcasting over a sequence side.
    ///
    /// Returns the number of edges appended.
    ///
    /// # Errors
    ///
    /// See [`ScopeStack::connect`]. A [`ScopeConflict::ForeignNode`] aborts
    /// the open diagram; invalid connections and attributes do not.
    pub fn connect(
        &mut self,
        source: impl Into<Endpoints>,
        target: impl Into<Endpoints>,
        attrs: &EdgeAttrs,
    ) -> Result<usize, TrellisError> {
        self.stack
            .connect(&source.into(), &target.into(), attrs)
            .map_err(|err| self.abort_with(err))
    }

    /// Pops the top frame; popping the diagram renders it.
    ///
    /// # Errors
    ///
    /// - [`ScopeConflict::NoDiagramOpen`] if nothing is open.
    /// - [`TrellisError::Render`] if rendering fails. The diagram is closed
    ///   either way.
    pub fn close(&mut self) -> Result<CloseOutcome, TrellisError> {
        match self.stack.close()? {
            Closed::Cluster(id) => Ok(CloseOutcome::Cluster(id)),
            Closed::Diagram(diagram) => self.finish(diagram).map(CloseOutcome::Rendered),
        }
    }

    /// Closes the cluster `id`, which must be the innermost open frame.
    ///
    /// # Errors
    ///
    /// See [`ScopeStack::close_cluster`]. A failed close aborts the open
    /// diagram.
    pub fn close_cluster(&mut self, id: ClusterId) -> Result<(), TrellisError> {
        self.stack
            .close_cluster(id)
            .map_err(|err| self.abort_with(err.into()))
    }

    /// Closes and renders the open diagram.
    ///
    /// # Errors
    ///
    /// - [`ScopeConflict`] if no diagram is open or clusters are still open;
    ///   in the latter case the diagram is aborted.
    /// - [`TrellisError::Render`] if rendering fails.
    pub fn close_diagram(&mut self) -> Result<Rendered, TrellisError> {
        let diagram = self
            .stack
            .close_diagram()
            .map_err(|err| self.abort_with(err.into()))?;
        self.finish(diagram)
    }

    /// Discards the open diagram without rendering it.
    pub fn abort(&mut self) -> Option<Diagram> {
        self.stack.abort()
    }

    /// Opens a diagram and returns a guard that aborts it unless closed.
    ///
    /// # Errors
    ///
    /// See [`Session::open_diagram`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use trellis::{DiagramSettings, EdgeAttrs, Session, style::Direction};
    ///
    /// # fn main() -> Result<(), trellis::TrellisError> {
    /// let mut session = Session::default();
    /// let mut diagram = session.diagram(DiagramSettings::new("D", Direction::TopBottom, "D"))?;
    /// let a = diagram.node("A", "compute")?;
    /// let b = {
    ///     let mut cluster = diagram.cluster("C")?;
    ///     cluster.node("B", "storage")?
    /// };
    /// diagram.connect(a, b, &EdgeAttrs::new().with_label("x"))?;
    /// let rendered = diagram.close()?;
    /// assert!(rendered.path().ends_with("D.png"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn diagram(&mut self, settings: DiagramSettings) -> Result<DiagramScope<'_>, TrellisError> {
        self.open_diagram(settings)?;
        Ok(DiagramScope { session: self })
    }

    /// Discards the open diagram when `err` is a scope or category error.
    fn abort_with(&mut self, err: TrellisError) -> TrellisError {
        let aborts = match &err {
            TrellisError::UnknownCategory(_) => true,
            TrellisError::ScopeConflict(conflict) => !matches!(
                conflict,
                ScopeConflict::DiagramAlreadyOpen { .. } | ScopeConflict::NoDiagramOpen
            ),
            _ => false,
        };
        if aborts {
            if let Some(diagram) = self.stack.abort() {
                warn!(
                    diagram:% = diagram.id(),
                    title = diagram.title(),
                    err:% = err;
                    "Diagram aborted"
                );
            }
        }
        err
    }

    fn finish(&self, diagram: Diagram) -> Result<Rendered, TrellisError> {
        let description = to_dot(&diagram, self.config.style());
        let path = self.renderer.render(&diagram, &description)?;
        info!(
            title = diagram.title(),
            nodes = diagram.nodes().len(),
            edges = diagram.edges().len();
            "Diagram complete"
        );
        Ok(Rendered {
            diagram,
            description,
            path,
        })
    }
}

/// Guard for an open diagram.
///
/// Dropping the guard without calling [`close`](Self::close) aborts the
/// diagram: it is discarded and never rendered.
pub struct DiagramScope<'s> {
    session: &'s mut Session,
}

impl DiagramScope<'_> {
    /// Creates a node at the diagram level.
    pub fn node(&mut self, label: &str, category: &str) -> Result<NodeHandle, TrellisError> {
        self.session.create_node(label, category)
    }

    /// Opens a cluster at the diagram level.
    pub fn cluster(&mut self, label: &str) -> Result<ClusterScope<'_>, TrellisError> {
        ClusterScope::open(self.session, label)
    }

    /// Connects nodes anywhere in the diagram.
    pub fn connect(
        &mut self,
        source: impl Into<Endpoints>,
        target: impl Into<Endpoints>,
        attrs: &EdgeAttrs,
    ) -> Result<usize, TrellisError> {
        self.session.connect(source, target, attrs)
    }

    /// The diagram under construction.
    pub fn draft(&self) -> Option<&Diagram> {
        self.session.stack.current()
    }

    /// Closes and renders the diagram.
    ///
    /// # Errors
    ///
    /// See [`Session::close_diagram`].
    pub fn close(self) -> Result<Rendered, TrellisError> {
        self.session.close_diagram()
    }
}

impl Drop for DiagramScope<'_> {
    fn drop(&mut self) {
        if let Some(diagram) = self.session.abort() {
            warn!(
                diagram:% = diagram.id(),
                title = diagram.title();
                "Diagram scope dropped before closing; diagram discarded"
            );
        }
    }
}

/// Guard for an open cluster; the cluster is closed when the guard drops.
pub struct ClusterScope<'a> {
    session: &'a mut Session,
    id: ClusterId,
}

impl<'a> ClusterScope<'a> {
    fn open(session: &'a mut Session, label: &str) -> Result<Self, TrellisError> {
        let id = session.open_cluster(label)?;
        Ok(Self { session, id })
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    /// Creates a node inside this cluster.
    pub fn node(&mut self, label: &str, category: &str) -> Result<NodeHandle, TrellisError> {
        self.session.create_node(label, category)
    }

    /// Opens a nested cluster.
    pub fn cluster(&mut self, label: &str) -> Result<ClusterScope<'_>, TrellisError> {
        ClusterScope::open(self.session, label)
    }

    /// Connects nodes anywhere in the diagram.
    pub fn connect(
        &mut self,
        source: impl Into<Endpoints>,
        target: impl Into<Endpoints>,
        attrs: &EdgeAttrs,
    ) -> Result<usize, TrellisError> {
        self.session.connect(source, target, attrs)
    }

    /// Closes the cluster explicitly.
    ///
    /// # Errors
    ///
    /// See [`Session::close_cluster`].
    pub fn close(self) -> Result<(), TrellisError> {
        self.session.close_cluster(self.id)
    }
}

impl Drop for ClusterScope<'_> {
    fn drop(&mut self) {
        if !self.session.stack.frames().contains(&Frame::Cluster(self.id)) {
            return;
        }
        if let Err(err) = self.session.close_cluster(self.id) {
            warn!(cluster:% = self.id, err:% = err; "Failed to close cluster scope");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, fs, io, rc::Rc};

    use trellis_core::{
        category::UnknownCategory,
        style::{Direction, OutputFormat},
    };

    use super::*;
    use crate::{config::RenderConfig, error::RenderFailure};

    #[derive(Clone, Default)]
    struct CountingEngine {
        calls: Rc<Cell<usize>>,
        fail: bool,
    }

    impl LayoutEngine for CountingEngine {
        fn render(
            &self,
            _description: &str,
            _format: OutputFormat,
            output: &Path,
        ) -> Result<(), RenderFailure> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(RenderFailure::Unavailable {
                    program: "counting".to_owned(),
                    source: io::Error::other("engine down"),
                });
            }
            fs::write(output, "image").map_err(|source| RenderFailure::Output {
                path: output.to_path_buf(),
                source,
            })
        }
    }

    fn session(dir: &Path, engine: CountingEngine) -> Session {
        Session::default()
            .with_output_dir(dir)
            .with_engine(engine)
    }

    fn settings(title: &str) -> DiagramSettings {
        DiagramSettings::new(title, Direction::TopBottom, title)
    }

    #[test]
    fn test_scope_checked_before_category() {
        let mut session = Session::default();
        let err = session.create_node("A", "no.such.Thing").unwrap_err();
        assert!(matches!(
            err,
            TrellisError::ScopeConflict(ScopeConflict::NoDiagramOpen)
        ));
    }

    #[test]
    fn test_unknown_category_aborts_diagram() {
        let dir = tempfile::tempdir().unwrap();
        let engine = CountingEngine::default();
        let mut session = session(dir.path(), engine.clone());
        session.open_diagram(settings("D")).unwrap();
        session.create_node("A", "compute").unwrap();

        let err = session.create_node("B", "no.such.Thing").unwrap_err();
        assert!(matches!(err, TrellisError::UnknownCategory(ref unknown) if unknown.category() == "no.such.Thing"));
        assert!(!session.stack().is_open());

        assert!(matches!(
            session.close(),
            Err(TrellisError::ScopeConflict(ScopeConflict::NoDiagramOpen))
        ));
        assert_eq!(engine.calls.get(), 0);
        assert!(!dir.path().join("D.png").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_out_of_order_close_aborts_diagram() {
        let mut session = Session::default();
        session.open_diagram(settings("D")).unwrap();
        let outer = session.open_cluster("Outer").unwrap();
        session.open_cluster("Inner").unwrap();

        assert!(matches!(
            session.close_cluster(outer),
            Err(TrellisError::ScopeConflict(ScopeConflict::OutOfOrderClose { .. }))
        ));
        assert!(session.stack().frames().is_empty());
    }

    #[test]
    fn test_still_open_cluster_aborts_on_close_diagram() {
        let mut session = Session::default();
        session.open_diagram(settings("D")).unwrap();
        session.open_cluster("C").unwrap();

        assert!(matches!(
            session.close_diagram(),
            Err(TrellisError::ScopeConflict(ScopeConflict::ClustersStillOpen { open: 1 }))
        ));
        assert!(!session.stack().is_open());
    }

    #[test]
    fn test_invalid_filename_rejected_before_opening() {
        let mut session = Session::default();
        assert!(matches!(
            session.open_diagram(DiagramSettings::new("D", Direction::TopBottom, "../D")),
            Err(TrellisError::InvalidAttribute(_))
        ));
        assert!(!session.stack().is_open());

        session.open_diagram(settings("D")).unwrap();
        assert!(session
            .open_diagram(DiagramSettings::new("", Direction::TopBottom, ""))
            .is_err());
        assert_eq!(session.stack().current().unwrap().title(), "D");
    }

    #[test]
    fn test_explicit_close_renders_once() {
        let dir = tempfile::tempdir().unwrap();
        let engine = CountingEngine::default();
        let mut session = session(dir.path(), engine.clone());

        session.open_diagram(settings("D")).unwrap();
        let a = session.create_node("A", "compute").unwrap();
        let c = session.open_cluster("C").unwrap();
        let b = session.create_node("B", "storage").unwrap();
        assert!(matches!(session.close().unwrap(), CloseOutcome::Cluster(id) if id == c));
        session
            .connect(a, b, &EdgeAttrs::new().with_label("x"))
            .unwrap();

        let CloseOutcome::Rendered(rendered) = session.close().unwrap() else {
            panic!("expected the diagram to render");
        };
        assert_eq!(rendered.path(), dir.path().join("D.png"));
        assert_eq!(fs::read_to_string(rendered.path()).unwrap(), "image");
        assert_eq!(rendered.diagram().edges().len(), 1);
        assert!(rendered.description().contains("subgraph cluster_1"));
        assert_eq!(engine.calls.get(), 1);
        assert!(!session.stack().is_open());
    }

    #[test]
    fn test_config_defaults_fill_settings() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default().with_render(RenderConfig::new(
            "dot",
            OutputFormat::Dot,
            Some(dir.path().to_path_buf()),
        ));
        let mut session = Session::new(config).unwrap();

        session.open_diagram(settings("Text")).unwrap();
        assert_eq!(session.stack().current().unwrap().format(), OutputFormat::Dot);
        let rendered = session.close_diagram().unwrap();
        assert_eq!(rendered.path(), dir.path().join("Text.dot"));
        assert_eq!(
            fs::read_to_string(rendered.path()).unwrap(),
            rendered.description()
        );
    }

    #[test]
    fn test_unknown_engine_is_a_config_error() {
        let config = AppConfig::default().with_render(RenderConfig::new(
            "graphviz",
            OutputFormat::Png,
            None,
        ));
        assert!(matches!(
            Session::new(config),
            Err(TrellisError::Config(ref message)) if message.contains("`graphviz`")
        ));
    }

    #[test]
    fn test_render_failure_surfaces_from_close() {
        let dir = tempfile::tempdir().unwrap();
        let engine = CountingEngine {
            fail: true,
            ..CountingEngine::default()
        };
        let mut session = session(dir.path(), engine);

        session.open_diagram(settings("D")).unwrap();
        session.create_node("A", "compute").unwrap();
        let err = session.close_diagram().unwrap_err();

        assert!(matches!(err, TrellisError::Render(RenderFailure::Unavailable { .. })));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(!session.stack().is_open());
    }

    #[test]
    fn test_dropped_diagram_scope_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let engine = CountingEngine::default();
        let mut session = session(dir.path(), engine.clone());

        let build = |session: &mut Session| -> Result<Rendered, TrellisError> {
            let mut diagram = session.diagram(settings("D"))?;
            let mut cluster = diagram.cluster("C")?;
            cluster.node("A", "compute")?;
            cluster.node("B", "not.a.Category")?;
            drop(cluster);
            diagram.close()
        };

        assert!(matches!(build(&mut session), Err(TrellisError::UnknownCategory(_))));
        assert!(!session.stack().is_open());
        assert!(session.stack().frames().is_empty());
        assert_eq!(engine.calls.get(), 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_cluster_scopes_pop_in_lifo_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), CountingEngine::default());

        let mut diagram = session.diagram(settings("D")).unwrap();
        let (outer_id, inner_id) = {
            let mut outer = diagram.cluster("Outer").unwrap();
            let inner_id = {
                let mut inner = outer.cluster("Inner").unwrap();
                inner.node("Deep", "compute").unwrap();
                inner.id()
            };
            outer.node("Shallow", "compute").unwrap();
            (outer.id(), inner_id)
        };
        diagram.node("Top", "compute").unwrap();

        let draft = diagram.draft().unwrap();
        assert_eq!(draft.cluster(inner_id).unwrap().parent(), Some(outer_id));
        assert_eq!(draft.nodes()[1].cluster(), outer_id);
        assert_eq!(draft.nodes()[2].cluster(), ClusterId::ROOT);

        let rendered = diagram.close().unwrap();
        assert_eq!(rendered.diagram().clusters().len(), 3);
    }

    #[test]
    fn test_cluster_scope_close_is_explicit() {
        let mut session = Session::default();
        let mut diagram = session.diagram(settings("D")).unwrap();
        let cluster = diagram.cluster("C").unwrap();
        cluster.close().unwrap();
        assert_eq!(diagram.draft().unwrap().clusters().len(), 2);
        drop(diagram);
        assert!(!session.stack().is_open());
    }

    #[test]
    fn test_second_diagram_guard_conflicts() {
        let mut session = Session::default();
        session.open_diagram(settings("First")).unwrap();
        assert!(matches!(
            session.diagram(settings("Second")),
            Err(TrellisError::ScopeConflict(ScopeConflict::DiagramAlreadyOpen { .. }))
        ));
        assert_eq!(session.stack().current().unwrap().title(), "First");
    }

    #[test]
    fn test_custom_icon_resolver() {
        struct Fixed;

        impl IconResolver for Fixed {
            fn resolve_icon(
                &self,
                category: Category,
            ) -> Result<trellis_core::category::IconRef, UnknownCategory> {
                if category.provider() == "acme" {
                    Ok(trellis_core::category::IconRef::new("acme.png"))
                } else {
                    Err(UnknownCategory::new(category.to_string()))
                }
            }
        }

        let mut session = Session::default().with_icon_resolver(Fixed);
        session.open_diagram(settings("D")).unwrap();
        let node = session.create_node("Broker", "acme.Broker").unwrap();
        assert_eq!(
            session.stack().current().unwrap().node(node.id()).unwrap().icon().as_str(),
            "acme.png"
        );
        assert!(session.create_node("EC2", "aws.compute.EC2").is_err());
        assert!(!session.stack().is_open());
    }
}
