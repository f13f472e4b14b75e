//! Trellis - architecture diagrams as code.
//!
//! Diagrams are built through nested scopes: a diagram contains nodes and
//! clusters, clusters contain nodes and further clusters, and edges connect
//! any two nodes of the open diagram. Closing a diagram serializes it to a
//! Graphviz description and hands it to the layout engine, which writes one
//! image per diagram.
//!
//! # Examples
//!
//! ```rust,no_run
//! use trellis::{DiagramSettings, EdgeAttrs, Session, style::{Direction, LineStyle}};
//!
//! # fn main() -> Result<(), trellis::TrellisError> {
//! let mut session = Session::default();
//! let mut diagram = session.diagram(DiagramSettings::new(
//!     "Web Service",
//!     Direction::LeftRight,
//!     "",
//! ))?;
//!
//! let lb = diagram.node("lb", "aws.network.ELB")?;
//! let workers = {
//!     let mut cluster = diagram.cluster("Services")?;
//!     vec![
//!         cluster.node("web1", "aws.compute.EC2")?,
//!         cluster.node("web2", "aws.compute.EC2")?,
//!     ]
//! };
//! let db = diagram.node("db", "aws.database.RDS")?;
//!
//! // One edge per worker on each side of the broadcast.
//! diagram.connect(lb, &workers, &EdgeAttrs::new())?;
//! diagram.connect(&workers, db, &EdgeAttrs::new().with_style(LineStyle::Dashed))?;
//!
//! let rendered = diagram.close()?;
//! println!("wrote {}", rendered.path().display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod export;

mod edge;
mod error;
mod graph;
mod render;
mod scope;
mod session;

pub use trellis_core::{category, color, identifier, style};

pub use edge::{EdgeAttrs, Endpoints};
pub use error::{RenderFailure, ScopeConflict, TrellisError};
pub use graph::{
    Child, Cluster, ClusterId, Diagram, DiagramId, DiagramSettings, Edge, Node, NodeHandle, NodeId,
};
pub use render::{Graphviz, LayoutEngine, Renderer};
pub use scope::{Closed, Frame, ScopeStack};
pub use session::{CloseOutcome, ClusterScope, DiagramScope, Rendered, Session};
