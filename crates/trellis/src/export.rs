//! Serialization of finished diagrams into layout-engine descriptions.
//!
//! The only backend is Graphviz DOT. [`to_graph`] builds the
//! [`dot_structures::Graph`] and [`to_dot`] prints it. Both are pure functions
//! of the [`Diagram`](crate::Diagram) and the
//! [`StyleConfig`](crate::config::StyleConfig): identical construction
//! sequences produce byte-identical text.

mod dot;

pub use dot::{to_dot, to_graph};
