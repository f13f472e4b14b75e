//! Graphviz DOT export.
//!
//! A finished [`Diagram`] is assembled as a [`dot_structures::Graph`] and
//! printed with the `graphviz-rust` printer.

use dot_structures::{
    Attribute, Edge as DotEdge, EdgeTy, Graph, GraphAttributes, Id, Node as DotNode,
    NodeId as VertexId, Stmt, Subgraph, Vertex,
};
use graphviz_rust::printer::{DotPrinter, PrinterContext};
use log::trace;

use crate::{
    config::{Attributes, StyleConfig},
    graph::{Child, Cluster, Diagram, Edge, Node, NodeId},
};

const FONT_NAME: &str = "Sans-Serif";
const FONT_COLOR: &str = "#2D3436";

/// Cluster background colors, cycled by nesting depth.
const CLUSTER_BACKGROUNDS: [&str; 4] = ["#E5F5FD", "#EBF3E7", "#ECE8F6", "#FDF7E3"];

const NODE_BASE_HEIGHT: f64 = 1.9;
const NODE_LINE_HEIGHT: f64 = 0.4;

/// Serializes `diagram` to a DOT description.
///
/// # Examples
///
/// ```
/// use trellis::{Session, DiagramSettings, EdgeAttrs, config::StyleConfig, export::to_dot};
/// use trellis::style::Direction;
///
/// let mut session = Session::default();
/// session.open_diagram(DiagramSettings::new("D", Direction::TopBottom, "D")).unwrap();
/// let a = session.create_node("A", "compute").unwrap();
/// let b = session.create_node("B", "storage").unwrap();
/// session.connect(a, b, &EdgeAttrs::new()).unwrap();
/// let diagram = session.abort().unwrap();
///
/// let dot = to_dot(&diagram, &StyleConfig::default());
/// assert!(dot.starts_with("digraph"));
/// assert!(dot.contains("n0 -> n1"));
/// ```
pub fn to_dot(diagram: &Diagram, style: &StyleConfig) -> String {
    let dot = to_graph(diagram, style).print(&mut PrinterContext::default());
    trace!(
        diagram:% = diagram.id(),
        bytes = dot.len();
        "Serialized diagram"
    );
    dot
}

/// Builds the DOT graph for `diagram`.
///
/// Graph, node and edge defaults come first, then the cluster tree is walked
/// depth-first in creation order: nodes are placed inside the `subgraph` of
/// the cluster that owns them. Edges follow in insertion order. Every
/// attribute list is built as built-in defaults, then diagram values, then
/// the overrides from `style`.
pub fn to_graph(diagram: &Diagram, style: &StyleConfig) -> Graph {
    let mut stmts = vec![
        Stmt::GAttribute(GraphAttributes::Graph(attr_list(&graph_attributes(
            diagram, style,
        )))),
        Stmt::GAttribute(GraphAttributes::Node(attr_list(&merged(
            node_defaults(),
            style.node(),
        )))),
        Stmt::GAttribute(GraphAttributes::Edge(attr_list(&merged(
            edge_defaults(),
            style.edge(),
        )))),
    ];
    push_children(&mut stmts, diagram, diagram.root(), style);
    stmts.extend(diagram.edges().iter().map(edge_stmt));

    Graph::DiGraph {
        id: quoted(diagram.title()),
        strict: false,
        stmts,
    }
}

fn push_children(stmts: &mut Vec<Stmt>, diagram: &Diagram, cluster: &Cluster, style: &StyleConfig) {
    for child in cluster.children() {
        match *child {
            Child::Node(id) => {
                if let Some(node) = diagram.node(id) {
                    stmts.push(node_stmt(node));
                }
            }
            Child::Cluster(id) => {
                if let Some(sub) = diagram.cluster(id) {
                    stmts.push(Stmt::Subgraph(subgraph(diagram, sub, style)));
                }
            }
        }
    }
}

fn subgraph(diagram: &Diagram, cluster: &Cluster, style: &StyleConfig) -> Subgraph {
    let mut stmts = vec![Stmt::GAttribute(GraphAttributes::Graph(attr_list(
        &cluster_attributes(cluster, style),
    )))];
    push_children(&mut stmts, diagram, cluster, style);
    Subgraph {
        id: Id::Plain(cluster.id().to_string()),
        stmts,
    }
}

fn node_stmt(node: &Node) -> Stmt {
    let height = format!("{:.1}", node_height(node.label()));
    let attrs = attributes(&[
        ("label", node.label()),
        ("image", node.icon().as_str()),
        ("shape", "none"),
        ("height", height.as_str()),
    ]);
    Stmt::Node(DotNode {
        id: vertex_id(node.id()),
        attributes: attr_list(&attrs),
    })
}

fn edge_stmt(edge: &Edge) -> Stmt {
    let mut attrs = attributes(&[
        ("fontcolor", FONT_COLOR),
        ("fontname", FONT_NAME),
        ("fontsize", "13"),
        ("dir", edge.direction().to_dot_value()),
    ]);
    if let Some(label) = edge.label() {
        attrs.insert("label".to_owned(), label.to_owned());
    }
    if let Some(color) = edge.color() {
        attrs.insert("color".to_owned(), color.to_hex());
    }
    attrs.insert("style".to_owned(), edge.style().to_dot_value().to_owned());

    Stmt::Edge(DotEdge {
        ty: EdgeTy::Pair(
            Vertex::N(vertex_id(edge.source())),
            Vertex::N(vertex_id(edge.target())),
        ),
        attributes: attr_list(&attrs),
    })
}

fn vertex_id(id: NodeId) -> VertexId {
    VertexId(Id::Plain(id.to_string()), None)
}

fn graph_attributes(diagram: &Diagram, style: &StyleConfig) -> Attributes {
    let mut attrs = attributes(&[
        ("pad", "2.0"),
        ("splines", diagram.curve_style().splines()),
        ("nodesep", "0.60"),
        ("ranksep", "0.75"),
        ("fontname", FONT_NAME),
        ("fontsize", "15"),
        ("fontcolor", FONT_COLOR),
    ]);
    attrs.insert("label".to_owned(), diagram.title().to_owned());
    attrs.insert("rankdir".to_owned(), diagram.direction().rankdir().to_owned());
    merged(attrs, style.graph())
}

fn node_defaults() -> Attributes {
    attributes(&[
        ("shape", "box"),
        ("style", "rounded"),
        ("fixedsize", "true"),
        ("width", "1.4"),
        ("height", "1.4"),
        ("labelloc", "b"),
        ("imagescale", "true"),
        ("fontname", FONT_NAME),
        ("fontsize", "13"),
        ("fontcolor", FONT_COLOR),
    ])
}

fn edge_defaults() -> Attributes {
    attributes(&[("color", "#7B8894")])
}

fn cluster_attributes(cluster: &Cluster, style: &StyleConfig) -> Attributes {
    let mut attrs = attributes(&[
        ("shape", "box"),
        ("style", "rounded"),
        ("labeljust", "l"),
        ("pencolor", "#AEB6BE"),
        ("fontname", FONT_NAME),
        ("fontsize", "12"),
    ]);
    attrs.insert("label".to_owned(), cluster.label().to_owned());
    attrs.insert("bgcolor".to_owned(), cluster_background(cluster.depth()).to_owned());
    merged(attrs, style.cluster())
}

/// Background for a cluster at `depth`; top-level clusters are depth 1.
fn cluster_background(depth: usize) -> &'static str {
    CLUSTER_BACKGROUNDS[depth.saturating_sub(1) % CLUSTER_BACKGROUNDS.len()]
}

/// Vertex height: the base height plus one step per extra label line.
fn node_height(label: &str) -> f64 {
    let extra_lines = label.matches('\n').count() as f64;
    NODE_BASE_HEIGHT + NODE_LINE_HEIGHT * extra_lines
}

fn attributes(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

fn merged(mut base: Attributes, overrides: &Attributes) -> Attributes {
    for (key, value) in overrides {
        base.insert(key.clone(), value.clone());
    }
    base
}

/// Escapes a value for use inside a double-quoted DOT string.
fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn quoted(value: &str) -> Id {
    Id::Escaped(format!("\"{}\"", escape(value)))
}

/// Plain identifiers stay bare; anything else is quoted.
fn key(key: &str) -> Id {
    let plain = !key.is_empty()
        && !key.starts_with(|c: char| c.is_ascii_digit())
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        Id::Plain(key.to_owned())
    } else {
        quoted(key)
    }
}

fn attr_list(attrs: &Attributes) -> Vec<Attribute> {
    attrs
        .iter()
        .map(|(name, value)| Attribute(key(name), quoted(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use trellis_core::{
        category::{Category, IconRef},
        color::Color,
        style::{CurveStyle, Direction, EdgeDirection, LineStyle},
    };

    use super::*;
    use crate::graph::{ClusterId, DiagramId, DiagramSettings};

    fn diagram(title: &str) -> Diagram {
        Diagram::new(
            DiagramId(0),
            DiagramSettings::new(title, Direction::TopBottom, "d"),
        )
    }

    fn add_node(diagram: &mut Diagram, label: &str, parent: ClusterId) -> NodeId {
        diagram.add_node(
            label.to_owned(),
            Category::parse("compute").unwrap(),
            IconRef::new("resources/generic/compute/rack.png"),
            parent,
        )
    }

    fn edge(source: NodeId, target: NodeId, label: &str) -> Edge {
        Edge::new(
            source,
            target,
            Some(label.to_owned()),
            None,
            LineStyle::Solid,
            EdgeDirection::Forward,
        )
    }

    fn statements(graph: &Graph) -> &[Stmt] {
        match graph {
            Graph::DiGraph { stmts, .. } => stmts,
            Graph::Graph { .. } => panic!("expected a directed graph"),
        }
    }

    /// Quoted value of attribute `name`, as written to the description.
    fn value<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
        attrs.iter().find_map(|Attribute(key, value)| match (key, value) {
            (Id::Plain(key), Id::Escaped(value)) if key == name => Some(value.as_str()),
            _ => None,
        })
    }

    fn plain(id: &Id) -> &str {
        match id {
            Id::Plain(text) => text,
            other => panic!("expected a bare identifier, got {other:?}"),
        }
    }

    fn nodes(stmts: &[Stmt]) -> Vec<&DotNode> {
        stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Node(node) => Some(node),
                _ => None,
            })
            .collect()
    }

    fn subgraphs(stmts: &[Stmt]) -> Vec<&Subgraph> {
        stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Subgraph(subgraph) => Some(subgraph),
                _ => None,
            })
            .collect()
    }

    fn edges(stmts: &[Stmt]) -> Vec<&DotEdge> {
        stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Edge(edge) => Some(edge),
                _ => None,
            })
            .collect()
    }

    fn endpoints(edge: &DotEdge) -> (&str, &str) {
        match &edge.ty {
            EdgeTy::Pair(Vertex::N(source), Vertex::N(target)) => (plain(&source.0), plain(&target.0)),
            other => panic!("expected a node pair, got {other:?}"),
        }
    }

    fn graph_attrs(stmts: &[Stmt]) -> &[Attribute] {
        match stmts.first() {
            Some(Stmt::GAttribute(GraphAttributes::Graph(attrs))) => attrs,
            other => panic!("expected a graph attribute statement, got {other:?}"),
        }
    }

    #[test]
    fn test_root_node_subgraph_and_edge() {
        let mut d = diagram("D");
        let a = add_node(&mut d, "A", ClusterId::ROOT);
        let c = d.add_cluster("C".to_owned(), ClusterId::ROOT);
        let b = add_node(&mut d, "B", c);
        d.push_edges([edge(a, b, "x")]);

        let graph = to_graph(&d, &StyleConfig::default());
        let top = statements(&graph);

        let top_nodes = nodes(top);
        assert_eq!(top_nodes.len(), 1);
        assert_eq!(plain(&top_nodes[0].id.0), "n0");
        assert_eq!(value(&top_nodes[0].attributes, "label"), Some("\"A\""));

        let clusters = subgraphs(top);
        assert_eq!(clusters.len(), 1);
        assert_eq!(plain(&clusters[0].id), "cluster_1");
        let inner = nodes(&clusters[0].stmts);
        assert_eq!(inner.len(), 1);
        assert_eq!(value(&inner[0].attributes, "label"), Some("\"B\""));

        let connections = edges(top);
        assert_eq!(connections.len(), 1);
        assert_eq!(endpoints(connections[0]), ("n0", "n1"));
        assert_eq!(value(&connections[0].attributes, "label"), Some("\"x\""));

        let dot = to_dot(&d, &StyleConfig::default());
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("subgraph cluster_1"));
        assert!(dot.contains("n0 -> n1"));
    }

    #[test]
    fn test_graph_attributes() {
        let graph = to_graph(&diagram("My Title"), &StyleConfig::default());
        let Graph::DiGraph { id, strict, .. } = &graph else {
            panic!("expected a directed graph");
        };
        assert_eq!(*id, Id::Escaped("\"My Title\"".to_owned()));
        assert!(!strict);

        let top = statements(&graph);
        let attrs = graph_attrs(top);
        assert_eq!(attrs[0], Attribute(Id::Plain("pad".to_owned()), Id::Escaped("\"2.0\"".to_owned())));
        assert_eq!(value(attrs, "splines"), Some("\"ortho\""));
        assert_eq!(value(attrs, "label"), Some("\"My Title\""));
        assert_eq!(value(attrs, "rankdir"), Some("\"TB\""));

        assert!(matches!(top[1], Stmt::GAttribute(GraphAttributes::Node(_))));
        assert!(matches!(top[2], Stmt::GAttribute(GraphAttributes::Edge(_))));
    }

    #[test]
    fn test_curve_style_and_overrides() {
        let mut d = Diagram::new(
            DiagramId(0),
            DiagramSettings::new("D", Direction::LeftRight, "d")
                .with_curve_style(CurveStyle::Curved),
        );
        add_node(&mut d, "A", ClusterId::ROOT);
        d.add_cluster("C".to_owned(), ClusterId::ROOT);

        let style: StyleConfig = toml::from_str(
            r##"
            graph = { pad = "0.5" }
            node = { fontsize = "20" }
            cluster = { bgcolor = "#FFFFFF" }
            "##,
        )
        .unwrap();
        let graph = to_graph(&d, &style);
        let top = statements(&graph);

        let attrs = graph_attrs(top);
        assert_eq!(value(attrs, "splines"), Some("\"curved\""));
        assert_eq!(value(attrs, "rankdir"), Some("\"LR\""));
        assert_eq!(value(attrs, "pad"), Some("\"0.5\""));

        let Stmt::GAttribute(GraphAttributes::Node(node_attrs)) = &top[1] else {
            panic!("expected node defaults");
        };
        assert_eq!(value(node_attrs, "fontsize"), Some("\"20\""));

        let cluster = subgraphs(top)[0];
        assert_eq!(value(graph_attrs(&cluster.stmts), "bgcolor"), Some("\"#FFFFFF\""));
    }

    #[test]
    fn test_nested_clusters_follow_tree() {
        let mut d = diagram("D");
        let mut parent = ClusterId::ROOT;
        for depth in 1..=5 {
            parent = d.add_cluster(format!("L{depth}"), parent);
        }
        add_node(&mut d, "Deep", parent);

        let graph = to_graph(&d, &StyleConfig::default());

        let mut level = statements(&graph);
        let mut backgrounds = Vec::new();
        for depth in 1..=5 {
            assert!(nodes(level).is_empty(), "no vertex above depth {depth}");
            let nested = subgraphs(level);
            assert_eq!(nested.len(), 1);
            assert_eq!(plain(&nested[0].id), format!("cluster_{depth}"));
            backgrounds.push(value(graph_attrs(&nested[0].stmts), "bgcolor").unwrap());
            level = &nested[0].stmts;
        }
        assert_eq!(nodes(level).len(), 1);

        // Backgrounds cycle through the palette with depth.
        assert_eq!(
            backgrounds,
            vec!["\"#E5F5FD\"", "\"#EBF3E7\"", "\"#ECE8F6\"", "\"#FDF7E3\"", "\"#E5F5FD\""]
        );
    }

    #[test]
    fn test_children_interleave_in_creation_order() {
        let mut d = diagram("D");
        add_node(&mut d, "first", ClusterId::ROOT);
        let c = d.add_cluster("C".to_owned(), ClusterId::ROOT);
        add_node(&mut d, "inside", c);
        add_node(&mut d, "last", ClusterId::ROOT);

        let graph = to_graph(&d, &StyleConfig::default());
        let order: Vec<String> = statements(&graph)
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Node(node) => Some(plain(&node.id.0).to_owned()),
                Stmt::Subgraph(subgraph) => Some(plain(&subgraph.id).to_owned()),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec!["n0", "cluster_1", "n2"]);
    }

    #[test]
    fn test_edges_keep_order_and_attributes() {
        let mut d = diagram("D");
        let a = add_node(&mut d, "A", ClusterId::ROOT);
        let b = add_node(&mut d, "B", ClusterId::ROOT);
        d.push_edges([
            edge(b, a, "second-first"),
            Edge::new(
                a,
                b,
                None,
                Some(Color::new("purple").unwrap()),
                LineStyle::Dashed,
                EdgeDirection::Both,
            ),
            edge(b, a, "second-first"),
        ]);

        let graph = to_graph(&d, &StyleConfig::default());
        let connections = edges(statements(&graph));
        assert_eq!(connections.len(), 3);
        assert_eq!(endpoints(connections[0]), ("n1", "n0"));
        assert_eq!(connections[0], connections[2]);

        let styled = &connections[1].attributes;
        assert_eq!(value(styled, "color"), Some("\"#800080\""));
        assert_eq!(value(styled, "style"), Some("\"dashed\""));
        assert_eq!(value(styled, "dir"), Some("\"both\""));
        assert_eq!(value(styled, "label"), None);
    }

    #[test]
    fn test_multiline_label_grows_node() {
        let mut d = diagram("D");
        add_node(&mut d, "Web\nServer\nPrimary", ClusterId::ROOT);

        let graph = to_graph(&d, &StyleConfig::default());
        let node = nodes(statements(&graph))[0];
        assert_eq!(
            value(&node.attributes, "label"),
            Some("\"Web\\nServer\\nPrimary\"")
        );
        assert_eq!(value(&node.attributes, "height"), Some("\"2.7\""));
    }

    #[test]
    fn test_output_is_deterministic() {
        let build = || {
            let mut d = diagram("D");
            let a = add_node(&mut d, "A", ClusterId::ROOT);
            let c = d.add_cluster("C".to_owned(), ClusterId::ROOT);
            let b = add_node(&mut d, "B", c);
            d.push_edges([edge(a, b, "x"), edge(b, a, "y")]);
            to_dot(&d, &StyleConfig::default())
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_escape_and_keys() {
        assert_eq!(escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape("a\\b"), "a\\\\b");
        assert_eq!(escape("a\nb"), "a\\nb");
        assert_eq!(key("fontsize"), Id::Plain("fontsize".to_owned()));
        assert_eq!(key("odd key"), Id::Escaped("\"odd key\"".to_owned()));
        assert_eq!(key("3d"), Id::Escaped("\"3d\"".to_owned()));
    }

    proptest! {
        #[test]
        fn escaped_values_stay_inside_quotes(value in any::<String>()) {
            let escaped = escape(&value);
            prop_assert!(!escaped.contains('\n'));

            // Every quote in the output is preceded by an odd run of backslashes.
            let bytes = escaped.as_bytes();
            for (index, byte) in bytes.iter().enumerate() {
                if *byte == b'"' {
                    let run = bytes[..index].iter().rev().take_while(|b| **b == b'\\').count();
                    prop_assert_eq!(run % 2, 1);
                }
            }
        }
    }
}
