//! DOT document generation.
//!
//! [`DotExporter`] turns a validated [`Diagram`] into a `dot_structures`
//! graph. Clusters become `cluster_<n>` subgraphs, nodes are named `n<index>`
//! after their declaration order, and every text value is a quoted DOT string.
//!
//! The native flavor produces a flat document without clusters or Graphviz
//! styling, which is the subset `layout-rs` understands.

use std::path::PathBuf;

use dot_structures::{
    Attribute, Edge, EdgeTy, Graph, GraphAttributes, Id, Node, NodeId, Stmt, Subgraph, Vertex,
};
use graphviz_rust::printer::{DotPrinter, PrinterContext};
use log::trace;

use cloudsketch_core::{
    color::Color,
    semantic::{Cluster, Diagram, LineStyle, Node as DiagramNode, NodeKind, NodeRef},
};

use crate::{CloudsketchError, config::AppConfig};

const TEXT_COLOR: &str = "#2D3436";
const CLUSTER_PEN_COLOR: &str = "#AEB6BE";

/// Which consumer the document is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Graphviz,
    Native,
}

/// Builds DOT documents from diagrams.
#[derive(Debug)]
pub struct DotExporter<'a> {
    config: &'a AppConfig,
    flavor: Flavor,
}

impl<'a> DotExporter<'a> {
    /// Exporter producing the full Graphviz document.
    pub fn new(config: &'a AppConfig) -> Self {
        Self {
            config,
            flavor: Flavor::Graphviz,
        }
    }

    /// Exporter producing the flat document consumed by the native engine.
    pub fn native(config: &'a AppConfig) -> Self {
        Self {
            config,
            flavor: Flavor::Native,
        }
    }

    /// Build the DOT graph for `diagram`.
    ///
    /// The diagram must have been validated with
    /// [`DiagramGraph::from_diagram`](crate::structure::DiagramGraph::from_diagram).
    ///
    /// # Errors
    ///
    /// Returns [`CloudsketchError::Style`] if a configured color is invalid.
    pub fn build(&self, diagram: &Diagram) -> Result<Graph, CloudsketchError> {
        let stmts = match self.flavor {
            Flavor::Graphviz => self.graphviz_stmts(diagram)?,
            Flavor::Native => self.native_stmts(diagram),
        };

        Ok(Graph::DiGraph {
            id: plain("G"),
            strict: false,
            stmts,
        })
    }

    /// Build the DOT graph for `diagram` and print it as text.
    pub fn export_string(&self, diagram: &Diagram) -> Result<String, CloudsketchError> {
        let graph = self.build(diagram)?;
        let dot = graph.print(&mut PrinterContext::default());
        trace!(title = diagram.title(), dot = dot.as_str(); "DOT document generated");
        Ok(dot)
    }

    fn graphviz_stmts(&self, diagram: &Diagram) -> Result<Vec<Stmt>, CloudsketchError> {
        let layout = self.config.layout();
        let style = self.config.style();

        let background = style.background_color().map_err(CloudsketchError::Style)?;
        let edge_color = style.edge_color().map_err(CloudsketchError::Style)?;
        let palette = style.cluster_colors().map_err(CloudsketchError::Style)?;

        let mut stmts = vec![
            Stmt::GAttribute(GraphAttributes::Graph(vec![
                attr("label", quoted(diagram.title())),
                attr("labelloc", plain("t")),
                attr("fontname", quoted(style.font_name())),
                attr("fontsize", number(style.font_size())),
                attr("fontcolor", quoted(TEXT_COLOR)),
                attr("bgcolor", color(background)),
                attr("pad", number(style.pad())),
                attr("rankdir", plain(diagram.direction().to_string())),
                attr("splines", quoted(layout.splines())),
                attr("nodesep", number(layout.nodesep())),
                attr("ranksep", number(layout.ranksep())),
            ])),
            Stmt::GAttribute(GraphAttributes::Node(vec![
                attr("style", quoted("rounded,filled")),
                attr("fontname", quoted(style.font_name())),
                attr("fontsize", plain("13")),
                attr("fontcolor", quoted(TEXT_COLOR)),
                attr("fixedsize", plain("false")),
                attr("width", plain("1.4")),
                attr("height", plain("1.4")),
            ])),
            Stmt::GAttribute(GraphAttributes::Edge(vec![
                attr("color", color(edge_color)),
                attr("fontname", quoted(style.font_name())),
                attr("fontsize", plain("11")),
                attr("fontcolor", quoted(TEXT_COLOR)),
            ])),
        ];

        let mut cluster_counter = 0;
        self.scope_stmts(
            diagram,
            diagram.root(),
            0,
            &palette,
            &mut cluster_counter,
            &mut stmts,
        )?;

        for edge in diagram.edges() {
            let link = edge.link();
            let mut attributes = Vec::new();
            if let Some(label) = link.label() {
                attributes.push(attr("label", quoted(label)));
            }
            if let Some(link_color) = link.color() {
                attributes.push(attr("color", color(link_color)));
            }
            if link.style() != LineStyle::Solid {
                let line_style: &'static str = link.style().into();
                attributes.push(attr("style", plain(line_style)));
            }
            stmts.push(edge_stmt(edge.source(), edge.target(), attributes));
        }

        Ok(stmts)
    }

    /// Append the nodes and nested clusters of `scope` to `stmts`.
    fn scope_stmts(
        &self,
        diagram: &Diagram,
        scope: &Cluster,
        depth: usize,
        palette: &[Color],
        cluster_counter: &mut usize,
        stmts: &mut Vec<Stmt>,
    ) -> Result<(), CloudsketchError> {
        for &node_ref in scope.nodes() {
            if let Some(node) = diagram.node(node_ref) {
                stmts.push(self.node_stmt(node_ref, node)?);
            }
        }

        for cluster in scope.clusters() {
            let id = plain(format!("cluster_{cluster_counter}"));
            *cluster_counter += 1;

            let mut cluster_stmts = vec![
                Stmt::Attribute(attr("label", quoted(cluster.label()))),
                Stmt::Attribute(attr("labeljust", plain("l"))),
                Stmt::Attribute(attr("style", plain("rounded"))),
                Stmt::Attribute(attr("pencolor", quoted(CLUSTER_PEN_COLOR))),
                Stmt::Attribute(attr("fontsize", plain("12"))),
            ];
            if !palette.is_empty() {
                let fill = palette[depth % palette.len()];
                cluster_stmts.push(Stmt::Attribute(attr("bgcolor", color(fill))));
            }

            self.scope_stmts(
                diagram,
                cluster,
                depth + 1,
                palette,
                cluster_counter,
                &mut cluster_stmts,
            )?;

            stmts.push(Stmt::Subgraph(Subgraph {
                id,
                stmts: cluster_stmts,
            }));
        }

        Ok(())
    }

    fn node_stmt(&self, node_ref: NodeRef, node: &DiagramNode) -> Result<Stmt, CloudsketchError> {
        let style = self.config.style();
        let kind = node.kind();
        let fill = style.node_color(kind).map_err(CloudsketchError::Style)?;

        let mut attributes = vec![
            attr("label", quoted(&node_label(node))),
            attr("fillcolor", color(fill)),
        ];
        match self.icon_path(kind) {
            Some(icon) => {
                attributes.push(attr("shape", plain("none")));
                attributes.push(attr("image", quoted(&icon.display().to_string())));
                attributes.push(attr("imagescale", plain("true")));
                attributes.push(attr("labelloc", plain("b")));
                attributes.push(attr("height", plain("1.9")));
            }
            None => attributes.push(attr("shape", plain(kind.shape()))),
        }

        Ok(Stmt::Node(Node {
            id: node_id(node_ref),
            attributes,
        }))
    }

    fn icon_path(&self, kind: NodeKind) -> Option<PathBuf> {
        self.config
            .style()
            .icon_dir()
            .map(|dir| dir.join(format!("{kind}.png")))
            .filter(|path| path.is_file())
    }

    fn native_stmts(&self, diagram: &Diagram) -> Vec<Stmt> {
        let mut stmts: Vec<Stmt> = diagram
            .node_refs()
            .zip(diagram.nodes())
            .map(|(node_ref, node)| {
                let label = node_label(node).replace('\n', " ");
                Stmt::Node(Node {
                    id: node_id(node_ref),
                    attributes: vec![attr("label", quoted(&label)), attr("shape", plain("box"))],
                })
            })
            .collect();

        stmts.extend(diagram.edges().iter().map(|edge| {
            let attributes = edge
                .link()
                .label()
                .map(|label| vec![attr("label", quoted(label))])
                .unwrap_or_default();
            edge_stmt(edge.source(), edge.target(), attributes)
        }));

        stmts
    }
}

/// The node label with the provider caption appended on its own line,
/// unless the label already names the provider.
fn node_label(node: &DiagramNode) -> String {
    match node.kind().caption() {
        Some(caption) if !node.label().to_lowercase().contains(&caption.to_lowercase()) => {
            format!("{}\n[{caption}]", node.label())
        }
        _ => node.label().to_string(),
    }
}

fn node_id(node_ref: NodeRef) -> NodeId {
    NodeId(plain(format!("n{}", node_ref.index())), None)
}

fn edge_stmt(source: NodeRef, target: NodeRef, attributes: Vec<Attribute>) -> Stmt {
    Stmt::Edge(Edge {
        ty: EdgeTy::Pair(Vertex::N(node_id(source)), Vertex::N(node_id(target))),
        attributes,
    })
}

fn attr(key: &str, value: Id) -> Attribute {
    Attribute(plain(key), value)
}

fn plain(text: impl Into<String>) -> Id {
    Id::Plain(text.into())
}

fn number(value: f32) -> Id {
    Id::Plain(value.to_string())
}

fn color(value: Color) -> Id {
    quoted(&value.to_hex())
}

fn quoted(text: &str) -> Id {
    Id::Escaped(escape(text))
}

/// Quote `text` as a DOT string. Line breaks become the `\n` label escape.
pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            ch => escaped.push(ch),
        }
    }
    escaped.push('"');
    escaped
}

#[cfg(test)]
mod tests {
    use std::fs;

    use proptest::prelude::*;

    use cloudsketch_core::semantic::{DiagramBuilder, Direction, Link, NodeKind};

    use super::*;
    use crate::config::{LayoutConfig, StyleConfig};

    fn sample() -> Diagram {
        DiagramBuilder::new("Sample \"Quoted\" Title")
            .direction(Direction::LeftToRight)
            .build(|canvas| {
                let admin = canvas.node(NodeKind::User, "Admin");
                let (api, handler) = canvas.cluster("App", |canvas| {
                    let api = canvas.node(NodeKind::Api, "REST API\nMyBlog API");
                    let handler = canvas.cluster("Functions", |canvas| {
                        canvas.node(NodeKind::Compute, "get-posts")
                    });
                    (api, handler)
                });
                canvas
                    .path(admin)
                    .to_with(api, Link::labeled("JWT").with_style(LineStyle::Dashed))
                    .to(handler);
            })
    }

    fn collect_stmts<'g>(stmts: &'g [Stmt], out: &mut Vec<&'g Stmt>) {
        for stmt in stmts {
            out.push(stmt);
            if let Stmt::Subgraph(subgraph) = stmt {
                collect_stmts(&subgraph.stmts, out);
            }
        }
    }

    fn all_stmts(graph: &Graph) -> Vec<&Stmt> {
        let stmts = match graph {
            Graph::DiGraph { stmts, .. } | Graph::Graph { stmts, .. } => stmts,
        };
        let mut out = Vec::new();
        collect_stmts(stmts, &mut out);
        out
    }

    #[test]
    fn test_graph_has_one_statement_per_node_edge_and_cluster() {
        let config = AppConfig::default();
        let graph = DotExporter::new(&config).build(&sample()).unwrap();
        let stmts = all_stmts(&graph);

        let nodes = stmts.iter().filter(|s| matches!(s, Stmt::Node(_))).count();
        let edges = stmts.iter().filter(|s| matches!(s, Stmt::Edge(_))).count();
        let clusters = stmts
            .iter()
            .filter(|s| matches!(s, Stmt::Subgraph(_)))
            .count();

        assert_eq!(nodes, 3);
        assert_eq!(edges, 2);
        assert_eq!(clusters, 2);
    }

    #[test]
    fn test_dot_text_carries_layout_and_labels() {
        let config = AppConfig::default();
        let dot = DotExporter::new(&config).export_string(&sample()).unwrap();

        assert!(dot.contains("digraph"));
        assert!(dot.contains("rankdir"));
        assert!(dot.contains("LR"));
        assert!(dot.contains("cluster_0"));
        assert!(dot.contains("cluster_1"));
        assert!(dot.contains(r#""Sample \"Quoted\" Title""#));
        assert!(dot.contains(r#""JWT""#));
        assert!(dot.contains("dashed"));
        assert!(dot.contains(r#""REST API\nMyBlog API\n[API Gateway]""#));
        assert!(dot.contains(r#""get-posts\n[Lambda]""#));
    }

    #[test]
    fn test_export_is_deterministic() {
        let config = AppConfig::default();
        let diagram = sample();
        let exporter = DotExporter::new(&config);
        assert_eq!(
            exporter.export_string(&diagram).unwrap(),
            exporter.export_string(&diagram).unwrap()
        );
    }

    #[test]
    fn test_caption_not_repeated() {
        let node = DiagramNode::new(NodeKind::Cdn, "CloudFront\n(Media)");
        assert_eq!(node_label(&node), "CloudFront\n(Media)");

        let node = DiagramNode::new(NodeKind::Users, "General Users");
        assert_eq!(node_label(&node), "General Users");

        let node = DiagramNode::new(NodeKind::Storage, "Media Files");
        assert_eq!(node_label(&node), "Media Files\n[S3]");
    }

    #[test]
    fn test_icon_used_when_present() {
        let icons = tempfile::tempdir().unwrap();
        fs::write(icons.path().join("compute.png"), b"\x89PNG").unwrap();

        let config = AppConfig::new(
            LayoutConfig::default(),
            StyleConfig::default().with_icon_dir(icons.path()),
        );
        let dot = DotExporter::new(&config).export_string(&sample()).unwrap();

        assert!(dot.contains("compute.png"));
        assert!(!dot.contains("api.png"), "only existing icons are referenced");
    }

    #[test]
    fn test_native_flavor_is_flat() {
        let config = AppConfig::default();
        let graph = DotExporter::native(&config).build(&sample()).unwrap();
        let stmts = all_stmts(&graph);

        assert!(stmts.iter().all(|s| !matches!(s, Stmt::Subgraph(_))));
        assert_eq!(
            stmts.iter().filter(|s| matches!(s, Stmt::Node(_))).count(),
            3
        );
        assert_eq!(
            stmts.iter().filter(|s| matches!(s, Stmt::Edge(_))).count(),
            2
        );
    }

    #[test]
    fn test_escape_examples() {
        assert_eq!(escape("plain"), r#""plain""#);
        assert_eq!(escape("a\nb"), r#""a\nb""#);
        assert_eq!(escape(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(escape(r"back\slash"), r#""back\\slash""#);
    }

    fn unescape(quoted: &str) -> String {
        let inner = &quoted[1..quoted.len() - 1];
        let mut out = String::new();
        let mut chars = inner.chars();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some(other) => out.push(other),
                    None => out.push('\\'),
                }
            } else {
                out.push(ch);
            }
        }
        out
    }

    proptest! {
        #[test]
        fn escape_yields_one_well_formed_string(text in any::<String>()) {
            let escaped = escape(&text);

            prop_assert!(escaped.len() >= 2);
            prop_assert!(escaped.starts_with('"') && escaped.ends_with('"'));
            prop_assert!(!escaped.contains('\n'));
            prop_assert_eq!(unescape(&escaped), text.replace('\r', ""));
        }
    }
}
