//! Graph view of a declared diagram.
//!
//! [`DiagramGraph`] turns a [`Diagram`] into a `petgraph` directed graph with
//! one graph node per declared node and one graph edge per declared edge.
//! Building it validates every edge handle; the export stage relies on that.

use log::{debug, warn};
use petgraph::{
    Direction::{Incoming, Outgoing},
    graph::{DiGraph, NodeIndex},
};

use cloudsketch_core::semantic::{Diagram, NodeRef};

use crate::CloudsketchError;

/// Validated directed graph of a diagram.
///
/// Graph node weights are the declared [`NodeRef`]s; edge weights are the
/// positions of the edges in declaration order.
#[derive(Debug)]
pub struct DiagramGraph {
    graph: DiGraph<NodeRef, usize>,
}

impl DiagramGraph {
    /// Build and validate the graph for `diagram`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudsketchError::Graph`] if an edge references a node of
    /// another diagram or a node that does not exist.
    pub fn from_diagram(diagram: &Diagram) -> Result<Self, CloudsketchError> {
        let mut graph = DiGraph::with_capacity(diagram.nodes().len(), diagram.edges().len());
        for node_ref in diagram.node_refs() {
            graph.add_node(node_ref);
        }

        for (position, edge) in diagram.edges().iter().enumerate() {
            let source = resolve(diagram, edge.source(), position)?;
            let target = resolve(diagram, edge.target(), position)?;
            graph.add_edge(source, target, position);
        }

        let diagram_graph = Self { graph };
        debug!(
            title = diagram.title(),
            nodes = diagram_graph.node_count(),
            edges = diagram_graph.edge_count();
            "Diagram graph built"
        );

        Ok(diagram_graph)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of edges leaving `node_ref`, or 0 if it is not in this graph.
    pub fn out_degree(&self, node_ref: NodeRef) -> usize {
        self.index_of(node_ref)
            .map(|index| self.graph.edges_directed(index, Outgoing).count())
            .unwrap_or(0)
    }

    /// Number of edges entering `node_ref`, or 0 if it is not in this graph.
    pub fn in_degree(&self, node_ref: NodeRef) -> usize {
        self.index_of(node_ref)
            .map(|index| self.graph.edges_directed(index, Incoming).count())
            .unwrap_or(0)
    }

    /// Nodes without incoming edges, in declaration order.
    pub fn roots(&self) -> Vec<NodeRef> {
        self.graph
            .externals(Incoming)
            .map(|index| self.graph[index])
            .collect()
    }

    /// Nodes without any edges, in declaration order.
    pub fn isolated(&self) -> Vec<NodeRef> {
        self.graph
            .node_indices()
            .filter(|&index| self.graph.neighbors_undirected(index).next().is_none())
            .map(|index| self.graph[index])
            .collect()
    }

    /// Log a warning for every node without edges.
    pub fn warn_isolated(&self, diagram: &Diagram) {
        for node_ref in self.isolated() {
            if let Some(node) = diagram.node(node_ref) {
                warn!(title = diagram.title(), node = node.label(); "Node has no connections");
            }
        }
    }

    fn index_of(&self, node_ref: NodeRef) -> Option<NodeIndex> {
        let index = NodeIndex::new(node_ref.index());
        self.graph
            .node_weight(index)
            .filter(|&&weight| weight == node_ref)
            .map(|_| index)
    }
}

fn resolve(
    diagram: &Diagram,
    node_ref: NodeRef,
    position: usize,
) -> Result<NodeIndex, CloudsketchError> {
    if node_ref.diagram_id() != diagram.id() {
        return Err(CloudsketchError::Graph(format!(
            "edge #{position} in `{}` references a node declared in another diagram",
            diagram.title()
        )));
    }
    if node_ref.index() >= diagram.nodes().len() {
        return Err(CloudsketchError::Graph(format!(
            "edge #{position} in `{}` references unknown node #{}",
            diagram.title(),
            node_ref.index()
        )));
    }
    Ok(NodeIndex::new(node_ref.index()))
}

#[cfg(test)]
mod tests {
    use cloudsketch_core::semantic::{DiagramBuilder, Link, NodeKind};

    use super::*;

    #[test]
    fn test_counts_follow_declarations() {
        let mut api = None;
        let diagram = DiagramBuilder::new("Counts").build(|canvas| {
            let users = canvas.node(NodeKind::Users, "users");
            let gateway = canvas.node(NodeKind::Api, "api");
            let handlers: Vec<_> = (0..3)
                .map(|i| canvas.node(NodeKind::Compute, format!("fn-{i}")))
                .collect();
            canvas.connect(users, gateway);
            canvas.fan_out(gateway, &handlers, Link::new());
            api = Some(gateway);
        });

        let graph = DiagramGraph::from_diagram(&diagram).unwrap();
        let api = api.unwrap();
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.out_degree(api), 3);
        assert_eq!(graph.in_degree(api), 1);
    }

    #[test]
    fn test_roots_and_isolated() {
        let diagram = DiagramBuilder::new("Roots").build(|canvas| {
            let a = canvas.node(NodeKind::User, "a");
            let b = canvas.node(NodeKind::Api, "b");
            canvas.node(NodeKind::Database, "lonely");
            canvas.connect(a, b);
        });

        let graph = DiagramGraph::from_diagram(&diagram).unwrap();
        let roots: Vec<_> = graph.roots().iter().map(|r| r.index()).collect();
        assert_eq!(roots, vec![0, 2]);

        let isolated: Vec<_> = graph.isolated().iter().map(|r| r.index()).collect();
        assert_eq!(isolated, vec![2]);
    }

    #[test]
    fn test_foreign_node_is_rejected() {
        let mut stranger = None;
        DiagramBuilder::new("Other").build(|canvas| {
            stranger = Some(canvas.node(NodeKind::User, "stranger"));
        });
        let stranger = stranger.unwrap();

        let diagram = DiagramBuilder::new("Mixed").build(|canvas| {
            let local = canvas.node(NodeKind::User, "local");
            canvas.connect(local, stranger);
        });

        let err = DiagramGraph::from_diagram(&diagram).unwrap_err();
        assert!(matches!(err, CloudsketchError::Graph(_)));
        assert!(err.to_string().contains("another diagram"));
    }

    #[test]
    fn test_degree_of_foreign_handle_is_zero() {
        let mut stranger = None;
        DiagramBuilder::new("Elsewhere").build(|canvas| {
            stranger = Some(canvas.node(NodeKind::User, "x"));
        });
        let diagram = DiagramBuilder::new("Here").build(|canvas| {
            let a = canvas.node(NodeKind::User, "a");
            let b = canvas.node(NodeKind::User, "b");
            canvas.connect(a, b);
        });

        let graph = DiagramGraph::from_diagram(&diagram).unwrap();
        assert_eq!(graph.out_degree(stranger.unwrap()), 0);
    }
}
