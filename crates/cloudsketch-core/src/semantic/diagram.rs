//! Core diagram structure types.
//!
//! This module contains the scoped declaration API and its result:
//! - [`DiagramBuilder`] - Entry point; owns title, file stem and direction
//! - [`Canvas`] - Scoped declaration context handed to the build closure
//! - [`Path`] - Chained edge declarations starting from one node
//! - [`Diagram`] - The finished, immutable declaration
//! - [`Cluster`] - A named visual group of nodes and nested clusters
//! - [`Direction`] - Overall flow direction of the layout

use std::{
    fmt::{self, Display},
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::semantic::element::{Edge, Link, Node, NodeKind, NodeRef};

static NEXT_DIAGRAM_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a diagram, used to tie [`NodeRef`] handles to their diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagramId(u64);

impl DiagramId {
    fn next() -> Self {
        Self(NEXT_DIAGRAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Overall flow direction of a diagram.
///
/// The names match external configuration strings (Graphviz `rankdir` values).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB")]
    TopToBottom,
    #[serde(rename = "BT")]
    BottomToTop,
    #[serde(rename = "LR")]
    LeftToRight,
    #[serde(rename = "RL")]
    RightToLeft,
}

impl FromStr for Direction {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TB" => Ok(Self::TopToBottom),
            "BT" => Ok(Self::BottomToTop),
            "LR" => Ok(Self::LeftToRight),
            "RL" => Ok(Self::RightToLeft),
            _ => Err("Unsupported direction, expected one of TB, BT, LR, RL"),
        }
    }
}

impl From<Direction> for &'static str {
    fn from(val: Direction) -> Self {
        match val {
            Direction::TopToBottom => "TB",
            Direction::BottomToTop => "BT",
            Direction::LeftToRight => "LR",
            Direction::RightToLeft => "RL",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// A named visual group of nodes.
///
/// Clusters carry no meaning beyond presentation. The root scope of a diagram
/// is a cluster with an empty label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cluster {
    label: String,
    nodes: Vec<NodeRef>,
    clusters: Vec<Cluster>,
}

impl Cluster {
    fn new(label: String) -> Self {
        Self {
            label,
            ..Self::default()
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Nodes declared directly in this cluster.
    pub fn nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    /// Clusters nested directly in this cluster.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Number of clusters nested at any depth below this one.
    pub fn descendant_count(&self) -> usize {
        self.clusters
            .iter()
            .map(|cluster| 1 + cluster.descendant_count())
            .sum()
    }
}

/// A finished diagram declaration.
///
/// Produced by [`DiagramBuilder::build`]; immutable afterwards. Nodes and edges
/// are kept in declaration order.
#[derive(Debug, Clone)]
pub struct Diagram {
    id: DiagramId,
    title: String,
    file_stem: String,
    direction: Direction,
    root: Cluster,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Diagram {
    pub fn id(&self) -> DiagramId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// File name, without extension, the diagram is exported to.
    pub fn file_stem(&self) -> &str {
        &self.file_stem
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The top-level scope holding nodes declared outside any cluster.
    pub fn root(&self) -> &Cluster {
        &self.root
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Look up a node by handle.
    ///
    /// Returns `None` if the handle belongs to another diagram.
    pub fn node(&self, node_ref: NodeRef) -> Option<&Node> {
        if node_ref.diagram_id() != self.id {
            return None;
        }
        self.nodes.get(node_ref.index())
    }

    /// Handles for every node, in declaration order.
    pub fn node_refs(&self) -> impl Iterator<Item = NodeRef> + '_ {
        (0..self.nodes.len()).map(|index| NodeRef::new(self.id, index))
    }

    /// Total number of clusters, excluding the root scope.
    pub fn cluster_count(&self) -> usize {
        self.root.descendant_count()
    }
}

/// Builder for declaring a [`Diagram`].
///
/// # Examples
///
/// ```
/// use cloudsketch_core::semantic::{DiagramBuilder, Link, NodeKind};
///
/// let diagram = DiagramBuilder::new("Tiny Service").build(|canvas| {
///     let user = canvas.node(NodeKind::User, "Admin");
///     let api = canvas.cluster("Edge", |canvas| canvas.node(NodeKind::Api, "REST API"));
///     canvas.connect_with(user, api, Link::labeled("JWT"));
/// });
///
/// assert_eq!(diagram.file_stem(), "tiny_service");
/// assert_eq!(diagram.nodes().len(), 2);
/// assert_eq!(diagram.edges().len(), 1);
/// assert_eq!(diagram.cluster_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DiagramBuilder {
    title: String,
    file_stem: Option<String>,
    direction: Direction,
}

impl DiagramBuilder {
    /// Start a diagram with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file_stem: None,
            direction: Direction::default(),
        }
    }

    /// Override the exported file name (without extension).
    pub fn file_stem(mut self, file_stem: impl Into<String>) -> Self {
        self.file_stem = Some(file_stem.into());
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Run the declarations and return the finished diagram.
    ///
    /// The canvas only lives for the duration of `declare`; every cluster the
    /// closure opens is closed again before this returns.
    pub fn build(self, declare: impl FnOnce(&mut Canvas)) -> Diagram {
        let file_stem = self
            .file_stem
            .unwrap_or_else(|| stem_from_title(&self.title));

        let mut canvas = Canvas::new(DiagramId::next());
        declare(&mut canvas);
        trace!(
            title = self.title.as_str(),
            nodes = canvas.nodes.len(),
            edges = canvas.edges.len();
            "Diagram declared"
        );

        Diagram {
            id: canvas.id,
            title: self.title,
            file_stem,
            direction: self.direction,
            root: canvas.root,
            nodes: canvas.nodes,
            edges: canvas.edges,
        }
    }
}

/// Lowercase the title and join its words with underscores.
fn stem_from_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Scoped declaration context for one diagram.
///
/// Nodes land in the innermost open cluster. Edges may connect any two nodes
/// of the same diagram regardless of cluster.
#[derive(Debug)]
pub struct Canvas {
    id: DiagramId,
    root: Cluster,
    open: Vec<Cluster>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Canvas {
    fn new(id: DiagramId) -> Self {
        Self {
            id,
            root: Cluster::default(),
            open: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    fn current_scope(&mut self) -> &mut Cluster {
        self.open.last_mut().unwrap_or(&mut self.root)
    }

    /// Declare a node in the current scope.
    pub fn node(&mut self, kind: NodeKind, label: impl Into<String>) -> NodeRef {
        let node_ref = NodeRef::new(self.id, self.nodes.len());
        self.nodes.push(Node::new(kind, label));
        self.current_scope().nodes.push(node_ref);
        node_ref
    }

    /// Open a cluster for the duration of `declare`, returning its value.
    pub fn cluster<R>(
        &mut self,
        label: impl Into<String>,
        declare: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let label = label.into();
        trace!(label = label.as_str(), depth = self.open.len() + 1; "Opening cluster");
        self.open.push(Cluster::new(label));

        let result = declare(self);

        if let Some(cluster) = self.open.pop() {
            self.current_scope().clusters.push(cluster);
        }
        result
    }

    /// Declare a plain edge.
    pub fn connect(&mut self, from: NodeRef, to: NodeRef) {
        self.connect_with(from, to, Link::new());
    }

    /// Declare an edge with presentation attributes.
    pub fn connect_with(&mut self, from: NodeRef, to: NodeRef, link: Link) {
        self.edges.push(Edge::new(from, to, link));
    }

    /// Declare one edge from `from` to each target, all sharing `link`.
    pub fn fan_out(&mut self, from: NodeRef, targets: &[NodeRef], link: Link) {
        for &target in targets {
            self.connect_with(from, target, link.clone());
        }
    }

    /// Declare one edge from each source to `to`, all sharing `link`.
    pub fn fan_in(&mut self, sources: &[NodeRef], to: NodeRef, link: Link) {
        for &source in sources {
            self.connect_with(source, to, link.clone());
        }
    }

    /// Start a chain of edges at `start`.
    ///
    /// ```
    /// use cloudsketch_core::semantic::{DiagramBuilder, Link, NodeKind};
    ///
    /// let diagram = DiagramBuilder::new("Chain").build(|canvas| {
    ///     let user = canvas.node(NodeKind::Users, "Visitors");
    ///     let cdn = canvas.node(NodeKind::Cdn, "Edge");
    ///     let bucket = canvas.node(NodeKind::Storage, "Assets");
    ///     canvas.path(user).to_with(cdn, Link::labeled("HTTPS")).to(bucket);
    /// });
    /// assert_eq!(diagram.edges().len(), 2);
    /// ```
    pub fn path(&mut self, start: NodeRef) -> Path<'_> {
        Path {
            canvas: self,
            current: start,
        }
    }
}

/// A chain of edges being declared, positioned at its last node.
#[derive(Debug)]
pub struct Path<'c> {
    canvas: &'c mut Canvas,
    current: NodeRef,
}

impl Path<'_> {
    /// Add a plain hop to `next`.
    pub fn to(self, next: NodeRef) -> Self {
        self.to_with(next, Link::new())
    }

    /// Add a hop to `next` with presentation attributes.
    pub fn to_with(self, next: NodeRef, link: Link) -> Self {
        self.canvas.connect_with(self.current, next, link);
        Self {
            canvas: self.canvas,
            current: next,
        }
    }

    /// End the chain with one edge to each target.
    pub fn fan_out(self, targets: &[NodeRef], link: Link) {
        self.canvas.fan_out(self.current, targets, link);
    }

    /// The node the chain currently ends at.
    pub fn end(&self) -> NodeRef {
        self.current
    }
}
