//! Diagram element types.
//!
//! - [`NodeKind`] - The resource or actor a node stands for
//! - [`Node`] - A declared node: kind plus label
//! - [`NodeRef`] - Copyable handle returned when a node is declared
//! - [`Link`] / [`LineStyle`] - Presentation attributes of an edge
//! - [`Edge`] - A directed connection between two declared nodes

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{color::Color, semantic::diagram::DiagramId};

/// The kind of resource or actor a node depicts.
///
/// The kind only drives presentation (shape, fill color, caption and icon).
/// The names match external configuration strings (snake_case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A group of end users
    Users,
    /// A single user or operator
    User,
    /// Content delivery network distribution
    Cdn,
    /// API front door
    Api,
    /// Serverless function
    Compute,
    /// Object storage bucket
    Storage,
    /// Managed database table
    Database,
    /// Identity provider / user pool
    Identity,
}

impl NodeKind {
    /// All node kinds, in a stable order.
    pub const ALL: [NodeKind; 8] = [
        NodeKind::Users,
        NodeKind::User,
        NodeKind::Cdn,
        NodeKind::Api,
        NodeKind::Compute,
        NodeKind::Storage,
        NodeKind::Database,
        NodeKind::Identity,
    ];

    /// The provider service name shown under a node's label.
    ///
    /// Actors (`Users`, `User`) have no provider caption.
    pub fn caption(self) -> Option<&'static str> {
        match self {
            NodeKind::Users | NodeKind::User => None,
            NodeKind::Cdn => Some("CloudFront"),
            NodeKind::Api => Some("API Gateway"),
            NodeKind::Compute => Some("Lambda"),
            NodeKind::Storage => Some("S3"),
            NodeKind::Database => Some("DynamoDB"),
            NodeKind::Identity => Some("Cognito"),
        }
    }

    /// The Graphviz shape used when no icon is available.
    pub fn shape(self) -> &'static str {
        match self {
            NodeKind::Users | NodeKind::User => "ellipse",
            NodeKind::Storage => "folder",
            NodeKind::Database => "cylinder",
            NodeKind::Cdn | NodeKind::Api | NodeKind::Compute | NodeKind::Identity => "box",
        }
    }

    /// The default fill color, as a hex string.
    pub fn default_fill(self) -> &'static str {
        match self {
            NodeKind::Users | NodeKind::User => "#DFE6E9",
            NodeKind::Cdn => "#E9DDFE",
            NodeKind::Api => "#F3D9FB",
            NodeKind::Compute => "#FCE3CC",
            NodeKind::Storage => "#DCEFD3",
            NodeKind::Database => "#DCE3FB",
            NodeKind::Identity => "#FBD9DF",
        }
    }
}

impl FromStr for NodeKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(Self::Users),
            "user" => Ok(Self::User),
            "cdn" => Ok(Self::Cdn),
            "api" => Ok(Self::Api),
            "compute" => Ok(Self::Compute),
            "storage" => Ok(Self::Storage),
            "database" => Ok(Self::Database),
            "identity" => Ok(Self::Identity),
            _ => Err("Unsupported node kind"),
        }
    }
}

impl From<NodeKind> for &'static str {
    fn from(val: NodeKind) -> Self {
        match val {
            NodeKind::Users => "users",
            NodeKind::User => "user",
            NodeKind::Cdn => "cdn",
            NodeKind::Api => "api",
            NodeKind::Compute => "compute",
            NodeKind::Storage => "storage",
            NodeKind::Database => "database",
            NodeKind::Identity => "identity",
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// A declared node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    label: String,
}

impl Node {
    /// Create a node of the given kind. The label may span several lines.
    pub fn new(kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Handle to a node declared on a [`Canvas`](crate::semantic::Canvas).
///
/// Handles are only meaningful for the diagram that produced them; using one
/// in another diagram is caught when the diagram is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    diagram: DiagramId,
    index: usize,
}

impl NodeRef {
    pub(crate) fn new(diagram: DiagramId, index: usize) -> Self {
        Self { diagram, index }
    }

    /// The diagram this handle belongs to.
    pub fn diagram_id(&self) -> DiagramId {
        self.diagram
    }

    /// Position of the node in declaration order.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Line style of an edge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Bold,
}

impl From<LineStyle> for &'static str {
    fn from(val: LineStyle) -> Self {
        match val {
            LineStyle::Solid => "solid",
            LineStyle::Dashed => "dashed",
            LineStyle::Dotted => "dotted",
            LineStyle::Bold => "bold",
        }
    }
}

/// Presentation attributes of an edge.
///
/// # Examples
///
/// ```
/// use cloudsketch_core::semantic::{LineStyle, Link};
///
/// let link = Link::labeled("JWT").with_style(LineStyle::Dashed);
/// assert_eq!(link.label(), Some("JWT"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    label: Option<String>,
    color: Option<Color>,
    style: LineStyle,
}

impl Link {
    /// A plain, unlabeled link.
    pub fn new() -> Self {
        Self::default()
    }

    /// A link carrying a label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
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
}

/// A directed edge between two declared nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    source: NodeRef,
    target: NodeRef,
    link: Link,
}

impl Edge {
    pub fn new(source: NodeRef, target: NodeRef, link: Link) -> Self {
        Self {
            source,
            target,
            link,
        }
    }

    pub fn source(&self) -> NodeRef {
        self.source
    }

    pub fn target(&self) -> NodeRef {
        self.target
    }

    pub fn link(&self) -> &Link {
        &self.link
    }
}
