//! Semantic diagram model types.
//!
//! These types describe what a diagram contains, not where anything goes.
//! Positions are computed later by a layout engine.
//!
//! # Pipeline Position
//!
//! ```text
//! Declarations (Canvas closure)
//!     ↓ DiagramBuilder::build
//! Semantic Model (these types)
//!     ↓ structure
//! Validated Graph (DiagramGraph)
//!     ↓ export
//! DOT → PNG / SVG / ...
//! ```
//!
//! # Organization
//!
//! - [`diagram`] - [`Diagram`], [`DiagramBuilder`], [`Canvas`], [`Cluster`], [`Direction`]
//! - [`element`] - [`Node`], [`NodeKind`], [`NodeRef`], [`Edge`], [`Link`], [`LineStyle`]

pub mod diagram;
pub mod element;

pub use diagram::*;
pub use element::*;
