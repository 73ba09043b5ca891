//! Error types for Cloudsketch operations.
//!
//! This module provides the main error type [`CloudsketchError`] which wraps
//! the error conditions that can occur while validating, exporting and
//! rendering a diagram.

use std::io;

use thiserror::Error;

use crate::{config::LayoutEngine, export::OutputFormat};

/// The main error type for Cloudsketch operations.
#[derive(Debug, Error)]
pub enum CloudsketchError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Style error: {0}")]
    Style(String),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("The {engine} layout engine cannot produce {format} output")]
    UnsupportedFormat {
        engine: LayoutEngine,
        format: OutputFormat,
    },

    #[error("Graphviz failed to render {format} output: {source}")]
    Render {
        format: OutputFormat,
        #[source]
        source: io::Error,
    },
}

impl CloudsketchError {
    /// Returns `true` when rendering failed because the Graphviz `dot`
    /// binary could not be started.
    pub fn is_missing_graphviz(&self) -> bool {
        matches!(self, Self::Render { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
