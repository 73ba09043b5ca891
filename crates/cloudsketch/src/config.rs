//! Configuration types for Cloudsketch diagram rendering.
//!
//! This module provides configuration structures that control how diagrams
//! are laid out and styled. All types implement [`serde::Deserialize`] for
//! loading from external sources; missing fields fall back to the defaults
//! documented on each type.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and style settings.
//! - [`LayoutConfig`] - Selects the [`LayoutEngine`] and tunes Graphviz spacing.
//! - [`StyleConfig`] - Fonts, colors and icons.
//!
//! # Example
//!
//! ```
//! # use cloudsketch::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.style().background_color().is_ok());
//! ```

use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
    str::FromStr,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use cloudsketch_core::{color::Color, semantic::NodeKind};

/// Top-level application configuration combining layout and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and style configurations.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self { layout, style }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Available layout engines.
///
/// The names match external configuration strings (snake_case).
///
/// # Variants
///
/// - `Graphviz` - Runs the external Graphviz `dot` binary (default)
/// - `Native` - Pure-Rust layout; SVG output only, no external binary
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutEngine {
    #[default]
    Graphviz,
    Native,
}

impl FromStr for LayoutEngine {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "graphviz" => Ok(Self::Graphviz),
            "native" => Ok(Self::Native),
            _ => Err("Unsupported layout engine"),
        }
    }
}

impl From<LayoutEngine> for &'static str {
    fn from(val: LayoutEngine) -> Self {
        match val {
            LayoutEngine::Graphviz => "graphviz",
            LayoutEngine::Native => "native",
        }
    }
}

impl Display for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Layout configuration.
///
/// Defaults: `engine = "graphviz"`, `splines = "ortho"`, `nodesep = 0.60`,
/// `ranksep = 0.75`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    engine: LayoutEngine,
    splines: String,
    nodesep: f32,
    ranksep: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            engine: LayoutEngine::default(),
            splines: "ortho".to_string(),
            nodesep: 0.60,
            ranksep: 0.75,
        }
    }
}

impl LayoutConfig {
    /// Returns a copy of this configuration using `engine`.
    pub fn with_engine(mut self, engine: LayoutEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn engine(&self) -> LayoutEngine {
        self.engine
    }

    /// Graphviz `splines` mode used for edge routing.
    pub fn splines(&self) -> &str {
        &self.splines
    }

    /// Minimum space between nodes of the same rank, in inches.
    pub fn nodesep(&self) -> f32 {
        self.nodesep
    }

    /// Minimum space between ranks, in inches.
    pub fn ranksep(&self) -> f32 {
        self.ranksep
    }
}

/// Visual styling configuration for rendered diagrams.
///
/// Colors are stored as strings and parsed on access, so a bad color is
/// reported when the diagram is rendered rather than when the file is read.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    background_color: String,
    font_name: String,
    font_size: f32,
    pad: f32,
    edge_color: String,
    cluster_colors: Vec<String>,
    node_colors: IndexMap<NodeKind, String>,
    icon_dir: Option<PathBuf>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: "white".to_string(),
            font_name: "Sans-Serif".to_string(),
            font_size: 16.0,
            pad: 0.5,
            edge_color: "#7B8894".to_string(),
            cluster_colors: ["#E5F5FD", "#EBF3E7", "#ECE8F6", "#FDF7E3"]
                .map(String::from)
                .to_vec(),
            node_colors: IndexMap::new(),
            icon_dir: None,
        }
    }
}

impl StyleConfig {
    /// Returns a copy of this configuration reading icons from `icon_dir`.
    pub fn with_icon_dir(mut self, icon_dir: impl Into<PathBuf>) -> Self {
        self.icon_dir = Some(icon_dir.into());
        self
    }

    /// Returns the parsed background [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Color, String> {
        Color::new(&self.background_color)
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Returns the parsed default edge [`Color`].
    pub fn edge_color(&self) -> Result<Color, String> {
        Color::new(&self.edge_color).map_err(|err| format!("Invalid edge color in config: {err}"))
    }

    /// Returns the cluster background palette, indexed by nesting depth.
    pub fn cluster_colors(&self) -> Result<Vec<Color>, String> {
        self.cluster_colors
            .iter()
            .map(|color| Color::new(color))
            .collect::<Result<_, _>>()
            .map_err(|err| format!("Invalid cluster color in config: {err}"))
    }

    /// Returns the fill [`Color`] for a node kind, honoring overrides.
    pub fn node_color(&self, kind: NodeKind) -> Result<Color, String> {
        let color = self
            .node_colors
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_fill());
        Color::new(color).map_err(|err| format!("Invalid {kind} node color in config: {err}"))
    }

    pub fn font_name(&self) -> &str {
        &self.font_name
    }

    /// Title font size, in points.
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Padding around the drawing, in inches.
    pub fn pad(&self) -> f32 {
        self.pad
    }

    /// Directory holding `<kind>.png` icons, if configured.
    pub fn icon_dir(&self) -> Option<&Path> {
        self.icon_dir.as_deref()
    }
}
