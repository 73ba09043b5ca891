//! Command-line argument definitions for the Cloudsketch CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Every argument has a default, so the tool runs with none.

use clap::{Parser, ValueEnum};

use cloudsketch::{OutputFormat, config::LayoutEngine};

/// Which of the architecture diagrams to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Selection {
    Overview,
    Details,
}

/// Command-line arguments for the architecture diagram generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory the diagrams are written to
    #[arg(short, long, default_value = "documents/assets/images")]
    pub output_dir: String,

    /// Output format (png, jpg, svg, pdf, dot); repeat for several
    #[arg(short, long = "format", default_value = "png")]
    pub formats: Vec<OutputFormat>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Layout engine, overriding the configuration file (graphviz, native)
    #[arg(long)]
    pub engine: Option<LayoutEngine>,

    /// Directory holding `<kind>.png` node icons, overriding the configuration file
    #[arg(long)]
    pub icon_dir: Option<String>,

    /// Render only one diagram
    #[arg(long, value_enum)]
    pub only: Option<Selection>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
