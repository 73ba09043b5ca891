//! CLI logic for the Cloudsketch architecture diagram generator.
//!
//! This module loads the configuration, applies command-line overrides and
//! renders the MyBlog-AWS diagrams into the output directory.

pub mod blog;
pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Selection};

use std::path::PathBuf;

use log::info;

use cloudsketch::{CloudsketchError, Renderer, config::AppConfig};

/// Run the Cloudsketch CLI application
///
/// Renders every selected diagram in every requested format and returns the
/// written files in order: diagram by diagram, format by format.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CloudsketchError` for:
/// - Configuration loading errors
/// - Invalid diagrams or configured colors
/// - Graphviz being unavailable or failing
/// - File I/O errors
pub fn run(args: &Args) -> Result<Vec<PathBuf>, CloudsketchError> {
    info!(
        output_dir = args.output_dir,
        formats:? = args.formats;
        "Generating architecture diagrams"
    );

    let app_config = apply_overrides(config::load_config(args.config.as_ref())?, args);
    let renderer = Renderer::new(app_config);

    let mut written = Vec::new();
    for diagram in blog::select(args.only) {
        let summary = renderer.summary(&diagram)?;
        info!(
            title = diagram.title(),
            nodes = summary.nodes,
            edges = summary.edges,
            clusters = summary.clusters;
            "Diagram declared"
        );

        written.extend(renderer.render_to_dir(&diagram, &args.output_dir, &args.formats)?);
    }

    Ok(written)
}

/// Apply the `--engine` and `--icon-dir` flags on top of the loaded file.
fn apply_overrides(config: AppConfig, args: &Args) -> AppConfig {
    let mut layout = config.layout().clone();
    if let Some(engine) = args.engine {
        layout = layout.with_engine(engine);
    }

    let mut style = config.style().clone();
    if let Some(icon_dir) = &args.icon_dir {
        style = style.with_icon_dir(icon_dir);
    }

    AppConfig::new(layout, style)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use cloudsketch::config::LayoutEngine;

    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "cloudsketch",
            "--engine",
            "native",
            "--icon-dir",
            "assets/icons",
        ])
        .unwrap();

        let config = apply_overrides(AppConfig::default(), &args);
        assert_eq!(config.layout().engine(), LayoutEngine::Native);
        assert_eq!(
            config.style().icon_dir(),
            Some(std::path::Path::new("assets/icons"))
        );
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::try_parse_from(["cloudsketch"]).unwrap();
        let config = apply_overrides(AppConfig::default(), &args);
        assert_eq!(config.layout().engine(), LayoutEngine::Graphviz);
        assert!(config.style().icon_dir().is_none());
    }
}
