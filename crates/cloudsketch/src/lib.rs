//! Cloudsketch - architecture diagrams declared in Rust, rendered by Graphviz.
//!
//! Diagrams are declared with [`semantic::DiagramBuilder`], validated as a
//! graph, turned into a DOT document and rendered either by the external
//! Graphviz `dot` binary or by the in-process `layout-rs` engine.

pub mod config;
pub mod structure;

mod error;
mod export;

pub use cloudsketch_core::{color, semantic};

pub use error::CloudsketchError;
pub use export::OutputFormat;

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info};

use config::{AppConfig, LayoutEngine};
use export::{dot::DotExporter, graphviz, native};
use semantic::Diagram;
use structure::DiagramGraph;

/// Node, edge and cluster counts of a validated diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagramSummary {
    pub nodes: usize,
    pub edges: usize,
    pub clusters: usize,
    pub roots: usize,
}

/// Renders declared diagrams to DOT text, image bytes or files.
///
/// # Examples
///
/// ```rust,no_run
/// use cloudsketch::{OutputFormat, Renderer, config::AppConfig};
/// use cloudsketch::semantic::{DiagramBuilder, NodeKind};
///
/// let diagram = DiagramBuilder::new("Hello").build(|canvas| {
///     let user = canvas.node(NodeKind::User, "Admin");
///     let api = canvas.node(NodeKind::Api, "REST API");
///     canvas.connect(user, api);
/// });
///
/// let renderer = Renderer::new(AppConfig::default());
/// let written = renderer
///     .render_to_dir(&diagram, "out", &[OutputFormat::Png])
///     .expect("Graphviz must be installed");
/// println!("{}", written[0].display());
/// ```
#[derive(Debug, Default)]
pub struct Renderer {
    config: AppConfig,
}

impl Renderer {
    /// Create a renderer with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Validate `diagram` and count its parts.
    ///
    /// # Errors
    ///
    /// Returns [`CloudsketchError::Graph`] if an edge references a node that
    /// does not belong to the diagram.
    pub fn summary(&self, diagram: &Diagram) -> Result<DiagramSummary, CloudsketchError> {
        let graph = DiagramGraph::from_diagram(diagram)?;
        Ok(DiagramSummary {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            clusters: diagram.cluster_count(),
            roots: graph.roots().len(),
        })
    }

    /// Validate `diagram` and return its Graphviz DOT document.
    pub fn to_dot(&self, diagram: &Diagram) -> Result<String, CloudsketchError> {
        DiagramGraph::from_diagram(diagram)?;
        DotExporter::new(&self.config).export_string(diagram)
    }

    /// Validate and render `diagram` in `format`.
    ///
    /// # Errors
    ///
    /// - [`CloudsketchError::Graph`] for invalid edges
    /// - [`CloudsketchError::Style`] for invalid configured colors
    /// - [`CloudsketchError::UnsupportedFormat`] if the native engine is asked
    ///   for anything but SVG or DOT
    /// - [`CloudsketchError::Render`] if Graphviz is missing or fails
    pub fn render(
        &self,
        diagram: &Diagram,
        format: OutputFormat,
    ) -> Result<Vec<u8>, CloudsketchError> {
        self.validate(diagram)?;
        self.render_validated(diagram, format)
    }

    /// Render `diagram` in every format and write `<file_stem>.<ext>` files
    /// into `dir`, creating it if needed.
    ///
    /// Each file is written to a temporary file in `dir` and then moved over
    /// the target, so existing files are replaced whole. Returns the written
    /// paths in format order.
    pub fn render_to_dir(
        &self,
        diagram: &Diagram,
        dir: impl AsRef<Path>,
        formats: &[OutputFormat],
    ) -> Result<Vec<PathBuf>, CloudsketchError> {
        let dir = dir.as_ref();
        self.validate(diagram)?;
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(formats.len());
        for &format in formats {
            let bytes = self.render_validated(diagram, format)?;
            let path = dir.join(format!("{}.{}", diagram.file_stem(), format.extension()));
            write_replacing(dir, &path, &bytes)?;

            info!(path = path.display().to_string(); "Diagram exported");
            written.push(path);
        }

        Ok(written)
    }

    /// Build the graph of `diagram` and warn about unconnected nodes.
    fn validate(&self, diagram: &Diagram) -> Result<(), CloudsketchError> {
        DiagramGraph::from_diagram(diagram)?.warn_isolated(diagram);
        Ok(())
    }

    fn render_validated(
        &self,
        diagram: &Diagram,
        format: OutputFormat,
    ) -> Result<Vec<u8>, CloudsketchError> {
        let engine = self.config.layout().engine();
        info!(
            title = diagram.title(),
            engine = engine.to_string(),
            format = format.extension();
            "Rendering diagram"
        );

        let bytes = match (engine, format) {
            (_, OutputFormat::Dot) => DotExporter::new(&self.config)
                .export_string(diagram)?
                .into_bytes(),
            (LayoutEngine::Graphviz, format) => {
                let document = DotExporter::new(&self.config).export_string(diagram)?;
                graphviz::render(&document, format)?
            }
            (LayoutEngine::Native, OutputFormat::Svg) => {
                let document = DotExporter::native(&self.config).export_string(diagram)?;
                native::render_svg(&document)?.into_bytes()
            }
            (LayoutEngine::Native, format) => {
                return Err(CloudsketchError::UnsupportedFormat { engine, format });
            }
        };

        if bytes.is_empty() {
            return Err(CloudsketchError::Layout(format!(
                "{engine} produced no {format} output for `{}`",
                diagram.title()
            )));
        }

        debug!(bytes = bytes.len(); "Diagram rendered");
        Ok(bytes)
    }
}

/// Write `bytes` to `path` through a flushed temporary file in `dir`.
///
/// A replaced file keeps its permissions. New files are created
/// world-readable (subject to the umask) on unix.
fn write_replacing(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), CloudsketchError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".cloudsketch");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o644));
    }

    let mut temp_file = builder.tempfile_in(dir)?;
    temp_file.write_all(bytes)?;
    if let Ok(metadata) = fs::metadata(path) {
        temp_file.as_file().set_permissions(metadata.permissions())?;
    }
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{LayoutConfig, StyleConfig},
        semantic::{DiagramBuilder, Link, NodeKind},
    };

    fn fan_diagram() -> Diagram {
        DiagramBuilder::new("Fan Out").build(|canvas| {
            let api = canvas.node(NodeKind::Api, "api");
            let handlers = canvas.cluster("Handlers", |canvas| {
                (0..4)
                    .map(|i| canvas.node(NodeKind::Compute, format!("fn-{i}")))
                    .collect::<Vec<_>>()
            });
            canvas.fan_out(api, &handlers, Link::new());
        })
    }

    #[test]
    fn test_summary_counts_fan_out_edges() {
        let summary = Renderer::default().summary(&fan_diagram()).unwrap();
        assert_eq!(
            summary,
            DiagramSummary {
                nodes: 5,
                edges: 4,
                clusters: 1,
                roots: 1,
            }
        );
    }

    #[test]
    fn test_native_engine_rejects_raster_formats() {
        let config = AppConfig::new(
            LayoutConfig::default().with_engine(LayoutEngine::Native),
            StyleConfig::default(),
        );
        let err = Renderer::new(config)
            .render(&fan_diagram(), OutputFormat::Png)
            .unwrap_err();
        assert!(matches!(
            err,
            CloudsketchError::UnsupportedFormat {
                engine: LayoutEngine::Native,
                format: OutputFormat::Png,
            }
        ));
    }

    #[test]
    fn test_render_to_dir_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("fan_out.dot");
        fs::write(&target, "stale content that is much longer than nothing").unwrap();

        let renderer = Renderer::default();
        let diagram = fan_diagram();
        let written = renderer
            .render_to_dir(&diagram, dir.path(), &[OutputFormat::Dot])
            .unwrap();

        assert_eq!(written, vec![target.clone()]);
        let content = fs::read_to_string(&target).unwrap();
        assert_eq!(content, renderer.to_dot(&diagram).unwrap());
        assert!(!content.contains("stale"));
    }

    #[cfg(unix)]
    #[test]
    fn test_render_to_dir_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("fan_out.dot");
        fs::write(&target, "old").unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o640)).unwrap();

        Renderer::default()
            .render_to_dir(&fan_diagram(), dir.path(), &[OutputFormat::Dot])
            .unwrap();

        let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn test_isolated_node_warned_once_per_render_to_dir() {
        let diagram = DiagramBuilder::new("Lonely Warning").build(|canvas| {
            let api = canvas.node(NodeKind::Api, "api");
            let handler = canvas.node(NodeKind::Compute, "handler");
            canvas.node(NodeKind::Storage, "orphan");
            canvas.connect(api, handler);
        });
        let config = AppConfig::new(
            LayoutConfig::default().with_engine(LayoutEngine::Native),
            StyleConfig::default(),
        );
        let renderer = Renderer::new(config);
        let dir = tempfile::tempdir().unwrap();

        capture::install();
        renderer.summary(&diagram).unwrap();
        renderer
            .render_to_dir(&diagram, dir.path(), &[OutputFormat::Svg, OutputFormat::Dot])
            .unwrap();

        assert_eq!(capture::warnings_for("Lonely Warning"), 1);
    }

    /// Process-wide logger recording the `title` of every warning.
    mod capture {
        use std::sync::Mutex;

        use log::{Level, LevelFilter, Log, Metadata, Record, kv::Source};

        static TITLES: Mutex<Vec<String>> = Mutex::new(Vec::new());

        struct CaptureLogger;

        impl Log for CaptureLogger {
            fn enabled(&self, metadata: &Metadata<'_>) -> bool {
                metadata.level() <= Level::Warn
            }

            fn log(&self, record: &Record<'_>) {
                if record.level() != Level::Warn {
                    return;
                }
                if let Some(title) = record.key_values().get("title".into()) {
                    TITLES.lock().unwrap().push(title.to_string());
                }
            }

            fn flush(&self) {}
        }

        static LOGGER: CaptureLogger = CaptureLogger;

        pub fn install() {
            let _ = log::set_logger(&LOGGER);
            log::set_max_level(LevelFilter::Warn);
        }

        pub fn warnings_for(title: &str) -> usize {
            TITLES
                .lock()
                .unwrap()
                .iter()
                .filter(|recorded| recorded.as_str() == title)
                .count()
        }
    }

    #[test]
    fn test_render_to_dir_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("documents").join("assets").join("images");

        let written = Renderer::default()
            .render_to_dir(&fan_diagram(), &nested, &[OutputFormat::Dot])
            .unwrap();

        assert!(nested.is_dir());
        assert_eq!(written.len(), 1);
        assert!(fs::metadata(&written[0]).unwrap().len() > 0);
    }
}
