//! In-process rendering with `layout-rs`.
//!
//! Only SVG output is available; the document must be the flat native
//! flavor produced by [`DotExporter::native`](super::dot::DotExporter::native).

use layout::{
    backends::svg::SVGWriter,
    gv::{DotParser, GraphBuilder},
};
use log::debug;

use crate::CloudsketchError;

/// Lay out `document` and return the SVG text.
///
/// # Errors
///
/// Returns [`CloudsketchError::Layout`] if `layout-rs` cannot parse the
/// document.
pub fn render_svg(document: &str) -> Result<String, CloudsketchError> {
    let mut parser = DotParser::new(document);
    let graph = parser
        .process()
        .map_err(|err| CloudsketchError::Layout(format!("native engine rejected DOT: {err}")))?;

    let mut builder = GraphBuilder::new();
    builder.visit_graph(&graph);
    let mut visual_graph = builder.get();

    let mut svg = SVGWriter::new();
    visual_graph.do_it(false, false, false, &mut svg);
    debug!("Native layout completed");

    Ok(svg.finalize())
}
