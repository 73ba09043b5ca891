//! Rendering through the external Graphviz `dot` binary.

use graphviz_rust::{
    cmd::{CommandArg, Format},
    exec_dot,
};
use log::debug;

use crate::{CloudsketchError, export::OutputFormat};

/// Run `dot` on `document` and return the rendered bytes.
///
/// [`OutputFormat::Dot`] returns the document unchanged without spawning a
/// process.
///
/// # Errors
///
/// Returns [`CloudsketchError::Render`] if the binary cannot be started or
/// exits with an error.
pub fn render(document: &str, format: OutputFormat) -> Result<Vec<u8>, CloudsketchError> {
    let graphviz_format = match format {
        OutputFormat::Dot => return Ok(document.as_bytes().to_vec()),
        OutputFormat::Png => Format::Png,
        OutputFormat::Jpg => Format::Jpg,
        OutputFormat::Svg => Format::Svg,
        OutputFormat::Pdf => Format::Pdf,
    };

    debug!(format = format.extension(); "Running Graphviz");
    exec_dot(
        document.to_string(),
        vec![CommandArg::Format(graphviz_format)],
    )
    .map_err(|source| CloudsketchError::Render { format, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_format_passes_document_through() {
        let document = "digraph G {\n  a -> b\n}\n";
        let bytes = render(document, OutputFormat::Dot).unwrap();
        assert_eq!(bytes, document.as_bytes());
    }

    #[test]
    fn test_png_runs_dot_or_reports_it_missing() {
        match render("digraph G {\n  a -> b\n}\n", OutputFormat::Png) {
            Ok(bytes) => assert!(bytes.starts_with(b"\x89PNG")),
            Err(err) => {
                assert!(err.is_missing_graphviz(), "unexpected error: {err}");
                assert!(matches!(
                    err,
                    CloudsketchError::Render {
                        format: OutputFormat::Png,
                        ..
                    }
                ));
            }
        }
    }
}
