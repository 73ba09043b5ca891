//! Error adapter for converting CloudsketchError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error type
//! and miette's rich diagnostic formatting used in the CLI. Diagrams are
//! declared in Rust, so there is no source text to point into: the adapter
//! contributes a stable code and, where the fix is known, a help line.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use cloudsketch::CloudsketchError;

/// Adapter rendering a [`CloudsketchError`] through miette.
pub struct ErrorAdapter<'a>(pub &'a CloudsketchError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            CloudsketchError::Io(_) => "cloudsketch::io",
            CloudsketchError::Graph(_) => "cloudsketch::graph",
            CloudsketchError::Style(_) => "cloudsketch::style",
            CloudsketchError::Layout(_) => "cloudsketch::layout",
            CloudsketchError::UnsupportedFormat { .. } => "cloudsketch::unsupported_format",
            CloudsketchError::Render { .. } => "cloudsketch::render",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            err if err.is_missing_graphviz() => {
                "Install Graphviz and make sure `dot` is on PATH, \
                 or pass `--format dot` to write the DOT source only"
            }
            CloudsketchError::UnsupportedFormat { .. } => {
                "The native engine writes `svg` and `dot` only; use `--engine graphviz` for other formats"
            }
            CloudsketchError::Style(_) => {
                "Colors accept CSS names, `#rrggbb` and `#rrggbbaa` values"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Wrap a [`CloudsketchError`] for rendering with a miette report handler.
pub fn to_reportable(err: &CloudsketchError) -> ErrorAdapter<'_> {
    ErrorAdapter(err)
}

/// Render `err` as a graphical miette report.
pub fn render_report(err: &CloudsketchError) -> String {
    let mut writer = String::new();
    if let Err(fmt_err) =
        miette::GraphicalReportHandler::new().render_report(&mut writer, &to_reportable(err))
    {
        writer = format!("{err} ({fmt_err})");
    }
    writer
}
