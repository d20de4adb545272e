//! Error adapter for converting CliError to miette diagnostics.
//!
//! This module provides the bridge between the CLI's standard error type
//! and miette's rich diagnostic formatting. Graph file syntax errors carry
//! the file text and are rendered with a labelled snippet.

use std::fmt;

use miette::{Diagnostic, LabeledSpan, SourceSpan};

use netsvg::NetSvgError;

use crate::error::CliError;

/// Adapter for a single [`CliError`].
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorAdapter").field(self.0).finish()
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ErrorAdapter<'_> {}

fn library_code(err: &NetSvgError) -> &'static str {
    match err {
        NetSvgError::BindingMismatch { .. } => "netsvg::binding",
        NetSvgError::MissingPositions { .. }
        | NetSvgError::PositionCountMismatch { .. }
        | NetSvgError::InvalidPosition { .. } => "netsvg::positions",
        NetSvgError::InvalidGeneratorOutput { .. } => "netsvg::generator",
        NetSvgError::AmbiguousSortSpec { .. } => "netsvg::sort",
        NetSvgError::UnknownVertex(_) => "netsvg::input",
        NetSvgError::InvalidOption { .. } => "netsvg::config",
        NetSvgError::Scale(_) => "netsvg::scale",
        NetSvgError::Dom(_) => "netsvg::document",
        NetSvgError::Io(_) => "netsvg::io",
    }
}

impl Diagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            CliError::NetSvg(err) => library_code(err),
            CliError::ConfigParse(_) | CliError::MissingConfig(_) => "netsvg::config",
            CliError::GraphParse { .. } | CliError::UnknownNode { .. } | CliError::DuplicateNode(_) => {
                "netsvg::input"
            }
            CliError::Io(_) => "netsvg::io",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            CliError::NetSvg(NetSvgError::MissingPositions { .. }) => {
                "give every node a `position = [x, y]` entry, or `x` and `y` entries"
            }
            CliError::NetSvg(NetSvgError::UnknownVertex(_)) | CliError::UnknownNode { .. } => {
                "edges name their endpoints by node `id` or by zero-based node index"
            }
            CliError::NetSvg(NetSvgError::InvalidOption { .. }) | CliError::ConfigParse(_) => {
                "check the configuration file passed with --config"
            }
            CliError::GraphParse { path, .. } => {
                return Some(Box::new(format!("in graph file {path}")));
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self.0 {
            CliError::GraphParse { source_text, .. } => Some(source_text as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let CliError::GraphParse {
            span: Some(span),
            message,
            ..
        } = self.0
        else {
            return None;
        };
        let label = LabeledSpan::new_primary_with_span(Some(message.clone()), SourceSpan::from(span.clone()));
        Some(Box::new(std::iter::once(label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::input::parse_graph;

    #[test]
    fn test_parse_error_has_snippet() {
        let err = parse_graph("[[nodes]]\nx = \n", "broken.toml").unwrap_err();
        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.code().unwrap().to_string(), "netsvg::input");
        assert!(adapter.source_code().is_some());
        assert_eq!(adapter.labels().unwrap().count(), 1);
    }

    #[test]
    fn test_missing_positions_help() {
        let err = CliError::NetSvg(NetSvgError::MissingPositions {
            expected: vec!["position".to_string()],
        });
        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.code().unwrap().to_string(), "netsvg::positions");
        assert!(adapter.help().unwrap().to_string().contains("position = [x, y]"));
        assert!(adapter.labels().is_none());
    }
}
