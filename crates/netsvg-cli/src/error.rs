//! Error type of the command-line front end.

use std::{io, ops::Range, path::PathBuf};

use thiserror::Error;

use netsvg::NetSvgError;

/// Errors reported by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    NetSvg(#[from] NetSvgError),

    #[error("Failed to parse TOML configuration: {0}")]
    ConfigParse(String),

    #[error("Missing configuration file: {}", .0.display())]
    MissingConfig(PathBuf),

    #[error("Failed to parse graph file `{path}`: {message}")]
    GraphParse {
        path: String,
        /// Full text of the graph file, used for snippets.
        source_text: String,
        span: Option<Range<usize>>,
        message: String,
    },

    #[error("edge {edge} references unknown node `{id}`")]
    UnknownNode { edge: usize, id: String },

    #[error("node id `{0}` is used more than once")]
    DuplicateNode(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
