//! Graph file loading.
//!
//! Graph files are TOML documents with a `directed` flag, one `[[nodes]]`
//! table per vertex and one `[[edges]]` table per edge:
//!
//! ```toml
//! directed = true
//!
//! [[nodes]]
//! id = "a"
//! position = [0, 0]
//! color = "#4C78A8"
//!
//! [[nodes]]
//! id = "b"
//! position = [100, 40]
//!
//! [[edges]]
//! source = "a"
//! target = 1
//! weight = 3
//! ```
//!
//! Every key of a node table is stored as a vertex attribute. Edge tables
//! name their endpoints by node `id` or by zero-based index; all other keys
//! are stored as edge attributes.

use std::{collections::HashMap, fs, path::Path};

use indexmap::IndexMap;
use log::{debug, info};
use serde::Deserialize;

use netsvg::graph::{AttrValue, NetworkGraph};

use crate::error::CliError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GraphFile {
    #[serde(default)]
    directed: bool,
    #[serde(default)]
    nodes: Vec<IndexMap<String, AttrValue>>,
    #[serde(default)]
    edges: Vec<EdgeEntry>,
}

#[derive(Debug, Deserialize)]
struct EdgeEntry {
    source: NodeKey,
    target: NodeKey,
    #[serde(flatten)]
    attributes: IndexMap<String, AttrValue>,
}

/// An edge endpoint, given by position in `[[nodes]]` or by `id`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NodeKey {
    Index(usize),
    Id(String),
}

impl GraphFile {
    fn into_graph(self) -> Result<NetworkGraph, CliError> {
        let mut graph = NetworkGraph::new(self.directed);
        let mut ids = HashMap::new();

        for node in &self.nodes {
            let index = graph.add_vertex(node.iter().map(|(name, value)| (name.as_str(), value.clone())));
            if let Some(id) = node.get("id") {
                let id = id.to_string();
                if ids.insert(id.clone(), index).is_some() {
                    return Err(CliError::DuplicateNode(id));
                }
            }
        }

        for (position, edge) in self.edges.into_iter().enumerate() {
            let resolve = |key: NodeKey| match key {
                NodeKey::Index(index) => Ok(index),
                NodeKey::Id(id) => ids
                    .get(&id)
                    .copied()
                    .ok_or(CliError::UnknownNode { edge: position, id }),
            };
            let source = resolve(edge.source)?;
            let target = resolve(edge.target)?;
            graph.add_edge(
                source,
                target,
                edge.attributes.iter().map(|(name, value)| (name.as_str(), value.clone())),
            )?;
        }

        Ok(graph)
    }
}

/// Parses a graph from TOML text. `path` is only used in error messages.
///
/// # Errors
///
/// Returns [`CliError::GraphParse`] for malformed TOML, and
/// [`CliError::UnknownNode`], [`CliError::DuplicateNode`] or a wrapped
/// [`netsvg::NetSvgError::UnknownVertex`] for inconsistent edges.
pub fn parse_graph(source: &str, path: &str) -> Result<NetworkGraph, CliError> {
    let file: GraphFile = toml::from_str(source).map_err(|err| CliError::GraphParse {
        path: path.to_string(),
        source_text: source.to_string(),
        span: err.span(),
        message: err.message().to_string(),
    })?;
    debug!(nodes = file.nodes.len(), edges = file.edges.len(), directed = file.directed; "Parsed graph file");
    file.into_graph()
}

/// Reads and parses a graph file.
///
/// # Errors
///
/// Returns [`CliError::Io`] if the file cannot be read, otherwise the
/// errors of [`parse_graph`].
pub fn load_graph(path: impl AsRef<Path>) -> Result<NetworkGraph, CliError> {
    let path = path.as_ref();
    info!(path = path.display().to_string(); "Loading graph");
    let source = fs::read_to_string(path)?;
    parse_graph(&source, &path.display().to_string())
}
