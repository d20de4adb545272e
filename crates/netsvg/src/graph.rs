//! The graph collaborator consumed by the network compiler.
//!
//! [`Graph`] is the narrow read-only interface the compiler needs: counts,
//! named attribute lookup, edge endpoints, directedness and degree.
//! [`NetworkGraph`] is a ready-made implementation on top of `petgraph`.

use std::fmt;

use indexmap::IndexMap;
use petgraph::{
    Direction,
    graph::{EdgeIndex, NodeIndex},
};
use serde::Deserialize;

use netsvg_core::geometry::Point;

use crate::error::NetSvgError;

/// A named attribute value stored on a vertex or an edge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<AttrValue>),
}

impl AttrValue {
    /// Interprets the value as a number.
    ///
    /// Text is parsed after trimming; booleans count as `1` and `0`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::List(_) => None,
        }
    }

    /// Interprets the value as a flag.
    ///
    /// Text counts as true when it is `true`, `1` or `yes` (case-insensitive).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Number(n) => Some(*n != 0.0),
            Self::Text(s) => Some(matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes"
            )),
            Self::List(_) => None,
        }
    }

    /// Interprets a list of at least two numbers as a point.
    ///
    /// The coordinates are narrowed from `f64` to the `f32` of [`Point`],
    /// which keeps about seven significant digits. Values around `1e7`, such
    /// as projected map coordinates, lose their fractional part and should be
    /// shifted toward the origin before they are stored.
    pub fn as_point(&self) -> Option<Point> {
        match self {
            Self::List(items) if items.len() >= 2 => {
                let x = items[0].as_f64()?;
                let y = items[1].as_f64()?;
                Some(Point::new(x as f32, y as f32))
            }
            _ => None,
        }
    }

    /// Returns true for empty text and empty lists
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<(f64, f64)> for AttrValue {
    fn from((x, y): (f64, f64)) -> Self {
        Self::List(vec![Self::Number(x), Self::Number(y)])
    }
}

/// Attribute map of a single vertex or edge, in insertion order.
pub type Attributes = IndexMap<String, AttrValue>;

/// Read-only view of a graph as needed by the network compiler.
///
/// Vertices and edges are addressed by dense indices `0..count`.
pub trait Graph {
    /// Returns the number of vertices
    fn vertex_count(&self) -> usize;

    /// Returns the number of edges
    fn edge_count(&self) -> usize;

    /// Looks up a named vertex attribute; `None` when unset.
    fn vertex_attr(&self, vertex: usize, name: &str) -> Option<&AttrValue>;

    /// Looks up a named edge attribute; `None` when unset.
    fn edge_attr(&self, edge: usize, name: &str) -> Option<&AttrValue>;

    /// Returns the `(source, target)` vertices of an edge.
    fn edge_endpoints(&self, edge: usize) -> Option<(usize, usize)>;

    /// Returns true if edges have a direction
    fn is_directed(&self) -> bool;

    /// Returns the number of edge ends incident to a vertex.
    fn degree(&self, vertex: usize) -> usize;

    /// Returns true if any vertex carries the named attribute.
    fn has_vertex_attr(&self, name: &str) -> bool {
        (0..self.vertex_count()).any(|v| self.vertex_attr(v, name).is_some())
    }
}

/// A graph with named attributes on vertices and edges.
///
/// Edges are always stored with a direction; [`Graph::is_directed`] reports
/// the flag the graph was created with, which decides whether the compiler
/// may draw directed curves.
///
/// # Examples
///
/// ```
/// use netsvg::graph::{Graph, NetworkGraph};
///
/// let mut graph = NetworkGraph::new(true);
/// let a = graph.add_vertex([("label", "A".into())]);
/// let b = graph.add_vertex([("label", "B".into())]);
/// graph.add_edge(a, b, [("weight", 2.into())]).unwrap();
///
/// assert_eq!(graph.degree(a), 1);
/// assert_eq!(graph.edge_endpoints(0), Some((a, b)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NetworkGraph {
    graph: petgraph::Graph<Attributes, Attributes>,
    directed: bool,
}

impl NetworkGraph {
    /// Creates an empty graph
    pub fn new(directed: bool) -> Self {
        Self {
            graph: petgraph::Graph::new(),
            directed,
        }
    }

    /// Creates `n` vertices connected in a cycle `0 → 1 → … → n-1 → 0`.
    ///
    /// Graphs with fewer than three vertices are connected as a path.
    pub fn ring(n: usize, directed: bool) -> Self {
        let mut graph = Self::new(directed);
        let vertices: Vec<NodeIndex> = (0..n).map(|_| graph.graph.add_node(Attributes::new())).collect();
        for i in 0..n {
            let next = i + 1;
            if next < n {
                graph.graph.add_edge(vertices[i], vertices[next], Attributes::new());
            } else if n > 2 {
                graph.graph.add_edge(vertices[i], vertices[0], Attributes::new());
            }
        }
        graph
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex<'a, I>(&mut self, attributes: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, AttrValue)>,
    {
        let attributes = attributes
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        self.graph.add_node(attributes).index()
    }

    /// Adds an edge between two existing vertices and returns its index.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::UnknownVertex`] if either endpoint does not exist.
    pub fn add_edge<'a, I>(&mut self, source: usize, target: usize, attributes: I) -> Result<usize, NetSvgError>
    where
        I: IntoIterator<Item = (&'a str, AttrValue)>,
    {
        let source = self.node_index(source)?;
        let target = self.node_index(target)?;
        let attributes = attributes
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        Ok(self.graph.add_edge(source, target, attributes).index())
    }

    /// Sets one attribute on a vertex.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::UnknownVertex`] if the vertex does not exist.
    pub fn set_vertex_attr(&mut self, vertex: usize, name: &str, value: impl Into<AttrValue>) -> Result<(), NetSvgError> {
        let index = self.node_index(vertex)?;
        self.graph[index].insert(name.to_string(), value.into());
        Ok(())
    }

    /// Sets one attribute on an edge. Unknown edges are ignored.
    pub fn set_edge_attr(&mut self, edge: usize, name: &str, value: impl Into<AttrValue>) {
        if let Some(attributes) = self.graph.edge_weight_mut(EdgeIndex::new(edge)) {
            attributes.insert(name.to_string(), value.into());
        }
    }

    /// Assigns one value per vertex, in vertex order.
    ///
    /// Surplus values are ignored; vertices without a value keep theirs.
    pub fn set_vertex_column<I, V>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<AttrValue>,
    {
        for (attributes, value) in self.graph.node_weights_mut().zip(values) {
            attributes.insert(name.to_string(), value.into());
        }
    }

    /// Assigns one value per edge, in edge order.
    pub fn set_edge_column<I, V>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<AttrValue>,
    {
        for (attributes, value) in self.graph.edge_weights_mut().zip(values) {
            attributes.insert(name.to_string(), value.into());
        }
    }

    /// Returns all attributes of a vertex
    pub fn vertex_attrs(&self, vertex: usize) -> Option<&Attributes> {
        self.graph.node_weight(NodeIndex::new(vertex))
    }

    /// Returns all attributes of an edge
    pub fn edge_attrs(&self, edge: usize) -> Option<&Attributes> {
        self.graph.edge_weight(EdgeIndex::new(edge))
    }

    fn node_index(&self, vertex: usize) -> Result<NodeIndex, NetSvgError> {
        if vertex < self.graph.node_count() {
            Ok(NodeIndex::new(vertex))
        } else {
            Err(NetSvgError::UnknownVertex(vertex))
        }
    }
}

impl Graph for NetworkGraph {
    fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn vertex_attr(&self, vertex: usize, name: &str) -> Option<&AttrValue> {
        self.vertex_attrs(vertex)?.get(name)
    }

    fn edge_attr(&self, edge: usize, name: &str) -> Option<&AttrValue> {
        self.edge_attrs(edge)?.get(name)
    }

    fn edge_endpoints(&self, edge: usize) -> Option<(usize, usize)> {
        self.graph
            .edge_endpoints(EdgeIndex::new(edge))
            .map(|(source, target)| (source.index(), target.index()))
    }

    fn is_directed(&self) -> bool {
        self.directed
    }

    fn degree(&self, vertex: usize) -> usize {
        let index = NodeIndex::new(vertex);
        if vertex >= self.graph.node_count() {
            return 0;
        }
        self.graph.edges_directed(index, Direction::Outgoing).count()
            + self.graph.edges_directed(index, Direction::Incoming).count()
    }
}

/// A vertex of a graph, used as the bound datum of node and label elements.
pub struct VertexRef<'g, G: ?Sized> {
    graph: &'g G,
    index: usize,
}

impl<'g, G: Graph + ?Sized> VertexRef<'g, G> {
    /// Creates a handle to vertex `index` of `graph`
    pub fn new(graph: &'g G, index: usize) -> Self {
        Self { graph, index }
    }

    /// Returns the vertex index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the graph this vertex belongs to
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// Looks up a named attribute of this vertex
    pub fn attr(&self, name: &str) -> Option<&'g AttrValue> {
        self.graph.vertex_attr(self.index, name)
    }

    /// Returns the degree of this vertex
    pub fn degree(&self) -> usize {
        self.graph.degree(self.index)
    }
}

impl<G: ?Sized> Clone for VertexRef<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G: ?Sized> Copy for VertexRef<'_, G> {}

impl<G: ?Sized> fmt::Debug for VertexRef<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexRef").field("index", &self.index).finish()
    }
}

/// An edge of a graph, used as the bound datum of edge elements.
pub struct EdgeRef<'g, G: ?Sized> {
    graph: &'g G,
    index: usize,
    source: usize,
    target: usize,
}

impl<'g, G: Graph + ?Sized> EdgeRef<'g, G> {
    /// Creates a handle to edge `index`, or `None` if the edge does not exist
    pub fn new(graph: &'g G, index: usize) -> Option<Self> {
        let (source, target) = graph.edge_endpoints(index)?;
        Some(Self {
            graph,
            index,
            source,
            target,
        })
    }

    /// Returns the edge index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the source vertex index
    pub fn source(&self) -> usize {
        self.source
    }

    /// Returns the target vertex index
    pub fn target(&self) -> usize {
        self.target
    }

    /// Returns the source vertex
    pub fn source_vertex(&self) -> VertexRef<'g, G> {
        VertexRef::new(self.graph, self.source)
    }

    /// Returns the target vertex
    pub fn target_vertex(&self) -> VertexRef<'g, G> {
        VertexRef::new(self.graph, self.target)
    }

    /// Looks up a named attribute of this edge
    pub fn attr(&self, name: &str) -> Option<&'g AttrValue> {
        self.graph.edge_attr(self.index, name)
    }
}

impl<G: ?Sized> Clone for EdgeRef<'_, G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G: ?Sized> Copy for EdgeRef<'_, G> {}

impl<G: ?Sized> fmt::Debug for EdgeRef<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeRef")
            .field("index", &self.index)
            .field("source", &self.source)
            .field("target", &self.target)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_point_narrows_to_f32() {
        let value = AttrValue::from((12_345_678.25, 0.5));
        let point = value.as_point().unwrap();
        assert_eq!(point, Point::new(12_345_678.0, 0.5));
        assert_eq!(AttrValue::from(3.0).as_point(), None);
    }

    #[test]
    fn test_attr_value_coercions() {
        assert_eq!(AttrValue::from("  2.5 ").as_f64(), Some(2.5));
        assert_eq!(AttrValue::from("wide").as_f64(), None);
        assert_eq!(AttrValue::from(true).as_f64(), Some(1.0));

        assert_eq!(AttrValue::from("Yes").as_bool(), Some(true));
        assert_eq!(AttrValue::from("no").as_bool(), Some(false));
        assert_eq!(AttrValue::from(0).as_bool(), Some(false));

        assert_eq!(AttrValue::from((3.0, 4.0)).as_point(), Some(Point::new(3.0, 4.0)));
        assert_eq!(AttrValue::from(3).as_point(), None);
    }

    #[test]
    fn test_attr_value_display() {
        assert_eq!(AttrValue::from(12).to_string(), "12");
        assert_eq!(AttrValue::from(1.5).to_string(), "1.5");
        assert_eq!(AttrValue::from((1.0, 2.0)).to_string(), "1,2");
        assert!(AttrValue::from("").is_empty());
        assert!(!AttrValue::from(0).is_empty());
    }

    #[test]
    fn test_attr_value_deserialize() {
        #[derive(Deserialize)]
        struct Row {
            values: Vec<AttrValue>,
        }
        let row: Row = toml::from_str(r#"values = [true, 3, 2.5, "x", [1, 2]]"#).unwrap();
        assert_eq!(
            row.values,
            vec![
                AttrValue::Bool(true),
                AttrValue::Number(3.0),
                AttrValue::Number(2.5),
                AttrValue::Text("x".to_string()),
                AttrValue::from((1.0, 2.0)),
            ]
        );
    }

    #[test]
    fn test_add_edge_unknown_vertex() {
        let mut graph = NetworkGraph::new(false);
        let a = graph.add_vertex([]);
        let err = graph.add_edge(a, 5, []).unwrap_err();
        assert!(matches!(err, NetSvgError::UnknownVertex(5)));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_ring() {
        let graph = NetworkGraph::ring(8, false);
        assert_eq!(graph.vertex_count(), 8);
        assert_eq!(graph.edge_count(), 8);
        assert_eq!(graph.edge_endpoints(7), Some((7, 0)));
        assert!((0..8).all(|v| graph.degree(v) == 2));

        let pair = NetworkGraph::ring(2, false);
        assert_eq!(pair.edge_count(), 1);
    }

    #[test]
    fn test_columns_and_lookup() {
        let mut graph = NetworkGraph::ring(3, true);
        graph.set_vertex_column("x", [1.0, 2.0, 3.0]);
        graph.set_edge_column("weight", [5, 6]);

        assert!(graph.has_vertex_attr("x"));
        assert!(!graph.has_vertex_attr("y"));
        assert_eq!(graph.vertex_attr(2, "x"), Some(&AttrValue::Number(3.0)));
        assert_eq!(graph.edge_attr(1, "weight"), Some(&AttrValue::Number(6.0)));
        assert_eq!(graph.edge_attr(2, "weight"), None);
        assert_eq!(graph.vertex_attr(9, "x"), None);
    }

    #[test]
    fn test_entity_refs() {
        let mut graph = NetworkGraph::new(true);
        let a = graph.add_vertex([("name", "a".into())]);
        let b = graph.add_vertex([("name", "b".into())]);
        graph.add_edge(a, b, []).unwrap();

        let edge = EdgeRef::new(&graph, 0).unwrap();
        let copy = edge;
        assert_eq!(copy.source_vertex().attr("name"), Some(&AttrValue::from("a")));
        assert_eq!(edge.target_vertex().degree(), 1);
        assert!(EdgeRef::new(&graph, 3).is_none());
    }
}
