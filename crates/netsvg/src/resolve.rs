//! Cascading attribute lookup for default styling.
//!
//! Every visual default of the network compiler follows the same rule: try
//! an ordered list of attribute names on the entity, take the first value
//! that is present and non-empty, otherwise use a hard default. A [`Cascade`]
//! is that ordered list; the functions at the bottom of this module bind each
//! visual property to its cascade and default.

use netsvg_core::color::darken_or_keep;

use crate::graph::{AttrValue, Attributes, EdgeRef, Graph, VertexRef};

/// Anything that exposes named attributes.
pub trait AttributeSource {
    /// Looks up a named attribute; `None` when unset.
    fn attribute(&self, name: &str) -> Option<&AttrValue>;
}

impl<G: Graph + ?Sized> AttributeSource for VertexRef<'_, G> {
    fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attr(name)
    }
}

impl<G: Graph + ?Sized> AttributeSource for EdgeRef<'_, G> {
    fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attr(name)
    }
}

impl AttributeSource for Attributes {
    fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.get(name)
    }
}

/// An ordered list of candidate attribute names.
///
/// # Examples
///
/// ```
/// use netsvg::graph::{AttrValue, Attributes};
/// use netsvg::resolve::Cascade;
///
/// const RADIUS: Cascade = Cascade::new(&["Size", "size", "radius"]);
///
/// let mut attrs = Attributes::new();
/// attrs.insert("size".to_string(), AttrValue::from(""));
/// attrs.insert("radius".to_string(), AttrValue::from(12));
///
/// assert_eq!(RADIUS.number_or(&attrs, 8.0), 12.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cascade {
    candidates: &'static [&'static str],
}

impl Cascade {
    /// Creates a cascade over the given names, tried in order
    pub const fn new(candidates: &'static [&'static str]) -> Self {
        Self { candidates }
    }

    /// Returns the candidate names in lookup order
    pub fn candidates(&self) -> &'static [&'static str] {
        self.candidates
    }

    /// Returns the first candidate value that is present and non-empty.
    pub fn lookup<'a, S>(&self, source: &'a S) -> Option<&'a AttrValue>
    where
        S: AttributeSource + ?Sized,
    {
        self.candidates
            .iter()
            .filter_map(|name| source.attribute(name))
            .find(|value| !value.is_empty())
    }

    /// Returns the winning value as a number, if it is numeric.
    pub fn number<S>(&self, source: &S) -> Option<f64>
    where
        S: AttributeSource + ?Sized,
    {
        self.lookup(source).and_then(AttrValue::as_f64)
    }

    /// Returns the winning value as a number, or `default`.
    ///
    /// A non-numeric winner yields `default`; later candidates are not
    /// consulted.
    pub fn number_or<S>(&self, source: &S, default: f64) -> f64
    where
        S: AttributeSource + ?Sized,
    {
        self.number(source).unwrap_or(default)
    }

    /// Returns the winning value formatted as text.
    pub fn text<S>(&self, source: &S) -> Option<String>
    where
        S: AttributeSource + ?Sized,
    {
        self.lookup(source).map(ToString::to_string)
    }

    /// Returns the winning value formatted as text, or `default`.
    pub fn text_or<S>(&self, source: &S, default: &str) -> String
    where
        S: AttributeSource + ?Sized,
    {
        self.text(source).unwrap_or_else(|| default.to_string())
    }

    /// Returns the winning value interpreted as a flag.
    pub fn flag<S>(&self, source: &S) -> Option<bool>
    where
        S: AttributeSource + ?Sized,
    {
        self.lookup(source).and_then(AttrValue::as_bool)
    }
}

pub const NODE_RADIUS: Cascade = Cascade::new(&["Size", "size", "radius", "Radius"]);
pub const NODE_FILL: Cascade = Cascade::new(&["Color", "color", "fill"]);
pub const NODE_OUTLINE: Cascade = Cascade::new(&["OutlineColor", "outline_color", "stroke"]);
pub const NODE_OUTLINE_WIDTH: Cascade = Cascade::new(&["OutlineWidth", "outline_width", "stroke_width"]);
pub const EDGE_COLOR: Cascade = Cascade::new(&["Color", "color", "stroke"]);
pub const EDGE_USE_SOURCE_COLOR: Cascade = Cascade::new(&["UseSourceColor", "use_source_color"]);
pub const EDGE_USE_TARGET_COLOR: Cascade = Cascade::new(&["UseTargetColor", "use_target_color"]);
pub const EDGE_WIDTH: Cascade = Cascade::new(&["Width", "width", "stroke_width"]);
pub const EDGE_WEIGHT: Cascade = Cascade::new(&["weight", "Weight"]);
pub const EDGE_OPACITY: Cascade = Cascade::new(&["Opacity", "opacity", "alpha"]);
pub const LABEL_TEXT: Cascade = Cascade::new(&["Label", "label", "name"]);
pub const LABEL_VISIBLE: Cascade = Cascade::new(&["ShowLabel", "show_label"]);
pub const LABEL_OUTLINE: Cascade = Cascade::new(&["LabelOutline", "label_outline"]);
pub const LABEL_SIZE: Cascade = Cascade::new(&["LabelSize", "label_size", "FontSize", "font_size"]);

pub const DEFAULT_NODE_RADIUS: f64 = 8.0;
pub const DEFAULT_NODE_FILL: &str = "#4C78A8";
pub const DEFAULT_OUTLINE_WIDTH: f64 = 1.0;
pub const DEFAULT_EDGE_COLOR: &str = "#999999";
pub const DEFAULT_EDGE_WIDTH: f64 = 1.0;
pub const DEFAULT_EDGE_OPACITY: f64 = 0.85;
pub const DEFAULT_LABEL_OUTLINE: f64 = 2.0;
pub const DEFAULT_LABEL_FILL: &str = "#ffffff";

/// Factor applied to a fill color to derive outline and label stroke colors.
pub const OUTLINE_DARKEN_FACTOR: f32 = 0.7;

pub fn node_radius<S: AttributeSource + ?Sized>(vertex: &S) -> f64 {
    NODE_RADIUS.number_or(vertex, DEFAULT_NODE_RADIUS)
}

pub fn node_fill<S: AttributeSource + ?Sized>(vertex: &S) -> String {
    NODE_FILL.text_or(vertex, DEFAULT_NODE_FILL)
}

/// Returns the outline color, defaulting to the darkened fill.
pub fn node_outline<S: AttributeSource + ?Sized>(vertex: &S, fill: &str) -> String {
    NODE_OUTLINE
        .text(vertex)
        .unwrap_or_else(|| darken_or_keep(fill, OUTLINE_DARKEN_FACTOR))
}

pub fn node_outline_width<S: AttributeSource + ?Sized>(vertex: &S) -> f64 {
    NODE_OUTLINE_WIDTH.number_or(vertex, DEFAULT_OUTLINE_WIDTH)
}

/// Returns the stroke color of an edge.
///
/// An explicit color wins; otherwise `UseSourceColor` or `UseTargetColor`
/// borrow the fill of the matching endpoint, the source taking precedence.
pub fn edge_color<G: Graph + ?Sized>(edge: &EdgeRef<'_, G>) -> String {
    if let Some(color) = EDGE_COLOR.text(edge) {
        return color;
    }
    if EDGE_USE_SOURCE_COLOR.flag(edge) == Some(true) {
        return node_fill(&edge.source_vertex());
    }
    if EDGE_USE_TARGET_COLOR.flag(edge) == Some(true) {
        return node_fill(&edge.target_vertex());
    }
    DEFAULT_EDGE_COLOR.to_string()
}

/// Returns the stroke width of an edge.
///
/// Without an explicit width the edge weight maps to `1 + 0.5 * weight`.
pub fn edge_width<S: AttributeSource + ?Sized>(edge: &S) -> f64 {
    if let Some(width) = EDGE_WIDTH.lookup(edge) {
        return width.as_f64().unwrap_or(DEFAULT_EDGE_WIDTH);
    }
    match EDGE_WEIGHT.lookup(edge) {
        Some(weight) => 1.0 + 0.5 * weight.as_f64().unwrap_or(0.0),
        None => DEFAULT_EDGE_WIDTH,
    }
}

pub fn edge_opacity<S: AttributeSource + ?Sized>(edge: &S) -> f64 {
    EDGE_OPACITY.number_or(edge, DEFAULT_EDGE_OPACITY)
}

/// Returns the label text of a vertex, or `None` when it has no visible label.
pub fn label_text<S: AttributeSource + ?Sized>(vertex: &S) -> Option<String> {
    if LABEL_VISIBLE.flag(vertex) == Some(false) {
        return None;
    }
    LABEL_TEXT.text(vertex)
}

pub fn label_outline_width<S: AttributeSource + ?Sized>(vertex: &S) -> f64 {
    LABEL_OUTLINE.number_or(vertex, DEFAULT_LABEL_OUTLINE)
}

pub fn label_size<S: AttributeSource + ?Sized>(vertex: &S) -> Option<String> {
    LABEL_SIZE.text(vertex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NetworkGraph;

    fn attrs(pairs: &[(&str, AttrValue)]) -> Attributes {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_cascade_order() {
        let source = attrs(&[("radius", 3.into()), ("Size", 5.into())]);
        assert_eq!(NODE_RADIUS.number(&source), Some(5.0));
        assert_eq!(NODE_RADIUS.lookup(&attrs(&[])), None);
    }

    #[test]
    fn test_cascade_skips_empty_values() {
        let source = attrs(&[("Color", "".into()), ("fill", "red".into())]);
        assert_eq!(node_fill(&source), "red");
    }

    #[test]
    fn test_non_numeric_winner_uses_default() {
        let source = attrs(&[("Size", "big".into()), ("radius", 4.into())]);
        assert_eq!(node_radius(&source), DEFAULT_NODE_RADIUS);
    }

    #[test]
    fn test_node_defaults() {
        let empty = attrs(&[]);
        assert_eq!(node_radius(&empty), 8.0);
        assert_eq!(node_fill(&empty), "#4C78A8");
        assert_eq!(node_outline(&empty, "#4C78A8"), "#355475");
        assert_eq!(node_outline_width(&empty), 1.0);
        assert_eq!(node_outline(&attrs(&[("stroke", "black".into())]), "#4C78A8"), "black");
    }

    #[test]
    fn test_edge_width_from_weight() {
        assert_eq!(edge_width(&attrs(&[("weight", 4.into())])), 3.0);
        assert_eq!(edge_width(&attrs(&[("Weight", "x".into())])), 1.0);
        assert_eq!(edge_width(&attrs(&[("width", 2.5.into()), ("weight", 4.into())])), 2.5);
        assert_eq!(edge_width(&attrs(&[])), 1.0);
        assert_eq!(edge_opacity(&attrs(&[])), 0.85);
    }

    #[test]
    fn test_edge_color_from_endpoints() {
        let mut graph = NetworkGraph::new(true);
        let a = graph.add_vertex([("color", "#ff0000".into())]);
        let b = graph.add_vertex([("color", "#0000ff".into())]);
        graph.add_edge(a, b, [("UseTargetColor", true.into())]).unwrap();
        graph.add_edge(a, b, [("use_source_color", "yes".into())]).unwrap();
        graph.add_edge(a, b, [("stroke", "green".into()), ("UseSourceColor", true.into())]).unwrap();
        graph.add_edge(a, b, []).unwrap();

        let colors: Vec<String> = (0..4)
            .map(|i| edge_color(&EdgeRef::new(&graph, i).unwrap()))
            .collect();
        assert_eq!(colors, vec!["#0000ff", "#ff0000", "green", "#999999"]);
    }

    #[test]
    fn test_label_visibility() {
        assert_eq!(label_text(&attrs(&[("name", "n1".into())])), Some("n1".to_string()));
        assert_eq!(
            label_text(&attrs(&[("Label", "A".into()), ("ShowLabel", false.into())])),
            None
        );
        assert_eq!(label_text(&attrs(&[("show_label", true.into())])), None);
        assert_eq!(label_size(&attrs(&[("font_size", 14.into())])), Some("14".to_string()));
        assert_eq!(label_outline_width(&attrs(&[])), 2.0);
    }
}
