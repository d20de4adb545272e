//! Compiles a graph into a layered SVG diagram.
//!
//! [`NetworkSvg`] draws one element per edge, one group per vertex and one
//! group per labelled vertex into three layer groups, in this order:
//!
//! ```text
//! <svg>
//!   <style/>            optional, shared by all injected rules
//!   <defs/>             optional, holds edge gradients
//!   <rect/>             optional background
//!   <g class="edge-visuals">   one element per edge
//!   <g class="node-visuals">   <g class="node" transform="translate(x,y)">
//!   <g class="label-visuals">  <g class="label" transform="translate(x,y)">
//! </svg>
//! ```
//!
//! Each layer is exposed as a [`Selection`] bound to [`VertexRef`] or
//! [`EdgeRef`] data, so the usual selection calls restyle the diagram after
//! it is built.
//!
//! # Examples
//!
//! ```
//! use netsvg::graph::NetworkGraph;
//! use netsvg::layout::FitMargin;
//! use netsvg::network::{ExportOptions, NetworkSvg};
//!
//! let mut graph = NetworkGraph::ring(3, false);
//! graph.set_vertex_column("position", [(0.0, 0.0), (100.0, 0.0), (50.0, 80.0)]);
//! graph.set_vertex_column("label", ["a", "b", "c"]);
//!
//! let network = NetworkSvg::builder(&graph)
//!     .with_size(200.0, 200.0)
//!     .with_fit_to_view(true, FitMargin::Uniform(20.0))
//!     .build()
//!     .unwrap();
//!
//! network.edges().attr("stroke", "#333333");
//! assert_eq!(network.nodes().len(), 3);
//! assert_eq!(network.labels().len(), 3);
//!
//! let markup = network.to_svg(ExportOptions::new(false, false));
//! assert!(markup.contains(r#"<g class="node-visuals">"#));
//! ```

use std::{fmt, path::Path};

use log::{debug, info, trace};
use serde::Deserialize;

use netsvg_core::{
    color::{Color, darken_or_keep},
    dom::{Document, NodeId},
    geometry::{Point, Size},
};

use crate::{
    canvas::SvgCanvas,
    config::{AppConfig, DEFAULT_LABEL_FONT_FAMILY},
    error::NetSvgError,
    generator::{self, GeneratorOutput},
    graph::{EdgeRef, Graph, VertexRef},
    layout::{
        CurveRadius, FitMargin, FitTransform, PositionInput, arc_path, resolve_positions, validate_curve_factor,
    },
    resolve::{self, DEFAULT_LABEL_FILL, OUTLINE_DARKEN_FACTOR},
    selection::{Selection, canonical_name},
    sort::{SortSpec, sort_selection},
};

/// Custom node markup: `(vertex, fitted position)`. Output is drawn inside a
/// group translated to the position, so it should be centered on the origin.
pub type NodeGenerator<'g, G> = Box<dyn Fn(VertexRef<'g, G>, Point) -> Option<GeneratorOutput> + 'g>;

/// Custom edge markup: `(edge, source position, target position)`, in
/// absolute fitted coordinates.
pub type EdgeGenerator<'g, G> = Box<dyn Fn(EdgeRef<'g, G>, Point, Point) -> Option<GeneratorOutput> + 'g>;

/// Custom label markup: `(vertex, fitted position, label text)`. Output is
/// drawn inside a translated group like node output.
pub type LabelGenerator<'g, G> = Box<dyn Fn(VertexRef<'g, G>, Point, &str) -> Option<GeneratorOutput> + 'g>;

/// How edge strokes are colored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeColorMode {
    /// The color resolved from edge attributes.
    #[default]
    Solid,
    /// The midpoint blend of both endpoint fills.
    Average,
    /// A linear gradient from the source fill to the target fill.
    LinearGradient,
    /// A radial gradient centered on the source, reaching the target fill at
    /// the target.
    RadialGradient,
}

/// The three layer groups of a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Edges,
    Nodes,
    Labels,
}

impl Layer {
    /// Returns the class attribute of the layer group
    pub fn class(self) -> &'static str {
        match self {
            Self::Edges => "edge-visuals",
            Self::Nodes => "node-visuals",
            Self::Labels => "label-visuals",
        }
    }
}

/// Options for serializing a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pretty: bool,
    illustrator_safe: bool,
}

impl ExportOptions {
    /// Creates export options.
    ///
    /// In illustrator-safe mode every stroked label text is split into a
    /// stroke-only copy underneath a fill-only copy, for viewers that ignore
    /// `paint-order`.
    pub fn new(pretty: bool, illustrator_safe: bool) -> Self {
        Self {
            pretty,
            illustrator_safe,
        }
    }

    /// Returns whether output is indented
    pub fn pretty(&self) -> bool {
        self.pretty
    }

    /// Returns whether label strokes are split
    pub fn illustrator_safe(&self) -> bool {
        self.illustrator_safe
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// Configures and builds a [`NetworkSvg`].
pub struct NetworkSvgBuilder<'g, G: Graph + ?Sized> {
    graph: &'g G,
    width: f64,
    height: f64,
    background: Option<String>,
    positions: Option<PositionInput<'g, G>>,
    fit_to_view: bool,
    fit_margin: FitMargin,
    directed_curves: bool,
    curve_factor: f32,
    curve_radius: CurveRadius<'g, EdgeRef<'g, G>>,
    node_generator: Option<NodeGenerator<'g, G>>,
    edge_generator: Option<EdgeGenerator<'g, G>>,
    label_generator: Option<LabelGenerator<'g, G>>,
    label_font_family: Option<String>,
    edge_color_mode: EdgeColorMode,
    css: Option<String>,
}

impl<'g, G: Graph + ?Sized> NetworkSvgBuilder<'g, G> {
    fn new(graph: &'g G) -> Self {
        Self {
            graph,
            width: 800.0,
            height: 600.0,
            background: None,
            positions: None,
            fit_to_view: false,
            fit_margin: FitMargin::default(),
            directed_curves: false,
            curve_factor: 1.0,
            curve_radius: CurveRadius::Default,
            node_generator: None,
            edge_generator: None,
            label_generator: None,
            label_font_family: Some(DEFAULT_LABEL_FONT_FAMILY.to_string()),
            edge_color_mode: EdgeColorMode::Solid,
            css: None,
        }
    }

    /// Applies the canvas, layout and style sections of a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::InvalidOption`] if the configuration holds an
    /// invalid background color or curve factor.
    pub fn with_config(mut self, config: &AppConfig) -> Result<Self, NetSvgError> {
        let canvas = config.canvas();
        self.width = canvas.width();
        self.height = canvas.height();
        self.background = canvas.background()?.map(str::to_string);

        let layout = config.layout();
        self.fit_to_view = layout.fit_to_view();
        self.fit_margin = layout.fit_margin();
        self.directed_curves = layout.directed_curves();
        self.curve_factor = layout.directed_curve_factor()?;

        let style = config.style();
        self.label_font_family = style.label_font_family().map(str::to_string);
        self.edge_color_mode = style.edge_color_mode();
        self.css = style.css().map(str::to_string);
        Ok(self)
    }

    /// Sets the canvas size
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Adds a background rectangle of the given color
    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }

    /// Supplies positions instead of reading them from vertex attributes
    pub fn with_positions(mut self, positions: PositionInput<'g, G>) -> Self {
        self.positions = Some(positions);
        self
    }

    /// Supplies positions through a per-vertex closure
    pub fn with_position_fn<F>(self, f: F) -> Self
    where
        F: Fn(VertexRef<'g, G>) -> Option<Point> + 'g,
    {
        self.with_positions(PositionInput::Computed(Box::new(f)))
    }

    /// Enables or disables fitting positions into the canvas.
    pub fn with_fit_to_view(mut self, enabled: bool, margin: FitMargin) -> Self {
        self.fit_to_view = enabled;
        self.fit_margin = margin;
        self
    }

    /// Draws the edges of directed graphs as clockwise arcs of radius
    /// `length / factor`. The factor is validated by [`build`](Self::build).
    pub fn with_directed_curves(mut self, enabled: bool, factor: f32) -> Self {
        self.directed_curves = enabled;
        self.curve_factor = factor;
        self
    }

    /// Overrides where arc radii come from
    pub fn with_curve_radius(mut self, radius: CurveRadius<'g, EdgeRef<'g, G>>) -> Self {
        self.curve_radius = radius;
        self
    }

    /// Replaces the default node markup
    pub fn with_node_generator<F>(mut self, f: F) -> Self
    where
        F: Fn(VertexRef<'g, G>, Point) -> Option<GeneratorOutput> + 'g,
    {
        self.node_generator = Some(Box::new(f));
        self
    }

    /// Replaces the default edge markup
    pub fn with_edge_generator<F>(mut self, f: F) -> Self
    where
        F: Fn(EdgeRef<'g, G>, Point, Point) -> Option<GeneratorOutput> + 'g,
    {
        self.edge_generator = Some(Box::new(f));
        self
    }

    /// Replaces the default label markup
    pub fn with_label_generator<F>(mut self, f: F) -> Self
    where
        F: Fn(VertexRef<'g, G>, Point, &str) -> Option<GeneratorOutput> + 'g,
    {
        self.label_generator = Some(Box::new(f));
        self
    }

    /// Sets the label font stack; `None` injects no font rule.
    pub fn with_label_font_family(mut self, family: Option<&str>) -> Self {
        self.label_font_family = family.map(str::to_string);
        self
    }

    /// Sets how edge strokes are colored
    pub fn with_edge_color_mode(mut self, mode: EdgeColorMode) -> Self {
        self.edge_color_mode = mode;
        self
    }

    /// Builds the diagram.
    ///
    /// # Errors
    ///
    /// - [`NetSvgError::InvalidOption`] for a curve factor that is not a
    ///   finite positive number.
    /// - [`NetSvgError::MissingPositions`], [`NetSvgError::PositionCountMismatch`]
    ///   or [`NetSvgError::InvalidPosition`] if positions cannot be resolved.
    /// - [`NetSvgError::InvalidGeneratorOutput`] if a generator returns
    ///   unusable markup.
    pub fn build(self) -> Result<NetworkSvg<'g, G>, NetSvgError> {
        let graph = self.graph;
        let curve_factor = validate_curve_factor(self.curve_factor)?;

        let original_positions = resolve_positions(graph, self.positions.as_ref())?;
        let fit_transform = if self.fit_to_view {
            FitTransform::compute(
                &original_positions,
                Size::new(self.width as f32, self.height as f32),
                self.fit_margin.insets(),
            )
        } else {
            None
        };
        let positions: Vec<Point> = match &fit_transform {
            Some(fit) => original_positions.iter().map(|point| fit.apply(*point)).collect(),
            None => original_positions.clone(),
        };

        let mut canvas = SvgCanvas::new(self.width, self.height);
        if let Some(background) = &self.background {
            canvas = canvas.with_background(background);
        }
        let document = canvas.document().clone();
        let root = document.root();
        let layers = [Layer::Edges, Layer::Nodes, Layer::Labels].map(|layer| {
            let group = document.append_element(root, "g");
            document.set_attr(group, "class", layer.class());
            group
        });
        let [edge_layer, node_layer, label_layer] = layers;

        if let Some(family) = &self.label_font_family {
            canvas.add_style(&format!(".label text {{ font-family: {family}; }}"));
        }
        if let Some(css) = &self.css {
            canvas.add_style(css);
        }

        let mut network = NetworkSvg {
            graph,
            nodes: Selection::new(document.clone(), []),
            edges: Selection::new(document.clone(), []),
            labels: Selection::new(document.clone(), []),
            canvas,
            layers,
            original_positions,
            positions,
            fit_transform,
            curve_factor,
            curve_radius: self.curve_radius,
            arcs: Vec::new(),
            gradients: Vec::new(),
            edge_color_mode: EdgeColorMode::Solid,
        };

        let curved = self.directed_curves && graph.is_directed();
        network.edges = network.build_edges(edge_layer, self.edge_generator.as_deref(), curved)?;
        network.nodes = network.build_nodes(node_layer, self.node_generator.as_deref())?;
        network.labels = network.build_labels(label_layer, self.label_generator.as_deref())?;

        if self.edge_color_mode != EdgeColorMode::Solid {
            network.apply_edge_color_mode(self.edge_color_mode);
        }

        info!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            labels = network.labels.len(),
            fitted = network.fit_transform.is_some();
            "Network diagram built"
        );
        Ok(network)
    }
}

impl<G: Graph + ?Sized> fmt::Debug for NetworkSvgBuilder<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkSvgBuilder")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("background", &self.background)
            .field("positions", &self.positions)
            .field("fit_to_view", &self.fit_to_view)
            .field("fit_margin", &self.fit_margin)
            .field("directed_curves", &self.directed_curves)
            .field("curve_factor", &self.curve_factor)
            .field("curve_radius", &self.curve_radius)
            .field("node_generator", &self.node_generator.is_some())
            .field("edge_generator", &self.edge_generator.is_some())
            .field("label_generator", &self.label_generator.is_some())
            .field("label_font_family", &self.label_font_family)
            .field("edge_color_mode", &self.edge_color_mode)
            .finish()
    }
}

/// A compiled network diagram.
pub struct NetworkSvg<'g, G: Graph + ?Sized> {
    graph: &'g G,
    canvas: SvgCanvas,
    layers: [NodeId; 3],
    nodes: Selection<VertexRef<'g, G>>,
    edges: Selection<EdgeRef<'g, G>>,
    labels: Selection<VertexRef<'g, G>>,
    original_positions: Vec<Point>,
    positions: Vec<Point>,
    fit_transform: Option<FitTransform>,
    curve_factor: f32,
    curve_radius: CurveRadius<'g, EdgeRef<'g, G>>,
    /// Default arc elements, rewritten when the radius source changes.
    arcs: Vec<(NodeId, EdgeRef<'g, G>)>,
    gradients: Vec<NodeId>,
    edge_color_mode: EdgeColorMode,
}

fn translate(point: Point) -> String {
    format!("translate({},{})", point.x(), point.y())
}

fn set_attrs(document: &Document, node: NodeId, attrs: &[(&str, String)]) {
    for (name, value) in attrs {
        document.set_attr(node, name, value.as_str());
    }
}

/// Copies `node` and its subtree into a new detached element.
fn duplicate(document: &Document, node: NodeId) -> NodeId {
    let copy = document.create_element(&document.tag(node));
    for (name, value) in document.attrs(node) {
        document.set_attr(copy, &name, value);
    }
    if let Some(text) = document.text(node) {
        document.set_text(copy, text);
    }
    for child in document.children(node) {
        let child_copy = duplicate(document, child);
        // A fresh element cannot contain its new parent.
        let _ = document.append_child(copy, child_copy);
    }
    copy
}

fn has_class(document: &Document, node: NodeId, class: &str) -> bool {
    document
        .attr(node, "class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

/// Splits every stroked label text into a stroke-only copy and a fill-only
/// original, the copy placed directly before the original.
fn split_label_strokes(document: &Document) {
    let label_groups = document
        .descendants(document.root())
        .into_iter()
        .filter(|node| document.tag(*node) == "g" && has_class(document, *node, "label"));

    for group in label_groups {
        let texts = document
            .children(group)
            .into_iter()
            .filter(|node| document.tag(*node) == "text");
        for text in texts {
            if document.attr(text, "stroke").is_none_or(|stroke| stroke.is_empty()) {
                continue;
            }
            let zero_width = document
                .attr(text, "stroke-width")
                .and_then(|width| width.trim().parse::<f64>().ok())
                .is_some_and(|width| width == 0.0);
            if zero_width {
                continue;
            }

            let background = duplicate(document, text);
            document.set_attr(background, "fill", "none");
            document.remove_attr(background, "paint-order");
            for (name, _) in document.attrs(text) {
                if name.starts_with("stroke") {
                    document.remove_attr(text, &name);
                }
            }
            document.remove_attr(text, "paint-order");

            let index = document.child_index(group, text).unwrap_or(0);
            // The copy is detached, so it cannot contain the group.
            let _ = document.insert_child(group, index, background);
            trace!(group = group.index(); "Split label stroke");
        }
    }
}

impl<'g, G: Graph + ?Sized> NetworkSvg<'g, G> {
    /// Starts configuring a diagram of `graph`.
    pub fn builder(graph: &'g G) -> NetworkSvgBuilder<'g, G> {
        NetworkSvgBuilder::new(graph)
    }

    fn place(&self, output: Option<GeneratorOutput>, parent: NodeId) -> Result<Vec<NodeId>, NetSvgError> {
        let document = self.canvas.document();
        match output {
            Some(output) => {
                let items = generator::normalize(output, document, parent)?;
                Ok(generator::insert(items, document, parent))
            }
            None => Ok(Vec::new()),
        }
    }

    fn build_edges(
        &mut self,
        layer: NodeId,
        generate: Option<&(dyn Fn(EdgeRef<'g, G>, Point, Point) -> Option<GeneratorOutput> + 'g)>,
        curved: bool,
    ) -> Result<Selection<EdgeRef<'g, G>>, NetSvgError> {
        let document = self.canvas.document().clone();
        let mut nodes = Vec::new();
        let mut data = Vec::new();

        for edge in (0..self.graph.edge_count()).filter_map(|index| EdgeRef::new(self.graph, index)) {
            let start = self.positions[edge.source()];
            let end = self.positions[edge.target()];

            let node = if let Some(generate) = generate {
                let items = match generate(edge, start, end) {
                    Some(output) => generator::normalize(output, &document, layer)?,
                    None => Vec::new(),
                };
                if items.len() == 1 {
                    generator::insert(items, &document, layer)[0]
                } else {
                    let group = document.append_element(layer, "g");
                    document.set_attr(group, "class", "edge");
                    generator::insert(items, &document, group);
                    group
                }
            } else {
                let stroke = resolve::edge_color(&edge);
                let width = resolve::edge_width(&edge);
                let opacity = resolve::edge_opacity(&edge);
                if curved {
                    let radius = self.curve_radius.radius(&edge, start.distance(end), self.curve_factor);
                    let path = document.append_element(layer, "path");
                    set_attrs(
                        &document,
                        path,
                        &[
                            ("d", arc_path(start, end, radius)),
                            ("fill", "none".to_string()),
                            ("stroke", stroke),
                            ("stroke-width", width.to_string()),
                            ("opacity", opacity.to_string()),
                        ],
                    );
                    self.arcs.push((path, edge));
                    path
                } else {
                    let line = document.append_element(layer, "line");
                    set_attrs(
                        &document,
                        line,
                        &[
                            ("x1", start.x().to_string()),
                            ("y1", start.y().to_string()),
                            ("x2", end.x().to_string()),
                            ("y2", end.y().to_string()),
                            ("stroke", stroke),
                            ("stroke-width", width.to_string()),
                            ("opacity", opacity.to_string()),
                        ],
                    );
                    line
                }
            };
            nodes.push(node);
            data.push(Some(edge));
        }

        debug!(edges = nodes.len(), curved = curved; "Built edge layer");
        Ok(Selection::from_parts(document, nodes, data))
    }

    fn build_nodes(
        &self,
        layer: NodeId,
        generate: Option<&(dyn Fn(VertexRef<'g, G>, Point) -> Option<GeneratorOutput> + 'g)>,
    ) -> Result<Selection<VertexRef<'g, G>>, NetSvgError> {
        let document = self.canvas.document().clone();
        let mut nodes = Vec::new();
        let mut data = Vec::new();

        for index in 0..self.graph.vertex_count() {
            let vertex = VertexRef::new(self.graph, index);
            let position = self.positions[index];
            let group = document.append_element(layer, "g");
            set_attrs(
                &document,
                group,
                &[("class", "node".to_string()), ("transform", translate(position))],
            );

            if let Some(generate) = generate {
                self.place(generate(vertex, position), group)?;
            } else {
                let fill = resolve::node_fill(&vertex);
                let stroke = resolve::node_outline(&vertex, &fill);
                let circle = document.append_element(group, "circle");
                set_attrs(
                    &document,
                    circle,
                    &[
                        ("r", resolve::node_radius(&vertex).to_string()),
                        ("fill", fill),
                        ("stroke", stroke),
                        ("stroke-width", resolve::node_outline_width(&vertex).to_string()),
                    ],
                );
            }
            nodes.push(group);
            data.push(Some(vertex));
        }

        debug!(nodes = nodes.len(); "Built node layer");
        Ok(Selection::from_parts(document, nodes, data))
    }

    fn build_labels(
        &self,
        layer: NodeId,
        generate: Option<&(dyn Fn(VertexRef<'g, G>, Point, &str) -> Option<GeneratorOutput> + 'g)>,
    ) -> Result<Selection<VertexRef<'g, G>>, NetSvgError> {
        let document = self.canvas.document().clone();
        let mut nodes = Vec::new();
        let mut data = Vec::new();

        for index in 0..self.graph.vertex_count() {
            let vertex = VertexRef::new(self.graph, index);
            let Some(text) = resolve::label_text(&vertex) else {
                continue;
            };
            let position = self.positions[index];
            let group = document.append_element(layer, "g");
            set_attrs(
                &document,
                group,
                &[("class", "label".to_string()), ("transform", translate(position))],
            );

            if let Some(generate) = generate {
                self.place(generate(vertex, position, &text), group)?;
            } else {
                let fill = resolve::node_fill(&vertex);
                let element = document.append_element(group, "text");
                let mut attrs = vec![
                    ("text-anchor", "middle".to_string()),
                    ("dy", "0.35em".to_string()),
                    ("fill", DEFAULT_LABEL_FILL.to_string()),
                    ("stroke", darken_or_keep(&fill, OUTLINE_DARKEN_FACTOR)),
                    ("stroke-width", resolve::label_outline_width(&vertex).to_string()),
                    ("paint-order", "stroke fill".to_string()),
                    ("stroke-linecap", "round".to_string()),
                    ("stroke-linejoin", "round".to_string()),
                    ("stroke-miterlimit", "1".to_string()),
                ];
                if let Some(size) = resolve::label_size(&vertex) {
                    attrs.push(("font-size", size));
                }
                set_attrs(&document, element, &attrs);
                document.set_text(element, text);
            }
            nodes.push(group);
            data.push(Some(vertex));
        }

        debug!(labels = nodes.len(); "Built label layer");
        Ok(Selection::from_parts(document, nodes, data))
    }

    /// Returns the graph the diagram was built from
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// Returns the underlying canvas
    pub fn canvas(&self) -> &SvgCanvas {
        &self.canvas
    }

    /// Returns the node groups, bound to their vertices
    pub fn nodes(&self) -> &Selection<VertexRef<'g, G>> {
        &self.nodes
    }

    /// Returns the edge elements, bound to their edges
    pub fn edges(&self) -> &Selection<EdgeRef<'g, G>> {
        &self.edges
    }

    /// Returns the label groups, bound to their vertices
    pub fn labels(&self) -> &Selection<VertexRef<'g, G>> {
        &self.labels
    }

    /// Returns a selection of a layer group
    pub fn layer(&self, layer: Layer) -> Selection {
        let node = match layer {
            Layer::Edges => self.layers[0],
            Layer::Nodes => self.layers[1],
            Layer::Labels => self.layers[2],
        };
        Selection::new(self.canvas.document().clone(), [node])
    }

    /// Returns the positions nodes are drawn at
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// Returns the positions as resolved, before fitting
    pub fn original_positions(&self) -> &[Point] {
        &self.original_positions
    }

    /// Returns the fit transform, if fitting was enabled
    pub fn fit_transform(&self) -> Option<FitTransform> {
        self.fit_transform
    }

    /// Returns the current edge coloring mode
    pub fn edge_color_mode(&self) -> EdgeColorMode {
        self.edge_color_mode
    }

    /// Reorders the node layer.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::AmbiguousSortSpec`] unless `spec` names exactly
    /// one ordering source.
    pub fn sort_nodes(
        &mut self,
        spec: &SortSpec<'_, VertexRef<'g, G>>,
    ) -> Result<&Selection<VertexRef<'g, G>>, NetSvgError> {
        sort_selection(&mut self.nodes, spec)?;
        Ok(&self.nodes)
    }

    /// Reorders the edge layer.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::AmbiguousSortSpec`] unless `spec` names exactly
    /// one ordering source.
    pub fn sort_edges(&mut self, spec: &SortSpec<'_, EdgeRef<'g, G>>) -> Result<&Selection<EdgeRef<'g, G>>, NetSvgError> {
        sort_selection(&mut self.edges, spec)?;
        Ok(&self.edges)
    }

    /// Reorders the label layer.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::AmbiguousSortSpec`] unless `spec` names exactly
    /// one ordering source.
    pub fn sort_labels(
        &mut self,
        spec: &SortSpec<'_, VertexRef<'g, G>>,
    ) -> Result<&Selection<VertexRef<'g, G>>, NetSvgError> {
        sort_selection(&mut self.labels, spec)?;
        Ok(&self.labels)
    }

    /// Replaces the radius source of curved edges and redraws their paths.
    pub fn set_curve_radius(&mut self, radius: CurveRadius<'g, EdgeRef<'g, G>>) {
        self.curve_radius = radius;
        self.redraw_arcs();
    }

    /// Replaces the curve factor and redraws curved edge paths.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::InvalidOption`] unless the factor is finite and
    /// greater than zero; the diagram is unchanged in that case.
    pub fn set_curve_factor(&mut self, factor: f32) -> Result<(), NetSvgError> {
        self.curve_factor = validate_curve_factor(factor)?;
        self.redraw_arcs();
        Ok(())
    }

    fn redraw_arcs(&self) {
        let document = self.canvas.document();
        for (path, edge) in &self.arcs {
            let start = self.positions[edge.source()];
            let end = self.positions[edge.target()];
            let radius = self.curve_radius.radius(edge, start.distance(end), self.curve_factor);
            document.set_attr(*path, "d", arc_path(start, end, radius));
        }
        debug!(arcs = self.arcs.len(); "Redrew curved edges");
    }

    /// Recolors every edge according to `mode`.
    ///
    /// Gradients generated by a previous mode are removed first. Endpoint
    /// fills that are not parseable colors blend to the source fill.
    pub fn apply_edge_color_mode(&mut self, mode: EdgeColorMode) {
        self.clear_gradients();

        let mut gradients = Vec::new();
        let strokes: Vec<String> = self
            .edges
            .data_items()
            .iter()
            .flatten()
            .map(|edge| match mode {
                EdgeColorMode::Solid => resolve::edge_color(edge),
                EdgeColorMode::Average => {
                    let source = resolve::node_fill(&edge.source_vertex());
                    let target = resolve::node_fill(&edge.target_vertex());
                    match (Color::new(&source), Color::new(&target)) {
                        (Ok(a), Ok(b)) => a.mix(b, 0.5).to_hex(),
                        _ => source,
                    }
                }
                EdgeColorMode::LinearGradient | EdgeColorMode::RadialGradient => {
                    let (gradient, id) = self.add_gradient(edge, mode);
                    gradients.push(gradient);
                    format!("url(#{id})")
                }
            })
            .collect();
        self.gradients = gradients;

        self.edges.attr_fn("stroke", |_, index, _| strokes.get(index).cloned());
        self.edge_color_mode = mode;
        debug!(mode:? = mode, gradients = self.gradients.len(); "Applied edge color mode");
    }

    fn add_gradient(&self, edge: &EdgeRef<'g, G>, mode: EdgeColorMode) -> (NodeId, String) {
        let document = self.canvas.document();
        let defs = self.canvas.defs();
        let start = self.positions[edge.source()];
        let end = self.positions[edge.target()];
        let id = format!("edge-gradient-{}", edge.index());

        let gradient = if mode == EdgeColorMode::RadialGradient {
            let gradient = document.append_element(defs, "radialGradient");
            set_attrs(
                document,
                gradient,
                &[
                    ("cx", start.x().to_string()),
                    ("cy", start.y().to_string()),
                    ("r", start.distance(end).max(1.0).to_string()),
                    ("fx", start.x().to_string()),
                    ("fy", start.y().to_string()),
                ],
            );
            gradient
        } else {
            let gradient = document.append_element(defs, "linearGradient");
            set_attrs(
                document,
                gradient,
                &[
                    ("x1", start.x().to_string()),
                    ("y1", start.y().to_string()),
                    ("x2", end.x().to_string()),
                    ("y2", end.y().to_string()),
                ],
            );
            gradient
        };
        document.set_attr(gradient, "id", id.as_str());
        document.set_attr(gradient, "gradientUnits", "userSpaceOnUse");

        for (offset, vertex) in [("0%", edge.source_vertex()), ("100%", edge.target_vertex())] {
            let stop = document.append_element(gradient, "stop");
            set_attrs(
                document,
                stop,
                &[("offset", offset.to_string()), ("stop-color", resolve::node_fill(&vertex))],
            );
        }
        (gradient, id)
    }

    fn clear_gradients(&mut self) {
        let document = self.canvas.document();
        let Some(&first) = self.gradients.first() else {
            return;
        };
        let defs = document.parent(first);
        for gradient in self.gradients.drain(..) {
            document.detach(gradient);
        }
        if let Some(defs) = defs {
            if document.children(defs).is_empty() {
                document.detach(defs);
            }
        }
    }

    /// Adds CSS rules to the document's single style element.
    pub fn add_style(&self, css: &str) -> Selection {
        self.canvas.add_style(css)
    }

    /// Adds a rule for `selector` built from `declarations`.
    ///
    /// Declarations with a `None` value are skipped; names are converted to
    /// their hyphenated form. Returns `None` and adds nothing when no
    /// declaration remains.
    ///
    /// # Examples
    ///
    /// ```
    /// # use netsvg::graph::NetworkGraph;
    /// # use netsvg::network::NetworkSvg;
    /// # use netsvg_core::geometry::Point;
    /// let graph = NetworkGraph::ring(1, false);
    /// let network = NetworkSvg::builder(&graph)
    ///     .with_position_fn(|_| Some(Point::new(0.0, 0.0)))
    ///     .with_label_font_family(None)
    ///     .build()
    ///     .unwrap();
    ///
    /// let style = network.set_text_style("text", [("font_size", Some("12px")), ("fill", None)]).unwrap();
    /// assert_eq!(style.get_text().as_deref(), Some("text {font-size: 12px;}"));
    /// ```
    pub fn set_text_style<'a, I, V>(&self, selector: &str, declarations: I) -> Option<Selection>
    where
        I: IntoIterator<Item = (&'a str, Option<V>)>,
        V: fmt::Display,
    {
        let declarations: Vec<String> = declarations
            .into_iter()
            .filter_map(|(name, value)| value.map(|value| format!("{}: {value}", canonical_name(name))))
            .collect();
        if declarations.is_empty() {
            return None;
        }
        Some(self.add_style(&format!("{selector} {{{};}}", declarations.join("; "))))
    }

    fn export_document(&self, options: ExportOptions) -> Document {
        if !options.illustrator_safe() {
            return self.canvas.document().clone();
        }
        let copy = self.canvas.document().deep_copy();
        split_label_strokes(&copy);
        copy
    }

    /// Serializes the diagram.
    ///
    /// Illustrator-safe output is produced from a copy; the live document is
    /// never changed by exporting.
    pub fn to_svg(&self, options: ExportOptions) -> String {
        self.export_document(options).serialize(options.pretty())
    }

    /// Writes the diagram to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::Dom`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>, options: ExportOptions) -> Result<(), NetSvgError> {
        let path = path.as_ref();
        self.export_document(options).write_to(path, options.pretty())?;
        info!(
            path = path.display().to_string(),
            illustrator_safe = options.illustrator_safe();
            "Network diagram saved"
        );
        Ok(())
    }
}

impl<G: Graph + ?Sized> fmt::Debug for NetworkSvg<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkSvg")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("labels", &self.labels.len())
            .field("fit_transform", &self.fit_transform)
            .field("curve_factor", &self.curve_factor)
            .field("edge_color_mode", &self.edge_color_mode)
            .finish()
    }
}
