//! Node positions and edge geometry.
//!
//! # Position resolution
//!
//! The first source that is set on every vertex wins:
//!
//! 1. Positions passed to the builder, as a list or a per-vertex closure.
//! 2. A vertex attribute holding an `[x, y]` pair: `Position`, `position`
//!    or `positions`, tried in that order.
//! 3. Separate vertex attributes, trying `x`/`y`, `x`/`Y`, `X`/`y`, `X`/`Y`.
//!
//! A spelling missing on some vertex is skipped. Once a spelling is set on
//! every vertex, a value in it that is not a finite coordinate is an error.
//!
//! # Fit to view
//!
//! A [`FitTransform`] maps the original coordinates into the canvas with a
//! uniform scale, centered inside the margins. Both coordinate sets are kept.
//!
//! # Edge paths
//!
//! Straight edges are segments between node centers. Curved edges are
//! circular arcs through both endpoints with radius `length / factor`,
//! unless a [`CurveRadius`] override supplies another radius. Every arc is
//! drawn with large-arc flag `0` and sweep flag `1`: in SVG's y-down space
//! the arc turns clockwise from source to target, so it bows to the left of
//! the direction of travel and a reversed edge bows to the other side.

use log::{debug, trace};
use serde::Deserialize;
use svg::node::{Value, element::path::Data};

use netsvg_core::geometry::{Bounds, Insets, Point, Size};

use crate::{
    error::NetSvgError,
    graph::{Graph, VertexRef},
    resolve::{AttributeSource, Cascade},
};

/// Vertex attributes holding an `[x, y]` pair, in lookup order.
pub const POSITION_ATTRIBUTE: Cascade = Cascade::new(&["Position", "position", "positions"]);
/// Vertex attributes holding the x coordinate, in lookup order.
pub const X_ATTRIBUTE: Cascade = Cascade::new(&["x", "X"]);
/// Vertex attributes holding the y coordinate, in lookup order.
pub const Y_ATTRIBUTE: Cascade = Cascade::new(&["y", "Y"]);

/// Positions supplied by the caller.
pub enum PositionInput<'g, G: ?Sized> {
    /// One point per vertex, in vertex order.
    List(Vec<Point>),
    /// A closure evaluated once per vertex.
    Computed(Box<dyn Fn(VertexRef<'g, G>) -> Option<Point> + 'g>),
}

impl<G: ?Sized> std::fmt::Debug for PositionInput<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List(points) => f.debug_tuple("List").field(points).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

fn checked(vertex: usize, point: Option<Point>, reason: &str) -> Result<Point, NetSvgError> {
    match point {
        Some(point) if point.is_finite() => Ok(point),
        Some(point) => Err(NetSvgError::InvalidPosition {
            vertex,
            reason: format!("coordinates ({}, {}) are not finite", point.x(), point.y()),
        }),
        None => Err(NetSvgError::InvalidPosition {
            vertex,
            reason: reason.to_string(),
        }),
    }
}

fn defined_on_every_vertex<G: Graph + ?Sized>(graph: &G, names: &[&str]) -> bool {
    graph.vertex_count() > 0
        && (0..graph.vertex_count()).all(|vertex| names.iter().all(|name| graph.vertex_attr(vertex, name).is_some()))
}

/// Reads a pair attribute, or `None` when some vertex lacks it.
fn from_pair_attribute<G: Graph + ?Sized>(graph: &G, name: &str) -> Option<Result<Vec<Point>, NetSvgError>> {
    if !defined_on_every_vertex(graph, &[name]) {
        return None;
    }
    let points = (0..graph.vertex_count())
        .map(|vertex| {
            let point = graph.vertex_attr(vertex, name).and_then(|value| value.as_point());
            checked(vertex, point, &format!("attribute `{name}` is not an [x, y] pair"))
        })
        .collect();
    Some(points)
}

/// Reads separate coordinate attributes, or `None` when some vertex lacks one.
fn from_coordinate_attributes<G: Graph + ?Sized>(
    graph: &G,
    x: &str,
    y: &str,
) -> Option<Result<Vec<Point>, NetSvgError>> {
    if !defined_on_every_vertex(graph, &[x, y]) {
        return None;
    }
    let points = (0..graph.vertex_count())
        .map(|vertex| {
            let coordinate = |name: &str| graph.vertex_attr(vertex, name).and_then(|value| value.as_f64());
            let point = coordinate(x)
                .zip(coordinate(y))
                .map(|(x, y)| Point::new(x as f32, y as f32));
            checked(vertex, point, &format!("attributes `{x}`/`{y}` are not numbers"))
        })
        .collect();
    Some(points)
}

/// Resolves one position per vertex.
///
/// # Errors
///
/// - [`NetSvgError::PositionCountMismatch`] if a supplied list does not have
///   one point per vertex.
/// - [`NetSvgError::InvalidPosition`] if a supplied point is not finite, a
///   supplied closure returns `None`, or the first attribute set on every
///   vertex holds a value that is not a finite coordinate.
/// - [`NetSvgError::MissingPositions`] if nothing was supplied and no
///   attribute spelling is set on every vertex.
pub fn resolve_positions<'g, G>(graph: &'g G, input: Option<&PositionInput<'g, G>>) -> Result<Vec<Point>, NetSvgError>
where
    G: Graph + ?Sized,
{
    let count = graph.vertex_count();
    match input {
        Some(PositionInput::List(points)) => {
            if points.len() != count {
                return Err(NetSvgError::PositionCountMismatch {
                    expected: count,
                    actual: points.len(),
                });
            }
            return points
                .iter()
                .enumerate()
                .map(|(vertex, point)| checked(vertex, Some(*point), ""))
                .collect();
        }
        Some(PositionInput::Computed(f)) => {
            return (0..count)
                .map(|vertex| {
                    checked(vertex, f(VertexRef::new(graph, vertex)), "position callback returned no point")
                })
                .collect();
        }
        None => {}
    }

    for &name in POSITION_ATTRIBUTE.candidates() {
        match from_pair_attribute(graph, name) {
            Some(points) => {
                debug!(attribute = name; "Positions taken from vertex attribute");
                return points;
            }
            None => debug!(attribute = name; "Skipping position attribute missing on some vertices"),
        }
    }

    for &x in X_ATTRIBUTE.candidates() {
        for &y in Y_ATTRIBUTE.candidates() {
            match from_coordinate_attributes(graph, x, y) {
                Some(points) => {
                    debug!(x = x, y = y; "Positions taken from coordinate attributes");
                    return points;
                }
                None => debug!(x = x, y = y; "Skipping coordinate attributes missing on some vertices"),
            }
        }
    }

    let expected = POSITION_ATTRIBUTE
        .candidates()
        .iter()
        .chain(X_ATTRIBUTE.candidates())
        .chain(Y_ATTRIBUTE.candidates())
        .map(|name| name.to_string())
        .collect();
    Err(NetSvgError::MissingPositions { expected })
}

/// Margins kept free around fitted positions.
///
/// Deserializes from a number, an `[x, y]` pair, or
/// `[left, right, top, bottom]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FitMargin {
    Uniform(f32),
    Axes([f32; 2]),
    Sides([f32; 4]),
}

impl FitMargin {
    /// Converts the margin into per-side insets
    pub fn insets(self) -> Insets {
        match self {
            Self::Uniform(value) => Insets::uniform(value),
            Self::Axes([x, y]) => Insets::symmetric(x, y),
            Self::Sides([left, right, top, bottom]) => Insets::new(top, right, bottom, left),
        }
    }
}

impl Default for FitMargin {
    fn default() -> Self {
        Self::Uniform(20.0)
    }
}

/// Uniform scale followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    scale: f32,
    translate_x: f32,
    translate_y: f32,
}

impl FitTransform {
    /// The transform that leaves points unchanged
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }

    /// Computes the transform fitting `positions` into `viewport` minus `margin`.
    ///
    /// The scale is the smaller of the width and height ratios. An axis on
    /// which all points coincide does not constrain the scale; if both axes
    /// are degenerate the scale is `1`. The scaled bounding box is centered
    /// in the available area, which is never smaller than one unit per axis.
    ///
    /// Returns `None` when there are no positions.
    ///
    /// # Examples
    ///
    /// ```
    /// use netsvg::layout::FitTransform;
    /// use netsvg_core::geometry::{Insets, Point, Size};
    ///
    /// let points = [Point::new(0.0, 0.0), Point::new(200.0, 50.0)];
    /// let fit = FitTransform::compute(&points, Size::new(100.0, 100.0), Insets::uniform(10.0)).unwrap();
    ///
    /// assert_eq!(fit.scale(), 0.4);
    /// assert_eq!(fit.apply(points[0]), Point::new(10.0, 40.0));
    /// assert_eq!(fit.apply(points[1]), Point::new(90.0, 60.0));
    /// ```
    pub fn compute(positions: &[Point], viewport: Size, margin: Insets) -> Option<Self> {
        let bounds = Bounds::from_points(positions.iter().copied())?;
        let available = viewport.shrink(margin, 1.0);
        let (width, height) = (bounds.width(), bounds.height());

        let scale = match (width > 0.0, height > 0.0) {
            (true, true) => (available.width() / width).min(available.height() / height),
            (true, false) => available.width() / width,
            (false, true) => available.height() / height,
            (false, false) => 1.0,
        };

        let translate_x = margin.left() + (available.width() - width * scale) / 2.0 - bounds.min_x() * scale;
        let translate_y = margin.top() + (available.height() - height * scale) / 2.0 - bounds.min_y() * scale;
        trace!(scale = scale, translate_x = translate_x, translate_y = translate_y; "Computed fit transform");

        Some(Self {
            scale,
            translate_x,
            translate_y,
        })
    }

    /// Returns the uniform scale factor
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Returns the horizontal translation
    pub fn translate_x(&self) -> f32 {
        self.translate_x
    }

    /// Returns the vertical translation
    pub fn translate_y(&self) -> f32 {
        self.translate_y
    }

    /// Maps an original point into fitted coordinates
    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            point.x() * self.scale + self.translate_x,
            point.y() * self.scale + self.translate_y,
        )
    }
}

/// Where the radius of a curved edge comes from.
///
/// Whatever the source, a result that is not a finite, non-negative number
/// falls back to the default `length / factor`.
pub enum CurveRadius<'f, E> {
    /// `length / factor`.
    Default,
    /// A numeric edge attribute; edges without it use the default.
    Attribute(String),
    /// A closure called with `(edge, length, default_radius)`.
    Resolver(Box<dyn Fn(&E, f32, f32) -> f32 + 'f>),
}

impl<E> std::fmt::Debug for CurveRadius<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl<E: AttributeSource> CurveRadius<'_, E> {
    /// Computes the radius of an arc of the given chord `length`.
    pub fn radius(&self, edge: &E, length: f32, factor: f32) -> f32 {
        let default = length / factor;
        let candidate = match self {
            Self::Default => return default,
            Self::Attribute(name) => edge
                .attribute(name)
                .and_then(|value| value.as_f64())
                .map(|radius| radius as f32),
            Self::Resolver(resolve) => Some(resolve(edge, length, default)),
        };
        candidate
            .filter(|radius| radius.is_finite() && *radius >= 0.0)
            .unwrap_or(default)
    }
}

/// Validates a curve factor: it must be finite and positive.
///
/// # Errors
///
/// Returns [`NetSvgError::InvalidOption`] otherwise.
pub fn validate_curve_factor(factor: f32) -> Result<f32, NetSvgError> {
    if factor.is_finite() && factor > 0.0 {
        Ok(factor)
    } else {
        Err(NetSvgError::invalid_option(
            "directed_curve_factor",
            format!("must be a finite number greater than zero, got {factor}"),
        ))
    }
}

/// Builds the path data of a clockwise circular arc from `start` to `end`.
///
/// # Examples
///
/// ```
/// use netsvg::layout::arc_path;
/// use netsvg_core::geometry::Point;
///
/// let d = arc_path(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 20.0);
/// assert!(d.starts_with('M'));
/// assert!(d.contains('A'));
/// ```
pub fn arc_path(start: Point, end: Point, radius: f32) -> String {
    let data = Data::new()
        .move_to(vec![start.x(), start.y()])
        .elliptical_arc_to(vec![radius, radius, 0.0, 0.0, 1.0, end.x(), end.y()]);
    Value::from(data).to_string()
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use svg::node::element::path::{Command, Position};

    use super::*;
    use crate::graph::{Attributes, AttrValue, NetworkGraph};

    fn arc_parameters(d: &str) -> Vec<f32> {
        let data = Data::parse(d).unwrap();
        data.iter()
            .find_map(|command| match command {
                Command::EllipticalArc(Position::Absolute, parameters) => Some(parameters.to_vec()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_explicit_positions_count_mismatch() {
        let graph = NetworkGraph::ring(3, false);
        let input = PositionInput::List(vec![Point::new(0.0, 0.0)]);
        assert!(matches!(
            resolve_positions(&graph, Some(&input)),
            Err(NetSvgError::PositionCountMismatch {
                expected: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_explicit_positions_rejects_nan() {
        let graph = NetworkGraph::ring(2, false);
        let input = PositionInput::List(vec![Point::new(0.0, 0.0), Point::new(f32::NAN, 1.0)]);
        assert!(matches!(
            resolve_positions(&graph, Some(&input)),
            Err(NetSvgError::InvalidPosition { vertex: 1, .. })
        ));
    }

    #[test]
    fn test_computed_positions() {
        let graph = NetworkGraph::ring(4, false);
        let input = PositionInput::Computed(Box::new(|v| Some(Point::new(v.index() as f32 * 10.0, 5.0))));
        let points = resolve_positions(&graph, Some(&input)).unwrap();
        assert_eq!(points[3], Point::new(30.0, 5.0));
    }

    #[test]
    fn test_pair_attribute_wins_over_coordinates() {
        let mut graph = NetworkGraph::ring(2, false);
        graph.set_vertex_column("position", [(1.0, 2.0), (3.0, 4.0)]);
        graph.set_vertex_column("x", [9.0, 9.0]);
        graph.set_vertex_column("y", [9.0, 9.0]);
        let points = resolve_positions(&graph, None).unwrap();
        assert_eq!(points, vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
    }

    #[test]
    fn test_incomplete_pair_attribute_falls_through() {
        let mut graph = NetworkGraph::ring(2, false);
        graph.set_vertex_column("Position", [(1.0, 2.0)]);
        graph.set_vertex_column("X", [5.0, 6.0]);
        graph.set_vertex_column("y", [7.0, 8.0]);
        let points = resolve_positions(&graph, None).unwrap();
        assert_eq!(points, vec![Point::new(5.0, 7.0), Point::new(6.0, 8.0)]);
    }

    #[test]
    fn test_later_pair_spelling_used_when_earlier_incomplete() {
        let mut graph = NetworkGraph::ring(2, false);
        graph.set_vertex_column("Position", [(1.0, 2.0)]);
        graph.set_vertex_column("positions", [(3.0, 4.0), (5.0, 6.0)]);
        let points = resolve_positions(&graph, None).unwrap();
        assert_eq!(points, vec![Point::new(3.0, 4.0), Point::new(5.0, 6.0)]);
    }

    #[test]
    fn test_later_coordinate_spelling_used_when_earlier_incomplete() {
        let mut graph = NetworkGraph::ring(2, false);
        graph.set_vertex_column("x", [1.0]);
        graph.set_vertex_column("X", [5.0, 6.0]);
        graph.set_vertex_column("y", [7.0, 8.0]);
        let points = resolve_positions(&graph, None).unwrap();
        assert_eq!(points, vec![Point::new(5.0, 7.0), Point::new(6.0, 8.0)]);
    }

    #[test]
    fn test_malformed_pair_names_vertex() {
        let mut graph = NetworkGraph::ring(2, false);
        graph.set_vertex_column("Position", [AttrValue::from((1.0, 2.0)), AttrValue::from("abc")]);
        graph.set_vertex_column("x", [0.0, 0.0]);
        graph.set_vertex_column("y", [0.0, 0.0]);
        let err = resolve_positions(&graph, None).unwrap_err();
        assert!(matches!(err, NetSvgError::InvalidPosition { vertex: 1, .. }), "{err}");
        assert!(err.to_string().contains("Position"));
    }

    #[test]
    fn test_non_numeric_coordinate_names_vertex() {
        let mut graph = NetworkGraph::ring(3, false);
        graph.set_vertex_column("x", [AttrValue::from(1.0), AttrValue::from(2.0), AttrValue::from("far")]);
        graph.set_vertex_column("y", [0.0, 0.0, 0.0]);
        assert!(matches!(
            resolve_positions(&graph, None),
            Err(NetSvgError::InvalidPosition { vertex: 2, .. })
        ));
    }

    #[test]
    fn test_missing_positions_names_attributes() {
        let graph = NetworkGraph::ring(8, false);
        let err = resolve_positions(&graph, None).unwrap_err();
        let NetSvgError::MissingPositions { expected } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(expected, &["Position", "position", "positions", "x", "X", "y", "Y"]);
        assert!(err.to_string().contains("Position"));
    }

    #[test]
    fn test_fit_margin_insets() {
        assert_eq!(FitMargin::Uniform(5.0).insets(), Insets::uniform(5.0));
        assert_eq!(FitMargin::Axes([4.0, 2.0]).insets(), Insets::new(2.0, 4.0, 2.0, 4.0));
        assert_eq!(
            FitMargin::Sides([1.0, 2.0, 3.0, 4.0]).insets(),
            Insets::new(3.0, 2.0, 4.0, 1.0)
        );
    }

    #[test]
    fn test_fit_scenario() {
        let points = [Point::new(0.0, 0.0), Point::new(200.0, 50.0)];
        let fit = FitTransform::compute(&points, Size::new(100.0, 100.0), Insets::uniform(10.0)).unwrap();
        assert!(approx_eq!(f32, fit.scale(), 0.4, epsilon = 1e-6));

        let a = fit.apply(points[0]);
        let b = fit.apply(points[1]);
        assert!(approx_eq!(f32, b.x() - a.x(), 80.0, epsilon = 1e-4));
        assert!(approx_eq!(f32, b.y() - a.y(), 20.0, epsilon = 1e-4));
        assert!(approx_eq!(f32, a.midpoint(b).x(), 50.0, epsilon = 1e-4));
        assert!(approx_eq!(f32, a.midpoint(b).y(), 50.0, epsilon = 1e-4));
    }

    #[test]
    fn test_fit_single_point_centers() {
        let fit = FitTransform::compute(&[Point::new(7.0, -3.0)], Size::new(100.0, 60.0), Insets::uniform(10.0)).unwrap();
        assert_eq!(fit.scale(), 1.0);
        assert_eq!(fit.apply(Point::new(7.0, -3.0)), Point::new(50.0, 30.0));
    }

    #[test]
    fn test_fit_collinear_uses_other_axis() {
        let points = [Point::new(0.0, 5.0), Point::new(50.0, 5.0)];
        let fit = FitTransform::compute(&points, Size::new(120.0, 40.0), Insets::uniform(10.0)).unwrap();
        assert!(approx_eq!(f32, fit.scale(), 2.0, epsilon = 1e-6));
        assert!(approx_eq!(f32, fit.apply(points[0]).y(), 20.0, epsilon = 1e-4));
    }

    #[test]
    fn test_fit_empty() {
        assert!(FitTransform::compute(&[], Size::new(10.0, 10.0), Insets::default()).is_none());
    }

    #[test]
    fn test_curve_radius_sources() {
        let mut edge = Attributes::new();
        edge.insert("bend".to_string(), AttrValue::from(50));

        assert_eq!(CurveRadius::Default.radius(&edge, 100.0, 5.0), 20.0);
        assert_eq!(CurveRadius::Attribute("bend".into()).radius(&edge, 100.0, 5.0), 50.0);
        assert_eq!(CurveRadius::Attribute("other".into()).radius(&edge, 100.0, 5.0), 20.0);

        let doubled: CurveRadius<'_, Attributes> = CurveRadius::Resolver(Box::new(|_, _, default| default * 2.0));
        assert_eq!(doubled.radius(&edge, 100.0, 5.0), 40.0);

        let broken: CurveRadius<'_, Attributes> = CurveRadius::Resolver(Box::new(|_, _, _| f32::NAN));
        assert_eq!(broken.radius(&edge, 100.0, 5.0), 20.0);
    }

    #[test]
    fn test_validate_curve_factor() {
        assert_eq!(validate_curve_factor(5.0).unwrap(), 5.0);
        assert!(validate_curve_factor(0.0).is_err());
        assert!(validate_curve_factor(-1.0).is_err());
        assert!(validate_curve_factor(f32::INFINITY).is_err());
    }

    #[test]
    fn test_arc_path_parameters() {
        let d = arc_path(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 20.0);
        assert_eq!(arc_parameters(&d), vec![20.0, 20.0, 0.0, 0.0, 1.0, 100.0, 0.0]);

        let reversed = arc_path(Point::new(100.0, 0.0), Point::new(0.0, 0.0), 20.0);
        assert_eq!(arc_parameters(&reversed), vec![20.0, 20.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn point() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    /// The fitted bounding box stays inside the margins and keeps the
    /// original aspect ratio.
    fn check_fit_contained(
        points: Vec<Point>,
        width: f32,
        height: f32,
        margin_ratio: f32,
    ) -> Result<(), TestCaseError> {
        let original = Bounds::from_points(points.iter().copied()).unwrap();
        prop_assume!(original.width() > 50.0 && original.height() > 50.0);

        let margin = Insets::symmetric(width * margin_ratio, height * margin_ratio);
        let fit = FitTransform::compute(&points, Size::new(width, height), margin).unwrap();
        let fitted = Bounds::from_points(points.iter().map(|p| fit.apply(*p))).unwrap();

        let frame = Bounds::new_from_top_left(
            Point::new(margin.left(), margin.top()),
            Size::new(width - margin.horizontal_sum(), height - margin.vertical_sum()),
        );
        prop_assert!(frame.contains_bounds(&fitted, 0.05), "{fitted:?} not inside {frame:?}");

        let original_ratio = original.width() / original.height();
        let fitted_ratio = fitted.width() / fitted.height();
        prop_assert!(
            approx_eq!(f32, original_ratio, fitted_ratio, epsilon = original_ratio * 1e-2),
            "aspect {original_ratio} became {fitted_ratio}"
        );
        Ok(())
    }

    proptest! {
        #[test]
        fn fit_contained(
            points in prop::collection::vec(point(), 2..20),
            width in 100.0f32..2000.0,
            height in 100.0f32..2000.0,
            margin_ratio in 0.0f32..0.45,
        ) {
            check_fit_contained(points, width, height, margin_ratio)?;
        }
    }
}
