//! Chainable, data-bound views over document elements.
//!
//! A [`Selection`] is an ordered list of elements of one [`Document`] plus
//! an optional datum per element. Mutating calls apply to every element and
//! return the selection again, so calls chain:
//!
//! ```
//! use netsvg::SvgCanvas;
//!
//! let canvas = SvgCanvas::new(120.0, 40.0);
//! let group = canvas.append("g");
//! group.append("circle");
//! group.append("circle");
//!
//! let circles = group.select_all("circle").data([12, 18]).unwrap();
//! circles
//!     .attr("cy", 20)
//!     .attr_fn("r", |r, _, _| r.map(ToString::to_string))
//!     .attr_fn("cx", |_, i, _| Some((30 + 60 * i).to_string()));
//!
//! assert_eq!(circles.get_attr("r").as_deref(), Some("12"));
//! assert!(group.select_all("circle").data([1]).is_err());
//! ```
//!
//! Values are either constants or closures evaluated once per element with
//! `(datum, index, node)`. A closure returning `None` removes the attribute
//! (or style declaration) instead of writing an empty value.

use std::{borrow::Cow, cmp::Ordering, collections::HashSet, fmt};

use indexmap::IndexMap;

use netsvg_core::dom::{Document, Element, NodeId};

use crate::error::NetSvgError;

/// Per-element value callback: `(datum, index, node) -> value`.
pub type ValueFn<'f, D> = Box<dyn Fn(Option<&D>, usize, NodeId) -> Option<String> + 'f>;

/// An attribute, style or text value: a constant, or computed per element.
pub enum Attr<'f, D> {
    Constant(String),
    Computed(ValueFn<'f, D>),
}

impl<'f, D> Attr<'f, D> {
    /// Creates a constant value
    pub fn constant(value: impl ToString) -> Self {
        Self::Constant(value.to_string())
    }

    /// Creates a value computed from each element's datum, index and node
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(Option<&D>, usize, NodeId) -> Option<String> + 'f,
    {
        Self::Computed(Box::new(f))
    }

    fn evaluate(&self, datum: Option<&D>, index: usize, node: NodeId) -> Option<String> {
        match self {
            Self::Constant(value) => Some(value.clone()),
            Self::Computed(f) => f(datum, index, node),
        }
    }
}

impl<D> fmt::Debug for Attr<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Converts a conventional multi-word attribute name to its wire form.
///
/// Underscores become hyphens (`stroke_width` → `stroke-width`). Names that
/// are already hyphenated, or camel-cased like `viewBox`, pass through.
pub fn canonical_name(name: &str) -> Cow<'_, str> {
    if name.contains('_') {
        Cow::Owned(name.replace('_', "-"))
    } else {
        Cow::Borrowed(name)
    }
}

/// A minimal element matcher: `tag`, `.class`, `tag.class` or `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Selector {
    tag: Option<String>,
    class: Option<String>,
}

impl Selector {
    fn parse(selector: &str) -> Self {
        let selector = selector.trim();
        let (tag, class) = match selector.split_once('.') {
            Some((tag, class)) => (tag, Some(class.to_string())),
            None => (selector, None),
        };
        let tag = match tag {
            "" | "*" => None,
            tag => Some(tag.to_string()),
        };
        Self { tag, class }
    }

    fn matches(&self, document: &Document, node: NodeId) -> bool {
        if self.tag.as_ref().is_some_and(|tag| document.tag(node) != *tag) {
            return false;
        }
        match &self.class {
            Some(class) => document
                .attr(node, "class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
            None => true,
        }
    }
}

fn parse_style(style: &str) -> IndexMap<String, String> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect()
}

fn format_style(declarations: &IndexMap<String, String>) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{name}:{value}"))
        .collect::<Vec<_>>()
        .join(";")
}

/// An ordered group of elements with optional bound data.
///
/// Bound data lives on the selection, one `Option<D>` per element.
/// [`Selection::data`] and [`Selection::datum`] produce a new selection over
/// the same elements with new data; [`Selection::select`] and
/// [`Selection::select_all`] carry each element's datum to its matches.
#[derive(Debug, Clone)]
pub struct Selection<D = ()> {
    document: Document,
    nodes: Vec<NodeId>,
    data: Vec<Option<D>>,
}

impl<D> Selection<D> {
    /// Creates an unbound selection over `nodes`.
    ///
    /// Repeated nodes are kept only at their first position.
    pub fn new(document: Document, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let mut seen = HashSet::new();
        let nodes: Vec<NodeId> = nodes.into_iter().filter(|node| seen.insert(*node)).collect();
        let data = nodes.iter().map(|_| None).collect();
        Self {
            document,
            nodes,
            data,
        }
    }

    pub(crate) fn from_parts(document: Document, nodes: Vec<NodeId>, data: Vec<Option<D>>) -> Self {
        debug_assert_eq!(nodes.len(), data.len());
        Self {
            document,
            nodes,
            data,
        }
    }

    /// Returns the document the elements belong to
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns the selected elements in order
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Returns the selected elements as document-carrying handles
    pub fn elements(&self) -> Vec<Element> {
        self.nodes.iter().map(|node| self.document.element(*node)).collect()
    }

    /// Returns the bound data, one entry per element
    pub fn data_items(&self) -> &[Option<D>] {
        &self.data
    }

    /// Returns the number of selected elements
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no element is selected
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the datum of the first element
    pub fn get_datum(&self) -> Option<&D> {
        self.data.first().and_then(Option::as_ref)
    }

    /// Returns the value of an attribute on the first element
    pub fn get_attr(&self, name: &str) -> Option<String> {
        let node = *self.nodes.first()?;
        self.document.attr(node, &canonical_name(name))
    }

    /// Returns the value of a style declaration on the first element
    pub fn get_style(&self, name: &str) -> Option<String> {
        let node = *self.nodes.first()?;
        let style = self.document.attr(node, "style")?;
        let name = canonical_name(name);
        parse_style(&style).shift_remove(&*name)
    }

    /// Returns the text content of the first element
    pub fn get_text(&self) -> Option<String> {
        let node = *self.nodes.first()?;
        self.document.text(node)
    }

    /// Sets an attribute to the same value on every element.
    pub fn attr(&self, name: &str, value: impl ToString) -> &Self {
        self.set_attr(name, Attr::constant(value))
    }

    /// Sets an attribute from a per-element callback.
    ///
    /// Elements for which the callback returns `None` lose the attribute.
    pub fn attr_fn<F>(&self, name: &str, f: F) -> &Self
    where
        F: Fn(Option<&D>, usize, NodeId) -> Option<String>,
    {
        self.set_attr(name, Attr::computed(f))
    }

    /// Sets an attribute from an [`Attr`] value.
    pub fn set_attr(&self, name: &str, value: Attr<'_, D>) -> &Self {
        let name = canonical_name(name);
        for (index, node) in self.nodes.iter().enumerate() {
            match value.evaluate(self.data[index].as_ref(), index, *node) {
                Some(value) => self.document.set_attr(*node, &name, value),
                None => {
                    self.document.remove_attr(*node, &name);
                }
            }
        }
        self
    }

    /// Sets several constant attributes at once.
    pub fn attrs<'a, I, V>(&self, pairs: I) -> &Self
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: ToString,
    {
        for (name, value) in pairs {
            self.attr(name, value);
        }
        self
    }

    /// Sets a style declaration to the same value on every element.
    ///
    /// Declarations already present in the `style` attribute are kept.
    pub fn style(&self, name: &str, value: impl ToString) -> &Self {
        self.set_style(name, Attr::constant(value))
    }

    /// Sets a style declaration from a per-element callback.
    ///
    /// Elements for which the callback returns `None` lose the declaration.
    pub fn style_fn<F>(&self, name: &str, f: F) -> &Self
    where
        F: Fn(Option<&D>, usize, NodeId) -> Option<String>,
    {
        self.set_style(name, Attr::computed(f))
    }

    /// Merges a style declaration from an [`Attr`] value.
    pub fn set_style(&self, name: &str, value: Attr<'_, D>) -> &Self {
        let name = canonical_name(name);
        for (index, node) in self.nodes.iter().enumerate() {
            let value = value.evaluate(self.data[index].as_ref(), index, *node);
            let mut declarations = self
                .document
                .attr(*node, "style")
                .map(|style| parse_style(&style))
                .unwrap_or_default();
            match value {
                Some(value) => {
                    declarations.insert(name.to_string(), value);
                }
                None => {
                    declarations.shift_remove(&*name);
                }
            }
            if declarations.is_empty() {
                self.document.remove_attr(*node, "style");
            } else {
                self.document.set_attr(*node, "style", format_style(&declarations));
            }
        }
        self
    }

    /// Sets the text content of every element.
    pub fn text(&self, value: impl ToString) -> &Self {
        self.set_text(Attr::constant(value))
    }

    /// Sets the text content from a per-element callback.
    ///
    /// Elements for which the callback returns `None` keep their text.
    pub fn text_fn<F>(&self, f: F) -> &Self
    where
        F: Fn(Option<&D>, usize, NodeId) -> Option<String>,
    {
        self.set_text(Attr::computed(f))
    }

    /// Sets the text content from an [`Attr`] value.
    pub fn set_text(&self, value: Attr<'_, D>) -> &Self {
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(text) = value.evaluate(self.data[index].as_ref(), index, *node) {
                self.document.set_text(*node, text);
            }
        }
        self
    }

    /// Binds one datum per element, in order.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::BindingMismatch`] if the number of items differs
    /// from the number of elements; nothing is bound in that case.
    pub fn data<E, I>(&self, items: I) -> Result<Selection<E>, NetSvgError>
    where
        I: IntoIterator<Item = E>,
    {
        let items: Vec<E> = items.into_iter().collect();
        if items.len() != self.nodes.len() {
            return Err(NetSvgError::BindingMismatch {
                expected: self.nodes.len(),
                actual: items.len(),
            });
        }
        Ok(Selection::from_parts(
            self.document.clone(),
            self.nodes.clone(),
            items.into_iter().map(Some).collect(),
        ))
    }

    /// Binds the same datum to every element.
    pub fn datum<E: Clone>(&self, value: E) -> Selection<E> {
        let data = self.nodes.iter().map(|_| Some(value.clone())).collect();
        Selection::from_parts(self.document.clone(), self.nodes.clone(), data)
    }

    /// Derives each element's new datum from its previous one.
    pub fn datum_fn<E, F>(&self, f: F) -> Selection<E>
    where
        F: Fn(Option<&D>) -> E,
    {
        let data = self.data.iter().map(|previous| Some(f(previous.as_ref()))).collect();
        Selection::from_parts(self.document.clone(), self.nodes.clone(), data)
    }

    /// Calls `f` for every element with its datum, index and node.
    pub fn each<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(Option<&D>, usize, NodeId),
    {
        for (index, node) in self.nodes.iter().enumerate() {
            f(self.data[index].as_ref(), index, *node);
        }
        self
    }

    /// Detaches every element from its parent.
    pub fn remove(&self) -> &Self {
        for node in &self.nodes {
            self.document.detach(*node);
        }
        self
    }

    /// Sorts the selection by bound data and reorders the document to match.
    ///
    /// The sort is stable. Each element is moved to the end of its parent in
    /// sorted order, so siblings that are not part of the selection end up
    /// before the sorted elements.
    pub fn sort_by<F>(&mut self, mut compare: F) -> &mut Self
    where
        F: FnMut(Option<&D>, Option<&D>) -> Ordering,
    {
        let mut order: Vec<usize> = (0..self.nodes.len()).collect();
        order.sort_by(|a, b| compare(self.data[*a].as_ref(), self.data[*b].as_ref()));

        let mut slots: Vec<Option<(NodeId, Option<D>)>> = self
            .nodes
            .drain(..)
            .zip(self.data.drain(..))
            .map(Some)
            .collect();
        for index in order {
            if let Some((node, datum)) = slots[index].take() {
                self.nodes.push(node);
                self.data.push(datum);
            }
        }

        for node in &self.nodes {
            if let Some(parent) = self.document.parent(*node) {
                // Moving a node to the end of its own parent cannot form a cycle.
                let _ = self.document.append_child(parent, *node);
            }
        }
        self
    }
}

impl<D: Clone> Selection<D> {
    /// Appends one new child to every element.
    ///
    /// Returns the new children in the order of their parents; each child
    /// inherits its parent's datum.
    pub fn append(&self, tag: &str) -> Selection<D> {
        let nodes = self
            .nodes
            .iter()
            .map(|parent| self.document.append_element(*parent, tag))
            .collect();
        Selection::from_parts(self.document.clone(), nodes, self.data.clone())
    }

    /// Appends one new child to every element and sets constant attributes
    /// on each child.
    ///
    /// Attribute names are canonicalized as in [`Selection::attr`].
    pub fn append_with<'a, I, V>(&self, tag: &str, attrs: I) -> Selection<D>
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: ToString,
    {
        let children = self.append(tag);
        children.attrs(attrs);
        children
    }

    /// Selects the first descendant matching `selector` under each element.
    ///
    /// Elements without a match contribute nothing. Matches inherit the datum
    /// of the element they were found under.
    pub fn select(&self, selector: &str) -> Selection<D> {
        self.collect_matches(selector, true)
    }

    /// Selects every descendant matching `selector` under each element.
    ///
    /// Matches inherit the datum of the element they were found under; an
    /// element reachable from several selected ancestors appears once.
    pub fn select_all(&self, selector: &str) -> Selection<D> {
        self.collect_matches(selector, false)
    }

    fn collect_matches(&self, selector: &str, first_only: bool) -> Selection<D> {
        let selector = Selector::parse(selector);
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        let mut data = Vec::new();
        for (node, datum) in self.nodes.iter().zip(&self.data) {
            let matches = self
                .document
                .descendants(*node)
                .into_iter()
                .filter(|candidate| selector.matches(&self.document, *candidate));
            for found in matches {
                if seen.insert(found) {
                    nodes.push(found);
                    data.push(datum.clone());
                }
                if first_only {
                    break;
                }
            }
        }
        Selection::from_parts(self.document.clone(), nodes, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> (Document, Selection) {
        let document = Document::new("svg");
        let root = Selection::new(document.clone(), [document.root()]);
        (document, root)
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Circle {
        r: u32,
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("stroke_width"), "stroke-width");
        assert_eq!(canonical_name("stroke-width"), "stroke-width");
        assert_eq!(canonical_name("viewBox"), "viewBox");
        assert_eq!(canonical_name(&canonical_name("font_size")), "font-size");
    }

    #[test]
    fn test_append_returns_children_in_parent_order() {
        let (document, root) = canvas();
        let groups = root.append("g").append("g");
        let first = groups.append("circle");
        assert_eq!(first.len(), 1);
        assert_eq!(document.parent(first.nodes()[0]), Some(groups.nodes()[0]));

        let two = Selection::<()>::new(document.clone(), document.children(document.root()));
        let root_group = two.nodes()[0];
        let both = Selection::<()>::new(document.clone(), [root_group, groups.nodes()[0]]);
        let rects = both.append("rect");
        assert_eq!(document.parent(rects.nodes()[0]), Some(root_group));
        assert_eq!(document.parent(rects.nodes()[1]), Some(groups.nodes()[0]));
    }

    #[test]
    fn test_append_with_sets_attributes_on_each_child() {
        let (document, root) = canvas();
        let groups = root.append("g");
        root.append("g");
        let parents = root.select_all("g");
        let rects = parents.append_with("rect", [("width", "10"), ("stroke_width", "2")]);

        assert_eq!(rects.len(), 2);
        assert_eq!(document.parent(rects.nodes()[0]), Some(groups.nodes()[0]));
        for node in rects.nodes() {
            assert_eq!(document.attr(*node, "width").as_deref(), Some("10"));
            assert_eq!(document.attr(*node, "stroke-width").as_deref(), Some("2"));
        }
    }

    #[test]
    fn test_data_bound_attr() {
        let (document, root) = canvas();
        let group = root.append("g");
        for _ in 0..3 {
            group.append("circle");
        }
        let circles = group
            .select_all("circle")
            .data(vec![Circle { r: 12 }, Circle { r: 18 }, Circle { r: 10 }])
            .unwrap();
        circles.attr_fn("r", |d, _, _| d.map(|d| d.r.to_string()));

        let radii: Vec<String> = circles
            .nodes()
            .iter()
            .filter_map(|node| document.attr(*node, "r"))
            .collect();
        assert_eq!(radii, vec!["12", "18", "10"]);
    }

    #[test]
    fn test_data_length_mismatch_binds_nothing() {
        let (_, root) = canvas();
        let circles = root.append("g").append("circle");
        let err = circles.data(vec![1, 2]).unwrap_err();
        assert!(matches!(
            err,
            NetSvgError::BindingMismatch {
                expected: 1,
                actual: 2
            }
        ));
        assert!(circles.get_datum().is_none());
    }

    #[test]
    fn test_computed_none_removes_attribute() {
        let (document, root) = canvas();
        let group = root.append("g");
        group.append("rect");
        group.append("rect");
        let rects = group.select_all("rect").data([true, false]).unwrap();
        rects.attr("fill", "red");
        rects.attr_fn("fill", |keep, _, _| {
            keep.copied().unwrap_or(false).then(|| "blue".to_string())
        });

        assert_eq!(document.attr(rects.nodes()[0], "fill").as_deref(), Some("blue"));
        assert_eq!(document.attr(rects.nodes()[1], "fill"), None);
    }

    #[test]
    fn test_callback_receives_index_and_node() {
        let (document, root) = canvas();
        let group = root.append("g");
        group.append("text");
        group.append("text");
        let texts = group.select_all("text");
        texts.attr_fn("data-id", |_, i, node| Some(format!("{i}:{}", node.index())));
        texts.text_fn(|_, i, _| Some(format!("label {i}")));

        let first = texts.nodes()[0];
        assert_eq!(document.attr(first, "data-id"), Some(format!("0:{}", first.index())));
        assert_eq!(document.text(texts.nodes()[1]).as_deref(), Some("label 1"));
    }

    #[test]
    fn test_text_none_keeps_text() {
        let (_, root) = canvas();
        let text = root.append("text");
        text.text("before");
        text.text_fn(|_, _, _| None);
        assert_eq!(text.get_text().as_deref(), Some("before"));
    }

    #[test]
    fn test_style_merges() {
        let (document, root) = canvas();
        let rect = root.append("rect");
        document.set_attr(rect.nodes()[0], "style", "fill: red; opacity:0.5");

        rect.style("stroke_width", 2).style("fill", "blue");
        assert_eq!(rect.get_attr("style").as_deref(), Some("fill:blue;opacity:0.5;stroke-width:2"));

        rect.style_fn("opacity", |_, _, _| None);
        assert_eq!(rect.get_style("opacity"), None);
        assert_eq!(rect.get_style("stroke-width").as_deref(), Some("2"));
    }

    #[test]
    fn test_datum_shared_and_derived() {
        let (_, root) = canvas();
        let group = root.append("g");
        group.append("circle");
        group.append("circle");
        let circles = group.select_all("circle").datum(5);
        assert_eq!(circles.data_items(), &[Some(5), Some(5)]);

        let doubled = circles.datum_fn(|previous| previous.copied().unwrap_or(0) * 2);
        assert_eq!(doubled.data_items(), &[Some(10), Some(10)]);
    }

    #[test]
    fn test_select_inherits_datum() {
        let (_, root) = canvas();
        let layer = root.append("g");
        layer.append("g").attr("class", "node").append("circle");
        layer.append("g").attr("class", "node").append("circle");

        let groups = layer.select_all("g.node").data(["a", "b"]).unwrap();
        let circles = groups.select_all("circle");
        assert_eq!(circles.data_items(), &[Some("a"), Some("b")]);

        let first = layer.select("*");
        assert_eq!(first.len(), 1);
        assert_eq!(layer.select_all(".node").len(), 2);
        assert!(layer.select_all("rect").is_empty());
    }

    #[test]
    fn test_select_all_deduplicates() {
        let (document, root) = canvas();
        let outer = root.append("g");
        let inner = outer.append("g");
        inner.append("circle");
        let both = Selection::<()>::new(document.clone(), [outer.nodes()[0], inner.nodes()[0]]);
        assert_eq!(both.select_all("circle").len(), 1);
    }

    #[test]
    fn test_sort_by_reorders_document() {
        let (document, root) = canvas();
        let layer = root.append("g");
        for _ in 0..3 {
            layer.append("circle");
        }
        let mut circles = layer.select_all("circle").data([3, 1, 2]).unwrap();
        let before = circles.nodes().to_vec();

        circles.sort_by(|a, b| a.cmp(&b));

        assert_eq!(circles.data_items(), &[Some(1), Some(2), Some(3)]);
        assert_eq!(circles.nodes(), &[before[1], before[2], before[0]]);
        assert_eq!(document.children(layer.nodes()[0]), circles.nodes());
    }
}
