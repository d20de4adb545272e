//! Normalization of custom shape callbacks.
//!
//! Node, edge and label generators return a [`GeneratorOutput`]. Before
//! anything is inserted, the output is validated and normalized: element
//! handles from another document become [`GeneratorSpec`]s, element handles
//! from the target document are moved in place. Invalid output is rejected
//! without touching the document.

use log::trace;

use netsvg_core::dom::{Document, Element, NodeId};

use crate::{
    error::NetSvgError,
    selection::{Selection, canonical_name},
};

/// A structured description of an element to create.
///
/// # Examples
///
/// ```
/// use netsvg::generator::GeneratorSpec;
///
/// let marker = GeneratorSpec::new("g")
///     .attr("class", "marker")
///     .child(GeneratorSpec::new("rect").attr("width", 6).attr("height", 6))
///     .child(GeneratorSpec::new("text").text("A"));
///
/// assert_eq!(marker.children().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratorSpec {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<GeneratorSpec>,
}

impl GeneratorSpec {
    /// Creates a spec for an element with the given tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Adds an attribute. Underscores in the name become hyphens.
    pub fn attr(mut self, name: &str, value: impl ToString) -> Self {
        self.attributes.push((canonical_name(name).into_owned(), value.to_string()));
        self
    }

    /// Sets the text content
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Adds a child element
    pub fn child(mut self, child: GeneratorSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the attributes in insertion order
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Returns the children
    pub fn children(&self) -> &[GeneratorSpec] {
        &self.children
    }

    /// Captures an element subtree of any document as a spec.
    pub fn from_element(element: &Element) -> Self {
        let document = element.document();
        Self::capture(document, element.id())
    }

    fn capture(document: &Document, node: NodeId) -> Self {
        Self {
            tag: document.tag(node),
            attributes: document.attrs(node),
            text: document.text(node),
            children: document
                .children(node)
                .into_iter()
                .map(|child| Self::capture(document, child))
                .collect(),
        }
    }

    fn validate(&self) -> Result<(), NetSvgError> {
        if !is_valid_name(&self.tag) {
            return Err(NetSvgError::invalid_generator_output(format!(
                "`{}` is not a valid element name",
                self.tag
            )));
        }
        if let Some((name, _)) = self.attributes.iter().find(|(name, _)| !is_valid_name(name)) {
            return Err(NetSvgError::invalid_generator_output(format!(
                "`{name}` is not a valid attribute name"
            )));
        }
        self.children.iter().try_for_each(GeneratorSpec::validate)
    }

    fn build(&self, document: &Document, parent: NodeId) -> NodeId {
        let node = document.append_element(parent, &self.tag);
        for (name, value) in &self.attributes {
            document.set_attr(node, name, value.as_str());
        }
        if let Some(text) = &self.text {
            document.set_text(node, text.as_str());
        }
        for child in &self.children {
            child.build(document, node);
        }
        node
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

/// The value a generator callback may return.
#[derive(Debug, Clone)]
pub enum GeneratorOutput {
    /// Elements selected or built through a [`Selection`].
    Selection(Vec<Element>),
    /// A single element given as a tag and its attributes.
    TagAttrs(String, Vec<(String, String)>),
    /// A structured spec, possibly with children.
    Spec(GeneratorSpec),
    /// An existing element.
    Element(Element),
}

impl GeneratorOutput {
    /// Creates a [`GeneratorOutput::TagAttrs`] value.
    pub fn tag_attrs<'a, I, V>(tag: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: ToString,
    {
        let attributes = attributes
            .into_iter()
            .map(|(name, value)| (canonical_name(name).into_owned(), value.to_string()))
            .collect();
        Self::TagAttrs(tag.to_string(), attributes)
    }
}

impl<D> From<Selection<D>> for GeneratorOutput {
    fn from(selection: Selection<D>) -> Self {
        Self::Selection(selection.elements())
    }
}

impl<D> From<&Selection<D>> for GeneratorOutput {
    fn from(selection: &Selection<D>) -> Self {
        Self::Selection(selection.elements())
    }
}

impl From<GeneratorSpec> for GeneratorOutput {
    fn from(spec: GeneratorSpec) -> Self {
        Self::Spec(spec)
    }
}

impl From<Element> for GeneratorOutput {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// Validated generator output, ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// Create new elements from a spec.
    Build(GeneratorSpec),
    /// Move an element that already lives in the target document.
    Move(NodeId),
}

fn normalize_element(element: &Element, document: &Document, parent: NodeId) -> Result<Normalized, NetSvgError> {
    if !element.document().ptr_eq(document) {
        let spec = GeneratorSpec::from_element(element);
        spec.validate()?;
        return Ok(Normalized::Build(spec));
    }
    if document.contains(element.id(), parent) {
        return Err(NetSvgError::invalid_generator_output(format!(
            "element <{}> contains its own insertion point",
            element.tag()
        )));
    }
    Ok(Normalized::Move(element.id()))
}

/// Validates generator output destined for `parent` in `document`.
///
/// # Errors
///
/// Returns [`NetSvgError::InvalidGeneratorOutput`] for an empty selection,
/// a malformed tag or attribute name, or an element that contains the
/// insertion point.
pub fn normalize(output: GeneratorOutput, document: &Document, parent: NodeId) -> Result<Vec<Normalized>, NetSvgError> {
    match output {
        GeneratorOutput::Selection(elements) => {
            if elements.is_empty() {
                return Err(NetSvgError::invalid_generator_output("the selection is empty"));
            }
            elements
                .iter()
                .map(|element| normalize_element(element, document, parent))
                .collect()
        }
        GeneratorOutput::TagAttrs(tag, attributes) => {
            let spec = GeneratorSpec {
                tag,
                attributes,
                ..GeneratorSpec::default()
            };
            spec.validate()?;
            Ok(vec![Normalized::Build(spec)])
        }
        GeneratorOutput::Spec(spec) => {
            spec.validate()?;
            Ok(vec![Normalized::Build(spec)])
        }
        GeneratorOutput::Element(element) => Ok(vec![normalize_element(&element, document, parent)?]),
    }
}

/// Inserts normalized output under `parent`, returning the top-level nodes.
pub fn insert(items: Vec<Normalized>, document: &Document, parent: NodeId) -> Vec<NodeId> {
    items
        .into_iter()
        .map(|item| match item {
            Normalized::Build(spec) => spec.build(document, parent),
            Normalized::Move(node) => {
                // Cycles were ruled out during normalization.
                let _ = document.append_child(parent, node);
                node
            }
        })
        .inspect(|node| trace!(node = node.index(); "Inserted generator output"))
        .collect()
}
