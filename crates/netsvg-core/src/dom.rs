//! Mutable SVG element tree.
//!
//! [`Document`] is a cheap, clonable handle to an arena of elements. Elements
//! are addressed by [`NodeId`]; ids stay valid for the lifetime of the
//! document, including after the element has been detached. A
//! [`Document::deep_copy`] preserves every id, so an id obtained from the
//! original can be used on the copy.
//!
//! # Example
//!
//! ```
//! use netsvg_core::dom::Document;
//!
//! let doc = Document::new("svg");
//! let group = doc.append_element(doc.root(), "g");
//! let circle = doc.append_element(group, "circle");
//! doc.set_attr(circle, "r", "4");
//!
//! assert_eq!(doc.serialize(false), r#"<svg><g><circle r="4"/></g></svg>"#);
//! ```

use std::{cell::RefCell, fmt::Write as _, fs, io, path::Path, rc::Rc};

use indexmap::IndexMap;
use log::debug;
use thiserror::Error;

/// The SVG XML namespace.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Errors produced by the element tree.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("failed to parse markup: {0}")]
    Parse(#[from] roxmltree::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot move <{tag}> under itself or one of its descendants")]
    Cycle { tag: String },
}

/// Handle to one element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena index of this element
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attributes: IndexMap<String, String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: IndexMap::new(),
            text: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Tree {
    elements: Vec<ElementData>,
    root: NodeId,
}

impl Tree {
    fn new(root_tag: &str) -> Self {
        Self {
            elements: vec![ElementData::new(root_tag)],
            root: NodeId(0),
        }
    }

    fn get(&self, id: NodeId) -> &ElementData {
        &self.elements[id.0]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut ElementData {
        &mut self.elements[id.0]
    }

    fn create(&mut self, tag: &str) -> NodeId {
        self.elements.push(ElementData::new(tag));
        NodeId(self.elements.len() - 1)
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).parent;
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.get_mut(node).parent.take() {
            self.get_mut(parent).children.retain(|child| *child != node);
        }
    }

    fn insert(&mut self, parent: NodeId, index: Option<usize>, child: NodeId) -> Result<(), DomError> {
        if self.contains(child, parent) {
            return Err(DomError::Cycle {
                tag: self.get(child).tag.clone(),
            });
        }
        self.detach(child);
        let children = &mut self.get_mut(parent).children;
        let index = index.unwrap_or(children.len()).min(children.len());
        children.insert(index, child);
        self.get_mut(child).parent = Some(parent);
        Ok(())
    }

    fn write_element(&self, id: NodeId, out: &mut String, pretty: bool, depth: usize) {
        let element = self.get(id);
        if pretty {
            out.push_str(&"  ".repeat(depth));
        }
        out.push('<');
        out.push_str(&element.tag);
        for (name, value) in &element.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape_attribute(value));
        }

        let text = element.text.as_deref().filter(|text| !text.is_empty());
        if element.children.is_empty() && text.is_none() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        if let Some(text) = text {
            out.push_str(&escape_text(text));
        }
        for child in &element.children {
            if pretty {
                out.push('\n');
            }
            self.write_element(*child, out, pretty, depth + 1);
        }
        if pretty && !element.children.is_empty() {
            out.push('\n');
            out.push_str(&"  ".repeat(depth));
        }
        let _ = write!(out, "</{}>", element.tag);
    }
}

/// Shared handle to an element tree.
///
/// Cloning a `Document` clones the handle, not the tree; use
/// [`Document::deep_copy`] for an independent tree.
#[derive(Debug, Clone)]
pub struct Document {
    tree: Rc<RefCell<Tree>>,
}

impl Document {
    /// Creates a document whose root element has the given tag.
    pub fn new(root_tag: &str) -> Self {
        Self {
            tree: Rc::new(RefCell::new(Tree::new(root_tag))),
        }
    }

    /// Returns the root element
    pub fn root(&self) -> NodeId {
        self.tree.borrow().root
    }

    /// Returns true if both handles refer to the same tree
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree)
    }

    /// Wraps an id of this document into an [`Element`] handle
    pub fn element(&self, id: NodeId) -> Element {
        Element {
            document: self.clone(),
            id,
        }
    }

    /// Creates a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.tree.borrow_mut().create(tag)
    }

    /// Creates an element and appends it as the last child of `parent`.
    pub fn append_element(&self, parent: NodeId, tag: &str) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        let child = tree.create(tag);
        tree.get_mut(child).parent = Some(parent);
        tree.get_mut(parent).children.push(child);
        child
    }

    /// Moves `child` to the end of `parent`'s children.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Cycle`] if `parent` is `child` or one of its
    /// descendants.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.tree.borrow_mut().insert(parent, None, child)
    }

    /// Moves `child` to position `index` among `parent`'s children.
    ///
    /// Indices past the end append.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Cycle`] if `parent` is `child` or one of its
    /// descendants.
    pub fn insert_child(&self, parent: NodeId, index: usize, child: NodeId) -> Result<(), DomError> {
        self.tree.borrow_mut().insert(parent, Some(index), child)
    }

    /// Removes an element from its parent. The element and its subtree stay
    /// addressable and can be re-attached.
    pub fn detach(&self, node: NodeId) {
        self.tree.borrow_mut().detach(node);
    }

    /// Returns the children of an element in document order
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree.borrow().get(node).children.clone()
    }

    /// Returns the position of `child` among the children of `parent`
    pub fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.tree
            .borrow()
            .get(parent)
            .children
            .iter()
            .position(|id| *id == child)
    }

    /// Returns the parent of an element, if attached
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().get(node).parent
    }

    /// Returns true if `node` is `ancestor` or lies inside its subtree
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.borrow().contains(ancestor, node)
    }

    /// Returns the tag name of an element
    pub fn tag(&self, node: NodeId) -> String {
        self.tree.borrow().get(node).tag.clone()
    }

    /// Returns the value of an attribute
    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree.borrow().get(node).attributes.get(name).cloned()
    }

    /// Sets an attribute, keeping its position if it already exists
    pub fn set_attr(&self, node: NodeId, name: &str, value: impl Into<String>) {
        self.tree
            .borrow_mut()
            .get_mut(node)
            .attributes
            .insert(name.to_string(), value.into());
    }

    /// Removes an attribute, returning its previous value
    pub fn remove_attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree
            .borrow_mut()
            .get_mut(node)
            .attributes
            .shift_remove(name)
    }

    /// Returns all attributes in insertion order
    pub fn attrs(&self, node: NodeId) -> Vec<(String, String)> {
        self.tree
            .borrow()
            .get(node)
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Returns the text content of an element
    pub fn text(&self, node: NodeId) -> Option<String> {
        self.tree.borrow().get(node).text.clone()
    }

    /// Replaces the text content of an element
    pub fn set_text(&self, node: NodeId, text: impl Into<String>) {
        self.tree.borrow_mut().get_mut(node).text = Some(text.into());
    }

    /// Returns every element below `node` in document (pre-)order
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = tree.get(node).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            found.push(id);
            stack.extend(tree.get(id).children.iter().rev().copied());
        }
        found
    }

    /// Creates an independent copy of the whole tree with identical ids.
    pub fn deep_copy(&self) -> Document {
        Document {
            tree: Rc::new(RefCell::new(self.tree.borrow().clone())),
        }
    }

    /// Serializes the tree rooted at the document root.
    ///
    /// Pretty output indents nested elements by two spaces and ends with a
    /// newline; compact output contains no whitespace between elements.
    pub fn serialize(&self, pretty: bool) -> String {
        let tree = self.tree.borrow();
        let mut out = String::new();
        tree.write_element(tree.root, &mut out, pretty, 0);
        if pretty {
            out.push('\n');
        }
        out
    }

    /// Serializes the tree and writes it to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Io`] if the file cannot be written.
    pub fn write_to(&self, path: impl AsRef<Path>, pretty: bool) -> Result<(), DomError> {
        let path = path.as_ref();
        let markup = self.serialize(pretty);
        debug!(path = path.display().to_string(), bytes = markup.len(); "Writing document");
        fs::write(path, markup)?;
        Ok(())
    }

    /// Parses markup into a new document.
    ///
    /// Namespace declarations of the root element become `xmlns` attributes,
    /// prefixed attributes keep their prefix, and whitespace-only text between
    /// child elements is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::Parse`] for malformed markup.
    pub fn parse(markup: &str) -> Result<Document, DomError> {
        let xml = roxmltree::Document::parse(markup)?;
        let source_root = xml.root_element();
        let mut tree = Tree::new(source_root.tag_name().name());

        let root = tree.root;
        for namespace in source_root.namespaces() {
            match namespace.name() {
                Some("xml") => {}
                Some(prefix) => {
                    tree.get_mut(root)
                        .attributes
                        .insert(format!("xmlns:{prefix}"), namespace.uri().to_string());
                }
                None => {
                    tree.get_mut(root)
                        .attributes
                        .insert("xmlns".to_string(), namespace.uri().to_string());
                }
            }
        }
        copy_xml_element(&mut tree, root, source_root);

        Ok(Document {
            tree: Rc::new(RefCell::new(tree)),
        })
    }
}

fn copy_xml_element(tree: &mut Tree, id: NodeId, source: roxmltree::Node<'_, '_>) {
    for attribute in source.attributes() {
        let name = match attribute.namespace() {
            Some(XML_NAMESPACE) => format!("xml:{}", attribute.name()),
            Some(uri) => match source.lookup_prefix(uri) {
                Some(prefix) => format!("{prefix}:{}", attribute.name()),
                None => attribute.name().to_string(),
            },
            None => attribute.name().to_string(),
        };
        tree.get_mut(id)
            .attributes
            .insert(name, attribute.value().to_string());
    }

    let mut text = String::new();
    let mut has_elements = false;
    for child in source.children() {
        if child.is_element() {
            has_elements = true;
            let child_id = tree.create(child.tag_name().name());
            tree.get_mut(child_id).parent = Some(id);
            tree.get_mut(id).children.push(child_id);
            copy_xml_element(tree, child_id, child);
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or_default());
        }
    }

    let text = if has_elements { text.trim().to_string() } else { text };
    if !text.is_empty() {
        tree.get_mut(id).text = Some(text);
    }
}

/// Escapes a string for use inside a double-quoted attribute value.
pub fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escapes a string for use as element text.
pub fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// An element handle that carries its document.
///
/// This is the form in which elements cross API boundaries, e.g. when a
/// generator hands back markup it built itself.
#[derive(Debug, Clone)]
pub struct Element {
    document: Document,
    id: NodeId,
}

impl Element {
    /// Returns the document owning this element
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns the id of this element within its document
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the tag name of this element
    pub fn tag(&self) -> String {
        self.document.tag(self.id)
    }
}
