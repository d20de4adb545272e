//! A standalone SVG document with a selection-based API.

use std::{fs, path::Path};

use log::{debug, info};

use netsvg_core::dom::{Document, NodeId, SVG_NAMESPACE};

use crate::{error::NetSvgError, selection::Selection};

/// An SVG document rooted at an `<svg>` element.
///
/// # Examples
///
/// ```
/// use netsvg::SvgCanvas;
///
/// let canvas = SvgCanvas::new(200.0, 100.0).with_background("#ffffff");
/// canvas
///     .append("circle")
///     .attr("cx", 100)
///     .attr("cy", 50)
///     .attr("r", 20)
///     .attr("fill", "tomato");
///
/// let markup = canvas.to_svg_string(false);
/// assert!(markup.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100">"#));
/// assert!(markup.contains(r#"<circle cx="100" cy="50" r="20" fill="tomato"/>"#));
/// ```
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    document: Document,
}

impl SvgCanvas {
    /// Creates an empty canvas of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        let document = Document::new("svg");
        let root = document.root();
        document.set_attr(root, "xmlns", SVG_NAMESPACE);
        document.set_attr(root, "width", width.to_string());
        document.set_attr(root, "height", height.to_string());
        Self { document }
    }

    /// Sets the `viewBox` of the root element.
    pub fn with_view_box(self, view_box: &str) -> Self {
        self.document.set_attr(self.document.root(), "viewBox", view_box);
        self
    }

    /// Adds a rectangle covering the whole canvas, filled with `color`.
    pub fn with_background(self, color: &str) -> Self {
        let rect = self.document.append_element(self.document.root(), "rect");
        for (name, value) in [("x", "0"), ("y", "0"), ("width", "100%"), ("height", "100%"), ("fill", color)] {
            self.document.set_attr(rect, name, value);
        }
        self
    }

    /// Wraps existing markup.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::Dom`] if the markup is malformed.
    pub fn from_string(markup: &str) -> Result<Self, NetSvgError> {
        Ok(Self {
            document: Document::parse(markup)?,
        })
    }

    /// Reads and wraps an SVG file.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::Io`] if the file cannot be read, or
    /// [`NetSvgError::Dom`] if it is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, NetSvgError> {
        let path = path.as_ref();
        debug!(path = path.display().to_string(); "Reading SVG file");
        let markup = fs::read_to_string(path)?;
        Self::from_string(&markup)
    }

    /// Returns the underlying document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns a selection of the root element
    pub fn root(&self) -> Selection {
        Selection::new(self.document.clone(), [self.document.root()])
    }

    /// Appends an element to the root.
    pub fn append(&self, tag: &str) -> Selection {
        self.root().append(tag)
    }

    /// Appends an element with constant attributes to the root.
    pub fn append_with<'a, I, V>(&self, tag: &str, attrs: I) -> Selection
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: ToString,
    {
        self.root().append_with(tag, attrs)
    }

    /// Selects the first element below the root matching `selector`.
    pub fn select(&self, selector: &str) -> Selection {
        self.root().select(selector)
    }

    /// Selects every element below the root matching `selector`.
    pub fn select_all(&self, selector: &str) -> Selection {
        self.root().select_all(selector)
    }

    /// Adds CSS rules to the document's `<style>` element.
    ///
    /// The document holds at most one style element, kept first among the
    /// root's children; later calls append their rules to it.
    pub fn add_style(&self, css: &str) -> Selection {
        let style = match self.style_node() {
            Some(style) => {
                let existing = self.document.text(style).unwrap_or_default();
                let combined = if existing.is_empty() {
                    css.to_string()
                } else {
                    format!("{existing}\n{css}")
                };
                self.document.set_text(style, combined);
                style
            }
            None => {
                let style = self.document.create_element("style");
                self.document.set_attr(style, "type", "text/css");
                self.document.set_text(style, css);
                // A fresh element has no descendants, so this cannot cycle.
                let _ = self.document.insert_child(self.document.root(), 0, style);
                style
            }
        };
        Selection::new(self.document.clone(), [style])
    }

    /// Returns the `<defs>` element, creating it after the style element.
    pub fn defs(&self) -> NodeId {
        let root = self.document.root();
        let children = self.document.children(root);
        if let Some(defs) = children.iter().find(|node| self.document.tag(**node) == "defs") {
            return *defs;
        }
        let index = usize::from(self.style_node().is_some());
        let defs = self.document.create_element("defs");
        let _ = self.document.insert_child(root, index, defs);
        defs
    }

    fn style_node(&self) -> Option<NodeId> {
        let root = self.document.root();
        self.document
            .children(root)
            .into_iter()
            .find(|node| self.document.tag(*node) == "style")
    }

    /// Serializes the document.
    pub fn to_svg_string(&self, pretty: bool) -> String {
        self.document.serialize(pretty)
    }

    /// Writes the document to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`NetSvgError::Dom`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>, pretty: bool) -> Result<(), NetSvgError> {
        let path = path.as_ref();
        self.document.write_to(path, pretty)?;
        info!(path = path.display().to_string(); "SVG saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas_markup() {
        let canvas = SvgCanvas::new(800.0, 600.0).with_view_box("0 0 400 300");
        assert_eq!(
            canvas.to_svg_string(false),
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="800" height="600" viewBox="0 0 400 300"/>"#
        );
    }

    #[test]
    fn test_background_rect() {
        let canvas = SvgCanvas::new(10.0, 10.0).with_background("black");
        let rect = canvas.select("rect");
        assert_eq!(rect.get_attr("width").as_deref(), Some("100%"));
        assert_eq!(rect.get_attr("fill").as_deref(), Some("black"));
    }

    #[test]
    fn test_append_with_attributes() {
        let canvas = SvgCanvas::new(20.0, 20.0);
        canvas.append_with("circle", [("cx", 5), ("cy", 5), ("r", 3)]);
        assert_eq!(
            canvas.to_svg_string(false),
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="20"><circle cx="5" cy="5" r="3"/></svg>"#
        );
    }

    #[test]
    fn test_single_style_node_first() {
        let canvas = SvgCanvas::new(10.0, 10.0).with_background("white");
        canvas.add_style("text { fill: red; }");
        canvas.add_style("circle { stroke: none; }");

        let document = canvas.document();
        let children = document.children(document.root());
        assert_eq!(document.tag(children[0]), "style");
        assert_eq!(canvas.select_all("style").len(), 1);
        assert_eq!(
            document.text(children[0]).as_deref(),
            Some("text { fill: red; }\ncircle { stroke: none; }")
        );
    }

    #[test]
    fn test_defs_after_style() {
        let canvas = SvgCanvas::new(10.0, 10.0).with_background("white");
        canvas.add_style("g {}");
        let defs = canvas.defs();
        assert_eq!(canvas.defs(), defs);

        let document = canvas.document();
        let tags: Vec<String> = document
            .children(document.root())
            .into_iter()
            .map(|node| document.tag(node))
            .collect();
        assert_eq!(tags, vec!["style", "defs", "rect"]);
    }

    #[test]
    fn test_from_string_select() {
        let canvas = SvgCanvas::from_string(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g class="a b"><circle r="1"/></g><circle r="2"/></svg>"#,
        )
        .unwrap();
        assert_eq!(canvas.select_all("circle").len(), 2);
        assert_eq!(canvas.select("g.b").select("circle").get_attr("r").as_deref(), Some("1"));
        assert!(SvgCanvas::from_string("<svg>").is_err());
    }
}
