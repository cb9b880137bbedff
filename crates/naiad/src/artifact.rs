//! The rendered-artifact model and the preview-surface contract.
//!
//! A rendered diagram is handed to the export pipeline as an explicit
//! [`RenderedArtifact`] rather than looked up through any ambient document.
//! The artifact owns a lightweight element tree ([`Node`]/[`Element`]) that
//! mirrors the node graph a preview surface displays, plus the on-screen
//! bounds the surface reports for it.
//!
//! The [`PreviewSurface`] trait is the collaborator contract consumed by the
//! export pipeline: a queryable "current artifact + current zoom transform"
//! pair. [`Preview`] is a plain owned implementation suitable for hosts that
//! keep a single artifact in memory (the CLI and the test suite use it).

use std::fmt;

use indexmap::IndexMap;

/// A node in the artifact's element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An element with a tag, attributes, and children.
    Element(Element),
    /// A text run.
    Text(String),
}

/// An element of the artifact's node graph.
///
/// Attributes keep their insertion order so that serialization is
/// deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: IndexMap<String, String>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an empty element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Returns the element's tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the value of an attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`Element::set_attr`].
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Returns the element's children.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the element's children mutably.
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Appends a child node.
    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Builder-style variant of [`Element::push_child`] for element children.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Inserts a child node at the front of the child list.
    pub fn insert_first_child(&mut self, child: Node) {
        self.children.insert(0, child);
    }

    /// Finds the first descendant element with the given tag, depth-first.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        for child in &self.children {
            if let Node::Element(element) = child {
                if element.tag == tag {
                    return Some(element);
                }
                if let Some(found) = element.find(tag) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Finds the first descendant element matching a predicate, depth-first.
    pub fn find_mut(
        &mut self,
        predicate: &dyn Fn(&Element) -> bool,
    ) -> Option<&mut Element> {
        for child in &mut self.children {
            if let Node::Element(element) = child {
                if predicate(element) {
                    return Some(element);
                }
                if let Some(found) = element.find_mut(predicate) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Serializes the element subtree to XML text.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_into(value, true, out);
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_xml(out),
                Node::Text(text) => escape_into(text, false, out),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

fn escape_into(value: &str, in_attribute: bool, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// A currently-displayed rendering of diagram source.
///
/// The element tree is owned by the preview surface; the export pipeline only
/// observes it. `width`/`height` are the on-screen bounds in CSS pixels,
/// before any display transform is applied, and drive the adaptive raster
/// scale policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifact {
    root: Element,
    width: f64,
    height: f64,
}

impl RenderedArtifact {
    /// Creates an artifact from an element tree and its on-screen bounds.
    pub fn new(root: Element, width: f64, height: f64) -> Self {
        Self {
            root,
            width,
            height,
        }
    }

    /// Parses SVG markup into an artifact.
    ///
    /// The on-screen bounds are taken from the root `width`/`height`
    /// attributes, falling back to the `viewBox` dimensions, falling back to
    /// 800×600.
    ///
    /// # Errors
    ///
    /// Returns a message when the markup is not well-formed XML.
    pub fn from_svg_str(markup: &str) -> Result<Self, String> {
        let document = roxmltree::Document::parse(markup)
            .map_err(|err| format!("invalid SVG markup: {err}"))?;
        let root = build_element(document.root_element());
        let (width, height) = intrinsic_size(&root);
        Ok(Self::new(root, width, height))
    }

    /// Returns the root of the artifact's element tree.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Returns the on-screen width in CSS pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns the on-screen height in CSS pixels.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns the on-screen pixel area used by the adaptive scale policy.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

fn build_element(node: roxmltree::Node<'_, '_>) -> Element {
    let mut element = Element::new(node.tag_name().name());
    for attr in node.attributes() {
        element.set_attr(attr.name(), attr.value());
    }
    for child in node.children() {
        if child.is_element() {
            element.push_child(Node::Element(build_element(child)));
        } else if let Some(text) = child.text() {
            if !text.trim().is_empty() {
                element.push_child(Node::Text(text.to_string()));
            }
        }
    }
    element
}

fn intrinsic_size(root: &Element) -> (f64, f64) {
    let parse_length = |value: &str| value.trim().trim_end_matches("px").parse::<f64>().ok();

    let width = root.attr("width").and_then(|value| parse_length(value));
    let height = root.attr("height").and_then(|value| parse_length(value));
    if let (Some(width), Some(height)) = (width, height) {
        return (width, height);
    }

    if let Some(view_box) = root.attr("viewBox") {
        let parts: Vec<f64> = view_box
            .split_whitespace()
            .filter_map(|part| part.parse().ok())
            .collect();
        if let [_, _, width, height] = parts[..] {
            return (width, height);
        }
    }

    (800.0, 600.0)
}

/// The zoom transform a preview surface applies to its artifact.
///
/// Purely a display concern: export resolution is independent of it, which is
/// why the pipeline resets it to [`DisplayTransform::identity`] for the
/// duration of a capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    /// Uniform scale factor.
    pub scale: f64,
    /// Pan origin in CSS pixels.
    pub origin: (f64, f64),
}

impl DisplayTransform {
    /// The identity transform (scale 1, no pan).
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            origin: (0.0, 0.0),
        }
    }

    /// Returns true for the identity transform.
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.origin == (0.0, 0.0)
    }
}

impl Default for DisplayTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for DisplayTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.origin;
        if (x, y) == (0.0, 0.0) {
            write!(f, "scale({})", self.scale)
        } else {
            write!(f, "translate({x}px, {y}px) scale({})", self.scale)
        }
    }
}

/// Collaborator contract for the surface that displays the current artifact.
///
/// The export pipeline observes the artifact through this trait and brackets
/// every capture with a reset/restore of the display transform. Taking the
/// surface by `&mut` in [`export`](crate::export::export) makes re-entrant
/// exports against the same surface a compile error, so hosts do not need a
/// busy flag.
pub trait PreviewSurface {
    /// Returns the currently rendered artifact, if any.
    fn artifact(&self) -> Option<&RenderedArtifact>;

    /// Returns the current display transform.
    fn transform(&self) -> DisplayTransform;

    /// Replaces the display transform.
    fn set_transform(&mut self, transform: DisplayTransform);

    /// Gives the surface one layout pass after a transform change.
    ///
    /// The default is a no-op; interactive surfaces yield to their layout
    /// system here.
    fn settle(&mut self) {}
}

/// An owned, in-memory preview surface holding at most one artifact.
#[derive(Debug, Default)]
pub struct Preview {
    artifact: Option<RenderedArtifact>,
    transform: DisplayTransform,
}

impl Preview {
    /// Creates an empty preview with nothing rendered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a preview displaying the given artifact at identity zoom.
    pub fn with_artifact(artifact: RenderedArtifact) -> Self {
        Self {
            artifact: Some(artifact),
            transform: DisplayTransform::identity(),
        }
    }

    /// Replaces the displayed artifact.
    pub fn set_artifact(&mut self, artifact: RenderedArtifact) {
        self.artifact = Some(artifact);
    }

    /// Removes the displayed artifact.
    pub fn clear(&mut self) {
        self.artifact = None;
    }
}

impl PreviewSurface for Preview {
    fn artifact(&self) -> Option<&RenderedArtifact> {
        self.artifact.as_ref()
    }

    fn transform(&self) -> DisplayTransform {
        self.transform
    }

    fn set_transform(&mut self, transform: DisplayTransform) {
        self.transform = transform;
    }
}
