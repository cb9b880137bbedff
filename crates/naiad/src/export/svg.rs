//! Standalone-SVG capture.
//!
//! The live artifact's vector content is never mutated: it is deep-copied,
//! stamped with the namespace attributes a standalone document needs, given
//! a `viewBox` and exactly one background rectangle, and serialized with an
//! XML declaration.

use crate::artifact::{Element, Node, RenderedArtifact};
use crate::color::Color;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Fill values treated as an existing background rectangle.
const NEAR_WHITE_FILLS: [&str; 3] = ["#ffffff", "white", "#f9f9f9"];

/// Capture the artifact's vector graphic as a standalone SVG document.
pub fn standalone_document(
    artifact: &RenderedArtifact,
    background: &Color,
) -> Result<String, String> {
    let root = artifact.root();
    let source = if root.tag() == "svg" {
        root
    } else {
        root.find("svg")
            .ok_or_else(|| "could not find an SVG element in the rendered diagram".to_string())?
    };

    let mut document = source.clone();
    document.set_attr("xmlns", SVG_NS);
    document.set_attr("xmlns:xlink", XLINK_NS);
    ensure_view_box(&mut document);
    ensure_background(&mut document, background);

    Ok(format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}",
        document.to_xml()
    ))
}

/// Ensure a `viewBox` exists, deriving one from the width/height attributes.
fn ensure_view_box(document: &mut Element) {
    if document.attr("viewBox").is_some() {
        return;
    }
    let width = document.attr("width").unwrap_or("800").to_string();
    let height = document.attr("height").unwrap_or("600").to_string();
    document.set_attr("viewBox", format!("0 0 {width} {height}"));
}

/// Ensure exactly one background rectangle carries the requested color.
///
/// Preference order: a rect already marked `data-bg="true"`, then a
/// white/near-white rect, then a new full-size rect inserted as the first
/// child.
fn ensure_background(document: &mut Element, background: &Color) {
    let fill = background.to_string();

    if let Some(marked) = document.find_mut(&|element| {
        element.tag() == "rect" && element.attr("data-bg") == Some("true")
    }) {
        marked.set_attr("fill", fill);
        return;
    }

    if let Some(near_white) = document.find_mut(&|element| {
        element.tag() == "rect"
            && element
                .attr("fill")
                .is_some_and(|value| NEAR_WHITE_FILLS.contains(&value))
    }) {
        near_white.set_attr("fill", fill);
        return;
    }

    let rect = Element::new("rect")
        .with_attr("width", "100%")
        .with_attr("height", "100%")
        .with_attr("fill", fill)
        .with_attr("data-bg", "true");
    document.insert_first_child(Node::Element(rect));
}
