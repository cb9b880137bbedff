//! Adaptive rasterization of rendered artifacts.
//!
//! A fixed multiplier either blurs small diagrams or produces enormous, slow
//! captures for large ones, so the capture resolution is chosen from the
//! artifact's on-screen pixel area: small diagrams are boosted, large ones
//! are stepped down, with an RGBA memory estimate picking within the two
//! memory-sensitive bands.

use log::debug;
use resvg::{tiny_skia, usvg};

use super::svg;
use crate::artifact::RenderedArtifact;
use crate::color::Color;
use crate::config::ExportOptions;

const BYTES_PER_PIXEL: f64 = 4.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Effective raster scale for an artifact of `area` on-screen pixels and a
/// requested `base` scale.
///
/// Non-increasing in `area` for the default base scale; the floors in the
/// lower bands keep very large diagrams above minimum acceptable quality.
pub fn effective_scale(area: f64, base: f64) -> f64 {
    // Rough RGBA memory estimate for a capture at the base scale, used only
    // to pick within a band.
    let estimated_memory_mb = area * base * base * BYTES_PER_PIXEL / MIB;

    if area < 50_000.0 {
        return (base * 2.0).min(10.0);
    }
    if area < 200_000.0 {
        return (base * 1.5).min(8.0);
    }
    if area < 800_000.0 {
        return base;
    }
    if area < 1_500_000.0 {
        return if estimated_memory_mb > 200.0 {
            (base * 0.8).max(4.0)
        } else {
            (base * 0.9).max(4.5)
        };
    }
    if area < 3_000_000.0 {
        return if estimated_memory_mb > 300.0 {
            (base * 0.6).max(3.0)
        } else {
            (base * 0.7).max(3.5)
        };
    }
    (base * 0.5).max(2.5)
}

/// Rasterize the artifact onto an offscreen bitmap.
///
/// The artifact's vector content is captured as a standalone SVG document
/// (background included), parsed, and rendered at the effective scale onto a
/// bitmap pre-filled with the requested background color.
pub fn rasterize(
    artifact: &RenderedArtifact,
    options: &ExportOptions,
    background: &Color,
) -> Result<tiny_skia::Pixmap, String> {
    let markup = svg::standalone_document(artifact, background)?;
    let tree = usvg::Tree::from_str(&markup, &usvg::Options::default())
        .map_err(|err| format!("failed to parse rendered SVG: {err}"))?;

    let scale = effective_scale(artifact.area(), options.scale());
    let size = tree.size();
    let width = (f64::from(size.width()) * scale).ceil().max(1.0) as u32;
    let height = (f64::from(size.height()) * scale).ceil().max(1.0) as u32;
    debug!(
        scale = scale,
        width = width,
        height = height;
        "Rasterizing artifact"
    );

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| format!("cannot allocate a {width}x{height} bitmap"))?;
    let (r, g, b, a) = background.to_rgba8();
    pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale as f32, scale as f32),
        &mut pixmap.as_mut(),
    );

    Ok(pixmap)
}
