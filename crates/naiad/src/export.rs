//! Export pipeline for rendered diagrams.
//!
//! Produces a downloadable PNG, SVG, or PDF from the artifact a preview
//! surface currently displays. Every call runs the same short pipeline:
//!
//! ```text
//! PreviewSurface
//!     ↓ locate (fail fast with NoDiagram)
//!     ↓ normalize (reset zoom, one layout pass)
//!     ↓ capture (rasterize or copy-and-stamp SVG)
//!     ↓ package (PNG / SVG / PDF bytes + filename)
//! ExportFile
//! ```
//!
//! The zoom normalization is a scoped acquisition: the surface's display
//! transform is recorded once and unconditionally restored when the call
//! finishes, success or failure.
//!
//! # Error Handling
//!
//! Capture and packaging failures are wrapped as [`ExportError::Capture`]
//! with format context. [`ExportError`] converts into
//! [`NaiadError::Export`] at the crate boundary.
//!
//! [`NaiadError::Export`]: crate::NaiadError::Export

/// PDF packaging backend.
pub mod pdf;
/// Adaptive rasterization backend.
pub mod raster;
/// Standalone-SVG capture backend.
pub mod svg;

use std::str::FromStr;

use chrono::Utc;
use log::{debug, info};
use thiserror::Error;

use crate::artifact::{DisplayTransform, PreviewSurface};
use crate::config::ExportOptions;

/// Default base name for exported files.
pub const DEFAULT_BASENAME: &str = "mermaid-diagram";

/// The output formats the pipeline can package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Raster capture encoded as PNG.
    Png,
    /// Standalone SVG document.
    Svg,
    /// Raster capture embedded in a single-page PDF.
    Pdf,
}

impl ExportFormat {
    /// Returns the lowercase file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }

    /// Returns the MIME type of the packaged file.
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
            Self::Pdf => "application/pdf",
        }
    }

    /// Returns the uppercase label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Svg => "SVG",
            Self::Pdf => "PDF",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Errors that can occur during diagram export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No artifact is currently rendered.
    #[error("Could not find diagram to export. Please ensure a diagram is rendered.")]
    NoDiagram,

    /// The requested format is not one of png, svg, or pdf.
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// A capture or packaging step failed.
    #[error("{} export failed: {message}", format.label())]
    Capture {
        /// Format whose pipeline failed.
        format: ExportFormat,
        /// Description of the underlying failure.
        message: String,
    },
}

/// A packaged export, ready to be handed to the host for saving.
#[derive(Debug, Clone)]
pub struct ExportFile {
    filename: String,
    media_type: &'static str,
    bytes: Vec<u8>,
}

impl ExportFile {
    /// Returns the generated filename, including timestamp and extension.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the MIME type of the file contents.
    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    /// Returns the file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the file, returning its contents.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Returns whether an export could start right now.
///
/// Exactly the locate step of the pipeline, with no side effects; UIs use it
/// to gate their export controls.
pub fn is_export_available<S: PreviewSurface + ?Sized>(surface: &S) -> bool {
    surface.artifact().is_some()
}

/// Export the currently rendered artifact in the requested format.
///
/// The surface's display transform is reset to identity for the duration of
/// the capture and restored on every exit path.
///
/// # Errors
///
/// Returns [`ExportError::NoDiagram`] when nothing is rendered, or
/// [`ExportError::Capture`] wrapping any capture or packaging failure.
pub fn export<S: PreviewSurface + ?Sized>(
    surface: &mut S,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportFile, ExportError> {
    if surface.artifact().is_none() {
        return Err(ExportError::NoDiagram);
    }

    info!(format = format.extension(); "Starting export");
    let guard = ZoomGuard::reset(surface);
    let result = capture(guard.surface(), format, options);
    drop(guard);

    match result {
        Ok(file) => {
            info!(
                filename = file.filename(),
                bytes = file.bytes().len();
                "Export packaged"
            );
            Ok(file)
        }
        Err(message) => Err(ExportError::Capture { format, message }),
    }
}

fn capture<S: PreviewSurface + ?Sized>(
    surface: &S,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportFile, String> {
    let artifact = surface
        .artifact()
        .ok_or_else(|| "rendered artifact disappeared during export".to_string())?;
    let background = options.background()?;

    let bytes = match format {
        ExportFormat::Png => {
            let pixmap = raster::rasterize(artifact, options, &background)?;
            pixmap
                .encode_png()
                .map_err(|err| format!("failed to encode PNG: {err}"))?
        }
        ExportFormat::Svg => svg::standalone_document(artifact, &background)?.into_bytes(),
        ExportFormat::Pdf => {
            let pixmap = raster::rasterize(artifact, options, &background)?;
            pdf::package(&pixmap, options)?
        }
    };

    Ok(ExportFile {
        filename: filename(options, format),
        media_type: format.media_type(),
        bytes,
    })
}

/// Generate a filename with timestamp: `<base>_<YYYY-MM-DDTHH-MM-SS>.<ext>`.
fn filename(options: &ExportOptions, format: ExportFormat) -> String {
    let base = options.filename().unwrap_or(DEFAULT_BASENAME);
    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
    format!("{base}_{timestamp}.{}", format.extension())
}

/// Scoped zoom normalization around a capture.
///
/// Records the surface's transform, resets it to identity, and gives the
/// surface one layout pass. Dropping the guard restores the original
/// transform.
struct ZoomGuard<'a, S: PreviewSurface + ?Sized> {
    surface: &'a mut S,
    original: DisplayTransform,
}

impl<'a, S: PreviewSurface + ?Sized> ZoomGuard<'a, S> {
    fn reset(surface: &'a mut S) -> Self {
        let original = surface.transform();
        debug!(transform = original.to_string(); "Resetting zoom for capture");
        surface.set_transform(DisplayTransform::identity());
        surface.settle();
        Self { surface, original }
    }

    fn surface(&self) -> &S {
        self.surface
    }
}

impl<S: PreviewSurface + ?Sized> Drop for ZoomGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.set_transform(self.original);
    }
}
