//! Integration tests for the export pipeline.
//!
//! These drive the full locate → normalize → capture → package flow against
//! an in-memory preview surface and verify the zoom bracket, the error
//! taxonomy, and the packaged bytes of each format.

use naiad::artifact::{
    DisplayTransform, Element, Preview, PreviewSurface, RenderedArtifact,
};
use naiad::config::ExportOptions;
use naiad::export::{self, ExportError, ExportFormat};
use naiad::render::{RenderEngine, RenderError, Theme};

fn diagram_artifact() -> RenderedArtifact {
    let svg = Element::new("svg")
        .with_attr("viewBox", "0 0 120 80")
        .with_child(
            Element::new("rect")
                .with_attr("x", "10")
                .with_attr("y", "10")
                .with_attr("width", "100")
                .with_attr("height", "60")
                .with_attr("fill", "#336699"),
        );
    RenderedArtifact::new(svg, 120.0, 80.0)
}

fn zoomed_transform() -> DisplayTransform {
    DisplayTransform {
        scale: 2.5,
        origin: (40.0, 20.0),
    }
}

/// Surface wrapper recording every transform the pipeline applies.
struct RecordingSurface {
    inner: Preview,
    applied: Vec<DisplayTransform>,
}

impl RecordingSurface {
    fn new(artifact: RenderedArtifact) -> Self {
        let mut inner = Preview::with_artifact(artifact);
        inner.set_transform(zoomed_transform());
        Self {
            inner,
            applied: Vec::new(),
        }
    }
}

impl PreviewSurface for RecordingSurface {
    fn artifact(&self) -> Option<&RenderedArtifact> {
        self.inner.artifact()
    }

    fn transform(&self) -> DisplayTransform {
        self.inner.transform()
    }

    fn set_transform(&mut self, transform: DisplayTransform) {
        self.applied.push(transform);
        self.inner.set_transform(transform);
    }
}

#[test]
fn png_export_packages_a_png_and_restores_zoom() {
    let mut surface = RecordingSurface::new(diagram_artifact());

    let file = export::export(&mut surface, ExportFormat::Png, &ExportOptions::default())
        .expect("PNG capture succeeds");

    assert_eq!(file.media_type(), "image/png");
    assert!(file.bytes().starts_with(&[0x89, b'P', b'N', b'G']));
    assert!(file.filename().ends_with(".png"));

    // Reset to identity for the capture, then restored.
    assert_eq!(
        surface.applied,
        vec![DisplayTransform::identity(), zoomed_transform()]
    );
    assert_eq!(surface.transform(), zoomed_transform());
}

#[test]
fn pdf_export_packages_a_pdf_document() {
    let mut surface = Preview::with_artifact(diagram_artifact());

    let file = export::export(&mut surface, ExportFormat::Pdf, &ExportOptions::default())
        .expect("PDF capture succeeds");

    assert_eq!(file.media_type(), "application/pdf");
    assert!(file.bytes().starts_with(b"%PDF-"));
    assert!(file.filename().ends_with(".pdf"));
}

#[test]
fn svg_export_derives_a_view_box_from_width_and_height() {
    let svg = Element::new("svg")
        .with_attr("width", "300")
        .with_attr("height", "150")
        .with_child(Element::new("g"));
    let mut surface = Preview::with_artifact(RenderedArtifact::new(svg, 300.0, 150.0));

    let file = export::export(&mut surface, ExportFormat::Svg, &ExportOptions::default())
        .expect("SVG capture succeeds");

    let document = String::from_utf8(file.into_bytes()).unwrap();
    assert!(document.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(document.contains("viewBox=\"0 0 300 150\""));
    assert!(document.contains("xmlns=\"http://www.w3.org/2000/svg\""));
}

#[test]
fn capture_failure_is_wrapped_and_still_restores_zoom() {
    // An artifact with no vector graphic inside makes every capture fail.
    let not_a_diagram = RenderedArtifact::new(Element::new("div"), 100.0, 100.0);
    let mut surface = RecordingSurface::new(not_a_diagram);

    let err = export::export(&mut surface, ExportFormat::Png, &ExportOptions::default())
        .expect_err("capture must fail");

    assert!(matches!(err, ExportError::Capture { .. }));
    assert!(err.to_string().starts_with("PNG export failed:"));

    assert_eq!(
        surface.applied,
        vec![DisplayTransform::identity(), zoomed_transform()]
    );
    assert_eq!(surface.transform(), zoomed_transform());
}

#[test]
fn export_without_a_rendered_artifact_fails_before_touching_the_surface() {
    let mut surface = Preview::new();

    let err = export::export(&mut surface, ExportFormat::Png, &ExportOptions::default())
        .expect_err("nothing is rendered");

    assert!(matches!(err, ExportError::NoDiagram));
    assert_eq!(
        err.to_string(),
        "Could not find diagram to export. Please ensure a diagram is rendered."
    );
}

#[test]
fn availability_mirrors_the_locate_step_without_side_effects() {
    let empty = Preview::new();
    assert!(!export::is_export_available(&empty));

    let surface = Preview::with_artifact(diagram_artifact());
    let before = surface.transform();
    assert!(export::is_export_available(&surface));
    assert_eq!(surface.transform(), before);
}

#[test]
fn unsupported_format_is_rejected_with_no_surface_mutation() {
    let surface = RecordingSurface::new(diagram_artifact());

    let err = "bmp".parse::<ExportFormat>().expect_err("bmp is unsupported");
    assert!(matches!(err, ExportError::UnsupportedFormat(_)));
    assert_eq!(err.to_string(), "Unsupported export format: bmp");

    // Nothing reached the surface.
    assert!(surface.applied.is_empty());
    assert_eq!(surface.transform(), zoomed_transform());
}

#[test]
fn custom_background_and_filename_flow_through_the_options() {
    let mut surface = Preview::with_artifact(diagram_artifact());
    let options = ExportOptions::new()
        .with_filename("pipeline")
        .with_background_color("black");

    let file = export::export(&mut surface, ExportFormat::Svg, &options)
        .expect("SVG capture succeeds");

    assert!(file.filename().starts_with("pipeline_"));
    let document = String::from_utf8(file.into_bytes()).unwrap();
    assert!(document.contains("data-bg=\"true\""));
}

#[test]
fn invalid_background_color_surfaces_as_a_capture_failure() {
    let mut surface = Preview::with_artifact(diagram_artifact());
    let options = ExportOptions::new().with_background_color("not-a-color");

    let err = export::export(&mut surface, ExportFormat::Png, &options)
        .expect_err("background must parse");
    assert!(err.to_string().contains("Invalid background color"));
}

/// Minimal engine stub standing in for the external rendering collaborator.
struct StubEngine {
    theme: Theme,
}

impl RenderEngine for StubEngine {
    fn theme(&self) -> Theme {
        self.theme
    }

    fn validate(&self, source: &str) -> bool {
        source.starts_with("flowchart")
    }

    fn render(&self, source: &str) -> Result<RenderedArtifact, RenderError> {
        if !self.validate(source) {
            return Err(RenderError::Syntax(format!(
                "unknown diagram type in {:?}",
                source.lines().next().unwrap_or_default()
            )));
        }
        Ok(diagram_artifact())
    }
}

#[test]
fn render_then_export_end_to_end() {
    let engine = StubEngine {
        theme: Theme::Dark,
    };
    assert_eq!(engine.theme(), Theme::Dark);
    assert!(!engine.validate("sequenceDiagram"));

    let artifact = engine
        .render("flowchart TD\nA-->B")
        .expect("valid source renders");
    let mut surface = Preview::with_artifact(artifact);

    let file = export::export(&mut surface, ExportFormat::Png, &ExportOptions::default())
        .expect("rendered artifact exports");
    assert!(file.bytes().starts_with(&[0x89, b'P', b'N', b'G']));
}
