//! Single-page PDF packaging of a raster capture.
//!
//! The page preserves the bitmap's aspect ratio while fitting within A4
//! landscape bounds, with a 50 mm floor on both dimensions. The bitmap is
//! embedded as a full-page FlateDecode RGB image.

use std::io::Write;

use flate2::{Compression, write::ZlibEncoder};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};
use resvg::tiny_skia::Pixmap;

use crate::config::ExportOptions;

/// A4 landscape bounds in millimeters.
const MAX_PAGE_MM: (f64, f64) = (297.0, 210.0);

/// Minimum page dimension in millimeters.
const MIN_PAGE_MM: f64 = 50.0;

const MM_TO_PT: f64 = 72.0 / 25.4;

/// Page size in millimeters for a bitmap of the given pixel dimensions.
pub fn page_size_mm(width_px: u32, height_px: u32) -> (f64, f64) {
    let aspect = f64::from(width_px.max(1)) / f64::from(height_px.max(1));
    let (max_width, max_height) = MAX_PAGE_MM;

    let (width, height) = if aspect > max_width / max_height {
        // Wider than the page: fit to width.
        (max_width, max_width / aspect)
    } else {
        (max_height * aspect, max_height)
    };

    (width.max(MIN_PAGE_MM), height.max(MIN_PAGE_MM))
}

/// Package a raster capture as a single-page PDF.
pub fn package(pixmap: &Pixmap, options: &ExportOptions) -> Result<Vec<u8>, String> {
    let (page_width_mm, page_height_mm) = page_size_mm(pixmap.width(), pixmap.height());
    let page_width = (page_width_mm * MM_TO_PT) as f32;
    let page_height = (page_height_mm * MM_TO_PT) as f32;

    // The pixmap stores premultiplied RGBA; the page carries opaque RGB.
    let mut rgb = Vec::with_capacity(pixmap.pixels().len() * 3);
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgb.extend_from_slice(&[color.red(), color.green(), color.blue()]);
    }

    let level = (options.quality() * 9.0).round().clamp(1.0, 9.0) as u32;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level));
    encoder
        .write_all(&rgb)
        .and_then(|_| encoder.finish())
        .map_err(|err| format!("failed to compress page image: {err}"))
        .and_then(|samples| build(pixmap, samples, page_width, page_height))
}

fn build(
    pixmap: &Pixmap,
    samples: Vec<u8>,
    page_width: f32,
    page_height: f32,
) -> Result<Vec<u8>, String> {
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let image_id = Ref::new(4);
    let content_id = Ref::new(5);
    let image_name = Name(b"Im1");

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, page_width, page_height));
    page.parent(page_tree_id);
    page.contents(content_id);
    page.resources().x_objects().pair(image_name, image_id);
    page.finish();

    let mut image = pdf.image_xobject(image_id, &samples);
    image.filter(Filter::FlateDecode);
    image.width(pixmap.width() as i32);
    image.height(pixmap.height() as i32);
    image.color_space().device_rgb();
    image.bits_per_component(8);
    image.finish();

    let mut content = Content::new();
    content.save_state();
    content.transform([page_width, 0.0, 0.0, page_height, 0.0, 0.0]);
    content.x_object(image_name);
    content.restore_state();
    pdf.stream(content_id, &content.finish());

    Ok(pdf.finish())
}
