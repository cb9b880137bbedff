//! Naiad - share links and visual export for diagram previews.
//!
//! Two independent pipelines around a diagram preview: the [`share`] codec
//! turns diagram source text into a URL-safe, size-bounded token and back,
//! and the [`export`] pipeline captures the currently rendered artifact as a
//! PNG, SVG, or PDF file. The diagram language itself is opaque to this
//! crate; rendering is delegated to an engine behind
//! [`render::RenderEngine`].
//!
//! # Examples
//!
//! ```
//! use url::Url;
//! use naiad::share;
//!
//! let base = Url::parse("https://diagrams.example/view").unwrap();
//! let token = share::encode(&base, "flowchart TD\nA-->B").unwrap();
//!
//! assert_eq!(share::decode(token.url()).as_deref(), Some("flowchart TD\nA-->B"));
//! ```
//!
//! ```
//! use naiad::artifact::{Element, Preview, RenderedArtifact};
//! use naiad::config::ExportOptions;
//! use naiad::export::{self, ExportFormat};
//!
//! let svg = Element::new("svg").with_attr("viewBox", "0 0 100 60");
//! let mut preview = Preview::with_artifact(RenderedArtifact::new(svg, 100.0, 60.0));
//!
//! let file = export::export(&mut preview, ExportFormat::Svg, &ExportOptions::default())
//!     .expect("capture succeeds");
//! assert_eq!(file.media_type(), "image/svg+xml");
//! ```

pub mod artifact;
pub mod color;
pub mod config;
pub mod export;
pub mod render;
pub mod share;

mod error;

pub use error::NaiadError;
