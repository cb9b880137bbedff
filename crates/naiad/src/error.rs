//! Error types for Naiad operations.
//!
//! This module provides the main error type [`NaiadError`] which wraps the
//! error conditions that can occur while sharing or exporting diagrams.

use std::io;

use thiserror::Error;

use crate::export::ExportError;
use crate::render::RenderError;
use crate::share::ShareError;

/// The main error type for Naiad operations.
///
/// Share and export errors keep their own user-facing messages; this type
/// only adds the crate boundary, so those messages surface verbatim.
#[derive(Debug, Error)]
pub enum NaiadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Share(#[from] ShareError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
