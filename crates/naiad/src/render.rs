//! Collaborator contract for the diagram rendering engine.
//!
//! The core treats diagram source as an opaque string; turning it into a
//! displayable artifact is the job of an external engine behind the
//! [`RenderEngine`] trait. Engines are configured for a fixed [`Theme`] at
//! construction; switching themes means configuring a new engine instance
//! rather than mutating ambient rendering state.

use serde::Deserialize;
use thiserror::Error;

use crate::artifact::RenderedArtifact;

/// Visual theme a render engine is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// The engine's standard light theme.
    #[default]
    Default,
    /// Dark backgrounds and light strokes.
    Dark,
    /// The green-tinted theme.
    Forest,
    /// Grayscale.
    Neutral,
}

/// Errors reported by a render engine.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The source is not valid diagram syntax.
    #[error("diagram syntax error: {0}")]
    Syntax(String),
    /// The engine failed for a reason unrelated to the source.
    #[error("render failed: {0}")]
    Backend(String),
}

/// A configured diagram rendering engine.
///
/// Implementations are owned by the caller and constructed per [`Theme`];
/// the core never holds one globally.
pub trait RenderEngine {
    /// Returns the theme this engine was configured with.
    fn theme(&self) -> Theme;

    /// Returns whether the source is syntactically valid, without rendering.
    fn validate(&self, source: &str) -> bool;

    /// Renders diagram source into a displayable artifact.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Syntax`] for invalid source, or
    /// [`RenderError::Backend`] when rendering itself fails.
    fn render(&self, source: &str) -> Result<RenderedArtifact, RenderError>;
}
