//! Configuration types for sharing and export.
//!
//! This module provides configuration structures that control how share
//! links are built and how exports are captured. All types implement
//! [`serde::Deserialize`] for flexible loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration combining share and export settings.
//! - [`ShareConfig`] - Controls the base URL share links are built against.
//! - [`ExportOptions`] - Controls capture quality, resolution, and background.
//!
//! # Example
//!
//! ```
//! # use naiad::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert!(config.export().background().is_ok());
//! ```

use serde::Deserialize;

use crate::color::Color;

/// Top-level application configuration combining share and export settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Share link configuration section.
    #[serde(default)]
    share: ShareConfig,

    /// Export configuration section.
    #[serde(default)]
    export: ExportOptions,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified share and export configurations.
    pub fn new(share: ShareConfig, export: ExportOptions) -> Self {
        Self { share, export }
    }

    /// Returns the share configuration.
    pub fn share(&self) -> &ShareConfig {
        &self.share
    }

    /// Returns the export configuration.
    pub fn export(&self) -> &ExportOptions {
        &self.export
    }
}

/// Share link configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShareConfig {
    /// Base URL share links are built against.
    #[serde(default)]
    base_url: Option<String>,
}

impl ShareConfig {
    /// Returns the configured base URL, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
}

/// Options recognized by the export pipeline.
///
/// Unset fields fall back to the capture defaults: full quality, base scale
/// 5, white background, timestamp-derived filename.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Base name for the exported file; the timestamp and extension are
    /// appended by the pipeline.
    filename: Option<String>,

    /// Raster compression quality in `(0, 1]`.
    quality: f64,

    /// Base rasterization multiplier fed into the adaptive scale policy.
    scale: f64,

    /// Export background as a CSS color string.
    background_color: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: None,
            quality: 1.0,
            scale: 5.0,
            background_color: "#ffffff".to_string(),
        }
    }
}

impl ExportOptions {
    /// Creates options with the capture defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base name for the exported file.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the raster compression quality.
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    /// Sets the base rasterization multiplier.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the export background color.
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = color.into();
        self
    }

    /// Returns the configured base filename, if any.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Returns the raster compression quality, clamped into `(0, 1]`.
    pub fn quality(&self) -> f64 {
        self.quality.clamp(f64::EPSILON, 1.0)
    }

    /// Returns the base rasterization multiplier.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the configured background color string.
    pub fn background_color(&self) -> &str {
        &self.background_color
    }

    /// Returns the parsed background [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background(&self) -> Result<Color, String> {
        Color::new(&self.background_color)
            .map_err(|err| format!("Invalid background color: {err}"))
    }
}
