//! Configuration for PDF report generation.
//!
//! All layout knobs live in one [`ExportConfig`] struct built via its
//! [`ExportConfigBuilder`]. Markdown export needs none of this (its layout
//! is fully determined by the grouped structure), so only the PDF renderer
//! consumes the config.
//!
//! # Design choice: builder over constructor
//! Callers almost always want the defaults (A4, 50 pt margins, 11 pt body
//! text); the builder lets them override the one field they care about and
//! keeps `build()` as the single validation point.

use crate::error::ExportError;
use chrono::{DateTime, Utc};

/// Configuration for a PDF export.
///
/// Built via [`ExportConfig::builder()`] or [`ExportConfig::default()`].
///
/// # Example
/// ```rust
/// use annot_export::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .margin_pt(36.0)
///     .body_font_size(10.0)
///     .build()
///     .unwrap();
/// assert!(config.content_width() > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Physical page width in typographic points. Default: 595.0 (A4).
    pub page_width_pt: f32,

    /// Physical page height in typographic points. Default: 842.0 (A4).
    pub page_height_pt: f32,

    /// Uniform page margin in points. Default: 50.0.
    pub margin_pt: f32,

    /// Body text size in points. Default: 11.0.
    pub body_font_size: f32,

    /// Page-group heading size in points. Default: 14.0.
    pub heading_font_size: f32,

    /// Document title size in points. Default: 16.0.
    pub title_font_size: f32,

    /// Line height as a multiple of the font size. Default: 1.4.
    pub line_height_factor: f32,

    /// Conversion factor from CSS pixels to points. Default: 0.75.
    ///
    /// CSS defines 96 px per inch; PDF uses 72 pt per inch. A screenshot
    /// captured at a logical 600 CSS px therefore occupies 450 pt before
    /// clamping to the content width.
    pub px_to_pt: f32,

    /// Width in points used for a screenshot whose logical size could not be
    /// determined at all (no capture-time dimensions, decode failed).
    /// Height falls back to a 4:3 aspect. Default: 300.0.
    pub fallback_image_width_pt: f32,

    /// Number of screenshot decodes run concurrently in the measurement
    /// pre-pass. Default: 4.
    ///
    /// Decoding is CPU-bound and runs on the blocking thread pool; a small
    /// fan-out keeps large exports moving without saturating the pool.
    pub decode_concurrency: usize,

    /// Fixed timestamp for the document header. When `None` (the default)
    /// the wall clock is used; pinning it makes repeated exports of the same
    /// snapshot byte-identical.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_width_pt: 595.0,
            page_height_pt: 842.0,
            margin_pt: 50.0,
            body_font_size: 11.0,
            heading_font_size: 14.0,
            title_font_size: 16.0,
            line_height_factor: 1.4,
            px_to_pt: 0.75,
            fallback_image_width_pt: 300.0,
            decode_concurrency: 4,
            timestamp: None,
        }
    }
}

impl ExportConfig {
    /// Start building a config from the defaults.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }

    /// Usable horizontal span between the margins, in points.
    pub fn content_width(&self) -> f32 {
        self.page_width_pt - 2.0 * self.margin_pt
    }

    /// Usable vertical span between the margins, in points.
    pub fn content_height(&self) -> f32 {
        self.page_height_pt - 2.0 * self.margin_pt
    }

    /// Baseline-to-baseline distance for body text, in points.
    pub fn body_line_height(&self) -> f32 {
        self.body_font_size * self.line_height_factor
    }
}

/// Builder for [`ExportConfig`]. See the struct docs for field meanings.
#[derive(Debug, Clone)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn page_size_pt(mut self, width: f32, height: f32) -> Self {
        self.config.page_width_pt = width;
        self.config.page_height_pt = height;
        self
    }

    pub fn margin_pt(mut self, margin: f32) -> Self {
        self.config.margin_pt = margin;
        self
    }

    pub fn body_font_size(mut self, size: f32) -> Self {
        self.config.body_font_size = size;
        self
    }

    pub fn heading_font_size(mut self, size: f32) -> Self {
        self.config.heading_font_size = size;
        self
    }

    pub fn title_font_size(mut self, size: f32) -> Self {
        self.config.title_font_size = size;
        self
    }

    pub fn line_height_factor(mut self, factor: f32) -> Self {
        self.config.line_height_factor = factor;
        self
    }

    pub fn fallback_image_width_pt(mut self, width: f32) -> Self {
        self.config.fallback_image_width_pt = width;
        self
    }

    pub fn decode_concurrency(mut self, n: usize) -> Self {
        self.config.decode_concurrency = n;
        self
    }

    pub fn timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.config.timestamp = Some(ts);
        self
    }

    /// Validate and produce the final config.
    pub fn build(self) -> Result<ExportConfig, ExportError> {
        let c = &self.config;
        if !(c.page_width_pt.is_finite() && c.page_width_pt > 0.0)
            || !(c.page_height_pt.is_finite() && c.page_height_pt > 0.0)
        {
            return Err(ExportError::InvalidConfig(
                "page dimensions must be positive and finite".into(),
            ));
        }
        if c.margin_pt < 0.0 || c.content_width() <= 0.0 || c.content_height() <= 0.0 {
            return Err(ExportError::InvalidConfig(format!(
                "margins ({} pt) leave no content area on a {}x{} pt page",
                c.margin_pt, c.page_width_pt, c.page_height_pt
            )));
        }
        if c.body_font_size <= 0.0 || c.heading_font_size <= 0.0 || c.title_font_size <= 0.0 {
            return Err(ExportError::InvalidConfig(
                "font sizes must be positive".into(),
            ));
        }
        if c.line_height_factor < 1.0 {
            return Err(ExportError::InvalidConfig(
                "line height factor below 1.0 would overlap lines".into(),
            ));
        }
        if c.decode_concurrency == 0 {
            return Err(ExportError::InvalidConfig(
                "decode concurrency must be at least 1".into(),
            ));
        }
        Ok(self.config)
    }
}
