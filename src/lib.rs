//! # annot-export
//!
//! Turn a document's annotations (highlighted text spans and screenshot
//! captures, each optionally commented) into shareable artifacts: a
//! Markdown digest or a paginated PDF report.
//!
//! The pipeline resolves each annotation's page and vertical position from
//! loosely structured capture data, sorts everything into reading order,
//! groups by page, and renders. Both output formats consume the same
//! ordering and grouping stages, so they always agree on sequence.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use annot_export::{export_markdown, export_pdf, Annotation, ExportConfig};
//!
//! # async fn run() -> Result<(), annot_export::ExportError> {
//! let annotations = vec![
//!     Annotation::text_on_page("a1", "a highlighted passage", 2)
//!         .with_comment("worth citing"),
//! ];
//!
//! let md = export_markdown(&annotations, "paper.pdf")?;
//! assert_eq!(md.file_name, "annotations_paper.md");
//!
//! let config = ExportConfig::default();
//! let pdf = export_pdf(&annotations, "paper.pdf", &config).await?;
//! assert_eq!(pdf.file_name, "paper - highlights.pdf");
//! # Ok(())
//! # }
//! ```
//!
//! Annotations deserialize directly from their persisted JSON shape (see
//! [`Annotation`]), so a stored snapshot can be fed to the exporters without
//! an intermediate conversion layer.

pub mod annotation;
pub mod artifact;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;

pub use annotation::{Annotation, AnnotationBody, Comment, Position, Rect, Screenshot, TextContent};
pub use artifact::ExportArtifact;
pub use config::{ExportConfig, ExportConfigBuilder};
pub use error::{ExportError, ExportFormat};
pub use export::{export_markdown, export_pdf, export_pdf_sync, write_artifact};
pub use pipeline::group::{group_by_page, PageGroup, PageKey};
pub use pipeline::order::order_annotations;
pub use pipeline::position::{resolve_page_number, resolve_vertical_offset};
