//! Error types for the annot-export library.
//!
//! Only whole-export conditions surface as errors. Position resolution
//! ([`crate::pipeline::position`]) is total: malformed or legacy position
//! data degrades to "unassigned", never to an `Err`, so one bad record can
//! never block export of the rest of the set. Likewise a screenshot whose
//! intrinsic size cannot be decoded in the measurement pre-pass is rendered
//! at a fallback size rather than failing the export.
//!
//! What remains fatal:
//!
//! * [`ExportError::EmptyInput`]: the caller asked to export zero
//!   annotations; raised before any rendering work begins.
//! * [`ExportError::RenderFailed`]: document assembly itself failed (for
//!   example a malformed data URL at image-embed time). No partial artifact
//!   is ever produced.

use std::path::PathBuf;
use thiserror::Error;

/// The export format being produced, used to label failures for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Markdown assembly is pure string building and currently has no
    /// failure path of its own, so the library never constructs
    /// `RenderFailed` with this label; it exists so callers wrapping both
    /// exporters can report either format uniformly.
    Markdown,
    Pdf,
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Markdown => write!(f, "Markdown"),
            ExportFormat::Pdf => write!(f, "PDF"),
        }
    }
}

/// All fatal errors returned by the annot-export library.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Export requested with zero annotations.
    #[error("No highlights available to export")]
    EmptyInput,

    /// Document assembly failed; nothing was produced.
    #[error("{format} export failed: {detail}")]
    RenderFailed { format: ExportFormat, detail: String },

    /// A screenshot's embedded image data could not be decoded when it had
    /// to be embedded into the PDF (as opposed to merely measured).
    #[error("PDF export failed: screenshot '{id}' has unreadable image data: {detail}")]
    ImageDecode { id: String, detail: String },

    /// Could not write the artifact to disk.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_message_is_user_facing() {
        assert_eq!(
            ExportError::EmptyInput.to_string(),
            "No highlights available to export"
        );
    }

    #[test]
    fn render_failed_names_the_format() {
        let e = ExportError::RenderFailed {
            format: ExportFormat::Pdf,
            detail: "bad xref".into(),
        };
        let msg = e.to_string();
        assert!(msg.starts_with("PDF export failed"), "got: {msg}");
        assert!(msg.contains("bad xref"));

        // Callers wrapping both exporters label Markdown failures the same
        // way even though the library itself never raises one.
        let e = ExportError::RenderFailed {
            format: ExportFormat::Markdown,
            detail: "disk full".into(),
        };
        assert!(e.to_string().starts_with("Markdown export failed"));
    }

    #[test]
    fn image_decode_names_the_annotation() {
        let e = ExportError::ImageDecode {
            id: "shot-3".into(),
            detail: "not a png".into(),
        };
        assert!(e.to_string().contains("shot-3"));
    }
}
