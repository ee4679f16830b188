//! Public entry points: run the whole pipeline on one annotation snapshot.
//!
//! Each call is a pure transform of the snapshot it is given: nothing is
//! retained between calls and the input is never mutated, so repeated
//! exports of the same snapshot produce identical artifacts (the PDF's
//! header timestamp aside, unless pinned via
//! [`ExportConfig::timestamp`](crate::ExportConfig)).

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::annotation::Annotation;
use crate::artifact::ExportArtifact;
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::pipeline::group::group_by_page;
use crate::pipeline::markdown::render_markdown;
use crate::pipeline::measure::decode_screenshots;
use crate::pipeline::order::order_annotations;
use crate::pipeline::pdf::render_pdf;

/// Export a snapshot as a Markdown document.
///
/// `file_name` is the source document's display name (not a path); the
/// artifact is named `annotations_{stem}.md`.
///
/// # Errors
/// [`ExportError::EmptyInput`] when the snapshot holds no annotations.
pub fn export_markdown(
    annotations: &[Annotation],
    file_name: &str,
) -> Result<ExportArtifact, ExportError> {
    if annotations.is_empty() {
        return Err(ExportError::EmptyInput);
    }
    info!(count = annotations.len(), file_name, "markdown export started");

    // ── Step 1: reading order ──────────────────────────────────────────
    let ordered = order_annotations(annotations);

    // ── Step 2: page groups ────────────────────────────────────────────
    let groups = group_by_page(&ordered);
    debug!(groups = groups.len(), "annotations grouped");

    // ── Step 3: render ─────────────────────────────────────────────────
    render_markdown(&groups, file_name)
}

/// Export a snapshot as a paginated PDF report.
///
/// Asynchronous because every screenshot is decoded (concurrently, off the
/// async threads) before layout begins. The artifact is named
/// `{stem} - highlights.pdf`.
///
/// # Errors
/// [`ExportError::EmptyInput`] when the snapshot holds no annotations;
/// [`ExportError::ImageDecode`] / [`ExportError::RenderFailed`] when
/// document assembly fails. No partial artifact is ever returned.
pub async fn export_pdf(
    annotations: &[Annotation],
    file_name: &str,
    config: &ExportConfig,
) -> Result<ExportArtifact, ExportError> {
    if annotations.is_empty() {
        return Err(ExportError::EmptyInput);
    }
    info!(count = annotations.len(), file_name, "pdf export started");

    // ── Step 1: reading order ──────────────────────────────────────────
    let ordered = order_annotations(annotations);

    // ── Step 2: page groups ────────────────────────────────────────────
    let groups = group_by_page(&ordered);
    debug!(groups = groups.len(), "annotations grouped");

    // ── Step 3: decode screenshots ahead of layout ─────────────────────
    let decoded = decode_screenshots(&ordered, config.decode_concurrency).await;
    debug!(decoded = decoded.len(), "screenshot measurement done");

    // ── Step 4: assemble the document ──────────────────────────────────
    render_pdf(&groups, file_name, config, &decoded)
}

/// Blocking wrapper around [`export_pdf`] for callers without a runtime.
///
/// Spins up a transient multi-threaded runtime for the duration of the
/// call. Must not be invoked from inside an async context.
pub fn export_pdf_sync(
    annotations: &[Annotation],
    file_name: &str,
    config: &ExportConfig,
) -> Result<ExportArtifact, ExportError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| ExportError::Internal(format!("failed to start runtime: {e}")))?;
    runtime.block_on(export_pdf(annotations, file_name, config))
}

/// Write an artifact into `dir` atomically and return the final path.
///
/// Bytes go to a `.tmp` sibling first and are renamed into place, so a
/// crash mid-write never leaves a truncated artifact under the final name.
pub fn write_artifact(artifact: &ExportArtifact, dir: &Path) -> Result<PathBuf, ExportError> {
    let final_path = artifact.path_in(dir);
    let tmp_path = final_path.with_extension("tmp");

    std::fs::write(&tmp_path, &artifact.bytes).map_err(|source| {
        ExportError::OutputWriteFailed {
            path: tmp_path.clone(),
            source,
        }
    })?;
    std::fs::rename(&tmp_path, &final_path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp_path);
        ExportError::OutputWriteFailed {
            path: final_path.clone(),
            source,
        }
    })?;

    info!(path = %final_path.display(), bytes = artifact.bytes.len(), "artifact written");
    Ok(final_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_export_of_nothing_fails_fast() {
        let err = export_markdown(&[], "paper.pdf").unwrap_err();
        assert!(matches!(err, ExportError::EmptyInput));
    }

    #[tokio::test]
    async fn pdf_export_of_nothing_fails_fast() {
        let err = export_pdf(&[], "paper.pdf", &ExportConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::EmptyInput));
    }

    #[test]
    fn sync_wrapper_exports_a_pdf() {
        let input = vec![Annotation::text_on_page("a", "hello", 1)];
        let artifact =
            export_pdf_sync(&input, "paper.pdf", &ExportConfig::default()).expect("export");
        assert!(artifact.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn write_artifact_places_bytes_under_final_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let artifact = ExportArtifact::new(b"content".to_vec(), "annotations_x.md".to_string());
        let path = write_artifact(&artifact, dir.path()).expect("write");
        assert_eq!(path, dir.path().join("annotations_x.md"));
        assert_eq!(std::fs::read(&path).unwrap(), b"content");
        // No leftover temp file.
        assert!(!dir.path().join("annotations_x.tmp").exists());
    }

    #[test]
    fn write_artifact_into_missing_dir_reports_the_path() {
        let artifact = ExportArtifact::new(b"x".to_vec(), "out.md".to_string());
        let err = write_artifact(&artifact, Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ExportError::OutputWriteFailed { .. }));
    }
}
