//! The in-memory result of an export.

use std::path::{Path, PathBuf};

/// A finished export: the artifact bytes plus the file name the artifact
/// should be saved under.
///
/// The library never writes to disk on its own; callers either hand the
/// bytes to whatever download mechanism they sit behind, or use
/// [`crate::write_artifact`] to persist them atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Raw file contents. UTF-8 for Markdown, binary for PDF.
    pub bytes: Vec<u8>,
    /// Suggested file name, derived from the source document's stem.
    pub file_name: String,
}

impl ExportArtifact {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
        }
    }

    /// The artifact's path when placed inside `dir`.
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(&self.file_name)
    }
}

/// The stem of a source file name: everything before the final `.`.
///
/// `"report.pdf"` → `"report"`; a name with no extension is returned whole.
pub(crate) fn file_stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_strips_one_extension() {
        assert_eq!(file_stem("report.pdf"), "report");
        assert_eq!(file_stem("archive.tar.gz"), "archive.tar");
    }

    #[test]
    fn stem_of_extensionless_name_is_the_name() {
        assert_eq!(file_stem("README"), "README");
    }

    #[test]
    fn stem_of_dotfile_is_the_dotfile() {
        assert_eq!(file_stem(".hidden"), ".hidden");
    }
}
