use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The full textual content of the target file, read once at transaction
/// start.
///
/// The line index is derived lazily from the content and maps byte offsets
/// back to 1-based line numbers for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Path the content was read from
    pub path: PathBuf,
    /// Full file content
    pub content: String,
}

impl SourceDocument {
    /// Create a document from in-memory content.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Read a document from disk.
    pub fn read(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    /// Ordered byte offsets of each line start. The first entry is always 0.
    pub fn line_starts(&self) -> Vec<usize> {
        std::iter::once(0)
            .chain(
                self.content
                    .match_indices('\n')
                    .map(|(idx, _)| idx + 1)
                    .filter(|&idx| idx < self.content.len()),
            )
            .collect()
    }

    /// 1-based line number containing the given byte offset.
    ///
    /// Offsets past the end of the content report the last line.
    pub fn line_for_offset(&self, offset: usize) -> usize {
        let starts = self.line_starts();
        match starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_starts_single_line() {
        let doc = SourceDocument::new("test.ts", "no newline");
        assert_eq!(doc.line_starts(), vec![0]);
    }

    #[test]
    fn line_starts_multiline() {
        let doc = SourceDocument::new("test.ts", "a\nbb\nccc\n");
        assert_eq!(doc.line_starts(), vec![0, 2, 5]);
    }

    #[test]
    fn line_for_offset_maps_to_lines() {
        let doc = SourceDocument::new("test.ts", "a\nbb\nccc\n");
        assert_eq!(doc.line_for_offset(0), 1);
        assert_eq!(doc.line_for_offset(1), 1);
        assert_eq!(doc.line_for_offset(2), 2);
        assert_eq!(doc.line_for_offset(4), 2);
        assert_eq!(doc.line_for_offset(5), 3);
        assert_eq!(doc.line_for_offset(7), 3);
    }

    #[test]
    fn line_for_offset_past_end() {
        let doc = SourceDocument::new("test.ts", "a\nbb");
        assert_eq!(doc.line_for_offset(100), 2);
    }

    #[test]
    fn read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = SourceDocument::read(dir.path().join("absent.ts"));
        assert!(result.is_err());
    }
}
