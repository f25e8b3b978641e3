//! Concat manifest construction.
//!
//! A manifest lists the files to join in the syntax of ffmpeg's concat
//! demuxer, one `file '<path>'` line per input:
//!
//! ```text
//! file '/clips/a1.mp4'
//! file '/clips/a10.mp4'
//! ```
//!
//! Building is pure; writing goes to a self-deleting temporary file.

use crate::error::{CoreError, CoreResult};
use crate::temp_files;

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// One line of a manifest, wrapping a single file reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    path: String,
}

impl ManifestEntry {
    /// The file reference exactly as supplied.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Renders the entry as a concat-demuxer directive, without newline.
    ///
    /// Inside single quotes the demuxer treats everything literally, so an
    /// embedded `'` is written as `'\''`: close the quote, emit an escaped
    /// quote, reopen.
    pub fn render(&self) -> String {
        format!("file '{}'", self.path.replace('\'', r"'\''"))
    }
}

/// Ordered list of files for the concat demuxer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Builds a manifest with one entry per name, in the given order.
    ///
    /// Fails with `EmptyInput` for an empty list, `InvalidManifestEntry` for
    /// names containing line breaks or NUL (the format is line based and
    /// cannot represent them), and `DuplicateManifestEntry` when a name
    /// occurs twice.
    pub fn build<S: AsRef<str>>(names: &[S]) -> CoreResult<Self> {
        if names.is_empty() {
            return Err(CoreError::EmptyInput);
        }

        let mut seen = HashSet::with_capacity(names.len());
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if name.is_empty() || name.contains(['\n', '\r', '\0']) {
                return Err(CoreError::InvalidManifestEntry(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(CoreError::DuplicateManifestEntry(name.to_string()));
            }
            entries.push(ManifestEntry {
                path: name.to_string(),
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the full manifest text, one directive per line.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.render() + "\n")
            .collect()
    }

    /// Writes the manifest into a new temporary file inside `dir`.
    ///
    /// The file is deleted when the returned handle is dropped.
    pub fn write_temp(&self, dir: &Path) -> CoreResult<NamedTempFile> {
        let mut file = temp_files::create_temp_file(dir, "vidmerge_list", "txt")
            .map_err(|e| match e {
                CoreError::Io(io) => CoreError::ManifestWrite(io),
                other => other,
            })?;
        file.write_all(self.render().as_bytes())
            .and_then(|()| file.flush())
            .map_err(CoreError::ManifestWrite)?;

        log::debug!(
            "Wrote concat manifest with {} entries to {}",
            self.len(),
            file.path().display()
        );
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_quoted_line_per_input_in_order() {
        let manifest = Manifest::build(&["/v/a1.mp4", "/v/a10.mp4", "/v/b2.mp4"]).unwrap();
        assert_eq!(manifest.len(), 3);
        assert_eq!(
            manifest.render(),
            "file '/v/a1.mp4'\nfile '/v/a10.mp4'\nfile '/v/b2.mp4'\n"
        );
    }

    #[test]
    fn quotes_are_escaped() {
        let manifest = Manifest::build(&["it's.mp4"]).unwrap();
        assert_eq!(manifest.render(), "file 'it'\\''s.mp4'\n");
        assert_eq!(manifest.entries()[0].path(), "it's.mp4");
    }

    #[test]
    fn line_breaks_are_rejected() {
        let err = Manifest::build(&["bad\nname.mp4"]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidManifestEntry(_)));
        let err = Manifest::build(&["bad\rname.mp4"]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidManifestEntry(_)));
    }

    #[test]
    fn duplicates_are_rejected() {
        let err = Manifest::build(&["a.mp4", "b.mp4", "a.mp4"]).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateManifestEntry(name) if name == "a.mp4"));
    }

    #[test]
    fn empty_input_is_rejected() {
        let names: [&str; 0] = [];
        assert!(matches!(Manifest::build(&names), Err(CoreError::EmptyInput)));
    }

    #[test]
    fn temp_manifest_holds_rendered_text_and_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = Manifest::build(&["a.mp4", "b.mp4"]).unwrap();
        let file = manifest.write_temp(dir.path()).unwrap();
        let path = file.path().to_path_buf();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), manifest.render());

        drop(file);
        assert!(!path.exists());
    }
}
