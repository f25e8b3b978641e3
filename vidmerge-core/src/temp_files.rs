//! Temporary file management utilities.
//!
//! This module provides helper functions for creating temporary files and
//! directories. It leverages the tempfile crate to handle automatic cleanup
//! via the Drop trait, so manifests and staged inputs disappear on every
//! exit path, including errors.

use crate::error::CoreResult;
use std::path::Path;
use tempfile::{Builder as TempFileBuilder, NamedTempFile, TempDir};

/// Creates a temporary directory with prefix inside `base`. Auto-cleaned when dropped.
pub fn create_temp_dir(base: &Path, prefix: &str) -> CoreResult<TempDir> {
    std::fs::create_dir_all(base)?;

    Ok(TempFileBuilder::new().prefix(prefix).tempdir_in(base)?)
}

/// Creates a temporary file with prefix and extension. Auto-deleted when dropped.
pub fn create_temp_file(dir: &Path, prefix: &str, extension: &str) -> CoreResult<NamedTempFile> {
    std::fs::create_dir_all(dir)?;
    let temp_file = TempFileBuilder::new()
        .prefix(&format!("{prefix}_"))
        .suffix(&format!(".{extension}"))
        .tempfile_in(dir)?;

    Ok(temp_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_is_removed_on_drop() {
        let base = tempfile::tempdir().unwrap();
        let file = create_temp_file(base.path(), "vidmerge_list", "txt").unwrap();
        let path = file.path().to_path_buf();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("vidmerge_list_"));
        assert!(name.ends_with(".txt"));
        assert!(path.exists());

        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn temp_dir_creates_missing_base() {
        let base = tempfile::tempdir().unwrap();
        let nested = base.path().join("a").join("b");
        let dir = create_temp_dir(&nested, "vidmerge_inputs").unwrap();
        assert!(dir.path().starts_with(&nested));
    }
}
