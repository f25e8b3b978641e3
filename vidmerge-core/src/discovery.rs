//! File discovery module for finding video files to merge.
//!
//! This module lists the top level of a directory, keeps the entries that
//! look like single-extension video files, and returns them in natural order.

use crate::error::{CoreError, CoreResult};
use crate::natural;

use std::path::{Path, PathBuf};

/// Extensions accepted by default (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "flv", "wmv"];

/// Returns true if `name` has exactly one period and a supported extension.
///
/// Names with compound extensions or extra dots (`a.b.mp4`, `.mp4.part`)
/// are rejected even when the final extension is supported.
pub fn is_video_file<S: AsRef<str>>(name: &str, extensions: &[S]) -> bool {
    if name.matches('.').count() != 1 {
        return false;
    }
    let Some((_, ext)) = name.rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_lowercase();
    extensions
        .iter()
        .any(|allowed| allowed.as_ref().eq_ignore_ascii_case(&ext))
}

/// Finds video files with a default extension in `input_dir`, in natural order.
///
/// # Examples
///
/// ```rust,no_run
/// use vidmerge_core::find_video_files;
/// use std::path::Path;
///
/// let files = find_video_files(Path::new("/path/to/clips")).unwrap();
/// for file in files {
///     println!("{}", file.display());
/// }
/// ```
pub fn find_video_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    find_video_files_with_extensions(input_dir, SUPPORTED_EXTENSIONS)
}

/// Finds files in `input_dir` whose extension is in `extensions`.
///
/// Subdirectories are not searched. An empty result is not an error; the
/// caller decides whether an empty input matters.
///
/// The result is ordered by the natural comparator over the file name.
/// Entries are pre-sorted byte-wise so that names the comparator considers
/// equal (`f007.mp4`, `f7.mp4`) still come out in a fixed order.
pub fn find_video_files_with_extensions<S: AsRef<str>>(
    input_dir: &Path,
    extensions: &[S],
) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(input_dir).map_err(|source| CoreError::DirectoryRead {
        path: input_dir.to_path_buf(),
        source,
    })?;

    let mut names: Vec<String> = read_dir
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let file_type = entry.file_type().ok()?;
            // Follow symlinks so a linked clip counts as a regular file.
            let is_dir = if file_type.is_symlink() {
                entry.path().is_dir()
            } else {
                file_type.is_dir()
            };
            if is_dir {
                return None;
            }

            let name = entry.file_name().into_string().ok()?;
            is_video_file(&name, extensions).then_some(name)
        })
        .collect();

    names.sort();
    natural::natural_sort(&mut names);

    log::debug!(
        "Discovered {} video file(s) in {}",
        names.len(),
        input_dir.display()
    );

    Ok(names.into_iter().map(|name| input_dir.join(name)).collect())
}
