//! Implementation of the 'list' subcommand.
//!
//! Prints the files `merge` would pick up, one per line, in the order they
//! would be concatenated.

use crate::cli::ListArgs;
use crate::error::CliResult;

use vidmerge_core::discovery::{self, SUPPORTED_EXTENSIONS};
use vidmerge_core::CoreError;

use std::io::Write;
use std::path::PathBuf;

/// Returns the matching files of `args.input_dir` in merge order.
pub fn discover(args: &ListArgs) -> CliResult<Vec<PathBuf>> {
    let files = if args.extensions.is_empty() {
        discovery::find_video_files_with_extensions(&args.input_dir, SUPPORTED_EXTENSIONS)?
    } else {
        let extensions: Vec<String> = args
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();
        discovery::find_video_files_with_extensions(&args.input_dir, &extensions)?
    };
    if files.is_empty() {
        return Err(CoreError::NoMatchingFiles(args.input_dir.clone()));
    }
    Ok(files)
}

pub fn run_list(args: ListArgs, out: &mut dyn Write) -> CliResult<()> {
    for file in discover(&args)? {
        let name = file.file_name().unwrap_or_default().to_string_lossy();
        writeln!(out, "{name}")?;
    }
    Ok(())
}
