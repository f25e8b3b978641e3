//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Prints the discovered files in merge order.
pub mod list;

/// Concatenates a directory of video files with ffmpeg.
pub mod merge;
