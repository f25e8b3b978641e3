//! Core library for ordering video files and concatenating them with ffmpeg.
//!
//! This crate discovers video files, orders them naturally (`clip2` before
//! `clip10`), writes a concat manifest and drives a concatenation engine,
//! either the ffmpeg binary or an in-memory engine supplied by the host.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use vidmerge_core::{MergeConfig, Merger, OutputTarget, SubprocessEngine};
//! use std::path::{Path, PathBuf};
//!
//! let config = MergeConfig::default();
//! let engine = SubprocessEngine::new(&config).unwrap();
//! let merger = Merger::new(engine, config).unwrap();
//!
//! let outcome = merger
//!     .merge_directory(
//!         Path::new("/path/to/clips"),
//!         OutputTarget::File(PathBuf::from("/path/to/merged.mp4")),
//!         |percent: f64| println!("{percent:.0}%"),
//!     )
//!     .unwrap();
//! println!("merged {} files", outcome.file_count);
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod external;
pub mod manifest;
pub mod merge;
pub mod natural;
pub mod progress_reporting;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{MergeConfig, MergeConfigBuilder};
pub use discovery::{find_video_files, find_video_files_with_extensions, is_video_file};
pub use error::{CoreError, CoreResult, MergePhase};
pub use external::{
    BridgedEngine, CodecPolicy, ConcatCommand, EngineAdapter, InputSource, MergeInput,
    MergeOutput, OutputTarget, SharedEngine, SubprocessEngine, VirtualEngine,
};
pub use manifest::Manifest;
pub use merge::{MergeOutcome, MergeState, Merger, PendingMerge};
pub use progress_reporting::ProgressSink;
pub use utils::{format_bytes, format_duration, parse_ffmpeg_time};
