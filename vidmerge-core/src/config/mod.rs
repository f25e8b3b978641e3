//! Configuration structures and constants for the vidmerge-core library.
//!
//! This module holds the settings that shape a merge: where temporary
//! manifests go, which ffmpeg binary runs, which extensions are discovered
//! and how the engine treats codecs and existing outputs.

mod builder;

use crate::discovery::SUPPORTED_EXTENSIONS;
use crate::error::{CoreError, CoreResult};
use crate::external::CodecPolicy;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use builder::MergeConfigBuilder;

// Default constants

/// Number of trailing engine diagnostic lines kept for error reports.
pub const DEFAULT_DIAGNOSTIC_TAIL_LINES: usize = 20;

/// Whether input durations are probed with ffprobe to derive progress.
pub const DEFAULT_PROBE_DURATIONS: bool = true;

/// Main configuration structure for the vidmerge-core library.
///
/// All fields have sensible defaults. The builder pattern provides a
/// convenient way to create and configure instances.
///
/// # Examples
///
/// ```rust
/// use vidmerge_core::config::MergeConfigBuilder;
/// use vidmerge_core::external::CodecPolicy;
///
/// let config = MergeConfigBuilder::new()
///     .codec_policy(CodecPolicy::StreamCopy)
///     .overwrite(true)
///     .extensions(["mp4", "webm"])
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Directory for temporary manifests and staged inputs
    /// (defaults to the system temporary directory)
    pub temp_dir: Option<PathBuf>,

    /// Explicit ffmpeg binary. When unset, `./ffmpeg` in the working
    /// directory is preferred and `ffmpeg` on `PATH` is the fallback.
    pub ffmpeg_path: Option<PathBuf>,

    /// Extensions picked up by directory discovery (case-insensitive)
    pub extensions: Vec<String>,

    /// Codec handling override. `None` keeps each engine's own default:
    /// re-encode for the subprocess engine, stream copy for the bridged one.
    pub codec_policy: Option<CodecPolicy>,

    /// Replace an existing output file instead of failing
    pub overwrite: bool,

    /// Probe input durations so ffmpeg's time stamps become percentages
    pub probe_durations: bool,

    /// Trailing diagnostic lines attached to engine failures
    pub diagnostic_tail_lines: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            ffmpeg_path: None,
            extensions: SUPPORTED_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
            codec_policy: None,
            overwrite: false,
            probe_durations: DEFAULT_PROBE_DURATIONS,
            diagnostic_tail_lines: DEFAULT_DIAGNOSTIC_TAIL_LINES,
        }
    }
}

impl MergeConfig {
    /// Checks the configuration for values that would make every merge fail.
    pub fn validate(&self) -> CoreResult<()> {
        if self.extensions.is_empty() {
            return Err(CoreError::Config(
                "at least one video extension is required".to_string(),
            ));
        }
        if let Some(ext) = self
            .extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.contains('.'))
        {
            return Err(CoreError::Config(format!(
                "invalid extension '{ext}': expected a bare extension such as 'mp4'"
            )));
        }
        if self.diagnostic_tail_lines == 0 {
            return Err(CoreError::Config(
                "diagnostic_tail_lines must be greater than zero".to_string(),
            ));
        }
        if let Some(dir) = &self.temp_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(CoreError::Config(format!(
                    "temporary directory '{}' is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Directory used for temporary manifests and staged inputs.
    pub fn temp_base(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Resolves the ffmpeg binary to run, relative to `working_dir`.
    pub fn ffmpeg_binary(&self, working_dir: &Path) -> PathBuf {
        match &self.ffmpeg_path {
            Some(path) => path.clone(),
            None => crate::external::ffmpeg_executor::resolve_ffmpeg_binary(working_dir),
        }
    }
}

/// Checks an output destination before any work is done.
pub fn validate_output(output: &Path, overwrite: bool) -> CoreResult<()> {
    if output.file_name().is_none() {
        return Err(CoreError::Config(format!(
            "output '{}' does not name a file",
            output.display()
        )));
    }
    if output.is_dir() {
        return Err(CoreError::Config(format!(
            "output '{}' is a directory",
            output.display()
        )));
    }
    if output.exists() && !overwrite {
        return Err(CoreError::Config(format!(
            "output '{}' already exists (use overwrite to replace it)",
            output.display()
        )));
    }
    Ok(())
}
