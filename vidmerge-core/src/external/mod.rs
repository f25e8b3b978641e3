// ============================================================================
// vidmerge-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL ENGINES: Concatenation Engine Contract and Adapters
//
// This module defines the contract every concatenation engine satisfies and
// the two adapters that implement it: a subprocess adapter that runs the
// ffmpeg binary, and a bridged adapter that drives an in-memory engine
// instance supplied by the host through the `VirtualEngine` trait.
//
// KEY COMPONENTS:
// - EngineAdapter: the shared invoke contract used by the orchestrator
// - MergeInput / OutputTarget / MergeOutput: what goes in and comes out
// - CodecPolicy / ConcatCommand: the fixed concat argument template
// - FfmpegSpawner / FfprobeExecutor: process seams for the subprocess adapter
//
// The orchestrator only ever sees `EngineAdapter`. Which variant runs is
// decided when the `Merger` is constructed.

use crate::error::CoreResult;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// SUBMODULES
// ============================================================================

/// In-memory engine driven through a host callback interface
pub mod bridged;

/// Traits and implementations for spawning ffmpeg processes
pub mod ffmpeg_executor;

/// Traits and implementations for probing input durations
pub mod ffprobe_executor;

/// Native engine running the ffmpeg binary
pub mod subprocess;

#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use bridged::{BridgedEngine, EngineProgress, ProgressCallback, SharedEngine, VirtualEngine};
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};
pub use ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor};
pub use subprocess::SubprocessEngine;

// ============================================================================
// INPUTS AND OUTPUTS
// ============================================================================

/// Where the bytes of one input come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A file on the local filesystem
    Path(PathBuf),
    /// Contents already held in memory, e.g. an upload
    Bytes(Vec<u8>),
}

/// One file to be merged. `name` is what the natural ordering and the
/// manifest see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeInput {
    pub name: String,
    pub source: InputSource,
}

impl MergeInput {
    /// Creates an input backed by a file, named after its final component.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            name,
            source: InputSource::Path(path),
        }
    }

    /// Creates an input from in-memory contents.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            source: InputSource::Bytes(data),
        }
    }

    /// What makes two inputs the same file: the canonical path for files on
    /// disk (the given path when it cannot be resolved), the name for
    /// in-memory contents.
    pub fn source_identity(&self) -> String {
        match &self.source {
            InputSource::Path(path) => std::fs::canonicalize(path)
                .unwrap_or_else(|_| path.clone())
                .to_string_lossy()
                .into_owned(),
            InputSource::Bytes(_) => self.name.clone(),
        }
    }
}

/// Where the merged result should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write the result to this path
    File(PathBuf),
    /// Hand the result back as bytes. The extension picks the container.
    Memory { extension: String },
}

impl OutputTarget {
    /// Container extension of the target, without the leading dot.
    pub fn extension(&self) -> String {
        match self {
            OutputTarget::File(path) => path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_else(|| "mp4".to_string()),
            OutputTarget::Memory { extension } => extension.trim_start_matches('.').to_string(),
        }
    }
}

/// The artifact an engine produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutput {
    File(PathBuf),
    Bytes(Vec<u8>),
}

impl MergeOutput {
    /// Size of the produced artifact in bytes.
    pub fn size(&self) -> std::io::Result<u64> {
        match self {
            MergeOutput::File(path) => Ok(std::fs::metadata(path)?.len()),
            MergeOutput::Bytes(data) => Ok(data.len() as u64),
        }
    }
}

// ============================================================================
// CONCAT COMMAND TEMPLATE
// ============================================================================

/// How the engine treats the streams it concatenates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecPolicy {
    /// Copy streams untouched (`-c copy`)
    StreamCopy,
    /// Re-encode into a fixed codec pair
    Reencode { video: String, audio: String },
}

impl CodecPolicy {
    /// The fixed pair the native command line forces for compatibility.
    pub fn reencode_default() -> Self {
        CodecPolicy::Reencode {
            video: "libx264".to_string(),
            audio: "aac".to_string(),
        }
    }

    /// Codec arguments as passed to ffmpeg.
    pub fn args(&self) -> Vec<String> {
        match self {
            CodecPolicy::StreamCopy => vec!["-c".into(), "copy".into()],
            CodecPolicy::Reencode { video, audio } => vec![
                "-c:v".into(),
                video.clone(),
                "-c:a".into(),
                audio.clone(),
                // Older builds gate the native aac encoder behind this flag.
                "-strict".into(),
                "-2".into(),
            ],
        }
    }
}

/// The concat-demuxer invocation shared by both adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatCommand {
    pub codec: CodecPolicy,
    pub overwrite: bool,
}

impl ConcatCommand {
    /// Renders `-f concat -safe 0 -i <list> <codec> [-y|-n] <output>`.
    ///
    /// `-safe 0` lets the list name absolute paths. `-n` keeps ffmpeg from
    /// stopping at its interactive overwrite prompt.
    pub fn to_args(&self, list: &str, output: &str) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(),
            "-i".into(),
            list.into(),
        ];
        args.extend(self.codec.args());
        args.push(if self.overwrite { "-y" } else { "-n" }.into());
        args.push(output.into());
        args
    }
}

// ============================================================================
// ENGINE CONTRACT
// ============================================================================

/// Everything an adapter needs for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct EngineRequest<'a> {
    /// Inputs in final concatenation order. Each adapter writes its own
    /// list file over the locations it gives them.
    pub inputs: &'a [MergeInput],
    pub output: &'a OutputTarget,
    pub command: &'a ConcatCommand,
}

/// A concatenation engine. Both variants share this contract so the
/// orchestrator never needs to know which one it drives.
pub trait EngineAdapter {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Codec handling used when the configuration does not override it.
    fn default_codec_policy(&self) -> CodecPolicy;

    /// Runs the engine to completion.
    ///
    /// Every progress value the engine reports is passed to `on_progress`
    /// as a percentage in `[0, 100]`, in emission order. Temporary state
    /// created for the invocation is removed before returning, whatever
    /// the outcome.
    fn invoke(
        &self,
        request: &EngineRequest<'_>,
        on_progress: &mut dyn FnMut(f64),
    ) -> CoreResult<MergeOutput>;
}

impl<E: EngineAdapter + ?Sized> EngineAdapter for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn default_codec_policy(&self) -> CodecPolicy {
        (**self).default_codec_policy()
    }

    fn invoke(
        &self,
        request: &EngineRequest<'_>,
        on_progress: &mut dyn FnMut(f64),
    ) -> CoreResult<MergeOutput> {
        (**self).invoke(request, on_progress)
    }
}
