// ============================================================================
// vidmerge-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Types for the Merge Pipeline
//
// Every failure of discovery, manifest construction, engine invocation or
// output readback is reported through `CoreError`. Each variant belongs to
// exactly one `MergePhase` so callers can tell the user which stage failed.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Stage of a merge operation an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePhase {
    /// Configuration or argument validation
    Setup,
    /// Directory listing and filtering
    Discovery,
    /// Building or writing the concat manifest
    Manifest,
    /// Running the external engine
    Invocation,
    /// Reading the produced artifact back
    Readback,
}

impl fmt::Display for MergePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergePhase::Setup => "setup",
            MergePhase::Discovery => "discovery",
            MergePhase::Manifest => "manifest",
            MergePhase::Invocation => "invocation",
            MergePhase::Readback => "readback",
        };
        f.write_str(name)
    }
}

/// Errors produced by vidmerge-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to read directory '{}': {source}", .path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No video files found in directory '{}'", .0.display())]
    NoMatchingFiles(PathBuf),

    #[error("No video files to merge")]
    EmptyInput,

    #[error("Input file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("File name cannot be written to a concat manifest: {0:?}")]
    InvalidManifestEntry(String),

    #[error("File appears more than once in the merge list: {0}")]
    DuplicateManifestEntry(String),

    #[error("Failed to write concat manifest: {0}")]
    ManifestWrite(#[source] io::Error),

    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed while waiting for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("{engine} failed: {message}{}", format_diagnostics(.diagnostics))]
    EngineInvocation {
        engine: String,
        message: String,
        diagnostics: Vec<String>,
    },

    #[error("Merged output '{target}' could not be read: {reason}")]
    OutputRead { target: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl CoreError {
    /// Returns the merge phase this error belongs to.
    pub fn phase(&self) -> MergePhase {
        match self {
            CoreError::DirectoryRead { .. } | CoreError::NoMatchingFiles(_) => {
                MergePhase::Discovery
            }
            CoreError::EmptyInput
            | CoreError::InvalidManifestEntry(_)
            | CoreError::DuplicateManifestEntry(_)
            | CoreError::ManifestWrite(_) => MergePhase::Manifest,
            CoreError::MissingFile(_)
            | CoreError::EngineUnavailable(_)
            | CoreError::CommandStart(..)
            | CoreError::CommandWait(..)
            | CoreError::EngineInvocation { .. } => MergePhase::Invocation,
            CoreError::OutputRead { .. } => MergePhase::Readback,
            CoreError::Config(_) | CoreError::Io(_) => MergePhase::Setup,
        }
    }
}

fn format_diagnostics(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!("\n{}", lines.join("\n"))
    }
}

/// Result type for vidmerge-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Maps a spawn failure to the matching error. A missing binary means the
/// engine is unavailable rather than broken.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    let cmd = cmd.into();
    if err.kind() == io::ErrorKind::NotFound {
        CoreError::EngineUnavailable(format!("'{cmd}' was not found: {err}"))
    } else {
        CoreError::CommandStart(cmd, err)
    }
}

pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

/// Builds an invocation error for a process that exited unsuccessfully.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    diagnostics: Vec<String>,
) -> CoreError {
    let message = match status.code() {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by signal".to_string(),
    };
    CoreError::EngineInvocation {
        engine: cmd.into(),
        message,
        diagnostics,
    }
}
