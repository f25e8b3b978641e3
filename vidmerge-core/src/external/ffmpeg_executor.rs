// ============================================================================
// vidmerge-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning and interacting with FFmpeg
// processes, and resolves which ffmpeg binary to run.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar
// - resolve_ffmpeg_binary: working directory first, then PATH

use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// File name of the ffmpeg binary on this platform.
#[cfg(windows)]
pub const FFMPEG_BINARY: &str = "ffmpeg.exe";
#[cfg(not(windows))]
pub const FFMPEG_BINARY: &str = "ffmpeg";

/// Picks the ffmpeg binary: a copy next to the working directory wins,
/// otherwise the bare name is left for the `PATH` lookup.
pub fn resolve_ffmpeg_binary(working_dir: &Path) -> PathBuf {
    let local = working_dir.join(FFMPEG_BINARY);
    if local.is_file() {
        log::debug!("Using ffmpeg from working directory: {}", local.display());
        local
    } else {
        PathBuf::from(FFMPEG_BINARY)
    }
}

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using a provided handler closure.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {e}");
            CoreError::EngineInvocation {
                engine: "ffmpeg".to_string(),
                message: format!("could not read process output: {e}"),
                diagnostics: Vec::new(),
            }
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0.wait().map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let program = cmd.as_inner().get_program().to_string_lossy().into_owned();
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error(program, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_binary_is_preferred() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_ffmpeg_binary(dir.path()), PathBuf::from(FFMPEG_BINARY));

        let local = dir.path().join(FFMPEG_BINARY);
        std::fs::write(&local, b"").unwrap();
        assert_eq!(resolve_ffmpeg_binary(dir.path()), local);
    }

    #[test]
    fn directory_named_ffmpeg_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(FFMPEG_BINARY)).unwrap();
        assert_eq!(resolve_ffmpeg_binary(dir.path()), PathBuf::from(FFMPEG_BINARY));
    }
}
