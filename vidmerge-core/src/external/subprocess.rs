// ============================================================================
// vidmerge-core/src/external/subprocess.rs
// ============================================================================
//
// SUBPROCESS ENGINE: Concatenation Through the ffmpeg Binary
//
// Runs ffmpeg's concat demuxer as a child process. Inputs are resolved to
// absolute paths (in-memory inputs are staged to a temporary directory),
// a temporary list file is written, and ffmpeg's diagnostics are streamed
// to the log while the call blocks until the process exits.
//
// Progress comes from ffmpeg's `time=` lines. It is only reported when the
// total input duration could be probed up front; otherwise the merge runs
// silently apart from the log.

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarSpawner};
use super::ffprobe_executor::{CrateFfprobeExecutor, FfprobeExecutor};
use super::{CodecPolicy, EngineAdapter, EngineRequest, InputSource, MergeOutput, OutputTarget};
use crate::config::MergeConfig;
use crate::error::{CoreError, CoreResult, command_failed_error};
use crate::manifest::Manifest;
use crate::progress_reporting::FfmpegProgressHandler;
use crate::temp_files;

use ffmpeg_sidecar::command::FfmpegCommand;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Engine adapter that spawns the ffmpeg binary.
#[derive(Debug, Clone)]
pub struct SubprocessEngine<S = SidecarSpawner, P = CrateFfprobeExecutor> {
    spawner: S,
    prober: P,
    ffmpeg_binary: PathBuf,
    temp_base: PathBuf,
    probe_durations: bool,
    diagnostic_tail_lines: usize,
}

impl SubprocessEngine {
    /// Creates an engine using ffmpeg-sidecar and the ffprobe crate.
    ///
    /// The binary is resolved against the current working directory.
    pub fn new(config: &MergeConfig) -> CoreResult<Self> {
        Self::with_executors(SidecarSpawner, CrateFfprobeExecutor::new(), config)
    }
}

impl<S: FfmpegSpawner, P: FfprobeExecutor> SubprocessEngine<S, P> {
    /// Creates an engine with explicit process seams.
    pub fn with_executors(spawner: S, prober: P, config: &MergeConfig) -> CoreResult<Self> {
        let working_dir = std::env::current_dir()?;
        let ffmpeg_binary = config.ffmpeg_binary(&working_dir);
        log::debug!("Subprocess engine will run {}", ffmpeg_binary.display());

        Ok(Self {
            spawner,
            prober,
            ffmpeg_binary,
            temp_base: config.temp_base(),
            probe_durations: config.probe_durations,
            diagnostic_tail_lines: config.diagnostic_tail_lines,
        })
    }

    pub fn ffmpeg_binary(&self) -> &Path {
        &self.ffmpeg_binary
    }

    /// Canonical path for every input, staging in-memory inputs on first need.
    fn resolve_inputs(
        &self,
        request: &EngineRequest<'_>,
        staging: &mut Option<TempDir>,
    ) -> CoreResult<Vec<PathBuf>> {
        let mut resolved = Vec::with_capacity(request.inputs.len());
        for (index, input) in request.inputs.iter().enumerate() {
            let path = match &input.source {
                InputSource::Path(path) => canonical_input(path)?,
                InputSource::Bytes(data) => {
                    let file_name = Path::new(&input.name)
                        .file_name()
                        .ok_or_else(|| CoreError::InvalidManifestEntry(input.name.clone()))?;
                    let dir = self.staging_dir(staging)?;
                    // Index prefix keeps "a/x.mp4" and "b/x.mp4" apart.
                    let staged = dir.join(format!("{index:04}_{}", file_name.to_string_lossy()));
                    std::fs::write(&staged, data)?;
                    log::debug!("Staged in-memory input '{}' at {}", input.name, staged.display());
                    staged
                }
            };
            resolved.push(path);
        }
        Ok(resolved)
    }

    fn staging_dir<'a>(&self, staging: &'a mut Option<TempDir>) -> CoreResult<&'a Path> {
        if staging.is_none() {
            *staging = Some(temp_files::create_temp_dir(&self.temp_base, "vidmerge_stage")?);
        }
        match staging {
            Some(dir) => Ok(dir.path()),
            None => Err(CoreError::Io(io::Error::other("staging directory unavailable"))),
        }
    }

    fn probe_total_duration(&self, inputs: &[PathBuf]) -> Option<f64> {
        if !self.probe_durations {
            return None;
        }
        let paths: Vec<&Path> = inputs.iter().map(PathBuf::as_path).collect();
        match self.prober.total_duration(&paths) {
            Ok(total) if total > 0.0 => {
                log::debug!("Total input duration: {total:.2}s");
                Some(total)
            }
            Ok(_) => None,
            Err(e) => {
                log::warn!("Could not probe input durations, progress disabled: {e}");
                None
            }
        }
    }
}

impl<S: FfmpegSpawner, P: FfprobeExecutor> EngineAdapter for SubprocessEngine<S, P> {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn default_codec_policy(&self) -> CodecPolicy {
        CodecPolicy::reencode_default()
    }

    fn invoke(
        &self,
        request: &EngineRequest<'_>,
        on_progress: &mut dyn FnMut(f64),
    ) -> CoreResult<MergeOutput> {
        // Both are removed when they go out of scope, on every return path.
        let mut staging: Option<TempDir> = None;
        let resolved = self.resolve_inputs(request, &mut staging)?;

        let entries = resolved
            .iter()
            .map(|p| {
                p.to_str()
                    .map(str::to_string)
                    .ok_or_else(|| CoreError::InvalidManifestEntry(p.to_string_lossy().into_owned()))
            })
            .collect::<CoreResult<Vec<_>>>()?;
        let list_file = Manifest::build(&entries)?.write_temp(&self.temp_base)?;

        let output_path = match request.output {
            OutputTarget::File(path) => path.clone(),
            OutputTarget::Memory { .. } => self
                .staging_dir(&mut staging)?
                .join(format!("output.{}", request.output.extension())),
        };

        let duration = self.probe_total_duration(&resolved);

        let args = request.command.to_args(
            &list_file.path().to_string_lossy(),
            &output_path.to_string_lossy(),
        );
        log::debug!("Running: {} {}", self.ffmpeg_binary.display(), args.join(" "));

        let mut cmd = FfmpegCommand::new_with_path(&self.ffmpeg_binary);
        cmd.args(&args);

        let mut process = self.spawner.spawn(cmd)?;
        let mut handler = FfmpegProgressHandler::new(duration, self.diagnostic_tail_lines);
        let events = process.handle_events(|event| {
            handler.handle_event(event, &mut *on_progress);
            Ok(())
        });
        let status = process.wait()?;
        events?;

        if !status.success() {
            log::error!("ffmpeg exited unsuccessfully: {status}");
            return Err(command_failed_error(
                self.name(),
                status,
                handler.diagnostic_tail(),
            ));
        }

        match request.output {
            OutputTarget::File(_) => Ok(MergeOutput::File(output_path)),
            OutputTarget::Memory { .. } => std::fs::read(&output_path)
                .map(MergeOutput::Bytes)
                .map_err(|e| CoreError::OutputRead {
                    target: output_path.display().to_string(),
                    reason: e.to_string(),
                }),
        }
    }
}

fn canonical_input(path: &Path) -> CoreResult<PathBuf> {
    match std::fs::canonicalize(path) {
        Ok(canonical) if canonical.is_file() => Ok(canonical),
        Ok(_) => Err(CoreError::MissingFile(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(CoreError::MissingFile(path.to_path_buf()))
        }
        Err(e) => Err(CoreError::Io(e)),
    }
}
