//! Duration probing through ffprobe.
//!
//! The subprocess engine only sees ffmpeg's running time stamp, so it needs
//! the total length of all inputs to turn that into a percentage. This
//! module provides that total through the `ffprobe` crate.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Trait for querying media durations, so tests can supply fixed values.
pub trait FfprobeExecutor {
    /// Returns the container duration of `input_path` in seconds.
    fn get_duration(&self, input_path: &Path) -> CoreResult<f64>;

    /// Sums the durations of every input. Fails on the first input that
    /// cannot be probed.
    fn total_duration(&self, inputs: &[&Path]) -> CoreResult<f64> {
        inputs
            .iter()
            .try_fold(0.0, |total, path| Ok(total + self.get_duration(path)?))
    }
}

/// Concrete implementation of `FfprobeExecutor` backed by the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn get_duration(&self, input_path: &Path) -> CoreResult<f64> {
        log::debug!("Running ffprobe for duration on: {}", input_path.display());
        let metadata = ffprobe(input_path).map_err(map_ffprobe_error)?;

        metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| CoreError::EngineInvocation {
                engine: "ffprobe".to_string(),
                message: format!("no usable duration for {}", input_path.display()),
                diagnostics: Vec::new(),
            })
    }
}

fn map_ffprobe_error(err: FfProbeError) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error("ffprobe", io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let diagnostics = stderr.lines().map(str::to_string).collect();
            command_failed_error("ffprobe", output.status, diagnostics)
        }
        other => CoreError::EngineInvocation {
            engine: "ffprobe".to_string(),
            message: format!("unreadable output: {other}"),
            diagnostics: Vec::new(),
        },
    }
}
