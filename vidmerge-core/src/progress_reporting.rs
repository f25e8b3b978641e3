//! Progress reporting API.
//!
//! Engines report progress as percentages in `[0, 100]`. The orchestrator
//! forwards each value to a `ProgressSink` as soon as it arrives, with no
//! smoothing or rate limiting. Presentation (bars, JSON lines) lives with
//! the caller.

pub mod ffmpeg_handler;

pub use ffmpeg_handler::FfmpegProgressHandler;

/// Receives merge progress as a percentage in `[0, 100]`.
pub trait ProgressSink {
    fn report(&mut self, percent: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn report(&mut self, percent: f64) {
        self(percent)
    }
}

/// Sink that discards every value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: f64) {}
}

/// Converts an engine ratio in `[0, 1]` to a percentage in `[0, 100]`.
///
/// Ratios outside the range are clamped. `NaN` yields `None` since it
/// carries no position at all.
pub fn ratio_to_percent(ratio: f64) -> Option<f64> {
    if ratio.is_nan() {
        None
    } else {
        Some((ratio * 100.0).clamp(0.0, 100.0))
    }
}
