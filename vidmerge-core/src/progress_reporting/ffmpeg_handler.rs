//! `FFmpeg` event handler
//!
//! Routes ffmpeg's diagnostic output to the `log` facade under the `ffmpeg`
//! target, keeps the most recent lines for error reports, and turns the
//! `time=` progress lines into percentages when the total duration is known.

use crate::utils::parse_ffmpeg_time;
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress, LogLevel as FfmpegLogLevel};
use std::collections::VecDeque;

/// Log target for ffmpeg's own output.
pub const FFMPEG_LOG_TARGET: &str = "ffmpeg";

/// Handler for `FFmpeg` events
pub struct FfmpegProgressHandler {
    duration: Option<f64>,
    last_percent: Option<f64>,
    tail: VecDeque<String>,
    tail_capacity: usize,
}

impl FfmpegProgressHandler {
    /// Creates a handler. `duration` is the summed input length in seconds,
    /// or `None` when progress cannot be derived.
    #[must_use]
    pub fn new(duration: Option<f64>, tail_capacity: usize) -> Self {
        Self {
            duration: duration.filter(|d| *d > 0.0),
            last_percent: None,
            tail: VecDeque::with_capacity(tail_capacity),
            tail_capacity: tail_capacity.max(1),
        }
    }

    /// Handles an `FFmpeg` event, calling `on_progress` for new percentages.
    pub fn handle_event(&mut self, event: FfmpegEvent, on_progress: &mut dyn FnMut(f64)) {
        match event {
            FfmpegEvent::Progress(progress) => self.handle_progress(&progress, on_progress),
            FfmpegEvent::Log(level, message) => self.handle_log(&level, message),
            FfmpegEvent::Error(error) => {
                log::error!(target: FFMPEG_LOG_TARGET, "{error}");
                self.push_tail(error);
            }
            _ => {}
        }
    }

    /// The most recent diagnostic lines, oldest first.
    #[must_use]
    pub fn diagnostic_tail(&self) -> Vec<String> {
        self.tail.iter().cloned().collect()
    }

    fn handle_progress(&mut self, progress: &FfmpegProgress, on_progress: &mut dyn FnMut(f64)) {
        let Some(total) = self.duration else {
            return;
        };
        let Some(current) = parse_ffmpeg_time(&progress.time) else {
            return;
        };
        let percent = (current / total * 100.0).clamp(0.0, 100.0);

        // Never report a value below one already reported.
        if self.last_percent.is_some_and(|last| percent < last) {
            log::trace!("Dropping backward progress {percent:.1}%");
            return;
        }
        self.last_percent = Some(percent);
        on_progress(percent);
    }

    fn handle_log(&mut self, level: &FfmpegLogLevel, message: String) {
        let log_level = map_ffmpeg_log_level(level);
        log::log!(target: FFMPEG_LOG_TARGET, log_level, "{message}");
        self.push_tail(message);
    }

    fn push_tail(&mut self, line: String) {
        if self.tail.len() == self.tail_capacity {
            self.tail.pop_front();
        }
        self.tail.push_back(line);
    }
}

/// Maps `FFmpeg` log level to Rust log level
fn map_ffmpeg_log_level(level: &FfmpegLogLevel) -> log::Level {
    match level {
        FfmpegLogLevel::Fatal | FfmpegLogLevel::Error => log::Level::Error,
        FfmpegLogLevel::Warning => log::Level::Warn,
        FfmpegLogLevel::Info => log::Level::Info,
        _ => log::Level::Debug,
    }
}
