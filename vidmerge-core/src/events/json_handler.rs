//! JSON progress handler for structured progress output
//!
//! This module provides a JSON-based event handler that writes one JSON
//! object per line, for consumption by scripts and other front-ends.

use super::{Event, EventHandler};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Event handler that outputs merge events as structured JSON to stdout
pub struct JsonProgressHandler {
    output: Mutex<Box<dyn Write + Send>>,
}

impl JsonProgressHandler {
    /// Create a new JSON progress handler that writes to stdout
    pub fn new() -> Self {
        Self {
            output: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a new JSON progress handler with a custom writer
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(writer),
        }
    }

    /// Get current timestamp as seconds since Unix epoch
    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    /// Write a JSON event to the output
    fn write_json(&self, value: serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            if let Ok(json_str) = serde_json::to_string(&value) {
                let _ = writeln!(output, "{json_str}");
                let _ = output.flush();
            }
        }
    }
}

impl Default for JsonProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for JsonProgressHandler {
    fn handle(&self, event: &Event) {
        let timestamp = Self::get_timestamp();

        let value = match event {
            Event::FilesDiscovered { directory, files } => json!({
                "type": "files_discovered",
                "directory": directory.display().to_string(),
                "files": files,
                "timestamp": timestamp
            }),

            Event::MergeStarted {
                engine,
                file_count,
                output,
            } => json!({
                "type": "merge_started",
                "engine": engine,
                "file_count": file_count,
                "output": output,
                "timestamp": timestamp
            }),

            Event::MergeProgress { percent } => json!({
                "type": "merge_progress",
                "percent": percent,
                "timestamp": timestamp
            }),

            Event::MergeCompleted {
                output,
                file_count,
                output_size,
                elapsed,
            } => json!({
                "type": "merge_completed",
                "output": output,
                "file_count": file_count,
                "output_size": output_size,
                "elapsed_seconds": elapsed.as_secs_f64(),
                "timestamp": timestamp
            }),

            Event::MergeFailed { phase, message } => json!({
                "type": "merge_failed",
                "phase": phase,
                "message": message,
                "timestamp": timestamp
            }),
        };
        self.write_json(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn one_json_object_per_event() {
        let buffer = SharedBuffer::default();
        let handler = JsonProgressHandler::with_writer(Box::new(buffer.clone()));

        handler.handle(&Event::MergeProgress { percent: 50.0 });
        handler.handle(&Event::MergeFailed {
            phase: "discovery".into(),
            message: "No video files found".into(),
        });

        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "merge_progress");
        assert_eq!(lines[0]["percent"], 50.0);
        assert_eq!(lines[1]["type"], "merge_failed");
        assert_eq!(lines[1]["phase"], "discovery");
    }
}
