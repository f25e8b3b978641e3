//! Structured merge events.
//!
//! The orchestrator describes what it is doing through `Event`s. Front-ends
//! register `EventHandler`s on an `EventDispatcher` to render them, for
//! example as a progress bar or as JSON lines for another program.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub mod json_handler;

pub use json_handler::JsonProgressHandler;

#[derive(Debug, Clone)]
pub enum Event {
    /// Directory discovery finished
    FilesDiscovered {
        directory: PathBuf,
        files: Vec<String>,
    },

    /// The engine is about to be invoked
    MergeStarted {
        engine: String,
        file_count: usize,
        output: String,
    },

    MergeProgress {
        percent: f64,
    },

    MergeCompleted {
        output: String,
        file_count: usize,
        output_size: u64,
        elapsed: Duration,
    },

    MergeFailed {
        phase: String,
        message: String,
    },
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event);
}

#[derive(Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn emit(&self, event: Event) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
