// ============================================================================
// vidmerge-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: Styled Status Lines and the Merge Progress Bar
//
// Status lines go to stderr through plain `eprintln!`; the progress bar is an
// indicatif bar that is hidden automatically when stderr is not a terminal.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use vidmerge_core::events::{Event, EventHandler};
use vidmerge_core::ProgressSink;

use std::fmt::Display;
use std::io::IsTerminal;
use std::time::Duration;

/// Styling constants for terminal output
pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const PROGRESS_SYMBOL: &str = "⧖";
    pub const ERROR_SYMBOL: &str = "✗";
    pub const STATUS_INDENT: &str = "  ";
}

/// Print a section heading
pub fn print_section(title: &str) {
    eprintln!("\n{}", format!("===== {title} =====").bold().cyan());
}

/// Print an aligned `label: value` line
pub fn print_status<T: Display>(label: &str, value: T) {
    eprintln!(
        "{}{:<12} {}",
        styling::STATUS_INDENT,
        format!("{label}:").bright_white(),
        value
    );
}

pub fn print_success(message: &str) {
    eprintln!("{} {}", styling::SUCCESS_SYMBOL.green().bold(), message.green());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", styling::ERROR_SYMBOL.bright_red().bold(), message.bright_red());
}

/// Lines announcing the discovered files, in merge order.
pub fn discovered_lines(files: &[String]) -> Vec<String> {
    let noun = if files.len() == 1 { "file" } else { "files" };
    let mut lines = vec![format!("Found {} video {noun} to merge:", files.len())];
    lines.extend(
        files
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}{:>3}. {name}", styling::STATUS_INDENT, i + 1)),
    );
    lines
}

/// Prints merge events that matter to someone watching the terminal.
pub struct TerminalEventHandler;

impl EventHandler for TerminalEventHandler {
    fn handle(&self, event: &Event) {
        if let Event::FilesDiscovered { files, .. } = event {
            for line in discovered_lines(files) {
                eprintln!("{line}");
            }
        }
    }
}

/// Progress bar over the 0-100 merge percentage.
pub struct MergeProgressBar {
    bar: ProgressBar,
}

impl MergeProgressBar {
    /// Creates a bar drawn on stderr, or a hidden one when `visible` is false
    /// or stderr is not a terminal.
    pub fn new(visible: bool) -> Self {
        let bar = ProgressBar::new(1000);
        let template = format!(
            "{}{} Merging: {{percent:>3}}% [{{bar:30}}] ({{elapsed_precise}})",
            styling::STATUS_INDENT,
            styling::PROGRESS_SYMBOL
        );
        let style = ProgressStyle::default_bar()
            .template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##.");
        bar.set_style(style);

        if visible && std::io::stderr().is_terminal() {
            bar.enable_steady_tick(Duration::from_millis(100));
        } else {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self { bar }
    }

    /// Current position in tenths of a percent.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for MergeProgressBar {
    fn report(&mut self, percent: f64) {
        let position = (percent.clamp(0.0, 100.0) * 10.0).round() as u64;
        self.bar.set_position(position);
    }
}

impl Drop for MergeProgressBar {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
