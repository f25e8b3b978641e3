// ============================================================================
// vidmerge-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and File Log Dispatch
//
// Logs go to stderr so stdout stays free for listings and JSON events. When
// a log directory is given, a plain-text copy of every record at debug level
// is also written to `vidmerge_run_<timestamp>.log` there.

use crate::error::{CliErrorContext, CliResult};

use log::LevelFilter;
use owo_colors::OwoColorize;

use std::fs;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of the log file for a run started now.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("vidmerge_run_{}.log", get_timestamp()))
}

fn colored_level(level: log::Level) -> String {
    match level {
        log::Level::Error => "ERROR".bright_red().to_string(),
        log::Level::Warn => "WARN ".yellow().to_string(),
        log::Level::Info => "INFO ".green().to_string(),
        log::Level::Debug => "DEBUG".blue().to_string(),
        log::Level::Trace => "TRACE".magenta().to_string(),
    }
}

/// Installs the global logger.
///
/// Returns the log file path when one was created.
pub fn init(verbose: bool, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let console_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let console = fern::Dispatch::new()
        .level(console_level)
        .format(move |out, message, record| {
            if verbose {
                out.finish(format_args!(
                    "{} [{}] {}",
                    colored_level(record.level()),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!("{} {}", colored_level(record.level()), message))
            }
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new().chain(console);

    let log_path = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .cli_context(format!("Failed to create log directory '{}'", dir.display()))?;
            let path = log_file_path(dir);
            let file = fern::log_file(&path)
                .cli_context(format!("Failed to create log file '{}'", path.display()))?;
            dispatch = dispatch.chain(
                fern::Dispatch::new()
                    .level(LevelFilter::Debug)
                    .format(|out, message, record| {
                        out.finish(format_args!(
                            "{} {:<5} [{}] {}",
                            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                            record.level(),
                            record.target(),
                            message
                        ))
                    })
                    .chain(file),
            );
            Some(path)
        }
        None => None,
    };

    dispatch
        .apply()
        .cli_context("Failed to initialize logging")?;
    Ok(log_path)
}
