// ============================================================================
// vidmerge-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error Types and Utilities for the CLI
//
// The CLI reports every failure through vidmerge-core's `CoreError`, adding
// context for the few operations it performs itself (log setup, writing to
// the terminal).

use vidmerge_core::{CoreError, CoreResult};

use std::fmt;
use std::io;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Extension trait for adding context to errors raised in the CLI.
pub trait CliErrorContext<T> {
    /// Wraps the error in an IO error prefixed with `context`.
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: fmt::Display,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| CoreError::Io(io::Error::other(format!("{context}: {e}"))))
    }
}
