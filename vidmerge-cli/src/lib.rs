// vidmerge-cli/src/lib.rs
//
// Library portion of the vidmerge CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, CodecChoice, Commands, ListArgs, MergeArgs};
pub use commands::list::run_list;
pub use commands::merge::run_merge;
