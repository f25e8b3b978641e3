// ============================================================================
// vidmerge-cli/src/main.rs
// ============================================================================
//
// MAIN ENTRY POINT: vidmerge Command-Line Application
//
// Parses the command line, sets up logging and dispatches to the requested
// subcommand. Any error is printed in red on stderr and the process exits
// with status 1.

use clap::Parser;
use vidmerge_cli::logging;
use vidmerge_cli::terminal;
use vidmerge_cli::{run_list, run_merge, Cli, Commands};
use vidmerge_core::CoreResult;

use std::process;

fn run(cli: Cli) -> CoreResult<()> {
    let log_dir = match &cli.command {
        Commands::Merge(args) => args.log_dir.clone(),
        Commands::List(_) => None,
    };
    if let Some(path) = logging::init(cli.verbose, log_dir.as_deref())? {
        log::debug!("Writing log file to {}", path.display());
    }

    match cli.command {
        Commands::Merge(args) => run_merge(args).map(|_| ()),
        Commands::List(args) => run_list(args, &mut std::io::stdout().lock()),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        log::debug!("Failed during {}", e.phase());
        terminal::print_error(&format!("Error: {e}"));
        process::exit(1);
    }
}
