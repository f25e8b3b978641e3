// ============================================================================
// vidmerge-cli/src/cli.rs
// ============================================================================
//
// COMMAND-LINE INTERFACE: Argument Definitions and Parsing
//
// This module defines the command-line interface for the vidmerge binary
// using the clap crate. It holds the main CLI structure, the subcommands and
// their arguments.
//
// KEY COMPONENTS:
// - Cli: Main CLI structure with global options
// - Commands: Enum of available subcommands (merge, list)
// - MergeArgs / ListArgs: Arguments for each subcommand

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

// ============================================================================
// MAIN CLI STRUCTURE
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "vidmerge: naturally ordered video concatenation",
    long_about = "Finds the video files in a directory, orders them naturally \
                  (clip2 before clip10) and concatenates them with ffmpeg."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output for troubleshooting
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Concatenates every video file in a directory into one output file
    Merge(MergeArgs),

    /// Prints the video files in a directory in merge order
    List(ListArgs),
}

// ============================================================================
// SUBCOMMAND ARGUMENTS
// ============================================================================

/// How the merged streams are written.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CodecChoice {
    /// Copy streams without re-encoding (inputs must share codecs)
    Copy,
    /// Re-encode to H.264 video and AAC audio
    Reencode,
}

#[derive(Parser, Debug)]
pub struct MergeArgs {
    /// Directory containing the video files to merge
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Path of the merged output file
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: PathBuf,

    /// Replace the output file if it already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Codec handling (defaults to re-encoding)
    #[arg(long, value_enum, value_name = "MODE")]
    pub codec: Option<CodecChoice>,

    /// ffmpeg binary to run (defaults to ./ffmpeg, then ffmpeg on PATH)
    #[arg(long = "ffmpeg", env = "VIDMERGE_FFMPEG", value_name = "PATH")]
    pub ffmpeg_path: Option<PathBuf>,

    /// Directory for the temporary concat manifest
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Extension to include, repeatable (defaults to common video formats)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Skip probing input durations (disables progress percentages)
    #[arg(long)]
    pub no_probe: bool,

    /// Emit merge events as JSON lines on stdout
    #[arg(long)]
    pub json: bool,

    /// Also write a log file into this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Directory to scan
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Extension to include, repeatable (defaults to common video formats)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_merge_with_defaults() {
        let cli = Cli::parse_from(["vidmerge", "merge", "--dir", "/clips", "--output", "out.mp4"]);
        let Commands::Merge(args) = cli.command else {
            panic!("expected merge");
        };
        assert_eq!(args.input_dir, PathBuf::from("/clips"));
        assert_eq!(args.output, PathBuf::from("out.mp4"));
        assert!(!args.overwrite);
        assert!(args.codec.is_none());
        assert!(args.extensions.is_empty());
        assert!(!args.json);
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_merge_with_options() {
        let cli = Cli::parse_from([
            "vidmerge", "-v", "merge", "-d", "clips", "-o", "out.mkv", "--overwrite", "--codec",
            "copy", "--ext", "mkv", "--ext", "webm", "--no-probe", "--json",
        ]);
        let Commands::Merge(args) = cli.command else {
            panic!("expected merge");
        };
        assert!(cli.verbose);
        assert!(args.overwrite);
        assert_eq!(args.codec, Some(CodecChoice::Copy));
        assert_eq!(args.extensions, vec!["mkv", "webm"]);
        assert!(args.no_probe);
        assert!(args.json);
    }

    #[test]
    fn merge_requires_output() {
        let result = Cli::try_parse_from(["vidmerge", "merge", "--dir", "clips"]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_codec_is_rejected() {
        let result = Cli::try_parse_from([
            "vidmerge", "merge", "--dir", "clips", "--output", "o.mp4", "--codec", "av1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_list() {
        let cli = Cli::parse_from(["vidmerge", "list", "--dir", "clips"]);
        assert!(matches!(cli.command, Commands::List(ref args) if args.input_dir == PathBuf::from("clips")));
    }
}
