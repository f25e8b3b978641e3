//! Implementation of the 'merge' subcommand.
//!
//! Builds a `MergeConfig` from the arguments, runs the subprocess engine
//! over the input directory and prints the files found and a summary.

use crate::cli::{CodecChoice, MergeArgs};
use crate::error::CliResult;
use crate::terminal::{self, MergeProgressBar, TerminalEventHandler};

use vidmerge_core::events::JsonProgressHandler;
use vidmerge_core::{
    format_bytes, format_duration, CodecPolicy, MergeConfig, MergeConfigBuilder, MergeOutcome,
    Merger, OutputTarget, ProgressSink, SubprocessEngine,
};

use log::debug;
use std::sync::Arc;

/// Translates the merge arguments into a core configuration.
pub fn build_config(args: &MergeArgs) -> MergeConfig {
    let mut builder = MergeConfigBuilder::new()
        .overwrite(args.overwrite)
        .probe_durations(!args.no_probe);

    if let Some(path) = &args.ffmpeg_path {
        builder = builder.ffmpeg_path(path.clone());
    }
    if let Some(dir) = &args.temp_dir {
        builder = builder.temp_dir(dir.clone());
    }
    if !args.extensions.is_empty() {
        builder = builder.extensions(
            args.extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string()),
        );
    }
    if let Some(codec) = args.codec {
        builder = builder.codec_policy(match codec {
            CodecChoice::Copy => CodecPolicy::StreamCopy,
            CodecChoice::Reencode => CodecPolicy::reencode_default(),
        });
    }
    builder.build()
}

pub fn run_merge(args: MergeArgs) -> CliResult<MergeOutcome> {
    let config = build_config(&args);
    debug!("Merge configuration: {config:?}");

    let engine = SubprocessEngine::new(&config)?;
    let mut merger = Merger::new(engine, config)?;
    if args.json {
        merger = merger.with_event_handler(Arc::new(JsonProgressHandler::new()));
    } else {
        terminal::print_section("Merge");
        terminal::print_status("Input", args.input_dir.display());
        terminal::print_status("Output", args.output.display());
        terminal::print_status("Codec", describe_codec(&merger.command().codec));
        debug!("Using ffmpeg at {}", merger.engine().ffmpeg_binary().display());
        merger = merger.with_event_handler(Arc::new(TerminalEventHandler));
    }

    let mut bar = MergeProgressBar::new(!args.json);
    let result = merger.merge_directory(
        &args.input_dir,
        OutputTarget::File(args.output.clone()),
        |percent: f64| bar.report(percent),
    );
    bar.finish();
    let outcome = result?;

    if !args.json {
        terminal::print_section("Summary");
        terminal::print_status("Files", outcome.file_count);
        terminal::print_status("Size", format_bytes(outcome.output_size));
        terminal::print_status("Time", format_duration(outcome.elapsed));
        terminal::print_success(&format!("Merged into {}", args.output.display()));
    }
    Ok(outcome)
}

fn describe_codec(policy: &CodecPolicy) -> String {
    match policy {
        CodecPolicy::StreamCopy => "stream copy".to_string(),
        CodecPolicy::Reencode { video, audio } => format!("re-encode ({video} / {audio})"),
    }
}
