// ============================================================================
// vidmerge-core/src/merge.rs
// ============================================================================
//
// MERGE ORCHESTRATION: From Unordered Inputs to One Output
//
// A `Merger` binds one engine adapter and a configuration. Each call to
// `merge` creates a single-use `MergeJob` that walks the state machine
//
//   Idle -> ManifestBuilding -> EngineInvoked -> Succeeded | Failed
//
// sorting the inputs naturally, building the concat manifest, invoking the
// engine, forwarding every progress value to the caller's sink as it
// arrives, and verifying the produced artifact.
//
// `start` runs the same merge on a background thread and returns a
// `PendingMerge` handle right away; progress reaches the handle through a
// channel in the order it was emitted.

use crate::config::{self, MergeConfig};
use crate::discovery;
use crate::error::{CoreError, CoreResult};
use crate::events::{Event, EventDispatcher, EventHandler};
use crate::external::{
    ConcatCommand, EngineAdapter, EngineRequest, MergeInput, MergeOutput, OutputTarget,
};
use crate::manifest::Manifest;
use crate::natural;
use crate::progress_reporting::{NoProgress, ProgressSink};

use std::fmt;
use std::path::Path;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

/// Lifecycle of a single merge job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    Idle,
    ManifestBuilding,
    EngineInvoked,
    Succeeded,
    Failed,
}

impl MergeState {
    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_advance_to(self, next: MergeState) -> bool {
        use MergeState::*;
        matches!(
            (self, next),
            (Idle, ManifestBuilding)
                | (ManifestBuilding, EngineInvoked)
                | (EngineInvoked, Succeeded)
                | (Idle | ManifestBuilding | EngineInvoked, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MergeState::Succeeded | MergeState::Failed)
    }
}

impl fmt::Display for MergeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergeState::Idle => "idle",
            MergeState::ManifestBuilding => "building manifest",
            MergeState::EngineInvoked => "engine invoked",
            MergeState::Succeeded => "succeeded",
            MergeState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of a successful merge.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub output: MergeOutput,
    pub file_count: usize,
    pub output_size: u64,
    pub elapsed: Duration,
}

/// One merge, from sorted inputs to a verified artifact. Consumed by `run`.
#[derive(Debug)]
pub struct MergeJob {
    inputs: Vec<MergeInput>,
    output: OutputTarget,
    state: MergeState,
}

impl MergeJob {
    /// Creates a job, ordering `inputs` by the natural comparator on their
    /// names. The sort is stable, so equal names keep their given order.
    pub fn new(mut inputs: Vec<MergeInput>, output: OutputTarget) -> Self {
        inputs.sort_by(|a, b| natural::compare(&a.name, &b.name));
        Self {
            inputs,
            output,
            state: MergeState::Idle,
        }
    }

    /// Inputs in concatenation order.
    pub fn inputs(&self) -> &[MergeInput] {
        &self.inputs
    }

    pub fn state(&self) -> MergeState {
        self.state
    }

    fn advance(&mut self, next: MergeState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid merge transition {} -> {}",
            self.state,
            next
        );
        log::debug!("Merge job: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Runs the job against `engine`, forwarding progress to `sink`.
    pub fn run<E: EngineAdapter + ?Sized>(
        mut self,
        engine: &E,
        command: &ConcatCommand,
        sink: &mut dyn ProgressSink,
        events: &EventDispatcher,
    ) -> CoreResult<MergeOutcome> {
        let started = Instant::now();
        match self.execute(engine, command, sink, events, started) {
            Ok(outcome) => {
                self.advance(MergeState::Succeeded);
                Ok(outcome)
            }
            Err(e) => {
                self.advance(MergeState::Failed);
                log::error!("Merge failed during {}: {e}", e.phase());
                Err(e)
            }
        }
    }

    fn execute<E: EngineAdapter + ?Sized>(
        &mut self,
        engine: &E,
        command: &ConcatCommand,
        sink: &mut dyn ProgressSink,
        events: &EventDispatcher,
        started: Instant,
    ) -> CoreResult<MergeOutcome> {
        self.advance(MergeState::ManifestBuilding);
        if self.inputs.is_empty() {
            return Err(CoreError::EmptyInput);
        }
        // The same file twice is an error; different files sharing a name
        // are not. Adapters place inputs under names of their own.
        let sources: Vec<String> = self.inputs.iter().map(MergeInput::source_identity).collect();
        let manifest = Manifest::build(&sources)?;
        log::debug!("Merge order:\n{}", manifest.render());

        self.advance(MergeState::EngineInvoked);
        log::info!(
            "Merging {} file(s) with {} into {}",
            self.inputs.len(),
            engine.name(),
            describe_target(&self.output)
        );
        events.emit(Event::MergeStarted {
            engine: engine.name().to_string(),
            file_count: self.inputs.len(),
            output: describe_target(&self.output),
        });

        let request = EngineRequest {
            inputs: &self.inputs,
            output: &self.output,
            command,
        };
        let output = engine.invoke(&request, &mut |percent: f64| {
            sink.report(percent);
            events.emit(Event::MergeProgress { percent });
        })?;

        let output_size = verify_output(&output)?;
        let outcome = MergeOutcome {
            output,
            file_count: self.inputs.len(),
            output_size,
            elapsed: started.elapsed(),
        };
        log::info!(
            "Merged {} file(s), {} bytes in {:.2}s",
            outcome.file_count,
            outcome.output_size,
            outcome.elapsed.as_secs_f64()
        );
        Ok(outcome)
    }
}

fn describe_target(target: &OutputTarget) -> String {
    match target {
        OutputTarget::File(path) => path.display().to_string(),
        OutputTarget::Memory { extension } => format!("memory (.{extension})"),
    }
}

/// Checks that the engine produced a non-empty artifact and returns its size.
fn verify_output(output: &MergeOutput) -> CoreResult<u64> {
    let target = match output {
        MergeOutput::File(path) => path.display().to_string(),
        MergeOutput::Bytes(_) => "in-memory output".to_string(),
    };
    let size = output.size().map_err(|e| CoreError::OutputRead {
        target: target.clone(),
        reason: e.to_string(),
    })?;
    if size == 0 {
        return Err(CoreError::OutputRead {
            target,
            reason: "the engine produced an empty file".to_string(),
        });
    }
    Ok(size)
}

/// Merges inputs with one engine adapter chosen at construction.
pub struct Merger<E> {
    engine: Arc<E>,
    config: MergeConfig,
    events: Arc<EventDispatcher>,
}

impl<E> Clone for Merger<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            config: self.config.clone(),
            events: Arc::clone(&self.events),
        }
    }
}

impl<E: EngineAdapter> Merger<E> {
    /// Creates a merger after validating `config`.
    pub fn new(engine: E, config: MergeConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            engine: Arc::new(engine),
            config,
            events: Arc::new(EventDispatcher::new()),
        })
    }

    /// Registers a handler for merge events.
    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        Arc::make_mut(&mut self.events).add_handler(handler);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// The concat command this merger passes to its engine.
    pub fn command(&self) -> ConcatCommand {
        ConcatCommand {
            codec: self
                .config
                .codec_policy
                .clone()
                .unwrap_or_else(|| self.engine.default_codec_policy()),
            overwrite: self.config.overwrite,
        }
    }

    /// Merges `inputs` in natural order of their names into `output`.
    pub fn merge(
        &self,
        inputs: Vec<MergeInput>,
        output: OutputTarget,
        mut progress: impl ProgressSink,
    ) -> CoreResult<MergeOutcome> {
        let result = self.run_job(inputs, output, &mut progress);
        self.report(&result);
        result
    }

    /// Discovers the video files in `dir` and merges them into `output`.
    ///
    /// Fails with `NoMatchingFiles` before any engine call when the
    /// directory holds no matching files.
    pub fn merge_directory(
        &self,
        dir: &Path,
        output: OutputTarget,
        mut progress: impl ProgressSink,
    ) -> CoreResult<MergeOutcome> {
        let result = self
            .discover(dir, &output)
            .and_then(|inputs| self.run_job(inputs, output, &mut progress));
        self.report(&result);
        result
    }

    fn discover(&self, dir: &Path, output: &OutputTarget) -> CoreResult<Vec<MergeInput>> {
        let mut files =
            discovery::find_video_files_with_extensions(dir, &self.config.extensions)?;
        // A previous merge written into the input directory is not an input.
        if let OutputTarget::File(target) = output {
            let target = target.canonicalize().unwrap_or_else(|_| target.clone());
            files.retain(|f| f.canonicalize().map_or(true, |f| f != target));
        }
        if files.is_empty() {
            return Err(CoreError::NoMatchingFiles(dir.to_path_buf()));
        }
        self.events.emit(Event::FilesDiscovered {
            directory: dir.to_path_buf(),
            files: files
                .iter()
                .map(|f| f.file_name().unwrap_or_default().to_string_lossy().into_owned())
                .collect(),
        });
        Ok(files.into_iter().map(MergeInput::from_path).collect())
    }

    fn run_job(
        &self,
        inputs: Vec<MergeInput>,
        output: OutputTarget,
        progress: &mut dyn ProgressSink,
    ) -> CoreResult<MergeOutcome> {
        if let OutputTarget::File(path) = &output {
            config::validate_output(path, self.config.overwrite)?;
        }
        MergeJob::new(inputs, output).run(
            self.engine.as_ref(),
            &self.command(),
            progress,
            &self.events,
        )
    }

    fn report(&self, result: &CoreResult<MergeOutcome>) {
        let event = match result {
            Ok(outcome) => Event::MergeCompleted {
                output: match &outcome.output {
                    MergeOutput::File(path) => path.display().to_string(),
                    MergeOutput::Bytes(_) => "memory".to_string(),
                },
                file_count: outcome.file_count,
                output_size: outcome.output_size,
                elapsed: outcome.elapsed,
            },
            Err(e) => Event::MergeFailed {
                phase: e.phase().to_string(),
                message: e.to_string(),
            },
        };
        self.events.emit(event);
    }
}

impl<E: EngineAdapter + Send + Sync + 'static> Merger<E> {
    /// Starts the merge on a background thread and returns immediately.
    pub fn start(&self, inputs: Vec<MergeInput>, output: OutputTarget) -> PendingMerge {
        let (tx, rx) = mpsc::channel();
        let merger = self.clone();
        let handle = thread::spawn(move || {
            merger.merge(inputs, output, move |percent: f64| {
                let _ = tx.send(percent);
            })
        });
        PendingMerge {
            progress: rx,
            handle,
        }
    }
}

/// Handle to a merge running on a background thread.
pub struct PendingMerge {
    progress: mpsc::Receiver<f64>,
    handle: thread::JoinHandle<CoreResult<MergeOutcome>>,
}

impl PendingMerge {
    /// Relays progress to `sink` in emission order until the merge ends,
    /// then returns its result.
    pub fn wait_with_progress(self, mut sink: impl ProgressSink) -> CoreResult<MergeOutcome> {
        for percent in self.progress.iter() {
            sink.report(percent);
        }
        self.handle.join().unwrap_or_else(|_| {
            Err(CoreError::EngineInvocation {
                engine: "merge".to_string(),
                message: "the merge thread panicked".to_string(),
                diagnostics: Vec::new(),
            })
        })
    }

    /// Waits for the result, discarding progress.
    pub fn wait(self) -> CoreResult<MergeOutcome> {
        self.wait_with_progress(NoProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MemoryEngine, MockFfmpegSpawner, MockFfprobeExecutor};
    use crate::external::{BridgedEngine, CodecPolicy, SharedEngine, SubprocessEngine};
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Engine that counts calls and returns a fixed artifact.
    #[derive(Default)]
    struct CountingEngine {
        calls: AtomicUsize,
        orders: Mutex<Vec<Vec<String>>>,
    }

    impl EngineAdapter for CountingEngine {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn default_codec_policy(&self) -> CodecPolicy {
            CodecPolicy::StreamCopy
        }

        fn invoke(
            &self,
            request: &EngineRequest<'_>,
            _on_progress: &mut dyn FnMut(f64),
        ) -> CoreResult<MergeOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.orders
                .lock()
                .unwrap()
                .push(request.inputs.iter().map(|i| i.name.clone()).collect());
            Ok(MergeOutput::Bytes(b"ok".to_vec()))
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Event>>);

    impl EventHandler for Recorder {
        fn handle(&self, event: &Event) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn memory() -> OutputTarget {
        OutputTarget::Memory {
            extension: "mp4".into(),
        }
    }

    fn bytes_inputs(names: &[&str]) -> Vec<MergeInput> {
        names
            .iter()
            .map(|n| MergeInput::from_bytes(*n, n.as_bytes().to_vec()))
            .collect()
    }

    fn write_clips(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), b"clip").unwrap();
        }
    }

    /// The list file argument that follows `-i`.
    fn list_arg(args: &[String]) -> &str {
        let index = args.iter().position(|a| a == "-i").unwrap();
        &args[index + 1]
    }

    fn subprocess_config(dir: &Path) -> MergeConfig {
        MergeConfig {
            temp_dir: Some(dir.join("tmp")),
            ffmpeg_path: Some(PathBuf::from("ffmpeg")),
            probe_durations: false,
            ..Default::default()
        }
    }

    #[test]
    fn state_machine_transitions() {
        use MergeState::*;
        assert!(Idle.can_advance_to(ManifestBuilding));
        assert!(ManifestBuilding.can_advance_to(EngineInvoked));
        assert!(EngineInvoked.can_advance_to(Succeeded));
        assert!(EngineInvoked.can_advance_to(Failed));
        assert!(!Idle.can_advance_to(EngineInvoked));
        assert!(!Succeeded.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Idle));
        assert!(Succeeded.is_terminal() && Failed.is_terminal());
    }

    #[test]
    fn jobs_sort_inputs_naturally() {
        let job = MergeJob::new(bytes_inputs(&["b2.mp4", "a10.mp4", "a1.mp4"]), memory());
        let names: Vec<&str> = job.inputs().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a1.mp4", "a10.mp4", "b2.mp4"]);
        assert_eq!(job.state(), MergeState::Idle);
    }

    #[test]
    fn engine_receives_natural_order() {
        let merger = Merger::new(CountingEngine::default(), MergeConfig::default()).unwrap();
        let outcome = merger
            .merge(bytes_inputs(&["clip10.mp4", "clip2.mp4", "clip1.mp4"]), memory(), NoProgress)
            .unwrap();

        assert_eq!(outcome.file_count, 3);
        assert_eq!(outcome.output_size, 2);
        assert_eq!(
            merger.engine().orders.lock().unwrap()[0],
            vec!["clip1.mp4", "clip2.mp4", "clip10.mp4"]
        );
    }

    #[test]
    fn empty_input_never_reaches_the_engine() {
        let merger = Merger::new(CountingEngine::default(), MergeConfig::default()).unwrap();
        let err = merger.merge(Vec::new(), memory(), NoProgress).unwrap_err();
        assert!(matches!(err, CoreError::EmptyInput));
        assert_eq!(merger.engine().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_directory_is_no_matching_files_without_engine_call() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("a.b.mp4"), b"x").unwrap();

        let merger = Merger::new(CountingEngine::default(), MergeConfig::default()).unwrap();
        let err = merger
            .merge_directory(dir.path(), memory(), NoProgress)
            .unwrap_err();
        assert!(matches!(err, CoreError::NoMatchingFiles(ref p) if p == dir.path()));
        assert_eq!(merger.engine().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn bridged_progress_is_forwarded_one_to_one() {
        let engine = Arc::new(MemoryEngine::new());
        engine.emit_progress(&[0.1, 0.5, 1.0]);
        let merger = Merger::new(
            BridgedEngine::new(Some(SharedEngine::new(engine.clone()))),
            MergeConfig::default(),
        )
        .unwrap();

        let mut seen = Vec::new();
        let outcome = merger
            .merge(bytes_inputs(&["b.mp4", "a.mp4"]), memory(), |p: f64| seen.push(p))
            .unwrap();

        assert_eq!(outcome.output, MergeOutput::Bytes(b"a.mp4b.mp4".to_vec()));
        assert_eq!(seen.len(), 3);
        for (got, want) in seen.iter().zip([10.0, 50.0, 100.0]) {
            assert!((got - want).abs() < 1e-9);
        }
        assert!(!engine.has_progress_callback());
        assert!(engine.file_names().is_empty());
    }

    #[test]
    fn bridged_default_is_stream_copy_unless_overridden() {
        let engine = Arc::new(MemoryEngine::new());
        let bridged = || BridgedEngine::new(Some(SharedEngine::new(engine.clone())));

        let merger = Merger::new(bridged(), MergeConfig::default()).unwrap();
        assert_eq!(merger.command().codec, CodecPolicy::StreamCopy);

        let config = MergeConfig {
            codec_policy: Some(CodecPolicy::reencode_default()),
            ..Default::default()
        };
        let merger = Merger::new(bridged(), config).unwrap();
        merger.merge(bytes_inputs(&["a.mp4"]), memory(), NoProgress).unwrap();
        assert!(engine.runs()[0].contains(&"libx264".to_string()));
    }

    #[test]
    fn manifest_is_removed_after_success() {
        let dir = tempfile::tempdir().unwrap();
        write_clips(dir.path(), &["b2.mp4", "a1.mp4", "a10.mp4"]);
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("concat", vec![], true);
        let config = subprocess_config(dir.path());
        let engine =
            SubprocessEngine::with_executors(spawner.clone(), MockFfprobeExecutor::new(), &config)
                .unwrap();
        let merger = Merger::new(engine, config).unwrap();

        let output = dir.path().join("out").join("merged.mp4");
        std::fs::create_dir_all(output.parent().unwrap()).unwrap();
        let outcome = merger
            .merge_directory(dir.path(), OutputTarget::File(output.clone()), NoProgress)
            .unwrap();
        assert_eq!(outcome.output, MergeOutput::File(output));
        assert_eq!(outcome.file_count, 3);

        let manifest = &spawner.get_received_manifests()[0];
        let order: Vec<&str> = manifest
            .lines()
            .map(|l| l.rsplit('/').next().unwrap().trim_end_matches('\''))
            .collect();
        assert_eq!(order, vec!["a1.mp4", "a10.mp4", "b2.mp4"]);

        let args = &spawner.get_received_calls()[0];
        assert!(list_arg(args).ends_with(".txt"));
        assert!(!Path::new(list_arg(args)).exists());
    }

    #[test]
    fn manifest_is_removed_after_engine_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_clips(dir.path(), &["a.mp4", "b.mp4"]);
        let spawner = MockFfmpegSpawner::new();
        spawner.add_exit_error_expectation("concat", vec![], 1);
        let config = subprocess_config(dir.path());
        let engine =
            SubprocessEngine::with_executors(spawner.clone(), MockFfprobeExecutor::new(), &config)
                .unwrap();
        let merger = Merger::new(engine, config).unwrap();

        let output = OutputTarget::File(dir.path().join("merged.mkv"));
        let err = merger
            .merge_directory(dir.path(), output, NoProgress)
            .unwrap_err();
        assert!(matches!(err, CoreError::EngineInvocation { .. }));
        assert_eq!(err.phase(), crate::error::MergePhase::Invocation);

        // The list existed while ffmpeg ran and is gone afterwards.
        assert_eq!(spawner.get_received_manifests().len(), 1);
        let args = &spawner.get_received_calls()[0];
        assert!(!Path::new(list_arg(args)).exists());
    }

    #[test]
    fn missing_output_after_success_is_a_readback_error() {
        let dir = tempfile::tempdir().unwrap();
        write_clips(dir.path(), &["a.mp4"]);
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("concat", vec![], false);
        let config = subprocess_config(dir.path());
        let engine =
            SubprocessEngine::with_executors(spawner, MockFfprobeExecutor::new(), &config).unwrap();
        let merger = Merger::new(engine, config).unwrap();

        let output = OutputTarget::File(dir.path().join("merged.mp4"));
        let err = merger.merge_directory(dir.path(), output, NoProgress).unwrap_err();
        assert!(matches!(err, CoreError::OutputRead { .. }));
    }

    #[test]
    fn same_named_files_from_different_directories_are_merged() {
        let dir = tempfile::tempdir().unwrap();
        let mut inputs = Vec::new();
        for sub in ["d1", "d2"] {
            let clip = dir.path().join(sub).join("clip1.mp4");
            std::fs::create_dir(clip.parent().unwrap()).unwrap();
            std::fs::write(&clip, b"clip").unwrap();
            inputs.push(MergeInput::from_path(clip));
        }

        let merger = Merger::new(CountingEngine::default(), MergeConfig::default()).unwrap();
        let outcome = merger.merge(inputs, memory(), NoProgress).unwrap();
        assert_eq!(outcome.file_count, 2);
        assert_eq!(merger.engine().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn the_same_file_twice_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_clips(dir.path(), &["a.mp4"]);
        let inputs = vec![
            MergeInput::from_path(dir.path().join("a.mp4")),
            MergeInput::from_path(dir.path().join(".").join("a.mp4")),
        ];

        let merger = Merger::new(CountingEngine::default(), MergeConfig::default()).unwrap();
        let err = merger.merge(inputs, memory(), NoProgress).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateManifestEntry(_)));
        assert_eq!(merger.engine().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn existing_output_needs_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("merged.mp4");
        std::fs::write(&existing, b"old").unwrap();

        let merger = Merger::new(CountingEngine::default(), MergeConfig::default()).unwrap();
        let err = merger
            .merge(bytes_inputs(&["a.mp4"]), OutputTarget::File(existing), NoProgress)
            .unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        assert_eq!(merger.engine().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn previous_output_in_input_directory_is_not_an_input() {
        let dir = tempfile::tempdir().unwrap();
        write_clips(dir.path(), &["a.mp4", "b.mp4", "merged.mp4"]);
        let config = MergeConfig {
            overwrite: true,
            ..Default::default()
        };
        let merger = Merger::new(CountingEngine::default(), config).unwrap();

        merger
            .merge_directory(
                dir.path(),
                OutputTarget::File(dir.path().join("merged.mp4")),
                NoProgress,
            )
            .unwrap();
        assert_eq!(merger.engine().orders.lock().unwrap()[0], vec!["a.mp4", "b.mp4"]);
    }

    #[test]
    fn started_merge_relays_progress_in_order() {
        let engine = Arc::new(MemoryEngine::new());
        engine.emit_progress(&[0.25, 0.5, 0.75, 1.0]);
        let merger = Merger::new(
            BridgedEngine::new(Some(SharedEngine::new(engine.clone()))),
            MergeConfig::default(),
        )
        .unwrap();

        let pending = merger.start(bytes_inputs(&["x2.mp4", "x1.mp4"]), memory());
        let mut seen = Vec::new();
        let outcome = pending.wait_with_progress(|p: f64| seen.push(p)).unwrap();

        assert_eq!(outcome.output, MergeOutput::Bytes(b"x1.mp4x2.mp4".to_vec()));
        assert_eq!(seen, vec![25.0, 50.0, 75.0, 100.0]);
    }

    #[test]
    fn events_describe_the_run() {
        let recorder = Arc::new(Recorder::default());
        let merger = Merger::new(CountingEngine::default(), MergeConfig::default())
            .unwrap()
            .with_event_handler(recorder.clone());

        merger.merge(bytes_inputs(&["a.mp4"]), memory(), NoProgress).unwrap();
        let _ = merger.merge(Vec::new(), memory(), NoProgress);

        let events = recorder.0.lock().unwrap();
        assert!(matches!(events[0], Event::MergeStarted { file_count: 1, .. }));
        assert!(matches!(events[1], Event::MergeCompleted { output_size: 2, .. }));
        assert!(matches!(events[2], Event::MergeFailed { ref phase, .. } if phase == "manifest"));
    }
}
