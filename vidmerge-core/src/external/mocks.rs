// vidmerge-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.
// Everything here is thread-safe so mocks can back a `Merger` that runs
// jobs on a background thread.

use super::bridged::{EngineProgress, ProgressCallback, VirtualEngine};
use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};
use super::ffprobe_executor::FfprobeExecutor;
use crate::error::{CoreError, CoreResult};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, FfmpegProgress};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Builds an exit status carrying `code` as the process exit code.
pub fn exit_status(code: i32) -> ExitStatus {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }
    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }
}

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Vec<FfmpegEvent>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events_to_emit.clone() {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Represents an expected ffmpeg command call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    pub create_dummy_output: bool,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Arc<Mutex<Vec<MockFfmpegExpectation>>>,
    received_calls: Arc<Mutex<Vec<Vec<String>>>>,
    received_manifests: Arc<Mutex<Vec<String>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockFfmpegProcess>,
        create_dummy_output: bool,
    ) {
        lock(&self.expectations).push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            create_dummy_output,
        });
    }

    pub fn add_success_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        create_dummy_output: bool,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: events,
            exit_status: exit_status(0),
        };
        self.add_expectation(arg_pattern, Ok(process), create_dummy_output);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), false);
    }

    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: events,
            exit_status: exit_status(exit_code),
        };
        self.add_expectation(arg_pattern, Ok(process), false);
    }

    /// A progress line as ffmpeg-sidecar would parse it.
    pub fn progress_event(time: &str) -> FfmpegEvent {
        FfmpegEvent::Progress(FfmpegProgress {
            frame: 0,
            fps: 0.0,
            q: 0.0,
            size_kb: 0,
            time: time.to_string(),
            bitrate_kbps: 0.0,
            speed: 1.0,
            raw_log_message: String::new(),
        })
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        lock(&self.received_calls).clone()
    }

    /// Contents of each list file passed with `-i`, read at spawn time.
    pub fn get_received_manifests(&self) -> Vec<String> {
        lock(&self.received_manifests).clone()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .as_inner()
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        lock(&self.received_calls).push(args.clone());

        if let Some(list) = args.iter().position(|a| a == "-i").and_then(|i| args.get(i + 1)) {
            if let Ok(content) = std::fs::read_to_string(list) {
                lock(&self.received_manifests).push(content);
            }
        }

        let expectation = {
            let mut expectations = lock(&self.expectations);
            let found = expectations
                .iter()
                .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));
            found.map(|index| expectations.remove(index))
        };

        let Some(expectation) = expectation else {
            log::error!("MockFfmpegSpawner: No expectation found for command args: {args:?}");
            return Err(CoreError::EngineUnavailable(format!(
                "MockFfmpegSpawner: no expectation for {args:?}"
            )));
        };
        log::info!(
            "MockFfmpegSpawner: Matched expectation with pattern '{}'",
            expectation.arg_pattern
        );

        let process = expectation.result?;
        if expectation.create_dummy_output {
            if let Some(output) = args.last() {
                let output = PathBuf::from(output);
                if let Some(parent) = output.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&output, b"merged")?;
                log::info!("MockFfmpegSpawner created dummy output file: {}", output.display());
            }
        }
        Ok(process)
    }
}

/// Mock implementation of FfprobeExecutor.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    durations: Arc<Mutex<HashMap<PathBuf, f64>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the duration reported for `input_path`.
    pub fn expect_duration(&self, input_path: &Path, seconds: f64) {
        lock(&self.durations).insert(input_path.to_path_buf(), seconds);
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn get_duration(&self, input_path: &Path) -> CoreResult<f64> {
        lock(&self.durations)
            .get(input_path)
            .copied()
            .ok_or_else(|| CoreError::EngineInvocation {
                engine: "ffprobe".to_string(),
                message: format!("no duration expectation for {}", input_path.display()),
                diagnostics: Vec::new(),
            })
    }
}

#[derive(Default)]
struct MemoryEngineState {
    files: HashMap<String, Vec<u8>>,
    written: Vec<String>,
    runs: Vec<Vec<String>>,
    ratios: Vec<f64>,
    failure: Option<String>,
    panic_on_run: bool,
    skip_output: bool,
}

/// In-memory `VirtualEngine` that concatenates the bytes of the files
/// named in its list file.
#[derive(Default)]
pub struct MemoryEngine {
    state: Mutex<MemoryEngineState>,
    callback: Mutex<Option<ProgressCallback>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Default::default()
    }

    /// Ratios reported through the callback during each run.
    pub fn emit_progress(&self, ratios: &[f64]) {
        lock(&self.state).ratios = ratios.to_vec();
    }

    pub fn fail_with(&self, message: &str) {
        lock(&self.state).failure = Some(message.to_string());
    }

    pub fn panic_on_run(&self) {
        lock(&self.state).panic_on_run = true;
    }

    /// Runs succeed without writing the output file.
    pub fn produce_no_output(&self) {
        lock(&self.state).skip_output = true;
    }

    /// Sends a notification to whatever callback is installed right now.
    pub fn notify(&self, ratio: f64) {
        if let Some(callback) = lock(&self.callback).as_ref() {
            callback(EngineProgress { ratio });
        }
    }

    pub fn has_progress_callback(&self) -> bool {
        lock(&self.callback).is_some()
    }

    /// Names currently present in the virtual filesystem, sorted.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.state).files.keys().cloned().collect();
        names.sort();
        names
    }

    /// Every name passed to `write_file`, in call order.
    pub fn written_files(&self) -> Vec<String> {
        lock(&self.state).written.clone()
    }

    pub fn runs(&self) -> Vec<Vec<String>> {
        lock(&self.state).runs.clone()
    }

    fn concatenate(&self, args: &[String]) -> Result<(), String> {
        let list_name = args
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| args.get(i + 1))
            .ok_or("no input list given")?;
        let output_name = args.last().ok_or("no output given")?;

        let mut state = lock(&self.state);
        if args.iter().any(|a| a == "-n") && state.files.contains_key(output_name) {
            return Err(format!("File '{output_name}' already exists. Exiting."));
        }
        let list = state
            .files
            .get(list_name)
            .ok_or_else(|| format!("{list_name}: No such file or directory"))?;
        let list = String::from_utf8_lossy(list).into_owned();

        let mut merged = Vec::new();
        for line in list.lines() {
            let quoted = line
                .strip_prefix("file '")
                .and_then(|rest| rest.strip_suffix('\''))
                .ok_or_else(|| format!("malformed list line: {line}"))?;
            let name = quoted.replace(r"'\''", "'");
            let data = state
                .files
                .get(&name)
                .ok_or_else(|| format!("{name}: No such file or directory"))?;
            merged.extend_from_slice(data);
        }
        state.files.insert(output_name.clone(), merged);
        Ok(())
    }
}

impl VirtualEngine for MemoryEngine {
    fn write_file(&self, name: &str, data: &[u8]) -> io::Result<()> {
        let mut state = lock(&self.state);
        state.written.push(name.to_string());
        state.files.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn run(&self, args: &[String]) -> Result<(), String> {
        let (ratios, failure, panic_on_run, skip_output) = {
            let mut state = lock(&self.state);
            state.runs.push(args.to_vec());
            (
                state.ratios.clone(),
                state.failure.clone(),
                state.panic_on_run,
                state.skip_output,
            )
        };

        for ratio in ratios {
            self.notify(ratio);
        }
        if panic_on_run {
            panic!("simulated engine abort");
        }
        if let Some(message) = failure {
            return Err(message);
        }
        if skip_output {
            return Ok(());
        }
        self.concatenate(args)
    }

    fn read_file(&self, name: &str) -> Option<Vec<u8>> {
        lock(&self.state).files.get(name).cloned()
    }

    fn remove_file(&self, name: &str) -> io::Result<()> {
        lock(&self.state)
            .files
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))
    }

    fn set_progress(&self, callback: Option<ProgressCallback>) {
        *lock(&self.callback) = callback;
    }
}
