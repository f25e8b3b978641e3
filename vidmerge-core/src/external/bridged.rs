// ============================================================================
// vidmerge-core/src/external/bridged.rs
// ============================================================================
//
// BRIDGED ENGINE: Concatenation Through a Host-Provided Engine Instance
//
// Some hosts (a browser runtime, for one) embed ffmpeg as an in-memory
// engine with its own virtual filesystem. The host exposes that engine
// through the `VirtualEngine` trait; this adapter writes the inputs and the
// list file into it, runs the concat command on a background thread while
// relaying progress, and reads the output back.
//
// The engine instance is shared process-wide. `SharedEngine` carries it
// together with a job lock, so only one job at a time owns the progress
// callback slot. The callback is installed immediately before `run` and
// cleared immediately after by a drop guard.

use super::{CodecPolicy, EngineAdapter, EngineRequest, InputSource, MergeOutput, OutputTarget};
use crate::error::{CoreError, CoreResult};
use crate::manifest::Manifest;
use crate::progress_reporting::ratio_to_percent;

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

/// Virtual file name of the concat list inside the engine.
pub const MANIFEST_NAME: &str = "concat_list.txt";

const ENGINE_NAME: &str = "bridged ffmpeg";

/// Progress notification from the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineProgress {
    /// Completed fraction in `[0, 1]`
    pub ratio: f64,
}

/// Callback registered on the engine for progress notifications.
pub type ProgressCallback = Box<dyn Fn(EngineProgress) + Send + Sync>;

/// Operations a host engine exposes.
///
/// Implementations wrap whatever binding the host provides. All calls for
/// one job come from a single thread at a time, but not always the same one.
pub trait VirtualEngine: Send + Sync {
    /// Creates or replaces `name` in the engine's filesystem.
    fn write_file(&self, name: &str, data: &[u8]) -> io::Result<()>;

    /// Runs the engine with ffmpeg-style arguments. `Err` carries the
    /// engine's failure message.
    fn run(&self, args: &[String]) -> Result<(), String>;

    /// Reads `name` back, or `None` when it does not exist.
    fn read_file(&self, name: &str) -> Option<Vec<u8>>;

    fn remove_file(&self, name: &str) -> io::Result<()>;

    /// Installs (`Some`) or clears (`None`) the progress callback.
    fn set_progress(&self, callback: Option<ProgressCallback>);
}

/// A process-wide engine instance plus the lock serializing jobs on it.
#[derive(Clone)]
pub struct SharedEngine {
    engine: Arc<dyn VirtualEngine>,
    job_lock: Arc<Mutex<()>>,
}

impl SharedEngine {
    pub fn new(engine: Arc<dyn VirtualEngine>) -> Self {
        Self {
            engine,
            job_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Blocks until no other job is using the engine.
    fn acquire(&self) -> MutexGuard<'_, ()> {
        // A panicking job leaves nothing behind worth refusing over.
        self.job_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SharedEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEngine").finish_non_exhaustive()
    }
}

/// Engine adapter for a host-provided in-memory engine.
#[derive(Debug, Clone)]
pub struct BridgedEngine {
    shared: Option<SharedEngine>,
}

impl BridgedEngine {
    /// Creates the adapter. Passing `None` models a host that never
    /// provided an engine; every invocation then fails with
    /// `EngineUnavailable`.
    pub fn new(shared: Option<SharedEngine>) -> Self {
        Self { shared }
    }
}

impl EngineAdapter for BridgedEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn default_codec_policy(&self) -> CodecPolicy {
        CodecPolicy::StreamCopy
    }

    fn invoke(
        &self,
        request: &EngineRequest<'_>,
        on_progress: &mut dyn FnMut(f64),
    ) -> CoreResult<MergeOutput> {
        let shared = self.shared.as_ref().ok_or_else(|| {
            CoreError::EngineUnavailable("no bridged engine instance was provided".to_string())
        })?;
        let _job = shared.acquire();
        let engine = shared.engine.as_ref();

        // Declared after the job lock so cleanup runs while it is still held.
        let mut files = VirtualFiles::new(engine);

        let mut staged = Vec::with_capacity(request.inputs.len());
        for (index, input) in request.inputs.iter().enumerate() {
            let name = virtual_name(index, &input.name)?;
            let data: Cow<'_, [u8]> = match &input.source {
                InputSource::Bytes(data) => Cow::Borrowed(data),
                InputSource::Path(path) => Cow::Owned(read_input(path)?),
            };
            files.write(&name, &data).map_err(|e| CoreError::EngineInvocation {
                engine: ENGINE_NAME.to_string(),
                message: format!("could not write '{}' to the engine: {e}", input.name),
                diagnostics: Vec::new(),
            })?;
            staged.push(name);
        }
        let manifest = Manifest::build(&staged)?;
        files
            .write(MANIFEST_NAME, manifest.render().as_bytes())
            .map_err(CoreError::ManifestWrite)?;

        let output_name = format!("output.{}", request.output.extension());
        files.track(&output_name);

        let args = request.command.to_args(MANIFEST_NAME, &output_name);
        log::debug!("Running bridged engine: {}", args.join(" "));
        run_relaying_progress(engine, &args, on_progress)?;

        let data = engine
            .read_file(&output_name)
            .ok_or_else(|| CoreError::OutputRead {
                target: output_name.clone(),
                reason: "the engine reported success but produced no output".to_string(),
            })?;
        log::debug!("Read {} bytes of output from the engine", data.len());

        match request.output {
            OutputTarget::Memory { .. } => Ok(MergeOutput::Bytes(data)),
            OutputTarget::File(path) => {
                std::fs::write(path, &data).map_err(|e| CoreError::OutputRead {
                    target: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                Ok(MergeOutput::File(path.clone()))
            }
        }
    }
}

/// Name an input is written under inside the engine. The index prefix keeps
/// it clear of the list file, the output and any other input.
fn virtual_name(index: usize, name: &str) -> CoreResult<String> {
    let file_name = Path::new(name)
        .file_name()
        .ok_or_else(|| CoreError::InvalidManifestEntry(name.to_string()))?;
    Ok(format!("{index:04}_{}", file_name.to_string_lossy()))
}

fn read_input(path: &Path) -> CoreResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CoreError::MissingFile(path.to_path_buf()),
        _ => CoreError::Io(e),
    })
}

/// Messages from the background run thread to the relaying caller.
enum Relay {
    Progress(f64),
    Finished(Result<(), String>),
}

/// Runs the engine on a background thread and forwards its progress to
/// `on_progress` on the calling thread, in emission order.
fn run_relaying_progress(
    engine: &dyn VirtualEngine,
    args: &[String],
    on_progress: &mut dyn FnMut(f64),
) -> CoreResult<()> {
    let (tx, rx) = mpsc::channel::<Relay>();

    let outcome = thread::scope(|scope| {
        let progress_tx = tx.clone();
        let runner = scope.spawn(move || {
            let result = {
                let _registration = ProgressRegistration::install(
                    engine,
                    Box::new(move |progress: EngineProgress| {
                        let _ = progress_tx.send(Relay::Progress(progress.ratio));
                    }),
                );
                panic::catch_unwind(AssertUnwindSafe(|| engine.run(args)))
            };
            // The callback is cleared by now, so every progress message
            // precedes this one.
            let result = result.unwrap_or_else(|payload| {
                Err(format!("engine panicked: {}", panic_message(payload.as_ref())))
            });
            let _ = tx.send(Relay::Finished(result));
        });

        let mut outcome = None;
        while let Ok(message) = rx.recv() {
            match message {
                Relay::Progress(ratio) => {
                    if let Some(percent) = ratio_to_percent(ratio) {
                        on_progress(percent);
                    }
                }
                Relay::Finished(result) => {
                    outcome = Some(result);
                    break;
                }
            }
        }
        if runner.join().is_err() {
            log::error!("Bridged engine thread terminated abnormally");
        }
        outcome
    });

    match outcome {
        Some(Ok(())) => Ok(()),
        Some(Err(message)) => {
            log::error!("Bridged engine failed: {message}");
            Err(CoreError::EngineInvocation {
                engine: ENGINE_NAME.to_string(),
                message,
                diagnostics: Vec::new(),
            })
        }
        None => Err(CoreError::EngineInvocation {
            engine: ENGINE_NAME.to_string(),
            message: "engine thread ended without reporting a result".to_string(),
            diagnostics: Vec::new(),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Keeps the progress callback installed for exactly its own lifetime.
struct ProgressRegistration<'a> {
    engine: &'a dyn VirtualEngine,
}

impl<'a> ProgressRegistration<'a> {
    fn install(engine: &'a dyn VirtualEngine, callback: ProgressCallback) -> Self {
        engine.set_progress(Some(callback));
        Self { engine }
    }
}

impl Drop for ProgressRegistration<'_> {
    fn drop(&mut self) {
        self.engine.set_progress(None);
    }
}

/// Virtual files created by one job, removed when the job ends.
struct VirtualFiles<'a> {
    engine: &'a dyn VirtualEngine,
    names: Vec<String>,
}

impl<'a> VirtualFiles<'a> {
    fn new(engine: &'a dyn VirtualEngine) -> Self {
        Self {
            engine,
            names: Vec::new(),
        }
    }

    fn write(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        self.track(name);
        self.engine.write_file(name, data)
    }

    /// Registers a file the engine itself will create.
    fn track(&mut self, name: &str) {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
    }
}

impl Drop for VirtualFiles<'_> {
    fn drop(&mut self) {
        for name in self.names.drain(..).rev() {
            if let Err(e) = self.engine.remove_file(&name) {
                if e.kind() != io::ErrorKind::NotFound {
                    log::warn!("Failed to remove virtual file '{name}': {e}");
                }
            }
        }
    }
}
