//! Executor for action plans.

use super::types::*;
use crate::core::pool::WorkerPool;
use crate::core::sidecar::rewrite_sidecar;
use crate::error::{ActionError, WorkerPanic};
use crate::events::{null_sender, Event, EventSender, ExecuteEvent};
use std::collections::HashSet;
use std::fs::{self, FileTimes};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{error, info};

/// Runs planned actions on a worker pool.
///
/// A failing action becomes a [`FailureRecord`]; it never stops the others.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionPool {
    pool: WorkerPool,
}

impl ExecutionPool {
    /// Create an execution pool with `workers` threads (0 = inline)
    pub fn new(workers: usize) -> Self {
        Self {
            pool: WorkerPool::new(workers),
        }
    }

    pub fn execute(&self, actions: &[PlannedAction]) -> Result<ExecutionReport, WorkerPanic> {
        self.execute_with_events(actions, &null_sender())
    }

    pub fn execute_with_events(
        &self,
        actions: &[PlannedAction],
        events: &EventSender,
    ) -> Result<ExecutionReport, WorkerPanic> {
        let start = Instant::now();
        let total = actions.len();
        let directories = DirectoryGuard::new();
        let completed = AtomicUsize::new(0);
        let finished = AtomicUsize::new(0);
        let failures = Mutex::new(Vec::new());

        events.send(Event::Execute(ExecuteEvent::Started {
            total_actions: total,
        }));

        self.pool.run(actions, |planned| {
            match execute_action(&planned.action, &directories) {
                Ok(()) => {
                    completed.fetch_add(1, Ordering::SeqCst);
                }
                Err(e) => {
                    error!(hash = %planned.digest, "{}", e);
                    events.send(Event::Execute(ExecuteEvent::ActionFailed {
                        hash: planned.digest.to_string(),
                        message: e.to_string(),
                    }));
                    failures
                        .lock()
                        .unwrap_or_else(|p| p.into_inner())
                        .push(planned.failure(e.to_string()));
                }
            }

            let done = finished.fetch_add(1, Ordering::SeqCst) + 1;
            events.send(Event::Execute(ExecuteEvent::Progress {
                completed: done,
                total,
            }));
        })?;

        let mut failures = failures.into_inner().unwrap_or_else(|p| p.into_inner());
        failures.sort();
        let completed = completed.into_inner();

        events.send(Event::Execute(ExecuteEvent::Completed {
            succeeded: completed,
            failed: failures.len(),
        }));

        Ok(ExecutionReport {
            completed,
            folders_created: directories.created(),
            failures,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Perform one action
pub fn execute_action(action: &Action, directories: &DirectoryGuard) -> Result<(), ActionError> {
    match action {
        Action::Copy {
            source,
            destination,
        } => {
            directories.ensure_parent(destination)?;
            info!("Copying {} ==> {}", source.display(), destination.display());
            copy_with_metadata(source, destination)
        }
        Action::RewriteSidecar {
            source,
            destination,
            image_name,
        } => {
            directories.ensure_parent(destination)?;
            info!(
                "New sidecar for {} ==> {}",
                source.display(),
                destination.display()
            );
            rewrite_sidecar(source, destination, image_name)?;
            Ok(())
        }
    }
}

/// Copy bytes and permissions, then carry over access and modification times
fn copy_with_metadata(source: &Path, destination: &Path) -> Result<(), ActionError> {
    let copy_error = |e: std::io::Error| ActionError::Copy {
        source_path: source.to_path_buf(),
        destination: destination.to_path_buf(),
        source: e,
    };

    // A previous copy may have inherited a read-only mode from its source.
    match fs::remove_file(destination) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(copy_error(e)),
    }

    fs::copy(source, destination).map_err(copy_error)?;

    let metadata = fs::metadata(source).map_err(copy_error)?;
    let times = FileTimes::new()
        .set_accessed(metadata.accessed().map_err(copy_error)?)
        .set_modified(metadata.modified().map_err(copy_error)?);

    fs::File::open(destination)
        .and_then(|file| file.set_times(times))
        .map_err(copy_error)
}

/// Directory creation shared by every worker of one run.
///
/// Creating a directory that already exists is not an error, and two
/// workers asking for the same directory create it once.
#[derive(Debug, Default)]
pub struct DirectoryGuard {
    seen: Mutex<HashSet<PathBuf>>,
    created: AtomicUsize,
}

impl DirectoryGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `dir` exists
    pub fn ensure(&self, dir: &Path) -> Result<(), ActionError> {
        let mut seen = self.seen.lock().unwrap_or_else(|p| p.into_inner());
        if seen.contains(dir) {
            return Ok(());
        }

        let existed = dir.is_dir();
        fs::create_dir_all(dir).map_err(|source| ActionError::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
        if !existed {
            self.created.fetch_add(1, Ordering::SeqCst);
        }
        seen.insert(dir.to_path_buf());
        Ok(())
    }

    fn ensure_parent(&self, path: &Path) -> Result<(), ActionError> {
        let parent = path.parent().ok_or_else(|| ActionError::NoParent {
            path: path.to_path_buf(),
        })?;
        self.ensure(parent)
    }

    /// Number of directories this guard had to create
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}
