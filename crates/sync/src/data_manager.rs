//! In-process cache of one project's derived data
//!
//! Readers see the current snapshot through an atomic pointer load and never
//! take a lock or do I/O once it is loaded. The first reader to miss takes the load lock and
//! reads the cache file; readers queued behind it reuse its outcome. Saving
//! swaps the snapshot in immediately and hands the disk write to a serial
//! background runner.

use crate::errors::{serialization_error_message, Result, SyncError};
use crate::executor::{SerialTaskRunner, TaskOptions, TaskRunner};
use crate::project_data::ProjectData;
use crate::telemetry::{EventData, EventLogger, TracingEventLogger};
use blazebridge_config::{CacheConfig, PersistenceMode};
use blazebridge_core::ImportSettings;
use blazebridge_utils::tracing::cache_event;
use blazebridge_utils::write_atomic;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

const SAVE_TASK_LABEL: &str = "Saving sync data...";
const TELEMETRY_SOURCE: &str = "ProjectDataManager";
const SERIALIZED_EVENT: &str = "ProjectDataSerialized";

/// Single-entry cache of project data backed by one file
pub struct ProjectDataManager<T: ProjectData> {
    settings: ImportSettings,
    cache_file: PathBuf,
    current: ArcSwapOption<T>,
    /// Guards the load critical section; `true` once a load was attempted
    load_lock: Mutex<bool>,
    load_attempts: AtomicUsize,
    runner: Option<Arc<dyn TaskRunner>>,
    /// Shut the runner down on dispose; false for injected runners
    owns_runner: bool,
    event_logger: Arc<dyn EventLogger>,
    disposed: AtomicBool,
}

impl<T: ProjectData> ProjectDataManager<T> {
    /// Create a manager whose persistence follows `config`
    pub fn new(settings: ImportSettings, config: &CacheConfig) -> Result<Self> {
        let runner: Option<Arc<dyn TaskRunner>> = match config.persistence {
            PersistenceMode::Background => Some(Arc::new(SerialTaskRunner::spawn(
                config.writer_thread_name.clone(),
                config.queue_capacity,
            )?)),
            PersistenceMode::Disabled => None,
        };
        Ok(Self::from_parts(settings, runner, true))
    }

    /// Create a manager that persists through a shared `runner`.
    ///
    /// The runner belongs to the caller: disposing the manager stops saves
    /// but leaves the runner running.
    pub fn with_runner(settings: ImportSettings, runner: Arc<dyn TaskRunner>) -> Self {
        Self::from_parts(settings, Some(runner), false)
    }

    /// Create a manager that never writes to disk
    pub fn in_memory(settings: ImportSettings) -> Self {
        Self::from_parts(settings, None, false)
    }

    fn from_parts(
        settings: ImportSettings,
        runner: Option<Arc<dyn TaskRunner>>,
        owns_runner: bool,
    ) -> Self {
        Self {
            cache_file: settings.cache_file(),
            settings,
            current: ArcSwapOption::empty(),
            load_lock: Mutex::new(false),
            load_attempts: AtomicUsize::new(0),
            runner,
            owns_runner,
            event_logger: Arc::new(TracingEventLogger),
            disposed: AtomicBool::new(false),
        }
    }

    /// Send telemetry to `logger` instead of the tracing logger
    pub fn with_event_logger(mut self, logger: Arc<dyn EventLogger>) -> Self {
        self.event_logger = logger;
        self
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// Current snapshot, loading it from disk on first use.
    ///
    /// Returns `None` when no snapshot was saved and the cache file is missing
    /// or unreadable. A failed load is not retried; a later `save` fills the
    /// cache.
    pub fn get(&self) -> Option<Arc<T>> {
        if let Some(data) = self.current.load_full() {
            cache_event("get", true);
            return Some(data);
        }

        let mut attempted = self.load_lock.lock();
        if let Some(data) = self.current.load_full() {
            cache_event("get", true);
            return Some(data);
        }
        cache_event("get", false);
        if *attempted {
            return None;
        }
        *attempted = true;

        let loaded = Arc::new(self.load()?);
        // A save that raced the load wins
        let previous = self
            .current
            .compare_and_swap(&None::<Arc<T>>, Some(Arc::clone(&loaded)));
        match &*previous {
            Some(saved) => Some(Arc::clone(saved)),
            None => Some(loaded),
        }
    }

    /// Same as [`get`](Self::get); named for the project-open path
    pub fn load_project_root(&self) -> Option<Arc<T>> {
        self.get()
    }

    /// Snapshot in memory, without touching the disk
    pub fn current(&self) -> Option<Arc<T>> {
        self.current.load_full()
    }

    /// Number of times the cache file was read
    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::SeqCst)
    }

    fn load(&self) -> Option<T> {
        self.load_attempts.fetch_add(1, Ordering::SeqCst);
        match read_cache_file::<T>(&self.cache_file) {
            Ok(data) => {
                debug!(path = %self.cache_file.display(), "loaded project data");
                Some(data)
            }
            Err(e) if e.is_not_found() => {
                debug!(path = %self.cache_file.display(), "no cached project data");
                None
            }
            Err(e) => {
                warn!(
                    path = %self.cache_file.display(),
                    error = %e,
                    hint = ?e.recovery_hint(),
                    "Could not load cached project data"
                );
                None
            }
        }
    }

    /// Replace the snapshot and persist it in the background.
    ///
    /// Readers observe `data` as soon as this returns. The write happens later
    /// on the runner; its failures are logged and never undo the swap.
    pub fn save(&self, data: impl Into<Arc<T>>) {
        let data = data.into();
        self.current.store(Some(Arc::clone(&data)));

        let Some(runner) = &self.runner else {
            return;
        };
        if self.disposed.load(Ordering::SeqCst) {
            debug!("project data manager disposed; keeping the snapshot in memory only");
            return;
        }

        let path = self.cache_file.clone();
        let logger = Arc::clone(&self.event_logger);
        let task = Box::new(move || persist(&path, &*data, &*logger));
        match runner.submit(TaskOptions::new(SAVE_TASK_LABEL), task) {
            Ok(()) => {}
            Err(e @ SyncError::QueueFull { .. }) => {
                warn!(error = %e, "dropping project data save; the in-memory snapshot is kept");
            }
            Err(e) => {
                debug!(error = %e, "project data save not scheduled");
            }
        }
    }

    /// Stop accepting saves; a runner this manager spawned is drained and joined
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(runner) = self.runner.as_ref().filter(|_| self.owns_runner) {
            runner.shutdown();
        }
        debug!(project = %self.settings.project_name, "project data manager disposed");
    }
}

impl<T: ProjectData> Drop for ProjectDataManager<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn read_cache_file<T: ProjectData>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| SyncError::io(path, "open cache file", e))?;
    T::read_from(&mut BufReader::new(file))
}

fn persist<T: ProjectData>(path: &Path, data: &T, logger: &dyn EventLogger) {
    let result = write_cache_file(path, data);
    match result {
        Ok(size) => {
            let mut event = EventData::new();
            event.insert("size".to_string(), size.to_string());
            if let Some(version) = data.version_marker() {
                event.insert("version".to_string(), version.to_string());
            }
            logger.log_event(TELEMETRY_SOURCE, SERIALIZED_EVENT, &event);
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "{}", serialization_error_message(&e));
        }
    }
}

fn write_cache_file<T: ProjectData>(path: &Path, data: &T) -> Result<usize> {
    let mut bytes = Vec::new();
    data.write_to(&mut bytes)?;
    write_atomic(path, &bytes)?;
    Ok(bytes.len())
}
