//! Serial background task execution
//!
//! Persistence tasks run one at a time, in submission order, on a single named
//! worker thread fed by a bounded queue. Submission never blocks: when the
//! queue is full the task is rejected and the caller decides what to log.

use crate::errors::{RecoveryHint, Result, SyncError};
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use tracing::{debug, debug_span, error};

/// A unit of background work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Per-task settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOptions {
    /// Progress label, used in logs
    pub label: String,
}

impl TaskOptions {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// Something that runs tasks off the caller's thread
pub trait TaskRunner: Send + Sync {
    /// Queue a task without blocking
    fn submit(&self, options: TaskOptions, task: Task) -> Result<()>;

    /// Stop accepting tasks, run the ones already queued and wait for them
    fn shutdown(&self);
}

struct Job {
    options: TaskOptions,
    task: Task,
}

/// One worker thread draining a bounded FIFO queue
pub struct SerialTaskRunner {
    name: String,
    capacity: usize,
    sender: Mutex<Option<Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SerialTaskRunner {
    pub fn spawn(name: impl Into<String>, capacity: usize) -> Result<Self> {
        let name = name.into();
        let (sender, receiver) = bounded(capacity);
        let worker = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_worker(receiver))
            .map_err(|source| SyncError::WorkerSpawn {
                name: name.clone(),
                source,
                recovery_hint: RecoveryHint::Retry,
            })?;
        debug!(name = %name, capacity, "started serial task runner");

        Ok(Self {
            name,
            capacity,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tasks queued but not yet started
    pub fn pending(&self) -> usize {
        self.sender.lock().as_ref().map_or(0, Sender::len)
    }

    pub fn is_shut_down(&self) -> bool {
        self.sender.lock().is_none()
    }
}

impl TaskRunner for SerialTaskRunner {
    fn submit(&self, options: TaskOptions, task: Task) -> Result<()> {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return Err(SyncError::Disposed {
                label: options.label,
                recovery_hint: RecoveryHint::Ignore,
            });
        };
        sender
            .try_send(Job { options, task })
            .map_err(|e| match e {
                TrySendError::Full(job) => SyncError::QueueFull {
                    label: job.options.label,
                    capacity: self.capacity,
                    recovery_hint: RecoveryHint::Retry,
                },
                TrySendError::Disconnected(job) => SyncError::Disposed {
                    label: job.options.label,
                    recovery_hint: RecoveryHint::Ignore,
                },
            })
    }

    fn shutdown(&self) {
        // Dropping the only sender lets the worker drain the queue and exit
        drop(self.sender.lock().take());

        let Some(worker) = self.worker.lock().take() else {
            return;
        };
        if worker.thread().id() == thread::current().id() {
            return;
        }
        if worker.join().is_err() {
            error!(name = %self.name, "task runner worker panicked");
        }
    }
}

impl Drop for SerialTaskRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(receiver: Receiver<Job>) {
    for Job { options, task } in receiver.iter() {
        let _span = debug_span!("task", label = %options.label).entered();
        debug!("running background task");
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            error!(label = %options.label, "background task panicked");
        }
    }
    debug!("task queue closed, worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::Duration;

    #[test]
    fn tasks_run_in_submission_order() {
        let runner = SerialTaskRunner::spawn("test-runner", 16).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..10 {
            let seen = Arc::clone(&seen);
            runner
                .submit(TaskOptions::new(format!("task {i}")), Box::new(move || seen.lock().push(i)))
                .unwrap();
        }
        runner.shutdown();

        assert_eq!(*seen.lock(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn full_queue_rejects_without_blocking() {
        let runner = SerialTaskRunner::spawn("test-runner", 1).unwrap();
        let (release, gate) = mpsc::channel::<()>();
        let (started_tx, started_rx) = mpsc::channel::<()>();

        runner
            .submit(
                TaskOptions::new("blocker"),
                Box::new(move || {
                    let _ = started_tx.send(());
                    let _ = gate.recv();
                }),
            )
            .unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        runner
            .submit(TaskOptions::new("queued"), Box::new(|| {}))
            .unwrap();
        let err = runner
            .submit(TaskOptions::new("overflow"), Box::new(|| {}))
            .unwrap_err();
        assert!(matches!(err, SyncError::QueueFull { ref label, capacity: 1, .. } if label == "overflow"));

        release.send(()).unwrap();
        runner.shutdown();
    }

    #[test]
    fn shutdown_drains_queued_tasks() {
        let runner = SerialTaskRunner::spawn("test-runner", 8).unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let count = Arc::clone(&count);
            runner
                .submit(
                    TaskOptions::new("count"),
                    Box::new(move || {
                        thread::sleep(Duration::from_millis(5));
                        count.fetch_add(1, Ordering::SeqCst);
                    }),
                )
                .unwrap();
        }

        runner.shutdown();

        assert_eq!(count.load(Ordering::SeqCst), 5);
        assert!(runner.is_shut_down());
        assert!(matches!(
            runner.submit(TaskOptions::new("late"), Box::new(|| {})),
            Err(SyncError::Disposed { .. })
        ));
    }

    #[test]
    fn panicking_task_does_not_stop_the_worker() {
        let runner = SerialTaskRunner::spawn("test-runner", 4).unwrap();
        let ran = Arc::new(AtomicUsize::new(0));
        let after = Arc::clone(&ran);

        runner
            .submit(TaskOptions::new("boom"), Box::new(|| panic!("boom")))
            .unwrap();
        runner
            .submit(
                TaskOptions::new("after"),
                Box::new(move || {
                    after.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        runner.shutdown();

        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
