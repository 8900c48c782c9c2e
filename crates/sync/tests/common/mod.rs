//! Fixtures shared by the project data cache tests
#![allow(dead_code)]

use blazebridge_core::{BuildSystemName, ImportSettings};
use blazebridge_sync::compressed::{read_snapshot, write_snapshot};
use blazebridge_sync::{EventData, EventLogger, ProjectData, Result, Task, TaskOptions, TaskRunner};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Small stand-in for synced project data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetMap {
    pub generation: u32,
    pub targets: Vec<String>,
    pub client_cl: Option<u64>,
}

impl TargetMap {
    pub fn new(generation: u32) -> Self {
        Self {
            generation,
            targets: vec![format!("//app:gen{generation}")],
            client_cl: Some(1000 + u64::from(generation)),
        }
    }
}

impl ProjectData for TargetMap {
    fn read_from(reader: &mut dyn Read) -> Result<Self> {
        read_snapshot(reader, SNAPSHOT_VERSION)
    }

    fn write_to(&self, writer: &mut dyn Write) -> Result<()> {
        write_snapshot(writer, self, SNAPSHOT_VERSION)
    }

    fn version_marker(&self) -> Option<u64> {
        self.client_cl
    }
}

pub fn import_settings(root: &Path) -> ImportSettings {
    ImportSettings::new("demo", root.join("workspace"), root, BuildSystemName::Bazel)
}

/// Event logger that keeps every event for inspection
#[derive(Default)]
pub struct RecordingEventLogger {
    pub events: Mutex<Vec<(String, EventData)>>,
}

impl EventLogger for RecordingEventLogger {
    fn log_event(&self, _source: &str, event: &str, data: &EventData) {
        self.events.lock().push((event.to_string(), data.clone()));
    }
}

/// Runner that holds tasks until the test releases them
#[derive(Default)]
pub struct HeldTaskRunner {
    tasks: Mutex<Vec<(TaskOptions, Task)>>,
}

impl HeldTaskRunner {
    pub fn held(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Run every held task on the calling thread
    pub fn release(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        for (_, task) in tasks {
            task();
        }
    }
}

impl TaskRunner for HeldTaskRunner {
    fn submit(&self, options: TaskOptions, task: Task) -> Result<()> {
        self.tasks.lock().push((options, task));
        Ok(())
    }

    fn shutdown(&self) {
        self.release();
    }
}
