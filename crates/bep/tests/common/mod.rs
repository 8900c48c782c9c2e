//! Shared fixtures for the BEP integration tests
#![allow(dead_code)]

use blazebridge_bep::proto::BuildEvent;
use blazebridge_bep::{BepError, BuildEventStreamProvider};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

pub use blazebridge_bep::testing::*;

/// The smallest build that produces one test result
pub fn single_test_build() -> Vec<BuildEvent> {
    vec![
        started("0b7c6a5e-1f1d-4c1a-9d57-1c0e8d3c2b11"),
        configuration("cfg-k8", "k8-fastbuild"),
        set_of_files(&["/out/t/a.xml"], "s1", &[]),
        target_complete(
            "//t:test",
            "cfg-k8",
            vec![output_group("test.outputs", &["s1"])],
        ),
        finished(true, "SUCCESS", 0),
    ]
}

pub fn write_bep_file(dir: &Path, events: &[BuildEvent]) -> PathBuf {
    let path = dir.join("build_events.bep");
    std::fs::write(&path, as_bytes(events)).unwrap();
    path
}

/// Live stream that yields some events and then fails
pub struct FailingProvider {
    events: VecDeque<BuildEvent>,
    failure: &'static str,
}

impl FailingProvider {
    pub fn new(events: Vec<BuildEvent>, failure: &'static str) -> Self {
        Self {
            events: events.into(),
            failure,
        }
    }
}

impl BuildEventStreamProvider for FailingProvider {
    fn next_event(&mut self) -> blazebridge_bep::Result<Option<BuildEvent>> {
        match self.events.pop_front() {
            Some(event) => Ok(Some(event)),
            None => Err(BepError::stream(self.failure)),
        }
    }
}
