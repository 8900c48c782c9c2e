//! Test result discovery from BEP output
//!
//! A finder runs one ingestion pass and reports test outputs. It never fails:
//! every read, parse or structural problem is logged and turned into
//! [`TestResults::NoResults`] so the caller can fall back to other sources.

use crate::errors::Result;
use crate::output::{ParsedBepOutput, ParseMode};
use crate::stream::BuildEventStreamProvider;
use crate::test_results::TestResults;
use blazebridge_config::BepConfig;
use blazebridge_utils::TempFileGuard;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Strategy for locating test results after a test run
pub trait TestResultFinderStrategy {
    /// Run one lookup; failures are logged and reported as `NoResults`
    fn find_test_results(&mut self) -> TestResults;

    /// Remove temporary build output this strategy still owns. Safe to repeat.
    fn delete_temporary_output_files(&mut self);
}

enum EventSource {
    File {
        path: PathBuf,
        guard: Option<TempFileGuard>,
    },
    Stream(Option<Box<dyn BuildEventStreamProvider + Send>>),
}

/// Finder reading a BEP output file or a live event stream
pub struct BepTestFinderStrategy {
    source: EventSource,
    config: BepConfig,
}

impl BepTestFinderStrategy {
    /// Read a finished output file, deleting it once it has been read
    pub fn for_file(path: impl Into<PathBuf>, config: &BepConfig) -> Self {
        let path = path.into();
        Self {
            source: EventSource::File {
                guard: Some(TempFileGuard::new(path.clone())),
                path,
            },
            config: config.clone(),
        }
    }

    /// Read events from a live stream; the stream is consumed by the first lookup
    pub fn for_stream<P>(provider: P, config: &BepConfig) -> Self
    where
        P: BuildEventStreamProvider + Send + 'static,
    {
        Self {
            source: EventSource::Stream(Some(Box::new(provider))),
            config: config.clone(),
        }
    }

    /// Leave the output file in place after reading it
    pub fn retain_output_file(mut self) -> Self {
        if let EventSource::File { guard, .. } = &mut self.source {
            if let Some(guard) = guard.take() {
                guard.keep();
            }
        }
        self
    }

    /// Path of the output file, if this finder reads one
    pub fn output_file(&self) -> Option<&Path> {
        match &self.source {
            EventSource::File { path, .. } => Some(path),
            EventSource::Stream(_) => None,
        }
    }

    fn parse_mode(&self) -> ParseMode {
        ParseMode::from_best_effort(self.config.best_effort)
    }

    fn extract(&self, parsed: Result<ParsedBepOutput>) -> Result<TestResults> {
        let parsed = parsed?;
        if let Some(reason) = parsed.truncation() {
            debug!(reason = %reason, "reporting test results from a truncated build event stream");
        }
        TestResults::from_parsed(&parsed, &self.config.test_output_groups)
    }
}

impl TestResultFinderStrategy for BepTestFinderStrategy {
    fn find_test_results(&mut self) -> TestResults {
        let mode = self.parse_mode();
        let max_message_bytes = self.config.max_message_bytes;

        let outcome = match &mut self.source {
            EventSource::File { path, guard } => {
                let parsed = ParsedBepOutput::parse_file(path, max_message_bytes, mode);
                if let Some(mut pending) = guard.take() {
                    if let Err(e) = pending.remove() {
                        warn!(path = %path.display(), error = %e, "Could not delete BEP output file");
                        *guard = Some(pending);
                    }
                }
                parsed
            }
            EventSource::Stream(provider) => match provider.take() {
                Some(mut provider) => ParsedBepOutput::parse(&mut provider, mode),
                None => {
                    warn!("build event stream was already consumed");
                    return TestResults::NoResults;
                }
            },
        };

        match self.extract(outcome) {
            Ok(results) => {
                debug!(targets = results.results().len(), "found test results in BEP output");
                results
            }
            Err(e) => {
                warn!(error = %e, "Failed to read test results from BEP output");
                TestResults::NoResults
            }
        }
    }

    fn delete_temporary_output_files(&mut self) {
        let EventSource::File { path, guard } = &mut self.source else {
            return;
        };
        let Some(pending) = guard.as_mut() else {
            return;
        };
        match pending.remove() {
            Ok(_) => *guard = None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not delete BEP output file");
            }
        }
    }
}
