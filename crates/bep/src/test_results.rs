//! Test results extracted from a parsed build

use crate::errors::Result;
use crate::named_sets::OutputFile;
use crate::output::ParsedBepOutput;
use std::path::PathBuf;

/// Output files of one test target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub label: String,
    pub configuration_mnemonic: String,
    pub output_files: Vec<OutputFile>,
}

impl TestResult {
    /// Local paths of the output files that live on this machine
    pub fn local_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.output_files.iter().filter_map(OutputFile::local_path)
    }
}

/// Outcome of a test result lookup.
///
/// `NoResults` means the build output could not be read at all. An empty
/// `Results` means it was read and contained no test outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TestResults {
    #[default]
    NoResults,
    Results(Vec<TestResult>),
}

impl TestResults {
    /// Collect the files of `groups` for every target that has any
    pub fn from_parsed<S: AsRef<str>>(parsed: &ParsedBepOutput, groups: &[S]) -> Result<Self> {
        let mut results = Vec::new();
        for (key, _) in parsed.target_results() {
            let mut output_files: Vec<OutputFile> = Vec::new();
            for group in groups {
                for file in parsed.output_group_files(key, group.as_ref())? {
                    if !output_files.iter().any(|f| f.identity() == file.identity()) {
                        output_files.push(file);
                    }
                }
            }
            if output_files.is_empty() {
                continue;
            }
            let configuration_mnemonic = parsed
                .configuration(&key.configuration_id)
                .map(|c| c.mnemonic.clone())
                .unwrap_or_default();
            results.push(TestResult {
                label: key.label.to_string(),
                configuration_mnemonic,
                output_files,
            });
        }
        Ok(TestResults::Results(results))
    }

    pub fn is_no_results(&self) -> bool {
        matches!(self, TestResults::NoResults)
    }

    /// Results found, empty for `NoResults`
    pub fn results(&self) -> &[TestResult] {
        match self {
            TestResults::NoResults => &[],
            TestResults::Results(results) => results,
        }
    }
}
