//! Build Event Protocol ingestion for blazebridge
//!
//! Reads the length-delimited event stream a build writes with
//! `--build_event_binary_file`, resolves the named sets of files it reports
//! and locates test outputs.
//!
//! ## Key Components
//!
//! - **`reader`**: varint length-prefixed decoding into [`BuildEvent`]s
//! - **`stream`**: the [`BuildEventStreamProvider`] seam shared by files and live pipes
//! - **`named_sets`**: the named-set DAG and its deduplicating resolver
//! - **`output`**: the event interpreter and the frozen [`ParsedBepOutput`]
//! - **`finder`**: [`BepTestFinderStrategy`], which never fails and cleans up after itself

pub mod errors;
pub mod finder;
pub mod named_sets;
pub mod output;
pub mod proto;
pub mod reader;
pub mod stream;
pub mod test_results;
pub mod testing;

pub use blazebridge_core::Label;
pub use errors::{BepError, Result};
pub use finder::{BepTestFinderStrategy, TestResultFinderStrategy};
pub use named_sets::{NamedSet, NamedSetResolver, OutputFile};
pub use output::{
    BuildEventInterpreter, BuildMetadata, ConfigurationInfo, ExitStatus, ParseMode,
    ParsedBepOutput, TargetKey, TargetResult,
};
pub use proto::{BuildEvent, BuildEventKind};
pub use reader::{write_delimited, DelimitedEventReader};
pub use stream::{BuildEventStreamProvider, CancellationFlag, ReaderStreamProvider};
pub use test_results::{TestResult, TestResults};
