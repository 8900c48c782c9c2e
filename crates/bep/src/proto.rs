//! Wire types for the subset of `build_event_stream.proto` that blazebridge reads.
//!
//! Field tags match the upstream schema so real build output decodes directly.
//! Fields and events not listed here are skipped by the protobuf decoder.

#![allow(clippy::derive_partial_eq_without_eq)]

use std::collections::HashMap;
use std::fmt;

/// A single event of the build event stream
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BuildEvent {
    #[prost(message, optional, tag = "1")]
    pub id: Option<BuildEventId>,
    #[prost(message, repeated, tag = "2")]
    pub children: Vec<BuildEventId>,
    #[prost(bool, tag = "20")]
    pub last_message: bool,
    #[prost(oneof = "build_event::Payload", tags = "5, 8, 14, 15, 17")]
    pub payload: Option<build_event::Payload>,
}

pub mod build_event {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "5")]
        Started(super::BuildStarted),
        #[prost(message, tag = "8")]
        Completed(super::TargetComplete),
        #[prost(message, tag = "14")]
        Finished(super::BuildFinished),
        #[prost(message, tag = "15")]
        NamedSetOfFiles(super::NamedSetOfFiles),
        #[prost(message, tag = "17")]
        Configuration(super::Configuration),
    }
}

/// Identifier of an event; its variant determines how the payload is read
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BuildEventId {
    #[prost(oneof = "build_event_id::Id", tags = "3, 5, 9, 13, 15")]
    pub id: Option<build_event_id::Id>,
}

pub mod build_event_id {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Id {
        #[prost(message, tag = "3")]
        Started(super::BuildStartedId),
        #[prost(message, tag = "5")]
        TargetCompleted(super::TargetCompletedId),
        #[prost(message, tag = "9")]
        BuildFinished(super::BuildFinishedId),
        #[prost(message, tag = "13")]
        NamedSet(super::NamedSetOfFilesId),
        #[prost(message, tag = "15")]
        Configuration(super::ConfigurationId),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BuildStartedId {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BuildFinishedId {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConfigurationId {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NamedSetOfFilesId {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TargetCompletedId {
    #[prost(string, tag = "1")]
    pub label: String,
    #[prost(string, tag = "2")]
    pub aspect: String,
    #[prost(message, optional, tag = "3")]
    pub configuration: Option<ConfigurationId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BuildStarted {
    #[prost(string, tag = "1")]
    pub uuid: String,
    #[prost(int64, tag = "2")]
    pub start_time_millis: i64,
    #[prost(string, tag = "3")]
    pub build_tool_version: String,
    #[prost(string, tag = "5")]
    pub command: String,
    #[prost(string, tag = "6")]
    pub working_directory: String,
    #[prost(string, tag = "7")]
    pub workspace_directory: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Configuration {
    #[prost(string, tag = "1")]
    pub mnemonic: String,
    #[prost(string, tag = "2")]
    pub platform_name: String,
    #[prost(string, tag = "3")]
    pub cpu: String,
    #[prost(map = "string, string", tag = "4")]
    pub make_variable: HashMap<String, String>,
    #[prost(bool, tag = "5")]
    pub is_tool: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NamedSetOfFiles {
    #[prost(message, repeated, tag = "1")]
    pub files: Vec<File>,
    #[prost(message, repeated, tag = "2")]
    pub file_sets: Vec<NamedSetOfFilesId>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct File {
    #[prost(string, repeated, tag = "4")]
    pub path_prefix: Vec<String>,
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "5")]
    pub digest: String,
    #[prost(int64, tag = "6")]
    pub length: i64,
    #[prost(oneof = "file::Location", tags = "2, 3, 7")]
    pub location: Option<file::Location>,
}

pub mod file {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Location {
        #[prost(string, tag = "2")]
        Uri(String),
        #[prost(bytes, tag = "3")]
        Contents(Vec<u8>),
        #[prost(string, tag = "7")]
        SymlinkTargetPath(String),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TargetComplete {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(message, repeated, tag = "2")]
    pub output_group: Vec<OutputGroup>,
    #[prost(string, repeated, tag = "3")]
    pub tag: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OutputGroup {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, repeated, tag = "3")]
    pub file_sets: Vec<NamedSetOfFilesId>,
    #[prost(bool, tag = "4")]
    pub incomplete: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BuildFinished {
    #[prost(bool, tag = "1")]
    pub overall_success: bool,
    #[prost(int64, tag = "2")]
    pub finish_time_millis: i64,
    #[prost(message, optional, tag = "3")]
    pub exit_code: Option<ExitCode>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExitCode {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(int32, tag = "2")]
    pub code: i32,
}

/// Discriminant of a decoded event, derived from its identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildEventKind {
    Started,
    Configuration,
    NamedSetOfFiles,
    TargetCompleted,
    Finished,
    /// Any event outside the modelled subset
    Other,
}

impl fmt::Display for BuildEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildEventKind::Started => "started",
            BuildEventKind::Configuration => "configuration",
            BuildEventKind::NamedSetOfFiles => "named_set_of_files",
            BuildEventKind::TargetCompleted => "target_completed",
            BuildEventKind::Finished => "finished",
            BuildEventKind::Other => "other",
        };
        f.write_str(name)
    }
}

impl BuildEvent {
    /// Kind of this event as declared by its identifier
    pub fn kind(&self) -> BuildEventKind {
        use build_event_id::Id;
        match self.id.as_ref().and_then(|id| id.id.as_ref()) {
            Some(Id::Started(_)) => BuildEventKind::Started,
            Some(Id::Configuration(_)) => BuildEventKind::Configuration,
            Some(Id::NamedSet(_)) => BuildEventKind::NamedSetOfFiles,
            Some(Id::TargetCompleted(_)) => BuildEventKind::TargetCompleted,
            Some(Id::BuildFinished(_)) => BuildEventKind::Finished,
            None => BuildEventKind::Other,
        }
    }
}
