//! Builders for synthetic build events
//!
//! Used by this crate's tests and by downstream crates that need BEP input
//! without running a build.

use crate::proto::{
    build_event, build_event_id, file, BuildEvent, BuildEventId, BuildFinished, BuildFinishedId,
    BuildStarted, BuildStartedId, Configuration, ConfigurationId, ExitCode, File,
    NamedSetOfFiles, NamedSetOfFilesId, OutputGroup, TargetComplete, TargetCompletedId,
};
use crate::reader::write_delimited;

fn event(id: build_event_id::Id, payload: build_event::Payload) -> BuildEvent {
    BuildEvent {
        id: Some(BuildEventId { id: Some(id) }),
        children: Vec::new(),
        last_message: false,
        payload: Some(payload),
    }
}

pub fn started(uuid: &str) -> BuildEvent {
    event(
        build_event_id::Id::Started(BuildStartedId {}),
        build_event::Payload::Started(BuildStarted {
            uuid: uuid.to_string(),
            command: "test".to_string(),
            ..Default::default()
        }),
    )
}

pub fn configuration(id: &str, mnemonic: &str) -> BuildEvent {
    event(
        build_event_id::Id::Configuration(ConfigurationId { id: id.to_string() }),
        build_event::Payload::Configuration(Configuration {
            mnemonic: mnemonic.to_string(),
            ..Default::default()
        }),
    )
}

/// A file whose URI is the `file://` form of `path`
pub fn file_entry(path: &str) -> File {
    let uri = if path.starts_with('/') {
        format!("file://{path}")
    } else {
        format!("file:///{path}")
    };
    File {
        name: path.to_string(),
        location: Some(file::Location::Uri(uri)),
        ..Default::default()
    }
}

pub fn set_of_files(paths: &[&str], id: &str, children: &[&str]) -> BuildEvent {
    event(
        build_event_id::Id::NamedSet(NamedSetOfFilesId { id: id.to_string() }),
        build_event::Payload::NamedSetOfFiles(NamedSetOfFiles {
            files: paths.iter().map(|p| file_entry(p)).collect(),
            file_sets: children
                .iter()
                .map(|c| NamedSetOfFilesId { id: c.to_string() })
                .collect(),
        }),
    )
}

pub fn output_group(name: &str, file_sets: &[&str]) -> OutputGroup {
    OutputGroup {
        name: name.to_string(),
        file_sets: file_sets
            .iter()
            .map(|s| NamedSetOfFilesId { id: s.to_string() })
            .collect(),
        incomplete: false,
    }
}

pub fn target_complete(label: &str, configuration_id: &str, groups: Vec<OutputGroup>) -> BuildEvent {
    event(
        build_event_id::Id::TargetCompleted(TargetCompletedId {
            label: label.to_string(),
            aspect: String::new(),
            configuration: Some(ConfigurationId {
                id: configuration_id.to_string(),
            }),
        }),
        build_event::Payload::Completed(TargetComplete {
            success: true,
            output_group: groups,
            tag: Vec::new(),
        }),
    )
}

/// Completion of `aspect` applied to a target
pub fn aspect_complete(
    label: &str,
    configuration_id: &str,
    aspect: &str,
    groups: Vec<OutputGroup>,
) -> BuildEvent {
    let mut event = target_complete(label, configuration_id, groups);
    if let Some(BuildEventId {
        id: Some(build_event_id::Id::TargetCompleted(id)),
    }) = event.id.as_mut()
    {
        id.aspect = aspect.to_string();
    }
    event
}

pub fn finished(overall_success: bool, exit_name: &str, exit_code: i32) -> BuildEvent {
    let mut finished = event(
        build_event_id::Id::BuildFinished(BuildFinishedId {}),
        build_event::Payload::Finished(BuildFinished {
            overall_success,
            finish_time_millis: 0,
            exit_code: Some(ExitCode {
                name: exit_name.to_string(),
                code: exit_code,
            }),
        }),
    );
    finished.last_message = true;
    finished
}

/// Serialize events in the delimited on-disk format
pub fn as_bytes(events: &[BuildEvent]) -> Vec<u8> {
    let mut bytes = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_delimited(&mut bytes, events);
    bytes
}
