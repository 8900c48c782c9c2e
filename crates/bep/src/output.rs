//! Folding build events into a queryable snapshot
//!
//! [`BuildEventInterpreter`] consumes events one at a time and records
//! configurations, named sets and completed targets. [`ParsedBepOutput`] is the
//! frozen result, validated once so every later query sees a consistent DAG.

use crate::errors::{BepError, Result};
use crate::named_sets::{NamedSet, NamedSetResolver, OutputFile};
use crate::proto::{build_event, build_event_id, BuildEvent};
use crate::reader::DelimitedEventReader;
use crate::stream::BuildEventStreamProvider;
use blazebridge_core::Label;
use blazebridge_utils::tracing::{bep_parse_completed, bep_span};
use indexmap::IndexMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, trace, warn};

/// A completed target under one configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey {
    pub label: Label,
    pub configuration_id: String,
}

impl TargetKey {
    pub fn new(label: Label, configuration_id: impl Into<String>) -> Self {
        Self {
            label,
            configuration_id: configuration_id.into(),
        }
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.label, self.configuration_id)
    }
}

/// Output groups reported for one target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetResult {
    pub success: bool,
    /// Group name to the named set ids it references, in report order
    pub output_groups: IndexMap<String, Vec<String>>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationInfo {
    pub mnemonic: String,
    pub platform_name: String,
    pub cpu: String,
    pub is_tool: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitStatus {
    pub name: String,
    pub code: i32,
}

/// Build-level facts from the started and finished events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildMetadata {
    pub uuid: Option<String>,
    pub command: Option<String>,
    pub build_tool_version: Option<String>,
    pub workspace_directory: Option<String>,
    pub start_time_millis: Option<i64>,
    pub finish_time_millis: Option<i64>,
    /// Set once a finished event was seen
    pub overall_success: Option<bool>,
    pub exit_status: Option<ExitStatus>,
}

/// How reader and stream errors are treated during a parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Any error fails the parse
    #[default]
    Strict,
    /// Stream errors end the parse early and keep what was read
    BestEffort,
}

impl ParseMode {
    pub fn from_best_effort(best_effort: bool) -> Self {
        if best_effort {
            ParseMode::BestEffort
        } else {
            ParseMode::Strict
        }
    }
}

/// Incremental state built from a stream of events
#[derive(Debug, Default)]
pub struct BuildEventInterpreter {
    resolver: NamedSetResolver,
    targets: IndexMap<TargetKey, TargetResult>,
    configurations: IndexMap<String, ConfigurationInfo>,
    metadata: BuildMetadata,
    events: usize,
    overwritten_targets: usize,
}

impl BuildEventInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events_applied(&self) -> usize {
        self.events
    }

    /// Fold one event into the state
    pub fn apply(&mut self, event: BuildEvent) -> Result<()> {
        use build_event::Payload;
        use build_event_id::Id;

        self.events += 1;
        let kind = event.kind();
        let id = event.id.and_then(|id| id.id);

        match (id, event.payload) {
            (Some(Id::Started(_)), Some(Payload::Started(started))) => {
                self.metadata.uuid = non_empty(started.uuid);
                self.metadata.command = non_empty(started.command);
                self.metadata.build_tool_version = non_empty(started.build_tool_version);
                self.metadata.workspace_directory = non_empty(started.workspace_directory);
                self.metadata.start_time_millis =
                    (started.start_time_millis != 0).then_some(started.start_time_millis);
            }
            (Some(Id::Configuration(id)), Some(Payload::Configuration(configuration))) => {
                self.configurations.insert(
                    id.id,
                    ConfigurationInfo {
                        mnemonic: configuration.mnemonic,
                        platform_name: configuration.platform_name,
                        cpu: configuration.cpu,
                        is_tool: configuration.is_tool,
                    },
                );
            }
            (Some(Id::NamedSet(id)), Some(Payload::NamedSetOfFiles(set))) => {
                if set.file_sets.iter().any(|child| child.id == id.id) {
                    return Err(BepError::SelfReferentialSet { set_id: id.id });
                }
                let NamedSet { files, children } = NamedSet::from_proto(&set);
                if self.resolver.record_set(id.id.clone(), files, children).is_some() {
                    debug!(set_id = %id.id, "named set redefined");
                }
            }
            // Aspect completions share the target's label and configuration
            (Some(Id::TargetCompleted(id)), Some(Payload::Completed(_))) if !id.aspect.is_empty() => {
                debug!(label = %id.label, aspect = %id.aspect, "skipping aspect completion");
            }
            (Some(Id::TargetCompleted(id)), Some(Payload::Completed(completed))) => {
                let configuration_id = id.configuration.map(|c| c.id).unwrap_or_default();
                if !self.configurations.contains_key(&configuration_id) {
                    return Err(BepError::UnknownConfiguration {
                        label: id.label,
                        configuration_id,
                    });
                }
                let mut output_groups = IndexMap::new();
                for group in completed.output_group {
                    if group.incomplete {
                        debug!(label = %id.label, group = %group.name, "output group incomplete");
                    }
                    output_groups
                        .entry(group.name)
                        .or_insert_with(Vec::new)
                        .extend(group.file_sets.into_iter().map(|s| s.id));
                }
                let label = Label::new(id.label)
                    .map_err(|e| BepError::malformed(kind, e.to_string()))?;
                let key = TargetKey::new(label, configuration_id);
                let result = TargetResult {
                    success: completed.success,
                    output_groups,
                    tags: completed.tag,
                };
                if self.targets.insert(key.clone(), result).is_some() {
                    self.overwritten_targets += 1;
                    debug!(target = %key, "target completed twice; keeping the later result");
                }
            }
            (Some(Id::BuildFinished(_)), Some(Payload::Finished(finished))) => {
                self.metadata.overall_success = Some(finished.overall_success);
                self.metadata.finish_time_millis =
                    (finished.finish_time_millis != 0).then_some(finished.finish_time_millis);
                self.metadata.exit_status = finished.exit_code.map(|code| ExitStatus {
                    name: code.name,
                    code: code.code,
                });
            }
            // Ids outside the modelled subset, or payloads the decoder skipped
            (None, _) | (Some(_), None) => {
                trace!(kind = %kind, "skipping build event");
            }
            (Some(_), Some(payload)) => {
                return Err(BepError::malformed(
                    kind,
                    format!("payload {} does not match the event id", payload_name(&payload)),
                ));
            }
        }
        Ok(())
    }

    /// Validate references and freeze the snapshot
    pub fn finish(self, truncation: Option<String>) -> Result<ParsedBepOutput> {
        for (key, result) in &self.targets {
            for set_id in result.output_groups.values().flatten() {
                if !self.resolver.contains(set_id) {
                    return Err(BepError::DanglingReference {
                        set_id: set_id.clone(),
                        referenced_from: Some(key.label.to_string()),
                    });
                }
            }
        }
        // Surfaces dangling children and cycles anywhere in the DAG
        self.resolver
            .resolve_all(self.resolver.iter().map(|(id, _)| id))?;

        Ok(ParsedBepOutput {
            resolver: self.resolver,
            targets: self.targets,
            configurations: self.configurations,
            metadata: self.metadata,
            events: self.events,
            overwritten_targets: self.overwritten_targets,
            truncation,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn payload_name(payload: &build_event::Payload) -> &'static str {
    match payload {
        build_event::Payload::Started(_) => "started",
        build_event::Payload::Completed(_) => "completed",
        build_event::Payload::Finished(_) => "finished",
        build_event::Payload::NamedSetOfFiles(_) => "named_set_of_files",
        build_event::Payload::Configuration(_) => "configuration",
    }
}

/// Immutable result of one BEP ingestion pass
#[derive(Debug, Clone)]
pub struct ParsedBepOutput {
    resolver: NamedSetResolver,
    targets: IndexMap<TargetKey, TargetResult>,
    configurations: IndexMap<String, ConfigurationInfo>,
    metadata: BuildMetadata,
    events: usize,
    overwritten_targets: usize,
    truncation: Option<String>,
}

impl ParsedBepOutput {
    /// Consume a provider to its end and build the snapshot
    pub fn parse<P>(provider: &mut P, mode: ParseMode) -> Result<Self>
    where
        P: BuildEventStreamProvider + ?Sized,
    {
        let span = bep_span(&provider.describe());
        let _enter = span.enter();

        let mut interpreter = BuildEventInterpreter::new();
        let mut truncation = None;
        loop {
            match provider.next_event() {
                Ok(Some(event)) => interpreter.apply(event)?,
                Ok(None) => break,
                Err(e) if mode == ParseMode::BestEffort && !e.is_structural() => {
                    warn!(
                        error = %e,
                        events = interpreter.events_applied(),
                        "build event stream ended early; keeping events read so far"
                    );
                    truncation = Some(e.to_string());
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        let parsed = interpreter.finish(truncation)?;
        bep_parse_completed(
            parsed.events,
            parsed.targets.len(),
            parsed.resolver.len(),
            parsed.is_truncated(),
        );
        Ok(parsed)
    }

    /// Parse a finished BEP output file
    pub fn parse_file(path: &Path, max_message_bytes: usize, mode: ParseMode) -> Result<Self> {
        let mut reader = DelimitedEventReader::open(path, max_message_bytes)?;
        Self::parse(&mut reader, mode)
    }

    pub fn target_results(&self) -> impl Iterator<Item = (&TargetKey, &TargetResult)> {
        self.targets.iter()
    }

    pub fn target(&self, key: &TargetKey) -> Option<&TargetResult> {
        self.targets.get(key)
    }

    /// Resolved files of one output group; empty when the target or group is absent
    pub fn output_group_files(&self, key: &TargetKey, group: &str) -> Result<Vec<OutputFile>> {
        match self.targets.get(key).and_then(|t| t.output_groups.get(group)) {
            Some(set_ids) => self.resolver.resolve_all(set_ids.iter().map(String::as_str)),
            None => Ok(Vec::new()),
        }
    }

    /// Files of the given groups across all targets, deduplicated
    pub fn all_files_in_groups<S: AsRef<str>>(&self, groups: &[S]) -> Result<Vec<OutputFile>> {
        let set_ids = self.targets.values().flat_map(move |target| {
            groups
                .iter()
                .filter_map(move |g| target.output_groups.get(g.as_ref()))
                .flatten()
                .map(String::as_str)
        });
        self.resolver.resolve_all(set_ids)
    }

    pub fn configurations(&self) -> &IndexMap<String, ConfigurationInfo> {
        &self.configurations
    }

    pub fn configuration(&self, id: &str) -> Option<&ConfigurationInfo> {
        self.configurations.get(id)
    }

    pub fn build_metadata(&self) -> &BuildMetadata {
        &self.metadata
    }

    pub fn named_sets(&self) -> &NamedSetResolver {
        &self.resolver
    }

    /// Targets whose earlier completion was replaced by a later one
    pub fn overwritten_targets(&self) -> usize {
        self.overwritten_targets
    }

    pub fn event_count(&self) -> usize {
        self.events
    }

    /// Why a best-effort parse stopped early
    pub fn truncation(&self) -> Option<&str> {
        self.truncation.as_deref()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{BuildEventId, NamedSetOfFiles};
    use crate::testing;

    #[test]
    fn target_under_undeclared_configuration_is_rejected() {
        let mut interpreter = BuildEventInterpreter::new();
        let err = interpreter
            .apply(testing::target_complete("//a:b", "cfg", vec![]))
            .unwrap_err();
        assert!(matches!(err, BepError::UnknownConfiguration { .. }));
    }

    #[test]
    fn self_referential_set_fails_immediately() {
        let mut interpreter = BuildEventInterpreter::new();
        let err = interpreter
            .apply(testing::set_of_files(&["a.txt"], "1", &["1"]))
            .unwrap_err();
        assert!(matches!(err, BepError::SelfReferentialSet { set_id } if set_id == "1"));
    }

    #[test]
    fn mismatched_payload_is_malformed() {
        let mut event = testing::configuration("cfg", "k8");
        event.payload = Some(build_event::Payload::NamedSetOfFiles(NamedSetOfFiles::default()));

        let err = BuildEventInterpreter::new().apply(event).unwrap_err();
        assert!(matches!(err, BepError::MalformedEvent { .. }));
        assert!(err.to_string().contains("configuration"));
    }

    #[test]
    fn empty_target_label_is_malformed() {
        let mut interpreter = BuildEventInterpreter::new();
        interpreter.apply(testing::configuration("cfg", "k8")).unwrap();
        let err = interpreter
            .apply(testing::target_complete("", "cfg", vec![]))
            .unwrap_err();
        assert!(matches!(err, BepError::MalformedEvent { .. }));
    }

    #[test]
    fn events_outside_the_subset_are_ignored() {
        let mut interpreter = BuildEventInterpreter::new();
        interpreter
            .apply(BuildEvent {
                id: Some(BuildEventId::default()),
                ..Default::default()
            })
            .unwrap();
        let parsed = interpreter.finish(None).unwrap();
        assert_eq!(parsed.event_count(), 1);
        assert_eq!(parsed.target_results().count(), 0);
    }

    #[test]
    fn finish_rejects_target_referencing_unknown_set() {
        let mut interpreter = BuildEventInterpreter::new();
        interpreter.apply(testing::configuration("cfg", "k8")).unwrap();
        interpreter
            .apply(testing::target_complete(
                "//a:test",
                "cfg",
                vec![testing::output_group("test.outputs", &["9"])],
            ))
            .unwrap();

        match interpreter.finish(None) {
            Err(BepError::DanglingReference {
                set_id,
                referenced_from,
            }) => {
                assert_eq!(set_id, "9");
                assert_eq!(referenced_from.as_deref(), Some("//a:test"));
            }
            other => panic!("expected dangling reference, got {other:?}"),
        }
    }

    #[test]
    fn finished_event_fills_metadata() {
        let mut interpreter = BuildEventInterpreter::new();
        interpreter.apply(testing::started("abc")).unwrap();
        interpreter.apply(testing::finished(false, "TESTS_FAILED", 3)).unwrap();

        let parsed = interpreter.finish(None).unwrap();
        let metadata = parsed.build_metadata();
        assert_eq!(metadata.uuid.as_deref(), Some("abc"));
        assert_eq!(metadata.overall_success, Some(false));
        assert_eq!(
            metadata.exit_status,
            Some(ExitStatus {
                name: "TESTS_FAILED".into(),
                code: 3
            })
        );
    }

    #[test]
    fn best_effort_flag_maps_to_mode() {
        assert_eq!(ParseMode::from_best_effort(true), ParseMode::BestEffort);
        assert_eq!(ParseMode::from_best_effort(false), ParseMode::Strict);
        assert_eq!(ParseMode::default(), ParseMode::Strict);
    }
}
