//! Named sets of files and their resolution
//!
//! BEP reports output files as a DAG of named sets: each set lists some files
//! directly and refers to child sets by id. Resolution flattens a set into the
//! ordered, duplicate-free list of files it transitively contains.

use crate::errors::{BepError, Result};
use crate::proto;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::PathBuf;
use url::Url;

/// A file reported by the build
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputFile {
    /// Display name, relative to the path prefix
    pub name: String,
    pub path_prefix: Vec<String>,
    pub uri: Option<String>,
    pub symlink_target: Option<String>,
    pub digest: Option<String>,
    pub length: u64,
}

impl OutputFile {
    pub fn new(name: impl Into<String>, uri: Option<String>) -> Self {
        Self {
            name: name.into(),
            path_prefix: Vec::new(),
            uri,
            symlink_target: None,
            digest: None,
            length: 0,
        }
    }

    pub fn from_proto(file: &proto::File) -> Self {
        let (uri, symlink_target) = match &file.location {
            Some(proto::file::Location::Uri(uri)) => (Some(uri.clone()), None),
            Some(proto::file::Location::SymlinkTargetPath(target)) => (None, Some(target.clone())),
            Some(proto::file::Location::Contents(_)) | None => (None, None),
        };
        Self {
            name: file.name.clone(),
            path_prefix: file.path_prefix.clone(),
            uri,
            symlink_target,
            digest: (!file.digest.is_empty()).then(|| file.digest.clone()),
            length: u64::try_from(file.length).unwrap_or(0),
        }
    }

    /// Path under the output root: the prefix segments joined with the name
    pub fn relative_path(&self) -> String {
        if self.path_prefix.is_empty() {
            return self.name.clone();
        }
        let mut path = self.path_prefix.join("/");
        path.push('/');
        path.push_str(&self.name);
        path
    }

    /// Key used to deduplicate files during resolution
    pub fn identity(&self) -> String {
        self.uri.clone().unwrap_or_else(|| self.relative_path())
    }

    /// Local filesystem path for `file://` URIs
    pub fn local_path(&self) -> Option<PathBuf> {
        let url = Url::parse(self.uri.as_deref()?).ok()?;
        if url.scheme() != "file" {
            return None;
        }
        url.to_file_path().ok()
    }
}

/// Directly listed files and child set ids of one named set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedSet {
    pub files: Vec<OutputFile>,
    pub children: Vec<String>,
}

impl NamedSet {
    pub fn from_proto(set: &proto::NamedSetOfFiles) -> Self {
        Self {
            files: set.files.iter().map(OutputFile::from_proto).collect(),
            children: set.file_sets.iter().map(|id| id.id.clone()).collect(),
        }
    }
}

/// Registry of named sets in the order they were first recorded
#[derive(Debug, Clone, Default)]
pub struct NamedSetResolver {
    sets: IndexMap<String, NamedSet>,
}

struct Frame<'a> {
    id: &'a str,
    set: &'a NamedSet,
    next_child: usize,
}

impl NamedSetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a set, replacing any earlier set with the same id
    pub fn record_set(
        &mut self,
        id: impl Into<String>,
        files: Vec<OutputFile>,
        children: Vec<String>,
    ) -> Option<NamedSet> {
        self.sets.insert(id.into(), NamedSet { files, children })
    }

    pub fn get(&self, id: &str) -> Option<&NamedSet> {
        self.sets.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamedSet)> {
        self.sets.iter().map(|(id, set)| (id.as_str(), set))
    }

    /// Flatten one set into its transitive files.
    ///
    /// Traversal is pre-order depth-first: a set's own files come first, then
    /// each child in declared order. Every set is expanded at most once and a
    /// file reachable along several paths keeps its first position.
    pub fn resolve(&self, id: &str) -> Result<Vec<OutputFile>> {
        self.resolve_all([id])
    }

    /// Flatten several roots into one deduplicated list
    pub fn resolve_all<'i, I>(&self, ids: I) -> Result<Vec<OutputFile>>
    where
        I: IntoIterator<Item = &'i str>,
    {
        let mut files = IndexMap::new();
        let mut expanded = HashSet::new();
        for id in ids {
            self.expand(id, &mut files, &mut expanded)?;
        }
        Ok(files.into_values().collect())
    }

    fn lookup<'a>(&'a self, id: &str, referenced_from: Option<&str>) -> Result<(&'a str, &'a NamedSet)> {
        self.sets
            .get_key_value(id)
            .map(|(key, set)| (key.as_str(), set))
            .ok_or_else(|| BepError::DanglingReference {
                set_id: id.to_string(),
                referenced_from: referenced_from.map(str::to_string),
            })
    }

    fn expand<'a>(
        &'a self,
        root: &str,
        files: &mut IndexMap<String, OutputFile>,
        expanded: &mut HashSet<&'a str>,
    ) -> Result<()> {
        let (root, root_set) = self.lookup(root, None)?;
        if !expanded.insert(root) {
            return Ok(());
        }
        collect_files(root_set, files);

        let mut on_path: HashSet<&str> = HashSet::from([root]);
        let mut stack = vec![Frame {
            id: root,
            set: root_set,
            next_child: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(child) = frame.set.children.get(frame.next_child) else {
                on_path.remove(frame.id);
                stack.pop();
                continue;
            };
            frame.next_child += 1;
            let parent = frame.id;

            if on_path.contains(child.as_str()) {
                let mut path: Vec<String> = stack.iter().map(|f| f.id.to_string()).collect();
                path.push(child.clone());
                return Err(BepError::CyclicNamedSet { path });
            }
            if expanded.contains(child.as_str()) {
                continue;
            }

            let (child_id, child_set) = self.lookup(child, Some(parent))?;
            expanded.insert(child_id);
            on_path.insert(child_id);
            collect_files(child_set, files);
            stack.push(Frame {
                id: child_id,
                set: child_set,
                next_child: 0,
            });
        }
        Ok(())
    }
}

fn collect_files(set: &NamedSet, files: &mut IndexMap<String, OutputFile>) {
    for file in &set.files {
        files
            .entry(file.identity())
            .or_insert_with(|| file.clone());
    }
}
