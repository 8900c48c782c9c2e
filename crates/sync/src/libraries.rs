//! Library converters
//!
//! A converter turns synced libraries into entries of the host's library
//! model. Hosts pass an ordered list of converters; the first enabled one is
//! used, and [`DefaultLibraryConverter`] is always enabled so a list ending in
//! it never comes up empty.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Stable identity of a library, derived from its main jar
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LibraryKey(String);

impl LibraryKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Key for a jar given by its workspace-relative path
    pub fn from_jar_path(path: &str) -> Self {
        let trimmed = path.trim_start_matches('/');
        Self(trimmed.replace('/', "_"))
    }

    /// Name of the library in the host's model
    pub fn library_name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LibraryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A library produced by sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub key: LibraryKey,
    pub class_jars: Vec<PathBuf>,
    pub source_jars: Vec<PathBuf>,
}

/// The slice of the host's library model converters need
pub trait LibraryModel {
    fn has_library(&self, name: &str) -> bool;

    fn create_library(&mut self, name: &str);

    /// Replace the class and source roots of an existing library
    fn set_roots(&mut self, name: &str, class_jars: &[PathBuf], source_jars: &[PathBuf]);
}

/// Change applied to the model for one library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryUpdate {
    pub library_name: String,
    pub created: bool,
}

/// Look up a library by key, creating it when missing; returns whether it was created
pub fn get_or_create_library(model: &mut dyn LibraryModel, key: &LibraryKey) -> bool {
    let name = key.library_name();
    if model.has_library(name) {
        return false;
    }
    model.create_library(name);
    true
}

pub trait LibraryConverter: Send + Sync {
    fn name(&self) -> &str;

    fn is_enabled(&self) -> bool;

    fn to_library_names(&self, libraries: &[Library]) -> BTreeSet<String>;

    fn apply_library(&self, model: &mut dyn LibraryModel, library: &Library) -> LibraryUpdate;

    /// Apply every library once, in order, skipping repeated keys
    fn apply_libraries(
        &self,
        model: &mut dyn LibraryModel,
        libraries: &[Library],
    ) -> Vec<LibraryUpdate> {
        let mut seen = BTreeSet::new();
        libraries
            .iter()
            .filter(|library| seen.insert(library.key.clone()))
            .map(|library| self.apply_library(model, library))
            .collect()
    }
}

/// Converter that maps each library to one model entry of the same name
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLibraryConverter;

impl LibraryConverter for DefaultLibraryConverter {
    fn name(&self) -> &str {
        "default"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn to_library_names(&self, libraries: &[Library]) -> BTreeSet<String> {
        libraries
            .iter()
            .map(|library| library.key.library_name().to_string())
            .collect()
    }

    fn apply_library(&self, model: &mut dyn LibraryModel, library: &Library) -> LibraryUpdate {
        let created = get_or_create_library(model, &library.key);
        let name = library.key.library_name();
        model.set_roots(name, &library.class_jars, &library.source_jars);
        LibraryUpdate {
            library_name: name.to_string(),
            created,
        }
    }
}

/// First enabled converter in host order
pub fn first_available(converters: &[Arc<dyn LibraryConverter>]) -> Option<Arc<dyn LibraryConverter>> {
    let selected = converters.iter().find(|c| c.is_enabled()).cloned();
    if let Some(converter) = &selected {
        debug!(converter = converter.name(), "selected library converter");
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MapModel {
        libraries: BTreeMap<String, (Vec<PathBuf>, Vec<PathBuf>)>,
    }

    impl LibraryModel for MapModel {
        fn has_library(&self, name: &str) -> bool {
            self.libraries.contains_key(name)
        }

        fn create_library(&mut self, name: &str) {
            self.libraries.insert(name.to_string(), Default::default());
        }

        fn set_roots(&mut self, name: &str, class_jars: &[PathBuf], source_jars: &[PathBuf]) {
            if let Some(roots) = self.libraries.get_mut(name) {
                *roots = (class_jars.to_vec(), source_jars.to_vec());
            }
        }
    }

    struct Disabled;

    impl LibraryConverter for Disabled {
        fn name(&self) -> &str {
            "disabled"
        }
        fn is_enabled(&self) -> bool {
            false
        }
        fn to_library_names(&self, _: &[Library]) -> BTreeSet<String> {
            BTreeSet::new()
        }
        fn apply_library(&self, _: &mut dyn LibraryModel, library: &Library) -> LibraryUpdate {
            LibraryUpdate {
                library_name: library.key.to_string(),
                created: false,
            }
        }
    }

    fn guava() -> Library {
        Library {
            key: LibraryKey::from_jar_path("third_party/guava/guava.jar"),
            class_jars: vec![PathBuf::from("/out/guava.jar")],
            source_jars: vec![PathBuf::from("/out/guava-src.jar")],
        }
    }

    #[test]
    fn first_enabled_converter_wins() {
        let converters: Vec<Arc<dyn LibraryConverter>> =
            vec![Arc::new(Disabled), Arc::new(DefaultLibraryConverter)];
        let chosen = first_available(&converters).unwrap();
        assert_eq!(chosen.name(), "default");

        let none: Vec<Arc<dyn LibraryConverter>> = vec![Arc::new(Disabled)];
        assert!(first_available(&none).is_none());
    }

    #[test]
    fn default_converter_creates_then_reuses() {
        let mut model = MapModel::default();
        let converter = DefaultLibraryConverter;

        let updates = converter.apply_libraries(&mut model, &[guava(), guava()]);
        assert_eq!(updates.len(), 1);
        assert!(updates[0].created);

        let again = converter.apply_library(&mut model, &guava());
        assert!(!again.created);
        assert_eq!(
            model.libraries["third_party_guava_guava.jar"].0,
            vec![PathBuf::from("/out/guava.jar")]
        );
    }

    #[test]
    fn library_names_are_unique() {
        let names = DefaultLibraryConverter.to_library_names(&[guava(), guava()]);
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["third_party_guava_guava.jar"]);
    }
}
