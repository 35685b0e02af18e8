//! In-memory storage.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use semver::Version;

use crate::{
    CodeSource, Component, ComponentFile, ComponentGetter, ComponentStorage, ComponentTree,
    Dependencies, Index, IndexStorage, PackageManifest, RegistryConfig, RegistryError,
};

/// A stored component version.
#[derive(Debug, Clone)]
struct StoredComponent {
    dependencies: Dependencies,
    files: Arc<Vec<ComponentFile>>,
}

/// Single-process storage backend.
///
/// Keeps the index and every published file in memory. Suitable for tests,
/// benchmarks and embedders that persist state elsewhere.
///
/// # Thread Safety
///
/// Uses `RwLock` for interior mutability. `upsert_index` holds the write
/// lock for the whole merge, which gives the per-call atomicity the driver
/// relies on.
///
/// # Examples
///
/// ```
/// use component_registry::{Dependencies, Driver, MemoryStorage};
///
/// let driver = Driver::new(MemoryStorage::with_defaults());
/// let registration = driver.register_host(Dependencies::new()).unwrap();
///
/// assert!(registration.index.is_empty());
/// ```
#[derive(Debug)]
pub struct MemoryStorage {
    index: RwLock<Index>,
    components: RwLock<BTreeMap<String, BTreeMap<Version, StoredComponent>>>,
    config: RegistryConfig,
}

impl MemoryStorage {
    /// Creates an empty storage with the given configuration.
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            index: RwLock::new(Index::new()),
            components: RwLock::new(BTreeMap::new()),
            config,
        }
    }

    /// Creates an empty storage with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RegistryConfig::default())
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Number of stored component versions.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn version_count(&self) -> usize {
        let components = self.components.read().expect("lock poisoned");
        components.values().map(BTreeMap::len).sum()
    }

    /// Removes all hosts and components.
    ///
    /// # Panics
    ///
    /// Panics if any of the internal locks are poisoned.
    pub fn clear(&self) {
        let mut index = self.index.write().expect("lock poisoned");
        let mut components = self.components.write().expect("lock poisoned");

        *index = Index::new();
        components.clear();
    }

    fn entry_file(&self, files: &[ComponentFile]) -> Result<String, RegistryError> {
        let main = match files.iter().find(|f| f.name() == self.config.manifest_file) {
            Some(manifest) => PackageManifest::parse(manifest.contents())?.main,
            None => None,
        };
        Ok(main
            .map(|main| main.trim_start_matches("./").to_string())
            .unwrap_or_else(|| self.config.default_entry.clone()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Code read from a stored file on demand.
struct StoredCode {
    files: Arc<Vec<ComponentFile>>,
    entry: String,
}

impl CodeSource for StoredCode {
    fn load(&self) -> Result<String, RegistryError> {
        let Some(file) = self.files.iter().find(|f| f.name() == self.entry) else {
            return Ok(String::new());
        };
        String::from_utf8(file.contents().to_vec()).map_err(|err| {
            RegistryError::storage(format!("'{}' is not valid UTF-8: {err}", self.entry))
        })
    }
}

impl IndexStorage for MemoryStorage {
    fn index(&self) -> Result<Index, RegistryError> {
        let index = self.index.read().expect("lock poisoned");
        Ok(index.clone())
    }

    fn upsert_index(&self, entries: Index) -> Result<(), RegistryError> {
        let mut index = self.index.write().expect("lock poisoned");
        index.upsert(entries);
        Ok(())
    }
}

impl ComponentStorage for MemoryStorage {
    fn component_tree(&self) -> Result<ComponentTree, RegistryError> {
        let components = self.components.read().expect("lock poisoned");

        let mut tree = ComponentTree::new();
        for (name, versions) in components.iter() {
            for version in versions.keys() {
                tree.insert(name.clone(), version.clone());
            }
        }
        Ok(tree)
    }

    fn dependencies(
        &self,
        name: &str,
        version: &Version,
    ) -> Result<Option<Dependencies>, RegistryError> {
        let components = self.components.read().expect("lock poisoned");
        Ok(components
            .get(name)
            .and_then(|versions| versions.get(version))
            .map(|stored| stored.dependencies.clone()))
    }

    fn component(
        &self,
        name: &str,
        version: &Version,
    ) -> Result<Option<ComponentGetter>, RegistryError> {
        let files = {
            let components = self.components.read().expect("lock poisoned");
            match components.get(name).and_then(|versions| versions.get(version)) {
                Some(stored) => Arc::clone(&stored.files),
                None => return Ok(None),
            }
        };

        let entry = self.entry_file(&files)?;
        Ok(Some(ComponentGetter::new(
            name,
            version.clone(),
            Arc::new(StoredCode { files, entry }),
        )))
    }

    fn save_component(
        &self,
        component: &Component,
        version: &Version,
        files: Vec<ComponentFile>,
    ) -> Result<(), RegistryError> {
        let mut components = self.components.write().expect("lock poisoned");
        let versions = components.entry(component.name.clone()).or_default();

        if versions.contains_key(version) {
            return Err(RegistryError::component_exists(
                &component.name,
                version.to_string(),
            ));
        }

        versions.insert(
            version.clone(),
            StoredComponent {
                dependencies: component.dependencies.clone(),
                files: Arc::new(files),
            },
        );
        Ok(())
    }
}
