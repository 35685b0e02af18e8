//! Storage composed from separate index and component backends.

use semver::Version;

use crate::{
    Component, ComponentFile, ComponentGetter, ComponentStorage, ComponentTree, Dependencies,
    Index, IndexStorage, RegistryError,
};

/// Combines an index backend with a component backend.
///
/// Deployments commonly keep the small, frequently rewritten index in a
/// key-value store and component files in blob storage.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use component_registry::{CompositionStorage, Driver, MemoryStorage};
///
/// let index = Arc::new(MemoryStorage::with_defaults());
/// let blobs = Arc::new(MemoryStorage::with_defaults());
///
/// let driver = Driver::new(CompositionStorage::new(index, blobs));
/// ```
#[derive(Debug, Clone)]
pub struct CompositionStorage<I, C> {
    index: I,
    components: C,
}

impl<I: IndexStorage, C: ComponentStorage> CompositionStorage<I, C> {
    /// Creates a composed storage.
    #[must_use]
    pub const fn new(index: I, components: C) -> Self {
        Self { index, components }
    }

    /// Returns the index backend.
    #[must_use]
    pub const fn index_storage(&self) -> &I {
        &self.index
    }

    /// Returns the component backend.
    #[must_use]
    pub const fn component_storage(&self) -> &C {
        &self.components
    }
}

impl<I: IndexStorage, C: Send + Sync> IndexStorage for CompositionStorage<I, C> {
    fn index(&self) -> Result<Index, RegistryError> {
        self.index.index()
    }

    fn upsert_index(&self, entries: Index) -> Result<(), RegistryError> {
        self.index.upsert_index(entries)
    }
}

impl<I: Send + Sync, C: ComponentStorage> ComponentStorage for CompositionStorage<I, C> {
    fn component_tree(&self) -> Result<ComponentTree, RegistryError> {
        self.components.component_tree()
    }

    fn dependencies(
        &self,
        name: &str,
        version: &Version,
    ) -> Result<Option<Dependencies>, RegistryError> {
        self.components.dependencies(name, version)
    }

    fn component(
        &self,
        name: &str,
        version: &Version,
    ) -> Result<Option<ComponentGetter>, RegistryError> {
        self.components.component(name, version)
    }

    fn save_component(
        &self,
        component: &Component,
        version: &Version,
        files: Vec<ComponentFile>,
    ) -> Result<(), RegistryError> {
        self.components.save_component(component, version, files)
    }
}
