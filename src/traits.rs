//! Storage capability consumed by the registry driver.

use semver::Version;

use crate::{
    Component, ComponentFile, ComponentGetter, ComponentTree, Dependencies, Index, RegistryError,
};

/// Durable host index.
///
/// # Concurrency
///
/// The driver reads the index, computes, and writes back without locking.
/// Implementations must make each [`upsert_index`](Self::upsert_index)
/// call an atomic read-modify-write merge, otherwise concurrent
/// registrations or publishes can lose updates.
pub trait IndexStorage: Send + Sync {
    /// Returns the full current index.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the backend fails.
    fn index(&self) -> Result<Index, RegistryError>;

    /// Merges host entries into the stored index.
    ///
    /// Entries with matching ids are overwritten; other hosts are left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the backend fails.
    fn upsert_index(&self, entries: Index) -> Result<(), RegistryError>;
}

/// Durable catalog of component versions and their files.
///
/// Listing and manifest access are separate so walking the tree only loads
/// the manifests it actually inspects.
pub trait ComponentStorage: Send + Sync {
    /// Lists every published `(name, version)`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the backend fails.
    fn component_tree(&self) -> Result<ComponentTree, RegistryError>;

    /// Returns the peer dependencies of a published version, or `None` if
    /// it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the backend fails.
    fn dependencies(
        &self,
        name: &str,
        version: &Version,
    ) -> Result<Option<Dependencies>, RegistryError>;

    /// Returns a getter for a published version, or `None` if it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the backend fails.
    fn component(
        &self,
        name: &str,
        version: &Version,
    ) -> Result<Option<ComponentGetter>, RegistryError>;

    /// Persists a new component version.
    ///
    /// Callers have already checked that `version` is new and that the
    /// manifest is among `files`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the backend fails.
    fn save_component(
        &self,
        component: &Component,
        version: &Version,
        files: Vec<ComponentFile>,
    ) -> Result<(), RegistryError>;
}

/// Everything the driver needs from its backend.
pub trait Storage: IndexStorage + ComponentStorage {}

impl<T: IndexStorage + ComponentStorage> Storage for T {}

impl<T: IndexStorage + ?Sized> IndexStorage for std::sync::Arc<T> {
    fn index(&self) -> Result<Index, RegistryError> {
        (**self).index()
    }

    fn upsert_index(&self, entries: Index) -> Result<(), RegistryError> {
        (**self).upsert_index(entries)
    }
}

impl<T: ComponentStorage + ?Sized> ComponentStorage for std::sync::Arc<T> {
    fn component_tree(&self) -> Result<ComponentTree, RegistryError> {
        (**self).component_tree()
    }

    fn dependencies(
        &self,
        name: &str,
        version: &Version,
    ) -> Result<Option<Dependencies>, RegistryError> {
        (**self).dependencies(name, version)
    }

    fn component(
        &self,
        name: &str,
        version: &Version,
    ) -> Result<Option<ComponentGetter>, RegistryError> {
        (**self).component(name, version)
    }

    fn save_component(
        &self,
        component: &Component,
        version: &Version,
        files: Vec<ComponentFile>,
    ) -> Result<(), RegistryError> {
        (**self).save_component(component, version, files)
    }
}
