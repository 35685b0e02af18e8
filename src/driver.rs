//! The registry driver: host registration, component resolution, publishing.

use std::collections::BTreeMap;

use semver::Version;
use tracing::{debug, trace};

use crate::component::parse_version;
use crate::{
    is_compatible, Component, ComponentFile, ComponentGetter, ComponentTree, ComponentVersions,
    Dependencies, HostEntry, HostId, Index, Mismatches, RegistryConfig, RegistryError, Storage,
};

/// A compatibility warning for a resolved version.
///
/// Issues never block an assignment; they report floor mismatches.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Issue {
    /// The version that was assigned.
    pub version: Version,
    /// The dependencies whose host floor misses the component's range.
    pub mismatches: Mismatches,
}

/// Issues keyed by component name (registration) or host id (publishing).
pub type Issues<K> = BTreeMap<K, Issue>;

/// Result of registering a host.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostRegistration {
    /// The host's id; pass it back on every component request.
    pub id: HostId,
    /// Mismatch warnings per assigned component. Empty for known hosts.
    pub issues: Issues<String>,
    /// The component versions the host receives.
    pub index: ComponentVersions,
}

/// A "get me component X" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentQuery {
    /// Id returned by [`Driver::register_host`].
    pub host_id: String,
    /// Component name.
    pub name: String,
    /// Exact version override; bypasses the index when set.
    pub version: Option<String>,
}

impl ComponentQuery {
    /// Requests whatever version the index assigns to the host.
    #[must_use]
    pub fn new(host_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            host_id: host_id.into(),
            name: name.into(),
            version: None,
        }
    }

    /// Requests an exact version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Resolves component versions for hosts against a [`Storage`] backend.
///
/// The driver holds no mutable state: every call reads storage, computes,
/// and writes back. Concurrent calls are as safe as the backend's
/// `upsert_index` (see [`IndexStorage`](crate::IndexStorage)).
///
/// # Examples
///
/// ```
/// use component_registry::{
///     Component, ComponentFile, ComponentQuery, Dependencies, Driver, MemoryStorage,
/// };
///
/// let driver = Driver::new(MemoryStorage::with_defaults());
///
/// let component = Component::new("compA", "1.0.0")
///     .with_dependencies(Dependencies::from_pairs([("depA", "^1.0.0")]));
/// driver
///     .save_component(&component, vec![ComponentFile::new("package.json", "{}")])
///     .unwrap();
///
/// let host = driver
///     .register_host(Dependencies::from_pairs([("depA", "^1.2.0")]))
///     .unwrap();
/// assert_eq!(host.index["compA"].to_string(), "1.0.0");
///
/// let getter = driver
///     .get_component(&ComponentQuery::new(host.id.to_string(), "compA"))
///     .unwrap();
/// assert_eq!(getter.version().to_string(), "1.0.0");
/// ```
#[derive(Debug, Clone)]
pub struct Driver<S> {
    storage: S,
    config: RegistryConfig,
}

impl<S: Storage> Driver<S> {
    /// Creates a driver with default configuration.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, RegistryConfig::default())
    }

    /// Creates a driver with the given configuration.
    #[must_use]
    pub const fn with_config(storage: S, config: RegistryConfig) -> Self {
        Self { storage, config }
    }

    /// Returns the storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Registers a host and returns the component versions it receives.
    ///
    /// Hosts are identified by their dependency map. A known host gets its
    /// stored assignments back without recomputation. A new host gets, for
    /// every component, the highest version compatible with its
    /// dependencies; the result is persisted to the index.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the backend fails.
    pub fn register_host(
        &self,
        dependencies: Dependencies,
    ) -> Result<HostRegistration, RegistryError> {
        let id = HostId::identify(&dependencies);

        let index = self.storage.index()?;
        if let Some(entry) = index.get(&id) {
            debug!(host = %id, "registry.driver.host_known");
            return Ok(HostRegistration {
                id,
                issues: Issues::new(),
                index: entry.components.clone(),
            });
        }

        let tree = self.storage.component_tree()?;
        let mut components = ComponentVersions::new();
        let mut issues = Issues::new();

        for name in tree.names() {
            let Some((version, mismatches)) = self.highest_compatible(&dependencies, &tree, name)?
            else {
                trace!(host = %id, component = name, "registry.driver.no_compatible_version");
                continue;
            };

            debug!(host = %id, component = name, %version, "registry.driver.version_selected");
            if !mismatches.is_empty() {
                issues.insert(
                    name.to_string(),
                    Issue {
                        version: version.clone(),
                        mismatches,
                    },
                );
            }
            components.insert(name.to_string(), version);
        }

        let entry = HostEntry::new(dependencies, components.clone());
        self.storage
            .upsert_index(std::iter::once((id, entry)).collect())?;

        debug!(
            host = %id,
            components = components.len(),
            issues = issues.len(),
            "registry.driver.host_registered"
        );

        Ok(HostRegistration {
            id,
            issues,
            index: components,
        })
    }

    /// Resolves a component request to a getter for its code.
    ///
    /// An explicit version is fetched as-is, without consulting the index.
    /// Otherwise the host's assigned version is used.
    ///
    /// # Errors
    ///
    /// - `UnknownHost` if no version is given and the host is not indexed
    /// - `NoComponent` if the host has no version of the component, or the
    ///   resolved version is not in storage
    /// - `InvalidVersion` if the explicit version is not semver
    /// - `Storage` if the backend fails
    pub fn get_component(&self, query: &ComponentQuery) -> Result<ComponentGetter, RegistryError> {
        let version = match &query.version {
            Some(version) => parse_version(version)?,
            None => self.assigned_version(&query.host_id, &query.name)?,
        };

        self.storage
            .component(&query.name, &version)?
            .ok_or_else(|| RegistryError::no_component_version_match(&query.name, version.to_string()))
    }

    /// Publishes a new component version.
    ///
    /// After persisting, every indexed host whose assigned version of this
    /// component is lower (or missing) is re-checked; compatible hosts are
    /// moved to the new version. Hosts already on an equal or higher version
    /// are never downgraded.
    ///
    /// Returns the mismatch warnings per updated host.
    ///
    /// # Errors
    ///
    /// Checked before anything is written:
    /// - `NoComponentVersion` if `component.version` is `None`
    /// - `InvalidVersion` if the version is not semver
    /// - `ComponentExists` if the version is already published
    /// - `NoPackageManifest` if no file is named like the configured manifest
    ///
    /// `Storage` if the backend fails.
    pub fn save_component(
        &self,
        component: &Component,
        files: Vec<ComponentFile>,
    ) -> Result<Issues<HostId>, RegistryError> {
        let raw_version = component
            .version
            .as_deref()
            .ok_or_else(|| RegistryError::no_component_version(&component.name))?;
        let version = parse_version(raw_version)?;

        if self.storage.component_tree()?.contains(&component.name, &version) {
            return Err(RegistryError::component_exists(
                &component.name,
                version.to_string(),
            ));
        }

        if !files.iter().any(|f| f.name() == self.config.manifest_file) {
            return Err(RegistryError::no_package_manifest(
                &component.name,
                version.to_string(),
                &self.config.manifest_file,
            ));
        }

        self.storage.save_component(component, &version, files)?;
        debug!(component = %component.name, %version, "registry.driver.component_saved");

        if !self.config.propagate_on_save {
            return Ok(Issues::new());
        }
        self.propagate(component, &version)
    }

    /// Moves compatible hosts onto a newly published version.
    fn propagate(
        &self,
        component: &Component,
        version: &Version,
    ) -> Result<Issues<HostId>, RegistryError> {
        let index = self.storage.index()?;
        let mut updated = Index::new();
        let mut issues = Issues::new();

        for (id, mut entry) in index {
            if entry
                .version_of(&component.name)
                .is_some_and(|current| current >= version)
            {
                trace!(host = %id, component = %component.name, "registry.driver.propagate_skip_newer");
                continue;
            }

            let Some(mismatches) = is_compatible(&entry.dependencies, &component.dependencies)
            else {
                continue;
            };

            entry
                .components
                .insert(component.name.clone(), version.clone());
            if !mismatches.is_empty() {
                issues.insert(
                    id,
                    Issue {
                        version: version.clone(),
                        mismatches,
                    },
                );
            }
            updated.insert(id, entry);
        }

        debug!(
            component = %component.name,
            %version,
            hosts = updated.len(),
            "registry.driver.propagated"
        );

        if !updated.is_empty() {
            self.storage.upsert_index(updated)?;
        }
        Ok(issues)
    }

    /// Highest version of `name` whose peer dependencies the host satisfies.
    fn highest_compatible(
        &self,
        host: &Dependencies,
        tree: &ComponentTree,
        name: &str,
    ) -> Result<Option<(Version, Mismatches)>, RegistryError> {
        for version in tree.versions_descending(name) {
            let Some(required) = self.storage.dependencies(name, version)? else {
                continue;
            };
            if let Some(mismatches) = is_compatible(host, &required) {
                return Ok(Some((version.clone(), mismatches)));
            }
            trace!(component = name, %version, "registry.driver.version_incompatible");
        }
        Ok(None)
    }

    fn assigned_version(&self, host_id: &str, name: &str) -> Result<Version, RegistryError> {
        let id = host_id
            .parse::<HostId>()
            .map_err(|_| RegistryError::unknown_host(host_id))?;

        let index = self.storage.index()?;
        let entry = index
            .get(&id)
            .ok_or_else(|| RegistryError::unknown_host(host_id))?;

        entry
            .version_of(name)
            .cloned()
            .ok_or_else(|| RegistryError::no_component(name))
    }
}
