//! Component descriptors, files, and the component tree.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use semver::Version;

use crate::{Dependencies, PackageManifest, RegistryError};

/// A component version as submitted for publishing.
///
/// `version` is optional because it arrives from outside (a path parameter
/// or manifest field); the driver rejects a publish without one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Component {
    /// Component name.
    pub name: String,
    /// Semver version string.
    pub version: Option<String>,
    /// Peer dependency requirements.
    pub dependencies: Dependencies,
}

impl Component {
    /// Creates a versioned component with no peer dependencies.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
            dependencies: Dependencies::new(),
        }
    }

    /// Creates a component without a version.
    #[must_use]
    pub fn unversioned(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            dependencies: Dependencies::new(),
        }
    }

    /// Sets the peer dependencies.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Dependencies) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Builds a descriptor from an uploaded manifest.
    ///
    /// The manifest's own version is used only when `version` is `None`.
    #[must_use]
    pub fn from_manifest(
        name: impl Into<String>,
        version: Option<String>,
        manifest: &PackageManifest,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.or_else(|| manifest.version.clone()),
            dependencies: manifest.peer_dependencies.clone(),
        }
    }
}

/// A file belonging to a published component.
#[derive(Clone, PartialEq, Eq)]
pub struct ComponentFile {
    name: String,
    contents: Vec<u8>,
}

impl ComponentFile {
    /// Creates a file from its name and contents.
    #[must_use]
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Returns the file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw contents.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

impl fmt::Debug for ComponentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFile")
            .field("name", &self.name)
            .field("len", &self.contents.len())
            .finish()
    }
}

/// Catalog of published versions, without their manifests.
///
/// This is the first phase of a tree walk: listing is cheap, dependencies
/// are fetched per version through
/// [`ComponentStorage::dependencies`](crate::ComponentStorage::dependencies).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentTree(BTreeMap<String, BTreeSet<Version>>);

impl ComponentTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a published version.
    pub fn insert(&mut self, name: impl Into<String>, version: Version) -> bool {
        self.0.entry(name.into()).or_default().insert(version)
    }

    /// Returns true if `name@version` is published.
    #[must_use]
    pub fn contains(&self, name: &str, version: &Version) -> bool {
        self.0.get(name).is_some_and(|versions| versions.contains(version))
    }

    /// Iterates component names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates a component's versions, highest first.
    pub fn versions_descending(&self, name: &str) -> impl Iterator<Item = &Version> {
        self.0.get(name).into_iter().flat_map(|versions| versions.iter().rev())
    }

    /// Number of component names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Lazy access to a component version's code.
pub trait CodeSource: Send + Sync {
    /// Loads the code.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the backend cannot read it.
    fn load(&self) -> Result<String, RegistryError>;
}

/// Code that is already in memory.
///
/// Useful for storage backends that fetch code eagerly, and for tests.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use component_registry::{ComponentGetter, InlineCode, Version};
///
/// let getter = ComponentGetter::new(
///     "header",
///     Version::new(1, 0, 0),
///     Arc::new(InlineCode("exports.default = 'header';".to_string())),
/// );
/// assert_eq!(getter.code().unwrap(), "exports.default = 'header';");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineCode(pub String);

impl CodeSource for InlineCode {
    fn load(&self) -> Result<String, RegistryError> {
        Ok(self.0.clone())
    }
}

/// A resolved component version with deferred code access.
#[derive(Clone)]
pub struct ComponentGetter {
    name: String,
    version: Version,
    source: Arc<dyn CodeSource>,
}

impl ComponentGetter {
    /// Creates a getter.
    #[must_use]
    pub fn new(name: impl Into<String>, version: Version, source: Arc<dyn CodeSource>) -> Self {
        Self {
            name: name.into(),
            version,
            source,
        }
    }

    /// Returns the component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the resolved version.
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Loads the component's code.
    ///
    /// # Errors
    ///
    /// Propagates the storage backend's error.
    pub fn code(&self) -> Result<String, RegistryError> {
        self.source.load()
    }
}

impl fmt::Debug for ComponentGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentGetter")
            .field("name", &self.name)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Parses a component version string.
///
/// # Errors
///
/// Returns `RegistryError::InvalidVersion` if `value` is not semver.
pub fn parse_version(value: &str) -> Result<Version, RegistryError> {
    Version::parse(value.trim()).map_err(|err| RegistryError::invalid_version(value, err))
}
