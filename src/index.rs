//! The host index: which component version each known host receives.

use std::collections::BTreeMap;
use std::collections::btree_map;

use semver::Version;

use crate::{Dependencies, HostId};

/// Component name to assigned version.
pub type ComponentVersions = BTreeMap<String, Version>;

/// A single host's index record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostEntry {
    /// The dependencies the host registered with.
    pub dependencies: Dependencies,
    /// The component versions currently assigned to the host.
    pub components: ComponentVersions,
}

impl HostEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(dependencies: Dependencies, components: ComponentVersions) -> Self {
        Self {
            dependencies,
            components,
        }
    }

    /// Returns the version assigned for a component.
    #[must_use]
    pub fn version_of(&self, name: &str) -> Option<&Version> {
        self.components.get(name)
    }
}

/// Durable mapping from host id to its index record.
///
/// An entry only lists a component version if that version is compatible
/// with the host's dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Index(BTreeMap<HostId, HostEntry>);

impl Index {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a host's entry.
    #[must_use]
    pub fn get(&self, id: &HostId) -> Option<&HostEntry> {
        self.0.get(id)
    }

    /// Returns a host's entry mutably.
    pub fn get_mut(&mut self, id: &HostId) -> Option<&mut HostEntry> {
        self.0.get_mut(id)
    }

    /// Returns true if the host is known.
    #[must_use]
    pub fn contains(&self, id: &HostId) -> bool {
        self.0.contains_key(id)
    }

    /// Adds or replaces a host's entry.
    pub fn insert(&mut self, id: HostId, entry: HostEntry) -> Option<HostEntry> {
        self.0.insert(id, entry)
    }

    /// Merges `other` into `self`: matching ids are overwritten, others kept.
    pub fn upsert(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Number of hosts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no host is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates hosts in id order.
    pub fn iter(&self) -> btree_map::Iter<'_, HostId, HostEntry> {
        self.0.iter()
    }
}

impl FromIterator<(HostId, HostEntry)> for Index {
    fn from_iter<T: IntoIterator<Item = (HostId, HostEntry)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Index {
    type Item = (HostId, HostEntry);
    type IntoIter = btree_map::IntoIter<HostId, HostEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Index {
    type Item = (&'a HostId, &'a HostEntry);
    type IntoIter = btree_map::Iter<'a, HostId, HostEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
