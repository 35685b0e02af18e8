//! Dependency maps shared by hosts and components.

use std::collections::BTreeMap;
use std::collections::btree_map;

/// Mapping from package name to a semver range string.
///
/// Used both for the capabilities a host declares and for the peer
/// dependencies a component requires. Entries are kept sorted by package
/// name, so iteration order never depends on insertion order.
///
/// # Examples
///
/// ```
/// use component_registry::Dependencies;
///
/// let deps = Dependencies::from_pairs([("react", "^16.8.0"), ("lodash", "^4.17.0")]);
///
/// assert_eq!(deps.get("react"), Some("^16.8.0"));
/// assert_eq!(deps.names().collect::<Vec<_>>(), ["lodash", "react"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Dependencies(BTreeMap<String, String>);

impl Dependencies {
    /// Creates an empty dependency map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(name, range)` pairs. Later duplicates win.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Sets the range for a package, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, range: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), range.into())
    }

    /// Returns the range declared for a package.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns true if the package is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of declared packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(name, range)` in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterates package names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Dependencies {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Dependencies {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl IntoIterator for Dependencies {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<BTreeMap<String, String>> for Dependencies {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_is_sorted_by_name() {
        let deps = Dependencies::from_pairs([("b", "1"), ("c", "1"), ("a", "1")]);
        assert_eq!(deps.names().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn insertion_order_does_not_affect_equality() {
        let left = Dependencies::from_pairs([("a", "^1.0.0"), ("b", "^2.0.0")]);
        let right = Dependencies::from_pairs([("b", "^2.0.0"), ("a", "^1.0.0")]);
        assert_eq!(left, right);
    }

    #[test]
    fn insert_replaces_range() {
        let mut deps = Dependencies::new();
        assert!(deps.insert("react", "^16.0.0").is_none());
        assert_eq!(deps.insert("react", "^17.0.0").as_deref(), Some("^16.0.0"));
        assert_eq!(deps.get("react"), Some("^17.0.0"));
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn empty_map() {
        let deps = Dependencies::new();
        assert!(deps.is_empty());
        assert!(!deps.contains("react"));
    }
}
