//! Host/component compatibility checks.

use std::collections::BTreeMap;

use tracing::{trace, warn};

use crate::{Dependencies, VersionRange};

/// A dependency whose host floor does not satisfy the component's range.
///
/// Mismatches are advisory: the ranges overlap, so a host running a newer
/// installed version will work, but the lowest version the host admits
/// would not.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mismatch {
    /// The range declared by the host.
    pub host: String,
    /// The range required by the component.
    pub component: String,
}

impl Mismatch {
    /// Creates a mismatch record.
    #[must_use]
    pub fn new(host: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            component: component.into(),
        }
    }
}

/// Mismatches keyed by dependency name.
pub type Mismatches = BTreeMap<String, Mismatch>;

/// Decides whether a host can use a component version.
///
/// Returns `None` when the pair is incompatible:
/// - the host does not declare a dependency the component requires, or
/// - the host's range and the component's range cannot both be satisfied, or
/// - either range cannot be parsed.
///
/// Otherwise returns the (possibly empty) set of floor mismatches.
///
/// # Examples
///
/// ```
/// use component_registry::{is_compatible, Dependencies};
///
/// let host = Dependencies::from_pairs([("react", "^16.0.0")]);
///
/// let needs_newer = Dependencies::from_pairs([("react", "^16.8.0")]);
/// let mismatches = is_compatible(&host, &needs_newer).unwrap();
/// assert_eq!(mismatches["react"].component, "^16.8.0");
///
/// let needs_next_major = Dependencies::from_pairs([("react", "^17.0.0")]);
/// assert!(is_compatible(&host, &needs_next_major).is_none());
/// ```
#[must_use]
pub fn is_compatible(host: &Dependencies, component: &Dependencies) -> Option<Mismatches> {
    let mut mismatches = Mismatches::new();

    for (name, required) in component.iter() {
        let Some(declared) = host.get(name) else {
            trace!(dependency = name, "registry.matcher.missing_dependency");
            return None;
        };

        let (host_range, component_range) = match (parse(name, declared), parse(name, required)) {
            (Some(h), Some(c)) => (h, c),
            _ => return None,
        };

        if !host_range.intersects(&component_range) {
            trace!(
                dependency = name,
                host = declared,
                component = required,
                "registry.matcher.disjoint"
            );
            return None;
        }

        let floor_satisfies = host_range
            .min_version()
            .is_some_and(|floor| component_range.satisfies(&floor));
        if !floor_satisfies {
            mismatches.insert(name.to_string(), Mismatch::new(declared, required));
        }
    }

    Some(mismatches)
}

fn parse(dependency: &str, range: &str) -> Option<VersionRange> {
    match VersionRange::parse(range) {
        Ok(range) => Some(range),
        Err(err) => {
            warn!(dependency, range, error = %err, "registry.matcher.unparsable_range");
            None
        }
    }
}
