//! Error types for registry operations.

use std::fmt;

/// Errors surfaced by the registry driver and storage implementations.
///
/// Every kind is distinguishable by its variant so callers (typically an
/// HTTP front-end) can translate it into a status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The host id is not present in the index.
    UnknownHost {
        /// The host id that was requested
        host_id: String,
    },
    /// No component is available for the request.
    NoComponent {
        /// The requested component name
        name: String,
        /// The explicitly requested version, if any
        version: Option<String>,
    },
    /// A component was published without a version.
    NoComponentVersion {
        /// The component name
        name: String,
    },
    /// The (name, version) pair has already been published.
    ComponentExists {
        /// The component name
        name: String,
        /// The version that already exists
        version: String,
    },
    /// The published files do not contain the package manifest.
    NoPackageManifest {
        /// The component name
        name: String,
        /// The component version
        version: String,
        /// The manifest file name that was expected
        manifest: String,
    },
    /// A version string is not valid semver.
    InvalidVersion {
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: String,
    },
    /// The storage backend failed.
    Storage {
        /// Error message
        message: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownHost { host_id } => {
                write!(
                    f,
                    "host '{host_id}' is not registered; register its dependencies first"
                )
            }
            Self::NoComponent { name, version } => match version {
                Some(version) => write!(f, "couldn't find component '{name}' at version {version}"),
                None => write!(f, "couldn't find a compatible version of component '{name}'"),
            },
            Self::NoComponentVersion { name } => {
                write!(f, "component '{name}' must be published with a version")
            }
            Self::ComponentExists { name, version } => {
                write!(
                    f,
                    "can't publish '{name}@{version}' since it already exists; bump the version"
                )
            }
            Self::NoPackageManifest {
                name,
                version,
                manifest,
            } => {
                write!(f, "missing '{manifest}' file for '{name}@{version}'")
            }
            Self::InvalidVersion { value, reason } => {
                write!(f, "invalid version string '{value}': {reason}")
            }
            Self::Storage { message } => write!(f, "storage error: {message}"),
        }
    }
}

impl std::error::Error for RegistryError {}

impl RegistryError {
    /// Creates an `UnknownHost` error.
    #[must_use]
    pub fn unknown_host(host_id: impl Into<String>) -> Self {
        Self::UnknownHost {
            host_id: host_id.into(),
        }
    }

    /// Creates a `NoComponent` error for an index lookup.
    #[must_use]
    pub fn no_component(name: impl Into<String>) -> Self {
        Self::NoComponent {
            name: name.into(),
            version: None,
        }
    }

    /// Creates a `NoComponent` error for an exact version lookup.
    #[must_use]
    pub fn no_component_version_match(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::NoComponent {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// Creates a `NoComponentVersion` error.
    #[must_use]
    pub fn no_component_version(name: impl Into<String>) -> Self {
        Self::NoComponentVersion { name: name.into() }
    }

    /// Creates a `ComponentExists` error.
    #[must_use]
    pub fn component_exists(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::ComponentExists {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Creates a `NoPackageManifest` error.
    #[must_use]
    pub fn no_package_manifest(
        name: impl Into<String>,
        version: impl Into<String>,
        manifest: impl Into<String>,
    ) -> Self {
        Self::NoPackageManifest {
            name: name.into(),
            version: version.into(),
            manifest: manifest.into(),
        }
    }

    /// Creates an `InvalidVersion` error.
    #[must_use]
    pub fn invalid_version(value: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidVersion {
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns true if the requested host or component could not be found.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownHost { .. } | Self::NoComponent { .. })
    }

    /// Returns true if the error is a rejected publish or request input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoComponentVersion { .. }
                | Self::NoPackageManifest { .. }
                | Self::InvalidVersion { .. }
        )
    }

    /// Returns the HTTP status code a front-end should answer with.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::UnknownHost { .. } | Self::NoComponent { .. } => 404,
            Self::NoComponentVersion { .. }
            | Self::NoPackageManifest { .. }
            | Self::InvalidVersion { .. } => 400,
            Self::ComponentExists { .. } => 409,
            Self::Storage { .. } => 500,
        }
    }
}

/// Errors for version range parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// A comparator's version part could not be parsed.
    InvalidVersion {
        /// The offending token
        token: String,
    },
    /// A hyphen range is missing one of its ends.
    IncompleteHyphenRange {
        /// The whole range
        range: String,
    },
    /// An operator was not followed by a version.
    DanglingOperator {
        /// The operator
        operator: String,
    },
    /// A version number has no successor within `u64`.
    VersionTooLarge {
        /// The offending token
        token: String,
    },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidVersion { token } => write!(f, "invalid version in range: '{token}'"),
            Self::IncompleteHyphenRange { range } => {
                write!(f, "hyphen range '{range}' needs a version on both sides")
            }
            Self::DanglingOperator { operator } => {
                write!(f, "operator '{operator}' is not followed by a version")
            }
            Self::VersionTooLarge { token } => {
                write!(f, "version '{token}' is too large to bound")
            }
        }
    }
}

impl std::error::Error for RangeError {}

/// Errors for package manifest parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// The manifest is not valid JSON.
    InvalidJson {
        /// Parser message
        message: String,
    },
    /// The manifest is valid JSON but not an object.
    NotAnObject,
    /// A field has the wrong type.
    InvalidField {
        /// The field name
        field: &'static str,
        /// What was expected
        expected: &'static str,
    },
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson { message } => write!(f, "manifest is not valid JSON: {message}"),
            Self::NotAnObject => write!(f, "manifest must be a JSON object"),
            Self::InvalidField { field, expected } => {
                write!(f, "manifest field '{field}' must be {expected}")
            }
        }
    }
}

impl std::error::Error for ManifestError {}

impl From<ManifestError> for RegistryError {
    fn from(err: ManifestError) -> Self {
        Self::storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_host_display() {
        let err = RegistryError::unknown_host("abc");
        assert!(err.to_string().contains("'abc' is not registered"));
        assert!(err.is_not_found());
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn no_component_display_mentions_version() {
        let err = RegistryError::no_component_version_match("compA", "9.9.9");
        assert!(err.to_string().contains("9.9.9"));
        assert!(err.is_not_found());

        let err = RegistryError::no_component("compA");
        assert!(err.to_string().contains("compatible version"));
    }

    #[test]
    fn validation_errors_map_to_bad_request() {
        for err in [
            RegistryError::no_component_version("compA"),
            RegistryError::no_package_manifest("compA", "1.0.0", "package.json"),
            RegistryError::invalid_version("1.x.y", "unexpected character"),
        ] {
            assert!(err.is_validation());
            assert_eq!(err.http_status(), 400);
        }
    }

    #[test]
    fn component_exists_is_conflict() {
        let err = RegistryError::component_exists("compA", "1.0.0");
        assert!(err.to_string().contains("compA@1.0.0"));
        assert_eq!(err.http_status(), 409);
        assert!(!err.is_validation());
    }

    #[test]
    fn manifest_error_converts_to_storage() {
        let err: RegistryError = ManifestError::NotAnObject.into();
        assert!(matches!(err, RegistryError::Storage { .. }));
    }

    #[test]
    fn range_error_display() {
        let err = RangeError::DanglingOperator {
            operator: ">=".to_string(),
        };
        assert!(err.to_string().contains("'>='"));
    }
}
