//! `package.json` parsing.

use serde_json::Value;

use crate::{Dependencies, ManifestError};

/// The parts of a component's `package.json` the registry reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageManifest {
    /// `name` field.
    pub name: Option<String>,
    /// `version` field.
    pub version: Option<String>,
    /// `main` field: the file holding the component's code.
    pub main: Option<String>,
    /// `peerDependencies` field.
    pub peer_dependencies: Dependencies,
}

impl PackageManifest {
    /// Parses manifest bytes.
    ///
    /// Unknown fields are ignored. A missing `peerDependencies` yields an
    /// empty map.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError` if the input is not a JSON object or a known
    /// field has the wrong type.
    ///
    /// # Examples
    ///
    /// ```
    /// use component_registry::PackageManifest;
    ///
    /// let manifest = PackageManifest::parse(br#"{
    ///     "name": "mycomp",
    ///     "main": "dist/index.js",
    ///     "peerDependencies": { "react": "^16.8.0" }
    /// }"#).unwrap();
    ///
    /// assert_eq!(manifest.main.as_deref(), Some("dist/index.js"));
    /// assert_eq!(manifest.peer_dependencies.get("react"), Some("^16.8.0"));
    /// ```
    pub fn parse(bytes: &[u8]) -> Result<Self, ManifestError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|err| ManifestError::InvalidJson {
                message: err.to_string(),
            })?;
        let object = value.as_object().ok_or(ManifestError::NotAnObject)?;

        let peer_dependencies = match object.get("peerDependencies") {
            None | Some(Value::Null) => Dependencies::new(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(name, range)| {
                    range
                        .as_str()
                        .map(|range| (name.clone(), range.to_string()))
                        .ok_or(ManifestError::InvalidField {
                            field: "peerDependencies",
                            expected: "an object of strings",
                        })
                })
                .collect::<Result<Dependencies, _>>()?,
            Some(_) => {
                return Err(ManifestError::InvalidField {
                    field: "peerDependencies",
                    expected: "an object of strings",
                });
            }
        };

        Ok(Self {
            name: string_field(object, "name")?,
            version: string_field(object, "version")?,
            main: string_field(object, "main")?,
            peer_dependencies,
        })
    }
}

fn string_field(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ManifestError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ManifestError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_manifest() {
        let manifest = PackageManifest::parse(b"{}").unwrap();
        assert_eq!(manifest, PackageManifest::default());
    }

    #[test]
    fn reads_known_fields() {
        let manifest = PackageManifest::parse(
            br#"{"name":"mycomp","version":"1.2.0","main":"index.js","peerDependencies":{"react":"^16.0.0"},"scripts":{}}"#,
        )
        .unwrap();
        assert_eq!(manifest.name.as_deref(), Some("mycomp"));
        assert_eq!(manifest.version.as_deref(), Some("1.2.0"));
        assert_eq!(manifest.main.as_deref(), Some("index.js"));
        assert_eq!(manifest.peer_dependencies.len(), 1);
    }

    #[test]
    fn rejects_non_objects() {
        assert_eq!(PackageManifest::parse(b"[]"), Err(ManifestError::NotAnObject));
        assert!(matches!(
            PackageManifest::parse(b"{"),
            Err(ManifestError::InvalidJson { .. })
        ));
    }

    #[test]
    fn rejects_wrong_field_types() {
        assert!(matches!(
            PackageManifest::parse(br#"{"main": 3}"#),
            Err(ManifestError::InvalidField { field: "main", .. })
        ));
        assert!(matches!(
            PackageManifest::parse(br#"{"peerDependencies": {"react": 16}}"#),
            Err(ManifestError::InvalidField {
                field: "peerDependencies",
                ..
            })
        ));
    }
}
