//! Configuration for the registry driver and in-memory storage.

/// Registry configuration.
///
/// Controls which file counts as a component's manifest, where code is
/// looked up, and whether publishing updates existing hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// File name that must accompany every published component.
    ///
    /// Default: `package.json`
    pub manifest_file: String,

    /// Code file used when the manifest has no `main` field.
    ///
    /// Default: `index.js`
    pub default_entry: String,

    /// Whether publishing a version re-evaluates every known host.
    ///
    /// Disable only for bulk imports followed by fresh host registrations.
    /// Default: true
    pub propagate_on_save: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            manifest_file: "package.json".to_string(),
            default_entry: "index.js".to_string(),
            propagate_on_save: true,
        }
    }
}

impl RegistryConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the manifest file name.
    #[must_use]
    pub fn with_manifest_file(mut self, name: impl Into<String>) -> Self {
        self.manifest_file = name.into();
        self
    }

    /// Sets the fallback code file.
    #[must_use]
    pub fn with_default_entry(mut self, name: impl Into<String>) -> Self {
        self.default_entry = name.into();
        self
    }

    /// Enables or disables propagation to existing hosts on publish.
    #[must_use]
    pub const fn with_propagate_on_save(mut self, propagate: bool) -> Self {
        self.propagate_on_save = propagate;
        self
    }
}
