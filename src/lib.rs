//! Host/component compatibility resolution for a dynamic component registry.
//!
//! Hosts are applications that load shared components at runtime. Both
//! sides declare npm-style dependency ranges: a host declares what it
//! provides, a component declares the peer dependencies it needs. This
//! crate decides which published version of each component every host
//! receives, persists those assignments in an index, and keeps the index
//! current as new versions are published.
//!
//! # Overview
//!
//! - [`Driver::register_host`] identifies a host by its dependency map and
//!   assigns the highest compatible version of every component
//! - [`Driver::get_component`] resolves a host's request to a
//!   [`ComponentGetter`] for the assigned (or explicitly requested) version
//! - [`Driver::save_component`] publishes a version and moves compatible
//!   hosts onto it, never downgrading anyone
//!
//! Storage is abstracted behind [`IndexStorage`] and [`ComponentStorage`].
//! [`MemoryStorage`] implements both; [`CompositionStorage`] combines two
//! separate backends.
//!
//! # Quick Start
//!
//! ```rust
//! use component_registry::{
//!     Component, ComponentFile, ComponentQuery, Dependencies, Driver, MemoryStorage,
//! };
//!
//! let driver = Driver::new(MemoryStorage::with_defaults());
//!
//! // Publish a component that needs react ^16.3.0
//! let component = Component::new("header", "1.0.0")
//!     .with_dependencies(Dependencies::from_pairs([("react", "^16.3.0")]));
//! let files = vec![
//!     ComponentFile::new("package.json", r#"{"main":"index.js"}"#),
//!     ComponentFile::new("index.js", "exports.default = 'header';"),
//! ];
//! driver.save_component(&component, files).unwrap();
//!
//! // A host on react ^16.0.0 gets the component, with a floor warning
//! let host = driver
//!     .register_host(Dependencies::from_pairs([("react", "^16.0.0")]))
//!     .unwrap();
//! assert_eq!(host.index["header"].to_string(), "1.0.0");
//! assert!(host.issues["header"].mismatches.contains_key("react"));
//!
//! let getter = driver
//!     .get_component(&ComponentQuery::new(host.id.to_string(), "header"))
//!     .unwrap();
//! assert_eq!(getter.code().unwrap(), "exports.default = 'header';");
//! ```
//!
//! # Compatibility
//!
//! A component is compatible with a host when every peer dependency it
//! declares is also declared by the host, and the two ranges overlap.
//! Compatible pairs may still carry a *mismatch*: the lowest version the
//! host's range admits falls outside the component's range. Mismatches are
//! reported as [`Issue`]s but never block an assignment.
//!
//! See [`is_compatible`] and [`VersionRange`] for the exact rules.
//!
//! # Logging
//!
//! Resolution decisions are emitted as [`tracing`] events at `debug` and
//! `trace` level. Install any subscriber to see them.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod component;
mod composition;
mod config;
mod dependencies;
mod driver;
mod error;
mod host;
mod index;
mod manifest;
mod matcher;
mod memory;
pub mod prelude;
mod range;
mod traits;

pub use component::{
    parse_version, CodeSource, Component, ComponentFile, ComponentGetter, ComponentTree,
    InlineCode,
};
pub use composition::CompositionStorage;
pub use config::RegistryConfig;
pub use dependencies::Dependencies;
pub use driver::{ComponentQuery, Driver, HostRegistration, Issue, Issues};
pub use error::{ManifestError, RangeError, RegistryError};
pub use host::{HostId, InvalidHostId};
pub use index::{ComponentVersions, HostEntry, Index};
pub use manifest::PackageManifest;
pub use matcher::{is_compatible, Mismatch, Mismatches};
pub use memory::MemoryStorage;
pub use range::VersionRange;
pub use traits::{ComponentStorage, IndexStorage, Storage};

pub use semver::Version;
