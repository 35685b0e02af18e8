//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use component_registry::prelude::*;
//!
//! let driver = Driver::new(MemoryStorage::with_defaults());
//! let host = driver.register_host(Dependencies::new()).unwrap();
//! assert!(host.index.is_empty());
//! ```
//!
//! Range and manifest parsing types are left out; import them directly.

pub use crate::{
    // Driver
    ComponentQuery, Driver, HostRegistration, Issue, Issues,
    // Core types
    Component, ComponentFile, ComponentGetter, Dependencies, HostId, Mismatch, Mismatches,
    Version,
    // Storage
    ComponentStorage, CompositionStorage, IndexStorage, MemoryStorage, RegistryConfig, Storage,
    // Errors
    RegistryError,
};
