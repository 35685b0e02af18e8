//! End-to-end registry scenarios against in-memory and composed storage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use component_registry::{
    Component, ComponentFile, ComponentGetter, ComponentQuery, ComponentStorage, ComponentTree,
    CompositionStorage, Dependencies, Driver, HostId, Index, IndexStorage, MemoryStorage,
    RegistryError, Version,
};

fn deps<const N: usize>(pairs: [(&str, &str); N]) -> Dependencies {
    Dependencies::from_pairs(pairs)
}

fn package(main: &str, code: &str) -> Vec<ComponentFile> {
    vec![
        ComponentFile::new("package.json", format!(r#"{{"main":"{main}"}}"#)),
        ComponentFile::new(main, code),
    ]
}

/// Storage wrapper counting every mutating call.
#[derive(Default)]
struct CountingStorage {
    inner: MemoryStorage,
    saves: AtomicUsize,
    upserts: AtomicUsize,
}

impl CountingStorage {
    fn mutations(&self) -> usize {
        self.saves.load(Ordering::SeqCst) + self.upserts.load(Ordering::SeqCst)
    }
}

impl IndexStorage for CountingStorage {
    fn index(&self) -> Result<Index, RegistryError> {
        self.inner.index()
    }

    fn upsert_index(&self, entries: Index) -> Result<(), RegistryError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert_index(entries)
    }
}

impl ComponentStorage for CountingStorage {
    fn component_tree(&self) -> Result<ComponentTree, RegistryError> {
        self.inner.component_tree()
    }

    fn dependencies(
        &self,
        name: &str,
        version: &Version,
    ) -> Result<Option<Dependencies>, RegistryError> {
        self.inner.dependencies(name, version)
    }

    fn component(
        &self,
        name: &str,
        version: &Version,
    ) -> Result<Option<ComponentGetter>, RegistryError> {
        self.inner.component(name, version)
    }

    fn save_component(
        &self,
        component: &Component,
        version: &Version,
        files: Vec<ComponentFile>,
    ) -> Result<(), RegistryError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save_component(component, version, files)
    }
}

/// Index backend that is always down.
struct UnavailableIndex;

impl IndexStorage for UnavailableIndex {
    fn index(&self) -> Result<Index, RegistryError> {
        Err(RegistryError::storage("index unavailable"))
    }

    fn upsert_index(&self, _entries: Index) -> Result<(), RegistryError> {
        Err(RegistryError::storage("index unavailable"))
    }
}

#[test]
fn empty_registry_registers_host_with_empty_index() {
    let driver = Driver::new(MemoryStorage::with_defaults());

    let registration = driver.register_host(Dependencies::new()).unwrap();

    assert_eq!(registration.id, HostId::identify(&Dependencies::new()));
    assert!(registration.index.is_empty());
    assert!(registration.issues.is_empty());
}

#[test]
fn host_receives_component_whose_dependencies_it_provides() {
    let driver = Driver::new(MemoryStorage::with_defaults());
    driver
        .save_component(
            &Component::new("compA", "1.0.0").with_dependencies(deps([("depA", "^1.0.0")])),
            package("index.js", ""),
        )
        .unwrap();

    let registration = driver
        .register_host(deps([("depA", "^1.0.0"), ("depB", "^1.0.0")]))
        .unwrap();

    assert_eq!(registration.index.len(), 1);
    assert_eq!(registration.index["compA"], Version::new(1, 0, 0));
    assert!(registration.issues.is_empty());
}

#[test]
fn publishing_updates_previously_registered_host() {
    let driver = Driver::new(MemoryStorage::with_defaults());
    let host = driver.register_host(deps([("depA", "^1.0.0")])).unwrap();
    assert!(host.index.is_empty());

    let issues = driver
        .save_component(
            &Component::new("compA", "1.0.0").with_dependencies(deps([("depA", "^1.0.0")])),
            package("index.js", ""),
        )
        .unwrap();
    assert!(issues.is_empty());

    let index = driver.storage().index().unwrap();
    assert_eq!(
        index.get(&host.id).unwrap().version_of("compA"),
        Some(&Version::new(1, 0, 0))
    );

    let again = driver.register_host(deps([("depA", "^1.0.0")])).unwrap();
    assert_eq!(again.index["compA"], Version::new(1, 0, 0));
}

#[test]
fn unknown_host_and_missing_version_are_reported() {
    let driver = Driver::new(MemoryStorage::with_defaults());
    let host = driver.register_host(Dependencies::new()).unwrap();

    let err = driver
        .get_component(&ComponentQuery::new("unknown", "compA"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnknownHost { ref host_id } if host_id == "unknown"));
    assert_eq!(err.http_status(), 404);

    let err = driver
        .get_component(&ComponentQuery::new(host.id.to_string(), "compA").with_version("9.9.9"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::NoComponent { .. }));
    assert!(err.is_not_found());
}

#[test]
fn mismatch_is_reported_but_does_not_block() {
    let driver = Driver::new(MemoryStorage::with_defaults());
    driver
        .save_component(
            &Component::new("compA", "1.0.0").with_dependencies(deps([("depA", "^1.3.0")])),
            package("index.js", ""),
        )
        .unwrap();

    let registration = driver.register_host(deps([("depA", "^1.0.0")])).unwrap();

    assert_eq!(registration.index["compA"], Version::new(1, 0, 0));
    let issue = &registration.issues["compA"];
    assert_eq!(issue.mismatches.len(), 1);
    assert_eq!(issue.mismatches["depA"].host, "^1.0.0");
    assert_eq!(issue.mismatches["depA"].component, "^1.3.0");
}

#[test]
fn re_registration_does_not_touch_the_index() {
    let storage = Arc::new(CountingStorage::default());
    let driver = Driver::new(Arc::clone(&storage));

    let first = driver.register_host(deps([("depA", "^1.0.0")])).unwrap();
    assert_eq!(storage.upserts.load(Ordering::SeqCst), 1);

    let second = driver.register_host(deps([("depA", "^1.0.0")])).unwrap();
    assert_eq!(second.id, first.id);
    assert!(second.issues.is_empty());
    assert_eq!(storage.upserts.load(Ordering::SeqCst), 1);
}

#[test]
fn highest_compatible_version_is_assigned() {
    let driver = Driver::new(MemoryStorage::with_defaults());
    for version in ["1.0.0", "2.0.0"] {
        driver
            .save_component(
                &Component::new("compA", version).with_dependencies(deps([("depA", "^1.0.0")])),
                package("index.js", version),
            )
            .unwrap();
    }

    let host = driver.register_host(deps([("depA", "^1.0.0")])).unwrap();
    assert_eq!(host.index["compA"], Version::new(2, 0, 0));

    let code = driver
        .get_component(&ComponentQuery::new(host.id.to_string(), "compA"))
        .and_then(|getter| getter.code())
        .unwrap();
    assert_eq!(code, "2.0.0");
}

#[test]
fn publishing_an_older_version_never_downgrades() {
    let driver = Driver::new(MemoryStorage::with_defaults());
    driver
        .save_component(&Component::new("compA", "2.0.0"), package("index.js", ""))
        .unwrap();
    let host = driver.register_host(Dependencies::new()).unwrap();

    let issues = driver
        .save_component(&Component::new("compA", "1.5.0"), package("index.js", ""))
        .unwrap();
    assert!(issues.is_empty());

    let index = driver.storage().index().unwrap();
    assert_eq!(
        index.get(&host.id).unwrap().version_of("compA"),
        Some(&Version::new(2, 0, 0))
    );
}

#[test]
fn save_preconditions_leave_storage_untouched() {
    let storage = Arc::new(CountingStorage::default());
    let driver = Driver::new(Arc::clone(&storage));
    driver.register_host(Dependencies::new()).unwrap();
    let baseline = storage.mutations();

    let err = driver
        .save_component(&Component::unversioned("compA"), package("index.js", ""))
        .unwrap_err();
    assert!(matches!(err, RegistryError::NoComponentVersion { .. }));

    let err = driver
        .save_component(
            &Component::new("compA", "1.0.0"),
            vec![ComponentFile::new("index.js", "")],
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::NoPackageManifest { .. }));
    assert_eq!(err.http_status(), 400);

    assert_eq!(storage.mutations(), baseline);

    driver
        .save_component(&Component::new("compA", "1.0.0"), package("index.js", ""))
        .unwrap();
    let published = storage.mutations();

    let err = driver
        .save_component(&Component::new("compA", "1.0.0"), package("index.js", ""))
        .unwrap_err();
    assert!(matches!(err, RegistryError::ComponentExists { .. }));
    assert_eq!(err.http_status(), 409);
    assert_eq!(storage.mutations(), published);
}

#[test]
fn explicit_version_serves_code_from_manifest_main() {
    let driver = Driver::new(MemoryStorage::with_defaults());
    driver
        .save_component(
            &Component::new("compA", "1.0.0"),
            package("dist/main.js", "exports.default = 'one';"),
        )
        .unwrap();
    driver
        .save_component(
            &Component::new("compA", "1.1.0"),
            package("dist/main.js", "exports.default = 'two';"),
        )
        .unwrap();

    let getter = driver
        .get_component(&ComponentQuery::new("anyone", "compA").with_version("1.0.0"))
        .unwrap();
    assert_eq!(getter.name(), "compA");
    assert_eq!(getter.code().unwrap(), "exports.default = 'one';");
}

#[test]
fn composed_storage_keeps_index_and_components_apart() {
    let index = Arc::new(MemoryStorage::with_defaults());
    let blobs = Arc::new(MemoryStorage::with_defaults());
    let driver = Driver::new(CompositionStorage::new(Arc::clone(&index), Arc::clone(&blobs)));

    driver
        .save_component(&Component::new("compA", "1.0.0"), package("index.js", "code"))
        .unwrap();
    let host = driver.register_host(Dependencies::new()).unwrap();

    assert!(index.index().unwrap().contains(&host.id));
    assert!(blobs.index().unwrap().is_empty());
    assert_eq!(blobs.version_count(), 1);
    assert_eq!(index.version_count(), 0);

    let code = driver
        .get_component(&ComponentQuery::new(host.id.to_string(), "compA"))
        .and_then(|getter| getter.code())
        .unwrap();
    assert_eq!(code, "code");
}

#[test]
fn host_with_out_of_range_numbers_gets_no_components() {
    let driver = Driver::new(MemoryStorage::with_defaults());
    driver
        .save_component(
            &Component::new("compA", "1.0.0").with_dependencies(deps([("react", "^16.0.0")])),
            package("index.js", ""),
        )
        .unwrap();

    let huge = format!("~16.{}", u64::MAX);
    let registration = driver
        .register_host(deps([("react", huge.as_str())]))
        .unwrap();

    assert!(registration.index.is_empty());
    assert!(registration.issues.is_empty());
}

#[test]
fn backend_failures_surface_as_storage_errors() {
    let driver = Driver::new(CompositionStorage::new(
        UnavailableIndex,
        MemoryStorage::with_defaults(),
    ));

    let err = driver.register_host(Dependencies::new()).unwrap_err();
    assert!(matches!(err, RegistryError::Storage { .. }));
    assert_eq!(err.http_status(), 500);
}
