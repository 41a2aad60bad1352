//! In-memory mock repository
//!
//! Storage is a nested map: namespace (folded) → per-kind stores, with
//! classes and qualifier declarations keyed by case-folded name and
//! instances keyed by their canonical path string.

use crate::error::{RepoResult, RepositoryError};
use crate::Repository;
use indexmap::IndexMap;
use rwbem_types::{
    fold_namespace, normalize_namespace, CimClass, CimInstance, CimInstanceName,
    CimQualifierDeclaration, NameMap,
};
use tracing::debug;

#[derive(Debug, Default, Clone)]
struct NamespaceStore {
    /// Normalized original-case namespace name
    name: String,
    classes: NameMap<CimClass>,
    qualifiers: NameMap<CimQualifierDeclaration>,
    /// Keyed by canonical path ([`CimInstanceName::canonical_key`])
    instances: IndexMap<String, CimInstance>,
}

impl NamespaceStore {
    fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.qualifiers.is_empty() && self.instances.is_empty()
    }
}

/// An in-memory [`Repository`] for tests and offline MOF compilation
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    namespaces: IndexMap<String, NamespaceStore>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor with namespaces pre-created
    pub fn with_namespaces<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut repo = Self::new();
        for ns in namespaces {
            // duplicate seeds are harmless
            let _ = repo.create_namespace(ns.as_ref());
        }
        repo
    }

    fn store(&self, namespace: &str) -> RepoResult<&NamespaceStore> {
        self.namespaces
            .get(&fold_namespace(namespace))
            .ok_or_else(|| RepositoryError::NoSuchNamespace(normalize_namespace(namespace)))
    }

    fn store_mut(&mut self, namespace: &str) -> RepoResult<&mut NamespaceStore> {
        self.namespaces
            .get_mut(&fold_namespace(namespace))
            .ok_or_else(|| RepositoryError::NoSuchNamespace(normalize_namespace(namespace)))
    }

    /// Number of instances of the named class, across key variants
    fn instance_count_of(&self, store: &NamespaceStore, class: &str) -> usize {
        store
            .instances
            .values()
            .filter(|inst| inst.class_name == *class)
            .count()
    }
}

impl Repository for MemoryRepository {
    fn get_class(
        &self,
        namespace: &str,
        name: &str,
        local_only: bool,
        include_qualifiers: bool,
        include_class_origin: bool,
    ) -> RepoResult<CimClass> {
        let store = self.store(namespace)?;
        let mut class = store
            .classes
            .get(name)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("class", name, namespace))?;
        if local_only {
            let local: Vec<String> = class
                .properties
                .iter()
                .filter(|(_, p)| p.propagated)
                .map(|(n, _)| n.to_string())
                .collect();
            for name in local {
                class.properties.remove(&name);
            }
            let local_methods: Vec<String> = class
                .methods
                .iter()
                .filter(|(_, m)| m.propagated)
                .map(|(n, _)| n.to_string())
                .collect();
            for name in local_methods {
                class.methods.remove(&name);
            }
        }
        if !include_qualifiers {
            class.qualifiers.clear();
            for property in class.properties.values_mut() {
                property.qualifiers.clear();
            }
            for method in class.methods.values_mut() {
                method.qualifiers.clear();
                for parameter in method.parameters.values_mut() {
                    parameter.qualifiers.clear();
                }
            }
        }
        if !include_class_origin {
            for property in class.properties.values_mut() {
                property.class_origin = None;
            }
            for method in class.methods.values_mut() {
                method.class_origin = None;
            }
        }
        Ok(class)
    }

    fn create_class(&mut self, namespace: &str, class: CimClass) -> RepoResult<()> {
        // borrow the store immutably first for the superclass check
        if let Some(superclass) = &class.superclass {
            let store = self.store(namespace)?;
            if !store.classes.contains(superclass.as_str()) {
                return Err(RepositoryError::InvalidParameter(format!(
                    "superclass {superclass} of {} does not exist",
                    class.class_name
                )));
            }
        }
        let store = self.store_mut(namespace)?;
        if store.classes.contains(class.class_name.as_str()) {
            return Err(RepositoryError::already_exists(
                "class",
                class.class_name.as_str(),
                namespace,
            ));
        }
        debug!(class = %class.class_name, namespace, "creating class");
        store.classes.insert(class.class_name.clone(), class);
        Ok(())
    }

    fn modify_class(&mut self, namespace: &str, class: CimClass) -> RepoResult<()> {
        let store = self.store_mut(namespace)?;
        if !store.classes.contains(class.class_name.as_str()) {
            return Err(RepositoryError::not_found(
                "class",
                class.class_name.as_str(),
                namespace,
            ));
        }
        store.classes.insert(class.class_name.clone(), class);
        Ok(())
    }

    fn delete_class(&mut self, namespace: &str, name: &str) -> RepoResult<()> {
        let store = self.store(namespace)?;
        if !store.classes.contains(name) {
            return Err(RepositoryError::not_found("class", name, namespace));
        }
        let has_children = store
            .classes
            .values()
            .any(|c| c.superclass.as_ref().is_some_and(|s| *s == *name));
        if has_children {
            return Err(RepositoryError::ClassHasChildren(name.to_string()));
        }
        if self.instance_count_of(store, name) > 0 {
            return Err(RepositoryError::ClassHasInstances(name.to_string()));
        }
        let store = self.store_mut(namespace)?;
        store.classes.remove(name);
        Ok(())
    }

    fn get_qualifier(&self, namespace: &str, name: &str) -> RepoResult<CimQualifierDeclaration> {
        self.store(namespace)?
            .qualifiers
            .get(name)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("qualifier", name, namespace))
    }

    fn set_qualifier(
        &mut self,
        namespace: &str,
        declaration: CimQualifierDeclaration,
    ) -> RepoResult<()> {
        let store = self.store_mut(namespace)?;
        store
            .qualifiers
            .insert(declaration.name.clone(), declaration);
        Ok(())
    }

    fn delete_qualifier(&mut self, namespace: &str, name: &str) -> RepoResult<()> {
        let store = self.store_mut(namespace)?;
        store
            .qualifiers
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("qualifier", name, namespace))
    }

    fn enumerate_qualifiers(&self, namespace: &str) -> RepoResult<Vec<CimQualifierDeclaration>> {
        Ok(self.store(namespace)?.qualifiers.values().cloned().collect())
    }

    fn create_instance(
        &mut self,
        namespace: &str,
        mut instance: CimInstance,
    ) -> RepoResult<CimInstanceName> {
        let normalized = normalize_namespace(namespace);
        let path = match &instance.path {
            Some(path) => path.clone().with_namespace(normalized.clone()),
            None => instance.build_path(Some(&normalized))?,
        };
        let store = self.store_mut(namespace)?;
        if !store.classes.contains(instance.class_name.as_str()) {
            return Err(RepositoryError::not_found(
                "class",
                instance.class_name.as_str(),
                namespace,
            ));
        }
        let key = path.canonical_key();
        if store.instances.contains_key(&key) {
            return Err(RepositoryError::already_exists(
                "instance",
                &path.to_wbem_uri(),
                namespace,
            ));
        }
        debug!(path = %path, namespace, "creating instance");
        instance.path = Some(path.clone());
        store.instances.insert(key, instance);
        Ok(path)
    }

    fn get_instance(&self, namespace: &str, path: &CimInstanceName) -> RepoResult<CimInstance> {
        self.store(namespace)?
            .instances
            .get(&path.canonical_key())
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("instance", &path.to_wbem_uri(), namespace))
    }

    fn modify_instance(
        &mut self,
        namespace: &str,
        instance: CimInstance,
        include_qualifiers: bool,
        property_list: Option<&[String]>,
    ) -> RepoResult<()> {
        let path = instance.path.clone().ok_or_else(|| {
            RepositoryError::InvalidParameter("modify_instance requires an instance path".into())
        })?;
        let store = self.store_mut(namespace)?;
        let key = path.canonical_key();
        let existing = store.instances.get_mut(&key).ok_or_else(|| {
            RepositoryError::not_found("instance", &path.to_wbem_uri(), namespace)
        })?;
        for (name, property) in instance.properties.iter() {
            if let Some(list) = property_list {
                if !list.iter().any(|p| name == p.as_str()) {
                    continue;
                }
            }
            existing.properties.insert(name.clone(), property.clone());
        }
        if include_qualifiers {
            existing.qualifiers = instance.qualifiers.clone();
        }
        Ok(())
    }

    fn delete_instance(&mut self, namespace: &str, path: &CimInstanceName) -> RepoResult<()> {
        let store = self.store_mut(namespace)?;
        store
            .instances
            .shift_remove(&path.canonical_key())
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("instance", &path.to_wbem_uri(), namespace))
    }

    fn namespaces(&self) -> RepoResult<Vec<String>> {
        Ok(self.namespaces.values().map(|s| s.name.clone()).collect())
    }

    fn create_namespace(&mut self, name: &str) -> RepoResult<()> {
        let normalized = normalize_namespace(name);
        if normalized.is_empty() {
            return Err(RepositoryError::InvalidParameter(
                "namespace name is empty".into(),
            ));
        }
        let folded = normalized.to_ascii_lowercase();
        if self.namespaces.contains_key(&folded) {
            return Err(RepositoryError::NamespaceExists(normalized));
        }
        self.namespaces.insert(
            folded,
            NamespaceStore {
                name: normalized,
                ..NamespaceStore::default()
            },
        );
        Ok(())
    }

    fn delete_namespace(&mut self, name: &str) -> RepoResult<()> {
        let folded = fold_namespace(name);
        let store = self
            .namespaces
            .get(&folded)
            .ok_or_else(|| RepositoryError::NoSuchNamespace(normalize_namespace(name)))?;
        if !store.is_empty() {
            return Err(RepositoryError::NamespaceNotEmpty(store.name.clone()));
        }
        self.namespaces.shift_remove(&folded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rwbem_types::{CimProperty, CimQualifier, CimScopes, CimType, CimValue};

    fn keyed_class(name: &str) -> CimClass {
        CimClass::new(name).with_property(
            CimProperty::new("Id", CimType::String, false, None)
                .unwrap()
                .with_qualifier(CimQualifier::boolean("Key", true)),
        )
    }

    fn keyed_instance(class: &str, id: &str) -> CimInstance {
        CimInstance::new(class).with_property(
            CimProperty::new("Id", CimType::String, false, Some(CimValue::from(id)))
                .unwrap()
                .with_qualifier(CimQualifier::boolean("Key", true)),
        )
    }

    #[test]
    fn classes_are_namespaced_and_case_insensitive() {
        let mut repo = MemoryRepository::with_namespaces(["root/cimv2"]);
        repo.create_class("ROOT/CIMV2", keyed_class("ACME_Widget"))
            .unwrap();
        let found = repo
            .get_class("root/cimv2", "acme_widget", false, true, true)
            .unwrap();
        assert_eq!(found.class_name.as_str(), "ACME_Widget");
        assert!(matches!(
            repo.get_class("root/other", "ACME_Widget", false, true, true),
            Err(RepositoryError::NoSuchNamespace(_))
        ));
    }

    #[test]
    fn duplicate_create_class_fails() {
        let mut repo = MemoryRepository::with_namespaces(["root"]);
        repo.create_class("root", keyed_class("Foo")).unwrap();
        assert!(matches!(
            repo.create_class("root", keyed_class("FOO")),
            Err(RepositoryError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn superclass_must_exist() {
        let mut repo = MemoryRepository::with_namespaces(["root"]);
        let sub = keyed_class("Sub").with_superclass("Missing");
        assert!(matches!(
            repo.create_class("root", sub),
            Err(RepositoryError::InvalidParameter(_))
        ));
    }

    #[test]
    fn delete_class_refuses_children_and_instances() {
        let mut repo = MemoryRepository::with_namespaces(["root"]);
        repo.create_class("root", keyed_class("Base")).unwrap();
        repo.create_class("root", keyed_class("Sub").with_superclass("Base"))
            .unwrap();
        assert!(matches!(
            repo.delete_class("root", "Base"),
            Err(RepositoryError::ClassHasChildren(_))
        ));
        repo.delete_class("root", "Sub").unwrap();

        repo.create_instance("root", keyed_instance("Base", "a"))
            .unwrap();
        assert!(matches!(
            repo.delete_class("root", "Base"),
            Err(RepositoryError::ClassHasInstances(_))
        ));
    }

    #[test]
    fn instance_identity_is_the_canonical_path() {
        let mut repo = MemoryRepository::with_namespaces(["root"]);
        repo.create_class("root", keyed_class("Foo")).unwrap();
        let path = repo
            .create_instance("root", keyed_instance("Foo", "x1"))
            .unwrap();
        assert_eq!(path.to_wbem_uri(), "root:Foo.Id=\"x1\"");

        // same folded identity, different spelling of class and key name
        let mut dup = CimInstanceName::new("FOO");
        dup.bind("ID", CimValue::from("x1")).unwrap();
        let fetched = repo.get_instance("root", &dup).unwrap();
        assert_eq!(fetched.property_value("Id"), Some(&CimValue::from("x1")));

        assert!(matches!(
            repo.create_instance("root", keyed_instance("Foo", "x1")),
            Err(RepositoryError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn modify_instance_honors_property_list() {
        let mut repo = MemoryRepository::with_namespaces(["root"]);
        repo.create_class("root", keyed_class("Foo")).unwrap();
        let path = repo
            .create_instance(
                "root",
                keyed_instance("Foo", "x1").with_property(
                    CimProperty::new("A", CimType::Uint8, false, Some(CimValue::Uint8(1)))
                        .unwrap(),
                ),
            )
            .unwrap();

        let mut change = keyed_instance("Foo", "x1")
            .with_property(
                CimProperty::new("A", CimType::Uint8, false, Some(CimValue::Uint8(9))).unwrap(),
            )
            .with_path(path.clone());
        change
            .set_property("Id", Some(CimValue::from("ignored")))
            .unwrap();
        repo.modify_instance("root", change, false, Some(&["A".to_string()]))
            .unwrap();

        let fetched = repo.get_instance("root", &path).unwrap();
        assert_eq!(fetched.property_value("A"), Some(&CimValue::Uint8(9)));
        assert_eq!(fetched.property_value("Id"), Some(&CimValue::from("x1")));
    }

    #[test]
    fn qualifier_store_round_trips() {
        let mut repo = MemoryRepository::with_namespaces(["root"]);
        let decl = rwbem_types::CimQualifierDeclaration::new(
            "Description",
            CimType::String,
            false,
            None,
            CimScopes::any(),
        )
        .unwrap();
        repo.set_qualifier("root", decl.clone()).unwrap();
        assert_eq!(repo.get_qualifier("root", "DESCRIPTION").unwrap(), decl);
        assert_eq!(repo.enumerate_qualifiers("root").unwrap().len(), 1);
        repo.delete_qualifier("root", "description").unwrap();
        assert!(repo.get_qualifier("root", "Description").is_err());
    }

    #[test]
    fn namespace_lifecycle() {
        let mut repo = MemoryRepository::new();
        repo.create_namespace("//root/test//").unwrap();
        assert_eq!(repo.namespaces().unwrap(), ["root/test"]);
        assert!(matches!(
            repo.create_namespace("ROOT/TEST"),
            Err(RepositoryError::NamespaceExists(_))
        ));

        repo.create_class("root/test", keyed_class("Foo")).unwrap();
        assert!(matches!(
            repo.delete_namespace("root/test"),
            Err(RepositoryError::NamespaceNotEmpty(_))
        ));
        repo.delete_class("root/test", "Foo").unwrap();
        repo.delete_namespace("root/test").unwrap();
        assert!(repo.namespaces().unwrap().is_empty());
    }
}
