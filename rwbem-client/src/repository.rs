//! Live repository backend over a WBEM connection
//!
//! Implements the [`rwbem_repo::Repository`] contract by delegating to
//! DSP0200 operations, so the MOF compiler drives a real server exactly
//! like it drives the in-memory mock. Client errors are mapped onto the
//! repository error variants by CIM status code, keeping the two
//! backends' failure behavior aligned.

use crate::connection::{ClassOptions, InstanceOptions, WbemConnection};
use crate::error::ClientError;
use crate::status::CimStatusCode;
use rwbem_repo::{RepoResult, Repository, RepositoryError};
use rwbem_types::{
    normalize_namespace, CimInstance, CimInstanceName, CimProperty, CimQualifier,
    CimQualifierDeclaration, CimType, CimValue,
};
use tracing::debug;

/// [`Repository`] implementation backed by a live WBEM server
pub struct LiveRepository {
    connection: WbemConnection,
}

impl LiveRepository {
    pub fn new(connection: WbemConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &WbemConnection {
        &self.connection
    }

    pub fn into_connection(self) -> WbemConnection {
        self.connection
    }
}

fn map_err(error: ClientError, kind: &'static str, name: &str, namespace: &str) -> RepositoryError {
    match error.cim_status() {
        Some(CimStatusCode::InvalidNamespace) => {
            RepositoryError::NoSuchNamespace(namespace.to_string())
        }
        Some(CimStatusCode::NotFound) | Some(CimStatusCode::InvalidClass) => {
            RepositoryError::not_found(kind, name, namespace)
        }
        Some(CimStatusCode::AlreadyExists) => {
            RepositoryError::already_exists(kind, name, namespace)
        }
        Some(CimStatusCode::ClassHasChildren) => {
            RepositoryError::ClassHasChildren(name.to_string())
        }
        Some(CimStatusCode::ClassHasInstances) => {
            RepositoryError::ClassHasInstances(name.to_string())
        }
        Some(CimStatusCode::NamespaceNotEmpty) => {
            RepositoryError::NamespaceNotEmpty(namespace.to_string())
        }
        Some(CimStatusCode::InvalidParameter) => {
            RepositoryError::InvalidParameter(error.to_string())
        }
        _ => RepositoryError::Backend(error.to_string()),
    }
}

// interop namespaces probed for CIM_Namespace instances
const INTEROP_CANDIDATES: &[&str] = &["interop", "root/interop", "root"];

fn namespace_instance(namespace: &str) -> RepoResult<(String, CimInstance)> {
    let normalized = normalize_namespace(namespace);
    let (parent, leaf) = match normalized.rsplit_once('/') {
        Some((parent, leaf)) => (parent.to_string(), leaf.to_string()),
        None => {
            return Err(RepositoryError::InvalidParameter(format!(
                "cannot manage top-level namespace {normalized:?} over the wire"
            )))
        }
    };
    let instance = CimInstance::new("__Namespace").with_property(
        CimProperty::new(
            "Name",
            CimType::String,
            false,
            Some(CimValue::String(leaf)),
        )
        .map_err(RepositoryError::Model)?
        .with_qualifier(CimQualifier::boolean("Key", true)),
    );
    Ok((parent, instance))
}

impl Repository for LiveRepository {
    fn get_class(
        &self,
        namespace: &str,
        name: &str,
        local_only: bool,
        include_qualifiers: bool,
        include_class_origin: bool,
    ) -> RepoResult<rwbem_types::CimClass> {
        let options = ClassOptions {
            local_only,
            include_qualifiers,
            include_class_origin,
            property_list: None,
        };
        self.connection
            .get_class(name, Some(namespace), &options)
            .map_err(|e| map_err(e, "class", name, namespace))
    }

    fn create_class(&mut self, namespace: &str, class: rwbem_types::CimClass) -> RepoResult<()> {
        let name = class.class_name.to_string();
        self.connection
            .create_class(&class, Some(namespace))
            .map_err(|e| map_err(e, "class", &name, namespace))
    }

    fn modify_class(&mut self, namespace: &str, class: rwbem_types::CimClass) -> RepoResult<()> {
        let name = class.class_name.to_string();
        self.connection
            .modify_class(&class, Some(namespace))
            .map_err(|e| map_err(e, "class", &name, namespace))
    }

    fn delete_class(&mut self, namespace: &str, name: &str) -> RepoResult<()> {
        self.connection
            .delete_class(name, Some(namespace))
            .map_err(|e| map_err(e, "class", name, namespace))
    }

    fn get_qualifier(
        &self,
        namespace: &str,
        name: &str,
    ) -> RepoResult<CimQualifierDeclaration> {
        self.connection
            .get_qualifier(name, Some(namespace))
            .map_err(|e| map_err(e, "qualifier", name, namespace))
    }

    fn set_qualifier(
        &mut self,
        namespace: &str,
        declaration: CimQualifierDeclaration,
    ) -> RepoResult<()> {
        let name = declaration.name.to_string();
        self.connection
            .set_qualifier(&declaration, Some(namespace))
            .map_err(|e| map_err(e, "qualifier", &name, namespace))
    }

    fn delete_qualifier(&mut self, namespace: &str, name: &str) -> RepoResult<()> {
        self.connection
            .delete_qualifier(name, Some(namespace))
            .map_err(|e| map_err(e, "qualifier", name, namespace))
    }

    fn enumerate_qualifiers(&self, namespace: &str) -> RepoResult<Vec<CimQualifierDeclaration>> {
        self.connection
            .enumerate_qualifiers(Some(namespace))
            .map_err(|e| map_err(e, "qualifier", "*", namespace))
    }

    fn create_instance(
        &mut self,
        namespace: &str,
        instance: CimInstance,
    ) -> RepoResult<CimInstanceName> {
        let name = instance.class_name.to_string();
        self.connection
            .create_instance(&instance, Some(namespace))
            .map_err(|e| map_err(e, "instance", &name, namespace))
    }

    fn get_instance(
        &self,
        namespace: &str,
        path: &CimInstanceName,
    ) -> RepoResult<CimInstance> {
        let scoped = path.clone().with_namespace(namespace.to_string());
        let uri = scoped.to_wbem_uri();
        self.connection
            .get_instance(&scoped, &InstanceOptions::default())
            .map_err(|e| map_err(e, "instance", &uri, namespace))
    }

    fn modify_instance(
        &mut self,
        namespace: &str,
        instance: CimInstance,
        include_qualifiers: bool,
        property_list: Option<&[String]>,
    ) -> RepoResult<()> {
        let mut scoped = instance;
        if let Some(path) = scoped.path.take() {
            scoped.path = Some(path.with_namespace(namespace.to_string()));
        }
        let name = scoped.class_name.to_string();
        self.connection
            .modify_instance(&scoped, include_qualifiers, property_list)
            .map_err(|e| map_err(e, "instance", &name, namespace))
    }

    fn delete_instance(&mut self, namespace: &str, path: &CimInstanceName) -> RepoResult<()> {
        let scoped = path.clone().with_namespace(namespace.to_string());
        let uri = scoped.to_wbem_uri();
        self.connection
            .delete_instance(&scoped)
            .map_err(|e| map_err(e, "instance", &uri, namespace))
    }

    /// Enumerate namespaces: `CIM_Namespace` instances in the first
    /// interop namespace that answers, falling back to the legacy
    /// `__Namespace` class in `root`
    fn namespaces(&self) -> RepoResult<Vec<String>> {
        for candidate in INTEROP_CANDIDATES {
            match self
                .connection
                .enumerate_instance_names("CIM_Namespace", Some(candidate))
            {
                Ok(paths) => {
                    debug!(interop = candidate, "namespaces via CIM_Namespace");
                    return Ok(paths.iter().filter_map(name_binding).collect());
                }
                Err(e) if is_probe_miss(&e) => continue,
                Err(e) => return Err(map_err(e, "namespace", "*", candidate)),
            }
        }
        match self
            .connection
            .enumerate_instance_names("__Namespace", Some("root"))
        {
            Ok(paths) => Ok(paths
                .iter()
                .filter_map(name_binding)
                .map(|n| format!("root/{n}"))
                .collect()),
            Err(e) => Err(map_err(e, "namespace", "*", "root")),
        }
    }

    fn create_namespace(&mut self, name: &str) -> RepoResult<()> {
        let (parent, instance) = namespace_instance(name)?;
        self.connection
            .create_instance(&instance, Some(&parent))
            .map(|_| ())
            .map_err(|e| map_err(e, "namespace", name, &parent))
    }

    fn delete_namespace(&mut self, name: &str) -> RepoResult<()> {
        let (parent, instance) = namespace_instance(name)?;
        let path = instance
            .build_path(Some(&parent))
            .map_err(RepositoryError::Model)?;
        self.connection
            .delete_instance(&path)
            .map_err(|e| map_err(e, "namespace", name, &parent))
    }
}

fn is_probe_miss(error: &ClientError) -> bool {
    matches!(
        error.cim_status(),
        Some(
            CimStatusCode::InvalidNamespace
                | CimStatusCode::InvalidClass
                | CimStatusCode::NotFound
                | CimStatusCode::NotSupported
        )
    )
}

fn name_binding(path: &CimInstanceName) -> Option<String> {
    path.keybinding("Name").and_then(|v| match v {
        CimValue::String(s) => Some(s.clone()),
        _ => None,
    })
}
