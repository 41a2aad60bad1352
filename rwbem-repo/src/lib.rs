//! Repository contract for the RWBEM client
//!
//! The [`Repository`] trait is the storage interface the MOF compiler
//! drives. Two implementations exist: [`MemoryRepository`] (this crate),
//! a nested-map mock, and the live WBEM-server-backed repository in
//! `rwbem-client`.

pub mod error;
pub mod memory;

pub use error::{RepoResult, RepositoryError};
pub use memory::MemoryRepository;

use rwbem_types::{CimClass, CimInstance, CimInstanceName, CimQualifierDeclaration};

/// Storage contract consumed by the MOF compiler.
///
/// Classes and qualifier declarations are keyed by (namespace,
/// case-folded name); instance identity is the instance name. All name
/// lookups are case-insensitive.
pub trait Repository {
    fn get_class(
        &self,
        namespace: &str,
        name: &str,
        local_only: bool,
        include_qualifiers: bool,
        include_class_origin: bool,
    ) -> RepoResult<CimClass>;

    fn create_class(&mut self, namespace: &str, class: CimClass) -> RepoResult<()>;

    fn modify_class(&mut self, namespace: &str, class: CimClass) -> RepoResult<()>;

    fn delete_class(&mut self, namespace: &str, name: &str) -> RepoResult<()>;

    fn get_qualifier(&self, namespace: &str, name: &str) -> RepoResult<CimQualifierDeclaration>;

    fn set_qualifier(
        &mut self,
        namespace: &str,
        declaration: CimQualifierDeclaration,
    ) -> RepoResult<()>;

    fn delete_qualifier(&mut self, namespace: &str, name: &str) -> RepoResult<()>;

    fn enumerate_qualifiers(&self, namespace: &str) -> RepoResult<Vec<CimQualifierDeclaration>>;

    /// Create an instance and return its server-assigned path
    fn create_instance(
        &mut self,
        namespace: &str,
        instance: CimInstance,
    ) -> RepoResult<CimInstanceName>;

    fn get_instance(
        &self,
        namespace: &str,
        path: &CimInstanceName,
    ) -> RepoResult<CimInstance>;

    /// Modify an existing instance. `property_list` restricts which
    /// properties are applied; `include_qualifiers` controls whether
    /// qualifier changes are applied too.
    fn modify_instance(
        &mut self,
        namespace: &str,
        instance: CimInstance,
        include_qualifiers: bool,
        property_list: Option<&[String]>,
    ) -> RepoResult<()>;

    fn delete_instance(&mut self, namespace: &str, path: &CimInstanceName) -> RepoResult<()>;

    fn namespaces(&self) -> RepoResult<Vec<String>>;

    fn create_namespace(&mut self, name: &str) -> RepoResult<()>;

    /// Delete an empty namespace; fails when it still holds objects
    fn delete_namespace(&mut self, name: &str) -> RepoResult<()>;
}
