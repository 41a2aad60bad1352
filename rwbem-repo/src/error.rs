//! Error types for repository backends

use thiserror::Error;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Failures surfaced by a repository backend.
///
/// The variants mirror the DSP0200 status conditions so that the
/// in-memory mock and the live client-backed repository fail the same
/// way for the same situation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("namespace {0:?} does not exist")]
    NoSuchNamespace(String),

    #[error("namespace {0:?} already exists")]
    NamespaceExists(String),

    #[error("namespace {0:?} is not empty")]
    NamespaceNotEmpty(String),

    #[error("{kind} {name:?} not found in namespace {namespace:?}")]
    NotFound {
        kind: &'static str,
        name: String,
        namespace: String,
    },

    #[error("{kind} {name:?} already exists in namespace {namespace:?}")]
    AlreadyExists {
        kind: &'static str,
        name: String,
        namespace: String,
    },

    #[error("class {0:?} has subclasses")]
    ClassHasChildren(String),

    #[error("class {0:?} has instances")]
    ClassHasInstances(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("model error: {0}")]
    Model(#[from] rwbem_types::ModelError),

    /// Failure of the backing store (for the live repository, the
    /// underlying WBEM operation)
    #[error("repository backend error: {0}")]
    Backend(String),
}

impl RepositoryError {
    pub fn not_found(kind: &'static str, name: &str, namespace: &str) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    }

    pub fn already_exists(kind: &'static str, name: &str, namespace: &str) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    }
}
