//! Error types for the MOF compiler

use thiserror::Error;

/// A source location: file, 1-based line and column
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Result type for compiler operations
pub type MofResult<T> = Result<T, MofError>;

/// Failures raised by the MOF compiler
#[derive(Error, Debug)]
pub enum MofError {
    /// Lexical or syntactic error in the MOF source
    #[error("MOF parse error at {location}: {message}")]
    Parse {
        location: SourceLocation,
        message: String,
    },

    /// A name that could not be resolved during the semantic pass
    #[error("MOF resolution error at {location}: {message}")]
    Resolve {
        location: SourceLocation,
        message: String,
    },

    /// A repository mutation failed; successfully applied mutations have
    /// been rolled back (best-effort for qualifier declarations)
    #[error("MOF repository error at {location}: {source}")]
    Repository {
        location: SourceLocation,
        #[source]
        source: rwbem_repo::RepositoryError,
    },

    /// Failure reading the main or an included source file
    #[error("cannot read MOF file {file:?}: {message}")]
    Io { file: String, message: String },
}

impl MofError {
    pub fn parse(location: SourceLocation, message: impl Into<String>) -> Self {
        Self::Parse {
            location,
            message: message.into(),
        }
    }

    pub fn resolve(location: SourceLocation, message: impl Into<String>) -> Self {
        Self::Resolve {
            location,
            message: message.into(),
        }
    }
}
