//! Error classification for the operation client: connection, auth,
//! HTTP, timeout, parse, and server-side CIM failures

use crate::status::CimStatusCode;
use std::time::Duration;
use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// A server-reported CIM error: status code plus the server's
/// description text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{status}{}", .description.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
pub struct CimError {
    pub status: CimStatusCode,
    pub description: Option<String>,
}

impl CimError {
    pub fn new(status: CimStatusCode, description: Option<String>) -> Self {
        Self {
            status,
            description,
        }
    }

    pub fn code(&self) -> u32 {
        self.status.code()
    }
}

/// Failures surfaced by the operation client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Socket, DNS, or TLS-handshake failure reaching the server
    #[error("connection error: {0}")]
    Connection(String),

    /// Certificate validation, hostname mismatch, or HTTP 401 after the
    /// single Basic retry
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Non-2xx, non-401 HTTP status
    #[error("HTTP error {status}: {reason}")]
    Http { status: u16, reason: String },

    /// The configured operation timeout elapsed (includes retries)
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The server returned a CIM status code
    #[error(transparent)]
    Cim(#[from] CimError),

    /// The response failed XML or DSP0201 parsing
    #[error(transparent)]
    Xml(#[from] rwbem_xml::CimXmlError),

    /// A locally detected model violation
    #[error("model error: {0}")]
    Model(#[from] rwbem_types::ModelError),

    /// Invalid connection configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Local misuse of the client API
    #[error("usage error: {0}")]
    Usage(String),
}

impl ClientError {
    /// Whether a retry can help: transient transport failures and HTTP
    /// 5xx responses
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Http { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }

    /// The CIM status code, when this is a server-side CIM error
    pub fn cim_status(&self) -> Option<CimStatusCode> {
        match self {
            Self::Cim(e) => Some(e.status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cim_errors_render_name_code_and_description() {
        let err = CimError::new(
            CimStatusCode::NotFound,
            Some("CIM_ERR_NOT_FOUND: FooQualDecl".to_string()),
        );
        let text = err.to_string();
        assert!(text.contains("CIM_ERR_NOT_FOUND"));
        assert!(text.contains("(6)"));
        assert!(text.contains("FooQualDecl"));
    }

    #[test]
    fn retryability_classification() {
        assert!(ClientError::Connection("reset".into()).is_retryable());
        assert!(ClientError::Http {
            status: 503,
            reason: "unavailable".into()
        }
        .is_retryable());
        assert!(!ClientError::Http {
            status: 404,
            reason: "nope".into()
        }
        .is_retryable());
        assert!(!ClientError::Cim(CimError::new(CimStatusCode::Failed, None)).is_retryable());
        assert!(!ClientError::Timeout(Duration::from_secs(30)).is_retryable());
    }
}
