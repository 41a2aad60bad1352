//! Connection configuration
//!
//! Constructible in code, loadable from a TOML file, and overridable
//! through environment variables. Loading hierarchy: env > file >
//! defaults.

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

fn default_namespace() -> String {
    "root/cimv2".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_http_path() -> String {
    "/cimom".to_string()
}

/// Configuration for one WBEM connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Server URL, e.g. `https://server:5989`
    pub url: String,

    /// HTTP Basic credentials, sent on every request when set
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,

    /// Namespace used when an operation does not name one
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Total per-operation wall-clock budget, retries included
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// CA bundle file or directory for server-certificate validation;
    /// unset falls back to the well-known OS locations
    #[serde(default)]
    pub ca_certs: Option<PathBuf>,

    /// Client certificate + key (PEM) enabling 2-way TLS
    #[serde(default)]
    pub client_cert: Option<PathBuf>,
    #[serde(default)]
    pub client_key: Option<PathBuf>,

    /// Disable server-certificate validation (test setups only)
    #[serde(default)]
    pub no_verification: bool,

    /// Retry budget for idempotent operations
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// POST path on the server (`/cimom` unless reconfigured)
    #[serde(default = "default_http_path")]
    pub http_path: String,
}

impl ConnectionConfig {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            default_namespace: default_namespace(),
            timeout_ms: default_timeout_ms(),
            ca_certs: None,
            client_cert: None,
            client_key: None,
            no_verification: false,
            max_retries: default_max_retries(),
            http_path: default_http_path(),
        }
    }

    pub fn with_credentials<U: Into<String>, P: Into<String>>(
        mut self,
        username: U,
        password: P,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_default_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.default_namespace = rwbem_types::normalize_namespace(&namespace.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load from a TOML file, then apply environment overrides
    pub fn load_file(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("cannot read {}: {e}", path.display())))?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("cannot parse {}: {e}", path.display())))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `RWBEM_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("RWBEM_URL") {
            self.url = url;
        }
        if let Ok(user) = std::env::var("RWBEM_USER") {
            self.username = Some(user);
        }
        if let Ok(password) = std::env::var("RWBEM_PASSWORD") {
            self.password = Some(password);
        }
        if let Ok(timeout) = std::env::var("RWBEM_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse() {
                self.timeout_ms = ms;
            }
        }
        if let Ok(path) = std::env::var("RWBEM_CA_CERTS") {
            self.ca_certs = Some(PathBuf::from(path));
        }
        if let Ok(flag) = std::env::var("RWBEM_NO_VERIFICATION") {
            self.no_verification = flag.eq_ignore_ascii_case("true") || flag == "1";
        }
    }

    pub fn validate(&self) -> ClientResult<()> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "URL {:?} must start with http:// or https://",
                self.url
            )));
        }
        if self.client_cert.is_some() != self.client_key.is_some() {
            return Err(ClientError::Config(
                "client_cert and client_key must be set together".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_https(&self) -> bool {
        self.url.starts_with("https://")
    }
}

/// Well-known OS locations of CA bundles, filtered to the ones that
/// exist on this host. Process-wide, computed once.
pub fn default_ca_paths() -> &'static [PathBuf] {
    static PATHS: OnceLock<Vec<PathBuf>> = OnceLock::new();
    PATHS.get_or_init(|| {
        [
            "/etc/pki/ca-trust/extracted/pem/tls-ca-bundle.pem",
            "/etc/ssl/certs/ca-certificates.crt",
            "/etc/pki/tls/certs/ca-bundle.crt",
            "/etc/ssl/ca-bundle.pem",
            "/etc/ssl/cert.pem",
        ]
        .iter()
        .map(PathBuf::from)
        .filter(|p| p.exists())
        .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_follow_dsp0200() {
        let config = ConnectionConfig::new("http://server:5988");
        assert_eq!(config.default_namespace, "root/cimv2");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.http_path, "/cimom");
        assert!(!config.no_verification);
    }

    #[test]
    fn file_loading_fills_unset_fields_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "url = \"https://server:5989\"\nusername = \"admin\"\npassword = \"pw\"\ntimeout_ms = 5000"
        )
        .unwrap();
        let config = ConnectionConfig::load_file(file.path()).unwrap();
        assert_eq!(config.url, "https://server:5989");
        assert_eq!(config.username.as_deref(), Some("admin"));
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.default_namespace, "root/cimv2");
    }

    #[test]
    fn invalid_url_scheme_is_rejected() {
        let config = ConnectionConfig::new("ftp://server");
        assert!(matches!(
            config.validate(),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn client_cert_requires_key() {
        let mut config = ConnectionConfig::new("https://server");
        config.client_cert = Some(PathBuf::from("/tmp/cert.pem"));
        assert!(config.validate().is_err());
        config.client_key = Some(PathBuf::from("/tmp/key.pem"));
        assert!(config.validate().is_ok());
    }
}
