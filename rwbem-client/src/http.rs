//! HTTP/HTTPS transport for CIM-XML operation exchanges (DSP0200 §6)
//!
//! One `reqwest::blocking::Client` per connection: TCP connections are
//! pooled and kept alive, and TLS sessions are cached, for the lifetime
//! of the connection object.

use crate::config::{default_ca_paths, ConnectionConfig};
use crate::error::{ClientError, ClientResult};
use reqwest::blocking::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

pub struct HttpTransport {
    client: Client,
    post_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ConnectionConfig) -> ClientResult<Self> {
        config.validate()?;
        let mut builder = Client::builder();
        if config.is_https() {
            if config.no_verification {
                warn!("server certificate validation is disabled");
                builder = builder.danger_accept_invalid_certs(true);
            } else {
                for certificate in load_roots(config)? {
                    builder = builder.add_root_certificate(certificate);
                }
            }
            if let (Some(cert), Some(key)) = (&config.client_cert, &config.client_key) {
                builder = builder.identity(load_identity(cert, key)?);
            }
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("cannot build HTTP client: {e}")))?;
        let post_url = format!(
            "{}{}",
            config.url.trim_end_matches('/'),
            config.http_path
        );
        debug!(url = %post_url, "transport ready");
        Ok(Self {
            client,
            post_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// POST one CIM-XML request. `method` and `cim_object` fill the
    /// `CIMMethod`/`CIMObject` headers; `timeout` is this attempt's
    /// remaining budget. Returns the response body bytes.
    pub fn post(
        &self,
        method: &str,
        cim_object: &str,
        body: &[u8],
        timeout: Duration,
    ) -> ClientResult<Vec<u8>> {
        let response = self.send(method, cim_object, body, timeout)?;
        let status = response.status();

        // one retry with the same Basic credentials on a 401 challenge
        if status.as_u16() == 401 {
            let challenge = response
                .headers()
                .get("WWW-Authenticate")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            if self.username.is_some() && challenge.to_ascii_lowercase().starts_with("basic") {
                debug!("retrying once after 401 Basic challenge");
                let retried = self.send(method, cim_object, body, timeout)?;
                if retried.status().as_u16() == 401 {
                    return Err(ClientError::Auth(
                        "server rejected Basic credentials (401)".to_string(),
                    ));
                }
                return Self::finish(retried, timeout);
            }
            return Err(ClientError::Auth(format!(
                "HTTP 401 Unauthorized (challenge {challenge:?})"
            )));
        }

        Self::finish(response, timeout)
    }

    fn send(
        &self,
        method: &str,
        cim_object: &str,
        body: &[u8],
        timeout: Duration,
    ) -> ClientResult<reqwest::blocking::Response> {
        let mut request = self
            .client
            .post(&self.post_url)
            .timeout(timeout)
            .header("Content-Type", "application/xml; charset=utf-8")
            .header("CIMOperation", "MethodCall")
            .header("CIMMethod", method)
            .header("CIMObject", cim_object)
            .body(body.to_vec());
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }
        request.send().map_err(|e| classify(e, timeout))
    }

    fn finish(
        response: reqwest::blocking::Response,
        timeout: Duration,
    ) -> ClientResult<Vec<u8>> {
        let status = response.status();
        if !status.is_success() {
            let reason = response
                .headers()
                .get("CIMError")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    let text = response.text().unwrap_or_default();
                    let mut excerpt: String = text.chars().take(200).collect();
                    if excerpt.is_empty() {
                        excerpt = status
                            .canonical_reason()
                            .unwrap_or("unknown reason")
                            .to_string();
                    }
                    excerpt
                });
            return Err(ClientError::Http {
                status: status.as_u16(),
                reason,
            });
        }
        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| classify(e, timeout))
    }
}

fn classify(error: reqwest::Error, timeout: Duration) -> ClientError {
    if error.is_timeout() {
        return ClientError::Timeout(timeout);
    }
    let detail = format!("{error:?}").to_ascii_lowercase();
    if detail.contains("certificate") || detail.contains("handshake") {
        return ClientError::Auth(error.to_string());
    }
    ClientError::Connection(error.to_string())
}

fn load_roots(config: &ConnectionConfig) -> ClientResult<Vec<reqwest::Certificate>> {
    let mut certificates = Vec::new();
    match &config.ca_certs {
        Some(path) if path.is_dir() => {
            let entries = std::fs::read_dir(path).map_err(|e| {
                ClientError::Config(format!("cannot read CA directory {}: {e}", path.display()))
            })?;
            for entry in entries.flatten() {
                let file = entry.path();
                if file.extension().is_some_and(|ext| ext == "pem" || ext == "crt") {
                    certificates.extend(load_pem_bundle(&file)?);
                }
            }
        }
        Some(path) => certificates.extend(load_pem_bundle(path)?),
        None => {
            // first well-known OS bundle wins
            if let Some(path) = default_ca_paths().first() {
                certificates.extend(load_pem_bundle(path)?);
            }
        }
    }
    Ok(certificates)
}

// reqwest's Certificate::from_pem takes one certificate; CA bundles
// concatenate many, so split on the PEM markers first
fn load_pem_bundle(path: &Path) -> ClientResult<Vec<reqwest::Certificate>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ClientError::Config(format!("cannot read CA bundle {}: {e}", path.display()))
    })?;
    let mut certificates = Vec::new();
    const BEGIN: &str = "-----BEGIN CERTIFICATE-----";
    const END: &str = "-----END CERTIFICATE-----";
    let mut rest = content.as_str();
    while let Some(start) = rest.find(BEGIN) {
        let Some(end) = rest[start..].find(END) else {
            break;
        };
        let block = &rest[start..start + end + END.len()];
        let certificate = reqwest::Certificate::from_pem(block.as_bytes()).map_err(|e| {
            ClientError::Config(format!("bad certificate in {}: {e}", path.display()))
        })?;
        certificates.push(certificate);
        rest = &rest[start + end + END.len()..];
    }
    if certificates.is_empty() {
        return Err(ClientError::Config(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    Ok(certificates)
}

fn load_identity(cert: &Path, key: &Path) -> ClientResult<reqwest::Identity> {
    let mut pem = std::fs::read(cert).map_err(|e| {
        ClientError::Config(format!("cannot read client cert {}: {e}", cert.display()))
    })?;
    pem.extend(std::fs::read(key).map_err(|e| {
        ClientError::Config(format!("cannot read client key {}: {e}", key.display()))
    })?);
    reqwest::Identity::from_pem(&pem)
        .map_err(|e| ClientError::Config(format!("bad client identity: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_url_joins_base_and_path() {
        let config = ConnectionConfig::new("http://acme.com:80/");
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.post_url, "http://acme.com:80/cimom");
    }

    #[test]
    fn unreachable_host_classifies_as_connection_error() {
        let config = ConnectionConfig::new("http://wbem-server.invalid:5988");
        let transport = HttpTransport::new(&config).unwrap();
        let err = transport
            .post("GetClass", "root/cimv2", b"<CIM/>", Duration::from_secs(2))
            .unwrap_err();
        assert!(
            matches!(err, ClientError::Connection(_) | ClientError::Timeout(_)),
            "got {err:?}"
        );
    }
}
