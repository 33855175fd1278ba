//! HTTP access to the daemon's engine endpoint
//!
//! The daemon is reached either through its local socket (`unix://path`) or
//! over TCP (`tcp://host:port`). Namespace discovery needs the TCP form.

pub mod discovery;
pub mod swarm;

pub use discovery::NamespaceDiscoveryClient;
pub use swarm::EngineSwarmClient;

use crate::config::TlsOptions;
use crate::{Result, StackError};
use reqwest::{Certificate, Client, Identity};
use std::path::{Path, PathBuf};
use url::Url;

const DEFAULT_TLS_PORT: u16 = 2376;
const DEFAULT_PORT: u16 = 2375;

/// Host and port of the daemon, independent of the scheme used to reach it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEndpoint {
    host: String,
    port: Option<u16>,
}

impl EngineEndpoint {
    pub fn parse(daemon_host: &str) -> Result<Self> {
        let url = Url::parse(daemon_host).map_err(|e| {
            StackError::Configuration(format!("Invalid daemon host {:?}: {}", daemon_host, e))
        })?;

        match url.scheme() {
            "tcp" => {}
            other => {
                return Err(StackError::Configuration(format!(
                    "Daemon host scheme {:?} is not supported, a tcp:// host is required",
                    other
                )))
            }
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                StackError::Configuration(format!("Daemon host {:?} has no host name", daemon_host))
            })?
            .to_string();

        Ok(Self {
            host,
            port: url.port(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// URL of `path` on the daemon, over TLS when `secure` is set
    pub fn url(&self, secure: bool, path: &str) -> Result<Url> {
        let (scheme, default_port) = if secure {
            ("https", DEFAULT_TLS_PORT)
        } else {
            ("http", DEFAULT_PORT)
        };
        let raw = format!(
            "{}://{}:{}{}",
            scheme,
            self.host,
            self.port.unwrap_or(default_port),
            path
        );

        Url::parse(&raw)
            .map_err(|e| StackError::Configuration(format!("Invalid daemon URL {}: {}", raw, e)))
    }
}

/// Where the daemon listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonHost {
    Socket(PathBuf),
    Tcp(EngineEndpoint),
}

impl DaemonHost {
    pub fn parse(daemon_host: &str) -> Result<Self> {
        match daemon_host.strip_prefix("unix://") {
            Some("") => Err(StackError::Configuration(format!(
                "Daemon host {:?} has no socket path",
                daemon_host
            ))),
            Some(path) => Ok(DaemonHost::Socket(PathBuf::from(path))),
            None => EngineEndpoint::parse(daemon_host).map(DaemonHost::Tcp),
        }
    }
}

/// Build an HTTP client carrying the configured TLS material
pub fn http_client(tls: Option<&TlsOptions>) -> Result<Client> {
    let mut builder = Client::builder().use_rustls_tls();

    if let Some(tls) = tls {
        if let Some(ca_cert) = &tls.ca_cert {
            let certificate = Certificate::from_pem(&read_pem(ca_cert)?).map_err(|e| {
                StackError::Configuration(format!("Invalid CA certificate {}: {}", ca_cert.display(), e))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        match (&tls.cert, &tls.key) {
            (Some(cert), Some(key)) => {
                let mut pem = read_pem(cert)?;
                pem.push(b'\n');
                pem.extend(read_pem(key)?);
                let identity = Identity::from_pem(&pem).map_err(|e| {
                    StackError::Configuration(format!("Invalid client certificate or key: {}", e))
                })?;
                builder = builder.identity(identity);
            }
            (None, None) => {}
            _ => {
                return Err(StackError::Configuration(
                    "TLS client certificate and key must be provided together".to_string(),
                ))
            }
        }

        if !tls.verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
    }

    builder
        .build()
        .map_err(|e| StackError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

fn read_pem(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        StackError::Configuration(format!("Failed to read {}: {}", path.display(), e))
    })
}
