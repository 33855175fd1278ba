//! Client configuration
//!
//! Values come from, in decreasing priority: command line flags and their
//! environment variables, an optional YAML file, built-in defaults.

use crate::{Result, StackError};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_HOST: &str = "unix:///var/run/docker.sock";

const CA_CERT_FILE: &str = "ca.pem";
const CERT_FILE: &str = "cert.pem";
const KEY_FILE: &str = "key.pem";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Orchestrator {
    #[default]
    Swarm,
    Kubernetes,
    All,
}

/// TLS client material for the daemon connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    pub ca_cert: Option<PathBuf>,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    /// Verify the daemon certificate
    pub verify: bool,
}

/// On-disk configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub orchestrator: Option<Orchestrator>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,

    #[serde(default)]
    pub tls: TlsSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsSection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub verify: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<PathBuf>,
}

impl ConfigFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StackError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            StackError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub host: Option<String>,
    pub orchestrator: Option<Orchestrator>,
    pub kubeconfig: Option<PathBuf>,
    pub tls: bool,
    pub tls_verify: bool,
    pub cert_path: Option<PathBuf>,
    pub ca_cert: Option<PathBuf>,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
}

/// Fully resolved configuration for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub tls: Option<TlsOptions>,
    pub orchestrator: Orchestrator,
    pub kubeconfig: PathBuf,
}

impl ClientConfig {
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let file = match &overrides.config_file {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                ConfigFile::from_file(path)?
            }
            None => ConfigFile::default(),
        };

        Ok(Self::merge(overrides, file, home_dir()))
    }

    fn merge(overrides: &ConfigOverrides, file: ConfigFile, home: Option<PathBuf>) -> Self {
        let home = home.unwrap_or_default();

        let host = overrides
            .host
            .clone()
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let orchestrator = overrides
            .orchestrator
            .or(file.orchestrator)
            .unwrap_or_default();

        let kubeconfig = overrides
            .kubeconfig
            .clone()
            .or(file.kubeconfig)
            .unwrap_or_else(|| home.join(".kube").join("config"));

        let tls_file = file.tls;
        let verify = overrides.tls_verify || tls_file.verify;
        let tls = if overrides.tls || verify || tls_file.enabled {
            let cert_path = overrides
                .cert_path
                .clone()
                .or(tls_file.cert_path)
                .unwrap_or_else(|| home.join(".docker"));
            let pick = |flag: &Option<PathBuf>, file: Option<PathBuf>, name: &str| {
                flag.clone().or(file).or_else(|| existing(cert_path.join(name)))
            };

            Some(TlsOptions {
                ca_cert: pick(&overrides.ca_cert, tls_file.ca_cert, CA_CERT_FILE),
                cert: pick(&overrides.cert, tls_file.cert, CERT_FILE),
                key: pick(&overrides.key, tls_file.key, KEY_FILE),
                verify,
            })
        } else {
            None
        };

        Self {
            host,
            tls,
            orchestrator,
            kubeconfig,
        }
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
