use super::request::ListRequest;
use crate::config::Orchestrator;
use crate::formatter::{OutputFormat, TableLayout};

/// Which stack backends the configured daemon exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCapabilities {
    pub swarm: bool,
    pub cluster: bool,
}

impl BackendCapabilities {
    pub fn has_swarm(&self) -> bool {
        self.swarm
    }

    pub fn has_cluster(&self) -> bool {
        self.cluster
    }

    pub fn has_both(&self) -> bool {
        self.swarm && self.cluster
    }
}

impl From<Orchestrator> for BackendCapabilities {
    fn from(orchestrator: Orchestrator) -> Self {
        match orchestrator {
            Orchestrator::Swarm => Self {
                swarm: true,
                cluster: false,
            },
            Orchestrator::Kubernetes => Self {
                swarm: false,
                cluster: true,
            },
            Orchestrator::All => Self {
                swarm: true,
                cluster: true,
            },
        }
    }
}

/// Effective request and output format for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub capabilities: BackendCapabilities,
    pub request: ListRequest,
    pub format: OutputFormat,
}

/// Decide the effective request and output format
///
/// With both backends active and no namespace chosen by the caller, the
/// listing covers all namespaces so cluster stacks are not hidden behind the
/// default namespace.
pub fn select(
    capabilities: BackendCapabilities,
    request: &ListRequest,
    namespace_explicit: bool,
) -> Selection {
    let request = if capabilities.has_both() && !namespace_explicit {
        request.across_all_namespaces()
    } else {
        request.clone()
    };

    let default_layout = if capabilities.has_cluster() {
        TableLayout::Kubernetes
    } else {
        TableLayout::Swarm
    };
    let format = match request.format.as_deref() {
        Some(format) => OutputFormat::parse(format, default_layout),
        None => OutputFormat::Table(default_layout),
    };

    Selection {
        capabilities,
        request,
        format,
    }
}
