//! Shared types between the stackls backends and the listing core
//!
//! A [`StackRecord`] is produced once by a backend adapter and never revised.
//! These types carry no behaviour beyond display helpers so that backends,
//! the aggregator and the formatter can agree on them without pulling in
//! each other's dependencies.

use std::fmt;

/// Orchestrator a stack was deployed with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrchestratorKind {
    Swarm,
    Cluster,
}

impl OrchestratorKind {
    /// Name shown in listings
    pub const fn display_name(&self) -> &'static str {
        match self {
            OrchestratorKind::Swarm => "Swarm",
            OrchestratorKind::Cluster => "Kubernetes",
        }
    }
}

impl fmt::Display for OrchestratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One deployed stack as reported by a backend
///
/// `namespace` is empty for swarm stacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackRecord {
    pub name: String,
    pub services: usize,
    pub orchestrator: OrchestratorKind,
    pub namespace: String,
}

impl StackRecord {
    /// A swarm stack, which has no namespace
    pub fn swarm(name: impl Into<String>, services: usize) -> Self {
        Self {
            name: name.into(),
            services,
            orchestrator: OrchestratorKind::Swarm,
            namespace: String::new(),
        }
    }

    /// A cluster stack living in `namespace`
    pub fn cluster(name: impl Into<String>, services: usize, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            services,
            orchestrator: OrchestratorKind::Cluster,
            namespace: namespace.into(),
        }
    }
}

/// A stack as returned by a backend, before it is tagged with its orchestrator
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackEntry {
    pub name: String,
    pub services: usize,
    pub namespace: String,
}

impl StackEntry {
    pub fn new(name: impl Into<String>, services: usize, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            services,
            namespace: namespace.into(),
        }
    }

    /// Tag the entry with the orchestrator that reported it
    ///
    /// Swarm has no namespace concept, so the namespace is dropped for swarm
    /// entries whatever the backend returned.
    pub fn into_record(self, orchestrator: OrchestratorKind) -> StackRecord {
        match orchestrator {
            OrchestratorKind::Swarm => StackRecord::swarm(self.name, self.services),
            OrchestratorKind::Cluster => {
                StackRecord::cluster(self.name, self.services, self.namespace)
            }
        }
    }
}
