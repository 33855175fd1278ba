use crate::Result;
use async_trait::async_trait;
use stackls_common::StackEntry;

/// Lists stacks deployed on a swarm. Swarm has no namespaces.
#[async_trait]
pub trait SwarmBackend: Send + Sync {
    async fn list(&self) -> Result<Vec<StackEntry>>;
}

/// Lists stacks deployed on a namespaced cluster
///
/// `list_all` reports a refused cluster-wide listing as
/// [`StackError::AuthorizationDenied`](crate::StackError::AuthorizationDenied).
#[async_trait]
pub trait ClusterBackend: Send + Sync {
    async fn list_all(&self) -> Result<Vec<StackEntry>>;

    async fn list_in_namespace(&self, namespace: &str) -> Result<Vec<StackEntry>>;
}

/// Learns which namespaces the current credentials may see
#[async_trait]
pub trait NamespaceDiscovery: Send + Sync {
    async fn discover(&self) -> Result<Vec<String>>;
}
