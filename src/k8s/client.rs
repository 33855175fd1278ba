use super::types::{classify_error, entry_from_stack, stack_resource};
use crate::stack::ClusterBackend;
use crate::{Result, StackError};
use async_trait::async_trait;
use kube::api::{ApiResource, DynamicObject, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use stackls_common::StackEntry;
use std::path::Path;
use tracing::{debug, info};

/// Lists Stack custom resources through the Kubernetes API
pub struct KubeStackClient {
    client: Client,
    resource: ApiResource,
}

impl KubeStackClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            resource: stack_resource(),
        }
    }

    pub async fn from_kubeconfig(path: &Path) -> Result<Self> {
        debug!("Loading kubeconfig from {}", path.display());

        let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
            StackError::Configuration(format!(
                "Failed to read kubeconfig {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                StackError::Configuration(format!("Invalid kubeconfig {}: {}", path.display(), e))
            })?;

        let client = Client::try_from(config).map_err(|e| {
            StackError::Backend(format!("Failed to create K8s client: {}", e))
        })?;

        info!("Kubernetes client ready");

        Ok(Self::new(client))
    }

    fn stacks(&self, namespace: Option<&str>) -> Api<DynamicObject> {
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &self.resource),
            None => Api::all_with(self.client.clone(), &self.resource),
        }
    }

    async fn list(&self, namespace: Option<&str>) -> Result<Vec<StackEntry>> {
        let scope = match namespace {
            Some(ns) => format!("in namespace {}", ns),
            None => "in all namespaces".to_string(),
        };

        let stacks = self
            .stacks(namespace)
            .list(&ListParams::default())
            .await
            .map_err(|e| classify_error(e, &scope))?;

        debug!("Found {} stack(s) {}", stacks.items.len(), scope);
        Ok(stacks.items.iter().map(entry_from_stack).collect())
    }
}

#[async_trait]
impl ClusterBackend for KubeStackClient {
    async fn list_all(&self) -> Result<Vec<StackEntry>> {
        self.list(None).await
    }

    async fn list_in_namespace(&self, namespace: &str) -> Result<Vec<StackEntry>> {
        self.list(Some(namespace)).await
    }
}
