//! Cluster stack aggregation across namespaces
//!
//! A cluster-wide listing is attempted first when the request asks for all
//! namespaces. If the cluster refuses it for lack of privilege, the namespaces
//! visible to the caller are discovered and listed one by one. Any other
//! failure, and any failure inside the fallback, aborts the whole listing.

use super::backend::{ClusterBackend, NamespaceDiscovery};
use super::request::{ListRequest, NamespaceQuery};
use super::resolver::resolve;
use crate::Result;
use stackls_common::{OrchestratorKind, StackEntry, StackRecord};
use tracing::debug;

pub struct StackAggregator<'a> {
    backend: &'a dyn ClusterBackend,
    discovery: &'a dyn NamespaceDiscovery,
}

impl<'a> StackAggregator<'a> {
    pub fn new(backend: &'a dyn ClusterBackend, discovery: &'a dyn NamespaceDiscovery) -> Self {
        Self { backend, discovery }
    }

    /// List every cluster stack selected by `request`
    ///
    /// Queries run one at a time in resolution order. The result is either
    /// complete for the namespaces covered or an error, never partial.
    pub async fn aggregate(&self, request: &ListRequest) -> Result<Vec<StackRecord>> {
        let mut stacks = Vec::new();

        for query in resolve(request) {
            let found = match query {
                NamespaceQuery::AllNamespaces => self.query_all_namespaces().await?,
                NamespaceQuery::Namespace(namespace) => self.query_namespace(&namespace).await?,
            };
            stacks.extend(found);
        }

        Ok(stacks)
    }

    async fn query_all_namespaces(&self) -> Result<Vec<StackRecord>> {
        debug!("Listing stacks across all namespaces");

        match self.backend.list_all().await {
            Ok(entries) => Ok(tag(entries)),
            Err(err) if err.is_authorization_denied() => {
                debug!("{}; listing stacks in user visible namespaces instead", err);
                self.query_visible_namespaces().await
            }
            Err(err) => Err(err),
        }
    }

    async fn query_visible_namespaces(&self) -> Result<Vec<StackRecord>> {
        let namespaces = self.discovery.discover().await?;
        debug!("Discovered {} visible namespace(s)", namespaces.len());

        let mut stacks = Vec::new();
        for namespace in &namespaces {
            stacks.extend(self.query_namespace(namespace).await?);
        }

        Ok(stacks)
    }

    async fn query_namespace(&self, namespace: &str) -> Result<Vec<StackRecord>> {
        debug!("Listing stacks in namespace {}", namespace);

        let entries = self.backend.list_in_namespace(namespace).await?;
        Ok(tag(entries))
    }
}

fn tag(entries: Vec<StackEntry>) -> Vec<StackRecord> {
    entries
        .into_iter()
        .map(|entry| entry.into_record(OrchestratorKind::Cluster))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StackError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeCluster {
        deny_all: bool,
        fail_all: bool,
        all: Vec<StackEntry>,
        by_namespace: HashMap<String, Vec<StackEntry>>,
        failing_namespace: Option<String>,
        denied_namespace: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeCluster {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ClusterBackend for FakeCluster {
        async fn list_all(&self) -> Result<Vec<StackEntry>> {
            self.calls.lock().unwrap().push("*".to_string());
            if self.deny_all {
                return Err(StackError::AuthorizationDenied(
                    "stacks.compose.docker.com is forbidden".to_string(),
                ));
            }
            if self.fail_all {
                return Err(StackError::Backend("connection refused".to_string()));
            }
            Ok(self.all.clone())
        }

        async fn list_in_namespace(&self, namespace: &str) -> Result<Vec<StackEntry>> {
            self.calls.lock().unwrap().push(namespace.to_string());
            if self.denied_namespace.as_deref() == Some(namespace) {
                return Err(StackError::AuthorizationDenied(format!(
                    "stacks are forbidden in namespace {}",
                    namespace
                )));
            }
            if self.failing_namespace.as_deref() == Some(namespace) {
                return Err(StackError::Backend(format!(
                    "namespace {} not found",
                    namespace
                )));
            }
            Ok(self
                .by_namespace
                .get(namespace)
                .cloned()
                .unwrap_or_default())
        }
    }

    struct FakeDiscovery {
        namespaces: Option<Vec<String>>,
        calls: Mutex<usize>,
    }

    impl FakeDiscovery {
        fn returning(namespaces: &[&str]) -> Self {
            Self {
                namespaces: Some(namespaces.iter().map(|s| s.to_string()).collect()),
                calls: Mutex::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                namespaces: None,
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl NamespaceDiscovery for FakeDiscovery {
        async fn discover(&self) -> Result<Vec<String>> {
            *self.calls.lock().unwrap() += 1;
            self.namespaces.clone().ok_or_else(|| {
                StackError::Configuration("no TLS material configured".to_string())
            })
        }
    }

    fn namespaced(entries: &[(&str, &str)]) -> HashMap<String, Vec<StackEntry>> {
        let mut map: HashMap<String, Vec<StackEntry>> = HashMap::new();
        for (namespace, name) in entries {
            map.entry(namespace.to_string())
                .or_default()
                .push(StackEntry::new(*name, 1, *namespace));
        }
        map
    }

    #[tokio::test]
    async fn test_all_namespaces_single_query() {
        let cluster = FakeCluster {
            all: vec![StackEntry::new("web", 2, "prod"), StackEntry::new("db", 1, "dev")],
            ..Default::default()
        };
        let discovery = FakeDiscovery::returning(&[]);
        let aggregator = StackAggregator::new(&cluster, &discovery);

        let stacks = aggregator
            .aggregate(&ListRequest::new(["default"], true, None))
            .await
            .unwrap();

        assert_eq!(stacks.len(), 2);
        assert!(stacks
            .iter()
            .all(|s| s.orchestrator == OrchestratorKind::Cluster));
        assert_eq!(cluster.calls(), vec!["*"]);
        assert_eq!(discovery.calls(), 0);
    }

    #[tokio::test]
    async fn test_forbidden_falls_back_to_visible_namespaces() {
        let cluster = FakeCluster {
            deny_all: true,
            by_namespace: namespaced(&[("a", "web"), ("b", "api"), ("b", "db")]),
            ..Default::default()
        };
        let discovery = FakeDiscovery::returning(&["a", "b"]);
        let aggregator = StackAggregator::new(&cluster, &discovery);

        let stacks = aggregator
            .aggregate(&ListRequest::new(["default"], true, None))
            .await
            .unwrap();

        assert_eq!(cluster.calls(), vec!["*", "a", "b"]);
        assert_eq!(discovery.calls(), 1);
        let names: Vec<(&str, &str)> = stacks
            .iter()
            .map(|s| (s.namespace.as_str(), s.name.as_str()))
            .collect();
        assert_eq!(names, vec![("a", "web"), ("b", "api"), ("b", "db")]);
    }

    #[tokio::test]
    async fn test_fallback_aborts_on_namespace_failure() {
        let cluster = FakeCluster {
            deny_all: true,
            by_namespace: namespaced(&[("b", "api")]),
            failing_namespace: Some("a".to_string()),
            ..Default::default()
        };
        let discovery = FakeDiscovery::returning(&["a", "b"]);
        let aggregator = StackAggregator::new(&cluster, &discovery);

        let result = aggregator
            .aggregate(&ListRequest::new(["default"], true, None))
            .await;

        assert!(matches!(result, Err(StackError::Backend(_))));
        assert_eq!(cluster.calls(), vec!["*", "a"]);
    }

    #[tokio::test]
    async fn test_fallback_failure_after_partial_success_returns_error() {
        let cluster = FakeCluster {
            deny_all: true,
            by_namespace: namespaced(&[("a", "web")]),
            failing_namespace: Some("b".to_string()),
            ..Default::default()
        };
        let discovery = FakeDiscovery::returning(&["a", "b"]);
        let aggregator = StackAggregator::new(&cluster, &discovery);

        let result = aggregator
            .aggregate(&ListRequest::new(["default"], true, None))
            .await;

        assert!(result.is_err());
        assert_eq!(cluster.calls(), vec!["*", "a", "b"]);
    }

    #[tokio::test]
    async fn test_backend_error_skips_discovery() {
        let cluster = FakeCluster {
            fail_all: true,
            ..Default::default()
        };
        let discovery = FakeDiscovery::returning(&["a"]);
        let aggregator = StackAggregator::new(&cluster, &discovery);

        let result = aggregator
            .aggregate(&ListRequest::new(["default"], true, None))
            .await;

        assert!(matches!(result, Err(StackError::Backend(_))));
        assert_eq!(discovery.calls(), 0);
        assert_eq!(cluster.calls(), vec!["*"]);
    }

    #[tokio::test]
    async fn test_discovery_failure_surfaces() {
        let cluster = FakeCluster {
            deny_all: true,
            ..Default::default()
        };
        let discovery = FakeDiscovery::failing();
        let aggregator = StackAggregator::new(&cluster, &discovery);

        let result = aggregator
            .aggregate(&ListRequest::new(["default"], true, None))
            .await;

        assert!(matches!(result, Err(StackError::Configuration(_))));
        assert_eq!(cluster.calls(), vec!["*"]);
    }

    #[tokio::test]
    async fn test_explicit_namespaces_query_each_once() {
        let cluster = FakeCluster {
            by_namespace: namespaced(&[("dev", "web"), ("prod", "web")]),
            ..Default::default()
        };
        let discovery = FakeDiscovery::returning(&[]);
        let aggregator = StackAggregator::new(&cluster, &discovery);

        let stacks = aggregator
            .aggregate(&ListRequest::new(["prod", "dev", "prod"], false, None))
            .await
            .unwrap();

        assert_eq!(cluster.calls(), vec!["dev", "prod"]);
        assert_eq!(stacks.len(), 2);
    }

    #[tokio::test]
    async fn test_explicit_namespace_denied_is_not_retried() {
        let cluster = FakeCluster {
            denied_namespace: Some("prod".to_string()),
            ..Default::default()
        };
        let discovery = FakeDiscovery::returning(&["prod"]);
        let aggregator = StackAggregator::new(&cluster, &discovery);

        let result = aggregator
            .aggregate(&ListRequest::new(["prod"], false, None))
            .await;

        assert!(matches!(result, Err(StackError::AuthorizationDenied(_))));
        assert_eq!(discovery.calls(), 0);
        assert_eq!(cluster.calls(), vec!["prod"]);
    }

    #[tokio::test]
    async fn test_empty_selection_makes_no_calls() {
        let cluster = FakeCluster::default();
        let discovery = FakeDiscovery::returning(&["a"]);
        let aggregator = StackAggregator::new(&cluster, &discovery);

        let stacks = aggregator
            .aggregate(&ListRequest::new(Vec::<String>::new(), false, None))
            .await
            .unwrap();

        assert!(stacks.is_empty());
        assert!(cluster.calls().is_empty());
        assert_eq!(discovery.calls(), 0);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_fallback_is_silent_at_default_log_level() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let cluster = FakeCluster {
            deny_all: true,
            by_namespace: namespaced(&[("a", "web")]),
            ..Default::default()
        };
        let discovery = FakeDiscovery::returning(&["a"]);
        let aggregator = StackAggregator::new(&cluster, &discovery);

        let stacks = aggregator
            .aggregate(&ListRequest::new(["default"], true, None))
            .await
            .unwrap();

        assert_eq!(stacks.len(), 1);
        assert!(log.0.lock().unwrap().is_empty());
    }
}
