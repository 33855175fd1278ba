use super::{http_client, DaemonHost};
use crate::config::TlsOptions;
use crate::stack::SwarmBackend;
use crate::{Result, StackError};
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_util::client::legacy::Client as SocketClient;
use hyperlocal::{UnixClientExt, UnixConnector};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use stackls_common::StackEntry;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use url::{form_urlencoded, Url};

/// Label carrying the stack a swarm service belongs to
pub const STACK_NAMESPACE_LABEL: &str = "com.docker.stack.namespace";

const SERVICES_PATH: &str = "/services";

#[derive(Debug, Deserialize)]
struct Service {
    #[serde(rename = "Spec", default)]
    spec: ServiceSpec,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceSpec {
    #[serde(rename = "Labels", default)]
    labels: Option<HashMap<String, String>>,
}

enum Transport {
    Socket {
        client: SocketClient<UnixConnector, Full<Bytes>>,
        uri: hyper::Uri,
    },
    Tcp {
        client: Client,
        url: Url,
    },
}

/// Swarm stacks read from the engine's service list
pub struct EngineSwarmClient {
    transport: Transport,
}

impl EngineSwarmClient {
    pub fn new(daemon_host: &str, tls: Option<&TlsOptions>) -> Result<Self> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(
                "filters",
                &format!(r#"{{"label":["{}"]}}"#, STACK_NAMESPACE_LABEL),
            )
            .finish();

        let transport = match DaemonHost::parse(daemon_host)? {
            DaemonHost::Socket(socket) => {
                let path = format!("{}?{}", SERVICES_PATH, query);
                Transport::Socket {
                    client: SocketClient::unix(),
                    uri: hyperlocal::Uri::new(socket, &path).into(),
                }
            }
            DaemonHost::Tcp(endpoint) => {
                let mut url = endpoint.url(tls.is_some(), SERVICES_PATH)?;
                url.set_query(Some(&query));
                Transport::Tcp {
                    client: http_client(tls)?,
                    url,
                }
            }
        };

        Ok(Self { transport })
    }

    async fn fetch_services(&self) -> Result<Vec<Service>> {
        let (status, body) = match &self.transport {
            Transport::Socket { client, uri } => fetch_over_socket(client, uri).await?,
            Transport::Tcp { client, url } => fetch_over_tcp(client, url).await?,
        };

        if !status.is_success() {
            return Err(StackError::Protocol {
                context: "Unable to list swarm services".to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| StackError::Decode {
            context: "Unable to unmarshal swarm services".to_string(),
            body,
            source,
        })
    }
}

async fn fetch_over_socket(
    client: &SocketClient<UnixConnector, Full<Bytes>>,
    uri: &hyper::Uri,
) -> Result<(StatusCode, String)> {
    debug!("GET {} over the daemon socket", SERVICES_PATH);

    let response = client
        .get(uri.clone())
        .await
        .map_err(|source| StackError::Socket {
            context: "Unable to list swarm services".to_string(),
            source: Box::new(source),
        })?;

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .map_err(|source| StackError::Socket {
            context: "Unable to read swarm services".to_string(),
            source: Box::new(source),
        })?
        .to_bytes();

    Ok((status, String::from_utf8_lossy(&bytes).into_owned()))
}

async fn fetch_over_tcp(client: &Client, url: &Url) -> Result<(StatusCode, String)> {
    debug!("GET {}", url);

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| StackError::Transport {
            context: "Unable to list swarm services".to_string(),
            source,
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| StackError::Transport {
            context: "Unable to read swarm services".to_string(),
            source,
        })?;

    Ok((status, body))
}

#[async_trait]
impl SwarmBackend for EngineSwarmClient {
    async fn list(&self) -> Result<Vec<StackEntry>> {
        let services = self.fetch_services().await?;
        Ok(group_by_stack(&services))
    }
}

/// One entry per stack label, counting its services. Unlabelled services are
/// not part of any stack.
fn group_by_stack(services: &[Service]) -> Vec<StackEntry> {
    let mut stacks: BTreeMap<&str, usize> = BTreeMap::new();

    for service in services {
        let stack = service
            .spec
            .labels
            .as_ref()
            .and_then(|labels| labels.get(STACK_NAMESPACE_LABEL));
        if let Some(stack) = stack {
            *stacks.entry(stack.as_str()).or_default() += 1;
        }
    }

    stacks
        .into_iter()
        .map(|(name, services)| StackEntry::new(name, services, ""))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_server::{respond_once, respond_once_on_socket};

    const SERVICES: &str = r#"[
        {"ID": "1", "Spec": {"Name": "web_frontend", "Labels": {"com.docker.stack.namespace": "web"}}},
        {"ID": "2", "Spec": {"Name": "web_backend", "Labels": {"com.docker.stack.namespace": "web"}}},
        {"ID": "3", "Spec": {"Name": "metrics_agent", "Labels": {"com.docker.stack.namespace": "metrics"}}},
        {"ID": "4", "Spec": {"Name": "standalone", "Labels": {}}},
        {"ID": "5", "Spec": {"Name": "bare"}}
    ]"#;

    #[test]
    fn test_group_by_stack() {
        let services: Vec<Service> = serde_json::from_str(SERVICES).unwrap();

        let stacks = group_by_stack(&services);

        assert_eq!(
            stacks,
            vec![StackEntry::new("metrics", 1, ""), StackEntry::new("web", 2, "")]
        );
    }

    #[tokio::test]
    async fn test_list_over_http() {
        let (addr, request) = respond_once("200 OK", SERVICES).await;
        let client = EngineSwarmClient::new(&format!("tcp://{}", addr), None).unwrap();

        let stacks = client.list().await.unwrap();

        assert_eq!(stacks.len(), 2);
        let request = request.await.unwrap();
        assert!(request.starts_with("GET /services?filters="));
    }

    #[tokio::test]
    async fn test_daemon_error_is_protocol_error() {
        let (addr, _request) = respond_once(
            "503 Service Unavailable",
            r#"{"message":"This node is not a swarm manager."}"#,
        )
        .await;
        let client = EngineSwarmClient::new(&format!("tcp://{}", addr), None).unwrap();

        let err = client.list().await.unwrap_err();

        assert!(matches!(err, StackError::Protocol { status: 503, .. }));
        assert!(err.to_string().contains("not a swarm manager"));
    }

    #[tokio::test]
    async fn test_list_over_daemon_socket() {
        let dir = tempfile::tempdir().unwrap();
        let (socket, request) = respond_once_on_socket(dir.path(), "200 OK", SERVICES);
        let client =
            EngineSwarmClient::new(&format!("unix://{}", socket.display()), None).unwrap();

        let stacks = client.list().await.unwrap();

        assert_eq!(
            stacks,
            vec![StackEntry::new("metrics", 1, ""), StackEntry::new("web", 2, "")]
        );
        let request = request.await.unwrap();
        assert!(request.starts_with("GET /services?filters="));
    }

    #[tokio::test]
    async fn test_missing_daemon_socket_is_socket_error() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("absent.sock");
        let client =
            EngineSwarmClient::new(&format!("unix://{}", socket.display()), None).unwrap();

        let err = client.list().await.unwrap_err();

        assert!(matches!(err, StackError::Socket { .. }));
    }

    #[test]
    fn test_unsupported_host_scheme_is_rejected() {
        assert!(matches!(
            EngineSwarmClient::new("ssh://user@manager", None),
            Err(StackError::Configuration(_))
        ));
    }
}
