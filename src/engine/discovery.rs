//! Discovery of the namespaces visible to the current credentials
//!
//! The daemon answers `GET /kubernetesNamespaces` with the namespaces the
//! TLS client identity may access. It is only reachable over TLS.

use super::{http_client, EngineEndpoint};
use crate::config::TlsOptions;
use crate::stack::NamespaceDiscovery;
use crate::{Result, StackError};
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

pub const NAMESPACES_PATH: &str = "/kubernetesNamespaces";

#[derive(Debug, Deserialize)]
struct DiscoveredNamespaceList {
    items: Vec<DiscoveredNamespace>,
}

/// A namespace entry, either `{"name": ..}` or a Kubernetes object with
/// `metadata.name`
#[derive(Debug, Deserialize)]
struct DiscoveredNamespace {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    metadata: Option<ObjectMeta>,
}

impl DiscoveredNamespace {
    fn into_name(self) -> Option<String> {
        self.name
            .or_else(|| self.metadata.and_then(|m| m.name))
            .filter(|name| !name.is_empty())
    }
}

pub struct NamespaceDiscoveryClient {
    daemon_host: String,
    tls: Option<TlsOptions>,
}

impl NamespaceDiscoveryClient {
    pub fn new(daemon_host: impl Into<String>, tls: Option<TlsOptions>) -> Self {
        Self {
            daemon_host: daemon_host.into(),
            tls,
        }
    }
}

#[async_trait]
impl NamespaceDiscovery for NamespaceDiscoveryClient {
    async fn discover(&self) -> Result<Vec<String>> {
        let tls = self.tls.as_ref().ok_or_else(|| {
            StackError::Configuration(
                "Listing user namespaces requires a TLS-secured daemon connection".to_string(),
            )
        })?;

        let endpoint = EngineEndpoint::parse(&self.daemon_host)?;
        let url = endpoint.url(true, NAMESPACES_PATH)?;
        let client = http_client(Some(tls))?;

        let namespaces = list_user_namespaces(&client, url).await?;
        info!(
            "{} namespace(s) visible on {}",
            namespaces.len(),
            endpoint.host()
        );
        Ok(namespaces)
    }
}

/// Issue the discovery request. Exactly one request, no retries.
pub(crate) async fn list_user_namespaces(client: &Client, url: Url) -> Result<Vec<String>> {
    debug!("GET {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| StackError::Transport {
            context: "Unable to get user namespaces".to_string(),
            source,
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| StackError::Transport {
            context: format!(
                "Unable to list user namespaces: received {} status and unable to read response",
                status.as_u16()
            ),
            source,
        })?;

    if status != StatusCode::OK {
        return Err(StackError::Protocol {
            context: "Unable to list user namespaces".to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let decode_error = |source: serde_json::Error, body: &str| StackError::Decode {
        context: "Unable to unmarshal user namespaces".to_string(),
        body: body.to_string(),
        source,
    };

    let list: DiscoveredNamespaceList =
        serde_json::from_str(&body).map_err(|e| decode_error(e, &body))?;

    list.items
        .into_iter()
        .map(|item| {
            item.into_name().ok_or_else(|| {
                decode_error(
                    serde::de::Error::custom("namespace entry without a name"),
                    &body,
                )
            })
        })
        .collect()
}
