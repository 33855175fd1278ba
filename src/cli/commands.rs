use crate::cli::{Commands, ConnectionArgs, ListArgs};
use crate::config::{ClientConfig, ConfigOverrides};
use crate::engine::{EngineSwarmClient, NamespaceDiscoveryClient};
use crate::formatter;
use crate::k8s::KubeStackClient;
use crate::stack::{
    list_stacks, select, BackendCapabilities, Backends, StackAggregator, SwarmBackend,
};
use anyhow::{Context, Result};
use tracing::info;

pub async fn handle_command(
    command: Commands,
    connection: &ConnectionArgs,
    namespace_explicit: bool,
) -> Result<()> {
    match command {
        Commands::Ls(args) => handle_list(args, connection, namespace_explicit).await,
    }
}

async fn handle_list(
    args: ListArgs,
    connection: &ConnectionArgs,
    namespace_explicit: bool,
) -> Result<()> {
    let config = ClientConfig::resolve(&ConfigOverrides::from(connection))
        .context("Failed to load configuration")?;

    let capabilities = BackendCapabilities::from(config.orchestrator);
    let selection = select(capabilities, &args.to_request(), namespace_explicit);
    info!(
        "Listing stacks (swarm: {}, kubernetes: {}, all namespaces: {})",
        capabilities.has_swarm(),
        capabilities.has_cluster(),
        selection.request.all_namespaces
    );

    let swarm = swarm_client(&config, capabilities)?;

    let cluster = if capabilities.has_cluster() {
        Some(
            KubeStackClient::from_kubeconfig(&config.kubeconfig)
                .await
                .context("Failed to set up the Kubernetes client")?,
        )
    } else {
        None
    };

    let discovery = NamespaceDiscoveryClient::new(config.host.clone(), config.tls.clone());

    let backends = Backends {
        swarm: swarm.as_ref().map(|client| client as &dyn SwarmBackend),
        cluster: cluster
            .as_ref()
            .map(|client| StackAggregator::new(client, &discovery)),
    };

    let stacks = list_stacks(&backends, &selection.request).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    formatter::write_stacks(&mut out, &selection.format, &stacks)?;

    Ok(())
}

fn swarm_client(
    config: &ClientConfig,
    capabilities: BackendCapabilities,
) -> Result<Option<EngineSwarmClient>> {
    if !capabilities.has_swarm() {
        return Ok(None);
    }

    let client = EngineSwarmClient::new(&config.host, config.tls.as_ref())
        .context("Failed to set up the swarm client")?;
    Ok(Some(client))
}
