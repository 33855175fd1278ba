pub mod aggregator;
pub mod backend;
pub mod request;
pub mod resolver;
pub mod selector;
pub mod sort;

pub use aggregator::StackAggregator;
pub use backend::{ClusterBackend, NamespaceDiscovery, SwarmBackend};
pub use request::{ListRequest, NamespaceQuery};
pub use resolver::resolve;
pub use selector::{select, BackendCapabilities, Selection};
pub use sort::{natural_cmp, sort_stacks};

use crate::Result;
use stackls_common::{OrchestratorKind, StackRecord};
use tracing::debug;

/// Backends active for one invocation
#[derive(Default)]
pub struct Backends<'a> {
    pub swarm: Option<&'a dyn SwarmBackend>,
    pub cluster: Option<StackAggregator<'a>>,
}

/// List, merge and sort the stacks of every active backend
///
/// The swarm backend is queried first. The first error from either backend
/// aborts the listing.
pub async fn list_stacks(backends: &Backends<'_>, request: &ListRequest) -> Result<Vec<StackRecord>> {
    let mut stacks = Vec::new();

    if let Some(swarm) = backends.swarm {
        let entries = swarm.list().await?;
        debug!("Swarm reported {} stack(s)", entries.len());
        stacks.extend(
            entries
                .into_iter()
                .map(|entry| entry.into_record(OrchestratorKind::Swarm)),
        );
    }

    if let Some(aggregator) = &backends.cluster {
        let records = aggregator.aggregate(request).await?;
        debug!("Cluster reported {} stack(s)", records.len());
        stacks.extend(records);
    }

    sort_stacks(&mut stacks);
    Ok(stacks)
}
