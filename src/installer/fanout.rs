// file: src/installer/fanout.rs
// version: 1.0.0
// guid: 34dad147-d3bc-4770-ad89-3521172f5b0f

//! Concurrent node setup with a join barrier

use super::hostnames::HostnameMap;
use super::setup::NodeInitializer;
use crate::cluster::Node;
use crate::error::{InstallError, NodeFailure};
use crate::logging::with_async_operation_span;
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Run [`NodeInitializer::initialize`] on every node at once and wait for all
/// of them. Every failure is collected; none is retried.
pub async fn initialize_all(
    nodes: &[Arc<dyn Node>],
    hostnames: Arc<HostnameMap>,
    initializer: Arc<NodeInitializer>,
) -> Result<()> {
    info!("Starting initial setup on {} node(s)", nodes.len());

    let mut tasks = JoinSet::new();
    let mut names = HashMap::new();
    for node in nodes {
        let node = Arc::clone(node);
        let hostnames = Arc::clone(&hostnames);
        let initializer = Arc::clone(&initializer);
        let name = node.hostname().to_string();

        let setup = with_async_operation_span("node_setup", &name, move || async move {
            initializer.initialize(node.as_ref(), &hostnames).await
        });
        let handle = tasks.spawn(setup);
        names.insert(handle.id(), name);
    }

    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next_with_id().await {
        let (id, error) = match joined {
            Ok((_, Ok(()))) => continue,
            Ok((id, Err(e))) => (id, e),
            Err(e) => (
                e.id(),
                InstallError::system(format!("setup task did not complete: {}", e)),
            ),
        };
        let node = names.remove(&id).unwrap_or_else(|| "<unknown>".to_string());
        error!("Setup of {} failed: {}", node, error);
        failures.push(NodeFailure { node, error });
    }

    if failures.is_empty() {
        info!("Initial setup completed on all nodes");
        return Ok(());
    }

    failures.sort_by(|a, b| a.node.cmp(&b.node));
    Err(InstallError::NodeSetup { failures })
}
