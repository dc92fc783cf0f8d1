// file: src/installer/liveness.rs
// version: 1.0.0
// guid: 20fcd59f-59b7-4ec1-a052-3d314b2f28c4

//! Post-reboot liveness polling

use crate::cluster::Node;
use crate::config::LivenessConfig;
use crate::network::ReachabilityProbe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Polls a node with a fixed number of attempts and a fixed pause between them
pub struct LivenessChecker {
    probe: Arc<dyn ReachabilityProbe>,
    max_attempts: u32,
    interval: Duration,
}

impl LivenessChecker {
    pub fn new(probe: Arc<dyn ReachabilityProbe>, max_attempts: u32, interval: Duration) -> Self {
        Self {
            probe,
            max_attempts,
            interval,
        }
    }

    pub fn from_config(probe: Arc<dyn ReachabilityProbe>, config: &LivenessConfig) -> Self {
        Self::new(probe, config.max_attempts, config.interval())
    }

    /// `true` as soon as one probe succeeds, `false` once attempts run out
    pub async fn is_alive(&self, node: &dyn Node) -> bool {
        let mut remaining = self.max_attempts;

        while remaining > 0 {
            if self.probe.probe(node.ip_address()).await {
                info!("{} ({}) is reachable", node.hostname(), node.ip_address());
                return true;
            }

            remaining -= 1;
            debug!(
                "{} not reachable yet, {} attempt(s) left, retrying in {:?}",
                node.hostname(),
                remaining,
                self.interval
            );
            tokio::time::sleep(self.interval).await;
        }

        warn!(
            "{} did not respond after {} attempt(s)",
            node.hostname(),
            self.max_attempts
        );
        false
    }
}
