// file: src/config/mod.rs
// version: 1.0.0
// guid: fd54a221-83a0-4fdc-829f-a6995d61ccaf

//! Configuration module for the OpenShift cluster installer
//!
//! Handles loading and validation of the cluster description: nodes and their
//! roles, subscription credentials, setup packages and installation parameters.

pub mod cluster;
pub mod loader;

pub use cluster::{
    ClusterConfig, DockerConfig, HostnameConfig, InstallConfig, InventoryConfig, LivenessConfig,
    NodeConfig, ProbeKind, SetupConfig, SshConfig, SubscriptionConfig,
};
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a node plays in the OpenShift cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Master,
    Compute,
    Infra,
}

impl Role {
    /// Get the role as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Compute => "compute",
            Role::Infra => "infra",
        }
    }

    /// Node group label used in the `[nodes]` inventory section
    pub fn node_group(&self) -> &'static str {
        match self {
            Role::Master => "node-config-master",
            Role::Compute => "node-config-compute",
            Role::Infra => "node-config-infra",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
