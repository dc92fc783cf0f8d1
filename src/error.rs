// file: src/error.rs
// version: 1.0.0
// guid: 16153078-40ad-4831-8e6b-db6fa571d35c

use thiserror::Error;

/// Result type alias for the installer
pub type Result<T> = std::result::Result<T, InstallError>;

/// A single node that failed during the parallel setup phase
#[derive(Debug)]
pub struct NodeFailure {
    pub node: String,
    pub error: InstallError,
}

/// Error types for cluster provisioning and OpenShift installation
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SSH error: {0}")]
    Ssh(String),

    #[error("Command '{command}' failed with exit code {exit_code:?}: {stderr}")]
    ProcessError {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("No generated hostname for node {0}")]
    MissingHostname(String),

    #[error(
        "`hostname` and/or `hostname -f` do not match generated hostname for {node}: expected {expected}, got '{short}' / '{fqdn}'"
    )]
    HostnameMismatch {
        node: String,
        expected: String,
        short: String,
        fqdn: String,
    },

    #[error("Node {0} has not come up after reboot")]
    Reboot(String),

    #[error("Cluster topology error: need at least {required} {role} node(s), found {found}")]
    Topology {
        role: String,
        required: usize,
        found: usize,
    },

    #[error("Node setup failed on {} node(s): {}", .failures.len(), summarize(.failures))]
    NodeSetup { failures: Vec<NodeFailure> },

    #[error("System error: {0}")]
    System(String),
}

fn summarize(failures: &[NodeFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.node, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

impl InstallError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new SSH transport error
    pub fn ssh(msg: impl Into<String>) -> Self {
        Self::Ssh(msg.into())
    }

    /// Create a new system error
    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// Names of the nodes that failed setup, if this is a fan-out failure
    pub fn failed_nodes(&self) -> Vec<&str> {
        match self {
            Self::NodeSetup { failures } => failures.iter().map(|f| f.node.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}
