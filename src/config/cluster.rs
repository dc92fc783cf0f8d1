// file: src/config/cluster.rs
// version: 1.0.0
// guid: 98f80a17-db05-41ff-9479-d75bf3ac24f5

//! Cluster description structures

use super::Role;
use crate::error::InstallError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Full description of a cluster and how to install OpenShift on it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// SSH connection settings shared by every node
    #[serde(default)]
    pub ssh: SshConfig,
    /// Cluster members in declaration order
    pub nodes: Vec<NodeConfig>,
    /// Resolvable hostname derivation
    #[serde(default)]
    pub hostnames: HostnameConfig,
    /// Subscription manager registration
    pub subscription: SubscriptionConfig,
    /// Per-node one-time setup
    #[serde(default)]
    pub setup: SetupConfig,
    /// Post-reboot reachability polling
    #[serde(default)]
    pub liveness: LivenessConfig,
    /// Control node installation steps
    #[serde(default)]
    pub install: InstallConfig,
    /// Inventory parameters
    #[serde(default)]
    pub inventory: InventoryConfig,
}

/// A single cluster member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Original (instance) hostname, used as the node's identity
    pub hostname: String,
    /// IPv4 address used for SSH and reachability checks
    pub ip_address: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshConfig {
    #[serde(default = "default_ssh_user")]
    pub username: String,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    /// Private key for authentication; the SSH agent is used when unset
    #[serde(default)]
    pub private_key: Option<String>,
    /// Session timeout for regular commands (long-running commands have none)
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            username: default_ssh_user(),
            port: default_ssh_port(),
            private_key: None,
            command_timeout_secs: default_command_timeout(),
        }
    }
}

/// Template for `{prefix}{a-b-c-d}.{domain}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostnameConfig {
    #[serde(default = "default_hostname_prefix")]
    pub prefix: String,
    #[serde(default = "default_hostname_domain")]
    pub domain: String,
}

impl Default for HostnameConfig {
    fn default() -> Self {
        Self {
            prefix: default_hostname_prefix(),
            domain: default_hostname_domain(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    /// Value written to `hostname =` in rhsm.conf
    #[serde(default = "default_rhsm_hostname")]
    pub rhsm_hostname: String,
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub pool_id: String,
    #[serde(default = "default_repos")]
    pub repos: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupConfig {
    #[serde(default = "default_runner_package")]
    pub runner_package: String,
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,
    /// Container runtime setup; skipped when absent
    #[serde(default)]
    pub docker: Option<DockerConfig>,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            runner_package: default_runner_package(),
            packages: default_packages(),
            docker: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerConfig {
    #[serde(default = "default_docker_package")]
    pub package: String,
    /// Registry appended to /etc/containers/registries.conf
    #[serde(default)]
    pub insecure_registry: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// `ping -c 1` from the machine running the installer
    Icmp,
    /// TCP connect to the SSH port
    Tcp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessConfig {
    #[serde(default = "default_probe")]
    pub probe: ProbeKind,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

impl LivenessConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            probe: default_probe(),
            max_attempts: default_max_attempts(),
            interval_secs: default_interval(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Private key generated on the control node (`.pub` is distributed)
    #[serde(default = "default_key_path")]
    pub key_path: String,
    /// Authorized keys file on every node, relative to the SSH user's home
    #[serde(default = "default_authorized_keys")]
    pub authorized_keys: String,
    #[serde(default = "default_installer_package")]
    pub installer_package: String,
    /// openshift-ansible checkout; the inventory is written to `<dir>/hosts`
    #[serde(default = "default_ansible_dir")]
    pub ansible_dir: String,
    #[serde(default = "default_prerequisites_playbook")]
    pub prerequisites_playbook: String,
    #[serde(default = "default_deploy_playbook")]
    pub deploy_playbook: String,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            key_path: default_key_path(),
            authorized_keys: default_authorized_keys(),
            installer_package: default_installer_package(),
            ansible_dir: default_ansible_dir(),
            prerequisites_playbook: default_prerequisites_playbook(),
            deploy_playbook: default_deploy_playbook(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default = "default_ssh_user")]
    pub ansible_user: String,
    #[serde(default = "default_openshift_release")]
    pub openshift_release: String,
    #[serde(default = "default_registry")]
    pub registry: String,
    #[serde(default = "default_portal_net")]
    pub portal_net: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            ansible_user: default_ssh_user(),
            openshift_release: default_openshift_release(),
            registry: default_registry(),
            portal_net: default_portal_net(),
        }
    }
}

impl ClusterConfig {
    /// Validate the cluster configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.nodes.is_empty() {
            return Err(InstallError::validation(
                "At least one node must be configured",
            ));
        }

        let mut hostnames = HashSet::new();
        let mut addresses = HashSet::new();
        for node in &self.nodes {
            node.validate()?;
            if !hostnames.insert(node.hostname.as_str()) {
                return Err(InstallError::validation(format!(
                    "Duplicate node hostname: {}",
                    node.hostname
                )));
            }
            if !addresses.insert(node.ip_address.as_str()) {
                return Err(InstallError::validation(format!(
                    "Duplicate node IP address: {}",
                    node.ip_address
                )));
            }
        }

        self.subscription.validate()?;

        if self.liveness.max_attempts == 0 {
            return Err(InstallError::validation(
                "liveness.max_attempts must be greater than zero",
            ));
        }

        if self.hostnames.domain.is_empty() {
            return Err(InstallError::validation(
                "hostnames.domain cannot be empty",
            ));
        }

        Ok(())
    }
}

impl NodeConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.hostname.is_empty() {
            return Err(InstallError::validation("Node hostname cannot be empty"));
        }
        self.ip_address.parse::<Ipv4Addr>().map_err(|_| {
            InstallError::validation(format!(
                "Invalid IPv4 address for {}: {}",
                self.hostname, self.ip_address
            ))
        })?;
        Ok(())
    }
}

impl SubscriptionConfig {
    pub fn validate(&self) -> crate::Result<()> {
        let required = [
            ("subscription.username", &self.username),
            ("subscription.password", &self.password),
            ("subscription.pool_id", &self.pool_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(InstallError::validation(format!("{} cannot be empty", name)));
            }
        }
        Ok(())
    }
}

fn default_ssh_user() -> String {
    "cephuser".to_string()
}

fn default_ssh_port() -> u16 {
    22
}

fn default_command_timeout() -> u64 {
    600
}

fn default_hostname_prefix() -> String {
    "ci-vm-".to_string()
}

fn default_hostname_domain() -> String {
    "hosted.upshift.rdu2.redhat.com".to_string()
}

fn default_rhsm_hostname() -> String {
    "subscription.rhn.stage.redhat.com".to_string()
}

fn default_server_url() -> String {
    "subscription.rhsm.stage.redhat.com:443/subscription".to_string()
}

fn default_base_url() -> String {
    "https://cdn.redhat.com".to_string()
}

fn default_repos() -> Vec<String> {
    [
        "rhel-7-server-rpms",
        "rhel-7-server-extras-rpms",
        "rhel-7-server-ose-3.11-rpms",
        "rhel-7-server-ansible-2.6-rpms",
        "rhel-7-fast-datapath-rpms",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_runner_package() -> String {
    "ansible".to_string()
}

fn default_packages() -> Vec<String> {
    [
        "vim",
        "screen",
        "tree",
        "wget",
        "git",
        "net-tools",
        "bind-utils",
        "iptables-services",
        "bridge-utils",
        "bash-completion",
        "kexec-tools",
        "sos",
        "psacct",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_docker_package() -> String {
    "docker-1.13.1".to_string()
}

fn default_probe() -> ProbeKind {
    ProbeKind::Icmp
}

fn default_max_attempts() -> u32 {
    10
}

fn default_interval() -> u64 {
    15
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_key_path() -> String {
    "/home/cephuser/.ssh/id_rsa".to_string()
}

fn default_authorized_keys() -> String {
    ".ssh/authorized_keys".to_string()
}

fn default_installer_package() -> String {
    "openshift-ansible".to_string()
}

fn default_ansible_dir() -> String {
    "/usr/share/ansible/openshift-ansible".to_string()
}

fn default_prerequisites_playbook() -> String {
    "playbooks/prerequisites.yml".to_string()
}

fn default_deploy_playbook() -> String {
    "playbooks/deploy_cluster.yml".to_string()
}

fn default_openshift_release() -> String {
    "v3.11".to_string()
}

fn default_registry() -> String {
    "registry.access.redhat.com".to_string()
}

fn default_portal_net() -> String {
    "172.31.0.0/16".to_string()
}
