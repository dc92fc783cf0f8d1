// file: src/cluster/mock.rs
// version: 1.0.0
// guid: 8a6f763d-8146-4d5e-a696-f62e8ee50ee0

//! In-memory cluster for exercising the installer without real machines
//!
//! `MockNode` records every command and file write. It understands just
//! enough shell to behave like a freshly provisioned host: `hostnamectl
//! set-hostname` changes what `hostname` / `hostname -f` report, and
//! `cat <key>.pub` returns a public key.

use super::{Cluster, CommandOutput, ExecOptions, FileMode, Node};
use crate::config::Role;
use crate::error::InstallError;
use crate::network::probe::ReachabilityProbe;
use crate::Result;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const MOCK_PUBLIC_KEY: &str = "ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQmock installer@master\n";

#[derive(Debug, Clone)]
pub struct RecordedCommand {
    pub command: String,
    pub options: ExecOptions,
}

#[derive(Debug, Clone)]
pub struct RecordedWrite {
    pub path: String,
    pub contents: String,
    pub mode: FileMode,
    pub sudo: bool,
}

#[derive(Debug, Default)]
struct MockState {
    current_hostname: String,
    reported_hostname: Option<String>,
    failures: Vec<String>,
    commands: Vec<RecordedCommand>,
    writes: Vec<RecordedWrite>,
    disconnects: usize,
}

#[derive(Debug)]
pub struct MockNode {
    hostname: String,
    ip_address: String,
    role: Role,
    state: Mutex<MockState>,
}

impl MockNode {
    pub fn new(hostname: &str, ip_address: &str, role: Role) -> Self {
        Self {
            hostname: hostname.to_string(),
            ip_address: ip_address.to_string(),
            role,
            state: Mutex::new(MockState {
                current_hostname: hostname.to_string(),
                ..MockState::default()
            }),
        }
    }

    /// Commands containing `pattern` exit with status 1
    pub fn fail_on(self, pattern: &str) -> Self {
        self.state().failures.push(pattern.to_string());
        self
    }

    /// `hostname` and `hostname -f` always report `name`
    pub fn report_hostname(self, name: &str) -> Self {
        self.state().reported_hostname = Some(name.to_string());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.state()
            .commands
            .iter()
            .map(|c| c.command.clone())
            .collect()
    }

    pub fn recorded(&self) -> Vec<RecordedCommand> {
        self.state().commands.clone()
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.state().writes.clone()
    }

    pub fn disconnects(&self) -> usize {
        self.state().disconnects
    }

    /// Whether any executed command contains `pattern`
    pub fn ran(&self, pattern: &str) -> bool {
        self.state()
            .commands
            .iter()
            .any(|c| c.command.contains(pattern))
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl Node for MockNode {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn ip_address(&self) -> &str {
        &self.ip_address
    }

    fn role(&self) -> Role {
        self.role
    }

    async fn execute(&self, command: &str, options: ExecOptions) -> Result<CommandOutput> {
        let mut state = self.state();
        state.commands.push(RecordedCommand {
            command: command.to_string(),
            options,
        });

        if state.failures.iter().any(|p| command.contains(p.as_str())) {
            let output = CommandOutput {
                exit_code: 1,
                stdout: String::new(),
                stderr: format!("mock failure on {}", self.hostname),
            };
            if options.check_exit_code {
                return Err(InstallError::ProcessError {
                    command: command.to_string(),
                    exit_code: Some(output.exit_code),
                    stderr: output.stderr,
                });
            }
            return Ok(output);
        }

        let mut stdout = String::new();
        if let Some(name) = command.strip_prefix("hostnamectl set-hostname ") {
            state.current_hostname = name.trim().to_string();
        } else if command == "hostname" || command == "hostname -f" {
            let name = state
                .reported_hostname
                .clone()
                .unwrap_or_else(|| state.current_hostname.clone());
            stdout = format!("{}\n", name);
        } else if command.starts_with("cat ") && command.ends_with(".pub") {
            stdout = MOCK_PUBLIC_KEY.to_string();
        }

        Ok(CommandOutput {
            exit_code: 0,
            stdout,
            stderr: String::new(),
        })
    }

    async fn write_file(
        &self,
        path: &str,
        contents: &str,
        mode: FileMode,
        sudo: bool,
    ) -> Result<()> {
        self.state().writes.push(RecordedWrite {
            path: path.to_string(),
            contents: contents.to_string(),
            mode,
            sudo,
        });
        Ok(())
    }

    fn disconnect(&self) {
        self.state().disconnects += 1;
    }
}

/// A fixed set of mock nodes
pub struct MockCluster {
    nodes: Vec<Arc<MockNode>>,
}

impl MockCluster {
    pub fn new(nodes: Vec<MockNode>) -> Self {
        Self {
            nodes: nodes.into_iter().map(Arc::new).collect(),
        }
    }

    /// One master, two computes and two infra nodes on 10.0.0.1-5
    pub fn standard() -> Self {
        Self::new(standard_nodes())
    }

    pub fn node(&self, hostname: &str) -> Option<Arc<MockNode>> {
        self.nodes
            .iter()
            .find(|n| n.hostname() == hostname)
            .cloned()
    }

    pub fn mock_nodes(&self) -> &[Arc<MockNode>] {
        &self.nodes
    }
}

impl Cluster for MockCluster {
    fn nodes(&self, role: Option<Role>) -> Vec<Arc<dyn Node>> {
        self.nodes
            .iter()
            .filter(|n| role.map_or(true, |r| n.role() == r))
            .map(|n| Arc::clone(n) as Arc<dyn Node>)
            .collect()
    }
}

/// Nodes of [`MockCluster::standard`], for tests that need to tweak one of them
pub fn standard_nodes() -> Vec<MockNode> {
    vec![
        MockNode::new("master-0", "10.0.0.1", Role::Master),
        MockNode::new("compute-0", "10.0.0.2", Role::Compute),
        MockNode::new("compute-1", "10.0.0.3", Role::Compute),
        MockNode::new("infra-0", "10.0.0.4", Role::Infra),
        MockNode::new("infra-1", "10.0.0.5", Role::Infra),
    ]
}

/// Probe answering from per-address scripts
pub struct ScriptedProbe {
    default: bool,
    scripts: Mutex<HashMap<String, VecDeque<bool>>>,
    attempts: Mutex<HashMap<String, u32>>,
}

impl ScriptedProbe {
    /// Every probe returns `reachable`
    pub fn always(reachable: bool) -> Self {
        Self {
            default: reachable,
            scripts: Mutex::new(HashMap::new()),
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Probes of `address` answer from `script`, then fall back to the default
    pub fn with_script(self, address: &str, script: Vec<bool>) -> Self {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address.to_string(), script.into());
        self
    }

    pub fn attempts(&self, address: &str) -> u32 {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl ReachabilityProbe for ScriptedProbe {
    async fn probe(&self, address: &str) -> bool {
        *self
            .attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(address.to_string())
            .or_insert(0) += 1;

        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(address)
            .and_then(|s| s.pop_front())
            .unwrap_or(self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_node_tracks_hostname() {
        let node = MockNode::new("n1", "10.0.0.1", Role::Master);
        node.execute("hostnamectl set-hostname ci-vm-10-0-0-1.example.com", ExecOptions::sudo())
            .await
            .unwrap();
        let out = node.execute("hostname -f", ExecOptions::user()).await.unwrap();
        assert_eq!(out.stdout.trim(), "ci-vm-10-0-0-1.example.com");
        assert_eq!(node.commands().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_node_failures() {
        let node = MockNode::new("n1", "10.0.0.1", Role::Master).fail_on("yum");
        let err = node
            .execute("yum -y update", ExecOptions::sudo())
            .await
            .unwrap_err();
        assert!(matches!(err, InstallError::ProcessError { exit_code: Some(1), .. }));

        let out = node
            .execute("yum -y update", ExecOptions::sudo().unchecked())
            .await
            .unwrap();
        assert_eq!(out.exit_code, 1);
    }

    #[test]
    fn test_mock_cluster_role_filter() {
        let cluster = MockCluster::standard();
        assert_eq!(cluster.nodes(None).len(), 5);
        assert_eq!(cluster.nodes(Some(Role::Master)).len(), 1);
        assert_eq!(cluster.nodes(Some(Role::Compute)).len(), 2);
        assert_eq!(cluster.nodes(Some(Role::Infra)).len(), 2);
        assert!(cluster.node("infra-1").is_some());
    }

    #[tokio::test]
    async fn test_scripted_probe() {
        let probe = ScriptedProbe::always(true).with_script("10.0.0.1", vec![false]);
        assert!(!probe.probe("10.0.0.1").await);
        assert!(probe.probe("10.0.0.1").await);
        assert_eq!(probe.attempts("10.0.0.1"), 2);
        assert_eq!(probe.attempts("10.0.0.2"), 0);
    }
}
