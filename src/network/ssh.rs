// file: src/network/ssh.rs
// version: 1.0.0
// guid: f77f12db-c7cf-4016-90cd-961362ae1980

//! SSH-backed nodes and cluster
//!
//! Each [`SshNode`] owns at most one `ssh2` session, opened lazily on the
//! first command. `ssh2` is blocking, so every session operation runs on the
//! blocking thread pool; this is what lets the setup fan-out drive all nodes
//! at the same time. A transport error drops the session so that the next
//! command reconnects (this is how nodes come back after a reboot).

use crate::cluster::{Cluster, CommandOutput, ExecOptions, FileMode, Node};
use crate::config::{ClusterConfig, NodeConfig, Role, SshConfig};
use crate::error::InstallError;
use crate::Result;
use ssh2::{ExtendedData, Session};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Quote `value` for a POSIX shell
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Wrap `command` so it runs with elevated privileges
fn with_sudo(command: &str) -> String {
    format!("sudo sh -c {}", shell_quote(command))
}

#[derive(Debug, Clone)]
struct ConnectionParams {
    name: String,
    host: String,
    port: u16,
    username: String,
    private_key: Option<PathBuf>,
    command_timeout: Duration,
}

impl ConnectionParams {
    fn connect(&self) -> Result<Session> {
        info!(
            "Connecting to {} ({}:{}) as {}",
            self.name, self.host, self.port, self.username
        );

        let tcp = TcpStream::connect((self.host.as_str(), self.port)).map_err(|e| {
            InstallError::ssh(format!("Failed to connect to {}: {}", self.host, e))
        })?;

        let mut session = Session::new()
            .map_err(|e| InstallError::ssh(format!("Failed to create SSH session: {}", e)))?;

        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| InstallError::ssh(format!("SSH handshake failed: {}", e)))?;

        let auth = match &self.private_key {
            Some(key) => session.userauth_pubkey_file(&self.username, None, Path::new(key), None),
            None => session.userauth_agent(&self.username),
        };
        auth.map_err(|e| {
            InstallError::ssh(format!(
                "SSH authentication failed for {}@{}: {}",
                self.username, self.host, e
            ))
        })?;

        if !session.authenticated() {
            return Err(InstallError::ssh("SSH authentication failed"));
        }

        info!("SSH connection established to {}", self.name);
        Ok(session)
    }

    fn timeout_ms(&self, options: ExecOptions) -> u32 {
        if options.long_running {
            0
        } else {
            u32::try_from(self.command_timeout.as_millis()).unwrap_or(u32::MAX)
        }
    }
}

/// Long-running commands get stderr folded into stdout so a chatty stderr
/// cannot fill the channel window while stdout is being drained
fn stderr_mode(options: ExecOptions) -> ExtendedData {
    if options.long_running {
        ExtendedData::Merge
    } else {
        ExtendedData::Normal
    }
}

fn exec(
    session: &Session,
    params: &ConnectionParams,
    command: &str,
    options: ExecOptions,
    stdin: Option<&str>,
) -> Result<CommandOutput> {
    let shown = if options.redact { "<redacted>" } else { command };
    debug!("[{}] Executing command: {}", params.name, shown);

    session.set_timeout(params.timeout_ms(options));

    let wrapped = if options.sudo {
        with_sudo(command)
    } else {
        command.to_string()
    };

    let mut channel = session
        .channel_session()
        .map_err(|e| InstallError::ssh(format!("Failed to create SSH channel: {}", e)))?;

    channel
        .handle_extended_data(stderr_mode(options))
        .map_err(|e| InstallError::ssh(format!("Failed to configure SSH channel: {}", e)))?;

    channel
        .exec(&wrapped)
        .map_err(|e| InstallError::ssh(format!("Failed to execute command: {}", e)))?;

    if let Some(data) = stdin {
        channel
            .write_all(data.as_bytes())
            .map_err(|e| InstallError::ssh(format!("Failed to write file data: {}", e)))?;
        channel
            .flush()
            .map_err(|e| InstallError::ssh(format!("Failed to flush file data: {}", e)))?;
        channel
            .send_eof()
            .map_err(|e| InstallError::ssh(format!("Failed to send EOF: {}", e)))?;
    }

    let mut stdout = String::new();
    let mut stderr = String::new();

    channel
        .read_to_string(&mut stdout)
        .map_err(|e| InstallError::ssh(format!("Failed to read stdout: {}", e)))?;
    channel
        .stderr()
        .read_to_string(&mut stderr)
        .map_err(|e| InstallError::ssh(format!("Failed to read stderr: {}", e)))?;

    channel
        .wait_close()
        .map_err(|e| InstallError::ssh(format!("Failed to close SSH channel: {}", e)))?;

    let exit_code = channel
        .exit_status()
        .map_err(|e| InstallError::ssh(format!("Failed to get exit status: {}", e)))?;

    if exit_code != 0 && options.check_exit_code {
        error!("[{}] Command failed with exit code {}", params.name, exit_code);
        if !stdout.trim().is_empty() {
            error!("STDOUT: {}", stdout);
        }
        if !stderr.trim().is_empty() {
            error!("STDERR: {}", stderr);
        }
        return Err(InstallError::ProcessError {
            command: shown.to_string(),
            exit_code: Some(exit_code),
            stderr: if stderr.is_empty() { stdout } else { stderr },
        });
    }

    debug!("[{}] Command exited with {}", params.name, exit_code);
    Ok(CommandOutput {
        exit_code,
        stdout,
        stderr,
    })
}

/// A cluster member reached over SSH
pub struct SshNode {
    hostname: String,
    ip_address: String,
    role: Role,
    params: ConnectionParams,
    session: Arc<Mutex<Option<Session>>>,
}

impl SshNode {
    /// Create a node; no connection is made until the first command
    pub fn new(node: &NodeConfig, ssh: &SshConfig) -> Self {
        Self {
            hostname: node.hostname.clone(),
            ip_address: node.ip_address.clone(),
            role: node.role,
            params: ConnectionParams {
                name: node.hostname.clone(),
                host: node.ip_address.clone(),
                port: ssh.port,
                username: ssh.username.clone(),
                private_key: ssh.private_key.as_ref().map(PathBuf::from),
                command_timeout: Duration::from_secs(ssh.command_timeout_secs),
            },
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// Run `f` against this node's session on the blocking pool
    async fn with_session<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Session, &ConnectionParams) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let slot = Arc::clone(&self.session);
        let params = self.params.clone();

        tokio::task::spawn_blocking(move || {
            let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            let session = match slot.take() {
                Some(session) => session,
                None => params.connect()?,
            };

            let result = f(&session, &params);
            match &result {
                Err(InstallError::Ssh(e)) => {
                    warn!("[{}] Dropping SSH session after transport error: {}", params.name, e);
                }
                _ => *slot = Some(session),
            }
            result
        })
        .await
        .map_err(|e| InstallError::system(format!("SSH task for {} failed: {}", self.hostname, e)))?
    }
}

#[async_trait::async_trait]
impl Node for SshNode {
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
        let command = command.to_string();
        self.with_session(move |session, params| exec(session, params, &command, options, None))
            .await
    }

    async fn write_file(
        &self,
        path: &str,
        contents: &str,
        mode: FileMode,
        sudo: bool,
    ) -> Result<()> {
        info!("[{}] Writing {} ({:?})", self.hostname, path, mode);

        let redirect = match mode {
            FileMode::Write => ">",
            FileMode::Append => ">>",
        };
        let command = format!("cat {} {}", redirect, shell_quote(path));
        let contents = contents.to_string();
        let options = if sudo {
            ExecOptions::sudo()
        } else {
            ExecOptions::user()
        };

        self.with_session(move |session, params| {
            exec(session, params, &command, options, Some(&contents)).map(|_| ())
        })
        .await
    }

    fn disconnect(&self) {
        let mut slot = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = slot.take() {
            let _ = session.disconnect(None, "", None);
            info!("[{}] SSH session disconnected", self.hostname);
        }
    }
}

/// Cluster whose members are reached over SSH
pub struct SshCluster {
    nodes: Vec<Arc<SshNode>>,
}

impl SshCluster {
    pub fn from_config(config: &ClusterConfig) -> Self {
        Self {
            nodes: config
                .nodes
                .iter()
                .map(|node| Arc::new(SshNode::new(node, &config.ssh)))
                .collect(),
        }
    }
}

impl Cluster for SshCluster {
    fn nodes(&self, role: Option<Role>) -> Vec<Arc<dyn Node>> {
        self.nodes
            .iter()
            .filter(|n| role.map_or(true, |r| n.role == r))
            .map(|n| Arc::clone(n) as Arc<dyn Node>)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_config(hostname: &str, ip: &str, role: Role) -> NodeConfig {
        NodeConfig {
            hostname: hostname.to_string(),
            ip_address: ip.to_string(),
            role,
        }
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain"), "'plain'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_with_sudo_keeps_quotes_intact() {
        let cmd = with_sudo("subscription-manager repos --disable=\"*\"");
        assert_eq!(cmd, "sudo sh -c 'subscription-manager repos --disable=\"*\"'");

        let cmd = with_sudo("sed -i -e 's,a,b,' /etc/x");
        assert_eq!(cmd, r"sudo sh -c 'sed -i -e '\''s,a,b,'\'' /etc/x'");
    }

    #[test]
    fn test_timeout_for_long_running_commands() {
        let node = SshNode::new(
            &node_config("n1", "10.0.0.1", Role::Master),
            &SshConfig::default(),
        );
        assert_eq!(node.params.timeout_ms(ExecOptions::user()), 600_000);
        assert_eq!(node.params.timeout_ms(ExecOptions::user().long_running()), 0);
    }

    #[test]
    fn test_long_running_commands_merge_stderr() {
        assert!(matches!(
            stderr_mode(ExecOptions::user().long_running()),
            ExtendedData::Merge
        ));
        assert!(matches!(
            stderr_mode(ExecOptions::sudo().long_running()),
            ExtendedData::Merge
        ));
        assert!(matches!(stderr_mode(ExecOptions::sudo()), ExtendedData::Normal));
    }

    #[test]
    fn test_cluster_from_config_preserves_order_and_roles() {
        let config: ClusterConfig = serde_yaml::from_str(
            r#"
nodes:
  - { hostname: m0, ip_address: 10.0.0.1, role: master }
  - { hostname: c0, ip_address: 10.0.0.2, role: compute }
  - { hostname: i0, ip_address: 10.0.0.3, role: infra }
  - { hostname: c1, ip_address: 10.0.0.4, role: compute }
subscription: { username: u, password: p, pool_id: x }
"#,
        )
        .unwrap();

        let cluster = SshCluster::from_config(&config);
        let all: Vec<String> = cluster
            .nodes(None)
            .iter()
            .map(|n| n.hostname().to_string())
            .collect();
        assert_eq!(all, vec!["m0", "c0", "i0", "c1"]);

        let computes: Vec<String> = cluster
            .nodes(Some(Role::Compute))
            .iter()
            .map(|n| n.ip_address().to_string())
            .collect();
        assert_eq!(computes, vec!["10.0.0.2", "10.0.0.4"]);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_transport_error() {
        // Port 1 on localhost is closed on any sane test machine
        let ssh = SshConfig {
            port: 1,
            ..SshConfig::default()
        };
        let node = SshNode::new(&node_config("n1", "127.0.0.1", Role::Master), &ssh);
        let err = node.execute("true", ExecOptions::user()).await.unwrap_err();
        assert!(matches!(err, InstallError::Ssh(_)));
        node.disconnect();
    }
}
