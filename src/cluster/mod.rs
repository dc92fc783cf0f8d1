// file: src/cluster/mod.rs
// version: 1.0.0
// guid: 2b3f670f-5ae6-43c5-a75f-e69308e4a3e0

//! Node and cluster capabilities used by the installer
//!
//! A [`Node`] runs shell commands and writes files on one machine; a
//! [`Cluster`] hands out its nodes, optionally filtered by role. The SSH
//! implementation lives in [`crate::network::ssh`]; the in-memory one in
//! `mock` is built for tests and with the `mock` feature.

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use crate::config::Role;
use crate::Result;
use std::sync::Arc;

/// How a command is run on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    /// Run through `sudo`
    pub sudo: bool,
    /// Fail with `ProcessError` on non-zero exit
    pub check_exit_code: bool,
    /// Disable the session timeout
    pub long_running: bool,
    /// Keep the command text out of the logs (it carries credentials)
    pub redact: bool,
}

impl ExecOptions {
    /// Command run as the SSH user
    pub fn user() -> Self {
        Self {
            sudo: false,
            check_exit_code: true,
            long_running: false,
            redact: false,
        }
    }

    /// Command run with elevated privileges
    pub fn sudo() -> Self {
        Self {
            sudo: true,
            ..Self::user()
        }
    }

    pub fn unchecked(mut self) -> Self {
        self.check_exit_code = false;
        self
    }

    pub fn long_running(mut self) -> Self {
        self.long_running = true;
        self
    }

    pub fn redacted(mut self) -> Self {
        self.redact = true;
        self
    }
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self::user()
    }
}

/// Captured result of a remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Open mode for remote file writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Truncate and write
    Write,
    Append,
}

/// A single cluster machine reachable through a remote-execution capability
#[async_trait::async_trait]
pub trait Node: Send + Sync {
    /// Original hostname, the node's identity
    fn hostname(&self) -> &str;

    fn ip_address(&self) -> &str;

    fn role(&self) -> Role;

    /// Execute a shell command
    async fn execute(&self, command: &str, options: ExecOptions) -> Result<CommandOutput>;

    /// Write `contents` to `path`; the data is flushed before the file is closed
    async fn write_file(&self, path: &str, contents: &str, mode: FileMode, sudo: bool)
        -> Result<()>;

    /// Drop the current session; the next command reconnects
    fn disconnect(&self);
}

/// Cluster membership
pub trait Cluster: Send + Sync {
    /// Nodes in declaration order, optionally filtered by role
    fn nodes(&self, role: Option<Role>) -> Vec<Arc<dyn Node>>;
}
