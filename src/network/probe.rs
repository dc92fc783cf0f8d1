// file: src/network/probe.rs
// version: 1.0.0
// guid: b335b624-5228-4424-9588-22fde001c671

//! Reachability probes used to detect nodes coming back after a reboot

use crate::config::{LivenessConfig, ProbeKind};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// A single reachability check against an address
#[async_trait::async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// `true` if `address` answered
    async fn probe(&self, address: &str) -> bool;
}

/// One ICMP echo via the system `ping`
pub struct IcmpProbe {
    timeout: Duration,
}

impl IcmpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait::async_trait]
impl ReachabilityProbe for IcmpProbe {
    async fn probe(&self, address: &str) -> bool {
        let wait = self.timeout.as_secs().max(1).to_string();
        let status = tokio::process::Command::new("ping")
            .args(["-c", "1", "-W", wait.as_str(), address])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) => {
                debug!("ping {} exited with {}", address, status);
                status.success()
            }
            Err(e) => {
                debug!("Failed to run ping for {}: {}", address, e);
                false
            }
        }
    }
}

/// TCP connect to a port (the SSH port by default)
pub struct TcpProbe {
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }
}

#[async_trait::async_trait]
impl ReachabilityProbe for TcpProbe {
    async fn probe(&self, address: &str) -> bool {
        debug!("Testing connectivity to {}:{}", address, self.port);

        match timeout(
            self.timeout,
            tokio::net::TcpStream::connect((address, self.port)),
        )
        .await
        {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("Failed to connect to {}:{}: {}", address, self.port, e);
                false
            }
            Err(_) => {
                debug!(
                    "Connection to {}:{} timed out after {:?}",
                    address, self.port, self.timeout
                );
                false
            }
        }
    }
}

/// Build the probe selected by the liveness configuration
pub fn from_config(liveness: &LivenessConfig, ssh_port: u16) -> Arc<dyn ReachabilityProbe> {
    match liveness.probe {
        ProbeKind::Icmp => Arc::new(IcmpProbe::new(liveness.probe_timeout())),
        ProbeKind::Tcp => Arc::new(TcpProbe::new(ssh_port, liveness.probe_timeout())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tcp_probe_open_port() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = TcpProbe::new(port, Duration::from_secs(2));
        assert!(probe.probe("127.0.0.1").await);
    }

    #[tokio::test]
    async fn test_tcp_probe_closed_port() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let probe = TcpProbe::new(port, Duration::from_secs(2));
        assert!(!probe.probe("127.0.0.1").await);
    }

    #[tokio::test]
    async fn test_icmp_probe_never_panics_on_bad_address() {
        let probe = IcmpProbe::new(Duration::from_secs(1));
        assert!(!probe.probe("not-an-address.invalid").await);
    }
}
