// file: src/installer/setup.rs
// version: 1.0.0
// guid: ccd37706-5f9a-414e-a375-160338f96b1b

//! One-time node setup: subscription, packages, hostname, updates, reboot

use super::hostnames::HostnameMap;
use crate::cluster::{ExecOptions, FileMode, Node};
use crate::config::{DockerConfig, SetupConfig, SubscriptionConfig};
use crate::error::InstallError;
use crate::network::ssh::shell_quote;
use crate::Result;
use tracing::{info, warn};

const RHSM_CONF: &str = "/etc/rhsm/rhsm.conf";
const REGISTRIES_CONF: &str = "/etc/containers/registries.conf";

/// Performs the per-node setup sequence
pub struct NodeInitializer {
    subscription: SubscriptionConfig,
    setup: SetupConfig,
}

impl NodeInitializer {
    pub fn new(subscription: SubscriptionConfig, setup: SetupConfig) -> Self {
        Self {
            subscription,
            setup,
        }
    }

    /// Run the full setup on `node`, finishing with a reboot
    pub async fn initialize(&self, node: &dyn Node, hostnames: &HostnameMap) -> Result<()> {
        info!("Starting initial setup of {}", node.hostname());

        self.configure_rhsm(node).await?;
        self.register(node).await?;
        self.install_packages(node).await?;

        let hostname = hostnames.resolve(node.hostname())?;
        self.assign_hostname(node, hostname).await?;
        self.verify_hostname(node, hostname).await?;

        if let Some(docker) = &self.setup.docker {
            self.setup_docker(node, docker).await?;
        }

        self.log_and_execute(node, "Applying OS updates", "yum -y update")
            .await?;
        self.reboot(node).await;

        info!("Initial setup of {} completed", node.hostname());
        Ok(())
    }

    async fn configure_rhsm(&self, node: &dyn Node) -> Result<()> {
        let cmd = format!(
            "sed -i -e 's,^hostname *=.*,hostname = {},;s,baseurl *=.*,baseurl= {},' {}",
            self.subscription.rhsm_hostname, self.subscription.base_url, RHSM_CONF
        );
        self.log_and_execute(node, "Configuring rhsm.conf", &cmd)
            .await
    }

    async fn register(&self, node: &dyn Node) -> Result<()> {
        let sub = &self.subscription;

        info!("[{}] Executing: Registering with subscription manager", node.hostname());
        let register = format!(
            "subscription-manager --force register --serverurl={} --baseurl={} --username={} --password={} --auto-attach",
            sub.server_url,
            sub.base_url,
            shell_quote(&sub.username),
            shell_quote(&sub.password)
        );
        node.execute(&register, ExecOptions::sudo().redacted())
            .await?;

        self.log_and_execute(node, "Refreshing subscriptions", "subscription-manager refresh")
            .await?;

        info!("[{}] Executing: Attaching subscription pool", node.hostname());
        node.execute(
            &format!("subscription-manager attach --pool={}", shell_quote(&sub.pool_id)),
            ExecOptions::sudo().redacted(),
        )
        .await?;

        self.log_and_execute(
            node,
            "Disabling all repositories",
            "subscription-manager repos --disable=\"*\"",
        )
        .await?;

        if !sub.repos.is_empty() {
            let enable = sub
                .repos
                .iter()
                .map(|repo| format!("--enable=\"{}\"", repo))
                .collect::<Vec<_>>()
                .join(" ");
            self.log_and_execute(
                node,
                "Enabling repositories",
                &format!("subscription-manager repos {}", enable),
            )
            .await?;
        }

        Ok(())
    }

    async fn install_packages(&self, node: &dyn Node) -> Result<()> {
        self.log_and_execute(
            node,
            "Installing automation runner",
            &format!("yum -y install {}", self.setup.runner_package),
        )
        .await?;

        if !self.setup.packages.is_empty() {
            self.log_and_execute(
                node,
                "Installing base packages",
                &format!("yum -y install {}", self.setup.packages.join(" ")),
            )
            .await?;
        }

        Ok(())
    }

    async fn assign_hostname(&self, node: &dyn Node, hostname: &str) -> Result<()> {
        self.log_and_execute(
            node,
            "Setting hostname",
            &format!("hostnamectl set-hostname {}", hostname),
        )
        .await
    }

    /// Both `hostname` and `hostname -f` must report the generated name
    async fn verify_hostname(&self, node: &dyn Node, expected: &str) -> Result<()> {
        let short = node.execute("hostname", ExecOptions::user()).await?;
        let fqdn = node.execute("hostname -f", ExecOptions::user()).await?;
        let short = short.stdout.trim();
        let fqdn = fqdn.stdout.trim();

        if short != expected || fqdn != expected {
            return Err(InstallError::HostnameMismatch {
                node: node.hostname().to_string(),
                expected: expected.to_string(),
                short: short.to_string(),
                fqdn: fqdn.to_string(),
            });
        }

        info!("[{}] Hostname verified as {}", node.hostname(), expected);
        Ok(())
    }

    async fn setup_docker(&self, node: &dyn Node, docker: &DockerConfig) -> Result<()> {
        self.log_and_execute(
            node,
            "Installing docker",
            &format!("yum -y install {}", docker.package),
        )
        .await?;
        self.log_and_execute(node, "Enabling docker", "systemctl enable docker")
            .await?;
        self.log_and_execute(node, "Starting docker", "systemctl start docker")
            .await?;

        if let Some(registry) = &docker.insecure_registry {
            node.write_file(
                REGISTRIES_CONF,
                &format!("{}\n", registry),
                FileMode::Append,
                true,
            )
            .await?;
        }

        for image in &docker.images {
            self.log_and_execute(node, "Pulling image", &format!("docker pull {}", image))
                .await?;
        }

        Ok(())
    }

    /// Fire the reboot; the connection is expected to drop
    async fn reboot(&self, node: &dyn Node) {
        info!("[{}] Executing: Rebooting", node.hostname());
        match node
            .execute("systemctl reboot", ExecOptions::sudo().unchecked())
            .await
        {
            Ok(output) if !output.success() => {
                warn!(
                    "[{}] Reboot command exited with {}, ignoring",
                    node.hostname(),
                    output.exit_code
                );
            }
            Ok(_) => {}
            Err(e) => warn!("[{}] Connection lost during reboot: {}", node.hostname(), e),
        }
        node.disconnect();
    }

    async fn log_and_execute(&self, node: &dyn Node, description: &str, command: &str) -> Result<()> {
        info!("[{}] Executing: {} -> {}", node.hostname(), description, command);
        node.execute(command, ExecOptions::sudo()).await.map(|_| ())
    }
}
