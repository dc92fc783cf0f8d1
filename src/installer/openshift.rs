// file: src/installer/openshift.rs
// version: 1.0.0
// guid: 9c3845a0-342b-4340-af3b-3b6e36264e9c

//! Control node installation: key distribution, inventory and playbooks

use super::hostnames::HostnameMap;
use super::inventory::{InventoryWriter, INVENTORY_FILE};
use super::topology::Topology;
use crate::cluster::{Cluster, ExecOptions, FileMode};
use crate::config::{InstallConfig, InventoryConfig};
use crate::error::InstallError;
use crate::Result;
use tracing::info;

pub struct ClusterInstaller {
    install: InstallConfig,
    inventory: InventoryWriter,
}

impl ClusterInstaller {
    pub fn new(install: InstallConfig, inventory: InventoryConfig) -> Self {
        Self {
            install,
            inventory: InventoryWriter::new(inventory),
        }
    }

    /// Install OpenShift from the control node (first master)
    pub async fn install(&self, cluster: &dyn Cluster, hostnames: &HostnameMap) -> Result<()> {
        let topology = Topology::from_cluster(cluster)?;
        let master = topology.control_node();
        let cfg = &self.install;
        info!("Installing OpenShift from control node {}", master.hostname());

        let key = &cfg.key_path;
        info!("[{}] Executing: Generating SSH key {}", master.hostname(), key);
        master
            .execute(
                &format!(
                    "rm -f {key} {key}.pub && ssh-keygen -b 2048 -f {key} -t rsa -q -N ''",
                    key = key
                ),
                ExecOptions::user(),
            )
            .await?;

        let output = master
            .execute(&format!("cat {}.pub", key), ExecOptions::user())
            .await?;
        let public_key = output.stdout.trim();
        if public_key.is_empty() {
            return Err(InstallError::system(format!(
                "Public key {}.pub on {} is empty",
                key,
                master.hostname()
            )));
        }
        let public_key = format!("{}\n", public_key);

        for node in cluster.nodes(None) {
            info!("Authorizing control node key on {}", node.hostname());
            node.write_file(&cfg.authorized_keys, &public_key, FileMode::Append, false)
                .await?;
        }

        info!("[{}] Executing: Installing {}", master.hostname(), cfg.installer_package);
        master
            .execute(
                &format!("yum -y install {}", cfg.installer_package),
                ExecOptions::sudo(),
            )
            .await?;

        self.inventory
            .write_hosts(cluster, hostnames, &cfg.ansible_dir)
            .await?;

        for playbook in [&cfg.prerequisites_playbook, &cfg.deploy_playbook] {
            info!("[{}] Running playbook {}", master.hostname(), playbook);
            master
                .execute(
                    &format!(
                        "cd {} && ansible-playbook -i {} {} -vvv",
                        cfg.ansible_dir, INVENTORY_FILE, playbook
                    ),
                    ExecOptions::user().long_running(),
                )
                .await?;
            info!("Playbook {} completed", playbook);
        }

        Ok(())
    }
}
