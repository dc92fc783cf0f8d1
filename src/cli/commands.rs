// file: src/cli/commands.rs
// version: 2.0.0
// guid: 9b3e6a20-5c17-4d8f-a4e1-0f7d2c8b6a93

//! Command implementations for the CLI

use crate::{
    cluster::Cluster,
    config::{ClusterConfig, ConfigLoader},
    installer::{HostnameMap, HostnameMapper, InventoryWriter, RunController, Topology},
    network::{probe, SshCluster},
    Result,
};
use std::path::Path;
use tracing::info;

fn load_config(path: &Path) -> Result<ClusterConfig> {
    info!("Loading cluster configuration from {}", path.display());
    ConfigLoader::new().load_cluster_config(path)
}

fn hostname_map(config: &ClusterConfig, cluster: &dyn Cluster) -> Result<HostnameMap> {
    HostnameMapper::new(&config.hostnames).generate(&cluster.nodes(None))
}

/// Run the installation; returns the process exit status
pub async fn install_command(config_path: &Path) -> Result<i32> {
    let config = load_config(config_path)?;
    let cluster = SshCluster::from_config(&config);
    let probe = probe::from_config(&config.liveness, config.ssh.port);

    info!(
        "Installing OpenShift on {} node(s)",
        cluster.nodes(None).len()
    );
    let code = RunController::new(&config, probe).run(&cluster).await;

    for node in cluster.nodes(None) {
        node.disconnect();
    }
    Ok(code)
}

/// Render the hostname map without contacting any node
pub fn render_hostnames(config: &ClusterConfig, json: bool) -> Result<String> {
    let cluster = SshCluster::from_config(config);
    let hostnames = hostname_map(config, &cluster)?;

    if json {
        return Ok(serde_json::to_string_pretty(&hostnames)?);
    }

    let width = hostnames.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    Ok(hostnames
        .iter()
        .map(|(original, assigned)| format!("{:<width$}  {}", original, assigned, width = width))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Render the inventory document without contacting any node
pub fn render_inventory(config: &ClusterConfig) -> Result<String> {
    let cluster = SshCluster::from_config(config);
    let hostnames = hostname_map(config, &cluster)?;
    let topology = Topology::from_cluster(&cluster)?;
    InventoryWriter::new(config.inventory.clone()).render(&topology, &hostnames)
}

/// Print the hostname each node will be given
pub fn hostnames_command(config_path: &Path, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    println!("{}", render_hostnames(&config, json)?);
    Ok(())
}

/// Print the inventory that would be written to the control node
pub fn inventory_command(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    print!("{}", render_inventory(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
subscription:
  username: user
  password: secret
  pool_id: pool
hostnames:
  domain: example.com
nodes:
  - { hostname: m0, ip_address: 192.168.1.10, role: master }
  - { hostname: c0, ip_address: 192.168.1.11, role: compute }
  - { hostname: c1, ip_address: 192.168.1.12, role: compute }
  - { hostname: i0, ip_address: 192.168.1.13, role: infra }
  - { hostname: i1, ip_address: 192.168.1.14, role: infra }
"#;

    fn config() -> ClusterConfig {
        ConfigLoader::new().parse_cluster_config(CONFIG).unwrap()
    }

    #[test]
    fn test_render_hostnames_table() {
        let table = render_hostnames(&config(), false).unwrap();
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "c0  ci-vm-192-168-1-11.example.com");
        assert_eq!(lines[4], "m0  ci-vm-192-168-1-10.example.com");
    }

    #[test]
    fn test_render_hostnames_json() {
        let json = render_hostnames(&config(), true).unwrap();
        let map: std::collections::BTreeMap<String, String> =
            serde_json::from_str(&json).unwrap();

        assert_eq!(map.len(), 5);
        assert_eq!(map["i1"], "ci-vm-192-168-1-14.example.com");
    }

    #[test]
    fn test_render_inventory() {
        let doc = render_inventory(&config()).unwrap();

        assert!(doc.starts_with("[OSEv3:children]"));
        assert!(doc.contains("openshift_master_cluster_hostname=ci-vm-192-168-1-10.example.com"));
        assert!(doc.contains(
            "ci-vm-192-168-1-13.example.com openshift_node_group_name='node-config-infra'"
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let err = hostnames_command(Path::new("/nonexistent/cluster.yaml"), false).unwrap_err();
        assert!(matches!(err, crate::InstallError::Io(_) | crate::InstallError::Config(_)));
    }
}
