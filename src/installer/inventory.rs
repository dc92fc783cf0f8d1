// file: src/installer/inventory.rs
// version: 1.0.0
// guid: 90b75bb3-a696-41e5-ae14-cfc30fa78ef9

//! openshift-ansible inventory generation

use super::hostnames::HostnameMap;
use super::topology::Topology;
use crate::cluster::{Cluster, FileMode};
use crate::config::InventoryConfig;
use crate::Result;
use tracing::info;

/// File name of the inventory inside the ansible directory
pub const INVENTORY_FILE: &str = "hosts";

pub struct InventoryWriter {
    config: InventoryConfig,
}

impl InventoryWriter {
    pub fn new(config: InventoryConfig) -> Self {
        Self { config }
    }

    /// Render the inventory document for `topology`
    pub fn render(&self, topology: &Topology, hostnames: &HostnameMap) -> Result<String> {
        let cfg = &self.config;
        let master = hostnames.resolve(topology.control_node().hostname())?;

        let nodes = topology
            .inventory_nodes()
            .into_iter()
            .map(|node| -> Result<String> {
                Ok(format!(
                    "{} openshift_node_group_name='{}'\n",
                    hostnames.resolve(node.hostname())?,
                    node.role().node_group()
                ))
            })
            .collect::<Result<String>>()?;

        Ok(format!(
            "[OSEv3:children]
masters
nodes
etcd

[OSEv3:vars]
install_method=rpm
os_update=false
install_update_docker=true
docker_storage_driver=devicemapper
ansible_ssh_user={user}
ansible_become=true
openshift_release={release}
oreg_url={registry}/openshift3/ose-${{component}}:{release}
openshift_cockpit_deployer_image={registry}/openshift3/
openshift_docker_insecure_registries={registry}
openshift_deployment_type=openshift-enterprise
openshift_web_console_install=true
openshift_enable_service_catalog=false
osm_use_cockpit=false
osm_cockpit_plugins=['cockpit-kubernetes']
debug_level=5
openshift_set_hostname=true
openshift_override_hostname_check=true
openshift_disable_check=docker_image_availability
openshift_check_min_host_disk_gb=2
openshift_check_min_host_memory_gb=1
openshift_portal_net={portal_net}
openshift_master_cluster_method=native
openshift_clock_enabled=true
openshift_use_openshift_sdn=true
openshift_master_dynamic_provisioning_enabled=true
openshift_master_cluster_hostname={master}
openshift_master_cluster_public_hostname={master}

[masters]
{master}

[etcd]
{master}

[nodes]
{nodes}",
            user = cfg.ansible_user,
            release = cfg.openshift_release,
            registry = cfg.registry,
            portal_net = cfg.portal_net,
            master = master,
            nodes = nodes,
        ))
    }

    /// Render the inventory and write it to `<dir>/hosts` on the control node
    pub async fn write_hosts(
        &self,
        cluster: &dyn Cluster,
        hostnames: &HostnameMap,
        dir: &str,
    ) -> Result<()> {
        let topology = Topology::from_cluster(cluster)?;
        let content = self.render(&topology, hostnames)?;
        info!("Generated inventory:\n{}", content);

        let path = format!("{}/{}", dir.trim_end_matches('/'), INVENTORY_FILE);
        let control = topology.control_node();
        control
            .write_file(&path, &content, FileMode::Write, true)
            .await?;

        info!("Inventory written to {}:{}", control.hostname(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::mock::{MockCluster, MockNode};
    use crate::cluster::Cluster;
    use crate::config::{HostnameConfig, Role};
    use crate::error::InstallError;
    use crate::installer::hostnames::HostnameMapper;

    fn hostnames(cluster: &MockCluster) -> HostnameMap {
        HostnameMapper::new(&HostnameConfig::default())
            .generate(&cluster.nodes(None))
            .unwrap()
    }

    fn section<'a>(doc: &'a str, name: &str) -> Vec<&'a str> {
        let header = format!("[{}]", name);
        doc.lines()
            .skip_while(|l| *l != header)
            .skip(1)
            .take_while(|l| !l.starts_with('['))
            .filter(|l| !l.trim().is_empty())
            .collect()
    }

    fn host(last_octet: u8) -> String {
        format!("ci-vm-10-0-0-{}.hosted.upshift.rdu2.redhat.com", last_octet)
    }

    #[test]
    fn test_render_standard_cluster() {
        let cluster = MockCluster::standard();
        let topology = Topology::from_cluster(&cluster).unwrap();
        let doc = InventoryWriter::new(InventoryConfig::default())
            .render(&topology, &hostnames(&cluster))
            .unwrap();

        assert_eq!(section(&doc, "OSEv3:children"), vec!["masters", "nodes", "etcd"]);
        assert_eq!(section(&doc, "masters"), vec![host(1).as_str()]);
        assert_eq!(section(&doc, "etcd"), vec![host(1).as_str()]);

        let expected_nodes = vec![
            format!("{} openshift_node_group_name='node-config-master'", host(1)),
            format!("{} openshift_node_group_name='node-config-compute'", host(2)),
            format!("{} openshift_node_group_name='node-config-compute'", host(3)),
            format!("{} openshift_node_group_name='node-config-infra'", host(4)),
            format!("{} openshift_node_group_name='node-config-infra'", host(5)),
        ];
        assert_eq!(section(&doc, "nodes"), expected_nodes);
        assert!(doc.ends_with(&format!("{}\n", expected_nodes[4])));
    }

    #[test]
    fn test_render_static_parameters() {
        let cluster = MockCluster::standard();
        let topology = Topology::from_cluster(&cluster).unwrap();
        let doc = InventoryWriter::new(InventoryConfig::default())
            .render(&topology, &hostnames(&cluster))
            .unwrap();

        let vars = section(&doc, "OSEv3:vars");
        assert!(vars.contains(&"install_method=rpm"));
        assert!(vars.contains(&"ansible_ssh_user=cephuser"));
        assert!(vars.contains(&"openshift_release=v3.11"));
        assert!(vars.contains(
            &"oreg_url=registry.access.redhat.com/openshift3/ose-${component}:v3.11"
        ));
        assert!(vars.contains(&"openshift_portal_net=172.31.0.0/16"));
        let cluster_hostname = format!("openshift_master_cluster_hostname={}", host(1));
        assert!(vars.contains(&cluster_hostname.as_str()));
    }

    #[tokio::test]
    async fn test_write_hosts_to_control_node() {
        let cluster = MockCluster::standard();
        InventoryWriter::new(InventoryConfig::default())
            .write_hosts(&cluster, &hostnames(&cluster), "/usr/share/ansible/openshift-ansible/")
            .await
            .unwrap();

        let master = cluster.node("master-0").unwrap();
        let writes = master.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].path, "/usr/share/ansible/openshift-ansible/hosts");
        assert_eq!(writes[0].mode, FileMode::Write);
        assert!(writes[0].sudo);
        assert!(writes[0].contents.starts_with("[OSEv3:children]"));

        for other in ["compute-0", "compute-1", "infra-0", "infra-1"] {
            assert!(cluster.node(other).unwrap().writes().is_empty());
        }
    }

    #[tokio::test]
    async fn test_too_few_computes_writes_nothing() {
        let cluster = MockCluster::new(vec![
            MockNode::new("master-0", "10.0.0.1", Role::Master),
            MockNode::new("compute-0", "10.0.0.2", Role::Compute),
        ]);
        let err = InventoryWriter::new(InventoryConfig::default())
            .write_hosts(&cluster, &hostnames(&cluster), "/tmp")
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::Topology { .. }));
        assert!(cluster.node("master-0").unwrap().writes().is_empty());
    }

    #[test]
    fn test_unmapped_node_fails() {
        let cluster = MockCluster::standard();
        let topology = Topology::from_cluster(&cluster).unwrap();
        let err = InventoryWriter::new(InventoryConfig::default())
            .render(&topology, &HostnameMap::default())
            .unwrap_err();
        assert!(matches!(err, InstallError::MissingHostname(_)));
    }
}
