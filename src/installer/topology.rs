// file: src/installer/topology.rs
// version: 1.0.0
// guid: 1dbd4ca7-887e-4d24-90d2-52bb8a1bb929

//! Role classification of cluster nodes

use crate::cluster::{Cluster, Node};
use crate::config::Role;
use crate::error::InstallError;
use crate::Result;
use std::sync::Arc;
use tracing::warn;

pub const REQUIRED_MASTERS: usize = 1;
pub const REQUIRED_COMPUTES: usize = 2;
pub const REQUIRED_INFRAS: usize = 2;

/// Nodes grouped by role; the first master is the control node
pub struct Topology {
    masters: Vec<Arc<dyn Node>>,
    computes: Vec<Arc<dyn Node>>,
    infras: Vec<Arc<dyn Node>>,
}

impl Topology {
    /// Classify the cluster's nodes, requiring 1 master, 2 computes and 2 infras
    pub fn from_cluster(cluster: &dyn Cluster) -> Result<Self> {
        let topology = Self {
            masters: cluster.nodes(Some(Role::Master)),
            computes: cluster.nodes(Some(Role::Compute)),
            infras: cluster.nodes(Some(Role::Infra)),
        };
        topology.validate()?;
        Ok(topology)
    }

    fn validate(&self) -> Result<()> {
        let groups = [
            (Role::Master, &self.masters, REQUIRED_MASTERS),
            (Role::Compute, &self.computes, REQUIRED_COMPUTES),
            (Role::Infra, &self.infras, REQUIRED_INFRAS),
        ];

        for (role, nodes, required) in groups {
            if nodes.len() < required {
                return Err(InstallError::Topology {
                    role: role.to_string(),
                    required,
                    found: nodes.len(),
                });
            }
            if nodes.len() > required {
                warn!(
                    "{} {} node(s) configured, only the first {} are placed in the inventory",
                    nodes.len(),
                    role,
                    required
                );
            }
        }

        Ok(())
    }

    /// The node that hosts the inventory and runs the playbooks
    pub fn control_node(&self) -> &Arc<dyn Node> {
        &self.masters[0]
    }

    /// Nodes placed in the inventory, in `[nodes]` order
    pub fn inventory_nodes(&self) -> Vec<&Arc<dyn Node>> {
        self.masters
            .iter()
            .take(REQUIRED_MASTERS)
            .chain(self.computes.iter().take(REQUIRED_COMPUTES))
            .chain(self.infras.iter().take(REQUIRED_INFRAS))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::mock::{MockCluster, MockNode};

    #[test]
    fn test_standard_topology() {
        let cluster = MockCluster::standard();
        let topology = Topology::from_cluster(&cluster).unwrap();

        assert_eq!(topology.control_node().hostname(), "master-0");
        let names: Vec<&str> = topology
            .inventory_nodes()
            .into_iter()
            .map(|n| n.hostname())
            .collect();
        assert_eq!(
            names,
            vec!["master-0", "compute-0", "compute-1", "infra-0", "infra-1"]
        );
    }

    #[test]
    fn test_too_few_computes() {
        let cluster = MockCluster::new(vec![
            MockNode::new("m", "10.0.0.1", Role::Master),
            MockNode::new("c", "10.0.0.2", Role::Compute),
            MockNode::new("i0", "10.0.0.3", Role::Infra),
            MockNode::new("i1", "10.0.0.4", Role::Infra),
        ]);
        let err = Topology::from_cluster(&cluster).err().unwrap();
        assert!(matches!(
            err,
            InstallError::Topology { ref role, required: 2, found: 1 } if role == "compute"
        ));
    }

    #[test]
    fn test_no_master() {
        let cluster = MockCluster::new(vec![MockNode::new("c", "10.0.0.2", Role::Compute)]);
        let err = Topology::from_cluster(&cluster).err().unwrap();
        assert!(err.to_string().contains("master"));
    }

    #[test]
    fn test_extra_nodes_are_left_out() {
        let cluster = MockCluster::new(vec![
            MockNode::new("m0", "10.0.0.1", Role::Master),
            MockNode::new("m1", "10.0.0.2", Role::Master),
            MockNode::new("c0", "10.0.0.3", Role::Compute),
            MockNode::new("c1", "10.0.0.4", Role::Compute),
            MockNode::new("c2", "10.0.0.5", Role::Compute),
            MockNode::new("i0", "10.0.0.6", Role::Infra),
            MockNode::new("i1", "10.0.0.7", Role::Infra),
        ]);
        let topology = Topology::from_cluster(&cluster).unwrap();
        let names: Vec<&str> = topology
            .inventory_nodes()
            .into_iter()
            .map(|n| n.hostname())
            .collect();
        assert_eq!(names, vec!["m0", "c0", "c1", "i0", "i1"]);
    }
}
