// file: src/installer/hostnames.rs
// version: 1.0.0
// guid: 603338c9-f925-4775-8415-233ea8c6a439

//! Resolvable hostname derivation
//!
//! Instance hostnames are not resolvable inside the lab network; the DNS
//! names are derived from the IP address instead, e.g. `10.0.0.1` becomes
//! `ci-vm-10-0-0-1.hosted.upshift.rdu2.redhat.com`.

use crate::cluster::Node;
use crate::config::HostnameConfig;
use crate::error::InstallError;
use crate::Result;
use serde::Serialize;
use std::collections::btree_map::{self, BTreeMap};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Original hostname → resolvable hostname, built once per run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HostnameMap {
    entries: BTreeMap<String, String>,
}

impl HostnameMap {
    /// Resolvable hostname for `original`
    pub fn resolve(&self, original: &str) -> Result<&str> {
        self.entries
            .get(original)
            .map(String::as_str)
            .ok_or_else(|| InstallError::MissingHostname(original.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }
}

impl FromIterator<(String, String)> for HostnameMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

pub struct HostnameMapper {
    prefix: String,
    domain: String,
}

impl HostnameMapper {
    pub fn new(config: &HostnameConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            domain: config.domain.clone(),
        }
    }

    /// Hostname for a single IP address
    pub fn derive(&self, ip_address: &str) -> String {
        format!(
            "{}{}.{}",
            self.prefix,
            ip_address.split('.').collect::<Vec<_>>().join("-"),
            self.domain
        )
    }

    /// Build the map for exactly the given nodes
    pub fn generate(&self, nodes: &[Arc<dyn Node>]) -> Result<HostnameMap> {
        let mut entries = BTreeMap::new();
        let mut derived = HashSet::new();

        for node in nodes {
            let hostname = self.derive(node.ip_address());
            info!(
                "constructed hostname for node {}: {}",
                node.hostname(),
                hostname
            );

            if !derived.insert(hostname.clone()) {
                return Err(InstallError::validation(format!(
                    "Derived hostname {} for node {} collides with another node",
                    hostname,
                    node.hostname()
                )));
            }
            if entries.insert(node.hostname().to_string(), hostname).is_some() {
                return Err(InstallError::validation(format!(
                    "Node {} appears more than once in the cluster",
                    node.hostname()
                )));
            }
        }

        Ok(HostnameMap { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::mock::{MockCluster, MockNode};
    use crate::cluster::Cluster;
    use crate::config::Role;

    fn mapper() -> HostnameMapper {
        HostnameMapper::new(&HostnameConfig::default())
    }

    #[test]
    fn test_derive_replaces_dots() {
        assert_eq!(
            mapper().derive("10.1.2.3"),
            "ci-vm-10-1-2-3.hosted.upshift.rdu2.redhat.com"
        );
    }

    #[test]
    fn test_custom_template() {
        let mapper = HostnameMapper::new(&HostnameConfig {
            prefix: "ocp-".to_string(),
            domain: "lab.example.com".to_string(),
        });
        assert_eq!(mapper.derive("192.168.0.10"), "ocp-192-168-0-10.lab.example.com");
    }

    #[test]
    fn test_one_entry_per_node() {
        let cluster = MockCluster::standard();
        let map = mapper().generate(&cluster.nodes(None)).unwrap();

        assert_eq!(map.len(), 5);
        assert_eq!(
            map.resolve("infra-1").unwrap(),
            "ci-vm-10-0-0-5.hosted.upshift.rdu2.redhat.com"
        );
        assert!(matches!(
            map.resolve("not-in-cluster"),
            Err(InstallError::MissingHostname(_))
        ));
    }

    #[test]
    fn test_order_independent() {
        let cluster = MockCluster::standard();
        let mut reversed = cluster.nodes(None);
        reversed.reverse();

        let forward = mapper().generate(&cluster.nodes(None)).unwrap();
        let backward = mapper().generate(&reversed).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_only_given_nodes_are_mapped() {
        let cluster = MockCluster::standard();
        let masters = cluster.nodes(Some(Role::Master));
        let map = mapper().generate(&masters).unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.resolve("compute-0").is_err());
    }

    #[test]
    fn test_collisions_are_rejected() {
        let cluster = MockCluster::new(vec![
            MockNode::new("a", "10.0.0.1", Role::Master),
            MockNode::new("b", "10.0.0.1", Role::Compute),
        ]);
        let err = mapper().generate(&cluster.nodes(None)).unwrap_err();
        assert!(err.to_string().contains("collides"));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let map: HostnameMap = vec![("a".to_string(), "b".to_string())]
            .into_iter()
            .collect();
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"a":"b"}"#);
    }
}
