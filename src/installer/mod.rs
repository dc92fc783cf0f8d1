// file: src/installer/mod.rs
// version: 2.0.0
// guid: 3f1c9e27-6b84-4d0a-a5c2-7d19e0b4f6a3

//! OpenShift installation workflow
//!
//! A run assigns resolvable hostnames, prepares every node in parallel,
//! waits for the nodes to come back from their reboot and then drives
//! openshift-ansible from the control node.

pub mod controller;
pub mod fanout;
pub mod hostnames;
pub mod inventory;
pub mod liveness;
pub mod openshift;
pub mod setup;
pub mod topology;

pub use controller::RunController;
pub use fanout::initialize_all;
pub use hostnames::{HostnameMap, HostnameMapper};
pub use inventory::{InventoryWriter, INVENTORY_FILE};
pub use liveness::LivenessChecker;
pub use openshift::ClusterInstaller;
pub use setup::NodeInitializer;
pub use topology::Topology;
