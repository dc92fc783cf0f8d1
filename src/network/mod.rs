// file: src/network/mod.rs
// version: 1.0.0
// guid: 5c95a32c-bca2-4f2b-a01a-7e37cff3225b

//! Network operations module

pub mod probe;
pub mod ssh;

pub use probe::{IcmpProbe, ReachabilityProbe, TcpProbe};
pub use ssh::{SshCluster, SshNode};
