// file: src/lib.rs
// version: 2.0.0
// guid: c4b1e8d2-2f7a-4a6e-9b03-5d8e1f6a7c90

//! # OpenShift Cluster Installer
//!
//! Prepares a set of RHEL machines (subscription, packages, hostnames,
//! container runtime, OS update) and installs OpenShift on them with
//! openshift-ansible, driven over SSH from a single controller process.

pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod installer;
pub mod logging;
pub mod network;

pub use error::{InstallError, Result};

/// Version information for the installer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
