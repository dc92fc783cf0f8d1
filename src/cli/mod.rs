// file: src/cli/mod.rs
// version: 2.0.0
// guid: 7a4c1f0e-3d92-4b6b-8e27-c5f9a1d30e85

//! Command line interface for the OpenShift cluster installer

pub mod args;
pub mod commands;

pub use args::Cli;
pub use commands::*;
