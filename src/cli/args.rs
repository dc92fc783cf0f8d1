// file: src/cli/args.rs
// version: 2.0.0
// guid: 2e8d5b71-4f06-4c3a-9d18-b6a0e7f4c259

//! Command line argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "openshift-cluster-installer")]
#[command(about = "Prepare RHEL nodes and install OpenShift on them over SSH")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write the log to a timestamped file in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full installation against the configured nodes
    Install {
        #[arg(short, long, env = "OPENSHIFT_INSTALLER_CONFIG")]
        config: PathBuf,
    },

    /// Show the hostname each node will be given
    Hostnames {
        #[arg(short, long, env = "OPENSHIFT_INSTALLER_CONFIG")]
        config: PathBuf,

        #[arg(short, long)]
        json: bool,
    },

    /// Print the openshift-ansible inventory for the configured nodes
    Inventory {
        #[arg(short, long, env = "OPENSHIFT_INSTALLER_CONFIG")]
        config: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "openshift-cluster-installer",
            "hostnames",
            "--config",
            "cluster.yaml",
            "--json",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Hostnames { config, json } => {
                assert_eq!(config, PathBuf::from("cluster.yaml"));
                assert!(json);
            }
            _ => panic!("expected hostnames subcommand"),
        }
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        let result = Cli::try_parse_from([
            "openshift-cluster-installer",
            "-v",
            "-q",
            "inventory",
            "--config",
            "cluster.yaml",
        ]);
        assert!(result.is_err());
    }
}
