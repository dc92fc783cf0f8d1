// file: src/main.rs
// version: 2.0.0
// guid: 4c7f0a9e-8d25-4e31-b6f3-1a9e5d2c7b08

//! OpenShift Cluster Installer - Main entry point

use clap::Parser;
use openshift_cluster_installer::{
    cli::{
        args::{Cli, Commands},
        commands::*,
    },
    logging::logger,
};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match logger::init_logger(cli.verbose, cli.quiet, cli.log_dir.as_deref()) {
        Ok(Some(path)) => info!("Logging to {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    let shutdown_signal = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let command_future = async {
        match cli.command {
            Commands::Install { config } => install_command(&config).await,
            Commands::Hostnames { config, json } => {
                hostnames_command(&config, json).map(|_| 0)
            }
            Commands::Inventory { config } => inventory_command(&config).map(|_| 0),
        }
    };

    let code = tokio::select! {
        result = command_future => match result {
            Ok(code) => code,
            Err(e) => {
                error!("{}", e);
                1
            }
        },
        _ = shutdown_signal => {
            warn!("Installation interrupted by user");
            1
        }
    };

    std::process::exit(code);
}
