// file: src/logging/logger.rs
// version: 2.0.0
// guid: 6d2f8a13-b47e-4c09-8e1a-f5c3097b2d48

//! Logger initialization and configuration

use crate::error::InstallError;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::future::Future;
use tracing::instrument::Instrumented;
use tracing::Instrument;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system
///
/// Output goes to stderr, leaving stdout to command output. When `log_dir`
/// is given, a copy of the log is also written to a timestamped file in it,
/// whose path is returned.
pub fn init_logger(verbose: bool, quiet: bool, log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let filter = filter_for(verbose, quiet);

    let (file_layer, log_path) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let path = dir.join(log_file_name());
            let file = fs::File::create(&path)?;
            let layer = fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .with(file_layer)
        .try_init()
        .map_err(|e| InstallError::config(format!("Failed to initialize logger: {}", e)))?;

    Ok(log_path)
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

fn log_file_name() -> String {
    format!(
        "openshift-install-{}.log",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    )
}

/// Attach an `operation` span naming `subject` to the future built by `f`
///
/// The returned future owns its span, so it can be handed to `tokio::spawn`.
pub fn with_async_operation_span<F, Fut>(
    operation: &str,
    subject: &str,
    f: F,
) -> Instrumented<Fut>
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    let span = tracing::info_span!("operation", name = operation, subject = subject);
    f().instrument(span)
}
