use std::process;

use anyhow::Context;
use tracing::info;

use pnum::{SearchConfig, Supervisor, logging};

#[tokio::main]
async fn main() {
    logging::init_tracing();

    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        process::exit(-1);
    }
}

async fn run() -> anyhow::Result<()> {
    let supervisor = Supervisor::new(SearchConfig::default());

    let shutdown = supervisor.shutdown_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.cancel();
    });

    let report = supervisor
        .run()
        .await
        .context("perfect number search aborted")?;

    info!(
        assigned = report.assigned,
        discoveries = report.discoveries.len(),
        "Search stopped"
    );
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
///
/// # Panics
///
/// Panics if signal handlers cannot be installed, which only happens when the
/// tokio runtime is misconfigured.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
