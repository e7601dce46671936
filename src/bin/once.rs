use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use std::time::Instant;

use remindbot::app::{build_engine, init_logging};
use remindbot::core::Config;
use remindbot::features::lifecycle::Shutdown;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref())?;

    init_logging(&config);

    let (engine, _notifier) = build_engine(&config)?;

    // Raise the shutdown flag on SIGINT/SIGTERM so an in-flight run
    // stops dispatching and the store is left consistent.
    let (shutdown_tx, mut shutdown) = Shutdown::channel();
    tokio::spawn(async move {
        wait_for_signal().await;
        warn!("Shutdown signal received, cancelling run");
        let _ = shutdown_tx.send(true);
    });

    info!("Starting single reminder pass...");
    let start = Instant::now();

    match engine.process(&mut shutdown).await {
        Ok(report) => {
            info!(
                "Pass finished in {:?}: {} entries, {} dispatched, {} delivered, {} pruned",
                start.elapsed(),
                report.total,
                report.dispatched,
                report.delivered,
                report.pruned
            );
            Ok(())
        }
        Err(e) if e.is_cancelled() => {
            info!("Run cancelled before any changes were written");
            Ok(())
        }
        Err(e) => {
            error!("Reminder pass failed: {e}");
            Err(e.into())
        }
    }
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
