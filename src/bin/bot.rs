use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use std::time::Instant;
use tokio::time::MissedTickBehavior;

use remindbot::app::{build_engine, init_logging, PROBE_TIMEOUT};
use remindbot::core::Config;
use remindbot::features::lifecycle::Shutdown;
use remindbot::features::notify::Notifier;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref())?;

    init_logging(&config);

    info!("Starting reminder bot...");

    let (engine, notifier) = build_engine(&config)?;

    // Make sure the mail relay answers before scheduling any runs
    match tokio::time::timeout(PROBE_TIMEOUT, notifier.probe()).await {
        Ok(Ok(())) => info!("Mail relay at {} is reachable", config.mail.service_url),
        Ok(Err(e)) => {
            error!("Mail relay health check failed: {e}");
            return Err(e.into());
        }
        Err(_) => {
            error!(
                "Mail relay at {} did not answer within {PROBE_TIMEOUT:?}",
                config.mail.service_url
            );
            return Err(anyhow::anyhow!("mail relay health check timed out"));
        }
    }

    let (shutdown_tx, mut shutdown) = Shutdown::channel();
    tokio::spawn(async move {
        wait_for_signal().await;
        warn!("Shutdown signal received, finishing up");
        let _ = shutdown_tx.send(true);
    });

    let mut interval = tokio::time::interval(config.interval()?);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(
        "Scheduling a reminder pass every {} (run on startup: {})",
        config.schedule.interval, config.schedule.run_on_startup
    );

    // The first tick completes immediately; swallow it when the
    // startup run is disabled.
    if !config.schedule.run_on_startup {
        interval.tick().await;
    }

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.raised() => break,
        }

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
            }
            Err(e) if e.is_cancelled() => break,
            Err(e) => {
                // A failed pass leaves the store untouched; try again
                // on the next tick.
                error!("Reminder pass failed: {e}");
            }
        }

        if shutdown.is_raised() {
            break;
        }
    }

    info!("Reminder bot stopped");
    Ok(())
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
