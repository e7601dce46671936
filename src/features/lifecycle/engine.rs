//! The lifecycle engine: one call to [`LifecycleEngine::process`] is one
//! complete reconciliation pass over the stored entry set.
//!
//! The pass is strictly sequential: fetch, classify, dispatch, mark,
//! prune, sort, write back. No entry is mutated outside the marking step
//! and the store only ever sees one atomic full replacement at the end.
//! There are no internal retries; re-running on the next schedule tick is
//! the retry mechanism, which is safe because processed entries are never
//! redispatched.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::watch;

use super::retention::apply_retention;
use crate::core::error::EngineError;
use crate::features::entries::EntryStore;
use crate::features::notify::Notifier;

/// Injected current-time source, never ambient wall-clock state.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// External cancellation signal for a run.
///
/// Raised before dispatch starts, it aborts the run with no store
/// mutation. Raised during dispatch, the dispatch is abandoned and
/// treated as zero confirmed deliveries.
#[derive(Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn channel() -> (watch::Sender<bool>, Shutdown) {
        let (tx, rx) = watch::channel(false);
        (tx, Shutdown { rx })
    }

    pub fn is_raised(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal is raised. Never resolves if the sender
    /// is dropped without raising it.
    pub async fn raised(&mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Counters from one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub total: usize,
    pub already_processed: usize,
    pub not_yet_due: usize,
    pub dispatched: usize,
    pub delivered: usize,
    pub failed: usize,
    pub pruned: usize,
}

pub struct LifecycleEngine {
    store: Arc<dyn EntryStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    zone: Tz,
    retention: Duration,
}

impl LifecycleEngine {
    pub fn new(
        store: Arc<dyn EntryStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        zone: Tz,
        retention: Duration,
    ) -> Self {
        LifecycleEngine {
            store,
            notifier,
            clock,
            zone,
            retention,
        }
    }

    /// Run one full reconciliation pass.
    ///
    /// Partial delivery failures are not errors; the affected entries
    /// simply stay eligible for the next run. Only a failed store read,
    /// a failed write-back, or pre-dispatch cancellation fail the run.
    pub async fn process(&self, shutdown: &mut Shutdown) -> Result<RunReport, EngineError> {
        let mut entries = self
            .store
            .get_entries()
            .await
            .map_err(EngineError::StoreRead)?;
        let now = self.clock.now_utc();

        let mut report = RunReport {
            total: entries.len(),
            ..RunReport::default()
        };
        info!("total entries seen: {}", report.total);

        let mut eligible = Vec::new();
        for entry in &entries {
            if entry.is_processed() {
                report.already_processed += 1;
            } else if !entry.is_eligible(now) {
                report.not_yet_due += 1;
            } else {
                eligible.push(entry.payload.clone());
            }
        }
        report.dispatched = eligible.len();
        info!(
            "entries needing dispatch: {} (already processed: {}, not yet due: {})",
            report.dispatched, report.already_processed, report.not_yet_due
        );

        if shutdown.is_raised() {
            return Err(EngineError::Cancelled);
        }

        if eligible.is_empty() {
            info!("no entries to dispatch at this time");
        } else {
            let delivered = tokio::select! {
                result = self.notifier.dispatch(&eligible) => match result {
                    Ok(delivered) => delivered,
                    Err(err) => {
                        warn!("dispatch failed as a whole, treating batch as undelivered: {err}");
                        Vec::new()
                    }
                },
                _ = shutdown.raised() => {
                    warn!("shutdown raised during dispatch, treating batch as undelivered");
                    Vec::new()
                }
            };
            report.delivered = delivered.len();
            report.failed = report.dispatched.saturating_sub(report.delivered);
            info!(
                "dispatch complete: {} delivered, {} failed",
                report.delivered, report.failed
            );

            // stamp in the configured zone, at most one entry per delivery
            let stamp = now.with_timezone(&self.zone);
            for payload in &delivered {
                let unset_match = entries
                    .iter_mut()
                    .find(|entry| entry.processed_at.is_none() && entry.payload == *payload);
                match unset_match {
                    Some(entry) => entry.processed_at = Some(stamp),
                    None => debug!(
                        "delivered payload matches no unprocessed entry \
                         (duplicate payloads?): {payload:?}"
                    ),
                }
            }
        }

        let before = entries.len();
        let mut entries = apply_retention(entries, now, self.retention);
        report.pruned = before - entries.len();

        // stable, so equal due times keep their stored order
        entries.sort_by(|a, b| a.due_at.cmp(&b.due_at));

        self.store
            .replace_all(&entries)
            .await
            .map_err(EngineError::StoreWrite)?;
        Ok(report)
    }
}
