//! Periodic sweep runner.
//!
//! The birthday transition and waitlist-offer expiry sweeps are timer-driven
//! polls, not queued work. Each runs on its own interval in a background
//! task until shutdown is requested. Single-instance deployment is assumed;
//! the sweeps themselves stay safe to re-run because their writes are gated
//! by per-row conditions.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::booking::{OfferSweep, WaitlistStore};
use crate::error::Result;
use crate::policy::{BirthdaySweep, GuardianStore, PolicyStore, SubjectStore};

/// A periodic sweep the runner can drive.
#[async_trait]
pub trait Sweep: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run one iteration; returns a human-readable summary for the log.
    async fn tick(&self) -> Result<String>;
}

#[async_trait]
impl<S, P, G> Sweep for BirthdaySweep<S, P, G>
where
    S: SubjectStore,
    P: PolicyStore,
    G: GuardianStore,
{
    fn name(&self) -> &'static str {
        "birthday"
    }

    async fn tick(&self) -> Result<String> {
        let report = self.run(Utc::now().date_naive()).await?;
        Ok(format!(
            "scanned={} birthdays={} grants={} aged_out={}",
            report.scanned, report.birthdays, report.grants, report.aged_out
        ))
    }
}

#[async_trait]
impl<W: WaitlistStore> Sweep for OfferSweep<W> {
    fn name(&self) -> &'static str {
        "waitlist_offers"
    }

    async fn tick(&self) -> Result<String> {
        let report = self.run(Utc::now()).await?;
        Ok(format!(
            "expired={} promoted={}",
            report.expired, report.promoted
        ))
    }
}

/// Runs sweeps on intervals until shutdown.
#[derive(Default)]
pub struct SweepRunner {
    handles: Vec<tokio::task::JoinHandle<()>>,
    shutdown_txs: Vec<mpsc::Sender<()>>,
}

impl SweepRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a sweep on its own interval.
    ///
    /// The first tick fires after one full `period`, not immediately, so a
    /// restart loop cannot hammer the store.
    pub fn spawn(&mut self, sweep: Arc<dyn Sweep>, period: Duration) {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            tracing::info!(
                target: "pitchside::jobs",
                sweep = %sweep.name(),
                period_secs = period.as_secs(),
                "Sweep started"
            );

            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // interval() fires immediately; consume the first tick.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::info!(
                            target: "pitchside::jobs",
                            sweep = %sweep.name(),
                            "Shutdown signal received"
                        );
                        break;
                    }
                    _ = ticker.tick() => {
                        match sweep.tick().await {
                            Ok(summary) => {
                                tracing::info!(
                                    target: "pitchside::jobs",
                                    sweep = %sweep.name(),
                                    %summary,
                                    "Sweep iteration complete"
                                );
                            }
                            Err(e) => {
                                tracing::error!(
                                    target: "pitchside::jobs",
                                    sweep = %sweep.name(),
                                    error = %e,
                                    "Sweep iteration failed"
                                );
                            }
                        }
                    }
                }
            }

            tracing::info!(
                target: "pitchside::jobs",
                sweep = %sweep.name(),
                "Sweep stopped"
            );
        });

        self.handles.push(handle);
        self.shutdown_txs.push(shutdown_tx);
    }

    /// Shut down all sweeps gracefully, waiting for in-flight iterations.
    pub async fn shutdown(self) {
        for shutdown_tx in self.shutdown_txs {
            let _ = shutdown_tx.send(()).await;
        }
        for handle in self.handles {
            let _ = handle.await;
        }
        tracing::info!(target: "pitchside::jobs", "All sweeps shut down");
    }
}
