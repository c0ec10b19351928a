//! Periodic waitlist-offer expiry sweep.
//!
//! Polls for offers whose payment window has lapsed, expires each via a
//! conditional per-row transition, and promotes the next entrant. Because
//! every transition re-checks state, the sweep is idempotent and safe to run
//! concurrently with itself or with manual promotions.

use chrono::{DateTime, Utc};

use crate::error::Result;
use super::waitlist::{WaitlistService, WaitlistStore};

/// Counters from one expiry sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferSweepReport {
    /// Offers transitioned to expired.
    pub expired: usize,
    /// Follow-up offers extended to the next entrant.
    pub promoted: usize,
}

/// The offer expiry sweep.
pub struct OfferSweep<W: WaitlistStore> {
    service: WaitlistService<W>,
    payment_window_minutes: u32,
}

impl<W: WaitlistStore> OfferSweep<W> {
    #[must_use]
    pub fn new(service: WaitlistService<W>, payment_window_minutes: u32) -> Self {
        Self {
            service,
            payment_window_minutes,
        }
    }

    /// Run one sweep iteration at `now`.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<OfferSweepReport> {
        let mut report = OfferSweepReport::default();

        for entry in self.service.store().expired_offers(now).await? {
            // Conditional: a concurrently accepted or already-expired offer
            // is skipped without a write.
            if !self.service.store().expire(&entry.id, now).await? {
                continue;
            }
            report.expired += 1;
            tracing::info!(
                target: "pitchside::waitlist",
                entry_id = %entry.id,
                session_id = %entry.session_id,
                "Waitlist offer expired"
            );

            if self
                .service
                .promote_next(&entry.session_id, now, self.payment_window_minutes)
                .await?
                .is_some()
            {
                report.promoted += 1;
            }
        }

        tracing::info!(
            target: "pitchside::waitlist",
            expired = report.expired,
            promoted = report.promoted,
            "Offer sweep complete"
        );
        Ok(report)
    }
}
