//! Waitlist entries and promotion.
//!
//! When a slot is vacated on a session with auto-promotion enabled, the next
//! active entrant (by position) receives a time-boxed offer. Lifecycle:
//! `active -> offered -> accepted`, or `offered -> expired` after the payment
//! window lapses, at which point the next entrant is promoted. Every
//! transition is a per-row conditional update, so re-running a sweep or
//! racing two promoters cannot double-apply a transition.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Lifecycle state of a waitlist entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitlistStatus {
    /// Waiting for a slot.
    Active,
    /// Holds a time-boxed offer for a vacated slot.
    Offered,
    /// Claimed the slot.
    Accepted,
    /// The offer lapsed unclaimed.
    Expired,
}

impl WaitlistStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Offered => "offered",
            Self::Accepted => "accepted",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for WaitlistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One waitlist row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub id: String,
    pub session_id: String,
    pub player_id: String,
    /// Queue position; lower is promoted first.
    pub position: u32,
    pub status: WaitlistStatus,
    /// Offer expiry; set while `status == Offered`.
    pub offer_expires_at: Option<DateTime<Utc>>,
}

impl WaitlistEntry {
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        player_id: impl Into<String>,
        position: u32,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            player_id: player_id.into(),
            position,
            status: WaitlistStatus::Active,
            offer_expires_at: None,
        }
    }
}

/// Storage for waitlist rows.
///
/// The transition methods are conditional updates: they return `false`
/// (without writing) when the row is not in the required state, mirroring a
/// `WHERE status = ... AND offer_expires_at < now()` guard.
#[async_trait]
pub trait WaitlistStore: Send + Sync {
    async fn add_entry(&self, entry: &WaitlistEntry) -> Result<()>;

    async fn get_entry(&self, entry_id: &str) -> Result<Option<WaitlistEntry>>;

    /// All entries for a session, ordered by position.
    async fn entries_for_session(&self, session_id: &str) -> Result<Vec<WaitlistEntry>>;

    /// Active entries for a session, ordered by position.
    async fn active_entries(&self, session_id: &str) -> Result<Vec<WaitlistEntry>>;

    /// Offered entries whose expiry is at or before `now`.
    async fn expired_offers(&self, now: DateTime<Utc>) -> Result<Vec<WaitlistEntry>>;

    /// `Active -> Offered` with the given expiry. Returns `false` if the
    /// entry is not currently active.
    async fn offer(&self, entry_id: &str, expires_at: DateTime<Utc>) -> Result<bool>;

    /// `Offered -> Accepted`, only while the offer is unexpired at `now`.
    async fn accept(&self, entry_id: &str, now: DateTime<Utc>) -> Result<bool>;

    /// `Offered -> Expired`, only once the expiry has passed at `now`.
    async fn expire(&self, entry_id: &str, now: DateTime<Utc>) -> Result<bool>;
}

/// Promotion and acceptance over a [`WaitlistStore`].
pub struct WaitlistService<W: WaitlistStore> {
    store: W,
}

impl<W: WaitlistStore> WaitlistService<W> {
    #[must_use]
    pub fn new(store: W) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> &W {
        &self.store
    }

    /// Hand a vacated slot to the next active entrant.
    ///
    /// Walks active entries in position order until a conditional offer
    /// succeeds; a concurrently-promoted entry is simply skipped. Returns
    /// the offered entry, or `None` if the waitlist has no active entrants.
    pub async fn promote_next(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
        payment_window_minutes: u32,
    ) -> Result<Option<WaitlistEntry>> {
        let expires_at = now + Duration::minutes(i64::from(payment_window_minutes));

        for entry in self.store.active_entries(session_id).await? {
            if self.store.offer(&entry.id, expires_at).await? {
                tracing::info!(
                    target: "pitchside::waitlist",
                    session_id = %session_id,
                    entry_id = %entry.id,
                    player_id = %entry.player_id,
                    expires_at = %expires_at,
                    "Waitlist offer extended"
                );
                return self.store.get_entry(&entry.id).await;
            }
        }
        Ok(None)
    }

    /// Accept an outstanding offer. Fails closed: an expired or never-offered
    /// entry returns `false`.
    pub async fn accept_offer(&self, entry_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let accepted = self.store.accept(entry_id, now).await?;
        if accepted {
            tracing::info!(
                target: "pitchside::waitlist",
                entry_id = %entry_id,
                "Waitlist offer accepted"
            );
        }
        Ok(accepted)
    }
}

/// In-memory waitlist store for testing.
#[derive(Default, Clone)]
pub struct InMemoryWaitlistStore {
    inner: std::sync::Arc<std::sync::RwLock<Vec<WaitlistEntry>>>,
}

impl InMemoryWaitlistStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WaitlistStore for InMemoryWaitlistStore {
    async fn add_entry(&self, entry: &WaitlistEntry) -> Result<()> {
        self.inner.write().unwrap().push(entry.clone());
        Ok(())
    }

    async fn get_entry(&self, entry_id: &str) -> Result<Option<WaitlistEntry>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .iter()
            .find(|e| e.id == entry_id)
            .cloned())
    }

    async fn entries_for_session(&self, session_id: &str) -> Result<Vec<WaitlistEntry>> {
        let mut entries: Vec<WaitlistEntry> = self
            .inner
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.session_id == session_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.position);
        Ok(entries)
    }

    async fn active_entries(&self, session_id: &str) -> Result<Vec<WaitlistEntry>> {
        let mut entries: Vec<WaitlistEntry> = self
            .inner
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.session_id == session_id && e.status == WaitlistStatus::Active)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.position);
        Ok(entries)
    }

    async fn expired_offers(&self, now: DateTime<Utc>) -> Result<Vec<WaitlistEntry>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .iter()
            .filter(|e| {
                e.status == WaitlistStatus::Offered
                    && e.offer_expires_at.is_some_and(|exp| exp <= now)
            })
            .cloned()
            .collect())
    }

    async fn offer(&self, entry_id: &str, expires_at: DateTime<Utc>) -> Result<bool> {
        let mut entries = self.inner.write().unwrap();
        if let Some(entry) = entries.iter_mut().find(|e| e.id == entry_id) {
            if entry.status == WaitlistStatus::Active {
                entry.status = WaitlistStatus::Offered;
                entry.offer_expires_at = Some(expires_at);
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn accept(&self, entry_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let mut entries = self.inner.write().unwrap();
        if let Some(entry) = entries.iter_mut().find(|e| e.id == entry_id) {
            if entry.status == WaitlistStatus::Offered
                && entry.offer_expires_at.is_some_and(|exp| exp > now)
            {
                entry.status = WaitlistStatus::Accepted;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn expire(&self, entry_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let mut entries = self.inner.write().unwrap();
        if let Some(entry) = entries.iter_mut().find(|e| e.id == entry_id) {
            if entry.status == WaitlistStatus::Offered
                && entry.offer_expires_at.is_some_and(|exp| exp <= now)
            {
                entry.status = WaitlistStatus::Expired;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, min: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
            .and_utc()
    }

    async fn seeded_service() -> (WaitlistService<InMemoryWaitlistStore>, Vec<String>) {
        let store = InMemoryWaitlistStore::new();
        let mut ids = Vec::new();
        for (player, position) in [("p_c", 3), ("p_a", 1), ("p_b", 2)] {
            let entry = WaitlistEntry::new("session_1", player, position);
            ids.push(entry.id.clone());
            store.add_entry(&entry).await.unwrap();
        }
        (WaitlistService::new(store), ids)
    }

    #[tokio::test]
    async fn test_promote_next_picks_lowest_position() {
        let (service, _) = seeded_service().await;

        let offered = service
            .promote_next("session_1", at(12, 0), 30)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(offered.player_id, "p_a");
        assert_eq!(offered.status, WaitlistStatus::Offered);
        assert_eq!(offered.offer_expires_at, Some(at(12, 30)));
    }

    #[tokio::test]
    async fn test_promote_skips_non_active() {
        let (service, _) = seeded_service().await;

        service.promote_next("session_1", at(12, 0), 30).await.unwrap();
        let second = service
            .promote_next("session_1", at(12, 5), 30)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.player_id, "p_b");
    }

    #[tokio::test]
    async fn test_promote_empty_waitlist() {
        let service = WaitlistService::new(InMemoryWaitlistStore::new());
        let offered = service.promote_next("session_1", at(12, 0), 30).await.unwrap();
        assert!(offered.is_none());
    }

    #[tokio::test]
    async fn test_accept_within_window() {
        let (service, _) = seeded_service().await;
        let offered = service
            .promote_next("session_1", at(12, 0), 30)
            .await
            .unwrap()
            .unwrap();

        assert!(service.accept_offer(&offered.id, at(12, 29)).await.unwrap());
        let entry = service.store().get_entry(&offered.id).await.unwrap().unwrap();
        assert_eq!(entry.status, WaitlistStatus::Accepted);
    }

    #[tokio::test]
    async fn test_accept_after_expiry_fails_closed() {
        let (service, _) = seeded_service().await;
        let offered = service
            .promote_next("session_1", at(12, 0), 30)
            .await
            .unwrap()
            .unwrap();

        assert!(!service.accept_offer(&offered.id, at(12, 30)).await.unwrap());
    }

    #[tokio::test]
    async fn test_accept_never_offered_fails_closed() {
        let (service, ids) = seeded_service().await;
        // ids[0] is p_c at position 3, still active.
        assert!(!service.accept_offer(&ids[0], at(12, 0)).await.unwrap());
    }

    #[tokio::test]
    async fn test_conditional_expire() {
        let (service, _) = seeded_service().await;
        let offered = service
            .promote_next("session_1", at(12, 0), 30)
            .await
            .unwrap()
            .unwrap();

        // Not yet expired.
        assert!(!service.store().expire(&offered.id, at(12, 29)).await.unwrap());
        // Expired, transitions once.
        assert!(service.store().expire(&offered.id, at(12, 30)).await.unwrap());
        // Second run is a no-op.
        assert!(!service.store().expire(&offered.id, at(12, 31)).await.unwrap());
    }
}
