//! Guardian links between adult users and players.
//!
//! A link carries per-capability permissions and is deactivated, never
//! deleted, when the player reaches the tenant's adult age — the row remains
//! as an audit trail.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Lifecycle of a guardian relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    Active,
    /// The player crossed the adult-age threshold.
    AgedOut,
}

impl RelationshipStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::AgedOut => "aged_out",
        }
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Link from a guardian (adult user) to a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianLink {
    pub id: String,
    pub guardian_id: String,
    pub player_id: String,
    /// The guardian may book on the player's behalf.
    pub permission_book: bool,
    /// The guardian may pay on the player's behalf.
    pub permission_pay: bool,
    pub active: bool,
    pub relationship_status: RelationshipStatus,
}

impl GuardianLink {
    /// Create an active link with both permissions granted.
    #[must_use]
    pub fn new(guardian_id: impl Into<String>, player_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            guardian_id: guardian_id.into(),
            player_id: player_id.into(),
            permission_book: true,
            permission_pay: true,
            active: true,
            relationship_status: RelationshipStatus::Active,
        }
    }
}

/// Storage for guardian links.
#[async_trait]
pub trait GuardianStore: Send + Sync {
    async fn create_link(&self, link: &GuardianLink) -> Result<()>;

    /// All links for a player, active or not.
    async fn links_for_player(&self, player_id: &str) -> Result<Vec<GuardianLink>>;

    /// Deactivate every active link for a player, marking it aged-out.
    /// Returns the number of links transitioned. Idempotent: already
    /// aged-out links are untouched.
    async fn age_out_links(&self, player_id: &str) -> Result<usize>;
}

/// In-memory guardian store for testing.
#[derive(Default, Clone)]
pub struct InMemoryGuardianStore {
    inner: std::sync::Arc<std::sync::RwLock<Vec<GuardianLink>>>,
}

impl InMemoryGuardianStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GuardianStore for InMemoryGuardianStore {
    async fn create_link(&self, link: &GuardianLink) -> Result<()> {
        self.inner.write().unwrap().push(link.clone());
        Ok(())
    }

    async fn links_for_player(&self, player_id: &str) -> Result<Vec<GuardianLink>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .iter()
            .filter(|l| l.player_id == player_id)
            .cloned()
            .collect())
    }

    async fn age_out_links(&self, player_id: &str) -> Result<usize> {
        let mut links = self.inner.write().unwrap();
        let mut transitioned = 0;
        for link in links.iter_mut() {
            if link.player_id == player_id && link.active {
                link.active = false;
                link.relationship_status = RelationshipStatus::AgedOut;
                transitioned += 1;
            }
        }
        Ok(transitioned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_age_out_deactivates_without_deleting() {
        let store = InMemoryGuardianStore::new();
        store
            .create_link(&GuardianLink::new("parent_1", "player_1"))
            .await
            .unwrap();
        store
            .create_link(&GuardianLink::new("parent_2", "player_1"))
            .await
            .unwrap();

        let transitioned = store.age_out_links("player_1").await.unwrap();
        assert_eq!(transitioned, 2);

        // Rows survive, just deactivated.
        let links = store.links_for_player("player_1").await.unwrap();
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| !l.active));
        assert!(links
            .iter()
            .all(|l| l.relationship_status == RelationshipStatus::AgedOut));
    }

    #[tokio::test]
    async fn test_age_out_is_idempotent() {
        let store = InMemoryGuardianStore::new();
        store
            .create_link(&GuardianLink::new("parent_1", "player_1"))
            .await
            .unwrap();

        assert_eq!(store.age_out_links("player_1").await.unwrap(), 1);
        assert_eq!(store.age_out_links("player_1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_age_out_scoped_to_player() {
        let store = InMemoryGuardianStore::new();
        store
            .create_link(&GuardianLink::new("parent_1", "player_1"))
            .await
            .unwrap();
        store
            .create_link(&GuardianLink::new("parent_1", "player_2"))
            .await
            .unwrap();

        store.age_out_links("player_1").await.unwrap();

        let other = store.links_for_player("player_2").await.unwrap();
        assert!(other[0].active);
    }
}
