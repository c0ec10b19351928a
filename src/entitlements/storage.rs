//! Storage traits for plan-feature rows and the feature audit log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PitchsideError, Result};
use super::audit::FeatureAuditEntry;
use super::features::FeatureValue;

/// A persisted plan-feature row.
///
/// Exactly one row exists per (plan, feature) pair; a missing row means the
/// feature is absent for that plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPlanFeature {
    pub plan_code: String,
    pub feature_key: String,
    pub value: FeatureValue,
    pub updated_at: DateTime<Utc>,
}

/// Storage for tenant-customizable plan-feature overrides.
#[async_trait]
pub trait PlanFeatureStore: Send + Sync {
    /// Get the row for a (plan, feature) pair.
    async fn get(&self, plan_code: &str, feature_key: &str) -> Result<Option<StoredPlanFeature>>;

    /// All rows for a plan.
    async fn list_for_plan(&self, plan_code: &str) -> Result<Vec<StoredPlanFeature>>;

    /// Insert or replace the row for a (plan, feature) pair.
    async fn upsert(&self, plan_code: &str, feature_key: &str, value: &FeatureValue) -> Result<()>;
}

/// Append-only storage for the feature audit log.
///
/// Entries are never mutated or deleted by this crate; retention is governed
/// externally.
#[async_trait]
pub trait FeatureAuditStore: Send + Sync {
    async fn append(&self, entry: &FeatureAuditEntry) -> Result<()>;

    /// All entries, oldest first.
    async fn list(&self) -> Result<Vec<FeatureAuditEntry>>;
}

#[derive(Default)]
struct InMemoryPlanFeatureInner {
    rows: std::sync::RwLock<std::collections::HashMap<(String, String), StoredPlanFeature>>,
    writes: std::sync::atomic::AtomicUsize,
    fail_after: Option<usize>,
}

/// In-memory plan-feature store for testing.
///
/// Supports write-failure injection so bulk-operation behavior under partial
/// failure can be exercised.
#[derive(Default, Clone)]
pub struct InMemoryPlanFeatureStore {
    inner: std::sync::Arc<InMemoryPlanFeatureInner>,
}

impl InMemoryPlanFeatureStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose writes fail after `n` successful upserts.
    #[must_use]
    pub fn failing_after(n: usize) -> Self {
        Self {
            inner: std::sync::Arc::new(InMemoryPlanFeatureInner {
                fail_after: Some(n),
                ..Default::default()
            }),
        }
    }

    /// Number of successful writes so far (for testing).
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanFeatureStore for InMemoryPlanFeatureStore {
    async fn get(&self, plan_code: &str, feature_key: &str) -> Result<Option<StoredPlanFeature>> {
        Ok(self
            .inner
            .rows
            .read()
            .unwrap()
            .get(&(plan_code.to_string(), feature_key.to_string()))
            .cloned())
    }

    async fn list_for_plan(&self, plan_code: &str) -> Result<Vec<StoredPlanFeature>> {
        let rows = self.inner.rows.read().unwrap();
        let mut result: Vec<StoredPlanFeature> = rows
            .values()
            .filter(|r| r.plan_code == plan_code)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.feature_key.cmp(&b.feature_key));
        Ok(result)
    }

    async fn upsert(&self, plan_code: &str, feature_key: &str, value: &FeatureValue) -> Result<()> {
        if let Some(fail_after) = self.inner.fail_after {
            if self.inner.writes.load(std::sync::atomic::Ordering::SeqCst) >= fail_after {
                return Err(PitchsideError::internal(format!(
                    "write rejected for ({}, {})",
                    plan_code, feature_key
                )));
            }
        }

        self.inner.rows.write().unwrap().insert(
            (plan_code.to_string(), feature_key.to_string()),
            StoredPlanFeature {
                plan_code: plan_code.to_string(),
                feature_key: feature_key.to_string(),
                value: value.clone(),
                updated_at: Utc::now(),
            },
        );
        self.inner
            .writes
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory audit store for testing.
#[derive(Default, Clone)]
pub struct InMemoryFeatureAuditStore {
    entries: std::sync::Arc<std::sync::RwLock<Vec<FeatureAuditEntry>>>,
}

impl InMemoryFeatureAuditStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeatureAuditStore for InMemoryFeatureAuditStore {
    async fn append(&self, entry: &FeatureAuditEntry) -> Result<()> {
        self.entries.write().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<FeatureAuditEntry>> {
        Ok(self.entries.read().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_replaces_single_row() {
        let store = InMemoryPlanFeatureStore::new();
        store
            .upsert("core", "max_teams", &FeatureValue::Limit(5))
            .await
            .unwrap();
        store
            .upsert("core", "max_teams", &FeatureValue::Limit(8))
            .await
            .unwrap();

        // Still exactly one row per (plan, feature) pair.
        let rows = store.list_for_plan("core").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, FeatureValue::Limit(8));
    }

    #[tokio::test]
    async fn test_missing_row_is_none() {
        let store = InMemoryPlanFeatureStore::new();
        assert!(store.get("core", "branding").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = InMemoryPlanFeatureStore::failing_after(2);
        assert!(store
            .upsert("core", "a", &FeatureValue::Enabled(true))
            .await
            .is_ok());
        assert!(store
            .upsert("core", "b", &FeatureValue::Enabled(true))
            .await
            .is_ok());
        assert!(store
            .upsert("core", "c", &FeatureValue::Enabled(true))
            .await
            .is_err());
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_list_for_plan_sorted_and_scoped() {
        let store = InMemoryPlanFeatureStore::new();
        store
            .upsert("core", "zeta", &FeatureValue::Enabled(true))
            .await
            .unwrap();
        store
            .upsert("core", "alpha", &FeatureValue::Enabled(true))
            .await
            .unwrap();
        store
            .upsert("elite", "alpha", &FeatureValue::Enabled(true))
            .await
            .unwrap();

        let keys: Vec<String> = store
            .list_for_plan("core")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.feature_key)
            .collect();
        assert_eq!(keys, vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
