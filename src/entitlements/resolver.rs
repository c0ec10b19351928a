//! Plan feature resolution.
//!
//! Two paths, per deployment:
//!
//! - the static [`PlanFeatureTable`] answers fast per-request gating with no
//!   storage round trip;
//! - the dynamic path layers stored [`PlanFeatureStore`] overrides on top of
//!   the static baseline, one storage read per effective-features request —
//!   deliberately uncached so admin changes take effect immediately.

use std::collections::HashMap;

use crate::error::Result;
use super::features::FeatureValue;
use super::plans::{PlanFeatureTable, PlanTier};
use super::storage::PlanFeatureStore;

/// Resolves a plan's effective feature set.
pub struct FeatureResolver<S: PlanFeatureStore> {
    table: PlanFeatureTable,
    store: S,
}

impl<S: PlanFeatureStore> FeatureResolver<S> {
    #[must_use]
    pub fn new(table: PlanFeatureTable, store: S) -> Self {
        Self { table, store }
    }

    /// The static table, for callers that only need the fast path.
    #[must_use]
    pub fn table(&self) -> &PlanFeatureTable {
        &self.table
    }

    /// Effective feature map for a plan: static tier baseline with stored
    /// overrides layered on top. Unknown plan codes resolve to the free
    /// tier's baseline.
    pub async fn effective_features(
        &self,
        plan_code: &str,
    ) -> Result<HashMap<String, FeatureValue>> {
        let tier = PlanTier::from_code_lossy(plan_code);
        let mut features = self.table.features_for(tier);

        for row in self.store.list_for_plan(plan_code).await? {
            features.insert(row.feature_key, row.value);
        }

        Ok(features)
    }

    /// Whether the plan's effective feature set enables `key`.
    /// Unknown keys are disabled, never an error.
    pub async fn has_feature(&self, plan_code: &str, key: &str) -> Result<bool> {
        if let Some(row) = self.store.get(plan_code, key).await? {
            return Ok(row.value.is_enabled());
        }
        Ok(self.table.has_feature_for_code(plan_code, key))
    }

    /// Effective enum variant for `key`, if any.
    pub async fn variant(&self, plan_code: &str, key: &str) -> Result<Option<String>> {
        if let Some(row) = self.store.get(plan_code, key).await? {
            return Ok(row.value.as_variant().map(String::from));
        }
        let tier = PlanTier::from_code_lossy(plan_code);
        Ok(self.table.variant(tier, key).map(String::from))
    }

    /// Effective limit value for `key`, if any.
    pub async fn limit(&self, plan_code: &str, key: &str) -> Result<Option<u64>> {
        if let Some(row) = self.store.get(plan_code, key).await? {
            return Ok(row.value.as_limit());
        }
        let tier = PlanTier::from_code_lossy(plan_code);
        Ok(self.table.limit(tier, key))
    }

    /// Effective value before any write, used for audit old-value capture:
    /// the stored row if present, else the static baseline.
    pub async fn prior_value(&self, plan_code: &str, key: &str) -> Result<Option<FeatureValue>> {
        if let Some(row) = self.store.get(plan_code, key).await? {
            return Ok(Some(row.value));
        }
        let tier = PlanTier::from_code_lossy(plan_code);
        Ok(self.table.value(tier, key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitlements::storage::InMemoryPlanFeatureStore;

    fn resolver() -> FeatureResolver<InMemoryPlanFeatureStore> {
        FeatureResolver::new(PlanFeatureTable::standard(), InMemoryPlanFeatureStore::new())
    }

    #[tokio::test]
    async fn test_static_baseline_without_overrides() {
        let resolver = resolver();
        assert!(resolver.has_feature("growth", "custom_reports").await.unwrap());
        assert!(!resolver.has_feature("free", "custom_reports").await.unwrap());
        assert_eq!(resolver.limit("core", "max_teams").await.unwrap(), Some(5));
    }

    #[tokio::test]
    async fn test_override_wins_over_baseline() {
        let resolver = resolver();
        resolver
            .store
            .upsert("core", "max_teams", &FeatureValue::Limit(12))
            .await
            .unwrap();

        assert_eq!(resolver.limit("core", "max_teams").await.unwrap(), Some(12));

        let effective = resolver.effective_features("core").await.unwrap();
        assert_eq!(effective.get("max_teams"), Some(&FeatureValue::Limit(12)));
        // Untouched features keep the baseline.
        assert_eq!(
            effective.get("sms_credits_monthly"),
            Some(&FeatureValue::Limit(100))
        );
    }

    #[tokio::test]
    async fn test_override_can_disable_a_feature() {
        let resolver = resolver();
        resolver
            .store
            .upsert("growth", "custom_reports", &FeatureValue::Enabled(false))
            .await
            .unwrap();

        assert!(!resolver.has_feature("growth", "custom_reports").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_key_is_disabled() {
        let resolver = resolver();
        assert!(!resolver.has_feature("elite", "teleportation").await.unwrap());
        assert_eq!(resolver.variant("elite", "teleportation").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_plan_falls_back_to_free() {
        let resolver = resolver();
        // Free has no online payments, so neither does an unknown plan.
        assert!(!resolver.has_feature("platinum", "online_payments").await.unwrap());
        let effective = resolver.effective_features("platinum").await.unwrap();
        assert_eq!(
            effective.get("max_teams"),
            Some(&FeatureValue::Limit(1))
        );
    }

    #[tokio::test]
    async fn test_prior_value_prefers_stored_row() {
        let resolver = resolver();
        assert_eq!(
            resolver.prior_value("core", "max_teams").await.unwrap(),
            Some(FeatureValue::Limit(5))
        );

        resolver
            .store
            .upsert("core", "max_teams", &FeatureValue::Limit(7))
            .await
            .unwrap();
        assert_eq!(
            resolver.prior_value("core", "max_teams").await.unwrap(),
            Some(FeatureValue::Limit(7))
        );

        // Absent everywhere.
        assert_eq!(resolver.prior_value("free", "video_analysis").await.unwrap(), None);
    }
}
