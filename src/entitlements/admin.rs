//! Admin mutations on plan feature sets.
//!
//! All writes are validated against the feature catalog, go through the
//! plan-feature store, and append one audit entry per written row. Bulk
//! operations are row-by-row and NOT atomic: a failure on row N leaves rows
//! 1..N-1 applied, and the caller receives aggregate counts only. A
//! transactional store implementation can tighten this without changes here,
//! since every row write goes through the store trait.

use std::collections::BTreeMap;

use crate::error::Result;
use super::audit::{ActorIdentity, FeatureAuditEntry};
use super::features::{FeatureCatalog, FeatureValue};
use super::plans::{PlanFeatureTable, PlanTier};
use super::storage::{FeatureAuditStore, PlanFeatureStore};

/// Aggregate outcome of a bulk plan-feature operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BulkChangeResult {
    /// Rows written successfully.
    pub applied: usize,
    /// Rows that failed; already-applied rows are not rolled back.
    pub failed: usize,
}

/// Admin surface for adjusting a plan's feature set without a deploy.
pub struct PlanFeatureAdmin<S: PlanFeatureStore, A: FeatureAuditStore> {
    catalog: FeatureCatalog,
    table: PlanFeatureTable,
    store: S,
    audit: A,
}

impl<S: PlanFeatureStore, A: FeatureAuditStore> PlanFeatureAdmin<S, A> {
    #[must_use]
    pub fn new(catalog: FeatureCatalog, table: PlanFeatureTable, store: S, audit: A) -> Self {
        Self {
            catalog,
            table,
            store,
            audit,
        }
    }

    /// Set a single feature value on a plan.
    ///
    /// Validates the value against the feature's declared type before
    /// writing, and appends one audit entry capturing the true prior value.
    pub async fn set_feature(
        &self,
        plan_code: &str,
        feature_key: &str,
        value: FeatureValue,
        actor: &ActorIdentity,
    ) -> Result<()> {
        self.catalog.validate_value(feature_key, &value)?;

        let old_value = self.prior_value(plan_code, feature_key).await?;
        self.store.upsert(plan_code, feature_key, &value).await?;

        let entry = FeatureAuditEntry::plan_feature_change(
            plan_code,
            feature_key,
            old_value,
            Some(value),
            actor,
        );
        entry.log();
        self.audit.append(&entry).await?;
        Ok(())
    }

    /// Copy every effective feature from `source_code` onto `target_code`.
    ///
    /// Row-by-row: each failure is counted and skipped, rows already written
    /// stay written, and one audit entry exists per applied row.
    pub async fn copy_plan_features(
        &self,
        source_code: &str,
        target_code: &str,
        actor: &ActorIdentity,
    ) -> Result<BulkChangeResult> {
        let source = self.effective_features(source_code).await?;
        self.apply_rows(target_code, source, actor).await
    }

    /// Rewrite a plan's rows from the static table's tier defaults.
    ///
    /// Upsert-or-insert only; stored keys outside the default set are left
    /// in place.
    pub async fn reset_to_defaults(
        &self,
        plan_code: &str,
        actor: &ActorIdentity,
    ) -> Result<BulkChangeResult> {
        let tier = PlanTier::from_code_lossy(plan_code);
        let defaults: BTreeMap<String, FeatureValue> =
            self.table.features_for(tier).into_iter().collect();
        self.apply_rows(plan_code, defaults, actor).await
    }

    async fn apply_rows(
        &self,
        target_code: &str,
        rows: impl IntoIterator<Item = (String, FeatureValue)>,
        actor: &ActorIdentity,
    ) -> Result<BulkChangeResult> {
        let mut result = BulkChangeResult::default();

        for (key, value) in rows {
            let old_value = self.prior_value(target_code, &key).await?;

            match self.store.upsert(target_code, &key, &value).await {
                Ok(()) => {
                    result.applied += 1;
                    let entry = FeatureAuditEntry::plan_feature_change(
                        target_code,
                        &key,
                        old_value,
                        Some(value),
                        actor,
                    );
                    entry.log();
                    if let Err(e) = self.audit.append(&entry).await {
                        tracing::warn!(
                            target: "pitchside::entitlements",
                            plan = %target_code,
                            feature = %key,
                            error = %e,
                            "Audit append failed for applied row"
                        );
                    }
                }
                Err(e) => {
                    result.failed += 1;
                    tracing::warn!(
                        target: "pitchside::entitlements",
                        plan = %target_code,
                        feature = %key,
                        error = %e,
                        "Bulk row write failed, continuing"
                    );
                }
            }
        }

        tracing::info!(
            target: "pitchside::entitlements",
            plan = %target_code,
            applied = result.applied,
            failed = result.failed,
            "Bulk plan-feature change complete"
        );
        Ok(result)
    }

    /// Effective feature map (static baseline + stored overrides), ordered
    /// by key so bulk operations are deterministic.
    async fn effective_features(
        &self,
        plan_code: &str,
    ) -> Result<BTreeMap<String, FeatureValue>> {
        let tier = PlanTier::from_code_lossy(plan_code);
        let mut features: BTreeMap<String, FeatureValue> =
            self.table.features_for(tier).into_iter().collect();
        for row in self.store.list_for_plan(plan_code).await? {
            features.insert(row.feature_key, row.value);
        }
        Ok(features)
    }

    async fn prior_value(&self, plan_code: &str, key: &str) -> Result<Option<FeatureValue>> {
        if let Some(row) = self.store.get(plan_code, key).await? {
            return Ok(Some(row.value));
        }
        let tier = PlanTier::from_code_lossy(plan_code);
        Ok(self.table.value(tier, key).cloned())
    }
}
