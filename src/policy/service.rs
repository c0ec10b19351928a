//! Policy evaluation against stored tenant configuration.

use chrono::NaiveDate;

use crate::error::Result;
use super::evaluator::evaluate_policy;
use super::storage::PolicyStore;
use super::types::{PolicyOutcome, TenantPolicy};

/// Loads a tenant's policy and evaluates it for a subject.
///
/// A tenant without a policy row gets the restrictive default — a missing
/// row is a safe fallback, never an error.
pub struct PolicyService<P: PolicyStore> {
    store: P,
}

impl<P: PolicyStore> PolicyService<P> {
    #[must_use]
    pub fn new(store: P) -> Self {
        Self { store }
    }

    /// Evaluate the tenant's policy for a subject born on `dob`, as of
    /// `today`. Returns the outcome together with the policy that produced
    /// it so the caller can echo both to the client.
    pub async fn evaluate(
        &self,
        tenant_id: &str,
        dob: NaiveDate,
        today: NaiveDate,
    ) -> Result<(PolicyOutcome, TenantPolicy)> {
        let policy = match self.store.get_policy(tenant_id).await? {
            Some(policy) => policy,
            None => {
                tracing::debug!(
                    target: "pitchside::policy",
                    tenant_id = %tenant_id,
                    "No policy row for tenant, applying restrictive default"
                );
                TenantPolicy::restrictive_default()
            }
        };

        let outcome = evaluate_policy(dob, &policy, today);
        Ok((outcome, policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::storage::InMemoryPolicyStore;
    use crate::policy::types::{AudienceMode, PayerParty};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_evaluate_with_stored_policy() {
        let store = InMemoryPolicyStore::new();
        store
            .put_policy(
                "club_1",
                &TenantPolicy {
                    audience_mode: AudienceMode::Mixed,
                    parent_required_below: 13,
                    teen_self_access_at: 13,
                    adult_age: 18,
                    allow_teen_payments: true,
                },
            )
            .await
            .unwrap();

        let service = PolicyService::new(store);
        let (outcome, policy) = service
            .evaluate("club_1", d(2010, 1, 15), d(2025, 6, 1))
            .await
            .unwrap();

        assert_eq!(policy.audience_mode, AudienceMode::Mixed);
        assert!(outcome.teen_self);
        assert_eq!(outcome.who_can_pay, PayerParty::Player);
    }

    #[tokio::test]
    async fn test_missing_policy_falls_back_to_restrictive_default() {
        let service = PolicyService::new(InMemoryPolicyStore::new());
        let (outcome, policy) = service
            .evaluate("unknown_club", d(2010, 1, 15), d(2025, 6, 1))
            .await
            .unwrap();

        assert_eq!(policy, TenantPolicy::restrictive_default());
        // Under the default every minor is parent-required.
        assert!(outcome.parent_required);
        assert_eq!(outcome.who_can_pay, PayerParty::Parent);
        assert!(!outcome.allowed.book);
    }
}
