//! Daily birthday transition sweep.
//!
//! Scans every subject with a known date of birth and, only on the day the
//! computed age changes, applies the policy outcome's implied permission
//! changes as persisted mutations. Grants are monotonic — once granted they
//! are never revoked by this process — so a concurrent manual edit losing to
//! the sweep (last-write-wins) is acceptable.

use chrono::NaiveDate;

use crate::error::Result;
use super::age::{age_on, is_age_change_day};
use super::evaluator::evaluate_policy;
use super::guardian::GuardianStore;
use super::storage::{PolicyStore, SubjectStore};
use super::types::TenantPolicy;

/// Counters from one sweep run, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Subjects scanned.
    pub scanned: usize,
    /// Subjects whose age changed today.
    pub birthdays: usize,
    /// Persisted permission grants applied.
    pub grants: usize,
    /// Guardian links marked aged-out.
    pub aged_out: usize,
}

/// The birthday transition sweep.
///
/// Iterates subjects sequentially; no parallelism, no cross-job locking.
/// Idempotent per subject per day because the age-change check gates every
/// write.
pub struct BirthdaySweep<S, P, G> {
    subjects: S,
    policies: P,
    guardians: G,
}

impl<S, P, G> BirthdaySweep<S, P, G>
where
    S: SubjectStore,
    P: PolicyStore,
    G: GuardianStore,
{
    #[must_use]
    pub fn new(subjects: S, policies: P, guardians: G) -> Self {
        Self {
            subjects,
            policies,
            guardians,
        }
    }

    /// Run the sweep for `today`.
    pub async fn run(&self, today: NaiveDate) -> Result<SweepReport> {
        let mut report = SweepReport::default();

        for subject in self.subjects.list_subjects().await? {
            report.scanned += 1;

            if !is_age_change_day(subject.date_of_birth, today) {
                continue;
            }
            report.birthdays += 1;

            let policy = self
                .policies
                .get_policy(&subject.tenant_id)
                .await?
                .unwrap_or_else(TenantPolicy::restrictive_default);

            let outcome = evaluate_policy(subject.date_of_birth, &policy, today);
            let age = age_on(subject.date_of_birth, today);

            tracing::debug!(
                target: "pitchside::sweep",
                subject_id = %subject.id,
                age,
                "Birthday transition"
            );

            if !outcome.parent_required && !subject.portal_access {
                self.subjects.grant_portal_access(&subject.id).await?;
                report.grants += 1;
            }
            if outcome.allowed.pay && !subject.payment_enabled {
                self.subjects.grant_payment(&subject.id).await?;
                report.grants += 1;
            }

            if age >= policy.adult_age {
                let transitioned = self.guardians.age_out_links(&subject.id).await?;
                report.aged_out += transitioned;
                if transitioned > 0 {
                    tracing::info!(
                        target: "pitchside::sweep",
                        subject_id = %subject.id,
                        links = transitioned,
                        "Guardian links aged out"
                    );
                }
            }
        }

        tracing::info!(
            target: "pitchside::sweep",
            scanned = report.scanned,
            birthdays = report.birthdays,
            grants = report.grants,
            aged_out = report.aged_out,
            "Birthday sweep complete"
        );
        Ok(report)
    }
}
