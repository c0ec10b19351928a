//! Age/consent policy evaluation.
//!
//! [`evaluate_policy`] is a pure function from a date of birth and a tenant
//! policy to a [`PolicyOutcome`]. It performs no I/O and never panics for
//! well-formed input. "Today" is an explicit parameter so callers pin the
//! evaluation instant; the HTTP layer passes the current UTC date via
//! [`evaluate_policy_now`].
//!
//! The evaluator does not check the threshold ordering invariant
//! (`parent_required_below <= teen_self_access_at <= adult_age`) — that is
//! the writer's responsibility. The three age comparisons are independent, so
//! a violating policy produces a degraded outcome, not a crash.

use chrono::{NaiveDate, Utc};

use super::age::age_on;
use super::types::{AllowedActions, AudienceMode, PayerParty, PolicyOutcome, TenantPolicy};

/// Evaluate `policy` for a subject born on `dob`, as of `today`.
#[must_use]
pub fn evaluate_policy(dob: NaiveDate, policy: &TenantPolicy, today: NaiveDate) -> PolicyOutcome {
    let age = age_on(dob, today);

    match policy.audience_mode {
        AudienceMode::AdultOnly => adult_only_outcome(),
        AudienceMode::YouthOnly => youth_outcome(age, policy, false),
        AudienceMode::Mixed => youth_outcome(age, policy, true),
    }
}

/// [`evaluate_policy`] at the current UTC date.
#[must_use]
pub fn evaluate_policy_now(dob: NaiveDate, policy: &TenantPolicy) -> PolicyOutcome {
    evaluate_policy(dob, policy, Utc::now().date_naive())
}

/// `adult_only` ignores age entirely: no parent involvement, the player pays.
fn adult_only_outcome() -> PolicyOutcome {
    PolicyOutcome {
        parent_required: false,
        show_parent_sections: false,
        teen_self: false,
        who_can_pay: PayerParty::Player,
        guardian_consent_needed: false,
        allowed: AllowedActions {
            book: true,
            pay: true,
            view_schedules: true,
            manage_profile: true,
            invite_others: true,
            // Adult-only tenants have no dependent relationships.
            manage_dependents: false,
        },
    }
}

/// Shared threshold logic for `youth_only` and `mixed`.
///
/// The two modes compute the same child/teen thresholds; they differ in how
/// an adult subject is presented. In `youth_only` an adult is assumed to be
/// there to manage dependents, so the parent-facing sections stay visible.
fn youth_outcome(age: u8, policy: &TenantPolicy, mixed: bool) -> PolicyOutcome {
    let is_adult = age >= policy.adult_age;

    if is_adult {
        return PolicyOutcome {
            parent_required: false,
            // In mixed mode this follows the minor formula below, which is
            // false for adults. Youth-only adults keep the sections so they
            // can manage their own dependents.
            show_parent_sections: !mixed,
            teen_self: false,
            who_can_pay: PayerParty::Player,
            guardian_consent_needed: false,
            allowed: AllowedActions {
                book: true,
                pay: true,
                view_schedules: true,
                manage_profile: true,
                invite_others: true,
                manage_dependents: true,
            },
        };
    }

    let parent_required = age < policy.parent_required_below;
    let teen_self = age >= policy.teen_self_access_at;

    let who_can_pay = if parent_required {
        PayerParty::Parent
    } else if teen_self && policy.allow_teen_payments {
        PayerParty::Player
    } else {
        PayerParty::Parent
    };

    PolicyOutcome {
        parent_required,
        // Shown unless the subject is a fully self-sufficient teen. Note this
        // is true for every non-teen minor regardless of parent_required.
        show_parent_sections: parent_required || !teen_self,
        teen_self,
        who_can_pay,
        guardian_consent_needed: parent_required || teen_self,
        allowed: AllowedActions {
            book: !parent_required,
            pay: who_can_pay == PayerParty::Player,
            view_schedules: true,
            manage_profile: !parent_required,
            invite_others: false,
            manage_dependents: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn today() -> NaiveDate {
        d(2025, 6, 1)
    }

    fn dob_for_age(age: i32) -> NaiveDate {
        // Birthday already passed this year, so the computed age is exact.
        d(2025 - age, 1, 15)
    }

    fn mixed_policy() -> TenantPolicy {
        TenantPolicy {
            audience_mode: AudienceMode::Mixed,
            parent_required_below: 13,
            teen_self_access_at: 13,
            adult_age: 18,
            allow_teen_payments: true,
        }
    }

    #[test]
    fn test_adult_only_ignores_age() {
        let policy = TenantPolicy {
            audience_mode: AudienceMode::AdultOnly,
            ..TenantPolicy::default()
        };
        for age in [5, 12, 16, 18, 40] {
            let outcome = evaluate_policy(dob_for_age(age), &policy, today());
            assert!(!outcome.parent_required, "age {}", age);
            assert_eq!(outcome.who_can_pay, PayerParty::Player, "age {}", age);
            assert!(outcome.allowed.book);
            assert!(outcome.allowed.pay);
            assert!(outcome.allowed.invite_others);
            assert!(!outcome.allowed.manage_dependents);
            assert!(!outcome.guardian_consent_needed);
        }
    }

    #[test]
    fn test_mixed_teen_self_with_payments() {
        // Age 15 with teen payments on.
        let outcome = evaluate_policy(dob_for_age(15), &mixed_policy(), today());
        assert!(!outcome.parent_required);
        assert!(outcome.teen_self);
        assert_eq!(outcome.who_can_pay, PayerParty::Player);
        assert!(outcome.guardian_consent_needed);
        assert!(outcome.allowed.book);
        assert!(outcome.allowed.pay);
        assert!(!outcome.show_parent_sections);
    }

    #[test]
    fn test_mixed_child_requires_parent() {
        // Age 10, below the parent threshold.
        let outcome = evaluate_policy(dob_for_age(10), &mixed_policy(), today());
        assert!(outcome.parent_required);
        assert_eq!(outcome.who_can_pay, PayerParty::Parent);
        assert!(!outcome.allowed.book);
        assert!(!outcome.allowed.pay);
        assert!(outcome.show_parent_sections);
        assert!(outcome.guardian_consent_needed);
    }

    #[test]
    fn test_mixed_teen_without_payments_falls_back_to_parent() {
        let policy = TenantPolicy {
            allow_teen_payments: false,
            ..mixed_policy()
        };
        let outcome = evaluate_policy(dob_for_age(15), &policy, today());
        assert!(outcome.teen_self);
        assert_eq!(outcome.who_can_pay, PayerParty::Parent);
        assert!(outcome.allowed.book);
        assert!(!outcome.allowed.pay);
    }

    #[test]
    fn test_mixed_adult_never_needs_consent() {
        for age in [18, 19, 30, 70] {
            let outcome = evaluate_policy(dob_for_age(age), &mixed_policy(), today());
            assert!(!outcome.guardian_consent_needed, "age {}", age);
            assert!(!outcome.parent_required);
            assert!(!outcome.teen_self);
            assert_eq!(outcome.who_can_pay, PayerParty::Player);
            assert!(outcome.allowed.manage_dependents);
            assert!(!outcome.show_parent_sections);
        }
    }

    #[test]
    fn test_mixed_middle_band_minor() {
        // Between parent_required_below and teen_self_access_at: booking is
        // allowed but a parent still pays and parent sections stay visible.
        let policy = TenantPolicy {
            parent_required_below: 10,
            teen_self_access_at: 14,
            ..mixed_policy()
        };
        let outcome = evaluate_policy(dob_for_age(12), &policy, today());
        assert!(!outcome.parent_required);
        assert!(!outcome.teen_self);
        assert_eq!(outcome.who_can_pay, PayerParty::Parent);
        assert!(outcome.allowed.book);
        assert!(outcome.show_parent_sections);
        assert!(!outcome.guardian_consent_needed);
    }

    #[test]
    fn test_youth_only_minor_thresholds() {
        let policy = TenantPolicy {
            audience_mode: AudienceMode::YouthOnly,
            ..mixed_policy()
        };

        let child = evaluate_policy(dob_for_age(8), &policy, today());
        assert!(child.parent_required);
        assert!(!child.allowed.book);
        assert_eq!(child.who_can_pay, PayerParty::Parent);
        assert!(!child.allowed.invite_others);
        assert!(!child.allowed.manage_dependents);

        let teen = evaluate_policy(dob_for_age(15), &policy, today());
        assert!(!teen.parent_required);
        assert!(teen.teen_self);
        assert_eq!(teen.who_can_pay, PayerParty::Player);
        assert!(teen.allowed.book);
    }

    #[test]
    fn test_youth_only_adult_keeps_parent_sections() {
        let policy = TenantPolicy {
            audience_mode: AudienceMode::YouthOnly,
            ..mixed_policy()
        };
        let outcome = evaluate_policy(dob_for_age(35), &policy, today());
        assert!(!outcome.parent_required);
        assert!(outcome.show_parent_sections);
        assert!(outcome.allowed.manage_dependents);
        assert_eq!(outcome.who_can_pay, PayerParty::Player);
    }

    #[test]
    fn test_book_denied_below_parent_threshold_in_both_modes() {
        for mode in [AudienceMode::YouthOnly, AudienceMode::Mixed] {
            let policy = TenantPolicy {
                audience_mode: mode,
                ..mixed_policy()
            };
            for age in 0..13 {
                let outcome = evaluate_policy(dob_for_age(age), &policy, today());
                assert!(!outcome.allowed.book, "mode {} age {}", mode, age);
            }
        }
    }

    #[test]
    fn test_idempotent_at_same_instant() {
        let dob = dob_for_age(15);
        let policy = mixed_policy();
        let a = evaluate_policy(dob, &policy, today());
        let b = evaluate_policy(dob, &policy, today());
        assert_eq!(a, b);
    }

    #[test]
    fn test_birthday_boundary_flips_outcome() {
        // Turns 13 (teen threshold) exactly on the evaluation day.
        let dob = d(2012, 6, 1);
        let policy = mixed_policy();

        let before = evaluate_policy(dob, &policy, d(2025, 5, 31));
        assert!(before.parent_required);

        let on_birthday = evaluate_policy(dob, &policy, d(2025, 6, 1));
        assert!(!on_birthday.parent_required);
        assert!(on_birthday.teen_self);
    }
}
