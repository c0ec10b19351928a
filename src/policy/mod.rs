//! Age/consent policy evaluation.
//!
//! Maps a subject's date of birth and a tenant's policy configuration to a
//! permission outcome: who must act as booking agent, who may pay, and which
//! UI sections apply. The evaluator itself is pure; storage access and the
//! daily birthday sweep live alongside it.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pitchside::policy::{evaluate_policy, AudienceMode, TenantPolicy};
//!
//! let policy = TenantPolicy {
//!     audience_mode: AudienceMode::Mixed,
//!     parent_required_below: 13,
//!     teen_self_access_at: 13,
//!     adult_age: 18,
//!     allow_teen_payments: true,
//! };
//!
//! let dob = NaiveDate::from_ymd_opt(2010, 1, 15).unwrap();
//! let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
//! let outcome = evaluate_policy(dob, &policy, today);
//! assert!(outcome.teen_self);
//! assert!(outcome.allowed.book);
//! ```

pub mod age;
mod evaluator;
pub mod guardian;
mod service;
pub mod storage;
pub mod sweep;
mod types;

pub use age::{age_on, has_had_birthday, is_age_change_day};
pub use evaluator::{evaluate_policy, evaluate_policy_now};
pub use guardian::{GuardianLink, GuardianStore, InMemoryGuardianStore, RelationshipStatus};
pub use service::PolicyService;
pub use storage::{
    InMemoryPolicyStore, InMemorySubjectStore, PolicyStore, Subject, SubjectStore,
};
pub use sweep::{BirthdaySweep, SweepReport};
pub use types::{
    AllowedActions, AudienceMode, ParseAudienceModeError, PayerParty, PolicyOutcome, TenantPolicy,
};
