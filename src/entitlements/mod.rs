//! Plan feature entitlements.
//!
//! Maps a subscription plan tier and a feature key to a boolean, variant, or
//! limit value. A static in-process table backs fast per-request gating; a
//! storage-backed dynamic path lets a super-admin adjust a plan's feature set
//! without a deploy, with every write audited.
//!
//! # Example
//!
//! ```rust
//! use pitchside::entitlements::{FeatureValue, PlanFeatureTable, PlanTier};
//!
//! let table = PlanFeatureTable::builder()
//!     .plan(PlanTier::Free)
//!         .feature("max_teams", FeatureValue::Limit(1))
//!         .done()
//!     .plan(PlanTier::Growth)
//!         .feature("max_teams", FeatureValue::Limit(20))
//!         .feature("waitlist_auto_promote", FeatureValue::Enabled(true))
//!         .done()
//!     .build();
//!
//! assert!(table.has_feature(PlanTier::Growth, "waitlist_auto_promote"));
//! assert!(!table.has_feature(PlanTier::Free, "waitlist_auto_promote"));
//! // Unknown plan codes fall back to the free tier.
//! assert!(!table.has_feature_for_code("platinum", "waitlist_auto_promote"));
//! ```

pub mod admin;
pub mod audit;
pub mod features;
pub mod plans;
pub mod resolver;
pub mod storage;

pub use admin::{BulkChangeResult, PlanFeatureAdmin};
pub use audit::{ActorIdentity, FeatureAuditEntry};
pub use features::{Feature, FeatureCatalog, FeatureType, FeatureValue};
pub use plans::{
    ParsePlanTierError, PlanFeatureTable, PlanFeatureTableBuilder, PlanInfo, PlanTier,
    TierBuilder, standard_plans,
};
pub use resolver::FeatureResolver;
pub use storage::{
    FeatureAuditStore, InMemoryFeatureAuditStore, InMemoryPlanFeatureStore, PlanFeatureStore,
    StoredPlanFeature,
};
