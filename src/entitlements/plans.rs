//! Plan tiers and the static plan-feature table.
//!
//! The table is immutable and explicitly injected wherever it is needed —
//! never a module-level singleton — so tests substitute fixtures without
//! process-wide state. It is loaded once at startup and backs fast
//! per-request gating; tenant-customizable overrides live in storage and are
//! layered on top by the resolver.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::features::FeatureValue;

/// Subscription plan tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Free,
    Core,
    Growth,
    Elite,
}

impl PlanTier {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Core => "core",
            Self::Growth => "growth",
            Self::Elite => "elite",
        }
    }

    /// Parse a plan code, falling back to the lowest tier for anything
    /// unrecognized. The fallback is always downward — an unknown plan never
    /// gets a paid tier's features.
    #[must_use]
    pub fn from_code_lossy(code: &str) -> Self {
        code.parse().unwrap_or(Self::Free)
    }

    /// All tiers, lowest first.
    #[must_use]
    pub fn all() -> [PlanTier; 4] {
        [Self::Free, Self::Core, Self::Growth, Self::Elite]
    }
}

/// Error returned when parsing a plan code fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePlanTierError {
    invalid_value: String,
}

impl fmt::Display for ParsePlanTierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid plan tier: '{}' (expected: free, core, growth, or elite)",
            self.invalid_value
        )
    }
}

impl std::error::Error for ParsePlanTierError {}

impl FromStr for PlanTier {
    type Err = ParsePlanTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "core" => Ok(Self::Core),
            "growth" => Ok(Self::Growth),
            "elite" => Ok(Self::Elite),
            _ => Err(ParsePlanTierError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Catalog metadata for one plan tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanInfo {
    pub tier: PlanTier,
    /// Display name shown to users.
    pub name: String,
    /// Price in cents (for display purposes).
    pub price_cents: i64,
    /// Currency code (e.g., "usd", "gbp", "eur").
    pub currency: String,
}

impl PlanInfo {
    /// Get the price formatted for display (e.g., "$29.00").
    #[must_use]
    pub fn formatted_price(&self) -> String {
        let symbol = match self.currency.as_str() {
            "usd" => "$",
            "gbp" => "£",
            "eur" => "€",
            _ => &self.currency,
        };
        let dollars = self.price_cents as f64 / 100.0;
        format!("{}{:.2}", symbol, dollars)
    }
}

/// The product's standard plan catalog, lowest tier first.
#[must_use]
pub fn standard_plans() -> Vec<PlanInfo> {
    vec![
        PlanInfo {
            tier: PlanTier::Free,
            name: "Starter".to_string(),
            price_cents: 0,
            currency: "usd".to_string(),
        },
        PlanInfo {
            tier: PlanTier::Core,
            name: "Core".to_string(),
            price_cents: 2_900,
            currency: "usd".to_string(),
        },
        PlanInfo {
            tier: PlanTier::Growth,
            name: "Growth".to_string(),
            price_cents: 7_900,
            currency: "usd".to_string(),
        },
        PlanInfo {
            tier: PlanTier::Elite,
            name: "Elite".to_string(),
            price_cents: 19_900,
            currency: "usd".to_string(),
        },
    ]
}

/// Immutable plan tier → feature key → value table.
#[derive(Clone, Debug, Default)]
pub struct PlanFeatureTable {
    plans: HashMap<PlanTier, HashMap<String, FeatureValue>>,
}

impl PlanFeatureTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for constructing a table.
    #[must_use]
    pub fn builder() -> PlanFeatureTableBuilder {
        PlanFeatureTableBuilder::new()
    }

    /// The product's standard tier table.
    #[must_use]
    pub fn standard() -> Self {
        Self::builder()
            .plan(PlanTier::Free)
                .feature("max_teams", FeatureValue::Limit(1))
                .feature("max_coaches", FeatureValue::Limit(2))
                .feature("support_tier", FeatureValue::Variant("community".into()))
                .done()
            .plan(PlanTier::Core)
                .feature("online_payments", FeatureValue::Enabled(true))
                .feature("recurring_sessions", FeatureValue::Enabled(true))
                .feature("max_teams", FeatureValue::Limit(5))
                .feature("max_coaches", FeatureValue::Limit(10))
                .feature("branding", FeatureValue::Variant("basic".into()))
                .feature("support_tier", FeatureValue::Variant("email".into()))
                .feature("sms_credits_monthly", FeatureValue::Limit(100))
                .done()
            .plan(PlanTier::Growth)
                .feature("online_payments", FeatureValue::Enabled(true))
                .feature("recurring_sessions", FeatureValue::Enabled(true))
                .feature("waitlist_auto_promote", FeatureValue::Enabled(true))
                .feature("custom_reports", FeatureValue::Enabled(true))
                .feature("max_teams", FeatureValue::Limit(20))
                .feature("max_coaches", FeatureValue::Limit(50))
                .feature("branding", FeatureValue::Variant("basic".into()))
                .feature("support_tier", FeatureValue::Variant("email".into()))
                .feature("sms_credits_monthly", FeatureValue::Limit(500))
                .done()
            .plan(PlanTier::Elite)
                .feature("online_payments", FeatureValue::Enabled(true))
                .feature("recurring_sessions", FeatureValue::Enabled(true))
                .feature("waitlist_auto_promote", FeatureValue::Enabled(true))
                .feature("custom_reports", FeatureValue::Enabled(true))
                .feature("video_analysis", FeatureValue::Enabled(true))
                .feature("max_teams", FeatureValue::Limit(100))
                .feature("max_coaches", FeatureValue::Limit(250))
                .feature("branding", FeatureValue::Variant("full".into()))
                .feature("support_tier", FeatureValue::Variant("priority".into()))
                .feature("sms_credits_monthly", FeatureValue::Limit(2000))
                .done()
            .build()
    }

    /// Get a feature value for a tier. `None` means the feature is absent
    /// (disabled) for that tier.
    #[must_use]
    pub fn value(&self, tier: PlanTier, key: &str) -> Option<&FeatureValue> {
        self.plans.get(&tier).and_then(|features| features.get(key))
    }

    /// Whether the tier has the feature enabled. Unknown keys are disabled.
    #[must_use]
    pub fn has_feature(&self, tier: PlanTier, key: &str) -> bool {
        self.value(tier, key).is_some_and(FeatureValue::is_enabled)
    }

    /// Enum variant for a tier, if the feature is enum-typed and present.
    #[must_use]
    pub fn variant(&self, tier: PlanTier, key: &str) -> Option<&str> {
        self.value(tier, key).and_then(FeatureValue::as_variant)
    }

    /// Limit value for a tier, if the feature is limit-typed and present.
    #[must_use]
    pub fn limit(&self, tier: PlanTier, key: &str) -> Option<u64> {
        self.value(tier, key).and_then(FeatureValue::as_limit)
    }

    /// Whether a plan code (unknown codes resolve to free) has a feature.
    #[must_use]
    pub fn has_feature_for_code(&self, plan_code: &str, key: &str) -> bool {
        self.has_feature(PlanTier::from_code_lossy(plan_code), key)
    }

    /// The full feature map for a tier.
    #[must_use]
    pub fn features_for(&self, tier: PlanTier) -> HashMap<String, FeatureValue> {
        self.plans.get(&tier).cloned().unwrap_or_default()
    }
}

/// Builder for constructing a plan feature table.
#[derive(Debug, Default)]
pub struct PlanFeatureTableBuilder {
    plans: HashMap<PlanTier, HashMap<String, FeatureValue>>,
}

impl PlanFeatureTableBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start defining a tier's feature set.
    #[must_use]
    pub fn plan(self, tier: PlanTier) -> TierBuilder {
        TierBuilder {
            parent: self,
            tier,
            features: HashMap::new(),
        }
    }

    /// Build the table.
    #[must_use]
    pub fn build(self) -> PlanFeatureTable {
        PlanFeatureTable { plans: self.plans }
    }

    fn add_tier(mut self, tier: PlanTier, features: HashMap<String, FeatureValue>) -> Self {
        self.plans.insert(tier, features);
        self
    }
}

/// Builder for a single tier's features.
#[derive(Debug)]
pub struct TierBuilder {
    parent: PlanFeatureTableBuilder,
    tier: PlanTier,
    features: HashMap<String, FeatureValue>,
}

impl TierBuilder {
    /// Add a feature value to this tier.
    #[must_use]
    pub fn feature(mut self, key: impl Into<String>, value: FeatureValue) -> Self {
        self.features.insert(key.into(), value);
        self
    }

    /// Finish this tier and return to the parent builder.
    #[must_use]
    pub fn done(self) -> PlanFeatureTableBuilder {
        self.parent.add_tier(self.tier, self.features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_tier_round_trip() {
        for tier in PlanTier::all() {
            assert_eq!(tier.as_str().parse::<PlanTier>().unwrap(), tier);
        }
    }

    #[test]
    fn test_unknown_code_falls_back_to_free() {
        assert_eq!(PlanTier::from_code_lossy("platinum"), PlanTier::Free);
        assert_eq!(PlanTier::from_code_lossy(""), PlanTier::Free);
        assert_eq!(PlanTier::from_code_lossy("GROWTH"), PlanTier::Growth);
    }

    #[test]
    fn test_build_table() {
        let table = PlanFeatureTable::builder()
            .plan(PlanTier::Free)
                .feature("max_teams", FeatureValue::Limit(1))
                .done()
            .plan(PlanTier::Core)
                .feature("max_teams", FeatureValue::Limit(5))
                .feature("online_payments", FeatureValue::Enabled(true))
                .done()
            .build();

        assert_eq!(table.limit(PlanTier::Free, "max_teams"), Some(1));
        assert_eq!(table.limit(PlanTier::Core, "max_teams"), Some(5));
        assert!(table.has_feature(PlanTier::Core, "online_payments"));
        assert!(!table.has_feature(PlanTier::Free, "online_payments"));
    }

    #[test]
    fn test_unknown_key_is_disabled() {
        let table = PlanFeatureTable::standard();
        for tier in PlanTier::all() {
            assert!(!table.has_feature(tier, "nonexistent_feature"));
            assert_eq!(table.value(tier, "nonexistent_feature"), None);
        }
    }

    #[test]
    fn test_unknown_plan_code_gets_free_features() {
        let table = PlanFeatureTable::standard();
        // Growth has auto-promote; free does not. An unknown code must not
        // inherit it.
        assert!(table.has_feature_for_code("growth", "waitlist_auto_promote"));
        assert!(!table.has_feature_for_code("mystery_plan", "waitlist_auto_promote"));
    }

    #[test]
    fn test_standard_table_free_tier_is_minimal() {
        let table = PlanFeatureTable::standard();
        assert!(!table.has_feature(PlanTier::Free, "online_payments"));
        assert!(!table.has_feature(PlanTier::Free, "video_analysis"));
        assert_eq!(table.limit(PlanTier::Free, "max_teams"), Some(1));
        assert_eq!(table.variant(PlanTier::Free, "support_tier"), Some("community"));
    }

    #[test]
    fn test_standard_plans_ordering_and_prices() {
        let plans = standard_plans();
        assert_eq!(plans.len(), 4);
        assert_eq!(plans[0].tier, PlanTier::Free);
        assert_eq!(plans[0].price_cents, 0);
        assert_eq!(plans[0].formatted_price(), "$0.00");
        assert_eq!(plans[2].formatted_price(), "$79.00");
    }

    #[test]
    fn test_variant_accessor() {
        let table = PlanFeatureTable::standard();
        assert_eq!(table.variant(PlanTier::Elite, "branding"), Some("full"));
        assert_eq!(table.variant(PlanTier::Elite, "max_teams"), None);
    }
}
