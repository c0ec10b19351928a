//! Feature catalog and typed feature values.
//!
//! Every feature declares a value type; writes through the admin surface are
//! validated against the declaration before anything is stored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{PitchsideError, Result};

/// Declared value type of a feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    /// On/off.
    Boolean,
    /// One of a declared set of options.
    Enum,
    /// A numeric ceiling.
    Limit,
}

impl FeatureType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Limit => "limit",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A concrete feature value.
///
/// Serializes externally tagged, matching the admin API body shape:
/// `{"enabled": true}`, `{"variant": "full"}` or `{"limit_value": 5}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureValue {
    Enabled(bool),
    Variant(String),
    #[serde(rename = "limit_value")]
    Limit(u64),
}

impl FeatureValue {
    /// The value type this value satisfies.
    #[must_use]
    pub fn value_type(&self) -> FeatureType {
        match self {
            Self::Enabled(_) => FeatureType::Boolean,
            Self::Variant(_) => FeatureType::Enum,
            Self::Limit(_) => FeatureType::Limit,
        }
    }

    /// Whether this value grants the feature at all.
    ///
    /// A variant or a nonzero limit counts as enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Enabled(enabled) => *enabled,
            Self::Variant(_) => true,
            Self::Limit(limit) => *limit > 0,
        }
    }

    #[must_use]
    pub fn as_variant(&self) -> Option<&str> {
        match self {
            Self::Variant(v) => Some(v.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_limit(&self) -> Option<u64> {
        match self {
            Self::Limit(limit) => Some(*limit),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled(enabled) => write!(f, "{}", enabled),
            Self::Variant(v) => write!(f, "{}", v),
            Self::Limit(limit) => write!(f, "{}", limit),
        }
    }
}

/// A catalog entry describing one feature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub key: String,
    pub category: String,
    pub value_type: FeatureType,
    /// Valid variants for enum-typed features; empty otherwise.
    #[serde(default)]
    pub options: Vec<String>,
}

impl Feature {
    #[must_use]
    pub fn boolean(key: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            category: category.into(),
            value_type: FeatureType::Boolean,
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn enumerated<I, S>(
        key: impl Into<String>,
        category: impl Into<String>,
        options: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            category: category.into(),
            value_type: FeatureType::Enum,
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn limit(key: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            category: category.into(),
            value_type: FeatureType::Limit,
            options: Vec::new(),
        }
    }
}

/// The set of features this deployment knows about.
#[derive(Clone, Debug, Default)]
pub struct FeatureCatalog {
    features: HashMap<String, Feature>,
}

impl FeatureCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The product's standard feature set.
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for feature in [
            Feature::boolean("online_payments", "payments"),
            Feature::boolean("waitlist_auto_promote", "scheduling"),
            Feature::boolean("recurring_sessions", "scheduling"),
            Feature::boolean("custom_reports", "reporting"),
            Feature::boolean("video_analysis", "coaching"),
            Feature::enumerated("branding", "appearance", ["none", "basic", "full"]),
            Feature::enumerated("support_tier", "support", ["community", "email", "priority"]),
            Feature::limit("max_teams", "limits"),
            Feature::limit("max_coaches", "limits"),
            Feature::limit("sms_credits_monthly", "notifications"),
        ] {
            catalog.add(feature);
        }
        catalog
    }

    pub fn add(&mut self, feature: Feature) {
        self.features.insert(feature.key.clone(), feature);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Feature> {
        self.features.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.features.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Validate a value against the feature's declared type.
    ///
    /// Rejects unknown keys, type mismatches, and enum variants outside the
    /// declared options. Writes must pass here before touching storage.
    pub fn validate_value(&self, key: &str, value: &FeatureValue) -> Result<()> {
        let feature = self.get(key).ok_or_else(|| {
            PitchsideError::bad_request(format!("Unknown feature key: {}", key))
        })?;

        if value.value_type() != feature.value_type {
            return Err(PitchsideError::bad_request(format!(
                "Feature '{}' is {}-typed, got a {} value",
                key,
                feature.value_type,
                value.value_type()
            )));
        }

        if let FeatureValue::Variant(variant) = value {
            if !feature.options.iter().any(|o| o == variant) {
                return Err(PitchsideError::bad_request(format!(
                    "Invalid variant '{}' for feature '{}' (expected one of: {})",
                    variant,
                    key,
                    feature.options.join(", ")
                )));
            }
        }

        Ok(())
    }
}
